use crate::config::Radix;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SamplerError {
    #[error("Input ids contain duplicates: {}", .ids.join(", "))]
    DuplicateIds { ids: Vec<String> },

    #[error("Unknown output mode '{0}': expected one of id, tuple, ticket")]
    InvalidOutputMode(String),

    #[error("Invalid sampler configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid ticket number '{0}': expected 0.<digits> strictly between 0 and 1")]
    InvalidTicketNumber(String),

    #[error("Ticket number '{number}' has digits outside the {radix:?} radix")]
    RadixMismatch { number: String, radix: Radix },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SamplerResult<T> = Result<T, SamplerError>;
