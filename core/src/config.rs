use crate::error::{SamplerError, SamplerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Significant digits shown after the run of maximum digits.
pub const DEFAULT_DISPLAY_DIGITS: usize = 9;

/// Digit alphabet of generated ticket numbers.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Radix {
    /// Digest rendered as a decimal integer, digits reversed.
    #[default]
    Decimal,
    /// Digest rendered as 64 lowercase hex digits.
    Hexadecimal,
}

impl Radix {
    /// The digit that a strictly larger successor must preserve in a leading run.
    pub fn max_digit(self) -> u8 {
        match self {
            Self::Decimal     => b'9',
            Self::Hexadecimal => b'f',
        }
    }

    pub fn is_digit(self, c: u8) -> bool {
        match self {
            Self::Decimal     => c.is_ascii_digit(),
            Self::Hexadecimal => c.is_ascii_digit() || (b'a'..=b'f').contains(&c),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FractionConfig {
    pub radix: Radix,
}

/// Shape of each element yielded by a sample.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    Id,
    #[default]
    Tuple,
    Ticket,
}

impl FromStr for OutputMode {
    type Err = SamplerError;

    fn from_str(s: &str) -> SamplerResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "id"     => Ok(Self::Id),
            "tuple"  => Ok(Self::Tuple),
            "ticket" => Ok(Self::Ticket),
            _        => Err(SamplerError::InvalidOutputMode(s.to_string())),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Id     => "id",
            Self::Tuple  => "tuple",
            Self::Ticket => "ticket",
        })
    }
}

/// Options for one sampler invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SampleOptions {
    pub with_replacement: bool,
    /// Draws discarded before the first emitted element.
    pub drop: u64,
    /// Maximum number of emitted elements. `None` is unbounded.
    pub take: Option<u64>,
    pub output: OutputMode,
    /// Display precision passed to `trim`. Must be positive.
    pub digits: usize,
    pub fraction: FractionConfig,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            with_replacement: false,
            drop: 0,
            take: None,
            output: OutputMode::default(),
            digits: DEFAULT_DISPLAY_DIGITS,
            fraction: FractionConfig::default(),
        }
    }
}

impl SampleOptions {
    pub fn with_replacement(mut self, with_replacement: bool) -> Self {
        self.with_replacement = with_replacement;
        self
    }

    pub fn drop(mut self, drop: u64) -> Self {
        self.drop = drop;
        self
    }

    pub fn take(mut self, take: u64) -> Self {
        self.take = Some(take);
        self
    }

    pub fn output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn digits(mut self, digits: usize) -> Self {
        self.digits = digits;
        self
    }

    pub fn radix(mut self, radix: Radix) -> Self {
        self.fraction.radix = radix;
        self
    }

    /// Reject option combinations that cannot produce a sample.
    pub fn validate(&self) -> SamplerResult<()> {
        if self.digits == 0 {
            return Err(SamplerError::InvalidConfig(
                "digits must be a positive integer".into(),
            ));
        }
        Ok(())
    }

    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json_str(content: &str) -> SamplerResult<Self> {
        let options: SampleOptions = serde_json::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Read options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> SamplerResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }
}
