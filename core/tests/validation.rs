//! Invalid input is rejected up front, before any ticket exists.

use consistent_sampler_core::{sample, SampleOptions, SamplerError};
use std::fs;

#[test]
fn duplicate_ids_are_rejected() {
    let err = sample(["X", "X"], &314159, &SampleOptions::default()).unwrap_err();
    match err {
        SamplerError::DuplicateIds { ids } => assert_eq!(ids, vec!["X"]),
        other => panic!("expected DuplicateIds, got {other}"),
    }
}

#[test]
fn duplicate_error_names_every_offender() {
    let err = sample(["b", "a", "c", "b", "a", "a"], &1, &SampleOptions::default()).unwrap_err();
    assert_eq!(err.to_string(), "Input ids contain duplicates: a, b");
}

#[test]
fn zero_digits_is_rejected_before_sampling() {
    let err = sample(["a"], &1, &SampleOptions::default().digits(0)).unwrap_err();
    assert!(matches!(err, SamplerError::InvalidConfig(_)));
}

#[test]
fn output_mode_text_is_validated() {
    let err = "ballots".parse::<consistent_sampler_core::OutputMode>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown output mode 'ballots': expected one of id, tuple, ticket"
    );
}

#[test]
fn options_load_from_json_file() {
    let dir = std::env::temp_dir().join(format!("consistent-sampler-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("options.json");
    fs::write(
        &path,
        r#"{"with_replacement": true, "drop": 1, "take": 3, "output": "id", "digits": 12}"#,
    )
    .expect("write options");

    let opts = SampleOptions::load(&path).expect("load options");
    assert!(opts.with_replacement);
    assert_eq!((opts.drop, opts.take, opts.digits), (1, Some(3), 12));

    let got: Vec<_> = sample(["A#2", "B#7", "C#1", "D#4"], &314159, &opts)
        .unwrap()
        .ids()
        .collect();
    assert_eq!(got, vec!["C#1", "C#1", "B#7"]);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn non_boolean_replacement_flag_is_rejected() {
    let err = SampleOptions::from_json_str(r#"{"with_replacement": 1}"#).unwrap_err();
    assert!(matches!(err, SamplerError::Serialization(_)));
}
