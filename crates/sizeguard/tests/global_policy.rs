//! The process-wide policy can only be installed once, so everything that
//! touches it lives in this one test binary and one test.

use sizeguard::{Backend, DispatchSerializer, PolicyError, ThresholdPolicy, Value};

#[test]
fn install_once_then_default_dispatchers_use_it() {
    assert_eq!(ThresholdPolicy::global(), ThresholdPolicy::default());

    let policy = ThresholdPolicy::new(16).unwrap();
    ThresholdPolicy::install(policy).unwrap();
    assert_eq!(ThresholdPolicy::global(), policy);

    let again = ThresholdPolicy::install(ThresholdPolicy::default());
    assert_eq!(again, Err(PolicyError::AlreadyInstalled));
    assert_eq!(ThresholdPolicy::global(), policy);

    let dispatcher = DispatchSerializer::default();
    assert_eq!(dispatcher.policy(), policy);
    // Quoted strings estimate to 15 and 16 bytes.
    assert_eq!(dispatcher.route(&Value::from("x".repeat(13))).backend, Backend::Fast);
    assert_eq!(dispatcher.route(&Value::from("x".repeat(14))).backend, Backend::Safe);
}

#[test]
fn policy_from_configuration_text() {
    let policy: ThresholdPolicy = serde_json::from_str(r#"{"max_fast_bytes": 1024}"#).unwrap();
    assert_eq!(policy.max_fast_bytes(), 1024);
    let unknown = r#"{"max_fast_bytes": 1024, "x": 1}"#;
    assert!(serde_json::from_str::<ThresholdPolicy>(unknown).is_err());
    assert!("2_147_483_648".parse::<ThresholdPolicy>().is_err());
}
