#![cfg(feature = "serde")]

use std::time::Duration;

use robustvisor::{ConfigError, JitterPolicy, Supervisor, SupervisorConfig};

#[test]
fn test_empty_object_gives_defaults() {
    let cfg: SupervisorConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, SupervisorConfig::default());
}

#[test]
fn test_humantime_durations_and_jitter() {
    let cfg: SupervisorConfig = serde_json::from_str(
        r#"{
            "rate_limit": 2.5,
            "grace": "10s",
            "retry_delay": "250ms",
            "jitter": "equal",
            "capture_diagnostics": true
        }"#,
    )
    .unwrap();

    assert_eq!(cfg.rate_limit, 2.5);
    assert_eq!(cfg.grace, Duration::from_secs(10));
    assert_eq!(cfg.retry_delay(), Some(Duration::from_millis(250)));
    assert_eq!(cfg.jitter, JitterPolicy::Equal);
    assert!(cfg.capture_diagnostics);
}

#[test]
fn test_partial_object_keeps_other_defaults() {
    let cfg: SupervisorConfig = serde_json::from_str(r#"{ "grace": "1m 30s" }"#).unwrap();
    assert_eq!(cfg.grace, Duration::from_secs(90));
    assert_eq!(cfg.rate_limit, 1.0);
    assert_eq!(cfg.retry_delay(), None);
}

#[test]
fn test_serializes_durations_as_text() {
    let value = serde_json::to_value(SupervisorConfig::default()).unwrap();
    assert_eq!(value["grace"], "1s");
    assert_eq!(value["jitter"], "none");
}

#[test]
fn test_unknown_jitter_is_rejected() {
    let res = serde_json::from_str::<SupervisorConfig>(r#"{ "jitter": "sometimes" }"#);
    assert!(res.is_err());
}

#[test]
fn test_negative_rate_limit_fails_at_build() {
    let cfg: SupervisorConfig = serde_json::from_str(r#"{ "rate_limit": -3.0 }"#).unwrap();
    assert!(matches!(
        Supervisor::new(cfg),
        Err(ConfigError::InvalidRateLimit { value }) if value == -3.0
    ));
}
