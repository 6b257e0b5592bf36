use super::{apply_env_overrides, apply_file_overrides, load_settings, Settings};

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_formspree() {
    let settings = Settings::default();
    assert_eq!(settings.relay_endpoint, "https://formspree.io/f/mqagrrae");
    assert_eq!(settings.request_timeout_secs, 15);
    settings.validate().expect("defaults are valid");
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"
relay_endpoint = "https://relay.example.com/f/abc"
request_timeout_secs = "30"
"#,
    )
    .expect("parse");

    assert_eq!(settings.relay_endpoint, "https://relay.example.com/f/abc");
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn reset_delay_cannot_be_configured() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "revert_delay_ms = 0\n").expect("parse");
    apply_env_overrides(&mut settings, env_of(&[("APP__REVERT_DELAY_MS", "0")]));
    assert_eq!(settings, Settings::default());
}

#[test]
fn malformed_file_is_an_error_and_leaves_settings_untouched() {
    let mut settings = Settings::default();
    assert!(apply_file_overrides(&mut settings, "relay_endpoint = ").is_err());
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_of(&[
            ("RELAY_ENDPOINT", "https://plain.example.com/"),
            ("APP__RELAY_ENDPOINT", "https://app.example.com/"),
            ("APP__REQUEST_TIMEOUT_SECS", "not-a-number"),
        ]),
    );

    assert_eq!(settings.relay_endpoint, "https://app.example.com/");
    assert_eq!(settings.request_timeout_secs, 15);
}

#[test]
fn validate_rejects_bad_endpoint_and_zero_timeout() {
    let settings = Settings {
        relay_endpoint: "mailto:ada@example.com".into(),
        ..Settings::default()
    };
    assert!(settings.validate().is_err());

    let settings = Settings {
        request_timeout_secs: 0,
        ..Settings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn load_settings_reads_config_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();

    let temp_root = env::temp_dir().join(format!("contact_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("contact.toml");
    fs::write(&path, "request_timeout_secs = 42\n").expect("write config");

    let settings = load_settings(&path);
    assert_eq!(settings.request_timeout_secs, 42);

    fs::remove_dir_all(temp_root).expect("cleanup");
}
