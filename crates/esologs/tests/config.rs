use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use esologs::{
    AuthMode, ClientConfig, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_REDIRECT_URI, ENV_TIMEOUT_SECS,
    ErrorKind, EsoLogsClient, Token, TokenState, TokenStore,
};
use esologs_oauth::{DEFAULT_TOKEN_FILE, DEFAULT_TOKEN_KEY};

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn loads_required_and_optional_variables() {
    let config = ClientConfig::from_env_with(env(&[
        (ENV_CLIENT_ID, "abc"),
        (ENV_CLIENT_SECRET, " s3cret "),
        (ENV_REDIRECT_URI, "http://localhost:8765/callback"),
        (ENV_TIMEOUT_SECS, "10"),
    ]))
    .unwrap();

    assert_eq!(config.client_id, "abc");
    assert_eq!(config.client_secret, "s3cret");
    assert_eq!(
        config.redirect_uri.as_deref(),
        Some("http://localhost:8765/callback")
    );
    assert_eq!(config.timeout, Duration::from_secs(10));
}

#[test]
fn missing_variable_is_named() {
    let err = ClientConfig::from_env_with(env(&[(ENV_CLIENT_ID, "abc")])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains(ENV_CLIENT_SECRET));

    let err = ClientConfig::from_env_with(env(&[
        (ENV_CLIENT_ID, "   "),
        (ENV_CLIENT_SECRET, "s3cret"),
    ]))
    .unwrap_err();
    assert!(err.to_string().contains(ENV_CLIENT_ID));
}

#[test]
fn malformed_timeout_is_rejected() {
    let err = ClientConfig::from_env_with(env(&[
        (ENV_CLIENT_ID, "abc"),
        (ENV_CLIENT_SECRET, "s3cret"),
        (ENV_TIMEOUT_SECS, "soon"),
    ]))
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains(ENV_TIMEOUT_SECS));
}

#[test]
fn user_token_survives_restart_in_token_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::new("abc", "s3cret").with_token_dir(dir.path());

    let token = Token::new("user-access", "Bearer", Utc::now() + chrono::Duration::hours(1))
        .with_refresh_token("user-refresh");
    let first = EsoLogsClient::builder(config.clone())
        .persist_to_token_dir()
        .user_token(token.clone())
        .build()
        .unwrap();
    assert_eq!(first.mode(), AuthMode::User);
    assert!(dir.path().join(DEFAULT_TOKEN_FILE).exists());

    let restored = EsoLogsClient::builder(config.clone())
        .user_mode()
        .persist_to_token_dir()
        .build()
        .unwrap();
    assert_eq!(restored.token_state(), TokenState::Valid);
    assert_eq!(
        config.token_store().load(DEFAULT_TOKEN_KEY).unwrap(),
        Some(token)
    );

    restored.sign_out().unwrap();
    assert!(!dir.path().join(DEFAULT_TOKEN_FILE).exists());
}
