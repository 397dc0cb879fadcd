use serial_test::serial;
use std::env;

use ellx_sync::load_config::{authorization_token, load_remote_config};

fn clear_remote_env() {
    for key in ["ELLX_PROJECT", "GITHUB_REPOSITORY", "ELLX_URL", "ELLX_KEY", "ELLX_TS"] {
        env::remove_var(key);
    }
}

#[test]
fn token_is_owner_dashed_project_ts_and_key() {
    assert_eq!(
        authorization_token("acme/website", "1700000000", "s3cret"),
        "acme,acme-website,1700000000,s3cret"
    );
}

#[test]
fn token_dashes_only_the_first_slash() {
    assert_eq!(
        authorization_token("acme/a/b", "1", "k"),
        "acme,acme-a/b,1,k"
    );
}

#[test]
#[serial]
fn loads_config_from_environment() {
    clear_remote_env();
    env::set_var("ELLX_PROJECT", "acme/website");
    env::set_var("ELLX_KEY", "s3cret");
    env::set_var("ELLX_TS", "1700000000");
    env::set_var("ELLX_URL", "https://ellx.example/");

    let config = load_remote_config().expect("complete env should load");
    assert_eq!(config.project, "acme/website");
    assert_eq!(config.server, "https://ellx.example");
    assert_eq!(config.authorization, "acme,acme-website,1700000000,s3cret");

    clear_remote_env();
}

#[test]
#[serial]
fn falls_back_to_github_repository_for_the_project() {
    clear_remote_env();
    env::set_var("GITHUB_REPOSITORY", "acme/ci-checkout");
    env::set_var("ELLX_KEY", "k");
    env::set_var("ELLX_TS", "1");

    let config = load_remote_config().expect("GITHUB_REPOSITORY should suffice");
    assert_eq!(config.project, "acme/ci-checkout");
    assert_eq!(config.server, "https://api.ellx.io");

    clear_remote_env();
}

#[test]
#[serial]
fn missing_key_is_an_error() {
    clear_remote_env();
    env::set_var("ELLX_PROJECT", "acme/website");
    env::set_var("ELLX_TS", "1");

    let err = load_remote_config().expect_err("missing ELLX_KEY must fail");
    assert!(err.to_string().contains("ELLX_KEY"));

    clear_remote_env();
}
