//! Server configuration tests
//!
//! Serialized: parsing reads APP_* / PORT / LOG_LEVEL from the environment.

use clap::Parser;
use musiclib_server::config::{AppEnv, ServerConfig};
use serial_test::serial;
use std::env;

const SERVER_VARS: [&str; 5] = ["APP_ENV", "APP_URL", "APP_PORT", "PORT", "LOG_LEVEL"];

fn clear_env() {
    for var in SERVER_VARS {
        env::remove_var(var);
    }
}

fn parse(args: &[&str]) -> ServerConfig {
    let mut argv = vec!["musiclib"];
    argv.extend_from_slice(args);
    ServerConfig::try_parse_from(argv).expect("arguments should parse")
}

fn with_credentials(args: &[&'static str]) -> Vec<&'static str> {
    let mut all = vec!["--db-user", "musiclib", "--db-password", "secret", "--db-name", "catalog"];
    all.extend_from_slice(args);
    all
}

#[test]
#[serial]
fn test_defaults() {
    clear_env();
    let config = parse(&[]);

    assert_eq!(config.app_env, AppEnv::Dev);
    assert_eq!(config.listen_port(), 8080);
    assert_eq!(config.listen_addr(), "0.0.0.0:8080");
    assert_eq!(config.log_directive(), "debug");
}

#[test]
#[serial]
fn test_app_port_wins_over_port() {
    clear_env();
    env::set_var("PORT", "9000");
    assert_eq!(parse(&[]).listen_port(), 9000);

    env::set_var("APP_PORT", "9100");
    assert_eq!(parse(&[]).listen_port(), 9100);

    clear_env();
}

#[test]
#[serial]
fn test_ipv6_host_is_bracketed() {
    clear_env();
    let config = parse(&["--app-url", "::1", "--app-port", "3000"]);
    assert_eq!(config.listen_addr(), "[::1]:3000");
}

#[test]
#[serial]
fn test_env_selects_log_format_and_level() {
    clear_env();
    env::set_var("APP_ENV", "prod");
    let config = parse(&[]);
    assert_eq!(config.app_env, AppEnv::Prod);
    assert!(config.app_env.json_logs());
    assert_eq!(config.log_directive(), "info");

    let local = parse(&["--app-env", "local"]);
    assert!(!local.app_env.json_logs());
    assert_eq!(local.log_directive(), "debug");

    clear_env();
}

#[test]
#[serial]
fn test_log_level_override() {
    clear_env();
    env::set_var("LOG_LEVEL", "warn");
    assert_eq!(parse(&[]).log_directive(), "warn");
    clear_env();
}

#[test]
#[serial]
fn test_unknown_app_env_rejected() {
    clear_env();
    assert!(ServerConfig::try_parse_from(["musiclib", "--app-env", "staging"]).is_err());
}

#[test]
#[serial]
fn test_validate() {
    clear_env();
    for var in ["DB_USER", "DB_PASSWORD", "DB_NAME"] {
        env::remove_var(var);
    }

    assert!(parse(&[]).validate().is_err());
    assert!(parse(&with_credentials(&[])).validate().is_ok());
    assert!(parse(&with_credentials(&["--log-level", "info,musiclib=trace"]))
        .validate()
        .is_ok());
    assert!(parse(&with_credentials(&["--log-level", "musiclib=loud"]))
        .validate()
        .is_err());
}
