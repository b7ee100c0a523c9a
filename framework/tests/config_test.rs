use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use std::sync::{Mutex, MutexGuard};

use atelier::config::{EnvConfig, RelayConfig, SiteConfig, DEFAULT_FALLBACK_RECIPIENT};

// Tests in this file mutate the process environment; hold this while doing so.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[test]
fn relay_config_loads_from_environment() {
    let _env = env_lock();
    std::env::set_var("RELAYTEST_SMTP_HOST", "smtp.example.com");
    std::env::set_var("RELAYTEST_SMTP_PORT", "465");
    std::env::set_var("RELAYTEST_SMTP_USER", "relay");
    std::env::set_var("RELAYTEST_SMTP_PASS", "secret");
    std::env::set_var("RELAYTEST_SMTP_FROM", "Studio <noreply@studio.example>");
    std::env::set_var("RELAYTEST_QUOTE_TO_EMAIL", "owner@studio.example");

    let config = RelayConfig::from_env_with_prefix("RELAYTEST").unwrap();

    assert!(config.is_complete());
    assert_eq!(config.recipient(), "owner@studio.example");

    let mailer = config.mailer_config().unwrap();
    assert_eq!(mailer.host, "smtp.example.com");
    assert_eq!(mailer.port, 465);
    assert_eq!(mailer.from, "Studio <noreply@studio.example>");

    for key in ["SMTP_HOST", "SMTP_PORT", "SMTP_USER", "SMTP_PASS", "SMTP_FROM", "QUOTE_TO_EMAIL"] {
        std::env::remove_var(format!("RELAYTEST_{key}"));
    }
}

#[test]
fn empty_environment_reports_every_required_key() {
    let _env = env_lock();
    let config = RelayConfig::from_env_with_prefix("RELAYEMPTY").unwrap();

    assert_eq!(
        config.missing(),
        vec!["SMTP_HOST", "SMTP_PORT", "SMTP_USER", "SMTP_PASS", "SMTP_FROM"]
    );
    assert_eq!(config.recipient(), DEFAULT_FALLBACK_RECIPIENT);
}

#[test]
fn fallback_recipient_is_configurable() {
    let _env = env_lock();
    std::env::set_var("RELAYFALLBACK_QUOTE_FALLBACK_EMAIL", "desk@studio.example");

    let config = RelayConfig::from_env_with_prefix("RELAYFALLBACK").unwrap();
    assert_eq!(config.recipient(), "desk@studio.example");

    std::env::remove_var("RELAYFALLBACK_QUOTE_FALLBACK_EMAIL");
}

#[test]
fn site_config_with_prefix() {
    let _env = env_lock();
    std::env::set_var("SITETEST_HOST", "127.0.0.1");
    std::env::set_var("SITETEST_PORT", "8081");
    std::env::set_var("SITETEST_SITE_DIR", "/srv/studio");

    let config = SiteConfig::from_env_with_prefix("SITETEST").unwrap();

    assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(config.port, 8081);
    assert_eq!(config.site_dir, PathBuf::from("/srv/studio"));
    assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8081");

    std::env::remove_var("SITETEST_HOST");
    std::env::remove_var("SITETEST_PORT");
    std::env::remove_var("SITETEST_SITE_DIR");
}

#[test]
fn site_config_defaults() {
    let _env = env_lock();
    let config = SiteConfig::from_env_with_prefix("SITEDEFAULTS").unwrap();

    assert!(config.host.is_unspecified());
    assert_eq!(config.port, 3000);
    assert_eq!(config.site_dir, PathBuf::from("public"));
}
