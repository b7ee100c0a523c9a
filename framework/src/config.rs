//! Environment backed configuration.
//!
//! Everything is read once at startup and handed to the router as explicit
//! state; request handlers never consult the process environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Deserialize;

pub use config::ConfigError;

use crate::mail::{MailError, MailerConfig};

/// Destination used when `QUOTE_TO_EMAIL` is not set and no fallback is configured.
pub const DEFAULT_FALLBACK_RECIPIENT: &str = "quotes@studio.example";

pub trait EnvConfig: Sized {
    fn from_env() -> Result<Self, ConfigError>;
    fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError>;
}

impl<D> EnvConfig for D
where
    D: DeserializeOwned,
{
    fn from_env() -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix(prefix))
            .build()?
            .try_deserialize()
    }
}

/// Load a `.env` file from the working directory, if there is one.
///
/// Variables already present in the environment win.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("ignoring unreadable .env file: {}", e),
    }
}

/// Settings for relaying quote requests by email.
///
/// | Variable | Required | Description |
/// |----------|----------|-------------|
/// | `SMTP_HOST` | Yes | SMTP relay hostname |
/// | `SMTP_PORT` | Yes | Port; 465 selects implicit TLS |
/// | `SMTP_USER` | Yes | Username for authentication |
/// | `SMTP_PASS` | Yes | Password for authentication |
/// | `SMTP_FROM` | Yes | Sender address |
/// | `QUOTE_TO_EMAIL` | No | Destination mailbox override |
/// | `QUOTE_FALLBACK_EMAIL` | No | Destination when no override is set (default [`DEFAULT_FALLBACK_RECIPIENT`]) |
///
/// Blank values are treated as absent.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: Option<String>,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub smtp_from: Option<String>,
    pub quote_to_email: Option<String>,
    #[serde(default = "default_fallback_recipient")]
    pub quote_fallback_email: String,
}

fn default_fallback_recipient() -> String {
    DEFAULT_FALLBACK_RECIPIENT.to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            smtp_host: None,
            smtp_port: None,
            smtp_user: None,
            smtp_pass: None,
            smtp_from: None,
            quote_to_email: None,
            quote_fallback_email: default_fallback_recipient(),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl RelayConfig {
    /// Read the relay settings from the unprefixed process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env()
    }

    /// Names of the required variables that are absent or blank.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("SMTP_HOST", &self.smtp_host),
            ("SMTP_PORT", &self.smtp_port),
            ("SMTP_USER", &self.smtp_user),
            ("SMTP_PASS", &self.smtp_pass),
            ("SMTP_FROM", &self.smtp_from),
        ]
        .into_iter()
        .filter(|(_, value)| present(value).is_none())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// The mailbox quote requests are delivered to.
    pub fn recipient(&self) -> String {
        present(&self.quote_to_email)
            .or_else(|| Some(self.quote_fallback_email.trim()).filter(|v| !v.is_empty()))
            .unwrap_or(DEFAULT_FALLBACK_RECIPIENT)
            .to_string()
    }

    /// Transport settings, or [`MailError::MissingConfig`] naming what is absent.
    pub fn mailer_config(&self) -> Result<MailerConfig, MailError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(MailError::MissingConfig(missing.join(", ")));
        }

        let field = |value: &Option<String>| present(value).unwrap_or_default().to_string();

        let port = field(&self.smtp_port);
        let port: u16 = port
            .parse()
            .map_err(|_| MailError::MissingConfig(format!("SMTP_PORT is not a port: {port}")))?;

        Ok(MailerConfig {
            host: field(&self.smtp_host),
            port,
            username: field(&self.smtp_user),
            password: field(&self.smtp_pass),
            from: field(&self.smtp_from),
        })
    }
}

/// Where the HTTP server listens and which directory holds the built pages.
///
/// Read from `ATELIER_HOST`, `ATELIER_PORT` and `ATELIER_SITE_DIR`.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_site_dir")]
    pub site_dir: PathBuf,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3000
}

fn default_site_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            host: default_host(),
            port: default_port(),
            site_dir: default_site_dir(),
        }
    }
}

impl SiteConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env_with_prefix("ATELIER")
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> RelayConfig {
        RelayConfig {
            smtp_host: Some("smtp.example.com".into()),
            smtp_port: Some("587".into()),
            smtp_user: Some("relay".into()),
            smtp_pass: Some("secret".into()),
            smtp_from: Some("Studio <noreply@example.com>".into()),
            ..RelayConfig::default()
        }
    }

    #[test]
    fn complete_config_has_nothing_missing() {
        let config = complete();
        assert!(config.is_complete());

        let mailer = config.mailer_config().unwrap();
        assert_eq!(mailer.host, "smtp.example.com");
        assert_eq!(mailer.port, 587);
        assert_eq!(mailer.username, "relay");
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = RelayConfig {
            smtp_pass: Some("   ".into()),
            smtp_from: None,
            ..complete()
        };

        assert_eq!(config.missing(), vec!["SMTP_PASS", "SMTP_FROM"]);
        assert!(matches!(
            config.mailer_config(),
            Err(MailError::MissingConfig(keys)) if keys == "SMTP_PASS, SMTP_FROM"
        ));
    }

    #[test]
    fn non_numeric_port_is_a_config_error() {
        let config = RelayConfig {
            smtp_port: Some("smtp".into()),
            ..complete()
        };

        assert!(matches!(config.mailer_config(), Err(MailError::MissingConfig(_))));
    }

    #[test]
    fn mailer_config_trims_surrounding_whitespace() {
        let config = RelayConfig {
            smtp_host: Some("  smtp.example.com\n".into()),
            smtp_port: Some(" 465 ".into()),
            smtp_from: Some("\tStudio <noreply@example.com> ".into()),
            ..complete()
        };

        let mailer = config.mailer_config().unwrap();
        assert_eq!(mailer.host, "smtp.example.com");
        assert_eq!(mailer.port, 465);
        assert_eq!(mailer.from, "Studio <noreply@example.com>");
    }

    #[test]
    fn recipient_prefers_override() {
        let config = RelayConfig {
            quote_to_email: Some("owner@example.com".into()),
            ..complete()
        };
        assert_eq!(config.recipient(), "owner@example.com");
    }

    #[test]
    fn recipient_falls_back() {
        let config = RelayConfig {
            quote_to_email: Some("".into()),
            quote_fallback_email: "inbox@example.com".into(),
            ..complete()
        };
        assert_eq!(config.recipient(), "inbox@example.com");

        assert_eq!(RelayConfig::default().recipient(), DEFAULT_FALLBACK_RECIPIENT);
    }
}
