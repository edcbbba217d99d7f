//! Configuration types.

use secrecy::SecretString;
use serde::Serialize;

use crate::error::ConfigError;

/// Mailbox + server configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Account address, also used as the SMTP From.
    pub email_address: String,
    pub imap_server: String,
    pub imap_port: u16,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub use_ssl: bool,
    /// Mailbox password (app password for Gmail-style providers).
    pub password: SecretString,
    /// HTTP bind address for the API server.
    pub bind_addr: String,
}

/// `/config` endpoint view — everything except the password.
#[derive(Debug, Clone, Serialize)]
pub struct RedactedConfig {
    pub email_address: String,
    pub imap_server: String,
    pub imap_port: u16,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub use_ssl: bool,
}

impl MailConfig {
    /// Build config from environment variables, with Gmail defaults.
    ///
    /// Credentials may be absent here — they are only required once a
    /// fetch or send is attempted (see [`MailConfig::ensure_credentials`]).
    pub fn from_env() -> Self {
        let imap_server =
            std::env::var("IMAP_SERVER").unwrap_or_else(|_| "imap.gmail.com".to_string());

        let imap_port: u16 = std::env::var("IMAP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(993);

        let smtp_server =
            std::env::var("SMTP_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string());

        let smtp_port: u16 = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        let use_ssl = std::env::var("USE_SSL")
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(true);

        let email_address = std::env::var("EMAIL_ADDRESS").unwrap_or_default();
        let password = SecretString::from(std::env::var("EMAIL_PASSWORD").unwrap_or_default());

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        Self {
            email_address,
            imap_server,
            imap_port,
            smtp_server,
            smtp_port,
            use_ssl,
            password,
            bind_addr,
        }
    }

    /// Fail fast when the mailbox credentials are not configured.
    pub fn ensure_credentials(&self) -> Result<(), ConfigError> {
        use secrecy::ExposeSecret;

        if self.email_address.is_empty() || self.password.expose_secret().is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "EMAIL_ADDRESS / EMAIL_PASSWORD".to_string(),
                hint: "Set the EMAIL_ADDRESS and EMAIL_PASSWORD environment variables".to_string(),
            });
        }
        Ok(())
    }

    pub fn redacted(&self) -> RedactedConfig {
        RedactedConfig {
            email_address: self.email_address.clone(),
            imap_server: self.imap_server.clone(),
            imap_port: self.imap_port,
            smtp_server: self.smtp_server.clone(),
            smtp_port: self.smtp_port,
            use_ssl: self.use_ssl,
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_config() -> MailConfig {
        MailConfig {
            email_address: String::new(),
            imap_server: "imap.gmail.com".into(),
            imap_port: 993,
            smtp_server: "smtp.gmail.com".into(),
            smtp_port: 587,
            use_ssl: true,
            password: SecretString::from(String::new()),
            bind_addr: "0.0.0.0:8000".into(),
        }
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let config = blank_config();
        assert!(config.ensure_credentials().is_err());
    }

    #[test]
    fn present_credentials_pass() {
        let mut config = blank_config();
        config.email_address = "test@gmail.com".into();
        config.password = SecretString::from("secret".to_string());
        assert!(config.ensure_credentials().is_ok());
    }

    #[test]
    fn redacted_view_omits_password() {
        let mut config = blank_config();
        config.email_address = "test@gmail.com".into();
        config.password = SecretString::from("secret".to_string());

        let json = serde_json::to_value(config.redacted()).unwrap();
        assert_eq!(json["email_address"], "test@gmail.com");
        assert_eq!(json["imap_port"], 993);
        assert_eq!(json["smtp_port"], 587);
        assert!(json.get("password").is_none());
    }
}
