//! Error types for mail-assist.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Mail transport errors.
///
/// Fetch and send failures are deliberately distinct variants: the upstream
/// behavior treated them asymmetrically (fetch failures propagated, send
/// failures collapsed to a boolean), and callers need to tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("IMAP connection to {host}:{port} failed: {reason}")]
    ImapConnect {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("IMAP authentication failed for {user}")]
    ImapAuth { user: String },

    #[error("IMAP fetch from folder {folder} failed: {reason}")]
    Fetch { folder: String, reason: String },

    #[error("Failed to build outgoing message: {0}")]
    BuildMessage(String),

    #[error("SMTP send failed: {0}")]
    Send(String),

    #[error("Fetch task panicked: {0}")]
    TaskJoin(String),
}
