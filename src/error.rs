//! Error types.

use reqwest::StatusCode;
use trust_dns_proto::error::ProtoError;

/// Error enumerates the possible DNS Bot error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a [`Config`][`crate::config::Config`] loads as valid JSON but holds values
    /// the bot can't run with, e.g. an empty Discord token or a TLS upstream without a TLS name.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when [trying to load a `Config`][crate::config::Config::try_from_file] fails
    /// due to invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when the exchange with the upstream resolver fails, e.g. a timeout, a refused
    /// connection or a failed TLS handshake.
    #[error("DNS error: {0}")]
    DNSError(#[from] ProtoError),

    /// Returned when a Discord API call fails.
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// Returned when the [stats endpoint][crate::stats] can't be reached.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Returned when the [stats endpoint][crate::stats] answers with anything but `200 OK`.
    #[error("unexpected HTTP status code {0}")]
    UnexpectedStatus(StatusCode),
}
