//! Error types for the VereinOnline client.

use crate::models::MailTemplate;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
/// Error type for all client operations.
pub enum Error {
    /// Underlying HTTP client error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Transport failure reported by a non-reqwest backend.
    #[error("network error: {0}")]
    Network(String),
    /// HTTP response returned a non-success status with body.
    #[error("unexpected status {}: {body}", format_status(.status))]
    Status { status: StatusCode, body: String },
    /// The server answered with an `{"error": ...}` envelope.
    #[error("remote error: {0}")]
    Remote(String),
    /// The response did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// A caller-supplied value cannot be sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The server rejected the credentials.
    #[error("authentication error: {0}")]
    Auth(String),
    /// Login verification failed; the session token has been cleared.
    #[error("login failed: {0}")]
    Login(#[source] Box<Error>),
    /// An HTML page no longer has the structure the scraper relies on.
    #[error("unexpected page structure: {reason}")]
    Scrape { reason: String, html: String },
    /// Resetting a template to its default failed.
    #[error("failed to reset template to default: {0}")]
    Reset(#[source] Box<Error>),
    /// Reading a template back after saving returned different content.
    #[error("template {:?} was not saved as submitted", .expected.name)]
    SaveVerification {
        expected: Box<MailTemplate>,
        actual: Box<MailTemplate>,
    },
    /// The statically declared templates of a category differ from the
    /// templates the server lists.
    #[error(
        "template mapping is out of date (unexpected: [{}], missing: [{}])",
        .unexpected.join(", "),
        .missing.join(", ")
    )]
    MappingOutOfDate {
        unexpected: Vec<String>,
        missing: Vec<String>,
    },
    /// No template of a category yielded a navigation list.
    #[error("could not fetch template names ({} attempts failed)", .0.len())]
    TemplateNames(Vec<Error>),
    /// A redirect chain exceeded the configured hop limit.
    #[error("too many redirects (max {max})")]
    TooManyRedirects { max: usize },
    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_status(status: &StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

impl Error {
    pub(crate) fn scrape(reason: impl Into<String>, html: &str) -> Self {
        Error::Scrape {
            reason: reason.into(),
            html: html.to_string(),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
