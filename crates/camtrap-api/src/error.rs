use thiserror::Error;

/// Top-level error type for the `camtrap-api` crate.
///
/// Covers every failure mode of a forecast request: transport, HTTP status,
/// provider-reported errors, and payload shape. `camtrap-core` folds all of
/// these into a single "weather unavailable" state.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Provider ────────────────────────────────────────────────────
    /// The provider answered with `{"error": true, "reason": "..."}`.
    #[error("Forecast provider error (HTTP {status}): {reason}")]
    Provider { status: u16, reason: String },

    /// Non-success status without a structured reason.
    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The hourly arrays disagree in length or a required array is missing.
    #[error("Malformed hourly series: {0}")]
    MalformedSeries(String),
}

impl Error {
    /// HTTP status attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Provider { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
