// ── Core error types ──
//
// User-facing errors from camtrap-core. Consumers never see HTTP status
// codes or JSON parse failures from the forecast provider directly: the
// `From<camtrap_api::Error>` impl folds them into `EnrichmentUnavailable`.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Startup errors ───────────────────────────────────────────────
    /// A per-site document is missing or malformed. Fatal to catalog load.
    #[error("Failed to load site catalog from {}: {reason}", path.display())]
    CatalogLoad { path: PathBuf, reason: String },

    /// The boundary document is missing or malformed. Callers degrade to
    /// an unbounded viewport.
    #[error("Failed to load region boundary from {}: {reason}", path.display())]
    BoundaryLoad { path: PathBuf, reason: String },

    // ── Interaction errors ───────────────────────────────────────────
    #[error("Malformed site label: {label:?}")]
    MalformedLabel { label: String },

    #[error("Site {id} not found (catalog holds {len} sites)")]
    NotFound { id: usize, len: usize },

    #[error("Region {region} has no sites")]
    EmptyRegion { region: String },

    #[error("Weather unavailable: {reason}")]
    EnrichmentUnavailable { reason: String },
}

impl CoreError {
    /// Per-interaction errors are recovered locally and never end the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedLabel { .. }
                | Self::NotFound { .. }
                | Self::EmptyRegion { .. }
                | Self::EnrichmentUnavailable { .. }
                | Self::BoundaryLoad { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<camtrap_api::Error> for CoreError {
    fn from(err: camtrap_api::Error) -> Self {
        let reason = match err {
            camtrap_api::Error::Transport(ref e) if e.is_timeout() => {
                "forecast request timed out".to_owned()
            }
            camtrap_api::Error::Transport(ref e) if e.is_connect() => {
                format!("cannot reach forecast provider: {e}")
            }
            camtrap_api::Error::Provider { reason, .. } => format!("provider rejected request: {reason}"),
            camtrap_api::Error::Deserialization { message, body: _ } => {
                format!("unreadable forecast: {message}")
            }
            other => other.to_string(),
        };
        Self::EnrichmentUnavailable { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_become_enrichment_unavailable() {
        let err = CoreError::from(camtrap_api::Error::Provider {
            status: 400,
            reason: "bad latitude".into(),
        });
        assert!(matches!(err, CoreError::EnrichmentUnavailable { ref reason } if reason.contains("bad latitude")));
        assert!(err.is_recoverable());
    }

    #[test]
    fn catalog_errors_are_fatal() {
        let err = CoreError::CatalogLoad {
            path: PathBuf::from("sites/Assirik/a.json"),
            reason: "missing field `latlon`".into(),
        };
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("Assirik/a.json"));
    }
}
