//! Result and error types for portal-probe.

use thiserror::Error;

/// Result type for portal-probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while resolving or driving overlays
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A required single-element query matched zero nodes
    #[error("No element matches {query}")]
    NotFound {
        /// Description of the query that matched nothing
        query: String,
    },

    /// A budget-bounded poll never satisfied its predicate
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Budget in milliseconds
        ms: u64,
        /// Description of what was waited for
        waited_for: String,
    },

    /// The overlay was still resolvable after the close action
    #[error("Overlay {marker} still visible after close ({ms}ms budget)")]
    OverlayNotClosed {
        /// Marker of the overlay kind that stayed open
        marker: String,
        /// Budget in milliseconds (0 = checked once)
        ms: u64,
    },

    /// An expand was requested on a control that has nothing to expand
    #[error("Control {control} cannot be expanded")]
    ControlNotExpandable {
        /// Description of the control
        control: String,
    },

    /// The node behind a handle was removed or re-rendered
    #[error("Stale node handle {handle}")]
    StaleHandle {
        /// Handle that went stale
        handle: String,
    },

    /// Browser-side failure reported by the driver
    #[error("Browser driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Operation called while the control is in the wrong state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Configuration rejected during validation or loading
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a not-found error
    #[must_use]
    pub fn not_found(query: impl std::fmt::Display) -> Self {
        Self::NotFound {
            query: query.to_string(),
        }
    }

    /// Create a stale-handle error
    #[must_use]
    pub fn stale(handle: impl std::fmt::Display) -> Self {
        Self::StaleHandle {
            handle: handle.to_string(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error comes from a handle invalidated by a re-render
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::StaleHandle { .. })
    }

    /// Whether this error is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
