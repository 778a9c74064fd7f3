//! Browser capability consumed by the resolution layer.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  BrowserHandle (trait)                                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  WebDriver / CDP session        MockBrowser (in-memory DOM)   │
//! │  (supplied by the caller)       (tests, demos)                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Node handles are capabilities that can fail on use: any call taking a
//! [`NodeHandle`] may return [`ProbeError::StaleHandle`] once the document
//! has re-rendered the node away.
//!
//! [`ProbeError::StaleHandle`]: crate::ProbeError::StaleHandle

use crate::query::Query;
use crate::result::ProbeResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Opaque reference to a live DOM node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeHandle(String);

impl NodeHandle {
    /// Wrap a driver-specific element reference
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Driver-specific element reference
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// DOM query and action primitives of one automated browser session.
///
/// A `context` of `None` means the document root.
pub trait BrowserHandle: fmt::Debug + Send + Sync {
    /// Find the first node matching `query`.
    ///
    /// # Errors
    ///
    /// `ProbeError::NotFound` when nothing matches, `ProbeError::StaleHandle`
    /// when `context` is no longer attached.
    fn find(&self, context: Option<&NodeHandle>, query: &Query) -> ProbeResult<NodeHandle>;

    /// Find all nodes matching `query`, in document order
    fn find_all(&self, context: Option<&NodeHandle>, query: &Query)
        -> ProbeResult<Vec<NodeHandle>>;

    /// Whether the node is rendered and not hidden by style or attribute
    fn is_visible(&self, node: &NodeHandle) -> ProbeResult<bool>;

    /// Attribute value, `None` when absent
    fn attribute(&self, node: &NodeHandle, name: &str) -> ProbeResult<Option<String>>;

    /// Rendered text content
    fn text(&self, node: &NodeHandle) -> ProbeResult<String>;

    /// Dispatch a click
    fn click(&self, node: &NodeHandle) -> ProbeResult<()>;

    /// Dispatch keyboard input
    fn send_keys(&self, node: &NodeHandle, text: &str) -> ProbeResult<()>;

    /// Suspend the calling thread; only the wait protocol calls this
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Browser session shared by every component created from it
pub type SharedBrowser = Arc<dyn BrowserHandle>;

/// WebDriver key codes used by close strategies
pub mod keys {
    /// Escape key
    pub const ESCAPE: &str = "\u{E00C}";
    /// Enter key
    pub const ENTER: &str = "\u{E007}";
    /// Tab key
    pub const TAB: &str = "\u{E004}";
}
