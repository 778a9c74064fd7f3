//! In-memory browser for exercising overlay resolution without a real
//! browser session.
//!
//! ## Example
//!
//! ```rust
//! use portal_probe::mock::{MockBrowser, MockNode, Mutation, Reaction};
//! use portal_probe::{BrowserHandle, Query};
//!
//! let mock = MockBrowser::new();
//! let button = mock.append_root(MockNode::new("button").text("Open"));
//! let panel = mock.append_root(MockNode::new("div").class("panel").hidden());
//! mock.on_click(button, Reaction::now(vec![Mutation::SetVisible(panel, true)]));
//!
//! mock.click(&button.handle()).unwrap();
//! assert!(mock.is_visible(&panel.handle()).unwrap());
//! ```

mod browser;
mod dom;
mod fixture;
mod selector;
pub mod strategies;

pub use browser::MockBrowser;
pub use dom::{MockId, MockNode, Mutation, Reaction};
pub use fixture::OverlayPage;
#[cfg(feature = "proptest")]
pub use strategies::visibility_layout;
