//! Ready-made overlay page layout.

use super::browser::MockBrowser;
use super::dom::{MockId, MockNode};
use crate::browser::SharedBrowser;
use std::sync::Arc;

/// A document with an empty `.cdk-overlay-container` under the body
#[derive(Debug, Clone)]
pub struct OverlayPage {
    /// The mock session
    pub browser: Arc<MockBrowser>,
    /// Page content root (`main`)
    pub main: MockId,
    /// The overlay container
    pub container: MockId,
}

impl OverlayPage {
    /// Build the empty page
    #[must_use]
    pub fn new() -> Self {
        let browser = Arc::new(MockBrowser::new());
        let main = browser.append_root(MockNode::new("main"));
        let container = browser.append_root(MockNode::new("div").class("cdk-overlay-container"));
        Self {
            browser,
            main,
            container,
        }
    }

    /// The session as a trait object
    #[must_use]
    pub fn shared(&self) -> SharedBrowser {
        self.browser.clone()
    }

    /// Append an overlay pane to the container
    pub fn add_pane(&self, visible: bool) -> MockId {
        let node = MockNode::new("div").class("cdk-overlay-pane");
        self.browser
            .append(self.container, if visible { node } else { node.hidden() })
    }

    /// Append a pane that is not mounted yet
    pub fn add_unmounted_pane(&self) -> MockId {
        self.browser
            .append_detached(self.container, MockNode::new("div").class("cdk-overlay-pane"))
    }

    /// Append a backdrop to the container
    pub fn add_backdrop(&self, visible: bool) -> MockId {
        let node = MockNode::new("div").class("cdk-overlay-backdrop");
        self.browser
            .append(self.container, if visible { node } else { node.hidden() })
    }
}

impl Default for OverlayPage {
    fn default() -> Self {
        Self::new()
    }
}
