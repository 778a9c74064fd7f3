//! Typed wrapper over a single DOM node.
//!
//! A [`Component`] pairs one [`NodeHandle`] with the session it came from.
//! It is immutable: re-querying yields fresh components, nothing is cached.

use crate::browser::{NodeHandle, SharedBrowser};
use crate::query::Query;
use crate::result::ProbeResult;
use std::fmt;
use std::sync::Arc;

/// One DOM node bound to its browser session
#[derive(Clone)]
pub struct Component {
    handle: NodeHandle,
    browser: SharedBrowser,
}

/// Types that can be built from a [`Component`]
pub trait FromComponent: Sized {
    /// Wrap the component
    fn from_component(component: Component) -> Self;
}

impl Component {
    /// Bind a handle to its session
    #[must_use]
    pub fn new(handle: NodeHandle, browser: SharedBrowser) -> Self {
        Self { handle, browser }
    }

    /// Find a single node from the document root
    pub fn root_query(browser: &SharedBrowser, query: &Query) -> ProbeResult<Self> {
        let handle = browser.find(None, query)?;
        Ok(Self::new(handle, Arc::clone(browser)))
    }

    /// Find all nodes from the document root
    pub fn root_query_all(browser: &SharedBrowser, query: &Query) -> ProbeResult<Vec<Self>> {
        Ok(browser
            .find_all(None, query)?
            .into_iter()
            .map(|handle| Self::new(handle, Arc::clone(browser)))
            .collect())
    }

    /// Underlying node handle
    #[must_use]
    pub const fn handle(&self) -> &NodeHandle {
        &self.handle
    }

    /// Session this component belongs to
    #[must_use]
    pub const fn browser(&self) -> &SharedBrowser {
        &self.browser
    }

    /// Resolve exactly one descendant.
    ///
    /// # Errors
    ///
    /// `ProbeError::NotFound` if zero descendants match.
    pub fn query(&self, query: &Query) -> ProbeResult<Self> {
        let handle = self.browser.find(Some(&self.handle), query)?;
        Ok(self.sibling(handle))
    }

    /// Resolve zero or more descendants; an empty list is not an error
    pub fn query_all(&self, query: &Query) -> ProbeResult<Vec<Self>> {
        Ok(self
            .browser
            .find_all(Some(&self.handle), query)?
            .into_iter()
            .map(|handle| self.sibling(handle))
            .collect())
    }

    /// Whether at least one descendant matches
    pub fn exists(&self, query: &Query) -> ProbeResult<bool> {
        Ok(!self.browser.find_all(Some(&self.handle), query)?.is_empty())
    }

    /// Typed conversion through a factory
    pub fn as_typed<T>(&self, factory: impl FnOnce(NodeHandle, SharedBrowser) -> T) -> T {
        factory(self.handle.clone(), Arc::clone(&self.browser))
    }

    /// Typed conversion through [`FromComponent`]
    #[must_use]
    pub fn to<T: FromComponent>(&self) -> T {
        T::from_component(self.clone())
    }

    /// Click this node
    pub fn click(&self) -> ProbeResult<()> {
        self.browser.click(&self.handle)
    }

    /// Type into this node
    pub fn send_keys(&self, text: &str) -> ProbeResult<()> {
        self.browser.send_keys(&self.handle, text)
    }

    /// Attribute value, `None` when absent
    pub fn attribute(&self, name: &str) -> ProbeResult<Option<String>> {
        self.browser.attribute(&self.handle, name)
    }

    /// Rendered text
    pub fn text(&self) -> ProbeResult<String> {
        self.browser.text(&self.handle)
    }

    /// Whether the node is rendered and not hidden
    pub fn is_visible(&self) -> ProbeResult<bool> {
        self.browser.is_visible(&self.handle)
    }

    /// Class list from the `class` attribute
    pub fn classes(&self) -> ProbeResult<Vec<String>> {
        Ok(self
            .attribute("class")?
            .map(|c| c.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default())
    }

    /// Whether the `class` attribute contains `name`
    pub fn has_class(&self, name: &str) -> ProbeResult<bool> {
        Ok(self.classes()?.iter().any(|c| c == name))
    }

    fn sibling(&self, handle: NodeHandle) -> Self {
        Self::new(handle, Arc::clone(&self.browser))
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle && Arc::ptr_eq(&self.browser, &other.browser)
    }
}

impl Eq for Component {}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl FromComponent for Component {
    fn from_component(component: Component) -> Self {
        component
    }
}
