//! Overlay resolution
//!
//! Overlays (option panels, menus, calendars, dialogs) are mounted under one
//! document-level host, far from the element that opened them. Several may
//! be mounted at once: remnants of earlier interactions linger until the
//! application garbage-collects them.
//!
//! ```text
//! body
//! ├── main ... <button trigger>
//! └── .cdk-overlay-container          <- overlay root
//!     ├── .cdk-overlay-pane (hidden)  <- stale remnant
//!     ├── .cdk-overlay-pane           <- visible
//!     └── .cdk-overlay-pane           <- visible, last = topmost
//!         └── .mat-mdc-select-panel   <- kind marker match
//! ```
//!
//! Resolution is one synchronous pass over the current document; absence is
//! `None`, never an error. Topmost means last in document order.

use crate::browser::SharedBrowser;
use crate::component::Component;
use crate::config::OverlayConfig;
use crate::query::Query;
use crate::result::ProbeResult;
use std::sync::Arc;
use tracing::trace;

/// Root of one portal-rendered subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayContainer {
    component: Component,
    visible: bool,
}

impl OverlayContainer {
    /// The container node
    #[must_use]
    pub const fn component(&self) -> &Component {
        &self.component
    }

    /// Unwrap into the container node
    #[must_use]
    pub fn into_component(self) -> Component {
        self.component
    }

    /// Visibility at resolution time
    #[must_use]
    pub const fn visible(&self) -> bool {
        self.visible
    }
}

/// Finds the overlay container a user would currently interact with
#[derive(Debug, Clone)]
pub struct OverlayResolver {
    browser: SharedBrowser,
    host_marker: Query,
}

impl OverlayResolver {
    /// Resolver using the configured host marker
    #[must_use]
    pub fn new(browser: SharedBrowser, config: &OverlayConfig) -> Self {
        Self::with_host_marker(browser, config.host_marker.clone())
    }

    /// Resolver with an explicit host marker
    #[must_use]
    pub fn with_host_marker(browser: SharedBrowser, host_marker: Query) -> Self {
        Self {
            browser,
            host_marker,
        }
    }

    /// Session this resolver queries
    #[must_use]
    pub const fn browser(&self) -> &SharedBrowser {
        &self.browser
    }

    /// Every overlay host under `root`, visible or not, in document order
    pub fn find_containers(&self, root: &Query) -> ProbeResult<Vec<OverlayContainer>> {
        let mut containers = Vec::new();
        for root_node in self.browser.find_all(None, root)? {
            for handle in self.browser.find_all(Some(&root_node), &self.host_marker)? {
                let visible = self.browser.is_visible(&handle)?;
                containers.push(OverlayContainer {
                    component: Component::new(handle, Arc::clone(&self.browser)),
                    visible,
                });
            }
        }
        Ok(containers)
    }

    /// Visible overlay hosts under `root`, in document order
    pub fn find_visible_containers(&self, root: &Query) -> ProbeResult<Vec<OverlayContainer>> {
        let mut containers = self.find_containers(root)?;
        containers.retain(OverlayContainer::visible);
        Ok(containers)
    }

    /// The last visible overlay host in document order
    pub fn find_top_visible_container(&self, root: &Query) -> ProbeResult<Option<OverlayContainer>> {
        let top = self.find_visible_containers(root)?.pop();
        trace!(
            %root,
            found = top.is_some(),
            "resolved top overlay container"
        );
        Ok(top)
    }
}

/// Narrows the topmost container to an element of one overlay kind
#[derive(Debug, Clone)]
pub struct NamedOverlayResolver {
    resolver: OverlayResolver,
}

impl NamedOverlayResolver {
    /// Named resolver using the configured host marker
    #[must_use]
    pub fn new(browser: SharedBrowser, config: &OverlayConfig) -> Self {
        Self::from_resolver(OverlayResolver::new(browser, config))
    }

    /// Wrap an existing container resolver
    #[must_use]
    pub const fn from_resolver(resolver: OverlayResolver) -> Self {
        Self { resolver }
    }

    /// Underlying container resolver
    #[must_use]
    pub const fn resolver(&self) -> &OverlayResolver {
        &self.resolver
    }

    /// Session this resolver queries
    #[must_use]
    pub const fn browser(&self) -> &SharedBrowser {
        self.resolver.browser()
    }

    /// Topmost visible overlay, narrowed to `kind_marker` when given.
    ///
    /// With a marker, returns the most deeply nested match inside the
    /// topmost container (the last such match in document order), or `None`
    /// when the container holds no match.
    pub fn find_top_visible_overlay(
        &self,
        root: &Query,
        kind_marker: Option<&Query>,
    ) -> ProbeResult<Option<Component>> {
        let Some(container) = self.resolver.find_top_visible_container(root)? else {
            return Ok(None);
        };
        let Some(marker) = kind_marker else {
            return Ok(Some(container.into_component()));
        };
        innermost_match(container.component(), marker)
    }

    /// Topmost overlay of a kind, accepted only if it belongs to `trigger`.
    ///
    /// A trigger declaring `aria-controls` or `aria-owns` owns the overlay
    /// whose id (or a descendant's id) matches. Triggers without either
    /// attribute own whatever overlay is on top.
    pub fn find_overlay_for(
        &self,
        trigger: &Component,
        root: &Query,
        kind_marker: Option<&Query>,
    ) -> ProbeResult<Option<Component>> {
        let Some(overlay) = self.find_top_visible_overlay(root, kind_marker)? else {
            return Ok(None);
        };
        let owned = match owned_id(trigger)? {
            None => true,
            Some(id) => {
                overlay.attribute("id")?.as_deref() == Some(id.as_str())
                    || overlay.exists(&Query::css(format!("[id=\"{id}\"]")))?
            }
        };
        trace!(trigger = %trigger.handle(), owned, "checked overlay ownership");
        Ok(owned.then_some(overlay))
    }
}

fn owned_id(trigger: &Component) -> ProbeResult<Option<String>> {
    for name in ["aria-controls", "aria-owns"] {
        if let Some(id) = trigger.attribute(name)? {
            let id = id.trim();
            if !id.is_empty() {
                return Ok(Some(id.to_owned()));
            }
        }
    }
    Ok(None)
}

/// Last match under `scope` that contains no further match
fn innermost_match(scope: &Component, marker: &Query) -> ProbeResult<Option<Component>> {
    let mut innermost = None;
    for candidate in scope.query_all(marker)? {
        if !candidate.exists(marker)? {
            innermost = Some(candidate);
        }
    }
    Ok(innermost)
}
