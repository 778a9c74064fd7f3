//! Auto-hiding snack-bar notifications

use crate::browser::SharedBrowser;
use crate::component::Component;
use crate::config::OverlayConfig;
use crate::overlay::NamedOverlayResolver;
use crate::query::Query;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{await_absent, await_some, WaitBudget};

/// Snack-bar style overlay that appears and dismisses on its own.
///
/// There is no trigger, so this uses the resolver and the wait protocol
/// directly instead of a control.
#[derive(Debug, Clone)]
pub struct Notification {
    resolver: NamedOverlayResolver,
    config: OverlayConfig,
    budget: WaitBudget,
}

impl Notification {
    /// Watch for snack-bars in `browser`
    #[must_use]
    pub fn new(browser: SharedBrowser, config: &OverlayConfig) -> Self {
        Self {
            resolver: NamedOverlayResolver::new(browser, config),
            config: config.clone(),
            budget: config.default_budget(),
        }
    }

    /// Override the budget
    #[must_use]
    pub const fn with_budget(mut self, budget: WaitBudget) -> Self {
        self.budget = budget;
        self
    }

    fn marker(&self) -> &Query {
        &self.config.markers.snackbar
    }

    fn current(&self) -> ProbeResult<Option<Component>> {
        self.resolver
            .find_top_visible_overlay(&self.config.overlay_root, Some(self.marker()))
    }

    /// Whether a notification is showing right now
    pub fn is_visible(&self) -> ProbeResult<bool> {
        Ok(self.current()?.is_some())
    }

    /// Wait for a notification to show.
    ///
    /// # Errors
    ///
    /// `ProbeError::Timeout` when none shows within the budget.
    pub fn wait_visible(&self) -> ProbeResult<Component> {
        let options = self.config.wait_options(self.budget);
        await_some(
            self.resolver.browser().as_ref(),
            &options,
            &self.marker().to_string(),
            || self.current(),
        )
    }

    /// Wait for a notification and return its trimmed text
    pub fn wait_text(&self) -> ProbeResult<String> {
        Ok(self.wait_visible()?.text()?.trim().to_owned())
    }

    /// Wait for the notification to go away.
    ///
    /// # Errors
    ///
    /// `ProbeError::Timeout` when it is still showing after the budget.
    pub fn wait_dismissed(&self) -> ProbeResult<()> {
        let options = self.config.wait_options(self.budget);
        let gone = await_absent(
            self.resolver.browser().as_ref(),
            &options,
            &self.marker().to_string(),
            || self.is_visible(),
        )?;
        if gone {
            Ok(())
        } else {
            Err(ProbeError::Timeout {
                ms: 0,
                waited_for: format!("{} to dismiss", self.marker()),
            })
        }
    }
}
