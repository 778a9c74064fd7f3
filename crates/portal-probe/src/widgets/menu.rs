//! Menus and nested submenus

use super::is_true_attribute;
use crate::component::Component;
use crate::config::OverlayConfig;
use crate::control::{Association, CloseAction, OverlayBackedControl};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitBudget;
use tracing::debug;

/// Menu panel opened from a trigger.
///
/// Item lookups read the topmost menu panel, so once a submenu is expanded
/// its items shadow the parent's.
#[derive(Debug, Clone)]
pub struct Menu {
    control: OverlayBackedControl,
    budget: WaitBudget,
}

impl Menu {
    /// Menu opened by clicking `trigger`, closed through the backdrop
    #[must_use]
    pub fn new(trigger: Component, config: &OverlayConfig) -> Self {
        let control =
            OverlayBackedControl::new(trigger, config, Some(config.markers.menu_panel.clone()))
                .with_close_action(CloseAction::ClickBackdrop);
        Self {
            control,
            budget: config.default_budget(),
        }
    }

    /// Override the budget
    #[must_use]
    pub const fn with_budget(mut self, budget: WaitBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Underlying control
    #[must_use]
    pub const fn control(&self) -> &OverlayBackedControl {
        &self.control
    }

    /// Open the panel
    pub fn open(&self) -> ProbeResult<Component> {
        self.control.ensure_open(self.budget)
    }

    /// Items of the panel, opening it if needed
    pub fn items(&self) -> ProbeResult<Vec<MenuItem>> {
        let panel = self.open()?;
        let config = self.control.config();
        Ok(panel
            .query_all(&config.markers.menu_item)?
            .into_iter()
            .map(|c| MenuItem::new(c, config, self.budget))
            .collect())
    }

    /// Item labelled `text`
    pub fn item(&self, text: &str) -> ProbeResult<MenuItem> {
        for item in self.items()? {
            if item.text()? == text.trim() {
                return Ok(item);
            }
        }
        Err(ProbeError::not_found(
            self.control.config().markers.menu_item.clone().with_text(text),
        ))
    }

    /// Close through the backdrop and verify the panel is gone
    pub fn close(&self) -> ProbeResult<()> {
        self.control.close(self.budget, &[])
    }
}

/// Item of a menu panel
#[derive(Debug, Clone)]
pub struct MenuItem {
    component: Component,
    config: OverlayConfig,
    budget: WaitBudget,
}

impl MenuItem {
    fn new(component: Component, config: &OverlayConfig, budget: WaitBudget) -> Self {
        Self {
            component,
            config: config.clone(),
            budget,
        }
    }

    /// Underlying component
    #[must_use]
    pub const fn component(&self) -> &Component {
        &self.component
    }

    /// Trimmed label
    pub fn text(&self) -> ProbeResult<String> {
        Ok(self.component.text()?.trim().to_owned())
    }

    /// Whether the item opens a submenu
    pub fn is_expandable(&self) -> ProbeResult<bool> {
        Ok(self
            .component
            .attribute(&self.config.states.expandable_attribute)?
            .is_some_and(|v| !v.trim().eq_ignore_ascii_case("false")))
    }

    /// Whether the item is disabled
    pub fn is_disabled(&self) -> ProbeResult<bool> {
        is_true_attribute(&self.component, &self.config.states.disabled_attribute)
    }

    /// Click the item.
    ///
    /// # Errors
    ///
    /// `ProbeError::InvalidState` for a disabled item, before any click.
    pub fn click(&self) -> ProbeResult<()> {
        if self.is_disabled()? {
            return Err(ProbeError::invalid_state(format!(
                "menu item {:?} is disabled",
                self.text()?
            )));
        }
        debug!(item = %self.component.handle(), "clicking menu item");
        self.component.click()
    }

    /// Open the submenu behind this item.
    ///
    /// # Errors
    ///
    /// `ProbeError::ControlNotExpandable` before any dispatch when the item
    /// has no submenu; `ProbeError::Timeout` when the submenu does not show.
    pub fn expand(&self) -> ProbeResult<Menu> {
        let control = OverlayBackedControl::new(
            self.component.clone(),
            &self.config,
            Some(self.config.markers.menu_panel.clone()),
        )
        .with_association(Association::Nested)
        .with_close_action(CloseAction::ClickBackdrop);
        let submenu = control.open_expandable(self.budget, |_| self.is_expandable())?;
        if submenu.is_none() {
            return Err(ProbeError::Timeout {
                ms: self.budget.as_millis(),
                waited_for: format!("submenu of {}", self.text()?),
            });
        }
        Ok(Menu {
            control,
            budget: self.budget,
        })
    }
}
