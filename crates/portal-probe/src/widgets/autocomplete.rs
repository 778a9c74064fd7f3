//! Autocomplete input with an overlay suggestion panel

use super::{option_by_text, options_in, texts, OverlayOption};
use crate::component::Component;
use crate::config::OverlayConfig;
use crate::control::{CloseAction, OpenAction, OverlayBackedControl};
use crate::result::ProbeResult;
use crate::wait::WaitBudget;
use tracing::debug;

/// Text input whose suggestions render in the overlay layer
#[derive(Debug, Clone)]
pub struct Autocomplete {
    control: OverlayBackedControl,
    budget: WaitBudget,
}

impl Autocomplete {
    /// Autocomplete driven through `input`
    #[must_use]
    pub fn new(input: Component, config: &OverlayConfig) -> Self {
        let control = OverlayBackedControl::new(
            input,
            config,
            Some(config.markers.autocomplete_panel.clone()),
        )
        .with_open_action(OpenAction::ClickTrigger)
        .with_close_action(CloseAction::PressEscape);
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

    /// Focus the input and wait for the panel
    pub fn open(&self) -> ProbeResult<Component> {
        self.control.ensure_open(self.budget)
    }

    /// Type `text` and wait for the suggestion panel.
    ///
    /// Typing always happens, even when the panel is already showing.
    pub fn type_and_open(&self, text: &str) -> ProbeResult<Component> {
        debug!(text, "typing into autocomplete");
        self.control.trigger().send_keys(text)?;
        self.control.await_open(self.budget)
    }

    /// Suggestion rows of the showing panel
    pub fn options(&self) -> ProbeResult<Vec<OverlayOption>> {
        let panel = self.control.await_open(self.budget)?;
        let config = self.control.config();
        options_in(&panel, &config.markers.option, &config.states)
    }

    /// Suggestion labels of the showing panel
    pub fn suggestions(&self) -> ProbeResult<Vec<String>> {
        texts(&self.options()?)
    }

    /// Pick the suggestion labelled `text` and wait for the panel to close
    pub fn pick(&self, text: &str) -> ProbeResult<()> {
        let option = option_by_text(self.options()?, &self.control.config().markers.option, text)?;
        option.click()?;
        self.control.await_closed(self.budget)
    }

    /// Current `value` of the input
    pub fn value(&self) -> ProbeResult<String> {
        Ok(self
            .control
            .trigger()
            .attribute("value")?
            .unwrap_or_default())
    }

    /// Dismiss the panel with escape
    pub fn close(&self) -> ProbeResult<()> {
        self.control.close(self.budget, &[])
    }
}
