//! Typed widgets built on [`OverlayBackedControl`](crate::OverlayBackedControl)
//!
//! Each widget is a thin configuration of the shared open/close protocol:
//! a kind marker from [`KindMarkers`](crate::KindMarkers), an open and a close
//! strategy, and a budget (the config's default unless overridden).

mod autocomplete;
mod datepicker;
mod menu;
mod notification;
mod select;

pub use autocomplete::Autocomplete;
pub use datepicker::DatePicker;
pub use menu::{Menu, MenuItem};
pub use notification::Notification;
pub use select::Select;

use crate::component::Component;
use crate::config::StateMarkers;
use crate::query::Query;
use crate::result::{ProbeError, ProbeResult};

/// Option row of a select or autocomplete panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayOption {
    component: Component,
    states: StateMarkers,
}

impl OverlayOption {
    pub(crate) fn new(component: Component, states: &StateMarkers) -> Self {
        Self {
            component,
            states: states.clone(),
        }
    }

    /// Underlying component
    #[must_use]
    pub const fn component(&self) -> &Component {
        &self.component
    }

    /// Visible label
    pub fn text(&self) -> ProbeResult<String> {
        self.component.text()
    }

    /// Whether the option carries the selected class
    pub fn is_selected(&self) -> ProbeResult<bool> {
        self.component.has_class(&self.states.selected_class)
    }

    /// Whether the option is disabled (class or `aria-disabled`)
    pub fn is_disabled(&self) -> ProbeResult<bool> {
        if self.component.has_class(&self.states.disabled_class)? {
            return Ok(true);
        }
        is_true_attribute(&self.component, &self.states.disabled_attribute)
    }

    /// Click the option.
    ///
    /// # Errors
    ///
    /// `ProbeError::InvalidState` for a disabled option, before any click.
    pub fn click(&self) -> ProbeResult<()> {
        if self.is_disabled()? {
            return Err(ProbeError::invalid_state(format!(
                "option {:?} is disabled",
                self.text()?
            )));
        }
        self.component.click()
    }
}

fn is_true_attribute(component: &Component, name: &str) -> ProbeResult<bool> {
    Ok(component
        .attribute(name)?
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")))
}

fn options_in(
    panel: &Component,
    option: &Query,
    states: &StateMarkers,
) -> ProbeResult<Vec<OverlayOption>> {
    Ok(panel
        .query_all(option)?
        .into_iter()
        .map(|c| OverlayOption::new(c, states))
        .collect())
}

fn texts(options: &[OverlayOption]) -> ProbeResult<Vec<String>> {
    options.iter().map(OverlayOption::text).collect()
}

/// First option whose trimmed label equals `text`
fn option_by_text(options: Vec<OverlayOption>, option: &Query, text: &str) -> ProbeResult<OverlayOption> {
    for candidate in options {
        if candidate.text()?.trim() == text.trim() {
            return Ok(candidate);
        }
    }
    Err(ProbeError::not_found(option.clone().with_text(text)))
}
