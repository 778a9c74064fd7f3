//! Overlay configuration
//!
//! Structural markers differ per component library and version. They are
//! collected in one immutable [`OverlayConfig`] value that every resolver and
//! control receives explicitly.

use crate::query::Query;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{WaitBudget, WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// KIND MARKERS
// =============================================================================

/// Default component-library prefix (Angular Material)
pub const DEFAULT_PREFIX: &str = "mat";

/// Markers identifying each overlay kind and the parts inside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindMarkers {
    /// Option panel of a select
    pub select_panel: Query,
    /// Suggestion panel of an autocomplete
    pub autocomplete_panel: Query,
    /// Calendar popup of a date picker
    pub datepicker_content: Query,
    /// Menu panel
    pub menu_panel: Query,
    /// Snack-bar notification
    pub snackbar: Query,
    /// Option row inside select/autocomplete panels
    pub option: Query,
    /// Item inside a menu panel
    pub menu_item: Query,
    /// Value text shown by a closed select
    pub select_value: Query,
    /// Button opening a date picker
    pub datepicker_toggle: Query,
    /// Day cell inside a calendar
    pub calendar_cell: Query,
    /// Month/year label button of a calendar
    pub calendar_period: Query,
    /// Next-period button of a calendar
    pub calendar_next: Query,
    /// Previous-period button of a calendar
    pub calendar_previous: Query,
}

impl KindMarkers {
    /// Markers for a component-library prefix
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        let css = |suffix: &str| Query::css(format!(".{prefix}-{suffix}"));
        Self {
            select_panel: css("mdc-select-panel"),
            autocomplete_panel: css("mdc-autocomplete-panel"),
            datepicker_content: css("datepicker-content"),
            menu_panel: css("mdc-menu-panel"),
            snackbar: css("mdc-snack-bar-container"),
            option: css("mdc-option"),
            menu_item: css("mdc-menu-item"),
            select_value: css("mdc-select-value"),
            datepicker_toggle: Query::css(format!(".{prefix}-datepicker-toggle button")),
            calendar_cell: css("calendar-body-cell"),
            calendar_period: css("calendar-period-button"),
            calendar_next: css("calendar-next-button"),
            calendar_previous: css("calendar-previous-button"),
        }
    }

    fn all(&self) -> [(&'static str, &Query); 13] {
        [
            ("select_panel", &self.select_panel),
            ("autocomplete_panel", &self.autocomplete_panel),
            ("datepicker_content", &self.datepicker_content),
            ("menu_panel", &self.menu_panel),
            ("snackbar", &self.snackbar),
            ("option", &self.option),
            ("menu_item", &self.menu_item),
            ("select_value", &self.select_value),
            ("datepicker_toggle", &self.datepicker_toggle),
            ("calendar_cell", &self.calendar_cell),
            ("calendar_period", &self.calendar_period),
            ("calendar_next", &self.calendar_next),
            ("calendar_previous", &self.calendar_previous),
        ]
    }
}

impl Default for KindMarkers {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }
}

// =============================================================================
// STATE MARKERS
// =============================================================================

/// Class names and attributes describing option/item state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateMarkers {
    /// Class on a selected option
    pub selected_class: String,
    /// Class on a disabled option
    pub disabled_class: String,
    /// Attribute present on items that open a submenu
    pub expandable_attribute: String,
    /// Attribute set to `"true"` on multi-select panels
    pub multiple_attribute: String,
    /// Attribute set to `"true"` on disabled triggers
    pub disabled_attribute: String,
}

impl Default for StateMarkers {
    fn default() -> Self {
        Self {
            selected_class: "mdc-list-item--selected".to_owned(),
            disabled_class: "mdc-list-item--disabled".to_owned(),
            expandable_attribute: "aria-haspopup".to_owned(),
            multiple_attribute: "aria-multiselectable".to_owned(),
            disabled_attribute: "aria-disabled".to_owned(),
        }
    }
}

// =============================================================================
// OVERLAY CONFIG
// =============================================================================

/// Immutable configuration for resolvers and controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Where overlays are mounted
    pub overlay_root: Query,
    /// Overlay hosts relative to the root
    pub host_marker: Query,
    /// Click-outside target relative to the root
    pub backdrop: Query,
    /// Per-kind markers
    pub markers: KindMarkers,
    /// Option and item state markers
    pub states: StateMarkers,
    /// Budget used by widgets when none is given (milliseconds)
    pub default_budget_ms: u64,
    /// Interval between polls (milliseconds)
    pub poll_interval_ms: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            overlay_root: Query::css(".cdk-overlay-container"),
            host_marker: Query::css(".cdk-overlay-pane"),
            backdrop: Query::css(".cdk-overlay-backdrop"),
            markers: KindMarkers::default(),
            states: StateMarkers::default(),
            default_budget_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl OverlayConfig {
    /// Default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-derive every kind marker for another component-library prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.markers = KindMarkers::with_prefix(prefix);
        self
    }

    /// Set the overlay root
    #[must_use]
    pub fn with_overlay_root(mut self, root: Query) -> Self {
        self.overlay_root = root;
        self
    }

    /// Set the overlay host marker
    #[must_use]
    pub fn with_host_marker(mut self, marker: Query) -> Self {
        self.host_marker = marker;
        self
    }

    /// Set the default budget in milliseconds
    #[must_use]
    pub const fn with_default_budget(mut self, budget_ms: u64) -> Self {
        self.default_budget_ms = budget_ms;
        self
    }

    /// Set the poll interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Default budget as a [`WaitBudget`]
    #[must_use]
    pub const fn default_budget(&self) -> WaitBudget {
        WaitBudget::from_millis(self.default_budget_ms)
    }

    /// Wait options for `budget` using the configured poll interval
    #[must_use]
    pub const fn wait_options(&self, budget: WaitBudget) -> WaitOptions {
        WaitOptions::new()
            .with_budget(budget)
            .with_poll_interval(self.poll_interval_ms)
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Config` on a zero poll interval or empty marker.
    pub fn validate(&self) -> ProbeResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(ProbeError::config("poll_interval_ms must be greater than 0"));
        }
        let base = [
            ("overlay_root", &self.overlay_root),
            ("host_marker", &self.host_marker),
            ("backdrop", &self.backdrop),
        ];
        for (name, query) in base.into_iter().chain(self.markers.all()) {
            if query.is_empty() {
                return Err(ProbeError::config(format!("{name} must not be empty")));
            }
        }
        if self.states.selected_class.trim().is_empty() {
            return Err(ProbeError::config("selected_class must not be empty"));
        }
        Ok(())
    }

    /// Parse and validate YAML
    pub fn from_yaml_str(source: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON
    pub fn from_json_str(source: &str) -> ProbeResult<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&source),
            Some("json") => Self::from_json_str(&source),
            _ => Err(ProbeError::config(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}
