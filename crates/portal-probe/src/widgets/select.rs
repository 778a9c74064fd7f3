//! Select (single and multiple)

use super::{is_true_attribute, option_by_text, options_in, texts, OverlayOption};
use crate::component::Component;
use crate::config::OverlayConfig;
use crate::control::{CloseAction, OverlayBackedControl};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitBudget;
use tracing::debug;

/// Select whose option panel renders in the overlay layer.
///
/// A single select closes itself when an option is picked; a multiple select
/// stays open and is closed with escape.
#[derive(Debug, Clone)]
pub struct Select {
    control: OverlayBackedControl,
    budget: WaitBudget,
}

impl Select {
    /// Select hosted by `host` (the element showing the current value)
    #[must_use]
    pub fn new(host: Component, config: &OverlayConfig) -> Self {
        let control =
            OverlayBackedControl::new(host, config, Some(config.markers.select_panel.clone()))
                .with_close_action(CloseAction::PressEscape);
        Self {
            control,
            budget: config.default_budget(),
        }
    }

    /// Override the budget used for opening, closing and picking
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

    fn config(&self) -> &OverlayConfig {
        self.control.config()
    }

    /// Whether the host is marked disabled
    pub fn is_disabled(&self) -> ProbeResult<bool> {
        is_true_attribute(
            self.control.trigger(),
            &self.config().states.disabled_attribute,
        )
    }

    /// Whether several options can be selected.
    ///
    /// Reads the host first, then the panel if it is open.
    pub fn is_multiple(&self) -> ProbeResult<bool> {
        let attribute = &self.config().states.multiple_attribute;
        if is_true_attribute(self.control.trigger(), attribute)? {
            return Ok(true);
        }
        match self.control.resolve()? {
            Some(panel) => is_true_attribute(&panel, attribute),
            None => Ok(false),
        }
    }

    /// Text shown by the closed select, empty when nothing is selected
    pub fn value_text(&self) -> ProbeResult<String> {
        match self
            .control
            .trigger()
            .query(&self.config().markers.select_value)
        {
            Ok(value) => Ok(value.text()?.trim().to_owned()),
            Err(ProbeError::NotFound { .. }) => Ok(String::new()),
            Err(err) => Err(err),
        }
    }

    /// Open the panel (no-op when already open).
    ///
    /// # Errors
    ///
    /// `ProbeError::InvalidState` for a disabled select, `ProbeError::Timeout`
    /// when the panel does not appear.
    pub fn open(&self) -> ProbeResult<Component> {
        if self.is_disabled()? {
            return Err(ProbeError::invalid_state("select is disabled"));
        }
        self.control.ensure_open(self.budget)
    }

    /// Options of the panel, opening it if needed
    pub fn options(&self) -> ProbeResult<Vec<OverlayOption>> {
        let panel = self.open()?;
        options_in(&panel, &self.config().markers.option, &self.config().states)
    }

    /// Option labels, in panel order
    pub fn option_texts(&self) -> ProbeResult<Vec<String>> {
        texts(&self.options()?)
    }

    /// Labels of the selected options; leaves the panel open
    pub fn selected_texts(&self) -> ProbeResult<Vec<String>> {
        let mut selected = Vec::new();
        for option in self.options()? {
            if option.is_selected()? {
                selected.push(option.text()?);
            }
        }
        Ok(selected)
    }

    /// Pick the option labelled `text`.
    ///
    /// # Errors
    ///
    /// `ProbeError::NotFound` for an unknown label, `ProbeError::InvalidState`
    /// for a disabled option, `ProbeError::OverlayNotClosed` when a single
    /// select stays open after the pick.
    pub fn select_by_text(&self, text: &str) -> ProbeResult<()> {
        let options = self.options()?;
        let option = option_by_text(options, &self.config().markers.option, text)?;
        self.pick(&option)
    }

    /// Pick the option at `index` (zero-based, panel order)
    pub fn select_by_index(&self, index: usize) -> ProbeResult<()> {
        let options = self.options()?;
        let option = options.get(index).ok_or_else(|| {
            ProbeError::not_found(format!("{} #{index}", self.config().markers.option))
        })?;
        self.pick(option)
    }

    fn pick(&self, option: &OverlayOption) -> ProbeResult<()> {
        let multiple = self.is_multiple()?;
        debug!(option = %option.component().handle(), multiple, "picking select option");
        option.click()?;
        if multiple {
            Ok(())
        } else {
            self.control.await_closed(self.budget)
        }
    }

    /// Close the panel with escape and verify it is gone
    pub fn close(&self) -> ProbeResult<()> {
        self.control.close(self.budget, &[])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::browser::keys;
    use crate::mock::{MockId, MockNode, Mutation, OverlayPage, Reaction};

    const FRUIT: [&str; 3] = ["Apple", "Banana", "Cherry"];

    struct Page {
        page: OverlayPage,
        host: MockId,
        pane: MockId,
        panel: MockId,
        options: Vec<MockId>,
    }

    /// Material-like select; "Cherry" is disabled
    fn page(multiple: bool) -> Page {
        let page = OverlayPage::new();
        let b = &page.browser;
        let host = b.append(page.main, MockNode::new("mat-select").class("mat-mdc-select"));
        let value = b.append(host, MockNode::new("span").class("mat-mdc-select-value"));
        let pane = page.add_pane(false);
        let panel = b.append(
            pane,
            MockNode::new("div")
                .class("mat-mdc-select-panel")
                .attr("aria-multiselectable", if multiple { "true" } else { "false" }),
        );
        let options: Vec<MockId> = FRUIT
            .iter()
            .map(|label| {
                let node = MockNode::new("mat-option").class("mat-mdc-option").text(label);
                let node = if *label == "Cherry" {
                    node.class("mdc-list-item--disabled")
                } else {
                    node
                };
                b.append(panel, node)
            })
            .collect();
        for (&option, label) in options.iter().zip(FRUIT) {
            let mut mutations = vec![Mutation::AddClass(option, "mdc-list-item--selected".into())];
            if !multiple {
                mutations.push(Mutation::SetText(value, label.to_owned()));
                mutations.push(Mutation::SetVisible(pane, false));
            }
            b.on_click(option, Reaction::now(mutations));
        }
        b.on_click(host, Reaction::now(vec![Mutation::SetVisible(pane, true)]));
        b.on_key(host, keys::ESCAPE, Reaction::now(vec![Mutation::SetVisible(pane, false)]));
        Page {
            page,
            host,
            pane,
            panel,
            options,
        }
    }

    fn select(p: &Page) -> Select {
        let config = OverlayConfig::default().with_poll_interval(5);
        Select::new(Component::new(p.host.handle(), p.page.shared()), &config)
            .with_budget(WaitBudget::from_millis(200))
    }

    #[test]
    fn test_option_texts_open_once() {
        let p = page(false);
        let select = select(&p);
        assert_eq!(select.option_texts().unwrap(), FRUIT);
        assert_eq!(select.option_texts().unwrap(), FRUIT);
        assert_eq!(p.page.browser.clicks_on(&p.host.handle()), 1);
    }

    #[test]
    fn test_single_select_closes_on_pick() {
        let p = page(false);
        let select = select(&p);
        assert_eq!(select.value_text().unwrap(), "");
        select.select_by_text("Banana").unwrap();
        assert!(!p.page.browser.visible(p.pane));
        assert_eq!(select.value_text().unwrap(), "Banana");
        assert!(!select.is_multiple().unwrap());
    }

    #[test]
    fn test_select_by_index() {
        let p = page(false);
        select(&p).select_by_index(0).unwrap();
        assert_eq!(p.page.browser.clicks_on(&p.options[0].handle()), 1);
    }

    #[test]
    fn test_select_by_index_out_of_range() {
        let p = page(false);
        let err = select(&p).select_by_index(7).unwrap_err();
        assert!(matches!(err, ProbeError::NotFound { ref query } if query.ends_with("#7")));
    }

    #[test]
    fn test_unknown_option_is_not_found() {
        let p = page(false);
        let err = select(&p).select_by_text("Durian").unwrap_err();
        assert!(matches!(err, ProbeError::NotFound { ref query } if query.contains("Durian")));
    }

    #[test]
    fn test_disabled_option_is_never_clicked() {
        let p = page(false);
        let err = select(&p).select_by_text("Cherry").unwrap_err();
        assert!(matches!(err, ProbeError::InvalidState { .. }));
        assert_eq!(p.page.browser.clicks_on(&p.options[2].handle()), 0);
    }

    #[test]
    fn test_multiple_select_stays_open() {
        let p = page(true);
        let select = select(&p);
        select.select_by_text("Apple").unwrap();
        select.select_by_text("Banana").unwrap();
        assert!(select.is_multiple().unwrap());
        assert!(p.page.browser.visible(p.pane));
        assert_eq!(select.selected_texts().unwrap(), ["Apple", "Banana"]);
        select.close().unwrap();
        assert!(!p.page.browser.visible(p.pane));
    }

    #[test]
    fn test_disabled_select_does_not_open() {
        let p = page(false);
        p.page.browser.set_attr(p.host, "aria-disabled", "true");
        let err = select(&p).open().unwrap_err();
        assert!(matches!(err, ProbeError::InvalidState { .. }));
        assert_eq!(p.page.browser.dispatch_count(), 0);
    }

    #[test]
    fn test_single_select_that_stays_open_is_reported() {
        let p = page(false);
        // no reaction: the panel never goes away
        p.page.browser.append(
            p.panel,
            MockNode::new("mat-option").class("mat-mdc-option").text("Stuck"),
        );
        let err = select(&p)
            .with_budget(WaitBudget::from_millis(30))
            .select_by_text("Stuck")
            .unwrap_err();
        assert!(matches!(err, ProbeError::OverlayNotClosed { ms: 30, .. }));
    }
}
