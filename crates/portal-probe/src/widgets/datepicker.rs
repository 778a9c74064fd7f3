//! Date picker with an overlay calendar

use super::is_true_attribute;
use crate::component::Component;
use crate::config::OverlayConfig;
use crate::control::{CloseAction, OverlayBackedControl};
use crate::query::Query;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{await_some, WaitBudget};
use tracing::debug;

/// Date input opened through its toggle button
#[derive(Debug, Clone)]
pub struct DatePicker {
    host: Component,
    control: OverlayBackedControl,
    budget: WaitBudget,
}

impl DatePicker {
    /// Date picker inside `host` (the form field holding input and toggle).
    ///
    /// # Errors
    ///
    /// `ProbeError::NotFound` when `host` has no toggle button.
    pub fn new(host: Component, config: &OverlayConfig) -> ProbeResult<Self> {
        let toggle = host.query(&config.markers.datepicker_toggle)?;
        let control = OverlayBackedControl::new(
            toggle,
            config,
            Some(config.markers.datepicker_content.clone()),
        )
        .with_close_action(CloseAction::PressEscape);
        Ok(Self {
            host,
            control,
            budget: config.default_budget(),
        })
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

    /// Open the calendar
    pub fn open(&self) -> ProbeResult<Component> {
        self.control.ensure_open(self.budget)
    }

    /// Month/year label of the calendar, opening it if needed
    pub fn period_label(&self) -> ProbeResult<String> {
        let calendar = self.open()?;
        self.label(&calendar)
    }

    fn label(&self, calendar: &Component) -> ProbeResult<String> {
        let marker = &self.control.config().markers.calendar_period;
        Ok(calendar.query(marker)?.text()?.trim().to_owned())
    }

    /// Advance one period and return the new label
    pub fn next_period(&self) -> ProbeResult<String> {
        self.step(&self.control.config().markers.calendar_next)
    }

    /// Go back one period and return the new label
    pub fn previous_period(&self) -> ProbeResult<String> {
        self.step(&self.control.config().markers.calendar_previous)
    }

    fn step(&self, button: &Query) -> ProbeResult<String> {
        let calendar = self.open()?;
        let before = self.label(&calendar)?;
        calendar.query(button)?.click()?;
        let options = self.control.config().wait_options(self.budget);
        await_some(
            calendar.browser().as_ref(),
            &options,
            "calendar period change",
            || {
                let now = self.label(&calendar)?;
                Ok((now != before).then_some(now))
            },
        )
    }

    /// Click the cell showing `day` in the current period and wait for the
    /// calendar to close.
    ///
    /// # Errors
    ///
    /// `ProbeError::NotFound` when no cell shows `day`,
    /// `ProbeError::InvalidState` when the cell is disabled.
    pub fn pick_day(&self, day: u32) -> ProbeResult<()> {
        let calendar = self.open()?;
        let config = self.control.config();
        let wanted = day.to_string();
        let mut target = None;
        for cell in calendar.query_all(&config.markers.calendar_cell)? {
            if cell.text()?.trim() == wanted {
                target = Some(cell);
                break;
            }
        }
        let cell = target.ok_or_else(|| {
            ProbeError::not_found(config.markers.calendar_cell.clone().with_text(wanted.as_str()))
        })?;
        if is_true_attribute(&cell, &config.states.disabled_attribute)? {
            return Err(ProbeError::invalid_state(format!("day {day} is disabled")));
        }
        debug!(day, "picking calendar day");
        cell.click()?;
        self.control.await_closed(self.budget)
    }

    /// Current `value` of the date input
    pub fn value(&self) -> ProbeResult<String> {
        Ok(self
            .host
            .query(&Query::css("input"))?
            .attribute("value")?
            .unwrap_or_default())
    }

    /// Dismiss the calendar with escape
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

    struct Page {
        page: OverlayPage,
        field: MockId,
        toggle: MockId,
        pane: MockId,
    }

    /// October calendar; the 13th is disabled
    fn page() -> Page {
        let page = OverlayPage::new();
        let b = &page.browser;
        let field = b.append(page.main, MockNode::new("mat-form-field"));
        let input = b.append(field, MockNode::new("input"));
        let toggle_host = b.append(field, MockNode::new("mat-datepicker-toggle").class("mat-datepicker-toggle"));
        let toggle = b.append(toggle_host, MockNode::new("button"));
        let pane = page.add_pane(false);
        let content = b.append(pane, MockNode::new("div").class("mat-datepicker-content"));
        let period = b.append(
            content,
            MockNode::new("button").class("mat-calendar-period-button").text("OCT 2026"),
        );
        let previous = b.append(content, MockNode::new("button").class("mat-calendar-previous-button"));
        let next = b.append(content, MockNode::new("button").class("mat-calendar-next-button"));
        for day in 1..=31 {
            let label = day.to_string();
            let node = MockNode::new("td").class("mat-calendar-body-cell").text(&label);
            let node = if day == 13 { node.attr("aria-disabled", "true") } else { node };
            let cell = b.append(content, node);
            b.on_click(
                cell,
                Reaction::now(vec![
                    Mutation::SetAttr(input, "value".into(), format!("10/{day}/2026")),
                    Mutation::SetVisible(pane, false),
                ]),
            );
        }
        b.on_click(next, Reaction::now(vec![Mutation::SetText(period, "NOV 2026".into())]));
        b.on_click(previous, Reaction::now(vec![Mutation::SetText(period, "SEP 2026".into())]));
        b.on_click(toggle, Reaction::now(vec![Mutation::SetVisible(pane, true)]));
        b.on_key(toggle, keys::ESCAPE, Reaction::now(vec![Mutation::SetVisible(pane, false)]));
        Page {
            page,
            field,
            toggle,
            pane,
        }
    }

    fn picker(p: &Page) -> DatePicker {
        let config = OverlayConfig::default().with_poll_interval(5);
        DatePicker::new(Component::new(p.field.handle(), p.page.shared()), &config)
            .unwrap()
            .with_budget(WaitBudget::from_millis(200))
    }

    #[test]
    fn test_open_via_toggle() {
        let p = page();
        picker(&p).open().unwrap();
        assert_eq!(p.page.browser.clicks_on(&p.toggle.handle()), 1);
    }

    #[test]
    fn test_pick_day() {
        let p = page();
        let picker = picker(&p);
        picker.pick_day(5).unwrap();
        assert_eq!(picker.value().unwrap(), "10/5/2026");
        assert!(!p.page.browser.visible(p.pane));
    }

    #[test]
    fn test_pick_disabled_day() {
        let p = page();
        let err = picker(&p).pick_day(13).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidState { .. }));
        assert!(p.page.browser.visible(p.pane));
    }

    #[test]
    fn test_pick_missing_day() {
        let p = page();
        let err = picker(&p).pick_day(32).unwrap_err();
        assert!(matches!(err, ProbeError::NotFound { .. }));
    }

    #[test]
    fn test_period_navigation() {
        let p = page();
        let picker = picker(&p);
        assert_eq!(picker.period_label().unwrap(), "OCT 2026");
        assert_eq!(picker.next_period().unwrap(), "NOV 2026");
        assert_eq!(picker.previous_period().unwrap(), "SEP 2026");
    }

    #[test]
    fn test_close() {
        let p = page();
        let picker = picker(&p);
        picker.open().unwrap();
        picker.close().unwrap();
        assert!(!p.page.browser.visible(p.pane));
    }

    #[test]
    fn test_host_without_toggle() {
        let p = page();
        let config = OverlayConfig::default();
        let bare = p.page.browser.append(p.page.main, MockNode::new("div"));
        let err = DatePicker::new(Component::new(bare.handle(), p.page.shared()), &config).unwrap_err();
        assert!(matches!(err, ProbeError::NotFound { .. }));
    }
}
