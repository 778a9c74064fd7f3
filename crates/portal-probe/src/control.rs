//! Overlay-backed control state machine
//!
//! ```text
//!   Closed ──open action──► Opening ──overlay resolves──► Open
//!     ▲                                                    │
//!     └──── overlay gone ◄── Closing ◄──close action───────┘
//! ```
//!
//! `Opening` and `Closing` only exist while a wait is in progress; the state
//! of a control is otherwise derived from resolver output on every call.
//! Select panels, autocomplete popovers, calendars and menus all run through
//! [`OverlayBackedControl`]; they differ only in kind marker, open/close
//! strategy and budget.

use crate::browser::keys;
use crate::component::Component;
use crate::config::OverlayConfig;
use crate::overlay::NamedOverlayResolver;
use crate::query::Query;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{await_absent, await_condition, await_some, WaitBudget, WaitOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

// =============================================================================
// CONTROL STATE
// =============================================================================

/// Lifecycle state of an overlay-backed control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlState {
    /// No overlay resolves
    Closed,
    /// Open action dispatched, waiting for the overlay
    Opening,
    /// Overlay resolves
    Open,
    /// Close action dispatched, waiting for the overlay to go
    Closing,
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Closing => "closing",
        };
        f.write_str(name)
    }
}

// =============================================================================
// OPEN AND CLOSE ACTIONS
// =============================================================================

/// What an action strategy can see
#[derive(Debug)]
pub struct ActionContext<'a> {
    /// Element that opens the overlay
    pub trigger: &'a Component,
    /// Currently resolved overlay, if any
    pub overlay: Option<&'a Component>,
    /// Option components passed to `close`
    pub options: &'a [Component],
    /// Configuration of the control
    pub config: &'a OverlayConfig,
    /// Overlay root the control resolves under
    pub root: &'a Query,
}

/// User-supplied open or close strategy
pub type CustomAction = Arc<dyn Fn(&ActionContext<'_>) -> ProbeResult<()> + Send + Sync>;

/// How a control opens its overlay
#[derive(Clone)]
pub enum OpenAction {
    /// Click the trigger
    ClickTrigger,
    /// Click a descendant of the trigger (e.g. an arrow button)
    ClickDescendant(Query),
    /// Type into the trigger
    TypeText(String),
    /// Anything else
    Custom(CustomAction),
}

/// How a control closes its overlay
#[derive(Clone)]
pub enum CloseAction {
    /// Click the trigger again
    ClickTrigger,
    /// Press escape on the trigger
    PressEscape,
    /// Click the last visible backdrop under the overlay root
    ClickBackdrop,
    /// Click the first selected option again
    ClickFirstSelectedOption,
    /// Anything else
    Custom(CustomAction),
}

impl fmt::Debug for OpenAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClickTrigger => f.write_str("ClickTrigger"),
            Self::ClickDescendant(q) => f.debug_tuple("ClickDescendant").field(q).finish(),
            Self::TypeText(t) => f.debug_tuple("TypeText").field(t).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Debug for CloseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClickTrigger => f.write_str("ClickTrigger"),
            Self::PressEscape => f.write_str("PressEscape"),
            Self::ClickBackdrop => f.write_str("ClickBackdrop"),
            Self::ClickFirstSelectedOption => f.write_str("ClickFirstSelectedOption"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl OpenAction {
    /// Wrap a closure as [`OpenAction::Custom`]
    pub fn custom<F>(action: F) -> Self
    where
        F: Fn(&ActionContext<'_>) -> ProbeResult<()> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(action))
    }

    fn dispatch(&self, ctx: &ActionContext<'_>) -> ProbeResult<()> {
        match self {
            Self::ClickTrigger => ctx.trigger.click(),
            Self::ClickDescendant(query) => ctx.trigger.query(query)?.click(),
            Self::TypeText(text) => ctx.trigger.send_keys(text),
            Self::Custom(action) => action(ctx),
        }
    }
}

impl CloseAction {
    /// Wrap a closure as [`CloseAction::Custom`]
    pub fn custom<F>(action: F) -> Self
    where
        F: Fn(&ActionContext<'_>) -> ProbeResult<()> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(action))
    }

    fn dispatch(&self, ctx: &ActionContext<'_>) -> ProbeResult<()> {
        match self {
            Self::ClickTrigger => ctx.trigger.click(),
            Self::PressEscape => ctx.trigger.send_keys(keys::ESCAPE),
            Self::ClickBackdrop => {
                let browser = ctx.trigger.browser();
                let mut target = None;
                for root in Component::root_query_all(browser, ctx.root)? {
                    for backdrop in root.query_all(&ctx.config.backdrop)? {
                        if backdrop.is_visible()? {
                            target = Some(backdrop);
                        }
                    }
                }
                target
                    .ok_or_else(|| ProbeError::not_found(&ctx.config.backdrop))?
                    .click()
            }
            Self::ClickFirstSelectedOption => {
                let selected_class = &ctx.config.states.selected_class;
                for option in ctx.options {
                    if option.has_class(selected_class)? {
                        return option.click();
                    }
                }
                Err(ProbeError::invalid_state(
                    "no selected option to click for closing",
                ))
            }
            Self::Custom(action) => action(ctx),
        }
    }
}

// =============================================================================
// ASSOCIATION
// =============================================================================

/// How an overlay is tied back to the control that opened it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Association {
    /// Whatever overlay of the kind is on top belongs to the control
    #[default]
    Topmost,
    /// The topmost overlay must match the trigger's `aria-controls`/`aria-owns`
    AriaControls,
    /// Topmost overlay unless it contains the trigger (nested menus)
    Nested,
}

// =============================================================================
// OVERLAY-BACKED CONTROL
// =============================================================================

/// Open/close protocol for a control whose body is overlay-rendered
#[derive(Debug, Clone)]
pub struct OverlayBackedControl {
    trigger: Component,
    resolver: NamedOverlayResolver,
    config: OverlayConfig,
    root: Query,
    kind_marker: Option<Query>,
    open_action: OpenAction,
    close_action: CloseAction,
    association: Association,
}

impl OverlayBackedControl {
    /// Control opened by clicking `trigger` and closed with escape
    #[must_use]
    pub fn new(trigger: Component, config: &OverlayConfig, kind_marker: Option<Query>) -> Self {
        let resolver = NamedOverlayResolver::new(Arc::clone(trigger.browser()), config);
        Self {
            trigger,
            resolver,
            config: config.clone(),
            root: config.overlay_root.clone(),
            kind_marker,
            open_action: OpenAction::ClickTrigger,
            close_action: CloseAction::PressEscape,
            association: Association::Topmost,
        }
    }

    /// Resolve under a different overlay root
    #[must_use]
    pub fn with_root(mut self, root: Query) -> Self {
        self.root = root;
        self
    }

    /// Set the open strategy
    #[must_use]
    pub fn with_open_action(mut self, action: OpenAction) -> Self {
        self.open_action = action;
        self
    }

    /// Set the close strategy
    #[must_use]
    pub fn with_close_action(mut self, action: CloseAction) -> Self {
        self.close_action = action;
        self
    }

    /// Set how overlays are tied to the trigger
    #[must_use]
    pub const fn with_association(mut self, association: Association) -> Self {
        self.association = association;
        self
    }

    /// Element that opens the overlay
    #[must_use]
    pub const fn trigger(&self) -> &Component {
        &self.trigger
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Kind marker, if any
    #[must_use]
    pub fn kind_marker(&self) -> Option<&Query> {
        self.kind_marker.as_ref()
    }

    fn describe(&self) -> String {
        self.kind_marker
            .as_ref()
            .map_or_else(|| format!("overlay under {}", self.root), ToString::to_string)
    }

    /// Current overlay of this control, one synchronous pass
    pub fn resolve(&self) -> ProbeResult<Option<Component>> {
        let marker = self.kind_marker.as_ref();
        match self.association {
            Association::Topmost => self.resolver.find_top_visible_overlay(&self.root, marker),
            Association::AriaControls => {
                self.resolver
                    .find_overlay_for(&self.trigger, &self.root, marker)
            }
            Association::Nested => {
                let Some(overlay) = self.resolver.find_top_visible_overlay(&self.root, marker)? else {
                    return Ok(None);
                };
                let parent = overlay
                    .query_all(&Query::css("*"))?
                    .contains(&self.trigger);
                Ok((!parent).then_some(overlay))
            }
        }
    }

    /// One resolution pass where a stale handle reads as "not there"
    fn resolve_settled(&self) -> ProbeResult<Option<Component>> {
        await_condition(
            self.trigger.browser().as_ref(),
            &WaitOptions::immediate(),
            &self.describe(),
            || self.resolve(),
        )
    }

    /// `Open` if the overlay resolves, otherwise `Closed`
    pub fn state(&self) -> ProbeResult<ControlState> {
        Ok(if self.resolve()?.is_some() {
            ControlState::Open
        } else {
            ControlState::Closed
        })
    }

    /// Whether the overlay currently resolves
    pub fn is_open(&self) -> ProbeResult<bool> {
        Ok(self.resolve()?.is_some())
    }

    fn context<'a>(
        &'a self,
        overlay: Option<&'a Component>,
        options: &'a [Component],
    ) -> ActionContext<'a> {
        ActionContext {
            trigger: &self.trigger,
            overlay,
            options,
            config: &self.config,
            root: &self.root,
        }
    }

    /// Open the overlay.
    ///
    /// Returns the already-open overlay without dispatching anything. With a
    /// zero budget the result after one re-resolution may be `None`.
    ///
    /// # Errors
    ///
    /// `ProbeError::Timeout` when a positive budget is spent.
    pub fn open(&self, budget: WaitBudget) -> ProbeResult<Option<Component>> {
        if let Some(overlay) = self.resolve_settled()? {
            debug!(marker = %self.describe(), "overlay already open");
            return Ok(Some(overlay));
        }
        self.dispatch_open(budget)
    }

    /// Open, treating "did not open" as a timeout for every budget
    ///
    /// # Errors
    ///
    /// `ProbeError::Timeout` when no overlay resolves.
    pub fn ensure_open(&self, budget: WaitBudget) -> ProbeResult<Component> {
        self.open(budget)?.ok_or_else(|| ProbeError::Timeout {
            ms: budget.as_millis(),
            waited_for: self.describe(),
        })
    }

    /// Open after checking that the control can expand at all.
    ///
    /// # Errors
    ///
    /// `ProbeError::ControlNotExpandable` before any dispatch when
    /// `is_expandable` rejects the trigger.
    pub fn open_expandable<F>(&self, budget: WaitBudget, is_expandable: F) -> ProbeResult<Option<Component>>
    where
        F: FnOnce(&Component) -> ProbeResult<bool>,
    {
        if !is_expandable(&self.trigger)? {
            return Err(ProbeError::ControlNotExpandable {
                control: self.trigger.text().unwrap_or_else(|_| self.trigger.handle().to_string()),
            });
        }
        self.open(budget)
    }

    fn dispatch_open(&self, budget: WaitBudget) -> ProbeResult<Option<Component>> {
        debug!(
            marker = %self.describe(),
            from = %ControlState::Closed,
            to = %ControlState::Opening,
            action = ?self.open_action,
            "dispatching open"
        );
        self.open_action.dispatch(&self.context(None, &[]))?;

        let options = self.config.wait_options(budget);
        let overlay = await_condition(
            self.trigger.browser().as_ref(),
            &options,
            &self.describe(),
            || self.resolve(),
        )?;
        if overlay.is_some() {
            debug!(marker = %self.describe(), to = %ControlState::Open, "overlay opened");
        }
        Ok(overlay)
    }

    /// Close the overlay and verify it is gone.
    ///
    /// A control that is already closed is left alone.
    ///
    /// # Errors
    ///
    /// `ProbeError::OverlayNotClosed` when the overlay still resolves after
    /// the budget (or, for a zero budget, right after the close action).
    pub fn close(&self, budget: WaitBudget, options: &[Component]) -> ProbeResult<()> {
        let Some(overlay) = self.resolve_settled()? else {
            return Ok(());
        };
        debug!(
            marker = %self.describe(),
            from = %ControlState::Open,
            to = %ControlState::Closing,
            action = ?self.close_action,
            "dispatching close"
        );
        self.close_action
            .dispatch(&self.context(Some(&overlay), options))?;
        self.await_closed(budget)
    }

    /// Wait for the overlay to appear without dispatching anything.
    ///
    /// # Errors
    ///
    /// `ProbeError::Timeout` when no overlay resolves within the budget.
    pub fn await_open(&self, budget: WaitBudget) -> ProbeResult<Component> {
        let options = self.config.wait_options(budget);
        await_some(
            self.trigger.browser().as_ref(),
            &options,
            &self.describe(),
            || self.resolve(),
        )
    }

    /// Wait for the overlay to go without dispatching anything.
    ///
    /// # Errors
    ///
    /// `ProbeError::OverlayNotClosed` when it still resolves after the budget.
    pub fn await_closed(&self, budget: WaitBudget) -> ProbeResult<()> {
        let not_closed = || ProbeError::OverlayNotClosed {
            marker: self.describe(),
            ms: budget.as_millis(),
        };

        if budget.is_zero() {
            let still_visible = match self.resolve_settled()? {
                Some(overlay) => match overlay.is_visible() {
                    Ok(visible) => visible,
                    Err(err) if err.is_stale() => false,
                    Err(err) => return Err(err),
                },
                None => false,
            };
            return if still_visible { Err(not_closed()) } else { Ok(()) };
        }

        let options = self.config.wait_options(budget);
        match await_absent(
            self.trigger.browser().as_ref(),
            &options,
            &self.describe(),
            || Ok(self.resolve()?.is_some()),
        ) {
            Ok(_) => {
                debug!(marker = %self.describe(), to = %ControlState::Closed, "overlay closed");
                Ok(())
            }
            Err(err) if err.is_timeout() => Err(not_closed()),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::{MockId, MockNode, Mutation, OverlayPage, Reaction};
    use std::time::Duration;

    struct Fixture {
        page: OverlayPage,
        trigger: MockId,
        pane: MockId,
        panel: MockId,
    }

    /// Trigger toggles a hidden pane holding a `.panel`
    fn fixture() -> Fixture {
        let page = OverlayPage::new();
        let trigger = page
            .browser
            .append(page.main, MockNode::new("button").text("Fruit"));
        let pane = page.add_pane(false);
        let panel = page
            .browser
            .append(pane, MockNode::new("div").class("panel"));
        page.browser
            .on_click(trigger, Reaction::now(vec![Mutation::ToggleVisible(pane)]));
        page.browser.on_key(
            trigger,
            keys::ESCAPE,
            Reaction::now(vec![Mutation::SetVisible(pane, false)]),
        );
        Fixture {
            page,
            trigger,
            pane,
            panel,
        }
    }

    fn control(f: &Fixture) -> OverlayBackedControl {
        let config = OverlayConfig::default().with_poll_interval(5);
        let trigger = Component::new(f.trigger.handle(), f.page.shared());
        OverlayBackedControl::new(trigger, &config, Some(Query::css(".panel")))
    }

    mod open_tests {
        use super::*;

        #[test]
        fn test_open_zero_budget() {
            let f = fixture();
            let overlay = control(&f).open(WaitBudget::ZERO).unwrap().unwrap();
            assert_eq!(overlay.handle(), &f.panel.handle());
            assert_eq!(f.page.browser.click_count(), 1);
        }

        #[test]
        fn test_open_is_idempotent() {
            let f = fixture();
            let control = control(&f);
            control.open(WaitBudget::ZERO).unwrap();
            control.open(WaitBudget::ZERO).unwrap();
            control.open(WaitBudget::from_millis(100)).unwrap();
            assert_eq!(f.page.browser.click_count(), 1);
            assert_eq!(control.state().unwrap(), ControlState::Open);
        }

        #[test]
        fn test_open_zero_budget_may_return_none() {
            let f = fixture();
            let lazy = f.page.browser.append(f.page.main, MockNode::new("button"));
            f.page.browser.on_click(
                lazy,
                Reaction::after(Duration::from_millis(200), vec![Mutation::SetVisible(f.pane, true)]),
            );
            let config = OverlayConfig::default();
            let control = OverlayBackedControl::new(
                Component::new(lazy.handle(), f.page.shared()),
                &config,
                Some(Query::css(".panel")),
            );
            assert!(control.open(WaitBudget::ZERO).unwrap().is_none());
            assert_eq!(f.page.browser.clicks_on(&lazy.handle()), 1);
        }

        #[test]
        fn test_ensure_open_zero_budget_is_timeout() {
            let f = fixture();
            let dead = f.page.browser.append(f.page.main, MockNode::new("button"));
            let control = OverlayBackedControl::new(
                Component::new(dead.handle(), f.page.shared()),
                &OverlayConfig::default(),
                Some(Query::css(".panel")),
            );
            let err = control.ensure_open(WaitBudget::ZERO).unwrap_err();
            assert!(matches!(err, ProbeError::Timeout { ms: 0, .. }));
        }

        #[test]
        fn test_open_timeout() {
            let f = fixture();
            let dead = f.page.browser.append(f.page.main, MockNode::new("button"));
            let config = OverlayConfig::default().with_poll_interval(5);
            let control = OverlayBackedControl::new(
                Component::new(dead.handle(), f.page.shared()),
                &config,
                Some(Query::css(".panel")),
            );
            let err = control.open(WaitBudget::from_millis(40)).unwrap_err();
            assert!(err.is_timeout());
        }

        #[test]
        fn test_open_with_custom_action() {
            let f = fixture();
            let pane = f.pane;
            let browser = Arc::clone(&f.page.browser);
            let control = control(&f).with_open_action(OpenAction::custom(move |_| {
                browser.set_visible(pane, true);
                Ok(())
            }));
            assert!(control.open(WaitBudget::ZERO).unwrap().is_some());
            assert_eq!(f.page.browser.click_count(), 0);
        }

        #[test]
        fn test_open_reads_stale_resolution_as_closed() {
            let f = fixture();
            f.page.browser.inject_stale_reads(1);
            let overlay = control(&f).open(WaitBudget::from_millis(200)).unwrap().unwrap();
            assert_eq!(overlay.handle(), &f.panel.handle());
            assert_eq!(f.page.browser.click_count(), 1);
        }

        #[test]
        fn test_not_expandable_dispatches_nothing() {
            let f = fixture();
            let err = control(&f)
                .open_expandable(WaitBudget::from_millis(100), |_| Ok(false))
                .unwrap_err();
            assert!(matches!(err, ProbeError::ControlNotExpandable { ref control } if control == "Fruit"));
            assert_eq!(f.page.browser.dispatch_count(), 0);
        }
    }

    mod close_tests {
        use super::*;

        #[test]
        fn test_close_when_closed_is_noop() {
            let f = fixture();
            control(&f).close(WaitBudget::ZERO, &[]).unwrap();
            assert_eq!(f.page.browser.dispatch_count(), 0);
        }

        #[test]
        fn test_close_with_escape() {
            let f = fixture();
            let control = control(&f);
            control.open(WaitBudget::ZERO).unwrap();
            control.close(WaitBudget::ZERO, &[]).unwrap();
            assert_eq!(control.state().unwrap(), ControlState::Closed);
        }

        #[test]
        fn test_close_ineffective_zero_budget() {
            let f = fixture();
            let control = control(&f).with_close_action(CloseAction::custom(|_| Ok(())));
            control.open(WaitBudget::ZERO).unwrap();
            let err = control.close(WaitBudget::ZERO, &[]).unwrap_err();
            assert!(matches!(err, ProbeError::OverlayNotClosed { ms: 0, .. }));
        }

        #[test]
        fn test_close_ineffective_positive_budget() {
            let f = fixture();
            let control = control(&f).with_close_action(CloseAction::custom(|_| Ok(())));
            control.open(WaitBudget::ZERO).unwrap();
            let err = control.close(WaitBudget::from_millis(30), &[]).unwrap_err();
            assert!(matches!(err, ProbeError::OverlayNotClosed { ms: 30, .. }));
        }

        #[test]
        fn test_close_with_trigger_toggle() {
            let f = fixture();
            let control = control(&f).with_close_action(CloseAction::ClickTrigger);
            control.open(WaitBudget::ZERO).unwrap();
            control.close(WaitBudget::from_millis(100), &[]).unwrap();
            assert_eq!(f.page.browser.click_count(), 2);
        }

        #[test]
        fn test_close_with_backdrop() {
            let f = fixture();
            let backdrop = f.page.add_backdrop(true);
            f.page.browser.on_click(
                backdrop,
                Reaction::now(vec![Mutation::SetVisible(f.pane, false)]),
            );
            let control = control(&f).with_close_action(CloseAction::ClickBackdrop);
            control.open(WaitBudget::ZERO).unwrap();
            control.close(WaitBudget::from_millis(100), &[]).unwrap();
            assert_eq!(f.page.browser.clicks_on(&backdrop.handle()), 1);
        }

        #[test]
        fn test_close_with_selected_option() {
            let f = fixture();
            let plain = f
                .page
                .browser
                .append(f.panel, MockNode::new("div").class("option"));
            let selected = f.page.browser.append(
                f.panel,
                MockNode::new("div").class("option mdc-list-item--selected"),
            );
            f.page.browser.on_click(
                selected,
                Reaction::now(vec![Mutation::SetVisible(f.pane, false)]),
            );
            let control = control(&f).with_close_action(CloseAction::ClickFirstSelectedOption);
            let overlay = control.open(WaitBudget::ZERO).unwrap().unwrap();
            let options = overlay.query_all(&Query::css(".option")).unwrap();
            control.close(WaitBudget::from_millis(100), &options).unwrap();
            assert_eq!(f.page.browser.clicks_on(&plain.handle()), 0);
            assert_eq!(f.page.browser.clicks_on(&selected.handle()), 1);
        }

        #[test]
        fn test_close_without_selected_option_is_invalid_state() {
            let f = fixture();
            let control = control(&f).with_close_action(CloseAction::ClickFirstSelectedOption);
            control.open(WaitBudget::ZERO).unwrap();
            let err = control.close(WaitBudget::ZERO, &[]).unwrap_err();
            assert!(matches!(err, ProbeError::InvalidState { .. }));
        }

        #[test]
        fn test_close_removal_counts_as_closed() {
            let f = fixture();
            let pane = f.pane;
            let browser = Arc::clone(&f.page.browser);
            let control = control(&f).with_close_action(CloseAction::custom(move |_| {
                browser.remove(pane);
                Ok(())
            }));
            control.open(WaitBudget::ZERO).unwrap();
            control.close(WaitBudget::ZERO, &[]).unwrap();
        }

        #[test]
        fn test_close_zero_budget_survives_rerender() {
            let f = fixture();
            let pane = f.pane;
            let browser = Arc::clone(&f.page.browser);
            let control = control(&f).with_close_action(CloseAction::custom(move |_| {
                browser.set_visible(pane, false);
                browser.inject_stale_reads(1);
                Ok(())
            }));
            control.open(WaitBudget::ZERO).unwrap();
            control.close(WaitBudget::ZERO, &[]).unwrap();
            assert_eq!(control.state().unwrap(), ControlState::Closed);
        }
    }

    mod association_tests {
        use super::*;

        #[test]
        fn test_aria_controls_rejects_foreign_overlay() {
            let f = fixture();
            f.page.browser.mutate(Mutation::SetAttr(
                f.trigger,
                "aria-controls".into(),
                "other-panel".into(),
            ));
            let control = control(&f).with_association(Association::AriaControls);
            assert!(control.open(WaitBudget::ZERO).unwrap().is_none());
        }

        #[test]
        fn test_aria_controls_accepts_own_overlay() {
            let f = fixture();
            f.page.browser.mutate(Mutation::SetAttr(
                f.panel,
                "id".into(),
                "fruit-panel".into(),
            ));
            f.page.browser.mutate(Mutation::SetAttr(
                f.trigger,
                "aria-controls".into(),
                "fruit-panel".into(),
            ));
            let control = control(&f).with_association(Association::AriaControls);
            assert!(control.open(WaitBudget::ZERO).unwrap().is_some());
        }
    }

    #[test]
    fn test_nested_skips_overlay_holding_the_trigger() {
        let page = OverlayPage::new();
        let b = &page.browser;
        let outer = page.add_pane(true);
        let outer_panel = b.append(outer, MockNode::new("div").class("panel"));
        let item = b.append(outer_panel, MockNode::new("button").text("More"));
        let inner = page.add_pane(false);
        let inner_panel = b.append(inner, MockNode::new("div").class("panel"));
        b.on_click(item, Reaction::now(vec![Mutation::SetVisible(inner, true)]));

        let config = OverlayConfig::default();
        let control = OverlayBackedControl::new(
            Component::new(item.handle(), page.shared()),
            &config,
            Some(Query::css(".panel")),
        )
        .with_association(Association::Nested);
        assert_eq!(control.state().unwrap(), ControlState::Closed);
        let opened = control.open(WaitBudget::ZERO).unwrap().unwrap();
        assert_eq!(opened.handle(), &inner_panel.handle());
        assert_eq!(b.clicks_on(&item.handle()), 1);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ControlState::Opening.to_string(), "opening");
        assert_eq!(ControlState::Closed.to_string(), "closed");
    }
}
