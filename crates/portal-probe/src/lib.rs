//! Portal Probe: overlay-aware UI automation helpers
//!
//! Component libraries render dropdowns, date pickers, menus and
//! notifications into a shared overlay container at the end of the document
//! instead of next to the element that opened them. Portal Probe finds those
//! overlays again and drives them through one synchronous open/close protocol
//! with bounded waits.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────┐   ┌────────────────┐
//! │ widgets      │──►│ OverlayBackedControl │──►│ await_condition│
//! │ Select, Menu │   │ open / close         │   │ (wait budget)  │
//! └──────────────┘   └──────────┬───────────┘   └───────┬────────┘
//!                               ▼                       │
//!                    ┌──────────────────────┐           │
//!                    │ NamedOverlayResolver │◄──────────┘
//!                    │ OverlayResolver      │
//!                    └──────────┬───────────┘
//!                               ▼
//!                    ┌──────────────────────┐
//!                    │ BrowserHandle        │  (MockBrowser in tests)
//!                    └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use portal_probe::mock::{MockNode, Mutation, OverlayPage, Reaction};
//! use portal_probe::{Component, OverlayBackedControl, OverlayConfig, Query, WaitBudget};
//!
//! let page = OverlayPage::new();
//! let trigger = page.browser.append(page.main, MockNode::new("button"));
//! let pane = page.add_pane(false);
//! page.browser.append(pane, MockNode::new("div").class("panel"));
//! page.browser.on_click(trigger, Reaction::now(vec![Mutation::SetVisible(pane, true)]));
//!
//! let control = OverlayBackedControl::new(
//!     Component::new(trigger.handle(), page.shared()),
//!     &OverlayConfig::default(),
//!     Some(Query::css(".panel")),
//! );
//! assert!(control.open(WaitBudget::from_millis(500)).unwrap().is_some());
//! ```

#![warn(missing_docs)]

mod browser;
mod component;
mod config;
mod control;
pub mod logging;
pub mod mock;
mod overlay;
mod query;
mod result;
mod wait;
mod widgets;

pub use browser::{keys, BrowserHandle, NodeHandle, SharedBrowser};
pub use component::{Component, FromComponent};
pub use config::{KindMarkers, OverlayConfig, StateMarkers, DEFAULT_PREFIX};
pub use control::{
    ActionContext, Association, CloseAction, ControlState, CustomAction, OpenAction,
    OverlayBackedControl,
};
pub use overlay::{NamedOverlayResolver, OverlayContainer, OverlayResolver};
pub use query::Query;
pub use result::{ProbeError, ProbeResult};
pub use wait::{
    await_absent, await_condition, await_some, poll_until, WaitBudget, WaitOptions, WaitResult,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};
pub use widgets::{Autocomplete, DatePicker, Menu, MenuItem, Notification, OverlayOption, Select};
