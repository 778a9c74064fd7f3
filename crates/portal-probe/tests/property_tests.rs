//! Property-based tests for overlay resolution.
//!
//! Random visibility layouts of overlay panes must always resolve to the
//! last visible pane, and repeated resolution must be stable.

use portal_probe::mock::strategies::expected_top;
use portal_probe::mock::{visibility_layout, MockId, MockNode, OverlayPage};
use portal_probe::{
    await_condition, NamedOverlayResolver, OverlayConfig, OverlayResolver, Query, WaitOptions,
};
use proptest::prelude::*;

fn build(layout: &[bool]) -> (OverlayPage, Vec<MockId>) {
    let page = OverlayPage::new();
    let panes = layout.iter().map(|&visible| page.add_pane(visible)).collect();
    (page, panes)
}

fn root() -> Query {
    Query::css(".cdk-overlay-container")
}

proptest! {
    /// The topmost container is the last visible pane in document order.
    #[test]
    fn prop_top_is_last_visible(layout in visibility_layout()) {
        let (page, panes) = build(&layout);
        let resolver = OverlayResolver::new(page.shared(), &OverlayConfig::default());
        let top = resolver.find_top_visible_container(&root()).unwrap();
        let expected = expected_top(&layout).map(|i| panes[i].handle());
        prop_assert_eq!(top.map(|c| c.component().handle().clone()), expected);
    }

    /// Visible containers keep document order and drop hidden panes.
    #[test]
    fn prop_visible_containers_in_order(layout in visibility_layout()) {
        let (page, panes) = build(&layout);
        let resolver = OverlayResolver::new(page.shared(), &OverlayConfig::default());
        let visible: Vec<_> = resolver
            .find_visible_containers(&root())
            .unwrap()
            .into_iter()
            .map(|c| c.component().handle().clone())
            .collect();
        let expected: Vec<_> = panes
            .iter()
            .zip(&layout)
            .filter(|(_, visible)| **visible)
            .map(|(p, _)| p.handle())
            .collect();
        prop_assert_eq!(visible, expected);
    }

    /// Resolving twice against an unchanged page gives the same answer.
    #[test]
    fn prop_resolution_is_deterministic(layout in visibility_layout()) {
        let (page, panes) = build(&layout);
        for &pane in &panes {
            page.browser.append(pane, MockNode::new("div").class("panel"));
        }
        let named = NamedOverlayResolver::new(page.shared(), &OverlayConfig::default());
        let marker = Query::css(".panel");
        let first = named.find_top_visible_overlay(&root(), Some(&marker)).unwrap();
        let second = named.find_top_visible_overlay(&root(), Some(&marker)).unwrap();
        prop_assert_eq!(first.is_some(), expected_top(&layout).is_some());
        prop_assert_eq!(first, second);
    }

    /// A zero budget never sleeps and polls exactly once.
    #[test]
    fn prop_zero_budget_polls_once(found in any::<bool>()) {
        let page = OverlayPage::new();
        let mut polls = 0;
        let result = await_condition(
            &*page.browser,
            &WaitOptions::immediate(),
            "anything",
            || {
                polls += 1;
                Ok(found.then_some(()))
            },
        )
        .unwrap();
        prop_assert_eq!(polls, 1);
        prop_assert_eq!(result.is_some(), found);
        prop_assert_eq!(page.browser.sleep_count(), 0);
    }
}
