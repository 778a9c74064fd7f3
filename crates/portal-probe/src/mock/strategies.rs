//! Proptest strategies for overlay layouts.
//!
//! ```rust,ignore
//! proptest! {
//!     #[test]
//!     fn prop_top_is_last_visible(layout in visibility_layout()) {
//!         let page = OverlayPage::new();
//!         let panes: Vec<_> = layout.iter().map(|&v| page.add_pane(v)).collect();
//!         // ...
//!     }
//! }
//! ```

#[cfg(feature = "proptest")]
use proptest::prelude::*;

/// Maximum number of panes generated per layout
pub const MAX_PANES: usize = 8;

/// Index of the pane expected on top: the last visible one
#[must_use]
pub fn expected_top(layout: &[bool]) -> Option<usize> {
    layout.iter().rposition(|&visible| visible)
}

/// Visibility flags for up to [`MAX_PANES`] overlay panes, in mount order
#[cfg(feature = "proptest")]
pub fn visibility_layout() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 0..=MAX_PANES)
}
