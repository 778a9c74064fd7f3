//! [`BrowserHandle`] over an in-memory document.
//!
//! Scripted [`Reaction`]s let a test describe how the page answers clicks
//! and keystrokes, including delayed renders. Delayed mutations are applied
//! lazily: every browser call first applies whatever has come due.

use super::dom::{DomTree, MockId, MockNode, Mutation, Reaction};
use crate::browser::{BrowserHandle, NodeHandle};
use crate::query::Query;
use crate::result::{ProbeError, ProbeResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct KeyReaction {
    key: Option<String>,
    reaction: Reaction,
}

#[derive(Debug)]
struct Scheduled {
    due: Instant,
    mutations: Vec<Mutation>,
}

#[derive(Debug, Default)]
struct MockState {
    dom: DomTree,
    on_click: HashMap<MockId, Vec<Reaction>>,
    on_keys: HashMap<MockId, Vec<KeyReaction>>,
    scheduled: Vec<Scheduled>,
    clicks: Vec<MockId>,
    keys: Vec<(MockId, String)>,
    sleeps: usize,
    stale_reads: usize,
}

impl MockState {
    fn apply_due(&mut self) {
        let now = Instant::now();
        let mut due: Vec<Scheduled> = Vec::new();
        let mut index = 0;
        while index < self.scheduled.len() {
            if self.scheduled[index].due <= now {
                due.push(self.scheduled.remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by_key(|s| s.due);
        for scheduled in due {
            for mutation in scheduled.mutations {
                self.dom.apply(mutation);
            }
        }
    }

    fn fire(&mut self, reaction: Reaction) {
        if reaction.delay.is_zero() {
            for mutation in reaction.mutations {
                self.dom.apply(mutation);
            }
        } else {
            self.scheduled.push(Scheduled {
                due: Instant::now() + reaction.delay,
                mutations: reaction.mutations,
            });
        }
    }

    /// Resolve a handle for a read or dispatch, honouring injected staleness
    fn live(&mut self, handle: &NodeHandle) -> ProbeResult<MockId> {
        if self.stale_reads > 0 {
            self.stale_reads -= 1;
            return Err(ProbeError::stale(handle));
        }
        self.dom.live(handle)
    }
}

/// In-memory browser session for tests and demos
#[derive(Debug, Default)]
pub struct MockBrowser {
    state: Mutex<MockState>,
}

impl MockBrowser {
    /// Empty document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.apply_due();
        state
    }

    /// Append a top-level node to the document body
    pub fn append_root(&self, node: MockNode) -> MockId {
        self.state().dom.insert(None, node, true)
    }

    /// Append a child node
    pub fn append(&self, parent: MockId, node: MockNode) -> MockId {
        self.state().dom.insert(Some(parent), node, true)
    }

    /// Create a child that is not in the document until [`Mutation::Attach`]
    pub fn append_detached(&self, parent: MockId, node: MockNode) -> MockId {
        self.state().dom.insert(Some(parent), node, false)
    }

    /// Apply a mutation right away
    pub fn mutate(&self, mutation: Mutation) {
        self.state().dom.apply(mutation);
    }

    /// Apply mutations after `delay`, independent of any interaction
    pub fn schedule(&self, delay: Duration, mutations: Vec<Mutation>) {
        self.state().fire(Reaction::after(delay, mutations));
    }

    /// Shorthand for [`Mutation::SetVisible`]
    pub fn set_visible(&self, id: MockId, visible: bool) {
        self.mutate(Mutation::SetVisible(id, visible));
    }

    /// Shorthand for [`Mutation::Remove`]
    pub fn remove(&self, id: MockId) {
        self.mutate(Mutation::Remove(id));
    }

    /// Shorthand for [`Mutation::AddClass`]
    pub fn add_class(&self, id: MockId, class: &str) {
        self.mutate(Mutation::AddClass(id, class.to_owned()));
    }

    /// Shorthand for [`Mutation::SetAttr`]
    pub fn set_attr(&self, id: MockId, name: &str, value: &str) {
        self.mutate(Mutation::SetAttr(id, name.to_owned(), value.to_owned()));
    }

    /// Shorthand for [`Mutation::SetText`]
    pub fn set_text(&self, id: MockId, text: &str) {
        self.mutate(Mutation::SetText(id, text.to_owned()));
    }

    /// React to every click on `id`
    pub fn on_click(&self, id: MockId, reaction: Reaction) {
        self.state().on_click.entry(id).or_default().push(reaction);
    }

    /// React when exactly `key` is sent to `id`
    pub fn on_key(&self, id: MockId, key: &str, reaction: Reaction) {
        self.state().on_keys.entry(id).or_default().push(KeyReaction {
            key: Some(key.to_owned()),
            reaction,
        });
    }

    /// React to any text typed into `id` (special keys excluded)
    pub fn on_input(&self, id: MockId, reaction: Reaction) {
        self.state()
            .on_keys
            .entry(id)
            .or_default()
            .push(KeyReaction { key: None, reaction });
    }

    /// Make the next `count` node reads fail with a stale handle
    pub fn inject_stale_reads(&self, count: usize) {
        self.state().stale_reads = count;
    }

    /// Total clicks dispatched
    #[must_use]
    pub fn click_count(&self) -> usize {
        self.state().clicks.len()
    }

    /// Clicks dispatched to one node
    #[must_use]
    pub fn clicks_on(&self, handle: &NodeHandle) -> usize {
        let state = self.state();
        MockId::from_handle(handle)
            .map(|id| state.clicks.iter().filter(|&&c| c == id).count())
            .unwrap_or(0)
    }

    /// Every `send_keys` call, in order
    #[must_use]
    pub fn keys_sent(&self) -> Vec<(NodeHandle, String)> {
        self.state()
            .keys
            .iter()
            .map(|(id, text)| (id.handle(), text.clone()))
            .collect()
    }

    /// Number of interactions (clicks plus key sends)
    #[must_use]
    pub fn dispatch_count(&self) -> usize {
        let state = self.state();
        state.clicks.len() + state.keys.len()
    }

    /// Number of `sleep` calls made by waits
    #[must_use]
    pub fn sleep_count(&self) -> usize {
        self.state().sleeps
    }

    /// Current visibility of a node, ignoring injected staleness
    #[must_use]
    pub fn visible(&self, id: MockId) -> bool {
        self.state().dom.is_visible(id)
    }
}

fn is_special_key(text: &str) -> bool {
    text.chars().all(|c| ('\u{E000}'..='\u{F8FF}').contains(&c))
}

impl BrowserHandle for MockBrowser {
    fn find(&self, context: Option<&NodeHandle>, query: &Query) -> ProbeResult<NodeHandle> {
        self.find_all(context, query)?
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::not_found(query))
    }

    fn find_all(
        &self,
        context: Option<&NodeHandle>,
        query: &Query,
    ) -> ProbeResult<Vec<NodeHandle>> {
        let mut state = self.state();
        let context = context.map(|c| state.live(c)).transpose()?;
        Ok(state
            .dom
            .find_all(context, query)?
            .into_iter()
            .map(MockId::handle)
            .collect())
    }

    fn is_visible(&self, node: &NodeHandle) -> ProbeResult<bool> {
        let mut state = self.state();
        let id = state.live(node)?;
        Ok(state.dom.is_visible(id))
    }

    fn attribute(&self, node: &NodeHandle, name: &str) -> ProbeResult<Option<String>> {
        let mut state = self.state();
        let id = state.live(node)?;
        Ok(state.dom.attribute(id, name))
    }

    fn text(&self, node: &NodeHandle) -> ProbeResult<String> {
        let mut state = self.state();
        let id = state.live(node)?;
        Ok(state.dom.text_content(id))
    }

    fn click(&self, node: &NodeHandle) -> ProbeResult<()> {
        let mut state = self.state();
        let id = state.live(node)?;
        if !state.dom.is_visible(id) {
            return Err(ProbeError::driver(format!(
                "element {node} is not interactable"
            )));
        }
        state.clicks.push(id);
        let reactions = state.on_click.get(&id).cloned().unwrap_or_default();
        for reaction in reactions {
            state.fire(reaction);
        }
        Ok(())
    }

    fn send_keys(&self, node: &NodeHandle, text: &str) -> ProbeResult<()> {
        let mut state = self.state();
        let id = state.live(node)?;
        state.keys.push((id, text.to_owned()));
        let special = is_special_key(text);
        if !special {
            let value = state.dom.attribute(id, "value").unwrap_or_default() + text;
            state
                .dom
                .apply(Mutation::SetAttr(id, "value".to_owned(), value));
        }
        let reactions: Vec<Reaction> = state
            .on_keys
            .get(&id)
            .map(|list| {
                list.iter()
                    .filter(|r| r.key.as_deref().map_or(!special, |k| k == text))
                    .map(|r| r.reaction.clone())
                    .collect()
            })
            .unwrap_or_default();
        for reaction in reactions {
            state.fire(reaction);
        }
        Ok(())
    }

    fn sleep(&self, duration: Duration) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).sleeps += 1;
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::browser::keys;

    #[test]
    fn test_find_not_found() {
        let mock = MockBrowser::new();
        let err = mock.find(None, &Query::css(".missing")).unwrap_err();
        assert!(matches!(err, ProbeError::NotFound { .. }));
    }

    #[test]
    fn test_click_reaction_now() {
        let mock = MockBrowser::new();
        let button = mock.append_root(MockNode::new("button"));
        let panel = mock.append_root(MockNode::new("div").class("panel").hidden());
        mock.on_click(button, Reaction::now(vec![Mutation::ToggleVisible(panel)]));

        mock.click(&button.handle()).unwrap();
        assert!(mock.visible(panel));
        mock.click(&button.handle()).unwrap();
        assert!(!mock.visible(panel));
        assert_eq!(mock.click_count(), 2);
    }

    #[test]
    fn test_delayed_reaction() {
        let mock = MockBrowser::new();
        let button = mock.append_root(MockNode::new("button"));
        let panel = mock.append_root(MockNode::new("div").hidden());
        mock.on_click(
            button,
            Reaction::after(Duration::from_millis(30), vec![Mutation::SetVisible(panel, true)]),
        );
        mock.click(&button.handle()).unwrap();
        assert!(!mock.visible(panel));
        std::thread::sleep(Duration::from_millis(60));
        assert!(mock.visible(panel));
    }

    #[test]
    fn test_hidden_element_not_clickable() {
        let mock = MockBrowser::new();
        let button = mock.append_root(MockNode::new("button").hidden());
        assert!(mock.click(&button.handle()).is_err());
        assert_eq!(mock.click_count(), 0);
    }

    #[test]
    fn test_send_keys_updates_value() {
        let mock = MockBrowser::new();
        let input = mock.append_root(MockNode::new("input"));
        mock.send_keys(&input.handle(), "ab").unwrap();
        mock.send_keys(&input.handle(), "c").unwrap();
        mock.send_keys(&input.handle(), keys::ESCAPE).unwrap();
        assert_eq!(
            mock.attribute(&input.handle(), "value").unwrap().as_deref(),
            Some("abc")
        );
        assert_eq!(mock.keys_sent().len(), 3);
    }

    #[test]
    fn test_key_reaction_filters_key() {
        let mock = MockBrowser::new();
        let input = mock.append_root(MockNode::new("input"));
        let panel = mock.append_root(MockNode::new("div"));
        mock.on_key(input, keys::ESCAPE, Reaction::now(vec![Mutation::SetVisible(panel, false)]));
        mock.send_keys(&input.handle(), "x").unwrap();
        assert!(mock.visible(panel));
        mock.send_keys(&input.handle(), keys::ESCAPE).unwrap();
        assert!(!mock.visible(panel));
    }

    #[test]
    fn test_injected_stale_reads() {
        let mock = MockBrowser::new();
        let div = mock.append_root(MockNode::new("div"));
        mock.inject_stale_reads(1);
        assert!(mock.is_visible(&div.handle()).unwrap_err().is_stale());
        assert!(mock.is_visible(&div.handle()).unwrap());
    }

    #[test]
    fn test_detached_until_attached() {
        let mock = MockBrowser::new();
        let host = mock.append_root(MockNode::new("div").class("host"));
        let pane = mock.append_detached(host, MockNode::new("div").class("pane"));
        assert!(mock.find_all(None, &Query::css(".pane")).unwrap().is_empty());
        mock.mutate(Mutation::Attach(pane));
        assert_eq!(mock.find_all(None, &Query::css(".pane")).unwrap().len(), 1);
    }
}
