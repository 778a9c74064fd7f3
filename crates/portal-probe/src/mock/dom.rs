//! In-memory DOM tree backing [`MockBrowser`](super::MockBrowser).

use super::selector::{parse_selector_list, Combinator, Complex, Compound, ElementView};
use crate::browser::NodeHandle;
use crate::query::Query;
use crate::result::{ProbeError, ProbeResult};
use std::collections::BTreeMap;
use std::time::Duration;

const HANDLE_PREFIX: &str = "mock-";

/// Index of a node in a mock document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MockId(pub(crate) usize);

impl MockId {
    /// Handle the browser hands out for this node
    #[must_use]
    pub fn handle(self) -> NodeHandle {
        NodeHandle::new(format!("{HANDLE_PREFIX}{}", self.0))
    }

    /// Parse a handle produced by [`MockId::handle`]
    pub fn from_handle(handle: &NodeHandle) -> ProbeResult<Self> {
        handle
            .id()
            .strip_prefix(HANDLE_PREFIX)
            .and_then(|n| n.parse().ok())
            .map(Self)
            .ok_or_else(|| ProbeError::driver(format!("foreign node handle {handle}")))
    }
}

/// Node description used to build a mock document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockNode {
    pub(crate) tag: String,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: BTreeMap<String, String>,
    pub(crate) text: String,
    pub(crate) visible: bool,
}

impl MockNode {
    /// Element with the given tag name
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            text: String::new(),
            visible: true,
        }
    }

    /// Add whitespace-separated classes
    #[must_use]
    pub fn class(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            if !self.classes.iter().any(|c| c == class) {
                self.classes.push(class.to_owned());
            }
        }
        self
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        let _ = self.attrs.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Set the node's own text
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_owned();
        self
    }

    /// Start hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// A change applied to the mock document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Show or hide a node
    SetVisible(MockId, bool),
    /// Flip a node's visibility
    ToggleVisible(MockId),
    /// Attach a node created with `append_detached`
    Attach(MockId),
    /// Remove a node and its subtree; their handles go stale
    Remove(MockId),
    /// Add a class
    AddClass(MockId, String),
    /// Remove a class
    RemoveClass(MockId, String),
    /// Set an attribute
    SetAttr(MockId, String, String),
    /// Remove an attribute
    RemoveAttr(MockId, String),
    /// Replace a node's own text
    SetText(MockId, String),
}

/// Mutations scheduled in response to an interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub(crate) delay: Duration,
    pub(crate) mutations: Vec<Mutation>,
}

impl Reaction {
    /// Apply the mutations as part of the interaction itself
    #[must_use]
    pub fn now(mutations: Vec<Mutation>) -> Self {
        Self {
            delay: Duration::ZERO,
            mutations,
        }
    }

    /// Apply the mutations once `delay` has passed
    #[must_use]
    pub fn after(delay: Duration, mutations: Vec<Mutation>) -> Self {
        Self { delay, mutations }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) node: MockNode,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) attached: bool,
}

impl ElementView for NodeData {
    fn tag(&self) -> &str {
        &self.node.tag
    }

    fn has_class(&self, class: &str) -> bool {
        self.node.classes.iter().any(|c| c == class)
    }

    fn attr(&self, name: &str) -> Option<&str> {
        if name == "class" {
            return None;
        }
        self.node.attrs.get(name).map(String::as_str)
    }
}

/// Arena of nodes plus the document's top-level children
#[derive(Debug, Clone, Default)]
pub(crate) struct DomTree {
    nodes: Vec<NodeData>,
    roots: Vec<usize>,
}

impl DomTree {
    pub(crate) fn insert(&mut self, parent: Option<MockId>, node: MockNode, attached: bool) -> MockId {
        let index = self.nodes.len();
        let parent_attached = parent.map_or(true, |p| self.nodes[p.0].attached);
        self.nodes.push(NodeData {
            node,
            parent: parent.map(|p| p.0),
            children: Vec::new(),
            attached: attached && parent_attached,
        });
        match parent {
            Some(p) => self.nodes[p.0].children.push(index),
            None => self.roots.push(index),
        }
        MockId(index)
    }

    fn get(&self, id: MockId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    /// Resolve a handle to a live node
    pub(crate) fn live(&self, handle: &NodeHandle) -> ProbeResult<MockId> {
        let id = MockId::from_handle(handle)?;
        match self.get(id) {
            Some(data) if data.attached => Ok(id),
            Some(_) => Err(ProbeError::stale(handle)),
            None => Err(ProbeError::driver(format!("unknown node handle {handle}"))),
        }
    }

    pub(crate) fn is_visible(&self, id: MockId) -> bool {
        let mut current = Some(id.0);
        while let Some(index) = current {
            let data = &self.nodes[index];
            if !data.attached || !data.node.visible || data.node.attrs.contains_key("hidden") {
                return false;
            }
            current = data.parent;
        }
        true
    }

    pub(crate) fn attribute(&self, id: MockId, name: &str) -> Option<String> {
        let node = &self.nodes[id.0].node;
        if name == "class" {
            return (!node.classes.is_empty()).then(|| node.classes.join(" "));
        }
        node.attrs.get(name).cloned()
    }

    /// Concatenated text of the node and its attached descendants
    pub(crate) fn text_content(&self, id: MockId) -> String {
        let mut out = String::new();
        self.collect_text(id.0, &mut out);
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, index: usize, out: &mut String) {
        let data = &self.nodes[index];
        if !data.node.text.is_empty() {
            out.push(' ');
            out.push_str(&data.node.text);
        }
        for &child in &data.children {
            if self.nodes[child].attached {
                self.collect_text(child, out);
            }
        }
    }

    /// Attached descendants of `context` (or of the document), in document order
    fn descendants(&self, context: Option<MockId>) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = match context {
            Some(id) => self.nodes[id.0].children.iter().rev().copied().collect(),
            None => self.roots.iter().rev().copied().collect(),
        };
        while let Some(index) = stack.pop() {
            let data = &self.nodes[index];
            if !data.attached {
                continue;
            }
            out.push(index);
            stack.extend(data.children.iter().rev().copied());
        }
        out
    }

    pub(crate) fn find_all(&self, context: Option<MockId>, query: &Query) -> ProbeResult<Vec<MockId>> {
        let candidates = self.descendants(context);
        let matched: Vec<usize> = match query {
            Query::Css(css) => {
                let list = parse_selector_list(css)?;
                candidates
                    .into_iter()
                    .filter(|&i| list.iter().any(|c| self.matches_complex(i, c)))
                    .collect()
            }
            Query::CssWithText { css, text } => {
                let list = parse_selector_list(css)?;
                candidates
                    .into_iter()
                    .filter(|&i| list.iter().any(|c| self.matches_complex(i, c)))
                    .filter(|&i| self.text_content(MockId(i)).contains(text.as_str()))
                    .collect()
            }
            Query::TestId(id) => candidates
                .into_iter()
                .filter(|&i| self.nodes[i].attr("data-testid") == Some(id.as_str()))
                .collect(),
            Query::Text(text) => candidates
                .into_iter()
                .filter(|&i| self.nodes[i].node.text.contains(text.as_str()))
                .collect(),
            Query::XPath(expr) => {
                return Err(ProbeError::driver(format!(
                    "XPath is not supported by the mock browser: {expr}"
                )))
            }
        };
        Ok(matched.into_iter().map(MockId).collect())
    }

    fn matches_complex(&self, index: usize, complex: &Complex) -> bool {
        self.matches_from(index, &complex.parts, complex.parts.len() - 1)
    }

    /// Right-to-left match of `parts[..=at]` ending at node `index`
    fn matches_from(&self, index: usize, parts: &[(Combinator, Compound)], at: usize) -> bool {
        let (combinator, compound) = &parts[at];
        if !compound.matches(&self.nodes[index]) {
            return false;
        }
        if at == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => self.nodes[index]
                .parent
                .is_some_and(|p| self.matches_from(p, parts, at - 1)),
            Combinator::Descendant => {
                let mut ancestor = self.nodes[index].parent;
                while let Some(p) = ancestor {
                    if self.matches_from(p, parts, at - 1) {
                        return true;
                    }
                    ancestor = self.nodes[p].parent;
                }
                false
            }
        }
    }

    pub(crate) fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::SetVisible(id, visible) => self.nodes[id.0].node.visible = visible,
            Mutation::ToggleVisible(id) => {
                let node = &mut self.nodes[id.0].node;
                node.visible = !node.visible;
            }
            Mutation::Attach(id) => self.set_attached(id.0, true),
            Mutation::Remove(id) => self.set_attached(id.0, false),
            Mutation::AddClass(id, class) => {
                let node = &mut self.nodes[id.0].node;
                if !node.classes.contains(&class) {
                    node.classes.push(class);
                }
            }
            Mutation::RemoveClass(id, class) => self.nodes[id.0].node.classes.retain(|c| *c != class),
            Mutation::SetAttr(id, name, value) => {
                let _ = self.nodes[id.0].node.attrs.insert(name, value);
            }
            Mutation::RemoveAttr(id, name) => {
                let _ = self.nodes[id.0].node.attrs.remove(&name);
            }
            Mutation::SetText(id, text) => self.nodes[id.0].node.text = text,
        }
    }

    fn set_attached(&mut self, index: usize, attached: bool) {
        let mut stack = vec![index];
        while let Some(i) = stack.pop() {
            self.nodes[i].attached = attached;
            stack.extend(self.nodes[i].children.iter().copied());
        }
    }
}
