//! Minimal CSS selector matching for the in-memory DOM.
//!
//! Supports compound selectors (`tag.class#id[attr=value]`, `*`), the
//! descendant and child combinators, and comma-separated selector lists.
//! Pseudo-classes and sibling combinators are rejected.

use crate::result::{ProbeError, ProbeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Compound {
    pub(crate) tag: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<(String, Option<String>)>,
}

/// What a compound needs to know about a node
pub(crate) trait ElementView {
    fn tag(&self) -> &str;
    fn has_class(&self, class: &str) -> bool;
    fn attr(&self, name: &str) -> Option<&str>;
}

impl Compound {
    pub(crate) fn matches(&self, el: &impl ElementView) -> bool {
        if let Some(tag) = &self.tag {
            if !el.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|(name, expected)| match expected {
            Some(v) => el.attr(name) == Some(v.as_str()),
            None => el.attr(name).is_some(),
        })
    }
}

/// One complex selector; the combinator of the first part is ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Complex {
    pub(crate) parts: Vec<(Combinator, Compound)>,
}

/// Parse a comma-separated selector list
pub(crate) fn parse_selector_list(source: &str) -> ProbeResult<Vec<Complex>> {
    source.split(',').map(parse_complex).collect()
}

fn unsupported(source: &str, why: &str) -> ProbeError {
    ProbeError::driver(format!("unsupported selector {source:?}: {why}"))
}

fn parse_complex(source: &str) -> ProbeResult<Complex> {
    let chars: Vec<char> = source.trim().chars().collect();
    let mut parts = Vec::new();
    let mut pending = Combinator::Descendant;
    let mut i = 0;

    loop {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }
        if chars[i] == '>' {
            if parts.is_empty() {
                return Err(unsupported(source, "leading combinator"));
            }
            pending = Combinator::Child;
            i += 1;
            continue;
        }
        let (compound, next) = parse_compound(source, &chars, i)?;
        parts.push((pending, compound));
        pending = Combinator::Descendant;
        i = next;
    }

    if parts.is_empty() {
        return Err(unsupported(source, "empty selector"));
    }
    if pending == Combinator::Child {
        return Err(unsupported(source, "trailing combinator"));
    }
    Ok(Complex { parts })
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn ident(source: &str, chars: &[char], start: usize) -> ProbeResult<(String, usize)> {
    let mut end = start;
    while end < chars.len() && is_ident_char(chars[end]) {
        end += 1;
    }
    if end == start {
        return Err(unsupported(source, "expected identifier"));
    }
    Ok((chars[start..end].iter().collect(), end))
}

fn parse_compound(source: &str, chars: &[char], start: usize) -> ProbeResult<(Compound, usize)> {
    let mut compound = Compound::default();
    let mut i = start;

    while i < chars.len() {
        match chars[i] {
            '*' => i += 1,
            '#' => {
                let (name, next) = ident(source, chars, i + 1)?;
                compound.id = Some(name);
                i = next;
            }
            '.' => {
                let (name, next) = ident(source, chars, i + 1)?;
                compound.classes.push(name);
                i = next;
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|p| p + i)
                    .ok_or_else(|| unsupported(source, "unterminated attribute"))?;
                let inner: String = chars[i + 1..close].iter().collect();
                compound.attrs.push(parse_attr(source, &inner)?);
                i = close + 1;
            }
            ch if ch.is_whitespace() || ch == '>' => break,
            ch if is_ident_char(ch) => {
                if i != start {
                    return Err(unsupported(source, "tag must come first"));
                }
                let (name, next) = ident(source, chars, i)?;
                compound.tag = Some(name.to_ascii_lowercase());
                i = next;
            }
            other => return Err(unsupported(source, &format!("unexpected {other:?}"))),
        }
    }

    Ok((compound, i))
}

fn parse_attr(source: &str, inner: &str) -> ProbeResult<(String, Option<String>)> {
    match inner.split_once('=') {
        Some((name, value)) => {
            let name = name.trim();
            if name.is_empty() || !name.chars().all(is_ident_char) {
                return Err(unsupported(source, "bad attribute name"));
            }
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            Ok((name.to_owned(), Some(value.to_owned())))
        }
        None => {
            let name = inner.trim();
            if name.is_empty() || !name.chars().all(is_ident_char) {
                return Err(unsupported(source, "bad attribute name"));
            }
            Ok((name.to_owned(), None))
        }
    }
}
