//! Query values for locating nodes relative to a context.
//!
//! A [`Query`] is a side-effect-free description of how to find nodes. The
//! resolution logic never looks inside one; only the [`BrowserHandle`]
//! implementation interprets it.
//!
//! [`BrowserHandle`]: crate::BrowserHandle

use serde::{Deserialize, Serialize};
use std::fmt;

/// How to find nodes relative to some context node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Query {
    /// CSS selector (e.g. `div.cdk-overlay-pane`)
    Css(String),
    /// XPath expression
    XPath(String),
    /// Test ID selector (`data-testid` attribute)
    TestId(String),
    /// Element whose own text contains the given string
    Text(String),
    /// CSS selector further filtered by contained text
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Query {
    /// Create a CSS query
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath query
    #[must_use]
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }

    /// Create a test ID query
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a text query
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Narrow a CSS query to elements containing `text`.
    ///
    /// Non-CSS queries are returned unchanged.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        match self {
            Self::Css(css) => Self::CssWithText {
                css,
                text: text.into(),
            },
            other => other,
        }
    }

    /// CSS selector part, if this is a CSS-based query
    #[must_use]
    pub fn css_selector(&self) -> Option<&str> {
        match self {
            Self::Css(css) | Self::CssWithText { css, .. } => Some(css),
            _ => None,
        }
    }

    /// Whether the query has an empty selector body
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Css(s) | Self::XPath(s) | Self::TestId(s) | Self::Text(s) => s.trim().is_empty(),
            Self::CssWithText { css, .. } => css.trim().is_empty(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::TestId(id) => write!(f, "testid={id}"),
            Self::Text(t) => write!(f, "text={t:?}"),
            Self::CssWithText { css, text } => write!(f, "css={css} text={text:?}"),
        }
    }
}

impl From<&str> for Query {
    fn from(selector: &str) -> Self {
        Self::css(selector)
    }
}
