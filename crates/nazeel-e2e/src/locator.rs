//! Element locators.
//!
//! `By` mirrors the locator strategies the page objects use. Every strategy
//! except XPath lowers to a CSS selector; XPath is evaluated through
//! `document.evaluate` by backends that need a script form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Element locator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum By {
    /// CSS selector (e.g., "tbody>tr")
    Css(String),
    /// XPath expression
    XPath(String),
    /// Element id attribute
    Id(String),
    /// Single class name
    ClassName(String),
    /// `name` attribute
    Name(String),
    /// Tag name
    Tag(String),
}

impl By {
    /// Create a CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath locator
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create an id locator
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a class-name locator
    #[must_use]
    pub fn class_name(name: impl Into<String>) -> Self {
        Self::ClassName(name.into())
    }

    /// Create a `name` attribute locator
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Create a tag-name locator
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    /// Whether this locator needs XPath evaluation
    #[must_use]
    pub const fn is_xpath(&self) -> bool {
        matches!(self, Self::XPath(_))
    }

    /// Lower to a CSS selector. Returns `None` for XPath.
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Css(s) | Self::Tag(s) => Some(s.clone()),
            Self::Id(id) => Some(format!("[id={}]", quote(id))),
            Self::ClassName(name) => Some(format!(".{name}")),
            Self::Name(name) => Some(format!("[name={}]", quote(name))),
            Self::XPath(_) => None,
        }
    }

    /// JavaScript expression returning an array of matches under `root`
    #[must_use]
    pub fn to_query_all(&self, root: &str) -> String {
        match self {
            Self::XPath(expr) => format!(
                "(() => {{ const r = document.evaluate({expr:?}, {root}, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                 const out = []; for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); \
                 return out; }})()"
            ),
            other => {
                let css = other.to_css().unwrap_or_default();
                format!("Array.from({root}.querySelectorAll({css:?}))")
            }
        }
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Id(s) => write!(f, "id={s}"),
            Self::ClassName(s) => write!(f, "class={s}"),
            Self::Name(s) => write!(f, "name={s}"),
            Self::Tag(s) => write!(f, "tag={s}"),
        }
    }
}
