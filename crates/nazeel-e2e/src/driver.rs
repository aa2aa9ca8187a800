//! Driver - Abstract Browser Automation Traits
//!
//! Page objects talk to the browser only through [`Driver`] and [`Element`].
//! Implementations:
//!
//! - `ChromiumDriver` - CDP via chromiumoxide (`browser` feature)
//! - `DelayedDriver` - decorator adding settle delays and retries
//! - `MockDriver` - scriptable in-memory DOM for unit tests
//!
//! Handles are shared as `Arc<dyn ...>` so a decorator can re-wrap every
//! element it hands out without owning the underlying browser.

use crate::locator::By;
use crate::result::E2eResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Shared element handle
pub type ElementRef = Arc<dyn Element>;

/// Shared driver handle
pub type DriverRef = Arc<dyn Driver>;

/// Keyboard keys dispatched through [`Driver::perform`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Printable character
    Char(char),
    /// Page Down
    PageDown,
    /// Page Up
    PageUp,
    /// Arrow Down
    ArrowDown,
    /// Arrow Up
    ArrowUp,
    /// Enter / Return
    Enter,
    /// Tab
    Tab,
    /// Escape
    Escape,
    /// Backspace
    Backspace,
}

impl Key {
    /// DOM `KeyboardEvent.key` name
    #[must_use]
    pub fn dom_name(&self) -> String {
        match self {
            Self::Char(c) => c.to_string(),
            Self::PageDown => "PageDown".into(),
            Self::PageUp => "PageUp".into(),
            Self::ArrowDown => "ArrowDown".into(),
            Self::ArrowUp => "ArrowUp".into(),
            Self::Enter => "Enter".into(),
            Self::Tab => "Tab".into(),
            Self::Escape => "Escape".into(),
            Self::Backspace => "Backspace".into(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dom_name())
    }
}

/// Captured screenshot
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Timestamp when screenshot was taken
    pub timestamp: std::time::SystemTime,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            timestamp: std::time::SystemTime::now(),
        }
    }

    /// Get the size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// A located DOM element
#[async_trait]
pub trait Element: Send + Sync + fmt::Debug {
    /// Click the element
    async fn click(&self) -> E2eResult<()>;

    /// Type text into the element
    async fn send_keys(&self, text: &str) -> E2eResult<()>;

    /// Clear an input's value
    async fn clear(&self) -> E2eResult<()>;

    /// Submit the enclosing form
    async fn submit(&self) -> E2eResult<()>;

    /// Rendered text
    async fn text(&self) -> E2eResult<String>;

    /// Attribute or property value
    async fn attribute(&self, name: &str) -> E2eResult<Option<String>>;

    /// Computed CSS property value
    async fn css_value(&self, property: &str) -> E2eResult<String>;

    /// Whether the element is rendered and visible
    async fn is_displayed(&self) -> E2eResult<bool>;

    /// Whether the element accepts input
    async fn is_enabled(&self) -> E2eResult<bool>;

    /// Scroll the element into the viewport
    async fn scroll_into_view(&self) -> E2eResult<()>;

    /// First descendant matching `by`
    async fn find_element(&self, by: &By) -> E2eResult<ElementRef>;

    /// All descendants matching `by`
    async fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementRef>>;
}

/// A browser session
#[async_trait]
pub trait Driver: Send + Sync + fmt::Debug {
    /// Navigate to URL
    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// Get current URL
    async fn current_url(&self) -> E2eResult<String>;

    /// Document title
    async fn title(&self) -> E2eResult<String>;

    /// First element matching `by`
    async fn find_element(&self, by: &By) -> E2eResult<ElementRef>;

    /// All elements matching `by`
    async fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementRef>>;

    /// Element that currently has focus
    async fn active_element(&self) -> E2eResult<ElementRef>;

    /// Execute JavaScript in page context
    async fn execute_script(&self, script: &str) -> E2eResult<serde_json::Value>;

    /// Dispatch a key sequence to the focused element
    async fn perform(&self, keys: &[Key]) -> E2eResult<()>;

    /// Scope subsequent finds to the iframe matching `by`
    async fn switch_to_frame(&self, by: &By) -> E2eResult<()>;

    /// Return to the top-level document
    async fn switch_to_default_content(&self) -> E2eResult<()>;

    /// Take screenshot
    async fn screenshot(&self) -> E2eResult<Screenshot>;

    /// Close the browser
    async fn quit(&self) -> E2eResult<()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_key_dom_names() {
        assert_eq!(Key::PageDown.dom_name(), "PageDown");
        assert_eq!(Key::ArrowUp.to_string(), "ArrowUp");
        assert_eq!(Key::Char('7').dom_name(), "7");
    }

    #[test]
    fn test_screenshot_size() {
        let shot = Screenshot::new(vec![0x89, b'P', b'N', b'G']);
        assert_eq!(shot.size_bytes(), 4);
    }
}
