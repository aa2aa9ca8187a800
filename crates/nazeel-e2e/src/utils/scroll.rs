//! Keyboard scrolling with limit detection.
//!
//! Each helper reads `window.scrollY`, presses a key, waits for the page to
//! settle and reads again. An unchanged position means the page is already
//! at its top or bottom, reported as [`E2eError::ScrollLimitReached`].

use crate::driver::{Driver, Element, Key};
use crate::result::{E2eError, E2eResult};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Settle after a Page Up / Page Down
pub const PAGE_SCROLL_SETTLE: Duration = Duration::from_millis(500);
/// Settle after an arrow key
pub const LITTLE_SCROLL_SETTLE: Duration = Duration::from_millis(300);

const SCROLL_Y: &str = "return window.scrollY;";

/// Which way a scroll went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Down,
    Up,
}

impl fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Down => f.write_str("down"),
            Self::Up => f.write_str("up"),
        }
    }
}

/// Current vertical scroll offset in CSS pixels
pub async fn scroll_position(driver: &dyn Driver) -> E2eResult<i64> {
    let value = driver.execute_script(SCROLL_Y).await?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|y| y.round() as i64))
        .ok_or_else(|| E2eError::Script {
            message: format!("window.scrollY returned {value}"),
        })
}

async fn scroll_with(driver: &dyn Driver, key: Key, settle: Duration, direction: ScrollDirection) -> E2eResult<()> {
    let before = scroll_position(driver).await?;
    driver.perform(&[key]).await?;
    tokio::time::sleep(settle).await;
    let after = scroll_position(driver).await?;
    debug!(%key, before, after, "Scrolled");
    if after == before {
        return Err(E2eError::ScrollLimitReached {
            direction: direction.to_string(),
        });
    }
    Ok(())
}

/// One page down
pub async fn scroll_down_page(driver: &dyn Driver) -> E2eResult<()> {
    scroll_with(driver, Key::PageDown, PAGE_SCROLL_SETTLE, ScrollDirection::Down).await
}

/// One page up
pub async fn scroll_up_page(driver: &dyn Driver) -> E2eResult<()> {
    scroll_with(driver, Key::PageUp, PAGE_SCROLL_SETTLE, ScrollDirection::Up).await
}

/// One arrow step down
pub async fn scroll_down_little(driver: &dyn Driver) -> E2eResult<()> {
    scroll_with(driver, Key::ArrowDown, LITTLE_SCROLL_SETTLE, ScrollDirection::Down).await
}

/// One arrow step up
pub async fn scroll_up_little(driver: &dyn Driver) -> E2eResult<()> {
    scroll_with(driver, Key::ArrowUp, LITTLE_SCROLL_SETTLE, ScrollDirection::Up).await
}

/// Bring `element` into the viewport and let the page settle
pub async fn scroll_element_into_view(element: &dyn Element) -> E2eResult<()> {
    element.scroll_into_view().await?;
    tokio::time::sleep(LITTLE_SCROLL_SETTLE).await;
    Ok(())
}
