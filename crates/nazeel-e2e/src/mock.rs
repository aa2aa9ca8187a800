//! Mock Driver Module
//!
//! A scriptable in-memory DOM implementing [`Driver`] and [`Element`] so the
//! decorator, waits, helpers and page objects can be exercised without a
//! browser.
//!
//! ## Example
//!
//! ```rust,ignore
//! let save = MockElement::new("save").into_ref();
//! save.fail_next(MockAction::Click, [MockFailure::NotInteractable]);
//! let driver = MockDriver::new()
//!     .with_url("https://staging.nazeel.net:9002/dashboard")
//!     .with_element(By::css(".save"), save.clone());
//! ```

use crate::driver::{Driver, Element, ElementRef, Key, Screenshot};
use crate::locator::By;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Scripted failures and call log
// ============================================================================

/// Element operations that can be scripted to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockAction {
    /// `click`
    Click,
    /// `send_keys`
    SendKeys,
    /// `clear`
    Clear,
    /// `submit`
    Submit,
}

/// Failure injected into a scripted operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Element briefly missing
    NotFound,
    /// Element covered or disabled
    NotInteractable,
    /// Element re-rendered
    Stale,
    /// Overlay swallowed the click
    Intercepted,
    /// Non-retryable script failure
    Fatal,
}

impl MockFailure {
    fn into_error(self, name: &str) -> E2eError {
        match self {
            Self::NotFound => E2eError::NoSuchElement {
                locator: name.to_string(),
            },
            Self::NotInteractable => E2eError::ElementNotInteractable {
                message: name.to_string(),
            },
            Self::Stale => E2eError::StaleElement {
                message: name.to_string(),
            },
            Self::Intercepted => E2eError::ClickIntercepted {
                message: name.to_string(),
            },
            Self::Fatal => E2eError::Script {
                message: format!("{name}: scripted failure"),
            },
        }
    }
}

/// One recorded call against a mock handle
#[derive(Debug, Clone)]
pub struct MockCall {
    /// Operation name (e.g., "click", "text")
    pub op: &'static str,
    /// Argument, if any
    pub arg: Option<String>,
    /// When the call was made (tokio clock, so paused time is honoured)
    pub at: Instant,
}

// ============================================================================
// MockElement
// ============================================================================

#[derive(Debug, Default)]
struct ElementState {
    text: String,
    value: String,
    attributes: HashMap<String, String>,
    css: HashMap<String, String>,
    displayed: VecDeque<bool>,
    enabled: bool,
    stale: bool,
    children: HashMap<By, Vec<Arc<MockElement>>>,
    failures: HashMap<MockAction, VecDeque<MockFailure>>,
    calls: Vec<MockCall>,
}

/// Scriptable element
#[derive(Debug)]
pub struct MockElement {
    name: String,
    state: Mutex<ElementState>,
}

impl MockElement {
    /// Create a visible, enabled element with no text
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let state = ElementState {
            displayed: VecDeque::from([true]),
            enabled: true,
            ..ElementState::default()
        };
        Self {
            name: name.into(),
            state: Mutex::new(state),
        }
    }

    /// Set rendered text
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        lock(&self.state).text = text.into();
        self
    }

    /// Set input value
    #[must_use]
    pub fn with_value(self, value: impl Into<String>) -> Self {
        lock(&self.state).value = value.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        lock(&self.state)
            .attributes
            .insert(name.into(), value.into());
        self
    }

    /// Set a computed CSS value
    #[must_use]
    pub fn with_css(self, property: impl Into<String>, value: impl Into<String>) -> Self {
        lock(&self.state).css.insert(property.into(), value.into());
        self
    }

    /// Set visibility
    #[must_use]
    pub fn with_displayed(self, displayed: bool) -> Self {
        lock(&self.state).displayed = VecDeque::from([displayed]);
        self
    }

    /// Visibility sequence; each `is_displayed` pops one value, the last one sticks
    #[must_use]
    pub fn with_displayed_sequence(self, seq: impl IntoIterator<Item = bool>) -> Self {
        let seq: VecDeque<bool> = seq.into_iter().collect();
        if !seq.is_empty() {
            lock(&self.state).displayed = seq;
        }
        self
    }

    /// Set enabled flag
    #[must_use]
    pub fn with_enabled(self, enabled: bool) -> Self {
        lock(&self.state).enabled = enabled;
        self
    }

    /// Mark the element detached; every read reports a stale reference
    #[must_use]
    pub fn with_stale(self) -> Self {
        lock(&self.state).stale = true;
        self
    }

    /// Add a child under `by`
    #[must_use]
    pub fn with_child(self, by: By, child: Arc<MockElement>) -> Self {
        lock(&self.state).children.entry(by).or_default().push(child);
        self
    }

    /// Add several children under `by`
    #[must_use]
    pub fn with_children(self, by: By, children: impl IntoIterator<Item = Arc<MockElement>>) -> Self {
        lock(&self.state)
            .children
            .entry(by)
            .or_default()
            .extend(children);
        self
    }

    /// Wrap in `Arc`
    #[must_use]
    pub fn into_ref(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Element name used in diagnostics
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue failures for the next calls of `action`
    pub fn fail_next(&self, action: MockAction, failures: impl IntoIterator<Item = MockFailure>) {
        lock(&self.state)
            .failures
            .entry(action)
            .or_default()
            .extend(failures);
    }

    /// Make every call of `action` fail
    pub fn fail_always(&self, action: MockAction, failure: MockFailure) {
        // Bounded so a runaway retry loop still terminates in tests.
        self.fail_next(action, std::iter::repeat(failure).take(1_000));
    }

    /// Replace the rendered text
    pub fn set_text(&self, text: impl Into<String>) {
        lock(&self.state).text = text.into();
    }

    /// Current input value
    #[must_use]
    pub fn value(&self) -> String {
        lock(&self.state).value.clone()
    }

    /// All recorded calls
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.state).calls.clone()
    }

    /// Number of recorded calls named `op`
    #[must_use]
    pub fn call_count(&self, op: &str) -> usize {
        lock(&self.state).calls.iter().filter(|c| c.op == op).count()
    }

    fn record(&self, op: &'static str, arg: Option<&str>) {
        lock(&self.state).calls.push(MockCall {
            op,
            arg: arg.map(str::to_string),
            at: Instant::now(),
        });
    }

    fn check_stale(&self) -> E2eResult<()> {
        if lock(&self.state).stale {
            Err(E2eError::StaleElement {
                message: self.name.clone(),
            })
        } else {
            Ok(())
        }
    }

    fn take_failure(&self, action: MockAction) -> Option<E2eError> {
        lock(&self.state)
            .failures
            .get_mut(&action)
            .and_then(VecDeque::pop_front)
            .map(|f| f.into_error(&self.name))
    }

    fn scripted(&self, op: &'static str, action: MockAction, arg: Option<&str>) -> E2eResult<()> {
        self.record(op, arg);
        self.check_stale()?;
        match self.take_failure(action) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn children(&self, by: &By) -> Vec<Arc<MockElement>> {
        lock(&self.state).children.get(by).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Element for MockElement {
    async fn click(&self) -> E2eResult<()> {
        self.scripted("click", MockAction::Click, None)
    }

    async fn send_keys(&self, text: &str) -> E2eResult<()> {
        self.scripted("send_keys", MockAction::SendKeys, Some(text))?;
        lock(&self.state).value.push_str(text);
        Ok(())
    }

    async fn clear(&self) -> E2eResult<()> {
        self.scripted("clear", MockAction::Clear, None)?;
        lock(&self.state).value.clear();
        Ok(())
    }

    async fn submit(&self) -> E2eResult<()> {
        self.scripted("submit", MockAction::Submit, None)
    }

    async fn text(&self) -> E2eResult<String> {
        self.record("text", None);
        self.check_stale()?;
        Ok(lock(&self.state).text.clone())
    }

    async fn attribute(&self, name: &str) -> E2eResult<Option<String>> {
        self.record("attribute", Some(name));
        self.check_stale()?;
        let state = lock(&self.state);
        if let Some(v) = state.attributes.get(name) {
            return Ok(Some(v.clone()));
        }
        Ok((name == "value").then(|| state.value.clone()))
    }

    async fn css_value(&self, property: &str) -> E2eResult<String> {
        self.record("css_value", Some(property));
        self.check_stale()?;
        Ok(lock(&self.state)
            .css
            .get(property)
            .cloned()
            .unwrap_or_default())
    }

    async fn is_displayed(&self) -> E2eResult<bool> {
        self.record("is_displayed", None);
        self.check_stale()?;
        let mut state = lock(&self.state);
        let shown = if state.displayed.len() > 1 {
            state.displayed.pop_front()
        } else {
            state.displayed.front().copied()
        };
        Ok(shown.unwrap_or(false))
    }

    async fn is_enabled(&self) -> E2eResult<bool> {
        self.record("is_enabled", None);
        self.check_stale()?;
        Ok(lock(&self.state).enabled)
    }

    async fn scroll_into_view(&self) -> E2eResult<()> {
        self.record("scroll_into_view", None);
        self.check_stale()
    }

    async fn find_element(&self, by: &By) -> E2eResult<ElementRef> {
        self.record("find_element", Some(&by.to_string()));
        self.check_stale()?;
        self.children(by)
            .into_iter()
            .next()
            .map(|e| e as ElementRef)
            .ok_or_else(|| E2eError::NoSuchElement {
                locator: by.to_string(),
            })
    }

    async fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementRef>> {
        self.record("find_elements", Some(&by.to_string()));
        self.check_stale()?;
        Ok(self
            .children(by)
            .into_iter()
            .map(|e| e as ElementRef)
            .collect())
    }
}

// ============================================================================
// MockDriver
// ============================================================================

#[derive(Debug)]
struct DriverState {
    url: String,
    url_sequence: VecDeque<String>,
    elements: HashMap<By, Vec<Arc<MockElement>>>,
    frames: HashMap<By, HashMap<By, Vec<Arc<MockElement>>>>,
    frame: Option<By>,
    active: Option<Arc<MockElement>>,
    find_failures: VecDeque<MockFailure>,
    scroll_y: i64,
    page_step: i64,
    arrow_step: i64,
    scroll_max: i64,
    navigations: Vec<String>,
    performed: Vec<Key>,
    scripts: Vec<String>,
    calls: Vec<MockCall>,
    quit: bool,
}

impl Default for DriverState {
    fn default() -> Self {
        Self {
            url: "about:blank".to_string(),
            url_sequence: VecDeque::new(),
            elements: HashMap::new(),
            frames: HashMap::new(),
            frame: None,
            active: None,
            find_failures: VecDeque::new(),
            scroll_y: 0,
            page_step: 600,
            arrow_step: 40,
            scroll_max: 0,
            navigations: Vec::new(),
            performed: Vec::new(),
            scripts: Vec::new(),
            calls: Vec::new(),
            quit: false,
        }
    }
}

/// Scriptable browser session
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<DriverState>,
}

impl MockDriver {
    /// Create an empty session at `about:blank`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current URL
    #[must_use]
    pub fn with_url(self, url: impl Into<String>) -> Self {
        lock(&self.state).url = url.into();
        self
    }

    /// URLs reported by successive `current_url` calls; the last one sticks
    #[must_use]
    pub fn with_url_sequence<S: Into<String>>(self, urls: impl IntoIterator<Item = S>) -> Self {
        lock(&self.state)
            .url_sequence
            .extend(urls.into_iter().map(Into::into));
        self
    }

    /// Register a top-level element under `by`
    #[must_use]
    pub fn with_element(self, by: By, element: Arc<MockElement>) -> Self {
        self.add_element(by, element);
        self
    }

    /// Register several top-level elements under `by`
    #[must_use]
    pub fn with_elements(self, by: By, elements: impl IntoIterator<Item = Arc<MockElement>>) -> Self {
        lock(&self.state)
            .elements
            .entry(by)
            .or_default()
            .extend(elements);
        self
    }

    /// Register an element inside the iframe located by `frame`
    #[must_use]
    pub fn with_frame_element(self, frame: By, by: By, element: Arc<MockElement>) -> Self {
        lock(&self.state)
            .frames
            .entry(frame)
            .or_default()
            .entry(by)
            .or_default()
            .push(element);
        self
    }

    /// Element returned by `active_element`
    #[must_use]
    pub fn with_active(self, element: Arc<MockElement>) -> Self {
        lock(&self.state).active = Some(element);
        self
    }

    /// Scroll model: page step, arrow step and maximum `scrollY`
    #[must_use]
    pub fn with_scroll(self, page_step: i64, arrow_step: i64, max: i64) -> Self {
        {
            let mut state = lock(&self.state);
            state.page_step = page_step;
            state.arrow_step = arrow_step;
            state.scroll_max = max;
        }
        self
    }

    /// Fail the next top-level finds
    #[must_use]
    pub fn with_find_failures(self, failures: impl IntoIterator<Item = MockFailure>) -> Self {
        lock(&self.state).find_failures.extend(failures);
        self
    }

    /// Register an element after construction
    pub fn add_element(&self, by: By, element: Arc<MockElement>) {
        lock(&self.state).elements.entry(by).or_default().push(element);
    }

    /// Remove every element under `by`
    pub fn remove_elements(&self, by: &By) {
        lock(&self.state).elements.remove(by);
    }

    /// Change the current URL
    pub fn set_url(&self, url: impl Into<String>) {
        lock(&self.state).url = url.into();
    }

    /// Recorded navigations
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        lock(&self.state).navigations.clone()
    }

    /// Recorded key sequences
    #[must_use]
    pub fn performed(&self) -> Vec<Key> {
        lock(&self.state).performed.clone()
    }

    /// Current `window.scrollY`
    #[must_use]
    pub fn scroll_y(&self) -> i64 {
        lock(&self.state).scroll_y
    }

    /// Scripts passed to `execute_script`
    #[must_use]
    pub fn scripts(&self) -> Vec<String> {
        lock(&self.state).scripts.clone()
    }

    /// All recorded driver calls
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.state).calls.clone()
    }

    /// Number of recorded driver calls named `op`
    #[must_use]
    pub fn call_count(&self, op: &str) -> usize {
        lock(&self.state).calls.iter().filter(|c| c.op == op).count()
    }

    /// Whether `quit` was called
    #[must_use]
    pub fn is_quit(&self) -> bool {
        lock(&self.state).quit
    }

    /// Currently selected frame
    #[must_use]
    pub fn current_frame(&self) -> Option<By> {
        lock(&self.state).frame.clone()
    }

    fn record(state: &mut DriverState, op: &'static str, arg: Option<String>) {
        state.calls.push(MockCall {
            op,
            arg,
            at: Instant::now(),
        });
    }

    fn lookup(state: &mut DriverState, by: &By) -> E2eResult<Vec<Arc<MockElement>>> {
        if let Some(failure) = state.find_failures.pop_front() {
            return Err(failure.into_error(&by.to_string()));
        }
        let scope = match &state.frame {
            Some(frame) => state.frames.get(frame),
            None => Some(&state.elements),
        };
        Ok(scope
            .and_then(|elements| elements.get(by))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let mut state = lock(&self.state);
        Self::record(&mut state, "goto", Some(url.to_string()));
        state.navigations.push(url.to_string());
        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        let mut state = lock(&self.state);
        Self::record(&mut state, "current_url", None);
        if let Some(next) = state.url_sequence.pop_front() {
            state.url = next;
        }
        Ok(state.url.clone())
    }

    async fn title(&self) -> E2eResult<String> {
        let mut state = lock(&self.state);
        Self::record(&mut state, "title", None);
        Ok("Nazeel".to_string())
    }

    async fn find_element(&self, by: &By) -> E2eResult<ElementRef> {
        let mut state = lock(&self.state);
        Self::record(&mut state, "find_element", Some(by.to_string()));
        Self::lookup(&mut state, by)?
            .into_iter()
            .next()
            .map(|e| e as ElementRef)
            .ok_or_else(|| E2eError::NoSuchElement {
                locator: by.to_string(),
            })
    }

    async fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementRef>> {
        let mut state = lock(&self.state);
        Self::record(&mut state, "find_elements", Some(by.to_string()));
        Ok(Self::lookup(&mut state, by)?
            .into_iter()
            .map(|e| e as ElementRef)
            .collect())
    }

    async fn active_element(&self) -> E2eResult<ElementRef> {
        let mut state = lock(&self.state);
        Self::record(&mut state, "active_element", None);
        state
            .active
            .clone()
            .map(|e| e as ElementRef)
            .ok_or_else(|| E2eError::NoSuchElement {
                locator: ":focus".to_string(),
            })
    }

    async fn execute_script(&self, script: &str) -> E2eResult<serde_json::Value> {
        let mut state = lock(&self.state);
        Self::record(&mut state, "execute_script", Some(script.to_string()));
        state.scripts.push(script.to_string());
        if script.contains("scrollY") {
            return Ok(serde_json::Value::from(state.scroll_y));
        }
        Ok(serde_json::Value::Null)
    }

    async fn perform(&self, keys: &[Key]) -> E2eResult<()> {
        let mut state = lock(&self.state);
        Self::record(&mut state, "perform", None);
        for key in keys {
            let delta = match key {
                Key::PageDown => state.page_step,
                Key::PageUp => -state.page_step,
                Key::ArrowDown => state.arrow_step,
                Key::ArrowUp => -state.arrow_step,
                _ => 0,
            };
            state.scroll_y = (state.scroll_y + delta).clamp(0, state.scroll_max);
            state.performed.push(*key);
        }
        Ok(())
    }

    async fn switch_to_frame(&self, by: &By) -> E2eResult<()> {
        let mut state = lock(&self.state);
        Self::record(&mut state, "switch_to_frame", Some(by.to_string()));
        if state.frames.contains_key(by) {
            state.frame = Some(by.clone());
            Ok(())
        } else {
            Err(E2eError::NoSuchElement {
                locator: by.to_string(),
            })
        }
    }

    async fn switch_to_default_content(&self) -> E2eResult<()> {
        let mut state = lock(&self.state);
        Self::record(&mut state, "switch_to_default_content", None);
        state.frame = None;
        Ok(())
    }

    async fn screenshot(&self) -> E2eResult<Screenshot> {
        let mut state = lock(&self.state);
        Self::record(&mut state, "screenshot", None);
        Ok(Screenshot::new(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]))
    }

    async fn quit(&self) -> E2eResult<()> {
        let mut state = lock(&self.state);
        Self::record(&mut state, "quit", None);
        state.quit = true;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod mock_element {
        use super::*;

        #[tokio::test]
        async fn test_scripted_failures_are_consumed_in_order() {
            let el = MockElement::new("save").into_ref();
            el.fail_next(MockAction::Click, [MockFailure::Stale, MockFailure::Fatal]);
            assert!(matches!(
                el.click().await,
                Err(E2eError::StaleElement { .. })
            ));
            assert!(matches!(el.click().await, Err(E2eError::Script { .. })));
            assert!(el.click().await.is_ok());
            assert_eq!(el.call_count("click"), 3);
        }

        #[tokio::test]
        async fn test_send_keys_appends_and_clear_resets() {
            let el = MockElement::new("qty").into_ref();
            el.send_keys("1").await.unwrap();
            el.send_keys("5").await.unwrap();
            assert_eq!(el.attribute("value").await.unwrap().as_deref(), Some("15"));
            el.clear().await.unwrap();
            assert_eq!(el.value(), "");
        }

        #[tokio::test]
        async fn test_displayed_sequence_last_value_sticks() {
            let el = MockElement::new("loader")
                .with_displayed_sequence([true, true, false])
                .into_ref();
            assert!(el.is_displayed().await.unwrap());
            assert!(el.is_displayed().await.unwrap());
            assert!(!el.is_displayed().await.unwrap());
            assert!(!el.is_displayed().await.unwrap());
        }

        #[tokio::test]
        async fn test_children() {
            let cell = MockElement::new("cell").with_text("Towels").into_ref();
            let row = MockElement::new("row")
                .with_child(By::tag("td"), cell)
                .into_ref();
            let found = row.find_elements(&By::tag("td")).await.unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].text().await.unwrap(), "Towels");
            assert!(row.find_element(&By::tag("span")).await.is_err());
        }
    }

    mod mock_driver {
        use super::*;

        #[tokio::test]
        async fn test_url_sequence() {
            let driver = MockDriver::new().with_url_sequence(["a", "b"]);
            assert_eq!(driver.current_url().await.unwrap(), "a");
            assert_eq!(driver.current_url().await.unwrap(), "b");
            assert_eq!(driver.current_url().await.unwrap(), "b");
        }

        #[tokio::test]
        async fn test_frames_scope_lookups() {
            let frame = By::css(".responsive-iframe");
            let msg = MockElement::new("msg").with_text("Done").into_ref();
            let driver =
                MockDriver::new().with_frame_element(frame.clone(), By::css(".trv-error-message"), msg);
            assert!(driver
                .find_element(&By::css(".trv-error-message"))
                .await
                .is_err());
            driver.switch_to_frame(&frame).await.unwrap();
            let found = driver
                .find_element(&By::css(".trv-error-message"))
                .await
                .unwrap();
            assert_eq!(found.text().await.unwrap(), "Done");
            driver.switch_to_default_content().await.unwrap();
            assert!(driver.current_frame().is_none());
        }

        #[tokio::test]
        async fn test_scroll_model_clamps() {
            let driver = MockDriver::new().with_scroll(500, 40, 800);
            driver.perform(&[Key::PageDown]).await.unwrap();
            driver.perform(&[Key::PageDown]).await.unwrap();
            assert_eq!(driver.scroll_y(), 800);
            let y = driver.execute_script("return window.scrollY;").await.unwrap();
            assert_eq!(y, serde_json::json!(800));
            driver.perform(&[Key::ArrowUp]).await.unwrap();
            assert_eq!(driver.scroll_y(), 760);
        }
    }
}
