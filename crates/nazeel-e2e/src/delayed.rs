//! Delayed Driver
//!
//! Decorator over [`Driver`] and [`Element`] that lets the application's
//! asynchronous UI settle after every state-changing action.
//!
//! | Operation                                   | Delay | Retry |
//! |---------------------------------------------|-------|-------|
//! | `click`, `send_keys`, `clear`               | yes   | yes   |
//! | `goto`, `submit`, `perform`                 | yes   | no    |
//! | `text`, `attribute`, `css_value`, visibility | no    | no    |
//! | `find_*`, `active_element`                  | no    | no    |
//!
//! Retries happen only for transient errors (see [`E2eError::is_transient`])
//! and are bounded by [`DelayPolicy::max_retries`], so an action runs at most
//! `max_retries + 1` times. Every element returned by a find is wrapped again,
//! so the contract holds for elements found through elements.

use crate::driver::{Driver, DriverRef, Element, ElementRef, Key, Screenshot};
use crate::locator::By;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Default settle delay after a mutating action (600ms)
pub const DEFAULT_ACTION_DELAY_MS: u64 = 600;

/// Default retry bound for click/type/clear
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default pause between retry attempts (250ms)
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 250;

/// Poll interval used by the implicit wait
const IMPLICIT_POLL_MS: u64 = 100;

// ============================================================================
// Action classification
// ============================================================================

/// Operations the decorator distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Navigate to a URL
    Navigate,
    /// Click an element
    Click,
    /// Type into an element
    SendKeys,
    /// Clear an input
    Clear,
    /// Submit a form
    Submit,
    /// Dispatch a key sequence
    Perform,
    /// Any read-only query
    Query,
}

impl Action {
    /// Whether the action changes page state and is followed by a settle delay
    #[must_use]
    pub const fn is_mutating(&self) -> bool {
        !matches!(self, Self::Query)
    }

    /// Whether transient failures of this action are retried
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Click | Self::SendKeys | Self::Clear)
    }

    /// Short name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Navigate => "navigate",
            Self::Click => "click",
            Self::SendKeys => "send_keys",
            Self::Clear => "clear",
            Self::Submit => "submit",
            Self::Perform => "perform",
            Self::Query => "query",
        }
    }
}

// ============================================================================
// Policy
// ============================================================================

/// Delay and retry policy shared by a driver and all elements it wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    /// Sleep after each successful mutating action
    pub action_delay: Duration,
    /// Extra attempts allowed for retryable actions
    pub max_retries: u32,
    /// Sleep between attempts
    pub retry_interval: Duration,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self {
            action_delay: Duration::from_millis(DEFAULT_ACTION_DELAY_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_interval: Duration::from_millis(DEFAULT_RETRY_INTERVAL_MS),
        }
    }
}

impl DelayPolicy {
    /// Create the default policy
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set settle delay
    #[must_use]
    pub const fn with_action_delay(mut self, delay: Duration) -> Self {
        self.action_delay = delay;
        self
    }

    /// Set retry bound
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set pause between attempts
    #[must_use]
    pub const fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Total attempts a retryable action may use
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Run `op` under this policy
    pub async fn run<F, Fut>(&self, action: Action, target: &str, mut op: F) -> E2eResult<()>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = E2eResult<()>> + Send,
    {
        let mut attempt: u32 = 1;
        loop {
            match op().await {
                Ok(()) => {
                    if action.is_mutating() && !self.action_delay.is_zero() {
                        sleep(self.action_delay).await;
                    }
                    return Ok(());
                }
                Err(err)
                    if action.is_retryable()
                        && err.is_transient()
                        && attempt < self.max_attempts() =>
                {
                    debug!(
                        action = action.name(),
                        target,
                        attempt,
                        error = %err,
                        "transient failure, retrying"
                    );
                    attempt += 1;
                    sleep(self.retry_interval).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

// ============================================================================
// DelayedDriver
// ============================================================================

/// Driver decorator applying a [`DelayPolicy`]
#[derive(Debug)]
pub struct DelayedDriver {
    inner: DriverRef,
    policy: DelayPolicy,
    implicit_wait_ms: AtomicU64,
}

impl DelayedDriver {
    /// Wrap `inner` with `policy`
    #[must_use]
    pub fn new(inner: DriverRef, policy: DelayPolicy) -> Self {
        Self {
            inner,
            policy,
            implicit_wait_ms: AtomicU64::new(0),
        }
    }

    /// The active policy
    #[must_use]
    pub const fn policy(&self) -> &DelayPolicy {
        &self.policy
    }

    /// The undecorated driver
    #[must_use]
    pub fn inner(&self) -> &DriverRef {
        &self.inner
    }

    /// How long driver-level finds keep polling before failing
    pub fn set_implicit_wait(&self, wait: Duration) {
        let ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
        self.implicit_wait_ms.store(ms, Ordering::Relaxed);
    }

    /// Current implicit wait
    #[must_use]
    pub fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms.load(Ordering::Relaxed))
    }

    fn wrap(&self, element: ElementRef) -> ElementRef {
        Arc::new(DelayedElement::new(element, self.policy))
    }
}

#[async_trait]
impl Driver for DelayedDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        debug!(url, "navigate");
        self.policy
            .run(Action::Navigate, url, || self.inner.goto(url))
            .await
    }

    async fn current_url(&self) -> E2eResult<String> {
        self.inner.current_url().await
    }

    async fn title(&self) -> E2eResult<String> {
        self.inner.title().await
    }

    async fn find_element(&self, by: &By) -> E2eResult<ElementRef> {
        let deadline = Instant::now() + self.implicit_wait();
        loop {
            match self.inner.find_element(by).await {
                Ok(found) => return Ok(self.wrap(found)),
                Err(E2eError::NoSuchElement { .. }) if Instant::now() < deadline => {
                    sleep(Duration::from_millis(IMPLICIT_POLL_MS)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementRef>> {
        let found = self.inner.find_elements(by).await?;
        Ok(found.into_iter().map(|e| self.wrap(e)).collect())
    }

    async fn active_element(&self) -> E2eResult<ElementRef> {
        let found = self.inner.active_element().await?;
        Ok(self.wrap(found))
    }

    async fn execute_script(&self, script: &str) -> E2eResult<serde_json::Value> {
        self.inner.execute_script(script).await
    }

    async fn perform(&self, keys: &[Key]) -> E2eResult<()> {
        self.policy
            .run(Action::Perform, "keyboard", || self.inner.perform(keys))
            .await
    }

    async fn switch_to_frame(&self, by: &By) -> E2eResult<()> {
        self.inner.switch_to_frame(by).await
    }

    async fn switch_to_default_content(&self) -> E2eResult<()> {
        self.inner.switch_to_default_content().await
    }

    async fn screenshot(&self) -> E2eResult<Screenshot> {
        self.inner.screenshot().await
    }

    async fn quit(&self) -> E2eResult<()> {
        self.inner.quit().await
    }
}

// ============================================================================
// DelayedElement
// ============================================================================

/// Element decorator applying a [`DelayPolicy`]
#[derive(Debug)]
pub struct DelayedElement {
    inner: ElementRef,
    policy: DelayPolicy,
    label: String,
}

impl DelayedElement {
    /// Wrap `inner` with `policy`
    #[must_use]
    pub fn new(inner: ElementRef, policy: DelayPolicy) -> Self {
        let label = format!("{inner:?}");
        Self {
            inner,
            policy,
            label,
        }
    }

    fn wrap(&self, element: ElementRef) -> ElementRef {
        Arc::new(Self::new(element, self.policy))
    }
}

#[async_trait]
impl Element for DelayedElement {
    async fn click(&self) -> E2eResult<()> {
        self.policy
            .run(Action::Click, &self.label, || self.inner.click())
            .await
    }

    async fn send_keys(&self, text: &str) -> E2eResult<()> {
        self.policy
            .run(Action::SendKeys, &self.label, || self.inner.send_keys(text))
            .await
    }

    async fn clear(&self) -> E2eResult<()> {
        self.policy
            .run(Action::Clear, &self.label, || self.inner.clear())
            .await
    }

    async fn submit(&self) -> E2eResult<()> {
        self.policy
            .run(Action::Submit, &self.label, || self.inner.submit())
            .await
    }

    async fn text(&self) -> E2eResult<String> {
        self.inner.text().await
    }

    async fn attribute(&self, name: &str) -> E2eResult<Option<String>> {
        self.inner.attribute(name).await
    }

    async fn css_value(&self, property: &str) -> E2eResult<String> {
        self.inner.css_value(property).await
    }

    async fn is_displayed(&self) -> E2eResult<bool> {
        self.inner.is_displayed().await
    }

    async fn is_enabled(&self) -> E2eResult<bool> {
        self.inner.is_enabled().await
    }

    async fn scroll_into_view(&self) -> E2eResult<()> {
        self.inner.scroll_into_view().await
    }

    async fn find_element(&self, by: &By) -> E2eResult<ElementRef> {
        let found = self.inner.find_element(by).await?;
        Ok(self.wrap(found))
    }

    async fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementRef>> {
        let found = self.inner.find_elements(by).await?;
        Ok(found.into_iter().map(|e| self.wrap(e)).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockAction, MockDriver, MockElement, MockFailure};
    use proptest::prelude::*;

    const DELAY: Duration = Duration::from_millis(600);
    const INTERVAL: Duration = Duration::from_millis(250);

    fn policy() -> DelayPolicy {
        DelayPolicy::new()
            .with_action_delay(DELAY)
            .with_max_retries(3)
            .with_retry_interval(INTERVAL)
    }

    fn wrapped(el: &Arc<MockElement>) -> DelayedElement {
        DelayedElement::new(el.clone(), policy())
    }

    fn paused_runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap()
    }

    mod classification {
        use super::*;

        #[test]
        fn test_mutating_actions() {
            for action in [
                Action::Navigate,
                Action::Click,
                Action::SendKeys,
                Action::Clear,
                Action::Submit,
                Action::Perform,
            ] {
                assert!(action.is_mutating(), "{action:?}");
            }
            assert!(!Action::Query.is_mutating());
        }

        #[test]
        fn test_only_click_type_clear_retry() {
            assert!(Action::Click.is_retryable());
            assert!(Action::SendKeys.is_retryable());
            assert!(Action::Clear.is_retryable());
            assert!(!Action::Navigate.is_retryable());
            assert!(!Action::Submit.is_retryable());
            assert!(!Action::Perform.is_retryable());
        }

        #[test]
        fn test_policy_defaults() {
            let p = DelayPolicy::default();
            assert_eq!(p.action_delay, Duration::from_millis(600));
            assert_eq!(p.max_attempts(), 4);
        }
    }

    mod mutating {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_success_delays_once() {
            let el = MockElement::new("append").into_ref();
            let start = Instant::now();
            wrapped(&el).click().await.unwrap();
            assert_eq!(start.elapsed(), DELAY);
            assert_eq!(el.call_count("click"), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_transient_failures_then_success() {
            let el = MockElement::new("append").into_ref();
            el.fail_next(
                MockAction::Click,
                [MockFailure::NotInteractable, MockFailure::Stale],
            );
            let start = Instant::now();
            wrapped(&el).click().await.unwrap();
            assert_eq!(el.call_count("click"), 3);
            assert_eq!(start.elapsed(), INTERVAL * 2 + DELAY);
        }

        #[tokio::test(start_paused = true)]
        async fn test_always_failing_returns_last_error_after_bound() {
            let el = MockElement::new("qty").into_ref();
            el.fail_always(MockAction::SendKeys, MockFailure::NotInteractable);
            let err = wrapped(&el).send_keys("3").await.unwrap_err();
            assert!(matches!(err, E2eError::ElementNotInteractable { .. }));
            assert_eq!(el.call_count("send_keys"), 4);
            assert_eq!(el.value(), "");
        }

        #[tokio::test(start_paused = true)]
        async fn test_fatal_error_is_not_retried() {
            let el = MockElement::new("save").into_ref();
            el.fail_next(MockAction::Clear, [MockFailure::Fatal]);
            let start = Instant::now();
            let err = wrapped(&el).clear().await.unwrap_err();
            assert!(matches!(err, E2eError::Script { .. }));
            assert_eq!(el.call_count("clear"), 1);
            assert_eq!(start.elapsed(), Duration::ZERO);
        }

        #[tokio::test(start_paused = true)]
        async fn test_submit_delays_but_does_not_retry() {
            let el = MockElement::new("form").into_ref();
            el.fail_next(MockAction::Submit, [MockFailure::Stale]);
            let delayed = wrapped(&el);
            assert!(delayed.submit().await.is_err());
            assert_eq!(el.call_count("submit"), 1);
            let start = Instant::now();
            delayed.submit().await.unwrap();
            assert_eq!(start.elapsed(), DELAY);
        }

        #[tokio::test(start_paused = true)]
        async fn test_navigate_and_perform_delay() {
            let mock = Arc::new(MockDriver::new());
            let driver = DelayedDriver::new(mock.clone(), policy());
            let start = Instant::now();
            driver.goto("https://staging.nazeel.net:9002/login").await.unwrap();
            driver.perform(&[Key::PageDown]).await.unwrap();
            assert_eq!(start.elapsed(), DELAY * 2);
            assert_eq!(mock.navigations().len(), 1);
        }
    }

    mod read_only {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_queries_never_delay_or_retry() {
            let el = MockElement::new("toast")
                .with_text("Saved Successfully")
                .with_css("opacity", "1")
                .into_ref();
            let delayed = wrapped(&el);
            let start = Instant::now();
            assert_eq!(delayed.text().await.unwrap(), "Saved Successfully");
            assert_eq!(delayed.css_value("opacity").await.unwrap(), "1");
            assert!(delayed.is_displayed().await.unwrap());
            assert!(delayed.is_enabled().await.unwrap());
            assert!(delayed.attribute("class").await.unwrap().is_none());
            assert_eq!(start.elapsed(), Duration::ZERO);
            assert_eq!(el.calls().len(), 5);
        }

        #[tokio::test(start_paused = true)]
        async fn test_stale_read_is_not_retried() {
            let el = MockElement::new("row").with_stale().into_ref();
            let err = wrapped(&el).text().await.unwrap_err();
            assert!(matches!(err, E2eError::StaleElement { .. }));
            assert_eq!(el.call_count("text"), 1);
        }
    }

    mod wrapping {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_found_elements_are_wrapped_recursively() {
            let button = MockElement::new("cancel").into_ref();
            button.fail_next(MockAction::Click, [MockFailure::Intercepted]);
            let row = MockElement::new("row")
                .with_child(By::css("button"), button.clone())
                .into_ref();
            let mock = MockDriver::new().with_element(By::css("tbody>tr"), row);
            let driver = DelayedDriver::new(Arc::new(mock), policy());

            let rows = driver.find_elements(&By::css("tbody>tr")).await.unwrap();
            let inner = rows[0].find_element(&By::css("button")).await.unwrap();
            let start = Instant::now();
            inner.click().await.unwrap();
            assert_eq!(button.call_count("click"), 2);
            assert_eq!(start.elapsed(), INTERVAL + DELAY);
        }

        #[tokio::test(start_paused = true)]
        async fn test_implicit_wait_polls_driver_finds() {
            let mock = MockDriver::new()
                .with_element(By::id("usern"), MockElement::new("user").into_ref())
                .with_find_failures([MockFailure::NotFound, MockFailure::NotFound]);
            let driver = DelayedDriver::new(Arc::new(mock), policy());
            driver.set_implicit_wait(Duration::from_secs(1));
            let start = Instant::now();
            assert!(driver.find_element(&By::id("usern")).await.is_ok());
            assert_eq!(start.elapsed(), Duration::from_millis(200));
        }

        #[tokio::test(start_paused = true)]
        async fn test_no_implicit_wait_fails_immediately() {
            let mock = MockDriver::new().with_find_failures([MockFailure::NotFound]);
            let driver = DelayedDriver::new(Arc::new(mock), policy());
            assert!(matches!(
                driver.find_element(&By::id("usern")).await,
                Err(E2eError::NoSuchElement { .. })
            ));
        }
    }

    proptest! {
        #[test]
        fn prop_mutating_succeeds_within_bound(failures in 0u32..4, action in 0usize..3) {
            let rt = paused_runtime();
            rt.block_on(async {
                let el = MockElement::new("target").into_ref();
                let op = [MockAction::Click, MockAction::SendKeys, MockAction::Clear][action];
                el.fail_next(op, (0..failures).map(|_| MockFailure::NotInteractable));
                let delayed = wrapped(&el);
                let start = Instant::now();
                match op {
                    MockAction::Click => delayed.click().await.unwrap(),
                    MockAction::SendKeys => delayed.send_keys("2").await.unwrap(),
                    _ => delayed.clear().await.unwrap(),
                }
                let total = el.calls().len() as u32;
                prop_assert_eq!(total, failures + 1);
                prop_assert_eq!(start.elapsed(), INTERVAL * failures + DELAY);
                Ok(())
            })?;
        }

        #[test]
        fn prop_exhausted_retries_use_exactly_bound_plus_one(max in 0u32..6) {
            let rt = paused_runtime();
            rt.block_on(async {
                let el = MockElement::new("target").into_ref();
                el.fail_always(MockAction::Click, MockFailure::Stale);
                let delayed = DelayedElement::new(el.clone(), policy().with_max_retries(max));
                let err = delayed.click().await.unwrap_err();
                let stale = matches!(err, E2eError::StaleElement { .. });
                prop_assert!(stale, "expected stale element, got {:?}", err);
                prop_assert_eq!(el.call_count("click") as u32, max + 1);
                Ok(())
            })?;
        }
    }
}
