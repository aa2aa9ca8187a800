//! Wait Mechanisms
//!
//! Polling explicit waits and the two-phase page-ready check.
//!
//! `wait_ready` runs two separately timed steps:
//!
//! 1. **URL phase**: the current URL must equal the target. Failing this step
//!    is always an error ([`E2eError::UrlNotReached`]); the loader is never
//!    consulted.
//! 2. **Loader phase**: the `.page-loading` overlay must stop being both
//!    displayed and fully opaque. A timeout here means the overlay was
//!    already gone or never rendered, so it is reported as
//!    [`LoaderPhase::PresumedGone`] unless strict mode is on.

use crate::driver::{Driver, ElementRef};
use crate::locator::By;
use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for explicit waits (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Default settle time after the page is ready (2 seconds)
pub const DEFAULT_SETTLE_MS: u64 = 2_000;

/// Page-level loading overlay
pub const PAGE_LOADER: &str = ".page-loading";

/// Named wait budgets used across the page objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Waits {
    /// Full page load (30s)
    UntilLoads,
    /// Element becomes visible (5s)
    UntilDisplayed,
    /// Slow element becomes visible (15s)
    LongUntilDisplayed,
    /// Element becomes clickable (5s)
    UntilClickable,
    /// Short pause (1s)
    Temp,
    /// Widget initialisation (10s)
    TillItReady,
}

impl Waits {
    /// Budget in seconds
    #[must_use]
    pub const fn seconds(&self) -> u64 {
        match self {
            Self::UntilLoads => 30,
            Self::UntilDisplayed => 5,
            Self::LongUntilDisplayed => 15,
            Self::UntilClickable => 5,
            Self::Temp => 1,
            Self::TillItReady => 10,
        }
    }

    /// Budget as Duration
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_secs(self.seconds())
    }

    /// Wait options with this budget and the default poll interval
    #[must_use]
    pub const fn options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.seconds() * 1_000,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// What was waited for
    pub waited_for: String,
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `check` until it yields `Some`, or fail with [`E2eError::Timeout`].
///
/// Transient element errors raised by the check count as "not yet".
pub async fn poll<T, F, Fut>(options: WaitOptions, description: &str, mut check: F) -> E2eResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<Option<T>>>,
{
    let start = Instant::now();
    loop {
        match check().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(err) if err.is_transient() => {
                debug!(waited_for = description, error = %err, "check not ready");
            }
            Err(err) => return Err(err),
        }
        if start.elapsed() >= options.timeout() {
            return Err(E2eError::Timeout {
                ms: options.timeout_ms,
                waited_for: description.to_string(),
            });
        }
        sleep(options.poll_interval()).await;
    }
}

/// Poll a boolean predicate until it holds
pub async fn wait_until<F, Fut>(
    options: WaitOptions,
    description: &str,
    mut predicate: F,
) -> E2eResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<bool>>,
{
    let start = Instant::now();
    poll(options, description, || {
        let fut = predicate();
        async move { Ok::<_, E2eError>(fut.await?.then_some(())) }
    })
    .await?;
    Ok(WaitResult {
        elapsed: start.elapsed(),
        waited_for: description.to_string(),
    })
}

/// Wait until the current URL equals `url`
pub async fn wait_for_url(
    driver: &dyn Driver,
    url: &str,
    options: WaitOptions,
) -> E2eResult<WaitResult> {
    wait_until(options, &format!("url == {url}"), move || async move {
        Ok::<_, E2eError>(driver.current_url().await? == url)
    })
    .await
}

/// Wait until the current URL contains `fragment`; returns that URL
pub async fn wait_for_url_contains(
    driver: &dyn Driver,
    fragment: &str,
    options: WaitOptions,
) -> E2eResult<String> {
    poll(options, &format!("url ~ {fragment}"), move || async move {
        let url = driver.current_url().await?;
        Ok::<_, E2eError>(url.contains(fragment).then_some(url))
    })
    .await
}

/// Wait until the first match of `by` is displayed
pub async fn wait_for_displayed(
    driver: &dyn Driver,
    by: &By,
    options: WaitOptions,
) -> E2eResult<ElementRef> {
    poll(options, &format!("{by} displayed"), move || async move {
        let el = driver.find_element(by).await?;
        Ok::<_, E2eError>(el.is_displayed().await?.then_some(el))
    })
    .await
}

/// Wait until the first match of `by` is displayed and enabled
pub async fn wait_for_clickable(
    driver: &dyn Driver,
    by: &By,
    options: WaitOptions,
) -> E2eResult<ElementRef> {
    poll(options, &format!("{by} clickable"), move || async move {
        let el = driver.find_element(by).await?;
        let ready = el.is_displayed().await? && el.is_enabled().await?;
        Ok::<_, E2eError>(ready.then_some(el))
    })
    .await
}

/// Wait until no match of `by` is displayed
pub async fn wait_for_invisible(
    driver: &dyn Driver,
    by: &By,
    options: WaitOptions,
) -> E2eResult<WaitResult> {
    wait_until(options, &format!("{by} invisible"), move || async move {
        for el in driver.find_elements(by).await? {
            match el.is_displayed().await {
                Ok(true) => return Ok(false),
                Ok(false) => {}
                Err(e) if e.is_transient() => {}
                Err(e) => return Err(e),
            }
        }
        Ok::<_, E2eError>(true)
    })
    .await
}

/// Wait until the first match of `by` shows text containing `text`
pub async fn wait_for_text(
    driver: &dyn Driver,
    by: &By,
    text: &str,
    options: WaitOptions,
) -> E2eResult<String> {
    poll(options, &format!("{by} text ~ {text:?}"), move || async move {
        let shown = driver.find_element(by).await?.text().await?;
        Ok::<_, E2eError>(shown.contains(text).then_some(shown))
    })
    .await
}

/// Wait until `by` matches at least `count` elements
pub async fn wait_for_count(
    driver: &dyn Driver,
    by: &By,
    count: usize,
    options: WaitOptions,
) -> E2eResult<Vec<ElementRef>> {
    poll(options, &format!("{by} count >= {count}"), move || async move {
        let found = driver.find_elements(by).await?;
        Ok::<_, E2eError>((found.len() >= count).then_some(found))
    })
    .await
}

// =============================================================================
// PAGE READY
// =============================================================================

/// Options for [`wait_ready`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadyOptions {
    /// URL phase timeout in milliseconds
    pub url_timeout_ms: u64,
    /// Loader phase timeout in milliseconds
    pub loader_timeout_ms: u64,
    /// Pause after both phases in milliseconds
    pub settle_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Treat a loader timeout as failure
    pub strict_loader: bool,
    /// Loader overlay selector
    pub loader_selector: String,
}

impl Default for ReadyOptions {
    fn default() -> Self {
        Self {
            url_timeout_ms: Waits::UntilLoads.seconds() * 1_000,
            loader_timeout_ms: Waits::UntilLoads.seconds() * 1_000,
            settle_ms: DEFAULT_SETTLE_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            strict_loader: false,
            loader_selector: PAGE_LOADER.to_string(),
        }
    }
}

impl ReadyOptions {
    /// Set both phase timeouts
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.url_timeout_ms = timeout_ms;
        self.loader_timeout_ms = timeout_ms;
        self
    }

    /// Set settle time
    #[must_use]
    pub const fn with_settle(mut self, settle_ms: u64) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    /// Enable strict loader handling
    #[must_use]
    pub const fn with_strict_loader(mut self, strict: bool) -> Self {
        self.strict_loader = strict;
        self
    }

    fn url_wait(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.url_timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }

    fn loader_wait(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.loader_timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }
}

/// Outcome of the loader phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderPhase {
    /// Overlay observed hidden
    Cleared {
        /// Time until hidden
        elapsed: Duration,
    },
    /// Timed out; overlay assumed already gone
    PresumedGone {
        /// Time spent waiting
        waited: Duration,
    },
}

/// Successful [`wait_ready`] report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReady {
    /// URL that was matched
    pub url: String,
    /// Time spent in the URL phase
    pub url_elapsed: Duration,
    /// Loader phase outcome
    pub loader: LoaderPhase,
}

/// Whether the overlay matched by `by` is displayed and fully opaque.
///
/// Missing or detached overlays count as not shown. The lookup goes through
/// `find_elements` so a missing overlay never waits out an implicit wait.
pub async fn is_loader_shown(driver: &dyn Driver, by: &By) -> E2eResult<bool> {
    let loader = match driver.find_elements(by).await {
        Ok(found) => match found.into_iter().next() {
            Some(el) => el,
            None => return Ok(false),
        },
        Err(E2eError::NoSuchElement { .. } | E2eError::StaleElement { .. }) => return Ok(false),
        Err(err) => return Err(err),
    };
    let state = async {
        Ok::<_, E2eError>(loader.is_displayed().await? && loader.css_value("opacity").await? == "1")
    };
    match state.await {
        Ok(shown) => Ok(shown),
        Err(E2eError::NoSuchElement { .. } | E2eError::StaleElement { .. }) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Block until the browser is at `target_url` and the page loader is gone
pub async fn wait_ready(
    driver: &dyn Driver,
    target_url: &str,
    options: &ReadyOptions,
) -> E2eResult<PageReady> {
    // Phase 1: URL
    let url_start = Instant::now();
    match wait_for_url(driver, target_url, options.url_wait()).await {
        Ok(_) => {}
        Err(E2eError::Timeout { .. }) => {
            let actual = driver.current_url().await.unwrap_or_default();
            return Err(E2eError::UrlNotReached {
                expected: target_url.to_string(),
                actual,
                timeout_ms: options.url_timeout_ms,
            });
        }
        Err(err) => return Err(err),
    }
    let url_elapsed = url_start.elapsed();

    // Phase 2: loader
    let loader_by = By::css(options.loader_selector.clone());
    let loader_start = Instant::now();
    let loader_by_ref = &loader_by;
    let loader = match wait_until(options.loader_wait(), "page loader hidden", move || async move {
        Ok::<_, E2eError>(!is_loader_shown(driver, loader_by_ref).await?)
    })
    .await
    {
        Ok(res) => LoaderPhase::Cleared {
            elapsed: res.elapsed,
        },
        Err(E2eError::Timeout { .. }) if options.strict_loader => {
            return Err(E2eError::LoaderStillVisible {
                timeout_ms: options.loader_timeout_ms,
            });
        }
        Err(E2eError::Timeout { .. }) => {
            warn!(
                url = target_url,
                timeout_ms = options.loader_timeout_ms,
                "page loader did not clear; presuming it is already gone"
            );
            LoaderPhase::PresumedGone {
                waited: loader_start.elapsed(),
            }
        }
        Err(err) => return Err(err),
    };

    // Phase 3: settle
    if options.settle_ms > 0 {
        sleep(Duration::from_millis(options.settle_ms)).await;
    }

    debug!(url = target_url, ?url_elapsed, ?loader, "page ready");
    Ok(PageReady {
        url: target_url.to_string(),
        url_elapsed,
        loader,
    })
}
