//! Nazeel E2E: browser tests for the Nazeel property-management web app
//!
//! Business scenarios for the guest supplies screens, written against page
//! objects that drive the browser through an abstract [`Driver`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Suites     │    │ Page       │    │ Delayed    │            │
//! │   │ (TestCase) │───►│ Objects    │───►│ Driver     │───► CDP    │
//! │   │            │    │            │    │ (retries)  │   or mock  │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         │                                                       │
//! │         ▼                                                       │
//! │   TestHarness ──► listeners (logging, failure screenshots)      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use nazeel_e2e::prelude::*;
//!
//! let config = SuiteConfig::load(None)?;
//! let mut session = Session::new(backend::launch(&config).await?, config);
//! session.start().await?;
//! session.login().await?;
//!
//! let mut harness = TestHarness::new();
//! let mut logging = LoggingListener;
//! for suite in suites::all_suites() {
//!     harness.run_suite(&mut session, &suite, &mut [&mut logging]).await;
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_frames))]

mod assertion;
pub mod backend;
mod config;
mod delayed;
mod driver;
mod harness;
mod listener;
mod locator;
mod logging;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod mock;
pub mod model;
#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
pub mod pages;
mod result;
mod retry;
mod screenshot;
mod session;
#[allow(clippy::missing_errors_doc)]
pub mod suites;
pub mod utils;
#[allow(clippy::missing_errors_doc)]
mod wait;

pub use assertion::{AssertionFailure, SoftAssertions};
pub use backend::BrowserConfig;
pub use config::{
    SuiteConfig, DEFAULT_BASE_URL, DEFAULT_SCREENSHOT_DIR, DEFAULT_TEST_RETRIES,
    DEFAULT_TEST_TIMEOUT_MS,
};
pub use delayed::{
    Action, DelayPolicy, DelayedDriver, DelayedElement, DEFAULT_ACTION_DELAY_MS,
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_INTERVAL_MS,
};
pub use driver::{Driver, DriverRef, Element, ElementRef, Key, Screenshot};
pub use harness::{
    SuiteResults, TestCase, TestFn, TestFuture, TestHarness, TestOutcome, TestStatus, TestSuite,
};
pub use listener::{LoggingListener, ScreenshotListener, TestListener};
pub use locator::By;
pub use logging::{env_filter, init_tracing, level_for_verbosity};
pub use result::{ensure, ensure_eq, E2eError, E2eResult};
pub use retry::{RetryAnalyzer, DEFAULT_MAX_RETRY};
pub use screenshot::{capture_screenshot, screenshot_file_name, FILE_TIMESTAMP_FORMAT};
pub use session::{Session, SuiteState};
pub use wait::{
    is_loader_shown, poll, wait_for_clickable, wait_for_count, wait_for_displayed,
    wait_for_invisible, wait_for_text, wait_for_url, wait_for_url_contains, wait_ready,
    wait_until, LoaderPhase, PageReady, ReadyOptions, WaitOptions, WaitResult, Waits,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_SETTLE_MS, DEFAULT_WAIT_TIMEOUT_MS, PAGE_LOADER,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::assertion::*;
    pub use super::backend;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::harness::*;
    pub use super::listener::*;
    pub use super::locator::*;
    pub use super::model::*;
    pub use super::pages::*;
    pub use super::result::*;
    pub use super::session::*;
    pub use super::suites;
    pub use super::wait::*;
}
