//! Test lifecycle listeners.
//!
//! [`TestHarness`](crate::harness::TestHarness) notifies every listener of
//! suite and test events. `on_test_failure` fires once per case, after the
//! last allowed attempt.

use crate::harness::{SuiteResults, TestCase, TestOutcome};
use crate::screenshot::capture_screenshot;
use crate::session::Session;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Hooks invoked by the harness; all default to no-ops
#[async_trait]
pub trait TestListener: Send {
    /// Suite is about to run
    async fn on_suite_start(&mut self, _suite: &str) {}

    /// Case is about to run its first attempt
    async fn on_test_start(&mut self, _suite: &str, _case: &TestCase) {}

    /// Case passed
    async fn on_test_success(&mut self, _outcome: &TestOutcome) {}

    /// Case failed for good; the session still shows the failing state
    async fn on_test_failure(&mut self, _session: &Session, _outcome: &TestOutcome) {}

    /// Case was not run
    async fn on_test_skipped(&mut self, _outcome: &TestOutcome) {}

    /// Suite finished
    async fn on_suite_finish(&mut self, _results: &SuiteResults) {}
}

/// Logs every event through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

#[async_trait]
impl TestListener for LoggingListener {
    async fn on_suite_start(&mut self, suite: &str) {
        info!(suite, "suite started");
    }

    async fn on_test_start(&mut self, suite: &str, case: &TestCase) {
        info!(suite, test = %case.id, "started: {}", case.description);
    }

    async fn on_test_success(&mut self, outcome: &TestOutcome) {
        info!(
            test = %outcome.qualified_id(),
            attempts = outcome.attempts,
            duration_ms = outcome.duration_ms,
            "passed"
        );
    }

    async fn on_test_failure(&mut self, _session: &Session, outcome: &TestOutcome) {
        error!(
            test = %outcome.qualified_id(),
            attempts = outcome.attempts,
            error = outcome.error.as_deref().unwrap_or_default(),
            "failed"
        );
    }

    async fn on_test_skipped(&mut self, outcome: &TestOutcome) {
        info!(
            test = %outcome.qualified_id(),
            reason = outcome.error.as_deref().unwrap_or_default(),
            "skipped"
        );
    }

    async fn on_suite_finish(&mut self, results: &SuiteResults) {
        info!(
            suite = %results.suite,
            passed = results.passed_count(),
            failed = results.failed_count(),
            skipped = results.skipped_count(),
            duration_ms = results.duration_ms,
            "suite finished"
        );
    }
}

/// Saves a PNG of the browser when a case fails
#[derive(Debug, Clone)]
pub struct ScreenshotListener {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl ScreenshotListener {
    /// Write screenshots under `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Vec::new(),
        }
    }

    /// Target directory
    #[must_use]
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    /// Files written so far
    #[must_use]
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

#[async_trait]
impl TestListener for ScreenshotListener {
    async fn on_test_failure(&mut self, session: &Session, outcome: &TestOutcome) {
        let name = format!("{}_{}", outcome.suite, outcome.id);
        let driver = session.driver();
        match capture_screenshot(driver.as_ref(), &self.dir, &name).await {
            Ok(path) => self.saved.push(path),
            // Never mask the test failure.
            Err(err) => warn!(test = %outcome.qualified_id(), error = %err, "failed to save screenshot"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::harness::TestStatus;
    use crate::mock::MockDriver;
    use std::sync::Arc;

    fn failed(id: &str) -> TestOutcome {
        TestOutcome {
            suite: "supplies_order".into(),
            id: id.into(),
            description: "print accomplished order".into(),
            status: TestStatus::Failed,
            attempts: 1,
            duration_ms: 10,
            error: Some("Print message not displayed".into()),
        }
    }

    #[tokio::test]
    async fn test_screenshot_listener_saves_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(Arc::new(MockDriver::new()), SuiteConfig::default());
        let mut listener = ScreenshotListener::new(dir.path());
        listener.on_test_failure(&session, &failed("tc17")).await;
        assert_eq!(listener.saved().len(), 1);
        let name = listener.saved()[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("supplies_order_tc17_"));
        assert!(name.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_screenshot_error_is_swallowed() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // A regular file cannot be used as the screenshot directory.
        let session = Session::new(Arc::new(MockDriver::new()), SuiteConfig::default());
        let mut listener = ScreenshotListener::new(file.path());
        listener.on_test_failure(&session, &failed("tc18")).await;
        assert!(listener.saved().is_empty());
    }

    #[tokio::test]
    async fn test_logging_listener_handles_all_events() {
        let session = Session::new(Arc::new(MockDriver::new()), SuiteConfig::default());
        let mut listener = LoggingListener;
        listener.on_suite_start("guest_supplies").await;
        listener.on_test_failure(&session, &failed("tc01")).await;
        listener.on_test_skipped(&failed("tc02")).await;
    }
}
