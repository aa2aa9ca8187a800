//! Test harness for running scenario suites.
//!
//! Cases run sequentially against one shared [`Session`]. A case whose
//! dependency did not pass is skipped; a failing case is re-run while its
//! [`RetryAnalyzer`] allows it, and every attempt is bounded by a timeout.

use crate::listener::TestListener;
use crate::result::{E2eError, E2eResult};
use crate::retry::RetryAnalyzer;
use crate::session::Session;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Future returned by a test body
pub type TestFuture<'a> = BoxFuture<'a, E2eResult<()>>;

/// Test body: borrows the session for the duration of one attempt
pub type TestFn = for<'a> fn(&'a mut Session) -> TestFuture<'a>;

// ============================================================================
// Cases and suites
// ============================================================================

/// A single test case
#[derive(Clone)]
pub struct TestCase {
    /// Stable id, unique within the suite (e.g., "tc01")
    pub id: String,
    /// Human-readable description
    pub description: String,
    /// Test body
    pub body: TestFn,
    /// Ids that must have passed first; `suite::id` for other suites
    pub depends_on: Vec<String>,
    /// Re-runs allowed after a failure (None = harness default)
    pub retries: Option<u32>,
    /// Per-attempt timeout (None = harness default)
    pub timeout: Option<Duration>,
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("depends_on", &self.depends_on)
            .field("retries", &self.retries)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl TestCase {
    /// Create a new test case
    #[must_use]
    pub fn new(id: impl Into<String>, description: impl Into<String>, body: TestFn) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            body,
            depends_on: Vec::new(),
            retries: None,
            timeout: None,
        }
    }

    /// Require `id` to have passed before this case runs
    #[must_use]
    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.depends_on.push(id.into());
        self
    }

    /// Set the retry bound
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Set the per-attempt timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A named, ordered list of cases
#[derive(Debug, Clone)]
pub struct TestSuite {
    /// Suite name
    pub name: String,
    /// Cases in declaration order
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    /// Create a new test suite
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    /// Add a case
    #[must_use]
    pub fn with_case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    /// Get the number of cases
    #[must_use]
    pub fn test_count(&self) -> usize {
        self.cases.len()
    }

    /// Look up a case by id
    #[must_use]
    pub fn case(&self, id: &str) -> Option<&TestCase> {
        self.cases.iter().find(|c| c.id == id)
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Final status of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Passed (possibly after retries)
    Passed,
    /// Failed on the last allowed attempt
    Failed,
    /// Not run
    Skipped,
}

/// Result of running a single case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Suite name
    pub suite: String,
    /// Case id
    pub id: String,
    /// Case description
    pub description: String,
    /// Final status
    pub status: TestStatus,
    /// Attempts made (0 when skipped)
    pub attempts: u32,
    /// Wall time across all attempts
    pub duration_ms: u64,
    /// Last error, or the skip reason
    pub error: Option<String>,
}

impl TestOutcome {
    /// `suite::id`
    #[must_use]
    pub fn qualified_id(&self) -> String {
        format!("{}::{}", self.suite, self.id)
    }

    /// Whether the case passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

/// Results from running a test suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteResults {
    /// Suite name
    pub suite: String,
    /// Per-case outcomes in run order
    pub outcomes: Vec<TestOutcome>,
    /// Total duration
    pub duration_ms: u64,
}

impl SuiteResults {
    fn count(&self, status: TestStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Count passed cases
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(TestStatus::Passed)
    }

    /// Count failed cases
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    /// Count skipped cases
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(TestStatus::Skipped)
    }

    /// Get total case count
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// No case failed or was skipped
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(TestOutcome::passed)
    }

    /// Failed outcomes
    #[must_use]
    pub fn failures(&self) -> Vec<&TestOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == TestStatus::Failed)
            .collect()
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Sequential suite runner
#[derive(Debug)]
pub struct TestHarness {
    default_retries: u32,
    default_timeout: Duration,
    fail_fast: bool,
    stopped: bool,
    passed: HashSet<String>,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self {
            default_retries: 0,
            default_timeout: Duration::from_millis(crate::config::DEFAULT_TEST_TIMEOUT_MS),
            fail_fast: false,
            stopped: false,
            passed: HashSet::new(),
        }
    }
}

impl TestHarness {
    /// Create a new test harness
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Retry bound for cases that do not set one
    #[must_use]
    pub const fn with_default_retries(mut self, retries: u32) -> Self {
        self.default_retries = retries;
        self
    }

    /// Timeout for cases that do not set one
    #[must_use]
    pub const fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Skip everything after the first failure
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Whether `suite::id` has passed in this harness
    #[must_use]
    pub fn has_passed(&self, qualified_id: &str) -> bool {
        self.passed.contains(qualified_id)
    }

    /// Run every case of `suite` in order
    pub async fn run_suite(
        &mut self,
        session: &mut Session,
        suite: &TestSuite,
        listeners: &mut [&mut dyn TestListener],
    ) -> SuiteResults {
        let start = Instant::now();
        for listener in listeners.iter_mut() {
            listener.on_suite_start(&suite.name).await;
        }

        let mut outcomes = Vec::with_capacity(suite.cases.len());
        for case in &suite.cases {
            let outcome = match self.skip_reason(suite, case) {
                Some(reason) => {
                    let outcome = skipped(suite, case, reason);
                    info!(test = %outcome.qualified_id(), reason = ?outcome.error, "test skipped");
                    for listener in listeners.iter_mut() {
                        listener.on_test_skipped(&outcome).await;
                    }
                    outcome
                }
                None => self.run_case(session, suite, case, listeners).await,
            };
            match outcome.status {
                TestStatus::Passed => {
                    self.passed.insert(outcome.qualified_id());
                }
                TestStatus::Failed if self.fail_fast => self.stopped = true,
                _ => {}
            }
            outcomes.push(outcome);
        }

        let results = SuiteResults {
            suite: suite.name.clone(),
            outcomes,
            duration_ms: millis(start.elapsed()),
        };
        for listener in listeners.iter_mut() {
            listener.on_suite_finish(&results).await;
        }
        results
    }

    fn skip_reason(&self, suite: &TestSuite, case: &TestCase) -> Option<String> {
        if self.stopped {
            return Some("skipped after an earlier failure (fail-fast)".to_string());
        }
        case.depends_on
            .iter()
            .map(|dep| qualify(&suite.name, dep))
            .find(|dep| !self.passed.contains(dep))
            .map(|dep| format!("dependency {dep} did not pass"))
    }

    async fn run_case(
        &self,
        session: &mut Session,
        suite: &TestSuite,
        case: &TestCase,
        listeners: &mut [&mut dyn TestListener],
    ) -> TestOutcome {
        for listener in listeners.iter_mut() {
            listener.on_test_start(&suite.name, case).await;
        }
        info!(suite = %suite.name, test = %case.id, "{}", case.description);

        let timeout = case.timeout.unwrap_or(self.default_timeout);
        let mut analyzer = RetryAnalyzer::new(case.retries.unwrap_or(self.default_retries));
        let start = Instant::now();
        let mut attempts = 0;
        let result = loop {
            attempts += 1;
            let attempt = match tokio::time::timeout(timeout, (case.body)(&mut *session)).await {
                Ok(result) => result,
                Err(_) => Err(E2eError::Timeout {
                    ms: millis(timeout),
                    waited_for: format!("test {}::{}", suite.name, case.id),
                }),
            };
            match attempt {
                Ok(()) => break Ok(()),
                Err(err) if analyzer.retry() => {
                    warn!(
                        test = %case.id,
                        attempt = attempts,
                        remaining = analyzer.remaining(),
                        error = %err,
                        "test failed; retrying"
                    );
                }
                Err(err) => break Err(err),
            }
        };

        let mut outcome = TestOutcome {
            suite: suite.name.clone(),
            id: case.id.clone(),
            description: case.description.clone(),
            status: TestStatus::Passed,
            attempts,
            duration_ms: millis(start.elapsed()),
            error: None,
        };
        match result {
            Ok(()) => {
                info!(test = %outcome.qualified_id(), attempts, "test passed");
                for listener in listeners.iter_mut() {
                    listener.on_test_success(&outcome).await;
                }
            }
            Err(err) => {
                outcome.status = TestStatus::Failed;
                outcome.error = Some(err.to_string());
                for listener in listeners.iter_mut() {
                    listener.on_test_failure(session, &outcome).await;
                }
            }
        }
        outcome
    }
}

fn qualify(suite: &str, id: &str) -> String {
    if id.contains("::") {
        id.to_string()
    } else {
        format!("{suite}::{id}")
    }
}

fn skipped(suite: &TestSuite, case: &TestCase, reason: String) -> TestOutcome {
    TestOutcome {
        suite: suite.name.clone(),
        id: case.id.clone(),
        description: case.description.clone(),
        status: TestStatus::Skipped,
        attempts: 0,
        duration_ms: 0,
        error: Some(reason),
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
