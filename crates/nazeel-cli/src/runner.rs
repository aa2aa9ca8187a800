//! Suite runner: one browser, one login, every selected suite in order

use crate::commands::RunArgs;
use crate::error::{CliError, CliResult};
use chrono::{DateTime, Utc};
use nazeel_e2e::{
    backend, suites, LoggingListener, ScreenshotListener, Session, SuiteConfig, SuiteResults,
    TestHarness, TestListener, TestSuite,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

/// Everything a run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run identifier
    pub run_id: Uuid,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Total duration
    pub duration_ms: u64,
    /// Per-suite results in run order
    pub suites: Vec<SuiteResults>,
}

impl RunReport {
    fn sum(&self, count: impl Fn(&SuiteResults) -> usize) -> usize {
        self.suites.iter().map(count).sum()
    }

    /// Passed cases across suites
    #[must_use]
    pub fn passed(&self) -> usize {
        self.sum(SuiteResults::passed_count)
    }

    /// Failed cases across suites
    #[must_use]
    pub fn failed(&self) -> usize {
        self.sum(SuiteResults::failed_count)
    }

    /// Skipped cases across suites
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.sum(SuiteResults::skipped_count)
    }

    /// Cases across suites
    #[must_use]
    pub fn total(&self) -> usize {
        self.sum(SuiteResults::total)
    }

    /// No case failed
    #[must_use]
    pub fn success(&self) -> bool {
        self.failed() == 0
    }

    /// Write the report as pretty JSON, creating parent directories
    pub fn write_json(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Resolve the suite configuration for a run
pub fn load_config(args: &RunArgs) -> CliResult<SuiteConfig> {
    let mut config = SuiteConfig::load(args.config.as_deref())?;
    if args.headed {
        config.headless = false;
    }
    config.validate()?;
    Ok(config)
}

/// Run `suites` on an already logged-in session
pub async fn run_suites(session: &mut Session, suites: &[TestSuite], fail_fast: bool) -> RunReport {
    let config = session.config().clone();
    let mut harness = TestHarness::new()
        .with_default_retries(config.test_retries)
        .with_default_timeout(config.test_timeout())
        .with_fail_fast(fail_fast);
    let mut logging = LoggingListener;
    let mut screenshots = ScreenshotListener::new(&config.screenshot_dir);
    let mut listeners: [&mut dyn TestListener; 2] = [&mut logging, &mut screenshots];

    let started_at = Utc::now();
    let start = Instant::now();
    let mut results = Vec::with_capacity(suites.len());
    for suite in suites {
        results.push(harness.run_suite(session, suite, &mut listeners).await);
    }

    RunReport {
        run_id: Uuid::new_v4(),
        started_at,
        duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        suites: results,
    }
}

/// Full live run: launch, log in, run, close
pub async fn run(args: &RunArgs) -> CliResult<RunReport> {
    let selected = suites::select(&args.suites)?;
    let config = load_config(args)?;
    info!(
        suites = ?selected.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        base_url = %config.base_url,
        "starting run"
    );

    let driver = backend::launch(&config).await?;
    let mut session = Session::new(driver, config);

    let prepared = async {
        session.start().await?;
        session.login().await?;
        Ok::<_, nazeel_e2e::E2eError>(())
    }
    .await;
    let outcome = match prepared {
        Ok(()) => Ok(run_suites(&mut session, &selected, args.fail_fast).await),
        Err(e) => Err(CliError::run(format!("login failed: {e}"))),
    };

    if let Err(e) = session.shutdown().await {
        error!(error = %e, "browser did not close cleanly");
    }
    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use nazeel_e2e::mock::MockDriver;
    use nazeel_e2e::{E2eError, TestCase, TestFuture};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn pass(_: &mut Session) -> TestFuture<'_> {
        Box::pin(async { Ok(()) })
    }

    fn fail(_: &mut Session) -> TestFuture<'_> {
        Box::pin(async { Err(E2eError::assertion("rows", 1, 0)) })
    }

    fn session(dir: &TempDir) -> Session {
        let mut config = SuiteConfig::default();
        config.action_delay_ms = 0;
        config.test_retries = 0;
        config.screenshot_dir = dir.path().join("shots");
        Session::new(Arc::new(MockDriver::new()), config)
    }

    fn sample() -> Vec<TestSuite> {
        vec![
            TestSuite::new("first")
                .with_case(TestCase::new("tc01", "passes", pass))
                .with_case(TestCase::new("tc02", "fails", fail)),
            TestSuite::new("second")
                .with_case(TestCase::new("tc01", "needs first", pass).depends_on("first::tc02")),
        ]
    }

    #[tokio::test]
    async fn test_run_suites_counts() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let report = run_suites(&mut session, &sample(), false).await;
        assert_eq!(report.total(), 3);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(!report.success());
    }

    #[tokio::test]
    async fn test_report_written_as_json() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        let report = run_suites(&mut session, &sample()[..1], false).await;
        let path = dir.path().join("reports/run.json");
        report.write_json(&path).unwrap();

        let read: RunReport = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read.run_id, report.run_id);
        assert_eq!(read.suites.len(), 1);
        assert_eq!(read.failed(), 1);
    }

    #[test]
    fn test_load_config_rejects_missing_credentials() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "base_url: https://staging.example.test/\n").unwrap();
        let args = RunArgs {
            config: Some(path),
            ..RunArgs::default()
        };
        if std::env::var("NAZEEL_USERNAME").is_err() {
            assert!(matches!(load_config(&args), Err(CliError::E2e(E2eError::Config { .. }))));
        }
    }
}
