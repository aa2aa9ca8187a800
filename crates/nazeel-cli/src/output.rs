//! Console output

use crate::runner::RunReport;
use console::{style, Style};
use nazeel_e2e::{SuiteResults, TestStatus, TestSuite};
use std::fmt::Write as _;
use std::time::Duration;

/// Renders suite listings and run summaries
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub const fn new(use_color: bool, quiet: bool) -> Self {
        Self { use_color, quiet }
    }

    fn paint(&self, text: &str, style: &Style) -> String {
        if self.use_color {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Suite names with their cases and dependencies
    #[must_use]
    pub fn render_list(&self, suites: &[TestSuite]) -> String {
        let mut out = String::new();
        for suite in suites {
            let _ = writeln!(
                out,
                "{} ({} cases)",
                self.paint(&suite.name, &Style::new().bold()),
                suite.test_count()
            );
            for case in &suite.cases {
                let _ = write!(out, "  {:<5} {}", case.id, case.description);
                if !case.depends_on.is_empty() {
                    let _ = write!(out, "  [after {}]", case.depends_on.join(", "));
                }
                out.push('\n');
            }
        }
        out
    }

    /// One line per failed or skipped case, then the totals
    #[must_use]
    pub fn render_summary(&self, report: &RunReport) -> String {
        let mut out = String::new();
        for suite in &report.suites {
            let _ = writeln!(out, "{}", self.suite_line(suite));
            for outcome in suite.outcomes.iter().filter(|o| !o.passed()) {
                let tag = match outcome.status {
                    TestStatus::Failed => self.paint("FAIL", &Style::new().red()),
                    _ => self.paint("SKIP", &Style::new().yellow()),
                };
                let _ = writeln!(
                    out,
                    "  {tag} {}: {}",
                    outcome.id,
                    outcome.error.as_deref().unwrap_or_default()
                );
            }
        }
        let verdict = if report.success() {
            self.paint("PASSED", &Style::new().green().bold())
        } else {
            self.paint("FAILED", &Style::new().red().bold())
        };
        let _ = writeln!(
            out,
            "{verdict}: {} passed, {} failed, {} skipped of {} in {:.1}s (run {})",
            report.passed(),
            report.failed(),
            report.skipped(),
            report.total(),
            Duration::from_millis(report.duration_ms).as_secs_f64(),
            report.run_id
        );
        out
    }

    fn suite_line(&self, suite: &SuiteResults) -> String {
        format!(
            "{} {}/{} passed",
            self.paint(&suite.suite, &Style::new().bold()),
            suite.passed_count(),
            suite.total()
        )
    }

    /// Print the summary unless quiet
    pub fn print_summary(&self, report: &RunReport) {
        if !self.quiet {
            print!("{}", self.render_summary(report));
        }
    }

    /// Print a report path notice unless quiet
    pub fn print_report_path(&self, path: &std::path::Path) {
        if !self.quiet {
            println!("{} {}", style("report:").dim(), path.display());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nazeel_e2e::TestOutcome;
    use uuid::Uuid;

    fn outcome(id: &str, status: TestStatus, error: Option<&str>) -> TestOutcome {
        TestOutcome {
            suite: "guest_supplies".into(),
            id: id.into(),
            description: String::new(),
            status,
            attempts: 1,
            duration_ms: 10,
            error: error.map(str::to_string),
        }
    }

    fn report() -> RunReport {
        RunReport {
            run_id: Uuid::nil(),
            started_at: Utc::now(),
            duration_ms: 1_500,
            suites: vec![SuiteResults {
                suite: "guest_supplies".into(),
                outcomes: vec![
                    outcome("tc01", TestStatus::Passed, None),
                    outcome("tc02", TestStatus::Failed, Some("Error toast didn't display")),
                    outcome("tc03", TestStatus::Skipped, Some("depends on tc02")),
                ],
                duration_ms: 30,
            }],
        }
    }

    #[test]
    fn test_summary_lists_failures_and_totals() {
        let text = Reporter::new(false, false).render_summary(&report());
        assert!(text.contains("guest_supplies 1/3 passed"));
        assert!(text.contains("FAIL tc02: Error toast didn't display"));
        assert!(text.contains("SKIP tc03: depends on tc02"));
        assert!(text.contains("FAILED: 1 passed, 1 failed, 1 skipped of 3 in 1.5s"));
    }

    #[test]
    fn test_list_shows_dependencies() {
        let suites = nazeel_e2e::suites::all_suites();
        let text = Reporter::new(false, false).render_list(&suites);
        assert!(text.contains("guest_supplies (21 cases)"));
        assert!(text.contains("[after guest_supplies::tc01]"));
    }
}
