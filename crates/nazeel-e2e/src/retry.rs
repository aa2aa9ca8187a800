//! Retry analyzer for flaky tests.
//!
//! Decides whether a failed test gets another run. Each [`TestCase`] gets a
//! fresh analyzer, so the budget is per test, not per suite.
//!
//! [`TestCase`]: crate::harness::TestCase

use serde::{Deserialize, Serialize};

/// Retry budget of the legacy suite configuration
pub const DEFAULT_MAX_RETRY: u32 = 25;

/// Counts re-runs of one failing test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryAnalyzer {
    max_retries: u32,
    count: u32,
}

impl Default for RetryAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRY)
    }
}

impl RetryAnalyzer {
    /// Allow up to `max_retries` re-runs
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            count: 0,
        }
    }

    /// Analyzer that never retries
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(0)
    }

    /// Called after a failure; `true` means run the test again
    pub fn retry(&mut self) -> bool {
        if self.count < self.max_retries {
            self.count += 1;
            true
        } else {
            false
        }
    }

    /// Re-runs granted so far
    #[must_use]
    pub const fn retries_used(&self) -> u32 {
        self.count
    }

    /// Re-runs still available
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.max_retries - self.count
    }

    /// Configured bound
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Forget previous retries
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_bound() {
        assert_eq!(RetryAnalyzer::default().max_retries(), 25);
    }

    #[test]
    fn test_disabled_never_retries() {
        let mut analyzer = RetryAnalyzer::disabled();
        assert!(!analyzer.retry());
        assert_eq!(analyzer.retries_used(), 0);
    }

    #[test]
    fn test_counts_and_resets() {
        let mut analyzer = RetryAnalyzer::new(2);
        assert!(analyzer.retry());
        assert_eq!(analyzer.remaining(), 1);
        assert!(analyzer.retry());
        assert!(!analyzer.retry());
        assert_eq!(analyzer.retries_used(), 2);
        analyzer.reset();
        assert_eq!(analyzer.remaining(), 2);
    }

    proptest! {
        #[test]
        fn prop_grants_exactly_max_retries(max in 0u32..100) {
            let mut analyzer = RetryAnalyzer::new(max);
            let granted = (0..max + 10).filter(|_| analyzer.retry()).count();
            prop_assert_eq!(granted as u32, max);
        }
    }
}
