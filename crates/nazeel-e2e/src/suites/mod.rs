//! Business scenarios, one suite per application screen.
//!
//! Suites run in the order [`all_suites`] returns them: the supplies order
//! cases inspect the orders the guest supplies cases create, so a run that
//! selects only `supplies_order` skips its dependent cases.

pub mod guest_supplies;
pub mod supplies_order;
pub mod supplies_unit_usages;

use crate::harness::TestSuite;
use crate::result::{E2eError, E2eResult};

/// Suite names in run order
pub const SUITE_NAMES: [&str; 3] = [
    guest_supplies::NAME,
    supplies_order::NAME,
    supplies_unit_usages::NAME,
];

/// Every suite, in run order
#[must_use]
pub fn all_suites() -> Vec<TestSuite> {
    vec![
        guest_supplies::suite(),
        supplies_order::suite(),
        supplies_unit_usages::suite(),
    ]
}

/// Look up a suite by name
#[must_use]
pub fn suite(name: &str) -> Option<TestSuite> {
    match name {
        guest_supplies::NAME => Some(guest_supplies::suite()),
        supplies_order::NAME => Some(supplies_order::suite()),
        supplies_unit_usages::NAME => Some(supplies_unit_usages::suite()),
        _ => None,
    }
}

/// Suites named in `names`, kept in run order; every name must exist
pub fn select(names: &[String]) -> E2eResult<Vec<TestSuite>> {
    if let Some(unknown) = names.iter().find(|n| suite(n).is_none()) {
        return Err(E2eError::config(format!(
            "unknown suite {unknown:?} (expected one of {})",
            SUITE_NAMES.join(", ")
        )));
    }
    if names.is_empty() {
        return Ok(all_suites());
    }
    Ok(all_suites()
        .into_iter()
        .filter(|s| names.iter().any(|n| *n == s.name))
        .collect())
}

/// Report a wait that ran out as a failed business check
pub(crate) fn expect_within<T>(result: E2eResult<T>, message: &str) -> E2eResult<T> {
    match result {
        Err(E2eError::Timeout { ms, waited_for }) => Err(E2eError::assertion(
            message,
            waited_for,
            format!("not within {ms} ms"),
        )),
        other => other,
    }
}
