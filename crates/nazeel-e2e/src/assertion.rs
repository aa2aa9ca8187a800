//! Soft Assertions
//!
//! Collect several business-rule failures before failing a test, so a single
//! screenshot documents every mismatch. Each failure keeps the expected and
//! actual values.

use crate::model::{truncate_to_minute, Order, OrderItem};
use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A single assertion failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionFailure {
    /// What was being checked
    pub message: String,
    /// Expected value
    pub expected: String,
    /// Observed value
    pub actual: String,
    /// Index of this assertion in the sequence
    pub index: usize,
}

/// Soft assertions collector
///
/// ```ignore
/// let mut soft = SoftAssertions::new();
/// soft.assert_eq(&row.status, &expected.status, "status");
/// soft.assert_contains(&row.created_by, &user.name, "created by");
/// soft.verify()?;
/// ```
#[derive(Debug, Default)]
pub struct SoftAssertions {
    failures: Vec<AssertionFailure>,
    assertion_count: usize,
}

impl SoftAssertions {
    /// Create a new soft assertions collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assert two values are equal
    pub fn assert_eq<T: PartialEq + Debug + ?Sized>(&mut self, actual: &T, expected: &T, message: &str) {
        self.assertion_count += 1;
        if actual != expected {
            self.record(message, format!("{expected:?}"), format!("{actual:?}"));
        }
    }

    /// Assert a condition is true
    pub fn assert_true(&mut self, condition: bool, message: &str) {
        self.assertion_count += 1;
        if !condition {
            self.record(message, "true".into(), "false".into());
        }
    }

    /// Assert a string contains a substring
    pub fn assert_contains(&mut self, haystack: &str, needle: &str, message: &str) {
        self.assertion_count += 1;
        if !haystack.contains(needle) {
            self.record(message, format!("contains {needle:?}"), format!("{haystack:?}"));
        }
    }

    /// Assert a collection has expected length
    pub fn assert_len<T>(&mut self, collection: &[T], expected: usize, message: &str) {
        self.assertion_count += 1;
        if collection.len() != expected {
            self.record(message, expected.to_string(), collection.len().to_string());
        }
    }

    /// Assert an item's total agrees with quantity × units
    pub fn assert_item_total(&mut self, item: &OrderItem, message: &str) {
        self.assertion_count += 1;
        if !item.is_total_consistent() {
            self.record(
                message,
                item.expected_total().to_string(),
                item.total.to_string(),
            );
        }
    }

    /// Compare the header fields of two orders, as shown in the listing.
    ///
    /// Order number is only compared when the expected order has one. The
    /// creator matches when either non-empty name contains the other.
    /// Timestamps are compared at minute granularity.
    pub fn assert_order_overview(&mut self, actual: &Order, expected: &Order) {
        if !expected.order_no.is_empty() {
            self.assert_eq(actual.order_no.as_str(), expected.order_no.as_str(), "order number");
        }
        self.assert_eq(&actual.status, &expected.status, "order status");
        self.assertion_count += 1;
        let (a, e) = (actual.created_by.trim(), expected.created_by.trim());
        if a.is_empty() || e.is_empty() || !(a.contains(e) || e.contains(a)) {
            self.record(
                "created by",
                expected.created_by.clone(),
                actual.created_by.clone(),
            );
        }
        if let (Some(a), Some(e)) = (actual.created_at, expected.created_at) {
            self.assert_eq(
                &truncate_to_minute(a),
                &truncate_to_minute(e),
                "created at",
            );
        }
    }

    /// Compare an order read from its view page with the submitted order:
    /// the overview fields plus every item
    pub fn assert_order(&mut self, actual: &Order, expected: &Order) {
        self.assert_order_overview(actual, expected);
        self.assert_len(&actual.items, expected.items.len(), "item count");
        for (i, (a, e)) in actual.items.iter().zip(&expected.items).enumerate() {
            self.assert_eq(a.category.as_str(), e.category.as_str(), &format!("item {i} category"));
            self.assert_eq(a.supply.as_str(), e.supply.as_str(), &format!("item {i} supply"));
            self.assert_eq(&a.quantity, &e.quantity, &format!("item {i} quantity"));
            self.assert_eq(&a.total, &e.total, &format!("item {i} total"));
            self.assert_eq(&a.unit_numbers, &e.unit_numbers, &format!("item {i} units"));
        }
    }

    /// Record a custom failure
    pub fn fail(&mut self, message: impl Into<String>, expected: impl ToString, actual: impl ToString) {
        self.assertion_count += 1;
        let message = message.into();
        self.record(&message, expected.to_string(), actual.to_string());
    }

    fn record(&mut self, message: &str, expected: String, actual: String) {
        self.failures.push(AssertionFailure {
            message: message.to_string(),
            expected,
            actual,
            index: self.failures.len(),
        });
    }

    /// Get all failures
    #[must_use]
    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    /// Get the number of failures
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Get the total number of assertions checked
    #[must_use]
    pub const fn assertion_count(&self) -> usize {
        self.assertion_count
    }

    /// Check if all assertions passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Verify all assertions passed.
    ///
    /// Multiple failures are folded into one [`E2eError::Assertion`] whose
    /// fields join the individual messages and values with `"; "`.
    pub fn verify(&self) -> E2eResult<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        let join = |f: fn(&AssertionFailure) -> &str| {
            self.failures.iter().map(f).collect::<Vec<_>>().join("; ")
        };
        Err(E2eError::Assertion {
            message: format!(
                "{} of {} checks failed: {}",
                self.failures.len(),
                self.assertion_count,
                join(|f| f.message.as_str())
            ),
            expected: join(|f| f.expected.as_str()),
            actual: join(|f| f.actual.as_str()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::{parse_date_time, OrderStatus};

    fn item(qty: u32, units: &[&str]) -> OrderItem {
        OrderItem::new(
            "Bathroom",
            "Towels",
            qty,
            vec!["Suite".into()],
            units.iter().map(|s| (*s).to_string()).collect(),
        )
    }

    fn order() -> Order {
        Order::new()
            .with_order_no("1042")
            .with_status(OrderStatus::Accomplished)
            .with_created_by("QA Tester")
            .with_created_at(parse_date_time("16/04/2025 02:27 PM").unwrap())
            .with_items(vec![item(2, &["101", "102"])])
    }

    mod collecting {
        use super::*;

        #[test]
        fn test_new_creates_empty() {
            let soft = SoftAssertions::new();
            assert!(soft.all_passed());
            assert!(soft.verify().is_ok());
        }

        #[test]
        fn test_failures_are_collected() {
            let mut soft = SoftAssertions::new();
            soft.assert_eq(&1, &2, "rows");
            soft.assert_true(false, "toast shown");
            soft.assert_contains("Cancelled", "Proposed", "status");
            assert_eq!(soft.failure_count(), 3);
            assert_eq!(soft.failures()[1].index, 1);
        }

        #[test]
        fn test_verify_folds_into_one_assertion_error() {
            let mut soft = SoftAssertions::new();
            soft.assert_eq(&1, &2, "rows");
            soft.assert_len(&[1, 2, 3], 2, "items");
            match soft.verify().unwrap_err() {
                E2eError::Assertion {
                    message,
                    expected,
                    actual,
                } => {
                    assert!(message.starts_with("2 of 2 checks failed"));
                    assert_eq!(expected, "2; 2");
                    assert_eq!(actual, "1; 3");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn test_item_total() {
            let mut soft = SoftAssertions::new();
            soft.assert_item_total(&item(3, &["101"]), "ok");
            soft.assert_item_total(&item(3, &["101"]).with_displayed_total(4), "bad");
            assert_eq!(soft.failure_count(), 1);
            assert_eq!(soft.failures()[0].expected, "3");
        }
    }

    mod orders {
        use super::*;

        #[test]
        fn test_identical_orders_match() {
            let mut soft = SoftAssertions::new();
            soft.assert_order(&order(), &order());
            assert!(soft.all_passed(), "{:?}", soft.failures());
        }

        #[test]
        fn test_creator_matches_by_containment_either_way() {
            let mut soft = SoftAssertions::new();
            let actual = order().with_created_by("QA Tester - Nazeel");
            soft.assert_order(&actual, &order());
            soft.assert_order(&order(), &actual);
            assert!(soft.all_passed());
        }

        #[test]
        fn test_empty_creator_never_matches() {
            for (actual, expected) in [("", "QA Tester"), ("QA Tester", ""), ("  ", "  ")] {
                let mut soft = SoftAssertions::new();
                soft.assert_order_overview(&order().with_created_by(actual), &order().with_created_by(expected));
                assert_eq!(soft.failure_count(), 1, "{actual:?} vs {expected:?}");
                assert_eq!(soft.failures()[0].message, "created by");
            }
        }

        #[test]
        fn test_missing_expected_order_no_is_not_compared() {
            let mut soft = SoftAssertions::new();
            let expected = Order {
                order_no: String::new(),
                ..order()
            };
            soft.assert_order(&order(), &expected);
            assert!(soft.all_passed());
        }

        #[test]
        fn test_overview_ignores_items() {
            let mut soft = SoftAssertions::new();
            let listed = order().with_items(Vec::new());
            soft.assert_order_overview(&listed, &order());
            assert!(soft.all_passed());
            soft.assert_order(&listed, &order());
            assert_eq!(soft.failures()[0].message, "item count");
        }

        #[test]
        fn test_status_and_item_mismatches_are_reported() {
            let mut soft = SoftAssertions::new();
            let actual = order()
                .with_status(OrderStatus::Proposed)
                .with_items(vec![item(5, &["101", "102"])]);
            soft.assert_order(&actual, &order());
            let messages: Vec<_> = soft.failures().iter().map(|f| f.message.clone()).collect();
            assert!(messages.contains(&"order status".to_string()));
            assert!(messages.contains(&"item 0 quantity".to_string()));
            assert!(messages.contains(&"item 0 total".to_string()));
        }
    }
}
