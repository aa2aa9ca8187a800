//! Guest-supplies orders as scraped from the UI.

use crate::result::{E2eError, E2eResult};
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display pattern of order timestamps (e.g. "16/04/2025 02:27 PM")
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %I:%M %p";

/// Parse a UI timestamp
pub fn parse_date_time(text: &str) -> E2eResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), DATE_TIME_FORMAT)
        .map_err(|e| E2eError::parse("order timestamp", text, e))
}

/// Format a timestamp the way the UI shows it
#[must_use]
pub fn format_date_time(t: &NaiveDateTime) -> String {
    t.format(DATE_TIME_FORMAT).to_string()
}

/// Drop seconds and sub-seconds
#[must_use]
pub fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

/// Split a comma-separated grid cell into trimmed, non-empty entries
#[must_use]
pub fn split_list(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// OrderStatus
// ============================================================================

/// Lifecycle status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Delivered immediately
    Accomplished,
    /// Awaiting fulfilment
    Proposed,
    /// Withdrawn
    Cancelled,
}

impl OrderStatus {
    /// All statuses in UI order
    pub const ALL: [Self; 3] = [Self::Accomplished, Self::Proposed, Self::Cancelled];

    /// Label shown in the UI
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Accomplished => "Accomplished",
            Self::Proposed => "Proposed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrderStatus {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| E2eError::parse("order status", s, "unknown status"))
    }
}

// ============================================================================
// OrderItem
// ============================================================================

/// One supply line of an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Supply category
    pub category: String,
    /// Supply name
    pub supply: String,
    /// Quantity delivered to each unit
    pub quantity: u32,
    /// Selected unit types
    pub unit_types: Vec<String>,
    /// Selected unit numbers
    pub unit_numbers: Vec<String>,
    /// Total quantity
    pub total: u32,
}

impl OrderItem {
    /// Build an item whose total is `unit_numbers.len() × quantity`
    #[must_use]
    pub fn new(
        category: impl Into<String>,
        supply: impl Into<String>,
        quantity: u32,
        unit_types: Vec<String>,
        unit_numbers: Vec<String>,
    ) -> Self {
        let total = Self::compute_total(quantity, unit_numbers.len());
        Self {
            category: category.into(),
            supply: supply.into(),
            quantity,
            unit_types,
            unit_numbers,
            total,
        }
    }

    /// Replace the total with the value displayed by the application
    #[must_use]
    pub const fn with_displayed_total(mut self, total: u32) -> Self {
        self.total = total;
        self
    }

    /// `units × quantity`, saturating
    #[must_use]
    pub fn compute_total(quantity: u32, units: usize) -> u32 {
        u32::try_from(units)
            .unwrap_or(u32::MAX)
            .saturating_mul(quantity)
    }

    /// Total implied by quantity and selected units
    #[must_use]
    pub fn expected_total(&self) -> u32 {
        Self::compute_total(self.quantity, self.unit_numbers.len())
    }

    /// Whether the stored total agrees with quantity and units
    #[must_use]
    pub fn is_total_consistent(&self) -> bool {
        self.total == self.expected_total()
    }
}

impl fmt::Display for OrderItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} x{} [{}] units [{}] = {}",
            self.category,
            self.supply,
            self.quantity,
            self.unit_types.join(", "),
            self.unit_numbers.join(", "),
            self.total
        )
    }
}

// ============================================================================
// Order
// ============================================================================

/// A guest-supplies order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Order {
    /// Order number
    pub order_no: String,
    /// Status, if known
    pub status: Option<OrderStatus>,
    /// Display name of the creator
    pub created_by: String,
    /// Creation timestamp
    pub created_at: Option<NaiveDateTime>,
    /// Supply lines
    pub items: Vec<OrderItem>,
    /// URL the order was observed at
    pub url: String,
}

impl Order {
    /// Create an empty order
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set order number
    #[must_use]
    pub fn with_order_no(mut self, order_no: impl Into<String>) -> Self {
        self.order_no = order_no.into();
        self
    }

    /// Set status
    #[must_use]
    pub const fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set creator
    #[must_use]
    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = created_by.into();
        self
    }

    /// Set creation timestamp
    #[must_use]
    pub const fn with_created_at(mut self, at: NaiveDateTime) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Parse and set creation timestamp from UI text
    pub fn with_created_at_text(mut self, text: &str) -> E2eResult<Self> {
        self.created_at = Some(parse_date_time(text)?);
        Ok(self)
    }

    /// Set items
    #[must_use]
    pub fn with_items(mut self, items: Vec<OrderItem>) -> Self {
        self.items = items;
        self
    }

    /// Set source URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Creation timestamp in UI format
    #[must_use]
    pub fn created_at_text(&self) -> Option<String> {
        self.created_at.as_ref().map(format_date_time)
    }

    /// Distinct unit numbers across all items
    #[must_use]
    pub fn unit_numbers(&self) -> Vec<String> {
        let mut units: Vec<String> = Vec::new();
        for unit in self.items.iter().flat_map(|i| i.unit_numbers.iter()) {
            if !units.contains(unit) {
                units.push(unit.clone());
            }
        }
        units
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order #{} [{}] by {} at {} ({} items)",
            self.order_no,
            self.status.map_or("?", |s| s.label()),
            self.created_by,
            self.created_at_text().unwrap_or_else(|| "?".to_string()),
            self.items.len()
        )
    }
}
