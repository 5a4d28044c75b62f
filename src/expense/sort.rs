//! Ordering of expense records.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::expense::Expense;

/// The fields an expense listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Description,
    Amount,
    Date,
    Category,
    ExpenseType,
    PaymentMethod,
    Vendor,
    Location,
}

impl SortKey {
    /// The query-string value for the key, matching its serde encoding.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortKey::Description => "description",
            SortKey::Amount => "amount",
            SortKey::Date => "date",
            SortKey::Category => "category",
            SortKey::ExpenseType => "expense_type",
            SortKey::PaymentMethod => "payment_method",
            SortKey::Vendor => "vendor",
            SortKey::Location => "location",
        }
    }
}

/// The direction to sort in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// The query-string value for the direction.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    /// The opposite direction, used to toggle a column header.
    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// How to order an expense listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    /// Most recent expenses first.
    fn default() -> Self {
        Self {
            key: SortKey::Date,
            direction: SortDirection::Descending,
        }
    }
}

/// Compare two expenses under `spec`.
///
/// Ties compare equal, so callers must use a stable sort (e.g.
/// [slice::sort_by]) for equal keys to preserve their existing order.
pub fn compare(a: &Expense, b: &Expense, spec: &SortSpec) -> Ordering {
    let ordering = match spec.key {
        SortKey::Description => a.description.cmp(&b.description),
        SortKey::Amount => a.amount.total_cmp(&b.amount),
        SortKey::Date => a.date.cmp(&b.date),
        SortKey::Category => a.category_id.cmp(&b.category_id),
        SortKey::ExpenseType => a.expense_type_id.cmp(&b.expense_type_id),
        SortKey::PaymentMethod => a.payment_method.cmp(&b.payment_method),
        SortKey::Vendor => a.vendor.cmp(&b.vendor),
        SortKey::Location => a.location.cmp(&b.location),
    };

    match spec.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}
