//! Filtering of expense records.
//!
//! [FilterSpec] is pure data: every bound is optional and inclusive, and
//! evaluation never fails. Coercion from form strings (where the UI sends an
//! "all" sentinel or empty fields for unset bounds) happens in
//! [FilterForm::to_spec] at the HTTP boundary, shared by the expenses page
//! and report generation.

use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{
    Error,
    category::CategoryId,
    expense::{Expense, PaymentMethod},
    expense_type::ExpenseTypeId,
};

/// The sentinel select value meaning 'no constraint'.
const ALL_SENTINEL: &str = "all";

/// The bounds an expense must satisfy to be included.
///
/// All set bounds are ANDed together and inclusive; unset bounds are
/// unconstrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub category_id: Option<CategoryId>,
    pub expense_type_id: Option<ExpenseTypeId>,
    pub payment_method: Option<PaymentMethod>,
}

impl FilterSpec {
    /// Whether `expense` satisfies every set bound.
    pub fn includes(&self, expense: &Expense) -> bool {
        if let Some(start_date) = self.start_date
            && expense.date < start_date
        {
            return false;
        }

        if let Some(end_date) = self.end_date
            && expense.date > end_date
        {
            return false;
        }

        if let Some(min_amount) = self.min_amount
            && expense.amount < min_amount
        {
            return false;
        }

        if let Some(max_amount) = self.max_amount
            && expense.amount > max_amount
        {
            return false;
        }

        if let Some(category_id) = self.category_id
            && expense.category_id != category_id
        {
            return false;
        }

        if let Some(expense_type_id) = self.expense_type_id
            && expense.expense_type_id != expense_type_id
        {
            return false;
        }

        if let Some(payment_method) = self.payment_method
            && expense.payment_method != payment_method
        {
            return false;
        }

        true
    }
}

/// Raw filter fields as submitted by the filter form or query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterForm {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
    pub category: Option<String>,
    pub expense_type: Option<String>,
    pub payment_method: Option<String>,
}

impl FilterForm {
    /// Coerce the raw form fields into a [FilterSpec].
    ///
    /// Empty strings and the "all" sentinel mean 'no constraint'. Numeric
    /// fields that fail to parse are treated as unset (the browser's number
    /// inputs only submit numbers), while an unparseable date or an unknown
    /// payment method is a client error.
    ///
    /// # Errors
    /// This function will return an:
    /// - [Error::InvalidDate] if a date field is set but not an ISO date,
    /// - [Error::InvalidPaymentMethod] if the payment method is not CASH or
    ///   TRANSFER.
    pub fn to_spec(&self) -> Result<FilterSpec, Error> {
        let payment_method = match set_value(&self.payment_method) {
            Some(raw) => Some(raw.parse::<PaymentMethod>()?),
            None => None,
        };

        Ok(FilterSpec {
            start_date: parse_date(&self.start_date)?,
            end_date: parse_date(&self.end_date)?,
            min_amount: parse_number(&self.min_amount),
            max_amount: parse_number(&self.max_amount),
            category_id: parse_id(&self.category),
            expense_type_id: parse_id(&self.expense_type),
            payment_method,
        })
    }
}

fn set_value(value: &Option<String>) -> Option<&str> {
    match value.as_deref().map(str::trim) {
        None | Some("") | Some(ALL_SENTINEL) => None,
        Some(value) => Some(value),
    }
}

fn parse_date(value: &Option<String>) -> Result<Option<Date>, Error> {
    let format = format_description!("[year]-[month]-[day]");

    match set_value(value) {
        Some(raw) => Date::parse(raw, &format)
            .map(Some)
            .map_err(|_| Error::InvalidDate(raw.to_string())),
        None => Ok(None),
    }
}

fn parse_number(value: &Option<String>) -> Option<f64> {
    set_value(value).and_then(|raw| raw.parse().ok())
}

fn parse_id(value: &Option<String>) -> Option<i64> {
    set_value(value).and_then(|raw| raw.parse().ok())
}

#[cfg(test)]
mod filter_spec_tests {
    use time::macros::date;

    use crate::expense::{Expense, FilterSpec, PaymentMethod};

    fn make_expense(amount: f64, date: time::Date) -> Expense {
        Expense {
            id: 1,
            description: "Test".to_string(),
            amount,
            date,
            category_id: 1,
            expense_type_id: 1,
            payment_method: PaymentMethod::Cash,
            vendor: String::new(),
            location: String::new(),
            receipt_url: None,
        }
    }

    #[test]
    fn default_spec_includes_everything() {
        let spec = FilterSpec::default();

        assert!(spec.includes(&make_expense(0.01, date!(1970 - 01 - 01))));
        assert!(spec.includes(&make_expense(1e9, date!(2099 - 12 - 31))));
    }

    #[test]
    fn amount_bounds_are_inclusive() {
        let spec = FilterSpec {
            min_amount: Some(10.0),
            max_amount: Some(20.0),
            ..Default::default()
        };

        assert!(spec.includes(&make_expense(10.0, date!(2024 - 05 - 01))));
        assert!(spec.includes(&make_expense(20.0, date!(2024 - 05 - 01))));
        assert!(!spec.includes(&make_expense(9.99, date!(2024 - 05 - 01))));
        assert!(!spec.includes(&make_expense(20.01, date!(2024 - 05 - 01))));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let spec = FilterSpec {
            start_date: Some(date!(2024 - 05 - 01)),
            end_date: Some(date!(2024 - 05 - 31)),
            ..Default::default()
        };

        assert!(spec.includes(&make_expense(1.0, date!(2024 - 05 - 01))));
        assert!(spec.includes(&make_expense(1.0, date!(2024 - 05 - 31))));
        assert!(!spec.includes(&make_expense(1.0, date!(2024 - 04 - 30))));
        assert!(!spec.includes(&make_expense(1.0, date!(2024 - 06 - 01))));
    }

    #[test]
    fn tightening_min_amount_never_admits_more() {
        let expenses: Vec<_> = (1..=20)
            .map(|i| make_expense(i as f64, date!(2024 - 05 - 01)))
            .collect();

        let loose = FilterSpec {
            min_amount: Some(5.0),
            ..Default::default()
        };
        let tight = FilterSpec {
            min_amount: Some(10.0),
            ..Default::default()
        };

        let loose_count = expenses.iter().filter(|e| loose.includes(e)).count();
        let tight_count = expenses.iter().filter(|e| tight.includes(e)).count();

        assert!(tight_count <= loose_count);

        // Everything the tight filter admits, the loose filter admits too.
        for expense in &expenses {
            if tight.includes(expense) {
                assert!(loose.includes(expense));
            }
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let expenses: Vec<_> = (1..=20)
            .map(|i| make_expense(i as f64, date!(2024 - 05 - 01)))
            .collect();
        let spec = FilterSpec {
            min_amount: Some(7.0),
            max_amount: Some(15.0),
            ..Default::default()
        };

        let once: Vec<_> = expenses.iter().filter(|e| spec.includes(e)).collect();
        let twice: Vec<_> = once.iter().filter(|e| spec.includes(e)).cloned().collect();

        assert_eq!(once, twice);
    }
}

#[cfg(test)]
mod filter_form_tests {
    use time::macros::date;

    use crate::{
        Error,
        expense::{FilterSpec, PaymentMethod, filter::FilterForm},
    };

    #[test]
    fn empty_form_produces_identity_spec() {
        let spec = FilterForm::default().to_spec().unwrap();

        assert_eq!(spec, FilterSpec::default());
    }

    #[test]
    fn all_sentinel_means_unset() {
        let form = FilterForm {
            category: Some("all".to_string()),
            expense_type: Some("all".to_string()),
            payment_method: Some("all".to_string()),
            ..Default::default()
        };

        let spec = form.to_spec().unwrap();

        assert_eq!(spec, FilterSpec::default());
    }

    #[test]
    fn fields_are_coerced() {
        let form = FilterForm {
            start_date: Some("2024-05-01".to_string()),
            min_amount: Some("12.5".to_string()),
            category: Some("3".to_string()),
            payment_method: Some("TRANSFER".to_string()),
            ..Default::default()
        };

        let spec = form.to_spec().unwrap();

        assert_eq!(spec.start_date, Some(date!(2024 - 05 - 01)));
        assert_eq!(spec.min_amount, Some(12.5));
        assert_eq!(spec.category_id, Some(3));
        assert_eq!(spec.payment_method, Some(PaymentMethod::Transfer));
    }

    #[test]
    fn invalid_date_is_rejected() {
        let form = FilterForm {
            start_date: Some("May Day".to_string()),
            ..Default::default()
        };

        let result = form.to_spec();

        assert_eq!(result, Err(Error::InvalidDate("May Day".to_string())));
    }

    #[test]
    fn invalid_payment_method_is_rejected() {
        let form = FilterForm {
            payment_method: Some("CHEQUE".to_string()),
            ..Default::default()
        };

        let result = form.to_spec();

        assert_eq!(
            result,
            Err(Error::InvalidPaymentMethod("CHEQUE".to_string()))
        );
    }
}
