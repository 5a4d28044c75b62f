//! Core expense domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, category::CategoryId, expense_type::ExpenseTypeId};

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// How an expense was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Transfer,
}

impl PaymentMethod {
    /// The canonical string stored in the database and sent in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Transfer => "TRANSFER",
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Transfer => "Transfer",
        };

        write!(f, "{label}")
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CASH" => Ok(PaymentMethod::Cash),
            "TRANSFER" => Ok(PaymentMethod::Transfer),
            _ => Err(Error::InvalidPaymentMethod(s.to_string())),
        }
    }
}

impl ToSql for PaymentMethod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for PaymentMethod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(std::io::Error::other(format!(
                "{error}"
            )))))
    }
}

/// A recorded expense.
///
/// To create a new `Expense`, use [Expense::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// What the expense was for.
    pub description: String,
    /// The amount of money spent. Always positive.
    pub amount: f64,
    /// When the expense happened.
    pub date: Date,
    /// The category the expense belongs to.
    pub category_id: CategoryId,
    /// The type label for the expense, e.g. 'Personal' or 'Business'.
    pub expense_type_id: ExpenseTypeId,
    /// How the expense was paid.
    pub payment_method: PaymentMethod,
    /// Who the money was paid to. May be empty.
    pub vendor: String,
    /// Where the expense happened. May be empty.
    pub location: String,
    /// The URL path of the uploaded receipt, if one was provided.
    pub receipt_url: Option<String>,
}

impl Expense {
    /// Start building a new expense.
    ///
    /// Vendor, location and receipt default to empty and can be set on the
    /// returned [ExpenseBuilder].
    ///
    /// # Errors
    ///
    /// This function will return an:
    /// - [Error::EmptyDescription] if `description` is empty or whitespace,
    /// - [Error::NonPositiveAmount] if `amount` is zero or negative.
    pub fn build(
        description: &str,
        amount: f64,
        date: Date,
        category_id: CategoryId,
        expense_type_id: ExpenseTypeId,
        payment_method: PaymentMethod,
    ) -> Result<ExpenseBuilder, Error> {
        if description.trim().is_empty() {
            return Err(Error::EmptyDescription);
        }

        if amount <= 0.0 {
            return Err(Error::NonPositiveAmount(amount));
        }

        Ok(ExpenseBuilder {
            description: description.trim().to_owned(),
            amount,
            date,
            category_id,
            expense_type_id,
            payment_method,
            vendor: String::new(),
            location: String::new(),
            receipt_url: None,
        })
    }
}

/// A validated expense awaiting insertion or applied as an update.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseBuilder {
    pub description: String,
    pub amount: f64,
    pub date: Date,
    pub category_id: CategoryId,
    pub expense_type_id: ExpenseTypeId,
    pub payment_method: PaymentMethod,
    pub vendor: String,
    pub location: String,
    pub receipt_url: Option<String>,
}

impl ExpenseBuilder {
    /// Set the vendor/payee for the expense.
    pub fn vendor(mut self, vendor: &str) -> Self {
        self.vendor = vendor.trim().to_owned();
        self
    }

    /// Set the location for the expense.
    pub fn location(mut self, location: &str) -> Self {
        self.location = location.trim().to_owned();
        self
    }

    /// Set the receipt URL for the expense.
    pub fn receipt_url(mut self, receipt_url: Option<String>) -> Self {
        self.receipt_url = receipt_url;
        self
    }
}
