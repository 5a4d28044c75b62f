//! Core expense type domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A validated, non-empty expense type name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ExpenseTypeName(String);

impl ExpenseTypeName {
    /// Create an expense type name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyExpenseTypeName] if `name` is
    /// an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyExpenseTypeName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create an expense type name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for ExpenseTypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ExpenseTypeName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExpenseTypeName::new(s)
    }
}

impl Display for ExpenseTypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for an expense type.
pub type ExpenseTypeId = i64;

/// A type label for an expense (e.g. 'Personal', 'Business').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ExpenseType {
    pub id: ExpenseTypeId,
    pub name: ExpenseTypeName,
}

/// Form data for expense type creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExpenseTypeFormData {
    pub name: String,
}

#[cfg(test)]
mod expense_type_name_tests {
    use crate::{Error, expense_type::ExpenseTypeName};

    #[test]
    fn new_fails_on_empty_string() {
        let name = ExpenseTypeName::new("");

        assert_eq!(name, Err(Error::EmptyExpenseTypeName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let name = ExpenseTypeName::new(" \t\n");

        assert_eq!(name, Err(Error::EmptyExpenseTypeName));
    }

    #[test]
    fn new_succeeds_on_non_empty_string() {
        let name = ExpenseTypeName::new("Business");

        assert!(name.is_ok());
    }
}
