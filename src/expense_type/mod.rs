//! Expense type management (e.g. 'Personal', 'Business').
//!
//! Unlike categories, expense types can be deleted while expenses still
//! reference them. Affected expenses keep their stored type ID and render
//! the type as unknown.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::{create_expense_type_endpoint, get_new_expense_type_page};
pub use db::{
    create_expense_type, create_expense_type_table, delete_expense_type, get_all_expense_types,
    get_expense_type, update_expense_type,
};
pub use delete::delete_expense_type_endpoint;
pub use domain::{ExpenseType, ExpenseTypeId, ExpenseTypeName};
pub use edit::{get_edit_expense_type_page, update_expense_type_endpoint};
pub use list::get_expense_types_page;
