//! Expense records and the pages and endpoints for managing them.
//!
//! The listing page runs every request through the same in-memory pipeline:
//! search, [filter](FilterSpec), [sort](SortSpec), then paginate. Report
//! generation reuses the filter stage.

mod create;
pub(crate) mod db;
mod delete;
mod domain;
mod edit;
mod filter;
mod form;
mod list;
mod pipeline;
mod receipt;
mod sort;

pub use create::{create_expense_endpoint, get_new_expense_page};
pub use db::{
    create_expense, create_expense_table, delete_expense, get_all_expenses, get_expense,
    update_expense,
};
pub use delete::delete_expense_endpoint;
pub use domain::{Expense, ExpenseBuilder, ExpenseId, PaymentMethod};
pub use edit::{get_edit_expense_page, update_expense_endpoint};
pub use filter::{FilterForm, FilterSpec};
pub use list::get_expenses_page;
pub use pipeline::{ExpenseView, view};
pub use sort::{SortDirection, SortKey, SortSpec};
