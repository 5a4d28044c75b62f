//! Report generation: aggregate filtered expenses into a multi-sheet
//! spreadsheet, store the artifact, and track the generated reports.

pub(crate) mod aggregation;
mod db;
mod delete;
mod domain;
mod generate;
mod list;
pub(crate) mod workbook;

pub use db::{create_report, create_report_table, get_all_reports};
pub use delete::delete_report_endpoint;
pub use domain::{Report, ReportId};
pub use generate::generate_report_endpoint;
pub use list::get_reports_page;
