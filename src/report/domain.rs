//! The report domain model.

use time::OffsetDateTime;

/// Alias for a report ID.
pub type ReportId = i64;

/// A generated expense report.
///
/// The spreadsheet artifact lives in the upload directory; the row only
/// records where it is served from and when it was generated.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub id: ReportId,
    pub name: String,
    pub description: String,
    /// The URL path the spreadsheet is served at, e.g.
    /// "/uploads/reports/Expense_Report_123.xlsx".
    pub file_url: String,
    pub created_at: OffsetDateTime,
}
