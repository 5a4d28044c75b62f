//! Serialization of a [ReportBundle] into a multi-sheet xlsx workbook.

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::Error;

use super::aggregation::{ReportBundle, TotalByLabel};

/// Serialize `bundle` into xlsx bytes, one sheet per aggregate.
///
/// # Errors
/// This function will return an [Error::WorkbookError] if the spreadsheet
/// library rejects the data.
pub fn build_workbook(bundle: &ReportBundle) -> Result<Vec<u8>, Error> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    write_detail_sheet(workbook.add_worksheet(), bundle, &header_format)?;

    write_totals_sheet(
        workbook.add_worksheet(),
        "Category Summary",
        "Category",
        &bundle.by_category,
        &header_format,
    )?;
    write_totals_sheet(
        workbook.add_worksheet(),
        "Time Analysis",
        "Month",
        &bundle.by_month,
        &header_format,
    )?;
    write_totals_sheet(
        workbook.add_worksheet(),
        "Payment Method",
        "Payment Method",
        &bundle.by_payment_method,
        &header_format,
    )?;
    write_totals_sheet(
        workbook.add_worksheet(),
        "Top Vendors",
        "Vendor",
        &bundle.top_vendors,
        &header_format,
    )?;

    write_summary_sheet(workbook.add_worksheet(), bundle, &header_format)?;

    workbook.save_to_buffer().map_err(|error| error.into())
}

fn write_detail_sheet(
    worksheet: &mut Worksheet,
    bundle: &ReportBundle,
    header_format: &Format,
) -> Result<(), Error> {
    worksheet.set_name("Detailed Expenses")?;

    let headers = [
        "Date",
        "Description",
        "Category",
        "Type",
        "Payment Method",
        "Vendor",
        "Location",
        "Amount",
    ];
    for (column, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, column as u16, *header, header_format)?;
    }

    for (index, line) in bundle.lines.iter().enumerate() {
        let row = (index + 1) as u32;
        worksheet.write_string(row, 0, line.date.to_string())?;
        worksheet.write_string(row, 1, &line.description)?;
        worksheet.write_string(row, 2, &line.category)?;
        worksheet.write_string(row, 3, &line.expense_type)?;
        worksheet.write_string(row, 4, &line.payment_method)?;
        worksheet.write_string(row, 5, &line.vendor)?;
        worksheet.write_string(row, 6, &line.location)?;
        worksheet.write_number(row, 7, line.amount)?;
    }

    Ok(())
}

fn write_totals_sheet(
    worksheet: &mut Worksheet,
    sheet_name: &str,
    label_header: &str,
    totals: &[TotalByLabel],
    header_format: &Format,
) -> Result<(), Error> {
    worksheet.set_name(sheet_name)?;

    worksheet.write_string_with_format(0, 0, label_header, header_format)?;
    worksheet.write_string_with_format(0, 1, "Total", header_format)?;

    for (index, entry) in totals.iter().enumerate() {
        let row = (index + 1) as u32;
        worksheet.write_string(row, 0, &entry.label)?;
        worksheet.write_number(row, 1, entry.total)?;
    }

    Ok(())
}

fn write_summary_sheet(
    worksheet: &mut Worksheet,
    bundle: &ReportBundle,
    header_format: &Format,
) -> Result<(), Error> {
    worksheet.set_name("Summary Stats")?;

    worksheet.write_string_with_format(0, 0, "Statistic", header_format)?;
    worksheet.write_string_with_format(0, 1, "Value", header_format)?;

    worksheet.write_string(1, 0, "Total")?;
    worksheet.write_number(1, 1, bundle.summary.total)?;
    worksheet.write_string(2, 0, "Count")?;
    worksheet.write_number(2, 1, bundle.summary.count as f64)?;
    worksheet.write_string(3, 0, "Average")?;
    worksheet.write_number(3, 1, bundle.summary.mean)?;

    Ok(())
}

#[cfg(test)]
mod workbook_tests {
    use super::build_workbook;
    use crate::report::aggregation::{ReportBundle, ReportLine, SummaryStats, TotalByLabel};
    use time::macros::date;

    fn make_bundle() -> ReportBundle {
        ReportBundle {
            lines: vec![ReportLine {
                date: date!(2024 - 05 - 01),
                description: "Weekly shop".to_string(),
                category: "Groceries".to_string(),
                expense_type: "Food".to_string(),
                payment_method: "Cash".to_string(),
                vendor: "Countdown".to_string(),
                location: "Auckland".to_string(),
                amount: 42.50,
            }],
            by_category: vec![TotalByLabel {
                label: "Groceries".to_string(),
                total: 42.50,
            }],
            by_month: vec![TotalByLabel {
                label: "May 2024".to_string(),
                total: 42.50,
            }],
            by_payment_method: vec![TotalByLabel {
                label: "Cash".to_string(),
                total: 42.50,
            }],
            top_vendors: vec![TotalByLabel {
                label: "Countdown".to_string(),
                total: 42.50,
            }],
            summary: SummaryStats {
                total: 42.50,
                count: 1,
                mean: 42.50,
            },
        }
    }

    #[test]
    fn build_workbook_produces_xlsx_bytes() {
        let bytes = build_workbook(&make_bundle()).expect("Could not build workbook");

        // xlsx files are zip archives, which start with the PK magic bytes.
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }
}
