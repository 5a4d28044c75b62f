//! Pure aggregation of expense records into the figures a report shows.
//!
//! Nothing in this module touches the database or the filesystem: callers
//! pass in the records and the name lookup tables, and serializing the
//! resulting [ReportBundle] into a spreadsheet is [super::workbook]'s job.

use std::collections::HashMap;

use time::{Date, Month};

use crate::{
    Error,
    category::CategoryId,
    expense::{Expense, FilterSpec},
    expense_type::ExpenseTypeId,
};

/// The name used when an expense references a category or type that no
/// longer exists.
const UNKNOWN_NAME: &str = "Unknown";

/// How many vendors the top-vendors ranking keeps.
const TOP_VENDOR_LIMIT: usize = 10;

/// One denormalized line of the detailed listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub date: Date,
    pub description: String,
    pub category: String,
    pub expense_type: String,
    pub payment_method: String,
    pub vendor: String,
    pub location: String,
    pub amount: f64,
}

/// A label and the total amount attributed to it.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalByLabel {
    pub label: String,
    pub total: f64,
}

/// Aggregate statistics over the matched records.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub total: f64,
    pub count: usize,
    pub mean: f64,
}

/// Everything a report spreadsheet contains, one field per sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBundle {
    pub lines: Vec<ReportLine>,
    /// Totals by category, in the order categories first appear.
    pub by_category: Vec<TotalByLabel>,
    /// Totals by calendar month, chronological, labelled "May 2024".
    pub by_month: Vec<TotalByLabel>,
    /// Totals by payment method, in the order methods first appear.
    pub by_payment_method: Vec<TotalByLabel>,
    /// The ten biggest vendors by total, descending; ties keep
    /// first-encounter order. Records without a vendor are left out.
    pub top_vendors: Vec<TotalByLabel>,
    pub summary: SummaryStats,
}

/// Aggregate `records` matching `filter` into a [ReportBundle].
///
/// # Errors
/// This function will return an [Error::NoMatchingExpenses] if the filter
/// matches no records, which blocks the export: an empty spreadsheet is
/// never generated.
pub fn aggregate(
    records: &[Expense],
    filter: &FilterSpec,
    category_names: &HashMap<CategoryId, String>,
    type_names: &HashMap<ExpenseTypeId, String>,
) -> Result<ReportBundle, Error> {
    let matched: Vec<&Expense> = records
        .iter()
        .filter(|expense| filter.includes(expense))
        .collect();

    if matched.is_empty() {
        return Err(Error::NoMatchingExpenses);
    }

    let lines = matched
        .iter()
        .map(|expense| ReportLine {
            date: expense.date,
            description: expense.description.clone(),
            category: lookup_name(category_names, expense.category_id),
            expense_type: lookup_name(type_names, expense.expense_type_id),
            payment_method: expense.payment_method.to_string(),
            vendor: expense.vendor.clone(),
            location: expense.location.clone(),
            amount: expense.amount,
        })
        .collect::<Vec<_>>();

    let by_category = sum_by_label(
        lines
            .iter()
            .map(|line| (line.category.clone(), line.amount)),
    );

    let by_month = sum_by_month(&matched);

    let by_payment_method = sum_by_label(
        lines
            .iter()
            .map(|line| (line.payment_method.clone(), line.amount)),
    );

    let top_vendors = rank_vendors(&lines);

    let total: f64 = matched.iter().map(|expense| expense.amount).sum();
    let count = matched.len();
    let summary = SummaryStats {
        total,
        count,
        mean: total / count as f64,
    };

    Ok(ReportBundle {
        lines,
        by_category,
        by_month,
        by_payment_method,
        top_vendors,
        summary,
    })
}

fn lookup_name<K: std::hash::Hash + Eq>(names: &HashMap<K, String>, id: K) -> String {
    names
        .get(&id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_NAME.to_owned())
}

/// Sum amounts per label, keeping the order labels first appear in.
fn sum_by_label(pairs: impl Iterator<Item = (String, f64)>) -> Vec<TotalByLabel> {
    let mut totals: Vec<TotalByLabel> = Vec::new();
    let mut index_by_label: HashMap<String, usize> = HashMap::new();

    for (label, amount) in pairs {
        match index_by_label.get(&label) {
            Some(&index) => totals[index].total += amount,
            None => {
                index_by_label.insert(label.clone(), totals.len());
                totals.push(TotalByLabel {
                    label,
                    total: amount,
                });
            }
        }
    }

    totals
}

fn sum_by_month(matched: &[&Expense]) -> Vec<TotalByLabel> {
    let mut totals: std::collections::BTreeMap<(i32, u8), f64> = std::collections::BTreeMap::new();

    for expense in matched {
        let key = (expense.date.year(), expense.date.month() as u8);
        *totals.entry(key).or_insert(0.0) += expense.amount;
    }

    totals
        .into_iter()
        .map(|((year, month), total)| {
            // The key came from a valid Date, so the month number is 1-12.
            let label = match Month::try_from(month) {
                Ok(month_name) => format!("{month_name} {year}"),
                Err(_) => format!("Month {month} {year}"),
            };

            TotalByLabel { label, total }
        })
        .collect()
}

fn rank_vendors(lines: &[ReportLine]) -> Vec<TotalByLabel> {
    let mut totals = sum_by_label(
        lines
            .iter()
            .filter(|line| !line.vendor.trim().is_empty())
            .map(|line| (line.vendor.clone(), line.amount)),
    );

    // Stable sort keeps first-encounter order across tied totals.
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals.truncate(TOP_VENDOR_LIMIT);

    totals
}

#[cfg(test)]
mod aggregation_tests {
    use std::collections::HashMap;

    use time::macros::date;

    use crate::{
        Error,
        expense::{Expense, FilterSpec, PaymentMethod},
    };

    use super::aggregate;

    fn make_expense(
        id: i64,
        description: &str,
        amount: f64,
        date: time::Date,
        vendor: &str,
    ) -> Expense {
        Expense {
            id,
            description: description.to_string(),
            amount,
            date,
            category_id: 1,
            expense_type_id: 1,
            payment_method: PaymentMethod::Cash,
            vendor: vendor.to_string(),
            location: String::new(),
            receipt_url: None,
        }
    }

    fn names(pairs: &[(i64, &str)]) -> HashMap<i64, String> {
        pairs
            .iter()
            .map(|(id, name)| (*id, (*name).to_string()))
            .collect()
    }

    #[test]
    fn zero_matching_records_blocks_export() {
        let records = [make_expense(1, "Shop", 10.0, date!(2024 - 05 - 01), "")];
        let filter = FilterSpec {
            min_amount: Some(100.0),
            ..Default::default()
        };

        let result = aggregate(&records, &filter, &HashMap::new(), &HashMap::new());

        assert_eq!(result, Err(Error::NoMatchingExpenses));
    }

    #[test]
    fn top_vendors_rank_by_total_descending() {
        let records = [
            make_expense(1, "First", 100.0, date!(2024 - 05 - 01), "Acme"),
            make_expense(2, "Small", 50.0, date!(2024 - 05 - 02), "Beta"),
            make_expense(3, "Second", 200.0, date!(2024 - 05 - 03), "Acme"),
        ];

        let bundle = aggregate(
            &records,
            &FilterSpec::default(),
            &names(&[(1, "Groceries")]),
            &names(&[(1, "Food")]),
        )
        .unwrap();

        assert_eq!(bundle.top_vendors.len(), 2);
        assert_eq!(bundle.top_vendors[0].label, "Acme");
        assert_eq!(bundle.top_vendors[0].total, 300.0);
        assert_eq!(bundle.top_vendors[1].label, "Beta");
        assert_eq!(bundle.top_vendors[1].total, 50.0);
    }

    #[test]
    fn tied_vendors_keep_first_encounter_order() {
        let records = [
            make_expense(1, "a", 50.0, date!(2024 - 05 - 01), "Zeta"),
            make_expense(2, "b", 50.0, date!(2024 - 05 - 02), "Alpha"),
        ];

        let bundle = aggregate(
            &records,
            &FilterSpec::default(),
            &HashMap::new(),
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(bundle.top_vendors[0].label, "Zeta");
        assert_eq!(bundle.top_vendors[1].label, "Alpha");
    }

    #[test]
    fn categories_keep_first_encounter_order() {
        let mut records = vec![
            make_expense(1, "a", 10.0, date!(2024 - 05 - 01), ""),
            make_expense(2, "b", 20.0, date!(2024 - 05 - 02), ""),
            make_expense(3, "c", 5.0, date!(2024 - 05 - 03), ""),
        ];
        records[1].category_id = 2;
        records[2].category_id = 1;

        let bundle = aggregate(
            &records,
            &FilterSpec::default(),
            &names(&[(1, "Travel"), (2, "Groceries")]),
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(bundle.by_category.len(), 2);
        assert_eq!(bundle.by_category[0].label, "Travel");
        assert_eq!(bundle.by_category[0].total, 15.0);
        assert_eq!(bundle.by_category[1].label, "Groceries");
        assert_eq!(bundle.by_category[1].total, 20.0);
    }

    #[test]
    fn months_are_chronological_with_full_names() {
        let records = [
            make_expense(1, "a", 10.0, date!(2024 - 06 - 15), ""),
            make_expense(2, "b", 20.0, date!(2024 - 05 - 01), ""),
            make_expense(3, "c", 30.0, date!(2023 - 12 - 31), ""),
            make_expense(4, "d", 40.0, date!(2024 - 05 - 20), ""),
        ];

        let bundle = aggregate(
            &records,
            &FilterSpec::default(),
            &HashMap::new(),
            &HashMap::new(),
        )
        .unwrap();

        let labels: Vec<&str> = bundle
            .by_month
            .iter()
            .map(|entry| entry.label.as_str())
            .collect();
        assert_eq!(labels, ["December 2023", "May 2024", "June 2024"]);
        assert_eq!(bundle.by_month[1].total, 60.0);
    }

    #[test]
    fn unresolved_ids_fall_back_to_unknown() {
        let records = [make_expense(1, "Shop", 10.0, date!(2024 - 05 - 01), "")];

        let bundle = aggregate(
            &records,
            &FilterSpec::default(),
            &HashMap::new(),
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(bundle.lines[0].category, "Unknown");
        assert_eq!(bundle.lines[0].expense_type, "Unknown");
        assert_eq!(bundle.by_category[0].label, "Unknown");
    }

    #[test]
    fn summary_stats_cover_matched_records() {
        let records = [
            make_expense(1, "a", 10.0, date!(2024 - 05 - 01), ""),
            make_expense(2, "b", 20.0, date!(2024 - 05 - 02), ""),
            make_expense(3, "c", 60.0, date!(2024 - 05 - 03), ""),
        ];

        let bundle = aggregate(
            &records,
            &FilterSpec::default(),
            &HashMap::new(),
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(bundle.summary.total, 90.0);
        assert_eq!(bundle.summary.count, 3);
        assert_eq!(bundle.summary.mean, 30.0);
    }

    #[test]
    fn filter_restricts_every_sheet() {
        let records = [
            make_expense(1, "Cheap", 5.0, date!(2024 - 05 - 01), "Acme"),
            make_expense(2, "Pricey", 500.0, date!(2024 - 05 - 02), "Beta"),
        ];
        let filter = FilterSpec {
            min_amount: Some(100.0),
            ..Default::default()
        };

        let bundle = aggregate(&records, &filter, &HashMap::new(), &HashMap::new()).unwrap();

        assert_eq!(bundle.lines.len(), 1);
        assert_eq!(bundle.lines[0].description, "Pricey");
        assert_eq!(bundle.top_vendors.len(), 1);
        assert_eq!(bundle.summary.count, 1);
    }
}
