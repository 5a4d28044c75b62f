//! ECharts chart generation for the dashboard.
//!
//! Each chart is serialized to an ECharts option JSON string and paired with
//! the HTML container it mounts into; initialization happens in a small
//! generated script in the page head.

use std::collections::HashMap;

use charming::{
    Chart,
    component::{Axis, Grid, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger,
    },
    series::Bar,
};
use maud::{Markup, PreEscaped, html};

use crate::{category::CategoryId, expense::Expense, html::HeadElement};

use super::aggregation::{category_totals, format_month_labels, monthly_totals};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    pub id: &'static str,
    /// The ECharts configuration as a JSON string.
    pub options: String,
}

/// Build the dashboard's charts from the expense records.
pub(super) fn build_charts(
    expenses: &[Expense],
    category_names: &HashMap<CategoryId, String>,
) -> [DashboardChart; 2] {
    [
        DashboardChart {
            id: "monthly-spending-chart",
            options: monthly_spending_chart(expenses).to_string(),
        },
        DashboardChart {
            id: "category-spending-chart",
            options: category_spending_chart(expenses, category_names).to_string(),
        },
    ]
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section id="charts" class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div id=(chart.id) class="min-h-[380px] rounded dark:bg-gray-100" {}
                }
            }
        }
    )
}

/// Generates the JavaScript that initializes the charts on page load.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});"
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

fn monthly_spending_chart(expenses: &[Expense]) -> Chart {
    let totals = monthly_totals(expenses);
    let months: Vec<_> = totals.iter().map(|(month, _)| *month).collect();
    let labels = format_month_labels(&months);
    let values: Vec<f64> = totals.iter().map(|(_, total)| *total).collect();

    Chart::new()
        .title(Title::new().text("Monthly Spending"))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Spending").data(values))
}

fn category_spending_chart(
    expenses: &[Expense],
    category_names: &HashMap<CategoryId, String>,
) -> Chart {
    let totals = category_totals(expenses, category_names);
    let labels: Vec<String> = totals.iter().map(|(name, _)| name.clone()).collect();
    let values: Vec<f64> = totals.iter().map(|(_, total)| *total).collect();

    Chart::new()
        .title(Title::new().text("Spending by Category"))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Spending").data(values))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
