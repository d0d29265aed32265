//! The annual spending chart, rendered by ECharts from a charming configuration.

use std::collections::BTreeSet;

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, JsFunction,
        Tooltip, Trigger,
    },
    series::bar,
};
use maud::{Markup, PreEscaped, html};
use rust_decimal::prelude::ToPrimitive;

use crate::{html::HeadElement, month::YearMonth, report::SpendingRow};

/// The URL of the ECharts library used to draw charts.
pub const ECHARTS_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

const CHART_ID: &str = "annual-spending-chart";

/// A stacked bar chart of spending with one bar per month and one series per category.
pub fn annual_spending_chart(rows: &[SpendingRow]) -> Chart {
    let months: Vec<YearMonth> = rows
        .iter()
        .map(|row| row.month)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let categories: BTreeSet<&str> = rows.iter().map(|row| row.category_label.as_str()).collect();
    let labels: Vec<String> = months.iter().map(YearMonth::label).collect();

    let mut chart = Chart::new()
        .title(Title::new().text("Spending").subtext("By category and month"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(currency_formatter())
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .legend(Legend::new().top("bottom"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom(60)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        );

    for category in categories {
        let data: Vec<f64> = months
            .iter()
            .map(|month| {
                rows.iter()
                    .filter(|row| row.month == *month && row.category_label == category)
                    .map(|row| row.amount.to_f64().unwrap_or_default())
                    .sum()
            })
            .collect();

        chart = chart.series(
            bar::Bar::new()
                .name(category)
                .stack("Spending")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(data),
        );
    }

    chart
}

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

/// The element the chart is drawn into.
pub fn chart_container_view() -> Markup {
    html! {
        div id=(CHART_ID) class="min-h-[380px] w-full rounded dark:bg-gray-100" {}
    }
}

/// The script that draws `chart` once the page has loaded.
pub fn chart_script(chart: &Chart) -> HeadElement {
    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
            const chart = echarts.init(document.getElementById("{CHART_ID}"));
            chart.setOption({chart});
            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
            }};
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }});"#
    );

    HeadElement::ScriptSource(PreEscaped(script))
}
