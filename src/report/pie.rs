//! Slices for the monthly spending pie chart.
//!
//! The chart is drawn as one SVG circle per slice. Each circle's stroke is
//! dashed so that only the slice's share of the circumference is painted,
//! then rotated to the slice's start angle.

use maud::{Markup, html};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{html::format_currency, report::SpendingRow};

/// The colors given to slices in order, repeating after the last.
pub const PALETTE: [&str; 10] = [
    "#001219", "#005F73", "#0A9396", "#94D2BD", "#E9D8A6", "#EE9B00", "#CA6702", "#BB3E03",
    "#AE2012", "#9B2226",
];

/// The circumference of the circle the slices are drawn on.
pub const PIE_CIRCUMFERENCE: i64 = 158;

/// The label of the slice holding what the other slices leave over.
pub const OTHER_LABEL: &str = "Other";

const PIE_RADIUS: &str = "25.15";

/// One slice of the pie chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub amount: Decimal,
    /// Whole percent of the total, truncated.
    pub percent: i64,
    /// The painted length of the circle's stroke.
    pub sweep: i64,
    /// Whole degrees clockwise from the top, truncated.
    pub start_angle: i64,
    pub color: &'static str,
}

fn truncate(value: Decimal) -> i64 {
    value.trunc().to_i64().unwrap_or_default()
}

fn round(value: Decimal) -> i64 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or_default()
}

/// Work out the slices for `rows`.
///
/// Rows under one percent of the total get no slice of their own. If the
/// slices leave more than one degree of the circle uncovered, an "Other"
/// slice fills the gap. A zero total gives no slices.
pub fn pie_slices(rows: &[SpendingRow]) -> Vec<PieSlice> {
    let total: Decimal = rows.iter().map(|row| row.amount).sum();

    if total <= Decimal::ZERO {
        return Vec::new();
    }

    let full_turn = Decimal::from(360);
    let mut offset = Decimal::ZERO;
    let mut slices = Vec::new();

    for row in rows {
        let fraction = row.amount / total;
        let percent = truncate(fraction * Decimal::ONE_HUNDRED);

        if percent <= 0 {
            continue;
        }

        slices.push(PieSlice {
            label: row.category_label.clone(),
            amount: row.amount,
            percent,
            sweep: round(fraction * Decimal::from(PIE_CIRCUMFERENCE)),
            start_angle: truncate(offset),
            color: PALETTE[slices.len() % PALETTE.len()],
        });

        offset += fraction * full_turn;
    }

    let remaining = full_turn - offset;

    if remaining > Decimal::ONE {
        let fraction = remaining / full_turn;

        slices.push(PieSlice {
            label: OTHER_LABEL.to_owned(),
            amount: total * fraction,
            percent: truncate(fraction * Decimal::ONE_HUNDRED),
            sweep: round(fraction * Decimal::from(PIE_CIRCUMFERENCE)),
            start_angle: truncate(offset),
            color: PALETTE[PALETTE.len() - 1],
        });
    }

    slices
}

/// Draw the slices as an SVG pie chart with a legend.
pub fn pie_chart_view(slices: &[PieSlice]) -> Markup {
    html! {
        div class="flex flex-col md:flex-row items-center gap-6"
        {
            svg
                viewBox="0 0 64 64"
                class="w-64 h-64"
                role="img"
                aria-label="Spending by category"
            {
                @for slice in slices {
                    circle
                        cx="32"
                        cy="32"
                        r=(PIE_RADIUS)
                        fill="none"
                        stroke=(slice.color)
                        stroke-width="12"
                        stroke-dasharray={ (slice.sweep) " " (PIE_CIRCUMFERENCE) }
                        transform={ "rotate(" (slice.start_angle - 90) " 32 32)" }
                    {
                        title { (slice.label) ": " (slice.percent) "%" }
                    }
                }
            }

            ul class="space-y-1 text-sm"
            {
                @for slice in slices {
                    li class="flex items-center gap-2" data-percent=(slice.percent)
                    {
                        span class="inline-block w-3 h-3 rounded-sm" style={ "background-color: " (slice.color) } {}
                        span { (slice.label) }
                        span class="text-gray-500 dark:text-gray-400"
                        {
                            (slice.percent) "% (" (format_currency(slice.amount)) ")"
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::{
        month::YearMonth,
        report::{
            SpendingRow,
            pie::{OTHER_LABEL, PALETTE, pie_slices},
        },
    };

    fn rows(amounts: &[Decimal]) -> Vec<SpendingRow> {
        amounts
            .iter()
            .enumerate()
            .map(|(index, amount)| SpendingRow {
                month: YearMonth::new(2025, 1).unwrap(),
                category_id: Some(index as i64 + 1),
                category_label: format!("Category {index}"),
                amount: *amount,
            })
            .collect()
    }

    #[test]
    fn halves_and_fifths_have_cumulative_angles() {
        let slices = pie_slices(&rows(&[dec!(50), dec!(30), dec!(20)]));

        let percents: Vec<_> = slices.iter().map(|slice| slice.percent).collect();
        let angles: Vec<_> = slices.iter().map(|slice| slice.start_angle).collect();
        let sweeps: Vec<_> = slices.iter().map(|slice| slice.sweep).collect();
        assert_eq!(percents, [50, 30, 20]);
        assert_eq!(angles, [0, 180, 288]);
        assert_eq!(sweeps, [79, 47, 32]);
        assert!(slices.iter().all(|slice| slice.label != OTHER_LABEL));
        assert_eq!(slices[0].color, PALETTE[0]);
        assert_eq!(slices[2].color, PALETTE[2]);
    }

    #[test]
    fn tiny_rows_are_folded_into_other() {
        let slices = pie_slices(&rows(&[dec!(90), dec!(5), dec!(2.5), dec!(0.5), dec!(2)]));

        let labels: Vec<_> = slices.iter().map(|slice| slice.label.as_str()).collect();
        assert_eq!(
            labels,
            ["Category 0", "Category 1", "Category 2", "Category 4", OTHER_LABEL]
        );
        let other = slices.last().unwrap();
        assert_eq!(other.start_angle, 358);
        assert_eq!(other.color, PALETTE[9]);
    }

    #[test]
    fn skipped_rows_do_not_use_up_colors() {
        let slices = pie_slices(&rows(&[dec!(90), dec!(0.5), dec!(9.5)]));

        let labels: Vec<_> = slices.iter().map(|slice| slice.label.as_str()).collect();
        let colors: Vec<_> = slices.iter().map(|slice| slice.color).collect();
        assert_eq!(labels, ["Category 0", "Category 2", OTHER_LABEL]);
        assert_eq!(colors, [PALETTE[0], PALETTE[1], PALETTE[9]]);
    }

    #[test]
    fn zero_total_has_no_slices() {
        assert!(pie_slices(&rows(&[dec!(0), dec!(0)])).is_empty());
        assert!(pie_slices(&[]).is_empty());
    }

    #[test]
    fn colors_repeat_after_palette() {
        let amounts = vec![dec!(1); 11];

        let slices = pie_slices(&rows(&amounts));

        assert_eq!(slices[10].color, PALETTE[0]);
    }
}
