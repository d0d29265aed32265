//! Spending reports: a pie chart for one month and a bar chart across a year.

mod chart;
mod pages;
mod pie;
mod spending;

pub use pages::{get_annual_spending_page, get_monthly_spending_page, get_reports_page};
pub use spending::{SpendingRow, get_spending_by_category};
