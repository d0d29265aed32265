//! The monthly budget: every category with its envelope, outflow and balance.

mod budget_page;
mod core;

pub use budget_page::get_budget_page;
pub use core::{BudgetRow, MonthSummary, build_budget, get_income};
