//! Getting transactions into the database in bulk: bank statement uploads
//! and raw CSV table loads.

mod bulk;
mod statement;
mod upload;

pub use bulk::bulk_import_csv;
pub use upload::{get_import_page, import_statement_endpoint};
