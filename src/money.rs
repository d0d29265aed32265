//! Reading and writing money amounts.
//!
//! Amounts are stored as decimal TEXT so that sums are exact. Stored text
//! that is not a number is an error, never a silent zero.

use std::str::FromStr;

use rusqlite::{Row, types::Type};
use rust_decimal::Decimal;

/// Read the decimal stored as text in column `index`.
///
/// # Errors
/// Returns [rusqlite::Error::FromSqlConversionFailure] if the text is not a decimal number.
pub fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let text: String = row.get(index)?;

    Decimal::from_str(text.trim()).map_err(|error| {
        tracing::error!("could not parse {text:?} in column {index} as a decimal: {error}");
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}

/// The text form used to store `amount`.
pub fn decimal_to_sql(amount: Decimal) -> String {
    amount.normalize().to_string()
}
