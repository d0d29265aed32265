//! Loads rows into a table straight from a CSV file.

use std::io::Read;

use rusqlite::{Connection, params_from_iter};

use crate::{Error, db::TABLE_NAMES};

/// The column names of `table`, read from `PRAGMA table_info`.
fn table_columns(table: &str, connection: &Connection) -> Result<Vec<String>, Error> {
    connection
        .prepare(&format!("PRAGMA table_info({table})"))?
        .query_map([], |row| row.get::<_, String>(1))?
        .map(|column| column.map_err(Error::from))
        .collect()
}

/// Insert every line of `reader` into `table` and return the number of rows inserted.
///
/// The first line names the columns. Each later line is split on commas and
/// its fields are inserted as-is, so quoted fields are not supported. All rows
/// are inserted in one SQL transaction, so an error leaves the table unchanged.
///
/// # Errors
/// This function will return a:
/// - [Error::UnknownTable] if `table` is not one of the application's tables,
/// - [Error::UnknownColumn] if a header is not a column of `table`,
/// - [Error::InvalidCSV] if the CSV cannot be read or a line has the wrong number of fields,
/// - or [Error::SqlError] (or a more specific SQL error) if a row cannot be inserted.
pub fn bulk_import_csv<R: Read>(
    table: &str,
    reader: R,
    connection: &Connection,
) -> Result<usize, Error> {
    if !TABLE_NAMES.contains(&table) {
        return Err(Error::UnknownTable(table.to_owned()));
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|error| Error::InvalidCSV(error.to_string()))?
        .iter()
        .map(|header| header.trim().to_owned())
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(Error::InvalidCSV("the header row is empty".to_owned()));
    }

    let columns = table_columns(table, connection)?;

    if let Some(column) = headers.iter().find(|header| !columns.contains(header)) {
        return Err(Error::UnknownColumn {
            table: table.to_owned(),
            column: column.clone(),
        });
    }

    let placeholders = (1..=headers.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let insert_sql = format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders})",
        headers.join(", ")
    );

    let sql_transaction = connection.unchecked_transaction()?;
    let mut row_count = 0;

    {
        let mut statement = sql_transaction.prepare(&insert_sql)?;

        for record in csv_reader.records() {
            let record = record.map_err(|error| Error::InvalidCSV(error.to_string()))?;

            if record.len() != headers.len() {
                let line = record
                    .position()
                    .map(|position| position.line())
                    .unwrap_or_default();

                return Err(Error::InvalidCSV(format!(
                    "line {line} has {} fields but the header has {}",
                    record.len(),
                    headers.len()
                )));
            }

            statement.execute(params_from_iter(record.iter()))?;
            row_count += 1;
        }
    }

    sql_transaction.commit()?;

    tracing::debug!("inserted {row_count} rows into {table}");

    Ok(row_count)
}
