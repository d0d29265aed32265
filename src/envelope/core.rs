//! Envelope models and the database queries behind the budget.

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, Row, Transaction as SqlTransaction};
use rust_decimal::Decimal;

use crate::{
    Error,
    category::{CategoryId, CategoryTree, get_all_categories},
    database_id::DatabaseId,
    money::{decimal_to_sql, get_decimal},
    month::YearMonth,
    transaction::Direction,
};

/// Database identifier for an envelope.
pub type EnvelopeId = DatabaseId;

/// A budgeted amount for one category in one month.
///
/// Envelopes without a category hold general budget amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// `None` for placeholders that have not been saved yet.
    pub id: Option<EnvelopeId>,
    pub month: YearMonth,
    pub budgeted: Decimal,
    pub category_id: Option<CategoryId>,
}

impl Envelope {
    /// A zero budgeted envelope for a category that has no saved envelope in `month`.
    pub fn placeholder(month: YearMonth, category_id: Option<CategoryId>) -> Self {
        Self {
            id: None,
            month,
            budgeted: Decimal::ZERO,
            category_id,
        }
    }

    /// The ID key of a saved envelope, otherwise its month and category.
    pub fn key(&self) -> EnvelopeKey {
        match self.id {
            Some(id) => EnvelopeKey::Id(id),
            None => EnvelopeKey::Natural {
                month: self.month,
                category_id: self.category_id,
            },
        }
    }
}

/// Identifies an envelope either by ID or by its month and category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKey {
    Id(EnvelopeId),
    Natural {
        month: YearMonth,
        category_id: Option<CategoryId>,
    },
}

/// An envelope with the money spent from it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeActivity {
    pub envelope: Envelope,
    /// The display name of the envelope's category.
    pub category_label: String,
    /// The total of the outflows in the envelope's category and month.
    pub outflow: Decimal,
    /// Budgeted minus outflow, negative when overspent.
    pub balance: Decimal,
}

fn validate_amount(amount: Decimal) -> Result<(), Error> {
    if amount < Decimal::ZERO {
        return Err(Error::NegativeAmount);
    }

    Ok(())
}

/// Create an envelope.
///
/// # Errors
/// Returns [Error::DuplicateEnvelope] if the category already has an envelope
/// for `month`, or [Error::NegativeAmount] if `budgeted` is below zero.
pub fn create_envelope(
    month: YearMonth,
    budgeted: Decimal,
    category_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<Envelope, Error> {
    validate_amount(budgeted)?;

    // SQLite treats NULLs as distinct in unique constraints.
    if category_id.is_none() && get_envelope_by_key(month, None, connection)?.is_some() {
        return Err(Error::DuplicateEnvelope);
    }

    connection
        .prepare(
            "INSERT INTO envelope (month, budgeted, category_id) VALUES (?1, ?2, ?3)
             RETURNING id, month, budgeted, category_id",
        )?
        .query_row((month, decimal_to_sql(budgeted), category_id), map_row)
        .map_err(Error::from)
}

/// Create an envelope holding `amount` for every category in `month`.
///
/// Categories that already have an envelope for `month` keep their amount.
/// The envelopes are returned in category order.
pub fn create_envelopes_for_all_categories(
    month: YearMonth,
    amount: Decimal,
    connection: &Connection,
) -> Result<Vec<Envelope>, Error> {
    validate_amount(amount)?;

    let transaction = connection.unchecked_transaction()?;
    let categories = get_all_categories(&transaction)?;
    let amount_text = decimal_to_sql(amount);

    let mut envelopes = Vec::with_capacity(categories.len());

    for category in categories {
        transaction.execute(
            "INSERT INTO envelope (month, budgeted, category_id) VALUES (?1, ?2, ?3)
             ON CONFLICT(month, category_id) DO NOTHING",
            (month, &amount_text, category.id),
        )?;

        let envelope = get_envelope_by_key(month, Some(category.id), &transaction)?
            .ok_or(Error::NotFound)?;
        envelopes.push(envelope);
    }

    transaction.commit()?;

    Ok(envelopes)
}

/// Set the budgeted amount of an envelope and return the saved envelope.
///
/// A natural key with no saved envelope creates one.
///
/// # Errors
/// Returns [Error::UpdateMissingEnvelope] if an ID key does not refer to an envelope.
pub fn update_envelope_amount(
    key: EnvelopeKey,
    amount: Decimal,
    connection: &Connection,
) -> Result<Envelope, Error> {
    validate_amount(amount)?;

    match key {
        EnvelopeKey::Id(id) => {
            let rows_affected = connection.execute(
                "UPDATE envelope SET budgeted = ?1 WHERE id = ?2",
                (decimal_to_sql(amount), id),
            )?;

            if rows_affected == 0 {
                return Err(Error::UpdateMissingEnvelope);
            }

            get_envelope(id, connection)?.ok_or(Error::UpdateMissingEnvelope)
        }
        EnvelopeKey::Natural { month, category_id } => {
            let transaction = connection.unchecked_transaction()?;
            let envelope = upsert_envelope(month, category_id, amount, &transaction)?;
            transaction.commit()?;

            Ok(envelope)
        }
    }
}

fn upsert_envelope(
    month: YearMonth,
    category_id: Option<CategoryId>,
    amount: Decimal,
    transaction: &SqlTransaction,
) -> Result<Envelope, Error> {
    let rows_affected = transaction.execute(
        "UPDATE envelope SET budgeted = ?1 WHERE month = ?2 AND category_id IS ?3",
        (decimal_to_sql(amount), month, category_id),
    )?;

    if rows_affected == 0 {
        transaction.execute(
            "INSERT INTO envelope (month, budgeted, category_id) VALUES (?1, ?2, ?3)",
            (month, decimal_to_sql(amount), category_id),
        )?;
    }

    get_envelope_by_key(month, category_id, transaction)?.ok_or(Error::UpdateMissingEnvelope)
}

/// Get the envelope of every category for `month`, in category order.
///
/// Categories without a saved envelope get a zero budgeted placeholder, so
/// there is exactly one envelope per category.
pub fn get_envelopes_for_month(
    month: YearMonth,
    connection: &Connection,
) -> Result<Vec<Envelope>, Error> {
    let mut saved: HashMap<CategoryId, Envelope> = HashMap::new();
    let mut statement = connection.prepare(
        "SELECT id, month, budgeted, category_id FROM envelope
         WHERE month = ?1 AND category_id IS NOT NULL",
    )?;

    for envelope in statement.query_map([month], map_row)? {
        let envelope = envelope?;

        if let Some(category_id) = envelope.category_id {
            saved.insert(category_id, envelope);
        }
    }

    let envelopes = get_all_categories(connection)?
        .into_iter()
        .map(|category| {
            saved
                .remove(&category.id)
                .unwrap_or_else(|| Envelope::placeholder(month, Some(category.id)))
        })
        .collect();

    Ok(envelopes)
}

/// Retrieve an envelope by ID, `None` if it does not exist.
pub fn get_envelope(id: EnvelopeId, connection: &Connection) -> Result<Option<Envelope>, Error> {
    connection
        .prepare("SELECT id, month, budgeted, category_id FROM envelope WHERE id = ?1")?
        .query_row([id], map_row)
        .optional()
        .map_err(Error::from)
}

/// Retrieve the envelope for `category_id` in `month`, `None` if it does not exist.
pub fn get_envelope_by_key(
    month: YearMonth,
    category_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<Option<Envelope>, Error> {
    connection
        .prepare(
            "SELECT id, month, budgeted, category_id FROM envelope
             WHERE month = ?1 AND category_id IS ?2",
        )?
        .query_row((month, category_id), map_row)
        .optional()
        .map_err(Error::from)
}

/// Total the outflows posted in `month` by category.
///
/// Inflows are ignored. Uncategorized outflows are under the `None` key.
pub fn get_outflow_by_category(
    month: YearMonth,
    connection: &Connection,
) -> Result<HashMap<Option<CategoryId>, Decimal>, Error> {
    let mut statement = connection.prepare(
        "SELECT category_id, amount FROM financial_transaction
         WHERE direction = ?1 AND substr(posted_on, 1, 7) = ?2",
    )?;

    let rows = statement.query_map((Direction::Outflow, month), |row| {
        Ok((row.get::<_, Option<CategoryId>>(0)?, get_decimal(row, 1)?))
    })?;

    let mut outflows = HashMap::new();

    for row in rows {
        let (category_id, amount) = row?;
        *outflows.entry(category_id).or_insert(Decimal::ZERO) += amount;
    }

    Ok(outflows)
}

/// Every saved envelope with its outflow and balance, ordered by month then category name.
pub fn get_all_envelopes_with_outflow(
    connection: &Connection,
) -> Result<Vec<EnvelopeActivity>, Error> {
    let envelopes: Vec<Envelope> = connection
        .prepare("SELECT id, month, budgeted, category_id FROM envelope ORDER BY month, id")?
        .query_map([], map_row)?
        .collect::<Result<_, _>>()?;

    let tree = CategoryTree::new(get_all_categories(connection)?);
    let mut outflows_by_month: HashMap<YearMonth, HashMap<Option<CategoryId>, Decimal>> =
        HashMap::new();

    let mut rows = Vec::with_capacity(envelopes.len());

    for envelope in envelopes {
        if !outflows_by_month.contains_key(&envelope.month) {
            let outflows = get_outflow_by_category(envelope.month, connection)?;
            outflows_by_month.insert(envelope.month, outflows);
        }

        let outflow = outflows_by_month
            .get(&envelope.month)
            .and_then(|outflows| outflows.get(&envelope.category_id))
            .copied()
            .unwrap_or_default();

        rows.push(EnvelopeActivity {
            category_label: tree.label(envelope.category_id),
            balance: envelope.budgeted - outflow,
            outflow,
            envelope,
        });
    }

    rows.sort_by(|a, b| {
        a.envelope
            .month
            .cmp(&b.envelope.month)
            .then_with(|| a.category_label.cmp(&b.category_label))
    });

    Ok(rows)
}

/// Copy every envelope of `source` into `target`, replacing amounts already budgeted in `target`.
///
/// Returns the number of envelopes copied.
pub fn copy_envelopes(
    source: YearMonth,
    target: YearMonth,
    connection: &Connection,
) -> Result<usize, Error> {
    let transaction = connection.unchecked_transaction()?;

    let source_envelopes: Vec<Envelope> = transaction
        .prepare("SELECT id, month, budgeted, category_id FROM envelope WHERE month = ?1")?
        .query_map([source], map_row)?
        .collect::<Result<_, _>>()?;

    for envelope in &source_envelopes {
        upsert_envelope(target, envelope.category_id, envelope.budgeted, &transaction)?;
    }

    transaction.commit()?;

    Ok(source_envelopes.len())
}

/// Delete an envelope by ID.
///
/// # Errors
/// Returns [Error::DeleteMissingEnvelope] if `id` does not refer to an envelope.
pub fn delete_envelope(id: EnvelopeId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM envelope WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingEnvelope);
    }

    Ok(())
}

/// Initialize the envelope table.
pub fn create_envelope_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS envelope (
            id INTEGER PRIMARY KEY,
            month TEXT NOT NULL,
            budgeted TEXT NOT NULL,
            category_id INTEGER,
            UNIQUE(month, category_id),
            FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE CASCADE
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Envelope, rusqlite::Error> {
    Ok(Envelope {
        id: row.get(0)?,
        month: row.get(1)?,
        budgeted: get_decimal(row, 2)?,
        category_id: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        category::{Category, CategoryName, create_category, delete_category},
        db::initialize,
        envelope::{
            Envelope, EnvelopeKey, copy_envelopes, create_envelope,
            create_envelopes_for_all_categories, delete_envelope, get_all_envelopes_with_outflow,
            get_envelope, get_envelope_by_key, get_envelopes_for_month, get_outflow_by_category,
            update_envelope_amount,
        },
        month::YearMonth,
        transaction::{Direction, Transaction, create_transaction, test_utils::must_create_account},
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn month(text: &str) -> YearMonth {
        text.parse().unwrap()
    }

    fn must_create_category(name: &str, parent_id: Option<i64>, conn: &Connection) -> Category {
        create_category(CategoryName::new_unchecked(name), parent_id, conn).unwrap()
    }

    #[test]
    fn create_and_get_envelope() {
        let conn = get_test_connection();
        let category = must_create_category("Food", None, &conn);

        let envelope =
            create_envelope(month("2025-03"), dec!(250), Some(category.id), &conn).unwrap();

        assert!(envelope.id.is_some());
        assert_eq!(get_envelope(envelope.id.unwrap(), &conn), Ok(Some(envelope.clone())));
        assert_eq!(
            get_envelope_by_key(month("2025-03"), Some(category.id), &conn),
            Ok(Some(envelope))
        );
    }

    #[test]
    fn missing_envelope_is_none() {
        let conn = get_test_connection();

        assert_eq!(get_envelope(4, &conn), Ok(None));
        assert_eq!(get_envelope_by_key(month("2025-03"), Some(1), &conn), Ok(None));
    }

    #[test]
    fn duplicate_envelope_fails() {
        let conn = get_test_connection();
        let category = must_create_category("Food", None, &conn);
        create_envelope(month("2025-03"), dec!(1), Some(category.id), &conn).unwrap();

        let result = create_envelope(month("2025-03"), dec!(2), Some(category.id), &conn);

        assert_eq!(result, Err(Error::DuplicateEnvelope));
    }

    #[test]
    fn duplicate_general_envelope_fails() {
        let conn = get_test_connection();
        create_envelope(month("2025-03"), dec!(1), None, &conn).unwrap();

        let result = create_envelope(month("2025-03"), dec!(2), None, &conn);

        assert_eq!(result, Err(Error::DuplicateEnvelope));
    }

    #[test]
    fn negative_budget_fails() {
        let conn = get_test_connection();

        let result = create_envelope(month("2025-03"), dec!(-1), None, &conn);

        assert_eq!(result, Err(Error::NegativeAmount));
    }

    #[test]
    fn seeding_creates_one_envelope_per_category_in_order() {
        let conn = get_test_connection();
        let bills = must_create_category("Bills", None, &conn);
        let food = must_create_category("Food", None, &conn);
        let power = must_create_category("Power", Some(bills.id), &conn);

        let envelopes =
            create_envelopes_for_all_categories(month("2025-04"), dec!(50), &conn).unwrap();

        let category_ids: Vec<_> = envelopes.iter().map(|e| e.category_id).collect();
        assert_eq!(category_ids, [Some(bills.id), Some(power.id), Some(food.id)]);
        assert!(envelopes.iter().all(|e| e.budgeted == dec!(50) && e.id.is_some()));
    }

    #[test]
    fn seeding_keeps_existing_amounts() {
        let conn = get_test_connection();
        let food = must_create_category("Food", None, &conn);
        let fun = must_create_category("Fun", None, &conn);
        create_envelope(month("2025-04"), dec!(300), Some(food.id), &conn).unwrap();

        let envelopes =
            create_envelopes_for_all_categories(month("2025-04"), dec!(10), &conn).unwrap();

        assert_eq!(envelopes[0].category_id, Some(food.id));
        assert_eq!(envelopes[0].budgeted, dec!(300));
        assert_eq!(envelopes[1].category_id, Some(fun.id));
        assert_eq!(envelopes[1].budgeted, dec!(10));
    }

    #[test]
    fn natural_key_update_is_idempotent() {
        let conn = get_test_connection();
        let food = must_create_category("Food", None, &conn);
        let key = EnvelopeKey::Natural {
            month: month("2025-05"),
            category_id: Some(food.id),
        };

        let first = update_envelope_amount(key, dec!(120), &conn).unwrap();
        let second = update_envelope_amount(key, dec!(120), &conn).unwrap();

        assert_eq!(first, second);
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM envelope WHERE month = '2025-05' AND category_id = ?1",
                [food.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(second.budgeted, dec!(120));
    }

    #[test]
    fn natural_key_update_works_without_category() {
        let conn = get_test_connection();
        let key = EnvelopeKey::Natural {
            month: month("2025-05"),
            category_id: None,
        };

        update_envelope_amount(key, dec!(1), &conn).unwrap();
        let envelope = update_envelope_amount(key, dec!(2), &conn).unwrap();

        assert_eq!(
            get_envelope_by_key(month("2025-05"), None, &conn),
            Ok(Some(envelope))
        );
    }

    #[test]
    fn id_key_update_changes_amount() {
        let conn = get_test_connection();
        let envelope = create_envelope(month("2025-05"), dec!(1), None, &conn).unwrap();
        let id = envelope.id.unwrap();

        let updated = update_envelope_amount(EnvelopeKey::Id(id), dec!(9.5), &conn).unwrap();

        assert_eq!(updated.budgeted, dec!(9.5));
        assert_eq!(
            update_envelope_amount(EnvelopeKey::Id(id + 1), dec!(1), &conn),
            Err(Error::UpdateMissingEnvelope)
        );
    }

    #[test]
    fn saved_envelopes_are_keyed_by_id() {
        let conn = get_test_connection();
        let saved = create_envelope(month("2025-05"), dec!(1), None, &conn).unwrap();
        let placeholder = Envelope::placeholder(month("2025-05"), Some(3));

        assert_eq!(saved.key(), EnvelopeKey::Id(saved.id.unwrap()));
        assert_eq!(
            placeholder.key(),
            EnvelopeKey::Natural {
                month: month("2025-05"),
                category_id: Some(3),
            }
        );
    }

    #[test]
    fn month_has_one_envelope_per_category() {
        let conn = get_test_connection();
        let bills = must_create_category("Bills", None, &conn);
        let power = must_create_category("Power", Some(bills.id), &conn);
        let food = must_create_category("Food", None, &conn);
        let saved = create_envelope(month("2025-06"), dec!(80), Some(power.id), &conn).unwrap();
        create_envelope(month("2025-07"), dec!(99), Some(food.id), &conn).unwrap();

        let envelopes = get_envelopes_for_month(month("2025-06"), &conn).unwrap();

        assert_eq!(
            envelopes,
            [
                Envelope::placeholder(month("2025-06"), Some(bills.id)),
                saved,
                Envelope::placeholder(month("2025-06"), Some(food.id)),
            ]
        );
    }

    #[test]
    fn outflow_counts_only_outflows_in_month() {
        let conn = get_test_connection();
        let account_id = must_create_account("Everyday", &conn);
        let food = must_create_category("Food", None, &conn);
        for (amount, direction, date, category_id) in [
            (dec!(10.10), Direction::Outflow, date!(2025 - 03 - 01), Some(food.id)),
            (dec!(4.90), Direction::Outflow, date!(2025 - 03 - 31), Some(food.id)),
            (dec!(100), Direction::Inflow, date!(2025 - 03 - 15), Some(food.id)),
            (dec!(7), Direction::Outflow, date!(2025 - 04 - 01), Some(food.id)),
            (dec!(3), Direction::Outflow, date!(2025 - 03 - 02), None),
        ] {
            create_transaction(
                Transaction::build(amount, direction, date, "Shop", account_id)
                    .category_id(category_id),
                &conn,
            )
            .unwrap();
        }

        let outflows = get_outflow_by_category(month("2025-03"), &conn).unwrap();

        assert_eq!(outflows.get(&Some(food.id)), Some(&dec!(15)));
        assert_eq!(outflows.get(&None), Some(&dec!(3)));
    }

    #[test]
    fn envelopes_with_outflow_have_balance() {
        let conn = get_test_connection();
        let account_id = must_create_account("Everyday", &conn);
        let food = must_create_category("Food", None, &conn);
        let bills = must_create_category("Bills", None, &conn);
        create_envelope(month("2025-03"), dec!(100), Some(food.id), &conn).unwrap();
        create_envelope(month("2025-03"), dec!(50), Some(bills.id), &conn).unwrap();
        create_envelope(month("2025-02"), dec!(20), Some(food.id), &conn).unwrap();
        create_transaction(
            Transaction::build(
                dec!(120),
                Direction::Outflow,
                date!(2025 - 03 - 09),
                "Market",
                account_id,
            )
            .category_id(Some(food.id)),
            &conn,
        )
        .unwrap();

        let rows = get_all_envelopes_with_outflow(&conn).unwrap();

        let got: Vec<_> = rows
            .iter()
            .map(|row| {
                (
                    row.envelope.month.to_string(),
                    row.category_label.as_str(),
                    row.outflow,
                    row.balance,
                )
            })
            .collect();
        assert_eq!(
            got,
            [
                ("2025-02".to_owned(), "Food", dec!(0), dec!(20)),
                ("2025-03".to_owned(), "Bills", dec!(0), dec!(50)),
                ("2025-03".to_owned(), "Food", dec!(120), dec!(-20)),
            ]
        );
    }

    #[test]
    fn copy_overwrites_target_month() {
        let conn = get_test_connection();
        let food = must_create_category("Food", None, &conn);
        let fun = must_create_category("Fun", None, &conn);
        create_envelope(month("2025-03"), dec!(100), Some(food.id), &conn).unwrap();
        create_envelope(month("2025-03"), dec!(40), Some(fun.id), &conn).unwrap();
        create_envelope(month("2025-04"), dec!(1), Some(food.id), &conn).unwrap();

        let copied = copy_envelopes(month("2025-03"), month("2025-04"), &conn).unwrap();

        assert_eq!(copied, 2);
        let april = get_envelopes_for_month(month("2025-04"), &conn).unwrap();
        let amounts: Vec<_> = april.iter().map(|e| e.budgeted).collect();
        assert_eq!(amounts, [dec!(100), dec!(40)]);
    }

    #[test]
    fn delete_envelope_removes_row() {
        let conn = get_test_connection();
        let envelope = create_envelope(month("2025-03"), dec!(1), None, &conn).unwrap();
        let id = envelope.id.unwrap();

        delete_envelope(id, &conn).unwrap();

        assert_eq!(get_envelope(id, &conn), Ok(None));
        assert_eq!(delete_envelope(id, &conn), Err(Error::DeleteMissingEnvelope));
    }

    #[test]
    fn deleting_category_deletes_its_envelopes() {
        let conn = get_test_connection();
        let food = must_create_category("Food", None, &conn);
        let envelope =
            create_envelope(month("2025-03"), dec!(1), Some(food.id), &conn).unwrap();

        delete_category(food.id, &conn).unwrap();

        assert_eq!(get_envelope(envelope.id.unwrap(), &conn), Ok(None));
    }
}
