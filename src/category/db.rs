//! Database operations for categories.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName},
};

/// Create a category and return it with its generated ID.
///
/// # Errors
/// Returns [Error::InvalidParentCategory] if `parent_id` does not refer to a
/// root category.
pub fn create_category(
    name: CategoryName,
    parent_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<Category, Error> {
    if let Some(parent_id) = parent_id {
        match get_category(parent_id, connection)? {
            Some(parent) if parent.is_root() => {}
            _ => return Err(Error::InvalidParentCategory(parent_id)),
        }
    }

    connection.execute(
        "INSERT INTO category (name, parent_id) VALUES (?1, ?2)",
        (name.as_ref(), parent_id),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name,
        parent_id,
    })
}

/// Retrieve a single category by ID, `None` if it does not exist.
pub fn get_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    connection
        .prepare("SELECT id, name, parent_id FROM category WHERE id = :id")?
        .query_row(&[(":id", &category_id)], map_row)
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve all categories with each root directly followed by its subcategories.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, parent_id FROM category
             ORDER BY COALESCE(parent_id, id), parent_id IS NOT NULL, id",
        )?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Change a category's name. Returns an error if the category doesn't exist.
pub fn rename_category(
    category_id: CategoryId,
    new_name: CategoryName,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1 WHERE id = ?2",
        (new_name.as_ref(), category_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category by ID.
///
/// Ledger entries in the category become uncategorized and the category's
/// envelopes are deleted.
///
/// # Errors
/// Returns [Error::CategoryHasChildren] if the category has subcategories, or
/// [Error::DeleteMissingCategory] if the category doesn't exist.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let child_count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM category WHERE parent_id = ?1",
        [category_id],
        |row| row.get(0),
    )?;

    if child_count > 0 {
        return Err(Error::CategoryHasChildren);
    }

    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            parent_id INTEGER,
            FOREIGN KEY(parent_id) REFERENCES category(id)
        );

        CREATE INDEX IF NOT EXISTS idx_category_parent ON category(parent_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);
    let parent_id = row.get(2)?;

    Ok(Category {
        id,
        name,
        parent_id,
    })
}
