//! Database ID type definition.

/// Alias for the integer type SQLite uses for row IDs.
pub type DatabaseId = i64;
