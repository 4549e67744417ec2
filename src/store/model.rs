//! Creature record mapped from the `pokemon` table.

use serde::{Deserialize, Serialize};
use sqlx::error::UnexpectedNullError;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// One row of the `pokemon` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: i64,
    pub name: String,
    pub type1: String,
    pub type2: Option<String>,
    pub description: String,
    pub image_url: String,
}

/// Read a column that must not be NULL.
///
/// SQLite hands back NULL as an empty text or zero integer when decoded
/// straight into a non-`Option` type, so nullability is checked here.
fn required<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get::<Option<T>, _>(column)?
        .ok_or_else(|| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(UnexpectedNullError),
        })
}

impl<'r> FromRow<'r, SqliteRow> for Pokemon {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: required(row, "id")?,
            name: required(row, "name")?,
            type1: required(row, "type1")?,
            type2: row.try_get("type2")?,
            description: required(row, "description")?,
            image_url: required(row, "image_url")?,
        })
    }
}
