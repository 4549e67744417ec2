//! Creature store module
//!
//! Read-only access to the SQLite file holding the `pokemon` table.
//! There is no pool: every query opens its own connection, runs one
//! statement and closes the connection again, whatever the outcome.
//! A connection dropped mid-query (client gone, task cancelled) is
//! released by its `Drop`.

mod error;
mod model;

pub use error::StoreError;
pub use model::Pokemon;

use crate::logger;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::{Path, PathBuf};

const SELECT_ALL: &str = "SELECT * FROM pokemon";
const SELECT_BY_NAME: &str = "SELECT * FROM pokemon WHERE name = ? COLLATE NOCASE";
const SELECT_BY_TYPE: &str =
    "SELECT * FROM pokemon WHERE type1 = ? COLLATE NOCASE OR type2 = ? COLLATE NOCASE";
const PROBE: &str = "SELECT 1 FROM pokemon LIMIT 1";

/// Open a fresh read-only connection to the store file.
///
/// The file is never created; a missing file is `StoreError::Unavailable`.
pub async fn connect(path: &Path) -> Result<SqliteConnection, StoreError> {
    SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .create_if_missing(false)
        .connect()
        .await
        .map_err(StoreError::Unavailable)
}

/// Close a connection, logging instead of failing the request
async fn release(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        logger::log_warning(&format!("Failed to close store connection: {e}"));
    }
}

/// Handle on the store file. Cheap to clone, holds no open connection.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record, in the table's natural scan order
    pub async fn list_all(&self) -> Result<Vec<Pokemon>, StoreError> {
        let mut conn = connect(&self.path).await?;
        let result = sqlx::query_as::<_, Pokemon>(SELECT_ALL)
            .fetch_all(&mut conn)
            .await;
        release(conn).await;
        result.map_err(StoreError::from_query)
    }

    /// First record whose name matches, ignoring case.
    ///
    /// Names are not unique in the table; with duplicates the first row in
    /// scan order wins.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Pokemon>, StoreError> {
        let mut conn = connect(&self.path).await?;
        let result = sqlx::query_as::<_, Pokemon>(SELECT_BY_NAME)
            .bind(name)
            .fetch_optional(&mut conn)
            .await;
        release(conn).await;
        result.map_err(StoreError::from_query)
    }

    /// Records whose primary or secondary type matches, ignoring case
    pub async fn find_by_type(&self, type_name: &str) -> Result<Vec<Pokemon>, StoreError> {
        let mut conn = connect(&self.path).await?;
        let result = sqlx::query_as::<_, Pokemon>(SELECT_BY_TYPE)
            .bind(type_name)
            .bind(type_name)
            .fetch_all(&mut conn)
            .await;
        release(conn).await;
        result.map_err(StoreError::from_query)
    }

    /// Readiness probe: the file opens and the table can be read
    pub async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = connect(&self.path).await?;
        let result = sqlx::query(PROBE).fetch_optional(&mut conn).await;
        release(conn).await;
        result.map(|_| ()).map_err(StoreError::from_query)
    }
}

/// Throwaway stores for tests
#[cfg(test)]
pub mod fixtures {
    use super::Pokemon;
    use sqlx::sqlite::SqliteConnectOptions;
    use sqlx::{ConnectOptions, Connection};
    use std::path::{Path, PathBuf};

    // No NOT NULL constraints so broken rows can be planted
    const CREATE_TABLE: &str = "CREATE TABLE pokemon (
        id INTEGER PRIMARY KEY,
        name TEXT,
        type1 TEXT,
        type2 TEXT,
        description TEXT,
        image_url TEXT
    )";
    const INSERT: &str = "INSERT INTO pokemon (id, name, type1, type2, description, image_url)
        VALUES (?, ?, ?, ?, ?, ?)";

    pub fn pokemon(id: i64, name: &str, type1: &str, type2: Option<&str>) -> Pokemon {
        Pokemon {
            id,
            name: name.to_string(),
            type1: type1.to_string(),
            type2: type2.map(ToString::to_string),
            description: format!("{name} description"),
            image_url: format!("/static/{}.png", name.to_lowercase()),
        }
    }

    pub fn starters() -> Vec<Pokemon> {
        vec![
            pokemon(1, "Bulbasaur", "Grass", Some("Poison")),
            pokemon(4, "Charmander", "Fire", None),
            pokemon(7, "Squirtle", "Water", None),
            pokemon(43, "Oddish", "Grass", Some("Poison")),
            pokemon(92, "Gastly", "Ghost", Some("Poison")),
        ]
    }

    /// Run raw statements against a fresh store file in `dir`
    pub async fn create_store_with(dir: &Path, statements: &[&str]) -> PathBuf {
        let path = dir.join("Pokedex.db");
        let mut conn = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .connect()
            .await
            .unwrap();
        sqlx::query(CREATE_TABLE).execute(&mut conn).await.unwrap();
        for statement in statements {
            sqlx::query(statement).execute(&mut conn).await.unwrap();
        }
        conn.close().await.unwrap();
        path
    }

    /// Create a store file in `dir` holding `rows`
    pub async fn create_store(dir: &Path, rows: &[Pokemon]) -> PathBuf {
        let path = create_store_with(dir, &[]).await;
        let mut conn = SqliteConnectOptions::new()
            .filename(&path)
            .connect()
            .await
            .unwrap();
        for p in rows {
            sqlx::query(INSERT)
                .bind(p.id)
                .bind(&p.name)
                .bind(&p.type1)
                .bind(&p.type2)
                .bind(&p.description)
                .bind(&p.image_url)
                .execute(&mut conn)
                .await
                .unwrap();
        }
        conn.close().await.unwrap();
        path
    }
}
