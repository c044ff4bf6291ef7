//! # est-db
//!
//! libSQL report store.
//!
//! Holds requirements, immutable versioned reports (diagram markup stored
//! verbatim next to the report body) and the similarity records that back the
//! in-memory [`est_search::SimilarityIndex`].
//!
//! Reads share one connection. Each save runs in its own connection and
//! `IMMEDIATE` transaction, so a report, its version number and its
//! similarity record commit together or not at all.

pub mod error;
pub mod helpers;
pub mod locks;
mod migrations;
pub mod store;

use std::time::Duration;

use error::DatabaseError;
use libsql::Builder;

pub use store::{ReportStore, ReportVersion};

/// How long a writer waits on another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database handle for the report store.
pub struct EstDb {
    db: libsql::Database,
    conn: libsql::Connection,
}

impl EstDb {
    /// Open a local database file, creating and migrating it as needed.
    ///
    /// `":memory:"` works for schema-level use, but each [`Self::connect`]
    /// then sees its own empty database; stores need a file.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        configure(&conn).await?;

        // Readers never wait on the single writer under WAL.
        conn.query("PRAGMA journal_mode = WAL", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA journal_mode: {e}")))?;

        let est_db = Self { db, conn };
        est_db.run_migrations().await?;
        Ok(est_db)
    }

    /// The shared connection. Never open a transaction on it.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// A fresh, configured connection for one write transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection cannot be opened.
    pub async fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.db.connect()?;
        configure(&conn).await?;
        Ok(conn)
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"rpt-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

/// Per-connection settings (`SQLite` does not persist these).
async fn configure(conn: &libsql::Connection) -> Result<(), DatabaseError> {
    conn.execute("PRAGMA foreign_keys = ON", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;
    conn.query(
        &format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT.as_millis()),
        (),
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> EstDb {
        EstDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        for table in ["requirements", "reports", "similarity_records"] {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                )
                .await
                .unwrap();
            assert!(
                rows.next().await.unwrap().is_some(),
                "table '{table}' should exist"
            );
        }
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("rpt").await.unwrap();
        assert!(id.starts_with("rpt-"), "ID should start with 'rpt-': {id}");
        assert_eq!(id.len(), 12, "3 prefix + 1 dash + 8 hex: {id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("rpt").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn report_versions_are_unique_per_requirement() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO requirements (id, raw_text, source_kind) VALUES ('req-1', 'Login', 'text')",
                (),
            )
            .await
            .unwrap();
        let insert = "INSERT INTO reports (id, requirement_id, version, body, task_diagram, erd_diagram)
                      VALUES (?1, 'req-1', 1, '{}', '', '')";
        db.conn().execute(insert, ["rpt-1"]).await.unwrap();
        assert!(db.conn().execute(insert, ["rpt-2"]).await.is_err());
    }

    #[tokio::test]
    async fn reports_require_a_requirement() {
        let db = test_db().await;
        let result = db
            .conn()
            .execute(
                "INSERT INTO reports (id, requirement_id, version, body, task_diagram, erd_diagram)
                 VALUES ('rpt-1', 'req-missing', 1, '{}', '', '')",
                (),
            )
            .await;
        assert!(result.is_err(), "foreign key should reject unknown requirement");
    }
}
