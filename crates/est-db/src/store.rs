//! Report store: versioned reports plus similarity records.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use est_config::StoreConfig;
use est_core::entities::{Report, ReportDraft, SimilarityRecord};
use est_core::errors::CoreError;
use est_core::hours::Hours;
use est_core::ids::PREFIX_REPORT;
use est_search::SimilarityIndex;
use libsql::TransactionBehavior;
use serde::Serialize;
use serde_json::Value;

use crate::EstDb;
use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_json, to_json, to_u32};
use crate::locks::KeyedLocks;

const REPORT_COLUMNS: &str = "id, version, body, task_diagram, erd_diagram, created_at";
const DIAGRAM_KEYS: [&str; 2] = ["task_diagram", "erd_diagram"];

/// One row of a requirement's version history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportVersion {
    pub report_id: String,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub total_hours: Hours,
}

fn row_to_report(row: &libsql::Row) -> Result<Report, DatabaseError> {
    let mut body: Value = parse_json(&row.get::<String>(2)?)?;
    let Some(fields) = body.as_object_mut() else {
        return Err(DatabaseError::InvalidState(
            "report body is not a JSON object".to_string(),
        ));
    };
    fields.insert(DIAGRAM_KEYS[0].to_string(), Value::String(row.get::<String>(3)?));
    fields.insert(DIAGRAM_KEYS[1].to_string(), Value::String(row.get::<String>(4)?));
    let draft: ReportDraft = serde_json::from_value(body)
        .map_err(|e| DatabaseError::Query(format!("Invalid report body: {e}")))?;

    Ok(Report::from_draft(
        row.get::<String>(0)?,
        to_u32(row.get::<i64>(1)?, "version")?,
        parse_datetime(&row.get::<String>(5)?)?,
        draft,
    ))
}

fn row_to_version(row: &libsql::Row) -> Result<ReportVersion, DatabaseError> {
    let centi = row.get::<i64>(3)?;
    Ok(ReportVersion {
        report_id: row.get::<String>(0)?,
        version: to_u32(row.get::<i64>(1)?, "version")?,
        created_at: parse_datetime(&row.get::<String>(2)?)?,
        total_hours: Hours::from_centi(u64::try_from(centi).map_err(|_| {
            DatabaseError::InvalidState(format!("negative total hours: {centi}"))
        })?),
    })
}

/// The report JSON without diagrams; those live in their own columns.
fn report_body(draft: &ReportDraft) -> Result<String, DatabaseError> {
    let mut body = serde_json::to_value(draft).map_err(|e| DatabaseError::Other(e.into()))?;
    if let Some(fields) = body.as_object_mut() {
        for key in DIAGRAM_KEYS {
            fields.remove(key);
        }
    }
    to_json(&body)
}

/// Persists reports and keeps the similarity index in step with them.
///
/// Writes for one requirement ID are serialized; writes for different
/// requirement IDs only meet at `SQLite`'s own write lock.
pub struct ReportStore {
    db: EstDb,
    index: Arc<SimilarityIndex>,
    locks: KeyedLocks,
}

impl ReportStore {
    /// Open the store at `config.db_path`, creating its directory.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory or database cannot be created.
    pub async fn open(config: &StoreConfig, index: Arc<SimilarityIndex>) -> Result<Self, DatabaseError> {
        let path = config.path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Other(anyhow::anyhow!(
                    "cannot create store directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        Self::open_local(&path, index).await
    }

    /// Open a database file and load its similarity records into `index`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or read.
    pub async fn open_local(path: &Path, index: Arc<SimilarityIndex>) -> Result<Self, DatabaseError> {
        let db = EstDb::open_local(&path.to_string_lossy()).await?;
        let store = Self {
            db,
            index,
            locks: KeyedLocks::new(),
        };

        let records = store.similarity_records().await?;
        let total = records.len();
        let skipped = store.index.load(records);
        if skipped > 0 {
            tracing::warn!(skipped, "similarity records with incompatible vectors were not indexed");
        }
        tracing::debug!(path = %path.display(), records = total - skipped, "report store opened");
        Ok(store)
    }

    #[must_use]
    pub const fn index(&self) -> &Arc<SimilarityIndex> {
        &self.index
    }

    /// Persist `draft` as the next version of its requirement.
    ///
    /// The requirement row, the report and (when `embedding` is given and
    /// fits the index) the similarity record commit in one transaction. The
    /// record is added to the in-memory index after the commit.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if anything fails; nothing is committed then.
    pub async fn save(
        &self,
        draft: ReportDraft,
        embedding: Option<Vec<f32>>,
    ) -> Result<Report, DatabaseError> {
        let requirement_id = draft.requirement.id.clone();
        let _guard = self.locks.lock(&requirement_id).await;

        let embedding = embedding.filter(|vector| match self.index.check_vector(vector) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(%requirement_id, error = %e, "embedding does not fit the index; report saved without similarity record");
                false
            }
        });

        let report_id = self.db.generate_id(PREFIX_REPORT).await?;
        let created_at = Utc::now();
        let body = report_body(&draft)?;
        let total_centi = i64::try_from(draft.tasks.total_hours().centi())
            .map_err(|_| DatabaseError::InvalidState("total hours out of range".to_string()))?;

        let conn = self.db.connect().await?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?;

        tx.execute(
            "INSERT OR IGNORE INTO requirements (id, raw_text, source_kind, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            libsql::params![
                requirement_id.as_str(),
                draft.requirement.raw_text.as_str(),
                draft.requirement.source_kind.as_str(),
                draft.requirement.created_at.to_rfc3339()
            ],
        )
        .await?;

        let version = {
            let mut rows = tx
                .query(
                    "SELECT COALESCE(MAX(version), 0) + 1 FROM reports WHERE requirement_id = ?1",
                    [requirement_id.as_str()],
                )
                .await?;
            let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
            to_u32(row.get::<i64>(0)?, "version")?
        };

        tx.execute(
            "INSERT INTO reports (id, requirement_id, version, body, task_diagram, erd_diagram, total_centi_hours, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            libsql::params![
                report_id.as_str(),
                requirement_id.as_str(),
                i64::from(version),
                body,
                draft.task_diagram.as_str(),
                draft.erd_diagram.as_str(),
                total_centi,
                created_at.to_rfc3339()
            ],
        )
        .await?;

        if let Some(vector) = &embedding {
            let dimension = i64::try_from(vector.len())
                .map_err(|_| DatabaseError::InvalidState("embedding too large".to_string()))?;
            tx.execute(
                "INSERT INTO similarity_records (requirement_id, report_id, dimension, embedding)
                 VALUES (?1, ?2, ?3, ?4)",
                libsql::params![
                    requirement_id.as_str(),
                    report_id.as_str(),
                    dimension,
                    to_json(vector)?
                ],
            )
            .await?;
        }

        tx.commit().await?;

        if let Some(vector) = embedding
            && let Err(e) = self.index.insert(&requirement_id, vector, &report_id)
        {
            tracing::warn!(%requirement_id, %report_id, error = %e, "similarity record persisted but not indexed");
        }

        tracing::info!(%requirement_id, %report_id, version, "report saved");
        Ok(Report::from_draft(report_id, version, created_at, draft))
    }

    /// # Errors
    ///
    /// `CoreError::NotFound` (as [`DatabaseError::Core`]) for an unknown ID.
    pub async fn get(&self, report_id: &str) -> Result<Report, DatabaseError> {
        let mut rows = self
            .db
            .conn()
            .query(
                &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1"),
                [report_id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| CoreError::not_found("report", report_id))?;
        row_to_report(&row)
    }

    /// A specific version of a requirement's report.
    ///
    /// # Errors
    ///
    /// `CoreError::NotFound` when the version does not exist.
    pub async fn get_version(&self, requirement_id: &str, version: u32) -> Result<Report, DatabaseError> {
        let mut rows = self
            .db
            .conn()
            .query(
                &format!(
                    "SELECT {REPORT_COLUMNS} FROM reports WHERE requirement_id = ?1 AND version = ?2"
                ),
                libsql::params![requirement_id, i64::from(version)],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| {
            CoreError::not_found("report", &format!("{requirement_id} v{version}"))
        })?;
        row_to_report(&row)
    }

    /// The newest version of a requirement's report.
    ///
    /// # Errors
    ///
    /// `CoreError::NotFound` when the requirement has no reports.
    pub async fn latest(&self, requirement_id: &str) -> Result<Report, DatabaseError> {
        let mut rows = self
            .db
            .conn()
            .query(
                &format!(
                    "SELECT {REPORT_COLUMNS} FROM reports WHERE requirement_id = ?1
                     ORDER BY version DESC LIMIT 1"
                ),
                [requirement_id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| CoreError::not_found("requirement", requirement_id))?;
        row_to_report(&row)
    }

    /// Version history of a requirement, newest first. Empty if unknown.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_versions(&self, requirement_id: &str) -> Result<Vec<ReportVersion>, DatabaseError> {
        let mut rows = self
            .db
            .conn()
            .query(
                "SELECT id, version, created_at, total_centi_hours FROM reports
                 WHERE requirement_id = ?1 ORDER BY version DESC",
                [requirement_id],
            )
            .await?;
        let mut versions = Vec::new();
        while let Some(row) = rows.next().await? {
            versions.push(row_to_version(&row)?);
        }
        Ok(versions)
    }

    /// Remove a requirement's similarity records from the database and the
    /// index. Reports are kept. Returns the number of records removed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails; the index is untouched then.
    pub async fn purge_similarity(&self, requirement_id: &str) -> Result<usize, DatabaseError> {
        let _guard = self.locks.lock(requirement_id).await;

        let conn = self.db.connect().await?;
        let deleted = conn
            .execute(
                "DELETE FROM similarity_records WHERE requirement_id = ?1",
                [requirement_id],
            )
            .await?;
        let unindexed = self.index.purge(requirement_id);

        let deleted = usize::try_from(deleted).unwrap_or(usize::MAX);
        if deleted != unindexed {
            tracing::warn!(requirement_id, deleted, unindexed, "index and store disagreed before purge");
        }
        tracing::info!(requirement_id, deleted, "similarity records purged");
        Ok(deleted)
    }

    /// All persisted similarity records, in insertion order.
    async fn similarity_records(&self) -> Result<Vec<SimilarityRecord>, DatabaseError> {
        let mut rows = self
            .db
            .conn()
            .query(
                "SELECT requirement_id, report_id, embedding FROM similarity_records ORDER BY seq",
                (),
            )
            .await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(SimilarityRecord {
                requirement_id: row.get::<String>(0)?,
                report_id: row.get::<String>(1)?,
                embedding: parse_json(&row.get::<String>(2)?)?,
            });
        }
        Ok(records)
    }
}
