//! # est-search
//!
//! Nearest-neighbour index over `(vector, requirement id, report id)` triples.
//!
//! Brute-force scan under a read/write lock: any number of concurrent
//! queries, one writer at a time. Results are ordered by ascending distance;
//! equal distances keep insertion order, so the earlier record wins.
//!
//! The index is in-memory only. The report store persists every
//! [`SimilarityRecord`] and reloads them with [`SimilarityIndex::load`].

mod distance;
pub mod error;

pub use distance::{cosine_distance, distance, l2_distance};
pub use error::IndexError;

use est_core::entities::SimilarityRecord;
use est_core::enums::DistanceMetric;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// One query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityHit {
    pub requirement_id: String,
    pub report_id: String,
    pub distance: f64,
    /// Higher-is-closer score under the index metric.
    pub relevance: f64,
}

#[derive(Debug, Default)]
struct IndexState {
    /// Fixed by the first inserted vector.
    dimension: Option<usize>,
    records: Vec<SimilarityRecord>,
}

/// Thread-safe similarity index.
#[derive(Debug, Default)]
pub struct SimilarityIndex {
    metric: DistanceMetric,
    state: RwLock<IndexState>,
}

impl SimilarityIndex {
    #[must_use]
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            state: RwLock::new(IndexState::default()),
        }
    }

    #[must_use]
    pub const fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Check `vector` against the index without inserting it.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] for empty, non-finite or wrongly sized vectors.
    pub fn check_vector(&self, vector: &[f32]) -> Result<(), IndexError> {
        let state = self.state.read();
        validate(state.dimension, vector)
    }

    /// Append a record.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] for empty, non-finite or wrongly sized vectors.
    pub fn insert(
        &self,
        requirement_id: &str,
        vector: Vec<f32>,
        report_id: &str,
    ) -> Result<(), IndexError> {
        let mut state = self.state.write();
        validate(state.dimension, &vector)?;
        state.dimension = Some(vector.len());
        state.records.push(SimilarityRecord {
            requirement_id: requirement_id.to_string(),
            embedding: vector,
            report_id: report_id.to_string(),
        });
        Ok(())
    }

    /// Replace the contents with persisted records, in their stored order.
    ///
    /// Records that do not fit the first record's dimension are skipped and
    /// counted in the return value.
    pub fn load(&self, records: Vec<SimilarityRecord>) -> usize {
        let mut state = self.state.write();
        state.dimension = None;
        state.records.clear();
        let mut skipped = 0;
        for record in records {
            if validate(state.dimension, &record.embedding).is_err() {
                tracing::warn!(
                    requirement_id = %record.requirement_id,
                    report_id = %record.report_id,
                    "skipping similarity record with incompatible vector"
                );
                skipped += 1;
                continue;
            }
            state.dimension = Some(record.embedding.len());
            state.records.push(record);
        }
        skipped
    }

    /// Up to `k` nearest records, ascending distance, insertion order on ties.
    ///
    /// An empty index or `k == 0` yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] if the query vector does not fit the index.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<SimilarityHit>, IndexError> {
        let state = self.state.read();
        if k == 0 || state.records.is_empty() {
            return Ok(Vec::new());
        }
        validate(state.dimension, vector)?;

        let mut scored: Vec<(f64, &SimilarityRecord)> = state
            .records
            .iter()
            .map(|r| (distance(self.metric, vector, &r.embedding), r))
            .collect();
        // sort_by is stable: equal distances keep insertion order.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(distance, r)| SimilarityHit {
                requirement_id: r.requirement_id.clone(),
                report_id: r.report_id.clone(),
                distance,
                relevance: self.metric.relevance(distance),
            })
            .collect())
    }

    /// Remove every record for `requirement_id`. Returns the number removed.
    pub fn purge(&self, requirement_id: &str) -> usize {
        let mut state = self.state.write();
        let before = state.records.len();
        state.records.retain(|r| r.requirement_id != requirement_id);
        if state.records.is_empty() {
            state.dimension = None;
        }
        before - state.records.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().records.is_empty()
    }

    /// Dimension fixed by the first record, if any.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.state.read().dimension
    }
}

fn validate(dimension: Option<usize>, vector: &[f32]) -> Result<(), IndexError> {
    if vector.is_empty() {
        return Err(IndexError::Empty);
    }
    if let Some(pos) = vector.iter().position(|v| !v.is_finite()) {
        return Err(IndexError::NonFinite(pos));
    }
    match dimension {
        Some(expected) if expected != vector.len() => Err(IndexError::DimensionMismatch {
            expected,
            actual: vector.len(),
        }),
        _ => Ok(()),
    }
}
