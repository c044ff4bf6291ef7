//! Report store against on-disk databases.

use std::sync::Arc;

use est_core::entities::{
    Endpoint, EntityGraph, ReportDraft, RequirementDocument, Risk, Task, TaskForest,
};
use est_core::enums::{DistanceMetric, HttpMethod, RiskKind, Severity, SourceKind};
use est_core::hours::Hours;
use est_db::ReportStore;
use est_search::SimilarityIndex;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn draft(text: &str) -> ReportDraft {
    let leaf = |id: &str, hours: u64| Task {
        id: id.to_string(),
        parent_id: Some("1".to_string()),
        title: format!("Task {id}"),
        description: None,
        difficulty: None,
        leaf_estimate_hours: Some(Hours::from_whole(hours)),
        rolled_up_estimate_hours: Hours::from_whole(hours),
    };
    ReportDraft {
        requirement: RequirementDocument::new(text, SourceKind::Text),
        summary: Some("Login flow".to_string()),
        tasks: TaskForest {
            tasks: vec![
                Task {
                    id: "1".to_string(),
                    parent_id: None,
                    title: "Login".to_string(),
                    description: Some("Email and password".to_string()),
                    difficulty: None,
                    leaf_estimate_hours: None,
                    rolled_up_estimate_hours: Hours::from_centi(1050),
                },
                leaf("2", 6),
                Task {
                    leaf_estimate_hours: Some(Hours::from_centi(450)),
                    rolled_up_estimate_hours: Hours::from_centi(450),
                    ..leaf("3", 0)
                },
            ],
            roots: vec!["1".to_string()],
        },
        graph: EntityGraph::default(),
        endpoints: vec![Endpoint {
            method: HttpMethod::Post,
            path: "/api/login".to_string(),
            description: "Sign in".to_string(),
            estimate_hours: Hours::from_whole(2),
        }],
        risks: vec![Risk::new(RiskKind::Reported, Severity::High, "Brute force")],
        suggested_questions: vec!["Is SSO required?".to_string()],
        task_diagram: "graph TD\n    1[\"Login (10.5h)\"]\n    1-->2\n".to_string(),
        erd_diagram: "erDiagram\n".to_string(),
        context_report_ids: vec![],
    }
}

struct Fixture {
    dir: TempDir,
    index: Arc<SimilarityIndex>,
    store: ReportStore,
}

impl Fixture {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(SimilarityIndex::new(DistanceMetric::Cosine));
        let store = ReportStore::open_local(&dir.path().join("reports.db"), Arc::clone(&index))
            .await
            .unwrap();
        Self { dir, index, store }
    }

    async fn reopen(self) -> Self {
        let Self { dir, store, .. } = self;
        drop(store);
        let index = Arc::new(SimilarityIndex::new(DistanceMetric::Cosine));
        let store = ReportStore::open_local(&dir.path().join("reports.db"), Arc::clone(&index))
            .await
            .unwrap();
        Self { dir, index, store }
    }
}

#[tokio::test]
async fn save_and_get_roundtrip() {
    let fx = Fixture::new().await;
    let saved = fx.store.save(draft("Login"), None).await.unwrap();

    assert!(saved.id.starts_with("rpt-"));
    assert_eq!(saved.version, 1);

    let loaded = fx.store.get(&saved.id).await.unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.total_hours(), Hours::from_centi(1050));
    assert_eq!(loaded.draft.task_diagram, draft("Login").task_diagram);
}

#[tokio::test]
async fn reanalysis_creates_next_version() {
    let fx = Fixture::new().await;
    let first = fx.store.save(draft("Login"), None).await.unwrap();
    let second = fx.store.save(draft("Login"), None).await.unwrap();
    let other = fx.store.save(draft("Checkout"), None).await.unwrap();

    assert_eq!(second.version, 2);
    assert_eq!(other.version, 1);
    assert_eq!(first.requirement_id(), second.requirement_id());

    let versions = fx.store.list_versions(first.requirement_id()).await.unwrap();
    let listed: Vec<_> = versions.iter().map(|v| (v.version, v.report_id.as_str())).collect();
    assert_eq!(listed, vec![(2, second.id.as_str()), (1, first.id.as_str())]);
    assert_eq!(versions[0].total_hours, Hours::from_centi(1050));

    let v1 = fx.store.get_version(first.requirement_id(), 1).await.unwrap();
    assert_eq!(v1.id, first.id);
    let latest = fx.store.latest(first.requirement_id()).await.unwrap();
    assert_eq!(latest.id, second.id);
}

#[tokio::test]
async fn missing_lookups_are_not_found() {
    let fx = Fixture::new().await;
    assert!(fx.store.get("rpt-00000000").await.unwrap_err().is_not_found());
    assert!(fx.store.get_version("req-x", 1).await.unwrap_err().is_not_found());
    assert!(fx.store.latest("req-x").await.unwrap_err().is_not_found());
    assert!(fx.store.list_versions("req-x").await.unwrap().is_empty());
}

#[tokio::test]
async fn save_indexes_embedding_and_reloads_it() {
    let fx = Fixture::new().await;
    let saved = fx
        .store
        .save(draft("Login"), Some(vec![1.0, 0.0, 0.0]))
        .await
        .unwrap();
    fx.store.save(draft("Checkout"), None).await.unwrap();

    assert_eq!(fx.index.len(), 1);
    let hits = fx.index.query(&[1.0, 0.0, 0.0], 5).unwrap();
    assert_eq!(hits[0].report_id, saved.id);

    let fx = fx.reopen().await;
    assert_eq!(fx.index.len(), 1);
    assert_eq!(fx.index.dimension(), Some(3));
    let hits = fx.index.query(&[1.0, 0.0, 0.0], 5).unwrap();
    assert_eq!(hits[0].requirement_id, saved.requirement_id());
}

#[tokio::test]
async fn mismatched_embedding_is_not_indexed() {
    let fx = Fixture::new().await;
    fx.store.save(draft("Login"), Some(vec![1.0, 0.0])).await.unwrap();
    let saved = fx
        .store
        .save(draft("Checkout"), Some(vec![1.0, 0.0, 0.0]))
        .await
        .unwrap();

    assert_eq!(saved.version, 1);
    assert_eq!(fx.index.len(), 1);
    assert!(fx.store.get(&saved.id).await.is_ok());
}

#[tokio::test]
async fn purge_removes_records_but_keeps_reports() {
    let fx = Fixture::new().await;
    let saved = fx
        .store
        .save(draft("Login"), Some(vec![0.5, 0.5]))
        .await
        .unwrap();
    fx.store.save(draft("Login"), Some(vec![0.4, 0.6])).await.unwrap();

    let removed = fx.store.purge_similarity(saved.requirement_id()).await.unwrap();
    assert_eq!(removed, 2);
    assert!(fx.index.is_empty());

    let fx = fx.reopen().await;
    assert!(fx.index.is_empty());
    assert!(fx.store.get(&saved.id).await.is_ok());
}

#[tokio::test]
async fn concurrent_saves_get_distinct_versions() {
    let fx = Fixture::new().await;
    let store = Arc::new(fx.store);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            let text = if i % 2 == 0 { "Login" } else { "Checkout" };
            tokio::spawn(async move { store.save(draft(text), Some(vec![1.0, 0.0])).await })
        })
        .collect();

    let mut login_versions = Vec::new();
    for handle in handles {
        let report = handle.await.unwrap().unwrap();
        if report.draft.requirement.raw_text == "Login" {
            login_versions.push(report.version);
        }
    }
    login_versions.sort_unstable();
    assert_eq!(login_versions, vec![1, 2, 3, 4]);
    assert_eq!(fx.index.len(), 8);
}
