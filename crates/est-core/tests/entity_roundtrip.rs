//! Serde roundtrip and JsonSchema validation tests for the report data model.

use chrono::Utc;
use schemars::schema_for;
use est_core::entities::*;
use est_core::enums::*;
use est_core::hours::Hours;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            // Serde roundtrip
            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            pretty_assertions::assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            // Schema validation
            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn login_requirement() -> RequirementDocument {
    RequirementDocument::new(
        "Implement login with email and password",
        SourceKind::Text,
    )
}

fn login_forest() -> TaskForest {
    TaskForest {
        tasks: vec![
            Task {
                id: "1".into(),
                parent_id: None,
                title: "Login".into(),
                description: None,
                difficulty: Some(Difficulty::Medium),
                leaf_estimate_hours: None,
                rolled_up_estimate_hours: Hours::from_whole(10),
            },
            Task {
                id: "2".into(),
                parent_id: Some("1".into()),
                title: "Validate credentials".into(),
                description: Some("Check the password hash".into()),
                difficulty: None,
                leaf_estimate_hours: Some(Hours::from_whole(6)),
                rolled_up_estimate_hours: Hours::from_whole(6),
            },
            Task {
                id: "3".into(),
                parent_id: Some("1".into()),
                title: "Issue session token".into(),
                description: None,
                difficulty: Some(Difficulty::Easy),
                leaf_estimate_hours: Some(Hours::from_centi(350)),
                rolled_up_estimate_hours: Hours::from_centi(350),
            },
        ],
        roots: vec!["1".into()],
    }
}

fn user_session_graph() -> EntityGraph {
    EntityGraph {
        entities: vec![
            Entity {
                id: "user".into(),
                name: "User".into(),
                attributes: vec![
                    Attribute {
                        name: "email".into(),
                        data_type: "string".into(),
                    },
                    Attribute {
                        name: "password_hash".into(),
                        data_type: "string".into(),
                    },
                ],
            },
            Entity {
                id: "session".into(),
                name: "Session".into(),
                attributes: vec![],
            },
        ],
        relationships: vec![Relationship {
            id: "rel-1".into(),
            from_entity_id: "user".into(),
            to_entity_id: "session".into(),
            cardinality: Cardinality::OneToMany,
            label: "owns".into(),
        }],
    }
}

fn login_draft() -> ReportDraft {
    ReportDraft {
        requirement: login_requirement(),
        summary: Some("Email and password login".into()),
        tasks: login_forest(),
        graph: user_session_graph(),
        endpoints: vec![Endpoint {
            method: HttpMethod::Post,
            path: "/api/login".into(),
            description: "Authenticate a user".into(),
            estimate_hours: Hours::from_whole(2),
        }],
        risks: vec![Risk::new(
            RiskKind::Reported,
            Severity::High,
            "Credential stuffing",
        )],
        suggested_questions: vec!["Is MFA required?".into()],
        task_diagram: "graph TD\n    1[\"Login (10h)\"]\n".into(),
        erd_diagram: "erDiagram\n".into(),
        context_report_ids: vec!["rpt-a3f8b2c1".into()],
    }
}

roundtrip_and_validate!(
    requirement_roundtrip,
    RequirementDocument,
    login_requirement()
);

roundtrip_and_validate!(
    markdown_requirement_roundtrip,
    RequirementDocument,
    RequirementDocument::new("# Login\n\nUsers sign in.", SourceKind::Markdown)
);

roundtrip_and_validate!(
    task_forest_roundtrip,
    TaskForest,
    login_forest()
);

roundtrip_and_validate!(
    entity_graph_roundtrip,
    EntityGraph,
    user_session_graph()
);

roundtrip_and_validate!(
    endpoint_roundtrip,
    Endpoint,
    Endpoint {
        method: HttpMethod::Delete,
        path: "/api/sessions/{id}".into(),
        description: "Log out".into(),
        estimate_hours: Hours::from_centi(125),
    }
);

roundtrip_and_validate!(
    risk_roundtrip,
    Risk,
    Risk::new(
        RiskKind::CycleDetected,
        Severity::Medium,
        "Tasks 1 and 2 formed a cycle",
    )
);

roundtrip_and_validate!(
    similarity_record_roundtrip,
    SimilarityRecord,
    SimilarityRecord {
        requirement_id: "req-0123456789abcdef".into(),
        embedding: vec![0.25, -0.5, 1.0],
        report_id: "rpt-a3f8b2c1".into(),
    }
);

roundtrip_and_validate!(draft_roundtrip, ReportDraft, login_draft());

roundtrip_and_validate!(
    report_roundtrip,
    Report,
    Report::from_draft("rpt-a3f8b2c1".into(), 2, Utc::now(), login_draft())
);

#[test]
fn report_json_is_flat() {
    let report = Report::from_draft("rpt-a3f8b2c1".into(), 1, Utc::now(), login_draft());
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["id"], "rpt-a3f8b2c1");
    assert_eq!(value["version"], 1);
    assert_eq!(value["requirement"]["source_kind"], "text");
    assert_eq!(value["graph"]["relationships"][0]["cardinality"], "one_to_many");
    assert_eq!(value["endpoints"][0]["method"], "POST");
    assert_eq!(value["graph"]["entities"][0]["attributes"][0]["type"], "string");
}

#[test]
fn report_totals() {
    let report = Report::from_draft("rpt-a3f8b2c1".into(), 1, Utc::now(), login_draft());
    assert_eq!(report.total_hours(), Hours::from_whole(10));
    assert_eq!(report.endpoint_hours(), Hours::from_whole(2));
    assert_eq!(report.requirement_id(), login_requirement().id);
}

#[test]
fn forest_navigation() {
    let forest = login_forest();
    let children: Vec<_> = forest.children_of("1").map(|t| t.id.as_str()).collect();
    assert_eq!(children, vec!["2", "3"]);
    assert!(forest.get("1").unwrap().is_root());
    assert!(forest.get("9").is_none());
    assert_eq!(forest.len(), 3);
}
