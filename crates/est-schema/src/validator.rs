//! Record-level validation and normalization of oracle payloads.
//!
//! The validator never fails a whole payload because of one bad record. Each
//! record is read leniently (alternative field names, numeric IDs, estimates
//! given as strings), coerced where a safe reading exists, and otherwise
//! dropped and reported as a [`Violation`]. Unknown fields are logged and
//! ignored.
//!
//! Validation is a pure function of the raw payload: validating the same
//! payload twice, or validating [`ValidatedPayload::to_raw`] again, yields
//! identical output.

use std::collections::HashSet;
use std::fmt;

use est_core::entities::{Attribute, Endpoint, Entity, Relationship, Risk};
use est_core::enums::{Cardinality, Difficulty, HttpMethod, RiskKind, Severity};
use est_core::hours::Hours;
use est_core::ids;
use est_oracle::RawPayload;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::coerce::{self, Estimate, field, id_value, text_value, unknown_keys};
use crate::envelope::{
    ENDPOINT_KEYS, ENTITY_KEYS, KNOWN_KEYS, QUESTION_KEYS, RELATIONSHIP_KEYS, RISK_KEYS,
    SUMMARY_KEYS, TASK_KEYS,
};
use crate::error::SchemaError;
use crate::registry::SchemaRegistry;

const TASK_ID: &[&str] = &["id", "task_id", "taskId"];
const TASK_PARENT: &[&str] = &["parent_id", "parentId", "parent"];
const TASK_TITLE: &[&str] = &["title", "task_name", "name"];
const TASK_DESCRIPTION: &[&str] = &["description", "details"];
const TASK_DIFFICULTY: &[&str] = &["difficulty"];
const TASK_ESTIMATE: &[&str] = &[
    "estimate_hours",
    "leaf_estimate_hours",
    "leafEstimateHours",
    "hours",
    "time_estimate",
    "estimate",
];
const TASK_CHILDREN: &[&str] = &["subtasks", "children"];

const ENTITY_ID: &[&str] = &["id", "entity_id"];
const ENTITY_NAME: &[&str] = &["name", "entity_name"];
const ENTITY_ATTRIBUTES: &[&str] = &["attributes", "fields"];
/// Accepted but ignored; relationships are read from their own collection.
const ENTITY_IGNORED: &[&str] = &["relationships"];

const REL_ID: &[&str] = &["id"];
const REL_FROM: &[&str] = &["from_entity_id", "fromEntityId", "from", "source"];
const REL_TO: &[&str] = &["to_entity_id", "toEntityId", "to", "target"];
const REL_CARDINALITY: &[&str] = &["cardinality"];
const REL_LABEL: &[&str] = &["label", "name", "description"];

const EP_METHOD: &[&str] = &["method", "http_method"];
const EP_PATH: &[&str] = &["path", "endpoint", "url", "route"];
const EP_DESCRIPTION: &[&str] = &["description", "purpose", "summary"];
const EP_ESTIMATE: &[&str] = &["estimate_hours", "hours", "estimate", "time_estimate"];

const RISK_DESCRIPTION: &[&str] = &["description", "risk", "text"];
const RISK_SEVERITY: &[&str] = &["severity", "level"];
const RISK_KIND: &[&str] = &["kind"];

/// Default attribute type when the oracle gives only a name.
const DEFAULT_ATTRIBUTE_TYPE: &str = "string";

/// A validated task record, before the hierarchy is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStub {
    pub id: String,
    pub parent_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub estimate_hours: Option<Hours>,
}

/// Which collection a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    Task,
    Entity,
    Relationship,
    Endpoint,
    Risk,
}

impl RecordKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Entity => "entity",
            Self::Relationship => "relationship",
            Self::Endpoint => "endpoint",
            Self::Risk => "risk",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record that could not be coerced and was left out of the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: RecordKind,
    /// 1-based position in its collection (nested subtasks count in pre-order).
    pub position: usize,
    pub id: Option<String>,
    pub message: String,
}

impl Violation {
    fn new(kind: RecordKind, position: usize, id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            id: id.map(str::to_string),
            message: message.into(),
        }
    }

    /// The `RecordDropped` risk recorded when the violation survives repair.
    #[must_use]
    pub fn to_risk(&self) -> Risk {
        Risk::new(
            RiskKind::RecordDropped,
            Severity::Medium,
            format!("Dropped {self}"),
        )
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.kind, self.position)?;
        if let Some(id) = &self.id {
            write!(f, " ('{id}')")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Payload records that passed validation, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedPayload {
    pub summary: Option<String>,
    pub tasks: Vec<TaskStub>,
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
    pub endpoints: Vec<Endpoint>,
    /// Oracle-reported risks followed by malformed-field notes.
    pub risks: Vec<Risk>,
    pub suggested_questions: Vec<String>,
}

impl ValidatedPayload {
    /// Canonical raw form, using the primary field names.
    #[must_use]
    pub fn to_raw(&self) -> RawPayload {
        RawPayload::new(json!({
            "summary": self.summary,
            "tasks": self.tasks,
            "entities": self.entities,
            "relationships": self.relationships,
            "endpoints": self.endpoints,
            "risks": self.risks,
            "suggested_questions": self.suggested_questions,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub payload: ValidatedPayload,
    /// Ordered by record kind, then position.
    pub violations: Vec<Violation>,
}

impl Validation {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// One line per violation, for repair prompts.
    #[must_use]
    pub fn violation_messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// Validates raw oracle payloads against the record shapes of the report
/// data model.
pub struct PayloadValidator {
    registry: SchemaRegistry,
}

impl PayloadValidator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: SchemaRegistry::new(),
        }
    }

    /// Whole-payload check: an object whose collections are arrays.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ValidationFailed`] when the payload is unparsable.
    pub fn check_envelope(&self, raw: &RawPayload) -> Result<(), SchemaError> {
        self.registry.check_envelope(raw.as_value())
    }

    /// Validate every record of `raw`.
    ///
    /// # Errors
    ///
    /// Only the envelope can fail the whole payload; see [`Self::check_envelope`].
    pub fn validate(&self, raw: &RawPayload) -> Result<Validation, SchemaError> {
        self.check_envelope(raw)?;
        let Some(root) = raw.as_value().as_object() else {
            return Err(SchemaError::ValidationFailed {
                errors: vec!["payload is not an object".to_string()],
            });
        };

        let known: Vec<&str> = KNOWN_KEYS
            .iter()
            .flat_map(|keys| keys.iter().copied())
            .collect();
        for key in unknown_keys(root, &known) {
            tracing::debug!(field = key, "dropping unknown payload field");
        }

        let mut ctx = Context::default();
        let summary = match field(root, SUMMARY_KEYS) {
            None => None,
            Some(text @ Value::String(_)) => text_value(text),
            Some(other) => {
                ctx.malformed_field("summary", "a string", other);
                None
            }
        };

        let mut position = 0;
        for item in collection(root, TASK_KEYS) {
            read_task(item, Parent::Inherited(None), &mut position, &mut ctx);
        }
        resolve_parents(&mut ctx);

        for (i, item) in collection(root, ENTITY_KEYS).iter().enumerate() {
            read_entity(item, i + 1, &mut ctx);
        }
        for (i, item) in collection(root, RELATIONSHIP_KEYS).iter().enumerate() {
            read_relationship(item, i + 1, &mut ctx);
        }
        for (i, item) in collection(root, ENDPOINT_KEYS).iter().enumerate() {
            read_endpoint(item, i + 1, &mut ctx);
        }
        for (i, item) in collection(root, RISK_KEYS).iter().enumerate() {
            read_risk(item, i + 1, &mut ctx);
        }
        let questions = match field(root, QUESTION_KEYS) {
            None => &[][..],
            Some(Value::Array(items)) => items.as_slice(),
            Some(other) => {
                ctx.malformed_field("suggested_questions", "an array", other);
                &[][..]
            }
        };
        let suggested_questions = questions
            .iter()
            .filter_map(|q| {
                let text = text_value(q);
                if text.is_none() {
                    tracing::debug!(value = %q, "skipping non-text suggested question");
                }
                text
            })
            .collect();

        ctx.violations.sort_by_key(|v| (v.kind, v.position));
        let mut risks = ctx.reported_risks;
        risks.extend(ctx.field_risks);

        Ok(Validation {
            payload: ValidatedPayload {
                summary,
                tasks: ctx.tasks.into_iter().map(|t| t.stub).collect(),
                entities: ctx.entities,
                relationships: ctx.relationships,
                endpoints: ctx.endpoints,
                risks,
                suggested_questions,
            },
            violations: ctx.violations,
        })
    }
}

impl Default for PayloadValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct Context {
    tasks: Vec<PositionedTask>,
    entities: Vec<Entity>,
    relationships: Vec<Relationship>,
    endpoints: Vec<Endpoint>,
    reported_risks: Vec<Risk>,
    field_risks: Vec<Risk>,
    violations: Vec<Violation>,
}

impl Context {
    fn violation(&mut self, kind: RecordKind, position: usize, id: Option<&str>, message: impl Into<String>) {
        let violation = Violation::new(kind, position, id, message);
        tracing::debug!(%violation, "record failed validation");
        self.violations.push(violation);
    }

    /// A top-level field with the wrong shape, dropped from the report.
    fn malformed_field(&mut self, name: &str, expected: &str, value: &Value) {
        tracing::debug!(field = name, value = %value, "dropping malformed payload field");
        self.field_risks.push(Risk::new(
            RiskKind::MalformedField,
            Severity::Low,
            format!("payload field '{name}' is {value}, expected {expected}; dropped"),
        ));
    }

    fn malformed_estimate(&mut self, kind: RecordKind, label: &str, value: Option<&Value>) {
        let shown = value.map_or_else(|| "null".to_string(), ToString::to_string);
        tracing::debug!(record = %kind, label, value = %shown, "malformed estimate coerced to 0h");
        self.field_risks.push(Risk::new(
            RiskKind::MalformedField,
            Severity::Low,
            format!("{kind} {label}: estimate {shown} is not a non-negative number of hours; treated as 0h"),
        ));
    }
}

struct PositionedTask {
    position: usize,
    stub: TaskStub,
}

/// Parent of a task record when it has no explicit `parent_id`.
#[derive(Clone, Copy)]
enum Parent<'a> {
    /// Top-level record (`None`) or nested under a valid task.
    Inherited(Option<&'a str>),
    /// Nested under a record that was dropped.
    Dropped,
}

/// The first collection present under any of `keys`.
fn collection<'a>(root: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    field(root, keys)
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice)
}

fn read_task(item: &Value, parent: Parent<'_>, position: &mut usize, ctx: &mut Context) {
    *position += 1;
    let pos = *position;

    let Some(record) = item.as_object() else {
        ctx.violation(RecordKind::Task, pos, None, "expected an object");
        return;
    };
    let children = field(record, TASK_CHILDREN)
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice);

    let id = field(record, TASK_ID).and_then(id_value);
    let stub = match (&id, parent) {
        (_, Parent::Dropped) => Err("parent record was dropped".to_string()),
        (None, _) => Err("missing id".to_string()),
        (Some(id), Parent::Inherited(implied)) => read_task_fields(record, id, implied, ctx),
    };

    match stub {
        Ok(stub) if ctx.tasks.iter().any(|t| t.stub.id == stub.id) => {
            ctx.violation(RecordKind::Task, pos, Some(stub.id.as_str()), "duplicate id");
            for child in children {
                read_task(child, Parent::Dropped, position, ctx);
            }
        }
        Ok(stub) => {
            let own_id = stub.id.clone();
            ctx.tasks.push(PositionedTask { position: pos, stub });
            for child in children {
                read_task(child, Parent::Inherited(Some(own_id.as_str())), position, ctx);
            }
        }
        Err(message) => {
            ctx.violation(RecordKind::Task, pos, id.as_deref(), message);
            for child in children {
                read_task(child, Parent::Dropped, position, ctx);
            }
        }
    }
}

fn read_task_fields(
    record: &Map<String, Value>,
    id: &str,
    implied_parent: Option<&str>,
    ctx: &mut Context,
) -> Result<TaskStub, String> {
    let known: Vec<&str> = [
        TASK_ID,
        TASK_PARENT,
        TASK_TITLE,
        TASK_DESCRIPTION,
        TASK_DIFFICULTY,
        TASK_ESTIMATE,
        TASK_CHILDREN,
    ]
    .concat();
    for key in unknown_keys(record, &known) {
        tracing::debug!(task = id, field = key, "dropping unknown task field");
    }

    let title = field(record, TASK_TITLE)
        .and_then(text_value)
        .ok_or_else(|| "missing title".to_string())?;

    let parent_id = field(record, TASK_PARENT)
        .and_then(id_value)
        .or_else(|| implied_parent.map(str::to_string));

    let difficulty = field(record, TASK_DIFFICULTY)
        .and_then(Value::as_str)
        .and_then(|s| {
            let parsed = Difficulty::parse(s);
            if parsed.is_none() {
                tracing::debug!(task = id, value = s, "ignoring unknown difficulty");
            }
            parsed
        });

    let raw_estimate = field(record, TASK_ESTIMATE);
    let estimate_hours = match coerce::estimate(raw_estimate) {
        Estimate::Valid(hours) => Some(hours),
        Estimate::Absent => None,
        Estimate::Malformed => {
            ctx.malformed_estimate(RecordKind::Task, &format!("'{id}'"), raw_estimate);
            None
        }
    };

    Ok(TaskStub {
        id: id.to_string(),
        parent_id,
        title,
        description: field(record, TASK_DESCRIPTION).and_then(text_value),
        difficulty,
        estimate_hours,
    })
}

/// Drop tasks whose parent is unknown, repeating until every remaining
/// parent reference resolves (dropping a task drops its descendants).
fn resolve_parents(ctx: &mut Context) {
    let mut dropped: HashSet<String> = HashSet::new();
    loop {
        let known: HashSet<&str> = ctx.tasks.iter().map(|t| t.stub.id.as_str()).collect();
        let orphans: Vec<usize> = ctx
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                t.stub
                    .parent_id
                    .as_deref()
                    .is_some_and(|p| !known.contains(p))
            })
            .map(|(i, _)| i)
            .collect();
        if orphans.is_empty() {
            break;
        }

        for &i in orphans.iter().rev() {
            let task = ctx.tasks.remove(i);
            let parent = task.stub.parent_id.as_deref().unwrap_or_default();
            let message = if dropped.contains(parent) {
                format!("parent '{parent}' was dropped")
            } else {
                format!("parent '{parent}' does not exist")
            };
            ctx.violation(RecordKind::Task, task.position, Some(task.stub.id.as_str()), message);
            dropped.insert(task.stub.id);
        }
    }
}

fn read_entity(item: &Value, pos: usize, ctx: &mut Context) {
    let Some(record) = item.as_object() else {
        ctx.violation(RecordKind::Entity, pos, None, "expected an object");
        return;
    };
    let known: Vec<&str> = [ENTITY_ID, ENTITY_NAME, ENTITY_ATTRIBUTES, ENTITY_IGNORED].concat();
    for key in unknown_keys(record, &known) {
        tracing::debug!(entity = pos, field = key, "dropping unknown entity field");
    }

    let name = field(record, ENTITY_NAME).and_then(text_value);
    let id = field(record, ENTITY_ID).and_then(id_value);
    let (id, name) = match (id, name) {
        (Some(id), Some(name)) => (id, name),
        (Some(id), None) => (id.clone(), id),
        (None, Some(name)) => (name.clone(), name),
        (None, None) => {
            ctx.violation(RecordKind::Entity, pos, None, "missing id and name");
            return;
        }
    };

    if ctx.entities.iter().any(|e| e.id == id) {
        ctx.violation(RecordKind::Entity, pos, Some(id.as_str()), "duplicate id");
        return;
    }

    let attributes = field(record, ENTITY_ATTRIBUTES).map_or_else(Vec::new, |v| read_attributes(&id, v));
    ctx.entities.push(Entity {
        id,
        name,
        attributes,
    });
}

/// Attributes as `[{name, type}]`, `["name: type"]` or `{name: type}`.
fn read_attributes(entity: &str, value: &Value) -> Vec<Attribute> {
    let attribute = |name: &str, data_type: Option<&str>| -> Option<Attribute> {
        let name = name.trim();
        (!name.is_empty()).then(|| Attribute {
            name: name.to_string(),
            data_type: data_type
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_ATTRIBUTE_TYPE)
                .to_string(),
        })
    };

    let parsed: Vec<Option<Attribute>> = match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(obj) => {
                    let name = field(obj, &["name"]).and_then(Value::as_str)?;
                    let data_type = field(obj, &["type", "data_type"]).and_then(Value::as_str);
                    attribute(name, data_type)
                }
                Value::String(s) => match s.split_once(':') {
                    Some((name, data_type)) => attribute(name, Some(data_type)),
                    None => attribute(s.as_str(), None),
                },
                _ => None,
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(name, data_type)| attribute(name.as_str(), data_type.as_str()))
            .collect(),
        _ => vec![None],
    };

    let skipped = parsed.iter().filter(|a| a.is_none()).count();
    if skipped > 0 {
        tracing::debug!(entity, skipped, "skipping unreadable attributes");
    }
    parsed.into_iter().flatten().collect()
}

fn read_relationship(item: &Value, pos: usize, ctx: &mut Context) {
    let Some(record) = item.as_object() else {
        ctx.violation(RecordKind::Relationship, pos, None, "expected an object");
        return;
    };
    let known: Vec<&str> = [REL_ID, REL_FROM, REL_TO, REL_CARDINALITY, REL_LABEL].concat();
    for key in unknown_keys(record, &known) {
        tracing::debug!(relationship = pos, field = key, "dropping unknown relationship field");
    }

    let id = field(record, REL_ID)
        .and_then(id_value)
        .unwrap_or_else(|| ids::relationship_id(pos));

    let Some(from_entity_id) = field(record, REL_FROM).and_then(id_value) else {
        ctx.violation(RecordKind::Relationship, pos, Some(id.as_str()), "missing source entity");
        return;
    };
    let Some(to_entity_id) = field(record, REL_TO).and_then(id_value) else {
        ctx.violation(RecordKind::Relationship, pos, Some(id.as_str()), "missing target entity");
        return;
    };
    let raw_cardinality = field(record, REL_CARDINALITY).and_then(Value::as_str);
    let Some(cardinality) = raw_cardinality.and_then(Cardinality::parse) else {
        let message = raw_cardinality.map_or_else(
            || "missing cardinality".to_string(),
            |c| format!("unknown cardinality '{c}'"),
        );
        ctx.violation(RecordKind::Relationship, pos, Some(id.as_str()), message);
        return;
    };

    if ctx.relationships.iter().any(|r| r.id == id) {
        ctx.violation(RecordKind::Relationship, pos, Some(id.as_str()), "duplicate id");
        return;
    }

    ctx.relationships.push(Relationship {
        id,
        from_entity_id,
        to_entity_id,
        cardinality,
        label: field(record, REL_LABEL).and_then(text_value).unwrap_or_default(),
    });
}

fn read_endpoint(item: &Value, pos: usize, ctx: &mut Context) {
    let Some(record) = item.as_object() else {
        ctx.violation(RecordKind::Endpoint, pos, None, "expected an object");
        return;
    };
    let known: Vec<&str> = [EP_METHOD, EP_PATH, EP_DESCRIPTION, EP_ESTIMATE].concat();
    for key in unknown_keys(record, &known) {
        tracing::debug!(endpoint = pos, field = key, "dropping unknown endpoint field");
    }

    let Some(path) = field(record, EP_PATH).and_then(text_value) else {
        ctx.violation(RecordKind::Endpoint, pos, None, "missing path");
        return;
    };
    let raw_method = field(record, EP_METHOD).and_then(Value::as_str);
    let Some(method) = raw_method.and_then(HttpMethod::parse) else {
        let message = raw_method.map_or_else(
            || "missing method".to_string(),
            |m| format!("unsupported method '{m}'"),
        );
        ctx.violation(RecordKind::Endpoint, pos, Some(path.as_str()), message);
        return;
    };

    let raw_estimate = field(record, EP_ESTIMATE);
    let estimate_hours = match coerce::estimate(raw_estimate) {
        Estimate::Valid(hours) => hours,
        Estimate::Absent => Hours::ZERO,
        Estimate::Malformed => {
            ctx.malformed_estimate(RecordKind::Endpoint, &format!("{method} {path}"), raw_estimate);
            Hours::ZERO
        }
    };

    ctx.endpoints.push(Endpoint {
        method,
        path,
        description: field(record, EP_DESCRIPTION)
            .and_then(text_value)
            .unwrap_or_default(),
        estimate_hours,
    });
}

fn read_risk(item: &Value, pos: usize, ctx: &mut Context) {
    let risk = match item {
        Value::String(_) => text_value(item).map(|d| Risk::new(RiskKind::Reported, Severity::Medium, d)),
        Value::Object(record) => field(record, RISK_DESCRIPTION).and_then(text_value).map(|d| {
            let severity = field(record, RISK_SEVERITY)
                .and_then(Value::as_str)
                .and_then(Severity::parse)
                .unwrap_or(Severity::Medium);
            let kind = field(record, RISK_KIND)
                .and_then(Value::as_str)
                .and_then(RiskKind::parse)
                .unwrap_or(RiskKind::Reported);
            Risk::new(kind, severity, d)
        }),
        _ => None,
    };

    match risk {
        Some(risk) => ctx.reported_risks.push(risk),
        None => ctx.violation(RecordKind::Risk, pos, None, "missing description"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn validate(value: Value) -> Validation {
        PayloadValidator::new()
            .validate(&RawPayload::new(value))
            .expect("envelope should pass")
    }

    #[test]
    fn reads_login_payload() {
        let v = validate(json!({
            "tasks": [
                {"id": 1, "title": "Login", "parent": null},
                {"id": 2, "title": "Validate credentials", "parent": 1, "hours": 6},
                {"id": 3, "title": "Issue session token", "parent": 1, "hours": 4}
            ]
        }));
        assert!(v.is_clean());
        let ids: Vec<_> = v.payload.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(v.payload.tasks[1].parent_id.as_deref(), Some("1"));
        assert_eq!(v.payload.tasks[1].estimate_hours, Some(Hours::from_whole(6)));
        assert_eq!(v.payload.tasks[0].estimate_hours, None);
    }

    #[test]
    fn negative_estimate_becomes_low_risk() {
        let v = validate(json!({
            "tasks": [{"id": "a", "title": "A", "estimate_hours": -5}]
        }));
        assert!(v.is_clean());
        assert_eq!(v.payload.tasks[0].estimate_hours, None);
        assert_eq!(v.payload.risks.len(), 1);
        assert_eq!(v.payload.risks[0].kind, RiskKind::MalformedField);
        assert_eq!(v.payload.risks[0].severity, Severity::Low);
        assert!(v.payload.risks[0].description.contains("-5"));
    }

    #[test]
    fn unknown_parent_drops_task_and_descendants() {
        let v = validate(json!({
            "tasks": [
                {"id": "1", "title": "Root"},
                {"id": "2", "title": "Orphan", "parent_id": "9"},
                {"id": "3", "title": "Grandchild", "parent_id": "2"}
            ]
        }));
        let ids: Vec<_> = v.payload.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
        assert_eq!(v.violations.len(), 2);
        assert_eq!(v.violations[0].message, "parent '9' does not exist");
        assert_eq!(v.violations[1].message, "parent '2' was dropped");
        assert_eq!(
            v.violations[0].to_string(),
            "task #2 ('2'): parent '9' does not exist"
        );
    }

    #[test]
    fn duplicate_ids_are_violations() {
        let v = validate(json!({
            "tasks": [
                {"id": "1", "title": "First"},
                {"id": "1", "title": "Second"}
            ],
            "entities": [
                {"name": "User"},
                {"id": "User", "name": "Account"}
            ]
        }));
        assert_eq!(v.payload.tasks.len(), 1);
        assert_eq!(v.payload.tasks[0].title, "First");
        assert_eq!(v.payload.entities.len(), 1);
        let kinds: Vec<_> = v.violations.iter().map(|v| v.kind).collect();
        assert_eq!(kinds, vec![RecordKind::Task, RecordKind::Entity]);
    }

    #[test]
    fn nested_subtasks_are_flattened_in_pre_order() {
        let v = validate(json!({
            "task_breakdown": [{
                "task_id": "1",
                "task_name": "Auth",
                "subtasks": [
                    {"task_id": "1.1", "task_name": "Form", "time_estimate": "2-4 hours"},
                    {"task_id": "1.2", "task_name": "API", "subtasks": [
                        {"task_id": "1.2.1", "task_name": "Route", "time_estimate": "1 day"}
                    ]}
                ]
            }]
        }));
        assert!(v.is_clean());
        let pairs: Vec<_> = v
            .payload
            .tasks
            .iter()
            .map(|t| (t.id.as_str(), t.parent_id.as_deref()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("1", None),
                ("1.1", Some("1")),
                ("1.2", Some("1")),
                ("1.2.1", Some("1.2"))
            ]
        );
        assert_eq!(v.payload.tasks[1].estimate_hours, Some(Hours::from_whole(3)));
        assert_eq!(v.payload.tasks[3].estimate_hours, Some(Hours::from_whole(8)));
    }

    #[test]
    fn subtasks_of_dropped_task_are_dropped() {
        let v = validate(json!({
            "tasks": [{"id": "1", "subtasks": [{"id": "2", "title": "Child"}]}]
        }));
        assert!(v.payload.tasks.is_empty());
        let messages: Vec<_> = v.violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(messages, vec!["missing title", "parent record was dropped"]);
    }

    #[test]
    fn entity_attributes_in_every_shape() {
        let v = validate(json!({
            "erd_analysis": [
                {"entity_name": "User", "attributes": {"email": "string", "id": "uuid"}},
                {"id": "session", "attributes": [{"name": "token", "type": "string"}, "expires_at: datetime", "user_id"]}
            ]
        }));
        assert!(v.is_clean());
        let user = &v.payload.entities[0];
        assert_eq!((user.id.as_str(), user.name.as_str()), ("User", "User"));
        assert_eq!(user.attributes.len(), 2);
        let session = &v.payload.entities[1];
        assert_eq!(session.name, "session");
        let attrs: Vec<_> = session
            .attributes
            .iter()
            .map(|a| (a.name.as_str(), a.data_type.as_str()))
            .collect();
        assert_eq!(
            attrs,
            vec![
                ("token", "string"),
                ("expires_at", "datetime"),
                ("user_id", "string")
            ]
        );
    }

    #[test]
    fn relationships_get_synthesized_ids() {
        let v = validate(json!({
            "relationships": [
                {"from": "user", "to": "session", "cardinality": "1:N", "label": "owns"},
                {"id": "custom", "from_entity_id": "user", "to_entity_id": "role", "cardinality": "many-to-many"},
                {"from": "user", "to": "x", "cardinality": "sometimes"}
            ]
        }));
        let ids: Vec<_> = v.payload.relationships.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rel-1", "custom"]);
        assert_eq!(v.payload.relationships[0].cardinality, Cardinality::OneToMany);
        assert_eq!(v.payload.relationships[1].label, "");
        assert_eq!(v.violations.len(), 1);
        assert_eq!(v.violations[0].message, "unknown cardinality 'sometimes'");
    }

    #[test]
    fn endpoints_accept_original_field_names() {
        let v = validate(json!({
            "api_analysis": [
                {"endpoint": "/api/login", "method": "post", "purpose": "Sign in"},
                {"endpoint": "/api/x", "method": "TRACE"},
                {"method": "GET"}
            ]
        }));
        assert_eq!(v.payload.endpoints.len(), 1);
        let ep = &v.payload.endpoints[0];
        assert_eq!(ep.method, HttpMethod::Post);
        assert_eq!(ep.description, "Sign in");
        assert_eq!(ep.estimate_hours, Hours::ZERO);
        assert_eq!(v.violations.len(), 2);
    }

    #[test]
    fn plain_string_risks_are_medium() {
        let v = validate(json!({
            "risks_and_considerations": ["Password reset abuse", {"description": "Brute force", "severity": "HIGH"}, {}],
            "suggested_questions": ["Is SSO needed?", 3, null]
        }));
        assert_eq!(v.payload.risks[0].severity, Severity::Medium);
        assert_eq!(v.payload.risks[0].kind, RiskKind::Reported);
        assert_eq!(v.payload.risks[1].severity, Severity::High);
        assert_eq!(v.violations.len(), 1);
        assert_eq!(v.payload.suggested_questions, vec!["Is SSO needed?", "3"]);
    }

    #[test]
    fn wrongly_shaped_plain_fields_are_dropped_as_low_risks() {
        let v = validate(json!({
            "summary": 42,
            "suggested_questions": "Is SSO needed?",
            "tasks": [{"id": "1", "title": "Login", "hours": 3}]
        }));
        assert!(v.is_clean());
        assert_eq!(v.payload.summary, None);
        assert!(v.payload.suggested_questions.is_empty());
        assert_eq!(v.payload.tasks.len(), 1);
        let kinds: Vec<_> = v.payload.risks.iter().map(|r| (r.kind, r.severity)).collect();
        assert_eq!(
            kinds,
            vec![(RiskKind::MalformedField, Severity::Low); 2]
        );
        assert!(v.payload.risks[0].description.contains("'summary' is 42"));
        assert!(v.payload.risks[1].description.contains("'suggested_questions'"));
    }

    #[test]
    fn non_object_records_are_violations() {
        let v = validate(json!({"tasks": ["Login", 3], "entities": [true]}));
        assert_eq!(v.violations.len(), 3);
        assert!(v.violations.iter().all(|v| v.message == "expected an object"));
    }

    #[test]
    fn unparsable_payload_fails() {
        let validator = PayloadValidator::new();
        assert!(validator.validate(&RawPayload::new(json!([1, 2]))).is_err());
        assert!(validator.validate(&RawPayload::new(json!({"tasks": 5}))).is_err());
    }

    #[test]
    fn violation_becomes_record_dropped_risk() {
        let violation = Violation::new(RecordKind::Entity, 3, Some("user"), "duplicate id");
        let risk = violation.to_risk();
        assert_eq!(risk.kind, RiskKind::RecordDropped);
        assert_eq!(risk.description, "Dropped entity #3 ('user'): duplicate id");
    }
}
