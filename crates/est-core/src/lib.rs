//! # est-core
//!
//! Core types, ID generation, and error types for the estimation engine.
//!
//! This crate provides the foundational types shared across all `est-*` crates:
//! - Entity structs for the report data model (requirements, tasks, entities,
//!   relationships, endpoints, risks, reports, similarity records)
//! - Enums with string forms, including the pipeline state machine
//! - Exact hour arithmetic ([`hours::Hours`])
//! - ID prefix constants and content-derived requirement IDs
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod hours;
pub mod ids;
