//! Event-sourcing persistence over a tagged, append-only event log
//!
//! This crate is the translation layer between an event-sourced aggregate
//! model and a generic log service that understands nothing but opaque
//! tagged events, positions, and conditional appends. It encodes aggregate
//! identity and version into tags, enforces per-aggregate version ordering
//! through the log's conditional-append primitive (no per-aggregate
//! sequence counters, no locks), and decodes the flat global stream back
//! into per-aggregate event streams and a topic-filterable notification
//! feed.
//!
//! # Architecture
//!
//! ```text
//! Domain layer → StoredEvent ─┐
//!                             ├─ TagLogRecorder ── TagLog (external service)
//! Feed consumers ← Notification ─┘       │
//!                                    tag codec
//! ```
//!
//! The log service is an external collaborator reached through the
//! [`TagLog`] trait; this crate ships no storage engine. Under concurrent
//! writers racing over the same aggregate version, the log's conditional
//! append guarantees at-most-one-writer-wins: exactly one batch lands, the
//! other fails with [`RecorderError::Conflict`] and leaves nothing behind.
//! Retrying with a freshly read version is the caller's responsibility.

pub mod errors;
pub mod factory;
pub mod log;
pub mod recorder;
pub mod tags;

// Re-export commonly used types
pub use errors::{RecorderError, RecorderResult};
pub use factory::{Capability, Factory, RecorderPurpose, TAGLOG_URI};
pub use log::{
    AppendCondition, LogEvent, Query, QueryItem, ReadOptions, SequencedEvent, TagLog, TagLogConnect,
};
pub use recorder::{
    AggregateRecorder, ApplicationRecorder, Notification, StoredEvent, TagLogRecorder,
};
pub use tags::OriginatorId;
