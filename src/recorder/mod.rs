//! Recorder capabilities
//!
//! This module defines the domain-facing side of the adapter: the event and
//! notification records exchanged with the domain layer, and the two
//! capability traits a persistence adapter can offer.
//!
//! # Architecture
//!
//! ```text
//! Domain layer → StoredEvent → AggregateRecorder ─┐
//!                                                 ├─→ tagged event log
//! Feed consumers ← Notification ← ApplicationRecorder ─┘
//! ```
//!
//! The capabilities are deliberately independent traits rather than an
//! inheritance ladder: an aggregate recorder appends and reads by identity,
//! an application recorder reads the global feed by position. One concrete
//! adapter, [`TagLogRecorder`], implements both against the same log handle.
//! Capabilities this crate does not offer at all (snapshots, tracking,
//! subscriptions) are answered at construction time by the
//! [factory](crate::factory), not deep inside a shared method.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::RecorderResult;
use crate::tags::OriginatorId;

pub mod taglog;

pub use taglog::TagLogRecorder;

/// One domain event belonging to exactly one aggregate at exactly one
/// version
///
/// Produced by the domain layer for writing and reconstructed by the
/// adapter when reading. Immutable once created; the log is the sole system
/// of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Identity of the owning aggregate
    pub originator_id: OriginatorId,

    /// Version of the aggregate at this event
    pub originator_version: u64,

    /// Domain topic of the event
    pub topic: String,

    /// Serialized event state
    pub state: Vec<u8>,
}

/// Externally visible projection of a logged event for global-feed
/// consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification id; equal to the event's global log position
    pub id: u64,

    /// Identity of the owning aggregate
    pub originator_id: OriginatorId,

    /// Version of the aggregate at this event
    pub originator_version: u64,

    /// Domain topic of the event
    pub topic: String,

    /// Serialized event state
    pub state: Vec<u8>,
}

/// Per-aggregate append and read capability
#[async_trait]
pub trait AggregateRecorder: Send + Sync {
    /// Insert a batch of stored events with optimistic concurrency control
    ///
    /// Versions for each aggregate identity must be strictly contiguous
    /// within the batch; a gap or duplicate fails with
    /// [`RecorderError::Validation`](crate::RecorderError::Validation)
    /// before any I/O. A version already present in the log for the same
    /// identity fails the whole batch with
    /// [`RecorderError::Conflict`](crate::RecorderError::Conflict) and
    /// leaves no partial write behind. An empty batch is a no-op.
    ///
    /// Returns the global positions assigned to the batch, one per event,
    /// consecutive and increasing.
    async fn insert_events(&self, stored_events: Vec<StoredEvent>) -> RecorderResult<Vec<u64>>;

    /// Read the events of one aggregate
    ///
    /// Events are returned in ascending version order, or descending when
    /// `desc` is set. `gt` and `lte` bound the versions returned (open
    /// below, closed above) and `limit` caps the number of results. The
    /// bounds are applied by the adapter over the aggregate's full history
    /// as returned by the log, so cost scales with history length rather
    /// than with the requested window.
    async fn select_events(
        &self,
        originator_id: &OriginatorId,
        gt: Option<u64>,
        lte: Option<u64>,
        desc: bool,
        limit: Option<usize>,
    ) -> RecorderResult<Vec<StoredEvent>>;
}

/// Global notification-feed read capability
#[async_trait]
pub trait ApplicationRecorder: Send + Sync {
    /// Current global high-water mark, or `None` if the log is empty
    async fn max_notification_id(&self) -> RecorderResult<Option<u64>>;

    /// Read a slice of the global notification feed
    ///
    /// Returns at most `limit` notifications with ids at or after `start`
    /// (strictly after when `inclusive_of_start` is false), in ascending id
    /// order, restricted to the given `topics` (empty = no filter). When
    /// `stop` is given, the result is truncated after including the first
    /// notification whose id reaches it, even if `limit` is not exhausted.
    async fn select_notifications(
        &self,
        start: Option<u64>,
        limit: usize,
        stop: Option<u64>,
        topics: &[String],
        inclusive_of_start: bool,
    ) -> RecorderResult<Vec<Notification>>;
}
