//! Tagged event log contract
//!
//! This module defines the interface boundary between the recorders and the
//! external log service. The log is a generic, domain-agnostic, append-only
//! store of tagged events with three operations:
//!
//! - **append**: atomically place an ordered batch of events at the tail,
//!   unless a rejection query matches an event already in the log
//! - **read**: return events matching a query, ordered by position
//! - **head**: report the most recently assigned position
//!
//! The log assigns a dense, monotonically increasing position to every
//! accepted event and places the events of one batch at contiguous
//! positions. Tags are opaque strings to the log; the meaning of the two
//! tags this crate attaches is defined in [`crate::tags`].
//!
//! No implementation ships with this crate. The storage engine behind the
//! contract (durability, replication, indexing) is a separate system; tests
//! provide an in-process stand-in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::RecorderResult;

/// The generic unit stored by the log
///
/// `tags[0]` always encodes the owning aggregate's identity and `tags[1]`
/// that aggregate's version at this event. The ordering of the two tags is
/// a protocol invariant, not incidental.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Unique event id, assigned by the writer
    pub event_id: Uuid,

    /// Event type name (the domain topic, passed through unchanged)
    pub event_type: String,

    /// Opaque event payload
    pub data: Vec<u8>,

    /// Opaque filter strings attached to the event
    pub tags: Vec<String>,
}

/// A [`LogEvent`] together with its globally assigned position
///
/// Positions are assigned by the log at append time, start at 1, and are
/// never reused or reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedEvent {
    /// Global position of the event in the log
    pub position: u64,

    /// The stored event
    pub event: LogEvent,
}

/// One clause of a [`Query`]
///
/// An item matches an event when the event's type is in `types` (or `types`
/// is empty) and the event carries every tag in `tags`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryItem {
    /// Required event types; empty means any type
    pub types: Vec<String>,

    /// Required tags; the event must carry all of them
    pub tags: Vec<String>,
}

impl QueryItem {
    /// Clause matching events that carry all of the given tags
    pub fn with_tags(tags: Vec<String>) -> Self {
        Self {
            types: Vec::new(),
            tags,
        }
    }

    /// Clause matching events whose type is one of the given types
    pub fn with_types(types: Vec<String>) -> Self {
        Self {
            types,
            tags: Vec::new(),
        }
    }
}

/// A disjunction of [`QueryItem`] clauses
///
/// A query matches an event when any of its items does. A query with no
/// items matches every event on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// The clauses; matching any one is a match
    pub items: Vec<QueryItem>,
}

impl Query {
    /// Build a query from clauses
    pub fn new(items: Vec<QueryItem>) -> Self {
        Self { items }
    }
}

/// Rejection condition for a conditional append
///
/// The append is rejected as a whole if any event already in the log matches
/// `fail_if_events_match`. When `after` is set, only events at positions
/// greater than it are considered by the conflict scan; the recorders in
/// this crate always scan the full log (`after: None`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendCondition {
    /// Reject the batch if any existing event matches this query
    pub fail_if_events_match: Query,

    /// Restrict the conflict scan to positions greater than this
    pub after: Option<u64>,
}

impl AppendCondition {
    /// Condition scanning the whole log for matches of `query`
    pub fn fail_if_events_match(query: Query) -> Self {
        Self {
            fail_if_events_match: query,
            after: None,
        }
    }
}

/// Options for a positional read of the log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// First position to return (inclusive); `None` reads from the start
    /// (or from the tail when reading backwards)
    pub start: Option<u64>,

    /// Maximum number of events to return
    pub limit: Option<usize>,

    /// Read in descending position order
    pub backwards: bool,
}

impl ReadOptions {
    /// Options for an unbounded forward read
    pub fn forward() -> Self {
        Self::default()
    }

    /// Set the starting position (inclusive)
    pub fn start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the maximum number of events to return
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Read in descending position order
    pub fn backwards(mut self, backwards: bool) -> Self {
        self.backwards = backwards;
        self
    }
}

/// Client contract for the tagged event log service
///
/// Implementations must serialize conflicting conditional appends so that at
/// most one writer in a race over the same tags succeeds, and must place the
/// events of one accepted batch at contiguous positions with no interleaved
/// foreign events. Reads observe a snapshot of the log at the time of the
/// call and never block writers.
///
/// Implementations are expected to be usable concurrently from multiple
/// tasks through a shared reference; the recorders hold no locks of their
/// own.
#[async_trait]
pub trait TagLog: Send + Sync {
    /// Append a batch of events, rejecting it if `condition` is violated
    ///
    /// On acceptance, returns the position assigned to the last event of the
    /// batch; the positions of the whole batch are the contiguous run ending
    /// there. On a condition match, fails with
    /// [`RecorderError::Conflict`](crate::RecorderError::Conflict) and has
    /// no effect.
    async fn append(
        &self,
        events: Vec<LogEvent>,
        condition: Option<AppendCondition>,
    ) -> RecorderResult<u64>;

    /// Read events matching `query`, ordered by position
    async fn read(&self, query: Query, options: ReadOptions)
        -> RecorderResult<Vec<SequencedEvent>>;

    /// Position of the most recently accepted event, or `None` if the log
    /// holds nothing
    async fn head(&self) -> RecorderResult<Option<u64>>;
}

/// Construction of a [`TagLog`] client from a connection URI
///
/// Split from [`TagLog`] so that recorders can be written against
/// already-connected handles while the factory stays generic over how a
/// connection is established.
#[async_trait]
pub trait TagLogConnect: TagLog + Sized {
    /// Connect to the log service at `uri`
    async fn connect(uri: &str) -> RecorderResult<Self>;
}
