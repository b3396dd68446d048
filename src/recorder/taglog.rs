//! Tagged-log recorder implementation
//!
//! This is the translation layer between the aggregate model and the
//! generic log: it encodes per-aggregate identity and version into tags,
//! turns a batch of domain events into a single conditional append, and
//! decodes the flat, globally ordered log back into per-aggregate streams
//! and the notification feed.
//!
//! Version ordering across batches is enforced entirely by the log's
//! conditional append: every event in a batch contributes a rejection
//! clause matching its own tags, so a second writer racing over the same
//! (identity, version) finds the first writer's event already in the log
//! and loses the whole batch. The recorder itself holds no locks and no
//! mutable state beyond the shared log handle.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::errors::{RecorderError, RecorderResult};
use crate::log::{AppendCondition, LogEvent, Query, QueryItem, ReadOptions, TagLog};
use crate::recorder::{AggregateRecorder, ApplicationRecorder, Notification, StoredEvent};
use crate::tags::{
    decode_originator_id, decode_originator_version, encode_originator_id,
    encode_originator_version, OriginatorId,
};

/// Recorder for event-sourced aggregates backed by a tagged event log
///
/// One instance implements both the [`AggregateRecorder`] and
/// [`ApplicationRecorder`] capabilities against the same log handle. The
/// handle is immutable and shared; instances may be used concurrently from
/// multiple tasks without additional synchronization.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use eventsourcing_taglog::{AggregateRecorder, StoredEvent, TagLogRecorder};
/// # use eventsourcing_taglog::RecorderResult;
/// # async fn demo<L: eventsourcing_taglog::TagLog>(log: Arc<L>) -> RecorderResult<()> {
/// let recorder = TagLogRecorder::new(log);
/// let positions = recorder
///     .insert_events(vec![StoredEvent {
///         originator_id: uuid::Uuid::new_v4().into(),
///         originator_version: 0,
///         topic: "example.opened".to_string(),
///         state: b"{}".to_vec(),
///     }])
///     .await?;
/// assert_eq!(positions.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct TagLogRecorder<L> {
    /// Shared handle to the log service
    log: Arc<L>,
}

impl<L> Clone for TagLogRecorder<L> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
        }
    }
}

impl<L: TagLog> TagLogRecorder<L> {
    /// Create a recorder over an already-connected log handle
    pub fn new(log: Arc<L>) -> Self {
        Self { log }
    }

    /// Get the underlying log handle for advanced operations
    pub fn log(&self) -> &L {
        &self.log
    }
}

/// Verify that versions are strictly contiguous per identity within the
/// batch
///
/// The first event seen for an identity sets the baseline; every later
/// event for that identity must carry exactly the next version. Consistency
/// of the baseline with the aggregate's persisted history is left to the
/// log's conflict detection.
fn check_batch_contiguity(stored_events: &[StoredEvent]) -> RecorderResult<()> {
    let mut last_versions: HashMap<&OriginatorId, u64> = HashMap::new();
    for stored_event in stored_events {
        if let Some(last) = last_versions.get(&stored_event.originator_id) {
            if Some(stored_event.originator_version) != last.checked_add(1) {
                return Err(RecorderError::Validation(format!(
                    "version {} for originator {} does not follow version {last}",
                    stored_event.originator_version, stored_event.originator_id,
                )));
            }
        }
        last_versions.insert(&stored_event.originator_id, stored_event.originator_version);
    }
    Ok(())
}

/// Recover the positions of a whole batch from the last assigned position
///
/// Valid because the log places an accepted batch at contiguous positions.
fn batch_positions(last_position: u64, batch_len: usize) -> RecorderResult<Vec<u64>> {
    let first = (last_position + 1)
        .checked_sub(batch_len as u64)
        .ok_or_else(|| {
            RecorderError::Log(format!(
                "log assigned position {last_position} to a batch of {batch_len}"
            ))
        })?;
    Ok((first..=last_position).collect())
}

/// Encode a stored event into its log representation with a fresh event id
fn encode_log_event(stored_event: StoredEvent) -> LogEvent {
    let originator_id_tag = encode_originator_id(&stored_event.originator_id);
    let originator_version_tag =
        encode_originator_version(&stored_event.originator_id, stored_event.originator_version);
    LogEvent {
        event_id: Uuid::new_v4(),
        event_type: stored_event.topic,
        data: stored_event.state,
        tags: vec![originator_id_tag, originator_version_tag],
    }
}

#[async_trait]
impl<L: TagLog> AggregateRecorder for TagLogRecorder<L> {
    async fn insert_events(&self, stored_events: Vec<StoredEvent>) -> RecorderResult<Vec<u64>> {
        if stored_events.is_empty() {
            return Ok(Vec::new());
        }
        check_batch_contiguity(&stored_events)?;

        let batch_len = stored_events.len();
        let log_events: Vec<LogEvent> = stored_events.into_iter().map(encode_log_event).collect();

        // One rejection clause per event: a racing writer that already
        // stored any of these (identity, version) pairs fails the batch.
        let condition = AppendCondition::fail_if_events_match(Query::new(
            log_events
                .iter()
                .map(|log_event| QueryItem::with_tags(log_event.tags.clone()))
                .collect(),
        ));

        let last_position = self.log.append(log_events, Some(condition)).await?;
        let positions = batch_positions(last_position, batch_len)?;
        debug!(batch_len, last_position, "appended event batch");
        Ok(positions)
    }

    async fn select_events(
        &self,
        originator_id: &OriginatorId,
        gt: Option<u64>,
        lte: Option<u64>,
        desc: bool,
        limit: Option<usize>,
    ) -> RecorderResult<Vec<StoredEvent>> {
        let query = Query::new(vec![QueryItem::with_tags(vec![encode_originator_id(
            originator_id,
        )])]);
        let sequenced_events = self
            .log
            .read(query, ReadOptions::forward().backwards(desc))
            .await?;

        // The log filters by identity tag only; version bounds and limit
        // are applied here, stopping early once the read direction can no
        // longer satisfy the bound.
        let mut stored_events = Vec::new();
        for sequenced_event in sequenced_events {
            if limit == Some(stored_events.len()) {
                break;
            }
            let extracted_originator_id = decode_originator_id(&sequenced_event.event)?;
            let extracted_originator_version = decode_originator_version(&sequenced_event.event)?;
            if let Some(gt) = gt {
                if extracted_originator_version <= gt {
                    if desc {
                        break;
                    }
                    continue;
                }
            }
            if let Some(lte) = lte {
                if extracted_originator_version > lte {
                    if !desc {
                        break;
                    }
                    continue;
                }
            }
            stored_events.push(StoredEvent {
                originator_id: extracted_originator_id,
                originator_version: extracted_originator_version,
                topic: sequenced_event.event.event_type,
                state: sequenced_event.event.data,
            });
        }
        debug!(
            originator_id = %originator_id,
            count = stored_events.len(),
            desc,
            "selected aggregate events"
        );
        Ok(stored_events)
    }
}

#[async_trait]
impl<L: TagLog> ApplicationRecorder for TagLogRecorder<L> {
    async fn max_notification_id(&self) -> RecorderResult<Option<u64>> {
        self.log.head().await
    }

    async fn select_notifications(
        &self,
        start: Option<u64>,
        limit: usize,
        stop: Option<u64>,
        topics: &[String],
        inclusive_of_start: bool,
    ) -> RecorderResult<Vec<Notification>> {
        let effective_start = match start {
            Some(start) if !inclusive_of_start => Some(start.saturating_add(1)),
            other => other,
        };

        let query = Query::new(vec![QueryItem::with_types(topics.to_vec())]);
        let mut options = ReadOptions::forward().limit(limit);
        if let Some(effective_start) = effective_start {
            options = options.start(effective_start);
        }
        let sequenced_events = self.log.read(query, options).await?;

        let mut notifications = Vec::new();
        for sequenced_event in sequenced_events {
            let position = sequenced_event.position;
            notifications.push(Notification {
                id: position,
                originator_id: decode_originator_id(&sequenced_event.event)?,
                originator_version: decode_originator_version(&sequenced_event.event)?,
                topic: sequenced_event.event.event_type,
                state: sequenced_event.event.data,
            });
            // Inclusive stop boundary: the first notification at or past
            // `stop` is included, then the slice ends.
            if stop.is_some_and(|stop| stop <= position) {
                break;
            }
        }
        debug!(count = notifications.len(), "selected notifications");
        Ok(notifications)
    }
}
