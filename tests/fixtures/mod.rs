//! Shared test fixtures
//!
//! [`MemoryTagLog`] is an in-process implementation of the [`TagLog`]
//! contract, just enough log to exercise the recorders: a single vector of
//! events behind an async mutex, positions assigned densely from 1, and the
//! append condition evaluated and the batch placed under one lock
//! acquisition so conditional appends are atomic with respect to each
//! other.

use async_trait::async_trait;
use tokio::sync::Mutex;

use eventsourcing_taglog::{
    AppendCondition, LogEvent, Query, QueryItem, ReadOptions, RecorderError, RecorderResult,
    SequencedEvent, TagLog, TagLogConnect,
};

/// In-memory tagged event log for tests
#[derive(Default)]
pub struct MemoryTagLog {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryTagLog {
    pub fn new() -> Self {
        Self::default()
    }
}

fn item_matches(item: &QueryItem, event: &LogEvent) -> bool {
    let type_ok = item.types.is_empty() || item.types.contains(&event.event_type);
    let tags_ok = item.tags.iter().all(|tag| event.tags.contains(tag));
    type_ok && tags_ok
}

/// Disjunction over clauses; a query with no clauses matches nothing, so an
/// empty rejection condition never conflicts
fn any_item_matches(query: &Query, event: &LogEvent) -> bool {
    query.items.iter().any(|item| item_matches(item, event))
}

/// Read-side matching; a query with no clauses matches everything
fn read_matches(query: &Query, event: &LogEvent) -> bool {
    query.items.is_empty() || any_item_matches(query, event)
}

#[async_trait]
impl TagLog for MemoryTagLog {
    async fn append(
        &self,
        events: Vec<LogEvent>,
        condition: Option<AppendCondition>,
    ) -> RecorderResult<u64> {
        let mut stored = self.events.lock().await;
        if let Some(condition) = condition {
            let conflict = stored.iter().enumerate().any(|(index, event)| {
                let position = index as u64 + 1;
                condition.after.map_or(true, |after| position > after)
                    && any_item_matches(&condition.fail_if_events_match, event)
            });
            if conflict {
                return Err(RecorderError::Conflict(
                    "an existing event matches the rejection condition".to_string(),
                ));
            }
        }
        stored.extend(events);
        Ok(stored.len() as u64)
    }

    async fn read(
        &self,
        query: Query,
        options: ReadOptions,
    ) -> RecorderResult<Vec<SequencedEvent>> {
        let stored = self.events.lock().await;
        let mut matching: Vec<SequencedEvent> = stored
            .iter()
            .enumerate()
            .map(|(index, event)| SequencedEvent {
                position: index as u64 + 1,
                event: event.clone(),
            })
            .filter(|sequenced| read_matches(&query, &sequenced.event))
            .filter(|sequenced| match options.start {
                Some(start) if options.backwards => sequenced.position <= start,
                Some(start) => sequenced.position >= start,
                None => true,
            })
            .collect();
        if options.backwards {
            matching.reverse();
        }
        if let Some(limit) = options.limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }

    async fn head(&self) -> RecorderResult<Option<u64>> {
        let stored = self.events.lock().await;
        Ok((!stored.is_empty()).then(|| stored.len() as u64))
    }
}

#[async_trait]
impl TagLogConnect for MemoryTagLog {
    async fn connect(uri: &str) -> RecorderResult<Self> {
        if uri.is_empty() {
            return Err(RecorderError::Configuration(
                "empty log service uri".to_string(),
            ));
        }
        Ok(Self::new())
    }
}
