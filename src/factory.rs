//! Recorder construction and configuration
//!
//! The factory owns the single connection to the log service and hands out
//! recorders that share it. The connection URI is the only required
//! configuration; it is read from the `TAGLOG_URI` environment variable (or
//! passed directly), and its absence is a fatal configuration error raised
//! before any recorder is built.
//!
//! # Example
//!
//! ```rust,no_run
//! use eventsourcing_taglog::{Factory, RecorderPurpose, TagLogConnect};
//!
//! # async fn demo<L: TagLogConnect + 'static>() -> eventsourcing_taglog::RecorderResult<()> {
//! let factory: Factory<L> = Factory::from_env().await?;
//! let events = factory.aggregate_recorder(RecorderPurpose::Events)?;
//! let feed = factory.application_recorder();
//! # Ok(())
//! # }
//! ```

use std::env;
use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::errors::{RecorderError, RecorderResult};
use crate::log::{TagLog, TagLogConnect};
use crate::recorder::TagLogRecorder;

/// Environment variable naming the log service URI
pub const TAGLOG_URI: &str = "TAGLOG_URI";

/// What an aggregate recorder is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderPurpose {
    /// Recording aggregate events
    Events,
    /// Recording aggregate snapshots (not offered by this adapter)
    Snapshots,
}

/// Capabilities a persistence adapter may offer
///
/// Callers can probe [`Factory::offers`] instead of discovering an
/// unsupported capability through a runtime failure deep inside an
/// operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Per-aggregate event append and read
    AggregateEvents,
    /// Aggregate snapshot storage
    Snapshots,
    /// Global notification feed reads
    Notifications,
    /// Cross-process tracking records
    Tracking,
    /// Process-level recording (events + tracking in one transaction)
    ProcessRecording,
    /// Push-based notification subscriptions
    Subscriptions,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::AggregateEvents => write!(f, "aggregate events"),
            Capability::Snapshots => write!(f, "snapshots"),
            Capability::Notifications => write!(f, "notifications"),
            Capability::Tracking => write!(f, "tracking"),
            Capability::ProcessRecording => write!(f, "process recording"),
            Capability::Subscriptions => write!(f, "subscriptions"),
        }
    }
}

/// Infrastructure factory for tagged-log persistence
///
/// Holds the shared log handle; recorders created here clone it. The handle
/// is released when the factory and every recorder built from it have been
/// dropped.
pub struct Factory<L> {
    log: Arc<L>,
}

impl<L: TagLogConnect> Factory<L> {
    /// Connect using the URI in the [`TAGLOG_URI`] environment variable
    pub async fn from_env() -> RecorderResult<Self> {
        let uri = env::var(TAGLOG_URI)
            .ok()
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| {
                RecorderError::Configuration(format!("'{TAGLOG_URI}' not found in environment"))
            })?;
        Self::connect(&uri).await
    }

    /// Connect to the log service at `uri`
    pub async fn connect(uri: &str) -> RecorderResult<Self> {
        let log = L::connect(uri).await?;
        info!(uri, "connected to tagged event log");
        Ok(Self::with_log(Arc::new(log)))
    }
}

impl<L> Factory<L> {
    /// Whether this adapter offers the given capability
    pub fn offers(capability: Capability) -> bool {
        matches!(
            capability,
            Capability::AggregateEvents | Capability::Notifications
        )
    }
}

impl<L: TagLog> Factory<L> {
    /// Build a factory around an already-connected log handle
    pub fn with_log(log: Arc<L>) -> Self {
        Self { log }
    }

    /// Create a recorder for aggregate event streams
    ///
    /// Fails with [`RecorderError::Unsupported`] when asked for a snapshot
    /// recorder: snapshots are not offered, and the refusal happens here
    /// rather than on first use.
    pub fn aggregate_recorder(
        &self,
        purpose: RecorderPurpose,
    ) -> RecorderResult<TagLogRecorder<L>> {
        match purpose {
            RecorderPurpose::Events => Ok(TagLogRecorder::new(Arc::clone(&self.log))),
            RecorderPurpose::Snapshots => Err(RecorderError::Unsupported(format!(
                "{} are not offered by the tagged-log adapter",
                Capability::Snapshots
            ))),
        }
    }

    /// Create a recorder for the global notification feed
    pub fn application_recorder(&self) -> TagLogRecorder<L> {
        TagLogRecorder::new(Arc::clone(&self.log))
    }

    /// Create a process recorder
    ///
    /// Always fails: process recording requires tracking records, which the
    /// log has no representation for.
    pub fn process_recorder(&self) -> RecorderResult<TagLogRecorder<L>> {
        Err(RecorderError::Unsupported(format!(
            "{} is not offered by the tagged-log adapter",
            Capability::ProcessRecording
        )))
    }

    /// Create a tracking recorder
    ///
    /// Always fails: the log has no representation for tracking records.
    pub fn tracking_recorder(&self) -> RecorderResult<TagLogRecorder<L>> {
        Err(RecorderError::Unsupported(format!(
            "{} is not offered by the tagged-log adapter",
            Capability::Tracking
        )))
    }
}
