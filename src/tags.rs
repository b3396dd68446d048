//! Tag encoding for aggregate identity and version
//!
//! Every event written by this crate carries exactly two tags: the first
//! encodes the owning aggregate's identity, the second that aggregate's
//! version at the event. The log treats both as opaque strings; this module
//! owns their layout and is the only place that produces or interprets it.
//!
//! # Tag layout
//!
//! ```text
//! originator:u:<uuid>                 identity tag, UUID identity
//! originator:s:<byte-len>:<text>      identity tag, text identity
//! version:u:<uuid>:<version>          version tag, UUID identity
//! version:s:<byte-len>:<text>:<version>
//! ```
//!
//! Text identities are length-prefixed so that a `:` inside the identity
//! itself can never shift field boundaries, and UUID and text identities
//! stay disjoint by construction. The version tag embeds the identity
//! redundantly; only the trailing number is needed to decode, but carrying
//! the identity keeps version tags filterable and debuggable on the log
//! side.
//!
//! Decoding is strict: a tag must be consumed exactly, field by field, or it
//! fails with [`RecorderError::Decode`]. A tag this codec did not produce
//! must never decode to a plausible-looking wrong value.
//!
//! # Examples
//!
//! ```rust
//! use eventsourcing_taglog::tags::{encode_originator_id, OriginatorId};
//!
//! let id = OriginatorId::Text("order:42".to_string());
//! assert_eq!(encode_originator_id(&id), "originator:s:8:order:42");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{RecorderError, RecorderResult};
use crate::log::LogEvent;

/// Tag prefix for identity tags
pub const ORIGINATOR_ID_PREFIX: &str = "originator:";

/// Tag prefix for version tags
pub const ORIGINATOR_VERSION_PREFIX: &str = "version:";

/// Hyphenated textual UUID length
const UUID_LEN: usize = 36;

/// Identity of an aggregate instance
///
/// Domain layers identify aggregates either by UUID or by a free-form
/// string. The two kinds encode to distinct tags, so a text identity whose
/// content happens to look like a UUID never collides with a UUID identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OriginatorId {
    /// UUID identity
    Uuid(Uuid),
    /// Free-form string identity
    Text(String),
}

impl fmt::Display for OriginatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginatorId::Uuid(id) => write!(f, "{id}"),
            OriginatorId::Text(id) => write!(f, "{id}"),
        }
    }
}

impl From<Uuid> for OriginatorId {
    fn from(id: Uuid) -> Self {
        OriginatorId::Uuid(id)
    }
}

impl From<String> for OriginatorId {
    fn from(id: String) -> Self {
        OriginatorId::Text(id)
    }
}

impl From<&str> for OriginatorId {
    fn from(id: &str) -> Self {
        OriginatorId::Text(id.to_string())
    }
}

/// Encode an aggregate identity into its identity tag
pub fn encode_originator_id(originator_id: &OriginatorId) -> String {
    format!("{ORIGINATOR_ID_PREFIX}{}", identity_fields(originator_id))
}

/// Encode an aggregate identity and version into its version tag
pub fn encode_originator_version(originator_id: &OriginatorId, version: u64) -> String {
    format!(
        "{ORIGINATOR_VERSION_PREFIX}{}:{version}",
        identity_fields(originator_id)
    )
}

/// Decode the aggregate identity from a log event's first tag
pub fn decode_originator_id(event: &LogEvent) -> RecorderResult<OriginatorId> {
    let tag = tag_at(event, 0)?;
    let body = strip_prefix(tag, ORIGINATOR_ID_PREFIX)?;
    let (originator_id, rest) = parse_identity_fields(tag, body)?;
    if !rest.is_empty() {
        return Err(decode_error(tag, "trailing bytes after identity"));
    }
    Ok(originator_id)
}

/// Decode the aggregate version from a log event's second tag
pub fn decode_originator_version(event: &LogEvent) -> RecorderResult<u64> {
    let tag = tag_at(event, 1)?;
    let body = strip_prefix(tag, ORIGINATOR_VERSION_PREFIX)?;
    let (_, rest) = parse_identity_fields(tag, body)?;
    let version = rest
        .strip_prefix(':')
        .ok_or_else(|| decode_error(tag, "missing version field"))?;
    if version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) {
        return Err(decode_error(tag, "version is not a decimal integer"));
    }
    version
        .parse::<u64>()
        .map_err(|_| decode_error(tag, "version out of range"))
}

/// The kind marker and payload fields shared by both tag layouts
fn identity_fields(originator_id: &OriginatorId) -> String {
    match originator_id {
        OriginatorId::Uuid(id) => format!("u:{id}"),
        OriginatorId::Text(id) => format!("s:{}:{id}", id.len()),
    }
}

/// Parse the identity fields at the front of `body`, returning the identity
/// and the unconsumed remainder
fn parse_identity_fields<'a>(
    tag: &str,
    body: &'a str,
) -> RecorderResult<(OriginatorId, &'a str)> {
    if let Some(rest) = body.strip_prefix("u:") {
        let text = rest
            .get(..UUID_LEN)
            .ok_or_else(|| decode_error(tag, "truncated uuid identity"))?;
        let id = Uuid::try_parse(text).map_err(|_| decode_error(tag, "malformed uuid identity"))?;
        Ok((OriginatorId::Uuid(id), &rest[UUID_LEN..]))
    } else if let Some(rest) = body.strip_prefix("s:") {
        let sep = rest
            .find(':')
            .ok_or_else(|| decode_error(tag, "missing identity length"))?;
        let len: usize = rest[..sep]
            .parse()
            .map_err(|_| decode_error(tag, "malformed identity length"))?;
        let payload = &rest[sep + 1..];
        let text = payload
            .get(..len)
            .ok_or_else(|| decode_error(tag, "identity shorter than its length prefix"))?;
        Ok((OriginatorId::Text(text.to_string()), &payload[len..]))
    } else {
        Err(decode_error(tag, "unknown identity kind"))
    }
}

fn tag_at(event: &LogEvent, index: usize) -> RecorderResult<&str> {
    event
        .tags
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| RecorderError::Decode(format!("event {} has no tag {index}", event.event_id)))
}

fn strip_prefix<'a>(tag: &'a str, prefix: &str) -> RecorderResult<&'a str> {
    tag.strip_prefix(prefix)
        .ok_or_else(|| decode_error(tag, "unexpected tag prefix"))
}

fn decode_error(tag: &str, reason: &str) -> RecorderError {
    RecorderError::Decode(format!("{reason} in tag {tag:?}"))
}
