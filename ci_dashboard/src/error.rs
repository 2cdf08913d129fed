//! Errors surfaced by the synchronization core.

use thiserror::Error;

use crate::events::build::EventKind;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
    #[error("malformed `{event}` payload: {reason}")]
    MalformedPayload { event: EventKind, reason: String },
}

impl SyncError {
    /// Short label used as a metrics dimension.
    pub fn reason(&self) -> &'static str {
        match self {
            SyncError::UnknownEvent(_) => "unknown_event",
            SyncError::MalformedPayload { .. } => "malformed_payload",
        }
    }
}
