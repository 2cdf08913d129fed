//! Build event definitions and their wire payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::models::build::{BuildState, Timestamp};
use crate::models::{BuildId, RepositoryId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "build:started")]
    BuildStarted,
    #[serde(rename = "build:log")]
    BuildLog,
    #[serde(rename = "build:finished")]
    BuildFinished,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [
        EventKind::BuildStarted,
        EventKind::BuildLog,
        EventKind::BuildFinished,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::BuildStarted => "build:started",
            EventKind::BuildLog => "build:log",
            EventKind::BuildFinished => "build:finished",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SyncError::UnknownEvent(s.to_string()))
    }
}

/// Build fields as carried in `last_build` of a repository payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPayload {
    pub id: BuildId,
    pub number: u64,
    pub state: Option<BuildState>,
    pub log: Option<String>,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
}

/// Full repository snapshot sent with `build:started` and `build:finished`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryPayload {
    pub id: RepositoryId,
    pub name: String,
    pub last_build: BuildPayload,
    pub builds_count: Option<u64>,
}

/// Minimal `build:log` payload; `log` is the delta, not the whole log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogPayload {
    pub repository_id: RepositoryId,
    pub build_id: BuildId,
    #[serde(default)]
    pub log: String,
}

/// Events that can happen to a build, as seen by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum BuildEvent {
    /// A build started; carries the repository with the new build as `last_build`.
    #[serde(rename = "build:started")]
    Started(RepositoryPayload),
    /// Log text was appended to a running build.
    #[serde(rename = "build:log")]
    Log(LogPayload),
    /// A build reached a terminal state.
    #[serde(rename = "build:finished")]
    Finished(RepositoryPayload),
}

impl BuildEvent {
    /// Decodes a named event. Nothing is mutated when this fails.
    pub fn decode(name: &str, payload: serde_json::Value) -> Result<Self, SyncError> {
        let kind: EventKind = name.parse()?;
        let malformed = |reason: String| SyncError::MalformedPayload {
            event: kind,
            reason,
        };

        let event = match kind {
            EventKind::BuildStarted => serde_json::from_value(payload).map(BuildEvent::Started),
            EventKind::BuildLog => serde_json::from_value(payload).map(BuildEvent::Log),
            EventKind::BuildFinished => serde_json::from_value(payload).map(BuildEvent::Finished),
        }
        .map_err(|e| malformed(e.to_string()))?;

        if let BuildEvent::Started(repository) | BuildEvent::Finished(repository) = &event {
            if repository.name.trim().is_empty() {
                return Err(malformed("repository name is empty".to_string()));
            }
        }
        Ok(event)
    }

    pub fn kind(&self) -> EventKind {
        match self {
            BuildEvent::Started(_) => EventKind::BuildStarted,
            BuildEvent::Log(_) => EventKind::BuildLog,
            BuildEvent::Finished(_) => EventKind::BuildFinished,
        }
    }

    pub fn repository_id(&self) -> RepositoryId {
        match self {
            BuildEvent::Started(repository) | BuildEvent::Finished(repository) => repository.id,
            BuildEvent::Log(log) => log.repository_id,
        }
    }

    pub fn build_id(&self) -> BuildId {
        match self {
            BuildEvent::Started(repository) | BuildEvent::Finished(repository) => {
                repository.last_build.id
            }
            BuildEvent::Log(log) => log.build_id,
        }
    }
}
