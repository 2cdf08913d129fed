//! A single build of a repository.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::{BuildId, RepositoryId};
use crate::events::build::BuildPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    Started,
    Passed,
    Failed,
    /// Any other terminal state reported by the build farm.
    #[serde(other)]
    Errored,
}

impl BuildState {
    pub fn is_terminal(self) -> bool {
        self != BuildState::Started
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildState::Started => "started",
            BuildState::Passed => "passed",
            BuildState::Failed => "failed",
            BuildState::Errored => "errored",
        }
    }
}

/// A timestamp exactly as the build farm sent it.
///
/// Displayed verbatim; only parsed when a duration is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

/// Non RFC 3339 layout some workers still send.
const LEGACY_FORMAT: &str = "%Y/%m/%d %H:%M:%S %z";

impl Timestamp {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.0)
            .or_else(|_| DateTime::parse_from_str(&self.0, LEGACY_FORMAT))
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

impl From<&str> for Timestamp {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Status color class of a finished build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    Green,
    Red,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Build {
    pub id: BuildId,
    pub repository_id: RepositoryId,
    pub number: u64,
    pub state: BuildState,
    pub log: String,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
}

impl Build {
    /// A freshly started build. The payload's state is not trusted: a start is a start.
    pub fn started(repository_id: RepositoryId, payload: &BuildPayload) -> Self {
        Self {
            id: payload.id,
            repository_id,
            number: payload.number,
            state: BuildState::Started,
            log: payload.log.clone().unwrap_or_default(),
            started_at: payload.started_at.clone(),
            finished_at: None,
        }
    }

    /// A build as described by a snapshot or a finished payload, taken at face value.
    pub fn from_payload(repository_id: RepositoryId, payload: &BuildPayload) -> Self {
        let state = match (payload.state, &payload.finished_at) {
            (Some(state), _) => state,
            (None, Some(_)) => BuildState::Errored,
            (None, None) => BuildState::Started,
        };
        Self {
            id: payload.id,
            repository_id,
            number: payload.number,
            state,
            log: payload.log.clone().unwrap_or_default(),
            started_at: payload.started_at.clone(),
            finished_at: payload.finished_at.clone(),
        }
    }

    /// Takes the number and start time of a repeated start. The log and any
    /// outcome are kept; finished builds are left untouched.
    pub fn restart(&mut self, payload: &BuildPayload) {
        if self.is_finished() {
            return;
        }
        self.number = payload.number;
        if payload.started_at.is_some() {
            self.started_at = payload.started_at.clone();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some() || self.state.is_terminal()
    }

    /// Appends a log delta. Finished builds are immutable and reject it.
    pub fn append_log(&mut self, delta: &str) -> bool {
        if self.is_finished() {
            return false;
        }
        self.log.push_str(delta);
        true
    }

    /// Moves the build into a terminal state. Returns false if it already was finished.
    pub fn finish(&mut self, state: BuildState, finished_at: Option<Timestamp>) -> bool {
        if self.is_finished() {
            return false;
        }
        self.state = state;
        self.finished_at = finished_at;
        true
    }

    pub fn color(&self) -> Option<StatusColor> {
        match self.state {
            BuildState::Started => None,
            BuildState::Passed => Some(StatusColor::Green),
            BuildState::Failed | BuildState::Errored => Some(StatusColor::Red),
        }
    }

    pub fn display_number(&self) -> String {
        format!("#{}", self.number)
    }

    /// Wall time from start to finish, when both ends are known and parse.
    pub fn duration(&self) -> Option<TimeDelta> {
        let started = self.started_at.as_ref()?.to_utc()?;
        let finished = self.finished_at.as_ref()?.to_utc()?;
        Some(finished.signed_duration_since(started))
    }
}

/// The timestamp as received, empty when absent.
pub fn format_timestamp(ts: Option<&Timestamp>) -> String {
    ts.map(|ts| ts.as_str().to_string()).unwrap_or_default()
}
