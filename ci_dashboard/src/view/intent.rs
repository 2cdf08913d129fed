//! Render intents: what the bindings ask the rendering layer to do.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::models::build::StatusColor;
use crate::models::{BuildId, RepositoryId};

/// Region of the dashboard an intent applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pane {
    RepositoryList,
    Summary,
    BuildDetail,
    BuildHistory,
}

/// The entity an intent is about. Serialized like a DOM id: `repository_1`, `build_3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Target {
    Repository(RepositoryId),
    Build(BuildId),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Repository(id) => write!(f, "repository_{id}"),
            Target::Build(id) => write!(f, "build_{id}"),
        }
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Number,
    Link,
    State,
    Log,
    StartedAt,
    FinishedAt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderIntent {
    /// Drop everything rendered in the pane.
    Clear { pane: Pane },
    SetText {
        pane: Pane,
        target: Target,
        field: Field,
        value: String,
    },
    AppendText {
        pane: Pane,
        target: Target,
        field: Field,
        value: String,
    },
    InsertRow {
        pane: Pane,
        target: Target,
        position: usize,
    },
    MoveRow {
        pane: Pane,
        target: Target,
        position: usize,
    },
    /// `None` clears the color class.
    SetColor {
        pane: Pane,
        target: Target,
        color: Option<StatusColor>,
    },
    StartFlashing { pane: Pane, target: Target },
    StopFlashing { pane: Pane, target: Target },
}

impl RenderIntent {
    pub fn set_text(pane: Pane, target: Target, field: Field, value: impl Into<String>) -> Self {
        RenderIntent::SetText {
            pane,
            target,
            field,
            value: value.into(),
        }
    }

    pub fn append_text(pane: Pane, target: Target, field: Field, value: impl Into<String>) -> Self {
        RenderIntent::AppendText {
            pane,
            target,
            field,
            value: value.into(),
        }
    }

    pub fn pane(&self) -> Pane {
        match self {
            RenderIntent::Clear { pane }
            | RenderIntent::SetText { pane, .. }
            | RenderIntent::AppendText { pane, .. }
            | RenderIntent::InsertRow { pane, .. }
            | RenderIntent::MoveRow { pane, .. }
            | RenderIntent::SetColor { pane, .. }
            | RenderIntent::StartFlashing { pane, .. }
            | RenderIntent::StopFlashing { pane, .. } => *pane,
        }
    }
}
