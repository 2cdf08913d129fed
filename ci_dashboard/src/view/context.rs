//! Read-only view of what the user is currently looking at.

use serde::{Deserialize, Serialize};

use crate::models::{BuildId, RepositoryId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    RepositorySummary,
    BuildDetail,
    BuildHistory,
}

/// Supplied by navigation and shared with every binding. Bindings must query
/// it per event; navigation may change it at any time.
pub trait ViewContext {
    fn current_repository(&self) -> Option<RepositoryId>;

    fn current_build(&self) -> Option<BuildId>;

    fn current_view(&self) -> Option<ViewKind>;

    fn is_showing_repository(&self, id: RepositoryId) -> bool {
        self.current_repository() == Some(id)
    }

    fn is_showing_build(&self, id: BuildId) -> bool {
        self.current_build() == Some(id)
    }

    fn is_on(&self, view: ViewKind) -> bool {
        self.current_view() == Some(view)
    }
}
