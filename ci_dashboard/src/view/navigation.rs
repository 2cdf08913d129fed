//! Navigation: the settable [`ViewContext`] and the dashboard's hash routes.
//!
//! Routes look like `#!/owner/name`, `#!/owner/name/builds` and
//! `#!/owner/name/builds/<id>`. Anything else is the home view, where only
//! the repository list is showing.

use std::cell::Cell;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::context::{ViewContext, ViewKind};
use crate::models::{BuildId, RepositoryId};
use crate::store::EntityStore;

static ROUTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#!)?/(?P<name>[^/]+/[^/]+)(?P<builds>/builds(?:/(?P<build>\d+))?)?/?$")
        .unwrap()
});

/// A parsed, not yet resolved, dashboard route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub repository: String,
    pub view: ViewKind,
    pub build: Option<BuildId>,
}

impl Route {
    pub fn parse(path: &str) -> Option<Self> {
        let captures = ROUTE_REGEX.captures(path.trim())?;
        let repository = captures["name"].to_string();
        let build = match captures.name("build") {
            Some(id) => Some(BuildId(id.as_str().parse().ok()?)),
            None => None,
        };
        let view = match (captures.name("builds"), build) {
            (Some(_), Some(_)) => ViewKind::BuildDetail,
            (Some(_), None) => ViewKind::BuildHistory,
            (None, _) => ViewKind::RepositorySummary,
        };
        Some(Self {
            repository,
            view,
            build,
        })
    }

    /// Resolves the repository name through the store.
    pub fn resolve(&self, store: &EntityStore) -> Option<Location> {
        let repository = store.repository_by_name(&self.repository)?;
        Some(Location {
            repository: Some(repository.id),
            build: self.build,
            view: Some(self.view),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    pub repository: Option<RepositoryId>,
    pub build: Option<BuildId>,
    pub view: Option<ViewKind>,
}

/// The current location, shared by reference with the bindings.
#[derive(Debug, Default)]
pub struct Navigation {
    location: Cell<Location>,
}

impl Navigation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(&self) -> Location {
        self.location.get()
    }

    pub fn go_to(&self, location: Location) {
        tracing::debug!(?location, "Navigated");
        self.location.set(location);
    }

    /// Follows a hash route. Unknown repositories and unparseable paths land on
    /// the home view and return `None`.
    pub fn visit(&self, path: &str, store: &EntityStore) -> Option<Location> {
        let resolved = Route::parse(path).and_then(|route| route.resolve(store));
        if resolved.is_none() && !matches!(path.trim(), "" | "/" | "#!" | "#!/") {
            tracing::warn!(path, "Cannot resolve route, showing home");
        }
        let location = resolved.unwrap_or_default();
        self.go_to(location);
        resolved
    }
}

impl ViewContext for Navigation {
    fn current_repository(&self) -> Option<RepositoryId> {
        self.location.get().repository
    }

    fn current_build(&self) -> Option<BuildId> {
        self.location.get().build
    }

    fn current_view(&self) -> Option<ViewKind> {
        self.location.get().view
    }
}
