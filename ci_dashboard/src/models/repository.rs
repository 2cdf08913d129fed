//! A tracked repository and its build history.

use serde::Serialize;

use super::build::Build;
use super::flash::{FlashState, FlashTransition};
use super::{BuildId, RepositoryId};
use crate::services::ordering::{self, Placement};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub id: RepositoryId,
    /// Slash-namespaced `owner/name`, stable for the repository's lifetime.
    pub name: String,
    pub builds_count: Option<u64>,
    last_build: Option<BuildId>,
    /// Most recently started first.
    builds: Vec<Build>,
    flash: FlashState,
}

impl Repository {
    pub fn new(id: RepositoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            builds_count: None,
            last_build: None,
            builds: Vec::new(),
            flash: FlashState::Idle,
        }
    }

    pub fn builds(&self) -> &[Build] {
        &self.builds
    }

    pub fn build(&self, id: BuildId) -> Option<&Build> {
        self.builds.iter().find(|b| b.id == id)
    }

    pub fn last_build(&self) -> Option<&Build> {
        self.last_build.and_then(|id| self.build(id))
    }

    pub fn last_build_id(&self) -> Option<BuildId> {
        self.last_build
    }

    pub fn is_flashing(&self) -> bool {
        self.flash.is_flashing()
    }

    /// Dashboard route of one of this repository's builds.
    pub fn build_path(&self, build: BuildId) -> String {
        format!("#!/{}/builds/{}", self.name, build)
    }

    pub(crate) fn build_mut(&mut self, id: BuildId) -> Option<&mut Build> {
        self.builds.iter_mut().find(|b| b.id == id)
    }

    /// Puts `build` at the head of the history, replacing a record with the same id.
    pub(crate) fn surface_build(&mut self, build: Build) -> Placement {
        let previous = self.builds.iter().position(|b| b.id == build.id);
        if let Some(index) = previous {
            self.builds.remove(index);
        }
        self.builds.insert(0, build);
        ordering::placement_of(previous)
    }

    /// Moves a stored build to the head of the history, keeping its record.
    pub(crate) fn bring_to_front(&mut self, id: BuildId) -> Option<Placement> {
        let index = self.builds.iter().position(|b| b.id == id)?;
        let build = self.builds.remove(index);
        self.builds.insert(0, build);
        Some(ordering::placement_of(Some(index)))
    }

    /// Appends an older build to the tail of the history; used when seeding.
    pub(crate) fn push_build(&mut self, build: Build) {
        if self.build(build.id).is_none() {
            self.builds.push(build);
        }
    }

    pub(crate) fn set_last_build(&mut self, id: BuildId) {
        self.last_build = Some(id);
    }

    pub(crate) fn start_flashing(&mut self) -> Option<FlashTransition> {
        self.flash.start()
    }

    pub(crate) fn stop_flashing(&mut self) -> Option<FlashTransition> {
        self.flash.stop()
    }
}
