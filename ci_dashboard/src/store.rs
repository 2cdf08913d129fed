//! Entity store: the single owner of repository and build records.
//!
//! Readers get shared references only. Mutation is `pub(crate)` and driven by
//! the update router in response to bus events (and by the seeder at bootstrap).

use std::collections::HashMap;

use crate::models::build::Build;
use crate::models::repository::Repository;
use crate::models::{BuildId, RepositoryId};
use crate::services::ordering::{self, Placement};

#[derive(Debug, Default)]
pub struct EntityStore {
    /// Repository ids, most recently active first.
    order: Vec<RepositoryId>,
    repositories: HashMap<RepositoryId, Repository>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn order(&self) -> &[RepositoryId] {
        &self.order
    }

    /// Repositories in list order.
    pub fn repositories(&self) -> impl Iterator<Item = &Repository> {
        self.order.iter().filter_map(|id| self.repositories.get(id))
    }

    pub fn repository(&self, id: RepositoryId) -> Option<&Repository> {
        self.repositories.get(&id)
    }

    pub fn repository_by_name(&self, name: &str) -> Option<&Repository> {
        self.repositories().find(|r| r.name == name)
    }

    /// Zero-based position in the repository list.
    pub fn position(&self, id: RepositoryId) -> Option<usize> {
        self.order.iter().position(|r| *r == id)
    }

    pub fn build(&self, repository: RepositoryId, build: BuildId) -> Option<&Build> {
        self.repository(repository).and_then(|r| r.build(build))
    }

    pub fn flashing_count(&self) -> usize {
        self.repositories.values().filter(|r| r.is_flashing()).count()
    }

    /// Moves the repository to the head of the list, creating it if unknown.
    pub(crate) fn surface(&mut self, id: RepositoryId, name: &str) -> (Placement, &mut Repository) {
        let reordered = ordering::most_recent_first(&self.order, id);
        self.order = reordered.order;
        let repository = self
            .repositories
            .entry(id)
            .or_insert_with(|| Repository::new(id, name));
        (reordered.placement, repository)
    }

    pub(crate) fn build_mut(&mut self, repository: RepositoryId, build: BuildId) -> Option<&mut Build> {
        self.repositories
            .get_mut(&repository)
            .and_then(|r| r.build_mut(build))
    }

    /// Appends a repository at the tail. Returns false for a duplicate id.
    pub(crate) fn insert_seeded(&mut self, repository: Repository) -> bool {
        if self.repositories.contains_key(&repository.id) {
            return false;
        }
        self.order.push(repository.id);
        self.repositories.insert(repository.id, repository);
        true
    }
}
