//! Bootstrap: seeds a fresh entity store from the dashboard snapshot.
//!
//! The snapshot lists repositories in display order, each with its latest
//! build and optionally older builds. It must be loaded before the store is
//! handed to the bus, otherwise early events would insert the repositories as
//! new ones.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::events::build::BuildPayload;
use crate::models::build::Build;
use crate::models::repository::Repository;
use crate::models::RepositoryId;
use crate::store::EntityStore;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub repositories: Vec<RepositorySnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositorySnapshot {
    pub id: RepositoryId,
    pub name: String,
    pub builds_count: Option<u64>,
    pub last_build: Option<BuildPayload>,
    /// Most recent first.
    #[serde(default)]
    pub builds: Vec<BuildPayload>,
}

pub fn parse_snapshot(raw: &str) -> anyhow::Result<Snapshot> {
    serde_json::from_str(raw).context("invalid dashboard snapshot")
}

/// Reads and seeds the snapshot at `path`.
pub async fn load_snapshot(path: &Path) -> anyhow::Result<EntityStore> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let store = seed_store(parse_snapshot(&raw)?);
    tracing::info!(
        path = %path.display(),
        repositories = store.len(),
        "Dashboard snapshot loaded"
    );
    Ok(store)
}

pub fn seed_store(snapshot: Snapshot) -> EntityStore {
    let mut store = EntityStore::new();
    for entry in snapshot.repositories {
        let id = entry.id;
        if !store.insert_seeded(seed_repository(entry)) {
            tracing::warn!(repository_id = %id, "Duplicate repository in snapshot, keeping the first");
        }
    }
    crate::metrics::store_gauges(store.len(), store.flashing_count());
    store
}

fn seed_repository(entry: RepositorySnapshot) -> Repository {
    let mut repository = Repository::new(entry.id, entry.name);
    repository.builds_count = entry.builds_count;

    if let Some(last) = &entry.last_build {
        repository.push_build(Build::from_payload(entry.id, last));
        repository.set_last_build(last.id);
    }
    for payload in &entry.builds {
        repository.push_build(Build::from_payload(entry.id, payload));
    }
    if repository.last_build_id().is_none() {
        if let Some(first) = repository.builds().first().map(|b| b.id) {
            repository.set_last_build(first);
        }
    }
    repository
}
