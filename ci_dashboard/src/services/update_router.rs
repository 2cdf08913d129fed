//! Update router: applies each build event to the entity store.
//!
//! Runs for every event regardless of what is on screen, and always before any
//! view binding sees the same event. Its [`Applied`] report tells bindings what
//! changed so they can render minimal effects.

use serde::Serialize;

use crate::events::build::{BuildEvent, LogPayload, RepositoryPayload};
use crate::models::build::{Build, BuildState};
use crate::models::flash::FlashTransition;
use crate::models::repository::Repository;
use crate::models::BuildId;
use crate::services::ordering::Placement;
use crate::store::EntityStore;

/// What happened to a `build:log` delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOutcome {
    Appended,
    /// No such repository or build in the store.
    UnknownBuild,
    /// The build already finished; late logs are ignored.
    BuildFinished,
}

impl LogOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            LogOutcome::Appended => "appended",
            LogOutcome::UnknownBuild => "unknown_build",
            LogOutcome::BuildFinished => "build_finished",
        }
    }
}

/// Report of the mutation applied for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Applied {
    /// Movement of the repository within the repository list.
    pub repository: Option<Placement>,
    /// Movement of the build within its repository's history.
    pub build: Option<Placement>,
    pub flash: Option<FlashTransition>,
    pub log: Option<LogOutcome>,
    /// The payload carried a new repository name.
    pub renamed: bool,
    /// The repository's `last_build` now points at a different build.
    pub last_build_changed: bool,
}

pub fn route(store: &mut EntityStore, event: &BuildEvent) -> Applied {
    match event {
        BuildEvent::Started(payload) => build_started(store, payload),
        BuildEvent::Log(payload) => build_log(store, payload),
        BuildEvent::Finished(payload) => build_finished(store, payload),
    }
}

/// Takes the repository fields of the payload. Returns whether the name changed.
fn merge(repository: &mut Repository, payload: &RepositoryPayload) -> bool {
    if payload.builds_count.is_some() {
        repository.builds_count = payload.builds_count;
    }
    if repository.name == payload.name {
        return false;
    }
    tracing::debug!(
        repository_id = %payload.id,
        old = %repository.name,
        new = %payload.name,
        "Repository renamed"
    );
    repository.name = payload.name.clone();
    true
}

fn point_last_build(repository: &mut Repository, id: BuildId) -> bool {
    let changed = repository.last_build_id() != Some(id);
    repository.set_last_build(id);
    changed
}

fn build_started(store: &mut EntityStore, payload: &RepositoryPayload) -> Applied {
    let (placement, repository) = store.surface(payload.id, &payload.name);
    let renamed = merge(repository, payload);

    let reported = &payload.last_build;
    let build_placement = match repository.build_mut(reported.id) {
        Some(build) => {
            tracing::debug!(
                repository_id = %payload.id,
                build_id = %reported.id,
                finished = build.is_finished(),
                "Build started again, keeping its record"
            );
            build.restart(reported);
            repository.bring_to_front(reported.id)
        }
        None => Some(repository.surface_build(Build::started(payload.id, reported))),
    };
    let last_build_changed = point_last_build(repository, reported.id);

    // Only a running build flashes.
    let running = repository
        .build(reported.id)
        .is_some_and(|build| !build.is_finished());
    let flash = if running {
        repository.start_flashing()
    } else {
        None
    };

    tracing::debug!(
        repository_id = %payload.id,
        build_id = %reported.id,
        number = reported.number,
        ?placement,
        "Build started"
    );

    Applied {
        repository: Some(placement),
        build: build_placement,
        flash,
        log: None,
        renamed,
        last_build_changed,
    }
}

fn build_log(store: &mut EntityStore, payload: &LogPayload) -> Applied {
    let outcome = match store.build_mut(payload.repository_id, payload.build_id) {
        None => LogOutcome::UnknownBuild,
        Some(build) => {
            if build.append_log(&payload.log) {
                LogOutcome::Appended
            } else {
                LogOutcome::BuildFinished
            }
        }
    };

    if outcome != LogOutcome::Appended {
        tracing::debug!(
            repository_id = %payload.repository_id,
            build_id = %payload.build_id,
            reason = outcome.as_str(),
            "Dropping log delta"
        );
        crate::metrics::log_delta_dropped(outcome.as_str());
    }

    Applied {
        log: Some(outcome),
        ..Applied::default()
    }
}

fn build_finished(store: &mut EntityStore, payload: &RepositoryPayload) -> Applied {
    let (placement, repository) = store.surface(payload.id, &payload.name);
    let renamed = merge(repository, payload);

    let reported = &payload.last_build;
    let state = match reported.state {
        Some(state) if state.is_terminal() => state,
        other => {
            tracing::warn!(
                repository_id = %payload.id,
                build_id = %reported.id,
                state = other.map(BuildState::as_str).unwrap_or("none"),
                "Finished build without a terminal state"
            );
            BuildState::Errored
        }
    };

    let build_placement = match repository.build_mut(reported.id) {
        Some(build) => {
            if build.finish(state, reported.finished_at.clone()) {
                record_duration(build);
            } else {
                tracing::debug!(build_id = %reported.id, "Build already finished");
            }
            Placement::Unchanged
        }
        None => {
            tracing::debug!(
                repository_id = %payload.id,
                build_id = %reported.id,
                "Finished build was never started here, upserting"
            );
            let mut build = Build::from_payload(payload.id, reported);
            build.state = state;
            record_duration(&build);
            repository.surface_build(build)
        }
    };
    let last_build_changed = point_last_build(repository, reported.id);
    let flash = repository.stop_flashing();

    tracing::debug!(
        repository_id = %payload.id,
        build_id = %reported.id,
        state = state.as_str(),
        ?placement,
        "Build finished"
    );

    Applied {
        repository: Some(placement),
        build: Some(build_placement),
        flash,
        log: None,
        renamed,
        last_build_changed,
    }
}

fn record_duration(build: &Build) {
    if let Some(duration) = build.duration() {
        crate::metrics::build_duration(duration.num_milliseconds() as f64 / 1000.0);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::RepositoryId;

    fn event(name: &str, payload: serde_json::Value) -> BuildEvent {
        BuildEvent::decode(name, payload).unwrap()
    }

    fn started(repository: i64, name: &str, build: i64, number: u64) -> BuildEvent {
        event(
            "build:started",
            json!({
                "id": repository,
                "name": name,
                "last_build": { "id": build, "number": number, "state": "started", "log": "" }
            }),
        )
    }

    fn finished(repository: i64, name: &str, build: i64, number: u64, state: &str) -> BuildEvent {
        event(
            "build:finished",
            json!({
                "id": repository,
                "name": name,
                "last_build": {
                    "id": build,
                    "number": number,
                    "state": state,
                    "finished_at": "2010-11-11T12:01:30Z"
                }
            }),
        )
    }

    fn log(repository: i64, build: i64, delta: &str) -> BuildEvent {
        event(
            "build:log",
            json!({ "repository_id": repository, "build_id": build, "log": delta }),
        )
    }

    #[test]
    fn started_for_new_repository_inserts_at_head() {
        let mut store = EntityStore::new();
        route(&mut store, &started(1, "josevalim/enginex", 1, 1));
        let applied = route(&mut store, &started(2, "svenfuchs/gem-release", 2, 1));

        assert_eq!(applied.repository, Some(Placement::Inserted));
        assert_eq!(applied.flash, Some(FlashTransition::Started));
        assert_eq!(store.len(), 2);
        assert_eq!(store.position(RepositoryId(2)), Some(0));
    }

    #[test]
    fn started_for_known_repository_grows_builds_and_resurfaces() {
        let mut store = EntityStore::new();
        route(&mut store, &started(1, "josevalim/enginex", 1, 1));
        route(&mut store, &finished(1, "josevalim/enginex", 1, 1, "passed"));
        route(&mut store, &started(2, "svenfuchs/minimal", 2, 1));

        let applied = route(&mut store, &started(1, "josevalim/enginex", 3, 2));
        let repository = store.repository(RepositoryId(1)).unwrap();
        assert_eq!(applied.repository, Some(Placement::Moved { from: 1 }));
        assert_eq!(applied.build, Some(Placement::Inserted));
        assert_eq!(repository.builds().len(), 2);
        assert_eq!(repository.last_build().map(|b| b.number), Some(2));
        assert_eq!(repository.builds()[0].id, BuildId(3));
        assert!(repository.is_flashing());
    }

    #[test]
    fn repeated_start_does_not_duplicate_the_build() {
        let mut store = EntityStore::new();
        route(&mut store, &started(1, "a/b", 1, 1));
        let applied = route(&mut store, &started(1, "a/b", 1, 1));
        assert_eq!(applied.build, Some(Placement::Unchanged));
        assert_eq!(applied.flash, None);
        assert_eq!(store.repository(RepositoryId(1)).unwrap().builds().len(), 1);
    }

    #[test]
    fn restart_while_running_keeps_the_log() {
        let mut store = EntityStore::new();
        route(&mut store, &started(1, "a/b", 7, 1));
        route(&mut store, &log(1, 7, "building..."));
        route(&mut store, &started(1, "a/b", 8, 2));

        let applied = route(&mut store, &started(1, "a/b", 7, 1));
        let repository = store.repository(RepositoryId(1)).unwrap();
        let build = repository.build(BuildId(7)).unwrap();
        assert_eq!(build.log, "building...");
        assert_eq!(build.state, BuildState::Started);
        assert_eq!(applied.build, Some(Placement::Moved { from: 1 }));
        assert!(applied.last_build_changed);
        assert_eq!(repository.builds().len(), 2);
        assert_eq!(repository.builds()[0].id, BuildId(7));
        assert!(repository.is_flashing());
    }

    #[test]
    fn restart_after_finish_keeps_the_build_terminal() {
        let mut store = EntityStore::new();
        route(&mut store, &started(1, "a/b", 7, 1));
        route(&mut store, &log(1, 7, "building..."));
        route(&mut store, &finished(1, "a/b", 7, 1, "passed"));

        let applied = route(&mut store, &started(1, "a/b", 7, 1));
        let repository = store.repository(RepositoryId(1)).unwrap();
        let build = repository.build(BuildId(7)).unwrap();
        assert_eq!(build.state, BuildState::Passed);
        assert_eq!(
            build.finished_at.as_ref().map(|ts| ts.as_str()),
            Some("2010-11-11T12:01:30Z")
        );
        assert_eq!(build.log, "building...");
        assert_eq!(applied.flash, None);
        assert!(!repository.is_flashing());
    }

    #[test]
    fn finished_with_unparseable_timestamp_still_finishes() {
        let mut store = EntityStore::new();
        route(&mut store, &started(1, "a/b", 7, 1));
        let event = event(
            "build:finished",
            json!({
                "id": 1,
                "name": "a/b",
                "last_build": { "id": 7, "number": 1, "state": "passed", "finished_at": "2010/11/11 12:01:30 +0000" }
            }),
        );
        let applied = route(&mut store, &event);

        let build = store.build(RepositoryId(1), BuildId(7)).unwrap();
        assert!(build.is_finished());
        assert_eq!(
            build.finished_at.as_ref().map(|ts| ts.as_str()),
            Some("2010/11/11 12:01:30 +0000")
        );
        assert_eq!(applied.flash, Some(FlashTransition::Stopped));
    }

    #[test]
    fn rename_and_last_build_moves_are_reported() {
        let mut store = EntityStore::new();
        let first = route(&mut store, &started(1, "a/b", 1, 1));
        assert!(!first.renamed);
        assert!(first.last_build_changed);

        route(&mut store, &started(1, "a/b", 2, 2));
        let applied = route(&mut store, &finished(1, "a/c", 2, 2, "passed"));
        assert!(applied.renamed);
        assert!(!applied.last_build_changed);
        assert_eq!(store.repository(RepositoryId(1)).unwrap().name, "a/c");

        let older = route(&mut store, &finished(1, "a/c", 1, 1, "failed"));
        assert!(!older.renamed);
        assert!(older.last_build_changed);
    }

    #[test]
    fn log_appends_in_arrival_order() {
        let mut store = EntityStore::new();
        route(&mut store, &started(1, "a/b", 1, 1));
        for delta in ["building...", " foo!", "\nbar"] {
            let applied = route(&mut store, &log(1, 1, delta));
            assert_eq!(applied.log, Some(LogOutcome::Appended));
            assert_eq!(applied.repository, None);
            assert_eq!(applied.flash, None);
        }
        assert_eq!(
            store.build(RepositoryId(1), BuildId(1)).unwrap().log,
            "building... foo!\nbar"
        );
    }

    #[test]
    fn log_for_unknown_build_is_dropped() {
        let mut store = EntityStore::new();
        route(&mut store, &started(1, "a/b", 1, 1));
        assert_eq!(route(&mut store, &log(1, 99, "x")).log, Some(LogOutcome::UnknownBuild));
        assert_eq!(route(&mut store, &log(42, 1, "x")).log, Some(LogOutcome::UnknownBuild));
        assert_eq!(store.build(RepositoryId(1), BuildId(1)).unwrap().log, "");
    }

    #[test]
    fn late_log_after_finish_is_ignored() {
        let mut store = EntityStore::new();
        route(&mut store, &started(1, "a/b", 1, 1));
        route(&mut store, &log(1, 1, "done"));
        route(&mut store, &finished(1, "a/b", 1, 1, "failed"));
        let applied = route(&mut store, &log(1, 1, " late"));
        assert_eq!(applied.log, Some(LogOutcome::BuildFinished));
        assert_eq!(store.build(RepositoryId(1), BuildId(1)).unwrap().log, "done");
    }

    #[test]
    fn finished_updates_in_place_and_stops_flashing() {
        let mut store = EntityStore::new();
        route(&mut store, &started(1, "a/b", 1, 1));
        route(&mut store, &started(1, "a/b", 2, 2));
        let applied = route(&mut store, &finished(1, "a/b", 1, 1, "passed"));

        let repository = store.repository(RepositoryId(1)).unwrap();
        assert_eq!(applied.build, Some(Placement::Unchanged));
        assert_eq!(applied.flash, Some(FlashTransition::Stopped));
        assert_eq!(repository.builds()[1].id, BuildId(1));
        assert_eq!(repository.builds()[1].state, BuildState::Passed);
        assert_eq!(repository.last_build_id(), Some(BuildId(1)));
        assert!(!repository.is_flashing());
    }

    #[test]
    fn finished_without_start_upserts() {
        let mut store = EntityStore::new();
        let applied = route(&mut store, &finished(5, "svenfuchs/gem-release", 9, 4, "failed"));

        assert_eq!(applied.repository, Some(Placement::Inserted));
        assert_eq!(applied.build, Some(Placement::Inserted));
        assert_eq!(applied.flash, None);
        let build = store.build(RepositoryId(5), BuildId(9)).unwrap();
        assert_eq!(build.state, BuildState::Failed);
        assert!(build.is_finished());
    }

    #[test]
    fn finished_without_terminal_state_is_errored() {
        let mut store = EntityStore::new();
        route(&mut store, &started(1, "a/b", 1, 1));
        route(&mut store, &finished(1, "a/b", 1, 1, "started"));
        assert_eq!(
            store.build(RepositoryId(1), BuildId(1)).unwrap().state,
            BuildState::Errored
        );
    }
}
