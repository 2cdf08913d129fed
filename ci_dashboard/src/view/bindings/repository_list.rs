//! The global repository list, shown on every page.

use super::{Scope, ViewBinding};
use crate::events::build::{BuildEvent, EventKind};
use crate::models::flash::FlashTransition;
use crate::models::repository::Repository;
use crate::services::ordering::Placement;
use crate::store::EntityStore;
use crate::view::intent::{Field, Pane, RenderIntent, Target};

const PANE: Pane = Pane::RepositoryList;

#[derive(Debug, Default)]
pub struct RepositoryListBinding;

impl RepositoryListBinding {
    pub fn new() -> Self {
        Self
    }
}

/// Build number, link and color of the row.
fn last_build_intents(repository: &Repository, out: &mut Vec<RenderIntent>) {
    let target = Target::Repository(repository.id);
    let Some(build) = repository.last_build() else {
        return;
    };
    out.push(RenderIntent::set_text(
        PANE,
        target,
        Field::Number,
        build.display_number(),
    ));
    out.push(RenderIntent::set_text(
        PANE,
        target,
        Field::Link,
        repository.build_path(build.id),
    ));
    out.push(RenderIntent::SetColor {
        pane: PANE,
        target,
        color: build.color(),
    });
}

impl ViewBinding for RepositoryListBinding {
    fn name(&self) -> &'static str {
        "repository_list"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[EventKind::BuildStarted, EventKind::BuildFinished]
    }

    fn applies(&self, _event: &BuildEvent, _scope: &Scope<'_>) -> bool {
        true
    }

    fn render(&self, event: &BuildEvent, scope: &Scope<'_>, out: &mut Vec<RenderIntent>) {
        let Some(repository) = scope.store.repository(event.repository_id()) else {
            return;
        };
        let target = Target::Repository(repository.id);
        let position = scope.store.position(repository.id).unwrap_or(0);

        let inserted = scope.applied.repository == Some(Placement::Inserted);
        match scope.applied.repository {
            Some(Placement::Inserted) => out.push(RenderIntent::InsertRow {
                pane: PANE,
                target,
                position,
            }),
            Some(Placement::Moved { .. }) => out.push(RenderIntent::MoveRow {
                pane: PANE,
                target,
                position,
            }),
            Some(Placement::Unchanged) | None => {}
        }
        if inserted || scope.applied.renamed {
            out.push(RenderIntent::set_text(
                PANE,
                target,
                Field::Name,
                repository.name.as_str(),
            ));
        }

        last_build_intents(repository, out);

        match scope.applied.flash {
            Some(FlashTransition::Started) => {
                out.push(RenderIntent::StartFlashing { pane: PANE, target })
            }
            Some(FlashTransition::Stopped) => {
                out.push(RenderIntent::StopFlashing { pane: PANE, target })
            }
            None => {}
        }
    }

    fn mount(&self, store: &EntityStore, out: &mut Vec<RenderIntent>) {
        out.push(RenderIntent::Clear { pane: PANE });
        for (position, repository) in store.repositories().enumerate() {
            let target = Target::Repository(repository.id);
            out.push(RenderIntent::InsertRow {
                pane: PANE,
                target,
                position,
            });
            out.push(RenderIntent::set_text(
                PANE,
                target,
                Field::Name,
                repository.name.as_str(),
            ));
            last_build_intents(repository, out);
            if repository.is_flashing() {
                out.push(RenderIntent::StartFlashing { pane: PANE, target });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::build::StatusColor;
    use crate::models::RepositoryId;
    use crate::view::bindings::testing::{deliver, finished, started, Fixture};

    #[test]
    fn new_repository_is_inserted_at_the_top_and_flashes() {
        let mut fixture = Fixture::seeded();
        let binding = RepositoryListBinding::new();
        let out = deliver(&binding, &mut fixture, &started(3, "svenfuchs/gem-release", 30, 1));

        let target = Target::Repository(RepositoryId(3));
        assert_eq!(
            out[0],
            RenderIntent::InsertRow { pane: PANE, target, position: 0 }
        );
        assert!(out.contains(&RenderIntent::set_text(PANE, target, Field::Name, "svenfuchs/gem-release")));
        assert!(out.contains(&RenderIntent::set_text(PANE, target, Field::Number, "#1")));
        assert!(out.contains(&RenderIntent::SetColor { pane: PANE, target, color: None }));
        assert_eq!(out.last(), Some(&RenderIntent::StartFlashing { pane: PANE, target }));
    }

    #[test]
    fn finished_moves_the_row_colors_it_and_stops_flashing() {
        let mut fixture = Fixture::seeded();
        let binding = RepositoryListBinding::new();
        deliver(&binding, &mut fixture, &started(1, "svenfuchs/minimal", 11, 2));
        deliver(&binding, &mut fixture, &started(2, "josevalim/enginex", 21, 2));
        let out = deliver(
            &binding,
            &mut fixture,
            &finished(1, "svenfuchs/minimal", 11, 2, "failed"),
        );

        let target = Target::Repository(RepositoryId(1));
        assert_eq!(out[0], RenderIntent::MoveRow { pane: PANE, target, position: 0 });
        assert!(out.contains(&RenderIntent::SetColor {
            pane: PANE,
            target,
            color: Some(StatusColor::Red),
        }));
        assert_eq!(out.last(), Some(&RenderIntent::StopFlashing { pane: PANE, target }));
    }

    #[test]
    fn mount_renders_rows_in_list_order() {
        let fixture = Fixture::seeded();
        let mut out = Vec::new();
        RepositoryListBinding::new().mount(&fixture.store, &mut out);

        let rows: Vec<_> = out
            .iter()
            .filter_map(|intent| match intent {
                RenderIntent::InsertRow { target, position, .. } => Some((*target, *position)),
                _ => None,
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                (Target::Repository(RepositoryId(1)), 0),
                (Target::Repository(RepositoryId(2)), 1),
            ]
        );
    }

    #[test]
    fn renamed_repository_gets_its_new_name_and_link() {
        let mut fixture = Fixture::seeded();
        let binding = RepositoryListBinding::new();
        let out = deliver(&binding, &mut fixture, &started(2, "josevalim/enginex", 21, 2));
        let target = Target::Repository(RepositoryId(2));
        assert!(out
            .iter()
            .all(|intent| !matches!(intent, RenderIntent::SetText { field: Field::Name, .. })));

        let out = deliver(&binding, &mut fixture, &finished(2, "josevalim/engine", 21, 2, "passed"));
        assert!(out.contains(&RenderIntent::set_text(PANE, target, Field::Name, "josevalim/engine")));
        assert!(out.contains(&RenderIntent::set_text(
            PANE,
            target,
            Field::Link,
            "#!/josevalim/engine/builds/21"
        )));
    }
}
