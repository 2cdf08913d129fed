//! Build history table of the current repository.

use std::rc::Rc;

use super::{Scope, ViewBinding};
use crate::events::build::{BuildEvent, EventKind};
use crate::models::build::{format_timestamp, Build};
use crate::services::ordering::Placement;
use crate::store::EntityStore;
use crate::view::context::{ViewContext, ViewKind};
use crate::view::intent::{Field, Pane, RenderIntent, Target};

const PANE: Pane = Pane::BuildHistory;

pub struct BuildHistoryBinding {
    view: Rc<dyn ViewContext>,
}

impl BuildHistoryBinding {
    pub fn new(view: Rc<dyn ViewContext>) -> Self {
        Self { view }
    }
}

fn cell_intents(build: &Build, out: &mut Vec<RenderIntent>) {
    let target = Target::Build(build.id);
    out.push(RenderIntent::set_text(
        PANE,
        target,
        Field::Number,
        build.display_number(),
    ));
    out.push(RenderIntent::set_text(
        PANE,
        target,
        Field::StartedAt,
        format_timestamp(build.started_at.as_ref()),
    ));
    out.push(RenderIntent::set_text(
        PANE,
        target,
        Field::FinishedAt,
        format_timestamp(build.finished_at.as_ref()),
    ));
    out.push(RenderIntent::SetColor {
        pane: PANE,
        target,
        color: build.color(),
    });
}

impl ViewBinding for BuildHistoryBinding {
    fn name(&self) -> &'static str {
        "build_history"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[EventKind::BuildStarted, EventKind::BuildFinished]
    }

    fn applies(&self, event: &BuildEvent, _scope: &Scope<'_>) -> bool {
        self.view.is_on(ViewKind::BuildHistory)
            && self.view.is_showing_repository(event.repository_id())
    }

    fn render(&self, event: &BuildEvent, scope: &Scope<'_>, out: &mut Vec<RenderIntent>) {
        let Some(build) = scope.store.build(event.repository_id(), event.build_id()) else {
            return;
        };
        let target = Target::Build(build.id);

        match (event, scope.applied.build) {
            // Finishing an existing row only touches its finished_at and color cells.
            (BuildEvent::Finished(_), Some(Placement::Unchanged)) => {
                out.push(RenderIntent::set_text(
                    PANE,
                    target,
                    Field::FinishedAt,
                    format_timestamp(build.finished_at.as_ref()),
                ));
                out.push(RenderIntent::SetColor {
                    pane: PANE,
                    target,
                    color: build.color(),
                });
            }
            (_, Some(Placement::Inserted)) => {
                out.push(RenderIntent::InsertRow {
                    pane: PANE,
                    target,
                    position: 0,
                });
                cell_intents(build, out);
            }
            (_, Some(Placement::Moved { .. })) => {
                out.push(RenderIntent::MoveRow {
                    pane: PANE,
                    target,
                    position: 0,
                });
                cell_intents(build, out);
            }
            (_, _) => cell_intents(build, out),
        }
    }

    fn mount(&self, store: &EntityStore, out: &mut Vec<RenderIntent>) {
        out.push(RenderIntent::Clear { pane: PANE });
        if !self.view.is_on(ViewKind::BuildHistory) {
            return;
        }
        let Some(repository) = self.view.current_repository().and_then(|id| store.repository(id))
        else {
            return;
        };
        for (position, build) in repository.builds().iter().enumerate() {
            out.push(RenderIntent::InsertRow {
                pane: PANE,
                target: Target::Build(build.id),
                position,
            });
            cell_intents(build, out);
        }
    }
}
