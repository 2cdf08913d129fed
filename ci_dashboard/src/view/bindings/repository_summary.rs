//! Summary of the current repository: headline of its latest build plus that build's log.

use std::rc::Rc;

use super::{Scope, ViewBinding};
use crate::events::build::{BuildEvent, EventKind};
use crate::models::build::{format_timestamp, Build};
use crate::models::RepositoryId;
use crate::services::update_router::LogOutcome;
use crate::store::EntityStore;
use crate::view::context::{ViewContext, ViewKind};
use crate::view::intent::{Field, Pane, RenderIntent, Target};

const PANE: Pane = Pane::Summary;

pub struct RepositorySummaryBinding {
    view: Rc<dyn ViewContext>,
}

impl RepositorySummaryBinding {
    pub fn new(view: Rc<dyn ViewContext>) -> Self {
        Self { view }
    }

    fn is_showing(&self, repository: RepositoryId) -> bool {
        self.view.is_on(ViewKind::RepositorySummary) && self.view.is_showing_repository(repository)
    }
}

fn headline_intents(repository: RepositoryId, build: &Build, out: &mut Vec<RenderIntent>) {
    let target = Target::Repository(repository);
    out.push(RenderIntent::set_text(
        PANE,
        target,
        Field::Number,
        build.number.to_string(),
    ));
    out.push(RenderIntent::set_text(PANE, target, Field::State, build.state.as_str()));
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

impl ViewBinding for RepositorySummaryBinding {
    fn name(&self) -> &'static str {
        "repository_summary"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[
            EventKind::BuildStarted,
            EventKind::BuildLog,
            EventKind::BuildFinished,
        ]
    }

    fn applies(&self, event: &BuildEvent, scope: &Scope<'_>) -> bool {
        let repository = event.repository_id();
        if !self.is_showing(repository) {
            return false;
        }
        match event {
            // The log pane only shows the latest build.
            BuildEvent::Log(payload) => {
                scope.applied.log == Some(LogOutcome::Appended)
                    && scope
                        .store
                        .repository(repository)
                        .and_then(|r| r.last_build_id())
                        == Some(payload.build_id)
            }
            BuildEvent::Started(_) | BuildEvent::Finished(_) => true,
        }
    }

    fn render(&self, event: &BuildEvent, scope: &Scope<'_>, out: &mut Vec<RenderIntent>) {
        let repository = event.repository_id();
        let target = Target::Repository(repository);

        if let BuildEvent::Log(payload) = event {
            out.push(RenderIntent::append_text(
                PANE,
                target,
                Field::Log,
                payload.log.as_str(),
            ));
            return;
        }

        let Some(build) = scope
            .store
            .repository(repository)
            .and_then(|r| r.last_build())
        else {
            return;
        };
        headline_intents(repository, build, out);
        // The log pane follows the headline onto another build.
        if matches!(event, BuildEvent::Started(_)) || scope.applied.last_build_changed {
            out.push(RenderIntent::set_text(PANE, target, Field::Log, build.log.as_str()));
        }
    }

    fn mount(&self, store: &EntityStore, out: &mut Vec<RenderIntent>) {
        out.push(RenderIntent::Clear { pane: PANE });
        if !self.view.is_on(ViewKind::RepositorySummary) {
            return;
        }
        let Some(repository) = self.view.current_repository().and_then(|id| store.repository(id))
        else {
            return;
        };
        let target = Target::Repository(repository.id);
        out.push(RenderIntent::set_text(
            PANE,
            target,
            Field::Name,
            repository.name.as_str(),
        ));
        if let Some(build) = repository.last_build() {
            headline_intents(repository.id, build, out);
            out.push(RenderIntent::set_text(PANE, target, Field::Log, build.log.as_str()));
        }
    }
}
