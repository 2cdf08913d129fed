//! Build detail page: status chrome and the live log of one build.

use std::rc::Rc;

use super::{Scope, ViewBinding};
use crate::events::build::{BuildEvent, EventKind};
use crate::models::build::{format_timestamp, Build};
use crate::services::update_router::LogOutcome;
use crate::store::EntityStore;
use crate::view::context::{ViewContext, ViewKind};
use crate::view::intent::{Field, Pane, RenderIntent, Target};

const PANE: Pane = Pane::BuildDetail;

pub struct BuildLogBinding {
    view: Rc<dyn ViewContext>,
}

impl BuildLogBinding {
    pub fn new(view: Rc<dyn ViewContext>) -> Self {
        Self { view }
    }
}

fn status_intents(build: &Build, out: &mut Vec<RenderIntent>) {
    let target = Target::Build(build.id);
    out.push(RenderIntent::set_text(
        PANE,
        target,
        Field::Number,
        build.display_number(),
    ));
    out.push(RenderIntent::set_text(PANE, target, Field::State, build.state.as_str()));
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

impl ViewBinding for BuildLogBinding {
    fn name(&self) -> &'static str {
        "build_log"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[EventKind::BuildLog, EventKind::BuildFinished]
    }

    fn applies(&self, event: &BuildEvent, scope: &Scope<'_>) -> bool {
        if !(self.view.is_on(ViewKind::BuildDetail) && self.view.is_showing_build(event.build_id())) {
            return false;
        }
        match event {
            BuildEvent::Log(_) => scope.applied.log == Some(LogOutcome::Appended),
            BuildEvent::Started(_) | BuildEvent::Finished(_) => true,
        }
    }

    fn render(&self, event: &BuildEvent, scope: &Scope<'_>, out: &mut Vec<RenderIntent>) {
        match event {
            BuildEvent::Log(payload) => out.push(RenderIntent::append_text(
                PANE,
                Target::Build(payload.build_id),
                Field::Log,
                payload.log.as_str(),
            )),
            BuildEvent::Finished(_) | BuildEvent::Started(_) => {
                if let Some(build) = scope.store.build(event.repository_id(), event.build_id()) {
                    status_intents(build, out);
                }
            }
        }
    }

    fn mount(&self, store: &EntityStore, out: &mut Vec<RenderIntent>) {
        out.push(RenderIntent::Clear { pane: PANE });
        if !self.view.is_on(ViewKind::BuildDetail) {
            return;
        }
        let (Some(repository), Some(build)) = (self.view.current_repository(), self.view.current_build())
        else {
            return;
        };
        let Some(build) = store.build(repository, build) else {
            tracing::debug!(repository_id = %repository, build_id = %build, "Build not in store");
            return;
        };
        let target = Target::Build(build.id);
        out.push(RenderIntent::set_text(
            PANE,
            target,
            Field::StartedAt,
            format_timestamp(build.started_at.as_ref()),
        ));
        status_intents(build, out);
        out.push(RenderIntent::set_text(PANE, target, Field::Log, build.log.as_str()));
    }
}
