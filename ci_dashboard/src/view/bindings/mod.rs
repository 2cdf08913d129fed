//! View bindings: each keeps one region of the dashboard in sync with the store.
//!
//! A binding subscribes to the event kinds it cares about, decides per event
//! whether the event concerns what it shows, and only then emits render
//! intents. Bindings never mutate the store and hold no copies of entities.

pub mod build_history;
pub mod build_log;
pub mod repository_list;
pub mod repository_summary;

use crate::events::build::{BuildEvent, EventKind};
use crate::services::update_router::Applied;
use crate::store::EntityStore;

use super::intent::RenderIntent;

pub use build_history::BuildHistoryBinding;
pub use build_log::BuildLogBinding;
pub use repository_list::RepositoryListBinding;
pub use repository_summary::RepositorySummaryBinding;

/// Everything a binding may read while handling an event.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub store: &'a EntityStore,
    /// What the update router did for the event being delivered.
    pub applied: &'a Applied,
}

pub trait ViewBinding {
    fn name(&self) -> &'static str;

    fn interests(&self) -> &'static [EventKind];

    /// Whether `event` concerns what this binding currently shows.
    fn applies(&self, event: &BuildEvent, scope: &Scope<'_>) -> bool;

    /// Emits the effects of an applicable event.
    fn render(&self, event: &BuildEvent, scope: &Scope<'_>, out: &mut Vec<RenderIntent>);

    /// Renders the binding's full current state, e.g. after navigation.
    fn mount(&self, store: &EntityStore, out: &mut Vec<RenderIntent>);
}
