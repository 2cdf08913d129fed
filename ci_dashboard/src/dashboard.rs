//! Wires the store, the update router and the view bindings onto one event bus.

use std::rc::Rc;

use crate::bus::{EventBus, Outbox};
use crate::error::SyncError;
use crate::events::build::{BuildEvent, EventKind};
use crate::services::update_router::{self, Applied};
use crate::store::EntityStore;
use crate::view::bindings::{
    BuildHistoryBinding, BuildLogBinding, RepositoryListBinding, RepositorySummaryBinding, Scope,
    ViewBinding,
};
use crate::view::context::ViewContext;
use crate::view::intent::RenderIntent;

/// State handed to every bus handler.
#[derive(Debug, Default)]
pub struct SyncState {
    store: EntityStore,
    applied: Applied,
    intents: Vec<RenderIntent>,
}

impl SyncState {
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// What the update router did for the event currently being delivered.
    pub fn applied(&self) -> &Applied {
        &self.applied
    }
}

/// One dashboard instance: owns its store; nothing is global.
pub struct Dashboard {
    bus: EventBus<SyncState>,
    state: SyncState,
    bindings: Vec<Rc<dyn ViewBinding>>,
}

impl Dashboard {
    /// Dashboard with the four standard bindings. `store` must already be seeded.
    pub fn new(store: EntityStore, view: Rc<dyn ViewContext>) -> Self {
        let bindings: Vec<Rc<dyn ViewBinding>> = vec![
            Rc::new(RepositoryListBinding::new()),
            Rc::new(RepositorySummaryBinding::new(Rc::clone(&view))),
            Rc::new(BuildLogBinding::new(Rc::clone(&view))),
            Rc::new(BuildHistoryBinding::new(view)),
        ];
        Self::with_bindings(store, bindings)
    }

    pub fn with_bindings(store: EntityStore, bindings: Vec<Rc<dyn ViewBinding>>) -> Self {
        let mut bus: EventBus<SyncState> = EventBus::new();

        // The router subscribes first so the store is fully updated before any
        // binding observes the event.
        for kind in EventKind::ALL {
            bus.subscribe(kind, |event, state: &mut SyncState, _| {
                state.applied = update_router::route(&mut state.store, event);
            });
        }

        for binding in &bindings {
            for &kind in binding.interests() {
                let binding = Rc::clone(binding);
                bus.subscribe(kind, move |event, state: &mut SyncState, _| {
                    deliver(binding.as_ref(), event, state);
                });
            }
        }

        tracing::debug!(bindings = bindings.len(), "Dashboard bindings subscribed");

        Self {
            bus,
            state: SyncState {
                store,
                ..SyncState::default()
            },
            bindings,
        }
    }

    /// Registers an extra handler; it runs after the router and the bindings.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F)
    where
        F: FnMut(&BuildEvent, &mut SyncState, &mut Outbox) + 'static,
    {
        self.bus.subscribe(kind, handler);
    }

    /// Decodes and publishes a named event from the transport.
    ///
    /// Malformed payloads are rejected before anything is mutated or rendered.
    pub fn dispatch(&mut self, name: &str, payload: serde_json::Value) -> Result<usize, SyncError> {
        let event = BuildEvent::decode(name, payload).map_err(|err| {
            tracing::warn!(event = name, error = %err, "Rejected build event");
            crate::metrics::event_rejected(err.reason());
            err
        })?;
        Ok(self.publish(event))
    }

    /// Publishes a decoded event. Returns how many events were delivered,
    /// including follow-ups published by handlers.
    pub fn publish(&mut self, event: BuildEvent) -> usize {
        crate::metrics::event_received(event.kind());
        let delivered = self.bus.publish(event, &mut self.state);
        crate::metrics::store_gauges(self.state.store.len(), self.state.store.flashing_count());
        delivered
    }

    /// Renders every binding's current state; call after navigation.
    pub fn mount(&mut self) {
        for binding in &self.bindings {
            let before = self.state.intents.len();
            binding.mount(&self.state.store, &mut self.state.intents);
            crate::metrics::intents_rendered(binding.name(), self.state.intents.len() - before);
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.state.store
    }

    /// Render intents emitted since the last call, in order.
    pub fn take_intents(&mut self) -> Vec<RenderIntent> {
        std::mem::take(&mut self.state.intents)
    }
}

fn deliver(binding: &dyn ViewBinding, event: &BuildEvent, state: &mut SyncState) {
    let scope = Scope {
        store: &state.store,
        applied: &state.applied,
    };
    if !binding.applies(event, &scope) {
        tracing::trace!(binding = binding.name(), event = %event.kind(), "Not showing, skipped");
        return;
    }
    let before = state.intents.len();
    binding.render(event, &scope, &mut state.intents);
    crate::metrics::intents_rendered(binding.name(), state.intents.len() - before);
}
