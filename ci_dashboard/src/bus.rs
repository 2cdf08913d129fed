//! Synchronous, in-order event bus.
//!
//! Handlers run one after another in subscription order, on the caller's
//! thread. A handler that wants to publish does so through its [`Outbox`]; those
//! events are delivered after the current event's whole handler chain.

use std::collections::VecDeque;

use crate::events::build::{BuildEvent, EventKind};

pub type Handler<S> = Box<dyn FnMut(&BuildEvent, &mut S, &mut Outbox)>;

/// Events published from inside a handler, delivered after the current event.
#[derive(Debug, Default)]
pub struct Outbox {
    events: Vec<BuildEvent>,
}

impl Outbox {
    pub fn publish(&mut self, event: BuildEvent) {
        self.events.push(event);
    }
}

struct Subscription<S> {
    kind: EventKind,
    handler: Handler<S>,
}

/// Fire-and-forget pub/sub over build events. `S` is the state handed to every handler.
pub struct EventBus<S> {
    subscriptions: Vec<Subscription<S>>,
    queue: VecDeque<BuildEvent>,
}

impl<S> Default for EventBus<S> {
    fn default() -> Self {
        Self {
            subscriptions: Vec::new(),
            queue: VecDeque::new(),
        }
    }
}

impl<S> EventBus<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F)
    where
        F: FnMut(&BuildEvent, &mut S, &mut Outbox) + 'static,
    {
        self.subscriptions.push(Subscription {
            kind,
            handler: Box::new(handler),
        });
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscriptions.iter().filter(|s| s.kind == kind).count()
    }

    /// Delivers `event` and everything its handlers publish, FIFO.
    /// Returns the number of events delivered.
    pub fn publish(&mut self, event: BuildEvent, state: &mut S) -> usize {
        self.queue.push_back(event);
        let mut delivered = 0;

        while let Some(event) = self.queue.pop_front() {
            let kind = event.kind();
            let mut outbox = Outbox::default();
            for subscription in self.subscriptions.iter_mut().filter(|s| s.kind == kind) {
                (subscription.handler)(&event, state, &mut outbox);
            }
            tracing::trace!(event = %kind, follow_ups = outbox.events.len(), "Delivered event");
            self.queue.extend(outbox.events);
            delivered += 1;
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn log_event(build: i64, delta: &str) -> BuildEvent {
        BuildEvent::decode(
            "build:log",
            json!({ "repository_id": 1, "build_id": build, "log": delta }),
        )
        .unwrap()
    }

    #[test]
    fn delivers_in_subscription_order_to_matching_kind_only() {
        let mut bus: EventBus<Vec<String>> = EventBus::new();
        bus.subscribe(EventKind::BuildLog, |_, seen, _| seen.push("first".into()));
        bus.subscribe(EventKind::BuildStarted, |_, seen, _| seen.push("started".into()));
        bus.subscribe(EventKind::BuildLog, |_, seen, _| seen.push("second".into()));

        let mut seen = Vec::new();
        assert_eq!(bus.publish(log_event(1, "x"), &mut seen), 1);
        assert_eq!(seen, vec!["first", "second"]);
        assert_eq!(bus.subscriber_count(EventKind::BuildLog), 2);
    }

    #[test]
    fn reentrant_publish_runs_after_the_current_chain() {
        let mut bus: EventBus<Vec<String>> = EventBus::new();
        bus.subscribe(EventKind::BuildLog, |event, seen, outbox| {
            let BuildEvent::Log(payload) = event else { return };
            seen.push(format!("a:{}", payload.log));
            if payload.log == "outer" {
                outbox.publish(log_event(1, "inner"));
            }
        });
        bus.subscribe(EventKind::BuildLog, |event, seen, _| {
            let BuildEvent::Log(payload) = event else { return };
            seen.push(format!("b:{}", payload.log));
        });

        let mut seen = Vec::new();
        assert_eq!(bus.publish(log_event(1, "outer"), &mut seen), 2);
        assert_eq!(seen, vec!["a:outer", "b:outer", "a:inner", "b:inner"]);
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let mut bus: EventBus<u32> = EventBus::new();
        let mut state = 0;
        assert_eq!(bus.publish(log_event(1, "x"), &mut state), 1);
        assert_eq!(state, 0);
    }
}
