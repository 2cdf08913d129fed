//! Build lifecycle events pushed to the dashboard.
//!
//! Payloads arrive as JSON under an event name (`build:started`, `build:log`,
//! `build:finished`) and are decoded into [`build::BuildEvent`] before they
//! reach the bus. Anything that fails to decode never touches the store.

pub mod build;
