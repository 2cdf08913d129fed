//! Centrix CI dashboard — live build synchronization core.
//!
//! Build lifecycle events (`build:started`, `build:log`, `build:finished`)
//! arrive on an [`bus::EventBus`]. The update router keeps the
//! [`store::EntityStore`] authoritative for every event; view bindings then
//! decide, against the current [`view::context::ViewContext`], whether the
//! event concerns what is on screen and emit [`view::intent::RenderIntent`]s
//! for the rendering layer.

pub mod bus;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod metrics;
pub mod models;
pub mod seeder;
pub mod services;
pub mod store;
pub mod view;

pub use dashboard::Dashboard;
pub use error::SyncError;
