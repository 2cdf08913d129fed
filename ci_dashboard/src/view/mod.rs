//! View side of the dashboard: which view is on screen, the bindings that keep
//! each view in sync, and the render intents they emit.

pub mod bindings;
pub mod context;
pub mod intent;
pub mod navigation;
pub mod screen;
