//! Store-side logic: list ordering and the update router that applies build events.

pub mod ordering;
pub mod update_router;
