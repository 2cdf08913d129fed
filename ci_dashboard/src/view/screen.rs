//! Headless renderer: applies render intents to an in-memory screen model.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::intent::{Field, Pane, RenderIntent, Target};
use crate::models::build::StatusColor;

#[derive(Debug, Default, Serialize)]
pub struct PaneState {
    rows: Vec<Target>,
    fields: BTreeMap<Target, BTreeMap<Field, String>>,
    colors: BTreeMap<Target, StatusColor>,
    flashing: BTreeSet<Target>,
}

impl PaneState {
    fn place_row(&mut self, target: Target, position: usize) {
        self.rows.retain(|row| *row != target);
        let position = position.min(self.rows.len());
        self.rows.insert(position, target);
    }
}

#[derive(Debug, Default, Serialize)]
pub struct Screen {
    panes: BTreeMap<Pane, PaneState>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, intent: &RenderIntent) {
        if let RenderIntent::Clear { pane } = intent {
            self.panes.remove(pane);
            return;
        }
        let pane = self.panes.entry(intent.pane()).or_default();
        match intent {
            RenderIntent::Clear { .. } => {}
            RenderIntent::SetText {
                target,
                field,
                value,
                ..
            } => {
                pane.fields
                    .entry(*target)
                    .or_default()
                    .insert(*field, value.clone());
            }
            RenderIntent::AppendText {
                target,
                field,
                value,
                ..
            } => {
                pane.fields
                    .entry(*target)
                    .or_default()
                    .entry(*field)
                    .or_default()
                    .push_str(value);
            }
            RenderIntent::InsertRow {
                target, position, ..
            }
            | RenderIntent::MoveRow {
                target, position, ..
            } => pane.place_row(*target, *position),
            RenderIntent::SetColor { target, color, .. } => match color {
                Some(color) => {
                    pane.colors.insert(*target, *color);
                }
                None => {
                    pane.colors.remove(target);
                }
            },
            RenderIntent::StartFlashing { target, .. } => {
                pane.flashing.insert(*target);
            }
            RenderIntent::StopFlashing { target, .. } => {
                pane.flashing.remove(target);
            }
        }
    }

    pub fn apply_all<'a>(&mut self, intents: impl IntoIterator<Item = &'a RenderIntent>) {
        for intent in intents {
            self.apply(intent);
        }
    }

    pub fn text(&self, pane: Pane, target: Target, field: Field) -> Option<&str> {
        self.panes
            .get(&pane)?
            .fields
            .get(&target)?
            .get(&field)
            .map(String::as_str)
    }

    pub fn rows(&self, pane: Pane) -> &[Target] {
        self.panes
            .get(&pane)
            .map(|p| p.rows.as_slice())
            .unwrap_or_default()
    }

    pub fn color(&self, pane: Pane, target: Target) -> Option<StatusColor> {
        self.panes.get(&pane)?.colors.get(&target).copied()
    }

    pub fn is_flashing(&self, pane: Pane, target: Target) -> bool {
        self.panes
            .get(&pane)
            .is_some_and(|p| p.flashing.contains(&target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildId, RepositoryId};

    #[test]
    fn rows_insert_and_move_without_duplicates() {
        let mut screen = Screen::new();
        let a = Target::Repository(RepositoryId(1));
        let b = Target::Repository(RepositoryId(2));
        let pane = Pane::RepositoryList;
        screen.apply(&RenderIntent::InsertRow { pane, target: a, position: 0 });
        screen.apply(&RenderIntent::InsertRow { pane, target: b, position: 0 });
        assert_eq!(screen.rows(pane), &[b, a]);
        screen.apply(&RenderIntent::MoveRow { pane, target: a, position: 0 });
        assert_eq!(screen.rows(pane), &[a, b]);
        screen.apply(&RenderIntent::InsertRow { pane, target: b, position: 10 });
        assert_eq!(screen.rows(pane), &[a, b]);
    }

    #[test]
    fn text_colors_and_flashing() {
        let mut screen = Screen::new();
        let build = Target::Build(BuildId(3));
        let pane = Pane::BuildDetail;
        screen.apply(&RenderIntent::set_text(pane, build, Field::Log, "building..."));
        screen.apply(&RenderIntent::append_text(pane, build, Field::Log, " foo!"));
        screen.apply(&RenderIntent::SetColor {
            pane,
            target: build,
            color: Some(StatusColor::Green),
        });
        screen.apply(&RenderIntent::StartFlashing { pane, target: build });
        screen.apply(&RenderIntent::StartFlashing { pane, target: build });

        assert_eq!(screen.text(pane, build, Field::Log), Some("building... foo!"));
        assert_eq!(screen.color(pane, build), Some(StatusColor::Green));
        assert!(screen.is_flashing(pane, build));

        screen.apply(&RenderIntent::StopFlashing { pane, target: build });
        screen.apply(&RenderIntent::SetColor { pane, target: build, color: None });
        assert!(!screen.is_flashing(pane, build));
        assert_eq!(screen.color(pane, build), None);

        screen.apply(&RenderIntent::Clear { pane });
        assert_eq!(screen.text(pane, build, Field::Log), None);
    }
}
