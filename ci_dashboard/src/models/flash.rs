//! Two-state flash animation shown while a repository has a build in progress.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashState {
    #[default]
    Idle,
    Flashing,
}

/// A transition that actually happened. Repeated starts or stops produce none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashTransition {
    Started,
    Stopped,
}

impl FlashState {
    pub fn start(&mut self) -> Option<FlashTransition> {
        match self {
            FlashState::Idle => {
                *self = FlashState::Flashing;
                Some(FlashTransition::Started)
            }
            FlashState::Flashing => None,
        }
    }

    pub fn stop(&mut self) -> Option<FlashTransition> {
        match self {
            FlashState::Flashing => {
                *self = FlashState::Idle;
                Some(FlashTransition::Stopped)
            }
            FlashState::Idle => None,
        }
    }

    pub fn is_flashing(self) -> bool {
        self == FlashState::Flashing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut flash = FlashState::default();
        assert_eq!(flash.stop(), None);
        assert_eq!(flash.start(), Some(FlashTransition::Started));
        assert_eq!(flash.start(), None);
        assert!(flash.is_flashing());
        assert_eq!(flash.stop(), Some(FlashTransition::Stopped));
        assert_eq!(flash.stop(), None);
        assert!(!flash.is_flashing());
    }
}
