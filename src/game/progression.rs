//! # Level Progression
//!
//! The key and exit state machine of a level:
//!
//! ```text
//! Exploring -> KeyAvailable -> KeyHeld -> ExitConfirmPending -> LevelComplete
//!                                 ^               |
//!                                 +--- cancel ----+
//! ```

use serde::{Deserialize, Serialize};

/// Where the player stands on the way out of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProgressionState {
    /// The boss is still alive or its key has not dropped
    #[default]
    Exploring,
    /// The boss dropped the key and it is waiting to be collected
    KeyAvailable,
    /// The player carries the key
    KeyHeld,
    /// The player touched the exit and the confirmation is showing
    ExitConfirmPending,
    /// The player confirmed the exit; the level is done
    LevelComplete,
}

impl ProgressionState {
    /// Whether the player carries the key in this state.
    pub fn has_key(self) -> bool {
        matches!(
            self,
            ProgressionState::KeyHeld
                | ProgressionState::ExitConfirmPending
                | ProgressionState::LevelComplete
        )
    }

    /// The key dropped somewhere. Only moves out of `Exploring`.
    pub fn key_dropped(&mut self) -> bool {
        self.advance(ProgressionState::Exploring, ProgressionState::KeyAvailable)
    }

    /// The player picked up the key.
    pub fn key_collected(&mut self) -> bool {
        match self {
            ProgressionState::Exploring | ProgressionState::KeyAvailable => {
                *self = ProgressionState::KeyHeld;
                true
            }
            _ => false,
        }
    }

    /// The player touched the exit while holding the key.
    pub fn exit_touched(&mut self) -> bool {
        self.advance(ProgressionState::KeyHeld, ProgressionState::ExitConfirmPending)
    }

    /// The player confirmed leaving the level.
    pub fn confirm(&mut self) -> bool {
        self.advance(ProgressionState::ExitConfirmPending, ProgressionState::LevelComplete)
    }

    /// The player backed out of the confirmation. The key is kept.
    pub fn cancel(&mut self) -> bool {
        self.advance(ProgressionState::ExitConfirmPending, ProgressionState::KeyHeld)
    }

    fn advance(&mut self, from: ProgressionState, to: ProgressionState) -> bool {
        if *self == from {
            *self = to;
            true
        } else {
            false
        }
    }
}

/// Result of checking the player against the exit door.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAttempt {
    /// The player is not touching the exit
    NotAtExit,
    /// Touching the exit without the key
    MissingKey,
    /// The confirmation has just been requested
    ConfirmationShown,
    /// The confirmation was already showing, or the level is done
    AlreadyPending,
}

/// Lets a repeated notice through once every `interval` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeThrottle {
    interval: u32,
    calls: u32,
}

impl NoticeThrottle {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            calls: 0,
        }
    }

    /// Records a call and returns true when the notice should be shown.
    pub fn should_emit(&mut self) -> bool {
        let emit = self.calls % self.interval == 0;
        self.calls = self.calls.wrapping_add(1);
        emit
    }
}
