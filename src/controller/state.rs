use crate::types::Turn;
use strum::Display;

/// Phase of the turn loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TurnState {
    Idle,
    Capturing,
    Routing,
    Generating,
    Speaking,
    Terminated,
}

impl TurnState {
    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(self, next: TurnState) -> bool {
        use TurnState::*;

        matches!(
            (self, next),
            (Idle, Capturing)
                | (Capturing, Routing)
                | (Capturing, Idle)
                // apology after a failed capture
                | (Capturing, Speaking)
                | (Routing, Speaking)
                | (Routing, Generating)
                | (Generating, Speaking)
                | (Speaking, Idle)
                | (Speaking, Terminated)
                // external shutdown between turns or mid-capture
                | (Idle, Terminated)
                | (Capturing, Terminated)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == TurnState::Terminated
    }
}

/// Notifications for observers such as a UI thread
#[derive(Debug, Clone)]
pub enum TurnEvent {
    StateChanged {
        from: TurnState,
        to: TurnState,
        /// Playback flag at the moment of the transition
        speaking: bool,
    },
    TurnCompleted(Turn),
    RecognitionFailed(String),
    GenerationFailed(String),
}
