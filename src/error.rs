use crate::controller::TurnState;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: TurnState, to: TurnState },

    #[error("Capture deferred while speech playback is in progress")]
    Busy,

    #[error("Speech error: {0}")]
    Speech(#[from] crate::speech::SpeechError),

    #[error("History error: {0}")]
    History(#[from] crate::history::HistoryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
