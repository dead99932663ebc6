use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One completed user utterance and the reply spoken for it
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    user_text: String,
    ai_text: String,
    timestamp: DateTime<Local>,
}

impl Turn {
    /// Create a turn stamped with the current time
    pub fn new(user_text: impl Into<String>, ai_text: impl Into<String>) -> Self {
        Self::at(user_text, ai_text, Local::now())
    }

    pub fn at(
        user_text: impl Into<String>,
        ai_text: impl Into<String>,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            user_text: user_text.into(),
            ai_text: ai_text.into(),
            timestamp,
        }
    }

    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    pub fn ai_text(&self) -> &str {
        &self.ai_text
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }
}

/// Serialized form of a turn for durable stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub user_text: String,
    pub ai_response: String,
    pub timestamp: DateTime<Local>,
}

impl From<&Turn> for TurnRecord {
    fn from(turn: &Turn) -> Self {
        Self {
            user_text: turn.user_text.clone(),
            ai_response: turn.ai_text.clone(),
            timestamp: turn.timestamp,
        }
    }
}
