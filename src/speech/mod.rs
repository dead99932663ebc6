//! Speech capture and playback capabilities.
//!
//! Providers are opaque to the turn loop. The only contract is that each
//! future resolves after its device work is fully done: `capture` after one
//! listen-and-recognize cycle, `speak` after playback has finished.

use async_trait::async_trait;
use thiserror::Error;

pub mod console;

pub use console::ConsoleSpeech;

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Playback failed: {0}")]
    Playback(String),
    #[error("Speech IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One ranked recognition hypothesis
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub transcript: String,
    pub confidence: Option<f32>,
}

/// Result of a single capture attempt
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionOutcome {
    /// Ranked hypotheses, best first
    Recognized { alternatives: Vec<Alternative> },
    NoSpeechDetected,
    ServiceUnavailable(String),
}

impl RecognitionOutcome {
    /// Single-hypothesis recognition without a confidence score
    pub fn recognized(text: impl Into<String>) -> Self {
        RecognitionOutcome::Recognized {
            alternatives: vec![Alternative {
                transcript: text.into(),
                confidence: None,
            }],
        }
    }

    /// Transcript used for routing: the first alternative, or empty
    pub fn primary_transcript(&self) -> &str {
        match self {
            RecognitionOutcome::Recognized { alternatives } => alternatives
                .first()
                .map(|alt| alt.transcript.as_str())
                .unwrap_or(""),
            _ => "",
        }
    }
}

#[async_trait]
pub trait SpeechIo: Send {
    /// Listen once and recognize what was said
    async fn capture(&mut self) -> RecognitionOutcome;

    /// Speak `text`, resolving only once playback is complete
    async fn speak(&mut self, text: &str) -> Result<(), SpeechError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_transcript_is_first_alternative() {
        let outcome = RecognitionOutcome::Recognized {
            alternatives: vec![
                Alternative {
                    transcript: "지금 몇 시야".to_string(),
                    confidence: Some(0.92),
                },
                Alternative {
                    transcript: "지금 몇 시 야".to_string(),
                    confidence: Some(0.41),
                },
            ],
        };
        assert_eq!(outcome.primary_transcript(), "지금 몇 시야");
    }

    #[test]
    fn test_primary_transcript_defaults_to_empty() {
        let empty = RecognitionOutcome::Recognized {
            alternatives: Vec::new(),
        };
        assert_eq!(empty.primary_transcript(), "");
        assert_eq!(RecognitionOutcome::NoSpeechDetected.primary_transcript(), "");
        assert_eq!(
            RecognitionOutcome::ServiceUnavailable("offline".to_string()).primary_transcript(),
            ""
        );
    }
}
