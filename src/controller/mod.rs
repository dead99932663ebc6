//! Turn-taking orchestration.
//!
//! One controller drives capture → route → generate → speak as a single
//! serialized loop. Capture and playback never overlap: the `speaking` flag
//! is set right before `speak` and cleared right after it returns on every
//! path, and no capture is issued while it is set.

pub mod state;

pub use state::{TurnEvent, TurnState};

use crate::commands::CommandRouter;
use crate::config::ConversationConfig;
use crate::error::{ChatError, Result};
use crate::history::TurnSink;
use crate::llm::context::ContextStore;
use crate::llm::generator::{GenerationFailure, GenerationOutcome, ResponseGenerator};
use crate::speech::{RecognitionOutcome, SpeechIo};
use crate::types::Turn;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// How a routed transcript will be answered
enum Reply {
    Local(String),
    Farewell(String),
    Generated(String),
}

pub struct TurnController {
    state: TurnState,
    speaking: bool,
    speech: Box<dyn SpeechIo>,
    generator: Arc<dyn ResponseGenerator>,
    router: CommandRouter,
    context: ContextStore,
    transcript: Arc<dyn TurnSink>,
    config: ConversationConfig,
    events: broadcast::Sender<TurnEvent>,
}

impl TurnController {
    pub fn new(
        speech: Box<dyn SpeechIo>,
        generator: Arc<dyn ResponseGenerator>,
        router: CommandRouter,
        context: ContextStore,
        transcript: Arc<dyn TurnSink>,
        config: ConversationConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(64);

        Self {
            state: TurnState::Idle,
            speaking: false,
            speech,
            generator,
            router,
            context,
            transcript,
            config,
            events,
        }
    }

    /// Receive state and turn notifications
    pub fn subscribe(&self) -> broadcast::Receiver<TurnEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// True only while a `speak` call is in flight
    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    pub fn history(&self) -> &ContextStore {
        &self.context
    }

    pub fn config(&self) -> &ConversationConfig {
        &self.config
    }

    /// Run turns until the termination phrase is heard or `shutdown` fires
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<()> {
        log::info!("🎧 Turn loop started");

        while !self.state.is_terminal() {
            if shutdown.is_cancelled() {
                log::info!("Shutdown requested between turns");
                self.transition(TurnState::Terminated)?;
                break;
            }
            self.turn(Some(&shutdown)).await?;
        }

        log::info!("👋 Turn loop finished ({})", self.context.summary());
        Ok(())
    }

    /// Drive exactly one turn, returning the state it ends in
    pub async fn run_turn(&mut self) -> Result<TurnState> {
        self.turn(None).await
    }

    async fn turn(&mut self, shutdown: Option<&CancellationToken>) -> Result<TurnState> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }
        if self.speaking {
            return Err(ChatError::Busy);
        }

        self.transition(TurnState::Capturing)?;

        let outcome = match shutdown {
            Some(token) => {
                let captured = tokio::select! {
                    outcome = self.speech.capture() => Some(outcome),
                    _ = token.cancelled() => None,
                };
                match captured {
                    Some(outcome) if !token.is_cancelled() => outcome,
                    _ => {
                        log::info!("Shutdown requested while listening");
                        self.transition(TurnState::Terminated)?;
                        return Ok(self.state);
                    }
                }
            }
            None => self.speech.capture().await,
        };

        let transcript = outcome.primary_transcript().to_string();
        if transcript.trim().is_empty() {
            self.recover_from_recognition(outcome).await?;
            return Ok(self.state);
        }

        log::info!("📝 Recognized: '{}'", transcript);
        self.transition(TurnState::Routing)?;

        let reply = match self.router.route(&transcript) {
            Some(reply) => Reply::Local(reply),
            None if self.is_termination(&transcript) => {
                Reply::Farewell(self.config.farewell.clone())
            }
            None => {
                self.transition(TurnState::Generating)?;
                Reply::Generated(self.generate_reply(&transcript).await)
            }
        };

        self.transition(TurnState::Speaking)?;

        let (spoken, terminate) = match reply {
            Reply::Local(text) | Reply::Generated(text) => {
                self.record_turn(Turn::new(transcript.as_str(), text.as_str()))
                    .await;
                (text, false)
            }
            Reply::Farewell(text) => (text, true),
        };

        log::info!("User: {} | AI: {}", transcript, spoken);
        self.speak_guarded(&spoken).await;

        if terminate {
            self.transition(TurnState::Terminated)?;
        } else {
            self.transition(TurnState::Idle)?;
        }
        Ok(self.state)
    }

    fn is_termination(&self, transcript: &str) -> bool {
        let keyword = self.config.termination_keyword.as_str();
        !keyword.is_empty() && transcript.contains(keyword)
    }

    /// Apologize and return to `Idle` without touching the history.
    ///
    /// The apology is spoken in `Speaking`; `Idle` is only announced once
    /// playback is over.
    async fn recover_from_recognition(&mut self, outcome: RecognitionOutcome) -> Result<()> {
        let (detail, apology) = match outcome {
            RecognitionOutcome::ServiceUnavailable(detail) => {
                (detail, self.config.service_apology.clone())
            }
            _ => ("no speech detected".to_string(), self.config.apology.clone()),
        };

        log::warn!("Recognition failed: {}", detail);
        self.emit(TurnEvent::RecognitionFailed(detail));

        self.transition(TurnState::Speaking)?;
        self.speak_guarded(&apology).await;
        self.transition(TurnState::Idle)?;
        Ok(())
    }

    /// Ask the generator for a reply, substituting the fallback on failure
    async fn generate_reply(&mut self, transcript: &str) -> String {
        let prompt = self.context.render_prompt(transcript);
        let generator = Arc::clone(&self.generator);
        let max_tokens = self.config.max_tokens;
        let temperature = self.config.temperature;
        let timeout = self.config.generation_timeout;

        let mut handle = tokio::spawn(async move {
            generator.generate(&prompt, max_tokens, temperature).await
        });

        let outcome = match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => GenerationOutcome::GenerationFailed(GenerationFailure::Transport(
                format!("generation task failed: {}", e),
            )),
            Err(_) => {
                handle.abort();
                GenerationOutcome::GenerationFailed(GenerationFailure::Timeout(timeout))
            }
        };

        match outcome {
            GenerationOutcome::Generated(text) => text,
            GenerationOutcome::GenerationFailed(failure) => {
                log::error!("Generation request failed: {}", failure);
                self.emit(TurnEvent::GenerationFailed(failure.to_string()));
                self.config.fallback_reply.clone()
            }
        }
    }

    async fn record_turn(&mut self, turn: Turn) {
        if let Err(e) = self.transcript.append(&turn).await {
            log::error!("Failed to write transcript: {}", e);
        }
        self.context.append(turn.clone()).await;
        self.emit(TurnEvent::TurnCompleted(turn));
    }

    /// Speak with the capture lock held; the flag is cleared on every exit
    async fn speak_guarded(&mut self, text: &str) {
        self.speaking = true;
        let result = self.speech.speak(text).await;
        self.speaking = false;

        if let Err(e) = result {
            log::error!("Speech playback failed: {}", e);
        }
    }

    fn transition(&mut self, next: TurnState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(ChatError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        log::debug!("🔄 {} -> {}", self.state, next);
        self.emit(TurnEvent::StateChanged {
            from: self.state,
            to: next,
            speaking: self.speaking,
        });
        self.state = next;
        Ok(())
    }

    fn emit(&self, event: TurnEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
