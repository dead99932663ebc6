use super::prompts::SystemPrompts;
use crate::history::TurnSink;
use crate::types::Turn;
use std::collections::VecDeque;
use std::sync::Arc;

/// Ordered record of completed turns, oldest first
pub struct ContextStore {
    turns: VecDeque<Turn>,
    max_turns: Option<usize>,
    store: Option<Arc<dyn TurnSink>>,
}

impl ContextStore {
    /// Create a store; `None` keeps every turn for the life of the process
    pub fn new(max_turns: Option<usize>) -> Self {
        Self {
            turns: VecDeque::new(),
            max_turns,
            store: None,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Attach the durable collaborator that receives every appended turn
    pub fn with_store(mut self, store: Arc<dyn TurnSink>) -> Self {
        self.store = Some(store);
        self
    }

    /// Add a turn to the tail and forward it to the durable store.
    ///
    /// Never fails: a persistence error is logged and the in-memory history
    /// keeps the turn regardless.
    pub async fn append(&mut self, turn: Turn) {
        if turn.user_text().trim().is_empty() {
            log::warn!("Refusing to record a turn without user text");
            return;
        }

        if let Some(store) = &self.store {
            if let Err(e) = store.append(&turn).await {
                log::error!("Failed to persist conversation turn: {}", e);
            }
        }

        self.turns.push_back(turn);
        self.trim_context();
    }

    /// Build the generation prompt for `new_user_text` from the history
    pub fn render_prompt(&self, new_user_text: &str) -> String {
        let history = self
            .turns
            .iter()
            .map(|turn| format!("User: {}\nAI: {}", turn.user_text(), turn.ai_text()))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{}\nUser: {}\nAI: {}",
            history,
            new_user_text,
            SystemPrompts::concise_reply_instruction()
        )
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.back()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> Option<usize> {
        self.max_turns
    }

    /// Forget in-memory turns; the durable store is untouched
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Rough approximation: 1 token per 4 bytes plus per-turn overhead
    fn estimate_tokens(&self) -> usize {
        self.turns
            .iter()
            .map(|turn| (turn.user_text().len() + turn.ai_text().len()) / 4 + 10)
            .sum()
    }

    fn trim_context(&mut self) {
        if let Some(max_turns) = self.max_turns {
            while self.turns.len() > max_turns {
                self.turns.pop_front();
            }
        }
    }

    /// Get context summary for debugging
    pub fn summary(&self) -> String {
        match self.max_turns {
            Some(limit) => format!(
                "Context: {} turns, ~{} tokens (limit: {} turns)",
                self.len(),
                self.estimate_tokens(),
                limit
            ),
            None => format!(
                "Context: {} turns, ~{} tokens (unbounded)",
                self.len(),
                self.estimate_tokens()
            ),
        }
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::unbounded()
    }
}
