//! Local command routing.
//!
//! Transcripts are matched against an ordered table of keyword entries.
//! The first entry with a keyword contained in the transcript wins, so an
//! utterance mentioning both weather and time is answered as weather.

use chrono::{DateTime, Local};

pub mod quick_actions;

/// Produces a reply from the instant the command was heard
pub type CommandHandler = fn(&DateTime<Local>) -> String;

#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub keywords: Vec<String>,
    handler: CommandHandler,
}

impl Command {
    pub fn new(name: impl Into<String>, keywords: &[&str], handler: CommandHandler) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            handler,
        }
    }

    /// Case-sensitive substring match on any keyword
    pub fn matches(&self, transcript: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && transcript.contains(keyword.as_str()))
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("keywords", &self.keywords)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandRouter {
    commands: Vec<Command>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Router preloaded with the built-in commands
    pub fn with_default_commands() -> Self {
        create_default_router()
    }

    /// Append a command; it ranks below everything registered before it
    pub fn register(&mut self, name: &str, keywords: &[&str], handler: CommandHandler) {
        self.commands.push(Command::new(name, keywords, handler));
    }

    /// Registered commands in priority order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn find_command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|command| command.name == name)
    }

    /// Resolve a transcript against the current wall-clock time
    pub fn route(&self, transcript: &str) -> Option<String> {
        self.route_at(transcript, &Local::now())
    }

    /// Resolve a transcript as if heard at `now`
    pub fn route_at(&self, transcript: &str, now: &DateTime<Local>) -> Option<String> {
        let command = self
            .commands
            .iter()
            .find(|command| command.matches(transcript))?;

        let reply = (command.handler)(now);
        if reply.trim().is_empty() {
            log::warn!("Command '{}' produced an empty reply", command.name);
            return None;
        }

        log::debug!("Transcript matched local command '{}'", command.name);
        Some(reply)
    }
}

/// Build the router with the built-in commands in priority order
pub fn create_default_router() -> CommandRouter {
    let mut router = CommandRouter::new();

    router.register("weather", &["날씨"], quick_actions::weather);
    router.register("time", &["시간", "몇 시"], quick_actions::current_time);
    router.register("date", &["날짜"], quick_actions::current_date);
    router.register("news", &["뉴스"], quick_actions::news);
    router.register("calculation", &["계산"], quick_actions::calculation);

    router
}
