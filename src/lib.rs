//! Turn-taking voice conversation loop.
//!
//! A single controller listens, answers simple requests from a local command
//! table, falls back to Gemini for everything else, and speaks the reply,
//! never listening and speaking at the same time.

pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod llm;
pub mod speech;
pub mod types;

pub use error::{ChatError, Result};
pub use types::*;
