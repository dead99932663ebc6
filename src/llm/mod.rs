pub mod client;
pub mod context;
pub mod generator;
pub mod prompts;

pub use client::*;
pub use context::*;
pub use generator::*;
pub use prompts::*;
