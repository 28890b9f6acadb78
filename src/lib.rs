// Public API for integration tests and potential library usage

pub mod api;
pub mod config;
pub mod extract;
pub mod llm;
pub mod matching;
pub mod prompts;
pub mod round;
pub mod state;
pub mod types;
