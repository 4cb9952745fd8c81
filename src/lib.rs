//! Catapult - conversation-state and token-budget engine for AI mock interviews

pub mod config;
pub mod engine;
pub mod error;
pub mod provider;
pub mod store;
pub mod tokens;
pub mod transcript;
pub mod transcription;

pub use config::Config;
pub use engine::{CandidateProfile, InterviewEngine, InterviewState, Turn};
pub use error::{CatapultError, CompletionError, Result};
pub use provider::{CompletionOptions, CompletionProvider, CompletionResponse, OpenAiProvider, Usage};
pub use store::{ListStore, MemoryListStore};
pub use transcript::{Message, Role, Transcript};
pub use transcription::Transcriber;
