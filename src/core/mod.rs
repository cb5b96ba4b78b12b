pub mod agent;
pub mod heuristic;
pub mod prompt;
pub mod report;
pub mod scoring;
pub mod session;

pub use crate::domain::model::{Conversation, Persona, Scenario, ScoreReport, Scores};
pub use crate::domain::ports::{ConfigProvider, LanguageModel, SpeechToText, Storage, TextToSpeech};
pub use crate::utils::error::Result;
