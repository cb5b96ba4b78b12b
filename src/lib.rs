//! Sales conversation trainer.
//!
//! A rep practises calls against a simulated prospect whose persona shapes
//! the language-model prompt, then gets heuristic scores and coaching tips.
//! Language model, speech-to-text and text-to-speech providers sit behind the
//! ports in [`domain::ports`], so vendors can be swapped from configuration.

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::storage::LocalStorage;
pub use config::TrainerConfig;
pub use core::{agent::ProspectAgent, session::TrainingSession};
pub use utils::error::{Result, TrainerError};
