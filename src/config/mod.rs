#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, SessionArgs};
pub use toml_config::{DatasetSettings, LlmSettings, SessionSettings, SpeechSettings, TrainerConfig};
