use crate::config::toml_config::TrainerConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "sales-trainer")]
#[command(about = "Practice realistic sales conversations against an AI prospect")]
pub struct CliConfig {
    /// Path to a TOML configuration file (defaults to ./sales-trainer.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, global = true)]
    pub recordings_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Do not download the dataset before practising")]
    pub skip_dataset: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Interactive practice session over stdin
    Practice(SessionArgs),
    /// Send a single line and print the prospect's reply
    Say {
        text: String,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Transcribe an audio file (wav/mp3/m4a)
    Transcribe { file: PathBuf },
    /// Score a saved session transcript
    Analyze {
        file: PathBuf,
        #[arg(long)]
        scenario: Option<String>,
    },
    /// List saved sessions, newest first
    Sessions {
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// Re-score every saved session as CSV
    Report {
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        scenario: Option<String>,
    },
    /// Download the call-center speech dataset
    Dataset {
        /// Dataset handle in owner/slug form
        #[arg(long)]
        dataset: Option<String>,
    },
    /// List personas and scenarios
    Personas,
}

#[derive(Debug, Clone, Default, Args)]
pub struct SessionArgs {
    #[arg(long)]
    pub scenario: Option<String>,

    #[arg(long)]
    pub persona: Option<String>,

    #[arg(long, help = "Synthesize prospect replies to WAV files")]
    pub voice: bool,

    #[arg(long, help = "Do not save transcripts")]
    pub no_save: bool,
}

impl CliConfig {
    pub fn apply_to(&self, config: &mut TrainerConfig) {
        if let Some(dir) = &self.recordings_dir {
            config.session.recordings_dir = dir.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.session.data_dir = dir.clone();
        }
        if self.skip_dataset {
            config.dataset.auto_download = false;
        }

        match &self.command {
            Command::Practice(session) | Command::Say { session, .. } => {
                session.apply_to(config)
            }
            Command::Analyze {
                scenario: Some(scenario),
                ..
            }
            | Command::Report {
                scenario: Some(scenario),
                ..
            } => config.session.scenario = scenario.clone(),
            Command::Dataset {
                dataset: Some(handle),
            } => config.dataset.handle = handle.clone(),
            _ => {}
        }
    }
}

impl SessionArgs {
    pub fn apply_to(&self, config: &mut TrainerConfig) {
        if let Some(scenario) = &self.scenario {
            config.session.scenario = scenario.clone();
        }
        if let Some(persona) = &self.persona {
            config.session.persona = persona.clone();
        }
        if self.voice {
            config.session.voice_enabled = true;
        }
        if self.no_save {
            config.session.save_recordings = false;
        }
    }
}
