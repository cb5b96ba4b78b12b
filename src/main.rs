use clap::Parser;
use sales_trainer::adapters::dataset::KaggleDataset;
use sales_trainer::adapters::llm::{build_language_model, OfflineModel};
use sales_trainer::adapters::speech::{build_synthesizer, build_transcriber};
use sales_trainer::config::{CliConfig, Command};
use sales_trainer::core::agent::{AgentOptions, ProspectAgent, ReplySource};
use sales_trainer::core::report::{list_sessions, load_conversation, score_sessions, write_csv_report};
use sales_trainer::core::scoring::score_conversation;
use sales_trainer::core::session::{TrainingSession, TurnOutcome};
use sales_trainer::domain::model::{Persona, Scenario, ScoreReport, Speaker};
use sales_trainer::domain::ports::{ConfigProvider, DatasetSource, LanguageModel};
use sales_trainer::utils::error::ErrorSeverity;
use sales_trainer::utils::{logger, validation::Validate};
use sales_trainer::{LocalStorage, Result, TrainerConfig};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ sales-trainer failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: CliConfig) -> Result<()> {
    let mut config = TrainerConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;
    tracing::debug!("Effective config: {:?}", config);

    match cli.command {
        Command::Practice(_) => practice(&config).await,
        Command::Say { text, .. } => say(&config, &text).await,
        Command::Transcribe { file } => {
            let session = build_session(&config)?;
            let text = session.transcribe_file(&file).await?;
            println!("{}", text);
            Ok(())
        }
        Command::Analyze { file, .. } => analyze(&config, &file).await,
        Command::Sessions { limit } => sessions(&config, limit).await,
        Command::Report { output, .. } => report(&config, output.as_deref()).await,
        Command::Dataset { .. } => {
            let path = ensure_dataset(&config).await?;
            println!("📁 Dataset available at: {}", path.display());
            Ok(())
        }
        Command::Personas => {
            print_personas();
            Ok(())
        }
    }
}

fn build_session(config: &TrainerConfig) -> Result<TrainingSession<LocalStorage, TrainerConfig>> {
    let model: Arc<dyn LanguageModel> = build_language_model(&config.llm).unwrap_or_else(|e| {
        tracing::warn!("⚠️ {}; prospect replies will use heuristics", e);
        Arc::new(OfflineModel)
    });
    let transcriber = build_transcriber(&config.speech).unwrap_or_else(|e| {
        tracing::warn!("⚠️ {}; audio input disabled", e);
        None
    });
    let synthesizer = build_synthesizer(&config.speech).unwrap_or_else(|e| {
        tracing::warn!("⚠️ {}; voice replies disabled", e);
        None
    });

    let options = AgentOptions {
        max_tokens: config.llm.max_tokens,
        temperature: config.llm.temperature,
        reply_timeout: config.reply_timeout(),
        history_turns: config.history_turns(),
    };
    let agent = ProspectAgent::new(model, options);
    let storage = LocalStorage::new(config.recordings_dir());

    Ok(TrainingSession::new(
        agent,
        storage,
        config.clone(),
        config.scenario()?,
        config.persona(),
    )
    .with_transcriber(transcriber)
    .with_synthesizer(synthesizer))
}

async fn ensure_dataset(config: &TrainerConfig) -> Result<PathBuf> {
    let request = config.dataset_request()?;
    let source = KaggleDataset::from_settings(&config.dataset, config.data_dir());
    source.ensure(&request).await
}

async fn practice(config: &TrainerConfig) -> Result<()> {
    if config.dataset.auto_download {
        if let Err(e) = ensure_dataset(config).await {
            tracing::warn!("⚠️ Dataset download failed or skipped: {}", e);
            eprintln!("⚠️ Dataset download failed or skipped. You can still practise without it.");
        }
    }

    let mut session = build_session(config)?;
    let persona = session.persona().clone();

    println!("🎯 Scenario: {} | Persona: {}", session.scenario(), persona);
    println!("Type your lines to the prospect. Commands: /audio <file>, /analyze, /reset, /history, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            ("/quit" | "/exit", _) => break,
            ("/analyze", _) => print_report(&session.analyze()),
            ("/reset", _) => {
                session.reset();
                println!("Conversation reset.");
            }
            ("/history", _) => {
                for turn in session.conversation().turns() {
                    let speaker = match turn.speaker {
                        Speaker::Rep => "You".to_string(),
                        Speaker::Ai => format!("Prospect ({})", persona),
                    };
                    println!("{}: {}  [{}]", speaker, turn.text, turn.timestamp.to_rfc3339());
                }
            }
            ("/audio", path) if !path.is_empty() => {
                match session.send_audio(Path::new(path)).await {
                    Ok(outcome) => {
                        println!("📝 Transcription: {}", outcome.rep_text);
                        print_outcome(&persona, &outcome);
                    }
                    Err(e) => eprintln!("❌ {}", e.user_friendly_message()),
                }
            }
            ("/audio", _) => eprintln!("Usage: /audio <file.wav|file.mp3|file.m4a>"),
            ("", _) => continue,
            _ => match session.send_text(line).await {
                Ok(outcome) => print_outcome(&persona, &outcome),
                Err(e) => eprintln!("❌ {}", e.user_friendly_message()),
            },
        }
    }

    session.latency().log_final_stats();
    for path in session.saved_transcripts() {
        println!("📁 Transcript saved to: {}", path.display());
    }
    Ok(())
}

async fn say(config: &TrainerConfig, text: &str) -> Result<()> {
    let mut session = build_session(config)?;
    let persona = session.persona().clone();
    let outcome = session.send_text(text).await?;
    print_outcome(&persona, &outcome);
    if let Some(path) = &outcome.transcript_path {
        println!("📁 Transcript saved to: {}", path.display());
    }
    Ok(())
}

async fn analyze(config: &TrainerConfig, file: &Path) -> Result<()> {
    let dir = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let conversation = load_conversation(&LocalStorage::new(dir), &name).await?;
    let report = score_conversation(&conversation, &config.scenario()?);
    print_report(&report);
    Ok(())
}

async fn sessions(config: &TrainerConfig, limit: usize) -> Result<()> {
    let storage = LocalStorage::new(config.recordings_dir());
    let names = list_sessions(&storage, limit).await?;
    if names.is_empty() {
        println!("No saved sessions in {}", config.recordings_dir().display());
    }
    for name in names {
        println!("- {}", name);
    }
    Ok(())
}

async fn report(config: &TrainerConfig, output: Option<&Path>) -> Result<()> {
    let storage = LocalStorage::new(config.recordings_dir());
    let rows = score_sessions(&storage, &config.scenario()?).await?;

    match output {
        Some(path) => {
            write_csv_report(&rows, std::fs::File::create(path)?)?;
            println!("📁 Report with {} sessions saved to: {}", rows.len(), path.display());
        }
        None => write_csv_report(&rows, std::io::stdout().lock())?,
    }
    Ok(())
}

fn print_outcome(persona: &Persona, outcome: &TurnOutcome) {
    let marker = match outcome.reply.source {
        ReplySource::Model => "",
        ReplySource::Heuristic => " (offline)",
    };
    println!("Prospect ({}){}: {}", persona, marker, outcome.reply.text);
    if let Some(path) = &outcome.audio_path {
        println!("🔊 Reply audio: {}", path.display());
    }
}

fn print_report(report: &ScoreReport) {
    println!("Outcome Rating:     {}", report.scores.outcome_rating);
    println!("Confidence Score:   {}", report.scores.confidence_score);
    println!("Objection Handling: {}", report.scores.objection_score);
    if !report.tips.is_empty() {
        println!("Coaching Tips:");
        for tip in &report.tips {
            println!("- {}", tip);
        }
    }
}

fn print_personas() {
    println!("Personas:");
    for persona in Persona::BUILT_IN.iter() {
        let profile = persona.profile();
        println!(
            "- {:<16} tone={:<10} verbosity={:<9} objection_likelihood={:.2}",
            persona.name(),
            profile.tone,
            profile.verbosity,
            profile.objection_likelihood
        );
    }
    println!("Scenarios:");
    for scenario in Scenario::ALL.iter() {
        println!("- {}", scenario);
    }
}
