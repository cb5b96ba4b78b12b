use crate::core::agent::{ProspectAgent, Reply};
use crate::core::scoring::score_conversation;
use crate::domain::model::{AudioClip, AudioFormat, Conversation, Persona, Scenario, ScoreReport};
use crate::domain::ports::{ConfigProvider, SpeechToText, Storage, TextToSpeech};
use crate::utils::error::{Result, TrainerError};
use crate::utils::latency::LatencyTracker;
use crate::utils::validation::validate_file_extension;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub rep_text: String,
    pub reply: Reply,
    pub audio_path: Option<PathBuf>,
    pub transcript_path: Option<PathBuf>,
}

/// One practice call: the running conversation plus everything needed to extend it.
pub struct TrainingSession<S: Storage, C: ConfigProvider> {
    id: Uuid,
    started_at: DateTime<Utc>,
    scenario: Scenario,
    persona: Persona,
    conversation: Conversation,
    agent: ProspectAgent,
    transcriber: Option<Arc<dyn SpeechToText>>,
    synthesizer: Option<Arc<dyn TextToSpeech>>,
    storage: S,
    config: C,
    latency: LatencyTracker,
    saved_transcripts: Vec<PathBuf>,
}

impl<S: Storage, C: ConfigProvider> TrainingSession<S, C> {
    pub fn new(
        agent: ProspectAgent,
        storage: S,
        config: C,
        scenario: Scenario,
        persona: Persona,
    ) -> Self {
        let latency = LatencyTracker::new(config.reply_timeout());
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            scenario,
            persona,
            conversation: Conversation::new(),
            agent,
            transcriber: None,
            synthesizer: None,
            storage,
            config,
            latency,
            saved_transcripts: Vec::new(),
        }
    }

    pub fn with_transcriber(mut self, transcriber: Option<Arc<dyn SpeechToText>>) -> Self {
        self.transcriber = transcriber;
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Option<Arc<dyn TextToSpeech>>) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn latency(&self) -> &LatencyTracker {
        &self.latency
    }

    /// Every transcript file written by this session, oldest first.
    pub fn saved_transcripts(&self) -> &[PathBuf] {
        &self.saved_transcripts
    }

    pub fn transcript_file_name(&self) -> String {
        format!(
            "session_{}_{}.json",
            self.started_at.format("%Y%m%dT%H%M%S"),
            self.id.simple()
        )
    }

    pub async fn send_text(&mut self, text: &str) -> Result<TurnOutcome> {
        let rep_text = text.trim().to_string();
        if rep_text.is_empty() {
            return Err(TrainerError::invalid_input(
                "Say something to the prospect before sending",
            ));
        }

        self.conversation.push_rep(rep_text.clone());
        let history_len = self.conversation.len() - 1;
        let reply = self
            .agent
            .reply(
                &rep_text,
                &self.scenario,
                &self.persona,
                &self.conversation.turns()[..history_len],
            )
            .await;
        self.latency.record(reply.latency);
        tracing::debug!("Prospect replied via {:?} in {:?}", reply.source, reply.latency);

        self.conversation.push_ai(reply.text.clone());

        let audio_path = if self.config.voice_enabled() {
            self.speak(&reply.text).await
        } else {
            None
        };

        let transcript_path = if self.config.save_recordings() {
            Some(self.save_transcript().await?)
        } else {
            None
        };

        Ok(TurnOutcome {
            rep_text,
            reply,
            audio_path,
            transcript_path,
        })
    }

    pub async fn send_audio(&mut self, path: &Path) -> Result<TurnOutcome> {
        let text = self.transcribe_file(path).await?;
        self.send_text(&text).await
    }

    /// Stores a copy of the upload next to the transcripts, then transcribes it.
    pub async fn transcribe_file(&self, path: &Path) -> Result<String> {
        let transcriber = self.transcriber.as_ref().ok_or_else(|| {
            TrainerError::UnsupportedProvider {
                kind: "STT".to_string(),
                name: "none".to_string(),
            }
        })?;

        let extension = validate_file_extension(
            "audio_file",
            &path.to_string_lossy(),
            &AudioFormat::EXTENSIONS,
        )?;
        let format = AudioFormat::from_extension(&extension).ok_or_else(|| {
            TrainerError::invalid_input(format!("unsupported audio format: {}", extension))
        })?;

        let bytes = tokio::fs::read(path).await?;
        let upload_name = format!("upload_{}.{}", Uuid::new_v4().simple(), extension);
        self.storage.write_file(&upload_name, &bytes).await?;
        tracing::debug!("Stored upload as {}", upload_name);

        let clip = AudioClip { bytes, format };
        let text = transcriber.transcribe(&clip).await.map_err(|e| match e {
            TrainerError::TranscriptionError { .. } => e,
            other => TrainerError::TranscriptionError {
                message: other.to_string(),
            },
        })?;

        if text.trim().is_empty() {
            return Err(TrainerError::TranscriptionError {
                message: "no speech detected".to_string(),
            });
        }

        tracing::info!("🎙️ Transcription: {}", text.chars().take(200).collect::<String>());
        Ok(text)
    }

    pub fn analyze(&self) -> ScoreReport {
        score_conversation(&self.conversation, &self.scenario)
    }

    /// Starts a fresh conversation. Later turns go to a new transcript file.
    pub fn reset(&mut self) {
        self.conversation.clear();
        self.id = Uuid::new_v4();
        self.started_at = Utc::now();
        tracing::info!("🔄 Conversation reset, next transcript: {}", self.transcript_file_name());
    }

    async fn speak(&self, text: &str) -> Option<PathBuf> {
        let synthesizer = self.synthesizer.as_ref()?;
        match synthesizer.synthesize(text, &self.persona).await {
            Ok(audio) => {
                let name = format!("reply_{}.wav", Uuid::new_v4().simple());
                match self.storage.write_file(&name, &audio).await {
                    Ok(()) => Some(self.storage.resolve(&name)),
                    Err(e) => {
                        tracing::warn!("⚠️ Could not save synthesized audio: {}", e);
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!("⚠️ TTS failed: {}", e);
                None
            }
        }
    }

    async fn save_transcript(&mut self) -> Result<PathBuf> {
        let name = self.transcript_file_name();
        let json = serde_json::to_vec_pretty(&self.conversation)?;
        self.storage.write_file(&name, &json).await?;

        let path = self.storage.resolve(&name);
        if !self.saved_transcripts.contains(&path) {
            self.saved_transcripts.push(path.clone());
        }
        Ok(path)
    }
}
