use crate::config::toml_config::SpeechSettings;
use crate::domain::model::{AudioClip, Persona};
use crate::domain::ports::{SpeechToText, TextToSpeech};
use crate::utils::error::{Result, TrainerError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

pub struct OpenAiTranscriber {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiTranscriber {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        }
    }
}

#[async_trait]
impl SpeechToText for OpenAiTranscriber {
    fn name(&self) -> &str {
        &self.model
    }

    async fn transcribe(&self, clip: &AudioClip) -> Result<String> {
        let file = Part::bytes(clip.bytes.clone())
            .file_name(format!("upload.{}", clip.format.extension()))
            .mime_str(clip.format.mime_type())?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone());

        let mut builder = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.base_url))
            .multipart(form);
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TrainerError::TranscriptionError {
                message: format!("HTTP {}: {}", status, error_text),
            });
        }

        let parsed: TranscriptionResponse = response.json().await?;
        Ok(parsed.text.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
}

pub struct OpenAiSpeech {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    voice_override: Option<String>,
}

impl OpenAiSpeech {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        voice_override: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            voice_override,
        }
    }

    pub fn voice_for(&self, persona: &Persona) -> String {
        if let Some(voice) = &self.voice_override {
            return voice.clone();
        }
        voice_for_tone(persona.profile().tone).to_string()
    }
}

pub fn voice_for_tone(tone: &str) -> &'static str {
    match tone {
        "friendly" => "nova",
        "skeptical" => "onyx",
        "rushed" => "echo",
        "annoyed" => "fable",
        "pragmatic" => "shimmer",
        _ => "alloy",
    }
}

#[async_trait]
impl TextToSpeech for OpenAiSpeech {
    fn name(&self) -> &str {
        &self.model
    }

    async fn synthesize(&self, text: &str, persona: &Persona) -> Result<Vec<u8>> {
        let voice = self.voice_for(persona);
        let body = SpeechBody {
            model: &self.model,
            input: text,
            voice: &voice,
            response_format: "wav",
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/audio/speech", self.base_url))
            .json(&body);
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TrainerError::provider(
                "tts",
                format!("HTTP {}: {}", status, error_text),
            ));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(TrainerError::provider("tts", "empty audio response"));
        }
        Ok(bytes.to_vec())
    }
}

/// `None` when the provider is `none`.
pub fn build_transcriber(settings: &SpeechSettings) -> Result<Option<Arc<dyn SpeechToText>>> {
    match settings.stt_provider.trim().to_ascii_lowercase().as_str() {
        "openai" => Ok(Some(Arc::new(OpenAiTranscriber::new(
            settings.base_url.clone(),
            settings.api_key.clone(),
            settings.stt_model.clone(),
            Duration::from_secs(settings.request_timeout_seconds),
        )))),
        "none" | "" => Ok(None),
        other => Err(TrainerError::UnsupportedProvider {
            kind: "STT".to_string(),
            name: other.to_string(),
        }),
    }
}

pub fn build_synthesizer(settings: &SpeechSettings) -> Result<Option<Arc<dyn TextToSpeech>>> {
    match settings.tts_provider.trim().to_ascii_lowercase().as_str() {
        "openai" => Ok(Some(Arc::new(OpenAiSpeech::new(
            settings.base_url.clone(),
            settings.api_key.clone(),
            settings.tts_model.clone(),
            settings.voice.clone(),
            Duration::from_secs(settings.request_timeout_seconds),
        )))),
        "none" | "" => Ok(None),
        other => Err(TrainerError::UnsupportedProvider {
            kind: "TTS".to_string(),
            name: other.to_string(),
        }),
    }
}
