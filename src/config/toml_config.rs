use crate::domain::model::{DatasetRequest, Persona, Scenario};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, TrainerError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "sales-trainer.toml";
pub const DEFAULT_DATASET: &str = "axondata/call-center-speech-dataset";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub llm: LlmSettings,
    pub speech: SpeechSettings,
    pub session: SessionSettings,
    pub dataset: DatasetSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: String,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_seconds: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 120,
            temperature: 0.7,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub stt_provider: String,
    pub tts_provider: String,
    /// Falls back to `llm.api_key` when unset.
    pub api_key: Option<String>,
    pub base_url: String,
    pub stt_model: String,
    pub tts_model: String,
    pub voice: Option<String>,
    pub request_timeout_seconds: u64,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            stt_provider: "openai".to_string(),
            tts_provider: "openai".to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            stt_model: "whisper-1".to_string(),
            tts_model: "tts-1".to_string(),
            voice: None,
            request_timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub scenario: String,
    pub persona: String,
    pub recordings_dir: PathBuf,
    pub data_dir: PathBuf,
    pub save_recordings: bool,
    pub voice_enabled: bool,
    pub reply_timeout_ms: u64,
    pub history_turns: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            scenario: Scenario::ColdCall.label().to_string(),
            persona: Persona::Friendly.name().to_string(),
            recordings_dir: PathBuf::from("recordings"),
            data_dir: PathBuf::from("data"),
            save_recordings: true,
            voice_enabled: false,
            reply_timeout_ms: 1000,
            history_turns: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    pub handle: String,
    pub base_url: String,
    pub auto_download: bool,
    pub username: Option<String>,
    pub key: Option<String>,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            handle: DEFAULT_DATASET.to_string(),
            base_url: "https://www.kaggle.com".to_string(),
            auto_download: true,
            username: None,
            key: None,
        }
    }
}

impl TrainerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TrainerError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TrainerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Loads `path` when given, else `sales-trainer.toml` if present, else defaults.
    /// Environment overrides are applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Replaces `${VAR}` placeholders; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TrainerError::config(e.to_string()))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get("LLM_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Some(key) = get("LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = get("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(base_url) = get("LLM_BASE_URL") {
            self.llm.base_url = base_url;
        }
        if let Some(provider) = get("STT_PROVIDER") {
            self.speech.stt_provider = provider;
        }
        if let Some(provider) = get("TTS_PROVIDER") {
            self.speech.tts_provider = provider;
        }
        if let Some(username) = get("KAGGLE_USERNAME") {
            self.dataset.username = Some(username);
        }
        if let Some(key) = get("KAGGLE_KEY") {
            self.dataset.key = Some(key);
        }

        if self.speech.api_key.is_none() {
            self.speech.api_key = self.llm.api_key.clone();
        }
    }

    pub fn scenario(&self) -> Result<Scenario> {
        self.session.scenario.parse()
    }

    pub fn persona(&self) -> Persona {
        self.session
            .persona
            .parse()
            .unwrap_or_else(|_| Persona::Other(self.session.persona.clone()))
    }

    pub fn dataset_request(&self) -> Result<DatasetRequest> {
        DatasetRequest::parse(&self.dataset.handle)
    }
}

impl ConfigProvider for TrainerConfig {
    fn recordings_dir(&self) -> &Path {
        &self.session.recordings_dir
    }

    fn data_dir(&self) -> &Path {
        &self.session.data_dir
    }

    fn save_recordings(&self) -> bool {
        self.session.save_recordings
    }

    fn voice_enabled(&self) -> bool {
        self.session.voice_enabled
    }

    fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.session.reply_timeout_ms)
    }

    fn history_turns(&self) -> usize {
        self.session.history_turns
    }
}

impl Validate for TrainerConfig {
    fn validate(&self) -> Result<()> {
        validate_url("llm.base_url", &self.llm.base_url)?;
        validate_url("speech.base_url", &self.speech.base_url)?;
        validate_url("dataset.base_url", &self.dataset.base_url)?;

        validate_non_empty_string("llm.provider", &self.llm.provider)?;
        validate_non_empty_string("llm.model", &self.llm.model)?;
        validate_non_empty_string("speech.stt_model", &self.speech.stt_model)?;
        validate_non_empty_string("speech.tts_model", &self.speech.tts_model)?;

        validate_range("llm.temperature", self.llm.temperature, 0.0, 2.0)?;
        validate_range("llm.max_tokens", self.llm.max_tokens, 1, 4096)?;
        validate_range("session.history_turns", self.session.history_turns, 0, 50)?;

        validate_path(
            "session.recordings_dir",
            &self.session.recordings_dir.to_string_lossy(),
        )?;
        validate_path("session.data_dir", &self.session.data_dir.to_string_lossy())?;

        self.scenario()?;
        self.dataset_request()?;
        Ok(())
    }
}
