use crate::domain::model::{AudioClip, CompletionRequest, DatasetRequest, Persona};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// File names directly under `dir`, unsorted. A missing directory yields an empty list.
    fn list_files(&self, dir: &str)
        -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
    /// Location a relative path resolves to, for reporting.
    fn resolve(&self, path: &str) -> PathBuf;
}

pub trait ConfigProvider: Send + Sync {
    fn recordings_dir(&self) -> &Path;
    fn data_dir(&self) -> &Path;
    fn save_recordings(&self) -> bool;
    fn voice_enabled(&self) -> bool;
    fn reply_timeout(&self) -> Duration;
    fn history_turns(&self) -> usize;
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[async_trait]
pub trait SpeechToText: Send + Sync {
    fn name(&self) -> &str;
    async fn transcribe(&self, clip: &AudioClip) -> Result<String>;
}

#[async_trait]
pub trait TextToSpeech: Send + Sync {
    fn name(&self) -> &str;
    /// Returns WAV bytes.
    async fn synthesize(&self, text: &str, persona: &Persona) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn ensure(&self, request: &DatasetRequest) -> Result<PathBuf>;
}
