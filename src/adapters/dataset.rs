use crate::config::toml_config::DatasetSettings;
use crate::domain::model::DatasetRequest;
use crate::domain::ports::DatasetSource;
use crate::utils::error::{Result, TrainerError};
use async_trait::async_trait;
use reqwest::Client;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Downloads dataset archives from the Kaggle public API and unpacks them under `data_dir`.
pub struct KaggleDataset {
    client: Client,
    base_url: String,
    data_dir: PathBuf,
    username: Option<String>,
    key: Option<String>,
}

impl KaggleDataset {
    pub fn new(base_url: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            data_dir: data_dir.into(),
            username: None,
            key: None,
        }
    }

    pub fn from_settings(settings: &DatasetSettings, data_dir: impl Into<PathBuf>) -> Self {
        Self::new(settings.base_url.clone(), data_dir)
            .with_credentials(settings.username.clone(), settings.key.clone())
    }

    pub fn with_credentials(mut self, username: Option<String>, key: Option<String>) -> Self {
        self.username = username.filter(|u| !u.is_empty());
        self.key = key.filter(|k| !k.is_empty());
        self
    }

    pub fn target_dir(&self, request: &DatasetRequest) -> PathBuf {
        self.data_dir.join(request.directory_name())
    }

    fn download_url(&self, request: &DatasetRequest) -> String {
        format!(
            "{}/api/v1/datasets/download/{}/{}",
            self.base_url, request.owner, request.slug
        )
    }
}

fn has_entries(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Unpacks via a sibling `.partial` directory; `target` only appears once extraction succeeded.
fn extract_archive(bytes: Vec<u8>, target: &Path) -> Result<()> {
    let staging_name = format!(
        "{}.partial",
        target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    );
    let staging = target.with_file_name(staging_name);
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;

    let unpacked = zip::ZipArchive::new(Cursor::new(bytes))
        .and_then(|mut archive| archive.extract(&staging));
    if let Err(e) = unpacked {
        let _ = fs::remove_dir_all(&staging);
        return Err(e.into());
    }

    if target.exists() {
        fs::remove_dir_all(target)?;
    }
    fs::rename(&staging, target)?;
    Ok(())
}

#[async_trait]
impl DatasetSource for KaggleDataset {
    async fn ensure(&self, request: &DatasetRequest) -> Result<PathBuf> {
        let target = self.target_dir(request);
        if has_entries(&target) {
            tracing::info!("📦 Dataset {} already present at {}", request.handle(), target.display());
            return Ok(target);
        }

        fs::create_dir_all(&self.data_dir)?;
        tracing::info!("⬇️ Downloading dataset {}", request.handle());

        let mut builder = self.client.get(self.download_url(request));
        if let (Some(user), Some(key)) = (&self.username, &self.key) {
            builder = builder.basic_auth(user, Some(key));
        }

        let response = builder.send().await.map_err(|e| TrainerError::DatasetError {
            message: format!("request for {} failed: {}", request.handle(), e),
        })?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TrainerError::DatasetError {
                message: format!("{} returned HTTP {}: {}", request.handle(), status, error_text),
            });
        }

        let bytes = response.bytes().await?.to_vec();
        tracing::debug!("Extracting {} bytes into {}", bytes.len(), target.display());

        let extract_target = target.clone();
        tokio::task::spawn_blocking(move || extract_archive(bytes, &extract_target))
            .await
            .map_err(|e| TrainerError::DatasetError {
                message: format!("extraction task failed: {}", e),
            })??;

        tracing::info!("✅ Dataset {} ready at {}", request.handle(), target.display());
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::{FileOptions, ZipWriter};

    fn sample_zip() -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file::<_, ()>("metadata.csv", FileOptions::default())
            .unwrap();
        zip.write_all(b"file,transcript\ncall_1.wav,hello\n").unwrap();
        zip.start_file::<_, ()>("audio/call_1.wav", FileOptions::default())
            .unwrap();
        zip.write_all(b"RIFF").unwrap();
        zip.finish().unwrap().into_inner()
    }

    fn request() -> DatasetRequest {
        DatasetRequest::parse("axondata/call-center-speech-dataset").unwrap()
    }

    #[tokio::test]
    async fn test_download_and_extract() {
        let data_dir = TempDir::new().unwrap();
        let server = MockServer::start();
        let download_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/datasets/download/axondata/call-center-speech-dataset");
            then.status(200)
                .header("Content-Type", "application/zip")
                .body(sample_zip());
        });

        let source = KaggleDataset::new(server.base_url(), data_dir.path());
        let path = source.ensure(&request()).await.unwrap();

        download_mock.assert();
        assert_eq!(
            path,
            data_dir.path().join("axondata__call-center-speech-dataset")
        );
        assert!(path.join("metadata.csv").exists());
        assert!(path.join("audio/call_1.wav").exists());
    }

    #[tokio::test]
    async fn test_existing_dataset_skips_download() {
        let data_dir = TempDir::new().unwrap();
        let target = data_dir.path().join("axondata__call-center-speech-dataset");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("metadata.csv"), "cached").unwrap();

        let server = MockServer::start();
        let download_mock = server.mock(|when, then| {
            when.method(GET);
            then.status(200).body(sample_zip());
        });

        let source = KaggleDataset::new(server.base_url(), data_dir.path());
        let path = source.ensure(&request()).await.unwrap();

        download_mock.assert_hits(0);
        assert_eq!(fs::read_to_string(path.join("metadata.csv")).unwrap(), "cached");
    }

    #[tokio::test]
    async fn test_credentials_are_sent_as_basic_auth() {
        let data_dir = TempDir::new().unwrap();
        let server = MockServer::start();
        // "user:secret"
        let download_mock = server.mock(|when, then| {
            when.method(GET)
                .header("Authorization", "Basic dXNlcjpzZWNyZXQ=");
            then.status(200).body(sample_zip());
        });

        let source = KaggleDataset::new(server.base_url(), data_dir.path())
            .with_credentials(Some("user".into()), Some("secret".into()));
        source.ensure(&request()).await.unwrap();

        download_mock.assert();
    }

    #[tokio::test]
    async fn test_http_failure_is_dataset_error() {
        let data_dir = TempDir::new().unwrap();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(403).body("Unauthorized");
        });

        let source = KaggleDataset::new(server.base_url(), data_dir.path());
        let err = source.ensure(&request()).await.unwrap_err();

        assert!(matches!(err, TrainerError::DatasetError { .. }));
        assert!(!has_entries(&source.target_dir(&request())));
    }

    #[tokio::test]
    async fn test_corrupt_archive_leaves_no_target() {
        let data_dir = TempDir::new().unwrap();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(200).body("not a zip file");
        });

        let source = KaggleDataset::new(server.base_url(), data_dir.path());
        let err = source.ensure(&request()).await.unwrap_err();

        assert!(matches!(err, TrainerError::ZipError(_)));
        assert!(!source.target_dir(&request()).exists());
    }
}
