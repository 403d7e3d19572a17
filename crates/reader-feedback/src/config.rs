use serde::{Deserialize, Serialize};

use std::future::Future;
use std::path::Path;
use std::path::PathBuf;

use crate::error::FeedbackError;

pub const ENV_ENDPOINT: &str = "READER_LLM_ENDPOINT";
pub const ENV_MODEL: &str = "READER_LLM_MODEL";
pub const ENV_API_KEY: &str = "READER_LLM_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "READER_LLM_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Base URL of an OpenAI-compatible API (no `/v1` suffix).
    pub endpoint: String,
    /// Model name sent with every request.
    pub model: String,
    /// Sent as a bearer token when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
    /// Optional system message prepended to every request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl FeedbackConfig {
    /// Loads the configuration from the provided loader.
    pub async fn load(loader: &impl Loader) -> Result<Self, FeedbackError> {
        loader.load().await
    }

    /// Saves the configuration using the provided saver.
    pub async fn save(&self, saver: &impl Saver) -> Result<(), FeedbackError> {
        saver.save(self).await
    }

    /// Override fields from `READER_LLM_*` environment variables.
    pub fn apply_env(&mut self) -> Result<(), FeedbackError> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Override fields from `lookup`; unset or blank values are ignored.
    pub fn apply_env_with(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), FeedbackError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = get(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(model) = get(ENV_MODEL) {
            self.model = model;
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            self.timeout_secs = secs
                .trim()
                .parse()
                .map_err(|_| FeedbackError::config(ENV_TIMEOUT_SECS, "expected whole seconds"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), FeedbackError> {
        let endpoint = self.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(FeedbackError::config(
                "endpoint",
                format!("`{endpoint}` must start with http:// or https://"),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(FeedbackError::config("model", "must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(FeedbackError::config("timeout_secs", "must be at least 1"));
        }
        if !(self.temperature.is_finite() && (0.0..=2.0).contains(&self.temperature)) {
            return Err(FeedbackError::config("temperature", "expected 0.0..=2.0"));
        }
        Ok(())
    }
}

impl Default for FeedbackConfig {
    /// A local Ollama server with its OpenAI-compatible API.
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_owned(),
            model: "llama3.1".to_owned(),
            api_key: None,
            timeout_secs: 60,
            temperature: 0.3,
            system_prompt: None,
        }
    }
}

/// The trait for loading configuration data.
pub trait Loader {
    fn load(&self) -> impl Future<Output = Result<FeedbackConfig, FeedbackError>> + Send;
}

/// The trait for saving configuration data.
pub trait Saver {
    fn save(
        &self,
        config: &FeedbackConfig,
    ) -> impl Future<Output = Result<(), FeedbackError>> + Send;
}

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a configuration file.
///
/// The format follows the file extension: `.json` or `.toml`.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Loader for FileStore {
    async fn load(&self) -> Result<FeedbackConfig, FeedbackError> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&std::fs::read_to_string(&self.path)?)?),
            Some("toml") => Ok(toml::from_str(&std::fs::read_to_string(&self.path)?)?),
            _ => Err(FeedbackError::UnsupportedFormat(self.path.clone())),
        }
    }
}

impl Saver for FileStore {
    async fn save(&self, config: &FeedbackConfig) -> Result<(), FeedbackError> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(std::fs::write(
                &self.path,
                serde_json::to_string_pretty(config)?,
            )?),
            Some("toml") => Ok(std::fs::write(&self.path, toml::to_string_pretty(config)?)?),
            _ => Err(FeedbackError::UnsupportedFormat(self.path.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("reader-feedback-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = FeedbackConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.endpoint, "http://localhost:11434");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: FeedbackConfig = toml::from_str(
            r#"
            endpoint = "https://api.openai.com"
            model = "gpt-4o-mini"
            api_key = "sk-test"
            "#,
        )
        .unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.system_prompt, None);
    }

    #[test]
    fn test_apply_env_overrides() {
        let mut config = FeedbackConfig::default();
        config
            .apply_env_with(|name| match name {
                ENV_MODEL => Some("mistral".into()),
                ENV_API_KEY => Some("   ".into()),
                ENV_TIMEOUT_SECS => Some("15".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.model, "mistral");
        assert_eq!(config.api_key, None);
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.endpoint, "http://localhost:11434");
    }

    #[test]
    fn test_apply_env_bad_timeout() {
        let mut config = FeedbackConfig::default();
        let err = config
            .apply_env_with(|name| (name == ENV_TIMEOUT_SECS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            FeedbackError::Config {
                field: ENV_TIMEOUT_SECS,
                ..
            }
        ));
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_validate_rejects() {
        let config = FeedbackConfig {
            endpoint: "localhost:11434".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FeedbackError::Config { field: "endpoint", .. })
        ));

        let config = FeedbackConfig {
            model: " ".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FeedbackError::Config { field: "model", .. })
        ));

        let config = FeedbackConfig {
            temperature: 3.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_file_store_round_trips_both_formats() {
        let config = FeedbackConfig {
            model: "qwen2.5".into(),
            system_prompt: Some("Be brief.".into()),
            ..Default::default()
        };
        for ext in ["json", "toml"] {
            let path = temp_path(&format!("config.{ext}"));
            let store = FileStore::new(&path);
            config.save(&store).await.unwrap();
            let loaded = FeedbackConfig::load(&store).await.unwrap();
            assert_eq!(loaded, config);
            let _ = std::fs::remove_file(&path);
        }
    }

    #[tokio::test]
    async fn test_file_store_unsupported_extension() {
        let store = FileStore::new(temp_path("config.yaml"));
        assert!(matches!(
            FeedbackConfig::load(&store).await,
            Err(FeedbackError::UnsupportedFormat(_))
        ));
    }
}
