//! Configuration management for Catapult
//!
//! Configuration is loaded from `~/.catapult/config.json` with environment
//! variable overrides (`CATAPULT_*`). A `.env` file in the working directory
//! is honored before the environment is read.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{CatapultError, Result};

/// Main configuration struct for the interview engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model identifier sent to the completion endpoint
    pub model: String,
    /// Generation cap passed as `max_tokens` on each completion call
    pub max_response_tokens: u32,
    /// Fraction (0.0-1.0] of the model's context window usable before the
    /// engine forces interview termination
    pub cutoff_threshold: f64,
    /// Sampling temperature for completion calls
    pub temperature: f32,
    /// System prompt seeded as the first transcript message of every session
    pub interview_instruction: String,
    /// OpenAI-compatible endpoint credentials
    pub openai: ProviderConfig,
    /// Audio transcription settings
    pub transcription: TranscriptionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            max_response_tokens: 500,
            cutoff_threshold: 0.8,
            temperature: 0.7,
            interview_instruction: DEFAULT_INTERVIEW_INSTRUCTION.to_string(),
            openai: ProviderConfig::default(),
            transcription: TranscriptionConfig::default(),
        }
    }
}

/// Credentials and endpoint for an OpenAI-compatible API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key (bearer token)
    pub api_key: Option<String>,
    /// Base URL override (for Azure, proxies, local models)
    pub api_base: Option<String>,
}

/// Audio transcription configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Speech-to-text model identifier
    pub model: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
        }
    }
}

const DEFAULT_INTERVIEW_INSTRUCTION: &str = "You are a professional technical interviewer. \
Ask the candidate one question at a time about the role they applied for, \
follow up on their answers, and keep the conversation focused on their \
stated skills and experience. Be polite but rigorous.";

impl Config {
    /// Returns the Catapult configuration directory path (~/.catapult)
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".catapult")
    }

    /// Returns the path to the config file (~/.catapult/config.json)
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load configuration from the default path with environment overrides.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_from_path(&Self::path())
    }

    /// Load configuration from a specific path with environment overrides.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Variables follow the pattern `CATAPULT_KEY`. `OPENAI_API_KEY` is
    /// honored as a fallback for the provider key.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CATAPULT_MODEL") {
            self.model = val;
        }
        if let Ok(val) = std::env::var("CATAPULT_MAX_RESPONSE_TOKENS") {
            if let Ok(v) = val.parse() {
                self.max_response_tokens = v;
            }
        }
        if let Ok(val) = std::env::var("CATAPULT_CUTOFF_THRESHOLD") {
            if let Ok(v) = val.parse() {
                self.cutoff_threshold = v;
            }
        }
        if let Ok(val) = std::env::var("CATAPULT_TEMPERATURE") {
            if let Ok(v) = val.parse() {
                self.temperature = v;
            }
        }
        if let Ok(val) = std::env::var("CATAPULT_INTERVIEW_INSTRUCTION") {
            self.interview_instruction = val;
        }
        if let Ok(val) = std::env::var("CATAPULT_OPENAI_API_KEY") {
            self.openai.api_key = Some(val);
        } else if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            if self.openai.api_key.is_none() {
                self.openai.api_key = Some(val);
            }
        }
        if let Ok(val) = std::env::var("CATAPULT_OPENAI_API_BASE") {
            self.openai.api_base = Some(val);
        }
        if let Ok(val) = std::env::var("CATAPULT_TRANSCRIPTION_MODEL") {
            self.transcription.model = val;
        }
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configured values.
    ///
    /// Range checks: `cutoff_threshold` must be in (0.0, 1.0],
    /// `max_response_tokens` must be non-zero, `temperature` in [0.0, 2.0],
    /// `model` non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            return Err(CatapultError::Config("model must not be empty".into()));
        }
        if self.max_response_tokens == 0 {
            return Err(CatapultError::Config(
                "max_response_tokens must be greater than zero".into(),
            ));
        }
        if !(self.cutoff_threshold > 0.0 && self.cutoff_threshold <= 1.0) {
            return Err(CatapultError::Config(format!(
                "cutoff_threshold must be in (0.0, 1.0], got {}",
                self.cutoff_threshold
            )));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(CatapultError::Config(format!(
                "temperature must be in [0.0, 2.0], got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.max_response_tokens, 500);
        assert_eq!(config.cutoff_threshold, 0.8);
        assert_eq!(config.temperature, 0.7);
        assert!(!config.interview_instruction.is_empty());
        assert!(config.openai.api_key.is_none());
        assert_eq!(config.transcription.model, "whisper-1");
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{"model": "gpt-4o", "max_response_tokens": 300}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_response_tokens, 300);
        // Defaults apply to unspecified fields
        assert_eq!(config.cutoff_threshold, 0.8);
        assert_eq!(config.temperature, 0.7);
    }

    #[test]
    fn test_provider_config_json() {
        let json = r#"{"openai": {"api_key": "sk-xxx", "api_base": "https://api.openai.com/v1"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.openai.api_key, Some("sk-xxx".to_string()));
        assert_eq!(
            config.openai.api_base,
            Some("https://api.openai.com/v1".to_string())
        );
    }

    #[test]
    fn test_env_override() {
        env::set_var("CATAPULT_INTERVIEW_INSTRUCTION", "Ask only one question.");
        env::set_var("CATAPULT_MAX_RESPONSE_TOKENS", "123");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.interview_instruction, "Ask only one question.");
        assert_eq!(config.max_response_tokens, 123);

        env::remove_var("CATAPULT_INTERVIEW_INSTRUCTION");
        env::remove_var("CATAPULT_MAX_RESPONSE_TOKENS");
    }

    #[test]
    fn test_validate_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_cutoff() {
        let mut config = Config::default();
        config.cutoff_threshold = 0.0;
        assert!(config.validate().is_err());
        config.cutoff_threshold = 1.5;
        assert!(config.validate().is_err());
        config.cutoff_threshold = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let mut config = Config::default();
        config.max_response_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let mut config = Config::default();
        config.model = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let mut config = Config::default();
        config.model = "gpt-4o-mini".to_string();
        config.cutoff_threshold = 0.75;
        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();
        assert_eq!(loaded.model, "gpt-4o-mini");
        assert_eq!(loaded.cutoff_threshold, 0.75);
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let path = PathBuf::from("/nonexistent/path/config.json");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.model, "gpt-3.5-turbo");
    }
}
