//! Runtime configuration read from the environment (and `.env` via the binary).

use crate::error::{AdvisorError, Result};
use crate::llm::{LlmProvider, DUMMY_API_KEY};
use crate::predictor::PredictorKind;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATASET_PATH: &str = "data/updated_india_agri_data.csv";
pub const DEFAULT_MODEL_PATH: &str = "models/crop_model.json";
pub const DEFAULT_ENCODERS_PATH: &str = "models/encoders.json";
pub const DEFAULT_WEATHER_BASE_URL: &str = "http://api.openweathermap.org";
pub const DEFAULT_WEATHER_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    pub dataset_path: PathBuf,
    pub predictor: PredictorKind,
    pub model_path: PathBuf,
    pub encoders_path: PathBuf,
    pub weather_api_key: String,
    pub weather_base_url: String,
    pub weather_timeout: Duration,
    pub llm_provider: LlmProvider,
    pub llm_api_key: String,
    pub llm_model: String,
    pub llm_base_url: String,
    pub llm_timeout: Duration,
}

impl AdvisorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let predictor = match get("CROP_PREDICTOR") {
            Some(v) => v.parse()?,
            None => PredictorKind::Lookup,
        };
        let llm_provider = match get("LLM_PROVIDER") {
            Some(v) => v.parse()?,
            None => LlmProvider::Gemini,
        };
        let key_var = match llm_provider {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::OpenAi => "OPENAI_API_KEY",
        };

        Ok(Self {
            dataset_path: get("CROP_DATASET_PATH")
                .unwrap_or_else(|| DEFAULT_DATASET_PATH.to_string())
                .into(),
            predictor,
            model_path: get("CROP_MODEL_PATH")
                .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string())
                .into(),
            encoders_path: get("CROP_ENCODERS_PATH")
                .unwrap_or_else(|| DEFAULT_ENCODERS_PATH.to_string())
                .into(),
            weather_api_key: get("OPENWEATHER_API_KEY").unwrap_or_default(),
            weather_base_url: get("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string()),
            weather_timeout: parse_secs(
                "WEATHER_TIMEOUT_SECS",
                get("WEATHER_TIMEOUT_SECS"),
                DEFAULT_WEATHER_TIMEOUT_SECS,
            )?,
            llm_provider,
            llm_api_key: get(key_var).unwrap_or_else(|| DUMMY_API_KEY.to_string()),
            llm_model: get("LLM_MODEL").unwrap_or_else(|| llm_provider.default_model().to_string()),
            llm_base_url: get("LLM_BASE_URL")
                .unwrap_or_else(|| llm_provider.default_base_url().to_string()),
            llm_timeout: parse_secs(
                "LLM_TIMEOUT_SECS",
                get("LLM_TIMEOUT_SECS"),
                DEFAULT_LLM_TIMEOUT_SECS,
            )?,
        })
    }
}

fn parse_secs(name: &str, value: Option<String>, default: u64) -> Result<Duration> {
    let secs = match value {
        None => default,
        Some(v) => v.parse::<u64>().map_err(|_| {
            AdvisorError::Config(format!("{} must be a whole number of seconds, got '{}'", name, v))
        })?,
    };
    if secs == 0 {
        return Err(AdvisorError::Config(format!("{} must be greater than zero", name)));
    }
    Ok(Duration::from_secs(secs))
}
