use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::services::GeminiConfig;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub bind_addr: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set in .env file")?;

        let gemini = GeminiConfig {
            api_key,
            api_base: env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            vision_model: env::var("GEMINI_VISION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            text_model: env::var("GEMINI_TEXT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            max_output_tokens: parse_var("GEMINI_MAX_OUTPUT_TOKENS", 1024)?,
            timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 60)?),
        };

        Ok(Self {
            gemini,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} must be a number, got '{}'", name, value)),
        Err(_) => Ok(default),
    }
}
