use std::str::FromStr;

use anyhow::{Context, Result};

use crate::screening::pipeline::{RankingOptions, DEFAULT_EXCERPT_CHARS};
use crate::screening::results::DEFAULT_TOP_K;
use crate::screening::similarity::IdfMode;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable is optional; invalid values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub excerpt_chars: usize,
    pub top_k: usize,
    pub idf_mode: IdfMode,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            top_k: DEFAULT_TOP_K,
            idf_mode: IdfMode::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        Ok(Config {
            port: parse_or("PORT", &lookup, defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            excerpt_chars: parse_or("SCREENING_EXCERPT_CHARS", &lookup, defaults.excerpt_chars)?,
            top_k: parse_or("SCREENING_TOP_K", &lookup, defaults.top_k)?,
            idf_mode: match lookup("SCREENING_IDF_MODE") {
                Some(raw) => raw
                    .parse::<IdfMode>()
                    .map_err(anyhow::Error::msg)
                    .context("SCREENING_IDF_MODE is invalid")?,
                None => defaults.idf_mode,
            },
            max_upload_bytes: parse_or(
                "SCREENING_MAX_UPLOAD_BYTES",
                &lookup,
                defaults.max_upload_bytes,
            )?,
        })
    }

    pub fn ranking_options(&self) -> RankingOptions {
        RankingOptions {
            top_k: self.top_k,
            excerpt_chars: self.excerpt_chars,
            idf_mode: self.idf_mode,
        }
    }
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
