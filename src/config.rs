//! Runtime configuration.
//!
//! Read once at startup and handed to the clients that need it.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

/// How the calendar client obtains its bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarCredentials {
    AccessToken(String),
    ServiceAccountFile(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarConfig {
    pub credentials: CalendarCredentials,
    pub base_url: String,
    pub default_calendar_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub gemini: GeminiConfig,
    /// `None` when no calendar credentials are configured.
    pub calendar: Option<CalendarConfig>,
    pub request_timeout: Duration,
}

impl Config {
    /// Load from the process environment, after pulling in `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = var("GEMINI_API_KEY").context("GEMINI_API_KEY not set")?;

        let gemini = GeminiConfig {
            api_key,
            model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: var("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
        };

        let credentials = match (
            var("GOOGLE_CALENDAR_ACCESS_TOKEN"),
            var("GOOGLE_SERVICE_ACCOUNT_FILE"),
        ) {
            (Some(token), _) => Some(CalendarCredentials::AccessToken(token)),
            (None, Some(path)) => Some(CalendarCredentials::ServiceAccountFile(PathBuf::from(path))),
            (None, None) => None,
        };

        let calendar = credentials.map(|credentials| CalendarConfig {
            credentials,
            base_url: var("GOOGLE_CALENDAR_BASE_URL")
                .unwrap_or_else(|| DEFAULT_CALENDAR_BASE_URL.to_string()),
            default_calendar_id: var("CALENDAR_ID")
                .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string()),
        });

        let request_timeout = match var("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("Invalid REQUEST_TIMEOUT_SECS: {}", raw))?,
            ),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            gemini,
            calendar,
            request_timeout,
        })
    }
}
