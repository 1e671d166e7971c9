//! Google Calendar client
//!
//! Inserts all-day events into a calendar. The bearer token is either given
//! directly or minted from a service-account key.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{CalendarConfig, CalendarCredentials};
use crate::error::CalendarError;

const SCOPES: &str = "https://www.googleapis.com/auth/calendar";

/// Date-only start or end of an all-day event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDate {
    pub date: String,
}

/// Body of an `events.insert` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    pub summary: String,
    pub description: String,
    pub start: EventDate,
    pub end: EventDate,
    pub color_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub html_link: Option<String>,
}

/// Somewhere events can be created.
#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn insert_event(
        &self,
        calendar_id: &str,
        body: &EventBody,
    ) -> Result<CreatedEvent, CalendarError>;
}

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

#[derive(Debug, Serialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

fn create_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

fn sign_assertion(key: &ServiceAccountKey) -> Result<String> {
    info!("Generating JWT for service account: {}", key.client_email);
    let now = Utc::now().timestamp();
    let claims = Claims {
        iss: key.client_email.clone(),
        scope: SCOPES.to_string(),
        aud: key.token_uri.clone(),
        exp: now + 3600,
        iat: now,
    };

    let header = Header::new(Algorithm::RS256);
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .context("Invalid service account private key")?;

    encode(&header, &claims, &encoding_key).context("Failed to encode JWT")
}

async fn get_access_token(client: &reqwest::Client, key: &ServiceAccountKey) -> Result<String> {
    let jwt = sign_assertion(key)?;

    info!("Requesting access token from {}", key.token_uri);
    let response = client
        .post(&key.token_uri)
        .form(&[
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", jwt.as_str()),
        ])
        .send()
        .await
        .context("Failed to request access token")?;

    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read token response")?;
    if !status.is_success() {
        anyhow::bail!("Token request failed ({}): {}", status, body);
    }

    let token_response: TokenResponse =
        serde_json::from_str(&body).context("Failed to parse token response")?;
    Ok(token_response.access_token)
}

pub struct GoogleCalendarClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(access_token: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_http_client(timeout)?,
            access_token: access_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a client, exchanging the service-account key for a token if
    /// that is how credentials were configured.
    pub async fn from_config(config: &CalendarConfig, timeout: Duration) -> Result<Self> {
        let client = create_http_client(timeout)?;

        let access_token = match &config.credentials {
            CalendarCredentials::AccessToken(token) => token.clone(),
            CalendarCredentials::ServiceAccountFile(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let key: ServiceAccountKey =
                    serde_json::from_str(&raw).context("Failed to parse service account JSON")?;
                get_access_token(&client, &key).await?
            }
        };

        Ok(Self {
            client,
            access_token,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CalendarService for GoogleCalendarClient {
    async fn insert_event(
        &self,
        calendar_id: &str,
        body: &EventBody,
    ) -> Result<CreatedEvent, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        );

        info!("Creating event '{}' on {}", body.summary, calendar_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| CalendarError::CalendarServiceError(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CalendarError::from_status(status.as_u16(), message));
        }

        response
            .json()
            .await
            .map_err(|e| CalendarError::CalendarServiceError(format!("invalid response: {}", e)))
    }
}
