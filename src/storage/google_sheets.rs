use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::storage::SheetStore;
use crate::utils::http::send_with_retry;

pub const SHEETS_API: &str = "https://sheets.googleapis.com";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const MAX_RETRIES: u32 = 3;

/// Characters escaped in the range path segment. `!` and `:` stay readable.
const RANGE_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'\'')
    .add(b'/')
    .add(b'?')
    .add(b'<')
    .add(b'>');

#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

enum Credentials {
    ServiceAccount(PathBuf),
    Token(String),
}

#[derive(Default)]
struct TokenCache {
    key: Option<ServiceAccountKey>,
    token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

/// Google Sheets v4 values API.
pub struct GoogleSheets {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    credentials: Credentials,
    cache: Mutex<TokenCache>,
}

impl GoogleSheets {
    /// Authenticate with the service-account key at `credentials_path`.
    pub fn new(client: Client, spreadsheet_id: &str, credentials_path: PathBuf) -> Self {
        Self {
            client,
            api_base: SHEETS_API.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            credentials: Credentials::ServiceAccount(credentials_path),
            cache: Mutex::new(TokenCache::default()),
        }
    }

    /// Use a ready-made bearer token against `api_base`.
    pub fn with_token(client: Client, api_base: &str, spreadsheet_id: &str, token: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            credentials: Credentials::Token(token.to_string()),
            cache: Mutex::new(TokenCache::default()),
        }
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}{}",
            self.api_base,
            self.spreadsheet_id,
            utf8_percent_encode(range, RANGE_SEGMENT),
            suffix
        )
    }

    async fn bearer(&self) -> Result<String> {
        let path = match &self.credentials {
            Credentials::Token(token) => return Ok(token.clone()),
            Credentials::ServiceAccount(path) => path,
        };

        let mut cache = self.cache.lock().await;
        if let (Some(token), Some(expires_at)) = (&cache.token, cache.expires_at) {
            if Utc::now() + Duration::seconds(60) < expires_at {
                return Ok(token.clone());
            }
        }

        let key = match cache.key.clone() {
            Some(key) => key,
            None => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read credentials {}", path.display()))?;
                let key: ServiceAccountKey =
                    serde_json::from_str(&raw).context("Credentials file is not a service account key")?;
                cache.key = Some(key.clone());
                key
            }
        };

        let (token, expires_at) = self.mint_token(&key).await?;
        info!("Obtained Sheets access token for {}", key.client_email);
        cache.token = Some(token.clone());
        cache.expires_at = Some(expires_at);
        Ok(token)
    }

    async fn mint_token(&self, key: &ServiceAccountKey) -> Result<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let claims = Claims {
            iss: &key.client_email,
            scope: SHEETS_SCOPE,
            aud: &key.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("Service account private key is not valid PEM")?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)?;

        let request = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_GRANT), ("assertion", assertion.as_str())]);
        let response: TokenResponse = send_with_retry(request, MAX_RETRIES)
            .await
            .context("Token exchange failed")?
            .json()
            .await?;

        Ok((
            response.access_token,
            now + Duration::seconds(response.expires_in),
        ))
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetStore for GoogleSheets {
    async fn authenticate(&self) -> Result<()> {
        self.bearer().await.map(|_| ())
    }

    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let request = self
            .client
            .get(self.values_url(range, ""))
            .bearer_auth(self.bearer().await?);
        let body: ValueRange = send_with_retry(request, MAX_RETRIES)
            .await
            .with_context(|| format!("Failed to read {}", range))?
            .json()
            .await?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn write_range(&self, range: &str, rows: &[Vec<String>]) -> Result<()> {
        let payload = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });
        let request = self
            .client
            .put(self.values_url(range, ""))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(self.bearer().await?)
            .json(&payload);
        send_with_retry(request, MAX_RETRIES)
            .await
            .with_context(|| format!("Failed to write {}", range))?;

        debug!("Wrote {} rows to {}", rows.len(), range);
        Ok(())
    }

    async fn clear_range(&self, range: &str) -> Result<()> {
        let request = self
            .client
            .post(self.values_url(range, ":clear"))
            .bearer_auth(self.bearer().await?)
            .json(&json!({}));
        send_with_retry(request, MAX_RETRIES)
            .await
            .with_context(|| format!("Failed to clear {}", range))?;

        debug!("Cleared {}", range);
        Ok(())
    }
}
