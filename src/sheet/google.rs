//! Google Sheets v4 client authenticated with a service-account key.

use super::{SheetBackend, SheetError};
use crate::config::SheetsConfig;
use crate::engine::layout::{column_letters, GRID_WIDTH};
use crate::engine::{Region, WriteOp};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Refresh this long before the token actually expires.
const TOKEN_SLACK: Duration = Duration::from_secs(60);

/// The fields of a service-account key file this client uses.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
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
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct GoogleSheetsClient {
    client: Client,
    config: SheetsConfig,
    token: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for GoogleSheetsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleSheetsClient")
            .field("spreadsheet_id", &self.config.spreadsheet_id)
            .field("sheet_name", &self.config.sheet_name)
            .finish_non_exhaustive()
    }
}

impl GoogleSheetsClient {
    pub fn new(config: SheetsConfig) -> Result<Self, SheetError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| SheetError::Http(e.to_string()))?;
        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, SheetError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_SLACK {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.request_token().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn request_token(&self) -> Result<CachedToken, SheetError> {
        let key = &self.config.credentials;
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &key.client_email,
            scope: SCOPE,
            aud: &key.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetError::Auth(format!("invalid private key: {}", e)))?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| SheetError::Auth(e.to_string()))?;

        debug!("Requesting access token for {}", key.client_email);
        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SheetError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Auth(format!("token endpoint returned {}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SheetError::Parse(e.to_string()))?;
        Ok(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in.unwrap_or(3600)),
        })
    }

    fn values_url(&self, tail: &str) -> Result<Url, SheetError> {
        values_url(&self.config.base_url, &self.config.spreadsheet_id, tail)
    }

    async fn send_json(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, SheetError> {
        let token = self.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SheetError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SheetError::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(SheetError::HttpStatus {
                status: status.as_u16(),
                message: api_error_message(&body).unwrap_or(body),
            });
        }
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| SheetError::Parse(e.to_string()))
    }
}

#[async_trait]
impl SheetBackend for GoogleSheetsClient {
    async fn read_grid(&self, first_row: u32) -> Result<Vec<Vec<String>>, SheetError> {
        let range = open_range(&self.config.sheet_name, first_row);
        let url = self.values_url(&range)?;
        let json = self
            .send_json(
                self.client
                    .get(url)
                    .query(&[("valueRenderOption", "FORMULA"), ("majorDimension", "ROWS")]),
            )
            .await?;
        values_to_grid(&json)
    }

    async fn read_cell(&self, cell: Region) -> Result<String, SheetError> {
        let url = self.values_url(&cell.qualified(&self.config.sheet_name))?;
        let json = self
            .send_json(
                self.client
                    .get(url)
                    .query(&[("valueRenderOption", "FORMATTED_VALUE")]),
            )
            .await?;
        let grid = values_to_grid(&json)?;
        Ok(grid
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .unwrap_or_default())
    }

    async fn batch_write(&self, ops: &[WriteOp]) -> Result<(), SheetError> {
        let url = self.values_url("values:batchUpdate")?;
        let body = batch_update_body(&self.config.sheet_name, ops);
        self.send_json(self.client.post(url).json(&body)).await?;
        Ok(())
    }

    async fn batch_clear(&self, ranges: &[Region]) -> Result<(), SheetError> {
        let url = self.values_url("values:batchClear")?;
        let ranges: Vec<String> = ranges
            .iter()
            .map(|r| r.qualified(&self.config.sheet_name))
            .collect();
        self.send_json(
            self.client
                .post(url)
                .json(&serde_json::json!({ "ranges": ranges })),
        )
        .await?;
        Ok(())
    }
}

/// `{base}/v4/spreadsheets/{id}/values/{range}`; batch endpoints pass
/// `values:batchUpdate` style tails instead of a range.
fn values_url(base: &str, spreadsheet_id: &str, tail: &str) -> Result<Url, SheetError> {
    let mut url = Url::parse(base).map_err(|e| SheetError::Http(e.to_string()))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| SheetError::Http(format!("cannot use {} as a base url", base)))?;
        segments.pop_if_empty().extend(["v4", "spreadsheets", spreadsheet_id]);
        if tail.starts_with("values:") {
            segments.push(tail);
        } else {
            segments.push("values").push(tail);
        }
    }
    Ok(url)
}

/// Range with no end row, e.g. `'Insights'!A5:Z`.
fn open_range(sheet: &str, first_row: u32) -> String {
    format!(
        "'{}'!A{}:{}",
        sheet.replace('\'', "''"),
        first_row,
        column_letters(GRID_WIDTH)
    )
}

fn batch_update_body(sheet: &str, ops: &[WriteOp]) -> serde_json::Value {
    let data: Vec<serde_json::Value> = ops
        .iter()
        .map(|op| {
            serde_json::json!({
                "range": op.region.qualified(sheet),
                "majorDimension": "ROWS",
                "values": op.values,
            })
        })
        .collect();
    serde_json::json!({
        "valueInputOption": "USER_ENTERED",
        "data": data,
    })
}

fn values_to_grid(json: &serde_json::Value) -> Result<Vec<Vec<String>>, SheetError> {
    let Some(rows) = json.get("values") else {
        return Ok(Vec::new());
    };
    let rows = rows
        .as_array()
        .ok_or_else(|| SheetError::Parse("values is not an array".to_string()))?;
    rows.iter()
        .map(|row| {
            row.as_array()
                .ok_or_else(|| SheetError::Parse("row is not an array".to_string()))
                .map(|cells| cells.iter().map(cell_to_string).collect())
        })
        .collect()
}

fn cell_to_string(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(true) => "TRUE".to_string(),
        serde_json::Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

fn api_error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}
