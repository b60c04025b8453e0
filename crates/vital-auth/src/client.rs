use async_trait::async_trait;
use std::time::Duration;

use vital_config::ApiConfig;

use crate::error::AuthError;
use crate::http::check_response;
use crate::token::SessionToken;

/// Source of engine tokens. The bootstrap only sees this seam.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn fetch_token(&self, api: &ApiConfig) -> Result<SessionToken, AuthError>;
}

/// HTTP client for `POST https://{host}/v2/auth/token`.
pub struct TokenClient {
    http: reqwest::Client,
}

impl Default for TokenClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenClient {
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent("vitals/0.1")
                .timeout(Duration::from_secs(10))
                .build()
                .expect("reqwest client should build"),
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    license_key: &'a str,
    study_id: &'a str,
}

#[async_trait]
impl TokenProvider for TokenClient {
    async fn fetch_token(&self, api: &ApiConfig) -> Result<SessionToken, AuthError> {
        let url = api.token_url();
        tracing::debug!(%url, study_id = %api.study_id, "requesting engine token");

        let resp = self
            .http
            .post(&url)
            .json(&TokenRequest {
                license_key: &api.license_key,
                study_id: &api.study_id,
            })
            .send()
            .await?;
        let resp = check_response(resp).await?;

        let body: serde_json::Value = resp.json().await?;
        parse_token_body(&body)
    }
}

fn parse_token_body(body: &serde_json::Value) -> Result<SessionToken, AuthError> {
    let token = body["token"]
        .as_str()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::MalformedResponse("missing 'token'".into()))?;
    let refresh_token = body["refreshToken"]
        .as_str()
        .ok_or_else(|| AuthError::MalformedResponse("missing 'refreshToken'".into()))?;
    Ok(SessionToken {
        token: token.to_string(),
        refresh_token: refresh_token.to_string(),
    })
}
