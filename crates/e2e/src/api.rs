//! Partner API client
//!
//! A thin reqwest wrapper for the two endpoint families under test. The
//! suite authenticates once via the client-credentials grant; the bearer
//! token is opaque, shared read-only by every request of the suite, and
//! never refreshed mid-run. Dropping the session releases the underlying
//! connections regardless of how the suite ended.

use std::time::Duration;

use esimstore_common::config::ApiConfig;
use esimstore_common::types::{TokenResponse, ValidationErrors};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};

/// Status code plus parsed JSON body.
///
/// Negative cases need both, so responses are not short-circuited into
/// errors the way a production client would.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: Value,
}

impl HttpReply {
    /// Deserialize the body into a typed DTO.
    pub fn json<T: DeserializeOwned>(&self) -> E2eResult<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// Field → message view of a 422 body.
    pub fn validation_errors(&self) -> ValidationErrors {
        ValidationErrors::from_body(&self.body)
    }

    /// Fail unless the status matches.
    pub fn expect_status(&self, expected: u16, context: &str) -> E2eResult<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(E2eError::UnexpectedStatus {
                expected,
                got: self.status,
                context: context.to_string(),
            })
        }
    }
}

/// Unauthenticated client for the partner API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> E2eResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Exchange client credentials for a bearer token.
    pub async fn authenticate(&self, config: &ApiConfig) -> E2eResult<ApiSession> {
        info!("Requesting client-credentials token");
        let response = self
            .http
            .post(self.endpoint("token"))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&token_form(config))
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        if status != 200 {
            return Err(E2eError::Auth { status, body: text });
        }

        let token: TokenResponse = serde_json::from_str(&text)?;
        debug!("Token acquired");
        Ok(ApiSession {
            client: self.clone(),
            token: token.data.access_token,
        })
    }

    /// Submit an order with an explicit bearer value.
    ///
    /// The authenticated path goes through [`ApiSession::submit_order`];
    /// this variant exists for the unauthenticated cases.
    pub async fn submit_order_with_bearer(
        &self,
        bearer: &str,
        payload: &Value,
    ) -> E2eResult<HttpReply> {
        let response = self
            .http
            .post(self.endpoint("orders"))
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {bearer}"))
            .json(payload)
            .send()
            .await?;
        Self::into_reply(response).await
    }

    async fn into_reply(response: reqwest::Response) -> E2eResult<HttpReply> {
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        debug!("API reply: {status}");
        Ok(HttpReply { status, body })
    }
}

/// Authenticated session holding the suite's one bearer token.
pub struct ApiSession {
    client: ApiClient,
    token: String,
}

impl ApiSession {
    /// `POST /v2/orders`
    pub async fn submit_order(&self, payload: &Value) -> E2eResult<HttpReply> {
        self.client.submit_order_with_bearer(&self.token, payload).await
    }

    /// `GET /v2/sims` with query parameters.
    pub async fn list_sims(&self, query: &[(&str, &str)]) -> E2eResult<HttpReply> {
        let response = self
            .client
            .http
            .get(self.client.endpoint("sims"))
            .query(query)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.token),
            )
            .send()
            .await?;
        ApiClient::into_reply(response).await
    }
}

fn token_form(config: &ApiConfig) -> [(&'static str, String); 3] {
    [
        ("client_id", config.client_id.clone()),
        ("client_secret", config.client_secret.clone()),
        ("grant_type", "client_credentials".to_string()),
    ]
}
