//! [`AlertStore`] over the Alerta REST API.

use std::fmt;
use std::time::Duration;

use alertgram_core::{
    Alert, AlertError, AlertStatus, AlertStore, Blackout, Result, StatusChange, customer_visible,
};
use futures::future::BoxFuture;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Connection settings for the Alerta API.
#[derive(Clone, PartialEq, Eq)]
pub struct AlertaConfig {
    /// API base URL, e.g. `https://alerta.example.com/api`.
    pub endpoint: String,
    /// API key sent as `Authorization: Key <key>`.
    pub api_key: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
}

impl fmt::Debug for AlertaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertaConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AlertaConfig {
    /// Creates settings for `endpoint` without authentication.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Response envelope shared by Alerta endpoints.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    alert: Option<Alert>,
    #[serde(default)]
    alerts: Vec<Alert>,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Serialize)]
struct StatusBody<'a> {
    status: AlertStatus,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
}

#[derive(Serialize)]
struct TagsBody<'a> {
    tags: &'a [String],
}

#[derive(Serialize)]
struct BlackoutBody<'a> {
    environment: &'a str,
    resource: &'a str,
    event: &'a str,
    duration: u64,
    text: &'a str,
}

fn store_error(err: &reqwest::Error) -> AlertError {
    AlertError::Store(format!("alerta request failed: {err}"))
}

/// Alerta API client.
#[derive(Clone)]
pub struct AlertaClient {
    config: AlertaConfig,
    http: reqwest::Client,
}

impl fmt::Debug for AlertaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertaClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AlertaClient {
    /// Builds a client.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::Store` if the HTTP client cannot be built.
    pub fn new(config: AlertaConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| store_error(&e))?;
        Ok(Self { config, http })
    }

    /// Returns the client settings.
    #[must_use]
    pub const fn config(&self) -> &AlertaConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{path}", self.config.endpoint));
        match &self.config.api_key {
            Some(key) => builder.header(reqwest::header::AUTHORIZATION, format!("Key {key}")),
            None => builder,
        }
    }

    /// Sends a request and decodes the envelope. `Ok(None)` means 404.
    async fn send(&self, builder: RequestBuilder) -> Result<Option<Envelope>> {
        let response = builder.send().await.map_err(|e| store_error(&e))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let bytes = response.bytes().await.map_err(|e| store_error(&e))?;
        let envelope: Envelope = decode(&bytes)?;
        if !status.is_success() || envelope.status != "ok" {
            return Err(AlertError::Store(format!(
                "alerta returned {status}: {}",
                envelope.message.as_deref().unwrap_or("no message")
            )));
        }
        Ok(Some(envelope))
    }

    /// Like [`send`](Self::send) but a 404 is an unknown alert.
    async fn send_for(&self, id: &str, builder: RequestBuilder) -> Result<Envelope> {
        self.send(builder)
            .await?
            .ok_or_else(|| AlertError::AlertNotFound { id: id.to_string() })
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| AlertError::Store(format!("unexpected alerta response: {e}")))
}

impl AlertStore for AlertaClient {
    fn find_by_id<'a>(
        &'a self,
        id: &'a str,
        customers: &'a [String],
    ) -> BoxFuture<'a, Result<Option<Alert>>> {
        Box::pin(async move {
            let Some(envelope) = self
                .send(self.request(Method::GET, &format!("/alert/{id}")))
                .await?
            else {
                return Ok(None);
            };

            Ok(envelope
                .alert
                .filter(|a| customer_visible(a.customer.as_deref(), customers)))
        })
    }

    fn find_open_linked<'a>(
        &'a self,
        link_field: &'a str,
        value: &'a str,
        exclude_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Alert>>> {
        Box::pin(async move {
            if !Alert::is_field(link_field) {
                return Err(AlertError::UnknownField {
                    name: link_field.to_string(),
                });
            }

            let query = [("status", "open"), (link_field, value)];
            let envelope = self
                .send(self.request(Method::GET, "/alerts").query(&query))
                .await?;

            // The server filter is loose; re-check each candidate.
            let linked: Vec<Alert> = envelope
                .map(|e| e.alerts)
                .unwrap_or_default()
                .into_iter()
                .filter(|a| a.id != exclude_id && a.status == AlertStatus::Open)
                .filter(|a| {
                    a.field_text(link_field)
                        .is_ok_and(|v| v.as_deref() == Some(value))
                })
                .collect();

            debug!(link_field, value, found = linked.len(), "linked open alerts");
            Ok(linked)
        })
    }

    fn set_status<'a>(
        &'a self,
        id: &'a str,
        change: &'a StatusChange,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let body = StatusBody {
                status: change.status,
                text: &change.text,
                timeout: change.timeout,
            };
            self.send_for(
                id,
                self.request(Method::PUT, &format!("/alert/{id}/status"))
                    .json(&body),
            )
            .await?;

            info!(alert_id = %id, status = %change.status, "alert status changed");
            Ok(())
        })
    }

    fn untag<'a>(&'a self, id: &'a str, tags: &'a [String]) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.send_for(
                id,
                self.request(Method::PUT, &format!("/alert/{id}/untag"))
                    .json(&TagsBody { tags }),
            )
            .await?;

            debug!(alert_id = %id, ?tags, "alert untagged");
            Ok(())
        })
    }

    fn create_blackout<'a>(&'a self, blackout: &'a Blackout) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let body = BlackoutBody {
                environment: &blackout.environment,
                resource: &blackout.resource,
                event: &blackout.event,
                duration: blackout.duration.as_secs(),
                text: &blackout.text,
            };
            let envelope = self
                .send(self.request(Method::POST, "/blackout").json(&body))
                .await?
                .ok_or_else(|| AlertError::Store("blackout endpoint not found".to_string()))?;

            let id = envelope.id.unwrap_or_default();
            info!(
                blackout_id = %id,
                environment = %blackout.environment,
                resource = %blackout.resource,
                event = %blackout.event,
                duration_secs = blackout.duration.as_secs(),
                "blackout created"
            );
            Ok(id)
        })
    }
}
