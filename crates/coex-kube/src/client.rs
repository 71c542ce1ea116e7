//! Kubernetes core/v1 REST client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::backend::{BackendConnector, ObjectKind, SharedBackend, WorkloadBackend};
use crate::error::{KubeError, Result};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings shared by every client built from one connector.
#[derive(Debug, Clone)]
pub struct KubeConfig {
    /// Bearer token sent with every request, if any.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for KubeConfig {
    fn default() -> Self {
        Self {
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl KubeConfig {
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for one API server endpoint.
#[derive(Debug, Clone)]
pub struct KubeClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Body of a `Status` failure returned by the API server.
#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

impl KubeClient {
    /// Create a client for `endpoint` with its own HTTP connection pool.
    pub fn new(endpoint: &str, config: &KubeConfig) -> Result<Self> {
        let client = build_http_client(config)?;
        Self::with_client(client, endpoint, config.token.clone())
    }

    fn with_client(client: Client, endpoint: &str, token: Option<String>) -> Result<Self> {
        let url = Url::parse(endpoint)
            .map_err(|e| KubeError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(KubeError::InvalidEndpoint(format!(
                "{endpoint}: scheme must be http or https"
            )));
        }
        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, kind: ObjectKind, namespace: &str) -> String {
        format!(
            "{}/api/v1/namespaces/{}/{}",
            self.base_url,
            namespace,
            kind.resource()
        )
    }

    fn namespace_url(&self, name: Option<&str>) -> String {
        match name {
            Some(name) => format!("{}/api/v1/namespaces/{}", self.base_url, name),
            None => format!("{}/api/v1/namespaces", self.base_url),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn handle_response(response: Response, what: &str) -> Result<Value> {
        if !response.status().is_success() {
            return Err(Self::handle_error_response(response, what).await);
        }
        response
            .json()
            .await
            .map_err(|e| KubeError::Serialization(e.to_string()))
    }

    async fn handle_error_response(response: Response, what: &str) -> KubeError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiStatus>(&body)
            .map(|s| s.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or(body);

        if status == StatusCode::NOT_FOUND {
            KubeError::NotFound(what.to_string())
        } else {
            KubeError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[async_trait]
impl WorkloadBackend for KubeClient {
    async fn create_object(
        &self,
        kind: ObjectKind,
        namespace: &str,
        spec: &Value,
    ) -> Result<Value> {
        debug!(%kind, namespace, "Creating object");
        let response = self
            .authorize(self.client.post(self.collection_url(kind, namespace)))
            .json(spec)
            .send()
            .await?;
        Self::handle_response(response, &format!("namespace {namespace}")).await
    }

    async fn delete_object(&self, kind: ObjectKind, namespace: &str, name: &str) -> Result<()> {
        debug!(%kind, namespace, name, "Deleting object");
        let url = format!("{}/{}", self.collection_url(kind, namespace), name);
        let response = self.authorize(self.client.delete(url)).send().await?;
        if !response.status().is_success() {
            let what = format!("{kind} {namespace}/{name}");
            return Err(Self::handle_error_response(response, &what).await);
        }
        Ok(())
    }

    async fn get_namespace(&self, name: &str) -> Result<Option<Value>> {
        let response = self
            .authorize(self.client.get(self.namespace_url(Some(name))))
            .send()
            .await?;
        match Self::handle_response(response, &format!("namespace {name}")).await {
            Ok(ns) => Ok(Some(ns)),
            Err(KubeError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_namespace(&self, name: &str) -> Result<Value> {
        let body = json!({
            "apiVersion": "v1",
            "kind": "Namespace",
            "metadata": { "name": name },
        });
        let response = self
            .authorize(self.client.post(self.namespace_url(None)))
            .json(&body)
            .send()
            .await?;
        match Self::handle_response(response, &format!("namespace {name}")).await {
            Err(KubeError::Api { status: 409, .. }) => Ok(body),
            other => other,
        }
    }
}

fn build_http_client(config: &KubeConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| KubeError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Builds [`KubeClient`]s that share one HTTP connection pool.
#[derive(Debug, Clone)]
pub struct KubeConnector {
    client: Client,
    config: KubeConfig,
}

impl KubeConnector {
    pub fn new(config: KubeConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(&config)?,
            config,
        })
    }
}

impl BackendConnector for KubeConnector {
    fn connect(&self, endpoint: &str) -> Result<SharedBackend> {
        let client = KubeClient::with_client(self.client.clone(), endpoint, self.config.token.clone())?;
        Ok(Arc::new(client))
    }
}
