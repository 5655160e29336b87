use async_trait::async_trait;
use deploytrace_types::{
    DeploymentHandle, DeploymentRecord, DeploymentScope, Error, OperationRecord, Result,
};
use reqwest::header::RETRY_AFTER;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::mapper::{error_text, map_deployment, map_operation};
use super::retry::RetryPolicy;
use super::schema::{DeploymentResource, ErrorResponse, OperationsPage};
use super::{DEFAULT_API_VERSION, DEFAULT_ENDPOINT};
use crate::credential::Credential;
use crate::traits::DeploymentSource;

/// Connection settings for [`ArmClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Resource Manager base URL, without trailing slash
    pub endpoint: String,
    pub api_version: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Deployment source backed by the Azure Resource Manager REST API,
/// bound to one subscription.
pub struct ArmClient {
    http: reqwest::Client,
    config: ClientConfig,
    subscription_id: String,
    credential: Credential,
    token: OnceCell<String>,
}

/// A failed attempt, with the server's requested back-off if it sent one
struct Failure {
    error: Error,
    retry_after: Option<Duration>,
}

impl From<Error> for Failure {
    fn from(error: Error) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

impl ArmClient {
    pub fn new(
        subscription_id: impl Into<String>,
        credential: Credential,
        config: ClientConfig,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("deploytrace/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            config,
            subscription_id: subscription_id.into(),
            credential,
            token: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resource URL of a deployment, without query string
    pub fn deployment_url(&self, handle: &DeploymentHandle) -> String {
        let base = self.config.endpoint.trim_end_matches('/');
        match &handle.scope {
            DeploymentScope::Subscription => format!(
                "{}/subscriptions/{}/providers/Microsoft.Resources/deployments/{}",
                base,
                self.subscription_id,
                urlencoding::encode(&handle.name)
            ),
            DeploymentScope::ResourceGroup(rg) => format!(
                "{}/subscriptions/{}/resourcegroups/{}/providers/Microsoft.Resources/deployments/{}",
                base,
                self.subscription_id,
                urlencoding::encode(rg),
                urlencoding::encode(&handle.name)
            ),
        }
    }

    fn with_api_version(&self, url: &str) -> String {
        format!("{}?api-version={}", url, self.config.api_version)
    }

    async fn bearer(&self) -> Result<&str> {
        let resource = format!("{}/", self.config.endpoint.trim_end_matches('/'));
        let token = self
            .token
            .get_or_try_init(|| self.credential.acquire(&resource))
            .await?;
        Ok(token.as_str())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let policy = self.config.retry;
        let mut attempt = 0;

        loop {
            match self.get_once(url).await {
                Ok(value) => return Ok(value),
                Err(failure) if failure.error.is_transient() && policy.should_retry(attempt) => {
                    let delay = policy.delay(attempt, failure.retry_after);
                    warn!(
                        url = strip_query(url),
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure.error,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> std::result::Result<T, Failure> {
        let token = self.bearer().await?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| Error::Http(e.to_string()))?;
            return Ok(serde_json::from_slice(&body).map_err(Error::from)?);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.unwrap_or_default();

        Err(Failure {
            error: Error::Status {
                status: status.as_u16(),
                url: strip_query(url).to_string(),
                body: summarize_error_body(&body),
            },
            retry_after,
        })
    }
}

#[async_trait]
impl DeploymentSource for ArmClient {
    async fn get_deployment(&self, handle: &DeploymentHandle) -> Result<DeploymentRecord> {
        debug!(deployment = %handle, "fetching deployment");
        let url = self.with_api_version(&self.deployment_url(handle));
        let resource: DeploymentResource = self.get_json(&url).await?;
        map_deployment(resource)
    }

    async fn list_operations(&self, handle: &DeploymentHandle) -> Result<Vec<OperationRecord>> {
        let first = format!("{}/operations", self.deployment_url(handle));
        let mut next = Some(self.with_api_version(&first));
        let mut records = Vec::new();
        let mut visited = HashSet::new();
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                return Err(Error::Http(format!(
                    "operations of {} page back to an already fetched link: {}",
                    handle,
                    strip_query(&url)
                )));
            }
            let page: OperationsPage = self.get_json(&url).await?;
            pages += 1;
            for operation in page.value {
                records.push(map_operation(operation)?);
            }
            next = page.next_link.filter(|link| !link.is_empty());
        }

        debug!(
            deployment = %handle,
            operations = records.len(),
            pages,
            "fetched operations"
        );
        Ok(records)
    }
}

fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Prefer the ARM error message over the raw body
fn summarize_error_body(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        if let Some(text) = error_text(&parsed.error) {
            return text;
        }
    }

    let trimmed = body.trim();
    if trimmed.chars().count() > 500 {
        format!("{}...", trimmed.chars().take(500).collect::<String>())
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> ArmClient {
        ArmClient::new(
            "sub-1",
            Credential::Static("t".to_string()),
            ClientConfig {
                endpoint: endpoint.to_string(),
                ..ClientConfig::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_subscription_deployment_url() {
        let c = client("https://management.azure.com/");
        assert_eq!(
            c.deployment_url(&DeploymentHandle::subscription("main")),
            "https://management.azure.com/subscriptions/sub-1/providers/Microsoft.Resources/deployments/main"
        );
    }

    #[test]
    fn test_resource_group_deployment_url() {
        let c = client("https://management.azure.com");
        assert_eq!(
            c.deployment_url(&DeploymentHandle::resource_group("rg", "net")),
            "https://management.azure.com/subscriptions/sub-1/resourcegroups/rg/providers/Microsoft.Resources/deployments/net"
        );
    }

    #[test]
    fn test_deployment_url_encodes_path_segments() {
        let c = client("https://management.azure.com");
        assert_eq!(
            c.deployment_url(&DeploymentHandle::resource_group("my rg", "app#1")),
            "https://management.azure.com/subscriptions/sub-1/resourcegroups/my%20rg/providers/Microsoft.Resources/deployments/app%231"
        );
    }

    #[test]
    fn test_summarize_error_body_prefers_arm_message() {
        let body = r#"{"error":{"code":"DeploymentNotFound","message":"Deployment 'x' could not be found."}}"#;
        assert_eq!(
            summarize_error_body(body),
            "DeploymentNotFound: Deployment 'x' could not be found."
        );
        assert_eq!(summarize_error_body("  gateway timeout \n"), "gateway timeout");
    }
}
