use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Wire shapes for the ARM deployments API. Every field is optional on the
// wire; the mapper decides which absences are fatal.

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeploymentResource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: Option<DeploymentProperties>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeploymentProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// ISO-8601 duration, e.g. `PT1M2.345S`
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Vec<ErrorDetail>,
}

/// Body of a non-success ARM response
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OperationsPage {
    #[serde(default)]
    pub value: Vec<DeploymentOperation>,
    #[serde(default)]
    pub next_link: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeploymentOperation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub properties: Option<OperationProperties>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OperationProperties {
    #[serde(default)]
    pub provisioning_operation: Option<String>,
    #[serde(default)]
    pub provisioning_state: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub status_message: Option<StatusMessage>,
    #[serde(default)]
    pub target_resource: Option<TargetResourceSchema>,
}

/// `statusMessage` is an object on most operations but a bare string on some
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub(crate) enum StatusMessage {
    Text(String),
    Structured {
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        error: Option<ErrorDetail>,
    },
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TargetResourceSchema {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub resource_name: Option<String>,
}
