use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

use crate::resource_id::ResourceId;
use crate::{Error, Result};

/// Where a deployment lives inside the subscription bound to the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentScope {
    Subscription,
    ResourceGroup(String),
}

/// Enough to look a deployment up: its scope and name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentHandle {
    pub scope: DeploymentScope,
    pub name: String,
}

impl DeploymentHandle {
    pub fn subscription(name: impl Into<String>) -> Self {
        Self {
            scope: DeploymentScope::Subscription,
            name: name.into(),
        }
    }

    pub fn resource_group(resource_group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: DeploymentScope::ResourceGroup(resource_group.into()),
            name: name.into(),
        }
    }

    pub fn resource_group_name(&self) -> Option<&str> {
        match &self.scope {
            DeploymentScope::Subscription => None,
            DeploymentScope::ResourceGroup(rg) => Some(rg),
        }
    }

    /// Handle for the nested deployment an operation targets.
    ///
    /// Scope comes from whether the target id carries a resource-group
    /// segment; the name falls back to the last id segment.
    pub fn from_target(target: &TargetResource) -> Result<Self> {
        let raw_id = target
            .id
            .as_deref()
            .ok_or_else(|| Error::missing("nested deployment target", "id"))?;
        let id = ResourceId::new(raw_id);

        let name = match target.resource_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => id
                .last_segment()
                .ok_or_else(|| Error::InvalidResourceId(raw_id.to_string()))?
                .to_string(),
        };

        if id.is_resource_group_scoped() {
            let rg = id
                .resource_group()
                .ok_or_else(|| Error::InvalidResourceId(raw_id.to_string()))?;
            Ok(Self::resource_group(rg, name))
        } else {
            Ok(Self::subscription(name))
        }
    }
}

impl fmt::Display for DeploymentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            DeploymentScope::Subscription => write!(f, "{}", self.name),
            DeploymentScope::ResourceGroup(rg) => write!(f, "{}/{}", rg, self.name),
        }
    }
}

/// Deployment as reported by the source, before any reconciliation
#[derive(Debug, Clone, Default)]
pub struct DeploymentRecord {
    pub id: String,
    pub name: String,
    /// When the deployment finished (or last changed state)
    pub timestamp: Option<DateTime<Utc>>,
    pub duration: Option<Duration>,
    pub provisioning_state: Option<String>,
    pub error_message: Option<String>,
    pub correlation_id: Option<String>,
}

/// Kind of provisioning step an operation performed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ProvisioningOperation {
    Create,
    Read,
    Delete,
    Action,
    Waiting,
    Other(String),
}

impl ProvisioningOperation {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "create" => Self::Create,
            "read" => Self::Read,
            "delete" => Self::Delete,
            "action" => Self::Action,
            "waiting" => Self::Waiting,
            _ => Self::Other(raw.to_string()),
        }
    }
}

impl fmt::Display for ProvisioningOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "Create"),
            Self::Read => write!(f, "Read"),
            Self::Delete => write!(f, "Delete"),
            Self::Action => write!(f, "Action"),
            Self::Waiting => write!(f, "Waiting"),
            Self::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// Resource an operation acted upon
#[derive(Debug, Clone, Default)]
pub struct TargetResource {
    pub id: Option<String>,
    /// e.g. `Microsoft.Resources/deployments`
    pub resource_type: Option<String>,
    pub resource_name: Option<String>,
}

impl TargetResource {
    /// Whether the target is itself a nested deployment
    pub fn is_deployment(&self) -> bool {
        self.resource_type.as_deref().is_some_and(|ty| {
            let short = ty.rsplit('/').next().unwrap_or(ty);
            short.eq_ignore_ascii_case("deployments")
        })
    }
}

/// One entry of a deployment's (unordered) operation list
#[derive(Debug, Clone)]
pub struct OperationRecord {
    pub id: String,
    pub operation_id: String,
    pub provisioning_operation: ProvisioningOperation,
    pub target: Option<TargetResource>,
    pub timestamp: Option<DateTime<Utc>>,
    pub duration: Option<Duration>,
    pub provisioning_state: Option<String>,
    pub status_code: Option<String>,
    pub status_message: Option<String>,
}

impl OperationRecord {
    pub fn is_create(&self) -> bool {
        self.provisioning_operation == ProvisioningOperation::Create
    }
}
