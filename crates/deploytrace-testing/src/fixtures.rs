//! Raw records for building deployment trees in tests.
//!
//! All times are expressed in minutes relative to [`t0`].

use chrono::{DateTime, Duration, Utc};
use deploytrace_types::{DeploymentRecord, OperationRecord, ProvisioningOperation, TargetResource};

pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000001";
pub const RESOURCE_GROUP: &str = "rg";

/// Fixed reference time, 2024-05-01T12:00:00Z.
pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_714_564_800, 0).unwrap_or_default()
}

/// `t0` shifted by a (possibly negative) number of minutes.
pub fn at(minutes: i64) -> DateTime<Utc> {
    t0() + Duration::minutes(minutes)
}

pub fn deployment_id(resource_group: Option<&str>, name: &str) -> String {
    match resource_group {
        Some(rg) => format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Resources/deployments/{}",
            SUBSCRIPTION, rg, name
        ),
        None => format!(
            "/subscriptions/{}/providers/Microsoft.Resources/deployments/{}",
            SUBSCRIPTION, name
        ),
    }
}

pub fn resource_id(provider_type: &str, name: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/{}/{}",
        SUBSCRIPTION, RESOURCE_GROUP, provider_type, name
    )
}

/// A succeeded resource-group deployment ending at `end` minutes.
pub fn deployment(name: &str, end: i64, minutes: Option<i64>) -> DeploymentRecord {
    DeploymentRecord {
        id: deployment_id(Some(RESOURCE_GROUP), name),
        name: name.to_string(),
        timestamp: Some(at(end)),
        duration: minutes.map(Duration::minutes),
        provisioning_state: Some("Succeeded".to_string()),
        error_message: None,
        correlation_id: Some(format!("corr-{}", name)),
    }
}

/// A failed deployment with an error message.
pub fn failed_deployment(name: &str, end: i64, minutes: Option<i64>, message: &str) -> DeploymentRecord {
    DeploymentRecord {
        provisioning_state: Some("Failed".to_string()),
        error_message: Some(message.to_string()),
        ..deployment(name, end, minutes)
    }
}

/// A succeeded `Create` operation against a storage account named `name`.
pub fn resource_create(name: &str, end: i64, minutes: Option<i64>) -> OperationRecord {
    operation(
        name,
        ProvisioningOperation::Create,
        Some(TargetResource {
            id: Some(resource_id("Microsoft.Storage/storageAccounts", name)),
            resource_type: Some("Microsoft.Storage/storageAccounts".to_string()),
            resource_name: Some(name.to_string()),
        }),
        end,
        minutes,
    )
}

/// A failed `Create` operation with ARM status fields.
pub fn failed_resource_create(
    name: &str,
    end: i64,
    minutes: Option<i64>,
    code: &str,
    message: &str,
) -> OperationRecord {
    OperationRecord {
        provisioning_state: Some("Failed".to_string()),
        status_code: Some(code.to_string()),
        status_message: Some(message.to_string()),
        ..resource_create(name, end, minutes)
    }
}

/// A `Create` operation whose target is a nested deployment.
pub fn nested_deployment(resource_group: Option<&str>, name: &str, end: i64) -> OperationRecord {
    operation(
        name,
        ProvisioningOperation::Create,
        Some(TargetResource {
            id: Some(deployment_id(resource_group, name)),
            resource_type: Some("Microsoft.Resources/deployments".to_string()),
            resource_name: Some(name.to_string()),
        }),
        end,
        None,
    )
}

/// A non-`Create` operation; never material to the tree.
pub fn read_operation(name: &str, end: i64) -> OperationRecord {
    operation(
        name,
        ProvisioningOperation::Read,
        Some(TargetResource {
            id: Some(resource_id("Microsoft.KeyVault/vaults", name)),
            resource_type: Some("Microsoft.KeyVault/vaults".to_string()),
            resource_name: Some(name.to_string()),
        }),
        end,
        Some(1),
    )
}

/// A `Create` operation without a target resource.
pub fn untargeted_create(operation_id: &str, end: i64) -> OperationRecord {
    operation(operation_id, ProvisioningOperation::Create, None, end, Some(1))
}

fn operation(
    operation_id: &str,
    kind: ProvisioningOperation,
    target: Option<TargetResource>,
    end: i64,
    minutes: Option<i64>,
) -> OperationRecord {
    OperationRecord {
        id: format!("op-{}", operation_id),
        operation_id: operation_id.to_string(),
        provisioning_operation: kind,
        target,
        timestamp: Some(at(end)),
        duration: minutes.map(Duration::minutes),
        provisioning_state: Some("Succeeded".to_string()),
        status_code: Some("OK".to_string()),
        status_message: None,
    }
}
