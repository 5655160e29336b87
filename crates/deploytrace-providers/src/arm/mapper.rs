use deploytrace_types::{
    DeploymentRecord, Error, OperationRecord, ProvisioningOperation, Result, TargetResource,
    parse_iso8601_duration,
};

use super::schema::{
    DeploymentOperation, DeploymentResource, ErrorDetail, StatusMessage, TargetResourceSchema,
};

pub(crate) fn map_deployment(resource: DeploymentResource) -> Result<DeploymentRecord> {
    let id = resource
        .id
        .ok_or_else(|| Error::missing("deployment", "id"))?;
    let name = resource
        .name
        .ok_or_else(|| Error::missing(format!("deployment {}", id), "name"))?;
    let properties = resource
        .properties
        .ok_or_else(|| Error::missing(format!("deployment {}", id), "properties"))?;

    let duration = properties
        .duration
        .as_deref()
        .map(parse_iso8601_duration)
        .transpose()?;

    Ok(DeploymentRecord {
        id,
        name,
        timestamp: properties.timestamp,
        duration,
        provisioning_state: properties.provisioning_state,
        error_message: properties.error.as_ref().and_then(error_text),
        correlation_id: properties.correlation_id,
    })
}

pub(crate) fn map_operation(operation: DeploymentOperation) -> Result<OperationRecord> {
    let id = operation.id.unwrap_or_default();
    let properties = operation
        .properties
        .ok_or_else(|| Error::missing(format!("operation {}", id), "properties"))?;

    let duration = properties
        .duration
        .as_deref()
        .map(parse_iso8601_duration)
        .transpose()?;

    Ok(OperationRecord {
        operation_id: operation.operation_id.unwrap_or_else(|| id.clone()),
        id,
        provisioning_operation: properties
            .provisioning_operation
            .as_deref()
            .map(ProvisioningOperation::parse)
            .unwrap_or_else(|| ProvisioningOperation::Other(String::new())),
        target: properties.target_resource.map(map_target),
        timestamp: properties.timestamp,
        duration,
        provisioning_state: properties.provisioning_state,
        status_code: properties.status_code,
        status_message: properties.status_message.and_then(status_text),
    })
}

fn map_target(target: TargetResourceSchema) -> TargetResource {
    TargetResource {
        id: target.id,
        resource_type: target.resource_type,
        resource_name: target.resource_name,
    }
}

fn status_text(message: StatusMessage) -> Option<String> {
    match message {
        StatusMessage::Text(text) => Some(text),
        StatusMessage::Structured { status, error } => {
            status.or_else(|| error.as_ref().and_then(error_text))
        }
    }
}

/// `code: message`, descending into the first nested detail when the
/// top-level message is the generic "see details" one
pub(crate) fn error_text(error: &ErrorDetail) -> Option<String> {
    if let Some(inner) = error.details.first() {
        if let Some(text) = error_text(inner) {
            return Some(text);
        }
    }

    match (&error.code, &error.message) {
        (Some(code), Some(message)) => Some(format!("{}: {}", code, message)),
        (None, Some(message)) => Some(message.clone()),
        (Some(code), None) => Some(code.clone()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_map_deployment_parses_duration_and_error() {
        let resource: DeploymentResource = serde_json::from_value(json!({
            "id": "/subscriptions/s/providers/Microsoft.Resources/deployments/main",
            "name": "main",
            "properties": {
                "provisioningState": "Failed",
                "timestamp": "2024-05-01T12:10:00.1234567Z",
                "duration": "PT10M",
                "correlationId": "c-1",
                "error": {
                    "code": "DeploymentFailed",
                    "message": "At least one resource deployment operation failed.",
                    "details": [{ "code": "Conflict", "message": "Name in use" }]
                }
            }
        }))
        .unwrap();

        let record = map_deployment(resource).unwrap();
        assert_eq!(record.name, "main");
        assert_eq!(record.duration, Some(Duration::minutes(10)));
        assert_eq!(record.provisioning_state.as_deref(), Some("Failed"));
        assert_eq!(record.error_message.as_deref(), Some("Conflict: Name in use"));
        assert_eq!(record.correlation_id.as_deref(), Some("c-1"));
        assert!(record.timestamp.is_some());
    }

    #[test]
    fn test_map_deployment_without_properties_is_data_error() {
        let resource: DeploymentResource =
            serde_json::from_value(json!({ "id": "/x", "name": "x" })).unwrap();
        assert!(matches!(
            map_deployment(resource),
            Err(Error::MissingField { field: "properties", .. })
        ));
    }

    #[test]
    fn test_map_operation_structured_status_message() {
        let operation: DeploymentOperation = serde_json::from_value(json!({
            "id": "/x/operations/ABC",
            "operationId": "ABC",
            "properties": {
                "provisioningOperation": "Create",
                "provisioningState": "Failed",
                "timestamp": "2024-05-01T12:05:00Z",
                "duration": "PT30S",
                "statusCode": "Conflict",
                "statusMessage": { "status": "Failed", "error": { "code": "Conflict" } },
                "targetResource": {
                    "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Web/sites/app",
                    "resourceType": "Microsoft.Web/sites",
                    "resourceName": "app"
                }
            }
        }))
        .unwrap();

        let record = map_operation(operation).unwrap();
        assert!(record.is_create());
        assert_eq!(record.operation_id, "ABC");
        assert_eq!(record.status_message.as_deref(), Some("Failed"));
        assert_eq!(record.duration, Some(Duration::seconds(30)));
        assert_eq!(
            record.target.unwrap().resource_name.as_deref(),
            Some("app")
        );
    }

    #[test]
    fn test_map_operation_plain_text_status_message() {
        let operation: DeploymentOperation = serde_json::from_value(json!({
            "id": "/x/operations/DEF",
            "properties": {
                "provisioningOperation": "EvaluateDeploymentOutput",
                "statusMessage": "Succeeded"
            }
        }))
        .unwrap();

        let record = map_operation(operation).unwrap();
        assert!(!record.is_create());
        assert_eq!(record.operation_id, "/x/operations/DEF");
        assert_eq!(record.status_message.as_deref(), Some("Succeeded"));
        assert!(record.target.is_none());
    }

    #[test]
    fn test_map_operation_rejects_malformed_duration() {
        let operation: DeploymentOperation = serde_json::from_value(json!({
            "id": "/x/operations/GHI",
            "properties": { "provisioningOperation": "Create", "duration": "1 minute" }
        }))
        .unwrap();
        assert!(matches!(
            map_operation(operation),
            Err(Error::InvalidDuration(_))
        ));
    }
}
