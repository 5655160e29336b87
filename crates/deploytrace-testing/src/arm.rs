//! ARM REST bodies for mock servers.

use serde_json::{Value, json};

/// `GET .../deployments/{name}` response body.
pub fn deployment_body(id: &str, name: &str, timestamp: &str, duration: &str, state: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "properties": {
            "provisioningState": state,
            "timestamp": timestamp,
            "duration": duration,
            "correlationId": format!("corr-{}", name)
        }
    })
}

/// One entry of an operations page targeting `target_id`.
pub fn create_operation(
    operation_id: &str,
    target_id: &str,
    resource_type: &str,
    timestamp: &str,
    duration: &str,
) -> Value {
    let name = target_id.rsplit('/').next().unwrap_or(target_id);
    json!({
        "id": format!("op/{}", operation_id),
        "operationId": operation_id,
        "properties": {
            "provisioningOperation": "Create",
            "provisioningState": "Succeeded",
            "timestamp": timestamp,
            "duration": duration,
            "statusCode": "OK",
            "targetResource": {
                "id": target_id,
                "resourceType": resource_type,
                "resourceName": name
            }
        }
    })
}

/// A single operations page without `nextLink`.
pub fn operations_page(operations: Vec<Value>) -> Value {
    json!({ "value": operations })
}

/// ARM error envelope.
pub fn error_body(code: &str, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}
