use async_trait::async_trait;
use deploytrace_types::{DeploymentHandle, DeploymentRecord, OperationRecord, Result};

/// Read-only access to deployment records and their operations
///
/// Responsibilities:
/// - Look up a single deployment by scope and name
/// - List every operation a deployment performed, fully materialised
///
/// Implementations are queried fresh on every call; nothing is cached
/// between calls, so a build always sees the source's current state.
#[async_trait]
pub trait DeploymentSource: Send + Sync {
    /// Fetch the deployment record identified by `handle`
    async fn get_deployment(&self, handle: &DeploymentHandle) -> Result<DeploymentRecord>;

    /// Fetch the deployment's operations, in the order the source returns them
    async fn list_operations(&self, handle: &DeploymentHandle) -> Result<Vec<OperationRecord>>;
}
