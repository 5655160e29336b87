//! In-memory deployment source.

use async_trait::async_trait;
use deploytrace_providers::DeploymentSource;
use deploytrace_types::{DeploymentHandle, DeploymentRecord, Error, OperationRecord, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned records keyed by deployment handle and logs every call.
///
/// # Example
/// ```no_run
/// use deploytrace_testing::{FakeSource, fixtures};
/// use deploytrace_types::DeploymentHandle;
///
/// let source = FakeSource::new().with_deployment(
///     &DeploymentHandle::resource_group("rg", "main"),
///     fixtures::deployment("main", 10, Some(10)),
///     vec![fixtures::resource_create("sa1", 2, Some(1))],
/// );
/// ```
#[derive(Default)]
pub struct FakeSource {
    deployments: HashMap<String, DeploymentRecord>,
    operations: HashMap<String, Vec<OperationRecord>>,
    failures: HashMap<String, u16>,
    calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deployment(
        mut self,
        handle: &DeploymentHandle,
        record: DeploymentRecord,
        operations: Vec<OperationRecord>,
    ) -> Self {
        let key = handle.to_string();
        self.deployments.insert(key.clone(), record);
        self.operations.insert(key, operations);
        self
    }

    /// Make every fetch of `handle` fail with the given HTTP status.
    pub fn failing(mut self, handle: &DeploymentHandle, status: u16) -> Self {
        self.failures.insert(handle.to_string(), status);
        self
    }

    /// Calls received so far, as `get <handle>` / `list <handle>`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record_call(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn check(&self, key: &str) -> Result<()> {
        match self.failures.get(key) {
            Some(status) => Err(Error::Status {
                status: *status,
                url: format!("fake://{}", key),
                body: "injected failure".to_string(),
            }),
            None => Ok(()),
        }
    }

    fn not_found(key: &str) -> Error {
        Error::Status {
            status: 404,
            url: format!("fake://{}", key),
            body: "DeploymentNotFound".to_string(),
        }
    }
}

#[async_trait]
impl DeploymentSource for FakeSource {
    async fn get_deployment(&self, handle: &DeploymentHandle) -> Result<DeploymentRecord> {
        let key = handle.to_string();
        self.record_call(format!("get {}", key));
        self.check(&key)?;
        self.deployments
            .get(&key)
            .cloned()
            .ok_or_else(|| Self::not_found(&key))
    }

    async fn list_operations(&self, handle: &DeploymentHandle) -> Result<Vec<OperationRecord>> {
        let key = handle.to_string();
        self.record_call(format!("list {}", key));
        self.check(&key)?;
        self.operations
            .get(&key)
            .cloned()
            .ok_or_else(|| Self::not_found(&key))
    }
}
