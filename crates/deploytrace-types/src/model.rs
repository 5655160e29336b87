use serde::{Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

use crate::source::ProvisioningOperation;
use crate::time::TimeWindow;

/// Locally generated span identity, used only to correlate output records.
///
/// Rendered as 16 lowercase hex digits, the width trace viewers expect for a
/// span id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanUid(u64);

impl SpanUid {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().as_u64_pair().0)
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SpanUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Serialize for SpanUid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One deployment (root or nested) with its reconciled timing.
///
/// Built once by the engine and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentNode {
    /// Identifier reported by the deployment source
    pub id: String,

    pub uid: SpanUid,

    /// Uid of the node this one was reconciled against; `None` for the root
    pub parent_uid: Option<SpanUid>,

    pub name: String,

    /// `None` for subscription-scoped deployments
    pub resource_group: Option<String>,

    pub correlation_id: String,

    pub window: TimeWindow,

    /// Set when the source reported no duration and the start came from the
    /// walk's anchor time instead
    pub timing_from_parent: bool,

    /// Provisioning state, e.g. `Succeeded` or `Failed`
    pub status_code: String,

    /// Error message when provisioning failed, empty otherwise
    pub status_message: String,

    pub resources: Vec<ResourceSpan>,

    pub child_deployments: Vec<DeploymentNode>,
}

impl DeploymentNode {
    pub fn is_failed(&self) -> bool {
        self.status_code == "Failed"
    }

    pub fn is_root(&self) -> bool {
        self.parent_uid.is_none()
    }

    /// Pre-order iterator over this node and all nested deployments
    pub fn iter(&self) -> impl Iterator<Item = &DeploymentNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.child_deployments.iter().rev());
            Some(node)
        })
    }
}

/// One leaf resource provisioning operation
#[derive(Debug, Clone, Serialize)]
pub struct ResourceSpan {
    /// Full resource path
    pub id: String,
    pub name: String,
    pub operation_id: String,
    pub window: TimeWindow,
    pub provisioning_state: String,
    pub provisioning_operation: ProvisioningOperation,
    pub status_code: String,
    pub status_message: String,
}

impl ResourceSpan {
    pub fn is_failed(&self) -> bool {
        self.provisioning_state == "Failed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_uid_renders_as_16_hex_digits() {
        assert_eq!(SpanUid::from_raw(0xab).to_string(), "00000000000000ab");
        let generated = SpanUid::generate().to_string();
        assert_eq!(generated.len(), 16);
        assert!(generated.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_span_uid_serializes_as_string() {
        let json = serde_json::to_value(SpanUid::from_raw(1)).unwrap();
        assert_eq!(json, "0000000000000001");
    }
}
