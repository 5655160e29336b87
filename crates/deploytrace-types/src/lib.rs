pub mod duration;
pub mod error;
pub mod model;
pub mod resource_id;
pub mod source;
pub mod time;

pub use duration::parse_iso8601_duration;
pub use error::{Error, Result};
pub use model::{DeploymentNode, ResourceSpan, SpanUid};
pub use resource_id::ResourceId;
pub use source::{
    DeploymentHandle, DeploymentRecord, DeploymentScope, OperationRecord, ProvisioningOperation,
    TargetResource,
};
pub use time::TimeWindow;
