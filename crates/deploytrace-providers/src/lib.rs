// Deployment source trait (public API)
pub mod traits;

// Azure Resource Manager implementation
pub mod arm;

// Bearer token acquisition
pub mod credential;

pub use arm::{ArmClient, ClientConfig, RetryPolicy};
pub use credential::Credential;
pub use traits::DeploymentSource;

// Error types are shared with the rest of the workspace
pub use deploytrace_types::{Error, Result};
