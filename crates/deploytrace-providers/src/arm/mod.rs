pub mod client;
pub mod mapper;
pub mod retry;
pub mod schema;

pub use self::client::{ArmClient, ClientConfig};
pub use self::retry::RetryPolicy;

/// Resource provider API version used for deployment and operation reads
pub const DEFAULT_API_VERSION: &str = "2021-04-01";

/// Public-cloud Resource Manager endpoint
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";
