use crate::types::{LogLevel, OutputMode};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "deploytrace")]
#[command(about = "Reconstruct the timeline of a nested Azure deployment", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// Azure Resource Manager endpoint
    #[arg(
        long,
        env = "DEPLOYTRACE_ARM_ENDPOINT",
        default_value = "https://management.azure.com",
        global = true
    )]
    pub arm_endpoint: String,

    /// Retries for transient failures (connection errors, 429, 5xx)
    #[arg(long, default_value = "3", global = true)]
    pub max_retries: u32,

    #[arg(long, default_value = "30", global = true)]
    pub request_timeout_secs: u64,

    /// Bearer token to use instead of asking the Azure CLI
    #[arg(long, env = "DEPLOYTRACE_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub access_token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Trace a subscription-scoped deployment
    Subscription(DeploymentArgs),

    /// Trace a resource-group-scoped deployment
    ResourceGroup(ResourceGroupArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DeploymentArgs {
    #[arg(long)]
    pub tenant_id: Option<String>,

    #[arg(long)]
    pub subscription_id: Uuid,

    #[arg(long)]
    pub deployment_name: String,

    #[arg(long)]
    pub output: OutputMode,

    /// Where to write the trace; stdout when omitted
    #[arg(long)]
    pub output_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ResourceGroupArgs {
    #[arg(long)]
    pub resource_group: String,

    #[command(flatten)]
    pub deployment: DeploymentArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resource_group_command() {
        let cli = Cli::try_parse_from([
            "deploytrace",
            "resource-group",
            "--subscription-id",
            "00000000-0000-0000-0000-000000000001",
            "--resource-group",
            "rg",
            "--deployment-name",
            "main",
            "--output",
            "trace",
        ])
        .unwrap();

        let Commands::ResourceGroup(args) = cli.command else {
            panic!("expected resource-group command");
        };
        assert_eq!(args.resource_group, "rg");
        assert_eq!(args.deployment.deployment_name, "main");
        assert_eq!(args.deployment.output, OutputMode::Trace);
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert_eq!(cli.max_retries, 3);
    }

    #[test]
    fn test_output_is_required() {
        let result = Cli::try_parse_from([
            "deploytrace",
            "subscription",
            "--subscription-id",
            "00000000-0000-0000-0000-000000000001",
            "--deployment-name",
            "main",
        ]);
        let err = result.err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        assert!(err.to_string().contains("--output"));
    }

    #[test]
    fn test_rejects_malformed_subscription_id() {
        let result = Cli::try_parse_from([
            "deploytrace",
            "subscription",
            "--subscription-id",
            "not-a-uuid",
            "--deployment-name",
            "main",
            "--output",
            "cli",
        ]);
        assert!(result.is_err());
    }
}
