use crate::args::{Cli, Commands, DeploymentArgs};
use crate::types::OutputMode;
use deploytrace_providers::{ClientConfig, Credential, RetryPolicy};
use deploytrace_types::DeploymentHandle;
use std::path::PathBuf;
use std::time::Duration;

/// Everything a run needs, resolved from the command line and environment.
#[derive(Debug, Clone)]
pub struct TraceRequest {
    pub subscription_id: String,
    pub root: DeploymentHandle,
    pub credential: Credential,
    pub client: ClientConfig,
    pub output: OutputMode,
    pub output_file: Option<PathBuf>,
}

impl TraceRequest {
    pub fn from_cli(cli: &Cli) -> Self {
        let (deployment, root) = match &cli.command {
            Commands::Subscription(args) => {
                (args, DeploymentHandle::subscription(&args.deployment_name))
            }
            Commands::ResourceGroup(args) => (
                &args.deployment,
                DeploymentHandle::resource_group(
                    &args.resource_group,
                    &args.deployment.deployment_name,
                ),
            ),
        };

        Self {
            subscription_id: deployment.subscription_id.to_string(),
            root,
            credential: credential(cli.access_token.as_deref(), deployment),
            client: ClientConfig {
                endpoint: cli.arm_endpoint.trim_end_matches('/').to_string(),
                request_timeout: Duration::from_secs(cli.request_timeout_secs),
                retry: RetryPolicy {
                    max_retries: cli.max_retries,
                    ..RetryPolicy::default()
                },
                ..ClientConfig::default()
            },
            output: deployment.output,
            output_file: deployment.output_file.clone(),
        }
    }
}

fn credential(access_token: Option<&str>, deployment: &DeploymentArgs) -> Credential {
    match access_token {
        Some(token) if !token.is_empty() => Credential::Static(token.to_string()),
        _ => Credential::AzureCli {
            tenant_id: deployment.tenant_id.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_subscription_request() {
        let cli = parse(&[
            "deploytrace",
            "--access-token",
            "tok",
            "--arm-endpoint",
            "http://localhost:9999/",
            "--max-retries",
            "0",
            "subscription",
            "--subscription-id",
            "00000000-0000-0000-0000-000000000001",
            "--deployment-name",
            "main",
            "--output",
            "cli",
        ]);

        let request = TraceRequest::from_cli(&cli);

        assert_eq!(request.root, DeploymentHandle::subscription("main"));
        assert_eq!(request.subscription_id, "00000000-0000-0000-0000-000000000001");
        assert_eq!(request.client.endpoint, "http://localhost:9999");
        assert_eq!(request.client.retry.max_retries, 0);
        assert_eq!(request.output, OutputMode::Cli);
        assert!(matches!(request.credential, Credential::Static(ref t) if t == "tok"));
    }

    #[test]
    fn test_resource_group_request_falls_back_to_azure_cli() {
        let cli = parse(&[
            "deploytrace",
            "resource-group",
            "--tenant-id",
            "tenant-1",
            "--subscription-id",
            "00000000-0000-0000-0000-000000000001",
            "--resource-group",
            "rg",
            "--deployment-name",
            "main",
            "--output",
            "trace",
            "--output-file",
            "trace.json",
        ]);
        let mut cli = cli;
        cli.access_token = None;

        let request = TraceRequest::from_cli(&cli);

        assert_eq!(request.root, DeploymentHandle::resource_group("rg", "main"));
        assert_eq!(request.output_file, Some(PathBuf::from("trace.json")));
        assert!(matches!(
            request.credential,
            Credential::AzureCli { tenant_id: Some(ref t) } if t == "tenant-1"
        ));
    }
}
