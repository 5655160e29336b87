// deploytrace CLI
//
// Walks a deployment and every nested deployment it created, strictly one
// fetch at a time, then hands the reconciled tree to one of two renderers:
// - `cli`: ASCII waterfall on stdout
// - `trace`: Jaeger JSON, to a file or stdout
//
// Source and authorization failures end the run with no partial output.
// A deployment whose provisioning failed is ordinary data and is rendered.

mod args;
mod commands;
pub mod config;
mod handlers;
pub mod logging;
pub mod presentation;
pub mod types;

pub use args::{Cli, Commands, DeploymentArgs, ResourceGroupArgs};
pub use commands::run;
