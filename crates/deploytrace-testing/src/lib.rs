//! Testing infrastructure for deploytrace tests.
//!
//! - `FakeSource`: in-memory deployment source with call log and failure injection
//! - `fixtures`: raw deployment and operation records anchored at a fixed time
//! - `arm`: ARM wire bodies for mock HTTP servers
//! - `assertions`: tree and trace invariant checks
//! - `TestWorld`: isolated environment for running the binary

pub mod arm;
pub mod assertions;
pub mod fixtures;
pub mod providers;
pub mod world;

pub use providers::FakeSource;
pub use world::TestWorld;
