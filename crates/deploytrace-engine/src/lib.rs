// Engine module - tree reconstruction, timeline reconciliation and trace export
// This layer sits between the deployment source (providers) and CLI presentation

pub mod assembler;
pub mod export;
pub mod reconcile;

pub use assembler::build_tree;
pub use export::{TraceDocument, export_trace, export_trace_in};
pub use reconcile::{Predecessor, Relation};
