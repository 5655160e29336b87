//! Invariant checks for reconciled trees and exported traces.

use anyhow::{Context, Result};
use deploytrace_types::{DeploymentNode, TimeWindow};
use serde_json::Value;
use std::collections::HashSet;

/// Assert timing invariants across the whole tree:
/// non-negative durations, `end == start + duration`, and every child
/// deployment and resource contained in its owner's window.
pub fn assert_tree_invariants(root: &DeploymentNode) -> Result<()> {
    for node in root.iter() {
        check_window(&node.window, &node.name)?;

        for resource in &node.resources {
            check_window(&resource.window, &resource.name)?;
            check_contained(&resource.window, &node.window, &resource.name, &node.name)?;
        }

        for child in &node.child_deployments {
            check_contained(&child.window, &node.window, &child.name, &node.name)?;
            if child.parent_uid.is_none() {
                anyhow::bail!("Nested deployment {} has no parent span", child.name);
            }
        }
    }
    Ok(())
}

fn check_window(window: &TimeWindow, name: &str) -> Result<()> {
    if window.duration() < chrono::Duration::zero() {
        anyhow::bail!("{} has negative duration {}", name, window.duration());
    }
    if window.end() != window.start() + window.duration() {
        anyhow::bail!("{} end does not equal start + duration", name);
    }
    Ok(())
}

fn check_contained(inner: &TimeWindow, outer: &TimeWindow, name: &str, owner: &str) -> Result<()> {
    if !outer.contains(inner) {
        anyhow::bail!(
            "{} [{} .. {}] escapes {} [{} .. {}]",
            name,
            inner.start(),
            inner.end(),
            owner,
            outer.start(),
            outer.end()
        );
    }
    Ok(())
}

/// Assert that every `CHILD_OF` reference in a Jaeger document points at a
/// span present in the same trace, and that exactly one span has no parent.
pub fn assert_trace_references_resolve(doc: &Value) -> Result<()> {
    let traces = doc["data"]
        .as_array()
        .context("Expected 'data' array in trace document")?;

    for trace in traces {
        let spans = trace["spans"]
            .as_array()
            .context("Expected 'spans' array in trace")?;

        let ids: HashSet<&str> = spans.iter().filter_map(|s| s["spanID"].as_str()).collect();
        let mut roots = 0;

        for (i, span) in spans.iter().enumerate() {
            let references = span["references"]
                .as_array()
                .with_context(|| format!("Span {} missing references", i))?;
            if references.is_empty() {
                roots += 1;
            }
            for reference in references {
                let target = reference["spanID"]
                    .as_str()
                    .with_context(|| format!("Span {} has a reference without spanID", i))?;
                if !ids.contains(target) {
                    anyhow::bail!("Span {} references unknown span {}", i, target);
                }
            }
        }

        if roots != 1 {
            anyhow::bail!("Expected exactly one root span, got {}", roots);
        }
    }

    Ok(())
}
