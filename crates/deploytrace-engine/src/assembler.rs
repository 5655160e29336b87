use chrono::{DateTime, Duration, Utc};
use deploytrace_providers::DeploymentSource;
use deploytrace_types::{
    DeploymentHandle, DeploymentNode, DeploymentRecord, Error, OperationRecord, ResourceId,
    ResourceSpan, Result, SpanUid, TargetResource, TimeWindow,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::reconcile::{self, Predecessor};

/// Where in the walk a deployment is being built
#[derive(Debug, Clone, Copy)]
enum Placement {
    Root,
    Nested {
        /// Start of the root deployment, fixed once for the whole walk
        anchor: DateTime<Utc>,
        /// Window of the owning deployment, already final
        parent: TimeWindow,
        previous: Predecessor,
    },
}

/// Build the reconciled deployment tree rooted at `root`.
///
/// Deployments are fetched depth-first and strictly one at a time: each
/// nested deployment is reconciled against the sibling finished just before
/// it, so siblings cannot be fetched concurrently. Any fetch or data-shape
/// failure aborts the whole build; no partial tree is returned.
pub async fn build_tree(
    source: &dyn DeploymentSource,
    root: &DeploymentHandle,
) -> Result<DeploymentNode> {
    build_node(source, root.clone(), Placement::Root).await
}

fn build_node<'a>(
    source: &'a dyn DeploymentSource,
    handle: DeploymentHandle,
    placement: Placement,
) -> BoxFuture<'a, Result<DeploymentNode>> {
    async move {
        let record = source.get_deployment(&handle).await?;
        let end = record
            .timestamp
            .ok_or_else(|| Error::missing(format!("deployment {}", record.name), "timestamp"))?;

        let (raw, timing_from_parent) = match (record.duration, placement) {
            (Some(duration), _) => (window_ending_at(end, duration, &record.name)?, false),
            // Nothing to anchor the walk on
            (None, Placement::Root) => {
                return Err(Error::missing(
                    format!("deployment {}", record.name),
                    "duration",
                ));
            }
            (None, Placement::Nested { anchor, .. }) => (TimeWindow::between(anchor, end), true),
        };

        let (window, parent_uid, anchor) = match placement {
            Placement::Root => (raw, None, raw.start()),
            Placement::Nested {
                anchor,
                parent,
                previous,
            } => {
                let window = reconcile::deployment_window(raw, &previous, &parent);
                if window != raw {
                    debug!(
                        deployment = %handle,
                        raw_start = %raw.start(),
                        start = %window.start(),
                        end = %window.end(),
                        "reconciled deployment window"
                    );
                }
                (window, Some(previous.uid), anchor)
            }
        };

        let uid = SpanUid::generate();
        let operations = source.list_operations(&handle).await?;
        debug!(
            deployment = %handle,
            operations = operations.len(),
            "enumerating operations"
        );

        let mut resources = Vec::new();
        let mut child_deployments: Vec<DeploymentNode> = Vec::new();
        let mut previous = Predecessor::parent(uid, window);

        for operation in &operations {
            if !operation.is_create() {
                continue;
            }
            let Some(target) = operation.target.as_ref().filter(|t| t.id.is_some()) else {
                warn!(
                    deployment = %handle,
                    operation = %operation.operation_id,
                    "skipping create operation without a target resource"
                );
                continue;
            };

            if target.is_deployment() {
                let child_handle = DeploymentHandle::from_target(target)?;
                let child = build_node(
                    source,
                    child_handle,
                    Placement::Nested {
                        anchor,
                        parent: window,
                        previous,
                    },
                )
                .await?;
                previous = Predecessor::sibling(child.uid, child.window);
                child_deployments.push(child);
            } else {
                resources.push(resource_span(operation, target, &window)?);
            }
        }

        Ok(deployment_node(
            record,
            &handle,
            uid,
            parent_uid,
            window,
            timing_from_parent,
            resources,
            child_deployments,
        ))
    }
    .boxed()
}

fn window_ending_at(end: DateTime<Utc>, duration: Duration, owner: &str) -> Result<TimeWindow> {
    TimeWindow::checked_ending_at(end, duration).ok_or_else(|| {
        Error::InvalidDuration(format!("{} ({} ending at {})", owner, duration, end))
    })
}

#[allow(clippy::too_many_arguments)]
fn deployment_node(
    record: DeploymentRecord,
    handle: &DeploymentHandle,
    uid: SpanUid,
    parent_uid: Option<SpanUid>,
    window: TimeWindow,
    timing_from_parent: bool,
    resources: Vec<ResourceSpan>,
    child_deployments: Vec<DeploymentNode>,
) -> DeploymentNode {
    DeploymentNode {
        id: record.id,
        uid,
        parent_uid,
        name: record.name,
        resource_group: handle.resource_group_name().map(str::to_string),
        correlation_id: record.correlation_id.unwrap_or_default(),
        window,
        timing_from_parent,
        status_code: record.provisioning_state.unwrap_or_default(),
        status_message: record.error_message.unwrap_or_default(),
        resources,
        child_deployments,
    }
}

fn resource_span(
    operation: &OperationRecord,
    target: &TargetResource,
    owner: &TimeWindow,
) -> Result<ResourceSpan> {
    let end = operation.timestamp.ok_or_else(|| {
        Error::missing(format!("operation {}", operation.operation_id), "timestamp")
    })?;
    let raw = window_ending_at(
        end,
        operation.duration.unwrap_or_else(Duration::zero),
        &operation.operation_id,
    )?;
    let window = reconcile::resource_window(raw, owner);

    let id = target.id.clone().unwrap_or_default();
    let name = target
        .resource_name
        .clone()
        .or_else(|| ResourceId::new(&id).last_segment().map(str::to_string))
        .unwrap_or_else(|| id.clone());

    Ok(ResourceSpan {
        id,
        name,
        operation_id: operation.operation_id.clone(),
        window,
        provisioning_state: operation.provisioning_state.clone().unwrap_or_default(),
        provisioning_operation: operation.provisioning_operation.clone(),
        status_code: operation.status_code.clone().unwrap_or_default(),
        status_message: operation.status_message.clone().unwrap_or_default(),
    })
}
