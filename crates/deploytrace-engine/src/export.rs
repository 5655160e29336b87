use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use deploytrace_types::{DeploymentNode, ResourceId, ResourceSpan, SpanUid, TimeWindow};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

const PORTAL_DEPLOYMENT_URL: &str =
    "https://portal.azure.com/#blade/HubsExtension/DeploymentDetailsBlade/overview/id/";

const TEMPLATE_PROCESS: &str = "tmp";
const OVERARCHING_PROCESS: &str = "prt";
const RESOURCE_PROCESS: &str = "rsc";

const LOCAL_TIME_FORMAT: &str = "%H:%M:%S%.3f%:z";

/// Jaeger JSON import document
#[derive(Debug, Clone, Serialize)]
pub struct TraceDocument {
    pub data: Vec<Trace>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    #[serde(rename = "traceID")]
    pub trace_id: String,
    pub spans: Vec<TraceSpan>,
    pub processes: BTreeMap<String, Process>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSpan {
    #[serde(rename = "traceID")]
    pub trace_id: String,
    #[serde(rename = "spanID")]
    pub span_id: SpanUid,
    pub operation_name: String,
    pub references: Vec<Reference>,
    /// Microseconds since the Unix epoch
    pub start_time: i64,
    /// Microseconds
    pub duration: i64,
    #[serde(rename = "processID")]
    pub process_id: String,
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub ref_type: String,
    #[serde(rename = "traceID")]
    pub trace_id: String,
    #[serde(rename = "spanID")]
    pub span_id: SpanUid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub service_name: String,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Value,
}

impl Tag {
    fn string(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            kind: "string".to_string(),
            value: Value::String(value.into()),
        }
    }

    fn bool(key: &str, value: bool) -> Self {
        Self {
            key: key.to_string(),
            kind: "bool".to_string(),
            value: Value::Bool(value),
        }
    }
}

impl TraceDocument {
    pub fn spans(&self) -> impl Iterator<Item = &TraceSpan> {
        self.data.iter().flat_map(|trace| trace.spans.iter())
    }
}

impl TraceSpan {
    pub fn tag(&self, key: &str) -> Option<&Value> {
        self.tags.iter().find(|t| t.key == key).map(|t| &t.value)
    }
}

/// Export the tree as a trace document with times rendered in the local zone.
pub fn export_trace(root: &DeploymentNode) -> TraceDocument {
    export_trace_in(root, &Local)
}

/// Export the tree with human-readable time tags rendered in `tz`.
pub fn export_trace_in<Tz>(root: &DeploymentNode, tz: &Tz) -> TraceDocument
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let trace_id = Uuid::new_v4().simple().to_string();
    let mut spans = Vec::new();

    for node in root.iter() {
        spans.push(deployment_span(node, &trace_id, tz));
        for resource in &node.resources {
            spans.push(resource_span(resource, node.uid, &trace_id, tz));
        }
    }

    TraceDocument {
        data: vec![Trace {
            trace_id,
            spans,
            processes: processes(),
        }],
    }
}

fn deployment_span<Tz>(node: &DeploymentNode, trace_id: &str, tz: &Tz) -> TraceSpan
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut tags = vec![
        Tag::bool("error", node.is_failed()),
        Tag::string("correlation-id", node.correlation_id.as_str()),
    ];
    tags.extend(time_tags(&node.window, tz));
    tags.push(Tag::string(
        "url",
        format!("{}{}", PORTAL_DEPLOYMENT_URL, urlencoding::encode(&node.id)),
    ));

    let process = if node.timing_from_parent {
        TEMPLATE_PROCESS
    } else {
        OVERARCHING_PROCESS
    };

    TraceSpan {
        trace_id: trace_id.to_string(),
        span_id: node.uid,
        operation_name: node.name.clone(),
        references: node
            .parent_uid
            .map(|parent| vec![child_of(trace_id, parent)])
            .unwrap_or_default(),
        start_time: micros(node.window.start()),
        duration: node.window.duration().num_milliseconds() * 1000,
        process_id: process.to_string(),
        tags,
        status: Some(node.status_code.clone()),
    }
}

fn resource_span<Tz>(resource: &ResourceSpan, owner: SpanUid, trace_id: &str, tz: &Tz) -> TraceSpan
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut tags = vec![Tag::bool("error", resource.is_failed())];
    tags.extend(time_tags(&resource.window, tz));
    if resource.is_failed() {
        tags.push(Tag::string("statusCode", resource.status_code.as_str()));
        tags.push(Tag::string("statusMessage", resource.status_message.as_str()));
    }

    TraceSpan {
        trace_id: trace_id.to_string(),
        span_id: owner,
        operation_name: ResourceId::new(&resource.id).operation_name(),
        references: vec![child_of(trace_id, owner)],
        start_time: micros(resource.window.start()),
        duration: resource.window.duration().num_milliseconds() * 1000,
        process_id: RESOURCE_PROCESS.to_string(),
        tags,
        status: None,
    }
}

fn child_of(trace_id: &str, span_id: SpanUid) -> Reference {
    Reference {
        ref_type: "CHILD_OF".to_string(),
        trace_id: trace_id.to_string(),
        span_id,
    }
}

fn time_tags<Tz>(window: &TimeWindow, tz: &Tz) -> [Tag; 2]
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    [
        Tag::string("start-time", local_time(window.start(), tz)),
        Tag::string("end-time", local_time(window.end(), tz)),
    ]
}

fn local_time<Tz>(at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format(LOCAL_TIME_FORMAT).to_string()
}

fn micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis() * 1000
}

fn processes() -> BTreeMap<String, Process> {
    [
        (TEMPLATE_PROCESS, "template"),
        (OVERARCHING_PROCESS, "overarching"),
        (RESOURCE_PROCESS, "resource"),
    ]
    .into_iter()
    .map(|(id, service)| {
        (
            id.to_string(),
            Process {
                service_name: service.to_string(),
                tags: Vec::new(),
            },
        )
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use deploytrace_types::ProvisioningOperation;

    fn at(minute: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::minutes(minute)
    }

    fn resource(id: &str, state: &str) -> ResourceSpan {
        ResourceSpan {
            id: id.to_string(),
            name: ResourceId::new(id).last_segment().unwrap_or(id).to_string(),
            operation_id: "op".to_string(),
            window: TimeWindow::ending_at(at(2), Duration::minutes(1)),
            provisioning_state: state.to_string(),
            provisioning_operation: ProvisioningOperation::Create,
            status_code: if state == "Failed" { "Conflict".into() } else { "OK".into() },
            status_message: if state == "Failed" { "quota exceeded".into() } else { String::new() },
        }
    }

    fn node(name: &str, parent_uid: Option<SpanUid>, status: &str) -> DeploymentNode {
        DeploymentNode {
            id: format!(
                "/subscriptions/s1/resourceGroups/rg/providers/Microsoft.Resources/deployments/{}",
                name
            ),
            uid: SpanUid::generate(),
            parent_uid,
            name: name.to_string(),
            resource_group: Some("rg".to_string()),
            correlation_id: "corr-1".to_string(),
            window: TimeWindow::ending_at(at(10), Duration::minutes(10)),
            timing_from_parent: false,
            status_code: status.to_string(),
            status_message: String::new(),
            resources: Vec::new(),
            child_deployments: Vec::new(),
        }
    }

    #[test]
    fn test_deployment_span_fields() {
        let root = node("main", None, "Succeeded");
        let doc = export_trace_in(&root, &FixedOffset::east_opt(2 * 3600).unwrap());
        let span = doc.spans().next().unwrap();

        assert_eq!(span.operation_name, "main");
        assert!(span.references.is_empty());
        assert_eq!(span.start_time, at(0).timestamp_millis() * 1000);
        assert_eq!(span.duration, 600_000_000);
        assert_eq!(span.process_id, "prt");
        assert_eq!(span.tag("error"), Some(&Value::Bool(false)));
        assert_eq!(span.tag("start-time"), Some(&Value::from("14:00:00.000+02:00")));
        assert_eq!(span.tag("end-time"), Some(&Value::from("14:10:00.000+02:00")));
        assert_eq!(
            span.tag("url"),
            Some(&Value::from(
                "https://portal.azure.com/#blade/HubsExtension/DeploymentDetailsBlade/overview/id/\
                 %2Fsubscriptions%2Fs1%2FresourceGroups%2Frg%2Fproviders%2FMicrosoft.Resources%2Fdeployments%2Fmain"
            ))
        );
        assert_eq!(span.status.as_deref(), Some("Succeeded"));
    }

    #[test]
    fn test_template_process_for_inherited_timing() {
        let mut root = node("main", None, "Succeeded");
        let mut child = node("child", Some(root.uid), "Failed");
        child.timing_from_parent = true;
        root.child_deployments.push(child);

        let doc = export_trace_in(&root, &Utc);
        let child = doc.spans().nth(1).unwrap();

        assert_eq!(child.process_id, "tmp");
        assert_eq!(child.tag("error"), Some(&Value::Bool(true)));
        assert_eq!(child.references[0].span_id, root.uid);
        assert_eq!(child.references[0].ref_type, "CHILD_OF");
    }

    #[test]
    fn test_resource_spans_share_owner_span_id() {
        let mut root = node("main", None, "Succeeded");
        root.resources.push(resource(
            "/subscriptions/s1/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/sa1",
            "Succeeded",
        ));
        root.resources.push(resource(
            "/subscriptions/s1/resourceGroups/rg/providers/Microsoft.Web/sites/app",
            "Failed",
        ));

        let doc = export_trace_in(&root, &Utc);
        let spans: Vec<_> = doc.spans().collect();

        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].span_id, root.uid);
        assert_eq!(spans[2].span_id, root.uid);
        assert_eq!(spans[1].process_id, "rsc");
        assert_eq!(spans[1].operation_name, "Microsoft.Storage/storageAccounts/sa1");
        assert!(spans[1].tag("statusCode").is_none());
        assert_eq!(spans[2].tag("statusCode"), Some(&Value::from("Conflict")));
        assert_eq!(spans[2].tag("statusMessage"), Some(&Value::from("quota exceeded")));
        assert!(spans[1].status.is_none());
    }

    #[test]
    fn test_document_shape() {
        let root = node("main", None, "Succeeded");
        let doc = export_trace_in(&root, &Utc);
        let json = serde_json::to_value(&doc).unwrap();

        let trace = &json["data"][0];
        assert_eq!(trace["traceID"].as_str().unwrap().len(), 32);
        assert_eq!(trace["spans"][0]["spanID"], Value::from(root.uid.to_string()));
        assert_eq!(trace["spans"][0]["traceID"], trace["traceID"]);
        assert_eq!(trace["processes"]["tmp"]["serviceName"], "template");
        assert_eq!(trace["processes"]["prt"]["serviceName"], "overarching");
        assert_eq!(trace["processes"]["rsc"]["serviceName"], "resource");
        assert_eq!(trace["spans"][0]["tags"][0]["type"], "bool");
    }
}
