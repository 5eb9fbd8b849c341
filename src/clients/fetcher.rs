use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::helpers::{
    coarse_age, controlled_by, elapsed_age, format_created, label_summary, number_or_na, or_na,
    to_utc,
};
use crate::models::kind::{NamespaceScope, ResourceKind};
use crate::models::views::{
    ConditionView, DetailField, DetailOutcome, FetchOutcome, ResourceDetail, ResourceRow,
    RowMetrics, StatusMessage, phase_class,
};

use super::{ClusterClient, FetchError};

/// Lists one kind in one namespace scope and projects it into rows.
/// Errors never leave this function; they become the outcome's status.
pub async fn fetch(
    client: &ClusterClient,
    kind: ResourceKind,
    scope: &NamespaceScope,
) -> FetchOutcome {
    let now = Utc::now();
    let result: Result<Vec<ResourceRow>, FetchError> = match kind {
        ResourceKind::Pods => client
            .list::<Pod>(scope)
            .await
            .map(|items| items.iter().map(|p| pod_row(p, now)).collect()),
        ResourceKind::Deployments => client
            .list::<Deployment>(scope)
            .await
            .map(|items| items.iter().map(|d| deployment_row(d, now)).collect()),
        ResourceKind::DaemonSets => client
            .list::<DaemonSet>(scope)
            .await
            .map(|items| items.iter().map(|d| daemonset_row(d, now)).collect()),
    };

    match result {
        Ok(rows) => {
            debug!(%kind, %scope, count = rows.len(), "fetched rows");
            FetchOutcome {
                rows,
                status: StatusMessage::Connected,
            }
        }
        Err(e) => {
            warn!(%kind, %scope, "fetch failed: {}", e);
            FetchOutcome::failed(e.to_string())
        }
    }
}

/// Reads a single object and builds its detail view, or an error view.
pub async fn fetch_detail(
    client: &ClusterClient,
    kind: ResourceKind,
    name: &str,
    namespace: &str,
) -> DetailOutcome {
    let now = Utc::now();
    let result = match kind {
        ResourceKind::Pods => client
            .get::<Pod>(namespace, name)
            .await
            .map(|p| pod_detail(&p, now)),
        ResourceKind::Deployments => client
            .get::<Deployment>(namespace, name)
            .await
            .map(|d| deployment_detail(&d, now)),
        ResourceKind::DaemonSets => client
            .get::<DaemonSet>(namespace, name)
            .await
            .map(|d| daemonset_detail(&d, now)),
    };

    match result {
        Ok(detail) => DetailOutcome::Detail(Box::new(detail)),
        Err(e) => {
            warn!(%kind, namespace, object = name, "detail fetch failed: {}", e);
            DetailOutcome::Error(format!(
                "Could not load {} details: {}",
                kind.singular().to_lowercase(),
                e
            ))
        }
    }
}

/// Namespace selector options; falls back to the configured list when the
/// cluster cannot be asked.
pub async fn namespace_options(client: &ClusterClient, fallback: &[String]) -> Vec<String> {
    match client.list_namespaces().await {
        Ok(names) => names,
        Err(e) => {
            debug!("namespace list unavailable, using configured list: {}", e);
            fallback.to_vec()
        }
    }
}

// --- Row projections ---

fn base_row<K: Resource>(object: &K, metrics: RowMetrics, now: DateTime<Utc>) -> ResourceRow {
    ResourceRow {
        name: object.name_any(),
        namespace: object.namespace().unwrap_or_default(),
        age: coarse_age(to_utc(object.meta().creation_timestamp.as_ref()), now),
        controlled_by: controlled_by(object.owner_references()),
        metrics,
    }
}

pub fn pod_row(pod: &Pod, now: DateTime<Utc>) -> ResourceRow {
    let statuses = pod
        .status
        .as_ref()
        .and_then(|s| s.container_statuses.as_deref())
        .unwrap_or_default();
    let ready = statuses.iter().filter(|cs| cs.ready).count();
    let restarts = statuses.iter().map(|cs| i64::from(cs.restart_count)).sum();
    let containers = pod.spec.as_ref().map_or(0, |s| s.containers.len());

    let metrics = RowMetrics::Pod {
        containers: format!("{}/{}", ready, containers),
        restarts,
        node: or_na(pod.spec.as_ref().and_then(|s| s.node_name.as_deref())),
        qos: or_na(pod.status.as_ref().and_then(|s| s.qos_class.as_deref())),
        status: pod_phase(pod),
    };
    base_row(pod, metrics, now)
}

pub fn deployment_row(deployment: &Deployment, now: DateTime<Utc>) -> ResourceRow {
    let spec = deployment.spec.as_ref();
    let status = deployment.status.clone().unwrap_or_default();

    let metrics = RowMetrics::Workload {
        replicas: format!(
            "{}/{}",
            status.ready_replicas.unwrap_or(0),
            spec.and_then(|s| s.replicas).unwrap_or(1)
        ),
        up_to_date: status.updated_replicas.unwrap_or(0),
        available: status.available_replicas.unwrap_or(0),
        strategy: or_na(
            spec.and_then(|s| s.strategy.as_ref())
                .and_then(|s| s.type_.as_deref()),
        ),
        labels: label_summary(deployment.metadata.labels.as_ref()),
    };
    base_row(deployment, metrics, now)
}

pub fn daemonset_row(daemonset: &DaemonSet, now: DateTime<Utc>) -> ResourceRow {
    let status = daemonset.status.clone().unwrap_or_default();

    let metrics = RowMetrics::Workload {
        replicas: format!("{}/{}", status.number_ready, status.desired_number_scheduled),
        up_to_date: status.updated_number_scheduled.unwrap_or(0),
        available: status.number_available.unwrap_or(0),
        strategy: or_na(
            daemonset
                .spec
                .as_ref()
                .and_then(|s| s.update_strategy.as_ref())
                .and_then(|s| s.type_.as_deref()),
        ),
        labels: label_summary(daemonset.metadata.labels.as_ref()),
    };
    base_row(daemonset, metrics, now)
}

fn pod_phase(pod: &Pod) -> String {
    pod.status
        .as_ref()
        .and_then(|s| s.phase.clone())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

// --- Detail builders ---

fn base_detail<K: Resource>(
    kind: ResourceKind,
    object: &K,
    conditions: Vec<ConditionView>,
    now: DateTime<Utc>,
) -> ResourceDetail {
    let created = to_utc(object.meta().creation_timestamp.as_ref());
    ResourceDetail {
        kind,
        name: object.name_any(),
        namespace: object.namespace().unwrap_or_default(),
        created: format_created(created),
        age: elapsed_age(created, now),
        labels: object.labels().clone(),
        annotations: object.annotations().clone(),
        controlled_by: controlled_by(object.owner_references()),
        conditions,
        selector: None,
        fields: Vec::new(),
    }
}

pub fn pod_detail(pod: &Pod, now: DateTime<Utc>) -> ResourceDetail {
    let spec = pod.spec.as_ref();
    let status = pod.status.as_ref();
    let conditions = status
        .and_then(|s| s.conditions.as_ref())
        .map(|list| {
            list.iter()
                .map(|c| ConditionView::new(&c.type_, &c.status))
                .collect()
        })
        .unwrap_or_default();
    let mut detail = base_detail(ResourceKind::Pods, pod, conditions, now);

    let phase = pod_phase(pod);
    detail.fields = vec![
        DetailField {
            label: "Status",
            class: phase_class(&phase),
            value: phase,
        },
        DetailField::new("Node", or_na(spec.and_then(|s| s.node_name.as_deref()))),
        DetailField::new("Pod IP", or_na(status.and_then(|s| s.pod_ip.as_deref()))),
        DetailField::new(
            "Service Account",
            or_na(spec.and_then(|s| s.service_account_name.as_deref())),
        ),
        DetailField::new(
            "Priority Class",
            or_na(spec.and_then(|s| s.priority_class_name.as_deref())),
        ),
        DetailField::new(
            "QoS Class",
            or_na(status.and_then(|s| s.qos_class.as_deref())),
        ),
    ];
    detail
}

pub fn deployment_detail(deployment: &Deployment, now: DateTime<Utc>) -> ResourceDetail {
    let spec = deployment.spec.clone().unwrap_or_default();
    let status = deployment.status.clone().unwrap_or_default();
    let conditions = status
        .conditions
        .iter()
        .flatten()
        .map(|c| ConditionView::new(&c.type_, &c.status))
        .collect();
    let mut detail = base_detail(ResourceKind::Deployments, deployment, conditions, now);

    detail.selector = deployment.spec.as_ref().map(|s| selector_map(&s.selector));
    detail.fields = vec![
        DetailField::new(
            "Replicas",
            format!(
                "{}/{}",
                status.ready_replicas.unwrap_or(0),
                spec.replicas.unwrap_or(1)
            ),
        ),
        DetailField::new(
            "Strategy",
            or_na(spec.strategy.as_ref().and_then(|s| s.type_.as_deref())),
        ),
        DetailField::new(
            "Min Ready Seconds",
            spec.min_ready_seconds.unwrap_or(0).to_string(),
        ),
        DetailField::new(
            "Revision History Limit",
            number_or_na(spec.revision_history_limit),
        ),
        DetailField::new(
            "Progress Deadline Seconds",
            number_or_na(spec.progress_deadline_seconds),
        ),
    ];
    detail
}

pub fn daemonset_detail(daemonset: &DaemonSet, now: DateTime<Utc>) -> ResourceDetail {
    let spec = daemonset.spec.as_ref();
    let status = daemonset.status.clone().unwrap_or_default();
    let conditions = status
        .conditions
        .iter()
        .flatten()
        .map(|c| ConditionView::new(&c.type_, &c.status))
        .collect();
    let mut detail = base_detail(ResourceKind::DaemonSets, daemonset, conditions, now);

    detail.selector = spec.map(|s| selector_map(&s.selector));
    detail.fields = vec![
        DetailField::new("Desired", status.desired_number_scheduled.to_string()),
        DetailField::new("Current", status.current_number_scheduled.to_string()),
        DetailField::new("Ready", status.number_ready.to_string()),
        DetailField::new(
            "Up-to-date",
            status.updated_number_scheduled.unwrap_or(0).to_string(),
        ),
        DetailField::new("Available", status.number_available.unwrap_or(0).to_string()),
        DetailField::new("Misscheduled", status.number_misscheduled.to_string()),
        DetailField::new(
            "Update Strategy",
            or_na(
                spec.and_then(|s| s.update_strategy.as_ref())
                    .and_then(|s| s.type_.as_deref()),
            ),
        ),
        DetailField::new(
            "Min Ready Seconds",
            spec.and_then(|s| s.min_ready_seconds)
                .unwrap_or(0)
                .to_string(),
        ),
        DetailField::new(
            "Revision History Limit",
            number_or_na(spec.and_then(|s| s.revision_history_limit)),
        ),
    ];
    detail
}

fn selector_map(selector: &LabelSelector) -> BTreeMap<String, String> {
    selector.match_labels.clone().unwrap_or_default()
}
