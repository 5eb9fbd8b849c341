use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use super::kind::ResourceKind;

/// Placeholder shown for every absent optional value.
pub const NOT_AVAILABLE: &str = "N/A";

/// One flattened table row, projected from a single object snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceRow {
    pub name: String,
    pub namespace: String,
    pub age: String,
    pub controlled_by: String,
    pub metrics: RowMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RowMetrics {
    Pod {
        containers: String,
        restarts: i64,
        node: String,
        qos: String,
        status: String,
    },
    Workload {
        replicas: String,
        up_to_date: i32,
        available: i32,
        strategy: String,
        labels: String,
    },
}

impl ResourceRow {
    /// Cell values in the order of [`ResourceKind::columns`].
    pub fn cells(&self) -> Vec<String> {
        match &self.metrics {
            RowMetrics::Pod {
                containers,
                restarts,
                node,
                qos,
                status,
            } => vec![
                self.name.clone(),
                self.namespace.clone(),
                containers.clone(),
                restarts.to_string(),
                self.controlled_by.clone(),
                node.clone(),
                qos.clone(),
                self.age.clone(),
                status.clone(),
            ],
            RowMetrics::Workload {
                replicas,
                up_to_date,
                available,
                strategy,
                labels,
            } => vec![
                self.name.clone(),
                self.namespace.clone(),
                replicas.clone(),
                up_to_date.to_string(),
                available.to_string(),
                self.age.clone(),
                strategy.clone(),
                labels.clone(),
            ],
        }
    }

    pub fn status_class(&self) -> &'static str {
        match &self.metrics {
            RowMetrics::Pod { status, .. } => phase_class(status),
            RowMetrics::Workload { .. } => "",
        }
    }

    /// `namespace/name`, the key a row selection is made with.
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

pub fn phase_class(phase: &str) -> &'static str {
    match phase {
        "Running" => "status-running",
        "Pending" => "status-pending",
        "Failed" => "status-failed",
        _ => "",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionView {
    pub condition_type: String,
    pub status: String,
}

impl ConditionView {
    pub fn new(condition_type: &str, status: &str) -> Self {
        Self {
            condition_type: condition_type.to_string(),
            status: status.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
    pub class: &'static str,
}

impl DetailField {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            class: "",
        }
    }
}

/// Per-object view built on row selection. Never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDetail {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
    pub created: String,
    pub age: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub controlled_by: String,
    pub conditions: Vec<ConditionView>,
    pub selector: Option<BTreeMap<String, String>>,
    pub fields: Vec<DetailField>,
}

impl ResourceDetail {
    pub fn title(&self) -> String {
        format!("{}: {}", self.kind.singular(), self.name)
    }

    /// Age and timestamp for the Created row; one placeholder when neither is known.
    pub fn created_summary(&self) -> String {
        let parts: Vec<&str> = [self.age.as_str(), self.created.as_str()]
            .into_iter()
            .filter(|part| *part != NOT_AVAILABLE)
            .collect();
        if parts.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            parts.join(" ")
        }
    }

    pub fn label_entries(&self) -> Vec<String> {
        map_entries(&self.labels)
    }

    pub fn annotation_entries(&self) -> Vec<String> {
        map_entries(&self.annotations)
    }

    pub fn selector_entries(&self) -> Vec<String> {
        self.selector
            .as_ref()
            .map(map_entries)
            .unwrap_or_else(|| vec![NOT_AVAILABLE.to_string()])
    }

    pub fn condition_entries(&self) -> Vec<String> {
        if self.conditions.is_empty() {
            return vec![NOT_AVAILABLE.to_string()];
        }
        self.conditions
            .iter()
            .map(|c| format!("{}: {}", c.condition_type, c.status))
            .collect()
    }
}

fn map_entries(map: &BTreeMap<String, String>) -> Vec<String> {
    if map.is_empty() {
        return vec![NOT_AVAILABLE.to_string()];
    }
    map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect()
}

/// Connection status line shown next to the header controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Disconnected,
    Connected,
    Error(String),
}

impl StatusMessage {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Disconnected => "status-idle",
            Self::Connected => "status-ok",
            Self::Error(_) => "status-error",
        }
    }
}

impl Display for StatusMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Not connected"),
            Self::Connected => write!(f, "Connected"),
            Self::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

/// Output of a list fetch: rows on success, or no rows and the error text.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub rows: Vec<ResourceRow>,
    pub status: StatusMessage,
}

impl FetchOutcome {
    pub fn disconnected() -> Self {
        Self {
            rows: Vec::new(),
            status: StatusMessage::Disconnected,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            status: StatusMessage::Error(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailOutcome {
    Detail(Box<ResourceDetail>),
    Error(String),
}
