use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Sentinel query value for the "All namespaces" selector entry.
pub const ALL_NAMESPACES: &str = "all";

/// Resource kinds the explorer can list and describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Pods,
    Deployments,
    DaemonSets,
}

impl ResourceKind {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.to_ascii_lowercase().as_str() {
            "pods" | "pod" | "po" => Some(Self::Pods),
            "deployments" | "deployment" | "deploy" => Some(Self::Deployments),
            "daemonsets" | "daemonset" | "ds" => Some(Self::DaemonSets),
            _ => None,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Pods => "pods",
            Self::Deployments => "deployments",
            Self::DaemonSets => "daemonsets",
        }
    }

    /// Singular kind name as the API server spells it.
    pub fn singular(self) -> &'static str {
        match self {
            Self::Pods => "Pod",
            Self::Deployments => "Deployment",
            Self::DaemonSets => "DaemonSet",
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Pods => &[
                "Name",
                "Namespace",
                "Containers",
                "Restarts",
                "Controlled By",
                "Node",
                "QoS",
                "Age",
                "Status",
            ],
            Self::Deployments | Self::DaemonSets => &[
                "Name",
                "Namespace",
                "Replicas",
                "Up-to-date",
                "Available",
                "Age",
                "Strategy",
                "Labels",
            ],
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NamespaceScope {
    #[default]
    All,
    Named(String),
}

impl NamespaceScope {
    pub fn from_param(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_NAMESPACES {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }

    pub fn param(&self) -> &str {
        match self {
            Self::All => ALL_NAMESPACES,
            Self::Named(namespace) => namespace,
        }
    }
}

impl Display for NamespaceScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all namespaces"),
            Self::Named(namespace) => write!(f, "{namespace}"),
        }
    }
}
