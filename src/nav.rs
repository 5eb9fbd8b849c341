//! Per-session navigation state.
//!
//! The state lives entirely in the page URL: every link and form on the
//! rendered page targets the state produced by [`apply`]ing its action to
//! the current one, so the server keeps nothing between requests.

use serde::{Deserialize, Deserializer};
use std::fmt::Write;

use crate::models::kind::{ALL_NAMESPACES, NamespaceScope, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuGroup {
    Workloads,
    Config,
    Network,
    Storage,
}

impl MenuGroup {
    pub const ALL: [Self; 4] = [Self::Workloads, Self::Config, Self::Network, Self::Storage];

    pub fn slug(self) -> &'static str {
        match self {
            Self::Workloads => "workloads",
            Self::Config => "config",
            Self::Network => "network",
            Self::Storage => "storage",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Workloads => "Workloads",
            Self::Config => "Config",
            Self::Network => "Network",
            Self::Storage => "Storage",
        }
    }

    fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.slug() == slug)
    }

    fn bit(self) -> u8 {
        match self {
            Self::Workloads => 1,
            Self::Config => 1 << 1,
            Self::Network => 1 << 2,
            Self::Storage => 1 << 3,
        }
    }
}

/// Expanded/collapsed flag per sidebar group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuFlags(u8);

impl MenuFlags {
    pub fn is_open(self, group: MenuGroup) -> bool {
        self.0 & group.bit() != 0
    }

    pub fn toggled(self, group: MenuGroup) -> Self {
        Self(self.0 ^ group.bit())
    }

    pub fn opened(self, group: MenuGroup) -> Self {
        Self(self.0 | group.bit())
    }

    /// Comma list of open group slugs; unknown slugs are ignored.
    pub fn parse(list: &str) -> Self {
        list.split(',')
            .filter_map(|s| MenuGroup::from_slug(s.trim()))
            .fold(Self::default(), |flags, g| flags.opened(g))
    }

    pub fn to_param(self) -> String {
        MenuGroup::ALL
            .into_iter()
            .filter(|g| self.is_open(*g))
            .map(MenuGroup::slug)
            .collect::<Vec<_>>()
            .join(",")
    }
}

macro_rules! views {
    ($( $variant:ident => ($slug:literal, $title:literal, $group:ident) ),+ $(,)?) => {
        /// Every sidebar entry.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum ResourceView {
            #[default]
            Pods,
            $( $variant, )+
        }

        impl ResourceView {
            pub const ALL: &'static [Self] = &[Self::Pods, $( Self::$variant, )+];

            pub fn slug(self) -> &'static str {
                match self {
                    Self::Pods => "pods",
                    $( Self::$variant => $slug, )+
                }
            }

            pub fn title(self) -> &'static str {
                match self {
                    Self::Pods => "Pods",
                    $( Self::$variant => $title, )+
                }
            }

            pub fn group(self) -> MenuGroup {
                match self {
                    Self::Pods => MenuGroup::Workloads,
                    $( Self::$variant => MenuGroup::$group, )+
                }
            }
        }
    };
}

views! {
    Overview => ("overview", "Overview", Workloads),
    Deployments => ("deployments", "Deployments", Workloads),
    DaemonSets => ("daemonsets", "DaemonSets", Workloads),
    StatefulSets => ("statefulsets", "StatefulSets", Workloads),
    ReplicaSets => ("replicasets", "ReplicaSets", Workloads),
    ReplicationControllers => ("replicationcontrollers", "Replication Controllers", Workloads),
    Jobs => ("jobs", "Jobs", Workloads),
    CronJobs => ("cronjobs", "CronJobs", Workloads),
    ConfigMaps => ("configmaps", "ConfigMaps", Config),
    Secrets => ("secrets", "Secrets", Config),
    ResourceQuotas => ("resourcequotas", "Resource Quotas", Config),
    LimitRanges => ("limitranges", "Limit Ranges", Config),
    HorizontalPodAutoscalers => ("hpa", "HPA", Config),
    PodDisruptionBudgets => ("poddisruptionbudgets", "Pod Disruption Budgets", Config),
    PriorityClasses => ("priorityclasses", "Priority Classes", Config),
    RuntimeClasses => ("runtimeclasses", "Runtime Classes", Config),
    Leases => ("leases", "Leases", Config),
    MutatingWebhookConfigs => ("mutatingwebhookconfigs", "Mutating Webhook Configs", Config),
    ValidatingWebhookConfigs => ("validatingwebhookconfigs", "Validating Webhook Configs", Config),
    Services => ("services", "Services", Network),
    Endpoints => ("endpoints", "Endpoints", Network),
    Ingresses => ("ingresses", "Ingresses", Network),
    IngressClasses => ("ingressclasses", "Ingress Classes", Network),
    NetworkPolicies => ("networkpolicies", "Network Policies", Network),
    PortForwarding => ("portforwarding", "Port Forwarding", Network),
    PersistentVolumeClaims => ("persistentvolumeclaims", "Persistent Volume Claims", Storage),
    PersistentVolumes => ("persistentvolumes", "Persistent Volumes", Storage),
    StorageClasses => ("storageclasses", "Storage Classes", Storage),
}

impl ResourceView {
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.slug() == slug)
    }

    /// The kind listed by this view, when a fetcher exists for it.
    pub fn kind(self) -> Option<ResourceKind> {
        match self {
            Self::Pods => Some(ResourceKind::Pods),
            Self::Deployments => Some(ResourceKind::Deployments),
            Self::DaemonSets => Some(ResourceKind::DaemonSets),
            _ => None,
        }
    }

    pub fn in_group(group: MenuGroup) -> impl Iterator<Item = Self> {
        Self::ALL.iter().copied().filter(move |v| v.group() == group)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavState {
    pub view: ResourceView,
    pub namespace: NamespaceScope,
    pub search: String,
    pub menus: MenuFlags,
    pub page: usize,
    /// `namespace/name` of the selected row.
    pub selected: Option<String>,
    pub connected: bool,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            view: ResourceView::Pods,
            namespace: NamespaceScope::All,
            search: String::new(),
            menus: MenuFlags::default(),
            page: 0,
            selected: None,
            connected: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    ToggleMenu(MenuGroup),
    SelectView(ResourceView),
    SelectNamespace(NamespaceScope),
    Search(String),
    Connect,
    Refresh,
    SelectRow { namespace: String, name: String },
    Page(usize),
}

/// Returns the state that follows `action`. Changing what is listed
/// (view, namespace, search term) drops the page and the selection.
/// Picking a namespace, or a view that can be listed, fetches like Connect.
pub fn apply(state: &NavState, action: NavAction) -> NavState {
    let mut next = state.clone();
    match action {
        NavAction::ToggleMenu(group) => {
            next.menus = state.menus.toggled(group);
        }
        NavAction::SelectView(view) => {
            next.view = view;
            next.menus = state.menus.opened(view.group());
            next.page = 0;
            next.selected = None;
            if view.kind().is_some() {
                next.connected = true;
            }
        }
        NavAction::SelectNamespace(scope) => {
            next.namespace = scope;
            next.page = 0;
            next.selected = None;
            next.connected = true;
        }
        NavAction::Search(term) => {
            next.search = term.trim().to_string();
            next.page = 0;
            next.selected = None;
        }
        NavAction::Connect | NavAction::Refresh => {
            next.connected = true;
        }
        NavAction::SelectRow { namespace, name } => {
            next.selected = Some(format!("{}/{}", namespace, name));
        }
        NavAction::Page(page) => {
            next.page = page;
        }
    }
    next
}

impl NavState {
    /// Query string for this state, without the leading `?`.
    pub fn to_query(&self) -> String {
        let mut q = format!(
            "view={}&ns={}",
            self.view.slug(),
            urlencoding::encode(self.namespace.param())
        );
        if !self.search.is_empty() {
            let _ = write!(q, "&q={}", urlencoding::encode(&self.search));
        }
        let open = self.menus.to_param();
        if !open.is_empty() {
            let _ = write!(q, "&open={}", urlencoding::encode(&open));
        }
        if self.page > 0 {
            let _ = write!(q, "&page={}", self.page);
        }
        if let Some(ref selected) = self.selected {
            let _ = write!(q, "&selected={}", urlencoding::encode(selected));
        }
        if self.connected {
            q.push_str("&connected=true");
        }
        q
    }

    pub fn href(&self) -> String {
        format!("/ui/?{}", self.to_query())
    }

    /// Splits the selection back into `(namespace, name)`.
    pub fn selection(&self) -> Option<(&str, &str)> {
        self.selected.as_deref().and_then(|s| s.split_once('/'))
    }
}

/// Raw query parameters as the browser sends them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NavQuery {
    pub view: Option<String>,
    pub ns: Option<String>,
    pub q: Option<String>,
    pub open: Option<String>,
    #[serde(deserialize_with = "lenient_usize")]
    pub page: usize,
    pub selected: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub connected: bool,
}

impl From<NavQuery> for NavState {
    fn from(q: NavQuery) -> Self {
        Self {
            view: q
                .view
                .as_deref()
                .and_then(ResourceView::from_slug)
                .unwrap_or_default(),
            namespace: NamespaceScope::from_param(q.ns.as_deref().unwrap_or(ALL_NAMESPACES)),
            search: q.q.unwrap_or_default().trim().to_string(),
            menus: MenuFlags::parse(q.open.as_deref().unwrap_or_default()),
            page: q.page,
            selected: q.selected.filter(|s| s.contains('/')),
            connected: q.connected,
        }
    }
}

// Hand-edited URLs should fall back to defaults instead of a 400.

fn lenient_usize<'de, D: Deserializer<'de>>(d: D) -> Result<usize, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0))
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(matches!(raw.as_deref(), Some("true" | "1" | "on")))
}
