use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::info;

use crate::AppState;
use crate::clients::fetcher::{fetch, fetch_detail, namespace_options};
use crate::filter::{filter_rows, paginate};
use crate::models::kind::{ALL_NAMESPACES, NamespaceScope};
use crate::models::views::{DetailOutcome, FetchOutcome, ResourceDetail, StatusMessage};
use crate::nav::{MenuGroup, NavAction, NavQuery, NavState, ResourceView, apply};

// --- Template Structs ---

#[derive(Debug, Clone)]
struct SidebarItem {
    title: &'static str,
    href: String,
    active: bool,
}

#[derive(Debug, Clone)]
struct SidebarGroup {
    title: &'static str,
    toggle_href: String,
    open: bool,
    items: Vec<SidebarItem>,
}

#[derive(Debug, Clone)]
struct NamespaceOption {
    value: String,
    label: String,
    selected: bool,
}

#[derive(Debug, Clone)]
struct TableRow {
    cells: Vec<String>,
    href: String,
    selected: bool,
    status_class: &'static str,
}

#[derive(Debug, Clone, Default)]
struct Pager {
    label: String,
    prev_href: Option<String>,
    next_href: Option<String>,
}

#[derive(Template)]
#[template(path = "explorer.html")]
struct ExplorerTemplate {
    title: String,
    brand: String,
    sidebar: Vec<SidebarGroup>,
    namespaces: Vec<NamespaceOption>,
    search: String,
    search_placeholder: String,
    hidden: Vec<(&'static str, String)>,
    connect_href: String,
    refresh_href: String,
    status: String,
    status_class: &'static str,
    available: bool,
    columns: Vec<&'static str>,
    rows: Vec<TableRow>,
    pager: Pager,
    detail: Option<ResourceDetail>,
    detail_error: Option<String>,
    detail_hint: String,
}

fn render_template(tmpl: &impl Template) -> Response {
    match tmpl.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("template error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

// --- Navigation actions ---

pub async fn handle_connect(Query(query): Query<NavQuery>) -> Redirect {
    let state = NavState::from(query);
    info!(view = state.view.slug(), ns = %state.namespace, "connect requested");
    Redirect::to(&apply(&state, NavAction::Connect).href())
}

pub async fn handle_refresh(Query(query): Query<NavQuery>) -> Redirect {
    let state = NavState::from(query);
    Redirect::to(&apply(&state, NavAction::Refresh).href())
}

// --- Explorer ---

pub async fn handle_explorer(
    State(state): State<AppState>,
    Query(query): Query<NavQuery>,
) -> Response {
    let mut nav = NavState::from(query);
    let kind = nav.view.kind();

    let outcome = match kind {
        Some(kind) if nav.connected => fetch(&state.client, kind, &nav.namespace).await,
        None if nav.connected => FetchOutcome {
            rows: Vec::new(),
            status: StatusMessage::Connected,
        },
        _ => FetchOutcome::disconnected(),
    };
    let rows = filter_rows(outcome.rows, Some(&nav.search));

    // A selection only stands while its row survives the current filter.
    let selection = nav.selection().and_then(|(ns, name)| {
        rows.iter()
            .find(|r| r.namespace == ns && r.name == name)
            .map(|r| (r.namespace.clone(), r.name.clone()))
    });
    if selection.is_none() {
        nav.selected = None;
    }

    let (detail, detail_error) = match (kind, selection) {
        (Some(kind), Some((ns, name))) => {
            match fetch_detail(&state.client, kind, &name, &ns).await {
                DetailOutcome::Detail(d) => (Some(*d), None),
                DetailOutcome::Error(e) => (None, Some(e)),
            }
        }
        _ => (None, None),
    };

    let page = paginate(&rows, nav.page, state.config.page_size);
    let table_rows = page
        .rows
        .iter()
        .map(|r| TableRow {
            cells: r.cells(),
            href: apply(
                &nav,
                NavAction::SelectRow {
                    namespace: r.namespace.clone(),
                    name: r.name.clone(),
                },
            )
            .href(),
            selected: nav.selected.as_deref() == Some(r.key().as_str()),
            status_class: r.status_class(),
        })
        .collect();

    let pager = Pager {
        label: format!(
            "Page {} of {} ({} {})",
            page.index + 1,
            page.count,
            rows.len(),
            if rows.len() == 1 { "item" } else { "items" }
        ),
        prev_href: page
            .has_prev()
            .then(|| apply(&nav, NavAction::Page(page.index - 1)).href()),
        next_href: page
            .has_next()
            .then(|| apply(&nav, NavAction::Page(page.index + 1)).href()),
    };

    let namespaces = if nav.connected {
        namespace_options(&state.client, &state.config.namespaces).await
    } else {
        state.config.namespaces.clone()
    };

    let view = nav.view;
    let tmpl = ExplorerTemplate {
        title: view.title().to_string(),
        brand: state.config.title.clone(),
        sidebar: build_sidebar(&nav),
        namespaces: build_namespace_options(namespaces, &nav.namespace),
        search: nav.search.clone(),
        search_placeholder: format!("Search {}...", view.title()),
        hidden: hidden_fields(&nav),
        connect_href: format!("/ui/connect?{}", nav.to_query()),
        refresh_href: format!("/ui/refresh?{}", nav.to_query()),
        status: outcome.status.to_string(),
        status_class: outcome.status.css_class(),
        available: kind.is_some(),
        columns: kind.map(|k| k.columns().to_vec()).unwrap_or_default(),
        rows: table_rows,
        pager,
        detail,
        detail_error,
        detail_hint: format!(
            "Select a {} to see its details",
            kind.map(|k| k.singular().to_lowercase())
                .unwrap_or_else(|| "resource".to_string())
        ),
    };

    render_template(&tmpl)
}

// --- View Builders ---

fn build_sidebar(nav: &NavState) -> Vec<SidebarGroup> {
    MenuGroup::ALL
        .into_iter()
        .map(|group| SidebarGroup {
            title: group.title(),
            toggle_href: apply(nav, NavAction::ToggleMenu(group)).href(),
            open: nav.menus.is_open(group),
            items: ResourceView::in_group(group)
                .map(|view| SidebarItem {
                    title: view.title(),
                    href: apply(nav, NavAction::SelectView(view)).href(),
                    active: view == nav.view,
                })
                .collect(),
        })
        .collect()
}

fn build_namespace_options(
    mut names: Vec<String>,
    current: &NamespaceScope,
) -> Vec<NamespaceOption> {
    if let NamespaceScope::Named(ns) = current
        && !names.iter().any(|n| n == ns)
    {
        names.push(ns.clone());
        names.sort();
    }

    let mut options = vec![NamespaceOption {
        value: ALL_NAMESPACES.to_string(),
        label: "All namespaces".to_string(),
        selected: *current == NamespaceScope::All,
    }];
    options.extend(names.into_iter().map(|name| NamespaceOption {
        selected: current.param() == name && *current != NamespaceScope::All,
        label: name.clone(),
        value: name,
    }));
    options
}

/// State the namespace/search form must carry over; page and selection reset.
/// Submitting the form is a namespace selection, so it always fetches.
fn hidden_fields(nav: &NavState) -> Vec<(&'static str, String)> {
    let submitted = apply(nav, NavAction::SelectNamespace(nav.namespace.clone()));
    let mut fields = vec![("view", submitted.view.slug().to_string())];
    let open = submitted.menus.to_param();
    if !open.is_empty() {
        fields.push(("open", open));
    }
    if submitted.connected {
        fields.push(("connected", "true".to_string()));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::MenuFlags;

    #[test]
    fn namespace_options_keep_current_selection() {
        let opts = build_namespace_options(
            vec!["default".to_string(), "kube-system".to_string()],
            &NamespaceScope::Named("deluge".to_string()),
        );
        let values: Vec<&str> = opts.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["all", "default", "deluge", "kube-system"]);
        assert!(opts.iter().find(|o| o.value == "deluge").unwrap().selected);
        assert!(!opts[0].selected);

        let all = build_namespace_options(vec!["default".to_string()], &NamespaceScope::All);
        assert!(all[0].selected);
        assert!(!all[1].selected);
    }

    #[test]
    fn sidebar_links_apply_actions() {
        let nav = NavState {
            menus: MenuFlags::default().opened(MenuGroup::Workloads),
            ..Default::default()
        };
        let sidebar = build_sidebar(&nav);
        assert_eq!(sidebar.len(), 4);

        let workloads = &sidebar[0];
        assert!(workloads.open);
        assert!(workloads.items.iter().any(|i| i.title == "Pods" && i.active));
        // toggling an open group closes it
        assert!(!workloads.toggle_href.contains("open="));

        let deployments = workloads
            .items
            .iter()
            .find(|i| i.title == "Deployments")
            .unwrap();
        assert!(deployments.href.contains("view=deployments"));
    }

    #[test]
    fn hidden_fields_carry_view_state() {
        let nav = NavState {
            view: ResourceView::DaemonSets,
            page: 4,
            ..Default::default()
        };
        let fields = hidden_fields(&nav);
        assert!(fields.contains(&("view", "daemonsets".to_string())));
        assert!(fields.contains(&("connected", "true".to_string())));
        assert!(!fields.iter().any(|(k, _)| *k == "page"));
    }
}
