use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::clients::fetcher::{fetch, fetch_detail, namespace_options};
use crate::filter::filter_rows;
use crate::models::kind::{NamespaceScope, ResourceKind};
use crate::models::views::ResourceRow;

#[derive(Debug, Default, Deserialize)]
pub struct RowsQuery {
    #[serde(default)]
    pub ns: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RowsResponse {
    pub ok: bool,
    pub status: String,
    pub rows: Vec<ResourceRow>,
}

#[derive(Debug, Serialize)]
pub struct NamespacesResponse {
    pub options: Vec<String>,
}

fn unknown_kind(kind: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        format!("unknown resource kind {:?}", kind),
    )
        .into_response()
}

pub async fn handle_rows(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<RowsQuery>,
) -> Response {
    let Some(resource) = ResourceKind::from_slug(&kind) else {
        return unknown_kind(&kind);
    };
    let scope = NamespaceScope::from_param(query.ns.as_deref().unwrap_or_default());

    let outcome = fetch(&state.client, resource, &scope).await;
    Json(RowsResponse {
        ok: !outcome.status.is_error(),
        status: outcome.status.to_string(),
        rows: filter_rows(outcome.rows, query.q.as_deref()),
    })
    .into_response()
}

pub async fn handle_detail(
    State(state): State<AppState>,
    Path((kind, namespace, name)): Path<(String, String, String)>,
) -> Response {
    let Some(resource) = ResourceKind::from_slug(&kind) else {
        return unknown_kind(&kind);
    };
    Json(fetch_detail(&state.client, resource, &name, &namespace).await).into_response()
}

pub async fn handle_namespaces(State(state): State<AppState>) -> Json<NamespacesResponse> {
    Json(NamespacesResponse {
        options: namespace_options(&state.client, &state.config.namespaces).await,
    })
}

pub async fn handle_healthz() -> &'static str {
    "ok\n"
}
