pub mod fetcher;

use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::core::v1::Namespace;
use kube::api::ListParams;
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use thiserror::Error;

use crate::config::{ClusterConfig, ConfigError};
use crate::models::kind::NamespaceScope;

/// Any failure reading from the cluster API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("listing {resource} in {scope}: {source}")]
    List {
        resource: String,
        scope: String,
        #[source]
        source: kube::Error,
    },
    #[error("reading {resource} {namespace}/{name}: {source}")]
    Get {
        resource: String,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },
    #[error("invalid object reference {namespace:?}/{name:?}")]
    InvalidName { namespace: String, name: String },
}

/// Read-only handle on the Kubernetes API server.
#[derive(Clone)]
pub struct ClusterClient {
    pub base_url: String,
    client: Client,
}

impl ClusterClient {
    pub async fn connect(cluster: &ClusterConfig) -> Result<Self, ConfigError> {
        let config = cluster.kube_config().await?;
        Ok(Self::from_config(config)?)
    }

    pub fn from_config(config: kube::Config) -> Result<Self, kube::Error> {
        let base_url = config.cluster_url.to_string();
        Ok(Self {
            base_url,
            client: Client::try_from(config)?,
        })
    }

    pub async fn list<K>(&self, scope: &NamespaceScope) -> Result<Vec<K>, FetchError>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Debug,
    {
        let api: Api<K> = match scope {
            NamespaceScope::All => Api::all(self.client.clone()),
            NamespaceScope::Named(ns) => Api::namespaced(self.client.clone(), ns),
        };

        api.list(&ListParams::default())
            .await
            .map(|list| list.items)
            .map_err(|source| FetchError::List {
                resource: K::plural(&()).into_owned(),
                scope: scope.to_string(),
                source,
            })
    }

    pub async fn get<K>(&self, namespace: &str, name: &str) -> Result<K, FetchError>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Debug,
    {
        if !is_path_segment(namespace) || !is_path_segment(name) {
            return Err(FetchError::InvalidName {
                namespace: namespace.to_string(),
                name: name.to_string(),
            });
        }

        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        api.get(name).await.map_err(|source| FetchError::Get {
            resource: K::plural(&()).into_owned(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            source,
        })
    }

    pub async fn list_namespaces(&self) -> Result<Vec<String>, FetchError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|source| FetchError::List {
                resource: "namespaces".to_string(),
                scope: "cluster".to_string(),
                source,
            })?;

        let mut names: Vec<String> = list.items.iter().map(|n| n.name_any()).collect();
        names.sort();
        Ok(names)
    }
}

/// Object names end up in the request path; anything that could leave its
/// segment is refused before a request is made.
fn is_path_segment(value: &str) -> bool {
    !value.is_empty() && !value.contains(['/', '?', '#', '%']) && value != "." && value != ".."
}


#[cfg(test)]
mod tests {
    use super::testing::{client_for, serve};
    use super::*;
    use axum::{Json, Router, routing::get};
    use k8s_openapi::api::core::v1::Pod;
    use serde_json::json;

    #[test]
    fn path_segments_are_checked() {
        assert!(is_path_segment("kube-proxy"));
        assert!(is_path_segment("coredns.v1"));
        assert!(!is_path_segment(""));
        assert!(!is_path_segment(".."));
        assert!(!is_path_segment("a/b"));
        assert!(!is_path_segment("x?watch=1"));
    }

    #[tokio::test]
    async fn invalid_names_never_reach_the_cluster() {
        let client = client_for("http://127.0.0.1:1");
        let err = client.get::<Pod>("default", "../secrets").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidName { .. }));
    }

    #[tokio::test]
    async fn namespaces_are_sorted() {
        let router = Router::new().route(
            "/api/v1/namespaces",
            get(|| async {
                Json(json!({
                    "apiVersion": "v1",
                    "kind": "NamespaceList",
                    "metadata": {},
                    "items": [
                        {"apiVersion": "v1", "kind": "Namespace", "metadata": {"name": "kube-system"}},
                        {"apiVersion": "v1", "kind": "Namespace", "metadata": {"name": "apps"}}
                    ]
                }))
            }),
        );
        let client = serve(router).await;
        assert_eq!(
            client.list_namespaces().await.unwrap(),
            vec!["apps", "kube-system"]
        );
    }
}
