use axum::http::Uri;
use axum::http::uri::InvalidUri;
use kube::config::{InferConfigError, KubeConfigOptions, Kubeconfig, KubeconfigError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("page_size must be at least 1")]
    PageSize,
    #[error("invalid api_server {url:?}: {source}")]
    ApiServer {
        url: String,
        #[source]
        source: InvalidUri,
    },
    #[error("loading kubeconfig: {0}")]
    Kubeconfig(#[from] KubeconfigError),
    #[error("inferring cluster configuration: {0}")]
    Infer(#[from] InferConfigError),
    #[error("building cluster client: {0}")]
    Client(#[from] kube::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_namespaces")]
    pub namespaces: Vec<String>,
    #[serde(default)]
    pub cluster: ClusterConfig,
}

/// How to reach the API server. With nothing set, the usual kubeconfig
/// lookup applies (`$KUBECONFIG`, `~/.kube/config`, then in-cluster).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,
    #[serde(default)]
    pub context: Option<String>,
    /// Bypasses kubeconfig entirely, e.g. `http://127.0.0.1:8001` for `kubectl proxy`.
    #[serde(default)]
    pub api_server: Option<String>,
    /// Bearer token file, only used together with `api_server`.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_title() -> String {
    "Kubernetes Explorer".to_string()
}

fn default_listen_port() -> u16 {
    8050
}

fn default_page_size() -> usize {
    15
}

fn default_namespaces() -> Vec<String> {
    vec!["default".to_string(), "kube-system".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: default_title(),
            listen_port: default_listen_port(),
            page_size: default_page_size(),
            namespaces: default_namespaces(),
            cluster: ClusterConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Config = serde_yaml::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if cfg.page_size == 0 {
            return Err(ConfigError::PageSize);
        }

        Ok(cfg)
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.listen_port)
    }
}

impl ClusterConfig {
    pub async fn kube_config(&self) -> Result<kube::Config, ConfigError> {
        let mut config = if let Some(ref url) = self.api_server {
            let uri: Uri = url.parse().map_err(|source| ConfigError::ApiServer {
                url: url.clone(),
                source,
            })?;
            let mut config = kube::Config::new(uri);
            config.auth_info.token_file = self
                .token_file
                .as_ref()
                .map(|p| p.display().to_string());
            config
        } else if let Some(ref path) = self.kubeconfig {
            let kubeconfig = Kubeconfig::read_from(path)?;
            kube::Config::from_custom_kubeconfig(kubeconfig, &self.kubeconfig_options()).await?
        } else if self.context.is_some() {
            kube::Config::from_kubeconfig(&self.kubeconfig_options()).await?
        } else {
            kube::Config::infer().await?
        };

        if self.insecure_skip_tls_verify {
            config.accept_invalid_certs = true;
        }
        config.read_timeout = Some(Duration::from_secs(
            self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        ));
        Ok(config)
    }

    fn kubeconfig_options(&self) -> KubeConfigOptions {
        KubeConfigOptions {
            context: self.context.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KUBECONFIG: &str = "\
apiVersion: v1
kind: Config
current-context: prod
clusters:
- name: prod
  cluster:
    server: https://10.0.0.5:6443
- name: staging
  cluster:
    server: https://10.9.8.7:6443
contexts:
- name: prod
  context:
    cluster: prod
    user: admin
- name: staging
  context:
    cluster: staging
    user: admin
    namespace: apps
users:
- name: admin
  user:
    token: abc123
";

    fn kubeconfig_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(KUBECONFIG.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_applies_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listen_port: 9000").unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.listen_port, 9000);
        assert_eq!(cfg.page_size, 15);
        assert_eq!(cfg.title, "Kubernetes Explorer");
        assert_eq!(cfg.namespaces, vec!["default", "kube-system"]);
        assert_eq!(cfg.listen_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn load_reports_bad_yaml_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listen_port: [").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));

        let missing = Path::new("/nonexistent/kube-explorer.yaml");
        let err = Config::load(missing).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/kube-explorer.yaml"));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_size: 0").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::PageSize)));
    }

    #[tokio::test]
    async fn explicit_api_server_wins() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token");
        std::fs::write(&token_path, "secret-token\n").unwrap();

        let cluster = ClusterConfig {
            api_server: Some("http://127.0.0.1:8001".to_string()),
            token_file: Some(token_path.clone()),
            kubeconfig: Some(PathBuf::from("/nonexistent/kubeconfig")),
            timeout_secs: Some(3),
            ..Default::default()
        };
        let config = cluster.kube_config().await.unwrap();
        assert_eq!(config.cluster_url.host(), Some("127.0.0.1"));
        assert_eq!(config.cluster_url.port_u16(), Some(8001));
        assert_eq!(
            config.auth_info.token_file,
            Some(token_path.display().to_string())
        );
        assert_eq!(config.read_timeout, Some(Duration::from_secs(3)));
        assert!(!config.accept_invalid_certs);
    }

    #[tokio::test]
    async fn kubeconfig_current_context_is_used() {
        let file = kubeconfig_file();
        let cluster = ClusterConfig {
            kubeconfig: Some(file.path().to_path_buf()),
            insecure_skip_tls_verify: true,
            ..Default::default()
        };
        let config = cluster.kube_config().await.unwrap();
        assert_eq!(config.cluster_url.host(), Some("10.0.0.5"));
        assert_eq!(config.default_namespace, "default");
        assert!(config.accept_invalid_certs);
        assert_eq!(
            config.read_timeout,
            Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        );
    }

    #[tokio::test]
    async fn kubeconfig_context_can_be_chosen() {
        let file = kubeconfig_file();
        let cluster = ClusterConfig {
            kubeconfig: Some(file.path().to_path_buf()),
            context: Some("staging".to_string()),
            ..Default::default()
        };
        let config = cluster.kube_config().await.unwrap();
        assert_eq!(config.cluster_url.host(), Some("10.9.8.7"));
        assert_eq!(config.cluster_url.port_u16(), Some(6443));
        assert_eq!(config.default_namespace, "apps");
    }

    #[tokio::test]
    async fn bad_cluster_settings_are_reported() {
        let bad_url = ClusterConfig {
            api_server: Some("http://bad host".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            bad_url.kube_config().await,
            Err(ConfigError::ApiServer { .. })
        ));

        let missing = ClusterConfig {
            kubeconfig: Some(PathBuf::from("/nonexistent/kubeconfig")),
            ..Default::default()
        };
        assert!(matches!(
            missing.kube_config().await,
            Err(ConfigError::Kubeconfig(_))
        ));

        let file = kubeconfig_file();
        let unknown_context = ClusterConfig {
            kubeconfig: Some(file.path().to_path_buf()),
            context: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(unknown_context.kube_config().await.is_err());
    }
}
