use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DiagnoseError, DiagnoseResult};
use crate::selectors::non_empty;
use crate::types::ClientConfig;

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// `$HOME/.kube/config`, if HOME is set.
pub fn config_path_from_home(home: &str) -> Option<PathBuf> {
    if home.is_empty() {
        return None;
    }
    Some(Path::new(home).join(".kube").join("config"))
}

/// Pick the kubeconfig file: explicit flag, then the first entry of
/// KUBECONFIG, then `$HOME/.kube/config` when that file exists.
pub fn resolve_kubeconfig_path<E: EnvironmentProvider>(
    flag: Option<PathBuf>,
    env: &E,
) -> Option<PathBuf> {
    if let Some(path) = flag.filter(|p| !p.as_os_str().is_empty()) {
        return Some(path);
    }

    if let Some(paths) = env.get_var("KUBECONFIG") {
        if let Some(first) = std::env::split_paths(&paths).find(|p| !p.as_os_str().is_empty()) {
            return Some(first);
        }
    }

    env.get_var("HOME")
        .and_then(|home| config_path_from_home(&home))
        .filter(|p| p.exists())
}

/// Collects flag values into a [`ClientConfig`], filling the kubeconfig
/// path from the environment.
pub struct ClientConfigBuilder<'a, E: EnvironmentProvider> {
    env: &'a E,
    kubeconfig: Option<PathBuf>,
    context: Option<String>,
    namespace: Option<String>,
    all_namespaces: bool,
}

impl<'a, E: EnvironmentProvider> ClientConfigBuilder<'a, E> {
    pub fn new(env: &'a E) -> Self {
        Self {
            env,
            kubeconfig: None,
            context: None,
            namespace: None,
            all_namespaces: false,
        }
    }

    pub fn kubeconfig(mut self, path: Option<PathBuf>) -> Self {
        self.kubeconfig = path;
        self
    }

    pub fn context(mut self, context: Option<String>) -> Self {
        self.context = non_empty(context);
        self
    }

    pub fn namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = non_empty(namespace);
        self
    }

    pub fn all_namespaces(mut self, all: bool) -> Self {
        self.all_namespaces = all;
        self
    }

    pub fn build(self) -> ClientConfig {
        ClientConfig {
            kubeconfig: resolve_kubeconfig_path(self.kubeconfig, self.env),
            context: self.context,
            namespace: self.namespace,
            all_namespaces: self.all_namespaces,
        }
    }
}

/// Load the kube client configuration. Without a kubeconfig file this
/// falls back to in-cluster inference.
pub async fn load_kube_config(cfg: &ClientConfig) -> DiagnoseResult<Config> {
    match cfg.kubeconfig.as_ref() {
        Some(path) => {
            debug!("reading kubeconfig from {}", path.display());
            let kubeconfig = Kubeconfig::read_from(path)
                .map_err(|e| DiagnoseError::config(Some(path), e))?;
            let options = KubeConfigOptions {
                context: cfg.context.clone(),
                cluster: None,
                user: None,
            };
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .map_err(|e| DiagnoseError::config(Some(path), e))
        }
        None => {
            debug!("no kubeconfig found, inferring configuration");
            Config::infer().await.map_err(|e| DiagnoseError::config(None, e))
        }
    }
}

/// Namespace precedence: explicit flag, then the context's namespace.
pub fn effective_namespace(cfg: &ClientConfig, kube_config: &Config) -> String {
    cfg.namespace
        .clone()
        .unwrap_or_else(|| kube_config.default_namespace.clone())
}

/// Resolve the effective namespace and build a connected client.
pub async fn resolve_config(cfg: &ClientConfig) -> DiagnoseResult<(String, Client)> {
    let mut kube_config = load_kube_config(cfg).await?;
    let namespace = effective_namespace(cfg, &kube_config);
    kube_config.default_namespace = namespace.clone();

    let client = Client::try_from(kube_config)
        .map_err(|e| DiagnoseError::config(cfg.kubeconfig.as_ref(), e))?;
    debug!("client ready, namespace = {}", namespace);
    Ok((namespace, client))
}
