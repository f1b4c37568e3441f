use std::path::PathBuf;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while talking to the cluster.
#[derive(Debug, Error)]
pub enum DiagnoseError {
    /// Kubeconfig could not be read or the context could not be loaded
    #[error("building config from kube config located at {path}")]
    ConfigResolution {
        path: String,
        #[source]
        source: BoxError,
    },

    /// Listing or getting pods/events failed
    #[error("{context}")]
    List {
        context: String,
        #[source]
        source: kube::Error,
    },

    /// Streaming a container's logs failed. Rendered inline in reports, so
    /// the cause is part of the message.
    #[error("streaming log results: {cause}")]
    LogFetch {
        pod: String,
        container: String,
        cause: kube::Error,
    },
}

impl DiagnoseError {
    pub fn config<E>(path: Option<&PathBuf>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigResolution {
            path: path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<in-cluster>".to_string()),
            source: Box::new(source),
        }
    }

    pub fn list(context: impl Into<String>, source: kube::Error) -> Self {
        Self::List {
            context: context.into(),
            source,
        }
    }
}

pub type DiagnoseResult<T> = std::result::Result<T, DiagnoseError>;
