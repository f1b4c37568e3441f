// Public modules
pub mod types;
pub mod config;
pub mod error;
pub mod selectors;
pub mod kubernetes;
pub mod health;
pub mod diagnose;
pub mod events;
pub mod report;
pub mod cli;
pub mod testing;

// Re-export commonly used items
pub use types::*;
pub use config::{resolve_config, resolve_kubeconfig_path, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use error::{DiagnoseError, DiagnoseResult};
pub use kubernetes::{ClusterGateway, KubeGateway};
pub use health::{evaluate, display_reason};
pub use diagnose::DiagnosticAssembler;
pub use events::{list_events, list_events_with, target_pod_names};
pub use report::{render_pod_events, render_pod_report, ReportSummary};

/// Log to stderr so it never mixes with the report on stdout.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
