use clap::error::ErrorKind;
use clap::{Args, Parser};
use std::path::PathBuf;

use crate::config::{ClientConfigBuilder, EnvironmentProvider};
use crate::selectors::non_empty;
use crate::types::{ClientConfig, EventSelector, PodSelector};

const LABEL_HELP: &str =
    "Pod Selector (label query) to filter on, supports '=', '==', and '!='.(e.g. -l key1=value1,key2=value2)";
const FIELD_HELP: &str = "Pod Selector (field query) to filter on, supports '=', '==', and '!='.(e.g. --field-selector key1=value1,key2=value2). The server only supports a limited number of field queries per type.";

/// Exit code for a flag parsing outcome: help and version succeed, any
/// usage error fails with 1 like every other failure.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Parse the process arguments, exiting on help, version or a usage error.
pub fn parse_or_exit<P: Parser>() -> P {
    match P::try_parse() {
        Ok(args) => args,
        Err(err) if usage_exit_code(&err) == 0 => err.exit(),
        Err(err) => {
            println!("{}", err);
            std::process::exit(usage_exit_code(&err));
        }
    }
}

/// Flags shared by both tools for reaching the cluster
#[derive(Args, Debug, Clone, Default)]
pub struct ClusterArgs {
    /// The path to a pre-existing kubeconfig file. If not provided, the KUBECONFIG environment
    /// variable will be checked for a file. If that is empty, $HOME/.kube/config will be used.
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// The Kubernetes namespace to use. Defaults to the current namespace in your kube config file.
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// The Kubernetes context to use. Defaults to the current context in your kube config file.
    #[arg(long)]
    pub context: Option<String>,
}

impl ClusterArgs {
    pub fn client_config<E: EnvironmentProvider>(&self, env: &E, all_namespaces: bool) -> ClientConfig {
        ClientConfigBuilder::new(env)
            .kubeconfig(self.kubeconfig.clone())
            .context(self.context.clone())
            .namespace(self.namespace.clone())
            .all_namespaces(all_namespaces)
            .build()
    }
}

/// Pod targeting flags shared by both tools
#[derive(Args, Debug, Clone, Default)]
pub struct PodArgs {
    /// A pod name to target (accepts multiple pod names)
    #[arg(value_name = "POD")]
    pub pods: Vec<String>,

    #[arg(short = 'l', long = "selector", help = LABEL_HELP)]
    pub selector: Option<String>,

    #[arg(long = "field-selector", help = FIELD_HELP)]
    pub field_selector: Option<String>,
}

impl PodArgs {
    pub fn pod_selector(&self) -> PodSelector {
        PodSelector {
            names: self.pods.iter().filter(|p| !p.is_empty()).cloned().collect(),
            label_query: non_empty(self.selector.clone()),
            field_query: non_empty(self.field_selector.clone()),
        }
    }
}

/// View pod events for the given pod selector
#[derive(Parser, Debug)]
#[command(name = "pod-events", version, about = "View pod events for the given pod selector")]
pub struct PodEventsArgs {
    #[command(flatten)]
    pub pods: PodArgs,

    /// Event Selector (label query) to filter on, supports '=', '==', and '!='.
    #[arg(long = "event-selector")]
    pub event_selector: Option<String>,

    /// Event Selector (field query) to filter on, supports '=', '==', and '!='.
    /// The server only supports a limited number of field queries per type.
    #[arg(long = "event-field-selector")]
    pub event_field_selector: Option<String>,

    #[command(flatten)]
    pub cluster: ClusterArgs,
}

impl PodEventsArgs {
    pub fn event_selector(&self) -> EventSelector {
        EventSelector {
            label_query: non_empty(self.event_selector.clone()),
            field_query: non_empty(self.event_field_selector.clone()),
            namespace: None,
        }
    }
}

/// Find pods that are not ready and show debugging information about them
#[derive(Parser, Debug)]
#[command(
    name = "sick-pods",
    version,
    about = "Find Pods that are in a 'NotReady' state and display debugging information about them"
)]
pub struct SickPodsArgs {
    #[command(flatten)]
    pub pods: PodArgs,

    #[command(flatten)]
    pub cluster: ClusterArgs,

    /// List the requested pods across all namespaces. The namespace in the current context is
    /// ignored even if specified with --namespace.
    #[arg(short = 'A', long = "all-namespaces")]
    pub all_namespaces: bool,
}
