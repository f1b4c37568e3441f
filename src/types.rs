use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Which pods to target. Names take precedence over the label/field queries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PodSelector {
    pub names: Vec<String>,
    pub label_query: Option<String>,
    pub field_query: Option<String>,
}

/// Which events to list. `namespace` overrides the gateway's namespace when set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventSelector {
    pub label_query: Option<String>,
    pub field_query: Option<String>,
    pub namespace: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ClientConfig {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub namespace: Option<String>,
    pub all_namespaces: bool,
}

/// Point-in-time view of a pod's status.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PodStatusSnapshot {
    pub name: String,
    pub namespace: String,
    pub phase: Option<String>,
    pub phase_reason: Option<String>,
    pub conditions: Vec<PodCondition>,
    pub container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PodCondition {
    pub kind: String,
    pub is_satisfied: bool,
    pub reason: String,
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContainerStatus {
    pub name: String,
    pub is_ready: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Event {
    pub last_seen: Option<DateTime<Utc>>,
    pub kind: String,
    pub reason: String,
    pub message: String,
}

/// Result of looking a pod up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodLookup {
    Found(PodStatusSnapshot),
    NotFound,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HealthVerdict {
    pub is_ready: bool,
    pub failed_conditions: Vec<PodCondition>,
    pub not_ready_containers: Vec<ContainerStatus>,
}

/// Outcome of fetching logs for one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerLogs {
    Lines(Vec<String>),
    Errored(String),
}

/// Diagnostic report for a single pod that is not ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodReport {
    pub display_name: String,
    pub phase_reason: Option<String>,
    pub verdict: HealthVerdict,
    pub events: Vec<Event>,
    /// Ordered as in `verdict.not_ready_containers`.
    pub container_logs: Vec<(String, ContainerLogs)>,
}

/// Events found for one pod by the event lister.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodEvents {
    pub pod: String,
    pub events: Vec<Event>,
}
