use async_trait::async_trait;
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{Event as KubeEvent, Pod};
use kube::api::{ListParams, LogParams};
use kube::{Api, Client};
use tracing::debug;

use crate::config::resolve_config;
use crate::error::{DiagnoseError, DiagnoseResult};
use crate::types::{
    ClientConfig, ContainerStatus, Event, EventSelector, PodCondition, PodLookup, PodSelector,
    PodStatusSnapshot,
};

/// The cluster queries the diagnostics need.
#[async_trait]
pub trait ClusterGateway: Send + Sync {
    /// Pods matching the selector. With explicit names each pod is looked up
    /// directly and missing ones are skipped.
    async fn list_pods(&self, selector: &PodSelector) -> DiagnoseResult<Vec<PodStatusSnapshot>>;

    async fn list_events(&self, selector: &EventSelector) -> DiagnoseResult<Vec<Event>>;

    /// Current logs of one container, without following or timestamps.
    async fn get_logs(&self, namespace: &str, pod: &str, container: &str) -> DiagnoseResult<String>;
}

/// Gateway backed by a kube client.
#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
    namespace: String,
    all_namespaces: bool,
}

impl KubeGateway {
    pub fn new(client: Client, namespace: impl Into<String>, all_namespaces: bool) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            all_namespaces,
        }
    }

    pub async fn connect(cfg: &ClientConfig) -> DiagnoseResult<Self> {
        let (namespace, client) = resolve_config(cfg).await?;
        Ok(Self::new(client, namespace, cfg.all_namespaces))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn all_namespaces(&self) -> bool {
        self.all_namespaces
    }

    fn pods_api(&self) -> Api<Pod> {
        if self.all_namespaces {
            Api::all(self.client.clone())
        } else {
            Api::namespaced(self.client.clone(), &self.namespace)
        }
    }

    fn events_api(&self, namespace: Option<&str>) -> Api<KubeEvent> {
        match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None if self.all_namespaces => Api::all(self.client.clone()),
            None => Api::namespaced(self.client.clone(), &self.namespace),
        }
    }

    /// Get a single pod by name from the effective namespace.
    pub async fn lookup_pod(&self, name: &str) -> DiagnoseResult<PodLookup> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), &self.namespace);
        let pod = api
            .get_opt(name)
            .await
            .map_err(|e| DiagnoseError::list(format!("getting pod {}", name), e))?;
        Ok(match pod {
            Some(pod) => PodLookup::Found(snapshot_from_pod(&pod)),
            None => {
                debug!("pod {} not found in {}, skipping", name, self.namespace);
                PodLookup::NotFound
            }
        })
    }
}

#[async_trait]
impl ClusterGateway for KubeGateway {
    async fn list_pods(&self, selector: &PodSelector) -> DiagnoseResult<Vec<PodStatusSnapshot>> {
        if !selector.names.is_empty() {
            let mut lookups = Vec::with_capacity(selector.names.len());
            for name in &selector.names {
                lookups.push(self.lookup_pod(name).await?);
            }
            return Ok(found_pods(lookups));
        }

        let params = list_params(selector.label_query.as_deref(), selector.field_query.as_deref());
        debug!(
            "listing pods label={:?} field={:?}",
            selector.label_query, selector.field_query
        );
        let pods = self.pods_api().list(&params).await.map_err(|e| {
            DiagnoseError::list(
                format!(
                    "listing pods with LabelSelector: {} and FieldSelector: {}",
                    selector.label_query.as_deref().unwrap_or(""),
                    selector.field_query.as_deref().unwrap_or("")
                ),
                e,
            )
        })?;
        Ok(pods.items.iter().map(snapshot_from_pod).collect())
    }

    async fn list_events(&self, selector: &EventSelector) -> DiagnoseResult<Vec<Event>> {
        let params = list_params(selector.label_query.as_deref(), selector.field_query.as_deref());
        debug!(
            "listing events label={:?} field={:?}",
            selector.label_query, selector.field_query
        );
        let events = self
            .events_api(selector.namespace.as_deref())
            .list(&params)
            .await
            .map_err(|e| {
                DiagnoseError::list(
                    format!(
                        "listing events with LabelSelector: {} and FieldSelector: {}",
                        selector.label_query.as_deref().unwrap_or(""),
                        selector.field_query.as_deref().unwrap_or("")
                    ),
                    e,
                )
            })?;
        Ok(events.items.iter().map(event_from_kube).collect())
    }

    async fn get_logs(&self, namespace: &str, pod: &str, container: &str) -> DiagnoseResult<String> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = LogParams {
            container: Some(container.to_string()),
            ..Default::default()
        };
        api.logs(pod, &params)
            .await
            .map_err(|cause| DiagnoseError::LogFetch {
                pod: pod.to_string(),
                container: container.to_string(),
                cause,
            })
    }
}

fn list_params(labels: Option<&str>, fields: Option<&str>) -> ListParams {
    let mut params = ListParams::default();
    if let Some(labels) = labels.filter(|l| !l.is_empty()) {
        params = params.labels(labels);
    }
    if let Some(fields) = fields.filter(|f| !f.is_empty()) {
        params = params.fields(fields);
    }
    params
}

/// Keep the pods that were found, in lookup order.
pub fn found_pods(lookups: Vec<PodLookup>) -> Vec<PodStatusSnapshot> {
    lookups
        .into_iter()
        .filter_map(|lookup| match lookup {
            PodLookup::Found(pod) => Some(pod),
            PodLookup::NotFound => None,
        })
        .collect()
}

pub fn snapshot_from_pod(pod: &Pod) -> PodStatusSnapshot {
    let status = pod.status.as_ref();

    let conditions = status
        .and_then(|s| s.conditions.as_ref())
        .map(|conditions| {
            conditions
                .iter()
                .map(|c| PodCondition {
                    kind: c.type_.clone(),
                    is_satisfied: c.status == "True",
                    reason: c.reason.clone().unwrap_or_default(),
                    message: c.message.clone().unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();

    let container_statuses = status
        .and_then(|s| s.container_statuses.as_ref())
        .map(|statuses| {
            statuses
                .iter()
                .map(|cs| ContainerStatus {
                    name: cs.name.clone(),
                    is_ready: cs.ready,
                })
                .collect()
        })
        .unwrap_or_default();

    PodStatusSnapshot {
        name: pod.metadata.name.clone().unwrap_or_default(),
        namespace: pod.metadata.namespace.clone().unwrap_or_default(),
        phase: status.and_then(|s| s.phase.clone()),
        phase_reason: status.and_then(|s| s.reason.clone()),
        conditions,
        container_statuses,
    }
}

pub fn event_from_kube(event: &KubeEvent) -> Event {
    Event {
        last_seen: event_last_seen(event),
        kind: event.type_.clone().unwrap_or_default(),
        reason: event.reason.clone().unwrap_or_default(),
        message: event.message.clone().unwrap_or_default(),
    }
}

// Prefer lastTimestamp, then eventTime, then firstTimestamp
fn event_last_seen(event: &KubeEvent) -> Option<DateTime<Utc>> {
    if let Some(ts) = event.last_timestamp.as_ref() {
        return Some(ts.0);
    }
    if let Some(ts) = event.event_time.as_ref() {
        return Some(ts.0);
    }
    event.first_timestamp.as_ref().map(|t| t.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use k8s_openapi::api::core::v1::{
        ContainerStatus as KubeContainerStatus, PodCondition as KubePodCondition, PodStatus,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{MicroTime, ObjectMeta, Time};

    fn create_test_pod(name: &str) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            status: Some(PodStatus {
                phase: Some("Running".to_string()),
                reason: Some("Evicted".to_string()),
                conditions: Some(vec![
                    KubePodCondition {
                        type_: "PodScheduled".to_string(),
                        status: "True".to_string(),
                        ..Default::default()
                    },
                    KubePodCondition {
                        type_: "Ready".to_string(),
                        status: "False".to_string(),
                        reason: Some("ContainersNotReady".to_string()),
                        message: Some("containers with unready status: [app]".to_string()),
                        ..Default::default()
                    },
                    KubePodCondition {
                        type_: "ContainersReady".to_string(),
                        status: "Unknown".to_string(),
                        ..Default::default()
                    },
                ]),
                container_statuses: Some(vec![
                    KubeContainerStatus {
                        name: "app".to_string(),
                        ready: false,
                        ..Default::default()
                    },
                    KubeContainerStatus {
                        name: "proxy".to_string(),
                        ready: true,
                        ..Default::default()
                    },
                ]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_snapshot_from_pod() {
        let snapshot = snapshot_from_pod(&create_test_pod("web-0"));

        assert_eq!(snapshot.name, "web-0");
        assert_eq!(snapshot.namespace, "default");
        assert_eq!(snapshot.phase.as_deref(), Some("Running"));
        assert_eq!(snapshot.phase_reason.as_deref(), Some("Evicted"));
        assert_eq!(snapshot.conditions.len(), 3);
        assert!(snapshot.conditions[0].is_satisfied);
        assert!(!snapshot.conditions[1].is_satisfied);
        assert_eq!(snapshot.conditions[1].reason, "ContainersNotReady");
        assert_eq!(snapshot.conditions[1].message, "containers with unready status: [app]");
        // Only "True" counts as satisfied
        assert!(!snapshot.conditions[2].is_satisfied);
        assert_eq!(snapshot.conditions[2].reason, "");
        assert_eq!(
            snapshot.container_statuses,
            vec![
                ContainerStatus { name: "app".to_string(), is_ready: false },
                ContainerStatus { name: "proxy".to_string(), is_ready: true },
            ]
        );
    }

    #[test]
    fn test_snapshot_without_status() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("bare".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let snapshot = snapshot_from_pod(&pod);
        assert_eq!(snapshot.name, "bare");
        assert!(snapshot.conditions.is_empty());
        assert!(snapshot.container_statuses.is_empty());
        assert_eq!(snapshot.phase_reason, None);
    }

    #[test]
    fn test_event_last_seen_fallbacks() {
        let last = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let micro = Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap();
        let first = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();

        let mut event = KubeEvent {
            type_: Some("Warning".to_string()),
            reason: Some("BackOff".to_string()),
            message: Some("Back-off restarting failed container".to_string()),
            last_timestamp: Some(Time(last)),
            event_time: Some(MicroTime(micro)),
            first_timestamp: Some(Time(first)),
            ..Default::default()
        };
        let converted = event_from_kube(&event);
        assert_eq!(converted.last_seen, Some(last));
        assert_eq!(converted.kind, "Warning");
        assert_eq!(converted.reason, "BackOff");

        event.last_timestamp = None;
        assert_eq!(event_from_kube(&event).last_seen, Some(micro));

        event.event_time = None;
        assert_eq!(event_from_kube(&event).last_seen, Some(first));

        event.first_timestamp = None;
        assert_eq!(event_from_kube(&event).last_seen, None);
    }

    #[test]
    fn test_found_pods_skips_missing() {
        let b = PodStatusSnapshot {
            name: "b".to_string(),
            ..Default::default()
        };
        let c = PodStatusSnapshot {
            name: "c".to_string(),
            ..Default::default()
        };

        let pods = found_pods(vec![
            PodLookup::NotFound,
            PodLookup::Found(b.clone()),
            PodLookup::NotFound,
            PodLookup::Found(c.clone()),
        ]);
        assert_eq!(pods, vec![b, c]);
    }
}
