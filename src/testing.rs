//! In-memory [`ClusterGateway`] for exercising the diagnostics without a cluster.

use async_trait::async_trait;
use kube::core::ErrorResponse;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::error::{DiagnoseError, DiagnoseResult};
use crate::kubernetes::{found_pods, ClusterGateway};
use crate::types::{Event, EventSelector, PodLookup, PodSelector, PodStatusSnapshot};

const INVOLVED_OBJECT: &str = "involvedObject.name=";

#[derive(Default)]
pub struct FakeGateway {
    pods: Vec<PodStatusSnapshot>,
    events: HashMap<String, Vec<Event>>,
    event_errors: HashSet<String>,
    logs: HashMap<(String, String), Result<String, String>>,
    pod_queries: Mutex<Vec<PodSelector>>,
    event_queries: Mutex<Vec<EventSelector>>,
    log_requests: Mutex<Vec<String>>,
}

fn api_error(code: u16, reason: &str, message: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: reason.to_string(),
        code,
    })
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FakeGateway {
    pub fn with_pod(mut self, pod: PodStatusSnapshot) -> Self {
        self.pods.push(pod);
        self
    }

    pub fn with_events(mut self, pod: &str, events: Vec<Event>) -> Self {
        self.events.insert(pod.to_string(), events);
        self
    }

    pub fn with_event_error(mut self, pod: &str) -> Self {
        self.event_errors.insert(pod.to_string());
        self
    }

    pub fn with_logs(mut self, pod: &str, container: &str, text: &str) -> Self {
        self.logs
            .insert((pod.to_string(), container.to_string()), Ok(text.to_string()));
        self
    }

    pub fn with_log_error(mut self, pod: &str, container: &str, message: &str) -> Self {
        self.logs
            .insert((pod.to_string(), container.to_string()), Err(message.to_string()));
        self
    }

    pub fn pod_queries(&self) -> Vec<PodSelector> {
        locked(&self.pod_queries).clone()
    }

    pub fn event_queries(&self) -> Vec<EventSelector> {
        locked(&self.event_queries).clone()
    }

    /// Log requests as `namespace/pod/container`.
    pub fn log_requests(&self) -> Vec<String> {
        locked(&self.log_requests).clone()
    }

    fn lookup(&self, name: &str) -> PodLookup {
        match self.pods.iter().find(|p| p.name == name) {
            Some(pod) => PodLookup::Found(pod.clone()),
            None => PodLookup::NotFound,
        }
    }
}

/// The pod named by a leading `involvedObject.name=` clause.
fn involved_pod(selector: &EventSelector) -> Option<&str> {
    let fields = selector.field_query.as_deref()?;
    let rest = fields.strip_prefix(INVOLVED_OBJECT)?;
    Some(rest.split(',').next().unwrap_or(rest))
}

#[async_trait]
impl ClusterGateway for FakeGateway {
    async fn list_pods(&self, selector: &PodSelector) -> DiagnoseResult<Vec<PodStatusSnapshot>> {
        locked(&self.pod_queries).push(selector.clone());
        if selector.names.is_empty() {
            return Ok(self.pods.clone());
        }
        Ok(found_pods(
            selector.names.iter().map(|name| self.lookup(name)).collect(),
        ))
    }

    async fn list_events(&self, selector: &EventSelector) -> DiagnoseResult<Vec<Event>> {
        locked(&self.event_queries).push(selector.clone());
        let pod = involved_pod(selector).unwrap_or_default();
        if self.event_errors.contains(pod) {
            return Err(DiagnoseError::list(
                format!(
                    "listing events with LabelSelector: {} and FieldSelector: {}",
                    selector.label_query.as_deref().unwrap_or(""),
                    selector.field_query.as_deref().unwrap_or("")
                ),
                api_error(500, "InternalError", "etcdserver: request timed out"),
            ));
        }
        Ok(self.events.get(pod).cloned().unwrap_or_default())
    }

    async fn get_logs(&self, namespace: &str, pod: &str, container: &str) -> DiagnoseResult<String> {
        locked(&self.log_requests).push(format!("{}/{}/{}", namespace, pod, container));
        match self.logs.get(&(pod.to_string(), container.to_string())) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(DiagnoseError::LogFetch {
                pod: pod.to_string(),
                container: container.to_string(),
                cause: api_error(400, "BadRequest", message),
            }),
            None => Ok(String::new()),
        }
    }
}
