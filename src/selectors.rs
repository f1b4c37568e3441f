//! Selector string composition. Selector strings are passed to the API
//! server verbatim; nothing here parses or validates them.

use crate::types::{EventSelector, PodSelector};

/// Field selector that hides completed pods from the sick-pods scan.
pub const NOT_SUCCEEDED: &str = "status.phase!=Succeeded";

/// Treat empty selector strings the same as absent ones.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// AND-join two field selectors with the API server's comma syntax.
pub fn join_field_selectors(base: &str, extra: Option<&str>) -> String {
    match extra.filter(|e| !e.is_empty()) {
        Some(extra) => format!("{},{}", base, extra),
        None => base.to_string(),
    }
}

pub fn involved_object_selector(pod_name: &str) -> String {
    format!("involvedObject.name={}", pod_name)
}

/// Narrow a caller's event selector to the events of a single pod.
pub fn events_for_pod(base: &EventSelector, pod_name: &str) -> EventSelector {
    EventSelector {
        label_query: base.label_query.clone(),
        field_query: Some(join_field_selectors(
            &involved_object_selector(pod_name),
            base.field_query.as_deref(),
        )),
        namespace: base.namespace.clone(),
    }
}

/// Restrict a pod selector to pods that have not completed successfully.
pub fn exclude_succeeded(selector: &PodSelector) -> PodSelector {
    PodSelector {
        names: selector.names.clone(),
        label_query: selector.label_query.clone(),
        field_query: Some(join_field_selectors(
            NOT_SUCCEEDED,
            selector.field_query.as_deref(),
        )),
    }
}
