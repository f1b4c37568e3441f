use crate::types::{ContainerStatus, HealthVerdict, PodCondition, PodStatusSnapshot};

/// Shown when the API server gives no top-level reason for a pod.
pub const NO_REASON: &str = "None";

/// Classify a pod. Ready means every condition holds and every container
/// is ready; a pod reporting neither is ready.
pub fn evaluate(pod: &PodStatusSnapshot) -> HealthVerdict {
    let failed_conditions = failed_conditions(pod);
    let not_ready_containers = not_ready_containers(pod);

    HealthVerdict {
        is_ready: failed_conditions.is_empty() && not_ready_containers.is_empty(),
        failed_conditions,
        not_ready_containers,
    }
}

pub fn failed_conditions(pod: &PodStatusSnapshot) -> Vec<PodCondition> {
    pod.conditions
        .iter()
        .filter(|c| !c.is_satisfied)
        .cloned()
        .collect()
}

pub fn not_ready_containers(pod: &PodStatusSnapshot) -> Vec<ContainerStatus> {
    pod.container_statuses
        .iter()
        .filter(|c| !c.is_ready)
        .cloned()
        .collect()
}

pub fn display_reason(phase_reason: Option<&str>) -> &str {
    match phase_reason {
        Some(reason) if !reason.is_empty() => reason,
        _ => NO_REASON,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(kind: &str, is_satisfied: bool) -> PodCondition {
        PodCondition {
            kind: kind.to_string(),
            is_satisfied,
            reason: String::new(),
            message: format!("{} message", kind),
        }
    }

    fn container(name: &str, is_ready: bool) -> ContainerStatus {
        ContainerStatus {
            name: name.to_string(),
            is_ready,
        }
    }

    fn create_test_pod(conditions: Vec<PodCondition>, containers: Vec<ContainerStatus>) -> PodStatusSnapshot {
        PodStatusSnapshot {
            name: "test-pod".to_string(),
            namespace: "default".to_string(),
            conditions,
            container_statuses: containers,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_pod_is_ready() {
        let verdict = evaluate(&create_test_pod(vec![], vec![]));
        assert!(verdict.is_ready);
        assert!(verdict.failed_conditions.is_empty());
        assert!(verdict.not_ready_containers.is_empty());
    }

    #[test]
    fn test_failed_condition_only() {
        let failed = PodCondition {
            kind: "Ready".to_string(),
            is_satisfied: false,
            reason: String::new(),
            message: "not ready".to_string(),
        };
        let verdict = evaluate(&create_test_pod(vec![failed.clone()], vec![]));

        assert_eq!(
            verdict,
            HealthVerdict {
                is_ready: false,
                failed_conditions: vec![failed],
                not_ready_containers: vec![],
            }
        );
    }

    #[test]
    fn test_not_ready_container_only() {
        let pod = create_test_pod(
            vec![condition("PodScheduled", true), condition("Ready", true)],
            vec![container("app", false), container("sidecar", true)],
        );
        let verdict = evaluate(&pod);

        assert!(!verdict.is_ready);
        assert!(verdict.failed_conditions.is_empty());
        assert_eq!(verdict.not_ready_containers, vec![container("app", false)]);
    }

    #[test]
    fn test_filters_preserve_order() {
        let pod = create_test_pod(
            vec![
                condition("Initialized", false),
                condition("PodScheduled", true),
                condition("ContainersReady", false),
                condition("Ready", false),
            ],
            vec![
                container("c", false),
                container("a", true),
                container("b", false),
            ],
        );
        let verdict = evaluate(&pod);

        let kinds: Vec<&str> = verdict.failed_conditions.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["Initialized", "ContainersReady", "Ready"]);
        let names: Vec<&str> = verdict.not_ready_containers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b"]);
    }

    #[test]
    fn test_readiness_needs_both_lists_empty() {
        let pods = vec![
            create_test_pod(vec![], vec![]),
            create_test_pod(vec![condition("Ready", true)], vec![container("app", true)]),
            create_test_pod(vec![condition("Ready", false)], vec![container("app", true)]),
            create_test_pod(vec![condition("Ready", true)], vec![container("app", false)]),
            create_test_pod(vec![], vec![container("app", false)]),
        ];

        let ready: Vec<bool> = pods.iter().map(|pod| evaluate(pod).is_ready).collect();
        assert_eq!(ready, vec![true, true, false, false, false]);

        for pod in &pods {
            let verdict = evaluate(pod);
            assert_eq!(
                verdict.is_ready,
                verdict.failed_conditions.is_empty() && verdict.not_ready_containers.is_empty()
            );
            assert_eq!(verdict, evaluate(pod));
        }
    }

    #[test]
    fn test_display_reason() {
        assert_eq!(display_reason(None), "None");
        assert_eq!(display_reason(Some("")), "None");
        assert_eq!(display_reason(Some("Evicted")), "Evicted");
    }
}
