use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::health::evaluate;
use crate::kubernetes::ClusterGateway;
use crate::report::ReportSummary;
use crate::selectors::events_for_pod;
use crate::types::{ContainerLogs, EventSelector, PodReport, PodStatusSnapshot};

/// Builds diagnostic reports for the pods that are not ready.
pub struct DiagnosticAssembler<'a, G: ClusterGateway + ?Sized> {
    gateway: &'a G,
    all_namespaces: bool,
}

impl<'a, G: ClusterGateway + ?Sized> DiagnosticAssembler<'a, G> {
    pub fn new(gateway: &'a G, all_namespaces: bool) -> Self {
        Self {
            gateway,
            all_namespaces,
        }
    }

    pub fn display_name(&self, pod: &PodStatusSnapshot) -> String {
        if self.all_namespaces {
            format!("{}/{}", pod.namespace, pod.name)
        } else {
            pod.name.clone()
        }
    }

    /// Report for one pod, or `None` when it is ready.
    ///
    /// An event lookup failure is returned as an error. A log fetch failure
    /// only marks that container's logs as errored.
    pub async fn diagnose_pod(&self, pod: &PodStatusSnapshot) -> Result<Option<PodReport>> {
        let verdict = evaluate(pod);
        if verdict.is_ready {
            debug!("pod {} is ready", pod.name);
            return Ok(None);
        }

        let display_name = self.display_name(pod);
        info!(
            "pod {} is not ready ({} failed conditions, {} containers not ready)",
            display_name,
            verdict.failed_conditions.len(),
            verdict.not_ready_containers.len()
        );

        let scope = EventSelector {
            namespace: Some(pod.namespace.clone()).filter(|ns| !ns.is_empty()),
            ..Default::default()
        };
        let events = self
            .gateway
            .list_events(&events_for_pod(&scope, &pod.name))
            .await
            .with_context(|| format!("getting events for pod {}", display_name))?;

        let mut container_logs = Vec::with_capacity(verdict.not_ready_containers.len());
        for container in &verdict.not_ready_containers {
            let logs = match self
                .gateway
                .get_logs(&pod.namespace, &pod.name, &container.name)
                .await
            {
                Ok(text) => ContainerLogs::Lines(text.lines().map(str::to_string).collect()),
                Err(err) => {
                    warn!("{}", err);
                    ContainerLogs::Errored(err.to_string())
                }
            };
            container_logs.push((container.name.clone(), logs));
        }

        Ok(Some(PodReport {
            display_name,
            phase_reason: pod.phase_reason.clone(),
            verdict,
            events,
            container_logs,
        }))
    }

    /// Reports for the pods that are not ready, in input order.
    pub async fn assemble(&self, pods: &[PodStatusSnapshot]) -> Result<Vec<PodReport>> {
        let mut reports = Vec::new();
        self.assemble_with(pods, |report| reports.push(report.clone()))
            .await?;
        Ok(reports)
    }

    /// Like [`assemble`](Self::assemble) but hands each report to
    /// `on_report` as soon as it is built.
    pub async fn assemble_with<F>(
        &self,
        pods: &[PodStatusSnapshot],
        mut on_report: F,
    ) -> Result<ReportSummary>
    where
        F: FnMut(&PodReport),
    {
        let mut summary = ReportSummary {
            pods_scanned: pods.len(),
            ..Default::default()
        };

        for pod in pods {
            if let Some(report) = self.diagnose_pod(pod).await? {
                summary.add(&report);
                on_report(&report);
            }
        }

        Ok(summary)
    }
}
