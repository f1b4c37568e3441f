use anyhow::{Context, Result};
use tracing::debug;

use crate::kubernetes::ClusterGateway;
use crate::selectors::events_for_pod;
use crate::types::{EventSelector, PodEvents, PodSelector};

/// Pod names to list events for: the explicit names, or else the names of
/// the pods matching the selector in gateway order.
pub async fn target_pod_names<G>(gateway: &G, selector: &PodSelector) -> Result<Vec<String>>
where
    G: ClusterGateway + ?Sized,
{
    if !selector.names.is_empty() {
        return Ok(selector.names.clone());
    }

    let pods = gateway.list_pods(selector).await.context("getting pods")?;
    debug!("selector matched {} pods", pods.len());
    Ok(pods.into_iter().map(|pod| pod.name).collect())
}

/// Events for every named pod, healthy or not, handed to `on_pod` in order
/// together with the pod's position. The first failed lookup stops the listing.
pub async fn list_events_with<G, F>(
    gateway: &G,
    pod_names: &[String],
    base: &EventSelector,
    mut on_pod: F,
) -> Result<()>
where
    G: ClusterGateway + ?Sized,
    F: FnMut(usize, &PodEvents),
{
    for (index, pod) in pod_names.iter().enumerate() {
        let events = gateway
            .list_events(&events_for_pod(base, pod))
            .await
            .with_context(|| format!("getting events for pod '{}'", pod))?;
        on_pod(
            index,
            &PodEvents {
                pod: pod.clone(),
                events,
            },
        );
    }
    Ok(())
}

pub async fn list_events<G>(
    gateway: &G,
    pod_names: &[String],
    base: &EventSelector,
) -> Result<Vec<PodEvents>>
where
    G: ClusterGateway + ?Sized,
{
    let mut listed = Vec::with_capacity(pod_names.len());
    list_events_with(gateway, pod_names, base, |_, pod| listed.push(pod.clone())).await?;
    Ok(listed)
}
