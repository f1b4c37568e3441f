use anyhow::{Context, Result};
use tracing::info;

use kube_pod_diagnose::cli::{parse_or_exit, PodEventsArgs};
use kube_pod_diagnose::{
    init_tracing, list_events_with, render_pod_events, target_pod_names, KubeGateway,
    SystemEnvironment,
};

#[tokio::main]
async fn main() {
    init_tracing();
    let args = parse_or_exit::<PodEventsArgs>();

    if let Err(err) = run(args).await {
        println!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run(args: PodEventsArgs) -> Result<()> {
    let cfg = args.cluster.client_config(&SystemEnvironment, false);
    let gateway = KubeGateway::connect(&cfg).await.context("building client")?;
    info!("namespace = {}", gateway.namespace());

    let pod_names = target_pod_names(&gateway, &args.pods.pod_selector()).await?;
    let base = args.event_selector();

    list_events_with(&gateway, &pod_names, &base, |index, pod| {
        print!("{}", render_pod_events(index, pod))
    })
    .await
}
