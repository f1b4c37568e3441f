use anyhow::{Context, Result};
use tracing::info;

use kube_pod_diagnose::cli::{parse_or_exit, SickPodsArgs};
use kube_pod_diagnose::selectors::exclude_succeeded;
use kube_pod_diagnose::{
    init_tracing, render_pod_report, ClusterGateway, DiagnosticAssembler, KubeGateway,
    SystemEnvironment,
};

#[tokio::main]
async fn main() {
    init_tracing();
    let args = parse_or_exit::<SickPodsArgs>();

    if let Err(err) = run(args).await {
        println!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run(args: SickPodsArgs) -> Result<()> {
    let cfg = args.cluster.client_config(&SystemEnvironment, args.all_namespaces);
    let gateway = KubeGateway::connect(&cfg).await.context("building client")?;
    if gateway.all_namespaces() {
        info!("scanning all namespaces");
    } else {
        info!("scanning namespace {}", gateway.namespace());
    }

    let selector = exclude_succeeded(&args.pods.pod_selector());
    let pods = gateway.list_pods(&selector).await.context("getting pods")?;

    let assembler = DiagnosticAssembler::new(&gateway, gateway.all_namespaces());
    let summary = assembler
        .assemble_with(&pods, |report| print!("{}", render_pod_report(report)))
        .await?;

    if summary.has_issues() {
        info!(
            "{} pods scanned, {} not ready, {} containers not ready, {} log fetch errors",
            summary.pods_scanned, summary.pods_not_ready, summary.containers_not_ready, summary.log_errors
        );
    } else {
        info!("{} pods scanned, all ready", summary.pods_scanned);
    }
    Ok(())
}
