use crate::{
    core::Epoch,
    evaluator::{Evaluator, EvaluatorConfig, EvaluatorMetrics},
    index::{self, Index, Stores},
    k8s::{self, ClusterRef},
    Summary, SummaryMetrics,
};
use anyhow::{bail, ensure, Result};
use clap::Parser;
use kube::runtime::watcher;
use prometheus_client::registry::Registry;
use tokio::time::Duration;
use tracing::{info, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(name = "netgraph", about = "A network graph controller")]
pub struct Args {
    #[clap(
        long,
        default_value = "netgraph=info,warn",
        env = "NETGRAPH_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Identifies the cluster whose state is indexed.
    #[clap(long, env = "NETGRAPH_CLUSTER_ID")]
    cluster_id: String,

    /// The cluster's display name, reported on graph nodes.
    #[clap(long, default_value = "local")]
    cluster_name: String,

    /// Attaches the permitting policies to each edge.
    #[clap(long)]
    edge_evidence: bool,

    #[clap(long, default_value = "10")]
    summary_interval_secs: u64,

    #[clap(long, default_value = "30")]
    evaluation_timeout_secs: u64,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            cluster_id,
            cluster_name,
            edge_evidence,
            summary_interval_secs,
            evaluation_timeout_secs,
        } = self;

        ensure!(!cluster_id.is_empty(), "--cluster-id must not be empty");
        ensure!(
            summary_interval_secs > 0,
            "--summary-interval-secs must be positive"
        );

        // Every change observed by the index increments the epoch that
        // evaluated graphs are stamped with.
        let epoch = Epoch::shared();
        let cluster = ClusterRef {
            id: cluster_id.clone(),
            name: cluster_name,
        };
        let index = Index::shared(cluster, epoch.clone());

        let mut prom = <Registry>::default();
        let netgraph = prom.sub_registry_with_prefix("netgraph");
        let evaluator_metrics = EvaluatorMetrics::register(netgraph);
        let summary_metrics = SummaryMetrics::register(netgraph);
        index::metrics::register(netgraph.sub_registry_with_prefix("index"), index.clone());
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        // Spawn resource watches.

        let deployments = runtime.watch_all::<k8s::Deployment>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(index.clone(), deployments)
                .instrument(info_span!("deployments")),
        );

        let statefulsets = runtime.watch_all::<k8s::StatefulSet>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(index.clone(), statefulsets)
                .instrument(info_span!("statefulsets")),
        );

        let daemonsets = runtime.watch_all::<k8s::DaemonSet>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(index.clone(), daemonsets)
                .instrument(info_span!("daemonsets")),
        );

        let network_policies =
            runtime.watch_all::<k8s::NetworkPolicy>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(index.clone(), network_policies)
                .instrument(info_span!("networkpolicies")),
        );

        let namespaces = runtime.watch_all::<k8s::Namespace>(watcher::Config::default());
        tokio::spawn(
            kubert::index::cluster(index.clone(), namespaces).instrument(info_span!("namespaces")),
        );

        let evaluator = Evaluator::from_stores(
            Stores::new(index),
            epoch,
            EvaluatorConfig { edge_evidence },
            evaluator_metrics,
        );

        // Spawn the graph summary reconciliation.
        let summary = Summary::new(
            evaluator,
            &cluster_id,
            Duration::from_secs(summary_interval_secs),
            Duration::from_secs(evaluation_timeout_secs),
            summary_metrics,
        );
        tokio::spawn(
            summary
                .run(runtime.shutdown_handle())
                .instrument(info_span!("summary")),
        );

        info!(%cluster_id, edge_evidence, "Indexing cluster state");

        // Block the main thread on the shutdown signal. Once it fires, wait for
        // the background tasks to complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
