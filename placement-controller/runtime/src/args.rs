use crate::{
    client::KubeApi,
    controller::{self, Context},
    core::{Placements, Reconciler, Unplaced},
    k8s::Capp,
    metrics::ControllerMetrics,
};
use anyhow::{bail, Result};
use clap::Parser;
use kube::runtime::{controller::Config, watcher};
use prometheus_client::registry::Registry;
use tokio::time::Duration;
use tracing::{info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(name = "placement", about = "Places Capps on managed clusters")]
pub struct Args {
    #[clap(
        long,
        default_value = "placement=info,warn",
        env = "PLACEMENT_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Placements a Capp's site may name, in priority order.
    ///
    /// Capps without a site are placed by the first Placement.
    #[clap(
        long,
        env = "PLACEMENT_CONTROLLER_PLACEMENTS",
        value_delimiter = ',',
        required = true
    )]
    placements: Vec<String>,

    /// Namespace of the Placements and their PlacementDecisions.
    #[clap(
        long,
        env = "PLACEMENT_CONTROLLER_PLACEMENTS_NAMESPACE",
        default_value = "capp-gitops"
    )]
    placements_namespace: String,

    /// Seconds to wait before revisiting a Capp whose Placement has not
    /// produced a decision.
    #[clap(long, default_value = "20", value_parser = clap::value_parser!(u64).range(1..))]
    requeue_delay: u64,

    #[clap(long, default_value = "5000")]
    patch_timeout_ms: u64,

    /// Maximum number of Capps reconciled at once.
    #[clap(long, default_value = "4")]
    concurrency: u16,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            admin,
            placements,
            placements_namespace,
            requeue_delay,
            patch_timeout_ms,
            concurrency,
        } = self;

        // Validate before connecting to the cluster.
        let placements = Placements::new(placements, placements_namespace)?;

        let mut prom = <Registry>::default();
        let metrics = ControllerMetrics::register(prom.sub_registry_with_prefix("placement"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        tracing::info!(
            placements = ?placements.names(),
            namespace = %placements.namespace(),
            "Starting placement controller"
        );

        let api = KubeApi::new(runtime.client(), Duration::from_millis(patch_timeout_ms));
        let reconciler = Reconciler::new(api, placements)
            .with_requeue_delay(Duration::from_secs(requeue_delay));
        let ctx = Context::new(reconciler, metrics);

        let capps = runtime.watch_all::<Capp>(watcher::Config::default());
        tokio::spawn(
            controller::run(
                capps,
                Unplaced,
                ctx,
                Config::default().concurrency(concurrency),
                runtime.shutdown_handle(),
            )
            .instrument(info_span!("capps")),
        );

        // Block the main thread on the shutdown signal. Once it fires, wait for
        // the controller to finish in-flight reconciliations before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
