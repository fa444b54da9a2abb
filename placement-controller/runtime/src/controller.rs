use crate::{
    client::KubeApi,
    core::{EventFilter, Error, PlacementApi, Reconciler},
    k8s::{Capp, ResourceId},
    metrics::ControllerMetrics,
    watch,
};
use ahash::AHashMap as HashMap;
use futures::prelude::*;
use kube::runtime::{
    controller::{self, Action},
    reflector, watcher, Controller,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::{sync::oneshot, time::Duration};
use tracing::{info_span, Instrument};

const MIN_ERROR_BACKOFF: Duration = Duration::from_secs(1);
const MAX_ERROR_BACKOFF: Duration = Duration::from_secs(5 * 60);

pub(crate) struct Context<A = KubeApi> {
    reconciler: Reconciler<A>,
    metrics: ControllerMetrics,
    backoff: ErrorBackoff,
}

/// Per-Capp exponential delay applied after failed reconciliations.
///
/// The delay starts at `min`, doubles with each consecutive failure, and is
/// capped at `max`. A successful pass clears it.
#[derive(Debug)]
struct ErrorBackoff {
    min: Duration,
    max: Duration,
    failures: Mutex<HashMap<ResourceId, u32>>,
}

/// Runs the Capp controller until `drain` is signaled.
///
/// Events rejected by `filter` never reach the work queue. On shutdown, the
/// controller stops accepting work and in-flight reconciliations complete
/// before the drain handle is released.
pub(crate) async fn run<A, S, F>(
    events: S,
    filter: F,
    ctx: Arc<Context<A>>,
    config: controller::Config,
    drain: drain::Watch,
) where
    A: PlacementApi + 'static,
    S: Stream<Item = watcher::Event<Capp>> + Send + 'static,
    F: EventFilter + Send + 'static,
{
    let (reader, writer) = reflector::store();
    let trigger = watch::admitted(events, writer, filter, ctx.metrics.clone(), {
        let ctx = ctx.clone();
        move |capp: &Capp| ctx.forget(capp)
    });
    let tracked = ctx.clone();

    let (close_tx, close_rx) = oneshot::channel::<()>();
    let ctrl = Controller::for_stream(trigger, reader)
        .with_config(config)
        .graceful_shutdown_on(close_rx.map(|_| ()))
        .run(reconcile::<A>, error_policy::<A>, ctx)
        .for_each(|result| {
            match result {
                Ok((capp, action)) => tracing::debug!(%capp, ?action, "Reconciled"),
                Err(controller::Error::ObjectNotFound(capp)) => {
                    tracing::debug!(%capp, "Capp deleted before it was reconciled");
                    if let Some(namespace) = capp.namespace {
                        tracked.backoff.reset(&ResourceId::new(namespace, capp.name));
                    }
                }
                // Already logged by the error policy.
                Err(controller::Error::ReconcilerFailed(_, _)) => {}
                Err(error) => tracing::warn!(%error, "Controller failed"),
            }
            future::ready(())
        });
    tokio::pin!(ctrl);

    tracing::info!("Watching Capps");
    tokio::select! {
        _ = (&mut ctrl) => {}
        handle = drain.signaled() => {
            let _ = close_tx.send(());
            handle.release_after(ctrl).await;
        }
    }
}

async fn reconcile<A: PlacementApi>(
    capp: Arc<Capp>,
    ctx: Arc<Context<A>>,
) -> Result<Action, Error> {
    let Some(id) = ResourceId::of(&*capp) else {
        tracing::warn!(?capp.metadata, "Ignoring Capp without a name and namespace");
        return Ok(Action::await_change());
    };

    let span = info_span!("reconcile", namespace = %id.namespace, name = %id.name);
    match ctx.reconciler.reconcile(&id).instrument(span).await {
        Ok(outcome) => {
            ctx.backoff.reset(&id);
            ctx.metrics.reconciled(outcome.as_str());
            Ok(outcome
                .requeue_after()
                .map_or_else(Action::await_change, Action::requeue))
        }
        Err(error) => {
            ctx.metrics.reconciled("error");
            Err(error)
        }
    }
}

fn error_policy<A>(capp: Arc<Capp>, error: &Error, ctx: Arc<Context<A>>) -> Action {
    let delay = match ResourceId::of(&*capp) {
        Some(id) => ctx.backoff.next(&id),
        None => ctx.backoff.max,
    };
    tracing::warn!(%error, ?delay, "Reconciliation failed");
    Action::requeue(delay)
}

// === impl Context ===

impl<A> Context<A> {
    pub(crate) fn new(reconciler: Reconciler<A>, metrics: ControllerMetrics) -> Arc<Self> {
        Arc::new(Self {
            reconciler,
            metrics,
            backoff: ErrorBackoff::new(MIN_ERROR_BACKOFF, MAX_ERROR_BACKOFF),
        })
    }

    /// Drops the error backoff of a Capp that will not be reconciled again.
    fn forget(&self, capp: &Capp) {
        if let Some(id) = ResourceId::of(capp) {
            self.backoff.reset(&id);
        }
    }
}

// === impl ErrorBackoff ===

impl ErrorBackoff {
    fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max,
            failures: Mutex::new(HashMap::new()),
        }
    }

    fn next(&self, id: &ResourceId) -> Duration {
        let mut failures = self.failures.lock();
        let attempts = failures.entry(id.clone()).or_default();
        let delay = self
            .min
            .saturating_mul(2u32.saturating_pow(*attempts))
            .min(self.max);
        *attempts = attempts.saturating_add(1);
        delay
    }

    fn reset(&self, id: &ResourceId) {
        self.failures.lock().remove(id);
    }
}
