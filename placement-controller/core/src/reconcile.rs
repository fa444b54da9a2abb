use crate::{
    k8s::ResourceId,
    picker::{self, Decision},
    Error, PlacementApi, Placements,
};
use std::time::Duration;

/// How long to wait for the scheduler to produce a decision.
pub const DEFAULT_REQUEUE_DELAY: Duration = Duration::from_secs(20);

/// Places Capps on managed clusters.
#[derive(Debug)]
pub struct Reconciler<A> {
    api: A,
    placements: Placements,
    requeue_delay: Duration,
}

/// The result of a successful reconciliation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The destination was written.
    Placed { cluster: String },

    /// The Capp already records this destination; nothing was written.
    AlreadyPlaced { cluster: String },

    /// The Capp no longer exists.
    Absent,

    /// No decision is available yet; revisit after the delay.
    Requeue(Duration),
}

// === impl Outcome ===

impl Outcome {
    pub fn requeue_after(&self) -> Option<Duration> {
        match self {
            Self::Requeue(delay) => Some(*delay),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placed { .. } => "placed",
            Self::AlreadyPlaced { .. } => "already_placed",
            Self::Absent => "absent",
            Self::Requeue(_) => "requeue",
        }
    }
}

// === impl Reconciler ===

impl<A: PlacementApi> Reconciler<A> {
    pub fn new(api: A, placements: Placements) -> Self {
        Self {
            api,
            placements,
            requeue_delay: DEFAULT_REQUEUE_DELAY,
        }
    }

    pub fn with_requeue_delay(self, requeue_delay: Duration) -> Self {
        Self {
            requeue_delay,
            ..self
        }
    }

    pub fn placements(&self) -> &Placements {
        &self.placements
    }

    /// Runs a single pass for the Capp identified by `id`.
    ///
    /// Each pass re-reads the Capp and the scheduler's decisions, so a pass
    /// may be retried at any point.
    pub async fn reconcile(&self, id: &ResourceId) -> Result<Outcome, Error> {
        let capp = match self.api.get_capp(id).await {
            Ok(Some(capp)) => capp,
            Ok(None) => {
                tracing::debug!("Capp not found");
                return Ok(Outcome::Absent);
            }
            Err(source) => {
                return Err(Error::GetCapp {
                    id: id.clone(),
                    source,
                })
            }
        };

        let site = capp.site();
        let cluster = if self.placements.is_unresolved(site) {
            match picker::pick(&self.api, &self.placements, &capp).await? {
                Decision::Resolved(cluster) => cluster,
                Decision::Requeue => {
                    tracing::info!(delay = ?self.requeue_delay, "Waiting for a PlacementDecision");
                    return Ok(Outcome::Requeue(self.requeue_delay));
                }
            }
        } else {
            site.to_string()
        };

        if capp.placed_cluster() == Some(cluster.as_str()) {
            tracing::debug!(%cluster, "Capp is already placed");
            return Ok(Outcome::AlreadyPlaced { cluster });
        }

        if let Err(source) = self.api.update_destination(&capp, &cluster).await {
            tracing::error!(%cluster, error = %source, "Unable to update Capp");
            return Err(Error::UpdateDestination {
                id: id.clone(),
                cluster,
                source,
            });
        }

        tracing::info!(%cluster, "Placed Capp");
        Ok(Outcome::Placed { cluster })
    }
}
