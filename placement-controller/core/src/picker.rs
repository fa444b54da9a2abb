use crate::{
    k8s::{Capp, PlacementDecision, ResourceExt},
    Error, PlacementApi, Placements,
};

/// The result of consulting a Placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Resolved(String),

    /// The scheduler has not elected a cluster yet.
    Requeue,
}

/// Chooses the managed cluster for a Capp whose site is unresolved.
///
/// A missing Placement is an error rather than a requeue: the Capp refers to
/// something that does not exist.
pub async fn pick<A>(api: &A, placements: &Placements, capp: &Capp) -> Result<Decision, Error>
where
    A: PlacementApi + ?Sized,
{
    let placement = placements.effective(capp.site());

    api.get_placement(&placement)
        .await
        .map_err(|source| Error::GetPlacement {
            id: placement.clone(),
            source,
        })?;

    let decisions = api
        .list_decisions(&placement)
        .await
        .map_err(|source| Error::ListDecisions {
            placement: placement.clone(),
            source,
        })?;
    if decisions.is_empty() {
        tracing::info!(%placement, "No PlacementDecisions found");
        return Ok(Decision::Requeue);
    }

    match select_cluster(decisions) {
        Some(cluster) => {
            tracing::debug!(%placement, %cluster, "Selected cluster");
            Ok(Decision::Resolved(cluster))
        }
        None => {
            tracing::info!(%placement, "PlacementDecisions have not elected a cluster");
            Ok(Decision::Requeue)
        }
    }
}

/// Returns the first non-empty cluster name, visiting decisions by name and
/// each decision's clusters in listed order.
pub fn select_cluster(mut decisions: Vec<PlacementDecision>) -> Option<String> {
    decisions.sort_by(|a, b| a.name_any().cmp(&b.name_any()));
    decisions
        .iter()
        .flat_map(PlacementDecision::cluster_names)
        .find(|name| !name.is_empty())
        .map(str::to_string)
}
