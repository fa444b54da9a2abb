#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Resolves the managed cluster each Capp is deployed to.
//!
//! A Capp's `site` names either a Placement or a managed cluster. Placements
//! are resolved through the PlacementDecisions produced by the Open Cluster
//! Management scheduler; the chosen cluster is written back to the Capp
//! together with the placement annotation, after which the Capp is no longer
//! reconciled.

mod api;
pub mod filter;
pub mod picker;
mod placements;
pub mod reconcile;


pub use self::{
    api::PlacementApi,
    filter::{EventFilter, Unplaced, WorkloadEvent},
    picker::Decision,
    placements::{InvalidPlacements, Placements},
    reconcile::{Outcome, Reconciler, DEFAULT_REQUEUE_DELAY},
};
pub use placement_controller_k8s_api as k8s;

use k8s::ResourceId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to get Capp {id}: {source}")]
    GetCapp {
        id: ResourceId,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to get Placement {id}: {source}")]
    GetPlacement {
        id: ResourceId,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to list PlacementDecisions for {placement}: {source}")]
    ListDecisions {
        placement: ResourceId,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to place Capp {id} on {cluster}: {source}")]
    UpdateDestination {
        id: ResourceId,
        cluster: String,
        #[source]
        source: anyhow::Error,
    },
}
