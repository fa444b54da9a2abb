use crate::k8s::{Capp, Placement, PlacementDecision, ResourceId};
use anyhow::Result;
use std::sync::Arc;

/// The Kubernetes calls made while placing a Capp.
///
/// Each call is independently atomic; nothing is held across calls.
#[async_trait::async_trait]
pub trait PlacementApi: Send + Sync {
    /// Returns `None` when the Capp does not exist.
    async fn get_capp(&self, id: &ResourceId) -> Result<Option<Capp>>;

    async fn get_placement(&self, id: &ResourceId) -> Result<Placement>;

    /// Lists the decisions produced for the given Placement.
    async fn list_decisions(&self, placement: &ResourceId) -> Result<Vec<PlacementDecision>>;

    /// Records `cluster` as the Capp's destination and marks it placed in a
    /// single write.
    async fn update_destination(&self, capp: &Capp, cluster: &str) -> Result<()>;
}

#[async_trait::async_trait]
impl<A: PlacementApi + ?Sized> PlacementApi for Arc<A> {
    async fn get_capp(&self, id: &ResourceId) -> Result<Option<Capp>> {
        (**self).get_capp(id).await
    }

    async fn get_placement(&self, id: &ResourceId) -> Result<Placement> {
        (**self).get_placement(id).await
    }

    async fn list_decisions(&self, placement: &ResourceId) -> Result<Vec<PlacementDecision>> {
        (**self).list_decisions(placement).await
    }

    async fn update_destination(&self, capp: &Capp, cluster: &str) -> Result<()> {
        (**self).update_destination(capp, cluster).await
    }
}
