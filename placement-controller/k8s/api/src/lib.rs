#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod capp;
pub mod placement;
mod resource_id;

pub use self::{
    capp::{Capp, CappSpec},
    placement::{ClusterDecision, Placement, PlacementDecision, PlacementDecisionStatus},
    resource_id::ResourceId,
};
pub use k8s_openapi::NamespaceResourceScope;
pub use kube::{
    api::{Api, ListParams, ObjectMeta, Patch, PatchParams, ResourceExt},
    Client, Error, Resource,
};

/// Marks a Capp whose destination cluster has been written.
pub const PLACEMENT_ANNOTATION: &str = "rcs.dana.io/placement";

/// Links a PlacementDecision to the Placement that produced it.
pub const PLACEMENT_LABEL: &str = "cluster.open-cluster-management.io/placement";
