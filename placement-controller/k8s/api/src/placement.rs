//! Open Cluster Management placement resources.
//!
//! A `Placement` selects managed clusters; the placement scheduler records its
//! choices in one or more `PlacementDecision` objects labeled with
//! [`PLACEMENT_LABEL`](crate::PLACEMENT_LABEL).

use k8s_openapi::NamespaceResourceScope;
use kube::{api::ObjectMeta, CustomResource, Resource};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

const GROUP: &str = "cluster.open-cluster-management.io";
const VERSION: &str = "v1beta1";

#[derive(Clone, Debug, Default, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "cluster.open-cluster-management.io",
    version = "v1beta1",
    kind = "Placement",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct PlacementSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_sets: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_clusters: Option<i32>,
}

/// The scheduler's output for a `Placement`.
///
/// PlacementDecisions carry no spec, so the resource is described by hand
/// rather than derived.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementDecision {
    pub metadata: ObjectMeta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PlacementDecisionStatus>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementDecisionStatus {
    #[serde(default)]
    pub decisions: Vec<ClusterDecision>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDecision {
    #[serde(default)]
    pub cluster_name: String,

    #[serde(default)]
    pub reason: String,
}

// === impl PlacementDecision ===

impl PlacementDecision {
    /// Elected cluster names in the order the scheduler listed them.
    pub fn cluster_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.status
            .iter()
            .flat_map(|status| status.decisions.iter())
            .map(|decision| decision.cluster_name.as_str())
    }
}

impl Resource for PlacementDecision {
    type DynamicType = ();
    type Scope = NamespaceResourceScope;

    fn kind(_: &()) -> Cow<'_, str> {
        "PlacementDecision".into()
    }

    fn group(_: &()) -> Cow<'_, str> {
        GROUP.into()
    }

    fn version(_: &()) -> Cow<'_, str> {
        VERSION.into()
    }

    fn plural(_: &()) -> Cow<'_, str> {
        "placementdecisions".into()
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
