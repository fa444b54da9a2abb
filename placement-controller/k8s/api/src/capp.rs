use crate::PLACEMENT_ANNOTATION;
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A container application that is deployed to one managed cluster.
///
/// Only the fields consulted when placing the application are modeled;
/// everything else in the spec is owned by the Capp operator.
#[derive(Clone, Debug, Default, PartialEq, Eq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "rcs.dana.io",
    version = "v1alpha1",
    kind = "Capp",
    derive = "PartialEq",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct CappSpec {
    /// Either a Placement name or a managed cluster name. When unset, the
    /// default Placement is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
}

impl Capp {
    /// The configured site, or the empty string when unset.
    pub fn site(&self) -> &str {
        self.spec.site.as_deref().unwrap_or_default()
    }

    /// The cluster recorded by a previous placement, if any.
    pub fn placed_cluster(&self) -> Option<&str> {
        self.annotations()
            .get(PLACEMENT_ANNOTATION)
            .map(String::as_str)
    }

    pub fn is_placed(&self) -> bool {
        self.annotations().contains_key(PLACEMENT_ANNOTATION)
    }
}
