use crate::{
    core::PlacementApi,
    k8s::{
        self, Api, Capp, ListParams, Patch, PatchParams, Placement, PlacementDecision, ResourceId,
        PLACEMENT_ANNOTATION, PLACEMENT_LABEL,
    },
};
use anyhow::{anyhow, Result};
use tokio::time;

const FIELD_MANAGER: &str = "placement-controller";

/// Serves the placement calls from the Kubernetes API.
#[derive(Clone)]
pub(crate) struct KubeApi {
    client: k8s::Client,
    patch_timeout: time::Duration,
}

impl KubeApi {
    pub(crate) fn new(client: k8s::Client, patch_timeout: time::Duration) -> Self {
        Self {
            client,
            patch_timeout,
        }
    }
}

#[async_trait::async_trait]
impl PlacementApi for KubeApi {
    async fn get_capp(&self, id: &ResourceId) -> Result<Option<Capp>> {
        let api = Api::<Capp>::namespaced(self.client.clone(), &id.namespace);
        Ok(api.get_opt(&id.name).await?)
    }

    async fn get_placement(&self, id: &ResourceId) -> Result<Placement> {
        let api = Api::<Placement>::namespaced(self.client.clone(), &id.namespace);
        Ok(api.get(&id.name).await?)
    }

    async fn list_decisions(&self, placement: &ResourceId) -> Result<Vec<PlacementDecision>> {
        let api = Api::<PlacementDecision>::namespaced(self.client.clone(), &placement.namespace);
        let params = ListParams::default().labels(&format!("{PLACEMENT_LABEL}={}", placement.name));
        let list = api.list(&params).await?;
        Ok(list.items)
    }

    async fn update_destination(&self, capp: &Capp, cluster: &str) -> Result<()> {
        let id = ResourceId::of(capp).ok_or_else(|| anyhow!("Capp must be named and namespaced"))?;
        let api = Api::<Capp>::namespaced(self.client.clone(), &id.namespace);
        let params = PatchParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        let patch = destination_patch(capp, cluster);
        tracing::debug!(%patch, "Patching Capp");

        time::timeout(
            self.patch_timeout,
            api.patch(&id.name, &params, &Patch::Merge(patch)),
        )
        .await??;
        Ok(())
    }
}

/// Sets the site and the placement annotation together.
///
/// The observed resource version is included so that the write fails with a
/// conflict if the Capp changed after it was read.
fn destination_patch(capp: &Capp, cluster: &str) -> serde_json::Value {
    let mut annotations = serde_json::Map::new();
    annotations.insert(PLACEMENT_ANNOTATION.to_string(), cluster.into());
    let mut metadata = serde_json::json!({ "annotations": annotations });
    if let Some(version) = capp.metadata.resource_version.as_deref() {
        metadata["resourceVersion"] = version.into();
    }

    serde_json::json!({
        "metadata": metadata,
        "spec": { "site": cluster },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::{CappSpec, ObjectMeta};
    use pretty_assertions::assert_eq;

    #[test]
    fn patch_sets_site_and_annotation() {
        let capp = Capp {
            metadata: ObjectMeta {
                name: Some("web".to_string()),
                namespace: Some("apps".to_string()),
                resource_version: Some("4121".to_string()),
                ..Default::default()
            },
            spec: CappSpec {
                site: Some("primary".to_string()),
            },
        };

        assert_eq!(
            destination_patch(&capp, "cluster-a"),
            serde_json::json!({
                "metadata": {
                    "annotations": { "rcs.dana.io/placement": "cluster-a" },
                    "resourceVersion": "4121",
                },
                "spec": { "site": "cluster-a" },
            })
        );
    }

    #[test]
    fn patch_without_resource_version() {
        let capp = Capp::new("web", CappSpec::default());

        assert_eq!(
            destination_patch(&capp, "east-1"),
            serde_json::json!({
                "metadata": {
                    "annotations": { "rcs.dana.io/placement": "east-1" },
                },
                "spec": { "site": "east-1" },
            })
        );
    }
}
