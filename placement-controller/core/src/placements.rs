use crate::k8s::ResourceId;

/// The Placements a Capp may reference, in priority order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placements {
    // Never empty; the first entry is the default.
    names: Vec<String>,
    namespace: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("at least one placement name must be configured")]
pub struct InvalidPlacements(());

// === impl Placements ===

impl Placements {
    /// Empty names are ignored.
    pub fn new<I, S>(names: I, namespace: impl Into<String>) -> Result<Self, InvalidPlacements>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| !name.is_empty())
            .collect::<Vec<_>>();
        if names.is_empty() {
            return Err(InvalidPlacements(()));
        }

        Ok(Self {
            names,
            namespace: namespace.into(),
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn default_name(&self) -> &str {
        &self.names[0]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// A site still needs a decision when it is unset or names a Placement.
    /// Any other value is taken to be a managed cluster.
    pub fn is_unresolved(&self, site: &str) -> bool {
        site.is_empty() || self.contains(site)
    }

    /// The Placement consulted for `site`.
    pub fn effective(&self, site: &str) -> ResourceId {
        let name = if site.is_empty() {
            self.default_name()
        } else {
            site
        };
        ResourceId::new(&self.namespace, name)
    }
}
