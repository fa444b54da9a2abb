use crate::k8s::Capp;

/// A watch notification about a Capp.
#[derive(Clone, Debug, PartialEq)]
pub enum WorkloadEvent {
    Create(Capp),

    /// Carries the updated object.
    Update(Capp),

    /// Carries the last known state of the deleted object.
    Delete(Capp),
}

/// Decides which Capp events may enqueue a reconciliation.
pub trait EventFilter {
    fn admits(&self, event: &WorkloadEvent) -> bool;
}

/// Admits events only for Capps that have not been placed.
///
/// Once the placement annotation is written, no create, update or delete of
/// that Capp reaches the reconciler again.
#[derive(Copy, Clone, Debug, Default)]
pub struct Unplaced;

// === impl WorkloadEvent ===

impl WorkloadEvent {
    pub fn capp(&self) -> &Capp {
        match self {
            Self::Create(capp) | Self::Update(capp) | Self::Delete(capp) => capp,
        }
    }

    pub fn into_capp(self) -> Capp {
        match self {
            Self::Create(capp) | Self::Update(capp) | Self::Delete(capp) => capp,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }
}

// === impl Unplaced ===

impl EventFilter for Unplaced {
    fn admits(&self, event: &WorkloadEvent) -> bool {
        !event.capp().is_placed()
    }
}
