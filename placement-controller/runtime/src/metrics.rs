use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

#[derive(Clone, Debug)]
pub(crate) struct ControllerMetrics {
    reconciles: Family<OutcomeLabels, Counter>,
    events: Family<EventLabels, Counter>,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct OutcomeLabels {
    outcome: &'static str,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct EventLabels {
    kind: &'static str,
    admitted: &'static str,
}

// === impl ControllerMetrics ===

impl ControllerMetrics {
    pub(crate) fn register(reg: &mut Registry) -> Self {
        let reconciles = Family::default();
        reg.register(
            "reconciles",
            "Count of Capp reconciliations by outcome",
            reconciles.clone(),
        );

        let events = Family::default();
        reg.register(
            "events",
            "Count of Capp watch events by kind and whether they were admitted",
            events.clone(),
        );

        Self { reconciles, events }
    }

    pub(crate) fn reconciled(&self, outcome: &'static str) {
        self.reconciles.get_or_create(&OutcomeLabels { outcome }).inc();
    }

    pub(crate) fn event(&self, kind: &'static str, admitted: bool) {
        let admitted = if admitted { "true" } else { "false" };
        self.events
            .get_or_create(&EventLabels { kind, admitted })
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus_client::encoding::text::encode;

    #[test]
    fn encodes_counters() {
        let mut registry = Registry::with_prefix("placement");
        let metrics = ControllerMetrics::register(&mut registry);
        metrics.reconciled("placed");
        metrics.reconciled("placed");
        metrics.reconciled("requeue");
        metrics.event("update", false);

        let mut text = String::new();
        encode(&mut text, &registry).unwrap();

        assert!(text.contains(r#"placement_reconciles_total{outcome="placed"} 2"#));
        assert!(text.contains(r#"placement_reconciles_total{outcome="requeue"} 1"#));
        assert!(text.contains(r#"placement_events_total{kind="update",admitted="false"} 1"#));
    }
}
