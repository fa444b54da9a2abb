use crate::{
    core::{EventFilter, WorkloadEvent},
    k8s::Capp,
    metrics::ControllerMetrics,
};
use ahash::AHashSet as HashSet;
use futures::prelude::*;
use kube::runtime::{
    reflector::{store::Writer, ObjectRef},
    watcher,
};

/// Turns watcher events into create/update/delete events.
///
/// Every event is also applied to the reflector store the controller reads
/// from, so a Capp is always in the store before it is enqueued.
pub(crate) struct Classifier {
    writer: Writer<Capp>,
    known: HashSet<ObjectRef<Capp>>,
    relisted: HashSet<ObjectRef<Capp>>,
}

/// Classifies `events`, applies `filter`, and yields the admitted Capps.
///
/// `retire` is invoked for every Capp that will not be reconciled again on
/// account of this event: deletions and events the filter rejects.
pub(crate) fn admitted<S, F, R>(
    events: S,
    writer: Writer<Capp>,
    filter: F,
    metrics: ControllerMetrics,
    mut retire: R,
) -> impl Stream<Item = Result<Capp, watcher::Error>> + Send + 'static
where
    S: Stream<Item = watcher::Event<Capp>> + Send + 'static,
    F: EventFilter + Send + 'static,
    R: FnMut(&Capp) + Send + 'static,
{
    let mut classifier = Classifier::new(writer);
    events.filter_map(move |event| {
        let capp = classifier.classify(event).and_then(|event| {
            let admitted = filter.admits(&event);
            metrics.event(event.kind(), admitted);
            if !admitted || matches!(event, WorkloadEvent::Delete(_)) {
                retire(event.capp());
            }
            if !admitted {
                tracing::trace!(kind = event.kind(), "Ignoring placed Capp");
                return None;
            }
            Some(event.into_capp())
        });
        future::ready(capp.map(Ok))
    })
}

// === impl Classifier ===

impl Classifier {
    pub(crate) fn new(writer: Writer<Capp>) -> Self {
        Self {
            writer,
            known: HashSet::new(),
            relisted: HashSet::new(),
        }
    }

    pub(crate) fn classify(&mut self, event: watcher::Event<Capp>) -> Option<WorkloadEvent> {
        self.writer.apply_watcher_event(&event);

        match event {
            watcher::Event::Init => {
                self.relisted.clear();
                None
            }
            watcher::Event::InitApply(capp) => {
                self.relisted.insert(ObjectRef::from_obj(&capp));
                Some(self.applied(capp))
            }
            watcher::Event::InitDone => {
                // Objects missing from the relist were deleted while the
                // watch was down.
                self.known = std::mem::take(&mut self.relisted);
                None
            }
            watcher::Event::Apply(capp) => Some(self.applied(capp)),
            watcher::Event::Delete(capp) => {
                self.known.remove(&ObjectRef::from_obj(&capp));
                Some(WorkloadEvent::Delete(capp))
            }
        }
    }

    fn applied(&mut self, capp: Capp) -> WorkloadEvent {
        if self.known.insert(ObjectRef::from_obj(&capp)) {
            WorkloadEvent::Create(capp)
        } else {
            WorkloadEvent::Update(capp)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::Unplaced,
        k8s::{CappSpec, ObjectMeta, ResourceExt, PLACEMENT_ANNOTATION},
    };
    use kube::runtime::reflector;
    use parking_lot::Mutex;
    use prometheus_client::registry::Registry;
    use std::sync::Arc;

    fn capp(name: &str, placed: Option<&str>) -> Capp {
        Capp {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("apps".to_string()),
                annotations: placed.map(|cluster| {
                    [(PLACEMENT_ANNOTATION.to_string(), cluster.to_string())]
                        .into_iter()
                        .collect()
                }),
                ..Default::default()
            },
            spec: CappSpec::default(),
        }
    }

    fn kinds(classifier: &mut Classifier, events: Vec<watcher::Event<Capp>>) -> Vec<&'static str> {
        events
            .into_iter()
            .filter_map(|event| classifier.classify(event))
            .map(|event| event.kind())
            .collect()
    }

    #[test]
    fn classifies_watch_events() {
        let (_, writer) = reflector::store();
        let mut classifier = Classifier::new(writer);

        let kinds = kinds(
            &mut classifier,
            vec![
                watcher::Event::Init,
                watcher::Event::InitApply(capp("web", None)),
                watcher::Event::InitDone,
                watcher::Event::Apply(capp("web", None)),
                watcher::Event::Apply(capp("api", None)),
                watcher::Event::Delete(capp("web", None)),
                watcher::Event::Apply(capp("web", None)),
            ],
        );

        assert_eq!(kinds, ["create", "update", "create", "delete", "create"]);
    }

    #[test]
    fn relist_forgets_vanished_capps() {
        let (_, writer) = reflector::store();
        let mut classifier = Classifier::new(writer);

        let kinds = kinds(
            &mut classifier,
            vec![
                watcher::Event::Apply(capp("web", None)),
                watcher::Event::Apply(capp("api", None)),
                watcher::Event::Init,
                watcher::Event::InitApply(capp("api", None)),
                watcher::Event::InitDone,
                watcher::Event::Apply(capp("web", None)),
                watcher::Event::Apply(capp("api", None)),
            ],
        );

        assert_eq!(kinds, ["create", "create", "update", "create", "update"]);
    }

    #[test]
    fn classified_capps_reach_the_store() {
        let (store, writer) = reflector::store();
        let mut classifier = Classifier::new(writer);

        classifier.classify(watcher::Event::Apply(capp("web", None)));
        assert!(store.get(&ObjectRef::new("web").within("apps")).is_some());

        classifier.classify(watcher::Event::Delete(capp("web", None)));
        assert!(store.get(&ObjectRef::new("web").within("apps")).is_none());
    }

    #[tokio::test]
    async fn only_unplaced_capps_are_admitted() {
        let (_, writer) = reflector::store();
        let metrics = ControllerMetrics::register(&mut Registry::default());
        let events = stream::iter(vec![
            watcher::Event::Apply(capp("web", None)),
            watcher::Event::Apply(capp("api", Some("east-1"))),
            watcher::Event::Delete(capp("db", Some("east-1"))),
            watcher::Event::Delete(capp("web", None)),
        ]);

        let names = admitted(events, writer, Unplaced, metrics, |_: &Capp| {})
            .map(|capp| capp.expect("admitted stream never fails").metadata.name)
            .collect::<Vec<_>>()
            .await;

        assert_eq!(names, [Some("web".to_string()), Some("web".to_string())]);
    }

    #[tokio::test]
    async fn deleted_and_placed_capps_are_retired() {
        let (_, writer) = reflector::store();
        let metrics = ControllerMetrics::register(&mut Registry::default());
        let events = stream::iter(vec![
            watcher::Event::Apply(capp("web", None)),
            watcher::Event::Apply(capp("api", Some("east-1"))),
            watcher::Event::Apply(capp("db", None)),
            watcher::Event::Delete(capp("db", None)),
        ]);

        let retired = Arc::new(Mutex::new(Vec::new()));
        let admitted_names = admitted(events, writer, Unplaced, metrics, {
            let retired = retired.clone();
            move |capp: &Capp| retired.lock().push(capp.name_any())
        })
        .map(|capp| capp.expect("admitted stream never fails").name_any())
        .collect::<Vec<_>>()
        .await;

        assert_eq!(admitted_names, ["web", "db", "db"]);
        assert_eq!(*retired.lock(), ["api", "db"]);
    }
}
