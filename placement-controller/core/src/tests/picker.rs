use super::*;
use crate::picker::{pick, select_cluster, Decision};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn picks_from_default_placement() {
    let api = FakeApi::shared().with_placement("primary", &[&["cluster-a"]]);

    let decision = pick(&*api, &placements(&["primary"]), &capp("web", None))
        .await
        .unwrap();

    assert_eq!(decision, Decision::Resolved("cluster-a".to_string()));
    assert_eq!(
        api.calls(),
        vec![
            Call::GetPlacement(ResourceId::new(PLACEMENTS_NS, "primary")),
            Call::ListDecisions(ResourceId::new(PLACEMENTS_NS, "primary")),
        ]
    );
}

#[tokio::test]
async fn empty_decisions_requeue() {
    let api = FakeApi::shared().with_placement("primary", &[]);

    let decision = pick(&*api, &placements(&["primary"]), &capp("web", None))
        .await
        .unwrap();

    assert_eq!(decision, Decision::Requeue);
}

#[tokio::test]
async fn multiple_candidates_are_deterministic() {
    let api = FakeApi::shared().with_placement(
        "primary",
        &[&["cluster-b", "cluster-c"], &["cluster-a"]],
    );
    let placements = placements(&["primary"]);

    let first = pick(&*api, &placements, &capp("web", None)).await.unwrap();
    let second = pick(&*api, &placements, &capp("web", None)).await.unwrap();

    assert_eq!(first, Decision::Resolved("cluster-b".to_string()));
    assert_eq!(first, second);
}

#[test]
fn selects_by_decision_name_then_listed_order() {
    let decisions = vec![
        decision("primary-decision-2", &["cluster-z"]),
        decision("primary-decision-1", &["", "cluster-y", "cluster-x"]),
    ];
    assert_eq!(select_cluster(decisions), Some("cluster-y".to_string()));
}

#[test]
fn skips_decisions_without_status() {
    let mut pending = decision("primary-decision-1", &[]);
    pending.status = None;
    let decisions = vec![pending, decision("primary-decision-2", &["cluster-a"])];
    assert_eq!(select_cluster(decisions), Some("cluster-a".to_string()));
}

#[test]
fn nothing_to_select() {
    assert_eq!(select_cluster(vec![]), None);
    assert_eq!(
        select_cluster(vec![decision("primary-decision-1", &["", ""])]),
        None
    );
}
