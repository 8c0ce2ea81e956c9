//! Coordinator-level tests: the end-to-end election scenarios, tie-induced
//! retries, step-down holds, and candidacy preconditions.

use std::time::Duration;

use mockall::predicate::eq;
use tokio::time::Instant;
use tracing_test::traced_test;

use super::ElectReply;
use super::ElectionCoordinator;
use super::ElectionCore;
use super::ElectionOutcome;
use super::FreshnessReply;
use crate::ConsensusError;
use crate::ElectResult;
use crate::ElectionError;
use crate::Error;
use crate::FreshnessResult;
use crate::LogPosition;
use crate::MemberId;
use crate::MockRoleTransition;
use crate::MockTransport;
use crate::PeerSnapshot;
use crate::test_utils::arbiter;
use crate::test_utils::fixed_log;
use crate::test_utils::fixed_peers;
use crate::test_utils::hb_up;
use crate::test_utils::member;
use crate::test_utils::mock_context;
use crate::test_utils::pos;
use crate::test_utils::set_config;
use crate::test_utils::snapshot_with;

// ============================================================================
// Helper Functions
// ============================================================================

fn three_member_snapshot(
    self_id: MemberId,
    position: LogPosition,
) -> PeerSnapshot {
    let config = set_config(1, vec![member(1), member(2), member(3)]);
    let hbs = [1, 2, 3]
        .into_iter()
        .filter(|id| *id != self_id)
        .map(|id| (id, hb_up(position, 0)))
        .collect();
    snapshot_with(config, self_id, hbs, None)
}

fn ok_freshness(
    position: LogPosition,
    fresher: bool,
) -> FreshnessReply {
    FreshnessReply {
        position,
        fresher,
        veto: false,
        veto_reason: None,
        highest_known_primary: 0,
    }
}

fn veto_freshness(reason: &str) -> FreshnessReply {
    FreshnessReply {
        position: LogPosition::ZERO,
        fresher: false,
        veto: true,
        veto_reason: Some(reason.to_string()),
        highest_known_primary: 0,
    }
}

fn assert_election_err(
    result: crate::Result<ElectionOutcome>,
    matcher: impl Fn(&ElectionError) -> bool,
) {
    match result {
        Err(Error::Consensus(ConsensusError::Election(e))) if matcher(&e) => {}
        other => panic!("unexpected election result: {other:?}"),
    }
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

/// Test: clean election
///
/// Scenario: members {1,2,3}, one vote each, all up, positions all equal.
/// Member 1 polls, ties with both peers, holds the lowest id, proceeds
/// without sleeping, and wins the vote 3 of 3 at epoch 1.
#[tokio::test]
async fn test_elect_self_clean_election() {
    let position = pos(0, 100);

    let mut transport = MockTransport::new();
    transport.expect_broadcast_freshness().times(1).returning(move |_, _| {
        Ok(FreshnessResult {
            responses: vec![
                (2, Ok(ok_freshness(position, false))),
                (3, Ok(ok_freshness(position, false))),
            ],
        })
    });
    transport.expect_broadcast_elect().times(1).returning(|_, request| {
        assert_eq!(request.proposed_epoch, Some(1));
        let grant = |id| {
            (
                id,
                Ok(ElectReply {
                    vote: 1,
                    round: request.round,
                }),
            )
        };
        Ok(ElectResult {
            responses: vec![grant(2), grant(3)],
        })
    });

    let mut transition = MockRoleTransition::new();
    transition.expect_assume_primary().with(eq(1)).times(1).returning(|_| true);

    let ctx = mock_context(
        1,
        fixed_log(position),
        fixed_peers(three_member_snapshot(1, position)),
        transport,
        transition,
    );

    let mut coordinator = ElectionCoordinator::new(1);
    let outcome = coordinator.elect_self(&ctx).await.unwrap();
    assert_eq!(outcome, ElectionOutcome::Won { epoch: 1 });
    assert_eq!(ctx.epoch_store().get(), 1);
}

/// Test: a tying member without the lowest id sleeps, retries, and loses
/// gracefully once a peer got ahead
///
/// Scenario: member 2 ties with member 1, backs off for the jitter
/// interval, reruns the freshness poll from scratch, and finds member 1
/// fresher (it won in the meantime).
#[tokio::test(start_paused = true)]
async fn test_elect_self_sleeps_on_tie_then_retries() {
    let position = pos(0, 100);

    let mut transport = MockTransport::new();
    let mut polls = 0u32;
    transport.expect_broadcast_freshness().times(2).returning(move |_, _| {
        polls += 1;
        let first = polls == 1;
        Ok(FreshnessResult {
            responses: vec![
                (1, Ok(ok_freshness(position, !first))),
                (3, Ok(ok_freshness(pos(0, 90), false))),
            ],
        })
    });

    let ctx = mock_context(
        2,
        fixed_log(position),
        fixed_peers(three_member_snapshot(2, position)),
        transport,
        MockRoleTransition::new(),
    );

    let mut coordinator = ElectionCoordinator::new(2);
    let before = Instant::now();
    let result = coordinator.elect_self(&ctx).await;
    assert_election_err(result, |e| matches!(e, ElectionError::NotFreshest));
    assert!(
        before.elapsed() >= Duration::from_millis(50),
        "the tie back-off must actually elapse before the retry"
    );
}

/// Test: priority veto travels through the whole attempt
///
/// Scenario: member 3 would veto member 1's bid because member 2 carries a
/// higher priority.
#[tokio::test]
async fn test_elect_self_aborts_on_priority_veto() {
    let position = pos(0, 100);
    let mut transport = MockTransport::new();
    transport.expect_broadcast_freshness().times(1).returning(move |_, _| {
        Ok(FreshnessResult {
            responses: vec![
                (2, Ok(ok_freshness(pos(0, 90), false))),
                (3, Ok(veto_freshness("lower priority than db2.example.net:27017"))),
            ],
        })
    });

    let ctx = mock_context(
        1,
        fixed_log(position),
        fixed_peers(three_member_snapshot(1, position)),
        transport,
        MockRoleTransition::new(),
    );

    let mut coordinator = ElectionCoordinator::new(1);
    assert_election_err(coordinator.elect_self(&ctx).await, |e| {
        matches!(e, ElectionError::Vetoed { reason } if reason.contains("lower priority"))
    });
}

// ============================================================================
// Preconditions and holds
// ============================================================================

/// Test: a voluntary step-down holds elections off until the hold expires
#[tokio::test(start_paused = true)]
async fn test_elect_self_holds_off_after_step_down() {
    let position = pos(0, 100);
    let mut transport = MockTransport::new();
    transport.expect_broadcast_freshness().times(1).returning(move |_, _| {
        Ok(FreshnessResult {
            responses: vec![(2, Ok(veto_freshness("other primary known")))],
        })
    });

    let ctx = mock_context(
        1,
        fixed_log(position),
        fixed_peers(three_member_snapshot(1, position)),
        transport,
        MockRoleTransition::new(),
    );

    let mut coordinator = ElectionCoordinator::new(1);
    coordinator.step_down(Duration::from_secs(60));

    let outcome = coordinator.elect_self(&ctx).await.unwrap();
    assert_eq!(outcome, ElectionOutcome::HoldOff, "no peer contact during the hold");

    tokio::time::advance(Duration::from_secs(61)).await;
    assert_election_err(coordinator.elect_self(&ctx).await, |e| {
        matches!(e, ElectionError::Vetoed { .. })
    });
}

/// Test: arbiters and delayed members never enter the freshness phase
#[tokio::test]
async fn test_elect_self_rejects_ineligible_self() {
    let position = pos(0, 100);

    let config = set_config(1, vec![arbiter(1), member(2), member(3)]);
    let snapshot = snapshot_with(config, 1, vec![], None);
    let ctx = mock_context(
        1,
        fixed_log(position),
        fixed_peers(snapshot),
        MockTransport::new(),
        MockRoleTransition::new(),
    );
    let mut coordinator = ElectionCoordinator::new(1);
    assert_election_err(coordinator.elect_self(&ctx).await, |e| {
        matches!(e, ElectionError::Ineligible(_))
    });

    let mut delayed = member(1);
    delayed.slave_delay = 3600;
    let config = set_config(1, vec![delayed, member(2), member(3)]);
    let snapshot = snapshot_with(config, 1, vec![], None);
    let ctx = mock_context(
        1,
        fixed_log(position),
        fixed_peers(snapshot),
        MockTransport::new(),
        MockRoleTransition::new(),
    );
    let mut coordinator = ElectionCoordinator::new(1);
    assert_election_err(coordinator.elect_self(&ctx).await, |e| {
        matches!(e, ElectionError::Ineligible(_))
    });
}

/// Test: both responder handlers answer through the trait surface
#[tokio::test]
async fn test_responder_handlers_answer_in_place() {
    let position = pos(0, 100);
    let ctx = mock_context(
        2,
        fixed_log(position),
        fixed_peers(three_member_snapshot(2, position)),
        MockTransport::new(),
        MockRoleTransition::new(),
    );
    let coordinator = ElectionCoordinator::new(2);

    let request = crate::FreshnessRequest {
        set_name: "rs0".into(),
        candidate: "db1.example.net:27017".into(),
        candidate_id: 1,
        config_version: 1,
        position,
    };
    let reply = coordinator.handle_freshness_request(&ctx, request).await.unwrap();
    assert!(!reply.fresher);
    assert!(!reply.veto);

    let request = crate::ElectRequest {
        set_name: "rs0".into(),
        candidate: "db1.example.net:27017".into(),
        candidate_id: 1,
        config_version: 1,
        round: crate::RoundId::new(),
        proposed_epoch: Some(1),
        position,
    };
    let reply = coordinator.handle_elect_request(&ctx, request).await.unwrap();
    assert_eq!(reply.vote, 1);
}

/// Test: the even-vote-total warning fires once per coordinator lifetime
#[tokio::test]
#[traced_test]
async fn test_even_vote_total_warned_once() {
    let position = pos(0, 100);
    let config = set_config(1, vec![member(1), member(2), member(3), member(4)]);
    let snapshot = snapshot_with(
        config,
        1,
        vec![(2, hb_up(position, 0))],
        None,
    );

    let mut transport = MockTransport::new();
    transport.expect_broadcast_freshness().times(2).returning(move |_, _| {
        Ok(FreshnessResult {
            responses: vec![(2, Ok(veto_freshness("other primary known")))],
        })
    });

    let ctx = mock_context(
        1,
        fixed_log(position),
        fixed_peers(snapshot),
        transport,
        MockRoleTransition::new(),
    );

    let mut coordinator = ElectionCoordinator::new(1);
    let _ = coordinator.elect_self(&ctx).await;
    let _ = coordinator.elect_self(&ctx).await;

    logs_assert(|lines: &[&str]| {
        let hits = lines.iter().filter(|l| l.contains("total number of votes is even")).count();
        if hits == 1 {
            Ok(())
        } else {
            Err(format!("expected exactly one even-vote warning, saw {hits}"))
        }
    });
}
