//! Pure electability predicate.
//!
//! Given a candidate and an immutable view of local state, decide whether to
//! refuse, grant, or abstain. The responder's transport-level checks (set
//! name, its own staleness in the elect path) stay outside; everything here
//! depends only on the supplied context, which keeps the veto rules directly
//! testable.

use std::time::Duration;

use tokio::time::Instant;

use crate::LogPosition;
use crate::MemberId;
use crate::PeerSnapshot;

/// Verdict on a candidacy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Authoritative "no"; the reason travels back to the candidate
    Veto(String),
    /// Yes, worth this responder's configured vote weight
    Grant(u32),
    /// Cannot judge; counts as a veto in the freshness phase and as a
    /// zero vote in the elect phase
    Abstain(String),
}

/// Immutable inputs for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub snapshot: &'a PeerSnapshot,
    /// Responder's own live log position
    pub live_position: LogPosition,
    pub now: Instant,
    pub freshness_window: Duration,
}

/// Evaluates `candidate_id`'s bid. Checks run in order; the first match
/// wins and supplies the reason string.
pub fn evaluate(
    candidate_id: MemberId,
    candidate_config_version: u64,
    cx: &EvaluationContext<'_>,
) -> Decision {
    let snapshot = cx.snapshot;

    // A responder holding an older config than the candidate cannot judge
    // membership-derived rules; defer rather than refuse with stale data.
    if snapshot.config.version < candidate_config_version {
        return Decision::Abstain("local config is stale".to_string());
    }

    let Some(candidate) = snapshot.config.member(candidate_id) else {
        return Decision::Veto("unknown candidate".to_string());
    };

    if candidate_config_version < snapshot.config.version {
        return Decision::Veto("stale config".to_string());
    }

    if let Some(primary) = snapshot.primary {
        if primary == snapshot.self_id {
            return Decision::Veto("already primary".to_string());
        }
        return Decision::Veto("other primary known".to_string());
    }

    if let Some(highest) = snapshot.most_electable(cx.now, cx.freshness_window, cx.live_position) {
        if highest.priority > candidate.priority {
            return Decision::Veto(format!("lower priority than {}", highest.fullname()));
        }
    }

    if !snapshot.is_electable(candidate_id, cx.now, cx.freshness_window) {
        return Decision::Veto("not electable".to_string());
    }

    match snapshot.self_member() {
        Some(me) => Decision::Grant(me.votes),
        None => Decision::Abstain("not a member of the configured set".to_string()),
    }
}
