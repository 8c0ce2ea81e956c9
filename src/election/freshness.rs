//! Phase 1: the freshness poll.
//!
//! The candidate multicasts its live log position to every possibly-up
//! member (arbiters included) and collects freshness verdicts, vetoes, and
//! each responder's highest known primary epoch. Missing replies count as
//! "down" but do not by themselves fail the phase.

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::Decision;
use super::EvaluationContext;
use super::FreshnessRequest;
use super::FreshnessReply;
use super::FreshnessVerdict;
use super::ProceedInfo;
use super::evaluate;
use crate::ElectionError;
use crate::Error;
use crate::ReplContext;
use crate::Result;
use crate::TieBreakTimer;
use crate::TypeConfig;
use crate::membership::Peers;
use crate::network::Transport;
use crate::position::LogOracle;

/// Runs the freshness fan-out for the local candidate.
///
/// `slept_last` suppresses another tie-break sleep when this member already
/// lost the coin in the most recent attempt; `uptime` gates the warm-up
/// guard against electing over members that are mid-restart.
pub(crate) async fn run<T>(
    ctx: &ReplContext<T>,
    slept_last: bool,
    uptime: Duration,
) -> Result<FreshnessVerdict>
where
    T: TypeConfig,
{
    let snapshot = ctx.peers().snapshot();
    let me = snapshot
        .self_member()
        .ok_or_else(|| Error::Fatal(format!("node {} is not in the replica set config", ctx.node_id)))?;

    let our_position = ctx.log().live_position();
    let mut observed_hkp = ctx.epoch_store().get();

    let request = FreshnessRequest {
        set_name: snapshot.config.name.clone(),
        candidate: me.fullname().to_string(),
        candidate_id: ctx.node_id,
        config_version: snapshot.config.version,
        position: our_position,
    };

    let targets = snapshot.possibly_up_targets();
    debug!(
        "freshness poll at {} to {} possibly-up members",
        our_position,
        targets.len()
    );

    let result = ctx.transport().broadcast_freshness(targets, request).await?;

    let mut ok_ids: HashSet<u32> = HashSet::new();
    let mut tie_ids: BTreeSet<u32> = BTreeSet::new();
    let mut someone_fresher = false;
    let mut veto_reason: Option<String> = None;

    for (peer_id, response) in result.responses {
        match response {
            Ok(reply) => {
                ok_ids.insert(peer_id);
                if reply.fresher {
                    someone_fresher = true;
                } else {
                    debug_assert!(reply.position <= our_position);
                }
                if reply.veto && veto_reason.is_none() {
                    veto_reason =
                        Some(reply.veto_reason.unwrap_or_else(|| "no reason given".to_string()));
                }
                if reply.position == our_position {
                    tie_ids.insert(peer_id);
                }
                observed_hkp = observed_hkp.max(reply.highest_known_primary);
            }
            Err(e) => {
                debug!("freshness reply from member {} failed: {:?}", peer_id, e);
            }
        }
    }

    if someone_fresher {
        info!("not electing self, we are not freshest");
        return Ok(FreshnessVerdict::Abort(ElectionError::NotFreshest));
    }
    if let Some(reason) = veto_reason {
        info!("not electing self, a member would veto with '{}'", reason);
        return Ok(FreshnessVerdict::Abort(ElectionError::Vetoed { reason }));
    }

    let all_up = snapshot
        .config
        .voting_members()
        .filter(|m| m.id != ctx.node_id)
        .all(|m| ok_ids.contains(&m.id));

    if !all_up && uptime < ctx.node_config.election.warmup_window() {
        // If a group of nodes bounced at once, rather stay offline a little
        // longer than elect over members that are still coming back.
        info!("not electing self, not all members up and we have been up less than the warm-up window");
        return Ok(FreshnessVerdict::Abort(ElectionError::NotAllMembersUp));
    }

    if let Some(&lowest_tied) = tie_ids.iter().next() {
        if ctx.node_id < lowest_tied {
            debug!("tied with {} members but we hold the lowest id", tie_ids.len());
        } else if slept_last {
            debug!("tied again after sleeping; proceeding without another back-off");
        } else {
            let timer = TieBreakTimer::new(ctx.node_config.election.tie_sleep_range());
            let delay = timer.delay();
            warn!(
                "tie with {} member(s) at {}, sleeping {}ms before retrying",
                tie_ids.len(),
                our_position,
                delay.as_millis()
            );
            return Ok(FreshnessVerdict::MustSleep(delay));
        }
    }

    Ok(FreshnessVerdict::Proceed(ProceedInfo {
        tie_count: tie_ids.len(),
        all_up,
        observed_highest_known_primary: observed_hkp,
    }))
}

/// Answers an incoming freshness query.
pub(crate) fn respond<T>(
    ctx: &ReplContext<T>,
    request: &FreshnessRequest,
) -> Result<FreshnessReply>
where
    T: TypeConfig,
{
    let snapshot = ctx.peers().snapshot();
    if request.set_name != snapshot.config.name {
        warn!(
            "freshness query for set '{}' but our set name is '{}'",
            request.set_name, snapshot.config.name
        );
        return Err(ElectionError::WrongSetName {
            expected: snapshot.config.name.clone(),
            got: request.set_name.clone(),
        }
        .into());
    }

    let our_position = ctx.log().live_position();
    // Not only our own position: any third member we have heard from can
    // make the candidate stale.
    let fresher =
        request.position < our_position || request.position < snapshot.last_other_position();
    if fresher {
        info!(
            "we are fresher than candidate {}: candidate at {}, we are at {}, best other {}",
            request.candidate,
            request.position,
            our_position,
            snapshot.last_other_position()
        );
    }

    let decision = evaluate(
        request.candidate_id,
        request.config_version,
        &EvaluationContext {
            snapshot: &snapshot,
            live_position: our_position,
            now: Instant::now(),
            freshness_window: ctx.node_config.election.freshness_window(),
        },
    );
    let (veto, veto_reason) = match decision {
        Decision::Grant(_) => (false, None),
        Decision::Veto(reason) | Decision::Abstain(reason) => (true, Some(reason)),
    };

    let highest_known_primary =
        ctx.epoch_store().get().max(snapshot.highest_known_primary_across_set());

    Ok(FreshnessReply {
        position: our_position,
        fresher,
        veto,
        veto_reason,
        highest_known_primary,
    })
}
