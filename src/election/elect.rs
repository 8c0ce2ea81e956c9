//! Phase 2: the vote proper.
//!
//! The candidate proposes `observed_hkp + 1` as the next primary epoch and
//! multicasts an elect request. Responders grant their configured vote
//! weight only if the pure evaluator approves and the local epoch store
//! accepts the proposed epoch; a veto is a large negative vote that sinks
//! any tally.

use tokio::time::Instant;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::Decision;
use super::ElectReply;
use super::ElectRequest;
use super::EvaluationContext;
use super::ProceedInfo;
use super::RoundId;
use super::VETO_VOTE;
use super::evaluate;
use crate::ElectionError;
use crate::Error;
use crate::ReplContext;
use crate::Result;
use crate::TypeConfig;
use crate::is_vote_majority;
use crate::membership::Peers;
use crate::network::Transport;
use crate::position::LogOracle;
use crate::transition::RoleTransition;

/// Runs the elect fan-out and, on a winning tally, commits the new epoch
/// and invokes the assume-primary step. Returns the epoch on success.
pub(crate) async fn run<T>(
    ctx: &ReplContext<T>,
    proceed: &ProceedInfo,
) -> Result<u64>
where
    T: TypeConfig,
{
    let started = Instant::now();
    let snapshot = ctx.peers().snapshot();
    let me = snapshot
        .self_member()
        .ok_or_else(|| Error::Fatal(format!("node {} is not in the replica set config", ctx.node_id)))?;

    let snapshot_version = snapshot.config.version;
    let total_votes = snapshot.config.total_votes();
    let proposed_epoch = proceed.observed_highest_known_primary + 1;
    let position = ctx.log().live_position();
    let round = RoundId::new();

    info!(
        "electing self ({}) at epoch {}, round {}",
        ctx.node_id, proposed_epoch, round
    );

    let request = ElectRequest {
        set_name: snapshot.config.name.clone(),
        candidate: me.fullname().to_string(),
        candidate_id: ctx.node_id,
        config_version: snapshot_version,
        round,
        proposed_epoch: Some(proposed_epoch),
        position,
    };

    // own yea
    let mut tally = i64::from(me.votes);

    let targets = snapshot.possibly_up_targets();
    let result = ctx.transport().broadcast_elect(targets, request).await?;

    for (peer_id, response) in result.responses {
        match response {
            Ok(reply) => {
                if reply.round != round {
                    warn!(
                        "dropping elect reply from member {}: round {} does not match {}",
                        peer_id, reply.round, round
                    );
                    continue;
                }
                debug!("elect reply from member {}: vote {}", peer_id, reply.vote);
                tally += i64::from(reply.vote);
            }
            Err(e) => {
                debug!("elect reply from member {} failed: {:?}", peer_id, e);
            }
        }
    }

    if !is_vote_majority(tally, total_votes) {
        warn!(
            "couldn't elect self, only received {} of {} votes",
            tally, total_votes
        );
        return Err(ElectionError::InsufficientVotes { tally, total_votes }.into());
    }

    let limit = ctx.node_config.election.election_time_limit();
    if started.elapsed() > limit {
        warn!("too much time passed during our election, ignoring result");
        return Err(ElectionError::Timeout { limit }.into());
    }

    let current_version = ctx.peers().snapshot().config.version;
    if current_version != snapshot_version {
        warn!("config version changed during our election, ignoring result");
        return Err(ElectionError::ConfigChanged {
            snapshot_version,
            current_version,
        }
        .into());
    }

    if !ctx.epoch_store().propose(proposed_epoch, ctx.node_id, position) {
        warn!(
            "could not accept {} as a primary epoch, another election likely snuck in",
            proposed_epoch
        );
        return Err(ElectionError::EpochRejected {
            epoch: proposed_epoch,
        }
        .into());
    }

    info!("election succeeded, assuming primary role at epoch {}", proposed_epoch);
    if !ctx.transition().assume_primary(proposed_epoch).await {
        warn!("tried to assume primary and failed");
        return Err(ElectionError::AssumePrimaryFailed {
            epoch: proposed_epoch,
        }
        .into());
    }

    Ok(proposed_epoch)
}

/// Answers an incoming elect request. Never fails: a responder that cannot
/// affirm replies with a zero vote.
pub(crate) fn respond<T>(
    ctx: &ReplContext<T>,
    request: &ElectRequest,
) -> ElectReply
where
    T: TypeConfig,
{
    debug!("received elect request: {:?}", request);
    let snapshot = ctx.peers().snapshot();

    let mut vote = 0;
    if request.set_name != snapshot.config.name {
        warn!(
            "received an elect request for '{}' but our set name is '{}'",
            request.set_name, snapshot.config.name
        );
    } else if snapshot.config.version < request.config_version {
        // we are stale; don't affirm, don't veto
        debug!(
            "not voting, our config version {} is behind the candidate's {}",
            snapshot.config.version, request.config_version
        );
    } else {
        let decision = evaluate(
            request.candidate_id,
            request.config_version,
            &EvaluationContext {
                snapshot: &snapshot,
                live_position: ctx.log().live_position(),
                now: Instant::now(),
                freshness_window: ctx.node_config.election.freshness_window(),
            },
        );
        match decision {
            Decision::Veto(reason) => {
                info!("election vetoed with: {}", reason);
                vote = VETO_VOTE;
            }
            Decision::Abstain(reason) => {
                info!("not voting: {}", reason);
            }
            Decision::Grant(weight) => match request.proposed_epoch {
                Some(epoch) => {
                    if ctx.epoch_store().propose(epoch, request.candidate_id, request.position) {
                        info!(
                            "voting yea for {} ({}) at epoch {}",
                            request.candidate, request.candidate_id, epoch
                        );
                        vote = weight as i32;
                    } else {
                        info!(
                            "due to bad possible primary epoch {}, did NOT vote yea for {} ({})",
                            epoch, request.candidate, request.candidate_id
                        );
                    }
                }
                None => {
                    // peer from an older revision that predates the epoch rule
                    info!(
                        "voting yea for {} ({}) on the legacy path",
                        request.candidate, request.candidate_id
                    );
                    vote = weight as i32;
                }
            },
        }
    }

    ElectReply {
        vote,
        round: request.round,
    }
}
