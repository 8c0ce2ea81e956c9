use std::fmt::Debug;
use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio::time::sleep;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::ElectReply;
use super::ElectRequest;
use super::ElectionCore;
use super::ElectionOutcome;
use super::FreshnessRequest;
use super::FreshnessReply;
use super::FreshnessVerdict;
use super::elect;
use super::freshness;
use crate::ConsensusError;
use crate::ElectionError;
use crate::Error;
use crate::MemberId;
use crate::ReplContext;
use crate::Result;
use crate::TypeConfig;
use crate::membership::Peers;

/// Drives the two election phases for the local node.
///
/// Logically single-threaded: at most one coordinator is active per replica
/// set on a given node. The only suspension points are the two joined
/// fan-outs and the tie-break sleep; no set-wide lock is held across any of
/// them (the coordinator works exclusively on snapshots).
///
/// ```text
/// IDLE --trigger--> FRESH --abort--> IDLE
///                   FRESH --proceed--> ELECT --fail--> IDLE
///                                      ELECT --success--> PRIMARY
///                   FRESH --tie, must sleep--> SLEEP --wake--> FRESH
/// ```
pub struct ElectionCoordinator<T>
where
    T: TypeConfig,
{
    my_id: MemberId,
    /// Set when this member lost the tie coin in the most recent attempt;
    /// the next tie skips the sleep so exactly one loser cannot starve.
    slept_last: bool,
    /// A voluntarily relinquished node refuses to seek election until here.
    stepped_down_until: Option<Instant>,
    /// One-shot guard for the even-vote-total warning.
    warned_even_votes: bool,
    started_at: Instant,
    _marker: PhantomData<T>,
}

impl<T> ElectionCoordinator<T>
where
    T: TypeConfig,
{
    pub fn new(my_id: MemberId) -> Self {
        Self {
            my_id,
            slept_last: false,
            stepped_down_until: None,
            warned_even_votes: false,
            started_at: Instant::now(),
            _marker: PhantomData,
        }
    }

    /// One full attempt: freshness (with at most one tie-induced retry),
    /// then the vote fan-out.
    async fn run_attempt(
        &mut self,
        ctx: &ReplContext<T>,
    ) -> Result<ElectionOutcome> {
        let snapshot = ctx.peers().snapshot();
        let me = snapshot.self_member().ok_or(ElectionError::Ineligible(
            "node is not in the replica set config",
        ))?;
        if me.arbiter_only {
            return Err(ElectionError::Ineligible("arbiters cannot seek election").into());
        }
        if me.slave_delay > 0 {
            return Err(ElectionError::Ineligible("delayed members cannot seek election").into());
        }

        if let Some(until) = self.stepped_down_until {
            if Instant::now() < until {
                debug!("not seeking election, stepped down until {:?}", until);
                return Ok(ElectionOutcome::HoldOff);
            }
        }

        let total_votes = snapshot.config.total_votes();
        if total_votes % 2 == 0 && total_votes > 0 && !self.warned_even_votes {
            warn!(
                "total number of votes is even - add arbiter or give one member an extra vote"
            );
            self.warned_even_votes = true;
        }
        drop(snapshot);

        let proceed = loop {
            match freshness::run(ctx, self.slept_last, self.started_at.elapsed()).await? {
                FreshnessVerdict::Abort(reason) => {
                    return Err(reason.into());
                }
                FreshnessVerdict::MustSleep(delay) => {
                    self.slept_last = true;
                    sleep(delay).await;
                    debug!("retrying freshness poll after tie sleep");
                }
                FreshnessVerdict::Proceed(info) => {
                    self.slept_last = false;
                    break info;
                }
            }
        };

        let epoch = elect::run(ctx, &proceed).await?;
        Ok(ElectionOutcome::Won { epoch })
    }
}

#[async_trait]
impl<T> ElectionCore<T> for ElectionCoordinator<T>
where
    T: TypeConfig,
{
    async fn elect_self(
        &mut self,
        ctx: &ReplContext<T>,
    ) -> Result<ElectionOutcome> {
        match self.run_attempt(ctx).await {
            Ok(outcome) => {
                if let ElectionOutcome::Won { epoch } = outcome {
                    info!("node {} is primary at epoch {}", self.my_id, epoch);
                }
                Ok(outcome)
            }
            Err(e @ Error::Consensus(ConsensusError::Election(_))) => {
                // already logged with its reason at the point of failure
                Err(e)
            }
            Err(e) => {
                warn!("caught unexpected error in elect_self: {:?}", e);
                Err(e)
            }
        }
    }

    async fn handle_freshness_request(
        &self,
        ctx: &ReplContext<T>,
        request: FreshnessRequest,
    ) -> Result<FreshnessReply> {
        freshness::respond(ctx, &request)
    }

    async fn handle_elect_request(
        &self,
        ctx: &ReplContext<T>,
        request: ElectRequest,
    ) -> Result<ElectReply> {
        Ok(elect::respond(ctx, &request))
    }

    fn step_down(
        &mut self,
        hold: Duration,
    ) {
        let until = Instant::now() + hold;
        info!("stepping down as election candidate for {:?}", hold);
        self.stepped_down_until = Some(until);
    }
}

impl<T> Debug for ElectionCoordinator<T>
where
    T: TypeConfig,
{
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ElectionCoordinator")
            .field("my_id", &self.my_id)
            .field("slept_last", &self.slept_last)
            .finish()
    }
}
