//! Primary election protocol.
//!
//! A candidate runs two fan-out phases:
//! - **Freshness** - a sanity poll: do any reachable members know the
//!   candidate cannot be primary (staler log, veto)?
//! - **Elect** - the vote proper: peers grant their configured vote weight,
//!   gated by the monotonic primary-epoch rule.
//!
//! Peers answer both phases by consulting the pure vote evaluator and the
//! local epoch store. The coordinator drives the phases, handles tie-induced
//! retries, and invokes the opaque assume-primary step on success.
mod coordinator;
mod evaluator;
mod messages;

pub(crate) mod elect;
pub(crate) mod freshness;

use std::time::Duration;

use async_trait::async_trait;
pub use coordinator::*;
pub use evaluator::*;
pub use messages::*;
#[cfg(test)]
use mockall::automock;

use crate::ElectionError;
use crate::ReplContext;
use crate::Result;
use crate::TypeConfig;

#[cfg(test)]
mod coordinator_test;

/// Outcome of the freshness phase, dispatched on by the coordinator.
#[derive(Debug)]
pub enum FreshnessVerdict {
    /// Nobody is fresher and nobody vetoed; the elect phase may run.
    Proceed(ProceedInfo),
    /// The candidacy is dead for this attempt.
    Abort(ElectionError),
    /// Tied with a lower-id member: back off for the jitter interval, then
    /// rerun the freshness phase from scratch.
    MustSleep(Duration),
}

/// What the elect phase needs to know from a successful freshness poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProceedInfo {
    /// OK replies whose log position equalled the candidate's.
    pub tie_count: usize,
    /// Whether every configured vote-carrying member replied OK.
    pub all_up: bool,
    /// Greatest primary epoch seen locally or reported by any reply.
    pub observed_highest_known_primary: u64,
}

/// Outcome of one coordinator invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectionOutcome {
    /// This node is now primary at `epoch`.
    Won { epoch: u64 },
    /// The node is inside its voluntary step-down hold and did not attempt.
    HoldOff,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ElectionCore<T>: Send + Sync + 'static
where
    T: TypeConfig,
{
    /// Seeks election for the local node: freshness poll, tie handling,
    /// vote fan-out, epoch commit, assume-primary. Errors map one-to-one
    /// onto the abort reasons in [`ElectionError`].
    async fn elect_self(
        &mut self,
        ctx: &ReplContext<T>,
    ) -> Result<ElectionOutcome>;

    /// Answers an incoming freshness query from a would-be candidate.
    async fn handle_freshness_request(
        &self,
        ctx: &ReplContext<T>,
        request: FreshnessRequest,
    ) -> Result<FreshnessReply>;

    /// Answers an incoming elect request; the reply's vote is the local
    /// member's weight, `0`, or the veto sentinel.
    async fn handle_elect_request(
        &self,
        ctx: &ReplContext<T>,
        request: ElectRequest,
    ) -> Result<ElectReply>;

    /// Records a voluntary step-down: `elect_self` holds off for `hold`.
    fn step_down(
        &mut self,
        hold: Duration,
    );
}
