//! Step-down predicates for a sitting primary.
//!
//! Evaluated on a fixed cadence by the upper layer's monitor task. The
//! monitor only ever surrenders the role; it never starts an election.

use std::fmt;
use std::marker::PhantomData;

use tracing::warn;

use crate::LogPosition;
use crate::MemberId;
use crate::PeerSnapshot;
use crate::ReplContext;
use crate::TypeConfig;
use crate::membership::Peers;
use crate::position::LogOracle;

/// Why a sitting primary must relinquish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDownReason {
    /// Some up peer holds a log position ahead of ours
    LogBehind { peer: MemberId },
    /// Some up peer knows of a primary epoch greater than ours
    NewerPrimaryKnown { peer: MemberId, epoch: u64 },
    /// The votes we can still see no longer form a strict majority
    LostMajority { up_votes: u64, total_votes: u64 },
}

impl fmt::Display for StepDownReason {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            StepDownReason::LogBehind { peer } => {
                write!(f, "log is behind member {peer}")
            }
            StepDownReason::NewerPrimaryKnown { peer, epoch } => {
                write!(f, "member {peer} knows of a newer primary at epoch {epoch}")
            }
            StepDownReason::LostMajority { up_votes, total_votes } => {
                write!(f, "lost majority ({up_votes} of {total_votes} votes up)")
            }
        }
    }
}

pub struct RelinquishMonitor<T>
where
    T: TypeConfig,
{
    _marker: PhantomData<T>,
}

impl<T> RelinquishMonitor<T>
where
    T: TypeConfig,
{
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// One tick of the monitor: samples the peer view, the live log
    /// position, and the local epoch, and reports whether the primary must
    /// step down.
    pub fn check(
        &self,
        ctx: &ReplContext<T>,
    ) -> Option<StepDownReason> {
        let snapshot = ctx.peers().snapshot();
        let live_position = ctx.log().live_position();
        let local_hkp = ctx.epoch_store().get();
        let reason = Self::evaluate(&snapshot, live_position, local_hkp);
        if let Some(reason) = &reason {
            warn!("relinquishing primary: {}", reason);
        }
        reason
    }

    /// The pure predicate behind [`check`](Self::check).
    pub fn evaluate(
        snapshot: &PeerSnapshot,
        live_position: LogPosition,
        local_hkp: u64,
    ) -> Option<StepDownReason> {
        for member in snapshot.config.members.values() {
            if member.id == snapshot.self_id {
                continue;
            }
            let Some(hb) = snapshot.heartbeat(member.id) else {
                continue;
            };
            if !hb.up {
                continue;
            }
            if live_position < hb.last_log_position {
                return Some(StepDownReason::LogBehind { peer: member.id });
            }
            if local_hkp < hb.highest_known_primary {
                return Some(StepDownReason::NewerPrimaryKnown {
                    peer: member.id,
                    epoch: hb.highest_known_primary,
                });
            }
        }

        let up_votes = snapshot.up_votes();
        let total_votes = snapshot.config.total_votes();
        if up_votes * 2 <= total_votes {
            return Some(StepDownReason::LostMajority {
                up_votes,
                total_votes,
            });
        }

        None
    }
}

impl<T> Default for RelinquishMonitor<T>
where
    T: TypeConfig,
{
    fn default() -> Self {
        Self::new()
    }
}
