use std::sync::Mutex;

use tracing::debug;
use tracing::info;

use crate::LogPosition;
use crate::MemberId;

/// Monotonic highest-known-primary counter.
///
/// Every successfully elected primary is stamped with an epoch strictly
/// greater than any epoch this node has observed. `propose` is the
/// linearization point for "becoming primary at epoch E": once an epoch has
/// been accepted here, no vote will ever be granted for a candidate
/// proposing a smaller or equal epoch (except the idempotent re-assert by
/// the same candidate).
///
/// The store is purely in-memory; after a restart the counter is re-learned
/// from peers through the heartbeat channel via `observe`.
#[derive(Debug)]
pub struct EpochStore {
    inner: Mutex<EpochInner>,
}

#[derive(Debug)]
struct EpochInner {
    current: u64,
    /// Candidate whose proposal set `current`; `None` when the value was
    /// merely learned from a peer.
    holder: Option<MemberId>,
}

impl EpochStore {
    pub fn new(initial: u64) -> Self {
        Self {
            inner: Mutex::new(EpochInner {
                current: initial,
                holder: None,
            }),
        }
    }

    pub fn get(&self) -> u64 {
        self.inner.lock().unwrap().current
    }

    /// Accepts `epoch` as a possible primary epoch iff it is strictly greater
    /// than the current one, or equal while `candidate` is re-asserting the
    /// identity that set it. Returns whether the proposal was accepted.
    pub fn propose(
        &self,
        epoch: u64,
        candidate: MemberId,
        evidence_position: LogPosition,
    ) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if epoch > inner.current {
            info!(
                "accepting primary epoch {} for member {} at {} (was {})",
                epoch, candidate, evidence_position, inner.current
            );
            inner.current = epoch;
            inner.holder = Some(candidate);
            return true;
        }
        if epoch == inner.current && inner.holder == Some(candidate) {
            debug!(
                "member {} re-asserting primary epoch {} at {}",
                candidate, epoch, evidence_position
            );
            return true;
        }
        debug!(
            "rejecting primary epoch {} from member {} (current {})",
            epoch, candidate, inner.current
        );
        false
    }

    /// Raises the counter to `epoch` without asserting a primary identity.
    /// Used on learning a higher epoch from heartbeats or RPC replies.
    pub fn observe(
        &self,
        epoch: u64,
    ) {
        let mut inner = self.inner.lock().unwrap();
        if epoch > inner.current {
            debug!("observed higher primary epoch {} (was {})", epoch, inner.current);
            inner.current = epoch;
            inner.holder = None;
        }
    }
}
