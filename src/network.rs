//! Peer RPC abstraction for the two election fan-outs.
//!
//! The core dispatches each phase as one parallel multicast and joins the
//! replies at a single point; per-peer timeouts, retries, and the wire
//! encoding live behind this trait. A peer that fails or times out shows up
//! as an `Err` slot in the joined result, never as a phase failure.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::ElectRequest;
use crate::ElectReply;
use crate::FreshnessRequest;
use crate::FreshnessReply;
use crate::Member;
use crate::MemberId;
use crate::Result;

/// Joined result of one freshness fan-out. Replies are paired with the
/// responding member's id.
#[derive(Debug)]
pub struct FreshnessResult {
    pub responses: Vec<(MemberId, Result<FreshnessReply>)>,
}

/// Joined result of one elect fan-out.
#[derive(Debug)]
pub struct ElectResult {
    pub responses: Vec<(MemberId, Result<ElectReply>)>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Multicasts the freshness query to `targets` and joins the replies.
    ///
    /// Implementations resolve addresses from the member records, bound each
    /// call with the configured per-peer timeout, and surface expired or
    /// unreachable peers as `Err` entries.
    async fn broadcast_freshness(
        &self,
        targets: Vec<Member>,
        request: FreshnessRequest,
    ) -> Result<FreshnessResult>;

    /// Multicasts the elect request to `targets` and joins the replies.
    async fn broadcast_elect(
        &self,
        targets: Vec<Member>,
        request: ElectRequest,
    ) -> Result<ElectResult>;
}
