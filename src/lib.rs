//! # replset-core
//!
//! Primary election core for a primary/secondary replicated datastore.
//!
//! A set of peers maintains a replicated operation log; at most one member
//! at a time holds the primary role and accepts writes, the rest tail its
//! log. When the primary is unreachable or steps down, this crate's
//! protocol elects a successor that holds the freshest log, is currently
//! eligible, and is stamped with a strictly higher primary epoch than any
//! predecessor.
//!
//! ## What this crate provides
//!
//! - **Two-phase election** - a freshness/veto poll followed by the vote
//!   fan-out with strict-majority tallying over the configured votes
//! - **Epoch monotonicity** - a serialized highest-known-primary counter;
//!   at most one member wins any given epoch
//! - **Tie breaking** - lowest id proceeds, everyone else backs off with
//!   bounded jitter and retries
//! - **Relinquish predicates** - when a sitting primary must surrender
//!
//! Log storage, heartbeating, RPC transport, and the post-election role
//! switch are **your responsibility**: the core consumes them through
//! traits, bound together by a [`TypeConfig`].
//!
//! ```text
//! ┌───────────────────────────────────────┐
//! │   Your replication server             │
//! ├───────────────────────────────────────┤
//! │   replset-core (election protocol)    │  ← You are here
//! ├───────────────────────────────────────┤
//! │   Your log │ heartbeats │ transport   │  ← You implement
//! └───────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use replset_core::{ElectionCoordinator, ElectionCore, ReplContext};
//!
//! // 1. Implement the collaborator traits
//! struct MyLog;       // LogOracle
//! struct MyPeers;     // Peers (or use the built-in PeerRegistry)
//! struct MyRpc;       // Transport
//! struct MyHandoff;   // RoleTransition
//!
//! // 2. Bind them through a TypeConfig and build a context
//! let ctx: ReplContext<MyTypes> = /* ... */;
//!
//! // 3. Drive elections
//! let mut coordinator = ElectionCoordinator::new(ctx.node_id);
//! let outcome = coordinator.elect_self(&ctx).await?;
//! ```
//!
//! ## Key Traits
//!
//! - [`LogOracle`] - read-only view of the local log head
//! - [`Peers`] - atomically-published membership + heartbeat snapshots
//! - [`Transport`] - the two election fan-outs
//! - [`RoleTransition`] - the opaque assume-primary handshake

pub mod config;
mod context;
mod election;
mod epoch;
mod errors;
mod membership;
mod network;
mod position;
mod relinquish;
mod timer;
mod transition;
mod type_config;

pub use config::*;
pub use context::*;
pub use election::*;
pub use epoch::*;
pub use errors::*;
pub use membership::*;
pub use network::*;
pub use position::*;
pub use relinquish::*;
pub use transition::*;

pub(crate) use timer::*;
#[doc(hidden)]
pub use type_config::*;

#[cfg(test)]
mod mock_type_config;
#[cfg(test)]
pub use mock_type_config::*;

#[cfg(test)]
mod errors_test;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

/// An election is won only on a strict majority of the votes the replica
/// set is configured with, not of the reachable subset. The tally is signed
/// because a single veto carries a large negative weight.
pub(crate) fn is_vote_majority(
    tally: i64,
    total_votes: u64,
) -> bool {
    tally > 0 && (tally as u64) * 2 > total_votes
}
