//! Error hierarchy for the replica-set election core,
//! categorized by protocol layer and operational concerns.

use std::time::Duration;

use config::ConfigError;
use tokio::task::JoinError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Infrastructure-level failures (peer RPC dispatch)
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Node configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Election protocol violations and failures
    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    /// Unrecoverable failures requiring operator attention
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConsensusError {
    /// Primary election failures
    #[error(transparent)]
    Election(#[from] ElectionError),
}

/// Reasons an election attempt aborts.
///
/// None of these are fatal to the process: the coordinator returns to idle
/// and the next upper-layer trigger may start a fresh attempt. A tie is not
/// an error; it surfaces as the `MustSleep` freshness verdict instead.
#[derive(Debug, thiserror::Error)]
pub enum ElectionError {
    /// The candidate advertised a config version older than the responder's
    #[error("candidate config version {candidate_version} is stale (local version {local_version})")]
    StaleConfig {
        local_version: u64,
        candidate_version: u64,
    },

    /// Some reachable member holds, or knows of, a fresher log
    #[error("not freshest")]
    NotFreshest,

    /// A peer refused the candidacy outright
    #[error("vetoed: {reason}")]
    Vetoed { reason: String },

    /// Tally fell short of a strict majority of the configured votes
    #[error("insufficient votes (tally {tally}, configured total {total_votes})")]
    InsufficientVotes { tally: i64, total_votes: u64 },

    /// Replica-set config was reconfigured between phase start and tally
    #[error("config version changed during election ({snapshot_version} -> {current_version})")]
    ConfigChanged {
        snapshot_version: u64,
        current_version: u64,
    },

    /// The local epoch store refused the proposed epoch; another election
    /// committed a greater-or-equal epoch first
    #[error("epoch {epoch} rejected, another election won")]
    EpochRejected { epoch: u64 },

    /// The election phase outlived its wall-clock ceiling
    #[error("election exceeded the {limit:?} ceiling, discarding result")]
    Timeout { limit: Duration },

    /// The opaque assume-primary handshake declined the role
    #[error("failed to assume primary role at epoch {epoch}")]
    AssumePrimaryFailed { epoch: u64 },

    /// An incoming freshness query named a different replica set
    #[error("wrong replica set name: expected '{expected}', got '{got}'")]
    WrongSetName { expected: String, got: String },

    /// Not every vote-carrying member replied while the node is still warming up
    #[error("not all vote-carrying members are up and the node is within its warm-up window")]
    NotAllMembersUp,

    /// The local node may not seek election at all
    #[error("node is not eligible to seek election: {0}")]
    Ineligible(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Endpoint reachable but refusing service
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Peer RPC exceeded its per-call timeout
    #[error("connection timeout to {node_id} after {duration:?}")]
    Timeout { node_id: u32, duration: Duration },

    /// Peer could not be reached at all
    #[error("peer({0}) unreachable")]
    PeerUnreachable(u32),

    /// Fan-out invoked with nobody to talk to
    #[error("request list for {request_type} contains no peers")]
    EmptyPeerList { request_type: &'static str },

    /// Background fan-out task failed
    #[error("background task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

impl From<ElectionError> for Error {
    fn from(e: ElectionError) -> Self {
        Error::Consensus(ConsensusError::Election(e))
    }
}
