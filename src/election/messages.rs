//! Request and reply types for the two election RPCs. The transport owns
//! their wire encoding.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::LogPosition;
use crate::MemberId;

/// Vote value a responder returns to refuse a candidacy outright. Large
/// enough in magnitude that a single veto sinks any realistic tally.
pub const VETO_VOTE: i32 = -10_000;

/// Correlates a freshness query with its elect request and the replies to
/// both within one election attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundId(Uuid);

impl RoundId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoundId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoundId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Phase-1 query: "do you know any reason I cannot be primary?"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreshnessRequest {
    pub set_name: String,
    /// Candidate fullname, for log lines on the responder
    pub candidate: String,
    pub candidate_id: MemberId,
    pub config_version: u64,
    /// Candidate's live log position at the time of the query
    pub position: LogPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreshnessReply {
    /// Responder's own live log position
    pub position: LogPosition,
    /// True iff the responder, or any third member it has heard from, holds
    /// a position strictly ahead of the candidate's
    pub fresher: bool,
    pub veto: bool,
    pub veto_reason: Option<String>,
    /// Greatest primary epoch the responder knows of
    pub highest_known_primary: u64,
}

/// Phase-2 request: "grant me your votes for primaryship at this epoch."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectRequest {
    pub set_name: String,
    pub candidate: String,
    pub candidate_id: MemberId,
    pub config_version: u64,
    pub round: RoundId,
    /// `None` only for peers from revisions that predate the epoch rule
    pub proposed_epoch: Option<u64>,
    pub position: LogPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectReply {
    /// The responder's vote weight, `0` for a silent no-op, or [`VETO_VOTE`]
    pub vote: i32,
    pub round: RoundId,
}
