use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::RwLock;
use std::time::Duration;

use dashmap::DashMap;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;
use tokio::time::Instant;

use crate::LogPosition;

/// Member identifier, unique within a replica set and stable across restarts.
pub type MemberId = u32;

/// Configured peer descriptor. Immutable within one election attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub host: String,
    #[serde(default = "default_priority")]
    pub priority: f64,
    #[serde(default = "default_votes")]
    pub votes: u32,
    #[serde(default)]
    pub arbiter_only: bool,
    /// Intentional replication lag in seconds; a delayed member never
    /// becomes primary.
    #[serde(default)]
    pub slave_delay: u64,
    #[serde(default)]
    pub hidden: bool,
}

fn default_priority() -> f64 {
    1.0
}

fn default_votes() -> u32 {
    1
}

impl Member {
    pub fn fullname(&self) -> &str {
        &self.host
    }
}

/// Replica-set membership as installed by the admin reconfig path. The
/// `version` increases on every reconfiguration; peers advertising older
/// versions must defer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicaSetConfig {
    pub name: String,
    pub version: u64,
    pub members: BTreeMap<MemberId, Member>,
}

impl ReplicaSetConfig {
    pub fn new(
        name: impl Into<String>,
        version: u64,
        members: impl IntoIterator<Item = Member>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            members: members.into_iter().map(|m| (m.id, m)).collect(),
        }
    }

    pub fn member(
        &self,
        id: MemberId,
    ) -> Option<&Member> {
        self.members.get(&id)
    }

    /// Sum of every configured member's votes. Majority thresholds are
    /// computed over this total, not over the reachable subset.
    pub fn total_votes(&self) -> u64 {
        self.members.values().map(|m| u64::from(m.votes)).sum()
    }

    pub fn voting_members(&self) -> impl Iterator<Item = &Member> {
        self.members.values().filter(|m| m.votes > 0)
    }
}

/// Cached liveness state for one peer, maintained by the external heartbeat
/// subsystem and read-only to the election core.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeartbeatInfo {
    pub up: bool,
    pub last_log_position: LogPosition,
    /// Highest primary epoch this peer has reported knowing about.
    pub highest_known_primary: u64,
    pub last_contact: Option<Instant>,
}

impl HeartbeatInfo {
    /// A peer that has never been probed is still worth querying.
    pub fn maybe_up(&self) -> bool {
        self.up || self.last_contact.is_none()
    }
}

/// Immutable, atomically-published view of the configured members and their
/// cached heartbeat state. All per-decision reads in the core sample one
/// snapshot, never the live registry.
#[derive(Debug, Clone)]
pub struct PeerSnapshot {
    pub config: ReplicaSetConfig,
    pub heartbeats: HashMap<MemberId, HeartbeatInfo>,
    pub self_id: MemberId,
    /// The member currently believed to be primary, if any (possibly self).
    pub primary: Option<MemberId>,
}

impl PeerSnapshot {
    pub fn self_member(&self) -> Option<&Member> {
        self.config.member(self.self_id)
    }

    pub fn heartbeat(
        &self,
        id: MemberId,
    ) -> Option<&HeartbeatInfo> {
        self.heartbeats.get(&id)
    }

    /// Fan-out target set: every non-self member that is possibly up,
    /// arbiters included (they vote even though they cannot be primary).
    pub fn possibly_up_targets(&self) -> Vec<Member> {
        self.config
            .members
            .values()
            .filter(|m| m.id != self.self_id)
            .filter(|m| self.heartbeat(m.id).map(HeartbeatInfo::maybe_up).unwrap_or(true))
            .cloned()
            .collect()
    }

    /// Best log position this node has learned about any other member.
    pub fn last_other_position(&self) -> LogPosition {
        self.config
            .members
            .values()
            .filter(|m| m.id != self.self_id)
            .filter_map(|m| self.heartbeat(m.id))
            .filter(|hb| hb.up)
            .map(|hb| hb.last_log_position)
            .max()
            .unwrap_or(LogPosition::ZERO)
    }

    /// Highest primary epoch any member of the set has reported.
    pub fn highest_known_primary_across_set(&self) -> u64 {
        self.heartbeats.values().map(|hb| hb.highest_known_primary).max().unwrap_or(0)
    }

    /// Self votes plus the votes of every peer whose heartbeat is up.
    pub fn up_votes(&self) -> u64 {
        self.config
            .members
            .values()
            .filter(|m| {
                m.id == self.self_id
                    || self.heartbeat(m.id).map(|hb| hb.up).unwrap_or(false)
            })
            .map(|m| u64::from(m.votes))
            .sum()
    }

    /// Whether a strict majority of the configured votes looks reachable
    /// from here. Upper layers gate election triggers on this.
    pub fn a_majority_seems_to_be_up(&self) -> bool {
        self.up_votes() * 2 > self.config.total_votes()
    }

    /// Whether `id` may currently hold the primary role: a configured,
    /// non-arbiter, non-delayed, non-hidden member carrying votes and a
    /// non-zero priority, with a live heartbeat within `freshness_window`
    /// (the local node vouches for itself).
    pub fn is_electable(
        &self,
        id: MemberId,
        now: Instant,
        freshness_window: Duration,
    ) -> bool {
        let Some(member) = self.config.member(id) else {
            return false;
        };
        if member.arbiter_only
            || member.slave_delay > 0
            || member.hidden
            || member.votes == 0
            || member.priority == 0.0
        {
            return false;
        }
        if id == self.self_id {
            return true;
        }
        match self.heartbeat(id) {
            Some(hb) => {
                hb.up
                    && hb
                        .last_contact
                        .map(|t| now.saturating_duration_since(t) <= freshness_window)
                        .unwrap_or(false)
            }
            None => false,
        }
    }

    /// The electable member with the highest priority. Priority ties break
    /// on freshness first, then on the lower member id; never on time of
    /// request. `live_position` stands in for the local node's heartbeat.
    pub fn most_electable(
        &self,
        now: Instant,
        freshness_window: Duration,
        live_position: LogPosition,
    ) -> Option<&Member> {
        let position_of = |m: &Member| {
            if m.id == self.self_id {
                live_position
            } else {
                self.heartbeat(m.id).map(|hb| hb.last_log_position).unwrap_or(LogPosition::ZERO)
            }
        };
        self.config
            .members
            .values()
            .filter(|m| self.is_electable(m.id, now, freshness_window))
            .max_by(|a, b| {
                a.priority
                    .partial_cmp(&b.priority)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| position_of(a).cmp(&position_of(b)))
                    .then_with(|| b.id.cmp(&a.id))
            })
    }
}

/// Source of peer-view snapshots.
#[cfg_attr(test, automock)]
pub trait Peers: Send + Sync + 'static {
    fn snapshot(&self) -> PeerSnapshot;
}

/// Arena of member records and their heartbeat state, indexed by member id.
///
/// The heartbeat subsystem and the admin reconfig path are the writers; the
/// election core only ever reads immutable snapshots. Heartbeat entries are
/// written by a single updater task per peer, so the per-entry map needs no
/// coordination beyond the shard locks.
#[derive(Debug)]
pub struct PeerRegistry {
    self_id: MemberId,
    config: RwLock<ReplicaSetConfig>,
    heartbeats: DashMap<MemberId, HeartbeatInfo>,
    primary: Mutex<Option<MemberId>>,
}

impl PeerRegistry {
    pub fn new(
        self_id: MemberId,
        config: ReplicaSetConfig,
    ) -> Self {
        Self {
            self_id,
            config: RwLock::new(config),
            heartbeats: DashMap::new(),
            primary: Mutex::new(None),
        }
    }

    /// Installs a reconfigured membership. Heartbeat entries for members no
    /// longer configured are dropped.
    pub fn install_config(
        &self,
        config: ReplicaSetConfig,
    ) {
        self.heartbeats.retain(|id, _| config.members.contains_key(id));
        *self.config.write().unwrap() = config;
    }

    pub fn record_heartbeat(
        &self,
        id: MemberId,
        info: HeartbeatInfo,
    ) {
        self.heartbeats.insert(id, info);
    }

    pub fn set_primary(
        &self,
        primary: Option<MemberId>,
    ) {
        *self.primary.lock().unwrap() = primary;
    }
}

impl Peers for PeerRegistry {
    fn snapshot(&self) -> PeerSnapshot {
        let config = self.config.read().unwrap().clone();
        let heartbeats =
            self.heartbeats.iter().map(|entry| (*entry.key(), *entry.value())).collect();
        PeerSnapshot {
            config,
            heartbeats,
            self_id: self.self_id,
            primary: *self.primary.lock().unwrap(),
        }
    }
}
