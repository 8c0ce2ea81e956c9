//! Shared builders for election-core tests.

use tokio::time::Instant;

use crate::HeartbeatInfo;
use crate::LogPosition;
use crate::Member;
use crate::MemberId;
use crate::PeerSnapshot;
use crate::ReplicaSetConfig;

pub fn pos(
    term: u64,
    index: u64,
) -> LogPosition {
    LogPosition::new(term, index)
}

/// A plain data-bearing voter with priority 1.0 and one vote.
pub fn member(id: MemberId) -> Member {
    Member {
        id,
        host: format!("db{id}.example.net:27017"),
        priority: 1.0,
        votes: 1,
        arbiter_only: false,
        slave_delay: 0,
        hidden: false,
    }
}

pub fn arbiter(id: MemberId) -> Member {
    Member {
        arbiter_only: true,
        ..member(id)
    }
}

pub fn set_config(
    version: u64,
    members: Vec<Member>,
) -> ReplicaSetConfig {
    ReplicaSetConfig::new("rs0", version, members)
}

/// Heartbeat of a live peer probed just now.
pub fn hb_up(
    position: LogPosition,
    highest_known_primary: u64,
) -> HeartbeatInfo {
    HeartbeatInfo {
        up: true,
        last_log_position: position,
        highest_known_primary,
        last_contact: Some(Instant::now()),
    }
}

/// Heartbeat of a peer whose probes are failing.
pub fn hb_down() -> HeartbeatInfo {
    HeartbeatInfo {
        up: false,
        last_log_position: LogPosition::ZERO,
        highest_known_primary: 0,
        last_contact: Some(Instant::now()),
    }
}

pub fn snapshot_with(
    config: ReplicaSetConfig,
    self_id: MemberId,
    heartbeats: Vec<(MemberId, HeartbeatInfo)>,
    primary: Option<MemberId>,
) -> PeerSnapshot {
    PeerSnapshot {
        config,
        heartbeats: heartbeats.into_iter().collect(),
        self_id,
        primary,
    }
}

#[cfg(test)]
pub use mocks::*;

#[cfg(test)]
mod mocks {
    use std::sync::Arc;

    use super::*;
    use crate::EpochStore;
    use crate::MockLogOracle;
    use crate::MockPeers;
    use crate::MockRoleTransition;
    use crate::MockTransport;
    use crate::MockTypeConfig;
    use crate::ReplContext;
    use crate::ReplNodeConfig;

    /// Context wired entirely with mocks; tests override the pieces they
    /// care about and leave the rest unset.
    pub fn mock_context(
        node_id: MemberId,
        log: MockLogOracle,
        peers: MockPeers,
        transport: MockTransport,
        transition: MockRoleTransition,
    ) -> ReplContext<MockTypeConfig> {
        ReplContext {
            node_id,
            log: Arc::new(log),
            peers: Arc::new(peers),
            transport: Arc::new(transport),
            transition: Arc::new(transition),
            epoch_store: Arc::new(EpochStore::new(0)),
            node_config: Arc::new(ReplNodeConfig::default()),
        }
    }

    /// A log oracle pinned at `position`.
    pub fn fixed_log(position: LogPosition) -> MockLogOracle {
        let mut log = MockLogOracle::new();
        log.expect_live_position().returning(move || position);
        log
    }

    /// A peer view that always serves clones of `snapshot`.
    pub fn fixed_peers(snapshot: PeerSnapshot) -> MockPeers {
        let mut peers = MockPeers::new();
        peers.expect_snapshot().returning(move || snapshot.clone());
        peers
    }
}
