use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Timing and threshold knobs for the election protocol.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ElectionConfig {
    /// Lower bound (inclusive) of the tie-break jitter sleep, ms
    #[serde(default = "default_tie_sleep_min_ms")]
    pub tie_sleep_min_ms: u64,

    /// Upper bound (exclusive) of the tie-break jitter sleep, ms
    #[serde(default = "default_tie_sleep_max_ms")]
    pub tie_sleep_max_ms: u64,

    /// Per-peer RPC timeout applied by the transport, ms
    #[serde(default = "default_peer_rpc_timeout_ms")]
    pub peer_rpc_timeout_ms: u64,

    /// Wall-clock ceiling on one election phase; a tally that arrives later
    /// is discarded, secs
    #[serde(default = "default_election_time_limit_secs")]
    pub election_time_limit_secs: u64,

    /// How recent a peer's heartbeat must be for that peer to count as
    /// electable, ms
    #[serde(default = "default_freshness_window_ms")]
    pub freshness_window_ms: u64,

    /// While the node's uptime is below this window, an election with absent
    /// vote-carrying members is not attempted, secs
    #[serde(default = "default_warmup_window_secs")]
    pub warmup_window_secs: u64,

    /// How long a voluntarily stepped-down node refuses to seek election, secs
    #[serde(default = "default_step_down_hold_secs")]
    pub step_down_hold_secs: u64,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            tie_sleep_min_ms: default_tie_sleep_min_ms(),
            tie_sleep_max_ms: default_tie_sleep_max_ms(),
            peer_rpc_timeout_ms: default_peer_rpc_timeout_ms(),
            election_time_limit_secs: default_election_time_limit_secs(),
            freshness_window_ms: default_freshness_window_ms(),
            warmup_window_secs: default_warmup_window_secs(),
            step_down_hold_secs: default_step_down_hold_secs(),
        }
    }
}

impl ElectionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tie_sleep_min_ms >= self.tie_sleep_max_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "tie_sleep_min_ms {}ms must be less than tie_sleep_max_ms {}ms",
                self.tie_sleep_min_ms, self.tie_sleep_max_ms
            ))));
        }

        if self.election_time_limit_secs == 0 {
            return Err(Error::Config(ConfigError::Message(
                "election_time_limit_secs cannot be 0".into(),
            )));
        }

        if self.peer_rpc_timeout_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "peer_rpc_timeout_ms cannot be 0".into(),
            )));
        }

        if self.freshness_window_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "freshness_window_ms cannot be 0".into(),
            )));
        }

        Ok(())
    }

    pub fn tie_sleep_range(&self) -> (u64, u64) {
        (self.tie_sleep_min_ms, self.tie_sleep_max_ms)
    }

    pub fn election_time_limit(&self) -> Duration {
        Duration::from_secs(self.election_time_limit_secs)
    }

    pub fn freshness_window(&self) -> Duration {
        Duration::from_millis(self.freshness_window_ms)
    }

    pub fn warmup_window(&self) -> Duration {
        Duration::from_secs(self.warmup_window_secs)
    }

    pub fn step_down_hold(&self) -> Duration {
        Duration::from_secs(self.step_down_hold_secs)
    }
}

fn default_tie_sleep_min_ms() -> u64 {
    50
}

fn default_tie_sleep_max_ms() -> u64 {
    1050
}

fn default_peer_rpc_timeout_ms() -> u64 {
    3000
}

fn default_election_time_limit_secs() -> u64 {
    30
}

fn default_freshness_window_ms() -> u64 {
    10_000
}

// in secs
fn default_warmup_window_secs() -> u64 {
    300
}

fn default_step_down_hold_secs() -> u64 {
    60
}
