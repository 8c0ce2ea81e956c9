use std::collections::HashSet;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Member;
use crate::MemberId;
use crate::ReplicaSetConfig;
use crate::Result;

/// Replica-set topology as seeded at startup. The live membership is owned
/// by the peer registry afterwards; admin reconfiguration replaces it with
/// a higher version.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClusterConfig {
    #[serde(default = "default_set_name")]
    pub set_name: String,

    #[serde(default)]
    pub node_id: MemberId,

    /// Version stamped onto the initial membership.
    #[serde(default = "default_config_version")]
    pub initial_version: u64,

    #[serde(default)]
    pub initial_members: Vec<Member>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            set_name: default_set_name(),
            node_id: 0,
            initial_version: default_config_version(),
            initial_members: Vec::new(),
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.set_name.is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "set_name cannot be empty".into(),
            )));
        }

        let mut seen = HashSet::new();
        for member in &self.initial_members {
            if !seen.insert(member.id) {
                return Err(Error::Config(ConfigError::Message(format!(
                    "duplicate member id {} in initial_members",
                    member.id
                ))));
            }
            if member.host.is_empty() {
                return Err(Error::Config(ConfigError::Message(format!(
                    "member {} has an empty host",
                    member.id
                ))));
            }
            if member.priority < 0.0 {
                return Err(Error::Config(ConfigError::Message(format!(
                    "member {} has a negative priority",
                    member.id
                ))));
            }
        }

        if !self.initial_members.is_empty() && !seen.contains(&self.node_id) {
            return Err(Error::Config(ConfigError::Message(format!(
                "node_id {} is not one of the configured members",
                self.node_id
            ))));
        }

        Ok(())
    }

    /// The initial membership as a replica-set config value.
    pub fn initial_replica_set(&self) -> ReplicaSetConfig {
        ReplicaSetConfig::new(
            self.set_name.clone(),
            self.initial_version,
            self.initial_members.iter().cloned(),
        )
    }
}

fn default_set_name() -> String {
    "rs0".to_string()
}

fn default_config_version() -> u64 {
    1
}
