use super::*;
use crate::Member;

fn member(id: u32) -> Member {
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

#[test]
fn test_default_config_is_valid() {
    let config = ReplNodeConfig::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_tie_sleep_range_must_be_ordered() {
    let mut config = ReplNodeConfig::default();
    config.election.tie_sleep_min_ms = 500;
    config.election.tie_sleep_max_ms = 500;
    assert!(config.validate().is_err());
}

#[test]
fn test_election_time_limit_cannot_be_zero() {
    let mut config = ReplNodeConfig::default();
    config.election.election_time_limit_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_duplicate_member_ids_rejected() {
    let mut config = ReplNodeConfig::default();
    config.cluster.node_id = 1;
    config.cluster.initial_members = vec![member(1), member(1)];
    assert!(config.validate().is_err());
}

#[test]
fn test_node_id_must_be_a_member() {
    let mut config = ReplNodeConfig::default();
    config.cluster.node_id = 9;
    config.cluster.initial_members = vec![member(1), member(2)];
    assert!(config.validate().is_err());
}

#[test]
fn test_initial_replica_set_carries_version_and_members() {
    let mut config = ReplNodeConfig::default();
    config.cluster.set_name = "shard-a".into();
    config.cluster.node_id = 1;
    config.cluster.initial_version = 4;
    config.cluster.initial_members = vec![member(1), member(2), member(3)];

    let set = config.cluster.initial_replica_set();
    assert_eq!(set.name, "shard-a");
    assert_eq!(set.version, 4);
    assert_eq!(set.members.len(), 3);
    assert_eq!(set.total_votes(), 3);
}
