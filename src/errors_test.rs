//! Display-format and conversion checks for the error hierarchy.

use std::time::Duration;

use crate::ConsensusError;
use crate::ElectionError;
use crate::Error;
use crate::NetworkError;

#[test]
fn test_election_error_messages() {
    let e = ElectionError::StaleConfig {
        local_version: 4,
        candidate_version: 2,
    };
    assert_eq!(
        e.to_string(),
        "candidate config version 2 is stale (local version 4)"
    );

    let e = ElectionError::Vetoed {
        reason: "already primary".into(),
    };
    assert_eq!(e.to_string(), "vetoed: already primary");

    let e = ElectionError::InsufficientVotes {
        tally: 2,
        total_votes: 5,
    };
    assert_eq!(e.to_string(), "insufficient votes (tally 2, configured total 5)");

    let e = ElectionError::EpochRejected { epoch: 7 };
    assert_eq!(e.to_string(), "epoch 7 rejected, another election won");
}

#[test]
fn test_election_error_wraps_into_consensus_error() {
    let e: Error = ElectionError::NotFreshest.into();
    assert!(matches!(
        e,
        Error::Consensus(ConsensusError::Election(ElectionError::NotFreshest))
    ));
}

#[test]
fn test_network_error_messages() {
    let e = NetworkError::Timeout {
        node_id: 3,
        duration: Duration::from_millis(250),
    };
    assert_eq!(e.to_string(), "connection timeout to 3 after 250ms");

    let e = NetworkError::EmptyPeerList {
        request_type: "fresh",
    };
    assert_eq!(e.to_string(), "request list for fresh contains no peers");
}

#[test]
fn test_network_error_wraps_into_error() {
    let e: Error = NetworkError::PeerUnreachable(2).into();
    assert!(matches!(e, Error::Network(NetworkError::PeerUnreachable(2))));
}
