use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// The opaque role-transition handshake invoked after a won election.
///
/// The surrounding server owns the actual primary/secondary switch (catching
/// up appliers, opening the write path, announcing the role); the core only
/// ever calls this as a single step and treats `false` as "remain
/// secondary".
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoleTransition: Send + Sync + 'static {
    /// Assume the primary role at `epoch`. Returns whether the transition
    /// completed.
    async fn assume_primary(
        &self,
        epoch: u64,
    ) -> bool;
}
