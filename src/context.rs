use std::fmt::Debug;
use std::sync::Arc;

use crate::EpochStore;
use crate::MemberId;
use crate::ReplNodeConfig;
use crate::TypeConfig;
use crate::alias::LOF;
use crate::alias::POF;
use crate::alias::RTOF;
use crate::alias::TROF;

/// Explicit handle bundle passed to every core operation.
///
/// There are no process-wide singletons: whoever constructs the coordinator
/// decides which log view, peer view, transport, and transition hook it
/// talks to.
pub struct ReplContext<T>
where
    T: TypeConfig,
{
    pub node_id: MemberId,

    pub log: Arc<LOF<T>>,

    pub peers: Arc<POF<T>>,

    pub transport: Arc<TROF<T>>,

    pub transition: Arc<RTOF<T>>,

    pub epoch_store: Arc<EpochStore>,

    pub node_config: Arc<ReplNodeConfig>,
}

impl<T> ReplContext<T>
where
    T: TypeConfig,
{
    pub fn log(&self) -> &Arc<LOF<T>> {
        &self.log
    }

    pub fn peers(&self) -> &Arc<POF<T>> {
        &self.peers
    }

    pub fn transport(&self) -> &Arc<TROF<T>> {
        &self.transport
    }

    pub fn transition(&self) -> &Arc<RTOF<T>> {
        &self.transition
    }

    pub fn epoch_store(&self) -> &Arc<EpochStore> {
        &self.epoch_store
    }

    pub fn node_config(&self) -> Arc<ReplNodeConfig> {
        self.node_config.clone()
    }

    #[cfg(test)]
    pub fn set_peers(
        &mut self,
        peers: Arc<POF<T>>,
    ) {
        self.peers = peers;
    }

    #[cfg(test)]
    pub fn set_transport(
        &mut self,
        transport: Arc<TROF<T>>,
    ) {
        self.transport = transport;
    }
}

impl<T> Debug for ReplContext<T>
where
    T: TypeConfig,
{
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ReplContext").field("node_id", &self.node_id).finish()
    }
}
