use std::fmt::Debug;

use crate::LogOracle;
use crate::Peers;
use crate::RoleTransition;
use crate::Transport;

/// Binds the concrete collaborator types an embedding server wires into the
/// election core. Production wires real storage and networking; tests wire
/// mocks through a single zero-sized config type.
pub trait TypeConfig:
    Sync + Send + Sized + Debug + Clone + Copy + Default + Eq + PartialEq + Ord + PartialOrd + 'static
{
    type L: LogOracle;

    type P: Peers;

    type TR: Transport;

    type RT: RoleTransition;
}

pub mod alias {
    use super::TypeConfig;

    pub type LOF<T> = <T as TypeConfig>::L;

    pub type POF<T> = <T as TypeConfig>::P;

    pub type TROF<T> = <T as TypeConfig>::TR;

    pub type RTOF<T> = <T as TypeConfig>::RT;
}
