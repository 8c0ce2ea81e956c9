use rand::Rng;
use tokio::time::Duration;

/// Jitter source for tie-induced sleeps. When several members discover they
/// share the freshest log position, everyone but the lowest id backs off by
/// a random duration from this range before retrying.
#[derive(Clone, Debug)]
pub struct TieBreakTimer {
    pub timeout_range: (u64, u64),
}

impl TieBreakTimer {
    /// @param: timeout_range: (TIE_SLEEP_MIN_MS, TIE_SLEEP_MAX_MS)
    pub fn new(timeout_range: (u64, u64)) -> Self {
        Self { timeout_range }
    }

    pub fn delay(&self) -> Duration {
        let (min, max) = self.timeout_range;
        Self::random_duration(min, max)
    }

    pub fn random_duration(
        min: u64,
        max: u64,
    ) -> Duration {
        let mut rng = rand::thread_rng();
        let timeout = rng.gen_range(min..max);
        Duration::from_millis(timeout)
    }
}
