//! Leader selection when a leader leaves a non-empty party.

use parking_lot::Mutex;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::config::SuccessionKind;

/// Picks the next leader from the members that remain.
///
/// `remaining` is sorted and never contains the departing leader. Returning
/// `None` for a non-empty slice would leave the party leaderless, so
/// implementations must pick someone whenever they can.
pub trait SuccessionPolicy: Send + Sync {
    fn choose(&self, remaining: &[String]) -> Option<String>;
}

/// Uniform random choice among the remaining members.
pub struct RandomSuccession {
    rng: Mutex<StdRng>,
}

impl RandomSuccession {
    /// `Some(seed)` gives a reproducible sequence; `None` seeds from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl Default for RandomSuccession {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SuccessionPolicy for RandomSuccession {
    fn choose(&self, remaining: &[String]) -> Option<String> {
        let mut rng = self.rng.lock();
        remaining.choose(&mut *rng).cloned()
    }
}

/// Deterministic: the lexicographically smallest remaining member.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstByName;

impl SuccessionPolicy for FirstByName {
    fn choose(&self, remaining: &[String]) -> Option<String> {
        remaining.iter().min().cloned()
    }
}

pub fn policy_for(kind: SuccessionKind) -> Box<dyn SuccessionPolicy> {
    match kind {
        SuccessionKind::Random => Box::new(RandomSuccession::default()),
        SuccessionKind::FirstByName => Box::new(FirstByName),
    }
}
