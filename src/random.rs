use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the bot's random decisions. Injected so the probability gates
/// can be driven deterministically.
pub trait RandomSource: Send {
    /// Uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` is never zero.
    fn index(&mut self, len: usize) -> usize;

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniformly chosen element of a non-empty list.
    fn pick<'a>(&mut self, items: &'a [String]) -> &'a str {
        &items[self.index(items.len())]
    }
}

/// OS-seeded generator used for live requests.
pub struct SystemRandom(StdRng);

impl SystemRandom {
    pub fn new() -> Self {
        Self(StdRng::from_os_rng())
    }

    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.random::<f64>()
    }

    fn index(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}

/// Replays fixed values. Once a queue runs dry, gates stay closed and picks
/// return the first element.
#[cfg(test)]
pub struct ScriptedRandom {
    floats: std::collections::VecDeque<f64>,
    indices: std::collections::VecDeque<usize>,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(floats: &[f64], indices: &[usize]) -> Self {
        Self {
            floats: floats.iter().copied().collect(),
            indices: indices.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        self.floats.pop_front().unwrap_or(0.99)
    }

    fn index(&mut self, len: usize) -> usize {
        self.indices.pop_front().unwrap_or(0) % len
    }
}
