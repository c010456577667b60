use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed indices for the draw
pub trait RandomSource {
    /// Uniform index in `[0, upper)`. `upper` is always greater than zero.
    fn next_index(&mut self, upper: usize) -> usize;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn next_index(&mut self, upper: usize) -> usize {
        (**self).next_index(upper)
    }
}

/// Adapter over any `rand` generator
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Reproducible source, same seed gives the same draw
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl RngSource<ThreadRng> {
    pub fn thread() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }
}

/// Replays a fixed list of indices.
///
/// Each value is reduced modulo the requested bound; once the script runs out
/// every further call returns 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    script: Vec<usize>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(script: impl Into<Vec<usize>>) -> Self {
        Self {
            script: script.into(),
            cursor: 0,
        }
    }

    /// How many scripted values have been consumed
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_index(&mut self, upper: usize) -> usize {
        let value = self.script.get(self.cursor).copied().unwrap_or(0);
        if self.cursor < self.script.len() {
            self.cursor += 1;
        }
        value % upper
    }
}
