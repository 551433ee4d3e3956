use rand::Rng;
use rand_distr::{Distribution, Normal};

/// The random primitives consumed by genome construction,
/// mutation, crossover and selection.
///
/// Implemented for every [`Rng`], so any generator handle
/// (a seeded `StdRng` for reproducible runs, `thread_rng()`
/// for convenience, one handle per worker thread when
/// evaluating in parallel) can be threaded through.
pub trait Randomness: Rng {
    /// Uniform real in `[low, high]`.
    fn uniform(&mut self, low: f32, high: f32) -> f32 {
        if low >= high {
            low
        } else {
            self.gen_range(low..=high)
        }
    }

    /// Uniform integer in `[low, high]`.
    fn uniform_index(&mut self, low: usize, high: usize) -> usize {
        if low >= high {
            low
        } else {
            self.gen_range(low..=high)
        }
    }

    /// Gaussian sample with the given mean and standard deviation.
    /// An invalid deviation (negative or non-finite) yields the mean.
    fn gaussian(&mut self, mean: f32, std_dev: f32) -> f32 {
        // `Normal` accepts negative deviations and mirrors them.
        if std_dev < 0.0 || !std_dev.is_finite() {
            return mean;
        }
        match Normal::new(mean, std_dev) {
            Ok(normal) => normal.sample(self),
            Err(_) => mean,
        }
    }

    /// Returns `true` with the given probability.
    fn chance(&mut self, probability: f32) -> bool {
        self.gen::<f32>() < probability
    }
}

impl<R: Rng + ?Sized> Randomness for R {}
