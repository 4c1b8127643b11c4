//! Randomness source shared by the generator, prediction engine, and chart views.

use rand::Rng;

/// A source of bounded random perturbations.
///
/// Every [`rand::Rng`] is a `Noise`, so production code passes a seeded
/// `StdRng`. Tests can pass [`MidpointNoise`] to make every draw exact.
pub trait Noise {
    /// Returns a value drawn uniformly from `[low, high]`.
    ///
    /// Returns `low` when the range is empty.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Returns an integer drawn uniformly from `low..=high`.
    fn integer(&mut self, low: u32, high: u32) -> u32;

    /// Returns `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool {
        self.uniform(0.0, 1.0) < probability
    }
}

impl<R: Rng + ?Sized> Noise for R {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.random_range(low..=high)
    }

    fn integer(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.random_range(low..=high)
    }
}

/// Deterministic noise that always returns the middle of the requested range.
///
/// Symmetric perturbations such as `U(-0.05, 0.05)` become exactly zero, and
/// [`Noise::chance`] is true only for probabilities above one half.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidpointNoise;

impl Noise for MidpointNoise {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        low + (high - low) / 2.0
    }

    fn integer(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        low + (high - low) / 2
    }
}
