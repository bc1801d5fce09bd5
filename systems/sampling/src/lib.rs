#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Uniform-random position sampling over configured spawn bounds.
//!
//! Placement is the only randomized part of a spawn run. The sampler owns
//! its random source, so a seeded rng makes whole runs reproducible.

use rand::Rng;
use wave_spawn_core::{AxisRange, Placement, Position, SpawnBounds2D, SpawnBounds3D};

/// Draws a uniform value within the inclusive axis range.
fn sample_axis<R: Rng>(range: AxisRange, rng: &mut R) -> f32 {
    if range.min() == range.max() {
        return range.min();
    }
    rng.gen_range(range.min()..=range.max())
}

/// Samples a point uniformly over the axis-aligned box.
pub fn sample_volume<R: Rng>(bounds: SpawnBounds3D, rng: &mut R) -> Position {
    Position::new(
        sample_axis(bounds.x(), rng),
        sample_axis(bounds.y(), rng),
        sample_axis(bounds.z(), rng),
    )
}

/// Samples a point over the planar region; depth stays fixed.
pub fn sample_planar<R: Rng>(bounds: SpawnBounds2D, rng: &mut R) -> Position {
    Position::new(
        sample_axis(bounds.horizontal(), rng),
        sample_axis(bounds.vertical(), rng),
        bounds.depth(),
    )
}

/// Position sampler owning both bounds configurations and the random source.
#[derive(Debug)]
pub struct BoundsSampler<R: Rng> {
    planar: SpawnBounds2D,
    volume: SpawnBounds3D,
    rng: R,
}

impl<R: Rng> BoundsSampler<R> {
    /// Creates a sampler from the configured regions and a random source.
    #[must_use]
    pub fn new(planar: SpawnBounds2D, volume: SpawnBounds3D, rng: R) -> Self {
        Self { planar, volume, rng }
    }

    /// Samples a position in the region selected by `placement`.
    pub fn sample(&mut self, placement: Placement) -> Position {
        match placement {
            Placement::Planar => sample_planar(self.planar, &mut self.rng),
            Placement::Volume => sample_volume(self.volume, &mut self.rng),
        }
    }
}
