use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;
use tracing::trace;

use super::{
    error::{Result, TileError},
    tiles::TileCollection,
};

/// A transform producing an augmented copy of a tile collection.
pub trait Augmentation {
    /// # Errors
    ///
    /// Returns an error if the transform cannot be applied or its output
    /// is not a valid tile collection.
    fn augment(&self, tiles: &TileCollection) -> Result<TileCollection>;
}

impl<F> Augmentation for F
where
    F: Fn(&TileCollection) -> Result<TileCollection>,
{
    fn augment(&self, tiles: &TileCollection) -> Result<TileCollection> {
        self(tiles)
    }
}

/// Adds zero-mean Gaussian noise to every imagery value.
///
/// Noise is drawn from a seeded generator, so equal seeds give equal output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralNoise {
    pub std_dev: f32,
    pub seed: u64,
}

impl Augmentation for SpectralNoise {
    #[tracing::instrument(level = "trace", skip(tiles))]
    fn augment(&self, tiles: &TileCollection) -> Result<TileCollection> {
        trace!("Adding spectral noise.");
        if !self.std_dev.is_finite() || self.std_dev <= 0.0 {
            return Err(TileError::InvalidParameter(format!(
                "noise standard deviation must be positive, got {}",
                self.std_dev
            )));
        }
        let normal = Normal::new(0.0, self.std_dev)
            .map_err(|err| TileError::InvalidParameter(err.to_string()))?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let imagery = tiles.imagery().mapv(|value| value + rng.sample(normal));
        TileCollection::new(imagery, tiles.reference().clone())
    }
}

/// Multiplies every imagery value by a constant factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralScale {
    pub factor: f32,
}

impl Augmentation for SpectralScale {
    #[tracing::instrument(level = "trace", skip(tiles))]
    fn augment(&self, tiles: &TileCollection) -> Result<TileCollection> {
        trace!("Scaling spectra.");
        if !self.factor.is_finite() {
            return Err(TileError::InvalidParameter(format!(
                "scale factor must be finite, got {}",
                self.factor
            )));
        }
        let imagery = tiles.imagery().mapv(|value| value * self.factor);
        TileCollection::new(imagery, tiles.reference().clone())
    }
}
