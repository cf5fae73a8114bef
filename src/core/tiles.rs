use std::path::Path;

use ndarray::{s, Array1, Array3, ArrayBase, ArrayD, ArrayViewD, Axis, Data, Ix3, Ix4};
use ndarray_npy::read_npy;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::error::{Result, TileError};

/// Lower bound of the sensor's wavelength range in nanometres.
pub const WAVELENGTH_MIN_NM: f32 = 404.0;
/// Upper bound of the sensor's wavelength range in nanometres.
pub const WAVELENGTH_MAX_NM: f32 = 997.0;

/// Axis layout of a tile collection's imagery.
///
/// `SpectroSpatial` carries an extra group axis directly after the tile
/// axis. Extraction always reads group 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileLayout {
    /// `[tile, channel, spectral]` for curves, `[tile, channel, height, width]` for composites.
    Spatial,
    /// `[tile, group, channel, spectral]` for curves, `[tile, group, channel, height, width]` for composites.
    SpectroSpatial,
}

impl TileLayout {
    /// Infers the layout of curve imagery from its rank.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedShape` for any rank other than 3 or 4.
    pub fn from_rank(rank: usize) -> Result<Self> {
        match rank {
            3 => Ok(Self::Spatial),
            4 => Ok(Self::SpectroSpatial),
            _ => Err(TileError::UnsupportedShape {
                rank,
                expected: vec![3, 4],
            }),
        }
    }

    #[must_use]
    pub const fn curve_rank(self) -> usize {
        match self {
            Self::Spatial => 3,
            Self::SpectroSpatial => 4,
        }
    }

    #[must_use]
    pub const fn composite_rank(self) -> usize {
        match self {
            Self::Spatial => 4,
            Self::SpectroSpatial => 5,
        }
    }
}

/// Wavelengths, intensities and shifted class label of one pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralCurve {
    pub wavelengths: Array1<f32>,
    pub intensities: Array1<f32>,
    /// Reference label plus one, so that palette slot 0 stays "No Data".
    pub class_label: i64,
}

/// Imagery and reference labels of a set of tiles.
///
/// The layout is fixed at construction; every extraction dispatches on it
/// instead of re-reading the imagery rank.
#[derive(Debug, Clone, PartialEq)]
pub struct TileCollection {
    imagery: ArrayD<f32>,
    reference: ArrayD<i64>,
    layout: TileLayout,
}

impl TileCollection {
    /// Validates imagery and reference and tags the collection with its layout.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedShape` if the imagery rank is neither 3 nor 4 or
    /// the reference has no axes, and `ShapeMismatch` if the tile counts differ.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn new(imagery: ArrayD<f32>, reference: ArrayD<i64>) -> Result<Self> {
        trace!("Ingesting tile collection.");
        let layout = TileLayout::from_rank(imagery.ndim())?;

        if reference.ndim() == 0 {
            return Err(TileError::UnsupportedShape {
                rank: 0,
                expected: vec![1, 2, 3, 4],
            });
        }

        let imagery_tiles = imagery.len_of(Axis(0));
        let reference_tiles = reference.len_of(Axis(0));
        if imagery_tiles != reference_tiles {
            return Err(TileError::ShapeMismatch {
                imagery: imagery_tiles,
                reference: reference_tiles,
            });
        }

        debug!(
            "Tile collection with {imagery_tiles} tiles, layout {layout:?}, imagery shape {:?}.",
            imagery.shape()
        );
        Ok(Self {
            imagery,
            reference,
            layout,
        })
    }

    /// Reads `f32` imagery and `i64` reference labels from two `.npy` files.
    ///
    /// # Errors
    ///
    /// Returns `Npy` if either file cannot be read and any error of [`Self::new`].
    #[tracing::instrument(level = "debug")]
    pub fn from_npy<P>(imagery_path: P, reference_path: P) -> Result<Self>
    where
        P: AsRef<Path> + std::fmt::Debug,
    {
        debug!("Reading tiles from npy files.");
        let imagery: ArrayD<f32> =
            read_npy(imagery_path).map_err(|err| TileError::Npy(err.to_string()))?;
        let reference: ArrayD<i64> =
            read_npy(reference_path).map_err(|err| TileError::Npy(err.to_string()))?;
        Self::new(imagery, reference)
    }

    #[must_use]
    pub const fn imagery(&self) -> &ArrayD<f32> {
        &self.imagery
    }

    #[must_use]
    pub const fn reference(&self) -> &ArrayD<i64> {
        &self.reference
    }

    #[must_use]
    pub const fn layout(&self) -> TileLayout {
        self.layout
    }

    /// Number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.imagery.len_of(Axis(0))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the last imagery axis.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.imagery.shape().last().copied().unwrap_or(0)
    }

    /// Extracts the spectral curve of `tile_index` together with its label.
    ///
    /// # Errors
    ///
    /// Returns `TileIndexOutOfRange` for an index past the last tile,
    /// `EmptySpectrum` if any non-tile axis is empty and `EmptyRaster` if the
    /// tile carries no reference label.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn resolve_spectral_curve(&self, tile_index: usize) -> Result<SpectralCurve> {
        trace!("Resolving spectral curve.");
        check_tile_index(tile_index, self.len())?;
        if self.imagery.shape()[1..].contains(&0) {
            return Err(TileError::EmptySpectrum);
        }

        let intensities = match self.layout {
            TileLayout::Spatial => self
                .imagery
                .view()
                .into_dimensionality::<Ix3>()
                .map_err(|_| self.rank_error())?
                .slice(s![tile_index, 0, ..])
                .to_owned(),
            TileLayout::SpectroSpatial => self
                .imagery
                .view()
                .into_dimensionality::<Ix4>()
                .map_err(|_| self.rank_error())?
                .slice(s![tile_index, 0, 0, ..])
                .to_owned(),
        };

        let raw_label = self
            .reference
            .index_axis(Axis(0), tile_index)
            .iter()
            .next()
            .copied()
            .ok_or(TileError::EmptyRaster)?;

        Ok(SpectralCurve {
            wavelengths: wavelength_axis(intensities.len()),
            intensities,
            class_label: raw_label + 1,
        })
    }

    fn rank_error(&self) -> TileError {
        TileError::UnsupportedShape {
            rank: self.imagery.ndim(),
            expected: vec![self.layout.curve_rank()],
        }
    }
}

/// Validates raw arrays and extracts the spectral curve of `tile_index`.
///
/// # Errors
///
/// Returns any error of [`TileCollection::new`] or
/// [`TileCollection::resolve_spectral_curve`].
pub fn resolve_spectral_curve(
    imagery: ArrayD<f32>,
    reference: ArrayD<i64>,
    tile_index: usize,
) -> Result<SpectralCurve> {
    TileCollection::new(imagery, reference)?.resolve_spectral_curve(tile_index)
}

/// Evenly spaced wavelengths between 404 and 997 nm, one per channel.
#[must_use]
pub fn wavelength_axis(channel_count: usize) -> Array1<f32> {
    Array1::linspace(WAVELENGTH_MIN_NM, WAVELENGTH_MAX_NM, channel_count)
}

/// Selects three bands of one tile and returns them channel-last as `[height, width, 3]`.
///
/// `Spatial` reads `imagery[tile, bands, .., ..]`, `SpectroSpatial` reads
/// `imagery[tile, 0, bands, .., ..]`. No intensity scaling is applied.
///
/// # Errors
///
/// Returns `UnsupportedShape` if the rank does not match the layout,
/// `TileIndexOutOfRange` and `BandOutOfRange` for indices past the data and
/// `EmptySpectrum` if the group axis is empty.
#[tracing::instrument(level = "trace", skip(imagery))]
pub fn extract_rgb_composite(
    imagery: &ArrayD<f32>,
    tile_index: usize,
    bands: [usize; 3],
    layout: TileLayout,
) -> Result<Array3<f32>> {
    trace!("Extracting rgb composite.");
    let expected = layout.composite_rank();
    if imagery.ndim() != expected {
        return Err(TileError::UnsupportedShape {
            rank: imagery.ndim(),
            expected: vec![expected],
        });
    }
    check_tile_index(tile_index, imagery.len_of(Axis(0)))?;

    let tile = imagery.index_axis(Axis(0), tile_index);
    let cube: ArrayViewD<'_, f32> = match layout {
        TileLayout::Spatial => tile,
        TileLayout::SpectroSpatial => {
            if tile.len_of(Axis(0)) == 0 {
                return Err(TileError::EmptySpectrum);
            }
            tile.index_axis_move(Axis(0), 0)
        }
    };
    let cube = cube
        .into_dimensionality::<Ix3>()
        .map_err(|_| TileError::UnsupportedShape {
            rank: imagery.ndim(),
            expected: vec![expected],
        })?;

    let count = cube.len_of(Axis(0));
    if let Some(&band) = bands.iter().find(|&&band| band >= count) {
        return Err(TileError::BandOutOfRange { band, count });
    }

    Ok(to_channel_last(&cube.select(Axis(0), &bands)))
}

/// `[channel, height, width]` to `[height, width, channel]`, in standard layout.
#[must_use]
pub fn to_channel_last<S>(data: &ArrayBase<S, Ix3>) -> Array3<f32>
where
    S: Data<Elem = f32>,
{
    data.view()
        .permuted_axes([1, 2, 0])
        .as_standard_layout()
        .into_owned()
}

/// `[height, width, channel]` to `[channel, height, width]`, in standard layout.
#[must_use]
pub fn to_channel_first<S>(data: &ArrayBase<S, Ix3>) -> Array3<f32>
where
    S: Data<Elem = f32>,
{
    data.view()
        .permuted_axes([2, 0, 1])
        .as_standard_layout()
        .into_owned()
}

fn check_tile_index(index: usize, count: usize) -> Result<()> {
    if index >= count {
        return Err(TileError::TileIndexOutOfRange { index, count });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use ndarray::{Array, Array2, IxDyn};

    use super::*;

    #[allow(clippy::cast_precision_loss)]
    fn ramp(shape: &[usize]) -> ArrayD<f32> {
        let len = shape.iter().product();
        Array::from_shape_vec(IxDyn(shape), (0..len).map(|v| v as f32).collect())
            .expect("shape and length agree")
    }

    fn labels(shape: &[usize], values: Vec<i64>) -> ArrayD<i64> {
        Array::from_shape_vec(IxDyn(shape), values).expect("shape and length agree")
    }

    #[test]
    fn spatial_layout_from_rank_three() {
        let tiles = TileCollection::new(ramp(&[2, 3, 54]), labels(&[2], vec![0, 4])).unwrap();
        assert_eq!(tiles.layout(), TileLayout::Spatial);
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles.channel_count(), 54);
    }

    #[test]
    fn spectro_spatial_layout_from_rank_four() {
        let tiles =
            TileCollection::new(ramp(&[2, 1, 2, 10]), labels(&[2, 1, 1, 1], vec![3, 7])).unwrap();
        assert_eq!(tiles.layout(), TileLayout::SpectroSpatial);
    }

    #[test]
    fn rank_two_imagery_is_unsupported() {
        let result = resolve_spectral_curve(ramp(&[2, 54]), labels(&[2], vec![0, 1]), 0);
        assert!(matches!(
            result,
            Err(TileError::UnsupportedShape { rank: 2, .. })
        ));
    }

    #[test]
    fn rank_five_imagery_is_unsupported() {
        let result = TileCollection::new(ramp(&[1, 1, 1, 1, 4]), labels(&[1], vec![0]));
        assert!(matches!(
            result,
            Err(TileError::UnsupportedShape { rank: 5, .. })
        ));
    }

    #[test]
    fn tile_count_mismatch() {
        let result = TileCollection::new(ramp(&[3, 1, 8]), labels(&[2], vec![0, 1]));
        assert!(matches!(
            result,
            Err(TileError::ShapeMismatch {
                imagery: 3,
                reference: 2
            })
        ));
    }

    #[test]
    fn spatial_curve_reads_first_channel() {
        let tiles = TileCollection::new(ramp(&[2, 3, 54]), labels(&[2], vec![0, 4])).unwrap();
        let curve = tiles.resolve_spectral_curve(1).unwrap();

        assert_eq!(curve.wavelengths.len(), 54);
        assert_eq!(curve.intensities.len(), 54);
        assert_relative_eq!(curve.wavelengths[0], 404.0);
        assert_relative_eq!(curve.wavelengths[53], 997.0, max_relative = 1e-6);
        assert_relative_eq!(curve.intensities[0], 162.0);
        assert_relative_eq!(curve.intensities[53], 215.0);
        assert_eq!(curve.class_label, 5);
    }

    #[test]
    fn wavelengths_follow_channel_count() {
        let tiles = TileCollection::new(ramp(&[1, 1, 32]), labels(&[1], vec![0])).unwrap();
        let curve = tiles.resolve_spectral_curve(0).unwrap();
        assert_eq!(curve.wavelengths.len(), 32);
        assert_relative_eq!(curve.wavelengths[31], 997.0, max_relative = 1e-6);
    }

    #[test]
    fn spectro_spatial_curve_label_is_shifted_first_reference() {
        let reference = labels(&[2, 1, 2, 2], vec![9, 9, 9, 9, 6, 1, 2, 3]);
        let tiles = TileCollection::new(ramp(&[2, 2, 3, 10]), reference).unwrap();
        let curve = tiles.resolve_spectral_curve(1).unwrap();

        assert_eq!(curve.class_label, 7);
        assert_eq!(curve.intensities.len(), 10);
        assert_relative_eq!(curve.intensities[0], 60.0);
        assert_relative_eq!(curve.intensities[9], 69.0);
    }

    #[test]
    fn curve_tile_out_of_range() {
        let tiles = TileCollection::new(ramp(&[2, 1, 4]), labels(&[2], vec![0, 1])).unwrap();
        assert!(matches!(
            tiles.resolve_spectral_curve(2),
            Err(TileError::TileIndexOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn curve_without_channels() {
        let tiles = TileCollection::new(ramp(&[1, 1, 0]), labels(&[1], vec![0])).unwrap();
        assert!(matches!(
            tiles.resolve_spectral_curve(0),
            Err(TileError::EmptySpectrum)
        ));
    }

    #[test]
    fn composite_has_channel_last_shape() {
        let imagery = ramp(&[2, 32, 6, 4]);
        let composite =
            extract_rgb_composite(&imagery, 1, [25, 15, 5], TileLayout::Spatial).unwrap();

        assert_eq!(composite.shape(), &[6, 4, 3]);
        assert_relative_eq!(composite[(2, 3, 0)], imagery[[1, 25, 2, 3]]);
        assert_relative_eq!(composite[(2, 3, 1)], imagery[[1, 15, 2, 3]]);
        assert_relative_eq!(composite[(0, 1, 2)], imagery[[1, 5, 0, 1]]);
    }

    #[test]
    fn composite_skips_group_axis() {
        let imagery = ramp(&[1, 2, 8, 3, 3]);
        let composite =
            extract_rgb_composite(&imagery, 0, [7, 0, 3], TileLayout::SpectroSpatial).unwrap();

        assert_eq!(composite.shape(), &[3, 3, 3]);
        assert_relative_eq!(composite[(1, 2, 0)], imagery[[0, 0, 7, 1, 2]]);
        assert_relative_eq!(composite[(1, 2, 2)], imagery[[0, 0, 3, 1, 2]]);
    }

    #[test]
    fn composite_rank_must_match_layout() {
        let imagery = ramp(&[1, 8, 3, 3]);
        assert!(matches!(
            extract_rgb_composite(&imagery, 0, [0, 1, 2], TileLayout::SpectroSpatial),
            Err(TileError::UnsupportedShape { rank: 4, .. })
        ));
    }

    #[test]
    fn composite_band_out_of_range() {
        let imagery = ramp(&[1, 8, 3, 3]);
        assert!(matches!(
            extract_rgb_composite(&imagery, 0, [25, 15, 5], TileLayout::Spatial),
            Err(TileError::BandOutOfRange { band: 25, count: 8 })
        ));
    }

    #[test]
    fn channel_layout_round_trip() {
        let channel_first = ramp(&[3, 5, 7]).into_dimensionality::<Ix3>().unwrap();
        let channel_last = to_channel_last(&channel_first);
        assert_eq!(channel_last.shape(), &[5, 7, 3]);
        assert_eq!(to_channel_first(&channel_last), channel_first);
    }

    #[test]
    fn npy_round_trip_through_files() {
        use ndarray_npy::write_npy;

        let dir = std::env::temp_dir().join("hypertile_npy_test");
        std::fs::create_dir_all(&dir).unwrap();
        let imagery_path = dir.join("imagery.npy");
        let reference_path = dir.join("reference.npy");

        write_npy(&imagery_path, &ramp(&[2, 1, 6])).unwrap();
        write_npy(&reference_path, &Array2::<i64>::zeros((2, 1))).unwrap();

        let tiles = TileCollection::from_npy(&imagery_path, &reference_path).unwrap();
        assert_eq!(tiles.layout(), TileLayout::Spatial);
        assert_eq!(tiles.resolve_spectral_curve(0).unwrap().class_label, 1);
    }
}
