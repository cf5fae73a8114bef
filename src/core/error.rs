use thiserror::Error;

/// Errors raised while ingesting, slicing or colouring tiles.
#[derive(Debug, Error)]
pub enum TileError {
    #[error("unsupported imagery rank {rank}, expected one of {expected:?}")]
    UnsupportedShape { rank: usize, expected: Vec<usize> },

    #[error("imagery holds {imagery} tiles but reference holds {reference}")]
    ShapeMismatch { imagery: usize, reference: usize },

    #[error("raster needs {required} palette entries but only {available} are configured")]
    PaletteExhausted { required: usize, available: usize },

    #[error("palette has {colors} colors but {names} names")]
    PaletteLengthMismatch { colors: usize, names: usize },

    #[error("palette must contain at least one entry")]
    EmptyPalette,

    #[error("unknown color '{0}'")]
    UnknownColor(String),

    #[error("tile index {index} out of range for {count} tiles")]
    TileIndexOutOfRange { index: usize, count: usize },

    #[error("band index {band} out of range for {count} channels")]
    BandOutOfRange { band: usize, count: usize },

    #[error("imagery has no spectral channels")]
    EmptySpectrum,

    #[error("raster contains no labels")]
    EmptyRaster,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("failed to read npy file: {0}")]
    Npy(String),
}

pub type Result<T> = std::result::Result<T, TileError>;
