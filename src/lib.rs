#![warn(clippy::pedantic, clippy::nursery)]
pub mod core;
pub mod vis;


pub use crate::core::{
    augment::{Augmentation, SpectralNoise, SpectralScale},
    config::Config,
    display::{apply_display_scale, DisplayScale},
    duration::format_duration,
    error::TileError,
    palette::{ClassEntry, ClassPalette, PaletteSelection},
    tiles::{
        extract_rgb_composite, resolve_spectral_curve, to_channel_first, to_channel_last,
        wavelength_axis, SpectralCurve, TileCollection, TileLayout,
    },
};
pub use crate::vis::plotting::png::PngBundle;
