use std::path::Path;

use anyhow::{Context, Result};
use plotters::style::{RGBColor, BLACK, BLUE, GREEN, MAGENTA, RED};
use tracing::trace;

pub mod png;

pub const STANDARD_RESOLUTION: (u32, u32) = (800, 600);
pub const PANEL_RESOLUTION: (u32, u32) = (600, 600);
pub const CAPTION_STYLE: (&str, i32) = ("sans-serif", 30);
pub const AXIS_STYLE: (&str, i32) = ("sans-serif", 20);
pub const CHART_MARGIN: u32 = 25;
pub const AXIS_LABEL_AREA: u32 = 60;
pub const LEGEND_WIDTH: u32 = 180;
pub const LEGEND_PADDING: i32 = 10;
pub const LEGEND_SWATCH_MAX: u32 = 30;
pub const LEGEND_OPACITY: f64 = 0.8;
pub const LEGEND_PATH_LENGTH: i32 = 20;
pub const X_MARGIN: f32 = 0.01;
pub const Y_MARGIN: f32 = 0.1;
pub const COLORS: [RGBColor; 5] = [BLUE, RED, GREEN, MAGENTA, BLACK];

/// Allocates an RGB8 pixel buffer for an image of the given size.
#[tracing::instrument(level = "trace")]
pub(crate) fn allocate_buffer(width: u32, height: u32) -> Vec<u8> {
    trace!("Allocating buffer.");
    vec![0; width as usize * height as usize * 3]
}

/// Writes an RGB8 buffer as PNG if a path is given.
#[tracing::instrument(level = "trace", skip(buffer))]
pub(crate) fn save_png(path: Option<&Path>, buffer: &[u8], width: u32, height: u32) -> Result<()> {
    if let Some(path) = path {
        trace!("Saving png.");
        image::save_buffer_with_format(
            path,
            buffer,
            width,
            height,
            image::ColorType::Rgb8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("Failed to save plot to {}", path.display()))?;
    }
    Ok(())
}

/// Pads a value range so that flat data still spans a drawable interval.
pub(crate) fn padded_range(min: f32, max: f32, margin: f32) -> (f32, f32) {
    let range = max - min;
    if range <= f32::EPSILON {
        let pad = (min.abs() * margin).max(1.0);
        (min - pad, max + pad)
    } else {
        (range.mul_add(-margin, min), range.mul_add(margin, max))
    }
}

/// Converts a display value in `[0, 1]` to an 8 bit channel.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn to_channel(value: f32) -> u8 {
    if value.is_finite() {
        (value.clamp(0.0, 1.0) * 255.0).round() as u8
    } else {
        0
    }
}
