use std::path::Path;

use anyhow::{bail, Result};
use plotters::{coord::Shift, prelude::*};
use tracing::trace;

use super::{
    allocate_buffer, save_png, AXIS_STYLE, CAPTION_STYLE, CHART_MARGIN, LEGEND_PADDING,
    LEGEND_SWATCH_MAX,
};
use crate::core::palette::ClassPalette;

pub mod class_map;
pub mod composite;
pub mod panels;
pub mod spectral;

pub type PngArea<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngBundle {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Renders into a fresh white RGB8 buffer and optionally saves it as PNG.
///
/// The bitmap backend is dropped before the buffer is saved or returned.
#[tracing::instrument(level = "trace", skip(draw))]
pub(crate) fn render<F>(resolution: (u32, u32), path: Option<&Path>, draw: F) -> Result<PngBundle>
where
    F: FnOnce(&PngArea<'_>) -> Result<()>,
{
    let (width, height) = resolution;
    if width == 0 || height == 0 {
        bail!("resolution must be non-zero, got {width}x{height}");
    }

    let mut buffer = allocate_buffer(width, height);

    {
        let root = BitMapBackend::with_buffer(&mut buffer[..], (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    } // dropping bitmap backend

    save_png(path, &buffer, width, height)?;

    Ok(PngBundle {
        data: buffer,
        width,
        height,
    })
}

/// Draws a `height` x `width` grid of filled cells with row 0 at the top
/// and no axes.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn draw_pixel_grid<F>(
    area: &PngArea<'_>,
    title: &str,
    height: usize,
    width: usize,
    color_at: F,
) -> Result<()>
where
    F: Fn(usize, usize) -> RGBColor,
{
    trace!("Drawing pixel grid.");
    if height == 0 || width == 0 {
        bail!("cannot draw an empty {height}x{width} raster");
    }

    let mut chart = ChartBuilder::on(area)
        .caption(title, CAPTION_STYLE.into_font())
        .margin(CHART_MARGIN)
        .build_cartesian_2d(0.0..(width as f32), (height as f32)..0.0)?;

    let color_at = &color_at;
    chart.draw_series((0..height).flat_map(|row| {
        (0..width).map(move |col| {
            Rectangle::new(
                [
                    (col as f32, row as f32),
                    ((col + 1) as f32, (row + 1) as f32),
                ],
                color_at(row, col).filled(),
            )
        })
    }))?;

    Ok(())
}

/// Draws one swatch and name per palette entry, top to bottom.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) fn draw_legend(area: &PngArea<'_>, palette: &ClassPalette) -> Result<()> {
    trace!("Drawing class legend.");
    let (_, legend_height) = area.dim_in_pixel();
    let rows = palette.len().max(1) as u32;
    let single_space = (legend_height / (2 * rows + 1)).min(LEGEND_SWATCH_MAX) as i32;

    for (i, entry) in palette.entries().iter().enumerate() {
        let [r, g, b] = entry.rgb;
        let top = (2 * i as i32 + 1) * single_space;
        let start = (LEGEND_PADDING, top);
        let end = (LEGEND_PADDING + single_space, top + single_space);
        area.draw(&Rectangle::new([start, end], RGBColor(r, g, b).filled()))?;
        area.draw(&Rectangle::new([start, end], BLACK))?;
        area.draw(&Text::new(
            entry.name.clone(),
            (
                LEGEND_PADDING + single_space * 4 / 3,
                top + single_space / 2 - AXIS_STYLE.1 / 2,
            ),
            AXIS_STYLE.into_font(),
        ))?;
    }

    Ok(())
}
