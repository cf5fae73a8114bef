use std::path::Path;

use anyhow::Result;
use ndarray_stats::QuantileExt;
use plotters::prelude::*;
use tracing::trace;

use super::{render, PngArea, PngBundle};
use crate::{
    core::{
        augment::Augmentation,
        tiles::{SpectralCurve, TileCollection},
    },
    vis::plotting::{
        padded_range, AXIS_LABEL_AREA, AXIS_STYLE, CAPTION_STYLE, CHART_MARGIN, COLORS,
        LEGEND_OPACITY, LEGEND_PATH_LENGTH, PANEL_RESOLUTION, STANDARD_RESOLUTION, X_MARGIN,
        Y_MARGIN,
    },
};

pub const DEFAULT_CURVE_TITLE: &str = "Spectral curve for pixel #";
pub const ORIGINAL_CURVE_TITLE: &str = "Original spectral curve for pixel #";
pub const AUGMENTED_CURVE_TITLE: &str = "Augmented spectral curve for pixel #";
pub const WAVELENGTH_LABEL: &str = "Wavelength [nm]";

/// Draws one spectral curve over its wavelength axis, labelled with its class.
pub(crate) fn draw_spectral_curve(
    area: &PngArea<'_>,
    curve: &SpectralCurve,
    caption: &str,
    color: RGBColor,
) -> Result<()> {
    trace!("Drawing spectral curve.");
    let (x_min, x_max) = padded_range(
        *curve.wavelengths.min()?,
        *curve.wavelengths.max()?,
        X_MARGIN,
    );
    let (y_min, y_max) = padded_range(
        *curve.intensities.min()?,
        *curve.intensities.max()?,
        Y_MARGIN,
    );

    let mut chart = ChartBuilder::on(area)
        .caption(caption, CAPTION_STYLE.into_font())
        .margin(CHART_MARGIN)
        .x_label_area_size(AXIS_LABEL_AREA)
        .y_label_area_size(AXIS_LABEL_AREA)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(WAVELENGTH_LABEL)
        .x_label_style(AXIS_STYLE.into_font())
        .y_label_style(AXIS_STYLE.into_font())
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            curve
                .wavelengths
                .iter()
                .zip(curve.intensities.iter())
                .map(|(x, y)| (*x, *y)),
            color,
        ))?
        .label(format!("class #{}", curve.class_label))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + LEGEND_PATH_LENGTH, y)], color));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(LEGEND_OPACITY))
        .border_style(BLACK)
        .label_font(AXIS_STYLE.into_font())
        .draw()?;

    Ok(())
}

/// Generates the spectral curve plot of one tile.
///
/// The caption reads `"<title> <tile_index>"`. Saves the plot to the
/// optionally provided path as a PNG, returns the raw pixel buffer.
#[tracing::instrument(level = "trace", skip(tiles))]
pub fn spectral_curve_plot(
    tiles: &TileCollection,
    tile_index: usize,
    path: Option<&Path>,
    title: Option<&str>,
    resolution: Option<(u32, u32)>,
) -> Result<PngBundle> {
    trace!("Generating spectral curve plot.");
    let curve = tiles.resolve_spectral_curve(tile_index)?;
    let caption = format!("{} {tile_index}", title.unwrap_or(DEFAULT_CURVE_TITLE));

    render(resolution.unwrap_or(STANDARD_RESOLUTION), path, |area| {
        draw_spectral_curve(area, &curve, &caption, COLORS[0])
    })
}

/// Generates a side-by-side plot of a tile's spectral curve before and
/// after applying `augmentation` to the whole collection.
///
/// Saves the plot to the optionally provided path as a PNG,
/// returns the raw pixel buffer.
#[tracing::instrument(level = "trace", skip(tiles, augmentation))]
pub fn augmentation_plot(
    tiles: &TileCollection,
    tile_index: usize,
    augmentation: &dyn Augmentation,
    path: Option<&Path>,
    resolution: Option<(u32, u32)>,
) -> Result<PngBundle> {
    trace!("Generating augmentation plot.");
    let original = tiles.resolve_spectral_curve(tile_index)?;
    let augmented = augmentation
        .augment(tiles)?
        .resolve_spectral_curve(tile_index)?;

    let resolution = resolution.unwrap_or((2 * PANEL_RESOLUTION.0, PANEL_RESOLUTION.1 / 2 + 200));
    render(resolution, path, |area| {
        let (left, right) = area.split_horizontally(area.dim_in_pixel().0 / 2);
        draw_spectral_curve(
            &left,
            &original,
            &format!("{ORIGINAL_CURVE_TITLE} {tile_index}"),
            COLORS[0],
        )?;
        draw_spectral_curve(
            &right,
            &augmented,
            &format!("{AUGMENTED_CURVE_TITLE} {tile_index}"),
            COLORS[1],
        )
    })
}
