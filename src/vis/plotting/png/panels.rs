use std::path::Path;

use anyhow::Result;
use ndarray::{ArrayBase, Data, Ix2, Ix3};
use tracing::trace;

use super::{
    class_map::{draw_class_map, DEFAULT_CLASS_MAP_TITLE},
    composite::{draw_composite, DEFAULT_COMPOSITE_TITLE},
    render, PngBundle,
};
use crate::{
    core::palette::ClassPalette,
    vis::plotting::{LEGEND_WIDTH, PANEL_RESOLUTION},
};

pub const CLASSIFIED_TITLE: &str = "Classified data";

/// Generates a composite next to its reference class map with legend.
///
/// Saves the plot to the optionally provided path as a PNG,
/// returns the raw pixel buffer.
#[tracing::instrument(level = "trace", skip(composite, reference, palette))]
pub fn image_reference_plot<C, R>(
    composite: &ArrayBase<C, Ix3>,
    reference: &ArrayBase<R, Ix2>,
    palette: &ClassPalette,
    path: Option<&Path>,
    resolution: Option<(u32, u32)>,
) -> Result<PngBundle>
where
    C: Data<Elem = f32>,
    R: Data<Elem = i64>,
{
    trace!("Generating image reference plot.");
    let resolution =
        resolution.unwrap_or((2 * PANEL_RESOLUTION.0 + LEGEND_WIDTH, PANEL_RESOLUTION.1));

    render(resolution, path, |area| {
        let (image_area, reference_area) =
            area.split_horizontally(area.dim_in_pixel().0.saturating_sub(LEGEND_WIDTH) / 2);
        draw_composite(&image_area, composite, DEFAULT_COMPOSITE_TITLE)?;
        draw_class_map(
            &reference_area,
            reference,
            palette,
            DEFAULT_CLASS_MAP_TITLE,
            true,
        )
    })
}

/// Generates a composite, its reference class map with legend and a
/// classification result side by side.
///
/// Saves the plot to the optionally provided path as a PNG,
/// returns the raw pixel buffer.
#[tracing::instrument(level = "trace", skip(composite, reference, classified, palette))]
pub fn classified_plot<C, R, K>(
    composite: &ArrayBase<C, Ix3>,
    reference: &ArrayBase<R, Ix2>,
    classified: &ArrayBase<K, Ix2>,
    palette: &ClassPalette,
    path: Option<&Path>,
    resolution: Option<(u32, u32)>,
) -> Result<PngBundle>
where
    C: Data<Elem = f32>,
    R: Data<Elem = i64>,
    K: Data<Elem = i64>,
{
    trace!("Generating classified plot.");
    let resolution =
        resolution.unwrap_or((3 * PANEL_RESOLUTION.0 + LEGEND_WIDTH, PANEL_RESOLUTION.1));

    render(resolution, path, |area| {
        let panel_width = area.dim_in_pixel().0.saturating_sub(LEGEND_WIDTH) / 3;
        let (image_area, rest) = area.split_horizontally(panel_width);
        let (reference_area, classified_area) =
            rest.split_horizontally(panel_width + LEGEND_WIDTH);

        draw_composite(&image_area, composite, DEFAULT_COMPOSITE_TITLE)?;
        draw_class_map(
            &reference_area,
            reference,
            palette,
            DEFAULT_CLASS_MAP_TITLE,
            true,
        )?;
        draw_class_map(&classified_area, classified, palette, CLASSIFIED_TITLE, false)
    })
}
