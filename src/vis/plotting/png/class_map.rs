use std::path::Path;

use anyhow::Result;
use ndarray::{ArrayBase, Data, Ix2};
use plotters::style::RGBColor;
use tracing::trace;

use super::{draw_legend, draw_pixel_grid, render, PngArea, PngBundle};
use crate::{
    core::palette::ClassPalette,
    vis::plotting::{LEGEND_WIDTH, PANEL_RESOLUTION},
};

pub const DEFAULT_CLASS_MAP_TITLE: &str = "Reference data";

/// Draws a `[height, width]` label raster coloured by the palette.
///
/// If `legend` is set, a strip on the right lists every palette entry.
pub(crate) fn draw_class_map<S>(
    area: &PngArea<'_>,
    raster: &ArrayBase<S, Ix2>,
    palette: &ClassPalette,
    title: &str,
    legend: bool,
) -> Result<()>
where
    S: Data<Elem = i64>,
{
    trace!("Drawing class map.");
    let selection = palette.class_palette_for(raster)?;

    let map_area = if legend {
        let (area_width, _) = area.dim_in_pixel();
        let (map_area, legend_area) =
            area.split_horizontally(area_width.saturating_sub(LEGEND_WIDTH));
        draw_legend(&legend_area, palette)?;
        map_area
    } else {
        area.clone()
    };

    let (height, width) = raster.dim();
    draw_pixel_grid(&map_area, title, height, width, |row, col| {
        let [r, g, b] = selection.color_for(raster[(row, col)]);
        RGBColor(r, g, b)
    })
}

/// Generates a discrete class map of a label raster.
///
/// Saves the plot to the optionally provided path as a PNG,
/// returns the raw pixel buffer.
#[tracing::instrument(level = "trace", skip(raster, palette))]
pub fn class_map_plot<S>(
    raster: &ArrayBase<S, Ix2>,
    palette: &ClassPalette,
    path: Option<&Path>,
    title: Option<&str>,
    legend: bool,
    resolution: Option<(u32, u32)>,
) -> Result<PngBundle>
where
    S: Data<Elem = i64>,
{
    trace!("Generating class map plot.");
    let title = title.unwrap_or(DEFAULT_CLASS_MAP_TITLE);
    let resolution = resolution.unwrap_or(if legend {
        (PANEL_RESOLUTION.0 + LEGEND_WIDTH, PANEL_RESOLUTION.1)
    } else {
        PANEL_RESOLUTION
    });
    render(resolution, path, |area| {
        draw_class_map(area, raster, palette, title, legend)
    })
}

#[cfg(test)]
mod test {
    use ndarray::{arr2, Array2};

    use super::*;
    use crate::{
        core::error::TileError,
        tests::{clean_files, setup_folder},
    };

    const COMMON_PATH: &str = "tests/vis/plotting/png/class_map";

    fn raster() -> Array2<i64> {
        Array2::from_shape_fn((20, 30), |(row, col)| ((row / 5 + col / 10) % 6) as i64)
    }

    #[test]
    fn test_class_map_plot_with_legend() -> Result<()> {
        let path = Path::new(COMMON_PATH);
        setup_folder(path)?;
        let files = vec![path.join("class_map_legend.png")];
        clean_files(&files)?;

        let bundle = class_map_plot(
            &raster(),
            &ClassPalette::default(),
            Some(files[0].as_path()),
            None,
            true,
            None,
        )?;

        assert!(files[0].is_file());
        assert_eq!(bundle.width, PANEL_RESOLUTION.0 + LEGEND_WIDTH);
        Ok(())
    }

    #[test]
    fn test_class_map_plot_without_legend() -> Result<()> {
        let path = Path::new(COMMON_PATH);
        setup_folder(path)?;
        let files = vec![path.join("class_map.png")];
        clean_files(&files)?;

        class_map_plot(
            &raster(),
            &ClassPalette::default(),
            Some(files[0].as_path()),
            Some("Classified data"),
            false,
            Some((300, 200)),
        )?;

        assert!(files[0].is_file());
        Ok(())
    }

    #[test]
    fn test_class_map_plot_palette_exhausted() {
        let raster = arr2(&[[0_i64, 12]]);
        let err = class_map_plot(&raster, &ClassPalette::default(), None, None, true, None)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TileError>(),
            Some(TileError::PaletteExhausted { required: 13, .. })
        ));
    }
}
