use std::path::Path;

use anyhow::{bail, Result};
use ndarray::{ArrayBase, Data, Ix3};
use plotters::style::RGBColor;
use tracing::trace;

use super::{draw_pixel_grid, render, PngArea, PngBundle};
use crate::vis::plotting::{to_channel, PANEL_RESOLUTION};

pub const DEFAULT_COMPOSITE_TITLE: &str = "Natural color composite";

/// Draws a channel-last `[height, width, 3]` composite scaled to `[0, 1]`.
pub(crate) fn draw_composite<S>(
    area: &PngArea<'_>,
    composite: &ArrayBase<S, Ix3>,
    title: &str,
) -> Result<()>
where
    S: Data<Elem = f32>,
{
    trace!("Drawing composite.");
    let (height, width, channels) = composite.dim();
    if channels != 3 {
        bail!("composite must have 3 channels, got {channels}");
    }

    draw_pixel_grid(area, title, height, width, |row, col| {
        RGBColor(
            to_channel(composite[(row, col, 0)]),
            to_channel(composite[(row, col, 1)]),
            to_channel(composite[(row, col, 2)]),
        )
    })
}

/// Generates an image of a band composite.
///
/// Expects values already mapped into the display range, see
/// `core::display::apply_display_scale`. Saves the plot to the optionally
/// provided path as a PNG and returns the raw pixel buffer.
#[tracing::instrument(level = "trace", skip(composite))]
pub fn composite_plot<S>(
    composite: &ArrayBase<S, Ix3>,
    path: Option<&Path>,
    title: Option<&str>,
    resolution: Option<(u32, u32)>,
) -> Result<PngBundle>
where
    S: Data<Elem = f32>,
{
    trace!("Generating composite plot.");
    let title = title.unwrap_or(DEFAULT_COMPOSITE_TITLE);
    render(resolution.unwrap_or(PANEL_RESOLUTION), path, |area| {
        draw_composite(area, composite, title)
    })
}

#[cfg(test)]
mod test {
    use ndarray::{Array3, ArrayD, IxDyn};

    use super::*;
    use crate::{
        core::{
            display::{apply_display_scale, DisplayScale},
            tiles::{extract_rgb_composite, TileLayout},
        },
        tests::{clean_files, setup_folder},
    };

    const COMMON_PATH: &str = "tests/vis/plotting/png/composite";

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_composite_plot() -> Result<()> {
        let path = Path::new(COMMON_PATH);
        setup_folder(path)?;
        let files = vec![path.join("composite.png")];
        clean_files(&files)?;

        let imagery = ArrayD::from_shape_fn(IxDyn(&[1, 32, 16, 24]), |index| {
            (index[1] * 90 + index[2] * 10 + index[3]) as f32
        });
        let composite = extract_rgb_composite(&imagery, 0, [25, 15, 5], TileLayout::Spatial)?;
        let composite = apply_display_scale(&composite, DisplayScale::FULL_COMPOSITE);

        let bundle = composite_plot(&composite, Some(files[0].as_path()), None, None)?;

        assert!(files[0].is_file());
        assert_eq!(
            bundle.data.len(),
            PANEL_RESOLUTION.0 as usize * PANEL_RESOLUTION.1 as usize * 3
        );
        Ok(())
    }

    #[test]
    fn test_composite_plot_no_path() -> Result<()> {
        let composite = Array3::from_elem((4, 4, 3), 0.5);
        let bundle = composite_plot(&composite, None, Some("grey"), Some((200, 150)))?;
        assert_eq!(bundle.data.len(), 200 * 150 * 3);
        Ok(())
    }

    #[test]
    fn test_composite_plot_wrong_channel_count() {
        let composite = Array3::from_elem((4, 4, 2), 0.5);
        assert!(composite_plot(&composite, None, None, None).is_err());
    }
}
