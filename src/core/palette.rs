use ndarray::{ArrayBase, Data, Dimension};
use ndarray_stats::QuantileExt;
use scarlet::color::RGBColor;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::error::{Result, TileError};

const DEFAULT_COLORS: [&str; 10] = [
    "white", "red", "green", "yellow", "orange", "pink", "blue", "cyan", "black", "grey",
];
const DEFAULT_NAMES: [&str; 10] = ["No Data", "a", "b", "c", "d", "e", "f", "g", "h", "i"];

/// One palette slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    pub name: String,
    /// Colour as written in the configuration, e.g. `"orange"` or `"#ff8800"`.
    pub color: String,
    pub rgb: [u8; 3],
}

/// Index-aligned class colours and names. Slot 0 is the "No Data" class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PaletteSpec", into = "PaletteSpec")]
pub struct ClassPalette {
    entries: Vec<ClassEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PaletteSpec {
    colors: Vec<String>,
    names: Vec<String>,
}

/// Leading palette entries needed to colour one raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteSelection {
    pub colors: Vec<[u8; 3]>,
    pub names: Vec<String>,
    pub color_count: usize,
}

impl ClassPalette {
    /// Builds a palette from colour identifiers and class names.
    ///
    /// Colours are X11 colour names or `#rrggbb` hex codes.
    ///
    /// # Errors
    ///
    /// Returns `PaletteLengthMismatch` if the two lists differ in length,
    /// `EmptyPalette` if both are empty and `UnknownColor` for colours that
    /// cannot be parsed.
    pub fn new(colors: Vec<String>, names: Vec<String>) -> Result<Self> {
        if colors.len() != names.len() {
            return Err(TileError::PaletteLengthMismatch {
                colors: colors.len(),
                names: names.len(),
            });
        }
        if colors.is_empty() {
            return Err(TileError::EmptyPalette);
        }

        let entries = colors
            .into_iter()
            .zip(names)
            .map(|(color, name)| {
                let rgb = parse_color(&color)?;
                Ok(ClassEntry { name, color, rgb })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[ClassEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selects as many leading entries as the raster's largest label needs.
    ///
    /// A raster whose maximum label is `m` needs `m + 1` entries; a raster
    /// holding only negative labels needs the "No Data" entry alone.
    ///
    /// # Errors
    ///
    /// Returns `EmptyRaster` for a raster without elements and
    /// `PaletteExhausted` if more entries are needed than configured.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn class_palette_for<S, D>(&self, raster: &ArrayBase<S, D>) -> Result<PaletteSelection>
    where
        S: Data<Elem = i64>,
        D: Dimension,
    {
        trace!("Selecting palette entries for raster.");
        let max_label = *raster.max().map_err(|_| TileError::EmptyRaster)?;

        let required = if max_label < 0 {
            1
        } else {
            usize::try_from(max_label).map_or(usize::MAX, |label| label.saturating_add(1))
        };

        if required > self.entries.len() {
            return Err(TileError::PaletteExhausted {
                required,
                available: self.entries.len(),
            });
        }

        let selected = &self.entries[..required];
        Ok(PaletteSelection {
            colors: selected.iter().map(|entry| entry.rgb).collect(),
            names: selected.iter().map(|entry| entry.name.clone()).collect(),
            color_count: required,
        })
    }
}

impl Default for ClassPalette {
    fn default() -> Self {
        Self {
            entries: DEFAULT_COLORS
                .iter()
                .zip(DEFAULT_NAMES)
                .map(|(color, name)| ClassEntry {
                    name: name.to_string(),
                    color: (*color).to_string(),
                    rgb: parse_color(color).unwrap_or([0, 0, 0]),
                })
                .collect(),
        }
    }
}

impl TryFrom<PaletteSpec> for ClassPalette {
    type Error = TileError;

    fn try_from(spec: PaletteSpec) -> Result<Self> {
        Self::new(spec.colors, spec.names)
    }
}

impl From<ClassPalette> for PaletteSpec {
    fn from(palette: ClassPalette) -> Self {
        let (colors, names) = palette
            .entries
            .into_iter()
            .map(|entry| (entry.color, entry.name))
            .unzip();
        Self { colors, names }
    }
}

impl PaletteSelection {
    /// Colour of `label`. Labels outside the selection fall back to slot 0.
    #[must_use]
    pub fn color_for(&self, label: i64) -> [u8; 3] {
        usize::try_from(label)
            .ok()
            .and_then(|index| self.colors.get(index))
            .or_else(|| self.colors.first())
            .copied()
            .unwrap_or([255, 255, 255])
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_color(color: &str) -> Result<[u8; 3]> {
    let parsed = if color.starts_with('#') {
        RGBColor::from_hex_code(color)
    } else {
        RGBColor::from_color_name(color)
    }
    .map_err(|_| TileError::UnknownColor(color.to_string()))?;

    let channel = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    Ok([channel(parsed.r), channel(parsed.g), channel(parsed.b)])
}
