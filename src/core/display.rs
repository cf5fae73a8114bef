use ndarray::{Array3, ArrayBase, Data, Ix3};
use serde::{Deserialize, Serialize};

/// Maps raw reflectance values into the displayable `[0, 1]` range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DisplayScale {
    DivideBy(f32),
    MultiplyBy(f32),
}

impl DisplayScale {
    /// Scaling used for natural colour composites of full tiles.
    pub const FULL_COMPOSITE: Self = Self::DivideBy(3000.0);
    /// Scaling used for composites of three reflectance bands.
    pub const RGB_TRIPLE: Self = Self::MultiplyBy(20000.0);

    #[must_use]
    pub fn apply(self, value: f32) -> f32 {
        match self {
            Self::DivideBy(divisor) => value / divisor,
            Self::MultiplyBy(factor) => value * factor,
        }
    }
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self::FULL_COMPOSITE
    }
}

/// Scales a composite and clamps it to `[0, 1]`. Non-finite results become 0.
#[must_use]
pub fn apply_display_scale<S>(composite: &ArrayBase<S, Ix3>, scale: DisplayScale) -> Array3<f32>
where
    S: Data<Elem = f32>,
{
    composite.mapv(|value| {
        let scaled = scale.apply(value);
        if scaled.is_finite() {
            scaled.clamp(0.0, 1.0)
        } else {
            0.0
        }
    })
}
