//! Property naming helpers and convergence thresholds.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Flat `{property name -> value}` map, ordered by first insertion.
pub type PropertyMap = IndexMap<String, f64>;

/// Smallest change of a property that is visible on screen.
///
/// The termination test of a force chain derives both of its tolerances from
/// this value: the value tolerance is the change itself, the speed tolerance is
/// [`MinVisibleChange::min_visible_speed`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinVisibleChange(pub f64);

impl MinVisibleChange {
    pub const PIXELS: Self = Self(1.0);
    pub const ROTATION: Self = Self(0.1);
    pub const ALPHA: Self = Self(1.0 / 256.0);
    pub const SCALE: Self = Self(1.0 / 500.0);
    pub const PROGRESS: Self = Self(1.0 / 1000.0);

    /// Classify a property by name. Unknown names are treated as pixel-valued.
    pub fn for_property(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.contains("opacity") || lower.contains("alpha") {
            Self::ALPHA
        } else if lower.contains("progress") {
            Self::PROGRESS
        } else if lower.contains("rotation") {
            Self::ROTATION
        } else if lower.contains("scale")
            || lower.contains("brightness")
            || lower.contains("contrast")
            || lower.contains("saturate")
        {
            Self::SCALE
        } else {
            Self::PIXELS
        }
    }

    /// Speed (units per second) below which motion is no longer visible.
    #[inline]
    pub fn min_visible_speed(self) -> f64 {
        self.0 * 0.75 * 62.5
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for MinVisibleChange {
    fn default() -> Self {
        Self::PIXELS
    }
}
