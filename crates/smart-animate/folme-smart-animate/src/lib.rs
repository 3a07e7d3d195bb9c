//! Smart animate: morph one scene snapshot into another.
//!
//! [`analyze_diff`] compares two entity lists; [`SmartAnimator`] turns the
//! diff into `folme-core` manager runs and streams the in-between scene to a
//! render sink.

pub mod animator;
pub mod color;
pub mod config;
pub mod diff;
pub mod scene;

pub use animator::SmartAnimator;
pub use color::{colors_equal, interpolate_color, Rgba};
pub use config::AnimateConfig;
pub use diff::{analyze_diff, diff_entities, DiffValue, MatchedEntity, PropertyDiff, SceneDiff};
pub use scene::{
    default_value, parse_scene_json, Point, SceneEntity, Size, StyleValue, COLOR_PROPERTIES,
    NUMERIC_PROPERTIES,
};
