//! Scene snapshot model.
//!
//! A scene is a flat list of [`SceneEntity`] values as produced by an external
//! store. Geometry lives in dedicated fields; everything else is an open style
//! map so snapshots can carry properties this crate does not animate.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Numeric properties considered by the diff, in diff order.
pub const NUMERIC_PROPERTIES: [&str; 18] = [
    "x",
    "y",
    "width",
    "height",
    "opacity",
    "rotation",
    "scale_x",
    "scale_y",
    "corner_radius",
    "stroke_width",
    "shadow_offset_x",
    "shadow_offset_y",
    "shadow_blur",
    "blur",
    "brightness",
    "contrast",
    "saturate",
    "font_size",
];

/// Color properties considered by the diff. They animate through a progress
/// channel rather than per-channel values.
pub const COLOR_PROPERTIES: [&str; 4] = ["fill", "stroke", "shadow_color", "text_color"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f64),
    Color(String),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneEntity {
    pub id: String,
    /// Fallback identity when ids differ between snapshots.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub style: IndexMap<String, StyleValue>,
}

/// Value a numeric property takes when an entity does not define it.
pub fn default_value(property: &str) -> f64 {
    match property {
        "opacity" | "scale_x" | "scale_y" | "brightness" | "contrast" | "saturate" => 1.0,
        _ => 0.0,
    }
}

impl SceneEntity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Point { x, y };
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Size { width, height };
        self
    }

    pub fn with_number(mut self, property: &str, value: f64) -> Self {
        self.set_number(property, value);
        self
    }

    pub fn with_color(mut self, property: &str, color: impl Into<String>) -> Self {
        self.set_color(property, color);
        self
    }

    /// Numeric value of `property` if the entity defines it. Geometry is
    /// always defined.
    pub fn number(&self, property: &str) -> Option<f64> {
        match property {
            "x" => Some(self.position.x),
            "y" => Some(self.position.y),
            "width" => Some(self.size.width),
            "height" => Some(self.size.height),
            _ => match self.style.get(property)? {
                StyleValue::Number(n) => Some(*n),
                StyleValue::Color(_) => None,
            },
        }
    }

    /// Numeric value of `property`, or its default.
    pub fn number_or_default(&self, property: &str) -> f64 {
        self.number(property)
            .unwrap_or_else(|| default_value(property))
    }

    pub fn set_number(&mut self, property: &str, value: f64) {
        match property {
            "x" => self.position.x = value,
            "y" => self.position.y = value,
            "width" => self.size.width = value,
            "height" => self.size.height = value,
            _ => {
                self.style
                    .insert(property.to_string(), StyleValue::Number(value));
            }
        }
    }

    pub fn color(&self, property: &str) -> Option<&str> {
        match self.style.get(property)? {
            StyleValue::Color(c) => Some(c.as_str()),
            StyleValue::Number(_) => None,
        }
    }

    pub fn set_color(&mut self, property: &str, color: impl Into<String>) {
        self.style
            .insert(property.to_string(), StyleValue::Color(color.into()));
    }

    #[inline]
    pub fn opacity(&self) -> f64 {
        self.number_or_default("opacity")
    }
}

/// Parse a JSON array of entities.
pub fn parse_scene_json(json: &str) -> serde_json::Result<Vec<SceneEntity>> {
    serde_json::from_str(json)
}
