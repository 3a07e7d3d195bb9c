//! Typed configuration for the timeline and for force/easing assignment.
//!
//! Every field has an explicit default; a missing field in JSON falls back to
//! it field by field.

use serde::{Deserialize, Serialize};

use crate::easing::Curve;
use crate::error::MotionError;

/// Timeline tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Upper bound for one frame's raw delta. Frames after a suspended host
    /// would otherwise integrate a huge step in one go.
    pub max_delta_ms: f64,
    /// Advisory slow-motion factor; deltas are divided by it.
    pub time_scale: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            max_delta_ms: 64.0,
            time_scale: 1.0,
        }
    }
}

impl TimelineConfig {
    pub fn validate(&self) -> Result<(), MotionError> {
        let reason = if !(self.max_delta_ms.is_finite() && self.max_delta_ms >= 0.0) {
            Some("max_delta_ms must be finite and >= 0")
        } else if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            Some("time_scale must be finite and > 0")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(MotionError::InvalidTimelineConfig {
                max_delta_ms: self.max_delta_ms,
                time_scale: self.time_scale,
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Spring described by damping ratio and response (period, seconds).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    /// 1.0 is critically damped; below 1.0 overshoots.
    pub damping: f64,
    /// Seconds for one undamped oscillation.
    pub response: f64,
    pub mass: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::critical()
    }
}

impl SpringConfig {
    pub fn new(damping: f64, response: f64) -> Self {
        Self {
            damping,
            response,
            mass: 1.0,
        }
    }

    /// Default spring used when no force is supplied.
    pub fn critical() -> Self {
        Self::new(1.0, 0.3)
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        let reason = if !(self.damping.is_finite() && self.damping >= 0.0) {
            Some("damping must be finite and >= 0")
        } else if !(self.response.is_finite() && self.response > 0.0) {
            Some("response must be finite and > 0")
        } else if !(self.mass.is_finite() && self.mass > 0.0) {
            Some("mass must be finite and > 0")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(MotionError::InvalidSpring {
                damping: self.damping,
                response: self.response,
                mass: self.mass,
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Exponential velocity decay.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrictionConfig {
    pub friction_ratio: f64,
}

impl Default for FrictionConfig {
    fn default() -> Self {
        Self {
            friction_ratio: 0.5,
        }
    }
}

impl FrictionConfig {
    pub fn validate(&self) -> Result<(), MotionError> {
        if self.friction_ratio.is_finite() && self.friction_ratio > 0.0 {
            Ok(())
        } else {
            Err(MotionError::InvalidFriction {
                friction_ratio: self.friction_ratio,
            })
        }
    }
}

/// One element of a force chain. The target comes from the property map
/// passed to `Manager::to`, not from the config.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForceConfig {
    Spring(SpringConfig),
    Friction(FrictionConfig),
    Immediate,
}

impl ForceConfig {
    pub fn validate(&self) -> Result<(), MotionError> {
        match self {
            ForceConfig::Spring(cfg) => cfg.validate(),
            ForceConfig::Friction(cfg) => cfg.validate(),
            ForceConfig::Immediate => Ok(()),
        }
    }
}

/// Time-driven interpolation settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EasingConfig {
    pub curve: Curve,
    pub duration_ms: f64,
}

impl Default for EasingConfig {
    fn default() -> Self {
        Self {
            curve: Curve::CubicInOut,
            duration_ms: 300.0,
        }
    }
}

impl EasingConfig {
    pub fn new(curve: Curve, duration_ms: f64) -> Self {
        Self { curve, duration_ms }
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        if !(self.duration_ms.is_finite() && self.duration_ms > 0.0) {
            return Err(MotionError::InvalidEasing {
                duration_ms: self.duration_ms,
            });
        }
        self.curve.validate()
    }
}

/// How a set of properties should move toward their targets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionSpec {
    /// Forces applied in order every tick.
    Forces(Vec<ForceConfig>),
    Easing(EasingConfig),
}

impl Default for MotionSpec {
    fn default() -> Self {
        MotionSpec::spring(SpringConfig::critical())
    }
}

impl MotionSpec {
    pub fn spring(cfg: SpringConfig) -> Self {
        MotionSpec::Forces(vec![ForceConfig::Spring(cfg)])
    }

    pub fn easing(curve: Curve, duration_ms: f64) -> Self {
        MotionSpec::Easing(EasingConfig::new(curve, duration_ms))
    }

    /// Check the spec shape before anything is assigned. `property` names the
    /// first property the spec is applied to, for error reporting.
    pub fn validate(&self, property: &str) -> Result<(), MotionError> {
        match self {
            MotionSpec::Forces(chain) => {
                if chain.is_empty() {
                    return Err(MotionError::EmptyForceChain {
                        property: property.to_string(),
                    });
                }
                chain.iter().try_for_each(ForceConfig::validate)
            }
            MotionSpec::Easing(cfg) => cfg.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: SpringConfig = serde_json::from_value(json!({ "damping": 0.6 })).unwrap();
        assert_eq!(cfg.damping, 0.6);
        assert_eq!(cfg.response, 0.3);
        assert_eq!(cfg.mass, 1.0);

        let tl: TimelineConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(tl, TimelineConfig::default());
    }

    #[test]
    fn motion_spec_json_shape() {
        let spec: MotionSpec = serde_json::from_value(json!({
            "forces": [
                { "type": "spring", "damping": 0.8, "response": 0.4 },
                { "type": "friction", "friction_ratio": 0.3 }
            ]
        }))
        .unwrap();
        match spec {
            MotionSpec::Forces(chain) => {
                assert_eq!(chain.len(), 2);
                assert!(matches!(chain[1], ForceConfig::Friction(_)));
            }
            _ => panic!("expected force chain"),
        }

        let easing: MotionSpec = serde_json::from_value(json!({
            "easing": { "curve": { "type": "quad_out" }, "duration_ms": 120.0 }
        }))
        .unwrap();
        assert_eq!(easing, MotionSpec::easing(Curve::QuadOut, 120.0));
    }

    #[test]
    fn validation_rejects_bad_shapes() {
        assert!(matches!(
            MotionSpec::Forces(vec![]).validate("x"),
            Err(MotionError::EmptyForceChain { .. })
        ));
        assert!(SpringConfig::new(1.0, 0.0).validate().is_err());
        assert!(SpringConfig::new(-0.1, 0.3).validate().is_err());
        assert!(FrictionConfig { friction_ratio: 0.0 }.validate().is_err());
        assert!(MotionSpec::easing(Curve::Linear, f64::NAN)
            .validate("x")
            .is_err());
        assert!(MotionSpec::default().validate("x").is_ok());
    }
}
