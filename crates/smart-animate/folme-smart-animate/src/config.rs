use folme_core::{Curve, EasingConfig, MotionSpec};
use serde::{Deserialize, Serialize};

/// Motion settings for one [`SmartAnimator::animate`](crate::SmartAnimator::animate) run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimateConfig {
    /// Force chain or easing applied to every diffed property. Defaults to a
    /// critically damped spring.
    pub motion: Option<MotionSpec>,
    /// Duration shorthand. Without `motion` it selects a cubic in-out easing;
    /// with an easing it overrides the easing's duration; force chains ignore it.
    pub duration_ms: Option<f64>,
}

impl AnimateConfig {
    pub fn with_motion(motion: MotionSpec) -> Self {
        Self {
            motion: Some(motion),
            duration_ms: None,
        }
    }

    pub fn with_duration(duration_ms: f64) -> Self {
        Self {
            motion: None,
            duration_ms: Some(duration_ms),
        }
    }

    /// The motion spec the run will use.
    pub fn resolve(&self) -> MotionSpec {
        match (&self.motion, self.duration_ms) {
            (None, None) => MotionSpec::default(),
            (None, Some(duration_ms)) => MotionSpec::easing(Curve::CubicInOut, duration_ms),
            (Some(MotionSpec::Easing(cfg)), Some(duration_ms)) => {
                MotionSpec::Easing(EasingConfig::new(cfg.curve, duration_ms))
            }
            (Some(motion), _) => motion.clone(),
        }
    }
}
