//! Per-tick force rules.
//!
//! A force turns the current `(value, speed)` of one property into the next
//! `(value, speed)` for a step of `dt` milliseconds. Forces hold only their
//! parameters and target, so one instance may be cloned per property without
//! sharing integrator state. Speeds are in units per second.

use std::f64::consts::PI;

use crate::config::{ForceConfig, FrictionConfig, SpringConfig};
use crate::error::MotionError;

/// Empirical upper bound on the spring damping coefficient; larger values
/// make the integrator unstable at common frame rates.
const MAX_DAMPING_COEFF: f64 = 60.0;

/// Largest integration sub-step for springs. Longer frames are subdivided.
const MAX_SPRING_STEP_MS: f64 = 4.0;

/// Upper bound on sub-steps per frame. Frames longer than
/// `MAX_SPRING_SUBSTEPS * MAX_SPRING_STEP_MS` use proportionally longer steps.
const MAX_SPRING_SUBSTEPS: usize = 64;

const FRICTION_DRAG_FACTOR: f64 = -4.2;

/// Damped spring pulling toward `target`.
#[derive(Clone, Debug, PartialEq)]
pub struct Spring {
    damping: f64,
    response: f64,
    mass: f64,
    tension: f64,
    damping_coeff: f64,
    target: f64,
}

impl Spring {
    pub fn new(cfg: &SpringConfig, target: f64) -> Result<Self, MotionError> {
        cfg.validate()?;
        let tension = (2.0 * PI / cfg.response).powi(2) * cfg.mass;
        let damping_coeff =
            (4.0 * PI * cfg.damping * cfg.mass / cfg.response).min(MAX_DAMPING_COEFF);
        Ok(Self {
            damping: cfg.damping,
            response: cfg.response,
            mass: cfg.mass,
            tension,
            damping_coeff,
            target,
        })
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    pub fn tension(&self) -> f64 {
        self.tension
    }

    #[inline]
    pub fn damping_coeff(&self) -> f64 {
        self.damping_coeff
    }

    pub fn config(&self) -> SpringConfig {
        SpringConfig {
            damping: self.damping,
            response: self.response,
            mass: self.mass,
        }
    }

    /// Semi-implicit Euler: speed is integrated first, value from the updated speed.
    fn step(&self, value: f64, speed: f64, dt_s: f64) -> (f64, f64) {
        let force = -speed * self.damping_coeff + self.tension * (self.target - value);
        let speed = speed + force * dt_s;
        (value + speed * dt_s, speed)
    }

    /// Advance by `dt_ms` in equal sub-steps of at most 4 ms. A non-finite or
    /// non-positive `dt_ms` leaves the state unchanged.
    pub fn value_and_speed(&self, mut value: f64, mut speed: f64, dt_ms: f64) -> (f64, f64) {
        if !(dt_ms.is_finite() && dt_ms > 0.0) {
            return (value, speed);
        }
        let steps = ((dt_ms / MAX_SPRING_STEP_MS).ceil() as usize).clamp(1, MAX_SPRING_SUBSTEPS);
        let step_s = dt_ms / steps as f64 / 1000.0;
        for _ in 0..steps {
            (value, speed) = self.step(value, speed, step_s);
        }
        (value, speed)
    }
}

/// Exponential velocity decay without a target (flings).
#[derive(Clone, Debug, PartialEq)]
pub struct Friction {
    friction_ratio: f64,
    drag: f64,
}

impl Friction {
    pub fn new(cfg: &FrictionConfig) -> Result<Self, MotionError> {
        cfg.validate()?;
        Ok(Self {
            friction_ratio: cfg.friction_ratio,
            drag: (cfg.friction_ratio * FRICTION_DRAG_FACTOR).exp(),
        })
    }

    #[inline]
    pub fn drag(&self) -> f64 {
        self.drag
    }

    pub fn value_and_speed(&self, value: f64, speed: f64, dt_ms: f64) -> (f64, f64) {
        let next_speed = speed * self.drag.powf(dt_ms / 1000.0);
        let value = value + (speed + next_speed) / 2.0 * (dt_ms / 1000.0);
        (value, next_speed)
    }
}

/// Closed set of force kinds. New forces add a variant and a match arm here.
#[derive(Clone, Debug, PartialEq)]
pub enum Force {
    Spring(Spring),
    Friction(Friction),
    /// Snap straight to the target.
    Immediate { target: f64 },
}

impl Force {
    pub fn from_config(cfg: &ForceConfig, target: f64) -> Result<Self, MotionError> {
        Ok(match cfg {
            ForceConfig::Spring(spring) => Force::Spring(Spring::new(spring, target)?),
            ForceConfig::Friction(friction) => Force::Friction(Friction::new(friction)?),
            ForceConfig::Immediate => Force::Immediate { target },
        })
    }

    /// Target this force pulls toward, if it defines one.
    pub fn target(&self) -> Option<f64> {
        match self {
            Force::Spring(s) => Some(s.target()),
            Force::Friction(_) => None,
            Force::Immediate { target } => Some(*target),
        }
    }

    pub fn value_and_speed(&self, value: f64, speed: f64, dt_ms: f64) -> (f64, f64) {
        match self {
            Force::Spring(s) => s.value_and_speed(value, speed, dt_ms),
            Force::Friction(f) => f.value_and_speed(value, speed, dt_ms),
            Force::Immediate { target } => (*target, 0.0),
        }
    }
}

/// Derived facts about an assigned force chain, computed once per target
/// assignment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ForceInfo {
    /// The target, when exactly one force defines one.
    pub target: Option<f64>,
    /// Set when the chain contains an `Immediate` force.
    pub immediate: Option<f64>,
    pub target_count: usize,
}

impl ForceInfo {
    pub fn from_chain(chain: &[Force]) -> Self {
        let mut info = ForceInfo::default();
        let mut single = None;
        for force in chain {
            if let Force::Immediate { target } = force {
                info.immediate = Some(*target);
            }
            if let Some(t) = force.target() {
                info.target_count += 1;
                single = Some(t);
            }
        }
        if info.target_count == 1 {
            info.target = single;
        }
        info
    }

    /// Info for an easing, which always has exactly one target.
    pub fn for_easing(to: f64) -> Self {
        ForceInfo {
            target: Some(to),
            immediate: None,
            target_count: 1,
        }
    }
}
