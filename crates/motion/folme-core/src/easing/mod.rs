//! Time-parameterized (non-physical) interpolation.
//!
//! An [`Easing`] moves one value from `from` to `to` over a fixed duration:
//! `value = from + (to - from) * curve(progress)` with
//! `progress = clamp(elapsed / duration, 0, 1)`. Progress 1 yields exactly `to`.

pub mod bezier;
pub mod curves;

pub use bezier::CubicBezier;
pub use curves::Curve;

use crate::config::EasingConfig;
use crate::error::MotionError;

#[derive(Clone, Debug, PartialEq)]
pub struct Easing {
    curve: Curve,
    bezier: Option<CubicBezier>,
    duration_ms: f64,
    from: f64,
    to: f64,
    elapsed_ms: f64,
}

impl Easing {
    pub fn new(curve: Curve, duration_ms: f64, to: f64) -> Result<Self, MotionError> {
        EasingConfig::new(curve, duration_ms).validate()?;
        let bezier = match curve {
            Curve::CubicBezier { x1, y1, x2, y2 } => Some(CubicBezier::new(x1, y1, x2, y2)),
            _ => None,
        };
        Ok(Self {
            curve,
            bezier,
            duration_ms,
            from: to,
            to,
            elapsed_ms: 0.0,
        })
    }

    pub fn from_config(cfg: &EasingConfig, to: f64) -> Result<Self, MotionError> {
        Self::new(cfg.curve, cfg.duration_ms, to)
    }

    /// Restart from `from` with zero elapsed time.
    pub fn start(&mut self, from: f64) {
        self.from = from;
        self.elapsed_ms = 0.0;
    }

    #[inline]
    pub fn progress(&self) -> f64 {
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    #[inline]
    pub fn from(&self) -> f64 {
        self.from
    }

    #[inline]
    pub fn to(&self) -> f64 {
        self.to
    }

    #[inline]
    pub fn curve(&self) -> Curve {
        self.curve
    }

    #[inline]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    fn ease(&self, progress: f64) -> f64 {
        match &self.bezier {
            Some(b) => b.solve(progress),
            None => self.curve.apply(progress),
        }
    }

    /// Value at an explicit progress, without touching the elapsed time.
    pub fn value_at(&self, progress: f64) -> f64 {
        let progress = progress.clamp(0.0, 1.0);
        if progress >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * self.ease(progress)
    }

    /// Advance by `dt_ms` and return the new value.
    pub fn get_value(&mut self, dt_ms: f64) -> f64 {
        self.elapsed_ms += dt_ms.max(0.0);
        self.value_at(self.progress())
    }
}
