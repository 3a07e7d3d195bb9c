//! Easing curve families. Every curve maps progress in [0, 1] to eased
//! progress with `f(0) = 0` and `f(1) = 1`.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

const BACK_C1: f64 = 1.70158;
const BACK_C3: f64 = BACK_C1 + 1.0;
const ELASTIC_C4: f64 = (2.0 * PI) / 3.0;
const BOUNCE_N1: f64 = 7.5625;
const BOUNCE_D1: f64 = 2.75;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Curve {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    QuintIn,
    QuintOut,
    QuintInOut,
    SineIn,
    SineOut,
    SineInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    CircIn,
    CircOut,
    CircInOut,
    BounceOut,
    BackIn,
    BackOut,
    ElasticOut,
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
}

#[inline]
fn power_in(t: f64, n: i32) -> f64 {
    t.powi(n)
}

#[inline]
fn power_out(t: f64, n: i32) -> f64 {
    1.0 - (1.0 - t).powi(n)
}

#[inline]
fn power_in_out(t: f64, n: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(n - 1) * t.powi(n)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(n) / 2.0
    }
}

fn bounce_out(t: f64) -> f64 {
    if t < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * t * t
    } else if t < 2.0 / BOUNCE_D1 {
        let t = t - 1.5 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D1 {
        let t = t - 2.25 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.984375
    }
}

impl Curve {
    /// Every shipped curve, with a representative bezier.
    pub const ALL: [Curve; 27] = [
        Curve::Linear,
        Curve::QuadIn,
        Curve::QuadOut,
        Curve::QuadInOut,
        Curve::CubicIn,
        Curve::CubicOut,
        Curve::CubicInOut,
        Curve::QuartIn,
        Curve::QuartOut,
        Curve::QuartInOut,
        Curve::QuintIn,
        Curve::QuintOut,
        Curve::QuintInOut,
        Curve::SineIn,
        Curve::SineOut,
        Curve::SineInOut,
        Curve::ExpoIn,
        Curve::ExpoOut,
        Curve::ExpoInOut,
        Curve::CircIn,
        Curve::CircOut,
        Curve::CircInOut,
        Curve::BounceOut,
        Curve::BackIn,
        Curve::BackOut,
        Curve::ElasticOut,
        Curve::CubicBezier {
            x1: 0.25,
            y1: 0.1,
            x2: 0.25,
            y2: 1.0,
        },
    ];

    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Curve::CubicBezier { x1, y1, x2, y2 }
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        if let Curve::CubicBezier { x1, y1, x2, y2 } = *self {
            let in_unit = |v: f64| (0.0..=1.0).contains(&v);
            if !(in_unit(x1) && in_unit(x2) && y1.is_finite() && y2.is_finite()) {
                return Err(MotionError::InvalidBezier { x1, y1, x2, y2 });
            }
        }
        Ok(())
    }

    /// Evaluate a closed-form curve. Bezier curves are solved through
    /// [`super::CubicBezier`]; this path builds a solver on the fly, so hot
    /// loops should go through [`super::Easing`] which caches it.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Curve::Linear => t,
            Curve::QuadIn => power_in(t, 2),
            Curve::QuadOut => power_out(t, 2),
            Curve::QuadInOut => power_in_out(t, 2),
            Curve::CubicIn => power_in(t, 3),
            Curve::CubicOut => power_out(t, 3),
            Curve::CubicInOut => power_in_out(t, 3),
            Curve::QuartIn => power_in(t, 4),
            Curve::QuartOut => power_out(t, 4),
            Curve::QuartInOut => power_in_out(t, 4),
            Curve::QuintIn => power_in(t, 5),
            Curve::QuintOut => power_out(t, 5),
            Curve::QuintInOut => power_in_out(t, 5),
            Curve::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Curve::SineOut => (t * PI / 2.0).sin(),
            Curve::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Curve::ExpoIn => {
                if t == 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * t - 10.0)
                }
            }
            Curve::ExpoOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Curve::ExpoInOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    2f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Curve::CircIn => 1.0 - (1.0 - t * t).sqrt(),
            Curve::CircOut => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Curve::CircInOut => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }
            Curve::BounceOut => bounce_out(t),
            Curve::BackIn => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Curve::BackOut => 1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2),
            Curve::ElasticOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
                }
            }
            Curve::CubicBezier { x1, y1, x2, y2 } => super::CubicBezier::new(x1, y1, x2, y2).solve(t),
        }
    }
}
