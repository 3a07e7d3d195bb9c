//! Cubic bezier timing curve (CSS `cubic-bezier(x1, y1, x2, y2)`).
//!
//! x(t) is inverted with Newton-Raphson seeded from a sample table, falling
//! back to binary subdivision where the slope is too shallow for Newton to
//! converge.

const NEWTON_ITERATIONS: usize = 4;
const NEWTON_MIN_SLOPE: f64 = 0.001;
const SUBDIVISION_PRECISION: f64 = 0.000_000_1;
const SUBDIVISION_MAX_ITERATIONS: usize = 10;

const SPLINE_TABLE_SIZE: usize = 11;
const SAMPLE_STEP_SIZE: f64 = 1.0 / (SPLINE_TABLE_SIZE as f64 - 1.0);

/// Evaluate one axis of the curve: B(t) with p0 = 0 and p3 = 1, Horner form.
#[inline]
fn calc_bezier(t: f64, a1: f64, a2: f64) -> f64 {
    let a = 1.0 - 3.0 * a2 + 3.0 * a1;
    let b = 3.0 * a2 - 6.0 * a1;
    let c = 3.0 * a1;
    ((a * t + b) * t + c) * t
}

/// dB/dt for one axis.
#[inline]
fn slope(t: f64, a1: f64, a2: f64) -> f64 {
    let a = 1.0 - 3.0 * a2 + 3.0 * a1;
    let b = 3.0 * a2 - 6.0 * a1;
    let c = 3.0 * a1;
    3.0 * a * t * t + 2.0 * b * t + c
}

/// Prepared cubic bezier solver.
#[derive(Clone, Debug, PartialEq)]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    samples: [f64; SPLINE_TABLE_SIZE],
}

impl CubicBezier {
    /// Caller guarantees `x1`, `x2` in [0, 1] (see [`super::Curve::validate`]).
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let mut samples = [0.0; SPLINE_TABLE_SIZE];
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample = calc_bezier(i as f64 * SAMPLE_STEP_SIZE, x1, x2);
        }
        Self {
            x1,
            y1,
            x2,
            y2,
            samples,
        }
    }

    #[inline]
    fn is_linear(&self) -> bool {
        self.x1 == self.y1 && self.x2 == self.y2
    }

    /// Eased output for progress `x` in [0, 1].
    pub fn solve(&self, x: f64) -> f64 {
        if self.is_linear() {
            return x;
        }
        // Endpoints are exact.
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        calc_bezier(self.t_for_x(x), self.y1, self.y2)
    }

    fn t_for_x(&self, x: f64) -> f64 {
        let mut interval_start = 0.0;
        let mut current = 1;
        let last = SPLINE_TABLE_SIZE - 1;
        while current != last && self.samples[current] <= x {
            interval_start += SAMPLE_STEP_SIZE;
            current += 1;
        }
        current -= 1;

        let span = self.samples[current + 1] - self.samples[current];
        let dist = if span > 0.0 {
            (x - self.samples[current]) / span
        } else {
            0.0
        };
        let guess = interval_start + dist * SAMPLE_STEP_SIZE;

        let initial_slope = slope(guess, self.x1, self.x2);
        if initial_slope >= NEWTON_MIN_SLOPE {
            self.newton_raphson(x, guess)
        } else if initial_slope == 0.0 {
            guess
        } else {
            self.binary_subdivide(x, interval_start, interval_start + SAMPLE_STEP_SIZE)
        }
    }

    fn newton_raphson(&self, x: f64, mut guess: f64) -> f64 {
        for _ in 0..NEWTON_ITERATIONS {
            let s = slope(guess, self.x1, self.x2);
            if s == 0.0 {
                return guess;
            }
            let current_x = calc_bezier(guess, self.x1, self.x2) - x;
            guess -= current_x / s;
        }
        guess
    }

    fn binary_subdivide(&self, x: f64, mut lo: f64, mut hi: f64) -> f64 {
        let mut current_t = lo;
        for _ in 0..SUBDIVISION_MAX_ITERATIONS {
            current_t = lo + (hi - lo) / 2.0;
            let current_x = calc_bezier(current_t, self.x1, self.x2) - x;
            if current_x.abs() <= SUBDIVISION_PRECISION {
                break;
            }
            if current_x > 0.0 {
                hi = current_t;
            } else {
                lo = current_t;
            }
        }
        current_t
    }
}
