//! CSS-style color parsing and interpolation.
//!
//! Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` and
//! `rgba(r, g, b, a)`. Channels interpolate linearly in sRGB space including
//! alpha; there is no gamma correction.

use std::fmt;

/// Color with 0..=255 channels and 0..=1 alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex.trim());
        }
        let lower = trimmed.to_ascii_lowercase();
        let args = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        parse_functional(args)
    }

    pub fn lerp(self, to: Rgba, t: f64) -> Rgba {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Rgba {
            r: mix(self.r, to.r),
            g: mix(self.g, to.g),
            b: mix(self.b, to.b),
            a: mix(self.a, to.a),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.is_ascii() {
        return None;
    }
    let byte = |s: &str| u8::from_str_radix(s, 16).ok().map(f64::from);
    match hex.len() {
        3 => {
            let nibble = |i: usize| byte(&hex[i..i + 1]).map(|v| v * 17.0);
            Some(Rgba::new(nibble(0)?, nibble(1)?, nibble(2)?, 1.0))
        }
        6 | 8 => {
            let a = if hex.len() == 8 {
                byte(&hex[6..8])? / 255.0
            } else {
                1.0
            };
            Some(Rgba::new(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                a,
            ))
        }
        _ => None,
    }
}

fn parse_functional(args: &str) -> Option<Rgba> {
    let parts = args
        .split(',')
        .map(|p| p.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<f64>>>()?;
    let channel = |v: f64| v.clamp(0.0, 255.0);
    match parts.as_slice() {
        [r, g, b] => Some(Rgba::new(channel(*r), channel(*g), channel(*b), 1.0)),
        [r, g, b, a] => Some(Rgba::new(
            channel(*r),
            channel(*g),
            channel(*b),
            a.clamp(0.0, 1.0),
        )),
        _ => None,
    }
}

impl fmt::Display for Rgba {
    /// `rgb(r,g,b)` when opaque, `rgba(r,g,b,a)` otherwise. Channels are
    /// rounded to integers and alpha to three decimals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `+ 0.0` folds a negative zero so it never prints as "-0".
        let channel = |v: f64| v.round().clamp(0.0, 255.0) + 0.0;
        let (r, g, b) = (channel(self.r), channel(self.g), channel(self.b));
        let a = (self.a.clamp(0.0, 1.0) * 1000.0).round() / 1000.0;
        if a >= 1.0 {
            write!(f, "rgb({r},{g},{b})")
        } else {
            write!(f, "rgba({r},{g},{b},{a})")
        }
    }
}

/// Color at fraction `t` between `from` and `to`.
///
/// `t <= 0` returns `from` and `t >= 1` returns `to` verbatim. Unparseable
/// input yields `to` unchanged.
pub fn interpolate_color(from: &str, to: &str, t: f64) -> String {
    if !(t > 0.0) {
        return from.to_string();
    }
    if from == to {
        return from.to_string();
    }
    if t >= 1.0 {
        return to.to_string();
    }
    match (Rgba::parse(from), Rgba::parse(to)) {
        (Some(a), Some(b)) => a.lerp(b, t).to_string(),
        _ => {
            log::warn!("cannot interpolate colors '{from}' -> '{to}'; using target");
            to.to_string()
        }
    }
}

/// Whether two color strings denote the same color. Falls back to string
/// comparison when either side does not parse.
pub fn colors_equal(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (Rgba::parse(a), Rgba::parse(b)) {
        (Some(x), Some(y)) => x.to_string() == y.to_string(),
        _ => false,
    }
}
