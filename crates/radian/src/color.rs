use palette::{FromColor, Hsla, Srgb, Srgba, WithAlpha};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fully transparent white.
pub fn transparent() -> Srgba<f64> {
    Srgba::new(1.0, 1.0, 1.0, 0.0)
}

#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("invalid color '{0}'")]
    Invalid(String),

    #[error("empty color list")]
    Empty,

    #[error("invalid number of gradient settings, expected 2 got {0}")]
    StopLength(usize),

    #[error("invalid gradient settings, expected a color paired with an offset")]
    StopFormat,
}

/// Color as written in the settings: one color or a list of gradient stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Solid(String),
    Stops(Vec<StopSpec>),
}

/// A gradient stop, either a bare color or a `[color, offset]` pair in any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopSpec {
    Color(String),
    Pair(Vec<StopValue>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopValue {
    Offset(f64),
    Color(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub color: Srgba<f64>,
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    /// Color at `t` in `[0, 1]`, linearly interpolated between the surrounding stops.
    pub fn sample(&self, t: f64) -> Srgba<f64> {
        let Some(first) = self.stops.first() else {
            return transparent();
        };
        if t <= first.offset {
            return first.color;
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = b.offset - a.offset;
                let f = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
                return mix(a.color, b.color, f);
            }
        }

        self.stops.last().map_or(first.color, |s| s.color)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Srgba<f64>),
    Gradient(Gradient),
}

impl Fill {
    /// Representative flat color, the first stop for gradients.
    pub fn primary(&self) -> Srgba<f64> {
        match self {
            Fill::Solid(c) => *c,
            Fill::Gradient(g) => g.sample(0.0),
        }
    }
}

impl ColorSpec {
    pub fn solid(color: &str) -> Self {
        ColorSpec::Solid(color.to_string())
    }

    pub fn resolve(&self) -> Result<Fill, ColorError> {
        match self {
            ColorSpec::Solid(s) => parse_color(s).map(Fill::Solid),
            ColorSpec::Stops(stops) => resolve_stops(stops),
        }
    }
}

fn resolve_stops(specs: &[StopSpec]) -> Result<Fill, ColorError> {
    let mut parsed: Vec<(Srgba<f64>, Option<f64>)> = Vec::with_capacity(specs.len());
    for spec in specs {
        parsed.push(match spec {
            StopSpec::Color(c) => (parse_color(c)?, None),
            StopSpec::Pair(values) => {
                if values.len() != 2 {
                    return Err(ColorError::StopLength(values.len()));
                }
                match (&values[0], &values[1]) {
                    (StopValue::Color(c), StopValue::Offset(o))
                    | (StopValue::Offset(o), StopValue::Color(c)) => (parse_color(c)?, Some(*o)),
                    _ => return Err(ColorError::StopFormat),
                }
            }
        });
    }

    match parsed.len() {
        0 => Err(ColorError::Empty),
        1 => Ok(Fill::Solid(parsed[0].0)),
        n => {
            let last = (n - 1) as f64;
            let stops = parsed
                .into_iter()
                .enumerate()
                .map(|(i, (color, offset))| GradientStop {
                    color,
                    offset: offset.unwrap_or(i as f64 / last).clamp(0.0, 1.0),
                })
                .collect();
            Ok(Fill::Gradient(Gradient { stops }))
        }
    }
}

/// Parses `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(..)`, `rgba(..)`,
/// `transparent` and CSS color names.
pub fn parse_color(input: &str) -> Result<Srgba<f64>, ColorError> {
    let s = input.trim().to_ascii_lowercase();
    let invalid = || ColorError::Invalid(input.to_string());

    if s == "transparent" {
        return Ok(transparent());
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(invalid);
    }

    if let Some(body) = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<f64> = body
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?;
        return match parts.as_slice() {
            [r, g, b] => Ok(Srgba::new(r / 255.0, g / 255.0, b / 255.0, 1.0)),
            [r, g, b, a] => Ok(Srgba::new(r / 255.0, g / 255.0, b / 255.0, a.clamp(0.0, 1.0))),
            _ => Err(invalid()),
        };
    }

    palette::named::from_str(&s)
        .map(|c| from_bytes(c.with_alpha(u8::MAX)))
        .ok_or_else(invalid)
}

fn parse_hex(hex: &str) -> Option<Srgba<f64>> {
    match hex.len() {
        3 | 6 => hex.parse::<Srgb<u8>>().ok().map(|c| from_bytes(c.with_alpha(u8::MAX))),
        4 | 8 => hex.parse::<Srgba<u8>>().ok().map(from_bytes),
        _ => None,
    }
}

fn from_bytes(c: Srgba<u8>) -> Srgba<f64> {
    let channel = |v: u8| f64::from(v) / 255.0;
    Srgba::new(channel(c.red), channel(c.green), channel(c.blue), channel(c.alpha))
}

/// Lowers saturation by `amount` in HSL space, clamped at zero.
pub fn desaturate(color: Srgba<f64>, amount: f64) -> Srgba<f64> {
    let mut hsla: Hsla<palette::encoding::Srgb, f64> = Hsla::from_color(color);
    hsla.saturation = (hsla.saturation - amount).max(0.0);
    Srgba::from_color(hsla)
}

pub fn with_alpha(color: Srgba<f64>, alpha: f64) -> Srgba<f64> {
    Srgba::new(color.red, color.green, color.blue, alpha)
}

pub fn mix(a: Srgba<f64>, b: Srgba<f64>, t: f64) -> Srgba<f64> {
    let lerp = |x: f64, y: f64| x + (y - x) * t;
    Srgba::new(
        lerp(a.red, b.red),
        lerp(a.green, b.green),
        lerp(a.blue, b.blue),
        lerp(a.alpha, b.alpha),
    )
}
