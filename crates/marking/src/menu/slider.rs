//! Configuration and value math of the continuous controls.

use crate::animation::Coalescer;
use radian::{angle, numbers};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Minimum interval between two label updates while dragging a ribbon.
pub const LABEL_THROTTLE: Duration = Duration::from_millis(16);

pub const DEFAULT_STEP_SIZE: f64 = 1.0;
pub const DEFAULT_STEP_DIST: f64 = 100.0;
pub const DEFAULT_PRECISION: f64 = 1.0;

const TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum SliderConfigError {
    #[error("configuration is missing 'min' and/or 'max' value")]
    MissingBounds,

    #[error("min/max values have to be numbers")]
    BoundsNotNumeric,

    #[error("'{0}' has to be a number")]
    NotNumeric(&'static str),

    #[error("'{0}' has to be greater than zero")]
    NotPositive(&'static str),

    #[error("'min' value {min} is greater than or equal to 'max' value {max}")]
    EmptyRange { min: f64, max: f64 },

    #[error("'initial' value {0} is not in min/max range")]
    InitialOutOfRange(f64),

    #[error("'initial' value {initial} is not achievable with precision {precision}")]
    InitialUnreachable { initial: f64, precision: f64 },

    #[error("'stepSize' {0} is greater or equal to slider range")]
    StepSize(f64),

    #[error("configuration has to be an object")]
    NotAnObject,
}

/// Validated slider configuration. `min < max` and `initial` lies in range
/// on the precision grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub initial: f64,
    pub precision: f64,
    pub step_size: f64,
    pub step_dist: f64,
}

impl Default for SliderConfig {
    /// A full turn in whole degrees.
    fn default() -> Self {
        Self {
            min: 0.0,
            max: angle::FULL_CIRCLE_DEG,
            initial: 0.0,
            precision: DEFAULT_PRECISION,
            step_size: DEFAULT_STEP_SIZE,
            step_dist: DEFAULT_STEP_DIST,
        }
    }
}

fn number(
    object: &serde_json::Map<String, Value>,
    keys: &[&str],
    name: &'static str,
) -> Result<Option<f64>, SliderConfigError> {
    match keys.iter().find_map(|k| object.get(*k)) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or(SliderConfigError::NotNumeric(name)),
    }
}

impl SliderConfig {
    /// Reads and validates `{min, max, initial?, precision?, stepSize?, stepDist?}`.
    pub fn from_value(data: &Value) -> Result<Self, SliderConfigError> {
        let object = data.as_object().ok_or(SliderConfigError::NotAnObject)?;

        let (min, max) = match (object.get("min"), object.get("max")) {
            (Some(min), Some(max)) => match (min.as_f64(), max.as_f64()) {
                (Some(min), Some(max)) => (min, max),
                _ => return Err(SliderConfigError::BoundsNotNumeric),
            },
            _ => return Err(SliderConfigError::MissingBounds),
        };

        Self::new(
            min,
            max,
            number(object, &["initial"], "initial")?,
            number(object, &["precision"], "precision")?,
            number(object, &["stepSize", "step_size"], "stepSize")?,
            number(object, &["stepDist", "step_dist"], "stepDist")?,
        )
    }

    pub fn new(
        min: f64,
        max: f64,
        initial: Option<f64>,
        precision: Option<f64>,
        step_size: Option<f64>,
        step_dist: Option<f64>,
    ) -> Result<Self, SliderConfigError> {
        if min >= max {
            return Err(SliderConfigError::EmptyRange { min, max });
        }

        let initial = initial.unwrap_or(min);
        if initial < min || initial > max {
            return Err(SliderConfigError::InitialOutOfRange(initial));
        }

        let precision = precision.unwrap_or(DEFAULT_PRECISION);
        if precision <= 0.0 {
            return Err(SliderConfigError::NotPositive("precision"));
        }
        let steps = initial / precision;
        if (steps - steps.round()).abs() > TOLERANCE {
            return Err(SliderConfigError::InitialUnreachable { initial, precision });
        }

        let step_size = step_size.unwrap_or(DEFAULT_STEP_SIZE);
        if step_size <= 0.0 {
            return Err(SliderConfigError::NotPositive("stepSize"));
        }
        if max - min <= step_size {
            return Err(SliderConfigError::StepSize(step_size));
        }

        let step_dist = step_dist.unwrap_or(DEFAULT_STEP_DIST);
        if step_dist <= 0.0 {
            return Err(SliderConfigError::NotPositive("stepDist"));
        }

        Ok(Self {
            min,
            max,
            initial,
            precision,
            step_size,
            step_dist,
        })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Value at `fraction` of the range, snapped to the precision grid.
    pub fn value_at(&self, fraction: f64) -> f64 {
        let steps = (fraction * self.range() / self.precision).round();
        let value = self.precision * steps + self.min;
        numbers::round_to(value, numbers::decimal_places(self.precision))
            .clamp(self.min, self.max)
    }

    /// Position of `value` in the range, `0..=1`.
    pub fn fraction_of(&self, value: f64) -> f64 {
        let fraction = (value - self.min) / self.range();
        if fraction.is_nan() { 0.0 } else { fraction }
    }
}

/// A dial: its rotation in degrees maps a full turn onto the range.
#[derive(Debug, Clone, PartialEq)]
pub struct RotaryState {
    pub config: SliderConfig,
    pub value: f64,
    /// Degrees, clockwise.
    pub rotation: f64,
    pub dial_visible: bool,
    /// Distance of the indicator dot from the center.
    pub indicator_distance: f64,
}

impl RotaryState {
    pub fn new(config: SliderConfig) -> Self {
        Self {
            config,
            value: config.initial,
            rotation: config.fraction_of(config.initial) * angle::FULL_CIRCLE_DEG,
            dial_visible: false,
            indicator_distance: 0.0,
        }
    }

    /// Turns the dial to `rotation` degrees and returns the new value.
    pub fn rotate_to(&mut self, rotation: f64) -> f64 {
        self.rotation = rotation;
        let turn = rotation.rem_euclid(angle::FULL_CIRCLE_DEG) / angle::FULL_CIRCLE_DEG;
        self.value = self.config.value_at(turn);
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
        self.rotation = self.config.fraction_of(value) * angle::FULL_CIRCLE_DEG;
    }
}

/// A ribbon of values sliding under a fixed window.
#[derive(Debug, Clone)]
pub struct LinearState {
    pub config: SliderConfig,
    pub value: f64,
    /// Ribbon offset along its axis, `-length..=0`.
    pub offset: f64,
    pub vertical: bool,
    pub dragging: bool,
    /// Pointer is over the "Done" sector.
    pub done: bool,
    pub prev_drag: Option<radian::Point>,
    pub mask_visible: bool,
    pub indicator_visible: bool,
    pub gradient_visible: bool,
    pub ribbon_selected: bool,
    pub(crate) label: Coalescer<String>,
}

impl PartialEq for LinearState {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
            && self.value == other.value
            && self.offset == other.offset
            && self.vertical == other.vertical
    }
}

impl LinearState {
    /// `angle` is the item direction in radians and decides the orientation.
    pub fn new(config: SliderConfig, angle: f64) -> Self {
        let mut state = Self {
            config,
            value: config.initial,
            offset: 0.0,
            vertical: is_vertical(angle),
            dragging: false,
            done: false,
            prev_drag: None,
            mask_visible: false,
            indicator_visible: true,
            gradient_visible: false,
            ribbon_selected: false,
            label: Coalescer::new(LABEL_THROTTLE),
        };
        state.offset = state.offset_for(config.initial);
        state
    }

    pub fn ribbon_length(&self) -> f64 {
        self.config.range() / self.config.step_size * self.config.step_dist
    }

    pub fn offset_for(&self, value: f64) -> f64 {
        -(self.config.fraction_of(value) * self.ribbon_length())
    }

    /// Value under the window at the current offset.
    pub fn value_at_offset(&self) -> f64 {
        let length = self.ribbon_length();
        let length = if length == 0.0 { 1.0 } else { length };
        self.config.value_at(self.offset.abs() / length)
    }

    /// Slides the ribbon by `delta`, stopping at either end.
    pub fn shift(&mut self, delta: f64) {
        self.offset = (self.offset + delta).clamp(-self.ribbon_length(), 0.0);
    }

    /// Labelled marks along the ribbon between `from` and `to`, as
    /// `(distance from the ribbon start, value)`. Odd positions between two
    /// labels hold grab handles and have no value.
    pub fn marks_in(&self, from: f64, to: f64) -> Vec<(f64, Option<f64>)> {
        let half = self.config.step_dist / 2.0;
        let count = (self.ribbon_length() / half).floor();
        let first = (from / half).ceil().max(0.0);
        let last = (to / half).floor().min(count);
        if first > last {
            return Vec::new();
        }

        (first as usize..=last as usize)
            .map(|i| {
                let at = i as f64 * half;
                if i % 2 == 0 {
                    let value = self.config.min + i as f64 * self.config.step_size / 2.0;
                    (at, Some((value * 100.0).round() / 100.0))
                } else {
                    (at, None)
                }
            })
            .collect()
    }

    /// Marks that fall within `radius` of the window.
    pub fn visible_marks(&self, radius: f64) -> Vec<(f64, Option<f64>)> {
        self.marks_in(-self.offset - radius, -self.offset + radius)
    }

    /// Back direction snapped to the closest axis, opposite of the "Done" side.
    pub fn axis_angles(angle: f64) -> (f64, f64) {
        let deg = angle::to_deg(angle);
        let snapped = if deg > 45.0 && deg < 135.0 {
            90.0
        } else if deg > 235.0 && deg < 315.0 {
            270.0
        } else if (135.0..=235.0).contains(&deg) {
            180.0
        } else {
            0.0
        };
        let forward = angle::to_rad(snapped);
        (angle::opposite(forward), forward)
    }
}

/// Ribbons on items pointing sideways run vertically.
pub fn is_vertical(angle: f64) -> bool {
    let deg = angle::to_deg(angle);
    (deg > 45.0 && deg < 135.0) || (deg > 235.0 && deg < 315.0)
}
