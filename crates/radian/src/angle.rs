use crate::point::{Point, REFERENCE};
use std::f64::consts::{PI, TAU};

pub const FULL_CIRCLE_DEG: f64 = 360.0;
pub const HALF_CIRCLE_DEG: f64 = FULL_CIRCLE_DEG / 2.0;
pub const FULL_CIRCLE_RAD: f64 = TAU;
pub const HALF_CIRCLE_RAD: f64 = PI;

/// Tolerance for comparing two canonical angles.
pub const EPSILON: f64 = 1e-9;

pub fn to_deg(rad: f64) -> f64 {
    rad * (HALF_CIRCLE_DEG / PI)
}

pub fn to_rad(deg: f64) -> f64 {
    deg * (PI / HALF_CIRCLE_DEG)
}

/// Converts a compass direction in degrees into a canonical angle in `[0, 2π)`.
pub fn from_direction(deg: f64) -> f64 {
    to_rad(deg.rem_euclid(FULL_CIRCLE_DEG))
}

/// Smallest unsigned distance between two angles, wraparound aware.
pub fn difference(a: f64, b: f64) -> f64 {
    let abs = (a - b).abs();
    abs.min(TAU - abs)
}

/// Largest unsigned distance between two angles; `difference + reflex == 2π`.
pub fn reflex_difference(a: f64, b: f64) -> f64 {
    let abs = (a - b).abs();
    abs.max(TAU - abs)
}

/// Angle halfway along the clockwise sweep from `start` to `end`.
///
/// Two equal angles bisect to themselves.
pub fn bisecting(start: f64, end: f64) -> f64 {
    let wrap = if end < start { HALF_CIRCLE_RAD } else { 0.0 };
    (start + (wrap - (start - end).abs() / 2.0).abs()) % TAU
}

pub fn opposite(angle: f64) -> f64 {
    (PI + angle).rem_euclid(TAU)
}

/// X coordinate of the point at `angle` on a circle of `radius`, truncated to whole pixels.
pub fn to_x(angle: f64, radius: f64) -> f64 {
    let unit = angle.sin();
    if unit.abs() < f64::EPSILON {
        return 0.0;
    }
    (unit * radius).trunc()
}

/// Y coordinate of the point at `angle` on a circle of `radius`, truncated to whole pixels.
pub fn to_y(angle: f64, radius: f64) -> f64 {
    let unit = -angle.cos();
    if unit.abs() < f64::EPSILON {
        return 0.0;
    }
    (unit * radius).trunc()
}

pub fn to_point(angle: f64, radius: f64) -> Point {
    Point::new(to_x(angle, radius), to_y(angle, radius))
}

/// Open-interval membership that handles sectors crossing north.
pub fn between(angle: f64, min: f64, max: f64) -> bool {
    if max > min {
        return angle < max && angle > min;
    }
    angle > min || angle < max
}

/// Canonical angle of a vector relative to [`REFERENCE`].
pub fn of_vector(vector: Point) -> f64 {
    let mut deg = REFERENCE.directed_angle(vector);
    if deg < 0.0 {
        deg += FULL_CIRCLE_DEG;
    }
    to_rad(deg)
}
