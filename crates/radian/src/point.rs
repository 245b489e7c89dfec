use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Unit vector every directed angle is measured from: straight up on screen.
pub const REFERENCE: Point = Point::new(0.0, -1.0);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self - other).length()
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn floor(self) -> Self {
        Self::new(self.x.floor(), self.y.floor())
    }

    /// Component-wise product.
    pub fn multiply(self, other: Point) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    /// Rescales the vector to `length`. The zero vector stays zero.
    pub fn normalize(self, length: f64) -> Self {
        let current = self.length();
        if current == 0.0 {
            return self;
        }
        self * (length / current)
    }

    pub fn lerp(self, other: Point, t: f64) -> Self {
        Self::new(
            t * other.x + (1.0 - t) * self.x,
            t * other.y + (1.0 - t) * self.y,
        )
    }

    /// Signed angle in degrees from `self` to `other`, positive clockwise on screen.
    pub fn directed_angle(self, other: Point) -> f64 {
        self.cross(other).atan2(self.dot(other)).to_degrees()
    }

    /// Unsigned angle in radians between two vectors. NaN if either is zero.
    pub fn angle_between(self, other: Point) -> f64 {
        let ratio = self.dot(other) / (self.length() * other.length());
        ratio.clamp(-1.0, 1.0).acos()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ x: {}, y: {} }}", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directed_angle_is_clockwise_from_reference() {
        assert!((REFERENCE.directed_angle(Point::new(1.0, 0.0)) - 90.0).abs() < 1e-9);
        assert!((REFERENCE.directed_angle(Point::new(-1.0, 0.0)) + 90.0).abs() < 1e-9);
        assert!(REFERENCE.directed_angle(Point::new(0.0, -5.0)).abs() < 1e-9);
    }

    #[test]
    fn normalize_keeps_direction() {
        let p = Point::new(3.0, 4.0).normalize(10.0);
        assert_eq!(p, Point::new(6.0, 8.0));
        assert_eq!(Point::ZERO.normalize(10.0), Point::ZERO);
    }

    #[test]
    fn angle_between_parallel_vectors_is_zero() {
        let a = Point::new(120.0, 0.0);
        let b = Point::new(200.0, 0.0);
        assert!(a.angle_between(b).abs() < 1e-12);
        assert!(Point::ZERO.angle_between(b).is_nan());
    }
}
