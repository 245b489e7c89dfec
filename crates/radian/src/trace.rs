//! Gesture recognition for marking mode.
//!
//! A [`Trace`] resamples the pointer path and reports a [`DecisionPoint`]
//! when the stroke turns sharply or when the pointer rests after a long
//! enough stroke. Time is passed in explicitly so the host decides how the
//! stutter deadline is polled.

use crate::point::Point;
use std::f64::consts::PI;
use std::time::{Duration, Instant};

/// Spacing of the resampled stroke points.
pub const SAMPLING_DISTANCE: f64 = 20.0;

/// Turn angle that counts as a direction change.
pub const THRESHOLD_ANGLE: f64 = PI / 30.0;

/// Rest time after which a stroke counts as a stutter.
pub const PAUSE_DELAY: Duration = Duration::from_millis(100);

pub const DEFAULT_MINIMUM_DISTANCE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionKind {
    Stutter,
    DirectionChanged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPoint {
    pub kind: DecisionKind,
    pub position: Point,
}

#[derive(Debug, Clone, Copy)]
struct PendingStutter {
    deadline: Instant,
    samples: usize,
    position: Point,
}

#[derive(Debug, Clone)]
pub struct Trace {
    stroke: Vec<Point>,
    minimum_distance: f64,
    pending: Option<PendingStutter>,
}

impl Default for Trace {
    fn default() -> Self {
        Self::new(DEFAULT_MINIMUM_DISTANCE)
    }
}

impl Trace {
    pub fn new(minimum_distance: f64) -> Self {
        Self {
            stroke: Vec::new(),
            minimum_distance,
            pending: None,
        }
    }

    pub fn minimum_distance(&self) -> f64 {
        self.minimum_distance
    }

    pub fn stroke(&self) -> &[Point] {
        &self.stroke
    }

    /// Clears the stroke and any stutter waiting for its deadline.
    pub fn reset(&mut self) {
        self.stroke.clear();
        self.pending = None;
    }

    /// Feeds a pointer position. Returns a decision point when the stroke
    /// turned away from its average direction far enough from its start.
    pub fn update(&mut self, position: Point, now: Instant) -> Option<DecisionPoint> {
        let Some(&last) = self.stroke.last() else {
            self.stroke.push(position);
            return None;
        };

        let dist = position.distance(last);
        if dist > SAMPLING_DISTANCE {
            let samples = dist / SAMPLING_DISTANCE;
            let mut i = 1.0;
            while i <= samples {
                self.stroke.push(last.lerp(position, i / samples));
                i += 1.0;
            }

            self.pending = Some(PendingStutter {
                deadline: now + PAUSE_DELAY,
                samples: self.stroke.len(),
                position,
            });
        }

        if self.stroke.len() >= 2 {
            let start = self.stroke[0];
            let turn = self.direction().angle_between(position - start);
            if turn > THRESHOLD_ANGLE && position.distance(start) > self.minimum_distance {
                log::trace!("direction changed at {last}");
                self.reset();
                return Some(DecisionPoint {
                    kind: DecisionKind::DirectionChanged,
                    position: last,
                });
            }
        }

        None
    }

    /// Fires a due stutter if the stroke has not grown since it was armed.
    pub fn poll(&mut self, now: Instant) -> Option<DecisionPoint> {
        let pending = self.pending?;
        if now < pending.deadline {
            return None;
        }
        self.pending = None;

        let start = *self.stroke.first()?;
        if pending.samples == self.stroke.len()
            && pending.position.distance(start) > self.minimum_distance
        {
            log::trace!("stutter at {}", pending.position);
            self.reset();
            return Some(DecisionPoint {
                kind: DecisionKind::Stutter,
                position: pending.position,
            });
        }
        None
    }

    /// Mean of the sampled points after the first, relative to the first.
    fn direction(&self) -> Point {
        let Some((&first, rest)) = self.stroke.split_first() else {
            return Point::ZERO;
        };
        let n = rest.len() as f64;
        let sum = rest.iter().fold(Point::ZERO, |acc, &p| acc + p);
        sum * (1.0 / n) - first
    }
}
