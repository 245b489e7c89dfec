//! Turns raw button and motion input into the actions the menu consumes.
//!
//! The primary button doubles as the gesture trigger: holding it switches on
//! marking mode, moving it far enough turns the press into a drag, and
//! releasing it quickly without moving is a click.

use crate::events::{ClickState, DragEvent, DragState};
use radian::Point;
use std::time::{Duration, Instant};

/// Movement below this many pixels keeps a press a click.
pub const DRAG_SLOP: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    Moved(Point),
    Click(ClickState),
    Drag(DragEvent),
    MarkingMode(bool),
}

#[derive(Debug, Clone, Copy)]
struct Press {
    at: Point,
    since: Instant,
    dragging: bool,
}

#[derive(Debug, Clone)]
pub struct PointerTracker {
    input_timeout: Duration,
    press: Option<Press>,
}

impl PointerTracker {
    /// `input_timeout` is the longest press that still counts as a click.
    pub fn new(input_timeout: Duration) -> Self {
        Self {
            input_timeout,
            press: None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn press(&mut self, button: ClickState, at: Point, now: Instant) -> Vec<PointerAction> {
        match button {
            ClickState::Left => {
                self.press = Some(Press {
                    at,
                    since: now,
                    dragging: false,
                });
                vec![PointerAction::MarkingMode(true)]
            }
            ClickState::Right => Vec::new(),
        }
    }

    pub fn moved(&mut self, to: Point, now: Instant) -> Vec<PointerAction> {
        let mut actions = vec![PointerAction::Moved(to)];
        if let Some(press) = &mut self.press {
            if !press.dragging
                && (press.at.distance(to) > DRAG_SLOP
                    || now.duration_since(press.since) > self.input_timeout)
            {
                log::trace!("press at {:?} became a drag", press.at);
                press.dragging = true;
            }
            if press.dragging {
                actions.push(PointerAction::Drag(DragEvent {
                    state: DragState::Dragging,
                    position: to,
                }));
            }
        }
        actions
    }

    /// A left press held past the input timeout without moving ends as
    /// neither click nor drag: while it was held, marking mode let the
    /// stutter of the trace make the selection.
    pub fn release(&mut self, button: ClickState, at: Point, now: Instant) -> Vec<PointerAction> {
        match button {
            ClickState::Right => vec![PointerAction::Click(ClickState::Right)],
            ClickState::Left => {
                let Some(press) = self.press.take() else {
                    log::debug!("release without press");
                    return Vec::new();
                };
                let mut actions = Vec::with_capacity(2);
                if press.dragging {
                    actions.push(PointerAction::Drag(DragEvent {
                        state: DragState::End,
                        position: at,
                    }));
                } else if now.duration_since(press.since) <= self.input_timeout {
                    actions.push(PointerAction::Click(ClickState::Left));
                }
                actions.push(PointerAction::MarkingMode(false));
                actions
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> (PointerTracker, Instant) {
        (PointerTracker::new(Duration::from_millis(250)), Instant::now())
    }

    #[test]
    fn quick_release_is_a_click() {
        let (mut tracker, t0) = tracker();
        let at = Point::new(10.0, 10.0);
        assert_eq!(
            tracker.press(ClickState::Left, at, t0),
            vec![PointerAction::MarkingMode(true)]
        );
        assert!(tracker.is_pressed());
        assert_eq!(
            tracker.release(ClickState::Left, at, t0 + Duration::from_millis(100)),
            vec![
                PointerAction::Click(ClickState::Left),
                PointerAction::MarkingMode(false)
            ]
        );
        assert!(!tracker.is_pressed());
    }

    #[test]
    fn slow_release_is_not_a_click() {
        let (mut tracker, t0) = tracker();
        tracker.press(ClickState::Left, Point::ZERO, t0);
        assert_eq!(
            tracker.release(ClickState::Left, Point::ZERO, t0 + Duration::from_millis(400)),
            vec![PointerAction::MarkingMode(false)]
        );
    }

    #[test]
    fn long_still_press_only_leaves_marking_mode() {
        let (mut tracker, t0) = tracker();
        let at = Point::new(50.0, 50.0);
        tracker.press(ClickState::Left, at, t0);

        // jitter inside the slop, before the timeout
        assert_eq!(
            tracker.moved(Point::new(51.0, 50.0), t0 + Duration::from_millis(100)),
            vec![PointerAction::Moved(Point::new(51.0, 50.0))]
        );

        assert_eq!(
            tracker.release(ClickState::Left, at, t0 + Duration::from_millis(1000)),
            vec![PointerAction::MarkingMode(false)]
        );
        assert!(!tracker.is_pressed());
    }

    #[test]
    fn moving_while_pressed_drags() {
        let (mut tracker, t0) = tracker();
        tracker.press(ClickState::Left, Point::ZERO, t0);

        // within slop
        assert_eq!(
            tracker.moved(Point::new(2.0, 2.0), t0),
            vec![PointerAction::Moved(Point::new(2.0, 2.0))]
        );

        let to = Point::new(30.0, 0.0);
        let actions = tracker.moved(to, t0);
        assert_eq!(
            actions[1],
            PointerAction::Drag(DragEvent {
                state: DragState::Dragging,
                position: to
            })
        );

        let actions = tracker.release(ClickState::Left, to, t0);
        assert_eq!(
            actions,
            vec![
                PointerAction::Drag(DragEvent {
                    state: DragState::End,
                    position: to
                }),
                PointerAction::MarkingMode(false)
            ]
        );
    }

    #[test]
    fn right_button_clicks_on_release() {
        let (mut tracker, t0) = tracker();
        assert!(tracker.press(ClickState::Right, Point::ZERO, t0).is_empty());
        assert_eq!(
            tracker.release(ClickState::Right, Point::ZERO, t0),
            vec![PointerAction::Click(ClickState::Right)]
        );
        assert!(tracker.release(ClickState::Left, Point::ZERO, t0).is_empty());
    }
}
