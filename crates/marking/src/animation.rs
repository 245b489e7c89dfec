//! Property tweening over an abstract scene.
//!
//! An [`Animation`] interpolates a [`Keyframe`] on one target of a [`Scene`].
//! An [`AnimationGroup`] runs several animations as one unit and hands back
//! follow-up actions when the whole group finishes or is stopped early. The
//! clock is driven from outside: nothing here sleeps or spawns.

use radian::Point;
use std::time::{Duration, Instant};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum Easing {
    Linear,
    EaseInCubic,
    #[default]
    EaseOutCubic,
    EaseInOutCubic,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = 2.0 * t - 2.0;
                    0.5 * u * u * u + 1.0
                }
            }
        }
    }
}

/// Animatable properties. Unset fields are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keyframe {
    pub position: Option<Point>,
    pub scaling: Option<f64>,
    pub opacity: Option<f64>,
    pub offset_x: Option<f64>,
}

impl Keyframe {
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn scaling(scaling: f64) -> Self {
        Self {
            scaling: Some(scaling),
            ..Self::default()
        }
    }

    pub fn opacity(opacity: f64) -> Self {
        Self {
            opacity: Some(opacity),
            ..Self::default()
        }
    }

    pub fn offset_x(offset_x: f64) -> Self {
        Self {
            offset_x: Some(offset_x),
            ..Self::default()
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_scaling(mut self, scaling: f64) -> Self {
        self.scaling = Some(scaling);
        self
    }

    /// Values of `current` for exactly the fields set on `self`.
    fn pick(&self, current: &Keyframe) -> Keyframe {
        Keyframe {
            position: self.position.and(current.position),
            scaling: self.scaling.and(current.scaling),
            opacity: self.opacity.and(current.opacity),
            offset_x: self.offset_x.and(current.offset_x),
        }
    }

    /// Field-wise `self` falling back to `other`.
    fn or(self, other: Keyframe) -> Keyframe {
        Keyframe {
            position: self.position.or(other.position),
            scaling: self.scaling.or(other.scaling),
            opacity: self.opacity.or(other.opacity),
            offset_x: self.offset_x.or(other.offset_x),
        }
    }

    /// Interpolates every field set on `to`; a missing start value jumps straight to `to`.
    fn lerp(&self, to: &Keyframe, t: f64) -> Keyframe {
        let num = |a: Option<f64>, b: Option<f64>| b.map(|b| a.map_or(b, |a| a + (b - a) * t));
        Keyframe {
            position: to
                .position
                .map(|b| self.position.map_or(b, |a| a.lerp(b, t))),
            scaling: num(self.scaling, to.scaling),
            opacity: num(self.opacity, to.opacity),
            offset_x: num(self.offset_x, to.offset_x),
        }
    }
}

/// Whatever owns the animated properties.
pub trait Scene<T> {
    fn snapshot(&self, target: &T) -> Keyframe;
    fn apply(&mut self, target: &T, frame: &Keyframe);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct Animation<T> {
    target: T,
    from: Option<Keyframe>,
    to: Keyframe,
    duration: Option<Duration>,
    easing: Option<Easing>,
    start_frame: Keyframe,
    started_at: Option<Instant>,
    phase: Phase,
}

impl<T: PartialEq> Animation<T> {
    /// Tweens from the target's current values to `to`.
    pub fn to(target: T, to: Keyframe) -> Self {
        Self {
            target,
            from: None,
            to,
            duration: None,
            easing: None,
            start_frame: Keyframe::default(),
            started_at: None,
            phase: Phase::Idle,
        }
    }

    /// Sets `from` on start, then tweens to `to`.
    pub fn between(target: T, from: Keyframe, to: Keyframe) -> Self {
        Self {
            from: Some(from),
            ..Self::to(target, to)
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn start<S: Scene<T>>(&mut self, scene: &mut S) {
        let current = self.to.pick(&scene.snapshot(&self.target));
        if let Some(from) = self.from {
            scene.apply(&self.target, &from);
        }
        self.start_frame = self.from.unwrap_or_default().or(current);
        self.started_at = None;
        self.phase = Phase::Running;
    }

    /// Moves the animation to `now`. The first call after start pins the
    /// start time. Returns true on the call that finishes it.
    pub fn advance<S: Scene<T>>(&mut self, scene: &mut S, now: Instant) -> bool {
        if self.phase != Phase::Running {
            return false;
        }

        let started = *self.started_at.get_or_insert(now);
        let duration = self.duration.unwrap_or_default();
        let t = if duration.is_zero() {
            1.0
        } else {
            (now.saturating_duration_since(started).as_secs_f64() / duration.as_secs_f64())
                .min(1.0)
        };

        let eased = self.easing.unwrap_or_default().apply(t);
        scene.apply(&self.target, &self.start_frame.lerp(&self.to, eased));

        if t >= 1.0 {
            self.phase = Phase::Finished;
            return true;
        }
        false
    }

    /// Stops a running animation and snaps the target to `to`.
    pub fn stop<S: Scene<T>>(&mut self, scene: &mut S) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.phase = Phase::Stopped;
        scene.apply(&self.target, &self.to);
        true
    }

    /// Stops without touching the target.
    pub fn cancel(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Stopped;
        }
    }
}

/// Animations that start together, with follow-up actions of type `A`.
///
/// Stop actions are returned only when every animation was still running,
/// finish actions only once all of them completed. A stopped group never
/// yields its finish actions.
#[derive(Debug, Clone)]
pub struct AnimationGroup<T, A> {
    animations: Vec<Animation<T>>,
    duration: Option<Duration>,
    easing: Option<Easing>,
    on_stop: Vec<A>,
    on_finish: Vec<A>,
    finish_fired: bool,
}

impl<T, A> Default for AnimationGroup<T, A> {
    fn default() -> Self {
        Self {
            animations: Vec::new(),
            duration: None,
            easing: None,
            on_stop: Vec::new(),
            on_finish: Vec::new(),
            finish_fired: false,
        }
    }
}

impl<T: PartialEq, A> AnimationGroup<T, A> {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = Some(duration);
        for animation in &mut self.animations {
            animation.duration = Some(duration);
        }
    }

    pub fn set_easing(&mut self, easing: Easing) {
        self.easing = Some(easing);
        for animation in &mut self.animations {
            animation.easing = Some(easing);
        }
    }

    pub fn easing(&self) -> Option<Easing> {
        self.easing
    }

    pub fn push(&mut self, mut animation: Animation<T>) {
        if animation.duration.is_none() {
            animation.duration = self.duration;
        }
        if let Some(easing) = self.easing {
            animation.easing = Some(easing);
        }
        self.animations.push(animation);
    }

    pub fn on_stop(&mut self, action: A) {
        self.on_stop.push(action);
    }

    pub fn on_finish(&mut self, action: A) {
        self.on_finish.push(action);
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn running(&self) -> bool {
        self.animations.iter().any(Animation::running)
    }

    pub fn targets(&self) -> impl Iterator<Item = &T> {
        self.animations.iter().map(Animation::target)
    }

    /// Drops every animation on `target`.
    pub fn remove(&mut self, target: &T) {
        self.animations.retain(|a| a.target() != target);
    }

    pub fn start<S: Scene<T>>(&mut self, scene: &mut S) {
        self.finish_fired = false;
        for animation in &mut self.animations {
            animation.start(scene);
        }
    }

    pub fn advance<S: Scene<T>>(&mut self, scene: &mut S, now: Instant) -> Vec<A> {
        for animation in &mut self.animations {
            animation.advance(scene, now);
        }

        let done = !self.animations.is_empty()
            && self
                .animations
                .iter()
                .all(|a| a.phase() == Phase::Finished);
        if done && !self.finish_fired {
            self.finish_fired = true;
            return std::mem::take(&mut self.on_finish);
        }
        Vec::new()
    }

    /// Snaps every running animation to its end values.
    pub fn stop<S: Scene<T>>(&mut self, scene: &mut S) -> Vec<A> {
        let all_running = !self.animations.is_empty() && self.animations.iter().all(Animation::running);
        for animation in &mut self.animations {
            animation.stop(scene);
        }
        if all_running {
            self.on_finish.clear();
            return std::mem::take(&mut self.on_stop);
        }
        Vec::new()
    }

    /// Forgets all animations and callbacks. Duration is kept.
    pub fn reset(&mut self) {
        self.animations.clear();
        self.on_stop.clear();
        self.on_finish.clear();
        self.easing = None;
        self.finish_fired = false;
    }
}

/// Keeps at most one value per window: the first goes through immediately,
/// later ones within the window replace each other until flushed.
#[derive(Debug, Clone)]
pub struct Coalescer<T> {
    window: Duration,
    last: Option<Instant>,
    pending: Option<T>,
}

impl<T> Coalescer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last: None,
            pending: None,
        }
    }

    pub fn push(&mut self, value: T, now: Instant) -> Option<T> {
        match self.last {
            Some(last) if now < last + self.window => {
                self.pending = Some(value);
                None
            }
            _ => {
                self.last = Some(now);
                self.pending = None;
                Some(value)
            }
        }
    }

    pub fn flush(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_none() {
            return None;
        }
        if self.last.is_some_and(|last| now < last + self.window) {
            return None;
        }
        self.last = Some(now);
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Board(HashMap<&'static str, Keyframe>);

    impl Scene<&'static str> for Board {
        fn snapshot(&self, target: &&'static str) -> Keyframe {
            self.0.get(target).copied().unwrap_or_default()
        }

        fn apply(&mut self, target: &&'static str, frame: &Keyframe) {
            let entry = self.0.entry(target).or_default();
            *entry = frame.or(*entry);
        }
    }

    fn board() -> Board {
        let mut b = Board::default();
        b.0.insert("a", Keyframe::scaling(0.0).with_position(Point::ZERO));
        b.0.insert("b", Keyframe::opacity(0.0));
        b
    }

    #[test]
    fn easing_endpoints() {
        for e in [
            Easing::Linear,
            Easing::EaseInCubic,
            Easing::EaseOutCubic,
            Easing::EaseInOutCubic,
        ] {
            assert_eq!(e.apply(0.0), 0.0);
            assert_eq!(e.apply(1.0), 1.0);
        }
        assert_eq!(Easing::EaseInCubic.apply(0.5), 0.125);
        assert_eq!(Easing::EaseOutCubic.apply(0.5), 0.875);
        assert_eq!("easeInCubic".parse::<Easing>().unwrap(), Easing::EaseInCubic);
    }

    #[test]
    fn animation_interpolates_from_current_values() {
        let mut scene = board();
        let t0 = Instant::now();
        let mut anim = Animation::to("a", Keyframe::scaling(1.0))
            .with_duration(Duration::from_millis(100))
            .with_easing(Easing::Linear);

        anim.start(&mut scene);
        assert!(!anim.advance(&mut scene, t0));
        assert_eq!(scene.0["a"].scaling, Some(0.0));

        anim.advance(&mut scene, t0 + Duration::from_millis(50));
        assert_eq!(scene.0["a"].scaling, Some(0.5));
        assert_eq!(scene.0["a"].position, Some(Point::ZERO));

        assert!(anim.advance(&mut scene, t0 + Duration::from_millis(150)));
        assert_eq!(scene.0["a"].scaling, Some(1.0));
        assert_eq!(anim.phase(), Phase::Finished);
    }

    #[test]
    fn explicit_from_is_applied_on_start() {
        let mut scene = board();
        let mut anim = Animation::between(
            "a",
            Keyframe::position(Point::new(10.0, 0.0)),
            Keyframe::position(Point::new(20.0, 0.0)),
        );
        anim.start(&mut scene);
        assert_eq!(scene.0["a"].position, Some(Point::new(10.0, 0.0)));
    }

    #[test]
    fn group_finish_fires_once_after_all_complete() {
        let mut scene = board();
        let t0 = Instant::now();
        let mut group: AnimationGroup<&str, u8> = AnimationGroup::new(Duration::from_millis(100));
        group.push(Animation::to("a", Keyframe::scaling(1.0)));
        group.push(
            Animation::to("b", Keyframe::opacity(1.0)).with_duration(Duration::from_millis(200)),
        );
        group.on_finish(7);
        group.start(&mut scene);

        assert!(group.advance(&mut scene, t0).is_empty());
        assert!(group.advance(&mut scene, t0 + Duration::from_millis(150)).is_empty());
        assert!(group.running());
        assert_eq!(group.advance(&mut scene, t0 + Duration::from_millis(250)), vec![7]);
        assert!(group.advance(&mut scene, t0 + Duration::from_millis(300)).is_empty());
    }

    #[test]
    fn stopped_group_snaps_and_skips_finish() {
        let mut scene = board();
        let t0 = Instant::now();
        let mut group: AnimationGroup<&str, u8> = AnimationGroup::new(Duration::from_millis(100));
        group.push(Animation::to("a", Keyframe::scaling(1.0)));
        group.on_stop(1);
        group.on_finish(2);
        group.start(&mut scene);
        group.advance(&mut scene, t0);

        assert_eq!(group.stop(&mut scene), vec![1]);
        assert_eq!(scene.0["a"].scaling, Some(1.0));
        assert!(group.advance(&mut scene, t0 + Duration::from_secs(1)).is_empty());

        // nothing left running: a second stop has no callbacks
        assert!(group.stop(&mut scene).is_empty());
    }

    #[test]
    fn group_settings_apply_to_members() {
        let mut group: AnimationGroup<&str, ()> = AnimationGroup::new(Duration::from_millis(40));
        group.set_easing(Easing::EaseInCubic);
        group.push(Animation::to("a", Keyframe::scaling(1.0)));
        group.push(Animation::to("b", Keyframe::opacity(1.0)));
        assert_eq!(group.len(), 2);

        group.remove(&"a");
        assert_eq!(group.targets().collect::<Vec<_>>(), vec![&"b"]);

        group.reset();
        assert!(group.is_empty());
        assert_eq!(group.easing(), None);
    }

    #[test]
    fn coalescer_keeps_latest_within_window() {
        let t0 = Instant::now();
        let window = Duration::from_millis(16);
        let mut c = Coalescer::new(window);

        assert_eq!(c.push(1, t0), Some(1));
        assert_eq!(c.push(2, t0 + Duration::from_millis(4)), None);
        assert_eq!(c.push(3, t0 + Duration::from_millis(8)), None);
        assert!(c.has_pending());
        assert_eq!(c.flush(t0 + Duration::from_millis(10)), None);
        assert_eq!(c.flush(t0 + Duration::from_millis(16)), Some(3));
        assert_eq!(c.flush(t0 + Duration::from_millis(40)), None);
        assert_eq!(c.push(4, t0 + Duration::from_millis(40)), Some(4));
    }
}
