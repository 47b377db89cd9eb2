use std::time::{Duration, Instant};

pub const DEFAULT_SLIDER_ANIMATION: Duration = Duration::from_millis(1000);

/// Linear interpolation toward the latest target, restarted from whatever is
/// currently on screen whenever the target moves. Presentation only.
#[derive(Debug, Clone)]
pub struct SliderTween {
    from: f32,
    to: f32,
    started: Option<Instant>,
    duration: Duration,
}

impl SliderTween {
    pub fn new(initial: f32, duration: Duration) -> Self {
        Self {
            from: initial,
            to: initial,
            started: None,
            duration,
        }
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn value_at(&self, now: Instant) -> f32 {
        let Some(started) = self.started else {
            return self.to;
        };
        let total = self.duration.as_secs_f32();
        if total <= f32::EPSILON {
            return self.to;
        }
        let t = (now.saturating_duration_since(started).as_secs_f32() / total).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    pub fn retarget(&mut self, target: f32, now: Instant) {
        if (target - self.to).abs() <= f32::EPSILON {
            return;
        }
        if self.duration.is_zero() {
            self.snap(target);
            return;
        }
        self.from = self.value_at(now);
        self.to = target;
        self.started = Some(now);
    }

    pub fn snap(&mut self, value: f32) {
        self.from = value;
        self.to = value;
        self.started = None;
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        match self.started {
            Some(started) => now < started + self.duration,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn interpolates_linearly() {
        let t0 = Instant::now();
        let mut tween = SliderTween::new(0.0, SECOND);
        tween.retarget(10.0, t0);

        assert_eq!(tween.value_at(t0), 0.0);
        assert!((tween.value_at(t0 + SECOND / 2) - 5.0).abs() < 1e-3);
        assert_eq!(tween.value_at(t0 + SECOND), 10.0);
        assert_eq!(tween.value_at(t0 + 3 * SECOND), 10.0);
        assert!(tween.is_animating(t0 + SECOND / 2));
        assert!(!tween.is_animating(t0 + SECOND));
    }

    #[test]
    fn retarget_continues_from_displayed_value() {
        let t0 = Instant::now();
        let mut tween = SliderTween::new(0.0, SECOND);
        tween.retarget(10.0, t0);

        let mid = t0 + SECOND / 2;
        tween.retarget(20.0, mid);
        assert!((tween.value_at(mid) - 5.0).abs() < 1e-3);
        assert!((tween.value_at(mid + SECOND / 2) - 12.5).abs() < 1e-3);
        assert_eq!(tween.value_at(mid + SECOND), 20.0);
    }

    #[test]
    fn same_target_does_not_restart() {
        let t0 = Instant::now();
        let mut tween = SliderTween::new(0.0, SECOND);
        tween.retarget(4.0, t0);
        tween.retarget(4.0, t0 + SECOND / 2);
        assert_eq!(tween.value_at(t0 + SECOND), 4.0);
    }

    #[test]
    fn zero_duration_snaps() {
        let mut tween = SliderTween::new(0.0, Duration::ZERO);
        let now = Instant::now();
        tween.retarget(7.0, now);
        assert_eq!(tween.value_at(now), 7.0);
        assert!(!tween.is_animating(now));
    }
}
