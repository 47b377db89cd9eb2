use std::time::{Duration, Instant};

use crate::playback::PlaybackState;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No schedule is active.
    Idle,
    /// Scheduled, but the deadline has not passed yet.
    Waiting,
    /// Position moved forward one step and the next tick is scheduled.
    Advanced,
    /// Position reached the end of the track; the schedule is gone.
    Ended,
    /// Playback was paused before the deadline; the schedule is gone.
    Stopped,
}

/// Simulated playback progress.
///
/// The ticker never owns a thread. It holds at most one deadline and is
/// polled from the UI frame loop, so a second increment stream cannot exist.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_TICK_INTERVAL),
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Takes effect from the next scheduled tick.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(MIN_TICK_INTERVAL);
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Schedules the first tick one interval from `now`. Returns `false` when
    /// a schedule already exists or the start condition does not hold.
    pub fn start(&mut self, state: &PlaybackState, now: Instant) -> bool {
        if self.next_due.is_some() {
            return false;
        }
        if !state.is_playing() || state.is_at_end() {
            return false;
        }
        self.next_due = Some(now + self.interval);
        log::debug!(
            "ticker started at {:.0}s, interval {:?}",
            state.position(),
            self.interval
        );
        true
    }

    pub fn cancel(&mut self) -> bool {
        let was_running = self.next_due.take().is_some();
        if was_running {
            log::debug!("ticker cancelled");
        }
        was_running
    }

    /// Aligns the schedule with the playing flag after an input event.
    pub fn sync(&mut self, state: &PlaybackState, now: Instant) {
        if state.is_playing() {
            self.start(state, now);
        } else {
            self.cancel();
        }
    }

    pub fn poll(&mut self, state: &mut PlaybackState, now: Instant) -> TickOutcome {
        let Some(due) = self.next_due else {
            return TickOutcome::Idle;
        };
        if now < due {
            return TickOutcome::Waiting;
        }
        if !state.is_playing() {
            self.next_due = None;
            return TickOutcome::Stopped;
        }

        state.advance();
        if state.is_at_end() {
            self.next_due = None;
            log::debug!("ticker reached the end of the track");
            TickOutcome::Ended
        } else {
            self.next_due = Some(now + self.interval);
            TickOutcome::Advanced
        }
    }

    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_due
            .map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    fn playing_at(position: f32) -> PlaybackState {
        let mut state = PlaybackState::new(433.0);
        state.seek(position);
        state.set_playing(true);
        state
    }

    #[test]
    fn does_not_start_while_paused() {
        let state = PlaybackState::new(433.0);
        let mut ticker = Ticker::default();
        assert!(!ticker.start(&state, Instant::now()));
        assert!(!ticker.is_running());
    }

    #[test]
    fn waiting_poll_leaves_position_alone() {
        let t0 = Instant::now();
        let mut state = playing_at(10.0);
        let mut ticker = Ticker::default();
        ticker.start(&state, t0);

        let outcome = ticker.poll(&mut state, t0 + Duration::from_millis(999));
        assert_eq!(outcome, TickOutcome::Waiting);
        assert_eq!(state.position(), 10.0);
        assert_eq!(
            ticker.time_until_next(t0 + Duration::from_millis(400)),
            Some(Duration::from_millis(600))
        );
    }

    #[test]
    fn second_start_keeps_the_existing_schedule() {
        let t0 = Instant::now();
        let mut state = playing_at(0.0);
        let mut ticker = Ticker::default();
        assert!(ticker.start(&state, t0));
        assert!(!ticker.start(&state, t0 + Duration::from_millis(500)));

        assert_eq!(ticker.poll(&mut state, t0 + SECOND), TickOutcome::Advanced);
        assert_eq!(ticker.poll(&mut state, t0 + SECOND), TickOutcome::Waiting);
        assert_eq!(state.position(), 1.0);
    }

    #[test]
    fn late_poll_advances_once() {
        let t0 = Instant::now();
        let mut state = playing_at(5.0);
        let mut ticker = Ticker::default();
        ticker.start(&state, t0);

        assert_eq!(
            ticker.poll(&mut state, t0 + 5 * SECOND),
            TickOutcome::Advanced
        );
        assert_eq!(state.position(), 6.0);
    }

    #[test]
    fn interval_is_floored() {
        let ticker = Ticker::new(Duration::ZERO);
        assert_eq!(ticker.interval(), MIN_TICK_INTERVAL);
    }

    #[test]
    fn paused_state_at_deadline_stops() {
        let t0 = Instant::now();
        let mut state = playing_at(5.0);
        let mut ticker = Ticker::default();
        ticker.start(&state, t0);
        state.set_playing(false);

        assert_eq!(ticker.poll(&mut state, t0 + SECOND), TickOutcome::Stopped);
        assert_eq!(state.position(), 5.0);
        assert!(!ticker.is_running());
    }
}
