use std::path::PathBuf;

pub const DEFAULT_TRACK_LENGTH_SECS: f32 = 433.0;
pub const DEFAULT_TRACK_TITLE: &str = "Nocturne No.3 in B, Op.9 No.3";
pub const DEFAULT_TRACK_ARTIST: &str = "Frédéric Chopin, Claudio Arrau";

/// Seconds added to the position by one ticker step.
pub const TICK_STEP_SECS: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub length_secs: f32,
    pub cover: Option<PathBuf>,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            title: DEFAULT_TRACK_TITLE.to_string(),
            artist: DEFAULT_TRACK_ARTIST.to_string(),
            length_secs: DEFAULT_TRACK_LENGTH_SECS,
            cover: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportAction {
    Previous,
    PlayPause,
    Next,
    Seek(f32),
}

/// Authoritative playback progress for the single track on screen.
///
/// `position` always stays inside `[0, track_length]`. Every mutation goes
/// through [`PlaybackState::clamp`], which maps negative and NaN input to `0`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    position: f32,
    playing: bool,
    track_length: f32,
}

impl PlaybackState {
    pub fn new(track_length: f32) -> Self {
        Self {
            position: 0.0,
            playing: false,
            track_length: sanitize_length(track_length),
        }
    }

    pub fn for_track(track: &Track) -> Self {
        Self::new(track.length_secs)
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn track_length(&self) -> f32 {
        self.track_length
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.track_length
    }

    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, self.track_length)
    }

    /// Replaces the track bound, pulling the position back inside it.
    pub fn set_track_length(&mut self, track_length: f32) {
        self.track_length = sanitize_length(track_length);
        self.position = self.clamp(self.position);
    }

    /// Direct seek from the slider. Leaves the playing flag alone.
    pub fn seek(&mut self, value: f32) -> f32 {
        self.position = self.clamp(value);
        self.position
    }

    /// Returns `true` when the flag actually changed.
    pub fn set_playing(&mut self, playing: bool) -> bool {
        if self.playing == playing {
            return false;
        }
        self.playing = playing;
        true
    }

    /// Flips the playing flag and returns the new value. Starting from the
    /// end of the track rewinds to the beginning first.
    pub fn toggle_playing(&mut self) -> bool {
        if !self.playing && self.is_at_end() {
            self.position = 0.0;
        }
        self.playing = !self.playing;
        self.playing
    }

    /// One ticker step: `position = min(position + 1, track_length)`.
    pub fn advance(&mut self) -> f32 {
        self.position = self.clamp(self.position + TICK_STEP_SECS);
        self.position
    }

    /// End-of-track policy: playback stops and the transport shows Play again.
    pub fn finish(&mut self) {
        self.position = self.track_length;
        self.playing = false;
    }

    pub fn handle(&mut self, action: TransportAction) -> bool {
        match action {
            TransportAction::Previous | TransportAction::Next => {
                log::debug!("{action:?} pressed; track navigation is not available");
                false
            }
            TransportAction::PlayPause => {
                let playing = self.toggle_playing();
                log::debug!("playback {}", if playing { "started" } else { "paused" });
                true
            }
            TransportAction::Seek(target) => {
                let before = self.position;
                let after = self.seek(target);
                (after - before).abs() > f32::EPSILON
            }
        }
    }
}

fn sanitize_length(track_length: f32) -> f32 {
    if track_length.is_finite() && track_length > 0.0 {
        track_length
    } else {
        0.0
    }
}

pub fn format_timestamp(seconds: f32) -> String {
    let total_seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    let minutes = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{minutes}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_values_inside_the_track() {
        let state = PlaybackState::new(433.0);
        assert_eq!(state.clamp(0.0), 0.0);
        assert_eq!(state.clamp(120.5), 120.5);
        assert_eq!(state.clamp(433.0), 433.0);
        assert_eq!(state.clamp(500.0), 433.0);
        assert_eq!(state.clamp(-3.0), 0.0);
        assert_eq!(state.clamp(f32::NAN), 0.0);
    }

    #[test]
    fn degenerate_track_length_never_panics() {
        for length in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            let mut state = PlaybackState::new(length);
            assert_eq!(state.track_length(), 0.0);
            assert_eq!(state.seek(10.0), 0.0);
            assert_eq!(state.advance(), 0.0);
            assert!(state.is_at_end());
        }
    }

    #[test]
    fn format_timestamp_renders_minutes_and_padded_seconds() {
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(59.0), "0:59");
        assert_eq!(format_timestamp(59.99), "0:59");
        assert_eq!(format_timestamp(60.0), "1:00");
        assert_eq!(format_timestamp(75.0), "1:15");
        assert_eq!(format_timestamp(433.0), "7:13");
        assert_eq!(format_timestamp(3_725.0), "62:05");
        assert_eq!(format_timestamp(-1.0), "0:00");
    }

    #[test]
    fn seek_does_not_touch_playing_flag() {
        let mut state = PlaybackState::new(433.0);
        state.set_playing(true);
        assert!(state.handle(TransportAction::Seek(100.0)));
        assert_eq!(state.position(), 100.0);
        assert!(state.is_playing());

        assert!(!state.handle(TransportAction::Seek(100.0)));
        state.seek(1_000.0);
        assert_eq!(state.position(), 433.0);
    }

    #[test]
    fn previous_and_next_are_no_ops() {
        let mut state = PlaybackState::new(433.0);
        state.seek(42.0);
        let before = state.clone();
        assert!(!state.handle(TransportAction::Previous));
        assert!(!state.handle(TransportAction::Next));
        assert_eq!(state, before);
    }

    #[test]
    fn toggle_at_end_rewinds_before_playing() {
        let mut state = PlaybackState::new(433.0);
        state.seek(433.0);
        assert!(state.toggle_playing());
        assert_eq!(state.position(), 0.0);

        state.seek(200.0);
        assert!(!state.toggle_playing());
        assert_eq!(state.position(), 200.0);
    }

    #[test]
    fn shrinking_the_track_reclamps_position() {
        let mut state = PlaybackState::new(433.0);
        state.seek(300.0);
        state.set_track_length(120.0);
        assert_eq!(state.position(), 120.0);
        assert!(state.is_at_end());
    }
}
