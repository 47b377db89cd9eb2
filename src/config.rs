use anyhow::Context;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver},
    time::Duration,
};

use crate::{
    playback::{Track, DEFAULT_TRACK_ARTIST, DEFAULT_TRACK_LENGTH_SECS, DEFAULT_TRACK_TITLE},
    ticker::{DEFAULT_TICK_INTERVAL, MIN_TICK_INTERVAL},
    tween::DEFAULT_SLIDER_ANIMATION,
};

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_CONFIG_FILE_NAME: &str = "static_music_ui.toml";
const MAX_SLIDER_ANIMATION_MS: u64 = 10_000;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub track: Track,
    pub playback: PlaybackConfig,
    pub ui: UiConfig,
    /// Non-fatal problems found while resolving the document.
    pub warnings: Vec<String>,
}

impl Config {
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Ok(current_dir) = env::current_dir() {
            candidates.push(current_dir.join(CONFIG_FILE_NAME));
            candidates.push(current_dir.join("config").join(APP_CONFIG_FILE_NAME));
        }

        if let Ok(exe) = env::current_exe() {
            if let Some(dir) = exe.parent() {
                candidates.push(dir.join(CONFIG_FILE_NAME));
                candidates.push(dir.join("config").join(APP_CONFIG_FILE_NAME));
            }
        }

        candidates
    }

    pub fn locate() -> Option<PathBuf> {
        Self::candidate_paths().into_iter().find(|path| path.exists())
    }

    /// Loads the first config file found, or defaults when there is none.
    pub fn load() -> anyhow::Result<(Self, Option<PathBuf>)> {
        match Self::locate() {
            Some(path) => {
                let config = Self::load_from_path(&path)?;
                Ok((config, Some(path)))
            }
            None => Ok((Config::default(), None)),
        }
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::from_toml_str(&data)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        if let Some(cover) = config.track.cover.take() {
            config.track.cover = Some(resolve_relative(path, cover));
        }
        Ok(config)
    }

    pub fn from_toml_str(data: &str) -> anyhow::Result<Self> {
        let doc: ConfigDocument = toml::from_str(data)?;
        Ok(doc.into())
    }
}

fn resolve_relative(config_path: &Path, asset: PathBuf) -> PathBuf {
    if asset.is_absolute() {
        return asset;
    }
    match config_path.parent() {
        Some(dir) => dir.join(asset),
        None => asset,
    }
}

#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    pub tick_interval: Duration,
    pub slider_animation: Duration,
    pub animate_slider: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            slider_animation: DEFAULT_SLIDER_ANIMATION,
            animate_slider: true,
        }
    }
}

impl PlaybackConfig {
    /// Zero when the slider should jump instead of animating.
    pub fn effective_slider_animation(&self) -> Duration {
        if self.animate_slider {
            self.slider_animation
        } else {
            Duration::ZERO
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub window_width: f32,
    pub window_height: f32,
    pub hot_reload: bool,
    pub theme: ThemeConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_width: 480.0,
            window_height: 800.0,
            hot_reload: true,
            theme: ThemeConfig::default(),
        }
    }
}

/// Raw color strings; resolved into a palette by `theme::Theme::from_config`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ThemeConfig {
    pub background: Option<String>,
    pub surface: Option<String>,
    pub primary: Option<String>,
    pub text: Option<String>,
    pub secondary_text: Option<String>,
    pub button: Option<String>,
    pub button_icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    track: TrackSection,
    #[serde(default)]
    playback: PlaybackSection,
    #[serde(default)]
    ui: UiSection,
}

impl From<ConfigDocument> for Config {
    fn from(value: ConfigDocument) -> Self {
        let mut warnings = Vec::new();

        let length_secs = match value.track.length_secs {
            Some(length) if length.is_finite() && length > 0.0 => length,
            Some(length) => {
                warnings.push(format!(
                    "track.length_secs must be positive (got {length}); using {DEFAULT_TRACK_LENGTH_SECS}"
                ));
                DEFAULT_TRACK_LENGTH_SECS
            }
            None => DEFAULT_TRACK_LENGTH_SECS,
        };

        let track = Track {
            title: value
                .track
                .title
                .unwrap_or_else(|| DEFAULT_TRACK_TITLE.to_string()),
            artist: value
                .track
                .artist
                .unwrap_or_else(|| DEFAULT_TRACK_ARTIST.to_string()),
            length_secs,
            cover: value.track.cover.map(PathBuf::from),
        };

        let tick_interval = match value.playback.tick_interval_ms {
            Some(ms) if Duration::from_millis(ms) < MIN_TICK_INTERVAL => {
                warnings.push(format!(
                    "playback.tick_interval_ms below {}ms; clamped",
                    MIN_TICK_INTERVAL.as_millis()
                ));
                MIN_TICK_INTERVAL
            }
            Some(ms) => Duration::from_millis(ms),
            None => DEFAULT_TICK_INTERVAL,
        };

        let slider_animation = match value.playback.slider_animation_ms {
            Some(ms) if ms > MAX_SLIDER_ANIMATION_MS => {
                warnings.push(format!(
                    "playback.slider_animation_ms above {MAX_SLIDER_ANIMATION_MS}ms; clamped"
                ));
                Duration::from_millis(MAX_SLIDER_ANIMATION_MS)
            }
            Some(ms) => Duration::from_millis(ms),
            None => DEFAULT_SLIDER_ANIMATION,
        };

        let defaults = UiConfig::default();
        let ui = UiConfig {
            window_width: value
                .ui
                .window_width
                .unwrap_or(defaults.window_width)
                .clamp(240.0, 4096.0),
            window_height: value
                .ui
                .window_height
                .unwrap_or(defaults.window_height)
                .clamp(320.0, 4096.0),
            hot_reload: value.ui.hot_reload.unwrap_or(defaults.hot_reload),
            theme: value.ui.theme,
        };

        Config {
            track,
            playback: PlaybackConfig {
                tick_interval,
                slider_animation,
                animate_slider: value.playback.animate_slider.unwrap_or(true),
            },
            ui,
            warnings,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TrackSection {
    title: Option<String>,
    artist: Option<String>,
    length_secs: Option<f32>,
    cover: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PlaybackSection {
    tick_interval_ms: Option<u64>,
    slider_animation_ms: Option<u64>,
    animate_slider: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct UiSection {
    window_width: Option<f32>,
    window_height: Option<f32>,
    hot_reload: Option<bool>,
    #[serde(default)]
    theme: ThemeConfig,
}

/// Watches the config file's directory and re-reads the file when it changes.
pub struct ConfigWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
    changes_rx: Receiver<notify::Result<notify::Event>>,
}

impl ConfigWatcher {
    pub fn watch(path: &Path) -> anyhow::Result<Self> {
        let path = path.to_path_buf();
        // Editors often replace the file instead of writing in place, so watch
        // the directory and filter by file name.
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = tx.send(res);
        })
        .context("Failed to create config watcher")?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config directory: {}", dir.display()))?;

        Ok(Self {
            path,
            _watcher: watcher,
            changes_rx: rx,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drains pending events. Returns the reloaded config when the watched
    /// file was touched, `None` otherwise.
    pub fn poll(&self) -> Option<anyhow::Result<Config>> {
        let file_name = self.path.file_name();
        let mut touched = false;

        while let Ok(event) = self.changes_rx.try_recv() {
            match event {
                Ok(evt) => {
                    if evt
                        .paths
                        .iter()
                        .any(|p| p.file_name().is_some() && p.file_name() == file_name)
                    {
                        touched = true;
                    }
                }
                Err(err) => log::warn!("Config watcher error: {err}"),
            }
        }

        if !touched || !self.path.exists() {
            return None;
        }
        Some(Config::load_from_path(&self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.track, Track::default());
        assert_eq!(config.playback.tick_interval, Duration::from_millis(1000));
        assert_eq!(config.playback.slider_animation, Duration::from_millis(1000));
        assert!(config.playback.animate_slider);
        assert!(config.ui.hot_reload);
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r##"
            [track]
            title = "Gymnopédie No.1"
            length_secs = 185

            [ui.theme]
            background = "#000000"
            "##,
        )
        .unwrap();

        assert_eq!(config.track.title, "Gymnopédie No.1");
        assert_eq!(config.track.artist, DEFAULT_TRACK_ARTIST);
        assert_eq!(config.track.length_secs, 185.0);
        assert_eq!(config.ui.theme.background.as_deref(), Some("#000000"));
        assert_eq!(config.ui.theme.surface, None);
    }

    #[test]
    fn invalid_values_fall_back_with_warnings() {
        let config = Config::from_toml_str(
            r#"
            [track]
            length_secs = 0

            [playback]
            tick_interval_ms = 1
            slider_animation_ms = 60000
            "#,
        )
        .unwrap();

        assert_eq!(config.track.length_secs, DEFAULT_TRACK_LENGTH_SECS);
        assert_eq!(config.playback.tick_interval, MIN_TICK_INTERVAL);
        assert_eq!(
            config.playback.slider_animation,
            Duration::from_millis(MAX_SLIDER_ANIMATION_MS)
        );
        assert_eq!(config.warnings.len(), 3);
    }

    #[test]
    fn disabled_animation_reports_zero_duration() {
        let config = Config::from_toml_str("[playback]\nanimate_slider = false\n").unwrap();
        assert_eq!(config.playback.effective_slider_animation(), Duration::ZERO);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(Config::from_toml_str("[track\ntitle = ").is_err());
    }

    #[test]
    fn cover_is_resolved_against_the_config_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[track]\ncover = \"art/cover.png\"\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(
            config.track.cover,
            Some(dir.path().join("art").join("cover.png"))
        );
    }
}
