use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};

use crate::{
    config::{Config, ConfigWatcher},
    cover::{CoverLoader, CoverMessage},
    playback::{PlaybackState, Track, TransportAction},
    theme::Theme,
    ticker::{TickOutcome, Ticker},
    tween::SliderTween,
    view::{self, TransportIcon},
};

const IDLE_REPAINT_INTERVAL: Duration = Duration::from_millis(500);
const CONTENT_MAX_WIDTH: f32 = 420.0;
const CONTENT_PADDING: f32 = 20.0;

pub struct PlayerApp {
    config: Config,
    config_path: Option<PathBuf>,
    config_watcher: Option<ConfigWatcher>,
    config_err: Option<String>,
    warnings: Vec<String>,
    theme: Theme,
    style_dirty: bool,
    track: Track,
    playback: PlaybackState,
    ticker: Ticker,
    slider_tween: SliderTween,
    cover_loader: CoverLoader,
    pending_cover: Option<ColorImage>,
    cover_texture: Option<TextureHandle>,
    cover_err: Option<String>,
}

impl PlayerApp {
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        let mut warnings = config.warnings.clone();
        let theme = Theme::from_config(&config.ui.theme, &mut warnings);
        for warn in &warnings {
            log::warn!("{warn}");
        }

        let track = config.track.clone();
        let playback = PlaybackState::for_track(&track);
        let ticker = Ticker::new(config.playback.tick_interval);
        let slider_tween = SliderTween::new(
            playback.position(),
            config.playback.effective_slider_animation(),
        );

        let config_watcher = match (&config_path, config.ui.hot_reload) {
            (Some(path), true) => match ConfigWatcher::watch(path) {
                Ok(watcher) => {
                    log::info!("Watching {} for changes", path.display());
                    Some(watcher)
                }
                Err(err) => {
                    log::warn!("Config hot reload disabled: {err:#}");
                    None
                }
            },
            _ => None,
        };

        let mut app = Self {
            config,
            config_path,
            config_watcher,
            config_err: None,
            warnings,
            theme,
            style_dirty: true,
            track,
            playback,
            ticker,
            slider_tween,
            cover_loader: CoverLoader::new(),
            pending_cover: None,
            cover_texture: None,
            cover_err: None,
        };
        app.request_cover();
        app
    }

    /// Builds the app from the first config file found, falling back to
    /// defaults when it cannot be read.
    pub fn from_environment() -> Self {
        match Config::load() {
            Ok((config, path)) => {
                match &path {
                    Some(path) => log::info!("Loaded config from {}", path.display()),
                    None => log::info!("No config file found; using defaults"),
                }
                Self::new(config, path)
            }
            Err(err) => {
                log::warn!("{err:#}");
                let mut app = Self::new(Config::default(), Config::locate());
                app.config_err = Some(format!("{err:#}"));
                app
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Animated slider value at `now`. Never feeds back into the position.
    pub fn displayed_position(&self, now: Instant) -> f32 {
        self.slider_tween.value_at(now)
    }

    pub fn on_seek(&mut self, value: f32, now: Instant) {
        self.dispatch(TransportAction::Seek(value), now);
    }

    pub fn on_toggle_play(&mut self, now: Instant) {
        self.dispatch(TransportAction::PlayPause, now);
    }

    pub fn on_previous(&mut self, now: Instant) {
        self.dispatch(TransportAction::Previous, now);
    }

    pub fn on_next(&mut self, now: Instant) {
        self.dispatch(TransportAction::Next, now);
    }

    fn dispatch(&mut self, action: TransportAction, now: Instant) {
        if self.playback.handle(action) {
            self.ticker.sync(&self.playback, now);
            self.slider_tween.retarget(self.playback.position(), now);
        }
    }

    /// Advances the simulated playback and the slider animation to `now`.
    pub fn step(&mut self, now: Instant) -> TickOutcome {
        let outcome = self.ticker.poll(&mut self.playback, now);
        if outcome == TickOutcome::Ended {
            self.playback.finish();
            log::info!("Reached the end of \"{}\"", self.track.title);
        }
        self.slider_tween.retarget(self.playback.position(), now);
        outcome
    }

    pub fn desired_repaint_interval(&self, now: Instant) -> Option<Duration> {
        if self.slider_tween.is_animating(now) {
            return None;
        }
        let idle = if self.config_watcher.is_some() || self.cover_loader.is_loading() {
            IDLE_REPAINT_INTERVAL
        } else {
            Duration::from_secs(5)
        };
        Some(match self.ticker.time_until_next(now) {
            Some(until_tick) => until_tick.min(idle),
            None => idle,
        })
    }

    pub fn apply_config(&mut self, config: Config, now: Instant) {
        let mut warnings = config.warnings.clone();
        let theme = Theme::from_config(&config.ui.theme, &mut warnings);
        for warn in &warnings {
            log::warn!("{warn}");
        }

        if theme != self.theme {
            self.theme = theme;
            self.style_dirty = true;
        }
        self.warnings = warnings;
        self.config_err = None;

        self.ticker.set_interval(config.playback.tick_interval);
        self.slider_tween
            .set_duration(config.playback.effective_slider_animation());

        let cover_changed = config.track.cover != self.track.cover;
        if (config.track.length_secs - self.track.length_secs).abs() > f32::EPSILON {
            self.playback.set_track_length(config.track.length_secs);
            if self.playback.is_at_end() && self.playback.is_playing() {
                self.ticker.cancel();
                self.playback.finish();
            }
            self.slider_tween.retarget(self.playback.position(), now);
        }
        self.track = config.track.clone();
        self.config = config;

        if cover_changed {
            self.request_cover();
        }
    }

    fn request_cover(&mut self) {
        self.pending_cover = None;
        self.cover_texture = None;
        self.cover_err = None;
        match self.track.cover.clone() {
            Some(path) => {
                log::info!("Loading cover from {}", path.display());
                self.cover_loader.request(path);
            }
            None => self.cover_loader.cancel(),
        }
    }

    fn poll_config_watcher(&mut self, now: Instant) {
        let Some(watcher) = self.config_watcher.as_ref() else {
            return;
        };
        match watcher.poll() {
            Some(Ok(config)) => {
                log::info!("Reloaded config from {}", watcher.path().display());
                self.apply_config(config, now);
            }
            Some(Err(err)) => {
                log::warn!("Keeping previous config: {err:#}");
                self.config_err = Some(format!("{err:#}"));
            }
            None => {}
        }
    }

    fn poll_cover(&mut self) {
        while let Some(CoverMessage { path, result, .. }) = self.cover_loader.try_recv() {
            match result {
                Ok(image) => {
                    log::info!(
                        "Cover loaded from {} ({}x{})",
                        path.display(),
                        image.size[0],
                        image.size[1]
                    );
                    self.pending_cover = Some(image);
                    self.cover_err = None;
                }
                Err(err) => {
                    log::warn!("{err}");
                    self.cover_err = Some(err);
                }
            }
        }
    }

    fn upload_pending_cover(&mut self, ctx: &egui::Context) {
        if let Some(image) = self.pending_cover.take() {
            self.cover_texture =
                Some(ctx.load_texture("player.cover", image, TextureOptions::LINEAR));
        }
    }

    /// One frame: drain background work, advance playback, draw, handle input.
    pub fn frame(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.poll_config_watcher(now);
        self.poll_cover();
        self.upload_pending_cover(ctx);
        if self.style_dirty {
            self.theme.apply_style(ctx);
            self.style_dirty = false;
        }

        self.step(now);

        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).fill(self.theme.background))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let width = ui
                        .available_width()
                        .min(CONTENT_MAX_WIDTH + 2.0 * CONTENT_PADDING);
                    let margin = ((ui.available_width() - width) / 2.0).max(0.0);
                    ui.horizontal(|row| {
                        row.add_space(margin + CONTENT_PADDING);
                        row.vertical(|col| {
                            col.set_width((width - 2.0 * CONTENT_PADDING).max(1.0));
                            self.render_player(col, now);
                        });
                    });
                });
            });

        match self.desired_repaint_interval(Instant::now()) {
            None => ctx.request_repaint(),
            Some(after) => ctx.request_repaint_after(after),
        }
    }

    fn render_player(&mut self, ui: &mut egui::Ui, now: Instant) {
        ui.spacing_mut().item_spacing.y = 12.0;

        ui.vertical_centered(|centered| {
            view::paint_cover(centered, &self.theme, self.cover_texture.as_ref());
        });
        view::track_info(ui, &self.theme, &self.track.title, &self.track.artist);

        let displayed = self.displayed_position(now);
        if let Some(target) =
            view::seek_slider(ui, &self.theme, displayed, self.playback.track_length())
        {
            self.on_seek(target, now);
        }
        view::time_labels(
            ui,
            &self.theme,
            self.playback.position(),
            self.playback.track_length(),
        );

        self.render_transport_row(ui, now);

        let mut errors = Vec::new();
        if let Some(err) = &self.config_err {
            errors.push(err.as_str());
        }
        if let Some(err) = &self.cover_err {
            errors.push(err.as_str());
        }
        view::diagnostics(ui, &errors, &self.warnings);
    }

    fn render_transport_row(&mut self, ui: &mut egui::Ui, now: Instant) {
        let buttons_width = 2.0 * view::SMALL_BUTTON_DIAMETER + view::PLAY_BUTTON_DIAMETER;
        let gap = ((ui.available_width() - buttons_width) / 4.0).max(8.0);

        ui.horizontal(|row| {
            row.spacing_mut().item_spacing.x = 0.0;
            row.set_min_height(view::PLAY_BUTTON_DIAMETER);

            row.add_space(gap);
            if view::transport_button(
                row,
                &self.theme,
                TransportIcon::Previous,
                view::SMALL_BUTTON_DIAMETER,
                view::SMALL_ICON_SIZE,
            ) {
                self.on_previous(now);
            }
            row.add_space(gap);
            if view::transport_button(
                row,
                &self.theme,
                TransportIcon::play_pause(self.playback.is_playing()),
                view::PLAY_BUTTON_DIAMETER,
                view::PLAY_ICON_SIZE,
            ) {
                self.on_toggle_play(now);
            }
            row.add_space(gap);
            if view::transport_button(
                row,
                &self.theme,
                TransportIcon::Next,
                view::SMALL_BUTTON_DIAMETER,
                view::SMALL_ICON_SIZE,
            ) {
                self.on_next(now);
            }
        });
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.frame(ctx);
    }
}

impl Drop for PlayerApp {
    fn drop(&mut self) {
        self.ticker.cancel();
        self.cover_loader.cancel();
        self.config_watcher = None;
        log::debug!("player view torn down");
    }
}
