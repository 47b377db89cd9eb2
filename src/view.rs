//! Stateless drawing helpers for the player screen. Each function renders
//! from the values it is given and reports user intent back to the caller.

use eframe::egui::{
    self, Align2, Color32, CornerRadius, Pos2, Rect, RichText, Sense, Shape, Stroke,
    TextureHandle, Vec2,
};

use crate::{playback::format_timestamp, theme::Theme};

pub const COVER_MAX_SIDE: f32 = 400.0;
pub const SMALL_BUTTON_DIAMETER: f32 = 60.0;
pub const SMALL_ICON_SIZE: f32 = 25.0;
pub const PLAY_BUTTON_DIAMETER: f32 = 100.0;
pub const PLAY_ICON_SIZE: f32 = 75.0;

const SLIDER_TRACK_THICKNESS: f32 = 4.0;
const SLIDER_THUMB_RADIUS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportIcon {
    Previous,
    Play,
    Pause,
    Next,
}

impl TransportIcon {
    pub fn play_pause(playing: bool) -> Self {
        if playing {
            TransportIcon::Pause
        } else {
            TransportIcon::Play
        }
    }

    fn hint(self) -> &'static str {
        match self {
            TransportIcon::Previous => "Previous track",
            TransportIcon::Play => "Play",
            TransportIcon::Pause => "Pause",
            TransportIcon::Next => "Next track",
        }
    }
}

fn to_corner_radius(value: f32) -> CornerRadius {
    CornerRadius::same(value.clamp(0.0, u8::MAX as f32).round() as u8)
}

pub fn cover_side(available_width: f32) -> f32 {
    available_width.clamp(96.0, COVER_MAX_SIDE)
}

pub fn paint_cover(ui: &mut egui::Ui, theme: &Theme, texture: Option<&TextureHandle>) {
    let side = cover_side(ui.available_width());
    let size = Vec2::splat(side);
    let rounding = to_corner_radius(theme.cover_radius);
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());

    match texture {
        Some(texture) => {
            let tex_size = texture.size_vec2();
            let fitted = if tex_size.x > 0.0 && tex_size.y > 0.0 {
                let scale = (side / tex_size.x).min(side / tex_size.y);
                tex_size * scale
            } else {
                size
            };
            let image_rect = Rect::from_center_size(rect.center(), fitted);
            ui.put(
                image_rect,
                egui::Image::new((texture.id(), fitted))
                    .fit_to_exact_size(fitted)
                    .corner_radius(rounding),
            )
            .on_hover_text("Album cover");
        }
        None => {
            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, rounding, theme.surface);
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No artwork",
                egui::TextStyle::Body.resolve(ui.style()),
                theme.secondary_text,
            );
        }
    }
}

pub fn track_info(ui: &mut egui::Ui, theme: &Theme, title: &str, artist: &str) {
    ui.with_layout(egui::Layout::top_down(egui::Align::Min), |col| {
        col.spacing_mut().item_spacing.y = 2.0;
        col.label(RichText::new(title).color(theme.text).size(theme.title_size));
        col.label(
            RichText::new(artist)
                .color(theme.secondary_text)
                .size(theme.artist_size),
        );
    });
}

/// Draws the progress slider at `displayed` (the animated value) and returns
/// the position the user picked, if any.
pub fn seek_slider(ui: &mut egui::Ui, theme: &Theme, displayed: f32, max: f32) -> Option<f32> {
    let span = max.max(f32::MIN_POSITIVE);
    let fraction = (displayed / span).clamp(0.0, 1.0);

    let desired_height = SLIDER_THUMB_RADIUS * 2.0 + 8.0;
    let width = ui.available_width();
    let (rect, response) =
        ui.allocate_exact_size(Vec2::new(width, desired_height), Sense::click_and_drag());

    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }

    let thumb_guard = SLIDER_THUMB_RADIUS.min(rect.width() / 2.0);
    let track_min_x = rect.min.x + thumb_guard;
    let track_max_x = rect.max.x - thumb_guard;
    let track_width = (track_max_x - track_min_x).max(1.0);

    let mut picked = None;
    if max > 0.0 && (response.dragged() || response.drag_started() || response.clicked()) {
        if let Some(pos) = ui.input(|input| input.pointer.interact_pos()) {
            let t = ((pos.x - track_min_x) / track_width).clamp(0.0, 1.0);
            picked = Some(max * t);
        }
    }

    let painter = ui.painter_at(rect);
    let track_rect = Rect::from_min_max(
        Pos2::new(track_min_x, rect.center().y - SLIDER_TRACK_THICKNESS / 2.0),
        Pos2::new(track_max_x, rect.center().y + SLIDER_TRACK_THICKNESS / 2.0),
    );
    let rounding = to_corner_radius(SLIDER_TRACK_THICKNESS / 2.0);
    painter.rect_filled(track_rect, rounding, theme.slider_track());

    if fraction > 0.0 {
        let fill_rect = Rect::from_min_max(
            track_rect.min,
            Pos2::new(track_rect.min.x + track_width * fraction, track_rect.max.y),
        );
        painter.rect_filled(fill_rect, rounding, theme.slider_fill());
    }

    let thumb_center = Pos2::new(track_min_x + track_width * fraction, track_rect.center().y);
    painter.circle_filled(thumb_center, SLIDER_THUMB_RADIUS, theme.slider_fill());

    picked
}

pub fn time_labels(ui: &mut egui::Ui, theme: &Theme, position: f32, length: f32) {
    let elapsed = format_timestamp(position);
    let total = format_timestamp(length);
    ui.columns(2, |columns| {
        columns[0].with_layout(egui::Layout::left_to_right(egui::Align::Center), |col| {
            col.label(RichText::new(elapsed).color(theme.text).size(theme.body_size));
        });
        columns[1].with_layout(egui::Layout::right_to_left(egui::Align::Center), |col| {
            col.label(RichText::new(total).color(theme.text).size(theme.body_size));
        });
    });
}

/// Round white button with a painted glyph. Returns `true` when clicked.
pub fn transport_button(
    ui: &mut egui::Ui,
    theme: &Theme,
    icon: TransportIcon,
    diameter: f32,
    icon_size: f32,
) -> bool {
    let (rect, response) = ui.allocate_exact_size(Vec2::splat(diameter), Sense::click());
    let painter = ui.painter_at(rect);

    let fill = if response.is_pointer_button_down_on() {
        theme.button.gamma_multiply(0.8)
    } else if response.hovered() {
        theme.button.gamma_multiply(0.92)
    } else {
        theme.button
    };
    painter.circle_filled(rect.center(), diameter / 2.0, fill);
    paint_transport_icon(&painter, rect.center(), icon_size, icon, theme.button_icon);

    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }
    response.on_hover_text(icon.hint()).clicked()
}

pub fn paint_transport_icon(
    painter: &egui::Painter,
    center: Pos2,
    size: f32,
    icon: TransportIcon,
    color: Color32,
) {
    let h = size / 2.0;
    match icon {
        TransportIcon::Play => {
            painter.add(triangle_right(center + Vec2::new(h * 0.1, 0.0), h * 0.8, color));
        }
        TransportIcon::Pause => {
            let bar = Vec2::new(size * 0.22, size * 0.8);
            for dx in [-size * 0.2, size * 0.2] {
                let bar_rect = Rect::from_center_size(center + Vec2::new(dx, 0.0), bar);
                painter.rect_filled(bar_rect, CornerRadius::same(1), color);
            }
        }
        TransportIcon::Next | TransportIcon::Previous => {
            let dir = if icon == TransportIcon::Next { 1.0 } else { -1.0 };
            let tri_center = center + Vec2::new(-dir * h * 0.15, 0.0);
            let tri = if dir > 0.0 {
                triangle_right(tri_center, h * 0.7, color)
            } else {
                triangle_left(tri_center, h * 0.7, color)
            };
            painter.add(tri);
            let bar_rect = Rect::from_center_size(
                center + Vec2::new(dir * h * 0.7, 0.0),
                Vec2::new(size * 0.12, size * 0.7),
            );
            painter.rect_filled(bar_rect, CornerRadius::ZERO, color);
        }
    }
}

fn triangle_right(center: Pos2, half: f32, color: Color32) -> Shape {
    Shape::convex_polygon(
        vec![
            center + Vec2::new(-half * 0.8, -half),
            center + Vec2::new(half, 0.0),
            center + Vec2::new(-half * 0.8, half),
        ],
        color,
        Stroke::NONE,
    )
}

fn triangle_left(center: Pos2, half: f32, color: Color32) -> Shape {
    Shape::convex_polygon(
        vec![
            center + Vec2::new(half * 0.8, -half),
            center + Vec2::new(half * 0.8, half),
            center + Vec2::new(-half, 0.0),
        ],
        color,
        Stroke::NONE,
    )
}

pub fn diagnostics(ui: &mut egui::Ui, errors: &[&str], warnings: &[String]) {
    for err in errors {
        ui.colored_label(Color32::from_rgb(220, 80, 80), format!("Error: {err}"));
    }
    for warn in warnings {
        ui.colored_label(Color32::from_rgb(240, 200, 80), format!("Warning: {warn}"));
    }
}
