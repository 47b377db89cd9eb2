use anyhow::{anyhow, Result};
use eframe::egui::{self, Color32, CornerRadius, Stroke, Vec2};

use crate::config::ThemeConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color32,
    pub surface: Color32,
    pub primary: Color32,
    pub text: Color32,
    pub secondary_text: Color32,
    pub button: Color32,
    pub button_icon: Color32,
    pub title_size: f32,
    pub artist_size: f32,
    pub body_size: f32,
    pub cover_radius: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(0x1A, 0x1A, 0x1A),
            surface: Color32::from_rgb(0x28, 0x14, 0x14),
            primary: Color32::from_rgb(0x44, 0x44, 0x44),
            text: Color32::from_rgb(0xD3, 0xD3, 0xD3),
            secondary_text: Color32::from_rgb(0x80, 0x80, 0x80),
            button: Color32::WHITE,
            button_icon: Color32::BLACK,
            title_size: 20.0,
            artist_size: 15.0,
            body_size: 14.0,
            cover_radius: 10.0,
        }
    }
}

impl Theme {
    /// Resolves configured colors over the default palette. Unparseable
    /// entries keep their default and add a warning.
    pub fn from_config(config: &ThemeConfig, warnings: &mut Vec<String>) -> Self {
        let mut theme = Theme::default();
        let fields: [(&str, &Option<String>, &mut Color32); 7] = [
            ("background", &config.background, &mut theme.background),
            ("surface", &config.surface, &mut theme.surface),
            ("primary", &config.primary, &mut theme.primary),
            ("text", &config.text, &mut theme.text),
            ("secondary_text", &config.secondary_text, &mut theme.secondary_text),
            ("button", &config.button, &mut theme.button),
            ("button_icon", &config.button_icon, &mut theme.button_icon),
        ];

        for (name, value, slot) in fields {
            let Some(value) = value else { continue };
            match parse_color(value) {
                Ok(color) => *slot = color,
                Err(err) => warnings.push(format!("ui.theme.{name}: {err}; using default")),
            }
        }

        theme
    }

    pub fn slider_fill(&self) -> Color32 {
        self.text
    }

    pub fn slider_track(&self) -> Color32 {
        self.primary
    }

    pub fn apply_style(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        let visuals = &mut style.visuals;

        visuals.dark_mode = true;
        visuals.panel_fill = self.background;
        visuals.window_fill = self.surface;
        visuals.extreme_bg_color = self.surface;
        visuals.override_text_color = Some(self.text);

        let corner_radius = CornerRadius::same(6);
        for widget in [
            &mut visuals.widgets.inactive,
            &mut visuals.widgets.hovered,
            &mut visuals.widgets.active,
        ] {
            widget.bg_fill = self.primary;
            widget.weak_bg_fill = self.primary;
            widget.corner_radius = corner_radius;
        }
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.5, self.text);
        visuals.widgets.active.fg_stroke = Stroke::new(2.0, self.text);
        visuals.selection.bg_fill = self.primary;
        visuals.selection.stroke = Stroke::new(1.0, self.text);

        style.spacing.item_spacing = Vec2::new(8.0, 6.0);

        ctx.set_style(style);
    }
}

pub fn parse_color(value: &str) -> Result<Color32> {
    let v = value.trim();
    if v.eq_ignore_ascii_case("transparent") {
        return Ok(Color32::TRANSPARENT);
    }
    if let Some(hex) = v.strip_prefix('#') {
        return parse_hex_color(hex);
    }
    if let Some(rest) = v.strip_prefix("rgba(") {
        let (r, g, b, a) = parse_rgba_components(rest.trim_end_matches(')'))?;
        return Ok(Color32::from_rgba_unmultiplied(r, g, b, a));
    }
    if let Some(rest) = v.strip_prefix("rgb(") {
        let (r, g, b) = parse_rgb_components(rest.trim_end_matches(')'))?;
        return Ok(Color32::from_rgb(r, g, b));
    }
    Err(anyhow!("Unsupported color format: {v}"))
}

fn parse_hex_color(hex: &str) -> Result<Color32> {
    let value = hex.trim();
    if !matches!(value.len(), 6 | 8) {
        return Err(anyhow!("Invalid hex color: #{value}"));
    }
    let bits =
        u32::from_str_radix(value, 16).map_err(|_| anyhow!("Invalid hex color: #{value}"))?;

    Ok(if value.len() == 6 {
        Color32::from_rgb((bits >> 16) as u8, (bits >> 8) as u8, bits as u8)
    } else {
        Color32::from_rgba_unmultiplied(
            (bits >> 24) as u8,
            (bits >> 16) as u8,
            (bits >> 8) as u8,
            bits as u8,
        )
    })
}

fn parse_rgba_components(input: &str) -> Result<(u8, u8, u8, u8)> {
    let parts: Vec<_> = input.split(',').map(|p| p.trim()).collect();
    if parts.len() != 4 {
        return Err(anyhow!("rgba expects 4 components"));
    }
    let (r, g, b) = parse_rgb_components(&parts[0..3].join(","))?;
    let a = parse_alpha(parts[3])?;
    Ok((r, g, b, a))
}

fn parse_rgb_components(input: &str) -> Result<(u8, u8, u8)> {
    let parts: Vec<_> = input.split(',').map(|p| p.trim()).collect();
    if parts.len() != 3 {
        return Err(anyhow!("rgb expects 3 components"));
    }
    Ok((
        parse_channel(parts[0])?,
        parse_channel(parts[1])?,
        parse_channel(parts[2])?,
    ))
}

fn parse_channel(src: &str) -> Result<u8> {
    let value: f32 = src
        .parse()
        .map_err(|_| anyhow!("Invalid color channel: {src}"))?;
    if !(0.0..=255.0).contains(&value) {
        return Err(anyhow!("Color channel out of range: {src}"));
    }
    Ok(value.round() as u8)
}

// "0.5" is a fraction, "128" is a channel value.
fn parse_alpha(src: &str) -> Result<u8> {
    if src.contains('.') {
        let value: f32 = src.parse().map_err(|_| anyhow!("Invalid alpha: {src}"))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(anyhow!("Alpha out of range: {src}"));
        }
        Ok((value * 255.0).round() as u8)
    } else {
        parse_channel(src)
    }
}
