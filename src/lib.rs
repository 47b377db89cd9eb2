pub mod app;
pub mod config;
pub mod cover;
pub mod playback;
pub mod theme;
pub mod ticker;
pub mod tween;
pub mod view;

pub use app::PlayerApp;
