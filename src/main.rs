use eframe::egui::ViewportBuilder;
use static_music_ui::PlayerApp;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug shows ticker and transport events
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("static_music_ui starting up");

    let app = PlayerApp::from_environment();
    let ui = &app.config().ui;
    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title(app.track().title.clone())
            .with_inner_size([ui.window_width, ui.window_height])
            .with_min_inner_size([240.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Static Music UI",
        native_options,
        Box::new(
            move |_cc| -> std::result::Result<
                Box<dyn eframe::App>,
                Box<dyn std::error::Error + Send + Sync>,
            > { Ok(Box::new(app)) },
        ),
    )?;

    log::info!("static_music_ui shut down");
    Ok(())
}
