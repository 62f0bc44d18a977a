use eframe::egui;

mod app;
mod config;
mod events;
mod qr;
mod service;
mod state;
mod view;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    env_logger::init();

    let config = config::Config::load().unwrap_or_else(|e| {
        log::warn!("Using default config: {}", e);
        config::Config::default()
    });
    if let Err(e) = config.validate() {
        log::warn!("⚠ Config problem: {}", e);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Donation Desk",
        options,
        Box::new(move |cc| Ok(Box::new(app::App::new(cc, config)))),
    );

    drop(_guard);
    rt.shutdown_timeout(std::time::Duration::from_secs(2));

    result.map_err(|e| e.to_string().into())
}
