use eframe::egui;

mod app;
mod ui;

use app::OrreryApp;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Market Orrery"),
        ..Default::default()
    };

    eframe::run_native(
        "Market Orrery",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());

            let mut app = OrreryApp::default();
            log::info!("endpoint: {}", app.endpoint_input);
            app.reload(&cc.egui_ctx);

            Ok(Box::new(app))
        }),
    )
}
