//! Toolbar rendering for `OrreryApp`.
//!
//! Draws the endpoint field, reload button, indicator-style selector and
//! stats toggle.

use eframe::egui;
use market_orrery::render::IndicatorStyle;

use super::OrreryApp;

impl OrreryApp {
    /// Render the top toolbar strip.
    pub fn draw_toolbar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            ui.add_space(4.0);

            // Endpoint field
            let response = ui.add_sized(
                [ui.available_width() - 280.0, 24.0],
                egui::TextEdit::singleline(&mut self.endpoint_input)
                    .hint_text("Market data endpoint...")
                    .font(egui::TextStyle::Monospace),
            );

            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.reload(ctx);
            }

            if ui
                .add_enabled(!self.loading, egui::Button::new("Reload"))
                .clicked()
            {
                self.reload(ctx);
            }

            // Indicator style selector
            let mut style = self.style;
            egui::ComboBox::from_id_salt("indicator_style")
                .selected_text(style.label())
                .show_ui(ui, |ui| {
                    for option in [IndicatorStyle::Spotlight, IndicatorStyle::FlowBeam] {
                        ui.selectable_value(&mut style, option, option.label());
                    }
                });
            self.set_style(style);

            ui.toggle_value(&mut self.show_stats, "Stats");
        });
    }
}
