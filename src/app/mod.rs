//! `OrreryApp`: the top-level egui application state.
//!
//! This module declares the `OrreryApp` struct, its `Default` impl and the
//! `eframe::App` frame loop. All other methods are split across the sibling
//! sub-modules:
//!
//! - `navigation`: background scene loading and style recomposition
//! - `toolbar`   : endpoint field and controls
//! - `content`   : 3-D viewport, pointer selection, info and stats panels

pub mod navigation;
pub mod toolbar;
pub mod content;

use std::sync::mpsc;
use eframe::egui;

use market_orrery::config::endpoint_from_env;
use market_orrery::engine::SceneResult;
use market_orrery::error::LoadError;
use market_orrery::render::camera::OrbitCamera;
use market_orrery::render::info::SelectionDetails;
use market_orrery::render::pick::PointerResolver;
use market_orrery::render::IndicatorStyle;

// ─── Application state ───────────────────────────────────────────────────────

pub struct OrreryApp {
    pub endpoint_input: String,
    pub result: Option<SceneResult>,
    pub error: Option<String>,
    pub loading: bool,
    pub fetch_rx: Option<mpsc::Receiver<Result<SceneResult, LoadError>>>,
    pub style: IndicatorStyle,
    pub show_stats: bool,
    // 3-D camera state
    pub camera: OrbitCamera,
    // Selection
    pub resolver: PointerResolver,
    /// Info panel contents; `None` hides the panel
    pub details: Option<SelectionDetails>,
    pub load_started: Option<std::time::Instant>,
    pub last_load_ms: Option<f64>,
}

impl Default for OrreryApp {
    fn default() -> Self {
        Self {
            endpoint_input: endpoint_from_env(),
            result: None,
            error: None,
            loading: false,
            fetch_rx: None,
            style: IndicatorStyle::default(),
            show_stats: false,
            camera: OrbitCamera::default(),
            resolver: PointerResolver::new(),
            details: None,
            load_started: None,
            last_load_ms: None,
        }
    }
}

impl eframe::App for OrreryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_fetch();

        // Top toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui, ctx);
        });

        // Selection info panel, only while something is selected
        if let Some(details) = &self.details {
            egui::SidePanel::right("info")
                .default_width(240.0)
                .resizable(false)
                .show(ctx, |ui| {
                    crate::ui::draw_info_panel(ui, details);
                });
        }

        if self.show_stats {
            egui::SidePanel::left("stats")
                .default_width(200.0)
                .show(ctx, |ui| {
                    self.draw_stats_panel(ui);
                });
        }

        // Main viewport
        let ctx_clone = ctx.clone();
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(crate::ui::color32(
                market_orrery::config::Palette::BACKGROUND,
            )))
            .show(ctx, |ui| {
                self.draw_content(ui, &ctx_clone);
            });
    }
}
