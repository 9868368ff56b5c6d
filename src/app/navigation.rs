//! Loading methods for `OrreryApp`.
//!
//! Covers the asynchronous load lifecycle (`reload`, `check_fetch`) and
//! rebuilding the scene when the indicator style changes (`set_style`).

use std::sync::mpsc;
use eframe::egui;

use market_orrery::config::LayoutConfig;
use market_orrery::engine::MarketEngine;
use market_orrery::net::HttpAssetSource;
use market_orrery::render::IndicatorStyle;

use super::OrreryApp;

impl OrreryApp {
    /// Start loading the scene from the current endpoint on a background thread.
    pub fn reload(&mut self, ctx: &egui::Context) {
        if self.fetch_rx.is_some() {
            return;
        }
        self.begin_load();

        let (tx, rx) = mpsc::channel();
        self.fetch_rx = Some(rx);

        let endpoint = self.endpoint_input.clone();
        let cfg = LayoutConfig::default().with_style(self.style);
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            let engine = MarketEngine::new(cfg);
            let result = HttpAssetSource::new(&endpoint).and_then(|source| engine.load(&source));
            if let Err(ref e) = result {
                log::error!("[{}] load failed: {}", e.phase(), e);
            }
            let _ = tx.send(result);
            ctx.request_repaint();
        });
    }

    /// Reset per-load state: the old selection is stale once a load starts.
    fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
        self.load_started = Some(std::time::Instant::now());
        self.resolver.clear();
        self.details = None;
    }

    /// Poll the load channel and update app state when a result arrives.
    pub fn check_fetch(&mut self) {
        let Some(rx) = &self.fetch_rx else {
            return;
        };
        let Ok(result) = rx.try_recv() else {
            return;
        };

        self.last_load_ms = self
            .load_started
            .take()
            .map(|t| t.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(result) => {
                // A fresh scene invalidates any selection
                self.resolver.clear();
                self.details = None;
                self.camera = Default::default();
                self.camera.frame_radius(result.scene.bounding_radius());
                self.result = Some(result);
                self.error = None;
            }
            Err(e) => {
                // The indicator stays up and shows the error instead
                self.error = Some(e.to_string());
                self.result = None;
                self.resolver.clear();
                self.details = None;
            }
        }
        self.loading = false;
        self.fetch_rx = None;
    }

    /// Switch indicator style, recomposing the current scene in place.
    pub fn set_style(&mut self, style: IndicatorStyle) {
        if self.style == style {
            return;
        }
        self.style = style;
        if let Some(previous) = self.result.take() {
            let engine = MarketEngine::new(LayoutConfig::default().with_style(style));
            self.result = Some(engine.recompose(previous));
        }
    }

    /// True while the loading indicator should be visible (pending or failed).
    pub fn indicator_visible(&self) -> bool {
        self.loading || self.error.is_some()
    }
}
