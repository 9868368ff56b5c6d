//! Content-area rendering for `OrreryApp`.
//!
//! Contains three methods:
//!
//! - `draw_content`     : top-level dispatcher (indicator, empty states, scene)
//! - `draw_scene`       : orbit-camera viewport with pointer selection
//! - `draw_stats_panel` : left-side statistics panel

use eframe::egui;
use glam::Vec3;

use market_orrery::config::{Palette, INTENSITY_MAX, INTENSITY_MIN};
use market_orrery::render::camera::{ndc_to_screen, screen_to_ndc, OrbitCamera};
use market_orrery::render::info::SelectionDetails;
use market_orrery::render::pick::DisplayUpdate;
use market_orrery::render::scene::{ComposedScene, PrimitiveRole, ScenePrimitive, Shape};

use crate::ui::{color32, color32_alpha, convex_hull, truncate_str};
use super::OrreryApp;

/// Drag pixels → queued orbit velocity (radians/frame); damping spreads it out.
const ROTATE_SPEED: f32 = 0.0004;
const ZOOM_SPEED: f32 = 0.001;
const CONE_SEGMENTS: usize = 16;

impl OrreryApp {
    // ── Main content dispatcher ──────────────────────────────────────────────

    /// Render the central content panel.
    pub fn draw_content(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        if self.indicator_visible() {
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() * 0.4);
                    if let Some(ref error) = self.error {
                        ui.colored_label(egui::Color32::RED, error);
                    } else {
                        ui.spinner();
                        ui.label("Loading market data…");
                    }
                });
            });
            return;
        }

        let empty = match &self.result {
            None => true,
            Some(result) => result.scene.is_empty(),
        };
        if empty {
            ui.centered_and_justified(|ui| {
                ui.colored_label(egui::Color32::GRAY, "No groups to visualize");
            });
            return;
        }

        self.draw_scene(ui, ctx);
    }

    // ── 3-D viewport ─────────────────────────────────────────────────────────

    pub fn draw_scene(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let response = ui.allocate_response(
            ui.available_size(),
            egui::Sense::click_and_drag().union(egui::Sense::hover()),
        );
        let rect = response.rect;

        // Drag to orbit, scroll to dolly
        if response.dragged() {
            let delta = response.drag_delta();
            self.camera.orbit(-delta.x * ROTATE_SPEED, delta.y * ROTATE_SPEED);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                self.camera.dolly((1.0 - scroll * ZOOM_SPEED).clamp(0.5, 1.5));
            }
        }
        self.camera.update();

        let Some(result) = &self.result else {
            return;
        };
        let scene = &result.scene;
        let aspect = rect.width() / rect.height().max(1.0);

        // Pointer selection
        let update = match response.hover_pos() {
            Some(pos) => {
                let (nx, ny) =
                    screen_to_ndc(pos.x, pos.y, rect.left(), rect.top(), rect.width(), rect.height());
                let ray = self.camera.ray_through(nx, ny, aspect);
                self.resolver.resolve(&ray, scene)
            }
            None => self.resolver.clear(),
        };
        apply_display_update(&mut self.details, update);

        let painter = ui.painter_at(rect);
        paint_scene(&painter, rect, &self.camera, scene, self.resolver.selected());

        // Group labels
        for group in &scene.groups {
            let label_at = group.anchor + Vec3::new(0.0, 40.0, 0.0);
            if let Some(pos) = project_to_screen(&self.camera, rect, label_at) {
                painter.text(
                    pos.0,
                    egui::Align2::CENTER_BOTTOM,
                    truncate_str(&group.name, 24),
                    egui::FontId::proportional(13.0),
                    egui::Color32::from_rgba_unmultiplied(200, 200, 210, 200),
                );
            }
        }

        painter.text(
            rect.left_bottom() + egui::vec2(8.0, -8.0),
            egui::Align2::LEFT_BOTTOM,
            format!(
                "Drag: rotate | Scroll: zoom | Hover: inspect | d={:.0}",
                self.camera.distance
            ),
            egui::FontId::proportional(12.0),
            egui::Color32::from_rgba_unmultiplied(255, 255, 255, 160),
        );

        // Continuous animation loop for damping
        ctx.request_repaint();
    }

    // ── Stats side panel ─────────────────────────────────────────────────────

    /// Render the statistics panel.
    pub fn draw_stats_panel(&self, ui: &mut egui::Ui) {
        ui.heading("Market Data");
        ui.separator();

        if let Some(ref result) = self.result {
            let stats = &result.stats;
            ui.label(format!("Assets received: {}", stats.instruments_received));
            ui.label(format!("Placed: {}", stats.instruments_placed));
            ui.label(format!("Groups: {}", stats.groups));
            ui.colored_label(
                egui::Color32::from_rgb(0, 180, 0),
                format!(
                    "Snapshots: {}/{}",
                    stats.snapshots_loaded, stats.snapshots_requested
                ),
            );
            if let Some(ms) = self.last_load_ms {
                ui.label(format!("Load time: {:.0} ms", ms));
            }

            ui.separator();
            ui.heading("Scene");
            let scene = &result.scene;
            ui.label(format!("Primitives: {}", scene.primitives.len()));
            ui.label(format!("Markers: {}", scene.marker_count()));
            ui.label(format!("Style: {}", self.style.label()));
            if !scene.real_grouping {
                ui.colored_label(egui::Color32::from_rgb(255, 160, 0), "No exchange grouping");
            }

            ui.separator();
            egui::ScrollArea::vertical().show(ui, |ui| {
                for group in &scene.groups {
                    ui.label(format!(
                        "{}: {} ({} links)",
                        truncate_str(&group.name, 16),
                        group.members,
                        group.connectors
                    ));
                }
            });
        } else {
            ui.weak("Nothing loaded");
        }

        ui.separator();
        ui.label(format!("Cam dist: {:.1}", self.camera.distance));
        ui.label(format!("Endpoint: {}", truncate_str(&self.endpoint_input, 28)));
    }
}

fn apply_display_update(details: &mut Option<SelectionDetails>, update: DisplayUpdate) {
    match update {
        DisplayUpdate::Show(d) => *details = Some(d),
        DisplayUpdate::Hide => *details = None,
        DisplayUpdate::Unchanged => {}
    }
}

/// World point → (screen position, depth).
fn project_to_screen(camera: &OrbitCamera, rect: egui::Rect, p: Vec3) -> Option<(egui::Pos2, f32)> {
    let aspect = rect.width() / rect.height().max(1.0);
    let (nx, ny, z) = camera.project(p, aspect)?;
    let (sx, sy) = ndc_to_screen(nx, ny, rect.left(), rect.top(), rect.width(), rect.height());
    Some((egui::pos2(sx, sy), z))
}

/// World length at depth `z` → pixels.
fn world_to_pixels(camera: &OrbitCamera, rect: egui::Rect, len: f32, z: f32) -> f32 {
    len * camera.projected_scale(z) * rect.height() * 0.5
}

/// Indicator alpha from its intensity.
fn indicator_alpha(intensity: f32) -> f32 {
    let t = ((intensity - INTENSITY_MIN) / (INTENSITY_MAX - INTENSITY_MIN)).clamp(0.0, 1.0);
    0.12 + 0.38 * t
}

/// Painter's algorithm: far primitives first.
fn paint_scene(
    painter: &egui::Painter,
    rect: egui::Rect,
    camera: &OrbitCamera,
    scene: &ComposedScene,
    selected: Option<&str>,
) {
    let aspect = rect.width() / rect.height().max(1.0);
    let mut order: Vec<(f32, &ScenePrimitive)> = scene
        .primitives
        .iter()
        .filter_map(|p| camera.project(p.shape.center(), aspect).map(|(_, _, z)| (z, p)))
        .collect();
    order.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (_, prim) in order {
        match (&prim.role, prim.shape) {
            (PrimitiveRole::InstrumentMarker { symbol }, Shape::Sphere { center, radius }) => {
                let Some((pos, z)) = project_to_screen(camera, rect, center) else {
                    continue;
                };
                let r = world_to_pixels(camera, rect, radius, z).max(1.5);
                painter.circle_filled(pos, r, color32(prim.color));
                if selected == Some(symbol.as_str()) {
                    painter.circle_stroke(pos, r + 3.0, egui::Stroke::new(1.5, egui::Color32::WHITE));
                }
            }
            (PrimitiveRole::Connector, Shape::Segment { start, end, .. }) => {
                if let (Some((a, _)), Some((b, _))) = (
                    project_to_screen(camera, rect, start),
                    project_to_screen(camera, rect, end),
                ) {
                    painter.line_segment([a, b], egui::Stroke::new(1.0, color32(Palette::CONNECTOR)));
                }
            }
            (PrimitiveRole::Indicator, Shape::Segment { start, end, radius }) => {
                if let (Some((a, za)), Some((b, zb))) = (
                    project_to_screen(camera, rect, start),
                    project_to_screen(camera, rect, end),
                ) {
                    let width = world_to_pixels(camera, rect, radius * 2.0, (za + zb) * 0.5).max(1.0);
                    let color = color32_alpha(prim.color, indicator_alpha(prim.intensity));
                    painter.line_segment([a, b], egui::Stroke::new(width, color));
                }
            }
            (PrimitiveRole::Indicator, Shape::Cone { apex, axis_end, base_radius }) => {
                let axis = (axis_end - apex).normalize_or_zero();
                if axis == Vec3::ZERO {
                    continue;
                }
                let u = axis.any_orthonormal_vector();
                let v = axis.cross(u);
                let mut outline = Vec::with_capacity(CONE_SEGMENTS + 1);
                let mut visible = true;
                for world in std::iter::once(apex).chain((0..CONE_SEGMENTS).map(|i| {
                    let theta = i as f32 / CONE_SEGMENTS as f32 * std::f32::consts::TAU;
                    axis_end + (u * theta.cos() + v * theta.sin()) * base_radius
                })) {
                    match project_to_screen(camera, rect, world) {
                        Some((p, _)) => outline.push(p),
                        None => {
                            visible = false;
                            break;
                        }
                    }
                }
                if !visible {
                    continue;
                }
                let hull = convex_hull(&outline);
                if hull.len() >= 3 {
                    let color = color32_alpha(prim.color, indicator_alpha(prim.intensity));
                    painter.add(egui::Shape::convex_polygon(hull, color, egui::Stroke::NONE));
                }
            }
            // Shapes never combined with these roles by the composer
            _ => {}
        }
    }
}
