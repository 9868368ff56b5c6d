//! Generic egui helpers shared by the viewport and side panels.
//!
//! Stateless functions: colour conversion, screen-space hull for cone
//! silhouettes, and the info panel widget.

use eframe::egui;
use market_orrery::render::info::SelectionDetails;

// ─── Colour ───────────────────────────────────────────────────────────────────

/// Convert a `[r, g, b, a]` colour in 0.0–1.0 to egui's sRGBA.
pub fn color32(c: [f32; 4]) -> egui::Color32 {
    color32_alpha(c, c[3])
}

/// Same as [`color32`] with an explicit alpha.
pub fn color32_alpha(c: [f32; 4], alpha: f32) -> egui::Color32 {
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(to_u8(c[0]), to_u8(c[1]), to_u8(c[2]), to_u8(alpha))
}

// ─── Geometry ─────────────────────────────────────────────────────────────────

/// Convex hull of screen points (Andrew's monotone chain), counter-clockwise
/// in screen space. Fewer than three distinct points are returned as-is.
pub fn convex_hull(points: &[egui::Pos2]) -> Vec<egui::Pos2> {
    let mut pts: Vec<egui::Pos2> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let cross = |o: egui::Pos2, a: egui::Pos2, b: egui::Pos2| {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    };

    let mut hull: Vec<egui::Pos2> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

// ─── Info panel ───────────────────────────────────────────────────────────────

/// Render the selected instrument's details.
pub fn draw_info_panel(ui: &mut egui::Ui, details: &SelectionDetails) {
    ui.heading(&details.symbol);
    if let Some(group) = &details.group {
        ui.weak(group);
    }
    ui.separator();

    egui::Grid::new("info_rows")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            for (label, value) in details.rows() {
                ui.label(egui::RichText::new(label).strong());
                let text = egui::RichText::new(value).monospace();
                match (label, details.day_change_percent) {
                    ("Day Change %", Some(c)) if c < 0.0 => {
                        ui.label(text.color(egui::Color32::from_rgb(255, 102, 102)))
                    }
                    ("Day Change %", Some(_)) => {
                        ui.label(text.color(egui::Color32::from_rgb(102, 255, 102)))
                    }
                    _ => ui.label(text),
                };
                ui.end_row();
            }
        });

    if !details.has_snapshot {
        ui.add_space(6.0);
        ui.colored_label(
            egui::Color32::GRAY,
            "(Snapshot data not loaded for this stock)",
        );
    }
}

// ─── Text utilities ───────────────────────────────────────────────────────────

/// Truncate `s` to at most `max_chars` Unicode scalar values, appending `"..."` if truncated.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let t: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_conversion_clamps() {
        assert_eq!(color32([1.0, 0.0, 2.0, 1.0]), egui::Color32::from_rgb(255, 0, 255));
        assert_eq!(color32_alpha([0.0, 0.0, 0.0, 1.0], 0.0).a(), 0);
    }

    #[test]
    fn hull_drops_interior_points() {
        let pts = [
            egui::pos2(0.0, 0.0),
            egui::pos2(10.0, 0.0),
            egui::pos2(10.0, 10.0),
            egui::pos2(0.0, 10.0),
            egui::pos2(5.0, 5.0),
            egui::pos2(5.0, 0.0),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&egui::pos2(5.0, 5.0)));
    }

    #[test]
    fn hull_of_two_points() {
        let hull = convex_hull(&[egui::pos2(1.0, 1.0), egui::pos2(1.0, 1.0), egui::pos2(2.0, 2.0)]);
        assert_eq!(hull.len(), 2);
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate_str("NASDAQ", 10), "NASDAQ");
        assert_eq!(truncate_str("VERY LONG EXCHANGE", 8), "VERY ...");
    }
}
