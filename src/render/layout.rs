//! Layout engine: groups on a ring, members on a grid, snapshot metrics
//! mapped to node size and indicator colour/intensity.
//!
//! Placement:
//!   - group `i` of `g` sits at angle `i·2π/g` on a horizontal ring (XZ plane)
//!   - members fill a `ceil(sqrt n)`-column grid in the group's XY plane,
//!     centred on the anchor
//!
//! Every derivation here is total: missing, zero, negative or non-finite
//! metrics fall back to fixed defaults and results are clamped.

use glam::Vec3;

use crate::config::{
    LayoutConfig, Palette, BEAM_OFFSET, BEAM_RADIUS, INTENSITY_DEFAULT, INTENSITY_MAX,
    INTENSITY_MIN, NODE_SIZE_DEFAULT, NODE_SIZE_MAX, NODE_SIZE_MIN, SPOTLIGHT_ANGLE,
    SPOTLIGHT_DISTANCE, VOLUME_INTENSITY_SCALE_FACTOR, VOLUME_SCALE_FACTOR,
};
use crate::market::grouping::GroupSet;
use crate::market::{Instrument, Snapshot, SnapshotMap};
use crate::render::IndicatorStyle;

/// World-space shape of one indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorGeometry {
    /// Light cone: apex at the light, opening toward `axis_end` (the node)
    Cone {
        apex: Vec3,
        axis_end: Vec3,
        base_radius: f32,
    },
    /// Beam segment aimed at the node (`end`)
    Beam { start: Vec3, end: Vec3, radius: f32 },
}

impl IndicatorGeometry {
    /// Point the indicator is aimed at.
    pub fn target(&self) -> Vec3 {
        match *self {
            IndicatorGeometry::Cone { axis_end, .. } => axis_end,
            IndicatorGeometry::Beam { end, .. } => end,
        }
    }

    /// Point the indicator emanates from.
    pub fn source(&self) -> Vec3 {
        match *self {
            IndicatorGeometry::Cone { apex, .. } => apex,
            IndicatorGeometry::Beam { start, .. } => start,
        }
    }
}

/// Derived spatial and visual representation of one instrument.
#[derive(Debug, Clone)]
pub struct VisualEntity {
    pub instrument: Instrument,
    pub snapshot: Option<Snapshot>,
    /// World position of the node centre
    pub position: Vec3,
    /// Node radius, within [NODE_SIZE_MIN, NODE_SIZE_MAX]
    pub size: f32,
    pub marker_color: [f32; 4],
    pub indicator_color: [f32; 4],
    /// Within [INTENSITY_MIN, INTENSITY_MAX]
    pub indicator_intensity: f32,
    pub indicator: IndicatorGeometry,
}

impl VisualEntity {
    pub fn symbol(&self) -> &str {
        &self.instrument.symbol
    }
}

/// One group's anchor and its members' entities, in member order.
#[derive(Debug, Clone)]
pub struct GroupLayout {
    pub name: String,
    pub anchor: Vec3,
    pub entities: Vec<VisualEntity>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Placement
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Angular step between group anchors. Zero groups → 0.
pub fn angle_step(group_count: usize) -> f32 {
    if group_count == 0 {
        return 0.0;
    }
    2.0 * std::f32::consts::PI / group_count as f32
}

/// Anchor of group `index` out of `count` on a ring of `radius`.
pub fn group_anchor(index: usize, count: usize, radius: f32) -> Vec3 {
    if count == 0 {
        return Vec3::ZERO;
    }
    let angle = index as f32 * angle_step(count);
    Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}

/// Column and row count of the grid holding `n` members.
pub fn grid_dims(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let columns = (n as f64).sqrt().ceil() as usize;
    let rows = (n + columns - 1) / columns;
    (columns, rows)
}

/// Offset of member `index` out of `n` from its group anchor.
pub fn grid_offset(index: usize, n: usize, spacing: f32) -> Vec3 {
    let (columns, rows) = grid_dims(n);
    if columns == 0 {
        return Vec3::ZERO;
    }
    let row = index / columns;
    let col = index % columns;
    let x = (col as f32 - (columns as f32 - 1.0) / 2.0) * spacing;
    let y = (row as f32 - (rows as f32 - 1.0) / 2.0) * spacing;
    Vec3::new(x, y, 0.0)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Metric → visual parameters
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Node radius from daily volume.
pub fn node_size(snapshot: Option<&Snapshot>) -> f32 {
    match snapshot.and_then(Snapshot::usable_volume) {
        Some(v) => {
            let size = NODE_SIZE_MIN as f64 + v * VOLUME_SCALE_FACTOR;
            (size as f32).clamp(NODE_SIZE_MIN, NODE_SIZE_MAX)
        }
        None => NODE_SIZE_DEFAULT,
    }
}

/// Binary gain/loss colour; flat days count as gains.
pub fn indicator_color(snapshot: Option<&Snapshot>) -> [f32; 4] {
    match snapshot.and_then(Snapshot::change_percent) {
        Some(c) if c >= 0.0 => Palette::GAIN,
        Some(_) => Palette::LOSS,
        None => Palette::NEUTRAL,
    }
}

/// Indicator intensity from daily volume.
pub fn indicator_intensity(snapshot: Option<&Snapshot>) -> f32 {
    match snapshot.and_then(Snapshot::usable_volume) {
        Some(v) => {
            let i = INTENSITY_MIN as f64 + v * VOLUME_INTENSITY_SCALE_FACTOR;
            (i as f32).clamp(INTENSITY_MIN, INTENSITY_MAX)
        }
        None => INTENSITY_DEFAULT,
    }
}

/// Deterministic marker colour for a symbol.
pub fn marker_color(symbol: &str) -> [f32; 4] {
    // FNV-1a
    let mut h: u32 = 0x811c_9dc5;
    for b in symbol.bytes() {
        h ^= b as u32;
        h = h.wrapping_mul(0x0100_0193);
    }
    Palette::MARKERS[h as usize % Palette::MARKERS.len()]
}

/// Indicator shape for a node at `node` in the given style.
pub fn indicator_geometry(
    style: IndicatorStyle,
    node: Vec3,
    snapshot: Option<&Snapshot>,
) -> IndicatorGeometry {
    match style {
        IndicatorStyle::Spotlight => IndicatorGeometry::Cone {
            apex: node + Vec3::new(0.0, 0.0, SPOTLIGHT_DISTANCE),
            axis_end: node,
            base_radius: SPOTLIGHT_DISTANCE * SPOTLIGHT_ANGLE.tan(),
        },
        IndicatorStyle::FlowBeam => {
            let falling = snapshot
                .and_then(Snapshot::change_percent)
                .map(|c| c < 0.0)
                .unwrap_or(false);
            let dir = if falling { -1.0 } else { 1.0 };
            IndicatorGeometry::Beam {
                start: node + Vec3::new(0.0, dir * BEAM_OFFSET, 0.0),
                end: node,
                radius: BEAM_RADIUS,
            }
        }
    }
}

/// Build one entity at its final world position.
pub fn build_entity(
    instrument: &Instrument,
    snapshot: Option<&Snapshot>,
    position: Vec3,
    style: IndicatorStyle,
) -> VisualEntity {
    VisualEntity {
        instrument: instrument.clone(),
        snapshot: snapshot.cloned(),
        position,
        size: node_size(snapshot),
        marker_color: marker_color(&instrument.symbol),
        indicator_color: indicator_color(snapshot),
        indicator_intensity: indicator_intensity(snapshot),
        indicator: indicator_geometry(style, position, snapshot),
    }
}

/// Lay out every surviving instrument.
pub fn layout_groups(set: &GroupSet, snapshots: &SnapshotMap, cfg: &LayoutConfig) -> Vec<GroupLayout> {
    let count = set.len();
    set.groups
        .iter()
        .enumerate()
        .map(|(gi, group)| {
            let anchor = group_anchor(gi, count, cfg.ring_radius);
            let n = group.members.len();
            let entities = group
                .members
                .iter()
                .enumerate()
                .map(|(mi, inst)| {
                    let position = anchor + grid_offset(mi, n, cfg.stock_spacing);
                    build_entity(
                        inst,
                        snapshots.get(&inst.symbol),
                        position,
                        cfg.indicator_style,
                    )
                })
                .collect();
            GroupLayout {
                name: group.name.clone(),
                anchor,
                entities,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn snap(volume: Option<f64>, change: Option<f64>) -> Snapshot {
        Snapshot {
            latest_trade_price: Some(10.0),
            daily_volume: volume,
            todays_change_percent: change,
        }
    }

    #[test]
    fn anchors_lie_on_ring_with_even_spacing() {
        for g in 1..=12 {
            let step = angle_step(g);
            assert!((step - 2.0 * std::f32::consts::PI / g as f32).abs() < 1e-6);
            for i in 0..g {
                let a = group_anchor(i, g, 150.0);
                assert!((a.length() - 150.0).abs() < 1e-3, "g={} i={}", g, i);
                assert_eq!(a.y, 0.0);
                let expected = i as f32 * step;
                let actual = a.z.atan2(a.x).rem_euclid(2.0 * std::f32::consts::PI);
                let diff = (actual - expected).abs();
                assert!(diff < 1e-3 || (diff - 2.0 * std::f32::consts::PI).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn zero_groups_is_degenerate_noop() {
        assert_eq!(angle_step(0), 0.0);
        assert_eq!(group_anchor(0, 0, 150.0), Vec3::ZERO);
    }

    #[test]
    fn grid_dims_match_square_rule() {
        assert_eq!(grid_dims(1), (1, 1));
        assert_eq!(grid_dims(2), (2, 1));
        assert_eq!(grid_dims(3), (2, 2));
        assert_eq!(grid_dims(5), (3, 2));
        assert_eq!(grid_dims(9), (3, 3));
        assert_eq!(grid_dims(15), (4, 4));
    }

    #[test]
    fn grid_positions_distinct_and_centred() {
        for n in 1..=15 {
            let offsets: Vec<Vec3> = (0..n).map(|i| grid_offset(i, n, 15.0)).collect();
            let distinct: HashSet<(i32, i32)> = offsets
                .iter()
                .map(|o| ((o.x * 10.0).round() as i32, (o.y * 10.0).round() as i32))
                .collect();
            assert_eq!(distinct.len(), n);

            // Grid cells (full rectangle) are symmetric about the anchor
            let (cols, rows) = grid_dims(n);
            let xs: Vec<f32> = (0..cols).map(|c| grid_offset(c, n, 15.0).x).collect();
            assert!((xs[0] + xs[cols - 1]).abs() < 1e-4);
            let first_row = grid_offset(0, n, 15.0).y;
            let last_row = first_row + (rows as f32 - 1.0) * 15.0;
            assert!((first_row + last_row).abs() < 1e-4);
            assert!(offsets.iter().all(|o| o.z == 0.0));
        }
    }

    #[test]
    fn single_member_sits_on_anchor() {
        assert_eq!(grid_offset(0, 1, 15.0), Vec3::ZERO);
    }

    #[test]
    fn size_is_clamped_and_total() {
        assert_eq!(node_size(None), NODE_SIZE_DEFAULT);
        assert_eq!(node_size(Some(&snap(None, Some(1.0)))), NODE_SIZE_DEFAULT);
        assert_eq!(node_size(Some(&snap(Some(0.0), None))), NODE_SIZE_DEFAULT);
        assert_eq!(node_size(Some(&snap(Some(-100.0), None))), NODE_SIZE_DEFAULT);
        assert_eq!(node_size(Some(&snap(Some(1e15), None))), NODE_SIZE_MAX);
        let mid = node_size(Some(&snap(Some(2_000_000.0), None)));
        assert!((mid - 3.0).abs() < 1e-5);
        for v in [1.0, 1e3, 1e6, 1e9, f64::MAX] {
            let s = node_size(Some(&snap(Some(v), None)));
            assert!((NODE_SIZE_MIN..=NODE_SIZE_MAX).contains(&s));
        }
    }

    #[test]
    fn intensity_is_clamped_and_total() {
        assert_eq!(indicator_intensity(None), INTENSITY_DEFAULT);
        assert_eq!(indicator_intensity(Some(&snap(Some(0.0), None))), INTENSITY_DEFAULT);
        assert_eq!(indicator_intensity(Some(&snap(Some(-1.0), None))), INTENSITY_DEFAULT);
        assert_eq!(indicator_intensity(Some(&snap(Some(1e18), None))), INTENSITY_MAX);
        for v in [1.0, 1e3, 1e6, 1e9, f64::MAX] {
            let i = indicator_intensity(Some(&snap(Some(v), None)));
            assert!((INTENSITY_MIN..=INTENSITY_MAX).contains(&i));
        }
    }

    #[test]
    fn color_is_binary_on_change_sign() {
        assert_eq!(indicator_color(Some(&snap(None, Some(0.0)))), Palette::GAIN);
        assert_eq!(indicator_color(Some(&snap(None, Some(3.2)))), Palette::GAIN);
        assert_eq!(indicator_color(Some(&snap(None, Some(-0.01)))), Palette::LOSS);
        assert_eq!(indicator_color(Some(&snap(None, None))), Palette::NEUTRAL);
        assert_eq!(indicator_color(None), Palette::NEUTRAL);
    }

    #[test]
    fn marker_color_is_stable() {
        assert_eq!(marker_color("AAPL"), marker_color("AAPL"));
    }

    #[test]
    fn spotlight_sits_in_front_and_aims_at_node() {
        let node = Vec3::new(5.0, 2.0, -1.0);
        let geo = indicator_geometry(IndicatorStyle::Spotlight, node, None);
        assert_eq!(geo.target(), node);
        assert!((geo.source() - node - Vec3::new(0.0, 0.0, SPOTLIGHT_DISTANCE)).length() < 1e-5);
    }

    #[test]
    fn beam_direction_follows_change_sign() {
        let node = Vec3::ZERO;
        let up = indicator_geometry(IndicatorStyle::FlowBeam, node, Some(&snap(None, Some(1.0))));
        let down = indicator_geometry(IndicatorStyle::FlowBeam, node, Some(&snap(None, Some(-1.0))));
        assert!(up.source().y > 0.0);
        assert!(down.source().y < 0.0);
        assert_eq!(up.target(), node);
    }
}
