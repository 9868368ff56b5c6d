//! Scene composer: turns laid-out entities into pickable primitives.
//!
//! Per instrument:
//!   - one `InstrumentMarker` sphere (the only pickable role)
//!   - one `Indicator` (spotlight cone or flow beam) aimed at the sphere
//!
//! Per group with real grouping data and ≥ 2 members:
//!   - one `Connector` segment per unordered member pair (complete graph)
//!
//! The `GroupIndex` maps `(group, symbol)` back to the entity and its marker,
//! and is the only path from a picked primitive to instrument data.

use std::collections::HashMap;

use glam::Vec3;

use crate::config::{LayoutConfig, Palette, LINE_PICK_THRESHOLD};
use crate::market::grouping::GroupSet;
use crate::market::SnapshotMap;
use crate::render::layout::{layout_groups, IndicatorGeometry, VisualEntity};
use crate::render::IndicatorStyle;

pub type PrimitiveId = usize;

/// What a primitive stands for, as far as picking is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveRole {
    /// Represents exactly one instrument
    InstrumentMarker { symbol: String },
    /// Edge between two members of the same group
    Connector,
    /// Spotlight / beam belonging to a marker
    Indicator,
}

/// Pick and paint geometry, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { center: Vec3, radius: f32 },
    /// Capsule around a segment
    Segment { start: Vec3, end: Vec3, radius: f32 },
    /// Cone from `apex` (radius 0) to `axis_end` (radius `base_radius`)
    Cone { apex: Vec3, axis_end: Vec3, base_radius: f32 },
}

impl Shape {
    /// Centre of the shape's extent.
    pub fn center(&self) -> Vec3 {
        match *self {
            Shape::Sphere { center, .. } => center,
            Shape::Segment { start, end, .. } => (start + end) * 0.5,
            Shape::Cone { apex, axis_end, .. } => (apex + axis_end) * 0.5,
        }
    }

    /// Radius of a sphere enclosing the shape around [`Shape::center`].
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Shape::Sphere { radius, .. } => radius,
            Shape::Segment { start, end, radius } => (end - start).length() * 0.5 + radius,
            Shape::Cone { apex, axis_end, base_radius } => {
                (axis_end - apex).length() * 0.5 + base_radius
            }
        }
    }
}

impl From<IndicatorGeometry> for Shape {
    fn from(g: IndicatorGeometry) -> Self {
        match g {
            IndicatorGeometry::Cone { apex, axis_end, base_radius } => Shape::Cone {
                apex,
                axis_end,
                base_radius,
            },
            IndicatorGeometry::Beam { start, end, radius } => Shape::Segment { start, end, radius },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScenePrimitive {
    pub id: PrimitiveId,
    /// Index of the owning group in `ComposedScene::groups`
    pub group: usize,
    pub role: PrimitiveRole,
    pub shape: Shape,
    pub color: [f32; 4],
    /// Indicator brightness; 1.0 for markers and connectors
    pub intensity: f32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  GroupIndex
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub entity: VisualEntity,
    /// The marker primitive representing this entity
    pub marker: PrimitiveId,
}

/// group name → symbol → entry.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    groups: HashMap<String, HashMap<String, IndexEntry>>,
}

impl GroupIndex {
    fn insert(&mut self, group: &str, entry: IndexEntry) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(entry.entity.symbol().to_string(), entry);
    }

    pub fn get(&self, group: &str, symbol: &str) -> Option<&IndexEntry> {
        self.groups.get(group).and_then(|g| g.get(symbol))
    }

    /// Look a symbol up across all groups.
    pub fn find(&self, symbol: &str) -> Option<(&str, &IndexEntry)> {
        self.groups
            .iter()
            .find_map(|(name, g)| g.get(symbol).map(|e| (name.as_str(), e)))
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.groups.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ComposedScene
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-group summary for labels and the stats panel.
#[derive(Debug, Clone)]
pub struct GroupSummary {
    pub name: String,
    pub anchor: Vec3,
    pub members: usize,
    pub connectors: usize,
}

/// Immutable result of composition.
#[derive(Debug, Clone, Default)]
pub struct ComposedScene {
    pub primitives: Vec<ScenePrimitive>,
    pub groups: Vec<GroupSummary>,
    pub index: GroupIndex,
    pub real_grouping: bool,
    pub style: Option<IndicatorStyle>,
}

impl ComposedScene {
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn primitive(&self, id: PrimitiveId) -> Option<&ScenePrimitive> {
        self.primitives.get(id)
    }

    /// Entity behind a marker primitive; `None` for any other role.
    pub fn entity_for(&self, id: PrimitiveId) -> Option<&VisualEntity> {
        match &self.primitive(id)?.role {
            PrimitiveRole::InstrumentMarker { symbol } => {
                self.index.find(symbol).map(|(_, e)| &e.entity)
            }
            PrimitiveRole::Connector | PrimitiveRole::Indicator => None,
        }
    }

    pub fn find(&self, symbol: &str) -> Option<&VisualEntity> {
        self.index.find(symbol).map(|(_, e)| &e.entity)
    }

    pub fn count_role(&self, pred: impl Fn(&PrimitiveRole) -> bool) -> usize {
        self.primitives.iter().filter(|p| pred(&p.role)).count()
    }

    pub fn marker_count(&self) -> usize {
        self.count_role(|r| matches!(r, PrimitiveRole::InstrumentMarker { .. }))
    }

    pub fn connector_count(&self, group: &str) -> usize {
        self.groups
            .iter()
            .find(|g| g.name == group)
            .map(|g| g.connectors)
            .unwrap_or(0)
    }

    /// Radius around the origin enclosing every primitive.
    pub fn bounding_radius(&self) -> f32 {
        self.primitives
            .iter()
            .map(|p| p.shape.center().length() + p.shape.bounding_radius())
            .fold(0.0, f32::max)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Composition
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct SceneBuilder {
    primitives: Vec<ScenePrimitive>,
}

impl SceneBuilder {
    fn push(
        &mut self,
        group: usize,
        role: PrimitiveRole,
        shape: Shape,
        color: [f32; 4],
        intensity: f32,
    ) -> PrimitiveId {
        let id = self.primitives.len();
        self.primitives.push(ScenePrimitive {
            id,
            group,
            role,
            shape,
            color,
            intensity,
        });
        id
    }
}

/// Lay out and compose the full scene.
pub fn compose_scene(set: &GroupSet, snapshots: &SnapshotMap, cfg: &LayoutConfig) -> ComposedScene {
    let layouts = layout_groups(set, snapshots, cfg);
    let real_grouping = set.has_real_grouping();

    let mut builder = SceneBuilder {
        primitives: Vec::new(),
    };
    let mut index = GroupIndex::default();
    let mut groups = Vec::with_capacity(layouts.len());

    for (gi, layout) in layouts.into_iter().enumerate() {
        let mut centers = Vec::with_capacity(layout.entities.len());

        for entity in layout.entities {
            let marker = builder.push(
                gi,
                PrimitiveRole::InstrumentMarker {
                    symbol: entity.symbol().to_string(),
                },
                Shape::Sphere {
                    center: entity.position,
                    radius: entity.size,
                },
                entity.marker_color,
                1.0,
            );
            builder.push(
                gi,
                PrimitiveRole::Indicator,
                entity.indicator.into(),
                entity.indicator_color,
                entity.indicator_intensity,
            );
            centers.push(entity.position);
            index.insert(&layout.name, IndexEntry { entity, marker });
        }

        let mut connectors = 0;
        if real_grouping && centers.len() >= 2 {
            for i in 0..centers.len() {
                for j in (i + 1)..centers.len() {
                    builder.push(
                        gi,
                        PrimitiveRole::Connector,
                        Shape::Segment {
                            start: centers[i],
                            end: centers[j],
                            radius: LINE_PICK_THRESHOLD,
                        },
                        Palette::CONNECTOR,
                        1.0,
                    );
                    connectors += 1;
                }
            }
        }

        groups.push(GroupSummary {
            name: layout.name,
            anchor: layout.anchor,
            members: centers.len(),
            connectors,
        });
    }

    log::info!(
        "Composed scene: {} groups, {} instruments, {} primitives",
        groups.len(),
        index.len(),
        builder.primitives.len()
    );

    ComposedScene {
        primitives: builder.primitives,
        groups,
        index,
        real_grouping,
        style: Some(cfg.indicator_style),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::grouping::{equity, group_instruments, Group};
    use crate::market::Snapshot;

    fn compose(input: &[crate::market::Instrument]) -> ComposedScene {
        let cfg = LayoutConfig::default();
        let set = group_instruments(input, &cfg);
        compose_scene(&set, &SnapshotMap::new(), &cfg)
    }

    #[test]
    fn one_index_entry_per_marker() {
        let scene = compose(&[
            equity("A", Some("X")),
            equity("B", Some("X")),
            equity("C", Some("Y")),
        ]);
        assert_eq!(scene.index.len(), 3);
        assert_eq!(scene.marker_count(), 3);
        for p in &scene.primitives {
            if let PrimitiveRole::InstrumentMarker { symbol } = &p.role {
                let (_, entry) = scene.index.find(symbol).expect("marker indexed");
                assert_eq!(entry.marker, p.id);
            }
        }
        assert_eq!(scene.count_role(|r| *r == PrimitiveRole::Indicator), 3);
    }

    #[test]
    fn connectors_form_complete_graph() {
        for n in 0..8usize {
            let input: Vec<_> = (0..n).map(|i| equity(&format!("S{}", i), Some("X"))).collect();
            let scene = compose(&input);
            let expected = if n >= 2 { n * (n - 1) / 2 } else { 0 };
            assert_eq!(scene.connector_count("X"), expected, "n={}", n);
            assert_eq!(scene.count_role(|r| *r == PrimitiveRole::Connector), expected);
        }
    }

    #[test]
    fn fallback_only_bucket_has_no_connectors() {
        let scene = compose(&[equity("A", None), equity("B", None), equity("C", None)]);
        assert!(!scene.real_grouping);
        assert_eq!(scene.connector_count("Other"), 0);
        assert_eq!(scene.marker_count(), 3);
    }

    #[test]
    fn connectors_stay_inside_groups() {
        let scene = compose(&[
            equity("A", Some("X")),
            equity("B", Some("Y")),
            equity("C", Some("X")),
            equity("D", Some("Y")),
        ]);
        for p in scene.primitives.iter().filter(|p| p.role == PrimitiveRole::Connector) {
            if let Shape::Segment { start, end, .. } = p.shape {
                let g = &scene.groups[p.group];
                assert!((start - g.anchor).length() < 50.0);
                assert!((end - g.anchor).length() < 50.0);
            }
        }
        assert_eq!(scene.connector_count("X"), 1);
        assert_eq!(scene.connector_count("Y"), 1);
    }

    #[test]
    fn entity_for_resolves_markers_only() {
        let mut snaps = SnapshotMap::new();
        snaps.insert(
            "A".to_string(),
            Snapshot {
                latest_trade_price: Some(12.5),
                daily_volume: Some(3_000_000.0),
                todays_change_percent: Some(-2.0),
            },
        );
        let set = GroupSet {
            groups: vec![Group {
                name: "X".into(),
                members: vec![equity("A", Some("X")), equity("B", Some("X"))],
            }],
        };
        let scene = compose_scene(&set, &snaps, &LayoutConfig::default());
        let marker = scene.index.get("X", "A").unwrap().marker;
        let entity = scene.entity_for(marker).unwrap();
        assert_eq!(entity.symbol(), "A");
        assert_eq!(entity.snapshot.as_ref().and_then(|s| s.latest_trade_price), Some(12.5));
        assert_eq!(entity.indicator_color, Palette::LOSS);
        assert!(scene.entity_for(marker + 1).is_none(), "indicator is not an entity");
    }

    #[test]
    fn empty_set_composes_empty_scene() {
        let scene = compose(&[]);
        assert!(scene.is_empty());
        assert!(scene.index.is_empty());
        assert_eq!(scene.bounding_radius(), 0.0);
    }
}
