//! Pointer resolver: ray casting against the composed scene.
//!
//! All primitives are intersected and ordered nearest first; the first one
//! carrying the `InstrumentMarker` role wins. Connectors and indicators are
//! skipped even when they are hit in front of a marker.

use glam::Vec3;

use crate::render::info::SelectionDetails;
use crate::render::scene::{ComposedScene, PrimitiveId, PrimitiveRole, ScenePrimitive, Shape};

const EPS: f32 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub primitive: PrimitiveId,
    /// Distance along the ray to the entry point
    pub distance: f32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Shape tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let near = -b - sq;
    if near >= 0.0 {
        return Some(near);
    }
    // Origin inside the sphere
    let far = -b + sq;
    (far >= 0.0).then_some(0.0)
}

/// Closest points between the ray and segment `a→b`.
/// Returns `(ray_t, segment_s, distance)` with `ray_t ≥ 0`, `s ∈ [0, 1]`.
fn ray_segment_closest(ray: &Ray, a: Vec3, b: Vec3) -> (f32, f32, f32) {
    let d = ray.direction;
    let v = b - a;
    let w = ray.origin - a;
    let e = v.length_squared();
    let c = d.dot(w);

    if e < EPS {
        let t = (-c).max(0.0);
        return (t, 0.0, (ray.at(t) - a).length());
    }

    let bb = d.dot(v);
    let f = v.dot(w);
    let denom = e - bb * bb;

    let mut t = if denom > EPS {
        ((bb * f - c * e) / denom).max(0.0)
    } else {
        0.0
    };
    let mut s = (bb * t + f) / e;
    if s < 0.0 {
        s = 0.0;
        t = (-c).max(0.0);
    } else if s > 1.0 {
        s = 1.0;
        t = (bb - c).max(0.0);
    }

    let dist = (ray.at(t) - (a + v * s)).length();
    (t, s, dist)
}

fn ray_capsule(ray: &Ray, a: Vec3, b: Vec3, radius: f32) -> Option<f32> {
    let (t, _, dist) = ray_segment_closest(ray, a, b);
    if dist > radius {
        return None;
    }
    Some((t - (radius * radius - dist * dist).sqrt()).max(0.0))
}

/// Finite cone: lateral surface between apex and base, plus the base disk.
fn ray_cone(ray: &Ray, apex: Vec3, axis_end: Vec3, base_radius: f32) -> Option<f32> {
    let axis = axis_end - apex;
    let height = axis.length();
    if height < EPS {
        return None;
    }
    let v = axis / height;
    let cos2 = (height * height) / (height * height + base_radius * base_radius);

    let d = ray.direction;
    let co = ray.origin - apex;
    let dv = d.dot(v);
    let cov = co.dot(v);

    // Origin inside the cone
    if (0.0..=height).contains(&cov) {
        let radial = (co - v * cov).length();
        if radial <= cov * base_radius / height {
            return Some(0.0);
        }
    }

    let on_nappe = |t: f32| {
        let h = (ray.at(t) - apex).dot(v);
        t >= 0.0 && (0.0..=height).contains(&h)
    };

    let mut candidates: Vec<f32> = Vec::with_capacity(3);

    let a = dv * dv - cos2;
    let b = 2.0 * (dv * cov - d.dot(co) * cos2);
    let c = cov * cov - co.length_squared() * cos2;
    if a.abs() < EPS {
        if b.abs() > EPS {
            candidates.push(-c / b);
        }
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc >= 0.0 {
            let sq = disc.sqrt();
            candidates.push((-b - sq) / (2.0 * a));
            candidates.push((-b + sq) / (2.0 * a));
        }
    }
    candidates.retain(|t| on_nappe(*t));

    if dv.abs() > EPS {
        let t = (axis_end - ray.origin).dot(v) / dv;
        if t >= 0.0 && (ray.at(t) - axis_end).length() <= base_radius {
            candidates.push(t);
        }
    }

    candidates.into_iter().reduce(f32::min)
}

/// Entry distance of `ray` into `shape`, if hit.
pub fn intersect_shape(ray: &Ray, shape: &Shape) -> Option<f32> {
    match *shape {
        Shape::Sphere { center, radius } => ray_sphere(ray, center, radius),
        Shape::Segment { start, end, radius } => ray_capsule(ray, start, end, radius),
        Shape::Cone { apex, axis_end, base_radius } => ray_cone(ray, apex, axis_end, base_radius),
    }
}

/// Every primitive hit by `ray`, nearest first.
pub fn intersect(ray: &Ray, primitives: &[ScenePrimitive]) -> Vec<Intersection> {
    let mut hits: Vec<Intersection> = primitives
        .iter()
        .filter_map(|p| {
            intersect_shape(ray, &p.shape).map(|distance| Intersection {
                primitive: p.id,
                distance,
            })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// First marker along the ray: `(primitive, symbol)`.
pub fn pick_marker<'a>(ray: &Ray, scene: &'a ComposedScene) -> Option<(PrimitiveId, &'a str)> {
    intersect(ray, &scene.primitives)
        .into_iter()
        .find_map(|hit| match &scene.primitives[hit.primitive].role {
            PrimitiveRole::InstrumentMarker { symbol } => Some((hit.primitive, symbol.as_str())),
            PrimitiveRole::Connector | PrimitiveRole::Indicator => None,
        })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Selection state
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// What the info display should do after a resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayUpdate {
    /// Same target as before (or still nothing): leave the display alone
    Unchanged,
    /// A new instrument is under the pointer
    Show(SelectionDetails),
    /// The previous selection was cleared
    Hide,
}

/// Pure resolution step: `(ray, scene, previous) → (selection, update)`.
pub fn resolve_selection(
    ray: &Ray,
    scene: &ComposedScene,
    previous: Option<&str>,
) -> (Option<String>, DisplayUpdate) {
    match pick_marker(ray, scene) {
        Some((_, symbol)) if previous == Some(symbol) => {
            (Some(symbol.to_string()), DisplayUpdate::Unchanged)
        }
        Some((id, symbol)) => {
            let update = match scene.entity_for(id) {
                Some(entity) => DisplayUpdate::Show(SelectionDetails::from_entity(entity)),
                None => {
                    log::warn!("Marker {} has no index entry", symbol);
                    DisplayUpdate::Unchanged
                }
            };
            (Some(symbol.to_string()), update)
        }
        None if previous.is_some() => (None, DisplayUpdate::Hide),
        None => (None, DisplayUpdate::Unchanged),
    }
}

/// Holds the active selection between pointer events.
#[derive(Debug, Clone, Default)]
pub struct PointerResolver {
    selected: Option<String>,
}

impl PointerResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn resolve(&mut self, ray: &Ray, scene: &ComposedScene) -> DisplayUpdate {
        let (next, update) = resolve_selection(ray, scene, self.selected.as_deref());
        self.selected = next;
        update
    }

    /// Drop the selection (pointer left the viewport, scene replaced).
    pub fn clear(&mut self) -> DisplayUpdate {
        match self.selected.take() {
            Some(_) => DisplayUpdate::Hide,
            None => DisplayUpdate::Unchanged,
        }
    }
}
