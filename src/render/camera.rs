//! Orbit camera: azimuth/elevation/distance around a target, with damped
//! drag rotation, clamped dolly, perspective projection and pointer rays.

use glam::Vec3;

use crate::render::pick::Ray;

const ELEVATION_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.05;
const NEAR: f32 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    /// Horizontal orbit angle in radians (0 = looking down -Z from +Z)
    pub azimuth: f32,
    /// Vertical orbit angle in radians (positive = above the target)
    pub elevation: f32,
    /// Distance from the camera to the target point
    pub distance: f32,
    pub target: Vec3,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of the pending rotation velocity dropped per frame
    pub damping: f32,
    az_velocity: f32,
    el_velocity: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        // Eye at (0, 100, 250) looking at the origin
        Self {
            azimuth: 0.0,
            elevation: 100.0_f32.atan2(250.0),
            distance: (100.0_f32 * 100.0 + 250.0 * 250.0).sqrt(),
            target: Vec3::ZERO,
            fov_y: 75.0,
            min_distance: 50.0,
            max_distance: 1000.0,
            damping: 0.05,
            az_velocity: 0.0,
            el_velocity: 0.0,
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        self.target
            + Vec3::new(
                self.distance * self.azimuth.sin() * self.elevation.cos(),
                self.distance * self.elevation.sin(),
                self.distance * self.azimuth.cos() * self.elevation.cos(),
            )
    }

    /// (forward, right, up), orthonormal.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.target - self.eye()).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);
        (forward, right, up)
    }

    fn tan_half_fov(&self) -> f32 {
        (self.fov_y.to_radians() * 0.5).tan()
    }

    /// Ray from the eye through a normalized device coordinate
    /// (x right, y up, both in -1..1).
    pub fn ray_through(&self, ndc_x: f32, ndc_y: f32, aspect: f32) -> Ray {
        let (forward, right, up) = self.basis();
        let t = self.tan_half_fov();
        let dir = forward + right * (ndc_x * t * aspect) + up * (ndc_y * t);
        Ray::new(self.eye(), dir)
    }

    /// Project a world point to NDC. Returns `(x, y, depth)` or `None` when
    /// the point is behind the near plane.
    pub fn project(&self, p: Vec3, aspect: f32) -> Option<(f32, f32, f32)> {
        let (forward, right, up) = self.basis();
        let rel = p - self.eye();
        let z = rel.dot(forward);
        if z < NEAR {
            return None;
        }
        let t = self.tan_half_fov();
        let x = rel.dot(right) / (z * t * aspect);
        let y = rel.dot(up) / (z * t);
        Some((x, y, z))
    }

    /// Projected size in NDC-y units of a world length at depth `z`.
    pub fn projected_scale(&self, z: f32) -> f32 {
        1.0 / (z.max(NEAR) * self.tan_half_fov())
    }

    /// Queue a drag rotation; applied over the following frames.
    pub fn orbit(&mut self, d_azimuth: f32, d_elevation: f32) {
        self.az_velocity += d_azimuth;
        self.el_velocity += d_elevation;
    }

    /// Dolly in (factor < 1) or out (factor > 1), clamped to the limits.
    pub fn dolly(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
        }
    }

    /// Advance damping by one frame. Returns true while still moving.
    pub fn update(&mut self) -> bool {
        self.azimuth += self.az_velocity;
        self.elevation = (self.elevation + self.el_velocity).clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
        let keep = 1.0 - self.damping;
        self.az_velocity *= keep;
        self.el_velocity *= keep;
        if self.az_velocity.abs() < 1e-5 {
            self.az_velocity = 0.0;
        }
        if self.el_velocity.abs() < 1e-5 {
            self.el_velocity = 0.0;
        }
        self.az_velocity != 0.0 || self.el_velocity != 0.0
    }

    /// Pull back far enough to see a scene of the given radius.
    pub fn frame_radius(&mut self, radius: f32) {
        if radius > 0.0 {
            let fit = radius / self.tan_half_fov() * 1.1;
            self.distance = fit.clamp(self.min_distance, self.max_distance);
        }
    }
}

/// Screen position → NDC (y up), relative to a viewport rectangle.
pub fn screen_to_ndc(x: f32, y: f32, left: f32, top: f32, width: f32, height: f32) -> (f32, f32) {
    let nx = (x - left) / width * 2.0 - 1.0;
    let ny = -((y - top) / height * 2.0 - 1.0);
    (nx, ny)
}

/// NDC → screen position, inverse of [`screen_to_ndc`].
pub fn ndc_to_screen(nx: f32, ny: f32, left: f32, top: f32, width: f32, height: f32) -> (f32, f32) {
    (left + (nx + 1.0) * 0.5 * width, top + (1.0 - ny) * 0.5 * height)
}
