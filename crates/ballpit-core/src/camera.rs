//! Perspective camera plus the viewport measurements derived from it.
//!
//! These types avoid referencing platform-specific APIs; the web front-end
//! feeds them CSS sizes and the device pixel ratio and reads back matrices,
//! world-space extents and pointer rays.

use crate::config::ViewportConfig;
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Right-handed perspective camera looking at `target`.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    /// Configured vertical field of view in degrees.
    pub base_fov: f32,
    /// Vertical field of view in degrees after aspect-band correction.
    pub fov: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(fov_degrees: f32, eye: Vec3) -> Self {
        Self {
            eye,
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            base_fov: fov_degrees,
            fov: fov_degrees,
            znear: 0.1,
            zfar: 2000.0,
        }
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    /// Set the aspect ratio and correct the field of view when it leaves
    /// `[min_aspect, max_aspect]`.
    ///
    /// Outside the band the vertical FOV is scaled so the framing along the
    /// other axis stays what it would be at the band edge.
    pub fn set_aspect(&mut self, aspect: f32, min_aspect: Option<f32>, max_aspect: Option<f32>) {
        self.aspect = aspect;
        self.fov = match (min_aspect, max_aspect) {
            (Some(min), _) if aspect < min => self.fov_for_band_edge(min),
            (_, Some(max)) if aspect > max => self.fov_for_band_edge(max),
            _ => self.base_fov,
        };
    }

    fn fov_for_band_edge(&self, edge: f32) -> f32 {
        let tan_half = (self.base_fov.to_radians() / 2.0).tan() / (self.aspect / edge);
        2.0 * tan_half.atan().to_degrees()
    }

    /// World-space (width, height) of the view frustum at the eye's distance
    /// from the origin.
    pub fn world_size(&self) -> Vec2 {
        let height = 2.0 * (self.fov.to_radians() / 2.0).tan() * self.eye.length();
        Vec2::new(height * self.aspect, height)
    }

    /// World-space ray through normalized device coordinates (y up).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        let far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let far = far.truncate() / far.w;
        Ray {
            origin: self.eye,
            direction: (far - self.eye).normalize_or_zero(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Intersect with the plane `normal · p + constant = 0`.
    ///
    /// Returns `None` when the ray is parallel to or points away from the plane.
    pub fn intersect_plane(&self, normal: Vec3, constant: f32) -> Option<Vec3> {
        let denom = normal.dot(self.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = -(self.origin.dot(normal) + constant) / denom;
        (t >= 0.0).then(|| self.origin + self.direction * t)
    }
}

/// Clamp the device pixel ratio to the optional configured band.
pub fn clamp_pixel_ratio(dpr: f32, min: Option<f32>, max: Option<f32>) -> f32 {
    match (min, max) {
        (_, Some(max)) if dpr > max => max,
        (Some(min), _) if dpr < min => min,
        _ => dpr,
    }
}

/// Measurements recomputed on every resize.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportState {
    /// CSS width in pixels.
    pub width: f32,
    /// CSS height in pixels.
    pub height: f32,
    pub aspect: f32,
    pub world_width: f32,
    pub world_height: f32,
    pub pixel_ratio: f32,
}

impl ViewportState {
    /// Apply a new CSS size and device pixel ratio to `camera` and return the
    /// resulting measurements.
    pub fn measure(
        camera: &mut Camera,
        width: f32,
        height: f32,
        device_pixel_ratio: f32,
        options: &ViewportConfig,
    ) -> Self {
        let height = height.max(1.0);
        let width = width.max(0.0);
        let aspect = width / height;
        camera.set_aspect(aspect, options.min_aspect, options.max_aspect);
        let world = camera.world_size();
        Self {
            width,
            height,
            aspect,
            world_width: world.x,
            world_height: world.y,
            pixel_ratio: clamp_pixel_ratio(
                device_pixel_ratio,
                options.min_pixel_ratio,
                options.max_pixel_ratio,
            ),
        }
    }

    /// Backing-store size in physical pixels, never zero.
    pub fn physical_size(&self) -> (u32, u32) {
        let w = (self.width * self.pixel_ratio).round() as u32;
        let h = (self.height * self.pixel_ratio).round() as u32;
        (w.max(1), h.max(1))
    }
}
