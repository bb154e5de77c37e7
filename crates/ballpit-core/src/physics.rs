//! Sphere pool integration and collision resolution.
//!
//! The pool is stored as flat `f32` buffers (xyz triples for position and
//! velocity, one radius per sphere). Each pass loads the spheres it touches
//! into stack-local `Vec3`s and writes them back, so a step never relies on
//! shared scratch state.

use crate::config::{ConfigError, SimulationConfig};
use glam::Vec3;
use rand::Rng;

/// Interpolation factor applied to the control sphere every frame.
pub const CONTROL_EASING: f32 = 0.1;
/// Lower bound on the impulse speed for sphere/sphere contacts.
pub const PAIR_SPEED_FLOOR: f32 = 1.0;
/// Lower bound on the impulse speed for contacts with the control sphere.
pub const CONTROL_SPEED_FLOOR: f32 = 2.0;

/// Fixed-size physics state for N spheres.
#[derive(Clone, Debug)]
pub struct SpherePool {
    position: Vec<f32>,
    velocity: Vec<f32>,
    size: Vec<f32>,
}

impl SpherePool {
    fn zeroed(count: usize) -> Self {
        Self {
            position: vec![0.0; 3 * count],
            velocity: vec![0.0; 3 * count],
            size: vec![1.0; count],
        }
    }

    pub fn count(&self) -> usize {
        self.size.len()
    }

    pub fn positions(&self) -> &[f32] {
        &self.position
    }

    pub fn velocities(&self) -> &[f32] {
        &self.velocity
    }

    pub fn sizes(&self) -> &[f32] {
        &self.size
    }

    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.position[3 * i..3 * i + 3])
    }

    #[inline]
    pub fn velocity(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.velocity[3 * i..3 * i + 3])
    }

    #[inline]
    pub fn size(&self, i: usize) -> f32 {
        self.size[i]
    }

    #[inline]
    pub fn set_position(&mut self, i: usize, p: Vec3) {
        p.write_to_slice(&mut self.position[3 * i..3 * i + 3]);
    }

    #[inline]
    pub fn set_velocity(&mut self, i: usize, v: Vec3) {
        v.write_to_slice(&mut self.velocity[3 * i..3 * i + 3]);
    }
}

/// Half-extents of the containment box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub max_x: f32,
    pub max_y: f32,
    pub max_z: f32,
}

/// The point sphere 0 eases toward, and whether it is currently steered.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlTarget {
    pub center: Vec3,
    pub active: bool,
}

/// Per-step coefficients copied out of the configuration at construction.
#[derive(Clone, Copy, Debug)]
struct Coefficients {
    gravity: f32,
    friction: f32,
    wall_bounce: f32,
    max_velocity: f32,
    max_size: f32,
}

pub struct PhysicsEngine {
    pool: SpherePool,
    bounds: Bounds,
    coeffs: Coefficients,
    center: Vec3,
    control: bool,
}

// JS `Math.sign`: zero stays zero.
#[inline]
fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl PhysicsEngine {
    /// Build a pool from a validated configuration.
    ///
    /// Sphere 0 starts at the origin with the primary size; every other
    /// sphere is scattered uniformly through the box with a radius drawn
    /// from `[min_size, max_size)`.
    pub fn new<R: Rng>(config: &SimulationConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;
        let count = config.count;
        let mut pool = SpherePool::zeroed(count);
        let spread = |rng: &mut R, half: f32| {
            if half > 0.0 {
                rng.gen_range(-half..half)
            } else {
                0.0
            }
        };
        for i in 1..count {
            let p = Vec3::new(
                spread(rng, config.max_x),
                spread(rng, config.max_y),
                spread(rng, config.max_z),
            );
            pool.set_position(i, p);
        }
        pool.size[0] = config.size0;
        for i in 1..count {
            pool.size[i] = if config.max_size > config.min_size {
                rng.gen_range(config.min_size..config.max_size)
            } else {
                config.min_size
            };
        }
        Ok(Self {
            pool,
            bounds: Bounds {
                max_x: config.max_x,
                max_y: config.max_y,
                max_z: config.max_z,
            },
            coeffs: Coefficients {
                gravity: config.gravity,
                friction: config.friction,
                wall_bounce: config.wall_bounce,
                max_velocity: config.max_velocity,
                max_size: config.max_size,
            },
            center: Vec3::ZERO,
            control: config.control_sphere0,
        })
    }

    pub fn pool(&self) -> &SpherePool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut SpherePool {
        &mut self.pool
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    pub fn control_enabled(&self) -> bool {
        self.control
    }

    pub fn set_control_enabled(&mut self, enabled: bool) {
        self.control = enabled;
    }

    /// Apply a pointer-derived target; the center is only moved when active.
    pub fn apply_target(&mut self, target: ControlTarget) {
        if target.active {
            self.center = target.center;
        }
        self.control = target.active;
    }

    #[inline]
    fn first_free(&self) -> usize {
        if self.control {
            1
        } else {
            0
        }
    }

    /// Advance one frame. Passes run in a fixed order, each reading the state
    /// left by the previous one.
    pub fn step(&mut self, delta: f32) {
        self.ease_control_sphere();
        self.integrate(delta);
        self.resolve_pairs();
        self.resolve_control_contacts();
        self.contain();
    }

    /// Ease sphere 0 toward the target center and zero its velocity.
    pub fn ease_control_sphere(&mut self) {
        if !self.control || self.pool.count() == 0 {
            return;
        }
        let p = self.pool.position(0).lerp(self.center, CONTROL_EASING);
        self.pool.set_position(0, p);
        self.pool.set_velocity(0, Vec3::ZERO);
    }

    /// Gravity (scaled by radius), friction, velocity clamp, then Euler step.
    pub fn integrate(&mut self, delta: f32) {
        let c = self.coeffs;
        for i in self.first_free()..self.pool.count() {
            let mut v = self.pool.velocity(i);
            v.y -= delta * c.gravity * self.pool.size(i);
            v *= c.friction;
            v = v.clamp_length_max(c.max_velocity);
            let p = self.pool.position(i) + v;
            self.pool.set_position(i, p);
            self.pool.set_velocity(i, v);
        }
    }

    /// Push overlapping pairs apart, half the overlap each.
    ///
    /// Each sphere's impulse is scaled by the other sphere's incoming speed,
    /// floored at [`PAIR_SPEED_FLOOR`].
    pub fn resolve_pairs(&mut self) {
        let n = self.pool.count();
        for i in self.first_free()..n {
            let radius = self.pool.size(i);
            for j in (i + 1)..n {
                let pi = self.pool.position(i);
                let pj = self.pool.position(j);
                let diff = pj - pi;
                let dist = diff.length();
                let sum = radius + self.pool.size(j);
                if dist >= sum {
                    continue;
                }
                let push = diff.normalize_or_zero() * (0.5 * (sum - dist));
                let vi = self.pool.velocity(i);
                let vj = self.pool.velocity(j);
                let speed_i = vi.length().max(PAIR_SPEED_FLOOR);
                let speed_j = vj.length().max(PAIR_SPEED_FLOOR);
                self.pool.set_position(i, pi - push);
                self.pool.set_velocity(i, vi - push * speed_j);
                self.pool.set_position(j, pj + push);
                self.pool.set_velocity(j, vj + push * speed_i);
            }
        }
    }

    /// Push ordinary spheres out of the control sphere. Sphere 0 does not recoil.
    pub fn resolve_control_contacts(&mut self) {
        if !self.control || self.pool.count() == 0 {
            return;
        }
        let p0 = self.pool.position(0);
        let r0 = self.pool.size(0);
        let speed0 = self.pool.velocity(0).length().max(CONTROL_SPEED_FLOOR);
        for i in 1..self.pool.count() {
            let pi = self.pool.position(i);
            let diff = p0 - pi;
            let dist = diff.length();
            let sum = self.pool.size(i) + r0;
            if dist >= sum {
                continue;
            }
            let push = diff.normalize_or_zero() * (sum - dist);
            let vi = self.pool.velocity(i);
            self.pool.set_position(i, pi - push);
            self.pool.set_velocity(i, vi - push * speed0);
        }
    }

    /// Clamp every free sphere into the box, reflecting the clamped axis.
    ///
    /// With gravity the box has a floor but no ceiling. The z wall sits at
    /// `max(max_z, max_size)` so the thinnest boxes still fit the largest sphere.
    /// A sphere wider than its box is centered on that axis.
    pub fn contain(&mut self) {
        let c = self.coeffs;
        let b = self.bounds;
        let z_wall = b.max_z.max(c.max_size);
        for i in self.first_free()..self.pool.count() {
            let r = self.pool.size(i);
            let mut p = self.pool.position(i);
            let mut v = self.pool.velocity(i);

            if p.x.abs() + r > b.max_x {
                p.x = sign(p.x) * (b.max_x - r).max(0.0);
                v.x = -v.x * c.wall_bounce;
            }

            if c.gravity == 0.0 {
                if p.y.abs() + r > b.max_y {
                    p.y = sign(p.y) * (b.max_y - r).max(0.0);
                    v.y = -v.y * c.wall_bounce;
                }
            } else if p.y - r < -b.max_y {
                p.y = -b.max_y + r;
                v.y = -v.y * c.wall_bounce;
            }

            if p.z.abs() + r > z_wall {
                p.z = sign(p.z) * (b.max_z - r).max(0.0);
                v.z = -v.z * c.wall_bounce;
            }

            self.pool.set_position(i, p);
            self.pool.set_velocity(i, v);
        }
    }
}
