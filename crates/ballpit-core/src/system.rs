//! Sphere system: physics plus everything the renderer derives from it.

use crate::color::{Color, ColorRamp};
use crate::config::{ConfigError, SimulationConfig};
use crate::physics::{Bounds, ControlTarget, PhysicsEngine};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Per-instance record uploaded to the instance vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SphereInstance {
    /// xyz translation, w uniform scale.
    pub position_scale: [f32; 4],
    pub color: [f32; 4],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lights {
    pub ambient: Color,
    pub ambient_intensity: f32,
    pub point: PointLight,
}

pub struct SphereSystem {
    config: SimulationConfig,
    physics: PhysicsEngine,
    ramp: Option<ColorRamp>,
    instances: Vec<SphereInstance>,
    lights: Lights,
    rng: StdRng,
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

impl SphereSystem {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let mut rng = make_rng(config.seed);
        let physics = PhysicsEngine::new(&config, &mut rng)?;
        let mut system = Self {
            lights: Lights {
                ambient: Color::from_hex(config.ambient_color),
                ambient_intensity: config.ambient_intensity,
                point: PointLight {
                    position: Vec3::ZERO,
                    color: Color::WHITE,
                    intensity: config.light_intensity,
                },
            },
            ramp: None,
            instances: Vec::new(),
            physics,
            config,
            rng,
        };
        system.assign_colors();
        system.refresh_instances();
        Ok(system)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn physics(&self) -> &PhysicsEngine {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsEngine {
        &mut self.physics
    }

    pub fn count(&self) -> usize {
        self.physics.pool().count()
    }

    pub fn instances(&self) -> &[SphereInstance] {
        &self.instances
    }

    pub fn lights(&self) -> &Lights {
        &self.lights
    }

    pub fn ramp(&self) -> Option<&ColorRamp> {
        self.ramp.as_ref()
    }

    /// Whether instances carry ramp colors (two or more configured colors).
    pub fn uses_instance_colors(&self) -> bool {
        self.ramp.is_some()
    }

    /// One simulation step followed by instance and light derivation.
    pub fn update(&mut self, delta: f32) {
        self.physics.step(delta);
        self.refresh_instances();
    }

    pub fn apply_target(&mut self, target: ControlTarget) {
        self.physics.apply_target(target);
        self.config.control_sphere0 = target.active;
    }

    /// Track the viewport's world size when `fit_viewport` is set.
    pub fn set_bounds_from_viewport(&mut self, world_width: f32, world_height: f32) {
        if !self.config.fit_viewport {
            return;
        }
        self.config.max_x = world_width / 2.0;
        self.config.max_y = world_height / 2.0;
        self.physics.set_bounds(Bounds {
            max_x: self.config.max_x,
            max_y: self.config.max_y,
            max_z: self.config.max_z,
        });
    }

    /// Rebuild the pool with `count` spheres, keeping the current bounds,
    /// control state and target.
    pub fn set_count(&mut self, count: usize) -> Result<(), ConfigError> {
        let mut next = self.config.clone();
        next.count = count;
        next.control_sphere0 = self.physics.control_enabled();
        let mut physics = PhysicsEngine::new(&next, &mut self.rng)?;
        physics.set_center(self.physics.center());
        self.physics = physics;
        self.config = next;
        self.assign_colors();
        self.refresh_instances();
        log::info!("[spheres] pool rebuilt with {} spheres", count);
        Ok(())
    }

    fn assign_colors(&mut self) {
        let count = self.count();
        self.ramp = ColorRamp::from_hex(&self.config.colors);
        self.instances = vec![SphereInstance::default(); count];
        match &self.ramp {
            Some(ramp) => {
                for (i, inst) in self.instances.iter_mut().enumerate() {
                    inst.color = ramp.color_at(i as f32 / count as f32).to_array4(1.0);
                }
                self.lights.point.color = ramp.color_at(0.0);
            }
            None => {
                for inst in &mut self.instances {
                    inst.color = Color::WHITE.to_array4(1.0);
                }
                self.lights.point.color = self
                    .config
                    .colors
                    .first()
                    .map_or(Color::WHITE, |&hex| Color::from_hex(hex));
            }
        }
    }

    fn refresh_instances(&mut self) {
        let pool = self.physics.pool();
        for (i, inst) in self.instances.iter_mut().enumerate() {
            let p = pool.position(i);
            let scale = if i == 0 && !self.config.follow_cursor {
                0.0
            } else {
                pool.size(i)
            };
            inst.position_scale = p.extend(scale).to_array();
        }
        if pool.count() > 0 {
            self.lights.point.position = pool.position(0);
        }
    }
}
