//! Shading model of the sphere material.
//!
//! The material is a fixed sequence of stages. Forward scattering is the
//! only optional one; whether it is present decides which fragment entry
//! point of `spheres.wgsl` the pipeline is built with.

use crate::camera::Camera;
use crate::config::{MaterialParams, ScatteringParams};
use crate::system::Lights;
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use smallvec::SmallVec;

pub const FS_PHYSICAL: &str = "fs_physical";
pub const FS_PHYSICAL_SCATTERING: &str = "fs_physical_scattering";

/// Rotation applied to reflection lookups so the room's ceiling panel sits
/// behind the camera.
pub const ENV_ROTATION_X: f32 = -std::f32::consts::FRAC_PI_2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShadingStage {
    /// GGX specular plus Lambert diffuse from the point light.
    DirectPhysical,
    /// Secondary diffuse lobe through a distorted half vector.
    Scattering(ScatteringParams),
    Clearcoat,
    /// Ambient light plus the environment map (diffuse and specular).
    IndirectEnvironment,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShadingPipeline {
    stages: SmallVec<[ShadingStage; 4]>,
}

impl ShadingPipeline {
    /// Build the stage list for a physical material.
    ///
    /// Order is fixed: direct, optional scattering, clearcoat, indirect.
    pub fn physical(material: &MaterialParams, scattering: &ScatteringParams) -> Self {
        let mut stages = SmallVec::new();
        stages.push(ShadingStage::DirectPhysical);
        if scattering.enabled {
            stages.push(ShadingStage::Scattering(*scattering));
        }
        if material.clearcoat > 0.0 {
            stages.push(ShadingStage::Clearcoat);
        }
        stages.push(ShadingStage::IndirectEnvironment);
        Self { stages }
    }

    pub fn stages(&self) -> &[ShadingStage] {
        &self.stages
    }

    pub fn scattering(&self) -> Option<ScatteringParams> {
        self.stages.iter().find_map(|s| match s {
            ShadingStage::Scattering(p) => Some(*p),
            _ => None,
        })
    }

    pub fn has_clearcoat(&self) -> bool {
        self.stages.contains(&ShadingStage::Clearcoat)
    }

    pub fn fragment_entry(&self) -> &'static str {
        if self.scattering().is_some() {
            FS_PHYSICAL_SCATTERING
        } else {
            FS_PHYSICAL
        }
    }
}

/// Forward-scattering factor for one light, before the surface and light
/// colors are applied. Mirrors `scattering_term` in `spheres.wgsl`.
///
/// `light_dir` points from the surface toward the light and `view_dir`
/// from the surface toward the eye.
pub fn scattering_intensity(
    light_dir: Vec3,
    normal: Vec3,
    view_dir: Vec3,
    p: &ScatteringParams,
) -> f32 {
    let half = (light_dir + normal * p.distortion).normalize_or_zero();
    let dot = view_dir.dot(-half).clamp(0.0, 1.0).powf(p.power) * p.scale;
    (dot + p.ambient) * p.attenuation
}

/// ACES filmic curve fit, identical to `tone_map` in `spheres.wgsl`.
pub fn aces_filmic(color: Vec3, exposure: f32) -> Vec3 {
    let input = Mat3::from_cols(
        Vec3::new(0.59719, 0.07600, 0.02840),
        Vec3::new(0.35458, 0.90834, 0.13383),
        Vec3::new(0.04823, 0.01566, 0.83777),
    );
    let output = Mat3::from_cols(
        Vec3::new(1.60475, -0.10208, -0.00327),
        Vec3::new(-0.53108, 1.10813, -0.07276),
        Vec3::new(-0.07367, -0.00605, 1.07602),
    );
    let v = input * (color * exposure / 0.6);
    let a = v * (v + 0.0245786) - 0.000090537;
    let b = v * (0.983729 * v + 0.4329510) + 0.238081;
    (output * (a / b)).clamp(Vec3::ZERO, Vec3::ONE)
}

/// Uniform block shared by both fragment entry points.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub env_rotation: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    /// Ambient color premultiplied by its intensity.
    pub ambient: [f32; 4],
    /// xyz position, w intensity.
    pub light_pos: [f32; 4],
    pub light_color: [f32; 4],
    /// rgb material color, w = 1 when instances carry ramp colors.
    pub base_color: [f32; 4],
    /// metalness, roughness, clearcoat, clearcoat roughness.
    pub material: [f32; 4],
    /// distortion, ambient, attenuation, power.
    pub scattering: [f32; 4],
    /// scattering scale, highest env mip, env range, exposure.
    pub extra: [f32; 4],
}

pub struct UniformInputs<'a> {
    pub camera: &'a Camera,
    pub lights: &'a Lights,
    pub material: &'a MaterialParams,
    pub pipeline: &'a ShadingPipeline,
    pub instance_colors: bool,
    pub env_mip_count: u32,
}

impl SceneUniforms {
    pub fn compose(inputs: &UniformInputs<'_>) -> Self {
        let UniformInputs {
            camera,
            lights,
            material,
            pipeline,
            instance_colors,
            env_mip_count,
        } = *inputs;
        let scattering = pipeline.scattering().unwrap_or(ScatteringParams {
            enabled: false,
            ..ScatteringParams::default()
        });
        let clearcoat = if pipeline.has_clearcoat() {
            material.clearcoat
        } else {
            0.0
        };
        let base = crate::color::Color::from_hex(material.color);
        let ambient = lights.ambient.scaled(lights.ambient_intensity);
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            env_rotation: Mat4::from_rotation_x(ENV_ROTATION_X).to_cols_array_2d(),
            camera_pos: camera.eye.extend(1.0).to_array(),
            ambient: ambient.to_array4(1.0),
            light_pos: lights.point.position.extend(lights.point.intensity).to_array(),
            light_color: lights.point.color.to_array4(1.0),
            base_color: base.to_array4(if instance_colors { 1.0 } else { 0.0 }),
            material: [
                material.metalness,
                material.roughness,
                clearcoat,
                material.clearcoat_roughness,
            ],
            scattering: [
                scattering.distortion,
                scattering.ambient,
                scattering.attenuation,
                scattering.power,
            ],
            extra: [
                scattering.scale,
                env_mip_count.saturating_sub(1) as f32,
                crate::environment::ENV_RANGE,
                1.0,
            ],
        }
    }
}
