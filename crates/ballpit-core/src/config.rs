//! Construction parameters for the sphere simulation and its viewport.
//!
//! Field names follow the camelCase keys accepted from JavaScript, and every
//! field has a default so a partial object (or `{}`) is a valid configuration.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sphere count must be at least 1")]
    ZeroCount,
    #[error("size range must satisfy 0 < minSize <= maxSize (got {min}..{max})")]
    InvalidSizeRange { min: f32, max: f32 },
    #[error("primary sphere size must be positive (got {0})")]
    InvalidPrimarySize(f32),
    #[error("maxVelocity must be positive (got {0})")]
    InvalidMaxVelocity(f32),
    #[error("{name} must not be negative (got {value})")]
    Negative { name: &'static str, value: f32 },
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),
    #[error("{name} clamp is inverted (min {min} > max {max})")]
    InvertedClamp {
        name: &'static str,
        min: f32,
        max: f32,
    },
}

/// Surface response parameters of the shared sphere material.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialParams {
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    /// Base color, used unmodified when fewer than two ramp colors are configured.
    pub color: u32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            metalness: 0.5,
            roughness: 0.5,
            clearcoat: 1.0,
            clearcoat_roughness: 0.15,
            color: 0xffffff,
        }
    }
}

/// Coefficients of the forward-scattering shading stage.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ScatteringParams {
    pub enabled: bool,
    pub distortion: f32,
    pub ambient: f32,
    pub attenuation: f32,
    pub power: f32,
    pub scale: f32,
}

impl Default for ScatteringParams {
    fn default() -> Self {
        Self {
            enabled: true,
            distortion: 0.1,
            ambient: 0.0,
            attenuation: 0.1,
            power: 2.0,
            scale: 10.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    pub count: usize,
    pub colors: Vec<u32>,
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    pub light_intensity: f32,
    #[serde(rename = "materialParams")]
    pub material: MaterialParams,
    pub scattering: ScatteringParams,
    pub min_size: f32,
    pub max_size: f32,
    pub size0: f32,
    pub gravity: f32,
    pub friction: f32,
    pub wall_bounce: f32,
    pub max_velocity: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub max_z: f32,
    /// Replace `max_x`/`max_y` with half the world-space viewport on every resize.
    pub fit_viewport: bool,
    pub control_sphere0: bool,
    pub follow_cursor: bool,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            count: 200,
            colors: vec![0x000000, 0x000000, 0x000000],
            ambient_color: 0xffffff,
            ambient_intensity: 1.0,
            light_intensity: 200.0,
            material: MaterialParams::default(),
            scattering: ScatteringParams::default(),
            min_size: 0.5,
            max_size: 1.0,
            size0: 1.0,
            gravity: 0.5,
            friction: 0.9975,
            wall_bounce: 0.95,
            max_velocity: 0.15,
            max_x: 5.0,
            max_y: 5.0,
            max_z: 2.0,
            fit_viewport: true,
            control_sphere0: false,
            follow_cursor: true,
            seed: None,
        }
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite(name))
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { name, value });
    }
    Ok(())
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::ZeroCount);
        }
        finite("minSize", self.min_size)?;
        finite("maxSize", self.max_size)?;
        if self.min_size <= 0.0 || self.max_size < self.min_size {
            return Err(ConfigError::InvalidSizeRange {
                min: self.min_size,
                max: self.max_size,
            });
        }
        finite("size0", self.size0)?;
        if self.size0 <= 0.0 {
            return Err(ConfigError::InvalidPrimarySize(self.size0));
        }
        finite("maxVelocity", self.max_velocity)?;
        if self.max_velocity <= 0.0 {
            return Err(ConfigError::InvalidMaxVelocity(self.max_velocity));
        }
        finite("gravity", self.gravity)?;
        non_negative("friction", self.friction)?;
        non_negative("wallBounce", self.wall_bounce)?;
        non_negative("maxX", self.max_x)?;
        non_negative("maxY", self.max_y)?;
        non_negative("maxZ", self.max_z)?;
        non_negative("ambientIntensity", self.ambient_intensity)?;
        non_negative("lightIntensity", self.light_intensity)?;
        let m = &self.material;
        non_negative("materialParams.metalness", m.metalness)?;
        non_negative("materialParams.roughness", m.roughness)?;
        non_negative("materialParams.clearcoat", m.clearcoat)?;
        non_negative("materialParams.clearcoatRoughness", m.clearcoat_roughness)?;
        let s = &self.scattering;
        finite("scattering.distortion", s.distortion)?;
        finite("scattering.ambient", s.ambient)?;
        finite("scattering.attenuation", s.attenuation)?;
        finite("scattering.power", s.power)?;
        finite("scattering.scale", s.scale)?;
        Ok(())
    }
}

/// How the drawing surface derives its CSS size.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(from = "SizingRepr")]
pub enum SizingMode {
    Explicit {
        width: f64,
        height: f64,
    },
    #[default]
    Parent,
    Window,
}

// Accepts `"parent"`, `"window"` or `{ width, height }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SizingRepr {
    Named(NamedSizing),
    Explicit { width: f64, height: f64 },
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum NamedSizing {
    Parent,
    Window,
}

impl From<SizingRepr> for SizingMode {
    fn from(repr: SizingRepr) -> Self {
        match repr {
            SizingRepr::Named(NamedSizing::Parent) => SizingMode::Parent,
            SizingRepr::Named(NamedSizing::Window) => SizingMode::Window,
            SizingRepr::Explicit { width, height } => SizingMode::Explicit { width, height },
        }
    }
}

impl SizingMode {
    /// CSS size for this mode given the window and (optional) parent sizes.
    ///
    /// Parent mode falls back to the window when the surface has no parent.
    pub fn resolve(&self, window: (f64, f64), parent: Option<(f64, f64)>) -> (f64, f64) {
        match *self {
            SizingMode::Explicit { width, height } => (width, height),
            SizingMode::Window => window,
            SizingMode::Parent => parent.unwrap_or(window),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
    pub size: SizingMode,
    pub min_pixel_ratio: Option<f32>,
    pub max_pixel_ratio: Option<f32>,
    pub min_aspect: Option<f32>,
    pub max_aspect: Option<f32>,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub camera_z: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            size: SizingMode::Parent,
            min_pixel_ratio: None,
            max_pixel_ratio: None,
            min_aspect: None,
            max_aspect: Some(1.5),
            fov: 50.0,
            camera_z: 20.0,
        }
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("fov", self.fov)?;
        finite("cameraZ", self.camera_z)?;
        if let (Some(min), Some(max)) = (self.min_pixel_ratio, self.max_pixel_ratio) {
            if min > max {
                return Err(ConfigError::InvertedClamp {
                    name: "pixelRatio",
                    min,
                    max,
                });
            }
        }
        if let (Some(min), Some(max)) = (self.min_aspect, self.max_aspect) {
            if min > max {
                return Err(ConfigError::InvertedClamp {
                    name: "aspect",
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// Everything a mount call accepts, as one flat JavaScript object.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct BallpitConfig {
    #[serde(flatten)]
    pub simulation: SimulationConfig,
    #[serde(flatten)]
    pub viewport: ViewportConfig,
}

impl BallpitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        self.viewport.validate()
    }
}
