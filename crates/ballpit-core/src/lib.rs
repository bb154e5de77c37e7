pub mod camera;
pub mod clock;
pub mod color;
pub mod config;
pub mod environment;
pub mod geometry;
pub mod lifecycle;
pub mod material;
pub mod physics;
pub mod pointer;
pub mod system;

pub static SPHERES_WGSL: &str = include_str!("../shaders/spheres.wgsl");

pub use camera::*;
pub use clock::*;
pub use color::*;
pub use config::*;
pub use environment::RoomEnvironment;
pub use geometry::{default_sphere, sphere_mesh, Mesh, Vertex};
pub use lifecycle::*;
pub use material::*;
pub use physics::*;
pub use pointer::*;
pub use system::*;
