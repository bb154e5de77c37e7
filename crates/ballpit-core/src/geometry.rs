//! Unit UV sphere shared by every instance.

use bytemuck::{Pod, Zeroable};
use std::f32::consts::PI;

pub const SPHERE_WIDTH_SEGMENTS: u32 = 32;
pub const SPHERE_HEIGHT_SEGMENTS: u32 = 16;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Build a radius-1 sphere with `(width + 1) * (height + 1)` vertices.
///
/// Rows run from the north pole (+Y) to the south pole. The degenerate
/// triangles at both poles are skipped, and faces wind counter-clockwise
/// when seen from outside.
pub fn sphere_mesh(width_segments: u32, height_segments: u32) -> Mesh {
    let w = width_segments.max(3);
    let h = height_segments.max(2);
    let mut vertices = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
    for iy in 0..=h {
        let theta = iy as f32 / h as f32 * PI;
        for ix in 0..=w {
            let phi = ix as f32 / w as f32 * 2.0 * PI;
            let p = [
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            ];
            vertices.push(Vertex {
                position: p,
                normal: p,
            });
        }
    }

    let stride = (w + 1) as u16;
    let at = |iy: u32, ix: u32| iy as u16 * stride + ix as u16;
    let mut indices = Vec::with_capacity((6 * w * (h - 1)) as usize);
    for iy in 0..h {
        for ix in 0..w {
            let a = at(iy, ix + 1);
            let b = at(iy, ix);
            let c = at(iy + 1, ix);
            let d = at(iy + 1, ix + 1);
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    Mesh { vertices, indices }
}

pub fn default_sphere() -> Mesh {
    sphere_mesh(SPHERE_WIDTH_SEGMENTS, SPHERE_HEIGHT_SEGMENTS)
}
