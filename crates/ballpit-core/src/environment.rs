//! Synthetic room used as the reflection environment.
//!
//! The room is a closed box seen from its center: mid-gray walls, a darker
//! floor and a handful of emissive panels that give the clearcoat something
//! bright to reflect. Radiance is baked into a cube map with a box-filtered
//! mip chain; rougher surfaces sample blurrier levels.

use glam::Vec3;

/// Radiance that maps to 1.0 in the stored 8-bit texels.
pub const ENV_RANGE: f32 = 4.0;

pub const FACE_COUNT: usize = 6;

const WALL: f32 = 0.5;
const FLOOR: f32 = 0.22;
const CEILING: f32 = 0.65;

// (face normal, panel center on that face, half extents, radiance)
const PANELS: [(Vec3, [f32; 2], [f32; 2], f32); 5] = [
    (Vec3::Y, [0.0, 0.0], [0.45, 0.45], 4.0),
    (Vec3::NEG_X, [0.1, 0.25], [0.35, 0.2], 3.0),
    (Vec3::X, [-0.2, 0.35], [0.25, 0.15], 2.5),
    (Vec3::NEG_Z, [0.0, 0.45], [0.6, 0.1], 2.0),
    (Vec3::Z, [0.3, 0.2], [0.2, 0.3], 1.5),
];

/// Direction through texel coordinate `(u, v)` in `[-1, 1]` of cube face
/// `face` (order +X, -X, +Y, -Y, +Z, -Z; v grows downward).
pub fn face_direction(face: usize, u: f32, v: f32) -> Vec3 {
    let d = match face {
        0 => Vec3::new(1.0, -v, -u),
        1 => Vec3::new(-1.0, -v, u),
        2 => Vec3::new(u, 1.0, v),
        3 => Vec3::new(u, -1.0, -v),
        4 => Vec3::new(u, -v, 1.0),
        _ => Vec3::new(-u, -v, -1.0),
    };
    d.normalize()
}

// Coordinates of `p` (on the unit cube) within the face whose normal is `n`.
fn on_face(p: Vec3, n: Vec3) -> Option<[f32; 2]> {
    if p.dot(n) < 0.999 {
        return None;
    }
    Some(if n.x != 0.0 {
        [p.z, p.y]
    } else if n.y != 0.0 {
        [p.x, p.z]
    } else {
        [p.x, p.y]
    })
}

/// Gray-level radiance seen along `dir`.
pub fn room_radiance(dir: Vec3) -> f32 {
    let d = dir.normalize_or_zero();
    let m = d.abs().max_element();
    if m == 0.0 {
        return WALL;
    }
    let p = d / m;
    for (normal, center, half, radiance) in PANELS {
        if let Some([a, b]) = on_face(p, normal) {
            if (a - center[0]).abs() <= half[0] && (b - center[1]).abs() <= half[1] {
                return radiance;
            }
        }
    }
    if p.y <= -0.999 {
        FLOOR
    } else if p.y >= 0.999 {
        CEILING
    } else {
        WALL
    }
}

#[derive(Clone, Debug)]
pub struct EnvLevel {
    pub size: u32,
    /// One buffer per face, `size * size` linear radiance values.
    faces: [Vec<f32>; FACE_COUNT],
}

impl EnvLevel {
    pub fn radiance(&self, face: usize) -> &[f32] {
        &self.faces[face]
    }

    /// RGBA8 texels for one face, radiance scaled by `1 / ENV_RANGE`.
    pub fn face_rgba8(&self, face: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.faces[face].len() * 4);
        for &r in &self.faces[face] {
            let q = ((r / ENV_RANGE).clamp(0.0, 1.0) * 255.0).round() as u8;
            out.extend_from_slice(&[q, q, q, 255]);
        }
        out
    }

    fn downsample(&self) -> EnvLevel {
        let size = (self.size / 2).max(1);
        let src = self.size as usize;
        let faces = std::array::from_fn(|f| {
            let face = &self.faces[f];
            let mut out = vec![0.0; (size * size) as usize];
            for y in 0..size as usize {
                for x in 0..size as usize {
                    let (x0, y0) = ((2 * x).min(src - 1), (2 * y).min(src - 1));
                    let (x1, y1) = ((x0 + 1).min(src - 1), (y0 + 1).min(src - 1));
                    out[y * size as usize + x] = 0.25
                        * (face[y0 * src + x0]
                            + face[y0 * src + x1]
                            + face[y1 * src + x0]
                            + face[y1 * src + x1]);
                }
            }
            out
        });
        EnvLevel { size, faces }
    }
}

/// Baked room cube map with its mip chain (level 0 first).
#[derive(Clone, Debug)]
pub struct RoomEnvironment {
    levels: Vec<EnvLevel>,
}

impl RoomEnvironment {
    pub fn generate(face_size: u32) -> Self {
        let size = face_size.max(1);
        let faces = std::array::from_fn(|f| {
            let mut out = Vec::with_capacity((size * size) as usize);
            for y in 0..size {
                for x in 0..size {
                    let u = 2.0 * (x as f32 + 0.5) / size as f32 - 1.0;
                    let v = 2.0 * (y as f32 + 0.5) / size as f32 - 1.0;
                    out.push(room_radiance(face_direction(f, u, v)));
                }
            }
            out
        });
        let mut levels = vec![EnvLevel { size, faces }];
        while let Some(last) = levels.last() {
            if last.size == 1 {
                break;
            }
            let next = last.downsample();
            levels.push(next);
        }
        log::debug!(
            "[environment] baked {}px room, {} mip levels",
            size,
            levels.len()
        );
        Self { levels }
    }

    pub fn face_size(&self) -> u32 {
        self.levels[0].size
    }

    pub fn mip_count(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn levels(&self) -> &[EnvLevel] {
        &self.levels
    }
}
