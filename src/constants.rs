// Front-end tuning constants.
// Kept free of web and GPU types so host tests can include this file.

// Window and container resize events collapse into one recomputation
pub const RESIZE_DEBOUNCE_MS: i32 = 100;

// Attribute that tags a canvas with its pointer-registry key
pub const SURFACE_ATTR: &str = "data-ballpit-surface";

// Face size (texels) of the baked room environment
pub const ENV_FACE_SIZE: u32 = 64;

// Point the camera looks at
pub const CAMERA_TARGET: [f32; 3] = [0.0, 0.0, 0.0];

// Canvas clear color (premultiplied, fully transparent)
pub const CLEAR_RGBA: [f64; 4] = [0.0, 0.0, 0.0, 0.0];

// Pointer rays hit the plane through the origin facing the camera
pub const POINTER_PLANE_CONSTANT: f32 = 0.0;

// Frames kept in flight by the surface
pub const MAX_FRAME_LATENCY: u32 = 2;
