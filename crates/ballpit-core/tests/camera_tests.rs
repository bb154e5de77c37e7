// Host-side tests for camera framing, pointer rays and viewport measurement.

use ballpit_core::{clamp_pixel_ratio, Camera, SizingMode, ViewportConfig, ViewportState};
use glam::{Vec2, Vec3};

fn camera() -> Camera {
    Camera::new(50.0, Vec3::new(0.0, 0.0, 20.0))
}

fn horizontal_fov(c: &Camera) -> f32 {
    2.0 * ((c.fov.to_radians() / 2.0).tan() * c.aspect).atan()
}

#[test]
fn fov_is_untouched_inside_the_aspect_band() {
    let mut c = camera();
    c.set_aspect(1.2, None, Some(1.5));
    assert_eq!(c.fov, 50.0);
}

#[test]
fn wide_aspect_keeps_band_edge_horizontal_framing() {
    let mut edge = camera();
    edge.set_aspect(1.5, None, Some(1.5));
    let mut wide = camera();
    wide.set_aspect(3.0, None, Some(1.5));
    assert!(wide.fov < 50.0);
    assert!((horizontal_fov(&wide) - horizontal_fov(&edge)).abs() < 1e-4);
}

#[test]
fn narrow_aspect_below_min_widens_the_fov() {
    let mut c = camera();
    c.set_aspect(0.25, Some(0.5), None);
    assert!(c.fov > 50.0);
}

#[test]
fn world_size_matches_frustum_at_eye_distance() {
    let mut c = camera();
    c.set_aspect(1.0, None, None);
    let size = c.world_size();
    let expected = 2.0 * 25.0_f32.to_radians().tan() * 20.0;
    assert!((size.y - expected).abs() < 1e-4);
    assert!((size.x - expected).abs() < 1e-4);
}

#[test]
fn center_ray_hits_the_origin_plane_at_origin() {
    let mut c = camera();
    c.set_aspect(1.5, None, Some(1.5));
    let ray = c.ray_from_ndc(Vec2::ZERO);
    let hit = ray.intersect_plane(c.forward(), 0.0).expect("hit");
    assert!(hit.length() < 1e-3, "hit {hit:?}");
}

#[test]
fn edge_ray_hits_the_plane_at_half_world_width() {
    let mut c = camera();
    c.set_aspect(1.5, None, Some(1.5));
    let half = c.world_size() / 2.0;
    let hit = c
        .ray_from_ndc(Vec2::new(1.0, -1.0))
        .intersect_plane(c.forward(), 0.0)
        .expect("hit");
    assert!((hit.x - half.x).abs() < 1e-2, "hit {hit:?}");
    assert!((hit.y + half.y).abs() < 1e-2, "hit {hit:?}");
    assert!(hit.z.abs() < 1e-3);
}

#[test]
fn parallel_ray_misses() {
    let c = camera();
    let mut ray = c.ray_from_ndc(Vec2::ZERO);
    ray.direction = Vec3::X;
    assert!(ray.intersect_plane(c.forward(), 0.0).is_none());
}

#[test]
fn pixel_ratio_clamps_to_band() {
    assert_eq!(clamp_pixel_ratio(3.0, Some(1.0), Some(2.0)), 2.0);
    assert_eq!(clamp_pixel_ratio(0.5, Some(1.0), Some(2.0)), 1.0);
    assert_eq!(clamp_pixel_ratio(1.5, None, None), 1.5);
}

#[test]
fn measure_guards_zero_height() {
    let mut c = camera();
    let state = ViewportState::measure(&mut c, 300.0, 0.0, 2.0, &ViewportConfig::default());
    assert_eq!(state.height, 1.0);
    assert!(state.aspect.is_finite());
    let (w, h) = state.physical_size();
    assert_eq!((w, h), (600, 2));
}

#[test]
fn measure_reports_world_extent() {
    let mut c = camera();
    let opts = ViewportConfig::default();
    let state = ViewportState::measure(&mut c, 800.0, 800.0, 1.0, &opts);
    assert_eq!(state.aspect, 1.0);
    assert!((state.world_height - c.world_size().y).abs() < 1e-6);
    assert_eq!(state.physical_size(), (800, 800));
}

#[test]
fn sizing_modes_resolve() {
    let window = (1024.0, 768.0);
    assert_eq!(SizingMode::Window.resolve(window, Some((10.0, 10.0))), window);
    assert_eq!(SizingMode::Parent.resolve(window, Some((10.0, 20.0))), (10.0, 20.0));
    assert_eq!(SizingMode::Parent.resolve(window, None), window);
    let explicit = SizingMode::Explicit {
        width: 50.0,
        height: 40.0,
    };
    assert_eq!(explicit.resolve(window, None), (50.0, 40.0));
}
