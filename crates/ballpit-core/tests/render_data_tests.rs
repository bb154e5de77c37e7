// Host-side tests for the sphere mesh, room environment and shading stages.

use ballpit_core::environment::{face_direction, room_radiance, FACE_COUNT};
use ballpit_core::*;
use glam::Vec3;

#[test]
fn default_sphere_has_expected_topology() {
    let mesh = default_sphere();
    assert_eq!(mesh.vertices.len(), 561);
    assert_eq!(mesh.indices.len(), 2880);
    assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    assert_eq!(mesh.vertices[0].position, [0.0, 1.0, 0.0]);
    for v in &mesh.vertices {
        let n = Vec3::from_array(v.normal);
        assert!((n.length() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn sphere_faces_wind_outward() {
    let mesh = sphere_mesh(12, 6);
    for tri in mesh.indices.chunks(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]]
            .map(|i| Vec3::from_array(mesh.vertices[i as usize].position));
        let normal = (b - a).cross(c - a);
        let centroid = (a + b + c) / 3.0;
        assert!(normal.dot(centroid) > 0.0);
    }
}

#[test]
fn cube_faces_point_along_their_axes() {
    let axes = [
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::Z,
        Vec3::NEG_Z,
    ];
    for (face, axis) in axes.iter().enumerate() {
        assert!((face_direction(face, 0.0, 0.0) - *axis).length() < 1e-6);
    }
}

#[test]
fn room_has_bright_ceiling_and_dark_floor() {
    assert!(room_radiance(Vec3::Y) > 2.0);
    assert!(room_radiance(Vec3::NEG_Y) < room_radiance(Vec3::X.lerp(Vec3::Z, 0.5)));
}

#[test]
fn environment_mip_chain_reaches_one_texel() {
    let env = RoomEnvironment::generate(16);
    assert_eq!(env.face_size(), 16);
    assert_eq!(env.mip_count(), 5);
    let last = &env.levels()[4];
    assert_eq!(last.size, 1);
    for face in 0..FACE_COUNT {
        assert_eq!(env.levels()[0].radiance(face).len(), 256);
        assert_eq!(env.levels()[0].face_rgba8(face).len(), 1024);
        let avg = last.radiance(face)[0];
        assert!(avg > 0.0 && avg <= environment::ENV_RANGE);
    }
}

#[test]
fn scattering_stage_sits_after_direct_light() {
    let material = MaterialParams::default();
    let scattering = ScatteringParams::default();
    let pipeline = ShadingPipeline::physical(&material, &scattering);
    assert_eq!(
        pipeline.stages(),
        &[
            ShadingStage::DirectPhysical,
            ShadingStage::Scattering(scattering),
            ShadingStage::Clearcoat,
            ShadingStage::IndirectEnvironment,
        ]
    );
    assert_eq!(pipeline.fragment_entry(), FS_PHYSICAL_SCATTERING);
}

#[test]
fn disabled_scattering_selects_plain_entry_point() {
    let material = MaterialParams {
        clearcoat: 0.0,
        ..MaterialParams::default()
    };
    let scattering = ScatteringParams {
        enabled: false,
        ..ScatteringParams::default()
    };
    let pipeline = ShadingPipeline::physical(&material, &scattering);
    assert_eq!(
        pipeline.stages(),
        &[
            ShadingStage::DirectPhysical,
            ShadingStage::IndirectEnvironment
        ]
    );
    assert_eq!(pipeline.fragment_entry(), FS_PHYSICAL);
    assert!(SPHERES_WGSL.contains("fn fs_physical("));
    assert!(SPHERES_WGSL.contains("fn fs_physical_scattering("));
}

#[test]
fn backlit_surface_scatters_toward_the_viewer() {
    let p = ScatteringParams::default();
    let n = Vec3::Z;
    let view = Vec3::Z;
    let back = scattering_intensity(Vec3::NEG_Z, n, view, &p);
    let front = scattering_intensity(Vec3::Z, n, view, &p);
    assert!((back - 1.0).abs() < 1e-5, "back {back}");
    assert_eq!(front, 0.0);
}

#[test]
fn tone_map_is_bounded_and_monotonic() {
    assert_eq!(aces_filmic(Vec3::ZERO, 1.0), Vec3::ZERO);
    let dim = aces_filmic(Vec3::splat(0.5), 1.0);
    let bright = aces_filmic(Vec3::splat(4.0), 1.0);
    assert!(dim.x < bright.x);
    assert!(aces_filmic(Vec3::splat(1000.0), 1.0).max_element() <= 1.0);
}

#[test]
fn scene_uniforms_are_tightly_packed() {
    assert_eq!(std::mem::size_of::<SceneUniforms>(), 256);
    assert_eq!(std::mem::size_of::<SphereInstance>(), 32);
    assert_eq!(std::mem::size_of::<Vertex>(), 24);
}

#[test]
fn uniforms_carry_light_and_material() {
    let sys = SphereSystem::new(SimulationConfig {
        count: 3,
        colors: vec![0xff0000, 0x0000ff],
        seed: Some(2),
        ..SimulationConfig::default()
    })
    .expect("system");
    let material = MaterialParams::default();
    let pipeline = ShadingPipeline::physical(&material, &ScatteringParams::default());
    let camera = Camera::new(50.0, Vec3::new(0.0, 0.0, 20.0));
    let u = SceneUniforms::compose(&UniformInputs {
        camera: &camera,
        lights: sys.lights(),
        material: &material,
        pipeline: &pipeline,
        instance_colors: sys.uses_instance_colors(),
        env_mip_count: 8,
    });
    assert_eq!(u.light_pos[3], 200.0);
    assert_eq!(u.base_color[3], 1.0);
    assert_eq!(u.material, [0.5, 0.5, 1.0, 0.15]);
    assert_eq!(u.extra[0], 10.0);
    assert_eq!(u.extra[1], 7.0);
    assert_eq!(u.camera_pos, [0.0, 0.0, 20.0, 1.0]);
}
