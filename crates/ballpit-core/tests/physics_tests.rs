// Host-side tests for the sphere physics step.

use ballpit_core::*;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn engine(config: &SimulationConfig) -> PhysicsEngine {
    let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or(1));
    PhysicsEngine::new(config, &mut rng).expect("valid config")
}

fn pair_config() -> SimulationConfig {
    SimulationConfig {
        count: 2,
        min_size: 1.0,
        max_size: 1.0,
        size0: 1.0,
        seed: Some(3),
        ..SimulationConfig::default()
    }
}

#[test]
fn reference_scenario_stays_finite_and_clamped() {
    let config = SimulationConfig {
        count: 200,
        gravity: 0.5,
        friction: 0.9975,
        wall_bounce: 0.95,
        max_velocity: 0.15,
        control_sphere0: false,
        seed: Some(42),
        ..SimulationConfig::default()
    };
    let mut e = engine(&config);
    let delta = 1.0 / 60.0;
    for frame in 0..1000 {
        e.ease_control_sphere();
        e.integrate(delta);
        for i in 0..e.pool().count() {
            let speed = e.pool().velocity(i).length();
            assert!(
                speed <= config.max_velocity + 1e-5,
                "frame {frame} sphere {i} speed {speed}"
            );
        }
        e.resolve_pairs();
        e.resolve_control_contacts();
        e.contain();
    }
    for v in e.pool().positions().iter().chain(e.pool().velocities()) {
        assert!(v.is_finite());
    }
}

#[test]
fn containment_holds_after_every_frame() {
    let config = SimulationConfig {
        count: 80,
        seed: Some(9),
        ..SimulationConfig::default()
    };
    let mut e = engine(&config);
    let b = e.bounds();
    let z_wall = b.max_z.max(config.max_size);
    for _ in 0..300 {
        e.step(1.0 / 60.0);
        for i in 0..e.pool().count() {
            let p = e.pool().position(i);
            assert!(p.x.abs() <= b.max_x + 1e-4);
            assert!(p.z.abs() <= z_wall + 1e-4);
            assert!(p.y >= -b.max_y - 1e-4);
        }
    }
}

#[test]
fn box_narrower_than_spheres_still_contains_them() {
    let config = SimulationConfig {
        count: 20,
        max_x: 0.2,
        seed: Some(5),
        ..SimulationConfig::default()
    };
    let mut e = engine(&config);
    for frame in 0..60 {
        e.step(1.0 / 60.0);
        for i in 0..e.pool().count() {
            let x = e.pool().position(i).x;
            assert!(x.abs() <= config.max_x + 1e-5, "frame {frame} sphere {i} x {x}");
        }
    }
}

#[test]
fn short_zero_gravity_box_centers_tall_spheres() {
    let config = SimulationConfig {
        count: 1,
        gravity: 0.0,
        max_y: 0.3,
        seed: Some(1),
        ..SimulationConfig::default()
    };
    let mut e = engine(&config);
    e.pool_mut().set_position(0, Vec3::new(0.0, 0.25, 0.0));
    e.contain();
    assert_eq!(e.pool().position(0).y, 0.0);
}

#[test]
fn zero_gravity_box_has_a_ceiling() {
    let config = SimulationConfig {
        count: 1,
        gravity: 0.0,
        seed: Some(1),
        ..SimulationConfig::default()
    };
    let mut e = engine(&config);
    e.pool_mut().set_position(0, Vec3::new(0.0, 10.0, 0.0));
    e.pool_mut().set_velocity(0, Vec3::new(0.0, 0.1, 0.0));
    e.contain();
    let p = e.pool().position(0);
    assert!((p.y - (config.max_y - config.size0)).abs() < 1e-6);
    assert!((e.pool().velocity(0).y + 0.1 * config.wall_bounce).abs() < 1e-6);
}

#[test]
fn gravity_box_has_a_floor_but_no_ceiling() {
    let config = SimulationConfig {
        count: 1,
        gravity: 0.5,
        seed: Some(1),
        ..SimulationConfig::default()
    };
    let mut e = engine(&config);
    e.pool_mut().set_position(0, Vec3::new(0.0, 10.0, 0.0));
    e.contain();
    assert_eq!(e.pool().position(0).y, 10.0);

    e.pool_mut().set_position(0, Vec3::new(0.0, -10.0, 0.0));
    e.pool_mut().set_velocity(0, Vec3::new(0.0, -0.1, 0.0));
    e.contain();
    assert!((e.pool().position(0).y - (-config.max_y + config.size0)).abs() < 1e-6);
    assert!(e.pool().velocity(0).y > 0.0);
}

#[test]
fn overlapping_pair_is_separated() {
    let mut e = engine(&pair_config());
    e.pool_mut().set_position(0, Vec3::ZERO);
    e.pool_mut().set_position(1, Vec3::new(1.0, 0.0, 0.0));
    e.pool_mut().set_velocity(0, Vec3::ZERO);
    e.pool_mut().set_velocity(1, Vec3::ZERO);
    e.resolve_pairs();
    let d = e.pool().position(0).distance(e.pool().position(1));
    assert!(d >= 2.0 - 1e-5, "distance {d}");
    assert!((e.pool().position(0).x + 0.5).abs() < 1e-6);
    assert!((e.pool().position(1).x - 1.5).abs() < 1e-6);
}

#[test]
fn pair_impulse_uses_the_other_spheres_speed() {
    let mut e = engine(&pair_config());
    e.pool_mut().set_position(0, Vec3::ZERO);
    e.pool_mut().set_position(1, Vec3::new(1.0, 0.0, 0.0));
    e.pool_mut().set_velocity(0, Vec3::new(3.0, 0.0, 0.0));
    e.pool_mut().set_velocity(1, Vec3::ZERO);
    e.resolve_pairs();
    // push is 0.5 along +x; sphere 0 sees the floored speed 1 of sphere 1,
    // sphere 1 sees the speed 3 of sphere 0.
    assert!((e.pool().velocity(0).x - 2.5).abs() < 1e-6);
    assert!((e.pool().velocity(1).x - 1.5).abs() < 1e-6);
}

#[test]
fn control_sphere_pushes_without_recoil() {
    let config = SimulationConfig {
        control_sphere0: true,
        ..pair_config()
    };
    let mut e = engine(&config);
    e.pool_mut().set_position(0, Vec3::ZERO);
    e.pool_mut().set_position(1, Vec3::new(1.0, 0.0, 0.0));
    e.pool_mut().set_velocity(1, Vec3::ZERO);
    e.resolve_control_contacts();
    assert_eq!(e.pool().position(0), Vec3::ZERO);
    assert!((e.pool().position(1).x - 2.0).abs() < 1e-6);
    assert!((e.pool().velocity(1).x - 2.0).abs() < 1e-6);
}

#[test]
fn control_sphere_eases_toward_target() {
    let config = SimulationConfig {
        control_sphere0: true,
        ..pair_config()
    };
    let mut e = engine(&config);
    e.pool_mut().set_velocity(0, Vec3::ONE);
    e.apply_target(ControlTarget {
        center: Vec3::new(10.0, 0.0, 0.0),
        active: true,
    });
    e.ease_control_sphere();
    assert!((e.pool().position(0).x - 1.0).abs() < 1e-6);
    assert_eq!(e.pool().velocity(0), Vec3::ZERO);
}

#[test]
fn inactive_target_keeps_center_and_releases_control() {
    let config = SimulationConfig {
        control_sphere0: true,
        ..pair_config()
    };
    let mut e = engine(&config);
    e.set_center(Vec3::new(1.0, 2.0, 0.0));
    e.apply_target(ControlTarget {
        center: Vec3::new(9.0, 9.0, 9.0),
        active: false,
    });
    assert!(!e.control_enabled());
    assert_eq!(e.center(), Vec3::new(1.0, 2.0, 0.0));
}

#[test]
fn larger_spheres_fall_faster() {
    let config = SimulationConfig {
        count: 2,
        size0: 0.5,
        min_size: 1.0,
        max_size: 1.0,
        seed: Some(5),
        ..SimulationConfig::default()
    };
    let mut e = engine(&config);
    e.integrate(1.0 / 60.0);
    let small = e.pool().velocity(0).y;
    let large = e.pool().velocity(1).y;
    assert!(large < small && small < 0.0);
    let expected = -(1.0 / 60.0) * config.gravity * 1.0 * config.friction;
    assert!((large - expected).abs() < 1e-7);
}

#[test]
fn sphere_zero_starts_at_origin_with_primary_size() {
    let config = SimulationConfig {
        count: 10,
        size0: 1.7,
        max_size: 2.0,
        seed: Some(11),
        ..SimulationConfig::default()
    };
    let e = engine(&config);
    assert_eq!(e.pool().position(0), Vec3::ZERO);
    assert_eq!(e.pool().size(0), 1.7);
    for i in 1..10 {
        let s = e.pool().size(i);
        assert!(s >= config.min_size && s < config.max_size);
    }
}

#[test]
fn same_seed_gives_same_pool() {
    let config = SimulationConfig {
        count: 30,
        seed: Some(77),
        ..SimulationConfig::default()
    };
    let a = engine(&config);
    let b = engine(&config);
    assert_eq!(a.pool().positions(), b.pool().positions());
    assert_eq!(a.pool().sizes(), b.pool().sizes());
}

#[test]
fn invalid_config_is_rejected() {
    let config = SimulationConfig {
        count: 0,
        ..SimulationConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        PhysicsEngine::new(&config, &mut rng),
        Err(ConfigError::ZeroCount)
    ));
}
