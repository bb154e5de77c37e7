// Host-side tests for parsing and validating the mount configuration.

use ballpit_core::{BallpitConfig, ConfigError, SimulationConfig, SizingMode, ViewportConfig};

fn parse(json: &str) -> BallpitConfig {
    serde_json::from_str(json).expect("valid json")
}

#[test]
fn empty_object_is_the_default_configuration() {
    let cfg = parse("{}");
    assert_eq!(cfg, BallpitConfig::default());
    assert_eq!(cfg.simulation.count, 200);
    assert_eq!(cfg.simulation.friction, 0.9975);
    assert_eq!(cfg.viewport.max_aspect, Some(1.5));
    assert_eq!(cfg.viewport.size, SizingMode::Parent);
    assert!(cfg.validate().is_ok());
}

#[test]
fn camel_case_keys_map_onto_both_halves() {
    let cfg = parse(
        r#"{
            "count": 50,
            "colors": [16711680, 255],
            "controlSphere0": true,
            "followCursor": false,
            "maxVelocity": 0.2,
            "materialParams": { "roughness": 0.2 },
            "scattering": { "enabled": false },
            "maxPixelRatio": 2,
            "size": "window",
            "className": "ignored"
        }"#,
    );
    let sim = &cfg.simulation;
    assert_eq!(sim.count, 50);
    assert_eq!(sim.colors, vec![0xff0000, 0x0000ff]);
    assert!(sim.control_sphere0);
    assert!(!sim.follow_cursor);
    assert_eq!(sim.max_velocity, 0.2);
    assert_eq!(sim.material.roughness, 0.2);
    assert_eq!(sim.material.metalness, 0.5);
    assert!(!sim.scattering.enabled);
    assert_eq!(sim.scattering.scale, 10.0);
    assert_eq!(cfg.viewport.max_pixel_ratio, Some(2.0));
    assert_eq!(cfg.viewport.size, SizingMode::Window);
}

#[test]
fn explicit_size_object_is_accepted() {
    let cfg = parse(r#"{ "size": { "width": 320, "height": 240 } }"#);
    assert_eq!(
        cfg.viewport.size,
        SizingMode::Explicit {
            width: 320.0,
            height: 240.0
        }
    );
}

#[test]
fn unknown_sizing_name_is_an_error() {
    assert!(serde_json::from_str::<BallpitConfig>(r#"{ "size": "screen" }"#).is_err());
}

#[test]
fn validation_rejects_bad_simulation_values() {
    let zero = SimulationConfig {
        count: 0,
        ..SimulationConfig::default()
    };
    assert_eq!(zero.validate(), Err(ConfigError::ZeroCount));

    let inverted = SimulationConfig {
        min_size: 2.0,
        max_size: 1.0,
        ..SimulationConfig::default()
    };
    assert_eq!(
        inverted.validate(),
        Err(ConfigError::InvalidSizeRange { min: 2.0, max: 1.0 })
    );

    let nan = SimulationConfig {
        gravity: f32::NAN,
        ..SimulationConfig::default()
    };
    assert_eq!(nan.validate(), Err(ConfigError::NonFinite("gravity")));

    let negative = SimulationConfig {
        wall_bounce: -1.0,
        ..SimulationConfig::default()
    };
    assert!(matches!(
        negative.validate(),
        Err(ConfigError::Negative {
            name: "wallBounce",
            ..
        })
    ));
}

#[test]
fn validation_rejects_inverted_viewport_clamps() {
    let cfg = ViewportConfig {
        min_pixel_ratio: Some(2.0),
        max_pixel_ratio: Some(1.0),
        ..ViewportConfig::default()
    };
    assert!(matches!(
        cfg.validate(),
        Err(ConfigError::InvertedClamp {
            name: "pixelRatio",
            ..
        })
    ));
}

#[test]
fn errors_render_readable_messages() {
    assert_eq!(
        ConfigError::ZeroCount.to_string(),
        "sphere count must be at least 1"
    );
}
