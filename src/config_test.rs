#![allow(clippy::float_cmp)]

use super::*;

/// # Safety
/// Only `from_env_scenarios` touches these variables, so parallel tests cannot race on them.
unsafe fn clear_scrapbook_env() {
    unsafe {
        std::env::remove_var("SCRAPBOOK_CANVAS_WIDTH");
        std::env::remove_var("SCRAPBOOK_MIN_CANVAS_HEIGHT");
        std::env::remove_var("SCRAPBOOK_Z_FLOOR");
        std::env::remove_var("SCRAPBOOK_STICKER_TILT_DEG");
        std::env::remove_var("SCRAPBOOK_READ_ONLY");
    }
}

#[test]
fn from_env_scenarios() {
    unsafe { clear_scrapbook_env() };
    assert_eq!(EngineConfig::from_env().unwrap(), EngineConfig::default());

    unsafe {
        std::env::set_var("SCRAPBOOK_CANVAS_WIDTH", "640");
        std::env::set_var("SCRAPBOOK_Z_FLOOR", " 50 ");
        std::env::set_var("SCRAPBOOK_STICKER_TILT_DEG", "0");
        std::env::set_var("SCRAPBOOK_READ_ONLY", "true");
    }
    let cfg = EngineConfig::from_env().unwrap();
    assert_eq!(cfg.canvas_width, 640.0);
    assert_eq!(cfg.min_canvas_height, MIN_CANVAS_HEIGHT);
    assert_eq!(cfg.z_floor, 50);
    assert_eq!(cfg.sticker_tilt_deg, 0.0);
    assert!(cfg.read_only);

    unsafe { std::env::set_var("SCRAPBOOK_Z_FLOOR", "high") };
    let err = EngineConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "SCRAPBOOK_Z_FLOOR"));

    unsafe {
        clear_scrapbook_env();
        std::env::set_var("SCRAPBOOK_CANVAS_WIDTH", "-1");
    }
    assert!(matches!(EngineConfig::from_env(), Err(ConfigError::InvalidValue { .. })));

    unsafe { clear_scrapbook_env() };
}

#[test]
fn defaults_match_constants() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.canvas_width, CANVAS_WIDTH);
    assert_eq!(cfg.z_floor, Z_FLOOR);
    assert_eq!(cfg.sticker_tilt_deg, STICKER_TILT_DEG);
    assert!(!cfg.read_only);
}

#[test]
fn from_json_fills_missing_keys() {
    let cfg = EngineConfig::from_json(r#"{ "readOnly": true, "zFloor": 3 }"#).unwrap();
    assert!(cfg.read_only);
    assert_eq!(cfg.z_floor, 3);
    assert_eq!(cfg.canvas_width, CANVAS_WIDTH);
}

#[test]
fn from_json_rejects_unknown_keys() {
    let err = EngineConfig::from_json(r#"{ "canvasWidht": 10 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn from_json_rejects_out_of_range() {
    let err = EngineConfig::from_json(r#"{ "canvasWidth": 0 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "canvas_width"));
    let err = EngineConfig::from_json(r#"{ "stickerTiltDeg": -5 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "sticker_tilt_deg"));
}
