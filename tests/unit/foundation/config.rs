use super::*;

#[test]
fn default_layout_matches_bundled_dataset() {
    let l = FieldLayout::default();
    assert_eq!((l.x_cells, l.y_cells, l.t_cells), (400, 50, 1001));
    assert_eq!(l.total_floats().unwrap(), 400 * 50 * 1001 * 2);
    assert!((l.x_step() - 0.02).abs() < 1e-6);
    assert!((l.y_step() - 0.02).abs() < 1e-6);
    l.validate().unwrap();
}

#[test]
fn derived_domain_values() {
    let l = FieldLayout::default();
    assert_eq!(l.center(), Vec2::new(3.5, 0.0));
    assert_eq!(l.radius(), 4.0);
    assert_eq!(l.cell_dim(), Vec2::new(400.0, 50.0));
    assert_eq!(l.time_at(0), 15.0);
    assert!((l.time_at(1001) - 23.0).abs() < 1e-4);
}

#[test]
fn validate_rejects_zero_extents_and_inverted_domains() {
    let zero = FieldLayout {
        t_cells: 0,
        ..FieldLayout::default()
    };
    assert!(matches!(zero.validate(), Err(FlowError::Validation(_))));

    let inverted = FieldLayout {
        x_start: 1.0,
        x_end: 0.0,
        ..FieldLayout::default()
    };
    assert!(inverted.validate().is_err());

    let nan = FieldLayout {
        y_end: f32::NAN,
        ..FieldLayout::default()
    };
    assert!(nan.validate().is_err());
}

#[test]
fn json_partial_override_keeps_defaults() {
    let cfg = FlowConfig::from_json(
        r#"{ "data_path": "other.raw", "layout": { "t_cells": 3 }, "load_policy": "strict" }"#,
    )
    .unwrap();
    assert_eq!(cfg.data_path, PathBuf::from("other.raw"));
    assert_eq!(cfg.layout.t_cells, 3);
    assert_eq!(cfg.layout.x_cells, 400);
    assert_eq!(cfg.load_policy, LoadPolicy::Strict);
    assert_eq!(cfg.noise_path, FlowConfig::default().noise_path);
}

#[test]
fn json_errors_are_config_errors() {
    let err = FlowConfig::from_json("{ not json").unwrap_err();
    assert!(matches!(err, FlowError::Config(_)));

    let err = FlowConfig::from_json(r#"{ "layout": { "x_cells": 0 } }"#).unwrap_err();
    assert!(matches!(err, FlowError::Validation(_)));
}

#[test]
fn clear_color_normalizes() {
    let cfg = FlowConfig {
        clear_rgba: [255, 0, 51, 255],
        ..FlowConfig::default()
    };
    assert_eq!(cfg.clear_color(), [1.0, 0.0, 0.2, 1.0]);
}
