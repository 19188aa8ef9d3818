use regionfem::config::{ConfigError, OverlappingRegionsConfig};
use regionfem::mesh::procedural::Diagonal;
use regionfem::partition::MarkingRule;
use regionfem::solve::LinearSolverSettings;

#[test]
fn defaults_describe_reference_problem() {
    let config = OverlappingRegionsConfig::default();
    assert_eq!(config.alpha, 1e-3);
    assert_eq!(config.f, 3.0);
    assert_eq!(config.g, 5.0);
    assert_eq!(config.mesh_resolution, 64);
    assert_eq!(config.polynomial_degree, 2);
    assert_eq!(config.diagonal, Diagonal::Right);
    assert_eq!(config.marking_rule, MarkingRule::Centroid);
    assert_eq!(config.linear_solver, LinearSolverSettings::default());
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn validation_rejects_invalid_parameters() {
    let base = OverlappingRegionsConfig::default();

    let config = OverlappingRegionsConfig { alpha: 0.0, ..base.clone() };
    assert_eq!(config.validate(), Err(ConfigError::InvalidAlpha { alpha: 0.0 }));

    let config = OverlappingRegionsConfig { alpha: -1.0, ..base.clone() };
    assert_eq!(config.validate(), Err(ConfigError::InvalidAlpha { alpha: -1.0 }));

    let config = OverlappingRegionsConfig {
        mesh_resolution: 0,
        ..base.clone()
    };
    assert_eq!(config.validate(), Err(ConfigError::ZeroResolution));

    let config = OverlappingRegionsConfig {
        polynomial_degree: 3,
        ..base.clone()
    };
    assert_eq!(config.validate(), Err(ConfigError::UnsupportedDegree { degree: 3 }));

    let config = OverlappingRegionsConfig { g: f64::INFINITY, ..base.clone() };
    assert_eq!(config.validate(), Err(ConfigError::NonFinite { parameter: "g" }));

    // Non-finite values are reported before the sign of alpha is checked
    let config = OverlappingRegionsConfig { alpha: f64::NAN, ..base.clone() };
    assert_eq!(config.validate(), Err(ConfigError::NonFinite { parameter: "alpha" }));

    let config = OverlappingRegionsConfig {
        linear_solver: LinearSolverSettings {
            tolerance: 0.0,
            max_iterations: 10,
        },
        ..base
    };
    assert_eq!(config.validate(), Err(ConfigError::InvalidTolerance { tolerance: 0.0 }));
}

#[test]
fn negative_sources_are_allowed() {
    let config = OverlappingRegionsConfig {
        f: -3.0,
        g: 0.0,
        ..Default::default()
    };
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn partial_json_takes_defaults() {
    let json = r#"{
        "alpha": 0.01,
        "mesh_resolution": 16,
        "diagonal": "crossed",
        "marking_rule": "all_vertices_and_centroid",
        "linear_solver": { "tolerance": 1e-10 }
    }"#;
    let config: OverlappingRegionsConfig = serde_json::from_str(json).unwrap();
    assert_eq!(
        config,
        OverlappingRegionsConfig {
            alpha: 0.01,
            mesh_resolution: 16,
            diagonal: Diagonal::Crossed,
            marking_rule: MarkingRule::AllVerticesAndCentroid,
            linear_solver: LinearSolverSettings {
                tolerance: 1e-10,
                ..Default::default()
            },
            ..Default::default()
        }
    );
}

#[test]
fn json_round_trip() {
    let config = OverlappingRegionsConfig {
        polynomial_degree: 1,
        diagonal: Diagonal::Left,
        ..Default::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let parsed: OverlappingRegionsConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn config_error_messages() {
    assert_eq!(
        ConfigError::UnsupportedDegree { degree: 4 }.to_string(),
        "unsupported polynomial degree 4 (supported: 1, 2)"
    );
    assert_eq!(
        ConfigError::NonFinite { parameter: "f" }.to_string(),
        "parameter f is not finite"
    );
}
