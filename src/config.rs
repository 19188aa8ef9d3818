//! Inputs of the overlapping regions problem.
use crate::mesh::procedural::Diagonal;
use crate::partition::MarkingRule;
use crate::solve::LinearSolverSettings;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidAlpha { alpha: f64 },
    ZeroResolution,
    UnsupportedDegree { degree: usize },
    NonFinite { parameter: &'static str },
    InvalidTolerance { tolerance: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAlpha { alpha } => write!(f, "alpha must be positive, got {}", alpha),
            Self::ZeroResolution => write!(f, "mesh resolution must be at least 1"),
            Self::UnsupportedDegree { degree } => {
                write!(f, "unsupported polynomial degree {} (supported: 1, 2)", degree)
            }
            Self::NonFinite { parameter } => write!(f, "parameter {} is not finite", parameter),
            Self::InvalidTolerance { tolerance } => {
                write!(f, "solver tolerance must be positive, got {}", tolerance)
            }
        }
    }
}

impl Error for ConfigError {}

/// Parameters of `α ∇u·∇v + u v = f v dx(RightAndMid) + g v dx(LeftAndMid) - (f+g)/2 v dx(Mid)`
/// on the unit square.
///
/// Missing fields take their default values when deserialized.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OverlappingRegionsConfig {
    pub alpha: f64,
    pub f: f64,
    pub g: f64,
    /// Number of grid squares along each axis.
    pub mesh_resolution: usize,
    pub polynomial_degree: usize,
    pub diagonal: Diagonal,
    pub marking_rule: MarkingRule,
    pub linear_solver: LinearSolverSettings,
}

impl Default for OverlappingRegionsConfig {
    fn default() -> Self {
        Self {
            alpha: 1e-3,
            f: 3.0,
            g: 5.0,
            mesh_resolution: 64,
            polynomial_degree: 2,
            diagonal: Diagonal::default(),
            marking_rule: MarkingRule::default(),
            linear_solver: LinearSolverSettings::default(),
        }
    }
}

impl OverlappingRegionsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (parameter, value) in [("alpha", self.alpha), ("f", self.f), ("g", self.g)] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { parameter });
            }
        }
        if self.alpha <= 0.0 {
            return Err(ConfigError::InvalidAlpha { alpha: self.alpha });
        }
        if self.mesh_resolution == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        if !matches!(self.polynomial_degree, 1 | 2) {
            return Err(ConfigError::UnsupportedDegree {
                degree: self.polynomial_degree,
            });
        }
        let tolerance = self.linear_solver.tolerance;
        if !(tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance { tolerance });
        }
        Ok(())
    }
}
