//! Quadrature rules for the reference triangle (-1, -1), (1, -1), (-1, 1).
//!
//! The rules are the polyquad rules shipped with `fenris-quadrature`, whose weights sum to the
//! area of the reference triangle, 2.
use fenris_quadrature::polyquad;
use nalgebra::Point2;

/// Errors returned by quadrature methods.
pub use fenris_quadrature::Error as QuadratureError;

pub type QuadraturePair2d = (Vec<f64>, Vec<Point2<f64>>);

/// A quadrature rule consisting of weights and points.
pub trait Quadrature2d {
    fn weights(&self) -> &[f64];
    fn points(&self) -> &[Point2<f64>];

    /// Approximates the integral of the given function using this quadrature rule.
    fn integrate<Function>(&self, f: Function) -> f64
    where
        Function: Fn(&Point2<f64>) -> f64,
    {
        self.weights()
            .iter()
            .zip(self.points())
            .map(|(w, p)| w * f(p))
            .sum()
    }
}

impl Quadrature2d for QuadraturePair2d {
    fn weights(&self) -> &[f64] {
        &self.0
    }

    fn points(&self) -> &[Point2<f64>] {
        &self.1
    }
}

impl<'a, Q: Quadrature2d> Quadrature2d for &'a Q {
    fn weights(&self) -> &[f64] {
        Q::weights(self)
    }

    fn points(&self) -> &[Point2<f64>] {
        Q::points(self)
    }
}

fn convert_quadrature_rule_from_2d_f64(quadrature: fenris_quadrature::Rule<2>) -> QuadraturePair2d {
    let (weights, points) = quadrature;
    let points = points.into_iter().map(Point2::from).collect();
    (weights, points)
}

/// Returns the cheapest available triangle rule that integrates polynomials of total degree
/// `strength` exactly.
pub fn triangle(strength: usize) -> Result<QuadraturePair2d, QuadratureError> {
    let rule = polyquad::triangle(strength)?;
    Ok(convert_quadrature_rule_from_2d_f64(rule))
}

fn tabulated_triangle(strength: usize) -> QuadraturePair2d {
    triangle(strength).expect("Triangle rules are tabulated for all strengths up to 20")
}

/// Exact for linear polynomials.
pub fn tri_quadrature_strength_1() -> QuadraturePair2d {
    tabulated_triangle(1)
}

/// Exact for quadratic polynomials.
pub fn tri_quadrature_strength_2() -> QuadraturePair2d {
    tabulated_triangle(2)
}

/// Exact for polynomials of total degree 4, which covers the P2 mass matrix on affine cells.
pub fn tri_quadrature_strength_4() -> QuadraturePair2d {
    tabulated_triangle(4)
}
