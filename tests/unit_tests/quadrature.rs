use matrixcompare::assert_scalar_eq;
use regionfem::quadrature::{
    self, tri_quadrature_strength_1, tri_quadrature_strength_2, tri_quadrature_strength_4, Quadrature2d,
    QuadratureError, QuadraturePair2d,
};

fn factorial(n: usize) -> f64 {
    (1..=n).map(|k| k as f64).product()
}

fn binomial(n: usize, k: usize) -> f64 {
    factorial(n) / (factorial(k) * factorial(n - k))
}

/// Exact integral of `x^a y^b` over the reference triangle (-1, -1), (1, -1), (-1, 1).
///
/// Uses `x = 2s - 1`, `y = 2t - 1` and `∫ s^i t^j = i! j! / (i + j + 2)!` on the unit triangle.
fn exact_monomial_integral(a: usize, b: usize) -> f64 {
    let mut integral = 0.0;
    for i in 0..=a {
        for j in 0..=b {
            let coeff = binomial(a, i)
                * binomial(b, j)
                * 2f64.powi((i + j) as i32)
                * (-1f64).powi((a - i + b - j) as i32);
            integral += coeff * factorial(i) * factorial(j) / factorial(i + j + 2);
        }
    }
    // Jacobian determinant of the map from the unit triangle
    4.0 * integral
}

fn assert_exact_up_to_strength(rule: &QuadraturePair2d, strength: usize) {
    for a in 0..=strength {
        for b in 0..=(strength - a) {
            let approx = rule.integrate(|p| p.x.powi(a as i32) * p.y.powi(b as i32));
            let exact = exact_monomial_integral(a, b);
            assert_scalar_eq!(approx, exact, comp = abs, tol = 1e-12);
        }
    }
}

#[test]
fn exact_monomial_integral_sanity() {
    assert_scalar_eq!(exact_monomial_integral(0, 0), 2.0, comp = abs, tol = 1e-14);
    // Centroid of the reference triangle is (-1/3, -1/3)
    assert_scalar_eq!(exact_monomial_integral(1, 0), -2.0 / 3.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(exact_monomial_integral(0, 1), -2.0 / 3.0, comp = abs, tol = 1e-14);
}

#[test]
fn weights_sum_to_reference_area() {
    for rule in [tri_quadrature_strength_1(), tri_quadrature_strength_2(), tri_quadrature_strength_4()] {
        assert_eq!(rule.weights().len(), rule.points().len());
        let sum: f64 = rule.weights().iter().sum();
        assert_scalar_eq!(sum, 2.0, comp = abs, tol = 1e-13);
    }
}

#[test]
fn points_lie_inside_reference_triangle() {
    for rule in [tri_quadrature_strength_1(), tri_quadrature_strength_2(), tri_quadrature_strength_4()] {
        for p in rule.points() {
            assert!(p.x >= -1.0 && p.y >= -1.0 && p.x + p.y <= 0.0);
        }
    }
}

#[test]
fn strength_1_is_exact_for_linear_polynomials() {
    assert_exact_up_to_strength(&tri_quadrature_strength_1(), 1);
}

#[test]
fn strength_2_is_exact_for_quadratic_polynomials() {
    assert_exact_up_to_strength(&tri_quadrature_strength_2(), 2);
}

#[test]
fn strength_4_is_exact_for_quartic_polynomials() {
    assert_exact_up_to_strength(&tri_quadrature_strength_4(), 4);
}

#[test]
fn triangle_selects_sufficient_rule() {
    for strength in 0..=8 {
        let rule = quadrature::triangle(strength).unwrap();
        assert_exact_up_to_strength(&rule, strength);
    }
    assert_eq!(quadrature::triangle(1).unwrap().weights().len(), 1);
}

#[test]
fn triangle_matches_polyquad_rules() {
    let (weights, points) = fenris_quadrature::polyquad::triangle(4).unwrap();
    let rule = quadrature::triangle(4).unwrap();
    assert_eq!(rule.weights(), weights.as_slice());
    assert_eq!(rule.points().len(), points.len());
    for (p, [x, y]) in rule.points().iter().zip(points) {
        assert_eq!((p.x, p.y), (x, y));
    }
}

#[test]
fn triangle_rejects_unsupported_strength() {
    assert_eq!(quadrature::triangle(1000), Err(QuadratureError::NoRuleAvailable));
}

fn integrate_one(quadrature: impl Quadrature2d) -> f64 {
    quadrature.integrate(|_| 1.0)
}

#[test]
fn quadrature_by_reference_integrates_the_same() {
    let rule = tri_quadrature_strength_2();
    assert_eq!(integrate_one(&rule), integrate_one(rule.clone()));
}
