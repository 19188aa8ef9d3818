//! Coefficients, measures and the bilinear and linear forms built from them.
//!
//! A form is a sum of terms, each of which is a coefficient times an integrand integrated over
//! a [`Measure`]. Terms are independent: when the measures of two terms overlap, the cells in
//! the overlap contribute to both terms.
use crate::region::Selector;
use crate::space::{FunctionSpace, SpaceSignature};
use nalgebra::Point2;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

/// A scalar coefficient, either constant or varying in space.
#[derive(Clone)]
pub enum Coefficient {
    Constant(f64),
    Field(Arc<dyn Fn(&Point2<f64>) -> f64 + Send + Sync>),
}

impl Coefficient {
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    pub fn field(f: impl Fn(&Point2<f64>) -> f64 + Send + Sync + 'static) -> Self {
        Self::Field(Arc::new(f))
    }

    pub fn evaluate(&self, x: &Point2<f64>) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Field(f) => f(x),
        }
    }

    pub fn as_constant(&self) -> Option<f64> {
        match self {
            Self::Constant(value) => Some(*value),
            Self::Field(_) => None,
        }
    }

    fn combine(self, other: Self, op: fn(f64, f64) -> f64) -> Self {
        match (self, other) {
            (Self::Constant(a), Self::Constant(b)) => Self::Constant(op(a, b)),
            (a, b) => Self::field(move |x| op(a.evaluate(x), b.evaluate(x))),
        }
    }
}

impl From<f64> for Coefficient {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl fmt::Debug for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Field(_) => f.debug_tuple("Field").finish_non_exhaustive(),
        }
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => write!(f, "{}", value),
            Self::Field(_) => write!(f, "c(x)"),
        }
    }
}

impl Add for Coefficient {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.combine(rhs, |a, b| a + b)
    }
}

impl Sub for Coefficient {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.combine(rhs, |a, b| a - b)
    }
}

impl Mul for Coefficient {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.combine(rhs, |a, b| a * b)
    }
}

impl Mul<f64> for Coefficient {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self * Self::Constant(rhs)
    }
}

impl Div<f64> for Coefficient {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        self.combine(Self::Constant(rhs), |a, b| a / b)
    }
}

impl Neg for Coefficient {
    type Output = Self;

    fn neg(self) -> Self {
        self * -1.0
    }
}

/// An integration measure restricted by a selector, written `dx(selector)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measure {
    selector: Selector,
}

impl Measure {
    pub fn everywhere() -> Self {
        Self {
            selector: Selector::Everywhere,
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dx({})", self.selector)
    }
}

/// The measure over the cells selected by `selector`.
pub fn dx(selector: impl Into<Selector>) -> Measure {
    Measure {
        selector: selector.into(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BilinearIntegrand {
    /// `∇u · ∇v`
    GradDotGrad,
    /// `u v`
    Product,
}

impl fmt::Display for BilinearIntegrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GradDotGrad => write!(f, "grad(u)·grad(v)"),
            Self::Product => write!(f, "u v"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BilinearTerm {
    pub coefficient: Coefficient,
    pub integrand: BilinearIntegrand,
    pub measure: Measure,
}

/// A bilinear form `a(u, v)` over a single function space.
#[derive(Debug, Clone)]
pub struct BilinearForm {
    space: SpaceSignature,
    terms: Vec<BilinearTerm>,
}

impl BilinearForm {
    /// An empty form with trial and test functions from the given space.
    pub fn new(space: &FunctionSpace) -> Self {
        Self::for_signature(space.signature())
    }

    pub fn for_signature(space: SpaceSignature) -> Self {
        Self {
            space,
            terms: Vec::new(),
        }
    }

    pub fn space(&self) -> SpaceSignature {
        self.space
    }

    pub fn terms(&self) -> &[BilinearTerm] {
        &self.terms
    }

    pub fn add_term(&mut self, term: BilinearTerm) {
        self.terms.push(term);
    }

    /// Adds `c ∇u·∇v dx`.
    pub fn with_grad_dot_grad(mut self, coefficient: impl Into<Coefficient>, measure: Measure) -> Self {
        self.add_term(BilinearTerm {
            coefficient: coefficient.into(),
            integrand: BilinearIntegrand::GradDotGrad,
            measure,
        });
        self
    }

    /// Adds `c u v dx`.
    pub fn with_product(mut self, coefficient: impl Into<Coefficient>, measure: Measure) -> Self {
        self.add_term(BilinearTerm {
            coefficient: coefficient.into(),
            integrand: BilinearIntegrand::Product,
            measure,
        });
        self
    }
}

impl fmt::Display for BilinearForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_terms(
            f,
            self.terms
                .iter()
                .map(|term| format!("{} {} {}", term.coefficient, term.integrand, term.measure)),
        )
    }
}

/// A source term `c v dx`.
#[derive(Debug, Clone)]
pub struct LinearTerm {
    pub coefficient: Coefficient,
    pub measure: Measure,
}

/// A linear form `L(v)` over a single function space.
#[derive(Debug, Clone)]
pub struct LinearForm {
    space: SpaceSignature,
    terms: Vec<LinearTerm>,
}

impl LinearForm {
    /// An empty form with test functions from the given space.
    pub fn new(space: &FunctionSpace) -> Self {
        Self::for_signature(space.signature())
    }

    pub fn for_signature(space: SpaceSignature) -> Self {
        Self {
            space,
            terms: Vec::new(),
        }
    }

    pub fn space(&self) -> SpaceSignature {
        self.space
    }

    pub fn terms(&self) -> &[LinearTerm] {
        &self.terms
    }

    pub fn add_term(&mut self, term: LinearTerm) {
        self.terms.push(term);
    }

    /// Adds `c v dx`.
    pub fn with_source(mut self, coefficient: impl Into<Coefficient>, measure: Measure) -> Self {
        self.add_term(LinearTerm {
            coefficient: coefficient.into(),
            measure,
        });
        self
    }
}

impl fmt::Display for LinearForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_terms(
            f,
            self.terms
                .iter()
                .map(|term| format!("{} v {}", term.coefficient, term.measure)),
        )
    }
}

fn write_terms(f: &mut fmt::Formatter<'_>, terms: impl Iterator<Item = String>) -> fmt::Result {
    let mut is_empty = true;
    for (i, term) in terms.enumerate() {
        if i > 0 {
            write!(f, " + ")?;
        }
        write!(f, "{}", term)?;
        is_empty = false;
    }
    if is_empty {
        write!(f, "0")?;
    }
    Ok(())
}
