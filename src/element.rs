//! Lagrange finite elements on straight-sided triangles.
//!
//! All elements share the reference triangle with corners (-1, -1), (1, -1), (-1, 1),
//! which matches the quadrature rules in [`crate::quadrature`].
use crate::connectivity::Tri3d2Connectivity;
use nalgebra::{distance, Matrix1x3, Matrix1x6, Matrix2, Matrix2x3, Matrix2x6, Point2, Vector2};

/// A finite element with geometry, i.e. a reference element together with a map to physical space.
pub trait FiniteElement {
    fn num_nodes(&self) -> usize;

    /// Writes the value of every basis function at the reference coordinate `xi` to `basis_values`.
    ///
    /// # Panics
    ///
    /// Panics if `basis_values.len() != self.num_nodes()`.
    fn populate_basis(&self, basis_values: &mut [f64], xi: &Point2<f64>);

    /// Writes the gradient with respect to reference coordinates of every basis function at `xi`.
    ///
    /// # Panics
    ///
    /// Panics if `gradients.len() != self.num_nodes()`.
    fn populate_reference_gradients(&self, gradients: &mut [Vector2<f64>], xi: &Point2<f64>);

    fn reference_jacobian(&self, xi: &Point2<f64>) -> Matrix2<f64>;

    fn map_reference_coords(&self, xi: &Point2<f64>) -> Point2<f64>;

    fn diameter(&self) -> f64;
}

/// A finite element representing linear basis functions on a triangle, in two dimensions.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tri3d2Element {
    vertices: [Point2<f64>; 3],
}

impl Tri3d2Element {
    pub fn from_vertices(vertices: [Point2<f64>; 3]) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point2<f64>; 3] {
        &self.vertices
    }

    pub fn reference() -> Self {
        Self::from_vertices([Point2::new(-1.0, -1.0), Point2::new(1.0, -1.0), Point2::new(-1.0, 1.0)])
    }

    /// Builds the element of a mesh cell, or `None` if the connectivity is out of bounds.
    pub fn from_connectivity(connectivity: &Tri3d2Connectivity, vertices: &[Point2<f64>]) -> Option<Self> {
        connectivity.vertex_coordinates(vertices).map(Self::from_vertices)
    }

    #[rustfmt::skip]
    pub fn evaluate_basis(&self, xi: &Point2<f64>) -> Matrix1x3<f64> {
        Matrix1x3::new(
            -0.5 * xi.x - 0.5 * xi.y,
            0.5 * xi.x + 0.5,
            0.5 * xi.y + 0.5
        )
    }

    #[rustfmt::skip]
    pub fn gradients(&self, _xi: &Point2<f64>) -> Matrix2x3<f64> {
        Matrix2x3::from_columns(&[
            Vector2::new(-0.5, -0.5),
            Vector2::new(0.5, 0.0),
            Vector2::new(0.0, 0.5)
        ])
    }
}

impl FiniteElement for Tri3d2Element {
    fn num_nodes(&self) -> usize {
        3
    }

    fn populate_basis(&self, basis_values: &mut [f64], xi: &Point2<f64>) {
        assert_eq!(basis_values.len(), 3);
        basis_values.copy_from_slice(self.evaluate_basis(xi).as_slice());
    }

    fn populate_reference_gradients(&self, gradients: &mut [Vector2<f64>], xi: &Point2<f64>) {
        assert_eq!(gradients.len(), 3);
        let g = self.gradients(xi);
        for (i, gradient) in gradients.iter_mut().enumerate() {
            *gradient = g.column(i).into_owned();
        }
    }

    #[allow(non_snake_case)]
    fn reference_jacobian(&self, xi: &Point2<f64>) -> Matrix2<f64> {
        let X: Matrix2x3<f64> = Matrix2x3::from_fn(|i, j| self.vertices[j][i]);
        let G = self.gradients(xi);
        X * G.transpose()
    }

    #[allow(non_snake_case)]
    fn map_reference_coords(&self, xi: &Point2<f64>) -> Point2<f64> {
        let X: Matrix2x3<f64> = Matrix2x3::from_fn(|i, j| self.vertices[j][i]);
        let N = self.evaluate_basis(xi);
        Point2::from(X * N.transpose())
    }

    fn diameter(&self) -> f64 {
        let [a, b, c] = &self.vertices;
        distance(a, b).max(distance(b, c)).max(distance(a, c))
    }
}

/// A finite element representing quadratic basis functions on a triangle, in two dimensions.
///
/// Nodes 0, 1, 2 are the corners, nodes 3, 4, 5 the midpoints of the edges 0-1, 1-2 and 0-2.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tri6d2Element {
    vertices: [Point2<f64>; 6],
    tri3: Tri3d2Element,
}

impl Tri6d2Element {
    pub fn from_vertices(vertices: [Point2<f64>; 6]) -> Self {
        let v = &vertices;
        Self {
            vertices,
            tri3: Tri3d2Element::from_vertices([v[0], v[1], v[2]]),
        }
    }

    pub fn vertices(&self) -> &[Point2<f64>; 6] {
        &self.vertices
    }

    pub fn reference() -> Self {
        Self::from(Tri3d2Element::reference())
    }

    #[rustfmt::skip]
    pub fn evaluate_basis(&self, xi: &Point2<f64>) -> Matrix1x6<f64> {
        // We express the basis functions of Tri6 as products of
        // the Tri3 basis functions.
        let psi = self.tri3.evaluate_basis(xi);
        Matrix1x6::from_row_slice(&[
            psi[0] * (2.0 * psi[0] - 1.0),
            psi[1] * (2.0 * psi[1] - 1.0),
            psi[2] * (2.0 * psi[2] - 1.0),
            4.0 * psi[0] * psi[1],
            4.0 * psi[1] * psi[2],
            4.0 * psi[0] * psi[2],
        ])
    }

    #[rustfmt::skip]
    pub fn gradients(&self, xi: &Point2<f64>) -> Matrix2x6<f64> {
        let psi = self.tri3.evaluate_basis(xi);
        let g = self.tri3.gradients(xi);

        // Gradient of vertex node i
        let vertex_gradient = |i: usize| g.column(i) * (4.0 * psi[i] - 1.0);

        // Gradient of edge node on the edge between vertex i and j
        let edge_gradient = |i: usize, j: usize|
            g.column(i) * (4.0 * psi[j]) + g.column(j) * (4.0 * psi[i]);

        Matrix2x6::from_columns(&[
            vertex_gradient(0),
            vertex_gradient(1),
            vertex_gradient(2),
            edge_gradient(0, 1),
            edge_gradient(1, 2),
            edge_gradient(0, 2)
        ])
    }
}

impl From<Tri3d2Element> for Tri6d2Element {
    fn from(tri3: Tri3d2Element) -> Self {
        let midpoint = |a: &Point2<f64>, b: &Point2<f64>| Point2::from((a.coords + b.coords) * 0.5);
        let [v0, v1, v2] = tri3.vertices;
        Self::from_vertices([v0, v1, v2, midpoint(&v0, &v1), midpoint(&v1, &v2), midpoint(&v0, &v2)])
    }
}

impl FiniteElement for Tri6d2Element {
    fn num_nodes(&self) -> usize {
        6
    }

    fn populate_basis(&self, basis_values: &mut [f64], xi: &Point2<f64>) {
        assert_eq!(basis_values.len(), 6);
        basis_values.copy_from_slice(self.evaluate_basis(xi).as_slice());
    }

    fn populate_reference_gradients(&self, gradients: &mut [Vector2<f64>], xi: &Point2<f64>) {
        assert_eq!(gradients.len(), 6);
        let g = self.gradients(xi);
        for (i, gradient) in gradients.iter_mut().enumerate() {
            *gradient = g.column(i).into_owned();
        }
    }

    fn reference_jacobian(&self, xi: &Point2<f64>) -> Matrix2<f64> {
        self.tri3.reference_jacobian(xi)
    }

    fn map_reference_coords(&self, xi: &Point2<f64>) -> Point2<f64> {
        self.tri3.map_reference_coords(xi)
    }

    fn diameter(&self) -> f64 {
        self.tri3.diameter()
    }
}

/// A Lagrange triangle of runtime-selected polynomial degree.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LagrangeTriangle {
    Linear(Tri3d2Element),
    Quadratic(Tri6d2Element),
}

macro_rules! dispatch {
    ($self:ident, $element:ident => $body:expr) => {
        match $self {
            LagrangeTriangle::Linear($element) => $body,
            LagrangeTriangle::Quadratic($element) => $body,
        }
    };
}

impl FiniteElement for LagrangeTriangle {
    fn num_nodes(&self) -> usize {
        dispatch!(self, element => element.num_nodes())
    }

    fn populate_basis(&self, basis_values: &mut [f64], xi: &Point2<f64>) {
        dispatch!(self, element => element.populate_basis(basis_values, xi))
    }

    fn populate_reference_gradients(&self, gradients: &mut [Vector2<f64>], xi: &Point2<f64>) {
        dispatch!(self, element => element.populate_reference_gradients(gradients, xi))
    }

    fn reference_jacobian(&self, xi: &Point2<f64>) -> Matrix2<f64> {
        dispatch!(self, element => element.reference_jacobian(xi))
    }

    fn map_reference_coords(&self, xi: &Point2<f64>) -> Point2<f64> {
        dispatch!(self, element => element.map_reference_coords(xi))
    }

    fn diameter(&self) -> f64 {
        dispatch!(self, element => element.diameter())
    }
}
