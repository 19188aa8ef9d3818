use crate::connectivity::{Connectivity, Tri3d2Connectivity, Tri6d2Connectivity};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

pub mod procedural;

/// Index-based data structure for conforming two-dimensional meshes (i.e. no hanging nodes).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Mesh2d<Connectivity> {
    vertices: Vec<Point2<f64>>,
    connectivity: Vec<Connectivity>,
}

pub type TriangleMesh2d = Mesh2d<Tri3d2Connectivity>;
pub type Tri6Mesh2d = Mesh2d<Tri6d2Connectivity>;

impl<C> Mesh2d<C> {
    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    pub fn connectivity(&self) -> &[C] {
        &self.connectivity
    }

    pub fn num_cells(&self) -> usize {
        self.connectivity.len()
    }

    /// Construct a mesh from vertices and connectivity.
    ///
    /// The provided connectivity is expected only to return valid (i.e. in-bounds) indices.
    /// Users of the mesh are permitted to panic if they encounter invalid indices.
    pub fn from_vertices_and_connectivity(vertices: Vec<Point2<f64>>, connectivity: Vec<C>) -> Self {
        Self { vertices, connectivity }
    }
}

impl<C: Connectivity> Mesh2d<C> {
    /// Checks that every index referenced by the connectivity is in bounds.
    pub fn is_index_consistent(&self) -> bool {
        let n = self.vertices.len();
        self.connectivity
            .iter()
            .all(|conn| conn.vertex_indices().iter().all(|&idx| idx < n))
    }
}

impl TriangleMesh2d {
    /// Returns the three corner coordinates of the given cell.
    pub fn cell_vertices(&self, cell_index: usize) -> Option<[Point2<f64>; 3]> {
        self.connectivity
            .get(cell_index)
            .and_then(|conn| conn.vertex_coordinates(&self.vertices))
    }

    /// The representative point of a cell, i.e. its centroid.
    pub fn cell_centroid(&self, cell_index: usize) -> Option<Point2<f64>> {
        self.cell_vertices(cell_index).map(|[a, b, c]| {
            let sum = a.coords + b.coords + c.coords;
            Point2::from(sum / 3.0)
        })
    }

    /// The (unsigned) area of a cell.
    pub fn cell_area(&self, cell_index: usize) -> Option<f64> {
        self.cell_vertices(cell_index)
            .map(|[a, b, c]| 0.5 * signed_parallelogram_area(&(b - a), &(c - a)).abs())
    }

    pub fn cell_centroids(&self) -> Vec<Point2<f64>> {
        (0..self.num_cells())
            .map(|i| {
                self.cell_centroid(i)
                    .expect("Mesh is not allowed to contain cells with indices out of bounds.")
            })
            .collect()
    }

    /// Total area covered by the mesh.
    pub fn area(&self) -> f64 {
        (0..self.num_cells())
            .filter_map(|i| self.cell_area(i))
            .sum()
    }
}

fn signed_parallelogram_area(u: &Vector2<f64>, v: &Vector2<f64>) -> f64 {
    u.x * v.y - u.y * v.x
}
