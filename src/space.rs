//! Continuous Lagrange function spaces on triangle meshes.
use crate::connectivity::{Connectivity, Tri6d2Connectivity};
use crate::element::{LagrangeTriangle, Tri3d2Element, Tri6d2Element};
use crate::mesh::{Mesh2d, Tri6Mesh2d, TriangleMesh2d};
use log::debug;
use nalgebra::{DVector, Point2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

/// Identifies a function space well enough to detect forms and fields built over different spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct SpaceSignature {
    pub degree: usize,
    pub num_cells: usize,
    pub num_dofs: usize,
}

impl fmt::Display for SpaceSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P{} space with {} dofs on {} cells",
            self.degree, self.num_dofs, self.num_cells
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    UnsupportedDegree { degree: usize },
    InconsistentMesh,
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedDegree { degree } => {
                write!(f, "unsupported polynomial degree {} (supported: 1, 2)", degree)
            }
            Self::InconsistentMesh => write!(f, "mesh connectivity references vertices out of bounds"),
        }
    }
}

impl Error for SpaceError {}

/// A scalar, continuous Lagrange finite element space of degree 1 or 2.
///
/// Degree 1 has one degree of freedom per mesh vertex, with the same numbering as the vertices.
/// Degree 2 additionally has one degree of freedom per edge, numbered after the vertices in
/// the order in which the edges are first encountered when traversing the cells.
#[derive(Debug, Clone)]
pub struct FunctionSpace {
    mesh: TriangleMesh2d,
    degree: usize,
    nodes_per_cell: usize,
    cell_dofs: Vec<usize>,
    dof_coordinates: Vec<Point2<f64>>,
}

impl FunctionSpace {
    pub fn new(mesh: TriangleMesh2d, degree: usize) -> Result<Self, SpaceError> {
        if !mesh.is_index_consistent() {
            return Err(SpaceError::InconsistentMesh);
        }

        let space = match degree {
            1 => Self::linear(mesh),
            2 => Self::quadratic(mesh),
            _ => return Err(SpaceError::UnsupportedDegree { degree }),
        };
        debug!("Built {}", space.signature());
        Ok(space)
    }

    fn linear(mesh: TriangleMesh2d) -> Self {
        let cell_dofs = mesh
            .connectivity()
            .iter()
            .flat_map(|conn| conn.vertex_indices().iter().copied())
            .collect();
        let dof_coordinates = mesh.vertices().to_vec();
        Self {
            mesh,
            degree: 1,
            nodes_per_cell: 3,
            cell_dofs,
            dof_coordinates,
        }
    }

    fn quadratic(mesh: TriangleMesh2d) -> Self {
        let mut dof_coordinates = mesh.vertices().to_vec();
        let mut cell_dofs = Vec::with_capacity(6 * mesh.num_cells());
        // BTreeMap rather than HashMap so that the numbering is deterministic
        let mut edge_dofs = BTreeMap::new();

        for conn in mesh.connectivity() {
            cell_dofs.extend_from_slice(conn.vertex_indices());
            for local_edge in 0..conn.num_faces() {
                let edge = conn
                    .get_face_connectivity(local_edge)
                    .expect("Triangles always have three edges");
                let dof = *edge_dofs.entry(edge.sorted()).or_insert_with(|| {
                    let [a, b] = edge.0;
                    let midpoint = (mesh.vertices()[a].coords + mesh.vertices()[b].coords) * 0.5;
                    dof_coordinates.push(Point2::from(midpoint));
                    dof_coordinates.len() - 1
                });
                cell_dofs.push(dof);
            }
        }

        Self {
            mesh,
            degree: 2,
            nodes_per_cell: 6,
            cell_dofs,
            dof_coordinates,
        }
    }

    pub fn mesh(&self) -> &TriangleMesh2d {
        &self.mesh
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn num_dofs(&self) -> usize {
        self.dof_coordinates.len()
    }

    pub fn num_cells(&self) -> usize {
        self.mesh.num_cells()
    }

    pub fn nodes_per_cell(&self) -> usize {
        self.nodes_per_cell
    }

    /// Global degrees of freedom of the given cell, in local node order.
    ///
    /// # Panics
    ///
    /// Panics if the cell index is out of bounds.
    pub fn cell_dofs(&self, cell_index: usize) -> &[usize] {
        let n = self.nodes_per_cell;
        &self.cell_dofs[n * cell_index..n * (cell_index + 1)]
    }

    /// Physical location of the node associated with each degree of freedom.
    pub fn dof_coordinates(&self) -> &[Point2<f64>] {
        &self.dof_coordinates
    }

    pub fn signature(&self) -> SpaceSignature {
        SpaceSignature {
            degree: self.degree,
            num_cells: self.num_cells(),
            num_dofs: self.num_dofs(),
        }
    }

    /// The finite element of the given cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell index is out of bounds.
    pub fn element(&self, cell_index: usize) -> LagrangeTriangle {
        let vertices = self
            .mesh
            .cell_vertices(cell_index)
            .expect("Cell index must be in bounds");
        let tri3 = Tri3d2Element::from_vertices(vertices);
        match self.degree {
            1 => LagrangeTriangle::Linear(tri3),
            _ => LagrangeTriangle::Quadratic(Tri6d2Element::from(tri3)),
        }
    }

    /// Nodal interpolation of the given function.
    pub fn interpolate(&self, f: impl Fn(&Point2<f64>) -> f64) -> DVector<f64> {
        DVector::from_iterator(self.num_dofs(), self.dof_coordinates.iter().map(f))
    }

    /// A mesh whose vertices are the nodes of the space, suitable for visualizing nodal data.
    pub fn node_mesh(&self) -> NodeMesh {
        match self.degree {
            1 => NodeMesh::Linear(self.mesh.clone()),
            _ => {
                let connectivity = self
                    .cell_dofs
                    .chunks_exact(6)
                    .map(|dofs| {
                        let mut indices = [0; 6];
                        indices.copy_from_slice(dofs);
                        Tri6d2Connectivity(indices)
                    })
                    .collect();
                NodeMesh::Quadratic(Mesh2d::from_vertices_and_connectivity(
                    self.dof_coordinates.clone(),
                    connectivity,
                ))
            }
        }
    }
}

/// A mesh with one vertex per degree of freedom of a [`FunctionSpace`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeMesh {
    Linear(TriangleMesh2d),
    Quadratic(Tri6Mesh2d),
}
