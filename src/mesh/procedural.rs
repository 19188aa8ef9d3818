//! Basic procedural mesh generation routines.
use crate::connectivity::Tri3d2Connectivity;
use crate::mesh::TriangleMesh2d;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// Direction of the diagonals used to split each grid square into triangles.
///
/// With `(i, j)` the lower-left corner of a grid square:
///
/// - `Right`: the diagonal runs from the lower-left to the upper-right corner.
/// - `Left`: the diagonal runs from the lower-right to the upper-left corner.
/// - `RightLeft`: even rows use `Right`, odd rows use `Left`.
/// - `LeftRight`: even rows use `Left`, odd rows use `Right`.
/// - `Crossed`: both diagonals, with an additional vertex in the center of each square.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagonal {
    #[default]
    Right,
    Left,
    RightLeft,
    LeftRight,
    Crossed,
}

impl Diagonal {
    fn for_row(self, row: usize) -> Self {
        match (self, row % 2) {
            (Self::RightLeft, 0) | (Self::LeftRight, 1) => Self::Right,
            (Self::RightLeft, _) | (Self::LeftRight, _) => Self::Left,
            (other, _) => other,
        }
    }
}

impl fmt::Display for Diagonal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::RightLeft => "right/left",
            Self::LeftRight => "left/right",
            Self::Crossed => "crossed",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDiagonal(pub String);

impl fmt::Display for UnknownDiagonal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown diagonal \"{}\" (expected one of right, left, right/left, left/right, crossed)",
            self.0
        )
    }
}

impl Error for UnknownDiagonal {}

impl FromStr for Diagonal {
    type Err = UnknownDiagonal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "right" => Ok(Self::Right),
            "left" => Ok(Self::Left),
            "right/left" => Ok(Self::RightLeft),
            "left/right" => Ok(Self::LeftRight),
            "crossed" => Ok(Self::Crossed),
            other => Err(UnknownDiagonal(other.to_string())),
        }
    }
}

/// Triangle mesh of the unit square `[0, 1] x [0, 1]`.
///
/// Given the number of cells `(nx, ny)` in each direction, the mesh has `(nx + 1) * (ny + 1)`
/// vertices and `2 * nx * ny` triangles. With [`Diagonal::Crossed`], an additional vertex is
/// placed in the center of every grid square and the number of triangles is `4 * nx * ny`.
pub fn create_unit_square_uniform_tri_mesh_2d(nx: usize, ny: usize, diagonal: Diagonal) -> TriangleMesh2d {
    create_rectangular_uniform_tri_mesh_2d(&Point2::origin(), &Vector2::new(1.0, 1.0), nx, ny, diagonal)
}

/// Generates an axis-aligned rectangular uniform triangle mesh.
///
/// The rectangle has its lower-left corner at `origin` and the given extents. All triangles
/// are oriented counter-clockwise. An empty mesh is returned if `nx` or `ny` is zero.
pub fn create_rectangular_uniform_tri_mesh_2d(
    origin: &Point2<f64>,
    extents: &Vector2<f64>,
    nx: usize,
    ny: usize,
    diagonal: Diagonal,
) -> TriangleMesh2d {
    if nx == 0 || ny == 0 {
        return TriangleMesh2d::from_vertices_and_connectivity(Vec::new(), Vec::new());
    }

    let num_grid_vertices = (nx + 1) * (ny + 1);
    let mut vertices = Vec::with_capacity(num_grid_vertices);
    let mut cells = Vec::new();

    let to_global_vertex_index = |i, j| (nx + 1) * j + i;

    for j in 0..=ny {
        for i in 0..=nx {
            let x = origin.x + extents.x * (i as f64 / nx as f64);
            let y = origin.y + extents.y * (j as f64 / ny as f64);
            vertices.push(Point2::new(x, y));
        }
    }

    for j in 0..ny {
        for i in 0..nx {
            let v0 = to_global_vertex_index(i, j);
            let v1 = to_global_vertex_index(i + 1, j);
            let v2 = to_global_vertex_index(i, j + 1);
            let v3 = to_global_vertex_index(i + 1, j + 1);

            match diagonal.for_row(j) {
                Diagonal::Left => {
                    cells.push(Tri3d2Connectivity([v0, v1, v2]));
                    cells.push(Tri3d2Connectivity([v1, v3, v2]));
                }
                Diagonal::Crossed => {
                    let center = vertices.len();
                    let x = origin.x + extents.x * ((i as f64 + 0.5) / nx as f64);
                    let y = origin.y + extents.y * ((j as f64 + 0.5) / ny as f64);
                    vertices.push(Point2::new(x, y));
                    cells.push(Tri3d2Connectivity([v0, v1, center]));
                    cells.push(Tri3d2Connectivity([v1, v3, center]));
                    cells.push(Tri3d2Connectivity([v3, v2, center]));
                    cells.push(Tri3d2Connectivity([v2, v0, center]));
                }
                // Right is the only remaining case after resolving the alternating patterns
                _ => {
                    cells.push(Tri3d2Connectivity([v0, v1, v3]));
                    cells.push(Tri3d2Connectivity([v0, v3, v2]));
                }
            }
        }
    }

    TriangleMesh2d::from_vertices_and_connectivity(vertices, cells)
}
