use matrixcompare::assert_scalar_eq;
use nalgebra::{Point2, Vector2};
use proptest::prelude::*;
use regionfem::connectivity::Tri3d2Connectivity;
use regionfem::mesh::procedural::{
    create_rectangular_uniform_tri_mesh_2d, create_unit_square_uniform_tri_mesh_2d, Diagonal, UnknownDiagonal,
};
use regionfem::mesh::TriangleMesh2d;

const ALL_DIAGONALS: [Diagonal; 5] = [
    Diagonal::Right,
    Diagonal::Left,
    Diagonal::RightLeft,
    Diagonal::LeftRight,
    Diagonal::Crossed,
];

fn signed_area(mesh: &TriangleMesh2d, cell_index: usize) -> f64 {
    let [a, b, c] = mesh.cell_vertices(cell_index).unwrap();
    let (u, v) = (b - a, c - a);
    0.5 * (u.x * v.y - u.y * v.x)
}

fn connectivity(mesh: &TriangleMesh2d) -> Vec<[usize; 3]> {
    mesh.connectivity().iter().map(|conn| conn.0).collect()
}

#[test]
fn unit_square_vertex_and_cell_counts() {
    for diagonal in ALL_DIAGONALS {
        let mesh = create_unit_square_uniform_tri_mesh_2d(3, 2, diagonal);
        if diagonal == Diagonal::Crossed {
            assert_eq!(mesh.vertices().len(), 12 + 6);
            assert_eq!(mesh.num_cells(), 24);
        } else {
            assert_eq!(mesh.vertices().len(), 12);
            assert_eq!(mesh.num_cells(), 12);
        }
    }
}

#[test]
fn unit_square_single_square_connectivity() {
    let right = create_unit_square_uniform_tri_mesh_2d(1, 1, Diagonal::Right);
    assert_eq!(connectivity(&right), vec![[0, 1, 3], [0, 3, 2]]);

    let left = create_unit_square_uniform_tri_mesh_2d(1, 1, Diagonal::Left);
    assert_eq!(connectivity(&left), vec![[0, 1, 2], [1, 3, 2]]);

    let crossed = create_unit_square_uniform_tri_mesh_2d(1, 1, Diagonal::Crossed);
    assert_eq!(connectivity(&crossed), vec![[0, 1, 4], [1, 3, 4], [3, 2, 4], [2, 0, 4]]);
    assert_eq!(crossed.vertices()[4], Point2::new(0.5, 0.5));
}

#[test]
fn unit_square_alternating_diagonals() {
    let right_left = create_unit_square_uniform_tri_mesh_2d(1, 2, Diagonal::RightLeft);
    assert_eq!(
        connectivity(&right_left),
        vec![[0, 1, 3], [0, 3, 2], [2, 3, 4], [3, 5, 4]]
    );

    let left_right = create_unit_square_uniform_tri_mesh_2d(1, 2, Diagonal::LeftRight);
    assert_eq!(
        connectivity(&left_right),
        vec![[0, 1, 2], [1, 3, 2], [2, 3, 5], [2, 5, 4]]
    );
}

#[test]
fn unit_square_vertex_positions() {
    let mesh = create_unit_square_uniform_tri_mesh_2d(2, 1, Diagonal::Right);
    let expected = vec![
        Point2::new(0.0, 0.0),
        Point2::new(0.5, 0.0),
        Point2::new(1.0, 0.0),
        Point2::new(0.0, 1.0),
        Point2::new(0.5, 1.0),
        Point2::new(1.0, 1.0),
    ];
    assert_eq!(mesh.vertices(), expected.as_slice());
}

#[test]
fn unit_square_zero_cells_is_empty() {
    for diagonal in ALL_DIAGONALS {
        let mesh = create_unit_square_uniform_tri_mesh_2d(0, 3, diagonal);
        assert!(mesh.vertices().is_empty());
        assert_eq!(mesh.num_cells(), 0);
        let mesh = create_unit_square_uniform_tri_mesh_2d(3, 0, diagonal);
        assert_eq!(mesh.num_cells(), 0);
    }
}

#[test]
fn rectangular_mesh_bounds() {
    let origin = Point2::new(-1.0, 2.0);
    let extents = Vector2::new(3.0, 0.5);
    let mesh = create_rectangular_uniform_tri_mesh_2d(&origin, &extents, 4, 3, Diagonal::Left);
    for v in mesh.vertices() {
        assert!(v.x >= -1.0 && v.x <= 2.0);
        assert!(v.y >= 2.0 && v.y <= 2.5);
    }
    assert_eq!(mesh.vertices().first(), Some(&origin));
    assert_eq!(mesh.vertices().last(), Some(&Point2::new(2.0, 2.5)));
    assert_scalar_eq!(mesh.area(), 1.5, comp = abs, tol = 1e-12);
}

#[test]
fn diagonal_parses_its_own_display() {
    for diagonal in ALL_DIAGONALS {
        let parsed: Diagonal = diagonal.to_string().parse().unwrap();
        assert_eq!(parsed, diagonal);
    }
    assert_eq!("right/left".parse::<Diagonal>(), Ok(Diagonal::RightLeft));
    assert_eq!(
        "diagonal".parse::<Diagonal>(),
        Err(UnknownDiagonal("diagonal".to_string()))
    );
}

#[test]
fn diagonal_default_is_right() {
    assert_eq!(Diagonal::default(), Diagonal::Right);
}

proptest! {
    #[test]
    fn unit_square_triangles_are_counter_clockwise_and_cover_square(
        nx in 1..8usize,
        ny in 1..8usize,
        diagonal_index in 0..5usize,
    ) {
        let diagonal = ALL_DIAGONALS[diagonal_index];
        let mesh = create_unit_square_uniform_tri_mesh_2d(nx, ny, diagonal);
        prop_assert!(mesh.is_index_consistent());
        for cell_index in 0..mesh.num_cells() {
            prop_assert!(signed_area(&mesh, cell_index) > 0.0);
        }
        prop_assert!((mesh.area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unit_square_has_no_duplicate_cells(nx in 1..6usize, ny in 1..6usize) {
        let mesh = create_unit_square_uniform_tri_mesh_2d(nx, ny, Diagonal::Right);
        let mut sorted: Vec<[usize; 3]> = mesh
            .connectivity()
            .iter()
            .map(|Tri3d2Connectivity(indices)| {
                let mut indices = *indices;
                indices.sort_unstable();
                indices
            })
            .collect();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), 2 * nx * ny);
    }
}
