use nalgebra::Point2;
use proptest::prelude::*;
use regionfem::mesh::procedural::{create_unit_square_uniform_tri_mesh_2d, Diagonal};
use regionfem::partition::{
    left_mid_right_predicates, left_predicate, mark_cells, mid_predicate, right_predicate, CellTagging,
    MarkingRule, RegionPredicate,
};
use std::collections::BTreeMap;

#[test]
fn standard_predicates_at_boundaries() {
    let at = |x: f64| Point2::new(x, 0.5);
    let (left, mid, right) = (left_predicate(), mid_predicate(), right_predicate());

    assert!(left.contains(&at(0.29)));
    assert!(!left.contains(&at(0.3)));
    assert!(mid.contains(&at(0.3)));
    assert!(mid.contains(&at(0.7)));
    assert!(!right.contains(&at(0.7)));
    assert!(right.contains(&at(0.71)));

    assert_eq!(left.name(), "Left");
    assert_eq!(mid.name(), "Mid");
    assert_eq!(right.name(), "Right");
}

#[test]
fn standard_tags_are_one_two_three() {
    let tags: Vec<_> = left_mid_right_predicates()
        .iter()
        .map(|(predicate, tag)| (predicate.name().to_string(), *tag))
        .collect();
    assert_eq!(
        tags,
        vec![("Left".to_string(), 1), ("Mid".to_string(), 2), ("Right".to_string(), 3)]
    );
}

#[test]
fn centroid_marking_of_unit_square() {
    let mesh = create_unit_square_uniform_tri_mesh_2d(64, 64, Diagonal::Right);
    let tagging = mark_cells(&mesh, &left_mid_right_predicates(), MarkingRule::Centroid);

    assert_eq!(tagging.len(), mesh.num_cells());
    assert_eq!(tagging.count(CellTagging::UNTAGGED), 0);
    assert_eq!(tagging.count(1), 2432);
    assert_eq!(tagging.count(2), 3328);
    assert_eq!(tagging.count(3), 2432);

    for (cell_index, centroid) in mesh.cell_centroids().iter().enumerate() {
        let expected = if centroid.x < 0.3 {
            1
        } else if centroid.x <= 0.7 {
            2
        } else {
            3
        };
        assert_eq!(tagging.tag(cell_index), Some(expected));
    }
}

#[test]
fn all_vertices_marking_leaves_straddling_cells_untagged() {
    let mesh = create_unit_square_uniform_tri_mesh_2d(64, 64, Diagonal::Right);
    let tagging = mark_cells(&mesh, &left_mid_right_predicates(), MarkingRule::AllVerticesAndCentroid);

    let expected: BTreeMap<usize, usize> = [(0, 256), (1, 2432), (2, 3072), (3, 2432)].into_iter().collect();
    assert_eq!(tagging.histogram(), expected);
    for cell_index in tagging.cells_with_tag(CellTagging::UNTAGGED) {
        let x = mesh.cell_centroid(cell_index).unwrap().x;
        assert!((x - 0.3).abs() < 1.0 / 64.0 || (x - 0.7).abs() < 1.0 / 64.0);
    }
}

#[test]
fn later_predicates_win_on_overlap() {
    let mesh = create_unit_square_uniform_tri_mesh_2d(4, 4, Diagonal::Right);
    let predicates = vec![
        (RegionPredicate::new("Everything", |_| true), 7),
        (RegionPredicate::new("Lower", |x| x.y < 0.5), 8),
    ];
    let tagging = mark_cells(&mesh, &predicates, MarkingRule::Centroid);
    assert_eq!(tagging.count(7), 16);
    assert_eq!(tagging.count(8), 16);

    let reversed: Vec<_> = vec![
        (RegionPredicate::new("Lower", |x| x.y < 0.5), 8),
        (RegionPredicate::new("Everything", |_| true), 7),
    ];
    let tagging = mark_cells(&mesh, &reversed, MarkingRule::Centroid);
    assert_eq!(tagging.count(7), 32);
}

#[test]
fn mark_only_touches_cells_inside() {
    let mesh = create_unit_square_uniform_tri_mesh_2d(4, 4, Diagonal::Left);
    let mut tagging = CellTagging::from_mesh(&mesh);
    tagging.set_all(5);

    let num_marked = tagging.mark(&mesh, &left_predicate(), 1, MarkingRule::Centroid);
    assert_eq!(num_marked, 8);
    assert_eq!(tagging.count(1), 8);
    assert_eq!(tagging.count(5), 24);
}

#[test]
#[should_panic]
fn mark_with_wrong_length_panics() {
    let mesh = create_unit_square_uniform_tri_mesh_2d(2, 2, Diagonal::Right);
    let mut tagging = CellTagging::new(3);
    tagging.mark(&mesh, &left_predicate(), 1, MarkingRule::Centroid);
}

#[test]
fn tagging_queries() {
    let tagging = CellTagging::from_tags(vec![0, 2, 2, 1, 2]);
    assert_eq!(tagging.len(), 5);
    assert!(!tagging.is_empty());
    assert_eq!(tagging.tag(3), Some(1));
    assert_eq!(tagging.tag(5), None);
    assert_eq!(tagging.tags(), &[0, 2, 2, 1, 2]);
    assert_eq!(tagging.cells_with_tag(2).collect::<Vec<_>>(), vec![1, 2, 4]);
    assert_eq!(tagging.count(4), 0);

    let empty = CellTagging::new(0);
    assert!(empty.is_empty());
    assert!(empty.histogram().is_empty());
}

#[test]
fn new_tagging_is_untagged() {
    let tagging = CellTagging::new(4);
    assert_eq!(tagging.tags(), &[CellTagging::UNTAGGED; 4]);
}

proptest! {
    #[test]
    fn marking_is_deterministic(n in 1..16usize, diagonal_index in 0..5usize, all_vertices in any::<bool>()) {
        let diagonal = [
            Diagonal::Right,
            Diagonal::Left,
            Diagonal::RightLeft,
            Diagonal::LeftRight,
            Diagonal::Crossed,
        ][diagonal_index];
        let rule = if all_vertices { MarkingRule::AllVerticesAndCentroid } else { MarkingRule::Centroid };
        let mesh = create_unit_square_uniform_tri_mesh_2d(n, n, diagonal);
        let first = mark_cells(&mesh, &left_mid_right_predicates(), rule);
        let second = mark_cells(&mesh, &left_mid_right_predicates(), rule);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn centroid_marking_tags_every_cell(n in 1..16usize) {
        let mesh = create_unit_square_uniform_tri_mesh_2d(n, n, Diagonal::Crossed);
        let tagging = mark_cells(&mesh, &left_mid_right_predicates(), MarkingRule::Centroid);
        prop_assert_eq!(tagging.count(CellTagging::UNTAGGED), 0);
    }
}
