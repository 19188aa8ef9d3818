//! Tagging of mesh cells by geometric predicates.
//!
//! A [`CellTagging`] assigns every cell a small integer tag, with `0` meaning "untagged".
//! Tags are assigned by marking the tagging with a sequence of [`RegionPredicate`]s:
//! each marked cell receives the tag of the predicate, so when predicates overlap the one
//! applied last wins.
use crate::mesh::TriangleMesh2d;
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A named, pure inclusion test over point coordinates.
pub struct RegionPredicate {
    name: String,
    inside: Box<dyn Fn(&Point2<f64>) -> bool>,
}

impl RegionPredicate {
    pub fn new(name: impl Into<String>, inside: impl Fn(&Point2<f64>) -> bool + 'static) -> Self {
        Self {
            name: name.into(),
            inside: Box::new(inside),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, x: &Point2<f64>) -> bool {
        (self.inside)(x)
    }
}

impl fmt::Debug for RegionPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionPredicate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// `x < 0.3`
pub fn left_predicate() -> RegionPredicate {
    RegionPredicate::new("Left", |x| x[0] < 0.3)
}

/// `0.3 <= x <= 0.7`
pub fn mid_predicate() -> RegionPredicate {
    RegionPredicate::new("Mid", |x| x[0] >= 0.3 && x[0] <= 0.7)
}

/// `x > 0.7`
pub fn right_predicate() -> RegionPredicate {
    RegionPredicate::new("Right", |x| x[0] > 0.7)
}

/// Left, Mid and Right with the tags 1, 2 and 3, in that order.
pub fn left_mid_right_predicates() -> Vec<(RegionPredicate, usize)> {
    vec![(left_predicate(), 1), (mid_predicate(), 2), (right_predicate(), 3)]
}

/// Determines which points of a cell are tested against a predicate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkingRule {
    /// A cell is inside if its centroid is inside.
    #[default]
    Centroid,
    /// A cell is inside only if all of its vertices and its centroid are inside.
    ///
    /// Cells straddling the boundary of a predicate are then not marked at all.
    AllVerticesAndCentroid,
}

impl MarkingRule {
    fn cell_is_inside(&self, mesh: &TriangleMesh2d, cell_index: usize, predicate: &RegionPredicate) -> bool {
        let vertices = mesh
            .cell_vertices(cell_index)
            .expect("Mesh is not allowed to contain cells with indices out of bounds.");
        let centroid = Point2::from((vertices[0].coords + vertices[1].coords + vertices[2].coords) / 3.0);
        match self {
            Self::Centroid => predicate.contains(&centroid),
            Self::AllVerticesAndCentroid => {
                vertices.iter().all(|v| predicate.contains(v)) && predicate.contains(&centroid)
            }
        }
    }
}

/// Per-cell integer labels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CellTagging {
    tags: Vec<usize>,
}

impl CellTagging {
    pub const UNTAGGED: usize = 0;

    /// A tagging of the given number of cells, all untagged.
    pub fn new(num_cells: usize) -> Self {
        Self {
            tags: vec![Self::UNTAGGED; num_cells],
        }
    }

    pub fn from_mesh(mesh: &TriangleMesh2d) -> Self {
        Self::new(mesh.num_cells())
    }

    pub fn from_tags(tags: Vec<usize>) -> Self {
        Self { tags }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tag(&self, cell_index: usize) -> Option<usize> {
        self.tags.get(cell_index).copied()
    }

    pub fn tags(&self) -> &[usize] {
        &self.tags
    }

    pub fn set_all(&mut self, tag: usize) {
        self.tags.fill(tag);
    }

    /// Number of cells carrying the given tag.
    pub fn count(&self, tag: usize) -> usize {
        self.tags.iter().filter(|&&t| t == tag).count()
    }

    pub fn cells_with_tag(&self, tag: usize) -> impl '_ + Iterator<Item = usize> {
        self.tags
            .iter()
            .enumerate()
            .filter(move |&(_, &t)| t == tag)
            .map(|(cell_index, _)| cell_index)
    }

    /// Number of cells per tag, in ascending tag order.
    pub fn histogram(&self) -> BTreeMap<usize, usize> {
        let mut histogram = BTreeMap::new();
        for &tag in &self.tags {
            *histogram.entry(tag).or_insert(0) += 1;
        }
        histogram
    }

    /// Sets the tag of every cell inside the predicate, returning the number of marked cells.
    ///
    /// Cells outside the predicate keep their current tag.
    ///
    /// # Panics
    ///
    /// Panics if the tagging does not have one entry per mesh cell.
    pub fn mark(
        &mut self,
        mesh: &TriangleMesh2d,
        predicate: &RegionPredicate,
        tag: usize,
        rule: MarkingRule,
    ) -> usize {
        assert_eq!(
            self.tags.len(),
            mesh.num_cells(),
            "Tagging must have one entry per mesh cell."
        );
        let mut num_marked = 0;
        for (cell_index, cell_tag) in self.tags.iter_mut().enumerate() {
            if rule.cell_is_inside(mesh, cell_index, predicate) {
                *cell_tag = tag;
                num_marked += 1;
            }
        }
        debug!("Marked {} cells inside {} with tag {}", num_marked, predicate.name(), tag);
        num_marked
    }
}

/// Tags every cell of the mesh with the last matching predicate in `predicates`.
///
/// Cells matched by no predicate are left at [`CellTagging::UNTAGGED`].
pub fn mark_cells(mesh: &TriangleMesh2d, predicates: &[(RegionPredicate, usize)], rule: MarkingRule) -> CellTagging {
    let mut tagging = CellTagging::from_mesh(mesh);
    for (predicate, tag) in predicates {
        tagging.mark(mesh, predicate, *tag, rule);
    }
    tagging
}
