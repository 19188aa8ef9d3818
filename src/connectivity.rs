use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

pub trait Connectivity: Clone {
    type FaceConnectivity: Connectivity;

    fn num_faces(&self) -> usize;
    fn get_face_connectivity(&self, index: usize) -> Option<Self::FaceConnectivity>;

    fn vertex_indices(&self) -> &[usize];
}

impl Connectivity for () {
    type FaceConnectivity = ();

    fn num_faces(&self) -> usize {
        0
    }

    fn get_face_connectivity(&self, _index: usize) -> Option<Self::FaceConnectivity> {
        None
    }

    fn vertex_indices(&self) -> &[usize] {
        const EMPTY_SLICE: &[usize] = &[];
        EMPTY_SLICE
    }
}

/// Connectivity for a two-dimensional line segment with two nodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Segment2d2Connectivity(pub [usize; 2]);

impl Segment2d2Connectivity {
    /// Returns the vertex indices sorted in ascending order.
    ///
    /// Two segments shared by neighboring triangles are traversed in opposite directions,
    /// so the sorted indices identify an edge independently of its orientation.
    pub fn sorted(&self) -> [usize; 2] {
        let [a, b] = self.0;
        if a <= b {
            [a, b]
        } else {
            [b, a]
        }
    }
}

impl Connectivity for Segment2d2Connectivity {
    type FaceConnectivity = ();

    fn num_faces(&self) -> usize {
        0
    }

    fn get_face_connectivity(&self, _index: usize) -> Option<Self::FaceConnectivity> {
        None
    }

    fn vertex_indices(&self) -> &[usize] {
        &self.0
    }
}

/// Connectivity for a two-dimensional Tri3 element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Tri3d2Connectivity(pub [usize; 3]);

impl Tri3d2Connectivity {
    /// Looks up the coordinates of the three vertices.
    ///
    /// Returns `None` if any index is out of bounds.
    pub fn vertex_coordinates(&self, vertices: &[Point2<f64>]) -> Option<[Point2<f64>; 3]> {
        Some([
            *vertices.get(self.0[0])?,
            *vertices.get(self.0[1])?,
            *vertices.get(self.0[2])?,
        ])
    }
}

impl Connectivity for Tri3d2Connectivity {
    type FaceConnectivity = Segment2d2Connectivity;

    fn num_faces(&self) -> usize {
        3
    }

    /// Face `i` is the edge from vertex `i` to vertex `(i + 1) % 3`.
    fn get_face_connectivity(&self, index: usize) -> Option<Self::FaceConnectivity> {
        let idx = &self.0;
        if index < 3 {
            Some(Segment2d2Connectivity([idx[index], idx[(index + 1) % 3]]))
        } else {
            None
        }
    }

    fn vertex_indices(&self) -> &[usize] {
        &self.0
    }
}

impl Deref for Tri3d2Connectivity {
    type Target = [usize; 3];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Connectivity for a two-dimensional Tri6 element.
///
/// The schematic below demonstrates the node numbering.
///
/// ```text
/// 2
/// |`\
/// |  `\
/// 5    `4
/// |      `\
/// |        `\
/// 0-----3----1
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Tri6d2Connectivity(pub [usize; 6]);

impl<'a> From<&'a Tri6d2Connectivity> for Tri3d2Connectivity {
    fn from(tri6: &'a Tri6d2Connectivity) -> Self {
        let Tri6d2Connectivity(indices) = tri6;
        Tri3d2Connectivity([indices[0], indices[1], indices[2]])
    }
}

impl Deref for Tri6d2Connectivity {
    type Target = [usize; 6];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Connectivity for Tri6d2Connectivity {
    type FaceConnectivity = Segment2d2Connectivity;

    fn num_faces(&self) -> usize {
        3
    }

    /// Only the corner vertices of each edge are reported.
    fn get_face_connectivity(&self, index: usize) -> Option<Self::FaceConnectivity> {
        Tri3d2Connectivity::from(self).get_face_connectivity(index)
    }

    fn vertex_indices(&self) -> &[usize] {
        &self.0
    }
}
