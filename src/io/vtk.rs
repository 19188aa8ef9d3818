use crate::connectivity::{Connectivity, Tri3d2Connectivity, Tri6d2Connectivity};
use crate::field::{SolutionField, VectorField};
use crate::mesh::Mesh2d;
use crate::partition::CellTagging;
use crate::report::Visualizer;
use crate::space::{FunctionSpace, NodeMesh};
use eyre::{eyre, WrapErr};
use log::info;
use std::convert::TryFrom;
use std::path::{Path, PathBuf};
use vtkio::model::{
    Attribute, Attributes, ByteOrder, CellType, Cells, DataSet, Piece, UnstructuredGridPiece, Version,
    VertexNumbers, Vtk,
};

/// Represents connectivity that is supported by VTK.
pub trait VtkCellConnectivity: Connectivity {
    fn num_nodes(&self) -> usize {
        self.vertex_indices().len()
    }

    fn cell_type(&self) -> CellType;

    /// Write connectivity in VTK node order.
    ///
    /// Panics if `connectivity.len() != self.num_nodes()`.
    fn write_vtk_connectivity(&self, connectivity: &mut [usize]) {
        assert_eq!(connectivity.len(), self.vertex_indices().len());
        connectivity.clone_from_slice(self.vertex_indices());
    }
}

impl VtkCellConnectivity for Tri3d2Connectivity {
    fn cell_type(&self) -> CellType {
        CellType::Triangle
    }
}

// Edge nodes 0-1, 1-2, 2-0 coincide with the VTK ordering
impl VtkCellConnectivity for Tri6d2Connectivity {
    fn cell_type(&self) -> CellType {
        CellType::QuadraticTriangle
    }
}

/// Builds an unstructured grid data set from a mesh, with optional point and cell data.
pub struct FiniteElementMeshDataSetBuilder<'a, C> {
    mesh: &'a Mesh2d<C>,
    // Only used for exporting directly to file
    title: Option<String>,
    attributes: Attributes,
}

impl<'a, C> FiniteElementMeshDataSetBuilder<'a, C>
where
    C: VtkCellConnectivity,
{
    pub fn from_mesh(mesh: &'a Mesh2d<C>) -> Self {
        Self {
            mesh,
            title: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..self
        }
    }

    /// Adds scalar data with one value per mesh vertex.
    pub fn with_point_scalar_attributes(mut self, name: impl Into<String>, values: &[f64]) -> Self {
        self.attributes
            .point
            .push(Attribute::scalars(name, 1).with_data(values.to_vec()));
        self
    }

    /// Adds 2D vector data with one vector per mesh vertex, given as interleaved components.
    pub fn with_point_vector_attributes(mut self, name: impl Into<String>, interleaved: &[f64]) -> Self {
        // VTK vectors always have three components
        let data: Vec<f64> = interleaved
            .chunks_exact(2)
            .flat_map(|v| [v[0], v[1], 0.0])
            .collect();
        self.attributes
            .point
            .push(Attribute::vectors(name).with_data(data));
        self
    }

    /// Adds integer data with one value per cell.
    pub fn with_cell_scalar_attributes(mut self, name: impl Into<String>, values: &[usize]) -> Self {
        let data: Vec<u64> = values.iter().map(|&v| v as u64).collect();
        self.attributes
            .cell
            .push(Attribute::scalars(name, 1).with_data(data));
        self
    }

    pub fn try_build(&self) -> eyre::Result<DataSet> {
        let points: Vec<f64> = self
            .mesh
            .vertices()
            .iter()
            .flat_map(|v| [v.x, v.y, 0.0])
            .collect();

        // Vertices is laid out as follows: N, i_1, i_2, ... i_N,
        // so for triangles this becomes 3 followed by the three indices making up the triangle
        let mut vertices = Vec::new();
        let mut cell_types = Vec::new();
        let mut vertex_indices = Vec::new();
        for cell in self.mesh.connectivity() {
            vertices.push(u32::try_from(cell.num_nodes())?);

            vertex_indices.clear();
            vertex_indices.resize(cell.num_nodes(), 0);
            cell.write_vtk_connectivity(&mut vertex_indices);

            for &idx in &vertex_indices {
                vertices.push(u32::try_from(idx).wrap_err("vertex index does not fit in VTK index type")?);
            }
            cell_types.push(cell.cell_type());
        }

        let piece = UnstructuredGridPiece {
            points: points.into(),
            cells: Cells {
                cell_verts: VertexNumbers::Legacy {
                    num_cells: u32::try_from(self.mesh.num_cells())?,
                    vertices,
                },
                types: cell_types,
            },
            data: self.attributes.clone(),
        };

        Ok(DataSet::UnstructuredGrid {
            meta: None,
            pieces: vec![Piece::Inline(Box::new(piece))],
        })
    }

    /// Convenience function for directly exporting the dataset to a file.
    pub fn try_export(&self, filename: impl AsRef<Path>) -> eyre::Result<()> {
        let filepath = filename.as_ref();
        let fallback_title = filepath
            .file_stem()
            .map(|os_str| os_str.to_string_lossy().to_string())
            .unwrap_or_else(|| "untitled".to_string());
        let dataset = self.try_build()?;
        Vtk {
            version: Version { major: 4, minor: 1 },
            // If we don't have a title then just make the filepath the title
            title: self.title.clone().unwrap_or(fallback_title),
            byte_order: ByteOrder::BigEndian,
            data: dataset,
            file_path: None,
        }
        .export(filepath)
        .map_err(|err| eyre!("failed to write VTK file {}: {:?}", filepath.display(), err))
    }
}

/// Writes every plotted field to a legacy VTK file in an output directory.
///
/// Fields are written on the node mesh of their function space, so that quadratic fields are
/// exported as quadratic triangles. The cell tags are attached as cell data.
#[derive(Debug, Clone)]
pub struct VtkVisualizer {
    output_dir: PathBuf,
    written_files: Vec<PathBuf>,
}

impl VtkVisualizer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            written_files: Vec::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn written_files(&self) -> &[PathBuf] {
        &self.written_files
    }

    /// A single-token name derived from a plot title, used both as file stem and attribute name.
    ///
    /// Legacy VTK files do not allow whitespace in data names.
    pub fn attribute_name(title: &str) -> String {
        let name: String = title
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        let name = name.trim_matches('_');
        if name.is_empty() {
            "field".to_string()
        } else {
            name.to_string()
        }
    }

    fn file_path(&self, title: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.vtk", Self::attribute_name(title)))
    }

    fn export<F>(&mut self, space: &FunctionSpace, title: &str, build: F) -> eyre::Result<()>
    where
        F: Fn(NodeMeshBuilder) -> NodeMeshBuilder,
    {
        std::fs::create_dir_all(&self.output_dir)
            .wrap_err_with(|| format!("failed to create output directory {}", self.output_dir.display()))?;
        let path = self.file_path(title);
        let node_mesh = space.node_mesh();
        let builder = match &node_mesh {
            NodeMesh::Linear(mesh) => NodeMeshBuilder::Linear(FiniteElementMeshDataSetBuilder::from_mesh(mesh)),
            NodeMesh::Quadratic(mesh) => {
                NodeMeshBuilder::Quadratic(FiniteElementMeshDataSetBuilder::from_mesh(mesh))
            }
        };
        build(builder.with_title(title)).try_export(&path)?;
        self.written_files.push(path);
        Ok(())
    }
}

/// A data set builder for either kind of node mesh.
pub enum NodeMeshBuilder<'a> {
    Linear(FiniteElementMeshDataSetBuilder<'a, Tri3d2Connectivity>),
    Quadratic(FiniteElementMeshDataSetBuilder<'a, Tri6d2Connectivity>),
}

macro_rules! map_builder {
    ($self:expr, $builder:ident => $e:expr) => {
        match $self {
            NodeMeshBuilder::Linear($builder) => NodeMeshBuilder::Linear($e),
            NodeMeshBuilder::Quadratic($builder) => NodeMeshBuilder::Quadratic($e),
        }
    };
}

impl<'a> NodeMeshBuilder<'a> {
    pub fn with_title(self, title: &str) -> Self {
        map_builder!(self, b => b.with_title(title))
    }

    pub fn with_point_scalar_attributes(self, name: &str, values: &[f64]) -> Self {
        map_builder!(self, b => b.with_point_scalar_attributes(name, values))
    }

    pub fn with_point_vector_attributes(self, name: &str, interleaved: &[f64]) -> Self {
        map_builder!(self, b => b.with_point_vector_attributes(name, interleaved))
    }

    pub fn with_cell_scalar_attributes(self, name: &str, values: &[usize]) -> Self {
        map_builder!(self, b => b.with_cell_scalar_attributes(name, values))
    }

    pub fn try_export(&self, filename: impl AsRef<Path>) -> eyre::Result<()> {
        match self {
            Self::Linear(b) => b.try_export(filename),
            Self::Quadratic(b) => b.try_export(filename),
        }
    }
}

impl Visualizer for VtkVisualizer {
    fn plot_scalar(
        &mut self,
        space: &FunctionSpace,
        tagging: &CellTagging,
        field: &SolutionField,
        title: &str,
    ) -> eyre::Result<()> {
        let name = Self::attribute_name(title);
        self.export(space, title, |builder| {
            builder
                .with_point_scalar_attributes(&name, field.coefficients().as_slice())
                .with_cell_scalar_attributes("cell_tag", tagging.tags())
        })
    }

    fn plot_vector(
        &mut self,
        space: &FunctionSpace,
        tagging: &CellTagging,
        field: &VectorField,
        title: &str,
    ) -> eyre::Result<()> {
        let interleaved = field.interleaved();
        let name = Self::attribute_name(title);
        self.export(space, title, |builder| {
            builder
                .with_point_vector_attributes(&name, &interleaved)
                .with_cell_scalar_attributes("cell_tag", tagging.tags())
        })
    }

    fn interactive(&mut self) -> eyre::Result<()> {
        for path in &self.written_files {
            info!("Wrote {}", path.display());
        }
        Ok(())
    }
}
