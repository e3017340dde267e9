//! Asset import
//!
//! Scene files are read through a [`SceneImporter`] into a neutral
//! [`ImportedScene`] tree. The render layer validates and flattens that tree
//! into a [`MeshAsset`](crate::render::mesh::MeshAsset).

pub mod importer;
pub mod obj_loader;
#[cfg(feature = "gltf")]
pub mod gltf_loader;
pub mod tangents;
pub mod vertex;

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::render::backend::BackendError;

pub use importer::{
    ImportOptions, ImportedMesh, ImportedNode, ImportedScene, MemoryImporter, SceneImporter, UvChannel,
};
pub use obj_loader::ObjImporter;
#[cfg(feature = "gltf")]
pub use gltf_loader::GltfImporter;
pub use vertex::{Semantic, VertexElement, VertexFormat, VertexLayout};

/// Per-sub-mesh data a mesh asset may require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshAttribute {
    /// Vertex positions
    Positions,
    /// Vertex normals
    Normals,
    /// Vertex tangents
    Tangents,
    /// Texture coordinates
    TexCoords,
    /// Face list
    Faces,
}

impl fmt::Display for MeshAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Positions => "positions",
            Self::Normals => "normals",
            Self::Tangents => "tangents",
            Self::TexCoords => "texture coordinates",
            Self::Faces => "faces",
        };
        f.write_str(name)
    }
}

/// Errors raised while importing or building a mesh asset
#[derive(Error, Debug)]
pub enum AssetError {
    /// The scene file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The scene file could not be read
    #[error("IO error reading {path}: {error}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        error: std::io::Error,
    },

    /// The importer rejected the file
    #[error("Failed to import {path}: {reason}")]
    Import {
        /// File being imported
        path: PathBuf,
        /// Importer message
        reason: String,
    },

    /// The scene contains no meshes
    #[error("No usable geometry in {name}")]
    NoUsableGeometry {
        /// Scene name or path
        name: String,
    },

    /// A sub-mesh lacks data the vertex layout needs
    #[error("Sub-mesh {sub_mesh} has no {attribute}")]
    MissingAttribute {
        /// Sub-mesh index
        sub_mesh: usize,
        /// Missing data
        attribute: MeshAttribute,
    },

    /// A per-vertex stream has a different length than the positions
    #[error("Sub-mesh {sub_mesh} has {actual} {attribute}, expected {expected}")]
    AttributeCountMismatch {
        /// Sub-mesh index
        sub_mesh: usize,
        /// Offending stream
        attribute: MeshAttribute,
        /// Number of positions
        expected: usize,
        /// Length of the offending stream
        actual: usize,
    },

    /// Texture coordinates are not two-component
    #[error("Sub-mesh {sub_mesh} has {components}-component texture coordinates, only 2 are supported")]
    UnsupportedUvComponents {
        /// Sub-mesh index
        sub_mesh: usize,
        /// Components per coordinate
        components: u32,
    },

    /// A face is not a triangle
    #[error("Sub-mesh {sub_mesh} face {face} has {vertices} vertices, expected 3")]
    NonTriangleFace {
        /// Sub-mesh index
        sub_mesh: usize,
        /// Face index
        face: usize,
        /// Vertices in the face
        vertices: usize,
    },

    /// A face references a vertex that does not exist
    #[error("Sub-mesh {sub_mesh} index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Sub-mesh index
        sub_mesh: usize,
        /// Offending index
        index: u32,
        /// Vertices in the sub-mesh
        vertex_count: usize,
    },

    /// The node tree references sub-meshes that do not exist
    #[error("Invalid node hierarchy: {0}")]
    InvalidHierarchy(String),

    /// GPU resource creation failed
    #[error(transparent)]
    Backend(#[from] BackendError),
}
