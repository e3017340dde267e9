//! Vertex layout derivation and interleaved vertex packing
//!
//! A sub-mesh is packed as `position, normal, [tangent], [uv]`, tightly, in
//! that order. Tangents are included only when the caller asks for them;
//! UVs whenever the sub-mesh has a channel.

use crate::assets::{AssetError, ImportedMesh, MeshAttribute};

/// What a vertex element feeds in the shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Semantic {
    /// Object-space position
    Position,
    /// Object-space normal
    Normal,
    /// Object-space tangent
    Tangent,
    /// First texture coordinate channel
    TexCoord,
}

/// Storage format of a vertex element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// Two 32-bit floats
    Float32x2,
    /// Three 32-bit floats
    Float32x3,
}

impl VertexFormat {
    /// Size in bytes
    pub const fn size(self) -> u32 {
        match self {
            Self::Float32x2 => 8,
            Self::Float32x3 => 12,
        }
    }
}

/// One element of an interleaved vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexElement {
    /// Shader input it feeds
    pub semantic: Semantic,
    /// Storage format
    pub format: VertexFormat,
    /// Byte offset within the vertex
    pub offset: u32,
}

/// Element list and stride of an interleaved vertex buffer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    elements: Vec<VertexElement>,
    stride: u32,
}

impl VertexLayout {
    /// Build a layout from element kinds, assigning tight offsets
    pub fn packed(kinds: &[(Semantic, VertexFormat)]) -> Self {
        let mut offset = 0;
        let elements = kinds
            .iter()
            .map(|&(semantic, format)| {
                let element = VertexElement { semantic, format, offset };
                offset += format.size();
                element
            })
            .collect();
        Self { elements, stride: offset }
    }

    /// Validate `mesh` and derive its layout.
    ///
    /// `sub_mesh` is only used to label errors.
    pub fn for_mesh(mesh: &ImportedMesh, sub_mesh: usize, require_tangents: bool) -> Result<Self, AssetError> {
        let vertex_count = mesh.positions.len();
        if vertex_count == 0 {
            return Err(AssetError::MissingAttribute { sub_mesh, attribute: MeshAttribute::Positions });
        }

        let mut kinds = vec![(Semantic::Position, VertexFormat::Float32x3)];

        let normals = mesh
            .normals
            .as_ref()
            .ok_or(AssetError::MissingAttribute { sub_mesh, attribute: MeshAttribute::Normals })?;
        check_count(sub_mesh, MeshAttribute::Normals, vertex_count, normals.len())?;
        kinds.push((Semantic::Normal, VertexFormat::Float32x3));

        if require_tangents {
            let tangents = mesh
                .tangents
                .as_ref()
                .ok_or(AssetError::MissingAttribute { sub_mesh, attribute: MeshAttribute::Tangents })?;
            check_count(sub_mesh, MeshAttribute::Tangents, vertex_count, tangents.len())?;
            kinds.push((Semantic::Tangent, VertexFormat::Float32x3));
        }

        if let Some(channel) = &mesh.uv_channel {
            if channel.components != 2 {
                return Err(AssetError::UnsupportedUvComponents { sub_mesh, components: channel.components });
            }
            check_count(sub_mesh, MeshAttribute::TexCoords, vertex_count, channel.coords.len())?;
            kinds.push((Semantic::TexCoord, VertexFormat::Float32x2));
        }

        if mesh.faces.is_empty() {
            return Err(AssetError::MissingAttribute { sub_mesh, attribute: MeshAttribute::Faces });
        }

        Ok(Self::packed(&kinds))
    }

    /// Elements in buffer order
    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    /// Bytes per vertex
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Element for a semantic, if present
    pub fn element(&self, semantic: Semantic) -> Option<&VertexElement> {
        self.elements.iter().find(|element| element.semantic == semantic)
    }
}

fn check_count(sub_mesh: usize, attribute: MeshAttribute, expected: usize, actual: usize) -> Result<(), AssetError> {
    if expected == actual {
        Ok(())
    } else {
        Err(AssetError::AttributeCountMismatch { sub_mesh, attribute, expected, actual })
    }
}

/// Interleave a validated mesh into bytes following `layout`
pub fn pack_vertices(mesh: &ImportedMesh, layout: &VertexLayout) -> Vec<u8> {
    let vertex_count = mesh.positions.len();
    let mut bytes = Vec::with_capacity(vertex_count * layout.stride() as usize);

    for vertex in 0..vertex_count {
        for element in layout.elements() {
            match element.semantic {
                Semantic::Position => bytes.extend_from_slice(bytemuck::bytes_of(&mesh.positions[vertex])),
                Semantic::Normal => {
                    if let Some(normals) = &mesh.normals {
                        bytes.extend_from_slice(bytemuck::bytes_of(&normals[vertex]));
                    }
                }
                Semantic::Tangent => {
                    if let Some(tangents) = &mesh.tangents {
                        bytes.extend_from_slice(bytemuck::bytes_of(&tangents[vertex]));
                    }
                }
                Semantic::TexCoord => {
                    if let Some(channel) = &mesh.uv_channel {
                        let [u, v, _] = channel.coords[vertex];
                        bytes.extend_from_slice(bytemuck::bytes_of(&[u, v]));
                    }
                }
            }
        }
    }

    debug_assert_eq!(bytes.len(), vertex_count * layout.stride() as usize);
    bytes
}

/// Flatten triangle faces into a 32-bit index list
pub fn pack_indices(mesh: &ImportedMesh, sub_mesh: usize) -> Result<Vec<u32>, AssetError> {
    let vertex_count = mesh.positions.len();
    let mut indices = Vec::with_capacity(mesh.faces.len() * 3);

    for (face_index, face) in mesh.faces.iter().enumerate() {
        if face.len() != 3 {
            return Err(AssetError::NonTriangleFace { sub_mesh, face: face_index, vertices: face.len() });
        }
        for &index in face {
            if index as usize >= vertex_count {
                return Err(AssetError::IndexOutOfRange { sub_mesh, index, vertex_count });
            }
            indices.push(index);
        }
    }

    Ok(indices)
}
