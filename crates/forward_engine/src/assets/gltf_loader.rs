//! glTF 2.0 importer backed by the `gltf` crate
//!
//! Every primitive becomes one [`ImportedMesh`]; a node carrying a glTF mesh
//! lists all of that mesh's primitives. Only triangle-list primitives are
//! accepted. A scene with several root nodes gets a synthetic identity root.

use std::path::Path;

use crate::assets::{AssetError, ImportOptions, ImportedMesh, ImportedNode, ImportedScene, SceneImporter, UvChannel};
use crate::foundation::math::Mat4;

/// glTF / GLB file importer
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfImporter;

impl SceneImporter for GltfImporter {
    fn import(&self, path: &Path, options: &ImportOptions) -> Result<ImportedScene, AssetError> {
        if !path.exists() {
            return Err(AssetError::FileNotFound(path.to_path_buf()));
        }
        let (document, buffers, _images) = gltf::import(path).map_err(|e| AssetError::Import {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        convert(&document, &buffers, path, options)
    }
}

impl GltfImporter {
    /// Import from an in-memory `.gltf` (with embedded buffers) or `.glb`
    pub fn import_slice(bytes: &[u8], name: &Path, options: &ImportOptions) -> Result<ImportedScene, AssetError> {
        let (document, buffers, _images) = gltf::import_slice(bytes).map_err(|e| AssetError::Import {
            path: name.to_path_buf(),
            reason: e.to_string(),
        })?;
        convert(&document, &buffers, name, options)
    }
}

fn convert(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    path: &Path,
    options: &ImportOptions,
) -> Result<ImportedScene, AssetError> {
    let fail = |reason: String| AssetError::Import { path: path.to_path_buf(), reason };

    let mut meshes = Vec::new();
    let mut mesh_index_map: Vec<Vec<usize>> = Vec::with_capacity(document.meshes().len());

    for mesh in document.meshes() {
        let mut flat_indices = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                return Err(fail(format!(
                    "mesh {} primitive {} uses {:?}, only triangle lists are supported",
                    mesh.index(),
                    primitive.index(),
                    primitive.mode()
                )));
            }

            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .map(Iterator::collect)
                .unwrap_or_default();
            let normals = reader.read_normals().map(Iterator::collect);
            let tangents = reader
                .read_tangents()
                .map(|iter| iter.map(|[x, y, z, _]| [x, y, z]).collect());
            // glTF puts the texture origin top-left; imported meshes use bottom-left like OBJ
            let uv_channel = reader.read_tex_coords(0).map(|coords| UvChannel {
                components: 2,
                coords: coords.into_f32().map(|[u, v]| [u, 1.0 - v, 0.0]).collect(),
            });
            let indices: Vec<u32> = reader.read_indices().map_or_else(
                || (0..positions.len() as u32).collect(),
                |indices| indices.into_u32().collect(),
            );

            flat_indices.push(meshes.len());
            meshes.push(ImportedMesh {
                name: format!("{}#{}", mesh.name().unwrap_or("mesh"), primitive.index()),
                positions,
                normals,
                tangents,
                uv_channel,
                faces: indices.chunks(3).map(<[u32]>::to_vec).collect(),
            });
        }
        mesh_index_map.push(flat_indices);
    }

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| fail("document has no scenes".to_string()))?;

    let mut roots: Vec<ImportedNode> = scene.nodes().map(|node| convert_node(&node, &mesh_index_map)).collect();
    let root = if roots.len() == 1 {
        roots.remove(0)
    } else {
        let mut root = ImportedNode::new(scene.name().unwrap_or("scene"));
        root.children = roots;
        root
    };

    log::debug!(
        "Imported glTF {}: {} primitives from {} meshes",
        path.display(),
        meshes.len(),
        mesh_index_map.len()
    );

    let mut imported = ImportedScene { root, meshes };
    imported.apply_options(options);
    Ok(imported)
}

fn convert_node(node: &gltf::Node<'_>, mesh_index_map: &[Vec<usize>]) -> ImportedNode {
    ImportedNode {
        name: node.name().unwrap_or_default().to_string(),
        // glTF matrices are column-major arrays of column vectors
        transform: Mat4::from(node.transform().matrix()),
        meshes: node
            .mesh()
            .map(|mesh| mesh_index_map[mesh.index()].clone())
            .unwrap_or_default(),
        children: node.children().map(|child| convert_node(&child, mesh_index_map)).collect(),
    }
}
