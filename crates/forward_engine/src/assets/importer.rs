//! Importer seam and the neutral scene tree importers produce

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::assets::{tangents, AssetError};
use crate::foundation::math::{Mat4, Vec3};

/// Post-processing applied by every importer
///
/// The defaults suit right-handed source files (OBJ, glTF) headed for the
/// engine's left-handed space: polygons are triangulated, missing normals are
/// generated and geometry is mirrored into left-handed coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Generate tangents for meshes that have normals and UVs but no tangents
    pub generate_tangents: bool,
    /// Fan-triangulate polygons with more than three vertices
    pub triangulate: bool,
    /// Generate area-weighted smooth normals for meshes without normals
    pub generate_normals: bool,
    /// Convert right-handed data: negate Z, mirror node transforms, reverse
    /// face winding and flip V
    pub left_handed: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            generate_tangents: false,
            triangulate: true,
            generate_normals: true,
            left_handed: true,
        }
    }
}

impl ImportOptions {
    /// Options for shaders that need a tangent frame (normal or parallax mapping)
    pub fn with_tangents() -> Self {
        Self {
            generate_tangents: true,
            ..Self::default()
        }
    }

    /// Keep the file's data as it is: no triangulation, generation or conversion
    pub fn raw() -> Self {
        Self {
            generate_tangents: false,
            triangulate: false,
            generate_normals: false,
            left_handed: false,
        }
    }
}

/// Reads a scene file into an [`ImportedScene`]
pub trait SceneImporter {
    /// Import the file at `path`
    fn import(&self, path: &Path, options: &ImportOptions) -> Result<ImportedScene, AssetError>;
}

/// Texture coordinate stream
#[derive(Debug, Clone, PartialEq)]
pub struct UvChannel {
    /// Meaningful components per coordinate
    pub components: u32,
    /// Coordinates, unused components zero
    pub coords: Vec<[f32; 3]>,
}

/// One geometry block of an imported scene
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportedMesh {
    /// Name from the source file
    pub name: String,
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, if the file has them
    pub normals: Option<Vec<[f32; 3]>>,
    /// Vertex tangents, if the file has them or they were generated
    pub tangents: Option<Vec<[f32; 3]>>,
    /// First texture coordinate channel
    pub uv_channel: Option<UvChannel>,
    /// Faces as vertex index lists
    pub faces: Vec<Vec<u32>>,
}

impl ImportedMesh {
    /// Mesh with positions and normals and no faces
    pub fn new(name: impl Into<String>, positions: Vec<[f32; 3]>, normals: Vec<[f32; 3]>) -> Self {
        Self {
            name: name.into(),
            positions,
            normals: Some(normals),
            ..Self::default()
        }
    }

    /// Attach two-component texture coordinates
    pub fn with_uvs(mut self, uvs: &[[f32; 2]]) -> Self {
        self.uv_channel = Some(UvChannel {
            components: 2,
            coords: uvs.iter().map(|[u, v]| [*u, *v, 0.0]).collect(),
        });
        self
    }

    /// Attach triangles given as a flat index list
    pub fn with_triangles(mut self, indices: &[u32]) -> Self {
        self.faces.extend(indices.chunks(3).map(<[u32]>::to_vec));
        self
    }

    /// Split polygons into triangle fans
    pub fn triangulate(&mut self) {
        if self.faces.iter().all(|face| face.len() <= 3) {
            return;
        }
        let mut triangles = Vec::with_capacity(self.faces.len() * 2);
        for face in self.faces.drain(..) {
            if face.len() <= 3 {
                triangles.push(face);
                continue;
            }
            for i in 1..face.len() - 1 {
                triangles.push(vec![face[0], face[i], face[i + 1]]);
            }
        }
        self.faces = triangles;
    }

    /// Fill in smooth normals when the mesh has none
    ///
    /// Each face adds its unnormalised cross product to its vertices, so larger
    /// faces weigh more. Vertices no face touches get a zero normal.
    pub fn generate_normals(&mut self) {
        if self.normals.is_some() {
            return;
        }
        let mut sums = vec![Vec3::zeros(); self.positions.len()];
        let position = |index: u32| self.positions.get(index as usize).copied().map(Vec3::from);
        for face in self.faces.iter().filter(|face| face.len() >= 3) {
            for i in 1..face.len() - 1 {
                let corners = [face[0], face[i], face[i + 1]];
                let (Some(p0), Some(p1), Some(p2)) = (position(corners[0]), position(corners[1]), position(corners[2]))
                else {
                    continue;
                };
                let normal = (p1 - p0).cross(&(p2 - p0));
                for corner in corners {
                    sums[corner as usize] += normal;
                }
            }
        }
        self.normals = Some(
            sums.into_iter()
                .map(|sum| <[f32; 3]>::from(sum.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros)))
                .collect(),
        );
    }

    /// Mirror the mesh along Z, reverse face winding and flip V
    pub fn make_left_handed(&mut self) {
        flip_z(&mut self.positions);
        if let Some(normals) = &mut self.normals {
            flip_z(normals);
        }
        if let Some(tangents) = &mut self.tangents {
            flip_z(tangents);
        }
        if let Some(uvs) = self.uv_channel.as_mut().filter(|uvs| uvs.components >= 2) {
            uvs.coords.iter_mut().for_each(|coord| coord[1] = 1.0 - coord[1]);
        }
        for face in self.faces.iter_mut().filter(|face| face.len() >= 3) {
            face[1..].reverse();
        }
    }

    /// Fill in tangents when normals and UVs are present
    pub fn generate_tangents(&mut self) {
        if self.tangents.is_some() {
            return;
        }
        if let (Some(normals), Some(uvs)) = (&self.normals, &self.uv_channel) {
            self.tangents = Some(tangents::generate_tangents(
                &self.positions,
                normals,
                &uvs.coords,
                &self.faces,
            ));
        }
    }
}

fn flip_z(vectors: &mut [[f32; 3]]) {
    for vector in vectors {
        vector[2] = -vector[2];
    }
}

/// Node of the imported hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedNode {
    /// Name from the source file
    pub name: String,
    /// Parent-relative transform in the importer's column-vector convention
    /// (translation in column 3)
    pub transform: Mat4,
    /// Indices into [`ImportedScene::meshes`]
    pub meshes: Vec<usize>,
    /// Child nodes in file order
    pub children: Vec<ImportedNode>,
}

impl ImportedNode {
    /// Node with an identity transform and nothing attached
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Mat4::identity(),
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set the parent-relative transform (column-vector convention)
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Attach meshes by index
    pub fn with_meshes(mut self, meshes: &[usize]) -> Self {
        self.meshes.extend_from_slice(meshes);
        self
    }

    /// Append a child node
    pub fn with_child(mut self, child: ImportedNode) -> Self {
        self.children.push(child);
        self
    }

    /// Mirror this node's transform and its subtree's along Z
    pub fn make_left_handed(&mut self) {
        let mirror = Mat4::new_nonuniform_scaling(&Vec3::new(1.0, 1.0, -1.0));
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            node.transform = mirror * node.transform * mirror;
            stack.extend(node.children.iter_mut());
        }
    }
}

/// Result of an import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedScene {
    /// Root of the node hierarchy
    pub root: ImportedNode,
    /// Geometry referenced by the nodes
    pub meshes: Vec<ImportedMesh>,
}

impl ImportedScene {
    /// Apply the post-processing steps `options` asks for
    ///
    /// Normals are generated in the file's own frame, tangents after the
    /// handedness conversion.
    pub fn apply_options(&mut self, options: &ImportOptions) {
        for mesh in &mut self.meshes {
            if options.triangulate {
                mesh.triangulate();
            }
            if options.generate_normals {
                mesh.generate_normals();
            }
        }
        if options.left_handed {
            self.make_left_handed();
        }
        if options.generate_tangents {
            self.meshes.iter_mut().for_each(ImportedMesh::generate_tangents);
        }
    }

    /// Convert the whole scene from right-handed to left-handed coordinates
    pub fn make_left_handed(&mut self) {
        self.meshes.iter_mut().for_each(ImportedMesh::make_left_handed);
        self.root.make_left_handed();
    }
}

/// Importer serving prepared scenes from memory, keyed by path
#[derive(Debug, Default)]
pub struct MemoryImporter {
    scenes: HashMap<PathBuf, ImportedScene>,
}

impl MemoryImporter {
    /// Create an empty importer
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene under `path`
    pub fn insert(&mut self, path: impl Into<PathBuf>, scene: ImportedScene) {
        self.scenes.insert(path.into(), scene);
    }

    /// Builder form of [`MemoryImporter::insert`]
    pub fn with_scene(mut self, path: impl Into<PathBuf>, scene: ImportedScene) -> Self {
        self.insert(path, scene);
        self
    }
}

impl SceneImporter for MemoryImporter {
    fn import(&self, path: &Path, options: &ImportOptions) -> Result<ImportedScene, AssetError> {
        let mut scene = self
            .scenes
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::FileNotFound(path.to_path_buf()))?;
        scene.apply_options(options);
        Ok(scene)
    }
}
