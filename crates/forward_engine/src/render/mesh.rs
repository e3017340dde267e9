//! Mesh assets: imported geometry flattened into GPU buffers and a node array
//!
//! A [`MeshAsset`] owns one vertex buffer, one index buffer and one input
//! layout per sub-mesh, plus a depth-first flattened copy of the imported
//! node hierarchy. Node 0 is the root; every other node's parent has a
//! smaller index, so a single forward pass over the array visits parents
//! before children.

use std::path::Path;

use crate::assets::vertex::{pack_indices, pack_vertices};
use crate::assets::{AssetError, ImportOptions, ImportedNode, ImportedScene, SceneImporter, VertexLayout};
use crate::foundation::math::Mat4;
use crate::render::backend::{BufferHandle, BufferKind, InputLayoutHandle, RenderBackend};

/// One drawable chunk of a mesh asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubMesh {
    name: String,
    layout: VertexLayout,
    vertex_count: u32,
    index_count: u32,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    input_layout: InputLayoutHandle,
}

impl SubMesh {
    /// Name from the source file
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vertex layout of the buffer
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    /// Bytes per vertex
    pub fn vertex_stride(&self) -> u32 {
        self.layout.stride()
    }

    /// Vertices in the buffer
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Indices in the buffer, a multiple of three
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Vertex buffer handle
    pub fn vertex_buffer(&self) -> BufferHandle {
        self.vertex_buffer
    }

    /// Index buffer handle
    pub fn index_buffer(&self) -> BufferHandle {
        self.index_buffer
    }

    /// Input layout handle
    pub fn input_layout(&self) -> InputLayoutHandle {
        self.input_layout
    }

    /// Bind this sub-mesh's buffers and issue its draw
    pub fn draw(&self, backend: &mut dyn RenderBackend) {
        backend.bind_vertex_buffer(self.vertex_buffer, self.vertex_stride());
        backend.bind_input_layout(self.input_layout);
        backend.bind_index_buffer(self.index_buffer);
        backend.draw_indexed(self.index_count);
    }

    fn release(&self, backend: &mut dyn RenderBackend) {
        backend.release_buffer(self.vertex_buffer);
        backend.release_buffer(self.index_buffer);
        backend.release_input_layout(self.input_layout);
    }
}

/// Flattened hierarchy node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    default_transform: Mat4,
    parent_index: usize,
    child_nodes: Vec<usize>,
    sub_meshes: Vec<usize>,
}

impl Node {
    /// Parent-relative transform from the file, row-vector convention
    pub fn default_transform(&self) -> &Mat4 {
        &self.default_transform
    }

    /// Parent's index; the root is its own parent
    pub fn parent_index(&self) -> usize {
        self.parent_index
    }

    /// Children's indices in file order
    pub fn child_nodes(&self) -> &[usize] {
        &self.child_nodes
    }

    /// Indices into the asset's sub-mesh list
    pub fn sub_meshes(&self) -> &[usize] {
        &self.sub_meshes
    }
}

/// Immutable, GPU-resident mesh with a flattened node hierarchy
#[derive(Debug)]
pub struct MeshAsset {
    name: String,
    nodes: Vec<Node>,
    sub_meshes: Vec<SubMesh>,
    has_tangents: bool,
}

impl MeshAsset {
    /// Import `path` and upload it.
    ///
    /// With `require_tangents` the vertex layout carries tangents and every
    /// sub-mesh must have them; pass [`ImportOptions::with_tangents`] to have
    /// the importer generate them.
    pub fn load(
        importer: &dyn SceneImporter,
        path: &Path,
        options: &ImportOptions,
        require_tangents: bool,
        backend: &mut dyn RenderBackend,
    ) -> Result<Self, AssetError> {
        let scene = importer.import(path, options)?;
        Self::from_scene(path.display().to_string(), &scene, require_tangents, backend)
    }

    /// Validate and upload an already imported scene.
    ///
    /// Every sub-mesh is validated and packed before any GPU resource is
    /// created. If a creation fails, resources created so far are released.
    pub fn from_scene(
        name: impl Into<String>,
        scene: &ImportedScene,
        require_tangents: bool,
        backend: &mut dyn RenderBackend,
    ) -> Result<Self, AssetError> {
        let name = name.into();
        if scene.meshes.is_empty() {
            return Err(AssetError::NoUsableGeometry { name });
        }

        let mut packed = Vec::with_capacity(scene.meshes.len());
        for (index, mesh) in scene.meshes.iter().enumerate() {
            let layout = VertexLayout::for_mesh(mesh, index, require_tangents)?;
            let indices = pack_indices(mesh, index)?;
            let vertices = pack_vertices(mesh, &layout);
            packed.push((mesh.name.clone(), layout, mesh.positions.len() as u32, vertices, indices));
        }

        let nodes = flatten_nodes(&scene.root, scene.meshes.len())?;

        let mut sub_meshes: Vec<SubMesh> = Vec::with_capacity(packed.len());
        for (sub_name, layout, vertex_count, vertices, indices) in packed {
            match upload_sub_mesh(backend, sub_name, layout, vertex_count, &vertices, &indices) {
                Ok(sub_mesh) => sub_meshes.push(sub_mesh),
                Err(error) => {
                    log::error!("Mesh {} upload failed: {}", name, error);
                    for created in &sub_meshes {
                        created.release(backend);
                    }
                    return Err(error);
                }
            }
        }

        log::info!(
            "Loaded mesh {}: {} nodes, {} sub-meshes",
            name,
            nodes.len(),
            sub_meshes.len()
        );

        Ok(Self {
            name,
            nodes,
            sub_meshes,
            has_tangents: require_tangents,
        })
    }

    /// Source name or path
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flattened nodes, root first
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node by index
    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    /// Number of flattened nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Sub-meshes in file order
    pub fn sub_meshes(&self) -> &[SubMesh] {
        &self.sub_meshes
    }

    /// Whether vertices carry tangents
    pub fn has_tangents(&self) -> bool {
        self.has_tangents
    }

    /// Default transforms of every node, for a fresh model instance
    pub fn default_transforms(&self) -> Vec<Mat4> {
        self.nodes.iter().map(|node| node.default_transform).collect()
    }

    /// Free all GPU resources
    pub fn release(self, backend: &mut dyn RenderBackend) {
        log::debug!("Releasing mesh {}", self.name);
        for sub_mesh in &self.sub_meshes {
            sub_mesh.release(backend);
        }
    }
}

fn upload_sub_mesh(
    backend: &mut dyn RenderBackend,
    name: String,
    layout: VertexLayout,
    vertex_count: u32,
    vertices: &[u8],
    indices: &[u32],
) -> Result<SubMesh, AssetError> {
    let vertex_buffer = backend.create_buffer(BufferKind::Vertex, vertices)?;
    let index_buffer = match backend.create_buffer(BufferKind::Index, bytemuck::cast_slice(indices)) {
        Ok(buffer) => buffer,
        Err(error) => {
            backend.release_buffer(vertex_buffer);
            return Err(error.into());
        }
    };
    let input_layout = match backend.create_input_layout(&layout) {
        Ok(input_layout) => input_layout,
        Err(error) => {
            backend.release_buffer(vertex_buffer);
            backend.release_buffer(index_buffer);
            return Err(error.into());
        }
    };

    Ok(SubMesh {
        name,
        layout,
        vertex_count,
        index_count: indices.len() as u32,
        vertex_buffer,
        index_buffer,
        input_layout,
    })
}

fn count_nodes(node: &ImportedNode) -> usize {
    1 + node.children.iter().map(count_nodes).sum::<usize>()
}

/// Depth-first flatten into an array sized by a counting pre-pass
fn flatten_nodes(root: &ImportedNode, sub_mesh_count: usize) -> Result<Vec<Node>, AssetError> {
    let count = count_nodes(root);
    let mut nodes = vec![
        Node {
            default_transform: Mat4::identity(),
            parent_index: 0,
            child_nodes: Vec::new(),
            sub_meshes: Vec::new(),
        };
        count
    ];

    let written = read_node(root, 0, 0, sub_mesh_count, &mut nodes)?;
    if written != count {
        return Err(AssetError::InvalidHierarchy(format!(
            "flattened {written} nodes, counted {count}"
        )));
    }
    Ok(nodes)
}

/// Write `imported` at `index` and its subtree after it; returns the next free index
fn read_node(
    imported: &ImportedNode,
    index: usize,
    parent: usize,
    sub_mesh_count: usize,
    nodes: &mut [Node],
) -> Result<usize, AssetError> {
    if let Some(&bad) = imported.meshes.iter().find(|&&mesh| mesh >= sub_mesh_count) {
        return Err(AssetError::InvalidHierarchy(format!(
            "node '{}' references sub-mesh {bad}, only {sub_mesh_count} exist",
            imported.name
        )));
    }

    let mut next = index + 1;
    let mut children = Vec::with_capacity(imported.children.len());
    for child in &imported.children {
        children.push(next);
        next = read_node(child, next, index, sub_mesh_count, nodes)?;
    }

    let node = &mut nodes[index];
    // Importers are column-vector; nodes are stored row-vector
    node.default_transform = imported.transform.transpose();
    node.parent_index = parent;
    node.child_nodes = children;
    node.sub_meshes = imported.meshes.clone();
    Ok(next)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::assets::{ImportedMesh, MemoryImporter};
    use crate::foundation::math::{matrix_translation, Mat4Ext, Vec3};
    use crate::render::recording::RecordingBackend;

    pub(crate) fn triangle(name: &str) -> ImportedMesh {
        ImportedMesh::new(
            name,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0.0, 0.0, -1.0]; 3],
        )
        .with_triangles(&[0, 1, 2])
    }

    /// Root with sub-meshes 0 and 1, two children offset along X and Z,
    /// the second child carrying sub-mesh 2 (two triangles)
    pub(crate) fn family_scene() -> ImportedScene {
        let mut two_triangles = triangle("body");
        two_triangles.faces.push(vec![2, 1, 0]);

        ImportedScene {
            root: ImportedNode::new("root")
                .with_meshes(&[0, 1])
                .with_child(ImportedNode::new("left").with_transform(matrix_translation(&Vec3::new(0.0, 0.0, 2.0)).transpose()))
                .with_child(
                    ImportedNode::new("right")
                        .with_transform(matrix_translation(&Vec3::new(3.0, 0.0, 0.0)).transpose())
                        .with_meshes(&[2]),
                ),
            meshes: vec![triangle("hull"), triangle("wing"), two_triangles],
        }
    }

    /// Depth-first independent count
    fn depth_first_count(node: &ImportedNode) -> usize {
        let mut count = 0;
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            count += 1;
            stack.extend(current.children.iter());
        }
        count
    }

    #[test]
    fn test_flattening_invariants() {
        let deep = ImportedNode::new("a")
            .with_child(ImportedNode::new("b").with_child(ImportedNode::new("c")).with_child(ImportedNode::new("d")))
            .with_child(ImportedNode::new("e").with_child(ImportedNode::new("f")));
        let nodes = flatten_nodes(&deep, 0).unwrap();

        assert_eq!(nodes.len(), depth_first_count(&deep));
        assert_eq!(nodes[0].parent_index(), 0);
        for (index, node) in nodes.iter().enumerate().skip(1) {
            assert!(node.parent_index() < index);
            assert!(nodes[node.parent_index()].child_nodes().contains(&index));
        }
        // Depth-first order: a b c d e f
        assert_eq!(nodes[0].child_nodes(), &[1, 4]);
        assert_eq!(nodes[1].child_nodes(), &[2, 3]);
        assert_eq!(nodes[4].child_nodes(), &[5]);
        assert_eq!(nodes[5].parent_index(), 4);
    }

    #[test]
    fn test_import_matrices_are_transposed() {
        let mut backend = RecordingBackend::new();
        let asset = MeshAsset::from_scene("family", &family_scene(), false, &mut backend).unwrap();

        assert_eq!(asset.node_count(), 3);
        assert_eq!(asset.node(2).default_transform().position(), Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(asset.node(1).default_transform().position(), Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(asset.node(0).sub_meshes(), &[0, 1]);
    }

    #[test]
    fn test_sub_mesh_buffers() {
        let mut backend = RecordingBackend::new();
        let asset = MeshAsset::from_scene("family", &family_scene(), false, &mut backend).unwrap();

        assert_eq!(asset.sub_meshes().len(), 3);
        assert_eq!(backend.live_buffers(), 6);
        assert_eq!(backend.live_input_layouts(), 3);

        let body = &asset.sub_meshes()[2];
        assert_eq!(body.index_count(), 6);
        assert_eq!(body.vertex_count(), 3);
        assert_eq!(body.vertex_stride(), 24);

        asset.release(&mut backend);
        assert_eq!(backend.live_buffers(), 0);
        assert_eq!(backend.live_input_layouts(), 0);
    }

    #[test]
    fn test_failed_upload_releases_created_buffers() {
        let mut backend = RecordingBackend::new();
        // Vertex buffer of the second sub-mesh
        backend.fail_buffer_creation_at(2);

        let result = MeshAsset::from_scene("family", &family_scene(), false, &mut backend);
        assert!(matches!(result, Err(AssetError::Backend(_))));
        assert_eq!(backend.live_buffers(), 0);
        assert_eq!(backend.live_input_layouts(), 0);
    }

    #[test]
    fn test_failed_index_buffer_releases_its_vertex_buffer() {
        let mut backend = RecordingBackend::new();
        backend.fail_buffer_creation_at(1);

        let result = MeshAsset::from_scene("family", &family_scene(), false, &mut backend);
        assert!(result.is_err());
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn test_validation_happens_before_upload() {
        let mut scene = family_scene();
        scene.meshes[2].normals = None;
        let mut backend = RecordingBackend::new();

        let result = MeshAsset::from_scene("family", &scene, false, &mut backend);
        assert!(matches!(result, Err(AssetError::MissingAttribute { sub_mesh: 2, .. })));
        assert!(backend.commands().is_empty());
    }

    #[test]
    fn test_empty_scene_has_no_usable_geometry() {
        let scene = ImportedScene { root: ImportedNode::new("root"), meshes: Vec::new() };
        let mut backend = RecordingBackend::new();
        let result = MeshAsset::from_scene("empty", &scene, false, &mut backend);
        assert!(matches!(result, Err(AssetError::NoUsableGeometry { .. })));
    }

    #[test]
    fn test_dangling_sub_mesh_reference() {
        let scene = ImportedScene {
            root: ImportedNode::new("root").with_meshes(&[0, 5]),
            meshes: vec![triangle("only")],
        };
        let mut backend = RecordingBackend::new();
        let result = MeshAsset::from_scene("dangling", &scene, false, &mut backend);
        assert!(matches!(result, Err(AssetError::InvalidHierarchy(_))));
    }

    #[test]
    fn test_required_tangents_come_from_importer() {
        let mut scene = family_scene();
        for mesh in &mut scene.meshes {
            *mesh = std::mem::take(mesh).with_uvs(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        }
        let importer = MemoryImporter::new().with_scene("family", scene);
        let mut backend = RecordingBackend::new();

        let missing = MeshAsset::load(&importer, Path::new("family"), &ImportOptions::default(), true, &mut backend);
        assert!(matches!(missing, Err(AssetError::MissingAttribute { .. })));

        let asset =
            MeshAsset::load(&importer, Path::new("family"), &ImportOptions::with_tangents(), true, &mut backend).unwrap();
        assert!(asset.has_tangents());
        assert_eq!(asset.sub_meshes()[0].vertex_stride(), 44);
    }
}
