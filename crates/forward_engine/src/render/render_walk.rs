//! Hierarchical render walk
//!
//! Resolves each node's absolute matrix in one forward pass over the
//! flattened node array and draws the node's sub-meshes with it. Because a
//! parent always precedes its children, `absolute[parent]` is ready when a
//! child is reached; no recursion or explicit stack is needed.

use crate::foundation::math::Mat4;
use crate::render::backend::RenderBackend;
use crate::render::mesh::{MeshAsset, Node};

/// Compute every node's absolute matrix into `absolute`.
///
/// `transforms` are parent-relative (row-vector), one per node.
///
/// # Panics
///
/// If `transforms` does not have one entry per node.
pub fn resolve_absolute_transforms(nodes: &[Node], transforms: &[Mat4], absolute: &mut Vec<Mat4>) {
    assert_eq!(
        transforms.len(),
        nodes.len(),
        "model has {} transforms for a mesh with {} nodes",
        transforms.len(),
        nodes.len()
    );

    absolute.clear();
    absolute.reserve(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        let world = if index == 0 {
            transforms[0]
        } else {
            transforms[index] * absolute[node.parent_index()]
        };
        absolute.push(world);
    }
}

/// Reusable scratch space for rendering mesh hierarchies
#[derive(Debug, Default)]
pub struct RenderWalk {
    absolute: Vec<Mat4>,
}

impl RenderWalk {
    /// Create an empty walk
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw `mesh` posed by `transforms`.
    ///
    /// For each node in array order, uploads the node's absolute matrix and
    /// then draws its sub-meshes. The caller binds shaders and states first.
    pub fn render(&mut self, mesh: &MeshAsset, transforms: &[Mat4], backend: &mut dyn RenderBackend) {
        resolve_absolute_transforms(mesh.nodes(), transforms, &mut self.absolute);

        for (node, world) in mesh.nodes().iter().zip(&self.absolute) {
            backend.set_world_transform(world);
            for &sub_mesh in node.sub_meshes() {
                mesh.sub_meshes()[sub_mesh].draw(backend);
            }
        }
    }

    /// Absolute matrices from the last render
    pub fn absolute_transforms(&self) -> &[Mat4] {
        &self.absolute
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{matrix_rotation_y, matrix_translation, Mat4Ext, Vec3};
    use crate::render::mesh::tests::family_scene;
    use crate::render::recording::RecordingBackend;
    use approx::assert_relative_eq;

    /// Recursive reference: absolute = transform * parent_absolute down the tree
    fn resolve_recursive(nodes: &[Node], transforms: &[Mat4], index: usize, parent: &Mat4, out: &mut [Mat4]) {
        out[index] = transforms[index] * parent;
        for &child in nodes[index].child_nodes() {
            let absolute = out[index];
            resolve_recursive(nodes, transforms, child, &absolute, out);
        }
    }

    #[test]
    fn test_forward_pass_matches_recursive_walk() {
        let mut backend = RecordingBackend::new();
        let asset = MeshAsset::from_scene("family", &family_scene(), false, &mut backend).unwrap();

        let mut transforms = asset.default_transforms();
        transforms[0] = matrix_rotation_y(0.7) * matrix_translation(&Vec3::new(4.0, 1.0, -2.0));
        transforms[2] = matrix_rotation_y(-1.2) * transforms[2];

        let mut forward = Vec::new();
        resolve_absolute_transforms(asset.nodes(), &transforms, &mut forward);

        let mut recursive = vec![Mat4::zeros(); asset.node_count()];
        resolve_recursive(asset.nodes(), &transforms, 0, &Mat4::identity(), &mut recursive);

        for (a, b) in forward.iter().zip(&recursive) {
            assert_relative_eq!(*a, *b, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_render_draws_with_node_transforms() {
        let mut backend = RecordingBackend::new();
        let asset = MeshAsset::from_scene("family", &family_scene(), false, &mut backend).unwrap();
        backend.clear_commands();

        let mut transforms = asset.default_transforms();
        transforms[0].set_row3(3, &Vec3::new(10.0, 0.0, 0.0));

        let mut walk = RenderWalk::new();
        walk.render(&asset, &transforms, &mut backend);

        assert_eq!(backend.draws(), vec![3, 3, 6]);
        let root = transforms[0];
        let right = transforms[2] * root;
        let seen = backend.draw_transforms();
        assert_eq!(seen[0], Some(root));
        assert_eq!(seen[1], Some(root));
        assert_eq!(seen[2], Some(right));
        assert_relative_eq!(right.position(), Vec3::new(13.0, 0.0, 0.0), epsilon = 1e-6);
        assert_eq!(walk.absolute_transforms().len(), 3);
    }

    #[test]
    #[should_panic(expected = "transforms for a mesh with")]
    fn test_transform_count_mismatch_panics() {
        let mut backend = RecordingBackend::new();
        let asset = MeshAsset::from_scene("family", &family_scene(), false, &mut backend).unwrap();
        RenderWalk::new().render(&asset, &[Mat4::identity()], &mut backend);
    }
}
