//! Model instances: a posed copy of a mesh asset plus its render passes

use slotmap::SlotMap;

use crate::core::ControlSettings;
use crate::foundation::collections::{MeshId, ShaderId, TextureId};
use crate::foundation::math::{
    matrix_from_prs, matrix_rotation_x, matrix_rotation_y, matrix_rotation_z, Mat4, Mat4Ext, Vec3,
};
use crate::input::{ControlKeys, InputState};
use crate::render::backend::{
    BlendState, CullState, DepthState, RenderBackend, SamplerState, ShaderHandle, TextureHandle,
};
use crate::render::mesh::MeshAsset;
use crate::render::render_walk::RenderWalk;
use crate::render::RenderError;

/// Backend handles the scene has registered, looked up by key when a pass binds
#[derive(Clone, Copy)]
pub struct PassResources<'a> {
    /// Registered shader programs
    pub shaders: &'a SlotMap<ShaderId, ShaderHandle>,
    /// Registered textures
    pub textures: &'a SlotMap<TextureId, TextureHandle>,
}

/// Pipeline state for drawing a model once
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass {
    shader: ShaderId,
    textures: Vec<TextureId>,
    samplers: Vec<SamplerState>,
    blend: BlendState,
    depth: DepthState,
    cull: CullState,
}

impl RenderPass {
    /// Opaque pass: one anisotropic sampler, no blending, back-face culling,
    /// depth test and write
    pub fn new(shader: ShaderId) -> Self {
        Self {
            shader,
            textures: Vec::new(),
            samplers: vec![SamplerState::Anisotropic4x],
            blend: BlendState::NoBlending,
            depth: DepthState::UseDepthBuffer,
            cull: CullState::Back,
        }
    }

    /// Glowing marker pass for light models: additive, depth read-only, no culling
    pub fn light_marker(shader: ShaderId) -> Self {
        Self::new(shader).with_states(BlendState::Additive, DepthState::DepthReadOnly, CullState::None)
    }

    /// Append a texture in the next slot
    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.textures.push(texture);
        self
    }

    /// Replace the sampler list
    pub fn with_samplers(mut self, samplers: &[SamplerState]) -> Self {
        self.samplers = samplers.to_vec();
        self
    }

    /// Set blend, depth and cull state
    pub fn with_states(mut self, blend: BlendState, depth: DepthState, cull: CullState) -> Self {
        self.blend = blend;
        self.depth = depth;
        self.cull = cull;
        self
    }

    /// Shader program key
    pub fn shader(&self) -> ShaderId {
        self.shader
    }

    /// Textures by slot
    pub fn textures(&self) -> &[TextureId] {
        &self.textures
    }

    /// Samplers by slot
    pub fn samplers(&self) -> &[SamplerState] {
        &self.samplers
    }

    /// Blend state
    pub fn blend(&self) -> BlendState {
        self.blend
    }

    /// Depth state
    pub fn depth(&self) -> DepthState {
        self.depth
    }

    /// Cull state
    pub fn cull(&self) -> CullState {
        self.cull
    }

    /// Change the shader program
    pub fn set_shader(&mut self, shader: ShaderId) {
        self.shader = shader;
    }

    /// Set the texture in `slot`, appending when `slot` is one past the end
    ///
    /// # Panics
    ///
    /// If `slot` would leave a gap.
    pub fn set_texture(&mut self, slot: usize, texture: TextureId) {
        set_slot(&mut self.textures, slot, texture);
    }

    /// Set the sampler in `slot`, appending when `slot` is one past the end
    ///
    /// # Panics
    ///
    /// If `slot` would leave a gap.
    pub fn set_sampler(&mut self, slot: usize, sampler: SamplerState) {
        set_slot(&mut self.samplers, slot, sampler);
    }

    /// Change the blend state
    pub fn set_blend(&mut self, blend: BlendState) {
        self.blend = blend;
    }

    /// Change the depth state
    pub fn set_depth(&mut self, depth: DepthState) {
        self.depth = depth;
    }

    /// Change the cull state
    pub fn set_cull(&mut self, cull: CullState) {
        self.cull = cull;
    }

    fn bind(&self, resources: PassResources<'_>, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        let shader = resources
            .shaders
            .get(self.shader)
            .copied()
            .ok_or(RenderError::UnknownShader(self.shader))?;
        let textures = self
            .textures
            .iter()
            .map(|&id| resources.textures.get(id).copied().ok_or(RenderError::UnknownTexture(id)))
            .collect::<Result<Vec<_>, _>>()?;

        backend.set_shader(shader);
        backend.set_render_states(self.blend, self.depth, self.cull);
        backend.set_samplers(&self.samplers);
        backend.set_textures(&textures);
        Ok(())
    }
}

fn set_slot<T>(slots: &mut Vec<T>, slot: usize, value: T) {
    assert!(slot <= slots.len(), "slot {slot} leaves a gap after {} bound slots", slots.len());
    if slot == slots.len() {
        slots.push(value);
    } else {
        slots[slot] = value;
    }
}

/// A placed copy of a mesh asset.
///
/// Holds one parent-relative matrix per mesh node; node 0's matrix places
/// the whole model in the world. Node arguments are indices into the mesh's
/// flattened node array and panic when out of range.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    mesh: MeshId,
    transforms: Vec<Mat4>,
    passes: Vec<RenderPass>,
}

impl ModelInstance {
    /// New instance with the mesh's default node transforms and no passes
    pub fn new(mesh_id: MeshId, mesh: &MeshAsset) -> Self {
        Self {
            mesh: mesh_id,
            transforms: mesh.default_transforms(),
            passes: Vec::new(),
        }
    }

    /// Place the root: position, Euler rotation in radians, uniform scale
    pub fn with_placement(mut self, position: Vec3, rotation: Vec3, scale: f32) -> Self {
        self.transforms[0] = matrix_from_prs(&position, &rotation, &Vec3::repeat(scale));
        self
    }

    /// Add a render pass
    pub fn with_render_pass(mut self, pass: RenderPass) -> Self {
        self.passes.push(pass);
        self
    }

    /// Mesh this instance draws
    pub fn mesh_id(&self) -> MeshId {
        self.mesh
    }

    /// Number of node transforms
    pub fn node_count(&self) -> usize {
        self.transforms.len()
    }

    /// Parent-relative matrices, one per node
    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    /// Parent-relative matrix of a node
    pub fn world_matrix(&self, node: usize) -> &Mat4 {
        &self.transforms[node]
    }

    /// Position of a node relative to its parent
    pub fn position(&self, node: usize) -> Vec3 {
        self.transforms[node].position()
    }

    /// Euler rotation (radians) of a node
    pub fn rotation(&self, node: usize) -> Vec3 {
        self.transforms[node].euler_angles()
    }

    /// Per-axis scale of a node
    pub fn scale(&self, node: usize) -> Vec3 {
        self.transforms[node].scale_factors()
    }

    /// Replace a node's matrix
    pub fn set_world_matrix(&mut self, node: usize, matrix: Mat4) {
        self.transforms[node] = matrix;
    }

    /// Move a node, keeping rotation and scale
    pub fn set_position(&mut self, node: usize, position: Vec3) {
        self.transforms[node].set_row3(3, &position);
    }

    /// Rotate a node to absolute Euler angles, keeping position and scale
    pub fn set_rotation(&mut self, node: usize, rotation: Vec3) {
        let m = &mut self.transforms[node];
        *m = matrix_from_prs(&m.position(), &rotation, &m.scale_factors());
    }

    /// Rescale a node's axes, keeping position and rotation
    pub fn set_scale(&mut self, node: usize, scale: Vec3) {
        let m = &mut self.transforms[node];
        let axes = [Vec3::x(), Vec3::y(), Vec3::z()];
        for (row, fallback) in axes.iter().enumerate() {
            let axis = m.row3(row).try_normalize(f32::EPSILON).unwrap_or(*fallback);
            m.set_row3(row, &(axis * scale[row]));
        }
    }

    /// Rescale a node uniformly
    pub fn set_uniform_scale(&mut self, node: usize, scale: f32) {
        self.set_scale(node, Vec3::repeat(scale));
    }

    /// Turn a node's Z axis towards a point in its parent's space
    pub fn face_target(&mut self, node: usize, target: Vec3) {
        self.transforms[node].face_target(&target);
    }

    /// Keyboard control of one node.
    ///
    /// Turns are applied in the node's local space; moves follow its local
    /// Z axis.
    pub fn control(
        &mut self,
        node: usize,
        frame_time: f32,
        input: &dyn InputState,
        keys: &ControlKeys,
        settings: &ControlSettings,
    ) {
        let angle = settings.rotation_speed * frame_time;
        let m = &mut self.transforms[node];

        let turns = [
            (keys.turn_up, matrix_rotation_x(angle)),
            (keys.turn_down, matrix_rotation_x(-angle)),
            (keys.turn_right, matrix_rotation_y(angle)),
            (keys.turn_left, matrix_rotation_y(-angle)),
            (keys.turn_cw, matrix_rotation_z(angle)),
            (keys.turn_ccw, matrix_rotation_z(-angle)),
        ];
        for (key, rotation) in turns {
            if input.key_held(key) {
                *m = rotation * *m;
            }
        }

        let step = m.z_axis().try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros)
            * settings.movement_speed
            * frame_time;
        if input.key_held(keys.move_forward) {
            let position = m.position() + step;
            m.set_row3(3, &position);
        }
        if input.key_held(keys.move_backward) {
            let position = m.position() - step;
            m.set_row3(3, &position);
        }
    }

    /// Add a render pass, returning its index
    pub fn add_render_pass(&mut self, pass: RenderPass) -> usize {
        self.passes.push(pass);
        self.passes.len() - 1
    }

    /// Render passes in draw order
    pub fn render_passes(&self) -> &[RenderPass] {
        &self.passes
    }

    /// Mutable render pass for editing
    pub fn render_pass_mut(&mut self, index: usize) -> &mut RenderPass {
        &mut self.passes[index]
    }

    /// Bind pass `pass_index`'s state, then draw the hierarchy
    pub fn auto_render(
        &self,
        pass_index: usize,
        mesh: &MeshAsset,
        walk: &mut RenderWalk,
        resources: PassResources<'_>,
        backend: &mut dyn RenderBackend,
    ) -> Result<(), RenderError> {
        self.passes[pass_index].bind(resources, backend)?;
        self.render(mesh, walk, backend);
        Ok(())
    }

    /// Draw the hierarchy with whatever state the caller has bound
    pub fn render(&self, mesh: &MeshAsset, walk: &mut RenderWalk, backend: &mut dyn RenderBackend) {
        walk.render(mesh, &self.transforms, backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputManager, KeyCode};
    use crate::render::mesh::tests::family_scene;
    use crate::render::recording::{BackendCommand, RecordingBackend};
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-4;

    fn family_model(backend: &mut RecordingBackend) -> (MeshAsset, ModelInstance) {
        let asset = MeshAsset::from_scene("family", &family_scene(), false, backend).unwrap();
        let mut meshes: SlotMap<MeshId, ()> = SlotMap::with_key();
        let model = ModelInstance::new(meshes.insert(()), &asset);
        (asset, model)
    }

    #[test]
    fn test_position_round_trip_is_exact() {
        let mut backend = RecordingBackend::new();
        let (_, mut model) = family_model(&mut backend);
        model.set_rotation(0, Vec3::new(0.4, 1.0, -0.3));
        model.set_position(0, Vec3::new(10.0, -2.5, 7.25));
        assert_eq!(model.position(0), Vec3::new(10.0, -2.5, 7.25));
    }

    #[test]
    fn test_rotation_round_trip() {
        let mut backend = RecordingBackend::new();
        let (_, mut model) = family_model(&mut backend);
        model.set_position(2, Vec3::new(1.0, 2.0, 3.0));
        model.set_uniform_scale(2, 3.0);
        model.set_rotation(2, Vec3::new(0.5, -0.25, 1.5));

        assert_relative_eq!(model.rotation(2), Vec3::new(0.5, -0.25, 1.5), epsilon = EPSILON);
        assert_relative_eq!(model.scale(2), Vec3::repeat(3.0), epsilon = EPSILON);
        assert_eq!(model.position(2), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_scale_round_trip_keeps_rotation() {
        let mut backend = RecordingBackend::new();
        let (_, mut model) = family_model(&mut backend);
        model.set_rotation(0, Vec3::new(0.1, 0.2, 0.3));
        model.set_scale(0, Vec3::new(2.0, 4.0, 0.5));

        assert_relative_eq!(model.scale(0), Vec3::new(2.0, 4.0, 0.5), epsilon = EPSILON);
        assert_relative_eq!(model.rotation(0), Vec3::new(0.1, 0.2, 0.3), epsilon = EPSILON);
    }

    #[test]
    fn test_with_placement_sets_root() {
        let mut backend = RecordingBackend::new();
        let (_, model) = family_model(&mut backend);
        let model = model.with_placement(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, 0.5, 0.0), 2.0);

        assert_relative_eq!(model.position(0), Vec3::new(0.0, 5.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(model.rotation(0).y, 0.5, epsilon = EPSILON);
        assert_relative_eq!(model.scale(0), Vec3::repeat(2.0), epsilon = EPSILON);
        assert_eq!(model.position(2), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_control_turns_and_moves() {
        let mut backend = RecordingBackend::new();
        let (_, mut model) = family_model(&mut backend);
        let settings = ControlSettings::default();
        let keys = ControlKeys::ijkl();
        let mut input = InputManager::new();

        input.handle_key_input(KeyCode::Period, true);
        model.control(0, 0.1, &input, &keys, &settings);
        assert_relative_eq!(model.position(0), Vec3::new(0.0, 0.0, 5.0), epsilon = EPSILON);

        input.handle_key_input(KeyCode::Period, false);
        input.handle_key_input(KeyCode::L, true);
        model.control(0, 0.25, &input, &keys, &settings);
        assert_relative_eq!(model.rotation(0), Vec3::new(0.0, 0.5, 0.0), epsilon = EPSILON);
        // Turning happens in place
        assert_relative_eq!(model.position(0), Vec3::new(0.0, 0.0, 5.0), epsilon = EPSILON);
    }

    #[test]
    fn test_control_moves_along_local_z_ignoring_scale() {
        let mut backend = RecordingBackend::new();
        let (_, mut model) = family_model(&mut backend);
        model.set_rotation(0, Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        model.set_uniform_scale(0, 4.0);
        let mut input = InputManager::new();
        input.handle_key_input(KeyCode::Comma, true);

        model.control(0, 0.2, &input, &ControlKeys::ijkl(), &ControlSettings::default());
        // Facing +X after a quarter turn, backwards is -X
        assert_relative_eq!(model.position(0), Vec3::new(-10.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_face_target() {
        let mut backend = RecordingBackend::new();
        let (_, mut model) = family_model(&mut backend);
        model.face_target(0, Vec3::new(0.0, 0.0, -10.0));
        assert_relative_eq!(model.world_matrix(0).z_axis(), Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_auto_render_binds_pass_state_first() {
        let mut backend = RecordingBackend::new();
        let (asset, model) = family_model(&mut backend);

        let mut shaders: SlotMap<ShaderId, ShaderHandle> = SlotMap::with_key();
        let mut textures: SlotMap<TextureId, TextureHandle> = SlotMap::with_key();
        let shader = shaders.insert(ShaderHandle(7));
        let texture = textures.insert(TextureHandle(9));

        let mut model = model.with_render_pass(RenderPass::new(shader).with_texture(texture));
        model.render_pass_mut(0).set_cull(CullState::None);
        backend.clear_commands();

        let resources = PassResources { shaders: &shaders, textures: &textures };
        model
            .auto_render(0, &asset, &mut RenderWalk::new(), resources, &mut backend)
            .unwrap();

        let commands = backend.commands();
        assert_eq!(commands[0], BackendCommand::SetShader(ShaderHandle(7)));
        assert_eq!(
            commands[1],
            BackendCommand::SetRenderStates(BlendState::NoBlending, DepthState::UseDepthBuffer, CullState::None)
        );
        assert_eq!(commands[2], BackendCommand::SetSamplers(vec![SamplerState::Anisotropic4x]));
        assert_eq!(commands[3], BackendCommand::SetTextures(vec![TextureHandle(9)]));
        assert_eq!(backend.draws().len(), 3);
    }

    #[test]
    fn test_auto_render_unknown_texture() {
        let mut backend = RecordingBackend::new();
        let (asset, model) = family_model(&mut backend);

        let mut shaders: SlotMap<ShaderId, ShaderHandle> = SlotMap::with_key();
        let mut textures: SlotMap<TextureId, TextureHandle> = SlotMap::with_key();
        let shader = shaders.insert(ShaderHandle(1));
        let stale = textures.insert(TextureHandle(2));
        textures.remove(stale);

        let model = model.with_render_pass(RenderPass::new(shader).with_texture(stale));
        let resources = PassResources { shaders: &shaders, textures: &textures };
        let result = model.auto_render(0, &asset, &mut RenderWalk::new(), resources, &mut backend);
        assert_eq!(result, Err(RenderError::UnknownTexture(stale)));
    }

    #[test]
    #[should_panic(expected = "leaves a gap")]
    fn test_sampler_slot_gap_panics() {
        let mut shaders: SlotMap<ShaderId, ShaderHandle> = SlotMap::with_key();
        let mut pass = RenderPass::new(shaders.insert(ShaderHandle(1)));
        pass.set_sampler(1, SamplerState::Point);
        pass.set_sampler(3, SamplerState::Point);
    }
}
