//! Scene context: owns every asset and instance and drives the frame
//!
//! Meshes, models, lights and registered backend resources live in arenas
//! keyed by typed ids. Models refer to meshes by [`MeshId`] and lights to
//! their companion model by [`ModelId`], so a stale key is a lookup miss
//! rather than a dangling reference.

use std::path::Path;

use crate::assets::{ImportOptions, SceneImporter};
use crate::core::{CapacityPolicy, EngineSettings};
use crate::foundation::collections::{LightId, MeshId, ModelId, ShaderId, SlotMap, TextureId};
use crate::foundation::math::Vec3;
use crate::foundation::time::WrappingTimer;
use crate::input::{CameraKeys, ControlKeys, InputState};
use crate::render::backend::{RenderBackend, ShaderHandle, TextureHandle};
use crate::render::camera::Camera;
use crate::render::frame::{FrameAggregator, FrameInputs, PerFrameConstants};
use crate::render::lighting::{LightSource, LightType};
use crate::render::mesh::MeshAsset;
use crate::render::model::{ModelInstance, PassResources};
use crate::render::render_walk::RenderWalk;
use crate::render::RenderError;
use crate::scene::animators::{AnimatedProperty, Bounce, LightAnimator, OrbitAnimator};
use crate::scene::SceneError;

/// Smallest marker scale, so a dark light keeps its marker's orientation
const MIN_MARKER_SCALE: f32 = 1e-3;

/// Keyboard control attached to one node of a model
#[derive(Debug, Clone)]
struct ModelControl {
    model: ModelId,
    node: usize,
    keys: ControlKeys,
}

/// Explicit scene context passed to update and render
pub struct Scene {
    settings: EngineSettings,
    camera: Camera,
    camera_keys: Option<CameraKeys>,

    meshes: SlotMap<MeshId, MeshAsset>,
    models: SlotMap<ModelId, ModelInstance>,
    lights: SlotMap<LightId, LightSource>,
    shaders: SlotMap<ShaderId, ShaderHandle>,
    textures: SlotMap<TextureId, TextureHandle>,

    // Insertion order, which is also draw and aggregation order
    draw_order: Vec<ModelId>,
    light_order: Vec<LightId>,

    controls: Vec<ModelControl>,
    orbits: Vec<OrbitAnimator>,
    light_animators: Vec<LightAnimator>,

    timer: WrappingTimer,
    aggregator: FrameAggregator,
    walk: RenderWalk,
}

impl Scene {
    /// Empty scene with a default camera
    pub fn new(settings: EngineSettings) -> Self {
        let timer = WrappingTimer::new(settings.timer_wrap);
        Self {
            settings,
            camera: Camera::default(),
            camera_keys: None,
            meshes: SlotMap::with_key(),
            models: SlotMap::with_key(),
            lights: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            draw_order: Vec::new(),
            light_order: Vec::new(),
            controls: Vec::new(),
            orbits: Vec::new(),
            light_animators: Vec::new(),
            timer,
            aggregator: FrameAggregator::new(),
            walk: RenderWalk::new(),
        }
    }

    /// Engine settings
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Scene camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Scene camera for placement
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Drive the camera from the keyboard during [`Scene::update`]
    pub fn set_camera_keys(&mut self, keys: Option<CameraKeys>) {
        self.camera_keys = keys;
    }

    /// Current wrapped scene time in seconds
    pub fn timer(&self) -> f32 {
        self.timer.value()
    }

    // Backend resources

    /// Register a shader program created by the backend
    pub fn register_shader(&mut self, shader: ShaderHandle) -> ShaderId {
        self.shaders.insert(shader)
    }

    /// Register a texture created by the backend
    pub fn register_texture(&mut self, texture: TextureHandle) -> TextureId {
        self.textures.insert(texture)
    }

    // Meshes

    /// Import a mesh file and upload it
    pub fn load_mesh(
        &mut self,
        importer: &dyn SceneImporter,
        path: impl AsRef<Path>,
        options: &ImportOptions,
        require_tangents: bool,
        backend: &mut dyn RenderBackend,
    ) -> Result<MeshId, SceneError> {
        let path = path.as_ref();
        let mesh = MeshAsset::load(importer, path, options, require_tangents, backend)?;
        let id = self.meshes.insert(mesh);
        log::debug!("Registered mesh {} as {:?}", path.display(), id);
        Ok(id)
    }

    /// Take ownership of an uploaded mesh
    pub fn add_mesh(&mut self, mesh: MeshAsset) -> MeshId {
        self.meshes.insert(mesh)
    }

    /// Mesh by id
    pub fn mesh(&self, id: MeshId) -> Option<&MeshAsset> {
        self.meshes.get(id)
    }

    /// Release a mesh's GPU resources. Fails while any model still draws it.
    pub fn remove_mesh(&mut self, id: MeshId, backend: &mut dyn RenderBackend) -> Result<(), SceneError> {
        let users = self.models.values().filter(|model| model.mesh_id() == id).count();
        if users > 0 {
            return Err(SceneError::MeshInUse { mesh: id, models: users });
        }
        let mesh = self.meshes.remove(id).ok_or(SceneError::UnknownMesh(id))?;
        mesh.release(backend);
        Ok(())
    }

    // Models

    /// Place a new instance of a mesh with its default pose
    pub fn add_model(&mut self, mesh_id: MeshId) -> Result<ModelId, SceneError> {
        let mesh = self.meshes.get(mesh_id).ok_or(SceneError::UnknownMesh(mesh_id))?;
        let model = ModelInstance::new(mesh_id, mesh);
        Ok(self.insert_model(model))
    }

    /// Place a model built by the caller
    pub fn add_model_instance(&mut self, model: ModelInstance) -> Result<ModelId, SceneError> {
        let mesh = self
            .meshes
            .get(model.mesh_id())
            .ok_or(SceneError::UnknownMesh(model.mesh_id()))?;
        if mesh.node_count() != model.node_count() {
            return Err(SceneError::NodeCountMismatch {
                expected: mesh.node_count(),
                actual: model.node_count(),
            });
        }
        Ok(self.insert_model(model))
    }

    fn insert_model(&mut self, model: ModelInstance) -> ModelId {
        let id = self.models.insert(model);
        self.draw_order.push(id);
        id
    }

    /// Model by id
    pub fn model(&self, id: ModelId) -> Option<&ModelInstance> {
        self.models.get(id)
    }

    /// Model by id for posing or editing passes
    pub fn model_mut(&mut self, id: ModelId) -> Option<&mut ModelInstance> {
        self.models.get_mut(id)
    }

    /// Number of models, light markers included
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Remove a model with its controls and any orbits centred on it.
    ///
    /// A light's companion model can only go with [`Scene::remove_light`].
    pub fn remove_model(&mut self, id: ModelId) -> Result<ModelInstance, SceneError> {
        if let Some(light) = self.light_order.iter().find(|&&light| self.lights[light].model() == id) {
            return Err(SceneError::ModelOwnedByLight { model: id, light: *light });
        }
        let model = self.models.remove(id).ok_or(SceneError::UnknownModel(id))?;
        self.draw_order.retain(|&other| other != id);
        self.controls.retain(|control| control.model != id);
        self.orbits.retain(|orbit| orbit.centre() != id);
        Ok(model)
    }

    // Lights

    /// Place a light whose marker is an instance of `marker_mesh`.
    ///
    /// The marker is scaled by the light's strength. Under
    /// [`CapacityPolicy::Reject`] placing more lights of a type than the
    /// frame constants hold fails.
    pub fn add_light(
        &mut self,
        light_type: LightType,
        colour: Vec3,
        strength: f32,
        marker_mesh: MeshId,
    ) -> Result<LightId, SceneError> {
        if self.settings.lighting.capacity_policy == CapacityPolicy::Reject {
            let active = self.lights.values().filter(|light| light.light_type() == light_type).count();
            let capacity = light_type.capacity();
            if active >= capacity {
                return Err(RenderError::LightCapacity { light_type, capacity, active: active + 1 }.into());
            }
        }

        let mesh = self.meshes.get(marker_mesh).ok_or(SceneError::UnknownMesh(marker_mesh))?;
        let model_id = self.models.insert(ModelInstance::new(marker_mesh, mesh));
        let light = LightSource::new(light_type, colour, strength, model_id);
        self.models[model_id].set_uniform_scale(0, marker_scale(&light));

        let id = self.lights.insert(light);
        self.light_order.push(id);
        log::info!("Placed {:?} light {:?} with strength {}", light_type, id, strength);
        Ok(id)
    }

    /// Light by id
    pub fn light(&self, id: LightId) -> Option<&LightSource> {
        self.lights.get(id)
    }

    /// Light by id for colour or cone changes; use [`Scene::set_light_strength`]
    /// to keep the marker size in step
    pub fn light_mut(&mut self, id: LightId) -> Option<&mut LightSource> {
        self.lights.get_mut(id)
    }

    /// Number of lights
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Change a light's strength and rescale its marker
    pub fn set_light_strength(&mut self, id: LightId, strength: f32) -> Result<(), SceneError> {
        let light = self.lights.get_mut(id).ok_or(SceneError::UnknownLight(id))?;
        light.set_strength(strength);
        let scale = marker_scale(light);
        let model = light.model();
        if let Some(model) = self.models.get_mut(model) {
            model.set_uniform_scale(0, scale);
        }
        Ok(())
    }

    /// Remove a light together with its marker model and animators
    pub fn remove_light(&mut self, id: LightId) -> Result<LightSource, SceneError> {
        let light = self.lights.remove(id).ok_or(SceneError::UnknownLight(id))?;
        self.light_order.retain(|&other| other != id);
        self.orbits.retain(|orbit| orbit.light() != id);
        self.light_animators.retain(|animator| animator.light() != id);

        let model = light.model();
        self.models.remove(model);
        self.controls.retain(|control| control.model != model);
        self.orbits.retain(|orbit| orbit.centre() != model);
        Ok(light)
    }

    // Animation and control

    /// Drive `node` of a model from the keyboard every update
    ///
    /// # Panics
    ///
    /// If `node` is not a node of the model's mesh.
    pub fn add_control(&mut self, model: ModelId, node: usize, keys: ControlKeys) -> Result<(), SceneError> {
        let instance = self.models.get(model).ok_or(SceneError::UnknownModel(model))?;
        assert!(
            node < instance.node_count(),
            "node {node} out of range for a model with {} nodes",
            instance.node_count()
        );
        self.controls.push(ModelControl { model, node, keys });
        Ok(())
    }

    /// Circle a light's marker around a model
    pub fn add_orbit(&mut self, orbit: OrbitAnimator) -> Result<(), SceneError> {
        if !self.lights.contains_key(orbit.light()) {
            return Err(SceneError::UnknownLight(orbit.light()));
        }
        if !self.models.contains_key(orbit.centre()) {
            return Err(SceneError::UnknownModel(orbit.centre()));
        }
        self.orbits.push(orbit);
        Ok(())
    }

    /// Orbits in update order
    pub fn orbits(&self) -> &[OrbitAnimator] {
        &self.orbits
    }

    /// Step a light property every update
    pub fn add_light_animator(&mut self, animator: LightAnimator) -> Result<(), SceneError> {
        if !self.lights.contains_key(animator.light()) {
            return Err(SceneError::UnknownLight(animator.light()));
        }
        self.light_animators.push(animator);
        Ok(())
    }

    /// Pulse a light's strength between the configured bounds
    pub fn add_pulse(&mut self, light: LightId) -> Result<(), SceneError> {
        let bounce = Bounce::pulse(&self.settings.pulse);
        self.add_light_animator(LightAnimator::new(light, AnimatedProperty::Strength, bounce))
    }

    /// Advance the timer, then apply controls, orbits, light animators and
    /// camera control in that order
    pub fn update(&mut self, frame_time: f32, input: &dyn InputState) {
        self.timer.advance(frame_time);

        for control in &self.controls {
            if let Some(model) = self.models.get_mut(control.model) {
                model.control(control.node, frame_time, input, &control.keys, &self.settings.control);
            }
        }

        for orbit in &mut self.orbits {
            let centre = self.models.get(orbit.centre()).map(|model| model.position(0));
            let marker = self.lights.get(orbit.light()).map(LightSource::model);
            if let (Some(centre), Some(marker)) = (centre, marker) {
                if let Some(model) = self.models.get_mut(marker) {
                    model.set_position(0, orbit.position_around(centre));
                }
            }
            orbit.advance(frame_time, input);
        }

        for animator in &mut self.light_animators {
            let Some(light) = self.lights.get_mut(animator.light()) else {
                continue;
            };
            animator.apply(light);
            if animator.property() == AnimatedProperty::Strength {
                if let Some(model) = self.models.get_mut(light.model()) {
                    model.set_uniform_scale(0, marker_scale(light));
                }
            }
        }

        if let Some(keys) = &self.camera_keys {
            self.camera.control(frame_time, input, keys, &self.settings.control);
        }
    }

    // Rendering

    /// Aggregate lights and scene parameters into this frame's constant block
    pub fn frame_constants(&mut self) -> Result<PerFrameConstants, SceneError> {
        let pairs = self
            .light_order
            .iter()
            .map(|&id| {
                let light = &self.lights[id];
                self.models
                    .get(light.model())
                    .map(|model| (light, model))
                    .ok_or(RenderError::MissingLightModel { light: id, model: light.model() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let inputs = FrameInputs {
            camera: &self.camera,
            lighting: &self.settings.lighting,
            timer: self.timer.value(),
        };
        Ok(self.aggregator.aggregate(pairs, &inputs)?)
    }

    /// Render one frame.
    ///
    /// The constant block is uploaded once, before any draw. Models then draw
    /// every render pass in placement order, followed by light markers
    /// coloured with their light's colour. Models without passes are skipped.
    pub fn render(&mut self, backend: &mut dyn RenderBackend) -> Result<(), SceneError> {
        let constants = self.frame_constants()?;
        backend.upload_frame_constants(&constants);

        let resources = PassResources { shaders: &self.shaders, textures: &self.textures };

        for &id in &self.draw_order {
            let model = &self.models[id];
            let mesh = self
                .meshes
                .get(model.mesh_id())
                .ok_or(RenderError::UnknownMesh(model.mesh_id()))?;
            for pass in 0..model.render_passes().len() {
                model.auto_render(pass, mesh, &mut self.walk, resources, backend)?;
            }
        }

        for &id in &self.light_order {
            let light = &self.lights[id];
            let model = self
                .models
                .get(light.model())
                .ok_or(RenderError::MissingLightModel { light: id, model: light.model() })?;
            if model.render_passes().is_empty() {
                continue;
            }
            let mesh = self
                .meshes
                .get(model.mesh_id())
                .ok_or(RenderError::UnknownMesh(model.mesh_id()))?;
            backend.set_object_colour(&light.colour());
            for pass in 0..model.render_passes().len() {
                model.auto_render(pass, mesh, &mut self.walk, resources, backend)?;
            }
        }
        Ok(())
    }

    /// Release every mesh's GPU resources
    pub fn shutdown(self, backend: &mut dyn RenderBackend) {
        log::info!("Shutting down scene with {} meshes", self.meshes.len());
        for (_, mesh) in self.meshes {
            mesh.release(backend);
        }
    }
}

fn marker_scale(light: &LightSource) -> f32 {
    light.marker_scale().max(MIN_MARKER_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryImporter;
    use crate::core::LightingSettings;
    use crate::foundation::math::{matrix_translation, Mat4Ext};
    use crate::input::{InputManager, KeyCode};
    use crate::render::mesh::tests::family_scene;
    use crate::render::model::RenderPass;
    use crate::render::recording::{BackendCommand, RecordingBackend};
    use approx::assert_relative_eq;

    fn scene_with_mesh(settings: EngineSettings, backend: &mut RecordingBackend) -> (Scene, MeshId) {
        crate::foundation::logging::init_for_tests();
        let importer = MemoryImporter::new().with_scene("family.obj", family_scene());
        let mut scene = Scene::new(settings);
        let mesh = scene
            .load_mesh(&importer, "family.obj", &ImportOptions::default(), false, backend)
            .unwrap();
        (scene, mesh)
    }

    #[test]
    fn test_render_positioned_hierarchy() {
        let mut backend = RecordingBackend::new();
        let (mut scene, mesh) = scene_with_mesh(EngineSettings::default(), &mut backend);
        let shader = scene.register_shader(ShaderHandle(1));

        let id = scene.add_model(mesh).unwrap();
        let model = scene.model_mut(id).unwrap();
        model.set_position(0, Vec3::new(10.0, 0.0, 0.0));
        model.add_render_pass(RenderPass::new(shader));

        backend.clear_commands();
        scene.render(&mut backend).unwrap();

        assert!(matches!(backend.commands()[0], BackendCommand::UploadFrameConstants(_)));
        assert_eq!(backend.frame_uploads().len(), 1);
        assert_eq!(backend.draws(), vec![3, 3, 6]);

        let root = matrix_translation(&Vec3::new(10.0, 0.0, 0.0));
        let child = matrix_translation(&Vec3::new(3.0, 0.0, 0.0)) * root;
        let transforms = backend.draw_transforms();
        assert_eq!(transforms[0], Some(root));
        assert_eq!(transforms[1], Some(root));
        assert_relative_eq!(transforms[2].unwrap(), child, epsilon = 1e-6);
    }

    #[test]
    fn test_five_point_lights_truncate_to_four() {
        let mut backend = RecordingBackend::new();
        let (mut scene, mesh) = scene_with_mesh(EngineSettings::default(), &mut backend);
        for _ in 0..5 {
            scene.add_light(LightType::Point, Vec3::repeat(1.0), 1.0, mesh).unwrap();
        }

        let constants = scene.frame_constants().unwrap();
        assert_eq!(scene.light_count(), 5);
        assert_eq!(constants.num_point_lights, 4);
    }

    #[test]
    fn test_reject_policy_refuses_placement() {
        let mut backend = RecordingBackend::new();
        let lighting = LightingSettings::default().with_capacity_policy(CapacityPolicy::Reject);
        let (mut scene, mesh) = scene_with_mesh(EngineSettings::default().with_lighting(lighting), &mut backend);
        for _ in 0..4 {
            scene.add_light(LightType::Spot, Vec3::repeat(1.0), 1.0, mesh).unwrap();
        }

        let result = scene.add_light(LightType::Spot, Vec3::repeat(1.0), 1.0, mesh);
        assert!(matches!(
            result,
            Err(SceneError::Render(RenderError::LightCapacity { light_type: LightType::Spot, capacity: 4, active: 5 }))
        ));
        // Other types are unaffected
        assert!(scene.add_light(LightType::Point, Vec3::repeat(1.0), 1.0, mesh).is_ok());
    }

    #[test]
    fn test_mesh_in_use_cannot_be_removed() {
        let mut backend = RecordingBackend::new();
        let (mut scene, mesh) = scene_with_mesh(EngineSettings::default(), &mut backend);
        let model = scene.add_model(mesh).unwrap();

        let result = scene.remove_mesh(mesh, &mut backend);
        assert!(matches!(result, Err(SceneError::MeshInUse { models: 1, .. })));

        scene.remove_model(model).unwrap();
        scene.remove_mesh(mesh, &mut backend).unwrap();
        assert_eq!(backend.live_buffers(), 0);
        assert!(matches!(scene.add_model(mesh), Err(SceneError::UnknownMesh(_))));
    }

    #[test]
    fn test_light_model_removed_with_light() {
        let mut backend = RecordingBackend::new();
        let (mut scene, mesh) = scene_with_mesh(EngineSettings::default(), &mut backend);
        let light = scene.add_light(LightType::Point, Vec3::repeat(1.0), 1.0, mesh).unwrap();
        let marker = scene.light(light).unwrap().model();

        assert!(matches!(scene.remove_model(marker), Err(SceneError::ModelOwnedByLight { .. })));
        scene.add_pulse(light).unwrap();

        scene.remove_light(light).unwrap();
        assert!(scene.model(marker).is_none());
        assert_eq!(scene.model_count(), 0);
        // Animators for the light went with it
        scene.update(0.1, &InputManager::new());
    }

    #[test]
    fn test_orbit_moves_marker_and_toggles() {
        let mut backend = RecordingBackend::new();
        let (mut scene, mesh) = scene_with_mesh(EngineSettings::default(), &mut backend);
        let centre = scene.add_model(mesh).unwrap();
        scene.model_mut(centre).unwrap().set_position(0, Vec3::new(0.0, 5.0, 0.0));
        let light = scene.add_light(LightType::Point, Vec3::repeat(1.0), 1.0, mesh).unwrap();
        scene.add_orbit(OrbitAnimator::new(light, centre)).unwrap();

        let mut input = InputManager::new();
        scene.update(1.0, &input);
        let marker = scene.light(light).unwrap().model();
        assert_relative_eq!(scene.model(marker).unwrap().position(0), Vec3::new(20.0, 15.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(scene.orbits()[0].angle(), -0.7, epsilon = 1e-6);

        input.handle_key_input(KeyCode::Num1, true);
        scene.update(1.0, &input);
        input.end_frame();
        assert!(!scene.orbits()[0].is_running());

        scene.update(1.0, &input);
        assert_relative_eq!(scene.orbits()[0].angle(), -1.4, epsilon = 1e-6);
    }

    #[test]
    fn test_pulse_rescales_marker() {
        let mut backend = RecordingBackend::new();
        let (mut scene, mesh) = scene_with_mesh(EngineSettings::default(), &mut backend);
        let light = scene.add_light(LightType::Point, Vec3::repeat(1.0), 10.0, mesh).unwrap();
        scene.add_pulse(light).unwrap();

        scene.update(0.016, &InputManager::new());
        let strength = scene.light(light).unwrap().strength();
        assert_relative_eq!(strength, 9.8, epsilon = 1e-5);

        let marker = scene.light(light).unwrap().model();
        let scale = scene.model(marker).unwrap().scale(0);
        assert_relative_eq!(scale, Vec3::repeat(9.8f32.powf(0.7)), epsilon = 1e-4);
    }

    #[test]
    fn test_strength_change_keeps_marker_facing() {
        let mut backend = RecordingBackend::new();
        let (mut scene, mesh) = scene_with_mesh(EngineSettings::default(), &mut backend);
        let light = scene.add_light(LightType::Spot, Vec3::repeat(1.0), 1.0, mesh).unwrap();
        let marker = scene.light(light).unwrap().model();
        scene.model_mut(marker).unwrap().face_target(0, Vec3::new(10.0, 0.0, 0.0));

        scene.set_light_strength(light, 0.0).unwrap();
        scene.set_light_strength(light, 2.0).unwrap();

        let root = *scene.model(marker).unwrap().world_matrix(0);
        assert_relative_eq!(root.z_axis().normalize(), Vec3::x(), epsilon = 1e-4);
        assert_relative_eq!(root.scale_factors(), Vec3::repeat(2f32.powf(0.7)), epsilon = 1e-4);
    }

    #[test]
    fn test_timer_wraps() {
        let settings = EngineSettings { timer_wrap: 10.0, ..EngineSettings::default() };
        let mut scene = Scene::new(settings);
        let input = InputManager::new();

        scene.update(6.0, &input);
        assert_eq!(scene.timer(), 6.0);
        scene.update(6.0, &input);
        assert_eq!(scene.timer(), 0.0);
        assert_eq!(scene.frame_constants().unwrap().timer, 0.0);
    }

    #[test]
    fn test_markers_draw_after_models_with_light_colour() {
        let mut backend = RecordingBackend::new();
        let (mut scene, mesh) = scene_with_mesh(EngineSettings::default(), &mut backend);
        let shader = scene.register_shader(ShaderHandle(1));
        let glow = scene.register_shader(ShaderHandle(2));

        let light = scene.add_light(LightType::Point, Vec3::new(1.0, 0.5, 0.0), 1.0, mesh).unwrap();
        let marker = scene.light(light).unwrap().model();
        scene.model_mut(marker).unwrap().add_render_pass(RenderPass::light_marker(glow));
        let model = scene.add_model(mesh).unwrap();
        scene.model_mut(model).unwrap().add_render_pass(RenderPass::new(shader));

        backend.clear_commands();
        scene.render(&mut backend).unwrap();

        let commands = backend.commands();
        let shaders: Vec<_> = commands
            .iter()
            .filter_map(|command| match command {
                BackendCommand::SetShader(handle) => Some(*handle),
                _ => None,
            })
            .collect();
        assert_eq!(shaders, vec![ShaderHandle(1), ShaderHandle(2)]);

        let colour = commands
            .iter()
            .position(|command| *command == BackendCommand::SetObjectColour(Vec3::new(1.0, 0.5, 0.0)))
            .unwrap();
        let glow_bind = commands
            .iter()
            .position(|command| *command == BackendCommand::SetShader(ShaderHandle(2)))
            .unwrap();
        assert!(colour < glow_bind);
        assert_eq!(backend.draws().len(), 6);
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let mut backend = RecordingBackend::new();
        let (mut scene, mesh) = scene_with_mesh(EngineSettings::default(), &mut backend);
        let light = scene.add_light(LightType::Point, Vec3::repeat(1.0), 1.0, mesh).unwrap();
        scene.remove_light(light).unwrap();

        assert!(matches!(scene.set_light_strength(light, 1.0), Err(SceneError::UnknownLight(_))));
        assert!(matches!(scene.add_pulse(light), Err(SceneError::UnknownLight(_))));
        assert!(matches!(scene.remove_light(light), Err(SceneError::UnknownLight(_))));
    }
}
