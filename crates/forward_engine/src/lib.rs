//! # Forward Engine
//!
//! A small forward-lit rendering core: mesh hierarchies imported from scene
//! files, posable model instances, and a per-frame light aggregation pass
//! that packs point, spot and directional lights into one GPU constant block.
//!
//! ## Features
//!
//! - **Mesh hierarchies**: node trees flattened parent-first so absolute
//!   transforms resolve in a single forward pass
//! - **Model instances**: one pose per node, keyboard control, render passes
//! - **Lighting**: fixed-capacity light arrays with a configurable overflow policy
//! - **Backend seam**: every GPU call goes through [`render::RenderBackend`];
//!   [`render::RecordingBackend`] runs the whole pipeline headless
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forward_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = EngineSettings::default();
//!     forward_engine::foundation::logging::init_with_level(&settings.log_level)?;
//!
//!     let mut backend = RecordingBackend::new();
//!     let mut scene = Scene::new(settings);
//!     let shader = scene.register_shader(ShaderHandle(1));
//!
//!     let mesh = scene.load_mesh(&ObjImporter, "cube.obj", &ImportOptions::default(), false, &mut backend)?;
//!     let cube = scene.add_model(mesh)?;
//!     if let Some(model) = scene.model_mut(cube) {
//!         model.add_render_pass(RenderPass::new(shader));
//!     }
//!     let light = scene.add_light(LightType::Point, Vec3::new(1.0, 0.8, 0.6), 10.0, mesh)?;
//!     scene.add_orbit(OrbitAnimator::new(light, cube))?;
//!
//!     let input = InputManager::new();
//!     scene.update(1.0 / 60.0, &input);
//!     scene.render(&mut backend)?;
//!     scene.shutdown(&mut backend);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod core;
pub mod foundation;
pub mod input;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetError, ImportOptions, ObjImporter, SceneImporter},
        core::{CapacityPolicy, Config, EngineSettings, LightingSettings},
        foundation::{
            collections::{LightId, MeshId, ModelId, ShaderId, TextureId},
            math::{Mat4, Mat4Ext, Vec3},
            time::FrameTimer,
        },
        input::{ControlKeys, InputManager, InputState, KeyCode},
        render::{
            Camera, LightSource, LightType, MeshAsset, ModelInstance, PerFrameConstants, RecordingBackend,
            RenderBackend, RenderPass, ShaderHandle, TextureHandle,
        },
        scene::{OrbitAnimator, Scene, SceneError},
    };

    #[cfg(feature = "gltf")]
    pub use crate::assets::GltfImporter;
}
