//! Scene ownership and per-frame flow
//!
//! The [`Scene`] owns every mesh, model, light and registered GPU resource
//! in arenas keyed by typed ids. Each frame the driver calls
//! [`Scene::update`] with the frame time and keyboard state, then
//! [`Scene::render`] with a backend.

pub mod animators;
pub mod scene_manager;

use thiserror::Error;

use crate::assets::AssetError;
use crate::foundation::collections::{LightId, MeshId, ModelId};
use crate::render::{BackendError, RenderError};

pub use animators::{AnimatedProperty, Bounce, LightAnimator, OrbitAnimator};
pub use scene_manager::Scene;

/// Scene errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// No mesh with this id
    #[error("Unknown mesh {0:?}")]
    UnknownMesh(MeshId),

    /// No model with this id
    #[error("Unknown model {0:?}")]
    UnknownModel(ModelId),

    /// No light with this id
    #[error("Unknown light {0:?}")]
    UnknownLight(LightId),

    /// The mesh is still drawn by some models
    #[error("Mesh {mesh:?} is used by {models} model(s)")]
    MeshInUse {
        /// Mesh being removed
        mesh: MeshId,
        /// Models still using it
        models: usize,
    },

    /// The model places a light and must be removed with it
    #[error("Model {model:?} belongs to light {light:?}")]
    ModelOwnedByLight {
        /// Model being removed
        model: ModelId,
        /// Owning light
        light: LightId,
    },

    /// A model's transform count does not match its mesh
    #[error("Model has {actual} node transforms, mesh has {expected} nodes")]
    NodeCountMismatch {
        /// Mesh node count
        expected: usize,
        /// Model transform count
        actual: usize,
    },

    /// Mesh import or upload failed
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// GPU resource creation failed
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Frame rendering failed
    #[error(transparent)]
    Render(#[from] RenderError),
}
