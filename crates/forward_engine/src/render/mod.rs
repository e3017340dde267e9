//! Rendering layer
//!
//! Mesh assets own GPU geometry and a flattened node hierarchy; model
//! instances pose them; the render walk draws a posed hierarchy through a
//! [`RenderBackend`]. Lights are gathered once per frame into a
//! [`PerFrameConstants`] block.

pub mod backend;
pub mod camera;
pub mod frame;
pub mod lighting;
pub mod mesh;
pub mod model;
pub mod recording;
pub mod render_walk;

use thiserror::Error;

use crate::foundation::collections::{LightId, MeshId, ModelId, ShaderId, TextureId};

pub use backend::{
    BackendError, BackendResult, BlendState, BufferHandle, BufferKind, CullState, DepthState, InputLayoutHandle,
    RenderBackend, SamplerState, ShaderHandle, TextureHandle,
};
pub use camera::Camera;
pub use frame::{FrameAggregator, FrameInputs, PerFrameConstants, PerModelConstants};
pub use lighting::{LightSource, LightType};
pub use mesh::{MeshAsset, Node, SubMesh};
pub use model::{ModelInstance, PassResources, RenderPass};
pub use recording::{BackendCommand, RecordingBackend};
pub use render_walk::RenderWalk;

/// Errors raised while rendering a frame
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A render pass names a shader that is not registered
    #[error("Unknown shader {0:?}")]
    UnknownShader(ShaderId),

    /// A render pass names a texture that is not registered
    #[error("Unknown texture {0:?}")]
    UnknownTexture(TextureId),

    /// A model's mesh is not loaded
    #[error("Unknown mesh {0:?}")]
    UnknownMesh(MeshId),

    /// A light's companion model is missing
    #[error("Light {light:?} has no model {model:?}")]
    MissingLightModel {
        /// Light being aggregated or drawn
        light: LightId,
        /// Its companion model key
        model: ModelId,
    },

    /// More lights of one type than the frame constants can hold
    #[error("{active} {light_type:?} lights exceed the capacity of {capacity}")]
    LightCapacity {
        /// Overflowing type
        light_type: LightType,
        /// Slots for that type
        capacity: usize,
        /// Lights of that type in the scene
        active: usize,
    },
}
