//! Backend abstraction for the forward renderer
//!
//! The render layer only talks to the GPU through [`RenderBackend`]: it
//! creates immutable vertex and index buffers when a mesh loads, then issues
//! state binds and indexed draws while rendering. Only resource creation can
//! fail; binds and draws are fire-and-forget.

use thiserror::Error;

use crate::assets::VertexLayout;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::frame::PerFrameConstants;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// Handle to a vertex input layout object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputLayoutHandle(pub u64);

/// Handle to a compiled shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u64);

/// Handle to a texture view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// What a buffer is bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Interleaved vertices
    Vertex,
    /// 32-bit indices
    Index,
}

/// Texture sampling modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamplerState {
    /// Nearest texel
    Point,
    /// Linear filtering with mip blending
    Trilinear,
    /// 4x anisotropic filtering
    #[default]
    Anisotropic4x,
}

/// Output merger blend modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendState {
    /// Overwrite the target
    #[default]
    NoBlending,
    /// Source alpha blending
    AlphaBlending,
    /// Add to the target
    Additive,
    /// Multiply the target
    Multiplicative,
}

/// Depth test and write modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthState {
    /// Test and write depth
    #[default]
    UseDepthBuffer,
    /// Test depth without writing it
    DepthReadOnly,
    /// Ignore depth
    NoDepthBuffer,
}

/// Face culling modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullState {
    /// Cull back faces
    #[default]
    Back,
    /// Cull front faces
    Front,
    /// Draw both sides
    None,
}

/// Backend errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Buffer allocation or upload failed
    #[error("Failed to create {kind:?} buffer: {reason}")]
    BufferCreation {
        /// Buffer being created
        kind: BufferKind,
        /// Driver message
        reason: String,
    },

    /// The vertex layout was rejected
    #[error("Failed to create input layout: {0}")]
    InputLayoutCreation(String),

    /// The device is unusable
    #[error("Device error: {0}")]
    Device(String),
}

/// Main rendering backend trait
pub trait RenderBackend {
    /// Create an immutable buffer holding `data`
    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BackendResult<BufferHandle>;

    /// Create an input layout matching `layout`
    fn create_input_layout(&mut self, layout: &VertexLayout) -> BackendResult<InputLayoutHandle>;

    /// Free a buffer
    fn release_buffer(&mut self, buffer: BufferHandle);

    /// Free an input layout
    fn release_input_layout(&mut self, layout: InputLayoutHandle);

    /// Bind a vertex buffer with its per-vertex stride
    fn bind_vertex_buffer(&mut self, buffer: BufferHandle, stride: u32);

    /// Bind the input layout for the next draws
    fn bind_input_layout(&mut self, layout: InputLayoutHandle);

    /// Bind a 32-bit index buffer (triangle list topology)
    fn bind_index_buffer(&mut self, buffer: BufferHandle);

    /// Upload the world matrix for the next draws
    fn set_world_transform(&mut self, world: &Mat4);

    /// Upload the flat object colour for the next draws
    fn set_object_colour(&mut self, colour: &Vec3);

    /// Draw `index_count` indices from the bound buffers
    fn draw_indexed(&mut self, index_count: u32);

    /// Bind a vertex + pixel shader program
    fn set_shader(&mut self, shader: ShaderHandle);

    /// Bind pixel shader textures starting at slot 0
    fn set_textures(&mut self, textures: &[TextureHandle]);

    /// Bind samplers starting at slot 0
    fn set_samplers(&mut self, samplers: &[SamplerState]);

    /// Set blend, depth and rasterizer state
    fn set_render_states(&mut self, blend: BlendState, depth: DepthState, cull: CullState);

    /// Upload the per-frame constant block
    fn upload_frame_constants(&mut self, constants: &PerFrameConstants);
}
