//! Headless backend that records every command
//!
//! Used to run the render layer without a GPU: tests assert on the recorded
//! command list, and tools can dump it to inspect a frame.

use crate::assets::VertexLayout;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::backend::{
    BackendError, BackendResult, BlendState, BufferHandle, BufferKind, CullState, DepthState, InputLayoutHandle,
    RenderBackend, SamplerState, ShaderHandle, TextureHandle,
};
use crate::render::frame::{PerFrameConstants, PerModelConstants};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    /// Buffer created
    CreateBuffer {
        /// New handle
        handle: BufferHandle,
        /// Buffer kind
        kind: BufferKind,
        /// Size in bytes
        size: usize,
    },
    /// Input layout created
    CreateInputLayout {
        /// New handle
        handle: InputLayoutHandle,
        /// Vertex stride of the layout
        stride: u32,
    },
    /// Buffer freed
    ReleaseBuffer(BufferHandle),
    /// Input layout freed
    ReleaseInputLayout(InputLayoutHandle),
    /// Vertex buffer bound
    BindVertexBuffer {
        /// Buffer
        buffer: BufferHandle,
        /// Stride in bytes
        stride: u32,
    },
    /// Input layout bound
    BindInputLayout(InputLayoutHandle),
    /// Index buffer bound
    BindIndexBuffer(BufferHandle),
    /// World matrix uploaded
    SetWorldTransform(Mat4),
    /// Object colour uploaded
    SetObjectColour(Vec3),
    /// Indexed draw
    DrawIndexed(u32),
    /// Shader bound
    SetShader(ShaderHandle),
    /// Textures bound
    SetTextures(Vec<TextureHandle>),
    /// Samplers bound
    SetSamplers(Vec<SamplerState>),
    /// Render states set
    SetRenderStates(BlendState, DepthState, CullState),
    /// Frame constants uploaded
    UploadFrameConstants(Box<PerFrameConstants>),
}

/// Backend that records commands instead of executing them
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<BackendCommand>,
    next_handle: u64,
    live_buffers: usize,
    live_layouts: usize,
    buffers_created: usize,
    fail_buffer_at: Option<usize>,
}

impl RecordingBackend {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `n`th buffer creation (0-based, counted from now) fail
    pub fn fail_buffer_creation_at(&mut self, n: usize) {
        self.fail_buffer_at = Some(self.buffers_created + n);
    }

    /// Recorded commands in issue order
    pub fn commands(&self) -> &[BackendCommand] {
        &self.commands
    }

    /// Forget recorded commands; resource counters are kept
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Buffers created and not yet released
    pub fn live_buffers(&self) -> usize {
        self.live_buffers
    }

    /// Input layouts created and not yet released
    pub fn live_input_layouts(&self) -> usize {
        self.live_layouts
    }

    /// Index counts of every draw, in order
    pub fn draws(&self) -> Vec<u32> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                BackendCommand::DrawIndexed(count) => Some(*count),
                _ => None,
            })
            .collect()
    }

    /// For every draw, the world matrix most recently uploaded before it
    pub fn draw_transforms(&self) -> Vec<Option<Mat4>> {
        let mut current = None;
        let mut transforms = Vec::new();
        for command in &self.commands {
            match command {
                BackendCommand::SetWorldTransform(world) => current = Some(*world),
                BackendCommand::DrawIndexed(_) => transforms.push(current),
                _ => {}
            }
        }
        transforms
    }

    /// For every draw, the per-model block a GPU backend would bind: the latest
    /// world matrix (identity if none yet) and object colour (black if none yet)
    pub fn draw_constants(&self) -> Vec<PerModelConstants> {
        let mut world = Mat4::identity();
        let mut colour = Vec3::zeros();
        let mut constants = Vec::new();
        for command in &self.commands {
            match command {
                BackendCommand::SetWorldTransform(matrix) => world = *matrix,
                BackendCommand::SetObjectColour(value) => colour = *value,
                BackendCommand::DrawIndexed(_) => constants.push(PerModelConstants::new(&world, &colour)),
                _ => {}
            }
        }
        constants
    }

    /// Every uploaded frame constant block
    pub fn frame_uploads(&self) -> Vec<&PerFrameConstants> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                BackendCommand::UploadFrameConstants(constants) => Some(constants.as_ref()),
                _ => None,
            })
            .collect()
    }

    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl RenderBackend for RecordingBackend {
    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BackendResult<BufferHandle> {
        let attempt = self.buffers_created;
        self.buffers_created += 1;
        if self.fail_buffer_at == Some(attempt) {
            return Err(BackendError::BufferCreation {
                kind,
                reason: "injected failure".to_string(),
            });
        }

        let handle = BufferHandle(self.next_handle());
        self.live_buffers += 1;
        self.commands.push(BackendCommand::CreateBuffer { handle, kind, size: data.len() });
        Ok(handle)
    }

    fn create_input_layout(&mut self, layout: &VertexLayout) -> BackendResult<InputLayoutHandle> {
        if layout.elements().is_empty() {
            return Err(BackendError::InputLayoutCreation("layout has no elements".to_string()));
        }
        let handle = InputLayoutHandle(self.next_handle());
        self.live_layouts += 1;
        self.commands.push(BackendCommand::CreateInputLayout { handle, stride: layout.stride() });
        Ok(handle)
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        self.live_buffers -= 1;
        self.commands.push(BackendCommand::ReleaseBuffer(buffer));
    }

    fn release_input_layout(&mut self, layout: InputLayoutHandle) {
        self.live_layouts -= 1;
        self.commands.push(BackendCommand::ReleaseInputLayout(layout));
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferHandle, stride: u32) {
        self.commands.push(BackendCommand::BindVertexBuffer { buffer, stride });
    }

    fn bind_input_layout(&mut self, layout: InputLayoutHandle) {
        self.commands.push(BackendCommand::BindInputLayout(layout));
    }

    fn bind_index_buffer(&mut self, buffer: BufferHandle) {
        self.commands.push(BackendCommand::BindIndexBuffer(buffer));
    }

    fn set_world_transform(&mut self, world: &Mat4) {
        self.commands.push(BackendCommand::SetWorldTransform(*world));
    }

    fn set_object_colour(&mut self, colour: &Vec3) {
        self.commands.push(BackendCommand::SetObjectColour(*colour));
    }

    fn draw_indexed(&mut self, index_count: u32) {
        self.commands.push(BackendCommand::DrawIndexed(index_count));
    }

    fn set_shader(&mut self, shader: ShaderHandle) {
        self.commands.push(BackendCommand::SetShader(shader));
    }

    fn set_textures(&mut self, textures: &[TextureHandle]) {
        self.commands.push(BackendCommand::SetTextures(textures.to_vec()));
    }

    fn set_samplers(&mut self, samplers: &[SamplerState]) {
        self.commands.push(BackendCommand::SetSamplers(samplers.to_vec()));
    }

    fn set_render_states(&mut self, blend: BlendState, depth: DepthState, cull: CullState) {
        self.commands.push(BackendCommand::SetRenderStates(blend, depth, cull));
    }

    fn upload_frame_constants(&mut self, constants: &PerFrameConstants) {
        self.commands.push(BackendCommand::UploadFrameConstants(Box::new(*constants)));
    }
}
