//! Per-frame constant block and light aggregation
//!
//! Once per frame, scene lights are partitioned by type into fixed-size
//! arrays and packed with camera matrices and scene shading parameters into
//! a single [`PerFrameConstants`] block. The field layout follows GPU
//! constant-buffer packing: every group of fields fills whole 16-byte rows.

use bytemuck::{Pod, Zeroable};

use crate::core::{CapacityPolicy, LightingSettings};
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::render::camera::Camera;
use crate::render::lighting::{
    DirectionalLightData, LightSource, LightType, PointLightData, SpotLightData, MAX_DIRECTIONAL_LIGHTS,
    MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS,
};
use crate::render::model::ModelInstance;
use crate::render::RenderError;

/// Constants uploaded once per frame
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PerFrameConstants {
    /// World to camera
    pub view_matrix: [[f32; 4]; 4],
    /// Camera to clip
    pub projection_matrix: [[f32; 4]; 4],
    /// World to clip
    pub view_projection_matrix: [[f32; 4]; 4],

    /// Point lights, `num_point_lights` valid
    pub point_lights: [PointLightData; MAX_POINT_LIGHTS],
    /// Spot lights, `num_spot_lights` valid
    pub spot_lights: [SpotLightData; MAX_SPOT_LIGHTS],
    /// Directional lights, `num_directional_lights` valid
    pub directional_lights: [DirectionalLightData; MAX_DIRECTIONAL_LIGHTS],

    /// Ambient colour
    pub ambient_colour: [f32; 3],
    /// Specular exponent
    pub specular_power: f32,

    /// Camera world position
    pub camera_position: [f32; 3],
    /// Parallax depth, zero when disabled
    pub parallax_depth: f32,

    /// Wrapping scene time in seconds
    pub timer: f32,
    /// Padding to 16 bytes
    pub _padding0: [f32; 3],

    /// Cell-shading outline colour
    pub outline_colour: [f32; 3],
    /// Cell-shading outline thickness
    pub outline_thickness: f32,

    /// Valid entries in `point_lights`
    pub num_point_lights: i32,
    /// Valid entries in `spot_lights`
    pub num_spot_lights: i32,
    /// Valid entries in `directional_lights`
    pub num_directional_lights: i32,
    /// Padding to 16 bytes
    pub _padding1: i32,
}

const _: () = assert!(std::mem::size_of::<PerFrameConstants>() % 16 == 0);

impl Default for PerFrameConstants {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl PerFrameConstants {
    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Active light count of a type
    pub fn light_count(&self, light_type: LightType) -> usize {
        let count = match light_type {
            LightType::Point => self.num_point_lights,
            LightType::Spot => self.num_spot_lights,
            LightType::Directional => self.num_directional_lights,
        };
        usize::try_from(count).unwrap_or(0)
    }
}

/// Constants set per model draw
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PerModelConstants {
    /// Node world matrix
    pub world_matrix: [[f32; 4]; 4],
    /// Flat colour for markers and unlit shaders
    pub object_colour: [f32; 3],
    /// Padding to 16 bytes
    pub _padding: f32,
}

const _: () = assert!(std::mem::size_of::<PerModelConstants>() % 16 == 0);

impl PerModelConstants {
    /// Pack a world matrix and object colour
    pub fn new(world: &Mat4, object_colour: &Vec3) -> Self {
        Self {
            world_matrix: world.to_row_major(),
            object_colour: (*object_colour).into(),
            _padding: 0.0,
        }
    }
}

/// Scene-wide values the aggregator packs alongside the lights
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    /// Camera providing view and projection
    pub camera: &'a Camera,
    /// Shading parameters
    pub lighting: &'a LightingSettings,
    /// Wrapping scene time
    pub timer: f32,
}

/// Builds [`PerFrameConstants`] from the scene's lights
#[derive(Debug, Default)]
pub struct FrameAggregator {
    overflow_reported: [bool; 3],
}

impl FrameAggregator {
    /// Create an aggregator that has not reported any overflow yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition `lights` by type, in iteration order, and fill a constant block.
    ///
    /// Lights beyond a type's capacity are dropped under
    /// [`CapacityPolicy::Truncate`], warning once per type until the count
    /// falls back within capacity. Under [`CapacityPolicy::Reject`] the frame
    /// fails instead.
    pub fn aggregate<'a, I>(&mut self, lights: I, inputs: &FrameInputs<'_>) -> Result<PerFrameConstants, RenderError>
    where
        I: IntoIterator<Item = (&'a LightSource, &'a ModelInstance)>,
    {
        let mut constants = PerFrameConstants::zeroed();
        let mut counts = [0usize; 3];
        let mut requested = [0usize; 3];

        for (light, model) in lights {
            let light_type = light.light_type();
            let slot = counts[light_type.index()];
            requested[light_type.index()] += 1;
            if slot >= light_type.capacity() {
                continue;
            }
            match light_type {
                LightType::Point => constants.point_lights[slot] = light.point_light_data(model),
                LightType::Spot => constants.spot_lights[slot] = light.spot_light_data(model),
                LightType::Directional => {
                    constants.directional_lights[slot] = light.directional_light_data(model);
                }
            }
            counts[light_type.index()] += 1;
        }

        for light_type in [LightType::Point, LightType::Spot, LightType::Directional] {
            let active = requested[light_type.index()];
            let capacity = light_type.capacity();
            if active <= capacity {
                self.overflow_reported[light_type.index()] = false;
                continue;
            }
            match inputs.lighting.capacity_policy {
                CapacityPolicy::Reject => {
                    return Err(RenderError::LightCapacity { light_type, capacity, active });
                }
                CapacityPolicy::Truncate => {
                    let reported = &mut self.overflow_reported[light_type.index()];
                    if !*reported {
                        log::warn!(
                            "{} {:?} lights active, only the first {} are shaded",
                            active,
                            light_type,
                            capacity
                        );
                        *reported = true;
                    }
                }
            }
        }

        constants.num_point_lights = counts[LightType::Point.index()] as i32;
        constants.num_spot_lights = counts[LightType::Spot.index()] as i32;
        constants.num_directional_lights = counts[LightType::Directional.index()] as i32;
        log::trace!(
            "Aggregated {} point, {} spot, {} directional lights",
            constants.num_point_lights,
            constants.num_spot_lights,
            constants.num_directional_lights
        );

        let camera = inputs.camera;
        let view = camera.view_matrix();
        let projection = camera.projection_matrix();
        constants.view_matrix = view.to_row_major();
        constants.projection_matrix = projection.to_row_major();
        constants.view_projection_matrix = (view * projection).to_row_major();
        constants.camera_position = camera.position().into();

        let lighting = inputs.lighting;
        constants.ambient_colour = lighting.ambient_colour;
        constants.specular_power = lighting.specular_power;
        constants.parallax_depth = lighting.effective_parallax_depth();
        constants.outline_colour = lighting.outline_colour;
        constants.outline_thickness = lighting.outline_thickness;
        constants.timer = inputs.timer;

        Ok(constants)
    }
}
