//! Light sources and their GPU-side records
//!
//! A light's placement is the root transform of a companion model, which is
//! also drawn as the light's visible marker. The light itself only keeps its
//! type, colour and strength.

use bytemuck::{Pod, Zeroable};

use crate::foundation::collections::ModelId;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::render::model::ModelInstance;

/// Maximum number of point lights in the frame constants
pub const MAX_POINT_LIGHTS: usize = 4;
/// Maximum number of spot lights in the frame constants
pub const MAX_SPOT_LIGHTS: usize = 4;
/// Maximum number of directional lights in the frame constants
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

/// Spot cone used until one is set, in degrees
pub const DEFAULT_CONE_ANGLE: f32 = 90.0;

/// Exponent mapping strength to marker size
const MARKER_SCALE_EXPONENT: f32 = 0.7;

/// Light types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    /// Omnidirectional light from a point
    Point,
    /// Cone of light from a point
    Spot,
    /// Parallel light along a direction
    Directional,
}

impl LightType {
    /// Slots available for this type in the frame constants
    pub const fn capacity(self) -> usize {
        match self {
            Self::Point => MAX_POINT_LIGHTS,
            Self::Spot => MAX_SPOT_LIGHTS,
            Self::Directional => MAX_DIRECTIONAL_LIGHTS,
        }
    }

    /// Position in per-type arrays
    pub const fn index(self) -> usize {
        match self {
            Self::Point => 0,
            Self::Spot => 1,
            Self::Directional => 2,
        }
    }
}

/// Point light record
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PointLightData {
    /// World position
    pub position: [f32; 3],
    /// Padding to 16 bytes
    pub _padding0: f32,
    /// Colour scaled by strength
    pub colour: [f32; 3],
    /// Padding to 16 bytes
    pub _padding1: f32,
}

/// Spot light record
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SpotLightData {
    /// World position
    pub position: [f32; 3],
    /// Padding to 16 bytes
    pub _padding0: f32,
    /// Colour scaled by strength
    pub colour: [f32; 3],
    /// Padding to 16 bytes
    pub _padding1: f32,
    /// Unit facing direction
    pub facing: [f32; 3],
    /// Cosine of half the cone angle
    pub cos_half_angle: f32,
}

/// Directional light record
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DirectionalLightData {
    /// World position of the marker (unused for shading)
    pub position: [f32; 3],
    /// Padding to 16 bytes
    pub _padding0: f32,
    /// Colour scaled by strength
    pub colour: [f32; 3],
    /// Padding to 16 bytes
    pub _padding1: f32,
    /// Unit direction the light travels
    pub facing: [f32; 3],
    /// Padding to 16 bytes
    pub _padding2: f32,
}

/// A light in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct LightSource {
    light_type: LightType,
    colour: Vec3,
    strength: f32,
    cone_angle: f32,
    model: ModelId,
}

impl LightSource {
    /// New light placed by `model`; negative strengths are clamped to zero
    pub fn new(light_type: LightType, colour: Vec3, strength: f32, model: ModelId) -> Self {
        Self {
            light_type,
            colour,
            strength: strength.max(0.0),
            cone_angle: DEFAULT_CONE_ANGLE,
            model,
        }
    }

    /// Set the spot cone angle in degrees
    pub fn with_cone_angle(mut self, degrees: f32) -> Self {
        self.set_cone_angle(degrees);
        self
    }

    /// Light type
    pub fn light_type(&self) -> LightType {
        self.light_type
    }

    /// Companion model placing and drawing this light
    pub fn model(&self) -> ModelId {
        self.model
    }

    /// Base colour
    pub fn colour(&self) -> Vec3 {
        self.colour
    }

    /// Strength multiplier
    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Full spot cone angle in degrees
    pub fn cone_angle(&self) -> f32 {
        self.cone_angle
    }

    /// Colour sent to shaders
    pub fn effective_colour(&self) -> Vec3 {
        self.colour * self.strength
    }

    /// Uniform scale for the marker model
    pub fn marker_scale(&self) -> f32 {
        self.strength.powf(MARKER_SCALE_EXPONENT)
    }

    /// Change the base colour
    pub fn set_colour(&mut self, colour: Vec3) {
        self.colour = colour;
    }

    /// Change the strength; negative values are clamped to zero
    pub fn set_strength(&mut self, strength: f32) {
        self.strength = strength.max(0.0);
    }

    /// Change the spot cone angle in degrees, clamped to (0, 180]
    pub fn set_cone_angle(&mut self, degrees: f32) {
        self.cone_angle = degrees.clamp(f32::EPSILON, 180.0);
    }

    /// Cosine of half the cone angle
    pub fn cos_half_angle(&self) -> f32 {
        utils::deg_to_rad(self.cone_angle * 0.5).cos()
    }

    /// Point record from the companion model's root
    pub fn point_light_data(&self, model: &ModelInstance) -> PointLightData {
        let root = model.world_matrix(0);
        PointLightData {
            position: root.position().into(),
            colour: self.effective_colour().into(),
            ..PointLightData::default()
        }
    }

    /// Spot record from the companion model's root
    pub fn spot_light_data(&self, model: &ModelInstance) -> SpotLightData {
        let root = model.world_matrix(0);
        SpotLightData {
            position: root.position().into(),
            colour: self.effective_colour().into(),
            facing: facing(root).into(),
            cos_half_angle: self.cos_half_angle(),
            ..SpotLightData::default()
        }
    }

    /// Directional record from the companion model's root
    pub fn directional_light_data(&self, model: &ModelInstance) -> DirectionalLightData {
        let root = model.world_matrix(0);
        DirectionalLightData {
            position: root.position().into(),
            colour: self.effective_colour().into(),
            facing: facing(root).into(),
            ..DirectionalLightData::default()
        }
    }
}

fn facing(root: &Mat4) -> Vec3 {
    root.z_axis().try_normalize(f32::EPSILON).unwrap_or_else(Vec3::z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::{MeshId, SlotMap};
    use crate::foundation::math::matrix_from_prs;
    use crate::render::mesh::tests::family_scene;
    use crate::render::mesh::MeshAsset;
    use crate::render::recording::RecordingBackend;
    use approx::assert_relative_eq;

    fn marker(root: Mat4) -> (ModelId, ModelInstance) {
        let mut backend = RecordingBackend::new();
        let asset = MeshAsset::from_scene("marker", &family_scene(), false, &mut backend).unwrap();
        let mut meshes: SlotMap<MeshId, ()> = SlotMap::with_key();
        let mut models: SlotMap<ModelId, ()> = SlotMap::with_key();
        let mut model = ModelInstance::new(meshes.insert(()), &asset);
        model.set_world_matrix(0, root);
        (models.insert(()), model)
    }

    #[test]
    fn test_record_sizes_are_sixteen_byte_multiples() {
        assert_eq!(std::mem::size_of::<PointLightData>(), 32);
        assert_eq!(std::mem::size_of::<SpotLightData>(), 48);
        assert_eq!(std::mem::size_of::<DirectionalLightData>(), 48);
    }

    #[test]
    fn test_point_colour_is_scaled_by_strength() {
        let (id, model) = marker(Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0)).transpose());
        let light = LightSource::new(LightType::Point, Vec3::new(1.0, 0.5, 0.0), 10.0, id);
        let data = light.point_light_data(&model);

        assert_eq!(data.colour, [10.0, 5.0, 0.0]);
        assert_eq!(data.position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_spot_record_uses_scaled_root() {
        // Scaled marker facing +X
        let root = matrix_from_prs(
            &Vec3::new(0.0, 4.0, 0.0),
            &Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            &Vec3::repeat(3.0),
        );
        let (id, model) = marker(root);
        let light = LightSource::new(LightType::Spot, Vec3::repeat(1.0), 1.0, id);
        let data = light.spot_light_data(&model);

        assert_relative_eq!(Vec3::from(data.facing), Vec3::x(), epsilon = 1e-5);
        assert_relative_eq!(data.cos_half_angle, std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-6);
        assert_relative_eq!(Vec3::from(data.position), Vec3::new(0.0, 4.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_directional_record_has_unit_facing() {
        let root = matrix_from_prs(
            &Vec3::new(2.0, 0.0, 0.0),
            &Vec3::new(0.3, std::f32::consts::FRAC_PI_2, 0.0),
            &Vec3::repeat(5.0),
        );
        let (id, model) = marker(root);
        let light = LightSource::new(LightType::Directional, Vec3::new(0.4, 0.2, 0.1), 5.0, id);
        let data = light.directional_light_data(&model);

        let facing = Vec3::from(data.facing);
        assert_relative_eq!(facing.norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(facing, root.z_axis() / 5.0, epsilon = 1e-5);
        assert_relative_eq!(Vec3::from(data.colour), Vec3::new(2.0, 1.0, 0.5), epsilon = 1e-6);
        assert_relative_eq!(Vec3::from(data.position), Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_cone_angle_controls_cosine() {
        let (id, _) = marker(Mat4::identity());
        let light = LightSource::new(LightType::Spot, Vec3::repeat(1.0), 1.0, id).with_cone_angle(60.0);
        assert_relative_eq!(light.cos_half_angle(), 30f32.to_radians().cos(), epsilon = 1e-6);
    }

    #[test]
    fn test_strength_never_negative() {
        let (id, _) = marker(Mat4::identity());
        let mut light = LightSource::new(LightType::Directional, Vec3::repeat(1.0), -3.0, id);
        assert_eq!(light.strength(), 0.0);
        light.set_strength(-0.2);
        assert_eq!(light.strength(), 0.0);
        light.set_strength(40.0);
        assert_relative_eq!(light.marker_scale(), 40f32.powf(0.7), epsilon = 1e-5);
    }
}
