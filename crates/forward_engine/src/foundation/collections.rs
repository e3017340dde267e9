//! Arena keys for scene-owned objects
//!
//! Every object the scene owns lives in a [`SlotMap`] and is referred to by
//! a typed key. Keys are generational, so a key to a removed object never
//! aliases a newer one.

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Key of a loaded [`MeshAsset`](crate::render::mesh::MeshAsset)
    pub struct MeshId;

    /// Key of a placed [`ModelInstance`](crate::render::model::ModelInstance)
    pub struct ModelId;

    /// Key of a [`LightSource`](crate::render::lighting::LightSource)
    pub struct LightId;

    /// Key of a registered shader program
    pub struct ShaderId;

    /// Key of a registered texture
    pub struct TextureId;
}
