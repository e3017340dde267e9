//! # Core Engine Module
//!
//! Engine-wide settings shared by the render and scene layers.

pub mod config;

pub use config::{
    CapacityPolicy,
    Config,
    ConfigError,
    ControlSettings,
    EngineSettings,
    LightingSettings,
    PulseSettings,
};
