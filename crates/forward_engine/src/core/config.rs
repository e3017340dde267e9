//! # Engine Settings
//!
//! Tunables for lighting, keyboard control, light animation and the shader
//! timer. Every section has defaults matching the stock demo scene, so a
//! settings file only needs the values it changes.
//!
//! ```toml
//! log_level = "debug"
//!
//! [lighting]
//! specular_power = 64.0
//! capacity_policy = "Reject"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use crate::config::{Config, ConfigError};

/// What to do when more lights of one type are active than the frame
/// constant block has slots for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CapacityPolicy {
    /// Keep the first lights in insertion order and log a warning
    #[default]
    Truncate,
    /// Refuse to add the light, and fail aggregation if already over
    Reject,
}

/// # Lighting Settings
///
/// Scene-wide shading parameters written into the per-frame constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    /// Ambient light colour added to every surface
    pub ambient_colour: [f32; 3],
    /// Specular exponent
    pub specular_power: f32,
    /// Parallax mapping depth, used when `use_parallax` is set
    pub parallax_depth: f32,
    /// Whether parallax mapping is enabled
    pub use_parallax: bool,
    /// Outline colour for the cell-shading pass
    pub outline_colour: [f32; 3],
    /// Outline thickness for the cell-shading pass
    pub outline_thickness: f32,
    /// Overflow behaviour for the fixed light slots
    pub capacity_policy: CapacityPolicy,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            ambient_colour: [0.2, 0.2, 0.3],
            specular_power: 256.0,
            parallax_depth: 0.08,
            use_parallax: true,
            outline_colour: [0.0, 0.0, 0.0],
            outline_thickness: 0.015,
            capacity_policy: CapacityPolicy::Truncate,
        }
    }
}

impl LightingSettings {
    /// Parallax depth actually sent to shaders (zero when disabled)
    pub fn effective_parallax_depth(&self) -> f32 {
        if self.use_parallax {
            self.parallax_depth
        } else {
            0.0
        }
    }

    /// Set the capacity policy
    pub fn with_capacity_policy(mut self, policy: CapacityPolicy) -> Self {
        self.capacity_policy = policy;
        self
    }

    /// Validate lighting values
    pub fn validate(&self) -> Result<(), String> {
        if self.specular_power < 0.0 {
            return Err(format!("Specular power cannot be negative, got {}", self.specular_power));
        }
        if self.parallax_depth < 0.0 {
            return Err(format!("Parallax depth cannot be negative, got {}", self.parallax_depth));
        }
        if self.outline_thickness < 0.0 {
            return Err(format!("Outline thickness cannot be negative, got {}", self.outline_thickness));
        }
        Ok(())
    }
}

/// Keyboard control speeds for models and the camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    /// Radians per second
    pub rotation_speed: f32,
    /// Units per second
    pub movement_speed: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            rotation_speed: 2.0,
            movement_speed: 50.0,
        }
    }
}

/// Bounds and step of the light strength pulse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseSettings {
    /// Strength change per update
    pub step: f32,
    /// Strength at which the pulse turns back down
    pub upper_bound: f32,
    /// Strength at which the pulse turns back up
    pub lower_bound: f32,
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self {
            step: 0.2,
            upper_bound: 100.0,
            lower_bound: 0.0,
        }
    }
}

impl PulseSettings {
    /// Validate pulse bounds
    pub fn validate(&self) -> Result<(), String> {
        if self.step <= 0.0 {
            return Err("Pulse step must be positive".to_string());
        }
        if self.lower_bound < 0.0 {
            return Err("Pulse lower bound cannot be negative".to_string());
        }
        if self.lower_bound >= self.upper_bound {
            return Err(format!(
                "Pulse bounds are inverted: lower {} >= upper {}",
                self.lower_bound, self.upper_bound
            ));
        }
        Ok(())
    }
}

/// # Engine Settings
///
/// Root settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Default log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Lighting parameters
    pub lighting: LightingSettings,
    /// Keyboard control speeds
    pub control: ControlSettings,
    /// Light strength pulse
    pub pulse: PulseSettings,
    /// Shader timer resets to zero past this many seconds
    pub timer_wrap: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            lighting: LightingSettings::default(),
            control: ControlSettings::default(),
            pulse: PulseSettings::default(),
            timer_wrap: 1_000_000.0,
        }
    }
}

impl EngineSettings {
    /// Set the default log filter
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Replace the lighting section
    pub fn with_lighting(mut self, lighting: LightingSettings) -> Self {
        self.lighting = lighting;
        self
    }

    /// Replace the control section
    pub fn with_control(mut self, control: ControlSettings) -> Self {
        self.control = control;
        self
    }

    /// Validate all sections
    pub fn validate(&self) -> Result<(), String> {
        if self.control.rotation_speed < 0.0 || self.control.movement_speed < 0.0 {
            return Err("Control speeds cannot be negative".to_string());
        }
        if self.timer_wrap <= 0.0 {
            return Err("Timer wrap must be positive".to_string());
        }
        self.lighting.validate()?;
        self.pulse.validate()?;
        Ok(())
    }

    /// Load from a `.toml` or `.ron` file and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = Self::load_from_file(path)?;
        settings.validate().map_err(ConfigError::Invalid)?;
        Ok(settings)
    }
}

impl Config for EngineSettings {}
