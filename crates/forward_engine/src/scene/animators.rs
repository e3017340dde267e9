//! Per-frame light animation: orbiting markers, pulsing strength and
//! cycling colour

use crate::core::PulseSettings;
use crate::foundation::collections::{LightId, ModelId};
use crate::foundation::math::Vec3;
use crate::input::{InputState, KeyCode};
use crate::render::lighting::LightSource;

/// Value that walks back and forth between two bounds by a fixed step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounce {
    step: f32,
    lower: f32,
    upper: f32,
    direction: f32,
}

impl Bounce {
    /// Starts out moving down towards `lower`
    pub fn new(step: f32, lower: f32, upper: f32) -> Self {
        Self { step, lower, upper, direction: 1.0 }
    }

    /// Light strength pulse
    pub fn pulse(settings: &PulseSettings) -> Self {
        Self::new(settings.step, settings.lower_bound, settings.upper_bound)
    }

    /// Colour channel cycle over [0, 1]
    pub fn colour_cycle() -> Self {
        Self::new(0.003, 0.0, 1.0)
    }

    /// Take one step from `value`, turning around at the bounds
    pub fn advance(&mut self, value: f32) -> f32 {
        let stepped = value - self.step * self.direction;
        // Only the bound being approached is enforced
        let next = if self.direction > 0.0 { stepped.max(self.lower) } else { stepped.min(self.upper) };
        if next <= self.lower {
            self.direction = -1.0;
        } else if next >= self.upper {
            self.direction = 1.0;
        }
        next
    }
}

/// Light property driven by a [`LightAnimator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatedProperty {
    /// Strength multiplier
    Strength,
    /// One colour channel (0 = red, 1 = green, 2 = blue)
    ColourChannel(usize),
}

/// Steps one light property every update
#[derive(Debug, Clone, PartialEq)]
pub struct LightAnimator {
    light: LightId,
    property: AnimatedProperty,
    bounce: Bounce,
}

impl LightAnimator {
    /// Animate `property` of `light`
    ///
    /// # Panics
    ///
    /// If a colour channel index is above 2.
    pub fn new(light: LightId, property: AnimatedProperty, bounce: Bounce) -> Self {
        if let AnimatedProperty::ColourChannel(channel) = property {
            assert!(channel < 3, "colour channel {channel} out of range");
        }
        Self { light, property, bounce }
    }

    /// Animated light
    pub fn light(&self) -> LightId {
        self.light
    }

    /// Animated property
    pub fn property(&self) -> AnimatedProperty {
        self.property
    }

    /// Apply one step to `light`
    pub fn apply(&mut self, light: &mut LightSource) {
        match self.property {
            AnimatedProperty::Strength => {
                let strength = self.bounce.advance(light.strength());
                light.set_strength(strength);
            }
            AnimatedProperty::ColourChannel(channel) => {
                let mut colour = light.colour();
                colour[channel] = self.bounce.advance(colour[channel]);
                light.set_colour(colour);
            }
        }
    }
}

/// Circles a light's marker around a model, toggled by a key
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitAnimator {
    light: LightId,
    centre: ModelId,
    radius: f32,
    height: f32,
    speed: f32,
    angle: f32,
    running: bool,
    toggle_key: KeyCode,
}

impl OrbitAnimator {
    /// Orbit of radius 20, 10 units above the centre, 0.7 rad/s, toggled by `1`
    pub fn new(light: LightId, centre: ModelId) -> Self {
        Self {
            light,
            centre,
            radius: 20.0,
            height: 10.0,
            speed: 0.7,
            angle: 0.0,
            running: true,
            toggle_key: KeyCode::Num1,
        }
    }

    /// Set the radius
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Set the height above the centre
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Set the angular speed in radians per second
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the key that pauses and resumes the orbit
    pub fn with_toggle_key(mut self, key: KeyCode) -> Self {
        self.toggle_key = key;
        self
    }

    /// Orbiting light
    pub fn light(&self) -> LightId {
        self.light
    }

    /// Model orbited around
    pub fn centre(&self) -> ModelId {
        self.centre
    }

    /// Current angle in radians
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Whether the orbit is advancing
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Marker position for the current angle
    pub fn position_around(&self, centre: Vec3) -> Vec3 {
        centre + Vec3::new(self.angle.cos() * self.radius, self.height, self.angle.sin() * self.radius)
    }

    /// Advance the angle and handle the toggle key
    pub fn advance(&mut self, frame_time: f32, input: &dyn InputState) {
        if self.running {
            self.angle -= self.speed * frame_time;
        }
        if input.key_hit(self.toggle_key) {
            self.running = !self.running;
        }
    }
}
