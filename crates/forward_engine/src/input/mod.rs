//! Keyboard input polling
//!
//! Model and camera control read the keyboard through [`InputState`], so a
//! window layer, a replay, or a test can drive them the same way.

use std::collections::HashSet;

/// Read-only view of the keyboard for one frame
pub trait InputState {
    /// The key is currently down
    fn key_held(&self, key: KeyCode) -> bool;

    /// The key went down during this frame
    fn key_hit(&self, key: KeyCode) -> bool;
}

/// Input manager fed by window key events
#[derive(Debug, Default)]
pub struct InputManager {
    held: HashSet<KeyCode>,
    hit: HashSet<KeyCode>,
}

impl InputManager {
    /// Create a new input manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle key input
    pub fn handle_key_input(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            // Auto-repeat presses do not count as fresh hits
            if self.held.insert(key) {
                self.hit.insert(key);
            }
        } else {
            self.held.remove(&key);
        }
    }

    /// Forget this frame's hits; call after the scene update
    pub fn end_frame(&mut self) {
        self.hit.clear();
    }
}

impl InputState for InputManager {
    fn key_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    fn key_hit(&self, key: KeyCode) -> bool {
        self.hit.contains(&key)
    }
}

/// Key bindings for turning and moving a model node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlKeys {
    /// Pitch up (positive X rotation)
    pub turn_up: KeyCode,
    /// Pitch down
    pub turn_down: KeyCode,
    /// Yaw left
    pub turn_left: KeyCode,
    /// Yaw right (positive Y rotation)
    pub turn_right: KeyCode,
    /// Roll clockwise (positive Z rotation)
    pub turn_cw: KeyCode,
    /// Roll counter-clockwise
    pub turn_ccw: KeyCode,
    /// Move along the local Z axis
    pub move_forward: KeyCode,
    /// Move against the local Z axis
    pub move_backward: KeyCode,
}

impl ControlKeys {
    /// I/K pitch, J/L yaw, U/O roll, period/comma move
    pub const fn ijkl() -> Self {
        Self {
            turn_up: KeyCode::I,
            turn_down: KeyCode::K,
            turn_left: KeyCode::J,
            turn_right: KeyCode::L,
            turn_cw: KeyCode::O,
            turn_ccw: KeyCode::U,
            move_forward: KeyCode::Period,
            move_backward: KeyCode::Comma,
        }
    }
}

/// Key bindings for the fly camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraKeys {
    /// Pitch up
    pub turn_up: KeyCode,
    /// Pitch down
    pub turn_down: KeyCode,
    /// Yaw left
    pub turn_left: KeyCode,
    /// Yaw right
    pub turn_right: KeyCode,
    /// Move forward
    pub move_forward: KeyCode,
    /// Move backward
    pub move_backward: KeyCode,
    /// Strafe left
    pub move_left: KeyCode,
    /// Strafe right
    pub move_right: KeyCode,
}

impl Default for CameraKeys {
    fn default() -> Self {
        Self {
            turn_up: KeyCode::Up,
            turn_down: KeyCode::Down,
            turn_left: KeyCode::Left,
            turn_right: KeyCode::Right,
            move_forward: KeyCode::W,
            move_backward: KeyCode::S,
            move_left: KeyCode::A,
            move_right: KeyCode::D,
        }
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// B key
    B,
    /// C key
    C,
    /// D key
    D,
    /// E key
    E,
    /// F key
    F,
    /// G key
    G,
    /// H key
    H,
    /// I key
    I,
    /// J key
    J,
    /// K key
    K,
    /// L key
    L,
    /// M key
    M,
    /// N key
    N,
    /// O key
    O,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// T key
    T,
    /// U key
    U,
    /// V key
    V,
    /// W key
    W,
    /// X key
    X,
    /// Y key
    Y,
    /// Z key
    Z,
    /// 0 key
    Num0,
    /// 1 key
    Num1,
    /// 2 key
    Num2,
    /// 3 key
    Num3,
    /// 4 key
    Num4,
    /// 5 key
    Num5,
    /// 6 key
    Num6,
    /// 7 key
    Num7,
    /// 8 key
    Num8,
    /// 9 key
    Num9,
    /// Period key
    Period,
    /// Comma key
    Comma,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow key
    Up,
    /// Down arrow key
    Down,
    /// Left arrow key
    Left,
    /// Right arrow key
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_only_on_first_press() {
        let mut input = InputManager::new();
        input.handle_key_input(KeyCode::Num1, true);
        assert!(input.key_hit(KeyCode::Num1));
        assert!(input.key_held(KeyCode::Num1));

        input.end_frame();
        input.handle_key_input(KeyCode::Num1, true);
        assert!(!input.key_hit(KeyCode::Num1));
        assert!(input.key_held(KeyCode::Num1));

        input.handle_key_input(KeyCode::Num1, false);
        assert!(!input.key_held(KeyCode::Num1));
    }
}
