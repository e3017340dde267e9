//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Row-vector math types and matrix helpers
//! - Typed arena keys for scene objects
//! - Frame and shader timers
//! - Logging setup

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
