//! Bevy ECS integration.
//!
//! Wires the gameplay core into a Bevy app: fixed-tick simulation order,
//! input sampling, gameplay messages, and gizmo-based line rendering.
//! `GrapnelHeadlessPlugin` carries everything except rendering and is the
//! one to use with `MinimalPlugins` in tests.

pub mod components;
pub mod events;
pub mod plugin;
pub mod resources;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_utils;

pub use components::*;
pub use events::*;
pub use plugin::{GameplaySet, GrapnelHeadlessPlugin, GrapnelPlugin};
pub use resources::*;
