//! ECS components.

use bevy::prelude::*;
use rapier2d::prelude::RigidBodyHandle;

/// Entity ↔ rigid-body mapping component.
#[derive(Component, Debug, Clone, Copy)]
pub struct PhysicsBody(pub RigidBodyHandle);

/// Marker for the player avatar entity.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;
