//! ECS Resources.

use bevy::prelude::*;

use crate::character::CharacterController;
use crate::config::GameplayConfig;
use crate::grapple::GrappleController;
use crate::input::{InputFrame, InputQueue};
use crate::physics::PhysicsWorld;
use crate::rope::Rope;

/// Bevy Resource wrapping [`PhysicsWorld`] for direct Rapier access.
#[derive(Resource, Default)]
pub struct PhysicsWorldRes {
    pub world: PhysicsWorld,
}

/// Gameplay configuration resource.
#[derive(Resource, Debug, Clone, Default)]
pub struct GameplayConfigRes(pub GameplayConfig);

/// Latest sampled input snapshot; edges are valid for one frame.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PlayerInput(pub InputFrame);

/// Shared queue external hosts push input commands through.
#[derive(Resource, Clone, Default)]
pub struct InputQueueRes(pub InputQueue);

/// World-space point the grapple aims at. Windowed hosts update this from
/// cursor picking; headless hosts set it directly or via the input queue.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct AimTarget(pub Vec2);

/// Ordered world-space points of the active rope, rebuilt every frame for
/// the line renderer. Empty while no grapple is attached.
#[derive(Resource, Debug, Clone, Default)]
pub struct RopePolyline(pub Vec<Vec2>);

/// Where the player body spawns at startup.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PlayerSpawn(pub Vec2);

/// The player's simulation-side controllers, created at startup.
///
/// Controllers own the rapier handles; ECS entities only mirror transforms.
#[derive(Resource)]
pub struct PlayerRig {
    pub character: CharacterController,
    pub grapple: GrappleController,
    pub rope: Box<dyn Rope>,
}
