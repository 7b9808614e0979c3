//! ECS Messages for gameplay state transitions.

use bevy::prelude::*;

/// Message fired when the grapple attaches to a hookable surface.
#[derive(Message, Debug, Clone, Copy)]
pub struct GrappleAttachedEvent {
    /// World-space anchor point.
    pub anchor: Vec2,
}

/// Message fired when the grapple detaches.
#[derive(Message, Debug, Clone, Copy)]
pub struct GrappleReleasedEvent {
    /// True when the reel reached the minimum distance on its own,
    /// false on a manual release.
    pub auto: bool,
}

/// Message fired when the character jumps.
#[derive(Message, Debug, Clone, Copy)]
pub struct JumpedEvent {
    pub wall_jump: bool,
}
