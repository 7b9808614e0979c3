//! Grapnel Core Library
//!
//! Grappling-hook and platformer movement mechanics on `Rapier2D`.
//!
//! The library has two layers:
//! - Core mechanics: [`VerletRope`](rope::VerletRope) /
//!   [`SegmentChain`](rope::SegmentChain) rope simulation,
//!   [`GrappleController`](grapple::GrappleController) and
//!   [`CharacterController`](character::CharacterController), all driven
//!   directly against a [`PhysicsWorld`](physics::PhysicsWorld)
//! - Bevy mode: ECS integration wiring the mechanics into fixed-timestep
//!   schedules, input sampling, and line rendering

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

// Core mechanics (always available)
pub mod character;
pub mod config;
pub mod grapple;
pub mod input;
pub mod physics;
pub mod rope;
pub mod spatial;

// Bevy integration
pub mod bevy;

pub use character::{CharacterController, CharacterMotionState, JumpKind};
pub use config::{
    ChainConfig, CharacterConfig, ConfigError, GameplayConfig, GrappleConfig, RopeKind,
    RopeSimConfig,
};
pub use grapple::{GrappleController, GrapplePhase};
pub use input::{InputCommand, InputFrame, InputQueue};
pub use physics::{PHYSICS_DT, PhysicsWorld, default_gravity};
pub use rope::{Rope, RopeSegment, SegmentChain, VerletRope, build_rope};
pub use spatial::{RayHit, layers};
