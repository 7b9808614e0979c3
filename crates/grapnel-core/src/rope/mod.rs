//! Rope representations.
//!
//! Two interchangeable strategies hang behind the [`Rope`] trait: a
//! continuous Verlet point-mass chain ([`VerletRope`]) and a discrete chain
//! of jointed rigid bodies ([`SegmentChain`]). Which one the grapple drives
//! is selected by [`RopeKind`](crate::config::RopeKind) at configuration
//! time; they are never combined.

pub mod chain;
pub mod verlet;

pub use chain::SegmentChain;
pub use verlet::{RopeSegment, VerletRope};

use rapier2d::prelude::{RigidBodyHandle, Vector};

use crate::config::{GameplayConfig, RopeKind};
use crate::physics::PhysicsWorld;

/// Common capability of every rope representation.
pub trait Rope: Send + Sync {
    /// Attaches the rope between a world-space anchor and a movable body.
    /// A second attach while active is ignored.
    fn attach(&mut self, world: &mut PhysicsWorld, anchor: Vector<f32>, target: RigidBodyHandle);

    /// Detaches and discards all rope state. Idempotent.
    fn release(&mut self, world: &mut PhysicsWorld);

    /// Advances the rope by one fixed tick. Inactive ropes do nothing.
    fn step(&mut self, world: &mut PhysicsWorld);

    fn is_active(&self) -> bool;

    /// Rebuilds the ordered render polyline into `out` (cleared first;
    /// empty while inactive).
    fn polyline(&self, world: &PhysicsWorld, out: &mut Vec<Vector<f32>>);
}

/// Builds the rope representation selected by the configuration.
pub fn build_rope(config: &GameplayConfig) -> Box<dyn Rope> {
    match config.rope_kind {
        RopeKind::Verlet => Box::new(VerletRope::new(config.rope.clone())),
        RopeKind::Chain => Box::new(SegmentChain::new(config.chain.clone())),
    }
}
