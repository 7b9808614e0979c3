//! Grapple state machine and joint-based reel.
//!
//! Firing raycasts toward the aim point; a hit pins a fixed anchor body at
//! the hit point and connects the player to it with a rope joint (a pure
//! max-distance constraint). Reeling shrinks the joint's allowed length
//! every fixed tick until the minimum distance detaches it. The active rope
//! representation is attached/released alongside the joint.

use rapier2d::prelude::{
    Group, ImpulseJointHandle, RigidBodyBuilder, RigidBodyHandle, RopeJointBuilder, Vector,
};

use crate::config::GrappleConfig;
use crate::physics::{PHYSICS_DT, PhysicsWorld};
use crate::rope::Rope;
use crate::spatial::layers;

/// Current grapple phase. Aiming resolves within the fire call; reeling is
/// the per-tick behavior of `Attached`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrapplePhase {
    Idle,
    Attached {
        /// Allowed separation the reel shrinks toward the minimum.
        length: f32,
    },
}

/// Drives one player's grapple.
pub struct GrappleController {
    config: GrappleConfig,
    player: RigidBodyHandle,
    phase: GrapplePhase,
    anchor: Vector,
    joint: Option<ImpulseJointHandle>,
    anchor_body: Option<RigidBodyHandle>,
    hookable_mask: Group,
}

impl GrappleController {
    pub fn new(config: GrappleConfig, player: RigidBodyHandle) -> Self {
        Self {
            config,
            player,
            phase: GrapplePhase::Idle,
            anchor: Vector::zeros(),
            joint: None,
            anchor_body: None,
            hookable_mask: layers::HOOKABLE,
        }
    }

    /// Overrides the collision-group mask the fire raycast tests against.
    pub fn with_hookable_mask(mut self, mask: Group) -> Self {
        self.hookable_mask = mask;
        self
    }

    pub fn phase(&self) -> GrapplePhase {
        self.phase
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.phase, GrapplePhase::Attached { .. })
    }

    /// Anchor point of the current grapple; meaningless while idle.
    pub fn anchor(&self) -> Vector {
        self.anchor
    }

    /// Fires toward `aim`. Returns whether the grapple attached. While
    /// already attached this is a no-op.
    pub fn fire(&mut self, world: &mut PhysicsWorld, rope: &mut dyn Rope, aim: Vector) -> bool {
        if self.is_attached() {
            return false;
        }
        let Some(origin) = world.body_translation(self.player) else {
            return false;
        };

        let Some(hit) = world.cast_ray(
            origin,
            aim - origin,
            self.config.max_distance,
            self.hookable_mask,
        ) else {
            return false;
        };

        let length = (hit.point - origin).norm();
        let anchor_body = world.add_rigid_body(
            RigidBodyBuilder::fixed().translation(hit.point).build(),
        );
        let joint = RopeJointBuilder::new(length)
            .local_anchor1(point![0.0, 0.0])
            .local_anchor2(point![0.0, 0.0]);
        let joint = world.add_impulse_joint(self.player, anchor_body, joint);

        self.anchor = hit.point;
        self.anchor_body = Some(anchor_body);
        self.joint = Some(joint);
        self.phase = GrapplePhase::Attached { length };
        rope.attach(world, hit.point, self.player);

        tracing::info!(
            anchor = ?(hit.point.x, hit.point.y),
            length,
            "grapple attached"
        );
        true
    }

    /// One fixed tick of reeling. Detaches automatically once the allowed
    /// length reaches the configured minimum.
    pub fn tick(&mut self, world: &mut PhysicsWorld, rope: &mut dyn Rope) {
        let GrapplePhase::Attached { length } = self.phase else {
            return;
        };

        let length = (length - self.config.reel_speed * PHYSICS_DT).max(self.config.min_distance);
        if let Some(joint) = self.joint.and_then(|j| world.get_impulse_joint_mut(j)) {
            if let Some(rope_joint) = joint.data.as_rope_mut() {
                rope_joint.set_max_distance(length);
            }
        }

        if length <= self.config.min_distance + f32::EPSILON {
            tracing::info!("grapple reeled to minimum, detaching");
            self.detach(world, rope);
        } else {
            self.phase = GrapplePhase::Attached { length };
        }
    }

    /// Manual release: detaches and launches the player away from the
    /// anchor. A release while idle is a no-op.
    pub fn release(&mut self, world: &mut PhysicsWorld, rope: &mut dyn Rope) {
        if !self.is_attached() {
            return;
        }

        let launch = world
            .body_translation(self.player)
            .map(|pos| pos - self.anchor)
            .filter(|dir| dir.norm() > f32::EPSILON)
            .map(|dir| dir.normalize() * self.config.launch_impulse);

        self.detach(world, rope);

        if let Some(impulse) = launch {
            world.apply_impulse(self.player, impulse);
        }
        tracing::info!("grapple released");
    }

    fn detach(&mut self, world: &mut PhysicsWorld, rope: &mut dyn Rope) {
        if let Some(joint) = self.joint.take() {
            world.remove_impulse_joint(joint);
        }
        if let Some(anchor_body) = self.anchor_body.take() {
            world.remove_rigid_body(anchor_body);
        }
        rope.release(world);
        self.phase = GrapplePhase::Idle;
    }
}
