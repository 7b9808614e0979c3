//! Discrete rope: a chain of jointed rigid bodies.
//!
//! Links are dynamic point bodies connected by revolute joints, ordered from
//! the player to a terminal fixed anchor body at the hook point. Reeling
//! works by consuming links at the anchor end: the link next to the anchor
//! is destroyed on a fixed cadence and the new last link is jointed straight
//! to the anchor, physically shortening the chain.

use rapier2d::prelude::{
    ColliderBuilder, InteractionGroups, Point, RevoluteJointBuilder, RigidBodyBuilder,
    RigidBodyHandle, Vector,
};

use crate::config::ChainConfig;
use crate::physics::{PHYSICS_DT, PhysicsWorld};
use crate::rope::Rope;
use crate::spatial::layers;

/// Chain rope simulator.
pub struct SegmentChain {
    config: ChainConfig,
    /// Link bodies ordered player end → anchor end.
    links: Vec<RigidBodyHandle>,
    anchor_body: Option<RigidBodyHandle>,
    player: Option<RigidBodyHandle>,
    anchor: Vector<f32>,
    removal_timer: f32,
    active: bool,
}

impl SegmentChain {
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            links: Vec::new(),
            anchor_body: None,
            player: None,
            anchor: Vector::zeros(),
            removal_timer: 0.0,
            active: false,
        }
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn anchor(&self) -> Vector<f32> {
        self.anchor
    }

    /// Seconds between link removals while reeling.
    fn removal_interval(&self) -> f32 {
        self.config.segment_length / (self.config.pull_speed * 2.0)
    }

    fn spawn_link(&self, world: &mut PhysicsWorld, position: Vector<f32>) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(position)
            .linear_damping(0.5)
            .build();
        let handle = world.add_rigid_body(body);

        let collider = ColliderBuilder::ball(self.config.link_radius)
            .density(self.config.link_density)
            .collision_groups(InteractionGroups::new(layers::ROPE, layers::SOLID))
            .build();
        world.add_collider(collider, handle);

        handle
    }

    /// Destroys the link next to the anchor and joints the new last link
    /// straight onto it. Skipped silently at the 2-link floor.
    fn remove_anchor_link(&mut self, world: &mut PhysicsWorld) {
        if self.links.len() <= 2 {
            return;
        }
        let Some(anchor_body) = self.anchor_body else {
            return;
        };

        // Joints attached to the removed body go with it.
        if let Some(removed) = self.links.pop() {
            world.remove_rigid_body(removed);
        }
        if let Some(&new_last) = self.links.last() {
            world.add_impulse_joint(new_last, anchor_body, RevoluteJointBuilder::new());
        }
        tracing::debug!(remaining = self.links.len(), "chain link removed");
    }
}

impl Rope for SegmentChain {
    fn attach(&mut self, world: &mut PhysicsWorld, anchor: Vector<f32>, target: RigidBodyHandle) {
        if self.active {
            return;
        }
        let Some(player_pos) = world.body_translation(target) else {
            return;
        };

        let span = anchor - player_pos;
        let distance = span.norm();
        let count = (distance / self.config.segment_length).ceil().max(1.0) as usize;

        self.links.clear();
        let mut previous = target;
        let mut previous_pos = player_pos;
        for i in 0..count {
            let t = (i + 1) as f32 / (count + 1) as f32;
            let position = player_pos + span * t;
            let link = self.spawn_link(world, position);

            // Pin this link's center onto its spawn offset from the
            // predecessor, leaving rotation free.
            let joint = RevoluteJointBuilder::new()
                .local_anchor1(Point::from(position - previous_pos))
                .local_anchor2(Point::origin());
            world.add_impulse_joint(previous, link, joint);

            self.links.push(link);
            previous = link;
            previous_pos = position;
        }

        let anchor_body =
            world.add_rigid_body(RigidBodyBuilder::fixed().translation(anchor).build());
        let terminal_joint = RevoluteJointBuilder::new()
            .local_anchor1(Point::from(anchor - previous_pos))
            .local_anchor2(Point::origin());
        world.add_impulse_joint(previous, anchor_body, terminal_joint);

        self.anchor_body = Some(anchor_body);
        self.player = Some(target);
        self.anchor = anchor;
        self.removal_timer = 0.0;
        self.active = true;
        tracing::debug!(
            anchor = ?(anchor.x, anchor.y),
            links = count,
            "chain attached"
        );
    }

    fn release(&mut self, world: &mut PhysicsWorld) {
        for link in self.links.drain(..) {
            world.remove_rigid_body(link);
        }
        if let Some(anchor_body) = self.anchor_body.take() {
            world.remove_rigid_body(anchor_body);
        }
        self.player = None;
        self.active = false;
    }

    fn step(&mut self, world: &mut PhysicsWorld) {
        if !self.active {
            return;
        }
        let Some(player) = self.player else {
            return;
        };
        let Some(player_pos) = world.body_translation(player) else {
            return;
        };

        // Constant pull toward the anchor; the shrinking chain supplies the
        // actual length limit.
        let toward = self.anchor - player_pos;
        let distance = toward.norm();
        if distance > f32::EPSILON {
            if let Some(body) = world.get_rigid_body_mut(player) {
                body.reset_forces(false);
                body.add_force(toward / distance * self.config.pull_speed, true);
            }
        }

        self.removal_timer += PHYSICS_DT;
        if self.removal_timer >= self.removal_interval() {
            self.removal_timer = 0.0;
            self.remove_anchor_link(world);
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn polyline(&self, world: &PhysicsWorld, out: &mut Vec<Vector<f32>>) {
        out.clear();
        if !self.active {
            return;
        }
        if let Some(player_pos) = self.player.and_then(|p| world.body_translation(p)) {
            out.push(player_pos);
        }
        out.extend(
            self.links
                .iter()
                .filter_map(|&link| world.body_translation(link)),
        );
    }
}
