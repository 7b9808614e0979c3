//! Verlet-integrated rope with collision response.
//!
//! The chain is a fixed-length array of point masses mutated in place.
//! Velocity is implicit (`position - previous_position`); every fixed tick
//! runs pin → integrate → (constrain → collide) × N in that order. The
//! distance constraint drives each adjacent pair toward a rest length
//! recomputed from the live endpoint separation, so the chain always spans
//! exactly the anchor-to-target distance.

use rapier2d::prelude::{Group, RigidBodyHandle, Vector};

use crate::config::RopeSimConfig;
use crate::physics::{PHYSICS_DT, PhysicsWorld};
use crate::rope::Rope;
use crate::spatial::layers;

/// One point mass of the chain. Index 0 is the anchor end, the last index
/// the player end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RopeSegment {
    pub position: Vector<f32>,
    pub previous_position: Vector<f32>,
}

impl RopeSegment {
    fn new(position: Vector<f32>) -> Self {
        Self {
            position,
            previous_position: position,
        }
    }
}

/// Continuous rope simulator.
pub struct VerletRope {
    config: RopeSimConfig,
    segments: Vec<RopeSegment>,
    active: bool,
    anchor: Vector<f32>,
    target: Option<RigidBodyHandle>,
    collision_mask: Group,
}

impl VerletRope {
    /// Creates an inactive rope. The segment buffer is allocated once here
    /// and reused across grapples.
    pub fn new(config: RopeSimConfig) -> Self {
        let count = config.segment_count;
        Self {
            config,
            segments: vec![RopeSegment::new(Vector::zeros()); count],
            active: false,
            anchor: Vector::zeros(),
            target: None,
            collision_mask: layers::SOLID,
        }
    }

    /// Overrides the collision-group mask used by the overlap queries.
    pub fn with_collision_mask(mut self, mask: Group) -> Self {
        self.collision_mask = mask;
        self
    }

    /// Current point positions, anchor end first. Lazy and restartable;
    /// the length always equals the configured segment count.
    pub fn points(&self) -> impl Iterator<Item = Vector<f32>> + '_ {
        self.segments.iter().map(|segment| segment.position)
    }

    pub fn segments(&self) -> &[RopeSegment] {
        &self.segments
    }

    pub fn anchor(&self) -> Vector<f32> {
        self.anchor
    }

    /// Verlet integration over every segment. Drag bleeds energy each tick.
    fn integrate(&mut self) {
        let gravity = Vector::new(self.config.gravity[0], self.config.gravity[1]);
        for segment in &mut self.segments {
            let velocity = (segment.position - segment.previous_position) * self.config.drag;
            segment.previous_position = segment.position;
            segment.position += velocity;
            segment.position += gravity * PHYSICS_DT;
        }
    }

    /// One constraint pass: re-pin both ends, then enforce the pairwise
    /// distance constraint with the rest length derived from the live
    /// endpoint separation.
    fn constrain(&mut self, target_pos: Vector<f32>) {
        let count = self.segments.len();

        self.segments[0].position = self.anchor;
        self.segments[count - 1].position = target_pos;

        let total = (self.anchor - target_pos).norm();
        let rest_length = total / (count - 1) as f32;

        for i in 0..count - 1 {
            let mut cur = self.segments[i];
            let mut next = self.segments[i + 1];

            let delta = cur.position - next.position;
            let dist = delta.norm();
            if dist <= f32::EPSILON {
                // Coincident points: nothing to correct, and no direction
                // to correct along.
                continue;
            }

            let correction = (delta / dist) * (dist - rest_length);
            if i == 0 {
                // The anchor never moves; the neighbor absorbs the full
                // correction.
                next.position += correction;
            } else {
                cur.position -= correction * 0.5;
                next.position += correction * 0.5;
            }

            self.segments[i] = cur;
            self.segments[i + 1] = next;
        }
    }

    /// Pushes interior segments out of overlapping colliders and reflects
    /// their implicit velocity, scaled by restitution.
    fn resolve_collisions(&mut self, world: &PhysicsWorld) {
        let count = self.segments.len();
        let radius = self.config.collision_radius;

        for i in 1..count - 1 {
            let mut segment = self.segments[i];
            let mut velocity = segment.position - segment.previous_position;

            for handle in world.overlap_circle(segment.position, radius, self.collision_mask) {
                let Some(closest) = world.closest_point_on(handle, segment.position) else {
                    continue;
                };
                let offset = segment.position - closest;
                let dist = offset.norm();
                if dist >= radius {
                    continue;
                }

                let normal = if dist > f32::EPSILON {
                    offset / dist
                } else {
                    // Segment sits on (or inside) the surface; fall back to
                    // the direction away from the collider's origin.
                    let Some(collider) = world.collider_set.get(handle) else {
                        continue;
                    };
                    let away = segment.position - collider.position().translation.vector;
                    let away_len = away.norm();
                    if away_len <= f32::EPSILON {
                        continue;
                    }
                    away / away_len
                };

                segment.position += normal * (radius - dist);
                velocity = reflect(velocity, normal) * self.config.restitution;
            }

            segment.previous_position = segment.position - velocity;
            self.segments[i] = segment;
        }
    }
}

impl Rope for VerletRope {
    fn attach(&mut self, world: &mut PhysicsWorld, anchor: Vector<f32>, target: RigidBodyHandle) {
        if self.active {
            return;
        }
        let Some(target_pos) = world.body_translation(target) else {
            return;
        };

        self.anchor = anchor;
        self.target = Some(target);

        let count = self.segments.len();
        for (i, segment) in self.segments.iter_mut().enumerate() {
            let t = if count == 1 {
                0.0
            } else {
                i as f32 / (count - 1) as f32
            };
            *segment = RopeSegment::new(anchor + (target_pos - anchor) * t);
        }

        self.active = true;
        tracing::debug!(anchor = ?(anchor.x, anchor.y), segments = count, "rope attached");
    }

    fn release(&mut self, _world: &mut PhysicsWorld) {
        self.active = false;
        self.target = None;
    }

    fn step(&mut self, world: &mut PhysicsWorld) {
        if !self.active {
            return;
        }
        let Some(target_pos) = self.target.and_then(|t| world.body_translation(t)) else {
            return;
        };

        // Lock the player end with zero velocity so the chain does not
        // fight the player's own motion this tick.
        let last = self.segments.len() - 1;
        self.segments[last] = RopeSegment::new(target_pos);

        self.integrate();

        for i in 0..self.config.constraint_iterations {
            self.constrain(target_pos);
            if i % self.config.collision_interval == 0 {
                self.resolve_collisions(world);
            }
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn polyline(&self, _world: &PhysicsWorld, out: &mut Vec<Vector<f32>>) {
        out.clear();
        if self.active {
            out.extend(self.points());
        }
    }
}

fn reflect(v: Vector<f32>, normal: Vector<f32>) -> Vector<f32> {
    v - normal * (2.0 * v.dot(&normal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapier2d::prelude::{ColliderBuilder, Group, InteractionGroups, RigidBodyBuilder};

    fn fixed_body(world: &mut PhysicsWorld, position: Vector<f32>) -> RigidBodyHandle {
        world.add_rigid_body(RigidBodyBuilder::fixed().translation(position).build())
    }

    fn small_config(segment_count: usize) -> RopeSimConfig {
        RopeSimConfig {
            segment_count,
            ..RopeSimConfig::default()
        }
    }

    #[test]
    fn test_attach_interpolates_segments() {
        let mut world = PhysicsWorld::new();
        let target = fixed_body(&mut world, Vector::new(0.0, -5.0));

        let mut rope = VerletRope::new(small_config(5));
        rope.attach(&mut world, Vector::new(0.0, 0.0), target);

        let expected = [0.0, -1.25, -2.5, -3.75, -5.0];
        for (segment, y) in rope.segments().iter().zip(expected) {
            assert!(segment.position.x.abs() < 1e-6);
            assert!((segment.position.y - y).abs() < 1e-6);
            assert_eq!(segment.position, segment.previous_position, "starts at rest");
        }
    }

    #[test]
    fn test_endpoints_stay_pinned() {
        let mut world = PhysicsWorld::new();
        let anchor = Vector::new(0.0, 0.0);
        let target = fixed_body(&mut world, Vector::new(3.0, -2.0));

        let mut rope = VerletRope::new(small_config(8));
        rope.attach(&mut world, anchor, target);

        for _ in 0..20 {
            rope.step(&mut world);
            let segments = rope.segments();
            assert_eq!(segments[0].position, anchor, "anchor end is exact");
            let player_end = segments[segments.len() - 1].position;
            assert!(
                (player_end - Vector::new(3.0, -2.0)).norm() < 1e-3,
                "player end converges onto the target"
            );
        }
    }

    #[test]
    fn test_chain_length_tracks_endpoint_separation() {
        let mut world = PhysicsWorld::new();
        let anchor = Vector::new(0.0, 0.0);
        let target = fixed_body(&mut world, Vector::new(4.0, 0.0));

        let mut rope = VerletRope::new(small_config(10));
        rope.attach(&mut world, anchor, target);
        for _ in 0..30 {
            rope.step(&mut world);
        }

        let total: f32 = rope
            .segments()
            .windows(2)
            .map(|pair| (pair[0].position - pair[1].position).norm())
            .sum();
        assert!(
            (total - 4.0).abs() < 0.05,
            "chain length {total} should match the 4.0 separation"
        );
    }

    #[test]
    fn test_coincident_endpoints_stay_finite() {
        let mut world = PhysicsWorld::new();
        let anchor = Vector::new(1.0, 1.0);
        let target = fixed_body(&mut world, anchor);

        let mut rope = VerletRope::new(small_config(6));
        rope.attach(&mut world, anchor, target);
        for _ in 0..10 {
            rope.step(&mut world);
        }

        for segment in rope.segments() {
            assert!(segment.position.x.is_finite() && segment.position.y.is_finite());
        }
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut world = PhysicsWorld::new();
        let target = fixed_body(&mut world, Vector::new(1.0, 0.0));

        let mut rope = VerletRope::new(small_config(4));
        rope.attach(&mut world, Vector::zeros(), target);
        assert!(rope.is_active());

        rope.release(&mut world);
        assert!(!rope.is_active());
        rope.release(&mut world);
        assert!(!rope.is_active());

        // A released rope no longer simulates or renders.
        rope.step(&mut world);
        let mut points = Vec::new();
        rope.polyline(&world, &mut points);
        assert!(points.is_empty());
    }

    #[test]
    fn test_points_iterator_is_restartable() {
        let rope = VerletRope::new(small_config(7));
        assert_eq!(rope.points().count(), 7);
        assert_eq!(rope.points().count(), 7);
    }

    #[test]
    fn test_collision_keeps_clearance_from_obstacle() {
        let mut world = PhysicsWorld::new();
        let anchor = Vector::new(-2.0, 0.0);
        let target = fixed_body(&mut world, Vector::new(2.0, 0.0));

        // Ball whose top face almost touches the straight span, directly
        // under the middle of the chain.
        let ball_center = Vector::new(0.0, -0.35);
        let ball_radius = 0.3;
        world.add_static_collider(
            ColliderBuilder::ball(ball_radius)
                .translation(ball_center)
                .collision_groups(InteractionGroups::new(layers::GROUND, Group::ALL))
                .build(),
        );

        let mut rope = VerletRope::new(small_config(9));
        let clearance = rope.config.collision_radius;
        rope.attach(&mut world, anchor, target);
        for _ in 0..60 {
            rope.step(&mut world);
        }

        let segments = rope.segments();
        for segment in &segments[1..segments.len() - 1] {
            let surface_distance = (segment.position - ball_center).norm() - ball_radius;
            assert!(
                surface_distance >= clearance - 2e-2,
                "segment at {:?} is only {surface_distance} from the obstacle",
                (segment.position.x, segment.position.y)
            );
        }
    }

    #[test]
    fn test_second_attach_while_active_is_ignored() {
        let mut world = PhysicsWorld::new();
        let target = fixed_body(&mut world, Vector::new(2.0, 0.0));

        let mut rope = VerletRope::new(small_config(4));
        rope.attach(&mut world, Vector::zeros(), target);
        rope.attach(&mut world, Vector::new(9.0, 9.0), target);

        assert_eq!(rope.anchor(), Vector::zeros());
    }
}
