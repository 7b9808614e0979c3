//! Spatial query surface over [`PhysicsWorld`].
//!
//! Raycasts go through the broad-phase; the fixed-size probe and rope
//! overlap checks test parry shapes against the collider set directly.

use rapier2d::parry::query::intersection_test;
use rapier2d::prelude::*;

use crate::physics::PhysicsWorld;

/// Collision-group assignments shared by every collider in the game world.
pub mod layers {
    use rapier2d::prelude::Group;

    pub const GROUND: Group = Group::GROUP_1;
    pub const WALL: Group = Group::GROUP_2;
    pub const HOOKABLE: Group = Group::GROUP_3;
    pub const PLAYER: Group = Group::GROUP_4;
    pub const ROPE: Group = Group::GROUP_5;

    /// Everything the rope can rest against.
    pub const SOLID: Group = GROUND.union(WALL).union(HOOKABLE);
}

/// Result of a successful raycast.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub collider: ColliderHandle,
    pub point: Vector,
    pub normal: Vector,
    pub distance: f32,
}

impl PhysicsWorld {
    /// Casts a ray and returns the nearest hit against colliders matching
    /// `mask`. A degenerate direction yields no hit.
    pub fn cast_ray(
        &self,
        origin: Vector,
        dir: Vector,
        max_distance: f32,
        mask: Group,
    ) -> Option<RayHit> {
        let length = dir.length();
        if length <= f32::EPSILON {
            return None;
        }

        let ray = Ray::new(origin, dir / length);
        let filter = QueryFilter::new()
            .groups(InteractionGroups::new(Group::ALL, mask, InteractionTestMode::And));
        let query_pipeline = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.rigid_body_set,
            &self.collider_set,
            filter,
        );

        let (collider, hit) = query_pipeline.cast_ray_and_get_normal(&ray, max_distance, true)?;
        Some(RayHit {
            collider,
            point: ray.point_at(hit.time_of_impact),
            normal: hit.normal,
            distance: hit.time_of_impact,
        })
    }

    /// Returns every collider matching `mask` whose surface lies within
    /// `radius` of `center`.
    pub fn overlap_circle(
        &self,
        center: Vector,
        radius: f32,
        mask: Group,
    ) -> Vec<ColliderHandle> {
        let point = center;
        self.collider_set
            .iter()
            .filter(|(_, collider)| collider.collision_groups().memberships.intersects(mask))
            .filter(|(_, collider)| {
                collider
                    .shape()
                    .distance_to_point(collider.position(), point, true)
                    <= radius
            })
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Tests whether an axis-aligned box overlaps any collider matching
    /// `mask`, ignoring colliders attached to `exclude`.
    pub fn overlap_box(
        &self,
        center: Vector,
        half_extents: Vector,
        mask: Group,
        exclude: Option<RigidBodyHandle>,
    ) -> bool {
        let shape = Cuboid::new(half_extents);
        let position = Pose::translation(center.x, center.y);
        self.collider_set.iter().any(|(_, collider)| {
            if !collider.collision_groups().memberships.intersects(mask) {
                return false;
            }
            if collider.parent().is_some() && collider.parent() == exclude {
                return false;
            }
            intersection_test(&position, &shape, collider.position(), collider.shape())
                .unwrap_or(false)
        })
    }

    /// Closest point on a collider's surface to `point`. Points inside a
    /// solid collider project onto themselves.
    pub fn closest_point_on(
        &self,
        handle: ColliderHandle,
        point: Vector,
    ) -> Option<Vector> {
        let collider = self.collider_set.get(handle)?;
        let projection = collider
            .shape()
            .project_point(collider.position(), point, true);
        Some(projection.point)
    }
}
