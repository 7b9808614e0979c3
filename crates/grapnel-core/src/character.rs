//! Platformer character controller.
//!
//! Runs on a rotation-locked dynamic body. Every fixed tick the controller
//! probes ground and walls with fixed-size overlap boxes, shapes gravity,
//! applies wall slide, and writes horizontal velocity unless a wall-jump
//! lockout is counting down. Jump presses and releases arrive as discrete
//! calls from the input layer.

use rapier2d::prelude::{
    ColliderBuilder, Group, InteractionGroups, RigidBodyBuilder, RigidBodyHandle, Vector,
};

use crate::config::CharacterConfig;
use crate::input::InputFrame;
use crate::physics::PhysicsWorld;
use crate::spatial::layers;

/// What a jump press actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Normal,
    Wall,
}

/// Per-tick motion state, refreshed by the probes and input handling.
#[derive(Debug, Clone, Copy)]
pub struct CharacterMotionState {
    pub grounded: bool,
    pub wall_left: bool,
    pub wall_right: bool,
    pub wall_sliding: bool,
    pub jumps_remaining: u32,
    /// Seconds left in which a wall jump is still allowed.
    pub wall_jump_timer: f32,
    /// Seconds of suppressed horizontal control left after a wall jump.
    pub lockout_timer: f32,
    /// Horizontal sign a wall jump launches toward.
    pub wall_jump_direction: f32,
    /// Sign of the last non-zero horizontal input.
    pub facing: f32,
}

/// Platformer movement driver for one player body.
pub struct CharacterController {
    config: CharacterConfig,
    body: RigidBodyHandle,
    ground_mask: Group,
    wall_mask: Group,
    state: CharacterMotionState,
}

impl CharacterController {
    pub fn new(config: CharacterConfig, body: RigidBodyHandle) -> Self {
        let jumps = config.max_jumps;
        Self {
            config,
            body,
            ground_mask: layers::GROUND,
            wall_mask: layers::WALL,
            state: CharacterMotionState {
                grounded: false,
                wall_left: false,
                wall_right: false,
                wall_sliding: false,
                jumps_remaining: jumps,
                wall_jump_timer: 0.0,
                lockout_timer: 0.0,
                wall_jump_direction: -1.0,
                facing: 1.0,
            },
        }
    }

    /// Overrides the collision-group masks the ground and wall probes
    /// filter against.
    pub fn with_probe_masks(mut self, ground: Group, wall: Group) -> Self {
        self.ground_mask = ground;
        self.wall_mask = wall;
        self
    }

    /// Spawns a rotation-locked dynamic body with a player collider,
    /// suitable for this controller.
    pub fn spawn_body(world: &mut PhysicsWorld, position: Vector<f32>) -> RigidBodyHandle {
        let body = world.add_rigid_body(
            RigidBodyBuilder::dynamic()
                .translation(position)
                .lock_rotations()
                .ccd_enabled(true)
                .build(),
        );
        let collider = ColliderBuilder::cuboid(0.25, 0.5)
            .density(1.0)
            .collision_groups(InteractionGroups::new(layers::PLAYER, Group::ALL))
            .build();
        world.add_collider(collider, body);
        body
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn state(&self) -> &CharacterMotionState {
        &self.state
    }

    /// One fixed tick: probes, gravity shaping, wall slide, wall-jump
    /// timers, and horizontal control.
    pub fn update(&mut self, world: &mut PhysicsWorld, input: &InputFrame, dt: f32) {
        let Some(position) = world.body_translation(self.body) else {
            return;
        };

        if input.horizontal != 0.0 {
            self.state.facing = input.horizontal.signum();
        }

        self.run_probes(world, position);
        if self.state.grounded {
            self.state.jumps_remaining = self.config.max_jumps;
        }

        self.shape_gravity(world);
        self.process_wall_slide(world, input);

        if self.state.wall_sliding {
            // Sliding re-arms the wall jump and cancels any running lockout.
            self.state.wall_jump_direction = -self.state.facing;
            self.state.wall_jump_timer = self.config.wall_jump_time;
            self.state.lockout_timer = 0.0;
        } else if self.state.wall_jump_timer > 0.0 {
            self.state.wall_jump_timer -= dt;
        }

        if self.state.lockout_timer > 0.0 {
            self.state.lockout_timer -= dt;
        } else if let Some(body) = world.get_rigid_body_mut(self.body) {
            let vy = body.linvel().y;
            body.set_linvel(Vector::new(input.horizontal * self.config.move_speed, vy), true);
        }
    }

    /// Jump press: a wall jump inside its window wins; otherwise one jump
    /// charge is consumed. Returns what happened, if anything.
    pub fn jump_pressed(&mut self, world: &mut PhysicsWorld) -> Option<JumpKind> {
        if self.state.wall_jump_timer > 0.0 {
            let power = self.config.wall_jump_power;
            if let Some(body) = world.get_rigid_body_mut(self.body) {
                body.set_linvel(
                    Vector::new(power[0] * self.state.wall_jump_direction, power[1]),
                    true,
                );
            }
            self.state.wall_jump_timer = 0.0;
            self.state.lockout_timer = self.config.wall_jump_lockout;
            tracing::debug!(direction = self.state.wall_jump_direction, "wall jump");
            return Some(JumpKind::Wall);
        }

        if self.state.jumps_remaining == 0 {
            return None;
        }
        if let Some(body) = world.get_rigid_body_mut(self.body) {
            let vx = body.linvel().x;
            body.set_linvel(Vector::new(vx, self.config.jump_force), true);
        }
        // A tap fires both the press and the release of the same action;
        // only the press costs a charge.
        self.state.jumps_remaining -= 1;
        tracing::debug!(remaining = self.state.jumps_remaining, "jump");
        Some(JumpKind::Normal)
    }

    /// Early jump release cuts the ascent short for a partial-height jump.
    pub fn jump_released(&mut self, world: &mut PhysicsWorld) {
        if let Some(body) = world.get_rigid_body_mut(self.body) {
            let velocity = *body.linvel();
            if velocity.y > 0.0 {
                body.set_linvel(Vector::new(velocity.x, velocity.y * 0.5), true);
            }
        }
    }

    fn run_probes(&mut self, world: &PhysicsWorld, position: Vector<f32>) {
        let ground_center = position
            + Vector::new(
                self.config.ground_probe_offset[0],
                self.config.ground_probe_offset[1],
            );
        let ground_half = Vector::new(
            self.config.ground_probe_half_extents[0],
            self.config.ground_probe_half_extents[1],
        );
        self.state.grounded =
            world.overlap_box(ground_center, ground_half, self.ground_mask, Some(self.body));

        let wall_half = Vector::new(
            self.config.wall_probe_half_extents[0],
            self.config.wall_probe_half_extents[1],
        );
        let reach = Vector::new(self.config.wall_probe_reach, 0.0);
        self.state.wall_right =
            world.overlap_box(position + reach, wall_half, self.wall_mask, Some(self.body));
        self.state.wall_left =
            world.overlap_box(position - reach, wall_half, self.wall_mask, Some(self.body));
    }

    fn shape_gravity(&self, world: &mut PhysicsWorld) {
        let Some(body) = world.get_rigid_body_mut(self.body) else {
            return;
        };
        let velocity = *body.linvel();
        if velocity.y < 0.0 {
            body.set_gravity_scale(self.config.base_gravity * self.config.fall_multiplier, false);
            if velocity.y < -self.config.max_fall_speed {
                body.set_linvel(Vector::new(velocity.x, -self.config.max_fall_speed), true);
            }
        } else {
            body.set_gravity_scale(self.config.base_gravity, false);
        }
    }

    fn process_wall_slide(&mut self, world: &mut PhysicsWorld, input: &InputFrame) {
        let touching_wall = self.state.wall_left || self.state.wall_right;
        if !self.state.grounded && touching_wall && input.horizontal != 0.0 {
            self.state.wall_sliding = true;
            if let Some(body) = world.get_rigid_body_mut(self.body) {
                let velocity = *body.linvel();
                if velocity.y < -self.config.wall_slide_speed {
                    body.set_linvel(
                        Vector::new(velocity.x, -self.config.wall_slide_speed),
                        true,
                    );
                }
            }
        } else {
            self.state.wall_sliding = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PHYSICS_DT;
    use rapier2d::prelude::ColliderBuilder;

    fn add_box(world: &mut PhysicsWorld, center: Vector<f32>, half: Vector<f32>, group: Group) {
        world.add_static_collider(
            ColliderBuilder::cuboid(half.x, half.y)
                .translation(center)
                .collision_groups(InteractionGroups::new(group, Group::ALL))
                .build(),
        );
    }

    /// Player standing on a floor strip at y = 0 (body center at y = 0.5).
    fn grounded_setup() -> (PhysicsWorld, CharacterController) {
        let mut world = PhysicsWorld::new();
        add_box(
            &mut world,
            Vector::new(0.0, -0.25),
            Vector::new(5.0, 0.25),
            layers::GROUND,
        );
        let body = CharacterController::spawn_body(&mut world, Vector::new(0.0, 0.5));
        let controller = CharacterController::new(CharacterConfig::default(), body);
        (world, controller)
    }

    /// Airborne player with a wall on the right.
    fn wall_setup() -> (PhysicsWorld, CharacterController) {
        let mut world = PhysicsWorld::new();
        add_box(
            &mut world,
            Vector::new(0.75, 0.0),
            Vector::new(0.25, 3.0),
            layers::WALL,
        );
        let body = CharacterController::spawn_body(&mut world, Vector::new(0.0, 0.0));
        let controller = CharacterController::new(CharacterConfig::default(), body);
        (world, controller)
    }

    #[test]
    fn test_grounded_resets_jump_charges() {
        let (mut world, mut controller) = grounded_setup();
        controller.state.jumps_remaining = 0;

        controller.update(&mut world, &InputFrame::default(), PHYSICS_DT);

        assert!(controller.state().grounded);
        assert_eq!(controller.state().jumps_remaining, 2);
    }

    #[test]
    fn test_horizontal_control_sets_run_speed() {
        let (mut world, mut controller) = grounded_setup();
        let input = InputFrame {
            horizontal: 1.0,
            ..Default::default()
        };

        controller.update(&mut world, &input, PHYSICS_DT);

        let velocity = *world.get_rigid_body(controller.body()).unwrap().linvel();
        assert_eq!(velocity.x, 8.0);
        assert_eq!(controller.state().facing, 1.0);
    }

    #[test]
    fn test_jump_press_consumes_single_charge() {
        let (mut world, mut controller) = grounded_setup();
        controller.update(&mut world, &InputFrame::default(), PHYSICS_DT);

        assert_eq!(
            controller.jump_pressed(&mut world),
            Some(JumpKind::Normal)
        );
        let velocity = *world.get_rigid_body(controller.body()).unwrap().linvel();
        assert_eq!(velocity.y, 10.0);
        assert_eq!(controller.state().jumps_remaining, 1);

        // A tap's release halves the ascent but costs no second charge.
        controller.jump_released(&mut world);
        let velocity = *world.get_rigid_body(controller.body()).unwrap().linvel();
        assert_eq!(velocity.y, 5.0);
        assert_eq!(controller.state().jumps_remaining, 1);
    }

    #[test]
    fn test_release_while_falling_keeps_velocity() {
        let (mut world, mut controller) = grounded_setup();
        world
            .get_rigid_body_mut(controller.body())
            .unwrap()
            .set_linvel(Vector::new(0.0, -3.0), true);

        controller.jump_released(&mut world);

        let velocity = *world.get_rigid_body(controller.body()).unwrap().linvel();
        assert_eq!(velocity.y, -3.0);
    }

    #[test]
    fn test_double_jump_exhausts_charges() {
        let mut world = PhysicsWorld::new();
        let body = CharacterController::spawn_body(&mut world, Vector::new(0.0, 5.0));
        let mut controller = CharacterController::new(CharacterConfig::default(), body);

        assert_eq!(
            controller.jump_pressed(&mut world),
            Some(JumpKind::Normal)
        );
        assert_eq!(
            controller.jump_pressed(&mut world),
            Some(JumpKind::Normal)
        );
        assert_eq!(controller.state().jumps_remaining, 0);

        // Out of charges: a further press leaves velocity alone.
        world
            .get_rigid_body_mut(body)
            .unwrap()
            .set_linvel(Vector::new(0.0, -2.0), true);
        assert_eq!(controller.jump_pressed(&mut world), None);
        let velocity = *world.get_rigid_body(body).unwrap().linvel();
        assert_eq!(velocity.y, -2.0);
    }

    #[test]
    fn test_fall_gravity_multiplier_and_clamp() {
        let mut world = PhysicsWorld::new();
        let body = CharacterController::spawn_body(&mut world, Vector::new(0.0, 5.0));
        let mut controller = CharacterController::new(CharacterConfig::default(), body);

        world
            .get_rigid_body_mut(body)
            .unwrap()
            .set_linvel(Vector::new(0.0, -1.0), true);
        controller.update(&mut world, &InputFrame::default(), PHYSICS_DT);
        assert_eq!(world.get_rigid_body(body).unwrap().gravity_scale(), 4.0);

        world
            .get_rigid_body_mut(body)
            .unwrap()
            .set_linvel(Vector::new(0.0, -100.0), true);
        controller.update(&mut world, &InputFrame::default(), PHYSICS_DT);
        let velocity = *world.get_rigid_body(body).unwrap().linvel();
        assert_eq!(velocity.y, -20.0);

        world
            .get_rigid_body_mut(body)
            .unwrap()
            .set_linvel(Vector::new(0.0, 3.0), true);
        controller.update(&mut world, &InputFrame::default(), PHYSICS_DT);
        assert_eq!(world.get_rigid_body(body).unwrap().gravity_scale(), 2.0);
    }

    #[test]
    fn test_wall_slide_caps_fall_speed() {
        let (mut world, mut controller) = wall_setup();
        world
            .get_rigid_body_mut(controller.body())
            .unwrap()
            .set_linvel(Vector::new(0.0, -5.0), true);

        let input = InputFrame {
            horizontal: 1.0,
            ..Default::default()
        };
        controller.update(&mut world, &input, PHYSICS_DT);

        assert!(controller.state().wall_sliding);
        let velocity = *world.get_rigid_body(controller.body()).unwrap().linvel();
        assert_eq!(velocity.y, -1.0);
    }

    #[test]
    fn test_wall_slide_needs_horizontal_input() {
        let (mut world, mut controller) = wall_setup();
        world
            .get_rigid_body_mut(controller.body())
            .unwrap()
            .set_linvel(Vector::new(0.0, -5.0), true);

        controller.update(&mut world, &InputFrame::default(), PHYSICS_DT);

        assert!(controller.state().wall_right);
        assert!(!controller.state().wall_sliding);
    }

    #[test]
    fn test_wall_jump_launches_away_and_locks_control() {
        let (mut world, mut controller) = wall_setup();
        let toward_wall = InputFrame {
            horizontal: 1.0,
            ..Default::default()
        };

        // Slide against the right wall to arm the wall-jump window.
        world
            .get_rigid_body_mut(controller.body())
            .unwrap()
            .set_linvel(Vector::new(0.0, -2.0), true);
        controller.update(&mut world, &toward_wall, PHYSICS_DT);
        assert!(controller.state().wall_jump_timer > 0.0);
        assert_eq!(controller.state().wall_jump_direction, -1.0);

        assert_eq!(controller.jump_pressed(&mut world), Some(JumpKind::Wall));
        let velocity = *world.get_rigid_body(controller.body()).unwrap().linvel();
        assert_eq!(velocity.x, -5.0, "pushed away from the right wall");
        assert_eq!(velocity.y, 10.0);
        assert!(controller.state().lockout_timer > 0.0);
        assert_eq!(controller.state().wall_jump_timer, 0.0);

        // While locked out, neutral input must not overwrite the launch
        // velocity; afterwards control resumes.
        let neutral = InputFrame::default();
        for _ in 0..35 {
            controller.update(&mut world, &neutral, PHYSICS_DT);
        }
        let velocity = *world.get_rigid_body(controller.body()).unwrap().linvel();
        assert_eq!(velocity.x, -5.0);

        for _ in 0..10 {
            controller.update(&mut world, &neutral, PHYSICS_DT);
        }
        let velocity = *world.get_rigid_body(controller.body()).unwrap().linvel();
        assert_eq!(velocity.x, 0.0, "control resumed after the lockout");
    }

    #[test]
    fn test_wall_jump_window_expires() {
        let (mut world, mut controller) = wall_setup();
        let toward_wall = InputFrame {
            horizontal: 1.0,
            ..Default::default()
        };
        world
            .get_rigid_body_mut(controller.body())
            .unwrap()
            .set_linvel(Vector::new(0.0, -2.0), true);
        controller.update(&mut world, &toward_wall, PHYSICS_DT);
        assert!(controller.state().wall_jump_timer > 0.0);

        // Leave the slide and let the window run out.
        let neutral = InputFrame::default();
        for _ in 0..40 {
            controller.update(&mut world, &neutral, PHYSICS_DT);
        }
        assert!(controller.state().wall_jump_timer <= 0.0);

        world
            .get_rigid_body_mut(controller.body())
            .unwrap()
            .set_linvel(Vector::new(0.0, 1.0), true);
        assert_eq!(
            controller.jump_pressed(&mut world),
            Some(JumpKind::Normal),
            "a normal jump, not a wall jump"
        );
        let velocity = *world.get_rigid_body(controller.body()).unwrap().linvel();
        assert_eq!(velocity.y, 10.0);
        assert_eq!(velocity.x, 0.0);
    }
}
