//! Gameplay systems.
//!
//! Variable-rate pass (`Update`): input sampling, grapple/jump state
//! transitions, polyline rebuild, gizmo rendering. Fixed-rate pass
//! (`FixedUpdate`): character tick → grapple reel → rope step → physics
//! step → transform sync, ordered by [`GameplaySet`](crate::bevy::plugin::GameplaySet).

use bevy::prelude::*;
use rapier2d::prelude::Vector;

use crate::bevy::components::{PhysicsBody, Player};
use crate::bevy::events::{GrappleAttachedEvent, GrappleReleasedEvent, JumpedEvent};
use crate::bevy::resources::{
    AimTarget, GameplayConfigRes, InputQueueRes, PhysicsWorldRes, PlayerInput, PlayerRig,
    PlayerSpawn, RopePolyline,
};
use crate::character::CharacterController;
use crate::grapple::GrappleController;
use crate::physics::PHYSICS_DT;
use crate::rope::build_rope;

fn to_vector(v: Vec2) -> Vector<f32> {
    Vector::new(v.x, v.y)
}

/// Startup system: spawns the player body and builds the controllers.
pub fn setup_player(
    mut commands: Commands,
    mut physics: ResMut<PhysicsWorldRes>,
    config: Res<GameplayConfigRes>,
    spawn: Res<PlayerSpawn>,
) {
    let body = CharacterController::spawn_body(&mut physics.world, to_vector(spawn.0));
    commands.insert_resource(PlayerRig {
        character: CharacterController::new(config.0.character.clone(), body),
        grapple: GrappleController::new(config.0.grapple.clone(), body),
        rope: build_rope(&config.0),
    });
    commands.spawn((
        Player,
        PhysicsBody(body),
        Transform::from_xyz(spawn.0.x, spawn.0.y, 0.0),
    ));
    tracing::info!(start = ?(spawn.0.x, spawn.0.y), "player spawned");
}

/// Samples keyboard/mouse state and the external queue into [`PlayerInput`].
pub fn sample_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    aim: Res<AimTarget>,
    queue: Res<InputQueueRes>,
    mut input: ResMut<PlayerInput>,
) {
    let frame = &mut input.0;
    frame.clear_edges();

    let mut horizontal = 0.0;
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        horizontal -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        horizontal += 1.0;
    }
    frame.horizontal = horizontal;

    if keyboard.just_pressed(KeyCode::Space) {
        frame.jump_pressed = true;
    }
    if keyboard.just_released(KeyCode::Space) {
        frame.jump_released = true;
    }
    frame.jump_held = keyboard.pressed(KeyCode::Space);

    if mouse.just_pressed(MouseButton::Left) {
        frame.fire_pressed = true;
    }
    if mouse.just_released(MouseButton::Left) {
        frame.fire_released = true;
    }
    frame.aim_point = to_vector(aim.0);

    // Host-pushed commands override the sampled state.
    queue.0.apply_to(frame);
}

/// Applies the frame's input edges: grapple fire/release and jump
/// press/release state transitions.
pub fn apply_input_transitions(
    rig: Option<ResMut<PlayerRig>>,
    mut physics: ResMut<PhysicsWorldRes>,
    input: Res<PlayerInput>,
    mut attached_events: MessageWriter<GrappleAttachedEvent>,
    mut released_events: MessageWriter<GrappleReleasedEvent>,
    mut jumped_events: MessageWriter<JumpedEvent>,
) {
    let Some(mut rig) = rig else {
        return;
    };
    let PlayerRig {
        character,
        grapple,
        rope,
    } = &mut *rig;
    let frame = input.0;

    if frame.jump_pressed {
        if let Some(kind) = character.jump_pressed(&mut physics.world) {
            jumped_events.write(JumpedEvent {
                wall_jump: kind == crate::character::JumpKind::Wall,
            });
        }
    }
    if frame.jump_released {
        character.jump_released(&mut physics.world);
    }

    if frame.fire_pressed
        && grapple.fire(&mut physics.world, rope.as_mut(), frame.aim_point)
    {
        let anchor = grapple.anchor();
        attached_events.write(GrappleAttachedEvent {
            anchor: Vec2::new(anchor.x, anchor.y),
        });
    }
    if frame.fire_released && grapple.is_attached() {
        grapple.release(&mut physics.world, rope.as_mut());
        released_events.write(GrappleReleasedEvent { auto: false });
    }
}

/// Fixed tick: character probes, gravity shaping, and movement.
pub fn character_tick(
    rig: Option<ResMut<PlayerRig>>,
    mut physics: ResMut<PhysicsWorldRes>,
    input: Res<PlayerInput>,
) {
    if let Some(mut rig) = rig {
        rig.character.update(&mut physics.world, &input.0, PHYSICS_DT);
    }
}

/// Fixed tick: grapple reel; publishes the auto-detach at minimum distance.
pub fn grapple_tick(
    rig: Option<ResMut<PlayerRig>>,
    mut physics: ResMut<PhysicsWorldRes>,
    mut released_events: MessageWriter<GrappleReleasedEvent>,
) {
    let Some(mut rig) = rig else {
        return;
    };
    let PlayerRig { grapple, rope, .. } = &mut *rig;

    let was_attached = grapple.is_attached();
    grapple.tick(&mut physics.world, rope.as_mut());
    if was_attached && !grapple.is_attached() {
        released_events.write(GrappleReleasedEvent { auto: true });
    }
}

/// Fixed tick: advances the active rope representation.
pub fn rope_tick(rig: Option<ResMut<PlayerRig>>, mut physics: ResMut<PhysicsWorldRes>) {
    if let Some(mut rig) = rig {
        rig.rope.step(&mut physics.world);
    }
}

/// Fixed tick: one rapier step.
pub fn run_physics_step(mut physics: ResMut<PhysicsWorldRes>) {
    physics.world.step();
}

/// Fixed tick: copies rapier body translations back onto ECS transforms.
pub fn sync_from_physics(
    physics: Res<PhysicsWorldRes>,
    mut bodies: Query<(&PhysicsBody, &mut Transform)>,
) {
    for (body, mut transform) in bodies.iter_mut() {
        if let Some(position) = physics.world.body_translation(body.0) {
            transform.translation.x = position.x;
            transform.translation.y = position.y;
        }
    }
}

/// Rebuilds the ordered point sequence the line renderer consumes.
pub fn rebuild_rope_polyline(
    rig: Option<Res<PlayerRig>>,
    physics: Res<PhysicsWorldRes>,
    mut polyline: ResMut<RopePolyline>,
    mut scratch: Local<Vec<Vector<f32>>>,
) {
    let Some(rig) = rig else {
        return;
    };
    rig.rope.polyline(&physics.world, &mut scratch);
    polyline.0.clear();
    polyline
        .0
        .extend(scratch.iter().map(|point| Vec2::new(point.x, point.y)));
}

/// System to render the rope polyline using gizmos.
pub fn render_rope(mut gizmos: Gizmos, polyline: Res<RopePolyline>) {
    let color = Color::srgb(0.85, 0.65, 0.25);
    for pair in polyline.0.windows(2) {
        gizmos.line_2d(pair[0], pair[1], color);
    }
}

/// System to render the player avatar using gizmos.
pub fn render_player(mut gizmos: Gizmos, players: Query<&Transform, With<Player>>) {
    for transform in players.iter() {
        let pos = transform.translation.truncate();
        gizmos.rect_2d(
            Isometry2d::from_translation(pos),
            Vec2::new(0.5, 1.0),
            Color::srgb(0.3, 0.7, 0.9),
        );
    }
}
