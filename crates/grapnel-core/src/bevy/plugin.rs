//! Bevy plugins.
//!
//! Provides:
//! - `GrapnelHeadlessPlugin`: logic-only plugin (no rendering/window
//!   dependencies) for headless testing and embedding
//! - `GrapnelPlugin`: `GrapnelHeadlessPlugin` + gizmo rendering systems

use bevy::prelude::*;

use crate::bevy::events::*;
use crate::bevy::resources::*;
use crate::bevy::systems;
use crate::config::GameplayConfig;
use crate::input::InputQueue;
use crate::physics::PHYSICS_DT;

/// Fixed-tick execution order. Within one tick the pipeline is always
/// character control → grapple reel → rope step → physics step → sync.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameplaySet {
    Character,
    Grapple,
    Rope,
    Step,
    Sync,
}

/// Headless plugin containing all gameplay logic without rendering or
/// window dependencies.
///
/// Use this plugin in tests with `MinimalPlugins` (plus `InputPlugin`) to
/// run the ECS systems without a windowing or rendering backend.
pub struct GrapnelHeadlessPlugin {
    pub config: GameplayConfig,
    pub player_start: Vec2,
    /// Shared queue hosts push input through; a fresh one is created when
    /// absent.
    pub input_queue: Option<InputQueue>,
}

impl Default for GrapnelHeadlessPlugin {
    fn default() -> Self {
        Self {
            config: GameplayConfig::default(),
            player_start: Vec2::ZERO,
            input_queue: None,
        }
    }
}

impl Plugin for GrapnelHeadlessPlugin {
    fn build(&self, app: &mut App) {
        if let Err(error) = self.config.validate() {
            tracing::error!(%error, "invalid gameplay configuration");
        }

        // ====================================================================
        // Physics timing
        // ====================================================================
        app.insert_resource(Time::<Fixed>::from_seconds(f64::from(PHYSICS_DT)));

        // ====================================================================
        // Resources
        // ====================================================================
        app.insert_resource(PhysicsWorldRes::default())
            .insert_resource(GameplayConfigRes(self.config.clone()))
            .insert_resource(PlayerInput::default())
            .insert_resource(InputQueueRes(
                self.input_queue.clone().unwrap_or_default(),
            ))
            .insert_resource(AimTarget::default())
            .insert_resource(RopePolyline::default())
            .insert_resource(PlayerSpawn(self.player_start));

        // ====================================================================
        // Messages
        // ====================================================================
        app.add_message::<GrappleAttachedEvent>()
            .add_message::<GrappleReleasedEvent>()
            .add_message::<JumpedEvent>();

        // ====================================================================
        // Systems
        // ====================================================================
        app.add_systems(Startup, systems::setup_player);

        app.add_systems(
            Update,
            (
                systems::sample_input,
                systems::apply_input_transitions,
                systems::rebuild_rope_polyline,
            )
                .chain(),
        );

        app.configure_sets(
            FixedUpdate,
            (
                GameplaySet::Character,
                GameplaySet::Grapple,
                GameplaySet::Rope,
                GameplaySet::Step,
                GameplaySet::Sync,
            )
                .chain(),
        );
        app.add_systems(
            FixedUpdate,
            (
                systems::character_tick.in_set(GameplaySet::Character),
                systems::grapple_tick.in_set(GameplaySet::Grapple),
                systems::rope_tick.in_set(GameplaySet::Rope),
                systems::run_physics_step.in_set(GameplaySet::Step),
                systems::sync_from_physics.in_set(GameplaySet::Sync),
            ),
        );
    }
}

/// Full plugin: headless logic plus gizmo rendering.
pub struct GrapnelPlugin {
    pub config: GameplayConfig,
    pub player_start: Vec2,
    pub input_queue: Option<InputQueue>,
}

impl Default for GrapnelPlugin {
    fn default() -> Self {
        Self {
            config: GameplayConfig::default(),
            player_start: Vec2::ZERO,
            input_queue: None,
        }
    }
}

impl Plugin for GrapnelPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(GrapnelHeadlessPlugin {
            config: self.config.clone(),
            player_start: self.player_start,
            input_queue: self.input_queue.clone(),
        });

        app.add_systems(Update, (systems::render_rope, systems::render_player));
    }
}
