//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `GrapnelHeadlessPlugin` for testing gameplay logic
//! without a rendering or windowing backend.

use bevy::prelude::*;

use crate::bevy::plugin::GrapnelHeadlessPlugin;
use crate::bevy::resources::InputQueueRes;
use crate::config::GameplayConfig;
use crate::input::InputQueue;
use crate::physics::PHYSICS_DT;

/// A headless Bevy app wrapper for testing.
pub(crate) struct TestApp {
    pub app: App,
}

impl TestApp {
    /// Create a new test app with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GameplayConfig::default())
    }

    /// Create a new test app with a specific gameplay configuration.
    pub fn with_config(config: GameplayConfig) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::input::InputPlugin);
        app.add_plugins(GrapnelHeadlessPlugin {
            config,
            player_start: Vec2::ZERO,
            input_queue: None,
        });
        // Pause virtual time so that only explicit step_physics calls
        // advance the simulation — ensures deterministic behavior.
        app.world_mut().resource_mut::<Time<Virtual>>().pause();
        // Run one update to initialize all resources and spawn the player.
        app.update();
        Self { app }
    }

    /// Run a single frame update.
    pub fn update(&mut self) {
        self.app.update();
    }

    /// Advance the simulation by exactly `n` fixed timesteps.
    ///
    /// Uses `Time<Fixed>::accumulate_overstep` to feed time directly into
    /// the fixed-timestep accumulator, bypassing virtual time. Combined
    /// with paused virtual time this gives fully deterministic physics.
    pub fn step_physics(&mut self, n: usize) {
        let dt = std::time::Duration::from_secs_f32(PHYSICS_DT);
        for _ in 0..n {
            self.app
                .world_mut()
                .resource_mut::<Time<Fixed>>()
                .accumulate_overstep(dt);
            self.app.update();
        }
    }

    /// Handle to the shared input queue.
    pub fn queue(&self) -> InputQueue {
        self.app.world().resource::<InputQueueRes>().0.clone()
    }

    /// Get a reference to the World.
    pub fn world(&self) -> &World {
        self.app.world()
    }

    /// Get a mutable reference to the World.
    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
