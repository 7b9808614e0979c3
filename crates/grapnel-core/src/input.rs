//! Input surface.
//!
//! Gameplay code consumes an [`InputFrame`] snapshot per frame; where the
//! events come from (Bevy input systems, an embedding host, tests) is the
//! caller's business. Hosts outside the ECS push [`InputCommand`]s through
//! the shared [`InputQueue`].

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use rapier2d::prelude::Vector;

/// One frame's worth of sampled input.
///
/// `*_pressed` / `*_released` are edges valid for a single frame;
/// `jump_held` distinguishes a held jump from a tap.
#[derive(Debug, Clone, Copy)]
pub struct InputFrame {
    /// Horizontal axis in [-1, 1].
    pub horizontal: f32,
    pub jump_pressed: bool,
    pub jump_released: bool,
    pub jump_held: bool,
    pub fire_pressed: bool,
    pub fire_released: bool,
    /// World-space point the grapple aims at.
    pub aim_point: Vector,
}

impl Default for InputFrame {
    fn default() -> Self {
        Self {
            horizontal: 0.0,
            jump_pressed: false,
            jump_released: false,
            jump_held: false,
            fire_pressed: false,
            fire_released: false,
            aim_point: Vector::ZERO,
        }
    }
}

impl InputFrame {
    /// Clears the single-frame edge flags, keeping axis/held state.
    pub fn clear_edges(&mut self) {
        self.jump_pressed = false;
        self.jump_released = false;
        self.fire_pressed = false;
        self.fire_released = false;
    }
}

/// Input event pushed by an embedding host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputCommand {
    FireDown { aim: Vector },
    FireUp,
    JumpDown,
    JumpUp,
    Axis(f32),
    Aim(Vector),
}

/// Thread-safe queue feeding [`InputCommand`]s into the game loop.
///
/// Clone-cheap; all clones share the same underlying queue.
#[derive(Clone, Default)]
pub struct InputQueue {
    inner: Arc<Mutex<VecDeque<InputCommand>>>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a command to be processed.
    pub fn push(&self, command: InputCommand) {
        self.inner.lock().push_back(command);
    }

    /// Drain all pending commands.
    pub fn drain(&self) -> Vec<InputCommand> {
        self.inner.lock().drain(..).collect()
    }

    /// Folds every queued command into the frame snapshot.
    pub fn apply_to(&self, frame: &mut InputFrame) {
        for command in self.drain() {
            match command {
                InputCommand::FireDown { aim } => {
                    frame.fire_pressed = true;
                    frame.aim_point = aim;
                }
                InputCommand::FireUp => frame.fire_released = true,
                InputCommand::JumpDown => {
                    frame.jump_pressed = true;
                    frame.jump_held = true;
                }
                InputCommand::JumpUp => {
                    frame.jump_released = true;
                    frame.jump_held = false;
                }
                InputCommand::Axis(value) => frame.horizontal = value.clamp(-1.0, 1.0),
                InputCommand::Aim(point) => frame.aim_point = point,
            }
        }
    }
}
