//! Gameplay configuration.
//!
//! All tunable numbers live here, grouped per mechanic. Configurations are
//! plain serde structs so hosts can load them from JSON; `validate()` is the
//! single place where bad values are rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by [`GameplayConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rope segment count must be at least 2 (got {0})")]
    SegmentCount(usize),
    #[error("rope drag must lie in (0, 1) (got {0})")]
    Drag(String),
    #[error("constraint iteration count must be at least 1")]
    ConstraintIterations,
    #[error("collision check interval must be at least 1")]
    CollisionInterval,
    #[error("chain segment length must be positive (got {0})")]
    SegmentLength(String),
    #[error("reel speed must be positive (got {0})")]
    ReelSpeed(String),
    #[error("pull speed must be positive (got {0})")]
    PullSpeed(String),
    #[error("minimum reel distance {min} must be below max grapple distance {max}")]
    ReelRange { min: String, max: String },
}

/// Which rope representation the grapple drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RopeKind {
    /// Continuous point-mass chain with Verlet integration and collision
    /// response.
    #[default]
    Verlet,
    /// Discrete chain of jointed rigid bodies, reeled in by removing links.
    Chain,
}

/// Verlet rope simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RopeSimConfig {
    /// Number of point masses in the chain (anchor and player ends included).
    pub segment_count: usize,
    /// Gravity applied to rope points, independent of the physics world.
    pub gravity: [f32; 2],
    /// Per-tick velocity retention factor, in (0, 1).
    pub drag: f32,
    /// Distance-constraint passes per fixed tick.
    pub constraint_iterations: usize,
    /// Collision resolution runs every this many constraint passes.
    pub collision_interval: usize,
    /// Radius around each interior point used for overlap queries.
    pub collision_radius: f32,
    /// Velocity retained along the reflected direction after a hit.
    pub restitution: f32,
}

impl Default for RopeSimConfig {
    fn default() -> Self {
        Self {
            segment_count: 50,
            gravity: [0.0, -2.0],
            drag: 0.98,
            constraint_iterations: 150,
            collision_interval: 2,
            collision_radius: 0.1,
            restitution: 0.1,
        }
    }
}

/// Grapple aiming and reeling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrappleConfig {
    /// Maximum raycast distance when firing.
    pub max_distance: f32,
    /// How fast the allowed rope length shrinks, in units per second.
    pub reel_speed: f32,
    /// Reeling stops and the grapple detaches at this separation.
    pub min_distance: f32,
    /// Outward impulse applied to the player on manual release.
    pub launch_impulse: f32,
}

impl Default for GrappleConfig {
    fn default() -> Self {
        Self {
            max_distance: 10.0,
            reel_speed: 3.0,
            min_distance: 0.1,
            launch_impulse: 5.0,
        }
    }
}

/// Discrete segment-chain parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Rest length of one chain link; link count = ceil(distance / length).
    pub segment_length: f32,
    /// Magnitude of the constant pull force toward the anchor.
    pub pull_speed: f32,
    /// Mass density of each link body.
    pub link_density: f32,
    /// Collider radius of each link body.
    pub link_radius: f32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            segment_length: 0.225,
            pull_speed: 5.0,
            link_density: 0.2,
            link_radius: 0.05,
        }
    }
}

/// Platformer movement parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterConfig {
    /// Horizontal run speed.
    pub move_speed: f32,
    /// Upward velocity set on a jump press.
    pub jump_force: f32,
    /// Charges available between ground contacts (2 = double jump).
    pub max_jumps: u32,
    /// Gravity scale while rising or grounded.
    pub base_gravity: f32,
    /// Gravity scale multiplier while falling.
    pub fall_multiplier: f32,
    /// Fall speed magnitude is clamped to this value.
    pub max_fall_speed: f32,
    /// Downward speed cap while wall sliding.
    pub wall_slide_speed: f32,
    /// Wall jump velocity: x is pushed away from the wall, y upward.
    pub wall_jump_power: [f32; 2],
    /// Seconds after leaving a wall slide during which a wall jump is allowed.
    pub wall_jump_time: f32,
    /// Seconds of suppressed horizontal control after a wall jump.
    pub wall_jump_lockout: f32,
    /// Half-extents of the ground probe box.
    pub ground_probe_half_extents: [f32; 2],
    /// Ground probe center offset from the body center.
    pub ground_probe_offset: [f32; 2],
    /// Half-extents of each wall probe box.
    pub wall_probe_half_extents: [f32; 2],
    /// Horizontal distance of the wall probes from the body center.
    pub wall_probe_reach: f32,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            move_speed: 8.0,
            jump_force: 10.0,
            max_jumps: 2,
            base_gravity: 2.0,
            fall_multiplier: 2.0,
            max_fall_speed: 20.0,
            wall_slide_speed: 1.0,
            wall_jump_power: [5.0, 10.0],
            wall_jump_time: 0.5,
            wall_jump_lockout: 0.6,
            ground_probe_half_extents: [0.25, 0.025],
            ground_probe_offset: [0.0, -0.5],
            wall_probe_half_extents: [0.025, 0.25],
            wall_probe_reach: 0.5,
        }
    }
}

/// Complete gameplay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameplayConfig {
    /// Which rope representation the grapple drives.
    pub rope_kind: RopeKind,
    pub rope: RopeSimConfig,
    pub grapple: GrappleConfig,
    pub chain: ChainConfig,
    pub character: CharacterConfig,
}

impl GameplayConfig {
    /// Checks every invariant the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rope.segment_count < 2 {
            return Err(ConfigError::SegmentCount(self.rope.segment_count));
        }
        if !(self.rope.drag > 0.0 && self.rope.drag < 1.0) {
            return Err(ConfigError::Drag(self.rope.drag.to_string()));
        }
        if self.rope.constraint_iterations == 0 {
            return Err(ConfigError::ConstraintIterations);
        }
        if self.rope.collision_interval == 0 {
            return Err(ConfigError::CollisionInterval);
        }
        if self.chain.segment_length <= 0.0 {
            return Err(ConfigError::SegmentLength(
                self.chain.segment_length.to_string(),
            ));
        }
        if self.grapple.reel_speed <= 0.0 {
            return Err(ConfigError::ReelSpeed(self.grapple.reel_speed.to_string()));
        }
        if self.chain.pull_speed <= 0.0 {
            return Err(ConfigError::PullSpeed(self.chain.pull_speed.to_string()));
        }
        if self.grapple.min_distance >= self.grapple.max_distance {
            return Err(ConfigError::ReelRange {
                min: self.grapple.min_distance.to_string(),
                max: self.grapple.max_distance.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameplayConfig::default();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_segment_count_floor() {
        let mut config = GameplayConfig::default();
        config.rope.segment_count = 1;
        assert_eq!(config.validate(), Err(ConfigError::SegmentCount(1)));
    }

    #[test]
    fn test_drag_must_stay_inside_unit_interval() {
        let mut config = GameplayConfig::default();
        config.rope.drag = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Drag(_))));

        config.rope.drag = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Drag(_))));
    }

    #[test]
    fn test_reel_range_ordering() {
        let mut config = GameplayConfig::default();
        config.grapple.min_distance = 20.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ReelRange { .. })
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut config = GameplayConfig::default();
        config.rope_kind = RopeKind::Chain;
        config.rope.segment_count = 12;

        let json = serde_json::to_string(&config).expect("Failed to serialize");
        let back: GameplayConfig = serde_json::from_str(&json).expect("Failed to deserialize");

        assert_eq!(back.rope_kind, RopeKind::Chain);
        assert_eq!(back.rope.segment_count, 12);
        assert_eq!(back.validate(), Ok(()));
    }

    #[test]
    fn test_rope_kind_snake_case_names() {
        let json = serde_json::to_string(&RopeKind::Verlet).unwrap();
        assert_eq!(json, "\"verlet\"");
        let kind: RopeKind = serde_json::from_str("\"chain\"").unwrap();
        assert_eq!(kind, RopeKind::Chain);
    }
}
