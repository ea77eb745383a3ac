//! Simulation settings
//!
//! Read once per spawn/reset event and treated as immutable for the
//! run's duration.

use crate::geometry::Volume;
use crate::math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive speed range for freshly spawned bodies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpeedRange {
    pub min: f32,
    pub max: f32,
}

/// Inclusive batch-size range for a spawn request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnCountRange {
    pub min: u32,
    pub max: u32,
}

/// How a body picks its new travel direction after a wall hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReboundMode {
    /// Mirror about the wall normal.
    Mirror,
    /// Aim at a random interior point instead.
    Random,
}

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub volume_center: Vec3,
    pub volume_size: Vec3,
    pub body_radius: f32,
    pub spawn_count: SpawnCountRange,
    pub initial_speed: SpeedRange,
    /// Neighbor matches retained per query. Must be at least 2: a body
    /// always finds itself at distance zero.
    pub neighbor_capacity: usize,
    pub rebound: ReboundMode,
    pub seed: u64,
    /// Omit the rebuild/query/classify stages entirely when false.
    pub collision_detection: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            volume_center: Vec3::ZERO,
            volume_size: Vec3::splat(10.0),
            body_radius: 0.5,
            spawn_count: SpawnCountRange { min: 1, max: 100 },
            initial_speed: SpeedRange {
                min: 5.0,
                max: 10.0,
            },
            neighbor_capacity: 2,
            rebound: ReboundMode::Mirror,
            seed: 0x5EED,
            collision_detection: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("neighbor capacity {0} is below the minimum of 2 (self + one other)")]
    CapacityTooSmall(usize),

    #[error("volume size {0} must be positive on every axis")]
    NonPositiveVolume(Vec3),

    #[error("body radius {0} must be positive")]
    NonPositiveRadius(f32),

    #[error("body diameter {diameter} does not fit inside volume size {size}")]
    BodyTooLarge { diameter: f32, size: Vec3 },

    #[error("{name} range [{min}, {max}] is empty or negative")]
    InvalidRange { name: &'static str, min: f32, max: f32 },
}

impl SimConfig {
    /// Confining volume described by this config.
    pub fn volume(&self) -> Volume {
        Volume::new(self.volume_center, self.volume_size)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.neighbor_capacity < 2 {
            return Err(ConfigError::CapacityTooSmall(self.neighbor_capacity));
        }
        if self.volume_size.min_element() <= 0.0 {
            return Err(ConfigError::NonPositiveVolume(self.volume_size));
        }
        if self.body_radius <= 0.0 {
            return Err(ConfigError::NonPositiveRadius(self.body_radius));
        }
        if self.body_radius * 2.0 >= self.volume_size.min_element() {
            return Err(ConfigError::BodyTooLarge {
                diameter: self.body_radius * 2.0,
                size: self.volume_size,
            });
        }
        if self.initial_speed.min < 0.0 || self.initial_speed.min > self.initial_speed.max {
            return Err(ConfigError::InvalidRange {
                name: "initial_speed",
                min: self.initial_speed.min,
                max: self.initial_speed.max,
            });
        }
        if self.spawn_count.min == 0 || self.spawn_count.min > self.spawn_count.max {
            return Err(ConfigError::InvalidRange {
                name: "spawn_count",
                min: self.spawn_count.min as f32,
                max: self.spawn_count.max as f32,
            });
        }
        Ok(())
    }
}
