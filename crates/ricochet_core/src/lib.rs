//! Ricochet Core
//!
//! Simulation of free-moving spherical bodies confined to a box:
//! - Wall-bounce geometry kernel (exact collision points, reflection)
//! - Body store and spawn lifecycle
//! - Spatial index adapter with a hash-grid backing
//! - Staged per-tick pipeline with per-body parallelism
//! - Change-only collision state publishing

pub mod body;
pub mod config;
pub mod geometry;
pub mod index;
pub mod math;
pub mod pipeline;
pub mod publish;
pub mod time;

pub use glam;

pub use body::{Body, BodyId, BodyStore, BodyStoreError};
pub use config::{ConfigError, ReboundMode, SimConfig, SpawnCountRange, SpeedRange};
pub use geometry::Volume;
pub use index::{HashGrid, IndexAdapter, IndexError, Neighbor, NeighborSet, SpatialIndex};
pub use math::DeterministicRng;
pub use pipeline::{SimError, Simulation, Stage, StageToken, TickError, TickSummary};
pub use publish::{CollisionFlags, CollisionSink, NullSink};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
