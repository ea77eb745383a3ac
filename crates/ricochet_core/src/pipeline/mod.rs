//! Per-tick simulation pipeline.
//!
//! One tick runs six stages in a strict linear order: advance, capture,
//! rebuild, query, join, classify. Advance and the query fan-out
//! parallelize per body (no cross-body data dependency); everything
//! between them is a true barrier, because the index must see every
//! body's final position and every query must see the finished index.
//! Stage completion tokens make the ordering explicit and checkable.

mod stage;

pub use stage::{Stage, StageToken, TickError};

use crate::body::{BodyId, BodyStore, BodyStoreError};
use crate::config::{ConfigError, ReboundMode, SimConfig};
use crate::geometry::{check_wall_collision, collision_point, random_rebound, reflect, Volume};
use crate::index::{HashGrid, IndexAdapter, IndexError, SpatialIndex};
use crate::math::{DeterministicRng, Vec3};
use crate::publish::{CollisionFlags, CollisionSink};
use rayon::prelude::*;
use ricochet_metrics::StageProfiler;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

/// What one completed tick did.
#[derive(Debug, Clone, Copy)]
pub struct TickSummary {
    pub tick: u64,
    pub bodies: usize,
    pub wall_hits: usize,
    pub colliding: usize,
}

/// Collision-detection stages bundled as an optional pipeline component.
/// A build without it runs Advance only and publishes no flags.
struct CollisionStage {
    adapter: IndexAdapter<HashGrid>,
    /// Capture-stage snapshot, reused tick to tick.
    snapshot: Vec<Vec3>,
}

impl CollisionStage {
    fn new(config: &SimConfig) -> Result<Self, IndexError> {
        // Cell edge matches the query radius so a query touches at most
        // a 2x2x2 cell neighborhood
        let grid = HashGrid::new(config.body_radius * 2.0);
        Ok(Self {
            adapter: IndexAdapter::new(grid, config.neighbor_capacity)?,
            snapshot: Vec::new(),
        })
    }
}

/// Owner of the whole per-tick pipeline: body state, the optional
/// collision stages, collision flags and the seeded RNG.
pub struct Simulation {
    config: SimConfig,
    volume: Volume,
    store: BodyStore,
    collision: Option<CollisionStage>,
    flags: CollisionFlags,
    rng: DeterministicRng,
    tick: u64,
    profiler: StageProfiler,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;

        let collision = if config.collision_detection {
            Some(CollisionStage::new(&config)?)
        } else {
            None
        };

        Ok(Self {
            volume: config.volume(),
            rng: DeterministicRng::new(config.seed),
            store: BodyStore::new(),
            collision,
            flags: CollisionFlags::new(),
            tick: 0,
            config,
            profiler: StageProfiler::new(),
        })
    }

    /// Add exactly `count` bodies between ticks, growing the per-body
    /// result buffers and flags alongside.
    pub fn spawn(&mut self, count: usize) -> Vec<BodyId> {
        let ids = self.store.spawn(count, &self.config, &mut self.rng);
        self.flags.ensure_bodies(self.store.len());
        if let Some(collision) = &mut self.collision {
            collision.adapter.ensure_bodies(self.store.len());
        }
        ids
    }

    /// Add a batch whose size is drawn from the configured spawn range.
    pub fn spawn_batch(&mut self) -> Vec<BodyId> {
        let span = self.config.spawn_count.max - self.config.spawn_count.min + 1;
        let count = self.config.spawn_count.min + self.rng.next_u32() % span;
        self.spawn(count as usize)
    }

    /// Full reset: every body is destroyed and the RNG replays from the
    /// configured seed.
    pub fn reset(&mut self) {
        self.store.clear();
        self.flags.clear();
        if let Some(collision) = &mut self.collision {
            collision.adapter.clear();
            collision.snapshot.clear();
        }
        self.rng = DeterministicRng::new(self.config.seed);
        self.tick = 0;
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn body_count(&self) -> usize {
        self.store.len()
    }

    pub fn body(&self, id: BodyId) -> Result<&crate::body::Body, BodyStoreError> {
        self.store.get(id)
    }

    pub fn set_position(&mut self, id: BodyId, position: Vec3) -> Result<(), BodyStoreError> {
        self.store.set_position(id, position)
    }

    pub fn set_velocity(&mut self, id: BodyId, velocity: Vec3) -> Result<(), BodyStoreError> {
        self.store.set_velocity(id, velocity)
    }

    pub fn is_colliding(&self, id: BodyId) -> bool {
        self.flags.is_colliding(id)
    }

    /// Accumulated per-stage timings (when the `metrics` feature is on).
    pub fn profiler(&self) -> &StageProfiler {
        &self.profiler
    }

    /// Run one full tick. On a fatal error the tick aborts before any
    /// collision-state change is published; the previous tick's flags
    /// persist.
    pub fn step(&mut self, dt: f32, sink: &mut dyn CollisionSink) -> Result<TickSummary, TickError> {
        self.tick += 1;

        let start = Instant::now();
        let (advance_token, wall_hits) = self.advance(dt);
        self.profiler.record(Stage::Advance.name(), start.elapsed());

        if self.collision.is_none() {
            return Ok(TickSummary {
                tick: self.tick,
                bodies: self.store.len(),
                wall_hits,
                colliding: 0,
            });
        }

        let start = Instant::now();
        let capture_token = self.capture(advance_token)?;
        self.profiler.record(Stage::Capture.name(), start.elapsed());

        let start = Instant::now();
        let rebuild_token = self.rebuild(capture_token)?;
        self.profiler.record(Stage::Rebuild.name(), start.elapsed());

        let start = Instant::now();
        let query_token = self.query(rebuild_token)?;
        let join_token = self.join(query_token)?;
        self.profiler.record(Stage::Query.name(), start.elapsed());

        let start = Instant::now();
        let (_classify_token, colliding) = self.classify(join_token, sink)?;
        self.profiler.record(Stage::Classify.name(), start.elapsed());

        Ok(TickSummary {
            tick: self.tick,
            bodies: self.store.len(),
            wall_hits,
            colliding,
        })
    }

    /// Stage 1: integrate every body and resolve wall hits. Per-body
    /// work units are independent, so this fans out across the rayon
    /// pool.
    fn advance(&mut self, dt: f32) -> (StageToken, usize) {
        let volume = self.volume;
        let radius = self.config.body_radius;
        let mode = self.config.rebound;
        // Per-tick base seed; each body derives its own stream so the
        // outcome is independent of worker scheduling
        let rebound_seed = self.rng.next_u64();

        let wall_hits = self
            .store
            .bodies_mut()
            .par_iter_mut()
            .enumerate()
            .map(|(index, body)| {
                let next_position = body.position + body.velocity * dt;
                let speed = body.velocity.length();

                if speed == 0.0
                    || !check_wall_collision(&volume, body.position, next_position, radius)
                {
                    body.position = next_position;
                    return 0usize;
                }

                let direction = body.velocity / speed;
                match collision_point(&volume, next_position, direction, radius) {
                    Some(point) => {
                        let new_direction = match mode {
                            ReboundMode::Mirror => {
                                reflect(&volume, direction, next_position, radius)
                            }
                            ReboundMode::Random => {
                                let mut rng =
                                    DeterministicRng::stream(rebound_seed, index as u64);
                                random_rebound(&volume, point, radius, &mut rng)
                            }
                        };
                        body.position = point;
                        body.velocity = new_direction * speed;
                    }
                    None => {
                        // Every triggering axis was degenerate; keep the
                        // uncorrected position for this tick
                        body.position = next_position;
                    }
                }
                1
            })
            .sum();

        (StageToken::new(self.tick, Stage::Advance), wall_hits)
    }

    /// Stage 2: snapshot every position in stable body order. Runs only
    /// after Advance has retired for all bodies.
    fn capture(&mut self, prev: StageToken) -> Result<StageToken, TickError> {
        prev.expect(self.tick, Stage::Advance)?;
        let Some(collision) = self.collision.as_mut() else {
            return Err(IndexError::Unavailable.into());
        };

        collision.snapshot.clear();
        collision
            .snapshot
            .extend(self.store.iter().map(|body| body.position));

        Ok(StageToken::new(self.tick, Stage::Capture))
    }

    /// Stage 3: wholesale index rebuild from the complete snapshot.
    fn rebuild(&mut self, prev: StageToken) -> Result<StageToken, TickError> {
        prev.expect(self.tick, Stage::Capture)?;
        let Some(collision) = self.collision.as_mut() else {
            return Err(IndexError::Unavailable.into());
        };

        collision.adapter.rebuild(&collision.snapshot)?;
        Ok(StageToken::new(self.tick, Stage::Rebuild))
    }

    /// Stage 4: one radius query per body against the fresh index, fanned
    /// out across the pool. Each work unit owns exactly one result
    /// buffer; the index is shared read-only.
    fn query(&mut self, prev: StageToken) -> Result<StageToken, TickError> {
        prev.expect(self.tick, Stage::Rebuild)?;
        let Some(collision) = self.collision.as_mut() else {
            return Err(IndexError::Unavailable.into());
        };

        // Touching distance plus margin
        let radius = self.config.body_radius * 2.0;

        let CollisionStage { adapter, snapshot } = collision;
        let (index, results) = adapter.query_buffers();
        results
            .par_iter_mut()
            .zip(snapshot.par_iter())
            .for_each(|(result, &position)| {
                index.query_radius(position, radius, result);
            });

        Ok(StageToken::new(self.tick, Stage::Query))
    }

    /// Stage 5: barrier over the query fan-out. The parallel iterator in
    /// `query` already joins its work units; this stage names that
    /// barrier so nothing reads results without holding its token.
    fn join(&mut self, prev: StageToken) -> Result<StageToken, TickError> {
        prev.expect(self.tick, Stage::Query)?;
        Ok(StageToken::new(self.tick, Stage::Join))
    }

    /// Stage 6: flip each body's collision flag to `count > 1` (more
    /// than just itself in range), publishing only actual changes.
    fn classify(
        &mut self,
        prev: StageToken,
        sink: &mut dyn CollisionSink,
    ) -> Result<(StageToken, usize), TickError> {
        prev.expect(self.tick, Stage::Join)?;
        let Some(collision) = self.collision.as_ref() else {
            return Err(IndexError::Unavailable.into());
        };

        let mut colliding = 0;
        for (index, result) in collision.adapter.results().iter().enumerate() {
            let is_colliding = result.count() > 1;
            if is_colliding {
                colliding += 1;
            }
            self.flags
                .publish(BodyId::new(index as u32), is_colliding, sink);
        }

        Ok((StageToken::new(self.tick, Stage::Classify), colliding))
    }
}
