//! Authoritative per-body state and its lifecycle.
//!
//! The store owns every body for the duration of a run. Bodies accumulate
//! through batch spawns and only go away on a full reset; there is no
//! per-body removal.

use crate::config::SimConfig;
use crate::math::{DeterministicRng, Vec3};
use thiserror::Error;

/// Stable handle for a body, valid until the next `clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(u32);

impl BodyId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum BodyStoreError {
    #[error("unknown body id {0}")]
    UnknownBody(BodyId),
}

/// A free-moving sphere. Velocity carries both travel direction and speed.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub id: BodyId,
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Owner of all body state. Ids are dense indices in spawn order, so the
/// position snapshot handed to the spatial index lines up with ids.
#[derive(Default)]
pub struct BodyStore {
    bodies: Vec<Body>,
}

impl BodyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` bodies with a uniform position inside the confining
    /// volume (inset by the body radius, so they start fully inside) and
    /// a velocity with uniform direction and a speed from the configured
    /// range.
    pub fn spawn(&mut self, count: usize, config: &SimConfig, rng: &mut DeterministicRng) -> Vec<BodyId> {
        let volume = config.volume();
        let mut spawned = Vec::with_capacity(count);

        for _ in 0..count {
            let id = BodyId::new(self.bodies.len() as u32);
            let position = rng.point_in_box(volume.center, volume.size, config.body_radius);
            let speed = rng.next_f32_range(config.initial_speed.min, config.initial_speed.max);
            let velocity = rng.unit_vec3() * speed;

            self.bodies.push(Body {
                id,
                position,
                velocity,
            });
            spawned.push(id);
        }

        tracing::info!(count, total = self.bodies.len(), "spawned bodies");
        spawned
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Position snapshot in id order (the Capture stage).
    pub fn positions(&self) -> Vec<Vec3> {
        self.bodies.iter().map(|body| body.position).collect()
    }

    pub fn get(&self, id: BodyId) -> Result<&Body, BodyStoreError> {
        self.bodies
            .get(id.index() as usize)
            .ok_or(BodyStoreError::UnknownBody(id))
    }

    pub fn set_position(&mut self, id: BodyId, position: Vec3) -> Result<(), BodyStoreError> {
        self.body_mut(id)?.position = position;
        Ok(())
    }

    pub fn set_velocity(&mut self, id: BodyId, velocity: Vec3) -> Result<(), BodyStoreError> {
        self.body_mut(id)?.velocity = velocity;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    /// Mutable access for the Advance stage's parallel sweep. Each body
    /// is written by exactly one work unit.
    pub(crate) fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    /// Full reset. The only way bodies are ever removed.
    pub fn clear(&mut self) {
        tracing::info!(removed = self.bodies.len(), "cleared body store");
        self.bodies.clear();
    }

    fn body_mut(&mut self, id: BodyId) -> Result<&mut Body, BodyStoreError> {
        self.bodies
            .get_mut(id.index() as usize)
            .ok_or(BodyStoreError::UnknownBody(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_places_bodies_fully_inside() {
        let config = SimConfig::default();
        let mut rng = DeterministicRng::new(config.seed);
        let mut store = BodyStore::new();

        let ids = store.spawn(64, &config, &mut rng);
        assert_eq!(ids.len(), 64);
        assert_eq!(store.len(), 64);

        let volume = config.volume();
        for body in store.iter() {
            assert!(volume.contains_inset(body.position, config.body_radius));
        }
    }

    #[test]
    fn spawn_speed_within_configured_range() {
        let config = SimConfig::default();
        let mut rng = DeterministicRng::new(7);
        let mut store = BodyStore::new();
        store.spawn(32, &config, &mut rng);

        for body in store.iter() {
            let speed = body.velocity.length();
            assert!(speed >= config.initial_speed.min - 1e-4);
            assert!(speed <= config.initial_speed.max + 1e-4);
        }
    }

    #[test]
    fn ids_are_dense_and_stable_across_batches() {
        let config = SimConfig::default();
        let mut rng = DeterministicRng::new(1);
        let mut store = BodyStore::new();

        let first = store.spawn(3, &config, &mut rng);
        let second = store.spawn(2, &config, &mut rng);
        assert_eq!(first, vec![BodyId::new(0), BodyId::new(1), BodyId::new(2)]);
        assert_eq!(second, vec![BodyId::new(3), BodyId::new(4)]);

        let positions = store.positions();
        assert_eq!(positions.len(), 5);
        assert_eq!(positions[4], store.get(BodyId::new(4)).unwrap().position);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let mut store = BodyStore::new();
        let missing = BodyId::new(9);
        assert!(store.set_position(missing, Vec3::ZERO).is_err());
        assert!(store.set_velocity(missing, Vec3::ZERO).is_err());
        assert!(store.get(missing).is_err());
    }

    #[test]
    fn clear_removes_everything() {
        let config = SimConfig::default();
        let mut rng = DeterministicRng::new(2);
        let mut store = BodyStore::new();
        store.spawn(10, &config, &mut rng);
        store.clear();
        assert!(store.is_empty());
    }
}
