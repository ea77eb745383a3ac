//! Collision state publisher.
//!
//! Turns per-body query results into a binary colliding flag and notifies
//! a consumer only on change, so a body that stays in contact across many
//! ticks costs one notification, not one per tick.

use crate::body::BodyId;

/// Consumer seam for collision-state transitions. A renderer would map
/// `true` to a highlight and `false` back to normal.
pub trait CollisionSink {
    fn on_collision_change(&mut self, body: BodyId, colliding: bool);
}

/// Sink that drops every notification. Useful when running without a
/// visual consumer.
pub struct NullSink;

impl CollisionSink for NullSink {
    fn on_collision_change(&mut self, _body: BodyId, _colliding: bool) {}
}

/// Previous-tick flag per body; the publisher's idempotence lives here.
#[derive(Default)]
pub struct CollisionFlags {
    flags: Vec<bool>,
}

impl CollisionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `count` bodies, new ones starting not-colliding.
    pub fn ensure_bodies(&mut self, count: usize) {
        if self.flags.len() < count {
            self.flags.resize(count, false);
        }
    }

    pub fn is_colliding(&self, id: BodyId) -> bool {
        self.flags.get(id.index() as usize).copied().unwrap_or(false)
    }

    pub fn colliding_count(&self) -> usize {
        self.flags.iter().filter(|&&flag| flag).count()
    }

    /// Record the new flag for `id`, notifying the sink only when the
    /// value actually changed.
    pub fn publish(&mut self, id: BodyId, colliding: bool, sink: &mut dyn CollisionSink) {
        let Some(slot) = self.flags.get_mut(id.index() as usize) else {
            return;
        };
        if *slot == colliding {
            return;
        }

        *slot = colliding;
        tracing::trace!(%id, colliding, "collision state changed");
        sink.on_collision_change(id, colliding);
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }
}
