//! Stage bookkeeping for the per-tick pipeline.
//!
//! Every stage hands its successor a completion token; a successor that
//! receives a token from the wrong stage or the wrong tick has been
//! scheduled out of order, which is a programming-contract violation and
//! aborts the tick.

use crate::index::IndexError;
use thiserror::Error;

/// The six stages of one tick, in their only legal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Advance,
    Capture,
    Rebuild,
    Query,
    Join,
    Classify,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Advance => "advance",
            Stage::Capture => "capture",
            Stage::Rebuild => "rebuild",
            Stage::Query => "query",
            Stage::Join => "join",
            Stage::Classify => "classify",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Proof that a stage ran to completion on a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a completion token must be handed to the next stage"]
pub struct StageToken {
    tick: u64,
    stage: Stage,
}

impl StageToken {
    pub(crate) fn new(tick: u64, stage: Stage) -> Self {
        Self { tick, stage }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Gate for the next stage: the token must come from `expected` on
    /// the current tick.
    pub(crate) fn expect(&self, tick: u64, expected: Stage) -> Result<(), TickError> {
        if self.stage != expected || self.tick != tick {
            return Err(TickError::StageOrder {
                tick,
                expected,
                found: self.stage,
                found_tick: self.tick,
            });
        }
        Ok(())
    }
}

/// Fatal per-tick failures. The tick aborts before publishing any
/// collision-state changes; the previous tick's flags persist.
#[derive(Debug, Error)]
pub enum TickError {
    #[error(
        "tick {tick}: stage after {expected} scheduled with a token from {found} (tick {found_tick})"
    )]
    StageOrder {
        tick: u64,
        expected: Stage,
        found: Stage,
        found_tick: u64,
    },

    #[error(transparent)]
    Index(#[from] IndexError),
}
