//! Placement events and the sinks that consume them.
//!
//! The solver announces every choice it makes: a `Build` event when a cell is
//! collapsed by observation, a `Repair` event when the repair pass replaces a
//! cell's variant. Cells collapsed as a side effect of propagation produce no
//! event; they appear in the final placement list only.
//!
//! ```ignore
//! let mut recorder = PlacementRecorder::new();
//! let result = generate(&tiles, &options, &mut rng, &Unguided, &mut recorder)?;
//! println!("{} build events", recorder.count(Phase::Build));
//! ```

use glam::{UVec3, Vec3};
use serde::Serialize;
use std::ops::ControlFlow;

/// Which part of the run produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Build,
    Repair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlacementEvent {
    pub phase: Phase,
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub variant: usize,
}

/// Receiver of placement events.
///
/// Returning `Break` from a build event cancels the solver before its next
/// observation; from a repair event it ends the repair pass.
pub trait PlacementSink {
    fn on_placement(&mut self, event: &PlacementEvent) -> ControlFlow<()>;
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PlacementSink for NullSink {
    fn on_placement(&mut self, _event: &PlacementEvent) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl<F> PlacementSink for F
where
    F: FnMut(&PlacementEvent) -> ControlFlow<()>,
{
    fn on_placement(&mut self, event: &PlacementEvent) -> ControlFlow<()> {
        self(event)
    }
}

/// Records every event in arrival order.
#[derive(Debug, Clone, Default)]
pub struct PlacementRecorder {
    events: Vec<PlacementEvent>,
    /// Stop the run once this many events have been recorded.
    limit: Option<usize>,
}

impl PlacementRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that asks the solver to stop after `limit` events.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            events: Vec::new(),
            limit: Some(limit),
        }
    }

    pub fn events(&self) -> &[PlacementEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<PlacementEvent> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of recorded events from `phase`.
    pub fn count(&self, phase: Phase) -> usize {
        self.events.iter().filter(|e| e.phase == phase).count()
    }
}

impl PlacementSink for PlacementRecorder {
    fn on_placement(&mut self, event: &PlacementEvent) -> ControlFlow<()> {
        self.events.push(*event);
        match self.limit {
            Some(limit) if self.events.len() >= limit => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }
}

/// A collapsed cell in the final grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub variant: usize,
}

impl Placement {
    pub fn position(&self) -> UVec3 {
        UVec3::new(self.x as u32, self.y as u32, self.z as u32)
    }

    /// Cell origin in world units.
    pub fn world_position(&self, cell_size: f32) -> Vec3 {
        self.position().as_vec3() * cell_size
    }
}
