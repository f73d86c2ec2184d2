//! Observe / propagate loop over a [`Wave`].
//!
//! Each step:
//! - picks the unresolved cells with the fewest options (ties broken by the rng)
//! - collapses one of them by weighted sampling and emits a `Build` event
//! - propagates from every collapsed cell until nothing changes
//!
//! There is no backtracking. An emptied cell stops the run in
//! [`SolverState::Stalled`] with whatever has been placed so far.

use super::selection::choose_variant;
use super::wave::{GridSize, Wave};
use crate::adjacency::AdjacencyTable;
use crate::direction::Direction;
use crate::guidance::Guidance;
use crate::placement::{Phase, PlacementEvent, PlacementSink};
use crate::rng::WfcRng;
use crate::variant::Variant;
use bitvec::prelude::*;
use serde::Serialize;
use std::collections::VecDeque;
use std::ops::ControlFlow;
use tracing::debug;

/// State of a solver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverState {
    /// Observing and propagating
    Running,
    /// Every cell collapsed
    Solved,
    /// A contradiction was reached
    Stalled,
    /// Stopped by the sink or the iteration cap; remaining cells stay unresolved
    Cancelled,
}

impl SolverState {
    pub fn is_finished(self) -> bool {
        self != SolverState::Running
    }
}

/// Greedy WFC solver over a borrowed variant list and adjacency table.
pub struct Solver<'a> {
    variants: &'a [Variant],
    adjacency: &'a AdjacencyTable,
    guidance: &'a dyn Guidance,
    wave: Wave,
    state: SolverState,
    max_iterations: Option<usize>,
    iterations: usize,
    cancel_requested: bool,
    queue: VecDeque<usize>,
    /// Cell that ran out of options, once stalled.
    contradiction: Option<usize>,
}

impl<'a> Solver<'a> {
    pub fn new(
        variants: &'a [Variant],
        adjacency: &'a AdjacencyTable,
        size: GridSize,
        guidance: &'a dyn Guidance,
    ) -> Self {
        debug_assert_eq!(variants.len(), adjacency.variant_count());
        Self {
            variants,
            adjacency,
            guidance,
            wave: Wave::new(size, variants.len()),
            state: SolverState::Running,
            max_iterations: None,
            iterations: 0,
            cancel_requested: false,
            queue: VecDeque::new(),
            contradiction: None,
        }
    }

    /// Cap the number of observations. Reaching it cancels the run.
    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    pub fn wave(&self) -> &Wave {
        &self.wave
    }

    pub fn into_wave(self) -> Wave {
        self.wave
    }

    /// Observations performed so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn contradiction(&self) -> Option<usize> {
        self.contradiction
    }

    /// Run until the state leaves `Running`.
    pub fn run(&mut self, rng: &mut dyn WfcRng, sink: &mut dyn PlacementSink) -> SolverState {
        while self.step(rng, sink) {}
        self.state
    }

    /// Perform one observation followed by propagation.
    ///
    /// Returns true while the solver is still running.
    pub fn step(&mut self, rng: &mut dyn WfcRng, sink: &mut dyn PlacementSink) -> bool {
        if self.state != SolverState::Running {
            return false;
        }

        let candidates = self.lowest_entropy_cells();
        if candidates.is_empty() {
            self.state = SolverState::Solved;
            return false;
        }
        if self.cancel_requested {
            debug!(iterations = self.iterations, "run cancelled by sink");
            self.state = SolverState::Cancelled;
            return false;
        }
        if self.max_iterations.is_some_and(|max| self.iterations >= max) {
            debug!(iterations = self.iterations, "iteration cap reached");
            self.state = SolverState::Cancelled;
            return false;
        }

        let cell = candidates[rng.next_usize_max(candidates.len())];
        let Some(variant) = self.observe(cell, rng) else {
            self.stall(cell);
            return false;
        };
        self.iterations += 1;

        let (x, y, z) = self.wave.size().coords(cell);
        let event = PlacementEvent {
            phase: Phase::Build,
            x,
            y,
            z,
            variant,
        };
        if let ControlFlow::Break(()) = sink.on_placement(&event) {
            self.cancel_requested = true;
        }

        self.propagate()
    }

    /// Unresolved cells sharing the minimum option count, in flat order.
    ///
    /// Cells with no options are skipped; a run stalls before one is left behind.
    fn lowest_entropy_cells(&self) -> Vec<usize> {
        let mut min = usize::MAX;
        let mut cells = Vec::new();
        for cell in 0..self.wave.len() {
            if self.wave.collapsed(cell).is_some() {
                continue;
            }
            let remaining = self.wave.remaining(cell);
            if remaining == 0 {
                continue;
            }
            if remaining < min {
                min = remaining;
                cells.clear();
            }
            if remaining == min {
                cells.push(cell);
            }
        }
        cells
    }

    /// Collapse `cell` to one of its options.
    fn observe(&mut self, cell: usize, rng: &mut dyn WfcRng) -> Option<usize> {
        let coords = self.wave.size().coords(cell);
        let chosen = choose_variant(
            self.variants,
            self.wave.possibilities(cell),
            self.guidance,
            coords,
            rng,
        )?;
        self.wave.collapse(cell, chosen);
        Some(chosen)
    }

    /// Narrow neighbors from every collapsed cell to a fixed point.
    ///
    /// Returns false and stalls the run on a contradiction.
    fn propagate(&mut self) -> bool {
        self.queue.clear();
        self.queue.extend(self.wave.collapsed_cells());
        let size = self.wave.size();

        while let Some(cell) = self.queue.pop_front() {
            for dir in Direction::ALL {
                let Some(neighbor) = size.neighbor(cell, dir) else {
                    continue;
                };
                let allowed = self.adjacency.support(dir, self.wave.possibilities(cell));
                let current = self.wave.possibilities(neighbor);
                if current.not_any() {
                    self.stall(neighbor);
                    return false;
                }

                let mut narrowed: BitVec = current.to_bitvec();
                narrowed &= allowed.as_bitslice();
                if narrowed.not_any() {
                    self.stall(neighbor);
                    return false;
                }
                if narrowed.as_bitslice() != current {
                    self.wave.restrict(neighbor, narrowed);
                    self.queue.push_back(neighbor);
                }
            }
        }
        true
    }

    fn stall(&mut self, cell: usize) {
        let (x, y, z) = self.wave.size().coords(cell);
        debug!(x, y, z, iterations = self.iterations, "contradiction");
        self.wave.clear(cell);
        self.contradiction = Some(cell);
        self.state = SolverState::Stalled;
    }
}
