//! Local repair of collapsed cells after the main loop.
//!
//! A stalled or cancelled run can leave collapsed cells whose neighbors were
//! fixed later without regard for them. Each pass walks the grid in flat order
//! and, for every collapsed cell whose value is rejected by one of its
//! collapsed neighbors, picks a value all of them accept.

use super::selection::choose_variant;
use super::wave::Wave;
use crate::adjacency::AdjacencyTable;
use crate::direction::Direction;
use crate::guidance::Guidance;
use crate::placement::{Phase, PlacementEvent, PlacementSink};
use crate::rng::WfcRng;
use crate::variant::Variant;
use bitvec::prelude::*;
use serde::Serialize;
use std::ops::ControlFlow;
use tracing::debug;

/// Outcome of [`repair`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub passes_run: usize,
    pub reassignments: usize,
}

/// Run up to `passes` repair passes over `wave`.
///
/// Stops early after a pass that changes nothing, or when the sink breaks.
pub fn repair(
    wave: &mut Wave,
    variants: &[Variant],
    adjacency: &AdjacencyTable,
    guidance: &dyn Guidance,
    passes: usize,
    rng: &mut dyn WfcRng,
    sink: &mut dyn PlacementSink,
) -> RepairReport {
    let mut report = RepairReport::default();
    let size = wave.size();

    for pass in 0..passes {
        report.passes_run += 1;
        let mut changed = 0;

        for cell in 0..wave.len() {
            let Some(current) = wave.collapsed(cell) else {
                continue;
            };
            let Some(allowed) = accepted_by_neighbors(wave, adjacency, cell) else {
                continue;
            };
            if allowed.not_any() || allowed[current] {
                continue;
            }

            let coords = size.coords(cell);
            let Some(chosen) = choose_variant(variants, &allowed, guidance, coords, rng) else {
                continue;
            };
            wave.collapse(cell, chosen);
            changed += 1;

            let (x, y, z) = coords;
            let event = PlacementEvent {
                phase: Phase::Repair,
                x,
                y,
                z,
                variant: chosen,
            };
            if let ControlFlow::Break(()) = sink.on_placement(&event) {
                report.reassignments += changed;
                debug!(pass, reassignments = report.reassignments, "repair stopped by sink");
                return report;
            }
        }

        report.reassignments += changed;
        debug!(pass, changed, "repair pass");
        if changed == 0 {
            break;
        }
    }
    report
}

/// Intersection over collapsed neighbors of the values each accepts facing `cell`.
///
/// `None` when no neighbor is collapsed.
fn accepted_by_neighbors(wave: &Wave, adjacency: &AdjacencyTable, cell: usize) -> Option<BitVec> {
    let size = wave.size();
    let mut allowed: Option<BitVec> = None;
    for dir in Direction::ALL {
        let Some(neighbor) = size.neighbor(cell, dir) else {
            continue;
        };
        let Some(value) = wave.collapsed(neighbor) else {
            continue;
        };
        let accepts = adjacency.allowed(dir.opposite(), value);
        match allowed.as_mut() {
            Some(bits) => *bits &= accepts,
            None => allowed = Some(accepts.to_bitvec()),
        }
    }
    allowed
}
