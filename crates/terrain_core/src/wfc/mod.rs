//! Socket-constrained Wave Function Collapse over a 3D grid.
//!
//! - `Wave`: possibility sets and collapse markers per cell
//! - `Solver`: entropy-ordered observation with FIFO propagation
//! - `repair`: post-pass that fixes locally inconsistent collapsed cells
//! - `selection`: weighted choice shared by the solver and the repair pass

pub mod repair;
pub mod selection;
pub mod solver;
pub mod wave;

pub use repair::{repair, RepairReport};
pub use selection::{choose_variant, MIN_GUIDANCE};
pub use solver::{Solver, SolverState};
pub use wave::{CellState, GridSize, Wave};
