//! Precomputed directional adjacency.
//!
//! `allowed[d][i]` is the set of variants that may sit on side `d` of variant
//! `i`. Each direction is evaluated on its own: the table never assumes that
//! `j ∈ allowed[d][i]` implies `i ∈ allowed[opposite(d)][j]`.

use crate::direction::Direction;
use crate::tile::sockets_compatible;
use crate::variant::Variant;
use bitvec::prelude::*;

/// Bitset over variant indices.
pub type VariantSet = BitVec;

/// Read-only adjacency table over a fixed variant list.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyTable {
    /// `allowed[direction][source]` = compatible destinations.
    allowed: [Vec<VariantSet>; 6],
    variant_count: usize,
}

impl AdjacencyTable {
    /// Evaluate every (direction, source, destination) triple once.
    pub fn build(variants: &[Variant]) -> Self {
        let n = variants.len();
        let allowed = std::array::from_fn(|d| {
            let dir = Direction::ALL[d];
            let opp = dir.opposite();
            variants
                .iter()
                .map(|a| {
                    let mut row = BitVec::repeat(false, n);
                    for (j, b) in variants.iter().enumerate() {
                        if sockets_compatible(a.sockets.get(dir), b.sockets.get(opp)) {
                            row.set(j, true);
                        }
                    }
                    row
                })
                .collect()
        });
        Self {
            allowed,
            variant_count: n,
        }
    }

    pub fn variant_count(&self) -> usize {
        self.variant_count
    }

    /// Variants allowed on side `dir` of `source`.
    #[inline]
    pub fn allowed(&self, dir: Direction, source: usize) -> &BitSlice {
        self.allowed[dir.index()][source].as_bitslice()
    }

    #[inline]
    pub fn allows(&self, dir: Direction, source: usize, destination: usize) -> bool {
        self.allowed[dir.index()][source][destination]
    }

    /// Union of `allowed(dir, v)` over every `v` in `sources`.
    pub fn support(&self, dir: Direction, sources: &BitSlice) -> VariantSet {
        let mut out = BitVec::repeat(false, self.variant_count);
        for v in sources.iter_ones() {
            out |= self.allowed(dir, v);
        }
        out
    }
}
