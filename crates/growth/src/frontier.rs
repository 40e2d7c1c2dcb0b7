//! Growth frontier: unoccupied cells adjacent to the tree.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use lichtenberg_core::GridPos;

use crate::tree::NodeId;

/// A cell eligible for growth and the node that exposed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub pos: GridPos,
    /// The first node adjacent to `pos`; becomes the parent on commit.
    pub proposer: NodeId,
}

/// Set of candidates with O(1) insert, lookup and removal.
///
/// Storage order is an implementation detail: selection never depends on it.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    candidates: Vec<Candidate>,
    slots: HashMap<GridPos, usize>,
}

impl Frontier {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.slots.contains_key(&pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    /// Adds `pos` unless it is already a candidate. The first proposer wins.
    pub fn propose(&mut self, pos: GridPos, proposer: NodeId) -> bool {
        match self.slots.entry(pos) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(self.candidates.len());
                self.candidates.push(Candidate { pos, proposer });
                true
            }
        }
    }

    /// Removes and returns the candidate stored at `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= self.len()`.
    pub fn take(&mut self, slot: usize) -> Candidate {
        let taken = self.candidates.swap_remove(slot);
        self.slots.remove(&taken.pos);
        if let Some(moved) = self.candidates.get(slot) {
            self.slots.insert(moved.pos, slot);
        }
        taken
    }
}
