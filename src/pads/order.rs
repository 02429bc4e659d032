// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use tracing::debug;

use super::slot::NUM_PADS;

/// The order pads play in. Always a permutation of the slot indices:
/// reordering moves positions around, it never duplicates or drops a slot.
pub struct PlayOrder {
    positions: [usize; NUM_PADS],
}

impl Default for PlayOrder {
    fn default() -> Self {
        PlayOrder::new()
    }
}

impl PlayOrder {
    /// Creates the identity order: position N plays slot N.
    pub fn new() -> PlayOrder {
        let mut positions = [0; NUM_PADS];
        for (position, slot) in positions.iter_mut().enumerate() {
            *slot = position;
        }
        PlayOrder { positions }
    }

    /// Returns the slot index that plays at the given position.
    pub fn slot_at(&self, position: usize) -> usize {
        self.positions[position]
    }

    /// Moves the entry at `from` to `to`, shifting everything in between by
    /// one. Out-of-range positions are ignored.
    pub fn move_to(&mut self, from: usize, to: usize) {
        if from >= NUM_PADS || to >= NUM_PADS {
            debug!(from, to, "Ignoring out of range move.");
            return;
        }
        if from < to {
            self.positions[from..=to].rotate_left(1);
        } else {
            self.positions[to..=from].rotate_right(1);
        }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.positions
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn is_permutation(order: &PlayOrder) -> bool {
        let mut seen = [false; NUM_PADS];
        for &slot in order.as_slice() {
            if seen[slot] {
                return false;
            }
            seen[slot] = true;
        }
        true
    }

    #[test]
    fn test_identity_order() {
        let order = PlayOrder::new();
        for position in 0..NUM_PADS {
            assert_eq!(position, order.slot_at(position));
        }
    }

    #[test]
    fn test_move_forward() {
        let mut order = PlayOrder::new();
        order.move_to(0, 3);
        assert_eq!(
            &[1, 2, 3, 0, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
            order.as_slice()
        );
    }

    #[test]
    fn test_move_backward() {
        let mut order = PlayOrder::new();
        order.move_to(5, 1);
        assert_eq!(
            &[0, 5, 1, 2, 3, 4, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
            order.as_slice()
        );
    }

    #[test]
    fn test_move_to_self_is_noop() {
        let mut order = PlayOrder::new();
        order.move_to(7, 7);
        for position in 0..NUM_PADS {
            assert_eq!(position, order.slot_at(position));
        }
    }

    #[test]
    fn test_out_of_range_move_ignored() {
        let mut order = PlayOrder::new();
        order.move_to(0, NUM_PADS);
        order.move_to(NUM_PADS, 0);
        for position in 0..NUM_PADS {
            assert_eq!(position, order.slot_at(position));
        }
    }

    #[test]
    fn test_stays_a_permutation() {
        let mut order = PlayOrder::new();
        for (from, to) in [(0, 15), (15, 0), (3, 9), (9, 3), (1, 1), (14, 2)] {
            order.move_to(from, to);
            assert!(is_permutation(&order), "after move {from} -> {to}");
        }
    }
}
