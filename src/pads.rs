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

//! The sampler pad engine: slots, playback, ordering, and the sequencer.

mod board;
mod order;
mod playback;
mod sequencer;
mod slot;

pub use board::PadBoard;
pub use order::PlayOrder;
pub use playback::{PlaybackEngine, PlaybackError};
pub use sequencer::{expected_total_length, Sequencer};
pub use slot::{PadBank, Sample, SlotState, NUM_PADS};
