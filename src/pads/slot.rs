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
use std::{fmt, sync::Arc, time::Duration};

use tracing::debug;

/// The number of pads on the board.
pub const NUM_PADS: usize = 16;

/// A decoded audio sample. The buffer is interleaved f32 and shared: voices
/// hold a reference to it, never a copy.
#[derive(Clone)]
pub struct Sample {
    data: Arc<Vec<f32>>,
    channels: u16,
    sample_rate: u32,
}

impl fmt::Debug for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sample")
            .field("channels", &self.channels)
            .field("sample_rate", &self.sample_rate)
            .field("duration", &self.duration())
            .finish()
    }
}

impl Sample {
    pub fn new(data: Vec<f32>, channels: u16, sample_rate: u32) -> Sample {
        Sample {
            data: Arc::new(data),
            channels,
            sample_rate,
        }
    }

    /// The natural (uncapped, rate 1.0) duration of the sample.
    pub fn duration(&self) -> Duration {
        if self.channels == 0 || self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let frames = self.data.len() / usize::from(self.channels);
        Duration::from_secs_f64(frames as f64 / f64::from(self.sample_rate))
    }

    pub fn data(&self) -> Arc<Vec<f32>> {
        Arc::clone(&self.data)
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Approximate heap footprint of the decoded buffer.
    pub fn memory_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }
}

/// The lifecycle state of a single pad slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    Loading,
    Loaded,
    Playing,
    Failed,
}

struct Slot {
    state: SlotState,
    sample: Option<Sample>,
    /// Bumped on every assignment and clear. A decode that finishes after
    /// its slot moved on carries a stale generation and is discarded.
    generation: u64,
}

impl Slot {
    fn new() -> Slot {
        Slot {
            state: SlotState::Empty,
            sample: None,
            generation: 0,
        }
    }
}

/// The fixed registry of pad slots. Indices are stable for the lifetime of
/// the board; only the play order is ever rearranged.
pub struct PadBank {
    slots: Vec<Slot>,
}

impl Default for PadBank {
    fn default() -> Self {
        PadBank::new()
    }
}

impl PadBank {
    pub fn new() -> PadBank {
        PadBank {
            slots: (0..NUM_PADS).map(|_| Slot::new()).collect(),
        }
    }

    pub fn state(&self, index: usize) -> SlotState {
        self.slots
            .get(index)
            .map(|slot| slot.state)
            .unwrap_or(SlotState::Empty)
    }

    /// Returns the sample loaded into the slot, if any. The clone is cheap,
    /// the underlying buffer is shared.
    pub fn sample(&self, index: usize) -> Option<Sample> {
        self.slots.get(index).and_then(|slot| slot.sample.clone())
    }

    /// Marks the slot as loading and returns the generation the eventual
    /// decode result must present to land. Any previously loaded sample is
    /// kept until the replacement arrives.
    pub fn begin_load(&mut self, index: usize) -> u64 {
        let slot = &mut self.slots[index];
        slot.state = SlotState::Loading;
        slot.generation += 1;
        slot.generation
    }

    /// Installs a decoded sample. Returns false (and discards the sample) if
    /// the slot has been reassigned or cleared since the load began.
    pub fn complete_load(&mut self, index: usize, generation: u64, sample: Sample) -> bool {
        let slot = &mut self.slots[index];
        if slot.generation != generation {
            debug!(
                index,
                generation,
                current = slot.generation,
                "Discarding stale decode result."
            );
            return false;
        }
        slot.state = SlotState::Loaded;
        slot.sample = Some(sample);
        true
    }

    /// Marks a failed load. Returns false if the slot has moved on since.
    pub fn fail_load(&mut self, index: usize, generation: u64) -> bool {
        let slot = &mut self.slots[index];
        if slot.generation != generation {
            debug!(
                index,
                generation,
                current = slot.generation,
                "Discarding stale decode failure."
            );
            return false;
        }
        slot.state = SlotState::Failed;
        slot.sample = None;
        true
    }

    /// Empties the slot and invalidates any in-flight load.
    pub fn clear(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        slot.state = SlotState::Empty;
        slot.sample = None;
        slot.generation += 1;
    }

    /// Flips the slot between loaded and playing. The transient playing
    /// state only ever overlays a loaded slot.
    pub fn set_playing(&mut self, index: usize, playing: bool) {
        let slot = &mut self.slots[index];
        match (slot.state, playing) {
            (SlotState::Loaded, true) => slot.state = SlotState::Playing,
            (SlotState::Playing, false) => slot.state = SlotState::Loaded,
            _ => {}
        }
    }

    /// True if every slot holds a decoded sample.
    pub fn all_loaded(&self) -> bool {
        self.slots.iter().all(|slot| slot.sample.is_some())
    }

    /// The number of slots holding a decoded sample.
    pub fn loaded_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.sample.is_some())
            .count()
    }
}
