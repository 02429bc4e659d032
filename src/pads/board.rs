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
use std::{sync::Arc, time::Duration};

use parking_lot::RwLock;
use tracing::debug;

use crate::{audio, decode::Loader, settings::Settings};

use super::{
    order::PlayOrder,
    playback::{PlaybackEngine, PlaybackError},
    sequencer::{expected_total_length, Sequencer},
    slot::{PadBank, SlotState, NUM_PADS},
};

/// The pad board ties the engine together: one bank of slots, one play
/// order, one set of settings, one output device. Everything the outside
/// world does to the sampler goes through here.
pub struct PadBoard {
    settings: Arc<RwLock<Settings>>,
    bank: Arc<RwLock<PadBank>>,
    order: Arc<RwLock<PlayOrder>>,
    engine: Arc<PlaybackEngine>,
    sequencer: Arc<Sequencer>,
    loader: Loader,
}

impl PadBoard {
    pub fn new(device: Arc<dyn audio::Device>, settings: Settings, preview: bool) -> PadBoard {
        let settings = Arc::new(RwLock::new(settings));
        let bank = Arc::new(RwLock::new(PadBank::new()));
        let order = Arc::new(RwLock::new(PlayOrder::new()));
        let engine = Arc::new(PlaybackEngine::new(device, settings.clone(), bank.clone()));
        let sequencer = Arc::new(Sequencer::new(engine.clone(), order.clone()));
        let loader = Loader::new(bank.clone(), engine.clone(), preview);

        PadBoard {
            settings,
            bank,
            order,
            engine,
            sequencer,
            loader,
        }
    }

    // Loading.

    /// Decodes the bytes onto the pad. See [`Loader::assign`].
    pub async fn assign(&self, index: usize, bytes: Vec<u8>) -> bool {
        let landed = self.loader.assign(index, bytes).await;
        self.refresh();
        landed
    }

    /// Loads files onto consecutive pads. See [`Loader::assign_batch`].
    pub async fn assign_batch(&self, start: usize, files: Vec<Vec<u8>>) -> usize {
        let loaded = self.loader.assign_batch(start, files).await;
        self.refresh();
        loaded
    }

    /// Empties the pad, cutting its voice if one is live. The play order is
    /// left untouched.
    pub fn clear(&self, index: usize) {
        if index >= NUM_PADS {
            debug!(index, "Ignoring clear of an out of range pad.");
            return;
        }
        self.engine.stop(index);
        self.bank.write().clear(index);
        self.refresh();
    }

    // Triggering.

    /// Plays the pad with the given slot index.
    pub async fn trigger_pad(&self, index: usize) -> Result<bool, PlaybackError> {
        if index >= NUM_PADS {
            debug!(index, "Ignoring trigger of an out of range pad.");
            return Ok(false);
        }
        self.engine.play(index).await
    }

    /// Plays the pad at the given play-order position.
    pub async fn trigger_position(&self, position: usize) -> Result<bool, PlaybackError> {
        if position >= NUM_PADS {
            debug!(position, "Ignoring trigger of an out of range position.");
            return Ok(false);
        }
        let index = self.order.read().slot_at(position);
        self.engine.play(index).await
    }

    /// Plays every loaded pad in order. See [`Sequencer::play_all`].
    pub async fn play_all(&self) -> Result<bool, PlaybackError> {
        self.sequencer.play_all().await
    }

    /// Stops the sequencer and every live voice.
    pub fn stop_all(&self) {
        self.sequencer.halt();
        self.engine.stop_all();
    }

    // Ordering.

    /// Moves the pad at play-order position `from` to position `to`.
    pub fn move_pad(&self, from: usize, to: usize) {
        self.order.write().move_to(from, to);
        self.refresh();
    }

    /// Clears the slot at the given play-order position. The permutation
    /// itself does not change.
    pub fn remove_at(&self, position: usize) {
        if position >= NUM_PADS {
            debug!(position, "Ignoring removal of an out of range position.");
            return;
        }
        let index = self.order.read().slot_at(position);
        self.clear(index);
    }

    // Settings.

    pub fn set_speed(&self, speed: f64) {
        self.settings.write().set_speed(speed);
        self.refresh();
    }

    pub fn set_max_ms(&self, max_ms: f64) {
        self.settings.write().set_max_ms(max_ms);
        self.refresh();
    }

    pub fn set_gap_ms(&self, gap_ms: f64) {
        self.settings.write().set_gap_ms(gap_ms);
        self.refresh();
    }

    pub fn set_pad_names(&self, names: Vec<String>) {
        self.settings.write().set_pad_names(names);
        self.refresh();
    }

    /// A link that reproduces the current settings.
    pub fn share_link(&self, base: &str) -> String {
        self.settings.read().share_link(base)
    }

    // State.

    /// The expected length of a full play-all traversal.
    pub fn total_length(&self) -> Duration {
        expected_total_length(&self.bank.read(), &self.order.read(), &self.settings.read())
    }

    pub fn is_playing(&self) -> bool {
        self.sequencer.is_playing()
    }

    pub fn all_loaded(&self) -> bool {
        self.bank.read().all_loaded()
    }

    pub fn loaded_count(&self) -> usize {
        self.bank.read().loaded_count()
    }

    pub fn slot_state(&self, index: usize) -> SlotState {
        self.bank.read().state(index)
    }

    pub fn pad_name(&self, index: usize) -> String {
        self.settings.read().pad_name(index).to_string()
    }

    fn refresh(&self) {
        debug!(
            total = ?self.total_length(),
            query = self.settings.read().serialize(),
            "Board updated."
        );
    }
}
