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
use std::{array, sync::Arc, time::Duration};

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::debug;

use crate::{
    audio::{self, Voice},
    playsync::StopGuard,
    settings::Settings,
};

use super::slot::{PadBank, NUM_PADS};

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("audio device error: {0}")]
    Device(#[from] audio::AudioError),
}

/// Plays pads as one-shots. Each trigger arms a fresh voice over the slot's
/// sample and resolves once the play has run its course: the earliest of the
/// natural end (scaled by the rate) and the duration cap, followed by the
/// configured gap of silence. Retriggering a pad stops its previous voice
/// before the new one starts.
pub struct PlaybackEngine {
    device: Arc<dyn audio::Device>,
    settings: Arc<RwLock<Settings>>,
    bank: Arc<RwLock<PadBank>>,
    /// The guard of each pad's most recent trigger, while that play is live.
    active: Mutex<[Option<StopGuard>; NUM_PADS]>,
}

impl PlaybackEngine {
    pub fn new(
        device: Arc<dyn audio::Device>,
        settings: Arc<RwLock<Settings>>,
        bank: Arc<RwLock<PadBank>>,
    ) -> PlaybackEngine {
        PlaybackEngine {
            device,
            settings,
            bank,
            active: Mutex::new(array::from_fn(|_| None)),
        }
    }

    /// Plays the pad once and waits for the play to complete. Returns
    /// `Ok(false)` immediately if the slot holds no sample. Completion is
    /// the earliest of `duration / speed` and the cap, then the gap; a
    /// retrigger or stop resolves the wait early, but the gap still runs.
    pub async fn play(&self, index: usize) -> Result<bool, PlaybackError> {
        let Some(sample) = self.bank.read().sample(index) else {
            return Ok(false);
        };
        let (speed, cap, gap) = {
            let settings = self.settings.read();
            (
                settings.speed(),
                Duration::from_secs_f64(settings.max_ms() / 1000.0),
                Duration::from_secs_f64(settings.gap_ms() / 1000.0),
            )
        };

        let guard = StopGuard::new();
        {
            let mut active = self.active.lock();
            if let Some(previous) = active[index].take() {
                debug!(index, "Stopping superseded voice.");
                previous.stop();
            }
            active[index] = Some(guard.clone());
        }
        self.bank.write().set_playing(index, true);

        let voice = Voice::from_sample(&sample, speed, guard.clone());
        if let Err(e) = self.device.start(voice) {
            self.finish(index, &guard);
            return Err(e.into());
        }

        let capped = Duration::from_secs_f64(sample.duration().as_secs_f64() / speed).min(cap);
        let _ = tokio::time::timeout(capped, guard.stopped()).await;
        guard.stop();

        if !gap.is_zero() {
            tokio::time::sleep(gap).await;
        }

        self.finish(index, &guard);
        Ok(true)
    }

    /// Stops the pad's current play, if any. The play's waiter resolves and
    /// runs out its gap as usual.
    pub fn stop(&self, index: usize) {
        let guard = self.active.lock()[index].take();
        if let Some(guard) = guard {
            guard.stop();
        }
        self.bank.write().set_playing(index, false);
    }

    /// Stops every live play.
    pub fn stop_all(&self) {
        for index in 0..NUM_PADS {
            self.stop(index);
        }
    }

    /// Retires a finished play. Only the trigger that still owns the slot's
    /// active guard may flip the pad out of its playing state; a superseded
    /// play leaves the state to its successor.
    fn finish(&self, index: usize, guard: &StopGuard) {
        let mut active = self.active.lock();
        if active[index]
            .as_ref()
            .is_some_and(|active| active.same_as(guard))
        {
            active[index] = None;
            drop(active);
            self.bank.write().set_playing(index, false);
        }
    }
}
