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
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use parking_lot::RwLock;
use tracing::{info, span, Instrument, Level};

use crate::settings::Settings;

use super::{
    order::PlayOrder,
    playback::{PlaybackEngine, PlaybackError},
    slot::{PadBank, NUM_PADS},
};

/// Plays every loaded pad in order, one at a time. Pads play in the order
/// given by the permutation, each play running to completion (including its
/// gap) before the next starts; empty slots are skipped with no delay.
pub struct Sequencer {
    engine: Arc<PlaybackEngine>,
    order: Arc<RwLock<PlayOrder>>,
    playing: AtomicBool,
    halt: AtomicBool,
}

impl Sequencer {
    pub fn new(engine: Arc<PlaybackEngine>, order: Arc<RwLock<PlayOrder>>) -> Sequencer {
        Sequencer {
            engine,
            order,
            playing: AtomicBool::new(false),
            halt: AtomicBool::new(false),
        }
    }

    /// Plays all pads in permutation order. If a traversal is already
    /// running the call is rejected and returns `Ok(false)`.
    pub async fn play_all(&self) -> Result<bool, PlaybackError> {
        if self
            .playing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("Sequencer is already playing.");
            return Ok(false);
        }
        self.halt.store(false, Ordering::Release);

        let result = self.run().instrument(span!(Level::INFO, "sequencer")).await;
        self.playing.store(false, Ordering::Release);
        result.map(|_| true)
    }

    async fn run(&self) -> Result<(), PlaybackError> {
        info!("Playing all pads.");
        for position in 0..NUM_PADS {
            if self.halt.load(Ordering::Acquire) {
                info!(position, "Sequencer halted.");
                break;
            }
            let index = self.order.read().slot_at(position);
            self.engine.play(index).await?;
        }
        Ok(())
    }

    /// True while a traversal is in progress.
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Stops the current traversal after the play in flight resolves.
    pub fn halt(&self) {
        self.halt.store(true, Ordering::Release);
    }
}

/// Computes the expected length of a full traversal: for each non-empty slot
/// in permutation order, the capped scaled duration, plus one gap per
/// non-empty slot after the first.
pub fn expected_total_length(
    bank: &PadBank,
    order: &PlayOrder,
    settings: &Settings,
) -> Duration {
    let cap = settings.max_ms() / 1000.0;
    let gap = settings.gap_ms() / 1000.0;

    let mut total = 0.0;
    let mut first = true;
    for position in 0..NUM_PADS {
        let Some(sample) = bank.sample(order.slot_at(position)) else {
            continue;
        };
        if !first {
            total += gap;
        }
        first = false;
        total += (sample.duration().as_secs_f64() / settings.speed()).min(cap);
    }

    Duration::from_secs_f64(total)
}

#[cfg(test)]
mod test {
    use tokio::time::Instant;

    use super::*;
    use crate::{audio::mock, pads::Sample};

    fn fixture(
        durations: &[u64],
        settings: Settings,
    ) -> (
        Arc<Sequencer>,
        Arc<PlaybackEngine>,
        Arc<RwLock<PadBank>>,
        Arc<RwLock<PlayOrder>>,
        Arc<RwLock<Settings>>,
    ) {
        let device = Arc::new(mock::Device::new("mock"));
        let bank = Arc::new(RwLock::new(PadBank::new()));
        {
            let mut bank = bank.write();
            for (index, &seconds) in durations.iter().enumerate() {
                if seconds == 0 {
                    continue;
                }
                let rate = 100;
                let sample = Sample::new(vec![0.0; (seconds * u64::from(rate)) as usize], 1, rate);
                let generation = bank.begin_load(index);
                bank.complete_load(index, generation, sample);
            }
        }
        let settings = Arc::new(RwLock::new(settings));
        let order = Arc::new(RwLock::new(PlayOrder::new()));
        let engine = Arc::new(PlaybackEngine::new(device, settings.clone(), bank.clone()));
        (
            Arc::new(Sequencer::new(engine.clone(), order.clone())),
            engine,
            bank,
            order,
            settings,
        )
    }

    #[test]
    fn test_expected_total_length() {
        let mut settings = Settings::default();
        settings.set_max_ms(4000.0);
        settings.set_gap_ms(500.0);
        let (_, _, bank, order, _) = fixture(&[5, 3, 10], settings.clone());

        // 4.0 (capped) + 0.5 + 3.0 + 0.5 + 4.0 (capped) = 12.0 seconds.
        let total = expected_total_length(&bank.read(), &order.read(), &settings);
        assert!((total.as_secs_f64() - 12.0).abs() < 1e-9, "got {total:?}");
    }

    #[test]
    fn test_expected_total_length_follows_order() {
        let settings = Settings::default();
        let (_, _, bank, order, _) = fixture(&[5, 3], settings.clone());

        // Reordering does not change the total, clearing a slot does.
        order.write().move_to(0, 1);
        let total = expected_total_length(&bank.read(), &order.read(), &settings);
        assert!((total.as_secs_f64() - 8.0).abs() < 1e-9, "got {total:?}");

        bank.write().clear(1);
        let total = expected_total_length(&bank.read(), &order.read(), &settings);
        assert!((total.as_secs_f64() - 5.0).abs() < 1e-9, "got {total:?}");
    }

    #[test]
    fn test_expected_total_length_empty_board() {
        let settings = Settings::default();
        let (_, _, bank, order, _) = fixture(&[], settings.clone());
        assert_eq!(
            Duration::ZERO,
            expected_total_length(&bank.read(), &order.read(), &settings)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_all_skips_empty_slots() {
        let (sequencer, _, _, _, _) = fixture(&[0, 2, 0, 1], Settings::default());

        let start = Instant::now();
        assert!(sequencer.play_all().await.unwrap());
        assert_eq!(Duration::from_secs(3), start.elapsed());
        assert!(!sequencer.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_all_honors_order() {
        let (sequencer, _, _, order, settings) = fixture(&[4, 1], Settings::default());
        settings.write().set_max_ms(2000.0);
        order.write().move_to(0, 15);

        // Slot 1 now plays first, slot 0 (capped to 2s) last.
        let start = Instant::now();
        assert!(sequencer.play_all().await.unwrap());
        assert_eq!(Duration::from_secs(3), start.elapsed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_all_rejects_reentry() {
        let (sequencer, _, _, _, _) = fixture(&[5], Settings::default());

        let traversal = {
            let sequencer = sequencer.clone();
            tokio::spawn(async move { sequencer.play_all().await })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(sequencer.is_playing());
        assert!(!sequencer.play_all().await.unwrap());

        assert!(traversal.await.unwrap().unwrap());
        assert!(!sequencer.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_halt_stops_traversal() {
        let (sequencer, engine, _, _, _) = fixture(&[10, 10], Settings::default());

        let traversal = {
            let sequencer = sequencer.clone();
            tokio::spawn(async move { sequencer.play_all().await })
        };

        let start = tokio::time::Instant::now();
        tokio::time::sleep(Duration::from_secs(1)).await;
        sequencer.halt();
        engine.stop_all();

        // The play in flight resolves, then the traversal exits instead of
        // advancing to the second pad.
        assert!(traversal.await.unwrap().unwrap());
        assert_eq!(Duration::from_secs(1), start.elapsed());
        assert!(!sequencer.is_playing());
    }
}
