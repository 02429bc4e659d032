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
use std::{io::Cursor, sync::Arc};

use parking_lot::RwLock;
use symphonia::core::{
    audio::SampleBuffer,
    codecs::{DecoderOptions, CODEC_TYPE_NULL},
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};
use thiserror::Error;
use tokio::task;
use tracing::{debug, info, warn};

use crate::pads::{PadBank, PlaybackEngine, Sample, NUM_PADS};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unable to probe the audio format: {0}")]
    Probe(SymphoniaError),
    #[error("no decodable audio track")]
    NoTrack,
    #[error("unable to decode the audio: {0}")]
    Decode(SymphoniaError),
    #[error("the audio contained no samples")]
    Empty,
    #[error("the decode task failed: {0}")]
    Task(String),
}

/// Decodes an in-memory audio file into an interleaved f32 sample. The
/// format is sniffed from the bytes, so anything symphonia recognizes (WAV,
/// MP3, FLAC, OGG, ...) can land on a pad.
pub fn decode_bytes(bytes: Vec<u8>) -> Result<Sample, DecodeError> {
    let stream = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(DecodeError::Probe)?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoTrack)?;
    let track_id = track.id;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(DecodeError::Decode)?;

    let mut data: Vec<f32> = Vec::new();
    let mut channels: u16 = 0;
    let mut sample_rate: u32 = 0;
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(DecodeError::Decode(e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                channels = spec.channels.count() as u16;
                sample_rate = spec.rate;

                if sample_buf.is_none() {
                    sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
                }
                if let Some(buf) = sample_buf.as_mut() {
                    buf.copy_interleaved_ref(decoded);
                    data.extend_from_slice(buf.samples());
                }
            }
            // A corrupt packet is recoverable, move on to the next one.
            Err(SymphoniaError::DecodeError(e)) => {
                debug!(err = e, "Skipping undecodable packet.");
            }
            Err(e) => return Err(DecodeError::Decode(e)),
        }
    }

    if data.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(Sample::new(data, channels, sample_rate))
}

/// Loads audio files onto pads. Decoding happens off the async runtime; a
/// slot that gets reassigned while a decode is still in flight simply drops
/// the stale result when it arrives.
pub struct Loader {
    bank: Arc<RwLock<PadBank>>,
    engine: Arc<PlaybackEngine>,
    /// Play a sample once as soon as it loads.
    preview: bool,
}

impl Loader {
    pub fn new(
        bank: Arc<RwLock<PadBank>>,
        engine: Arc<PlaybackEngine>,
        preview: bool,
    ) -> Loader {
        Loader {
            bank,
            engine,
            preview,
        }
    }

    /// Decodes the bytes and assigns the result to the pad. Returns true if
    /// the sample landed on the slot. Assignments beyond the last pad are
    /// dropped; a decode failure marks the slot failed and stays local to
    /// it.
    pub async fn assign(&self, index: usize, bytes: Vec<u8>) -> bool {
        if index >= NUM_PADS {
            debug!(index, "Ignoring assignment to an out of range pad.");
            return false;
        }

        // Cut any voice still playing the slot's previous sample.
        self.engine.stop(index);
        let generation = self.bank.write().begin_load(index);

        let result = match task::spawn_blocking(move || decode_bytes(bytes)).await {
            Ok(result) => result,
            Err(e) => Err(DecodeError::Task(e.to_string())),
        };

        match result {
            Ok(sample) => {
                info!(
                    index,
                    duration = ?sample.duration(),
                    size = sample.memory_size(),
                    "Loaded sample."
                );
                let landed = self.bank.write().complete_load(index, generation, sample);
                if landed && self.preview {
                    let engine = self.engine.clone();
                    tokio::spawn(async move {
                        if let Err(e) = engine.play(index).await {
                            warn!(index, err = e.to_string(), "Unable to preview sample.");
                        }
                    });
                }
                landed
            }
            Err(e) => {
                warn!(index, err = e.to_string(), "Unable to decode sample.");
                self.bank.write().fail_load(index, generation);
                false
            }
        }
    }

    /// Assigns a run of files to consecutive pads starting at `start`.
    /// Returns the number of samples that landed. Files past the last pad
    /// are dropped, and one bad file does not stop the ones after it.
    pub async fn assign_batch(&self, start: usize, files: Vec<Vec<u8>>) -> usize {
        let mut loaded = 0;
        for (offset, bytes) in files.into_iter().enumerate() {
            let index = start + offset;
            if index >= NUM_PADS {
                debug!("The pad board is full, dropping the remaining files.");
                break;
            }
            if self.assign(index, bytes).await {
                loaded += 1;
            }
        }
        loaded
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;
    use crate::{audio::mock, pads::SlotState, settings::Settings, test::wav_bytes};

    fn fixture(preview: bool) -> (Loader, Arc<RwLock<PadBank>>, Arc<mock::Device>) {
        let device = Arc::new(mock::Device::new("mock"));
        let bank = Arc::new(RwLock::new(PadBank::new()));
        let engine = Arc::new(PlaybackEngine::new(
            device.clone(),
            Arc::new(RwLock::new(Settings::default())),
            bank.clone(),
        ));
        (Loader::new(bank.clone(), engine, preview), bank, device)
    }

    #[test]
    fn test_decode_wav_bytes() {
        let sample = decode_bytes(wav_bytes(2, 8000, 1)).expect("decode failed");
        assert_eq!(1, sample.channels());
        assert_eq!(8000, sample.sample_rate());
        assert_eq!(Duration::from_secs(2), sample.duration());

        let stereo = decode_bytes(wav_bytes(1, 44100, 2)).expect("decode failed");
        assert_eq!(2, stereo.channels());
        assert_eq!(Duration::from_secs(1), stereo.duration());
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_bytes(b"not remotely audio".to_vec()).is_err());
        assert!(decode_bytes(Vec::new()).is_err());
    }

    #[tokio::test]
    async fn test_assign_loads_slot() {
        let (loader, bank, _) = fixture(false);

        assert!(loader.assign(4, wav_bytes(1, 8000, 1)).await);
        assert_eq!(SlotState::Loaded, bank.read().state(4));
        assert!(bank.read().sample(4).is_some());
    }

    #[tokio::test]
    async fn test_assign_failure_marks_slot_failed() {
        let (loader, bank, _) = fixture(false);

        assert!(!loader.assign(4, b"garbage".to_vec()).await);
        assert_eq!(SlotState::Failed, bank.read().state(4));
        assert!(bank.read().sample(4).is_none());
    }

    #[tokio::test]
    async fn test_assign_out_of_range_is_dropped() {
        let (loader, bank, _) = fixture(false);

        assert!(!loader.assign(NUM_PADS, wav_bytes(1, 8000, 1)).await);
        for index in 0..NUM_PADS {
            assert_eq!(SlotState::Empty, bank.read().state(index));
        }
    }

    #[tokio::test]
    async fn test_assign_batch_stops_at_last_pad() {
        let (loader, bank, _) = fixture(false);

        let files = (0..4).map(|_| wav_bytes(1, 8000, 1)).collect();
        assert_eq!(2, loader.assign_batch(14, files).await);
        assert_eq!(SlotState::Loaded, bank.read().state(14));
        assert_eq!(SlotState::Loaded, bank.read().state(15));
    }

    #[tokio::test]
    async fn test_assign_batch_continues_past_failures() {
        let (loader, bank, _) = fixture(false);

        let files = vec![
            wav_bytes(1, 8000, 1),
            b"garbage".to_vec(),
            wav_bytes(1, 8000, 1),
        ];
        assert_eq!(2, loader.assign_batch(0, files).await);
        assert_eq!(SlotState::Loaded, bank.read().state(0));
        assert_eq!(SlotState::Failed, bank.read().state(1));
        assert_eq!(SlotState::Loaded, bank.read().state(2));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_preview_plays_after_load() {
        let (loader, _, device) = fixture(true);

        assert!(loader.assign(0, wav_bytes(1, 8000, 1)).await);
        crate::test::eventually(
            || device.started_count() == 1,
            "preview voice never started",
        );
    }

    #[tokio::test]
    async fn test_no_preview_by_default() {
        let (loader, _, device) = fixture(false);

        assert!(loader.assign(0, wav_bytes(1, 8000, 1)).await);
        assert_eq!(0, device.started_count());
    }
}
