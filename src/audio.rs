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
use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::{pads::Sample, playsync::StopGuard};

pub mod cpal;
pub mod mock;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio device matching \"{0}\"")]
    NoDevice(String),
    #[error("unable to enumerate audio devices: {0}")]
    Devices(#[from] ::cpal::DevicesError),
    #[error("unable to query the device configuration: {0}")]
    DefaultConfig(#[from] ::cpal::DefaultStreamConfigError),
    #[error("unable to build the output stream: {0}")]
    BuildStream(#[from] ::cpal::BuildStreamError),
    #[error("unable to start the output stream: {0}")]
    PlayStream(#[from] ::cpal::PlayStreamError),
    #[error("unsupported output sample format: {0}")]
    UnsupportedFormat(String),
    #[error("the audio device is no longer running")]
    DeviceGone,
}

/// A one-shot playback of a sample. Every trigger creates a fresh voice over
/// the sample's shared buffer; voices are never reused.
pub struct Voice {
    data: Arc<Vec<f32>>,
    channels: u16,
    sample_rate: u32,
    /// Fractional frame position in the source buffer.
    pos: f64,
    /// Playback rate multiplier.
    rate: f64,
    guard: StopGuard,
}

impl Voice {
    /// Creates a voice over the sample's buffer, playing at the given rate.
    /// Stopping the guard silences the voice from the next callback on.
    pub fn from_sample(sample: &Sample, rate: f64, guard: StopGuard) -> Voice {
        Voice {
            data: sample.data(),
            channels: sample.channels(),
            sample_rate: sample.sample_rate(),
            pos: 0.0,
            rate,
            guard,
        }
    }

    pub fn guard(&self) -> StopGuard {
        self.guard.clone()
    }

    /// Mixes this voice additively into an interleaved output buffer,
    /// resampling by linear interpolation. Returns false once the voice is
    /// finished (stopped or out of frames) and should be dropped; reaching
    /// the end of the buffer stops the guard so waiters observe the natural
    /// end of playback.
    pub fn mix_into(&mut self, out: &mut [f32], out_channels: usize, out_rate: u32) -> bool {
        if self.guard.is_stopped() {
            return false;
        }

        let src_channels = usize::from(self.channels);
        if src_channels == 0 || out_channels == 0 || out_rate == 0 {
            self.guard.stop();
            return false;
        }
        let frames = self.data.len() / src_channels;
        let step = self.rate * f64::from(self.sample_rate) / f64::from(out_rate);

        for frame in out.chunks_mut(out_channels) {
            let base = self.pos.floor();
            let index = base as usize;
            if index + 1 >= frames {
                self.guard.stop();
                return false;
            }
            let frac = (self.pos - base) as f32;

            for (channel, slot) in frame.iter_mut().enumerate() {
                // Mono sources fan out to every output channel; extra source
                // channels beyond the output width are dropped.
                let src = channel.min(src_channels - 1);
                let a = self.data[index * src_channels + src];
                let b = self.data[(index + 1) * src_channels + src];
                *slot += a + (b - a) * frac;
            }

            self.pos += step;
        }

        true
    }
}

/// An audio output device that plays one-shot voices.
pub trait Device: fmt::Display + Send + Sync {
    /// Hands the voice to the device. The device drives the voice until its
    /// guard stops or its buffer runs out.
    fn start(&self, voice: Voice) -> Result<(), AudioError>;
}

/// Gets the audio device with the given name. Device names that start with
/// `mock` return a mock device for testing purposes.
pub fn get_device(name: &str) -> Result<Arc<dyn Device>, AudioError> {
    if name.starts_with("mock") {
        return Ok(Arc::new(mock::Device::new(name)));
    }
    Ok(Arc::new(cpal::Device::get(name)?))
}

/// Lists the names of the available output devices.
pub fn list_devices() -> Result<Vec<String>, AudioError> {
    cpal::list_devices()
}

#[cfg(test)]
mod test {
    use super::*;

    fn voice(data: Vec<f32>, channels: u16, rate: f64) -> Voice {
        let sample = Sample::new(data, channels, 100);
        Voice::from_sample(&sample, rate, StopGuard::new())
    }

    #[test]
    fn test_mix_mono_fans_out() {
        let mut voice = voice(vec![0.5, 0.25, 0.75, 1.0], 1, 1.0);
        let mut out = vec![0.0; 4];

        assert!(voice.mix_into(&mut out, 2, 100));
        assert_eq!(vec![0.5, 0.5, 0.25, 0.25], out);
    }

    #[test]
    fn test_mix_is_additive() {
        let mut first = voice(vec![0.5; 8], 1, 1.0);
        let mut second = voice(vec![0.25; 8], 1, 1.0);
        let mut out = vec![0.0; 4];

        assert!(first.mix_into(&mut out, 2, 100));
        assert!(second.mix_into(&mut out, 2, 100));
        assert_eq!(vec![0.75; 4], out);
    }

    #[test]
    fn test_mix_rate_advances_faster() {
        let data = (0..100).map(|i| i as f32).collect::<Vec<f32>>();

        let mut normal = voice(data.clone(), 1, 1.0);
        let mut out = vec![0.0; 10];
        assert!(normal.mix_into(&mut out, 1, 100));
        assert_eq!(9.0, out[9]);

        let mut double = voice(data, 1, 2.0);
        let mut out = vec![0.0; 10];
        assert!(double.mix_into(&mut out, 1, 100));
        assert_eq!(18.0, out[9]);
    }

    #[test]
    fn test_mix_interpolates_between_frames() {
        let mut voice = voice(vec![0.0, 1.0, 0.0, 1.0], 1, 0.5);
        let mut out = vec![0.0; 4];

        assert!(voice.mix_into(&mut out, 1, 100));
        assert_eq!(vec![0.0, 0.5, 1.0, 0.5], out);
    }

    #[test]
    fn test_mix_stops_guard_at_natural_end() {
        let mut voice = voice(vec![0.1; 4], 1, 1.0);
        let guard = voice.guard();
        let mut out = vec![0.0; 16];

        assert!(!voice.mix_into(&mut out, 1, 100));
        assert!(guard.is_stopped());
    }

    #[test]
    fn test_mix_respects_stop() {
        let mut voice = voice(vec![0.1; 100], 1, 1.0);
        voice.guard().stop();

        let mut out = vec![0.0; 8];
        assert!(!voice.mix_into(&mut out, 1, 100));
        assert_eq!(vec![0.0; 8], out);
    }

    #[test]
    fn test_get_device_mock_prefix() {
        assert!(get_device("mock").is_ok());
        assert!(get_device("mock-device").is_ok());
    }
}
