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
use std::{fmt, thread};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleFormat,
};
use crossbeam_channel::{bounded, unbounded, Sender};
use tracing::error;

use super::{AudioError, Voice};

/// A cpal-backed output device. New voices are handed to the output stream
/// over a channel so the audio callback never takes a lock; the callback
/// zeroes its buffer, mixes every live voice into it, and drops voices as
/// they finish.
pub struct Device {
    name: String,
    voice_tx: Sender<Voice>,
}

impl Device {
    /// Gets the output device with the given name and starts its stream.
    /// The name `default` selects the host's default output device.
    pub fn get(name: &str) -> Result<Device, AudioError> {
        let host = cpal::default_host();
        let device = if name == "default" {
            host.default_output_device()
                .ok_or_else(|| AudioError::NoDevice(name.to_string()))?
        } else {
            host.output_devices()?
                .find(|device| device.name().map(|n| n == name).unwrap_or(false))
                .ok_or_else(|| AudioError::NoDevice(name.to_string()))?
        };

        let (voice_tx, voice_rx) = unbounded::<Voice>();
        let (ready_tx, ready_rx) = bounded::<Result<(), AudioError>>(1);

        // cpal streams are not Send, so a dedicated thread owns the stream
        // for the lifetime of the process.
        thread::spawn(move || {
            let result = (|| -> Result<cpal::Stream, AudioError> {
                let config = device.default_output_config()?;
                if config.sample_format() != SampleFormat::F32 {
                    return Err(AudioError::UnsupportedFormat(format!(
                        "{:?}",
                        config.sample_format()
                    )));
                }
                let channels = usize::from(config.channels());
                let sample_rate = config.sample_rate();

                let mut voices: Vec<Voice> = Vec::new();
                let stream = device.build_output_stream(
                    &config.into(),
                    move |out: &mut [f32], _| {
                        while let Ok(voice) = voice_rx.try_recv() {
                            voices.push(voice);
                        }
                        out.fill(0.0);
                        voices.retain_mut(|voice| voice.mix_into(out, channels, sample_rate));
                    },
                    |e| error!(err = e.to_string(), "Output stream error."),
                    None,
                )?;
                stream.play()?;
                Ok(stream)
            })();

            match result {
                Ok(stream) => {
                    let _stream = stream;
                    let _ = ready_tx.send(Ok(()));
                    loop {
                        thread::park();
                    }
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            }
        });

        ready_rx.recv().map_err(|_| AudioError::DeviceGone)??;

        Ok(Device {
            name: name.to_string(),
            voice_tx,
        })
    }
}

impl super::Device for Device {
    fn start(&self, voice: Voice) -> Result<(), AudioError> {
        self.voice_tx
            .send(voice)
            .map_err(|_| AudioError::DeviceGone)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (cpal)", self.name)
    }
}

/// Lists the names of the available cpal output devices.
pub fn list_devices() -> Result<Vec<String>, AudioError> {
    let host = cpal::default_host();
    let mut names = Vec::new();
    for device in host.output_devices()? {
        if let Ok(name) = device.name() {
            names.push(name);
        }
    }
    Ok(names)
}
