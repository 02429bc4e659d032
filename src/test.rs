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
    io::Cursor,
    thread,
    time::{Duration, Instant},
};

/// Waits for the check to pass, panicking with the given message if it does
/// not within five seconds.
pub fn eventually<F: Fn() -> bool>(check: F, message: &str) {
    let start = Instant::now();
    while !check() {
        if start.elapsed() > Duration::from_secs(5) {
            panic!("{}", message);
        }
        thread::sleep(Duration::from_millis(10));
    }
}

/// Renders a silent 16-bit PCM WAV file in memory.
pub fn wav_bytes(seconds: u32, sample_rate: u32, channels: u16) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
        for _ in 0..(seconds * sample_rate * u32::from(channels)) {
            writer.write_sample(0i16).expect("wav sample");
        }
        writer.finalize().expect("wav finalize");
    }
    cursor.into_inner()
}
