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

//! A 16-pad one-shot sampler.
//!
//! Pads hold decoded audio samples and play them through a shared output
//! device. Playback is parameterized by a rate multiplier, a hard per-sample
//! duration cap, and an enforced gap of silence after every play. A sequencer
//! walks a reorderable permutation of the pads, and all settings round-trip
//! through a shareable query-string link.

pub mod audio;
pub mod controller;
pub mod decode;
pub mod pads;
pub mod playsync;
pub mod settings;
#[cfg(test)]
mod test;
pub mod util;
