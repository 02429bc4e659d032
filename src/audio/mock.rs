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
use std::fmt;

use parking_lot::Mutex;
use tracing::debug;

use super::{AudioError, Voice};
use crate::playsync::StopGuard;

/// A mock audio device. Voices are accepted and tracked but no audio is
/// produced; playback timing is driven entirely by the caller's guard.
pub struct Device {
    name: String,
    guards: Mutex<Vec<StopGuard>>,
}

impl Device {
    pub fn new(name: &str) -> Device {
        Device {
            name: name.to_string(),
            guards: Mutex::new(Vec::new()),
        }
    }

    /// The number of voices ever handed to this device.
    pub fn started_count(&self) -> usize {
        self.guards.lock().len()
    }

    /// The number of voices whose guard has not yet stopped.
    pub fn active_voices(&self) -> usize {
        self.guards
            .lock()
            .iter()
            .filter(|guard| !guard.is_stopped())
            .count()
    }
}

impl super::Device for Device {
    fn start(&self, voice: Voice) -> Result<(), AudioError> {
        debug!(device = self.name, "Mock device starting voice.");
        self.guards.lock().push(voice.guard());
        Ok(())
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (mock)", self.name)
    }
}
