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
use std::io;

use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{info, span, warn, Level};

use super::{position_for_key, Event};

const PLAY_ALL: &str = "play";
const STOP: &str = "stop";
const QUIT: &str = "quit";

/// A controller that drives the pad board from the keyboard. Pad keys
/// follow the `1234 qwer asdf zxcv` layout and address play-order
/// positions, not slots.
pub struct Driver {}

impl Driver {
    pub fn new() -> Driver {
        Driver {}
    }

    /// Reads one command and forwards the matching event. Returns false
    /// once the monitor should stop.
    fn monitor_io<R, W>(
        events_tx: &Sender<Event>,
        mut reader: R,
        mut writer: W,
    ) -> Result<bool, io::Error>
    where
        R: io::BufRead,
        W: io::Write,
    {
        write!(
            writer,
            "Command (pad key, {}, {}, {}): ",
            PLAY_ALL, STOP, QUIT,
        )?;
        writer.flush()?;
        let mut input: String = String::default();
        if reader.read_line(&mut input)? == 0 {
            // Stdin is gone, shut down.
            events_tx
                .blocking_send(Event::Quit)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            return Ok(false);
        }

        let input = input.trim().to_lowercase();
        let event = match input.as_str() {
            PLAY_ALL => Event::PlayAll,
            STOP => Event::Stop,
            QUIT => Event::Quit,
            key => {
                let position = key
                    .chars()
                    .next()
                    .filter(|_| key.len() == 1)
                    .and_then(position_for_key);
                match position {
                    Some(position) => Event::Pad(position),
                    None => {
                        warn!(input, "Unrecognized input");
                        return Ok(true);
                    }
                }
            }
        };

        let quit = event == Event::Quit;
        events_tx
            .blocking_send(event)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(!quit)
    }
}

impl Default for Driver {
    fn default() -> Self {
        Driver::new()
    }
}

impl super::Driver for Driver {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>> {
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "keyboard driver");
            let _enter = span.enter();

            info!("Keyboard driver started.");

            while Self::monitor_io(&events_tx, io::stdin().lock(), io::stdout())? {}
            Ok(())
        })
    }
}
