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
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{error, info};

use crate::pads::{PadBoard, NUM_PADS};

pub mod keyboard;

/// Controller events that trigger behavior on the pad board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Plays the pad at the given play-order position.
    Pad(usize),

    /// Plays every loaded pad in order.
    PlayAll,

    /// Stops the sequencer and every live voice.
    Stop,

    /// Shuts the controller down.
    Quit,
}

/// The view the user is looking at. Pad keys only act in the sampler view;
/// while a secondary view is open, keystrokes belong to that view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Sampler,
    Settings,
    Converter,
}

/// A single keystroke as reported by a key-event source.
#[derive(Debug, Clone, Copy)]
pub struct KeyPress {
    pub code: char,
    /// True if this event comes from the key being held down.
    pub repeat: bool,
}

/// The pad trigger keys, one per play-order position, laid out as the four
/// rows `1234`, `qwer`, `asdf`, `zxcv`.
pub const KEY_LAYOUT: [char; NUM_PADS] = [
    '1', '2', '3', '4', 'q', 'w', 'e', 'r', 'a', 's', 'd', 'f', 'z', 'x', 'c', 'v',
];

/// Returns the play-order position a key triggers, if any.
pub fn position_for_key(code: char) -> Option<usize> {
    KEY_LAYOUT.iter().position(|&key| key == code)
}

/// Maps a keystroke to a controller event. Held-down repeats never retrigger
/// a pad, and pad keys are inert outside the sampler view.
pub fn map_key(key: KeyPress, view: View) -> Option<Event> {
    if key.repeat || view != View::Sampler {
        return None;
    }
    position_for_key(key.code).map(Event::Pad)
}

pub trait Driver: Send + Sync + 'static {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>>;
}

/// Controls a pad board.
pub struct Controller {
    handle: JoinHandle<()>,
}

impl Controller {
    /// Creates a new controller with the given driver.
    pub fn new(board: Arc<PadBoard>, driver: Arc<dyn Driver>) -> Controller {
        Controller {
            handle: tokio::spawn(async move { Controller::trigger_events(board, driver).await }),
        }
    }

    /// Join will block until the controller finishes.
    pub async fn join(&mut self) -> Result<(), JoinError> {
        (&mut self.handle).await
    }

    /// Triggers board events by watching the driver and getting events from
    /// it. Plays run in their own tasks so the controller keeps accepting
    /// events while a pad or a traversal is sounding.
    async fn trigger_events(board: Arc<PadBoard>, driver: Arc<dyn Driver>) {
        let (events_tx, mut events_rx) = mpsc::channel(1);
        let join_handle = driver.monitor_events(events_tx);

        info!("Controller started.");

        loop {
            let Some(event) = events_rx.recv().await else {
                info!("Controller closing.");
                break;
            };
            info!(event = format!("{:?}", event), "Received event.");

            match event {
                Event::Pad(position) => {
                    let board = board.clone();
                    tokio::spawn(async move {
                        if let Err(e) = board.trigger_position(position).await {
                            error!(position, "Error playing pad: {}", e);
                        }
                    });
                }
                Event::PlayAll => {
                    let board = board.clone();
                    tokio::spawn(async move {
                        if let Err(e) = board.play_all().await {
                            error!("Error playing all pads: {}", e);
                        }
                    });
                }
                Event::Stop => board.stop_all(),
                Event::Quit => break,
            }
        }

        if let Err(e) = join_handle.await {
            error!("Error waiting for event monitor to stop: {}", e);
        }
    }
}

#[cfg(test)]
mod test {
    use std::io;

    use tokio::{sync::mpsc::Sender, task::JoinHandle};

    use crate::{audio::mock, settings::Settings, test::eventually};

    use super::*;

    struct ScriptDriver {
        events: Vec<Event>,
    }

    impl Driver for ScriptDriver {
        fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>> {
            let events = self.events.clone();
            tokio::task::spawn_blocking(move || {
                for event in events {
                    events_tx
                        .blocking_send(event)
                        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
                }
                Ok(())
            })
        }
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(Some(0), position_for_key('1'));
        assert_eq!(Some(4), position_for_key('q'));
        assert_eq!(Some(15), position_for_key('v'));
        assert_eq!(None, position_for_key('5'));
        assert_eq!(None, position_for_key(' '));
    }

    #[test]
    fn test_map_key() {
        let press = |code| KeyPress {
            code,
            repeat: false,
        };

        assert_eq!(Some(Event::Pad(5)), map_key(press('w'), View::Sampler));
        assert_eq!(None, map_key(press('w'), View::Settings));
        assert_eq!(None, map_key(press('w'), View::Converter));
        assert_eq!(None, map_key(press('5'), View::Sampler));

        // Holding a key down never retriggers.
        let held = KeyPress {
            code: 'w',
            repeat: true,
        };
        assert_eq!(None, map_key(held, View::Sampler));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_controller_plays_pad_by_position() {
        let device = Arc::new(mock::Device::new("mock"));
        let board = Arc::new(PadBoard::new(device.clone(), Settings::default(), false));
        assert!(board.assign(0, crate::test::wav_bytes(1, 8000, 1)).await);

        let driver = Arc::new(ScriptDriver {
            events: vec![Event::Pad(0), Event::Quit],
        });
        let mut controller = Controller::new(board, driver);

        eventually(|| device.started_count() == 1, "pad never played");
        controller.join().await.expect("controller failed");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_controller_quits() {
        let board = Arc::new(PadBoard::new(
            Arc::new(mock::Device::new("mock")),
            Settings::default(),
            false,
        ));
        let driver = Arc::new(ScriptDriver {
            events: vec![Event::Quit],
        });

        let mut controller = Controller::new(board, driver);
        controller.join().await.expect("controller failed");
    }
}
