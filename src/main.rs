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
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::fs;

use clap::{crate_version, Parser, Subcommand};
use padbank::audio;
use padbank::controller::{keyboard, Controller};
use padbank::pads::PadBoard;
use padbank::settings::Settings;
use padbank::util;
use tracing::info;

/// The file extensions picked up when loading a sample directory.
const AUDIO_EXTENSIONS: [&str; 4] = ["wav", "mp3", "flac", "ogg"];

const SHARE_BASE: &str = "https://padbank.mdwn.dev/";

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A 16-pad one-shot sampler."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the available audio output devices.
    Devices {},
    /// Prints the settings encoded in a share link or query string.
    Link {
        /// The link or query string to inspect.
        query: String,
    },
    /// Starts the sampler.
    Start {
        /// The audio device to play through.
        #[arg(short, long, default_value = "default")]
        device: String,
        /// A share link or query string to restore settings from.
        #[arg(short, long)]
        link: Option<String>,
        /// Play each sample once as it loads.
        #[arg(short, long)]
        preview: bool,
        /// A directory of audio files to load onto the pads.
        samples: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Devices {} => {
            let devices = audio::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Link { query } => {
            let settings = Settings::parse(query_of(&query));
            println!("speed: {}", settings.speed());
            println!("maxMs: {}", settings.max_ms());
            println!("gapMs: {}", settings.gap_ms());
            println!("padNames: {}", settings.pad_names().join(", "));
        }
        Commands::Start {
            device,
            link,
            preview,
            samples,
        } => {
            let device = audio::get_device(&device)?;
            let settings = match link {
                Some(link) => Settings::parse(query_of(&link)),
                None => Settings::default(),
            };
            let board = Arc::new(PadBoard::new(device, settings, preview));

            if let Some(dir) = samples {
                let files = read_sample_files(&dir)?;
                let count = files.len();
                let loaded = board.assign_batch(0, files).await;
                println!("Loaded {} of {} files.", loaded, count);
            }

            println!(
                "Total length: {}",
                util::duration_seconds(board.total_length())
            );
            println!("Share link: {}", board.share_link(SHARE_BASE));

            let mut controller = Controller::new(board, Arc::new(keyboard::Driver::new()));
            controller.join().await?;
        }
    }

    Ok(())
}

/// Strips everything up to and including the `?` so both full links and bare
/// query strings are accepted.
fn query_of(link: &str) -> &str {
    match link.split_once('?') {
        Some((_, query)) => query,
        None => link,
    }
}

/// Reads the audio files in the directory, in name order.
fn read_sample_files(dir: &Path) -> Result<Vec<Vec<u8>>, Box<dyn Error>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_audio = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| AUDIO_EXTENSIONS.contains(&extension.to_lowercase().as_str()))
            .unwrap_or(false);
        if path.is_file() && is_audio {
            paths.push(path);
        }
    }
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        info!(file = util::filename_display(&path), "Reading sample file.");
        files.push(fs::read(&path)?);
    }
    Ok(files)
}
