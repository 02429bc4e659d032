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
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::debug;

use crate::pads::NUM_PADS;

/// The set of bytes escaped when a query parameter value is encoded. Matches
/// the characters browsers leave bare in query components.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'!')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const DEFAULT_SPEED: f64 = 1.0;
const DEFAULT_MAX_MS: f64 = 40_000.0;
const DEFAULT_GAP_MS: f64 = 0.0;
const DEFAULT_PAD_NAMES: [&str; 12] = [
    "bd", "sn", "ho", "hc", "bd", "sn", "ho", "hc", "bd", "sn", "*", "cy",
];

/// Playback settings for the pad board. All of this state round-trips
/// through the query string of a shareable link.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Playback rate multiplier. Always finite and positive.
    speed: f64,
    /// Hard cap on any single pad's play time, in milliseconds.
    max_ms: f64,
    /// Silence enforced after every play, in milliseconds.
    gap_ms: f64,
    /// Display names for the pads, at most one per pad.
    pad_names: Vec<String>,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            speed: DEFAULT_SPEED,
            max_ms: DEFAULT_MAX_MS,
            gap_ms: DEFAULT_GAP_MS,
            pad_names: DEFAULT_PAD_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Parses settings out of a query string, with or without the leading
    /// `?`. Unknown parameters are ignored and invalid values fall back to
    /// their defaults, so parsing never fails.
    pub fn parse(query: &str) -> Settings {
        let mut settings = Settings::default();

        for pair in query.trim_start_matches('?').split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };

            match key {
                "speed" => {
                    if let Some(speed) = parse_number(value, |n| n > 0.0) {
                        settings.speed = speed;
                    } else {
                        debug!(value, "Ignoring invalid speed.");
                    }
                }
                "maxMs" => {
                    if let Some(max_ms) = parse_number(value, |n| n > 0.0) {
                        settings.max_ms = max_ms;
                    } else {
                        debug!(value, "Ignoring invalid maxMs.");
                    }
                }
                "gapMs" => {
                    if let Some(gap_ms) = parse_number(value, |n| n >= 0.0) {
                        settings.gap_ms = gap_ms;
                    } else {
                        debug!(value, "Ignoring invalid gapMs.");
                    }
                }
                "padNames" => {
                    if let Some(names) = decode_pad_names(value) {
                        settings.set_pad_names(names);
                    } else {
                        debug!(value, "Ignoring undecodable padNames.");
                    }
                }
                _ => {}
            }
        }

        settings
    }

    /// Serializes the settings as a query string (without the leading `?`).
    pub fn serialize(&self) -> String {
        format!(
            "speed={}&maxMs={}&gapMs={}&padNames={}",
            self.speed,
            self.max_ms,
            self.gap_ms,
            encode_pad_names(&self.pad_names),
        )
    }

    /// Returns a full shareable link against the given base URL.
    pub fn share_link(&self, base: &str) -> String {
        format!("{}?{}", base, self.serialize())
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn max_ms(&self) -> f64 {
        self.max_ms
    }

    pub fn gap_ms(&self) -> f64 {
        self.gap_ms
    }

    /// Returns the display name for a pad. Pads without a configured name
    /// show the placeholder.
    pub fn pad_name(&self, index: usize) -> &str {
        match self.pad_names.get(index) {
            Some(name) if !name.is_empty() => name,
            _ => "*",
        }
    }

    pub fn pad_names(&self) -> &[String] {
        &self.pad_names
    }

    /// Sets the playback rate. Non-finite or non-positive rates are ignored.
    pub fn set_speed(&mut self, speed: f64) {
        if speed.is_finite() && speed > 0.0 {
            self.speed = speed;
        } else {
            debug!(speed, "Ignoring invalid speed.");
        }
    }

    /// Sets the per-pad duration cap in milliseconds.
    pub fn set_max_ms(&mut self, max_ms: f64) {
        if max_ms.is_finite() && max_ms > 0.0 {
            self.max_ms = max_ms;
        } else {
            debug!(max_ms, "Ignoring invalid maxMs.");
        }
    }

    /// Sets the post-play gap in milliseconds.
    pub fn set_gap_ms(&mut self, gap_ms: f64) {
        if gap_ms.is_finite() && gap_ms >= 0.0 {
            self.gap_ms = gap_ms;
        } else {
            debug!(gap_ms, "Ignoring invalid gapMs.");
        }
    }

    /// Sets the pad names, keeping at most one per pad.
    pub fn set_pad_names(&mut self, mut names: Vec<String>) {
        names.truncate(NUM_PADS);
        self.pad_names = names;
    }
}

fn parse_number<F: Fn(f64) -> bool>(value: &str, valid: F) -> Option<f64> {
    let number: f64 = value.parse().ok()?;
    if number.is_finite() && valid(number) {
        Some(number)
    } else {
        None
    }
}

/// Encodes the name list into a single query parameter value. Each name's
/// literal `-` is escaped first so that `-` can then act as the list
/// delimiter; the joined list is escaped once more as a whole.
fn encode_pad_names(names: &[String]) -> String {
    let joined = names
        .iter()
        .map(|name| name.replace('-', "%2D"))
        .collect::<Vec<String>>()
        .join("-");
    utf8_percent_encode(&joined, QUERY).to_string()
}

/// Reverses [`encode_pad_names`]: decode the parameter value once, split on
/// the delimiter, then decode each name. Returns None if the value is not
/// valid percent-encoded UTF-8.
fn decode_pad_names(value: &str) -> Option<Vec<String>> {
    let joined = percent_decode_str(value).decode_utf8().ok()?.into_owned();
    joined
        .split('-')
        .map(|name| {
            percent_decode_str(name)
                .decode_utf8()
                .ok()
                .map(|name| name.into_owned())
        })
        .collect()
}
