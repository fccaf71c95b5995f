//! Collects the facts about ALSA playback interfaces that `alsacore` interprets: the `aplay -l`
//! listing, kernel status files, a throwaway playback attempt and, for busy devices, the
//! process holding them.

pub mod attribution;
pub mod config;
pub mod error;
pub mod host;
pub mod inspector;
pub mod kernel;
pub mod listing;
pub mod playback;
pub mod report;
pub mod selection;

#[cfg(test)]
mod test_util;
