//! Parsing and classification for ALSA playback interface inspection.
//!
//! Everything here works on text that has already been collected from `aplay`, `lsof` or the
//! kernel's `/proc/asound` tree. Collecting it is the job of `alsaprobe`.

pub mod diagnostics;
pub mod electrical;
pub mod interface;
pub mod monitor;
pub mod process;
pub mod record;
pub mod usb;
