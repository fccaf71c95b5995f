//! Interpretation of the text `aplay` writes to stderr when asked to play raw data.
//!
//! `aplay` opens the device and tries to configure it for its default raw format. If the
//! hardware rejects that format it lists the ones it does accept:
//!
//! ```text
//! aplay: set_params:1339: Sample format non available
//! Available formats:
//! - S16_LE
//! - S32_LE
//! ```
//!
//! If the device can't be opened at all there is only an error line, where the message follows
//! the source line number:
//!
//! ```text
//! aplay: main:831: audio open error: Device or resource busy
//! ```

const FORMATS_MARKER: &str = "Available formats";
const FORMAT_PREFIX: &str = "- ";
const NO_OUTPUT: &str = "no diagnostic output";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackDiagnostics {
    /// The device opened and reported these formats, in the order the driver gave them.
    Formats(Vec<String>),
    /// The device could not be opened or configured.
    Refused(String),
}

pub fn parse_playback_diagnostics(stderr: &str) -> PlaybackDiagnostics {
    let mut lines = stderr.lines();
    if lines.by_ref().any(|l| l.contains(FORMATS_MARKER)) {
        let formats = lines
            .filter_map(|l| l.strip_prefix(FORMAT_PREFIX))
            .map(|f| f.trim().to_owned())
            .collect();
        PlaybackDiagnostics::Formats(formats)
    } else {
        PlaybackDiagnostics::Refused(extract_error_message(stderr))
    }
}

/// Pull the message out of an `aplay` error report.
///
/// Messages follow the first digit-then-colon boundary (the end of the source line number) and
/// run to the end of that line. Without such a boundary the first non-empty line is used.
pub fn extract_error_message(stderr: &str) -> String {
    let boundary = stderr
        .as_bytes()
        .windows(2)
        .position(|w| w[0].is_ascii_digit() && w[1] == b':');
    let message = match boundary {
        Some(pos) => stderr[pos + 2..].lines().next().unwrap_or("").trim(),
        None => "",
    };
    if !message.is_empty() {
        return message.to_owned();
    }
    stderr
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or(NO_OUTPUT)
        .to_owned()
}
