use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("unable to locate '{0}' on PATH - is alsa-utils installed?")]
    ToolNotFound(String, #[source] which::Error),

    #[error("error running `{command}': {source}")]
    ListCommand {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}' exited with {status}: {stderr}")]
    ListCommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("invalid regular expression '{0}': {1}")]
    InvalidRegex(String, #[source] regex::Error),
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("unable to open random input '{0}': {1}")]
    Input(String, #[source] std::io::Error),

    #[error("unable to run `{0}': {1}")]
    Spawn(String, #[source] std::io::Error),

    #[error("error waiting for `{0}' to finish: {1}")]
    Wait(String, #[source] std::io::Error),

    #[error("playback probe timed out after {} ms", .0.as_millis())]
    TimedOut(Duration),
}
