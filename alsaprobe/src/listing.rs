use std::process::Command;

use log::debug;

use crate::error::InspectError;

/// Run `aplay -l` and return its listing of playback hardware devices.
///
/// This is the one step whose failure ends the run, so errors name the command that failed.
pub fn list_playback_devices(aplay: &str) -> Result<String, InspectError> {
    let path = which::which(aplay).map_err(|e| InspectError::ToolNotFound(aplay.to_owned(), e))?;
    let command = format!("LC_ALL=C {aplay} -l");
    debug!("running `{command}' ({})", path.display());
    let output = Command::new(&path)
        .env("LC_ALL", "C")
        .env("LANG", "C")
        .arg("-l")
        .output()
        .map_err(|source| InspectError::ListCommand {
            command: command.clone(),
            source,
        })?;
    if !output.status.success() {
        return Err(InspectError::ListCommandFailed {
            command,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
