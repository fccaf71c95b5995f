use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::PlaybackError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Something that can make a throwaway playback attempt against a hardware address.
///
/// The attempt must report what the player wrote to stderr, whether or not it succeeded;
/// interpreting that text is left to `alsacore::diagnostics`.
pub trait PlaybackProbe {
    fn attempt(&self, address: &str) -> Result<String, PlaybackError>;
}

/// Plays random bytes through `aplay -D <address>` and captures its complaints.
///
/// `aplay` defaults to unsigned 8-bit mono raw data, which real hardware devices almost never
/// accept, so it normally exits quickly listing the formats the device does support. If the
/// device accepts the data it would play noise indefinitely, hence the timeout.
pub struct AplayProbe {
    command: String,
    random_source: PathBuf,
    timeout: Duration,
}

impl AplayProbe {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(
        command: S,
        random_source: P,
        timeout: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            random_source: random_source.into(),
            timeout,
        }
    }
}

impl PlaybackProbe for AplayProbe {
    fn attempt(&self, address: &str) -> Result<String, PlaybackError> {
        let input = File::open(&self.random_source)
            .map_err(|e| PlaybackError::Input(self.random_source.display().to_string(), e))?;
        let mut child = Command::new(&self.command)
            .env("LC_ALL", "C")
            .env("LANG", "C")
            .args(["-D", address])
            .stdin(Stdio::from(input))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PlaybackError::Spawn(self.command.clone(), e))?;

        // Drain stderr on its own thread so a chatty child can't stall on a full pipe
        let reader = child.stderr.take().map(spawn_reader);

        match wait_with_timeout(&mut child, self.timeout) {
            Ok(Some(status)) => {
                debug!("{} -D {address} exited with {status}", self.command);
                Ok(collect(reader))
            }
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                let _ = collect(reader);
                Err(PlaybackError::TimedOut(self.timeout))
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(PlaybackError::Wait(self.command.clone(), e))
            }
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut stream: R) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = vec![];
        let _ = stream.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(reader: Option<JoinHandle<String>>) -> String {
    reader.and_then(|r| r.join().ok()).unwrap_or_default()
}

/// Wait for `child` to exit, giving up after `timeout`. `Ok(None)` means it is still running.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    // A timeout too large to represent means waiting for as long as it takes
    let deadline = Instant::now().checked_add(timeout);
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}
