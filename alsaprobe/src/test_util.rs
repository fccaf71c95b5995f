use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use alsacore::process::ProcessOwner;

use crate::attribution::ProcessAttributor;
use crate::error::PlaybackError;
use crate::playback::PlaybackProbe;

/// Playback probe that replays fixed stderr text per address.
///
/// Addresses without canned text behave like a player that never finished.
pub(crate) struct CannedPlayback {
    stderr: HashMap<String, String>,
    attempts: RefCell<Vec<String>>,
}

impl CannedPlayback {
    pub(crate) fn new<const N: usize>(canned: [(&str, &str); N]) -> Self {
        Self {
            stderr: canned
                .into_iter()
                .map(|(a, s)| (a.to_owned(), s.to_owned()))
                .collect(),
            attempts: RefCell::new(vec![]),
        }
    }

    pub(crate) fn attempts(&self) -> Vec<String> {
        self.attempts.borrow().clone()
    }
}

impl PlaybackProbe for CannedPlayback {
    fn attempt(&self, address: &str) -> Result<String, PlaybackError> {
        self.attempts.borrow_mut().push(address.to_owned());
        self.stderr
            .get(address)
            .cloned()
            .ok_or(PlaybackError::TimedOut(Duration::from_millis(10)))
    }
}

/// Attributor that always gives the same answer and counts how often it was asked.
pub(crate) struct FixedAttributor {
    owner: Option<ProcessOwner>,
    calls: Cell<usize>,
}

impl FixedAttributor {
    pub(crate) fn new(owner: Option<ProcessOwner>) -> Self {
        Self {
            owner,
            calls: Cell::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ProcessAttributor for FixedAttributor {
    fn attribute(&self, _device: &Path) -> Option<ProcessOwner> {
        self.calls.set(self.calls.get() + 1);
        self.owner.clone()
    }
}
