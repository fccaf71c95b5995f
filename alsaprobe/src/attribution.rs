use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use alsacore::process::{parse_lsof_fields, ProcessOwner};
use log::debug;

/// Finds out which process is holding a device node open.
///
/// Attribution is best effort: any failure, including lack of privilege, is `None`.
pub trait ProcessAttributor {
    fn attribute(&self, device: &Path) -> Option<ProcessOwner>;
}

/// Asks `lsof` for the owner of a device node, optionally through `sudo`.
///
/// `sudo` is run non-interactively so a missing credential fails fast instead of prompting in
/// the middle of the report.
pub struct LsofAttributor {
    sudo: Option<String>,
    lsof: String,
}

impl LsofAttributor {
    pub fn new(sudo: Option<String>, lsof: String) -> Self {
        Self { sudo, lsof }
    }

    fn command(&self, device: &Path) -> Command {
        let mut cmd = match &self.sudo {
            Some(sudo) => {
                let mut cmd = Command::new(sudo);
                cmd.args(["-n", &self.lsof]);
                cmd
            }
            None => Command::new(&self.lsof),
        };
        cmd.args(["-F", "c"])
            .arg(device)
            .stdin(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl ProcessAttributor for LsofAttributor {
    fn attribute(&self, device: &Path) -> Option<ProcessOwner> {
        let output = match self.command(device).output() {
            Ok(o) => o,
            Err(e) => {
                debug!("unable to run {}: {e}", self.lsof);
                return None;
            }
        };
        // lsof exits non-zero when nothing has the file open, the output is what matters
        let owner = parse_lsof_fields(&String::from_utf8_lossy(&output.stdout));
        if owner.is_none() {
            debug!(
                "{} found no owner for {} ({})",
                self.lsof,
                device.display(),
                output.status
            );
        }
        owner
    }
}

/// Scans `/proc/<pid>/fd` for descriptors pointing at the device node.
///
/// Only sees processes this user may inspect, but needs no helper program.
pub struct ProcFdAttributor {
    proc_root: PathBuf,
}

impl ProcFdAttributor {
    pub fn new<P: Into<PathBuf>>(proc_root: P) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }
}

impl ProcessAttributor for ProcFdAttributor {
    fn attribute(&self, device: &Path) -> Option<ProcessOwner> {
        let entries = fs::read_dir(&self.proc_root).ok()?;
        let mut pids: Vec<(u32, PathBuf)> = entries
            .flatten()
            .filter_map(|e| {
                let pid = e.file_name().to_str()?.parse().ok()?;
                Some((pid, e.path()))
            })
            .collect();
        pids.sort();

        let mut owner = None;
        for (pid, dir) in pids {
            let Ok(fds) = fs::read_dir(dir.join("fd")) else {
                continue;
            };
            let holds_device = fds
                .flatten()
                .any(|fd| fs::read_link(fd.path()).is_ok_and(|target| target == device));
            if holds_device {
                let command = fs::read_to_string(dir.join("comm"))
                    .map(|c| c.trim().to_owned())
                    .unwrap_or_default();
                owner = Some(ProcessOwner { pid, command });
            }
        }
        owner
    }
}

/// Try `primary`, and if it finds nothing, `secondary`.
pub struct Fallback<A, B> {
    pub primary: A,
    pub secondary: B,
}

impl<A: ProcessAttributor, B: ProcessAttributor> ProcessAttributor for Fallback<A, B> {
    fn attribute(&self, device: &Path) -> Option<ProcessOwner> {
        self.primary
            .attribute(device)
            .or_else(|| self.secondary.attribute(device))
    }
}
