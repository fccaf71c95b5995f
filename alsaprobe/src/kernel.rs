use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use alsacore::monitor::MonitorState;
use alsacore::usb::{parse_stream_descriptor, UsbAudioClass};
use log::{debug, warn};

/// Read-only access to the status files ALSA exposes under `/proc/asound` and the driver
/// parameters under `/sys/module`.
///
/// None of these reads are fatal. Missing files are normal for cards they don't apply to, and
/// permission problems are reported once per run then folded into the result.
pub struct KernelFiles {
    proc_root: PathBuf,
    sys_root: PathBuf,
    denied_reported: AtomicBool,
}

impl KernelFiles {
    pub fn new<P: Into<PathBuf>, S: Into<PathBuf>>(proc_root: P, sys_root: S) -> Self {
        Self {
            proc_root: proc_root.into(),
            sys_root: sys_root.into(),
            denied_reported: AtomicBool::new(false),
        }
    }

    pub fn stream_descriptor_path(&self, card: u32) -> PathBuf {
        self.proc_root
            .join("asound")
            .join(format!("card{card}"))
            .join("stream0")
    }

    pub fn hw_params_path(&self, card: u32, device: u32) -> PathBuf {
        self.proc_root
            .join("asound")
            .join(format!("card{card}"))
            .join(format!("pcm{device}p"))
            .join("sub0")
            .join("hw_params")
    }

    pub fn module_parameter_path(&self, driver: &str, name: &str) -> PathBuf {
        self.sys_root
            .join("module")
            .join(driver)
            .join("parameters")
            .join(name)
    }

    /// Determine the USB Audio Class sync mode of a card from its stream descriptor.
    pub fn usb_audio_class(&self, card: u32) -> UsbAudioClass {
        let path = self.stream_descriptor_path(card);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return UsbAudioClass::NotApplicable,
            Err(e) => {
                self.report_read_error(&path, &e);
                return UsbAudioClass::Undetermined(format!(
                    "error '{e}' while opening `{}' for reading",
                    path.display()
                ));
            }
        };
        match parse_stream_descriptor(&contents) {
            Ok(mode) => UsbAudioClass::Class(mode),
            Err(e) => {
                debug!("unexpected contents in {}: {e}", path.display());
                UsbAudioClass::Undetermined(format!("{e} in `{}'", path.display()))
            }
        }
    }

    /// Report whether a playback substream is open, according to its `hw_params` file.
    pub fn monitor_state(&self, card: u32, device: u32) -> MonitorState {
        let path = self.hw_params_path(card, device);
        match fs::read_to_string(&path) {
            Ok(contents) => MonitorState::from_hw_params(&contents),
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    self.report_read_error(&path, &e);
                }
                MonitorState::inaccessible()
            }
        }
    }

    /// Value of a kernel module parameter, or a description of why it couldn't be read.
    pub fn module_parameter(&self, driver: &str, name: &str) -> String {
        let path = self.module_parameter_path(driver, name);
        match fs::read_to_string(&path) {
            Ok(value) => value.trim().to_owned(),
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    self.report_read_error(&path, &e);
                }
                format!("could not open `{}' for reading", path.display())
            }
        }
    }

    /// Log a failed read. Returns true if this was logged as a warning, which only the first
    /// permission error of the run is.
    fn report_read_error(&self, path: &Path, e: &std::io::Error) -> bool {
        if e.kind() != ErrorKind::PermissionDenied {
            debug!("unable to read {}: {e}", path.display());
            return false;
        }
        if self.denied_reported.swap(true, Ordering::Relaxed) {
            debug!("permission denied reading {}", path.display());
            return false;
        }
        warn!(
            "permission denied reading {}; some interface details will be unknown",
            path.display()
        );
        true
    }
}
