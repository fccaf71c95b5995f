use std::fmt::Display;

/// Open/closed state of a PCM substream according to its `hw_params` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorStatus {
    Opened,
    Closed,
    Unknown,
}

impl MonitorStatus {
    /// Interpret the contents of a readable `hw_params` file.
    ///
    /// A closed substream reports exactly `closed`, an open one dumps its negotiated parameters.
    pub fn from_hw_params(contents: &str) -> Self {
        if contents.trim() == "closed" {
            MonitorStatus::Closed
        } else {
            MonitorStatus::Opened
        }
    }
}

impl Display for MonitorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorStatus::Opened => write!(f, "opened"),
            MonitorStatus::Closed => write!(f, "closed"),
            MonitorStatus::Unknown => write!(f, "(unknown)"),
        }
    }
}

/// Result of the busy/state probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorState {
    pub status: MonitorStatus,
    pub accessible: bool,
}

impl MonitorState {
    pub fn from_hw_params(contents: &str) -> Self {
        Self {
            status: MonitorStatus::from_hw_params(contents),
            accessible: true,
        }
    }

    pub fn inaccessible() -> Self {
        Self {
            status: MonitorStatus::Unknown,
            accessible: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_substream() {
        assert_eq!(MonitorStatus::from_hw_params("closed"), MonitorStatus::Closed);
        assert_eq!(MonitorStatus::from_hw_params("closed\n"), MonitorStatus::Closed);
    }

    #[test]
    fn open_substream() {
        let dump = "access: RW_INTERLEAVED\nformat: S16_LE\nsubformat: STD\nchannels: 2\nrate: 48000 (48000/1)\nperiod_size: 1024\nbuffer_size: 4096\n";
        let state = MonitorState::from_hw_params(dump);
        assert_eq!(state.status, MonitorStatus::Opened);
        assert!(state.accessible);
        assert_eq!(state.status.to_string(), "opened");
    }

    #[test]
    fn anything_but_closed_is_open() {
        assert_eq!(MonitorStatus::from_hw_params(""), MonitorStatus::Opened);
        assert_eq!(MonitorStatus::from_hw_params("closed down"), MonitorStatus::Opened);
    }

    #[test]
    fn inaccessible_is_unknown() {
        let state = MonitorState::inaccessible();
        assert_eq!(state.status, MonitorStatus::Unknown);
        assert!(!state.accessible);
        assert_eq!(state.status.to_string(), "(unknown)");
    }
}
