use std::fmt::Display;

/// A process found holding a device node open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOwner {
    pub pid: u32,
    pub command: String,
}

impl Display for ProcessOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "process `{}' with pid `{}'", self.command, self.pid)
    }
}

/// Parse the field output of `lsof -F c <path>`.
///
/// Each field is on its own line with a one-character key: `p` for the process ID and `c` for
/// the command name. Other keys (such as `f` for file descriptors) are ignored. If several
/// processes have the node open, the last one listed is returned.
pub fn parse_lsof_fields(output: &str) -> Option<ProcessOwner> {
    let mut owner = None;
    let mut pid: Option<u32> = None;
    for line in output.lines() {
        if let Some(value) = line.strip_prefix('p') {
            pid = value.trim().parse().ok();
        } else if let Some(value) = line.strip_prefix('c') {
            if let Some(pid) = pid {
                owner = Some(ProcessOwner {
                    pid,
                    command: value.to_owned(),
                });
            }
        }
    }
    owner
}
