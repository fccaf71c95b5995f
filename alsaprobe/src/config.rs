use std::path::PathBuf;
use std::time::Duration;

/// Where the inspector finds its tools and the kernel's status trees.
///
/// The defaults describe a normal Linux host. Tests point the roots at temporary directories.
#[derive(Debug, Clone)]
pub struct InspectorConfig {
    /// Player used both to list devices (`-l`) and for the playback probe.
    pub aplay: String,
    /// Prefix used to run `lsof` with elevated rights. `None` runs it directly.
    pub sudo: Option<String>,
    pub lsof: String,
    pub proc_root: PathBuf,
    pub sys_root: PathBuf,
    /// Parent of the `snd` directory holding the playback device nodes.
    pub dev_root: PathBuf,
    /// Data fed to the player during the playback probe.
    pub random_source: PathBuf,
    /// Longest time a single playback probe may run before it is killed.
    pub playback_timeout: Duration,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            aplay: "aplay".to_owned(),
            sudo: Some("sudo".to_owned()),
            lsof: "lsof".to_owned(),
            proc_root: PathBuf::from("/proc"),
            sys_root: PathBuf::from("/sys"),
            dev_root: PathBuf::from("/dev"),
            random_source: PathBuf::from("/dev/urandom"),
            playback_timeout: Duration::from_secs(5),
        }
    }
}
