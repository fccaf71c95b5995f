use log::warn;

/// Name of this host, used in every interface's display label.
///
/// Read once per run. Falls back to `(unknown)` if the name can't be retrieved.
pub fn hostname() -> String {
    match nix::unistd::gethostname() {
        Ok(name) if !name.is_empty() => name.to_string_lossy().into_owned(),
        Ok(_) => "(unknown)".to_owned(),
        Err(e) => {
            warn!("unable to read host name: {e}");
            "(unknown)".to_owned()
        }
    }
}
