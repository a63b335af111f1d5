//! Player process liveness and bus address discovery.

use std::path::{Path, PathBuf};
use std::process::Child;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
  #[error("Failed to read D-Bus address file: {0}")]
  ReadFailed(#[from] std::io::Error),
  #[error("D-Bus address file is empty: {0}")]
  EmptyAddress(PathBuf),
  #[error("Cannot determine current user")]
  UnknownUser,
}

/// Reference to an already spawned omxplayer process.
///
/// Only the pid is kept. Spawning, reaping, and killing stay with whoever
/// started the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerProcess {
  pid: u32,
}

impl PlayerProcess {
  pub fn new(pid: u32) -> Self {
    Self { pid }
  }

  pub fn from_child(child: &Child) -> Self {
    Self::new(child.id())
  }

  pub fn pid(&self) -> u32 {
    self.pid
  }

  /// Check whether the process still exists by sending it signal 0.
  ///
  /// `EPERM` means the process exists under another uid, so it counts as running.
  #[cfg(unix)]
  pub fn is_running(&self) -> bool {
    // pid 0 and negative pids address process groups
    let pid = match libc::pid_t::try_from(self.pid) {
      Ok(pid) if pid > 0 => pid,
      _ => return false,
    };

    if unsafe { libc::kill(pid, 0) } == 0 {
      return true;
    }
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
  }

  /// Liveness cannot be probed without signals, so assume the process is running.
  #[cfg(not(unix))]
  pub fn is_running(&self) -> bool {
    true
  }
}

/// Name of the user omxplayer was started as, from `$USER` or `$LOGNAME`.
pub fn current_user() -> Option<String> {
  ["USER", "LOGNAME"]
    .iter()
    .filter_map(|key| std::env::var(key).ok())
    .find(|user| !user.is_empty())
}

/// File the omxplayer launcher writes its private bus address to.
pub fn dbus_address_path(user: &str) -> PathBuf {
  PathBuf::from(format!("/tmp/omxplayerdbus.{}", user))
}

/// Default address file for the current user.
pub fn default_address_path() -> Result<PathBuf, ProcessError> {
  current_user()
    .map(|user| dbus_address_path(&user))
    .ok_or(ProcessError::UnknownUser)
}

/// Read a bus address such as `unix:abstract=/tmp/dbus-XXXX,guid=...`.
pub fn read_dbus_address(path: &Path) -> Result<String, ProcessError> {
  let contents = std::fs::read_to_string(path)?;
  let address = contents.trim();
  if address.is_empty() {
    return Err(ProcessError::EmptyAddress(path.to_path_buf()));
  }

  log::info!("Read omxplayer D-Bus address from {}", path.display());
  Ok(address.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::process::Command;

  #[test]
  fn test_current_process_is_running() {
    let process = PlayerProcess::new(std::process::id());
    assert!(process.is_running());
  }

  #[cfg(unix)]
  #[test]
  fn test_pid_zero_is_not_running() {
    assert!(!PlayerProcess::new(0).is_running());
    assert!(!PlayerProcess::new(u32::MAX).is_running());
  }

  #[cfg(unix)]
  #[test]
  fn test_reaped_child_is_not_running() {
    let mut child = Command::new("true").spawn().unwrap();
    let process = PlayerProcess::from_child(&child);
    assert_eq!(process.pid(), child.id());

    child.wait().unwrap();
    assert!(!process.is_running());
  }

  #[test]
  fn test_address_path() {
    assert_eq!(
      dbus_address_path("pi"),
      PathBuf::from("/tmp/omxplayerdbus.pi")
    );
  }

  #[test]
  fn test_read_address_trims() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("omxplayerdbus.pi");
    std::fs::write(&path, "unix:abstract=/tmp/dbus-abc,guid=123\n").unwrap();

    let address = read_dbus_address(&path).unwrap();
    assert_eq!(address, "unix:abstract=/tmp/dbus-abc,guid=123");
  }

  #[test]
  fn test_read_address_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("omxplayerdbus.pi");

    assert!(matches!(
      read_dbus_address(&path),
      Err(ProcessError::ReadFailed(_))
    ));

    std::fs::write(&path, "  \n").unwrap();
    assert!(matches!(
      read_dbus_address(&path),
      Err(ProcessError::EmptyAddress(_))
    ));
  }
}
