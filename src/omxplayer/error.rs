//! Controller error types.

use std::time::Duration;

use thiserror::Error;

use super::process::ProcessError;
use super::protocol::{Method, ReplyShape};

/// Errors that can occur when driving the player.
#[derive(Debug, Error)]
pub enum ControlError {
  #[error("D-Bus error: {0}")]
  Bus(#[source] zbus::Error),

  #[error("omxplayer rejected the call: {name}{}", detail(.message))]
  RemoteFault {
    name: String,
    message: Option<String>,
  },

  #[error("Unexpected reply to {method}: expected {expected}, got {found}")]
  UnexpectedReply {
    method: Method,
    expected: ReplyShape,
    found: ReplyShape,
  },

  #[error("Call timed out after {0:?}")]
  Timeout(Duration),

  #[error("Cancelled")]
  Cancelled,

  #[error("Bus discovery failed: {0}")]
  Discovery(#[from] ProcessError),
}

fn detail(message: &Option<String>) -> String {
  message
    .as_deref()
    .map(|m| format!(": {}", m))
    .unwrap_or_default()
}

/// Coarse classification of a [`ControlError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The call did not complete; the controller should be treated as dead.
  Transport,
  /// The player received the call and refused it.
  RemoteFault,
}

impl ControlError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      ControlError::RemoteFault { .. } => ErrorKind::RemoteFault,
      ControlError::Bus(_)
      | ControlError::UnexpectedReply { .. }
      | ControlError::Timeout(_)
      | ControlError::Cancelled
      | ControlError::Discovery(_) => ErrorKind::Transport,
    }
  }

  pub fn is_remote_fault(&self) -> bool {
    self.kind() == ErrorKind::RemoteFault
  }
}

impl From<zbus::Error> for ControlError {
  fn from(err: zbus::Error) -> Self {
    match err {
      zbus::Error::MethodError(name, message, _) => ControlError::RemoteFault {
        name: name.to_string(),
        message,
      },
      other => ControlError::Bus(other),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_kind() {
    let fault = ControlError::RemoteFault {
      name: "org.freedesktop.DBus.Error.Failed".into(),
      message: Some("not playing".into()),
    };
    assert_eq!(fault.kind(), ErrorKind::RemoteFault);
    assert!(fault.is_remote_fault());
    assert_eq!(
      fault.to_string(),
      "omxplayer rejected the call: org.freedesktop.DBus.Error.Failed: not playing"
    );

    let bus = ControlError::from(zbus::Error::InvalidReply);
    assert!(matches!(bus, ControlError::Bus(_)));
    assert_eq!(bus.kind(), ErrorKind::Transport);
    assert_eq!(ControlError::Cancelled.kind(), ErrorKind::Transport);
  }

  #[test]
  fn test_fault_without_message() {
    let fault = ControlError::RemoteFault {
      name: "org.freedesktop.DBus.Error.UnknownMethod".into(),
      message: None,
    };
    assert_eq!(
      fault.to_string(),
      "omxplayer rejected the call: org.freedesktop.DBus.Error.UnknownMethod"
    );
  }
}
