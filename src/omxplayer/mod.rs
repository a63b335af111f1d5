//! omxplayer D-Bus control - drives an already running omxplayer process.
//!
//! Architecture:
//! - `process.rs` - pid liveness and private bus address discovery
//! - `bus.rs` - `Transport` seam and the zbus-backed `BusTransport`
//! - `protocol.rs` - wire names, call arguments and reply types
//! - `client.rs` - `RemoteController` with one method per remote capability
//! - `error.rs` - `ControlError` and its classification

mod bus;
mod client;
mod error;
mod process;
mod protocol;

pub use bus::{BusTransport, Transport};
pub use client::{ReadyState, RemoteController};
pub use error::{ControlError, ErrorKind};
pub use process::{
  current_user, dbus_address_path, default_address_path, read_dbus_address, PlayerProcess,
  ProcessError,
};
pub use protocol::{
  Method, RemoteArg, RemoteCall, RemoteValue, ReplyShape, DEFAULT_DESTINATION,
  DEFAULT_OBJECT_PATH, IFACE_PLAYER, IFACE_PROPS, IFACE_ROOT,
};
