//! Control a running omxplayer instance over D-Bus.
//!
//! ```ignore
//! let config = ControllerConfig::default();
//! let transport = BusTransport::from_address_file(&config).await?;
//! let player = RemoteController::with_config(PlayerProcess::new(pid), transport, config);
//!
//! player.wait_for_ready_timeout(Duration::from_secs(5)).await?;
//! let position = player.seek(5_000_000).await?;
//! ```

mod config;
mod omxplayer;

pub use config::ControllerConfig;
pub use omxplayer::*;

/// Controller bound to a live D-Bus connection.
pub type Player = RemoteController<BusTransport>;
