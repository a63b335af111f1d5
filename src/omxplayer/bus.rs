//! D-Bus transport to the omxplayer endpoint.
//!
//! omxplayer usually runs on a private bus whose address its launcher writes
//! to `/tmp/omxplayerdbus.$USER`; the session bus works too when the player
//! was started with one.

use std::future::Future;

use serde::Serialize;
use zbus::names::BusName;
use zbus::zvariant::{DynamicType, ObjectPath};
use zbus::{Connection, Message};

use super::error::ControlError;
use super::process::{default_address_path, read_dbus_address};
use super::protocol::{RemoteArg, RemoteCall, RemoteValue, ReplyShape};
use crate::config::ControllerConfig;

/// Carries one [`RemoteCall`] to the player and decodes its reply.
///
/// Implementations must decode the reply as `call.reply_shape()` and report
/// remote error replies as [`ControlError::RemoteFault`]. Whether concurrent
/// calls are serialized is up to the implementation.
pub trait Transport: Send + Sync {
  fn call(&self, call: &RemoteCall) -> impl Future<Output = Result<RemoteValue, ControlError>> + Send;
}

/// Transport over a zbus connection, bound to one destination and object path.
#[derive(Debug, Clone)]
pub struct BusTransport {
  connection: Connection,
  destination: String,
  object_path: String,
}

impl BusTransport {
  /// Bind an open connection to the endpoint named in `config`.
  pub fn new(connection: Connection, config: &ControllerConfig) -> Result<Self, ControlError> {
    BusName::try_from(config.destination.as_str()).map_err(zbus::Error::from)?;
    ObjectPath::try_from(config.object_path.as_str()).map_err(zbus::Error::from)?;

    Ok(Self {
      connection,
      destination: config.destination.clone(),
      object_path: config.object_path.clone(),
    })
  }

  /// Connect to a bus at `address` (e.g. `unix:abstract=/tmp/dbus-XXXX`).
  pub async fn connect_address(
    address: &str,
    config: &ControllerConfig,
  ) -> Result<Self, ControlError> {
    log::info!("Connecting to omxplayer bus at {}", address);
    let connection = zbus::connection::Builder::address(address)?.build().await?;
    Self::new(connection, config)
  }

  /// Connect over the session bus.
  pub async fn connect_session(config: &ControllerConfig) -> Result<Self, ControlError> {
    log::info!("Connecting to omxplayer over the session bus");
    let connection = Connection::session().await?;
    Self::new(connection, config)
  }

  /// Connect to the private bus advertised in omxplayer's address file.
  pub async fn from_address_file(config: &ControllerConfig) -> Result<Self, ControlError> {
    let path = match config.address_file() {
      Some(path) => path,
      None => default_address_path()?,
    };
    let address = read_dbus_address(&path)?;
    Self::connect_address(&address, config).await
  }

  pub fn connection(&self) -> &Connection {
    &self.connection
  }

  pub fn destination(&self) -> &str {
    &self.destination
  }

  pub fn object_path(&self) -> &str {
    &self.object_path
  }

  async fn dispatch<B>(&self, call: &RemoteCall, body: &B) -> Result<Message, zbus::Error>
  where
    B: Serialize + DynamicType + Sync,
  {
    self
      .connection
      .call_method(
        Some(self.destination.as_str()),
        self.object_path.as_str(),
        Some(call.method.interface()),
        call.method.member(),
        body,
      )
      .await
  }
}

impl Transport for BusTransport {
  async fn call(&self, call: &RemoteCall) -> Result<RemoteValue, ControlError> {
    let reply = match call.args.as_slice() {
      [] => self.dispatch(call, &()).await?,
      [RemoteArg::Int32(value)] => self.dispatch(call, &(*value,)).await?,
      [RemoteArg::Int64(value)] => self.dispatch(call, &(*value,)).await?,
      [RemoteArg::Double(value)] => self.dispatch(call, &(*value,)).await?,
      [RemoteArg::ObjectPath(path), RemoteArg::Int64(value)] => {
        let path = ObjectPath::try_from(path.as_str()).map_err(zbus::Error::from)?;
        self.dispatch(call, &(path, *value)).await?
      }
      args => {
        return Err(ControlError::Bus(zbus::Error::Failure(format!(
          "unsupported arguments for {}: {:?}",
          call.method, args
        ))))
      }
    };

    Ok(decode(call.reply_shape(), &reply)?)
  }
}

fn decode(shape: ReplyShape, reply: &Message) -> Result<RemoteValue, zbus::Error> {
  let body = reply.body();
  let value = match shape {
    ReplyShape::Unit => RemoteValue::Unit,
    ReplyShape::Bool => RemoteValue::Bool(body.deserialize()?),
    ReplyShape::Int64 => RemoteValue::Int64(body.deserialize()?),
    ReplyShape::Double => RemoteValue::Double(body.deserialize()?),
    ReplyShape::Str => RemoteValue::Str(body.deserialize()?),
    ReplyShape::StrList => RemoteValue::StrList(body.deserialize()?),
  };
  Ok(value)
}
