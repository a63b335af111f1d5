//! High-level omxplayer controller with one method per D-Bus capability.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::bus::Transport;
use super::error::ControlError;
use super::process::PlayerProcess;
use super::protocol::{Method, RemoteCall, RemoteValue};
use crate::config::ControllerConfig;

/// Whether the player has answered a readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadyState {
  /// Not probed yet.
  Unknown = 0,
  /// Last probe failed.
  Unreachable = 1,
  /// A probe succeeded. Terminal.
  Ready = 2,
}

impl ReadyState {
  fn from_u8(value: u8) -> Self {
    match value {
      2 => ReadyState::Ready,
      1 => ReadyState::Unreachable,
      _ => ReadyState::Unknown,
    }
  }
}

/// Controller for a running omxplayer instance.
///
/// Every capability issues exactly one remote call and awaits its reply.
/// Nothing but readiness is cached.
pub struct RemoteController<T> {
  process: PlayerProcess,
  transport: T,
  config: ControllerConfig,
  ready: AtomicU8,
}

impl<T: Transport> RemoteController<T> {
  pub fn new(process: PlayerProcess, transport: T) -> Self {
    Self::with_config(process, transport, ControllerConfig::default())
  }

  pub fn with_config(process: PlayerProcess, transport: T, config: ControllerConfig) -> Self {
    Self {
      process,
      transport,
      config,
      ready: AtomicU8::new(ReadyState::Unknown as u8),
    }
  }

  pub fn process(&self) -> PlayerProcess {
    self.process
  }

  pub fn transport(&self) -> &T {
    &self.transport
  }

  pub fn config(&self) -> &ControllerConfig {
    &self.config
  }

  /// Check if the player process still exists.
  pub fn is_running(&self) -> bool {
    self.process.is_running()
  }

  /// Current readiness without probing.
  pub fn ready_state(&self) -> ReadyState {
    ReadyState::from_u8(self.ready.load(Ordering::Acquire))
  }

  /// Check if the player accepts D-Bus calls, probing `CanQuit` until it has once.
  pub async fn is_ready(&self) -> bool {
    if self.ready_state() == ReadyState::Ready {
      return true;
    }

    match self.can_quit().await {
      Ok(_) => {
        if self.ready.swap(ReadyState::Ready as u8, Ordering::AcqRel) != ReadyState::Ready as u8 {
          log::info!("omxplayer (pid {}) is ready", self.process.pid());
        }
        true
      }
      Err(e) => {
        log::debug!("omxplayer readiness probe failed: {}", e);
        // never demote Ready
        let _ = self.ready.compare_exchange(
          ReadyState::Unknown as u8,
          ReadyState::Unreachable as u8,
          Ordering::AcqRel,
          Ordering::Acquire,
        );
        false
      }
    }
  }

  /// Poll readiness every `poll_interval` until ready or `cancel` fires.
  pub async fn wait_for_ready(&self, cancel: &CancellationToken) -> Result<(), ControlError> {
    let interval = self.config.poll_interval();
    loop {
      tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ControlError::Cancelled),
        ready = self.is_ready() => {
          if ready {
            return Ok(());
          }
        }
      }

      tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ControlError::Cancelled),
        _ = tokio::time::sleep(interval) => {}
      }
    }
  }

  /// Like [`wait_for_ready`](Self::wait_for_ready), bounded by `timeout`.
  pub async fn wait_for_ready_timeout(&self, timeout: Duration) -> Result<(), ControlError> {
    let cancel = CancellationToken::new();
    match tokio::time::timeout(timeout, self.wait_for_ready(&cancel)).await {
      Ok(result) => result,
      Err(_) => {
        log::warn!("omxplayer not ready after {:?}", timeout);
        Err(ControlError::Timeout(timeout))
      }
    }
  }

  /// Send a call and await the reply, bounded by `call_timeout` when set.
  async fn invoke(&self, call: RemoteCall) -> Result<RemoteValue, ControlError> {
    log::debug!("omxplayer D-Bus call: {} args={:?}", call.method, call.args);

    let reply = match self.config.call_timeout() {
      Some(limit) => tokio::time::timeout(limit, self.transport.call(&call))
        .await
        .map_err(|_| ControlError::Timeout(limit))??,
      None => self.transport.call(&call).await?,
    };

    let expected = call.reply_shape();
    if reply.shape() != expected {
      return Err(ControlError::UnexpectedReply {
        method: call.method,
        expected,
        found: reply.shape(),
      });
    }
    Ok(reply)
  }

  async fn command(&self, call: RemoteCall) -> Result<(), ControlError> {
    self.invoke(call).await.map(|_| ())
  }

  async fn expect_bool(&self, call: RemoteCall) -> Result<bool, ControlError> {
    let method = call.method;
    match self.invoke(call).await? {
      RemoteValue::Bool(b) => Ok(b),
      other => Err(mismatch(method, other)),
    }
  }

  async fn expect_i64(&self, call: RemoteCall) -> Result<i64, ControlError> {
    let method = call.method;
    match self.invoke(call).await? {
      RemoteValue::Int64(n) => Ok(n),
      other => Err(mismatch(method, other)),
    }
  }

  async fn expect_f64(&self, call: RemoteCall) -> Result<f64, ControlError> {
    let method = call.method;
    match self.invoke(call).await? {
      RemoteValue::Double(n) => Ok(n),
      other => Err(mismatch(method, other)),
    }
  }

  async fn get_bool(&self, method: Method) -> Result<bool, ControlError> {
    self.expect_bool(RemoteCall::new(method)).await
  }

  async fn get_i64(&self, method: Method) -> Result<i64, ControlError> {
    self.expect_i64(RemoteCall::new(method)).await
  }

  async fn get_f64(&self, method: Method) -> Result<f64, ControlError> {
    self.expect_f64(RemoteCall::new(method)).await
  }

  async fn get_string(&self, method: Method) -> Result<String, ControlError> {
    match self.invoke(RemoteCall::new(method)).await? {
      RemoteValue::Str(s) => Ok(s),
      other => Err(mismatch(method, other)),
    }
  }

  async fn get_strings(&self, method: Method) -> Result<Vec<String>, ControlError> {
    match self.invoke(RemoteCall::new(method)).await? {
      RemoteValue::StrList(list) => Ok(list),
      other => Err(mismatch(method, other)),
    }
  }

  /// Stop playback and terminate the omxplayer process.
  pub async fn quit(&self) -> Result<(), ControlError> {
    self.command(RemoteCall::new(Method::Quit)).await
  }

  pub async fn can_quit(&self) -> Result<bool, ControlError> {
    self.get_bool(Method::CanQuit).await
  }

  pub async fn fullscreen(&self) -> Result<bool, ControlError> {
    self.get_bool(Method::Fullscreen).await
  }

  pub async fn can_set_fullscreen(&self) -> Result<bool, ControlError> {
    self.get_bool(Method::CanSetFullscreen).await
  }

  /// Whether the player can be brought to the front.
  pub async fn can_raise(&self) -> Result<bool, ControlError> {
    self.get_bool(Method::CanRaise).await
  }

  pub async fn has_track_list(&self) -> Result<bool, ControlError> {
    self.get_bool(Method::HasTrackList).await
  }

  /// Name of the player instance.
  pub async fn identity(&self) -> Result<String, ControlError> {
    self.get_string(Method::Identity).await
  }

  /// Playable URI schemes.
  pub async fn supported_uri_schemes(&self) -> Result<Vec<String>, ControlError> {
    self.get_strings(Method::SupportedUriSchemes).await
  }

  pub async fn supported_mime_types(&self) -> Result<Vec<String>, ControlError> {
    self.get_strings(Method::SupportedMimeTypes).await
  }

  pub async fn can_go_next(&self) -> Result<bool, ControlError> {
    self.get_bool(Method::CanGoNext).await
  }

  pub async fn can_go_previous(&self) -> Result<bool, ControlError> {
    self.get_bool(Method::CanGoPrevious).await
  }

  pub async fn can_seek(&self) -> Result<bool, ControlError> {
    self.get_bool(Method::CanSeek).await
  }

  pub async fn can_control(&self) -> Result<bool, ControlError> {
    self.get_bool(Method::CanControl).await
  }

  pub async fn can_play(&self) -> Result<bool, ControlError> {
    self.get_bool(Method::CanPlay).await
  }

  pub async fn can_pause(&self) -> Result<bool, ControlError> {
    self.get_bool(Method::CanPause).await
  }

  /// Skip to the next chapter.
  pub async fn next(&self) -> Result<(), ControlError> {
    self.command(RemoteCall::new(Method::Next)).await
  }

  /// Skip to the previous chapter.
  pub async fn previous(&self) -> Result<(), ControlError> {
    self.command(RemoteCall::new(Method::Previous)).await
  }

  /// Toggle pause. omxplayer treats Pause and PlayPause the same way.
  pub async fn pause(&self) -> Result<(), ControlError> {
    self.command(RemoteCall::new(Method::Pause)).await
  }

  pub async fn play_pause(&self) -> Result<(), ControlError> {
    self.command(RemoteCall::new(Method::PlayPause)).await
  }

  pub async fn stop(&self) -> Result<(), ControlError> {
    self.command(RemoteCall::new(Method::Stop)).await
  }

  /// Relative seek in microseconds. Returns the offset the player applied.
  pub async fn seek(&self, amount: i64) -> Result<i64, ControlError> {
    self.expect_i64(RemoteCall::seek(amount)).await
  }

  /// Absolute seek in microseconds. `path` is the track's object path,
  /// which omxplayer ignores but requires to be well-formed.
  pub async fn set_position(&self, path: &str, position: i64) -> Result<i64, ControlError> {
    self.expect_i64(RemoteCall::set_position(path, position)).await
  }

  /// "Playing" or "Paused".
  pub async fn playback_status(&self) -> Result<String, ControlError> {
    self.get_string(Method::PlaybackStatus).await
  }

  /// Current volume as a linear multiplier.
  pub async fn get_volume(&self) -> Result<f64, ControlError> {
    self.get_f64(Method::Volume).await
  }

  /// Set the volume and return the value the player settled on.
  pub async fn set_volume(&self, volume: f64) -> Result<f64, ControlError> {
    self.expect_f64(RemoteCall::set_volume(volume)).await
  }

  pub async fn mute(&self) -> Result<(), ControlError> {
    self.command(RemoteCall::new(Method::Mute)).await
  }

  pub async fn unmute(&self) -> Result<(), ControlError> {
    self.command(RemoteCall::new(Method::Unmute)).await
  }

  /// Current position in microseconds.
  pub async fn position(&self) -> Result<i64, ControlError> {
    self.get_i64(Method::Position).await
  }

  pub async fn aspect(&self) -> Result<f64, ControlError> {
    self.get_f64(Method::Aspect).await
  }

  pub async fn video_stream_count(&self) -> Result<i64, ControlError> {
    self.get_i64(Method::VideoStreamCount).await
  }

  pub async fn res_width(&self) -> Result<i64, ControlError> {
    self.get_i64(Method::ResWidth).await
  }

  pub async fn res_height(&self) -> Result<i64, ControlError> {
    self.get_i64(Method::ResHeight).await
  }

  /// Total length in microseconds.
  pub async fn duration(&self) -> Result<i64, ControlError> {
    self.get_i64(Method::Duration).await
  }

  pub async fn minimum_rate(&self) -> Result<f64, ControlError> {
    self.get_f64(Method::MinimumRate).await
  }

  pub async fn maximum_rate(&self) -> Result<f64, ControlError> {
    self.get_f64(Method::MaximumRate).await
  }

  /// Subtitle tracks as `index:language:name:codec:active` strings.
  pub async fn list_subtitles(&self) -> Result<Vec<String>, ControlError> {
    self.get_strings(Method::ListSubtitles).await
  }

  pub async fn hide_video(&self) -> Result<(), ControlError> {
    self.command(RemoteCall::new(Method::HideVideo)).await
  }

  pub async fn unhide_video(&self) -> Result<(), ControlError> {
    self.command(RemoteCall::new(Method::UnHideVideo)).await
  }

  pub async fn list_audio(&self) -> Result<Vec<String>, ControlError> {
    self.get_strings(Method::ListAudio).await
  }

  pub async fn list_video(&self) -> Result<Vec<String>, ControlError> {
    self.get_strings(Method::ListVideo).await
  }

  /// Select a subtitle track. `Ok(false)` means the player declined the index.
  pub async fn select_subtitle(&self, index: i32) -> Result<bool, ControlError> {
    self.expect_bool(RemoteCall::select_subtitle(index)).await
  }

  /// Select an audio track. `Ok(false)` means the player declined the index.
  pub async fn select_audio(&self, index: i32) -> Result<bool, ControlError> {
    self.expect_bool(RemoteCall::select_audio(index)).await
  }

  pub async fn show_subtitles(&self) -> Result<(), ControlError> {
    self.command(RemoteCall::new(Method::ShowSubtitles)).await
  }

  pub async fn hide_subtitles(&self) -> Result<(), ControlError> {
    self.command(RemoteCall::new(Method::HideSubtitles)).await
  }

  /// Execute a keyboard action code (see omxplayer's `KeyConfig.h`).
  pub async fn action(&self, code: i32) -> Result<(), ControlError> {
    self.command(RemoteCall::action(code)).await
  }
}

fn mismatch(method: Method, found: RemoteValue) -> ControlError {
  ControlError::UnexpectedReply {
    method,
    expected: method.reply_shape(),
    found: found.shape(),
  }
}
