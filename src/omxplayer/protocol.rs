//! omxplayer D-Bus call table and request/reply types.
//!
//! Reference: https://github.com/popcornmix/omxplayer#dbus-control

use std::fmt;

/// MPRIS root interface (quit, identity).
pub const IFACE_ROOT: &str = "org.mpris.MediaPlayer2";
/// MPRIS player interface (transport controls, track selection).
pub const IFACE_PLAYER: &str = "org.mpris.MediaPlayer2.Player";
/// omxplayer answers property reads as methods on this interface.
pub const IFACE_PROPS: &str = "org.freedesktop.DBus.Properties";

/// Well-known bus name omxplayer registers by default.
pub const DEFAULT_DESTINATION: &str = "org.mpris.MediaPlayer2.omxplayer";
/// Object path omxplayer exports its interfaces on.
pub const DEFAULT_OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";

/// Every remote method or property the controller can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
  Quit,
  CanQuit,
  Fullscreen,
  CanSetFullscreen,
  CanRaise,
  HasTrackList,
  Identity,
  SupportedUriSchemes,
  SupportedMimeTypes,
  CanGoNext,
  CanGoPrevious,
  CanSeek,
  CanControl,
  CanPlay,
  CanPause,
  Next,
  Previous,
  Pause,
  PlayPause,
  Stop,
  Seek,
  SetPosition,
  PlaybackStatus,
  Volume,
  Mute,
  Unmute,
  Position,
  Aspect,
  VideoStreamCount,
  ResWidth,
  ResHeight,
  Duration,
  MinimumRate,
  MaximumRate,
  ListSubtitles,
  HideVideo,
  UnHideVideo,
  ListAudio,
  ListVideo,
  SelectSubtitle,
  SelectAudio,
  ShowSubtitles,
  HideSubtitles,
  Action,
}

impl Method {
  /// D-Bus interface the member lives on.
  pub fn interface(self) -> &'static str {
    use Method::*;
    match self {
      Quit => IFACE_ROOT,

      CanQuit | Fullscreen | CanSetFullscreen | CanRaise | HasTrackList | Identity
      | SupportedUriSchemes | SupportedMimeTypes | CanGoNext | CanGoPrevious | CanSeek
      | CanControl | CanPlay | CanPause | PlaybackStatus | Volume | Mute | Unmute | Position
      | Aspect | VideoStreamCount | ResWidth | ResHeight | Duration | MinimumRate
      | MaximumRate => IFACE_PROPS,

      Next | Previous | Pause | PlayPause | Stop | Seek | SetPosition | ListSubtitles
      | HideVideo | UnHideVideo | ListAudio | ListVideo | SelectSubtitle | SelectAudio
      | ShowSubtitles | HideSubtitles | Action => IFACE_PLAYER,
    }
  }

  /// D-Bus member name, byte-identical to what omxplayer dispatches on.
  pub fn member(self) -> &'static str {
    use Method::*;
    match self {
      Quit => "Quit",
      CanQuit => "CanQuit",
      Fullscreen => "Fullscreen",
      CanSetFullscreen => "CanSetFullscreen",
      CanRaise => "CanRaise",
      HasTrackList => "HasTrackList",
      Identity => "Identity",
      SupportedUriSchemes => "SupportedUriSchemes",
      SupportedMimeTypes => "SupportedMimeTypes",
      CanGoNext => "CanGoNext",
      CanGoPrevious => "CanGoPrevious",
      CanSeek => "CanSeek",
      CanControl => "CanControl",
      CanPlay => "CanPlay",
      CanPause => "CanPause",
      Next => "Next",
      Previous => "Previous",
      Pause => "Pause",
      PlayPause => "PlayPause",
      Stop => "Stop",
      Seek => "Seek",
      SetPosition => "SetPosition",
      PlaybackStatus => "PlaybackStatus",
      Volume => "Volume",
      Mute => "Mute",
      Unmute => "Unmute",
      Position => "Position",
      Aspect => "Aspect",
      VideoStreamCount => "VideoStreamCount",
      ResWidth => "ResWidth",
      ResHeight => "ResHeight",
      Duration => "Duration",
      MinimumRate => "MinimumRate",
      MaximumRate => "MaximumRate",
      ListSubtitles => "ListSubtitles",
      HideVideo => "HideVideo",
      UnHideVideo => "UnHideVideo",
      ListAudio => "ListAudio",
      ListVideo => "ListVideo",
      SelectSubtitle => "SelectSubtitle",
      SelectAudio => "SelectAudio",
      ShowSubtitles => "ShowSubtitles",
      HideSubtitles => "HideSubtitles",
      Action => "Action",
    }
  }

  /// Type of the single value omxplayer replies with.
  pub fn reply_shape(self) -> ReplyShape {
    use Method::*;
    match self {
      Quit | Next | Previous | Pause | PlayPause | Stop | Mute | Unmute | HideVideo
      | UnHideVideo | ShowSubtitles | HideSubtitles | Action => ReplyShape::Unit,

      CanQuit | Fullscreen | CanSetFullscreen | CanRaise | HasTrackList | CanGoNext
      | CanGoPrevious | CanSeek | CanControl | CanPlay | CanPause | SelectSubtitle
      | SelectAudio => ReplyShape::Bool,

      Seek | SetPosition | Position | VideoStreamCount | ResWidth | ResHeight | Duration => {
        ReplyShape::Int64
      }

      Volume | Aspect | MinimumRate | MaximumRate => ReplyShape::Double,

      Identity | PlaybackStatus => ReplyShape::Str,

      SupportedUriSchemes | SupportedMimeTypes | ListSubtitles | ListAudio | ListVideo => {
        ReplyShape::StrList
      }
    }
  }
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}", self.interface(), self.member())
  }
}

/// Positional argument of a remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteArg {
  /// D-Bus `i`.
  Int32(i32),
  /// D-Bus `x`.
  Int64(i64),
  /// D-Bus `d`.
  Double(f64),
  /// D-Bus `o`.
  ObjectPath(String),
}

/// One request to the player.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
  pub method: Method,
  pub args: Vec<RemoteArg>,
}

impl RemoteCall {
  /// Call without arguments (commands and property reads).
  pub fn new(method: Method) -> Self {
    Self {
      method,
      args: Vec::new(),
    }
  }

  pub fn with_args(method: Method, args: Vec<RemoteArg>) -> Self {
    Self { method, args }
  }

  pub fn seek(amount: i64) -> Self {
    Self::with_args(Method::Seek, vec![RemoteArg::Int64(amount)])
  }

  pub fn set_position(path: &str, position: i64) -> Self {
    Self::with_args(
      Method::SetPosition,
      vec![
        RemoteArg::ObjectPath(path.to_string()),
        RemoteArg::Int64(position),
      ],
    )
  }

  pub fn set_volume(volume: f64) -> Self {
    Self::with_args(Method::Volume, vec![RemoteArg::Double(volume)])
  }

  pub fn select_subtitle(index: i32) -> Self {
    Self::with_args(Method::SelectSubtitle, vec![RemoteArg::Int32(index)])
  }

  pub fn select_audio(index: i32) -> Self {
    Self::with_args(Method::SelectAudio, vec![RemoteArg::Int32(index)])
  }

  pub fn action(code: i32) -> Self {
    Self::with_args(Method::Action, vec![RemoteArg::Int32(code)])
  }

  /// Shape the transport should decode the reply body as.
  pub fn reply_shape(&self) -> ReplyShape {
    self.method.reply_shape()
  }
}

/// Expected type of a reply body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
  Unit,
  Bool,
  Int64,
  Double,
  Str,
  StrList,
}

impl fmt::Display for ReplyShape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let signature = match self {
      ReplyShape::Unit => "",
      ReplyShape::Bool => "b",
      ReplyShape::Int64 => "x",
      ReplyShape::Double => "d",
      ReplyShape::Str => "s",
      ReplyShape::StrList => "as",
    };
    write!(f, "'{}'", signature)
  }
}

/// Decoded reply from the player.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteValue {
  Unit,
  Bool(bool),
  Int64(i64),
  Double(f64),
  Str(String),
  StrList(Vec<String>),
}

impl RemoteValue {
  pub fn shape(&self) -> ReplyShape {
    match self {
      RemoteValue::Unit => ReplyShape::Unit,
      RemoteValue::Bool(_) => ReplyShape::Bool,
      RemoteValue::Int64(_) => ReplyShape::Int64,
      RemoteValue::Double(_) => ReplyShape::Double,
      RemoteValue::Str(_) => ReplyShape::Str,
      RemoteValue::StrList(_) => ReplyShape::StrList,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_full_names() {
    assert_eq!(Method::Quit.to_string(), "org.mpris.MediaPlayer2.Quit");
    assert_eq!(
      Method::CanQuit.to_string(),
      "org.freedesktop.DBus.Properties.CanQuit"
    );
    assert_eq!(
      Method::Volume.to_string(),
      "org.freedesktop.DBus.Properties.Volume"
    );
    assert_eq!(
      Method::UnHideVideo.to_string(),
      "org.mpris.MediaPlayer2.Player.UnHideVideo"
    );
    assert_eq!(
      Method::SetPosition.to_string(),
      "org.mpris.MediaPlayer2.Player.SetPosition"
    );
  }

  #[test]
  fn test_can_seek_is_a_property() {
    assert_eq!(Method::CanSeek.interface(), IFACE_PROPS);
    assert_eq!(Method::CanSeek.reply_shape(), ReplyShape::Bool);
    assert_eq!(Method::Seek.interface(), IFACE_PLAYER);
  }

  #[test]
  fn test_mute_lives_on_properties() {
    assert_eq!(Method::Mute.interface(), IFACE_PROPS);
    assert_eq!(Method::Unmute.interface(), IFACE_PROPS);
    assert_eq!(Method::Mute.reply_shape(), ReplyShape::Unit);
  }

  #[test]
  fn test_call_arguments() {
    let call = RemoteCall::set_position("/not/used", 1_000_000);
    assert_eq!(call.method, Method::SetPosition);
    assert_eq!(
      call.args,
      vec![
        RemoteArg::ObjectPath("/not/used".to_string()),
        RemoteArg::Int64(1_000_000)
      ]
    );
    assert_eq!(call.reply_shape(), ReplyShape::Int64);

    assert!(RemoteCall::new(Method::Volume).args.is_empty());
    assert_eq!(
      RemoteCall::set_volume(0.5).args,
      vec![RemoteArg::Double(0.5)]
    );
  }

  #[test]
  fn test_value_shape() {
    assert_eq!(
      RemoteValue::StrList(vec!["file".into()]).shape(),
      ReplyShape::StrList
    );
    assert_eq!(ReplyShape::StrList.to_string(), "'as'");
  }
}
