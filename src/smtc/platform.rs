// Native media platform seam
// The traits mirror the shape of the WinRT session API so the snapshot
// builder and dispatcher can run against any implementation of it.
use std::future::Future;
use std::pin::Pin;

use chrono::Utc;

use crate::error::BridgeResult;

/// 100 ns ticks, the unit of WinRT `TimeSpan` and `DateTime`
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Ticks between 1601-01-01 (WinRT `DateTime` epoch) and 1970-01-01
pub const UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;

pub type OperationFuture<T> = Pin<Box<dyn Future<Output = BridgeResult<T>>>>;

/// A started asynchronous native operation.
///
/// Clones are handles to the same operation, so one clone can be awaited
/// while another is kept around to cancel it.
pub trait PendingOperation: Clone {
    type Output: 'static;

    fn into_completion(self) -> OperationFuture<Self::Output>;

    /// Request cancellation. Best effort; errors are swallowed.
    fn cancel(&self);
}

/// Playback status as reported by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Closed,
    Opened,
    Changing,
    Stopped,
    Playing,
    Paused,
    Unknown(i32),
}

impl PlaybackStatus {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => PlaybackStatus::Closed,
            1 => PlaybackStatus::Opened,
            2 => PlaybackStatus::Changing,
            3 => PlaybackStatus::Stopped,
            4 => PlaybackStatus::Playing,
            5 => PlaybackStatus::Paused,
            other => PlaybackStatus::Unknown(other),
        }
    }
}

/// Raw session timeline, all values in 100 ns ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timeline {
    pub start_ticks: i64,
    pub end_ticks: i64,
    pub position_ticks: i64,
    /// Ticks since 1601-01-01 UTC
    pub last_updated_ticks: i64,
}

/// Now-playing properties of one session
#[derive(Debug, Clone)]
pub struct MediaProperties<T> {
    pub title: String,
    pub artist: String,
    pub thumbnail: Option<T>,
}

/// Transport commands a session accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionAction {
    Next,
    Previous,
    Play,
    Pause,
    TogglePlayPause,
    Stop,
}

impl SessionAction {
    pub fn name(self) -> &'static str {
        match self {
            SessionAction::Next => "next",
            SessionAction::Previous => "previous",
            SessionAction::Play => "play",
            SessionAction::Pause => "pause",
            SessionAction::TogglePlayPause => "toggle",
            SessionAction::Stop => "stop",
        }
    }
}

pub trait MediaPlatform {
    type Manager: SessionManager;
    type ManagerRequest: PendingOperation<Output = Self::Manager>;

    /// Start acquiring the session manager
    fn request_manager(&self) -> BridgeResult<Self::ManagerRequest>;

    /// Current wall-clock time in ticks since 1601-01-01 UTC
    fn now(&self) -> i64 {
        wall_clock_ticks()
    }
}

pub trait SessionManager {
    type Sessions: SessionList;

    /// The live session list at the time of the call
    fn sessions(&self) -> BridgeResult<Self::Sessions>;
}

pub trait SessionList {
    type Session: MediaSession;

    fn size(&self) -> BridgeResult<u32>;
    fn get_at(&self, index: u32) -> BridgeResult<Self::Session>;
}

pub trait MediaSession {
    type Thumbnail: Thumbnail;
    type ActionRequest: PendingOperation<Output = bool>;

    fn source_app(&self) -> BridgeResult<String>;
    fn media_properties(&self) -> BridgeResult<MediaProperties<Self::Thumbnail>>;
    fn timeline(&self) -> BridgeResult<Timeline>;
    fn playback_status(&self) -> BridgeResult<PlaybackStatus>;
    fn request_action(&self, action: SessionAction) -> BridgeResult<Self::ActionRequest>;
}

pub trait Thumbnail {
    type Stream: ThumbnailStream;
    type OpenRequest: PendingOperation<Output = Self::Stream>;

    fn open_read(&self) -> BridgeResult<Self::OpenRequest>;
}

pub trait ThumbnailStream {
    type Reader: StreamReader;

    /// Declared length in bytes
    fn size(&self) -> BridgeResult<u64>;
    fn reader(&self) -> BridgeResult<Self::Reader>;
    fn close(&self) -> BridgeResult<()>;
}

pub trait StreamReader {
    /// Buffer `count` bytes from the stream, returning how many were loaded
    fn load(&self, count: u32) -> BridgeResult<u32>;
    fn read_bytes(&self, buffer: &mut [u8]) -> BridgeResult<()>;
    fn close(&self) -> BridgeResult<()>;
}

pub fn wall_clock_ticks() -> i64 {
    let now = Utc::now();
    UNIX_EPOCH_TICKS
        + now.timestamp() * TICKS_PER_SECOND
        + i64::from(now.timestamp_subsec_nanos() / 100)
}
