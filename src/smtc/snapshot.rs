// Session snapshot builder
use serde::{Serialize, Serializer};

use crate::error::BridgeResult;
use crate::settings::TimeoutSettings;
use crate::smtc::platform::{
    MediaPlatform, MediaSession, PlaybackStatus, SessionList, SessionManager, Timeline,
    TICKS_PER_SECOND,
};
use crate::smtc::thumbnail::read_thumbnail;
use crate::smtc::wait::wait_or_cancel;

/// Point-in-time copy of one session's displayable state.
///
/// `index` is the session's position in the list it was read from. It is
/// not a stable identity: the list can change before the next call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub index: u32,
    pub source_app: String,
    pub artist: String,
    pub title: String,
    #[serde(rename = "thumbnail_bytes", serialize_with = "serialize_len")]
    pub thumbnail: Vec<u8>,
    pub duration_seconds: i64,
    pub position_seconds: i64,
    pub is_playing: bool,
}

fn serialize_len<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(bytes.len() as u64)
}

fn whole_seconds(ticks: i64) -> i64 {
    (ticks / TICKS_PER_SECOND).max(0)
}

impl Timeline {
    pub fn duration_seconds(&self) -> i64 {
        whole_seconds(self.end_ticks.saturating_sub(self.start_ticks))
    }

    /// Playing sessions are extrapolated from the last update using
    /// `now_ticks`; paused ones report the stored position as is.
    pub fn position_seconds(&self, is_playing: bool, now_ticks: i64) -> i64 {
        let ticks = if is_playing {
            now_ticks
                .saturating_sub(self.last_updated_ticks)
                .saturating_add(self.position_ticks)
        } else {
            self.position_ticks
        };
        whole_seconds(ticks)
    }
}

/// Snapshot every live session.
///
/// `None` when the session manager can't be acquired in time or any native
/// call fails mid-way; a partial list is never returned.
pub fn build_snapshots<P: MediaPlatform>(
    platform: &P,
    timeouts: &TimeoutSettings,
) -> Option<Vec<SessionSnapshot>> {
    match try_build_snapshots(platform, timeouts) {
        Ok(snapshots) => snapshots,
        Err(e) => {
            tracing::warn!(error = %e, "session enumeration failed");
            None
        }
    }
}

fn try_build_snapshots<P: MediaPlatform>(
    platform: &P,
    timeouts: &TimeoutSettings,
) -> BridgeResult<Option<Vec<SessionSnapshot>>> {
    tracing::debug!("acquiring session manager");
    let Some(manager) = wait_or_cancel(platform.request_manager()?, timeouts.manager())? else {
        tracing::warn!("session manager not available in time");
        return Ok(None);
    };

    let sessions = manager.sessions()?;
    let count = sessions.size()?;
    tracing::debug!(count, "enumerating sessions");

    let mut snapshots = Vec::with_capacity(count as usize);
    for index in 0..count {
        let session = sessions.get_at(index)?;
        snapshots.push(snapshot_session(platform, index, &session, timeouts)?);
    }

    Ok(Some(snapshots))
}

fn snapshot_session<P: MediaPlatform, S: MediaSession>(
    platform: &P,
    index: u32,
    session: &S,
    timeouts: &TimeoutSettings,
) -> BridgeResult<SessionSnapshot> {
    let source_app = session.source_app()?;
    let properties = session.media_properties()?;
    let timeline = session.timeline()?;
    let is_playing = session.playback_status()? == PlaybackStatus::Playing;

    tracing::debug!(index, %source_app, "reading thumbnail");
    let thumbnail = read_thumbnail(properties.thumbnail.as_ref(), timeouts.thumbnail())?;

    Ok(SessionSnapshot {
        index,
        source_app,
        artist: properties.artist,
        title: properties.title,
        thumbnail,
        duration_seconds: timeline.duration_seconds(),
        position_seconds: timeline.position_seconds(is_playing, platform.now()),
        is_playing,
    })
}
