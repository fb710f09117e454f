// Transport command dispatch
use crate::error::BridgeResult;
use crate::settings::TimeoutSettings;
use crate::smtc::platform::{MediaPlatform, MediaSession, SessionAction, SessionList, SessionManager};
use crate::smtc::wait::wait_or_cancel;

/// Send `action` to the session currently at `index`.
///
/// The index is checked against the live list, not the one a snapshot was
/// taken from, so a changed list can route the command to another session.
/// Every failure (unavailable manager, bad index, native error, timeout)
/// reads as `false`.
pub fn dispatch<P: MediaPlatform>(
    platform: &P,
    index: i32,
    action: SessionAction,
    timeouts: &TimeoutSettings,
) -> bool {
    match try_dispatch(platform, index, action, timeouts) {
        Ok(accepted) => accepted,
        Err(e) => {
            tracing::warn!(index, action = action.name(), error = %e, "session action failed");
            false
        }
    }
}

fn try_dispatch<P: MediaPlatform>(
    platform: &P,
    index: i32,
    action: SessionAction,
    timeouts: &TimeoutSettings,
) -> BridgeResult<bool> {
    let Some(manager) = wait_or_cancel(platform.request_manager()?, timeouts.manager())? else {
        tracing::warn!(action = action.name(), "session manager not available in time");
        return Ok(false);
    };

    let sessions = manager.sessions()?;
    let size = sessions.size()?;
    let index = match u32::try_from(index) {
        Ok(index) if index < size => index,
        _ => {
            tracing::debug!(index, size, "session not found");
            return Ok(false);
        }
    };

    let session = sessions.get_at(index)?;
    let accepted = wait_or_cancel(session.request_action(action)?, timeouts.manager())?;
    Ok(accepted.unwrap_or(false))
}
