// Windows SMTC backend using windows-rs
use windows::core::{Interface, RuntimeType};
use windows::Foundation::Collections::IVectorView;
use windows::Media::Control::{
    GlobalSystemMediaTransportControlsSession, GlobalSystemMediaTransportControlsSessionManager,
};
use windows::Storage::Streams::{
    DataReader, IRandomAccessStreamReference, IRandomAccessStreamWithContentType,
};
use windows_future::IAsyncOperation;

use crate::error::{BridgeError, BridgeResult};
use crate::smtc::platform::*;

/// A running WinRT `IAsyncOperation`
pub struct WinOperation<T: RuntimeType + 'static>(IAsyncOperation<T>);

impl<T: RuntimeType + 'static> Clone for WinOperation<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: RuntimeType + 'static> PendingOperation for WinOperation<T> {
    type Output = T;

    fn into_completion(self) -> OperationFuture<T> {
        Box::pin(async move { self.0.await.map_err(BridgeError::from) })
    }

    fn cancel(&self) {
        if let Err(e) = self.0.Cancel() {
            tracing::debug!(error = %e, "failed to cancel native operation");
        }
    }
}

/// The host's global media session registry
#[derive(Debug, Default, Clone, Copy)]
pub struct WinPlatform;

pub type NativePlatform = WinPlatform;

impl MediaPlatform for WinPlatform {
    type Manager = GlobalSystemMediaTransportControlsSessionManager;
    type ManagerRequest = WinOperation<GlobalSystemMediaTransportControlsSessionManager>;

    fn request_manager(&self) -> BridgeResult<Self::ManagerRequest> {
        Ok(WinOperation(
            GlobalSystemMediaTransportControlsSessionManager::RequestAsync()?,
        ))
    }
}

impl SessionManager for GlobalSystemMediaTransportControlsSessionManager {
    type Sessions = IVectorView<GlobalSystemMediaTransportControlsSession>;

    fn sessions(&self) -> BridgeResult<Self::Sessions> {
        Ok(self.GetSessions()?)
    }
}

impl SessionList for IVectorView<GlobalSystemMediaTransportControlsSession> {
    type Session = GlobalSystemMediaTransportControlsSession;

    fn size(&self) -> BridgeResult<u32> {
        Ok(self.Size()?)
    }

    fn get_at(&self, index: u32) -> BridgeResult<Self::Session> {
        Ok(self.GetAt(index)?)
    }
}

impl MediaSession for GlobalSystemMediaTransportControlsSession {
    type Thumbnail = IRandomAccessStreamReference;
    type ActionRequest = WinOperation<bool>;

    fn source_app(&self) -> BridgeResult<String> {
        Ok(self.SourceAppUserModelId()?.to_string_lossy())
    }

    fn media_properties(&self) -> BridgeResult<MediaProperties<Self::Thumbnail>> {
        let props = self.TryGetMediaPropertiesAsync()?.get()?;

        Ok(MediaProperties {
            title: props.Title()?.to_string_lossy(),
            artist: props.Artist()?.to_string_lossy(),
            // A null reference surfaces as an error here
            thumbnail: props.Thumbnail().ok(),
        })
    }

    fn timeline(&self) -> BridgeResult<Timeline> {
        let timeline = self.GetTimelineProperties()?;

        Ok(Timeline {
            start_ticks: timeline.StartTime()?.Duration,
            end_ticks: timeline.EndTime()?.Duration,
            position_ticks: timeline.Position()?.Duration,
            last_updated_ticks: timeline.LastUpdatedTime()?.UniversalTime,
        })
    }

    fn playback_status(&self) -> BridgeResult<PlaybackStatus> {
        let status = self.GetPlaybackInfo()?.PlaybackStatus()?;
        Ok(PlaybackStatus::from_raw(status.0))
    }

    fn request_action(&self, action: SessionAction) -> BridgeResult<WinOperation<bool>> {
        let op = match action {
            SessionAction::Next => self.TrySkipNextAsync()?,
            SessionAction::Previous => self.TrySkipPreviousAsync()?,
            SessionAction::Play => self.TryPlayAsync()?,
            SessionAction::Pause => self.TryPauseAsync()?,
            SessionAction::TogglePlayPause => self.TryTogglePlayPauseAsync()?,
            SessionAction::Stop => self.TryStopAsync()?,
        };
        Ok(WinOperation(op))
    }
}

impl Thumbnail for IRandomAccessStreamReference {
    type Stream = IRandomAccessStreamWithContentType;
    type OpenRequest = WinOperation<IRandomAccessStreamWithContentType>;

    fn open_read(&self) -> BridgeResult<Self::OpenRequest> {
        Ok(WinOperation(self.OpenReadAsync()?))
    }
}

impl ThumbnailStream for IRandomAccessStreamWithContentType {
    type Reader = DataReader;

    fn size(&self) -> BridgeResult<u64> {
        Ok(self.Size()?)
    }

    fn reader(&self) -> BridgeResult<DataReader> {
        Ok(DataReader::CreateDataReader(self)?)
    }

    fn close(&self) -> BridgeResult<()> {
        Ok(self.Close()?)
    }
}

impl StreamReader for DataReader {
    fn load(&self, count: u32) -> BridgeResult<u32> {
        let op: IAsyncOperation<u32> = self.LoadAsync(count)?.cast()?;
        Ok(op.get()?)
    }

    fn read_bytes(&self, buffer: &mut [u8]) -> BridgeResult<()> {
        Ok(self.ReadBytes(buffer)?)
    }

    fn close(&self) -> BridgeResult<()> {
        Ok(self.Close()?)
    }
}
