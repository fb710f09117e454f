// Windows System Media Transport Controls (SMTC) session access
// Enumerates media sessions and forwards transport commands to them

pub mod dispatch;
pub mod platform;
pub mod snapshot;
pub mod thumbnail;
pub mod wait;

#[cfg(test)]
pub(crate) mod fake;

#[cfg(windows)]
mod windows_smtc;

#[cfg(windows)]
pub use windows_smtc::*;

pub use dispatch::dispatch;
pub use platform::{MediaPlatform, SessionAction};
pub use snapshot::{build_snapshots, SessionSnapshot};

// Stub for non-Windows platforms: the session manager is never available
#[cfg(not(windows))]
mod stub {
    use std::marker::PhantomData;

    use crate::error::{BridgeError, BridgeResult};
    use crate::smtc::platform::*;

    /// Uninhabited: no native object ever exists off Windows
    #[derive(Debug, Clone, Copy)]
    pub enum Unsupported {}

    pub struct NoOperation<T>(Unsupported, PhantomData<T>);

    impl<T> Clone for NoOperation<T> {
        fn clone(&self) -> Self {
            match self.0 {}
        }
    }

    impl<T: 'static> PendingOperation for NoOperation<T> {
        type Output = T;

        fn into_completion(self) -> OperationFuture<T> {
            match self.0 {}
        }

        fn cancel(&self) {
            match self.0 {}
        }
    }

    impl SessionManager for Unsupported {
        type Sessions = Unsupported;

        fn sessions(&self) -> BridgeResult<Unsupported> {
            match *self {}
        }
    }

    impl SessionList for Unsupported {
        type Session = Unsupported;

        fn size(&self) -> BridgeResult<u32> {
            match *self {}
        }

        fn get_at(&self, _index: u32) -> BridgeResult<Unsupported> {
            match *self {}
        }
    }

    impl MediaSession for Unsupported {
        type Thumbnail = Unsupported;
        type ActionRequest = NoOperation<bool>;

        fn source_app(&self) -> BridgeResult<String> {
            match *self {}
        }

        fn media_properties(&self) -> BridgeResult<MediaProperties<Unsupported>> {
            match *self {}
        }

        fn timeline(&self) -> BridgeResult<Timeline> {
            match *self {}
        }

        fn playback_status(&self) -> BridgeResult<PlaybackStatus> {
            match *self {}
        }

        fn request_action(&self, _action: SessionAction) -> BridgeResult<NoOperation<bool>> {
            match *self {}
        }
    }

    impl Thumbnail for Unsupported {
        type Stream = Unsupported;
        type OpenRequest = NoOperation<Unsupported>;

        fn open_read(&self) -> BridgeResult<NoOperation<Unsupported>> {
            match *self {}
        }
    }

    impl ThumbnailStream for Unsupported {
        type Reader = Unsupported;

        fn size(&self) -> BridgeResult<u64> {
            match *self {}
        }

        fn reader(&self) -> BridgeResult<Unsupported> {
            match *self {}
        }

        fn close(&self) -> BridgeResult<()> {
            match *self {}
        }
    }

    impl StreamReader for Unsupported {
        fn load(&self, _count: u32) -> BridgeResult<u32> {
            match *self {}
        }

        fn read_bytes(&self, _buffer: &mut [u8]) -> BridgeResult<()> {
            match *self {}
        }

        fn close(&self) -> BridgeResult<()> {
            match *self {}
        }
    }

    #[derive(Debug, Default, Clone, Copy)]
    pub struct UnsupportedPlatform;

    pub type NativePlatform = UnsupportedPlatform;

    impl MediaPlatform for UnsupportedPlatform {
        type Manager = Unsupported;
        type ManagerRequest = NoOperation<Unsupported>;

        fn request_manager(&self) -> BridgeResult<NoOperation<Unsupported>> {
            Err(BridgeError::native(
                "System Media Transport Controls are only available on Windows",
            ))
        }
    }

}

#[cfg(not(windows))]
pub use stub::*;
