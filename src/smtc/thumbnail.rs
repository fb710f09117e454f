// Thumbnail extraction
use std::time::Duration;

use crate::error::{BridgeError, BridgeResult};
use crate::smtc::platform::{StreamReader, Thumbnail, ThumbnailStream};
use crate::smtc::wait::wait_or_cancel;

/// Largest thumbnail that is read. The JVM side stores the length in a
/// signed 32-bit int.
pub const MAX_THUMBNAIL_LEN: u64 = (u32::MAX >> 1) as u64;

/// Owns an open stream and its reader; closes both exactly once, on
/// whichever path leaves the thumbnail step.
struct StreamGuard<S: ThumbnailStream> {
    stream: S,
    reader: Option<S::Reader>,
    closed: bool,
}

impl<S: ThumbnailStream> StreamGuard<S> {
    fn new(stream: S) -> Self {
        Self {
            stream,
            reader: None,
            closed: false,
        }
    }

    fn read_all(&mut self) -> BridgeResult<Vec<u8>> {
        let len = self.stream.size()?;
        if len > MAX_THUMBNAIL_LEN {
            tracing::debug!(len, "thumbnail too large, skipping");
            return Ok(Vec::new());
        }

        let len = len as u32;
        let reader = self.reader.insert(self.stream.reader()?);
        let loaded = reader.load(len)?;
        if loaded < len {
            return Err(BridgeError::native(format!(
                "thumbnail stream ended after {} of {} bytes",
                loaded, len
            )));
        }

        let mut buffer = vec![0u8; len as usize];
        reader.read_bytes(&mut buffer)?;
        Ok(buffer)
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        // Reader first, it wraps the stream
        if let Some(reader) = self.reader.take() {
            if let Err(e) = reader.close() {
                tracing::warn!(error = %e, "failed to close thumbnail reader");
            }
        }
        if let Err(e) = self.stream.close() {
            tracing::warn!(error = %e, "failed to close thumbnail stream");
        }
    }
}

impl<S: ThumbnailStream> Drop for StreamGuard<S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Read a thumbnail fully into memory.
///
/// No thumbnail, a stream that fails or doesn't open within `limit`, or a
/// stream longer than [`MAX_THUMBNAIL_LEN`] all give an empty buffer.
/// Native failures once the stream is open are returned after it is closed.
pub fn read_thumbnail<T: Thumbnail>(thumbnail: Option<&T>, limit: Duration) -> BridgeResult<Vec<u8>> {
    let Some(thumbnail) = thumbnail else {
        return Ok(Vec::new());
    };

    let Some(stream) = open_stream(thumbnail, limit) else {
        return Ok(Vec::new());
    };

    let mut guard = StreamGuard::new(stream);
    let bytes = guard.read_all()?;
    guard.close();
    Ok(bytes)
}

fn open_stream<T: Thumbnail>(thumbnail: &T, limit: Duration) -> Option<T::Stream> {
    let opened = thumbnail
        .open_read()
        .and_then(|request| wait_or_cancel(request, limit));

    match opened {
        Ok(Some(stream)) => Some(stream),
        Ok(None) => {
            tracing::debug!("thumbnail stream did not open in time");
            None
        }
        Err(e) => {
            tracing::debug!(error = %e, "thumbnail stream failed to open");
            None
        }
    }
}
