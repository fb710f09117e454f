// In-memory media platform for tests
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{BridgeError, BridgeResult};
use crate::smtc::platform::*;

enum Outcome<T> {
    Ready(BridgeResult<T>),
    Hang,
}

/// Operation that completes immediately, fails, or never completes
pub struct FakeOp<T> {
    outcome: Arc<Mutex<Option<Outcome<T>>>>,
    cancelled: Arc<AtomicBool>,
}

impl<T> Clone for FakeOp<T> {
    fn clone(&self) -> Self {
        Self {
            outcome: self.outcome.clone(),
            cancelled: self.cancelled.clone(),
        }
    }
}

impl<T: 'static> FakeOp<T> {
    fn with(outcome: Outcome<T>) -> Self {
        Self {
            outcome: Arc::new(Mutex::new(Some(outcome))),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn ready(value: T) -> Self {
        Self::with(Outcome::Ready(Ok(value)))
    }

    pub fn failing(message: &str) -> Self {
        Self::with(Outcome::Ready(Err(BridgeError::native(message))))
    }

    pub fn hanging() -> Self {
        Self::with(Outcome::Hang)
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl<T: 'static> PendingOperation for FakeOp<T> {
    type Output = T;

    fn into_completion(self) -> OperationFuture<T> {
        let outcome = self.outcome.lock().unwrap().take();
        match outcome {
            Some(Outcome::Ready(result)) => Box::pin(async move { result }),
            Some(Outcome::Hang) | None => Box::pin(std::future::pending::<BridgeResult<T>>()),
        }
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Everything the fakes observed
#[derive(Debug, Default)]
pub struct Journal {
    pub manager_requests: usize,
    pub streams_opened: usize,
    pub stream_closes: usize,
    pub reader_closes: usize,
    pub reads: usize,
    pub actions: Vec<(String, SessionAction)>,
}

pub type SharedJournal = Arc<Mutex<Journal>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Ready,
    Hang,
    Fail,
}

#[derive(Clone)]
pub struct FakeThumbnail {
    pub len: u64,
    pub open: Behavior,
    pub fail_read: bool,
    pub fail_close: bool,
    pub short_load: Option<u32>,
    journal: SharedJournal,
    last_open: Arc<Mutex<Option<FakeOp<FakeStream>>>>,
}

impl FakeThumbnail {
    pub fn with_len(len: u64) -> Self {
        Self {
            len,
            open: Behavior::Ready,
            fail_read: false,
            fail_close: false,
            short_load: None,
            journal: SharedJournal::default(),
            last_open: Arc::default(),
        }
    }

    pub fn open_was_cancelled(&self) -> bool {
        self.last_open
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|op| op.was_cancelled())
    }

    pub fn open(mut self, open: Behavior) -> Self {
        self.open = open;
        self
    }

    pub fn fail_read(mut self) -> Self {
        self.fail_read = true;
        self
    }

    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Reader loads at most `loaded` bytes
    pub fn short_load(mut self, loaded: u32) -> Self {
        self.short_load = Some(loaded);
        self
    }

    pub fn journal(&self) -> MutexGuard<'_, Journal> {
        self.journal.lock().unwrap()
    }

    fn attach(&mut self, journal: &SharedJournal) {
        self.journal = journal.clone();
    }
}

#[derive(Clone)]
pub struct FakeStream {
    thumbnail: FakeThumbnail,
}

pub struct FakeReader {
    thumbnail: FakeThumbnail,
}

impl Thumbnail for FakeThumbnail {
    type Stream = FakeStream;
    type OpenRequest = FakeOp<FakeStream>;

    fn open_read(&self) -> BridgeResult<FakeOp<FakeStream>> {
        let stream = FakeStream {
            thumbnail: self.clone(),
        };
        let op = match self.open {
            Behavior::Ready => {
                self.journal().streams_opened += 1;
                FakeOp::ready(stream)
            }
            Behavior::Hang => FakeOp::hanging(),
            Behavior::Fail => FakeOp::failing("thumbnail unavailable"),
        };
        *self.last_open.lock().unwrap() = Some(op.clone());
        Ok(op)
    }
}

impl ThumbnailStream for FakeStream {
    type Reader = FakeReader;

    fn size(&self) -> BridgeResult<u64> {
        Ok(self.thumbnail.len)
    }

    fn reader(&self) -> BridgeResult<FakeReader> {
        Ok(FakeReader {
            thumbnail: self.thumbnail.clone(),
        })
    }

    fn close(&self) -> BridgeResult<()> {
        self.thumbnail.journal().stream_closes += 1;
        if self.thumbnail.fail_close {
            return Err(BridgeError::native("stream already disposed"));
        }
        Ok(())
    }
}

impl StreamReader for FakeReader {
    fn load(&self, count: u32) -> BridgeResult<u32> {
        Ok(self.thumbnail.short_load.map_or(count, |loaded| loaded.min(count)))
    }

    fn read_bytes(&self, buffer: &mut [u8]) -> BridgeResult<()> {
        self.thumbnail.journal().reads += 1;
        if self.thumbnail.fail_read {
            return Err(BridgeError::native("read failed"));
        }
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = i as u8;
        }
        Ok(())
    }

    fn close(&self) -> BridgeResult<()> {
        self.thumbnail.journal().reader_closes += 1;
        Ok(())
    }
}

#[derive(Clone)]
pub struct FakeSession {
    pub source_app: String,
    pub title: String,
    pub artist: String,
    pub status: PlaybackStatus,
    pub timeline: Timeline,
    pub thumbnail: Option<FakeThumbnail>,
    pub fail_properties: bool,
    pub action: Behavior,
    pub action_result: bool,
    journal: SharedJournal,
}

impl FakeSession {
    pub fn new(source_app: &str) -> Self {
        Self {
            source_app: source_app.to_string(),
            title: String::new(),
            artist: String::new(),
            status: PlaybackStatus::Paused,
            timeline: Timeline::default(),
            thumbnail: None,
            fail_properties: false,
            action: Behavior::Ready,
            action_result: true,
            journal: SharedJournal::default(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn artist(mut self, artist: &str) -> Self {
        self.artist = artist.to_string();
        self
    }

    pub fn status(mut self, status: PlaybackStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = timeline;
        self
    }

    pub fn thumbnail(mut self, thumbnail: FakeThumbnail) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    pub fn fail_properties(mut self) -> Self {
        self.fail_properties = true;
        self
    }

    pub fn action(mut self, action: Behavior, result: bool) -> Self {
        self.action = action;
        self.action_result = result;
        self
    }
}

impl MediaSession for FakeSession {
    type Thumbnail = FakeThumbnail;
    type ActionRequest = FakeOp<bool>;

    fn source_app(&self) -> BridgeResult<String> {
        Ok(self.source_app.clone())
    }

    fn media_properties(&self) -> BridgeResult<MediaProperties<FakeThumbnail>> {
        if self.fail_properties {
            return Err(BridgeError::native("media properties unavailable"));
        }
        Ok(MediaProperties {
            title: self.title.clone(),
            artist: self.artist.clone(),
            thumbnail: self.thumbnail.clone(),
        })
    }

    fn timeline(&self) -> BridgeResult<Timeline> {
        Ok(self.timeline)
    }

    fn playback_status(&self) -> BridgeResult<PlaybackStatus> {
        Ok(self.status)
    }

    fn request_action(&self, action: SessionAction) -> BridgeResult<FakeOp<bool>> {
        self.journal
            .lock()
            .unwrap()
            .actions
            .push((self.source_app.clone(), action));
        Ok(match self.action {
            Behavior::Ready => FakeOp::ready(self.action_result),
            Behavior::Hang => FakeOp::hanging(),
            Behavior::Fail => FakeOp::failing("action rejected"),
        })
    }
}

#[derive(Clone)]
pub struct FakeSessions(Arc<Vec<FakeSession>>);

impl SessionList for FakeSessions {
    type Session = FakeSession;

    fn size(&self) -> BridgeResult<u32> {
        Ok(self.0.len() as u32)
    }

    fn get_at(&self, index: u32) -> BridgeResult<FakeSession> {
        self.0
            .get(index as usize)
            .cloned()
            .ok_or_else(|| BridgeError::native("index out of bounds"))
    }
}

#[derive(Clone)]
pub struct FakeManager {
    sessions: FakeSessions,
}

impl SessionManager for FakeManager {
    type Sessions = FakeSessions;

    fn sessions(&self) -> BridgeResult<FakeSessions> {
        Ok(self.sessions.clone())
    }
}

pub struct FakePlatform {
    pub manager: Behavior,
    pub now: i64,
    sessions: Mutex<Vec<FakeSession>>,
    journal: SharedJournal,
    last_request: Mutex<Option<FakeOp<FakeManager>>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            manager: Behavior::Ready,
            now: UNIX_EPOCH_TICKS,
            sessions: Mutex::new(Vec::new()),
            journal: SharedJournal::default(),
            last_request: Mutex::new(None),
        }
    }

    pub fn with_session(self, session: FakeSession) -> Self {
        let session = self.attach(session);
        self.sessions.lock().unwrap().push(session);
        self
    }

    /// Replace the live session list, as the host does when apps come and go
    pub fn set_sessions(&self, sessions: Vec<FakeSession>) {
        let sessions: Vec<_> = sessions.into_iter().map(|s| self.attach(s)).collect();
        *self.sessions.lock().unwrap() = sessions;
    }

    fn attach(&self, mut session: FakeSession) -> FakeSession {
        session.journal = self.journal.clone();
        if let Some(thumbnail) = session.thumbnail.as_mut() {
            thumbnail.attach(&self.journal);
        }
        session
    }

    pub fn manager(mut self, manager: Behavior) -> Self {
        self.manager = manager;
        self
    }

    pub fn at(mut self, now: i64) -> Self {
        self.now = now;
        self
    }

    pub fn journal(&self) -> MutexGuard<'_, Journal> {
        self.journal.lock().unwrap()
    }

    /// The attached thumbnail of the session at `index`
    pub fn thumbnail_of(&self, index: usize) -> FakeThumbnail {
        self.sessions.lock().unwrap()[index]
            .thumbnail
            .clone()
            .expect("session has no thumbnail")
    }

    pub fn manager_request_cancelled(&self) -> bool {
        self.last_request
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|op| op.was_cancelled())
    }
}

impl MediaPlatform for FakePlatform {
    type Manager = FakeManager;
    type ManagerRequest = FakeOp<FakeManager>;

    fn request_manager(&self) -> BridgeResult<FakeOp<FakeManager>> {
        self.journal().manager_requests += 1;
        let manager = FakeManager {
            sessions: FakeSessions(Arc::new(self.sessions.lock().unwrap().clone())),
        };
        let op = match self.manager {
            Behavior::Ready => FakeOp::ready(manager),
            Behavior::Hang => FakeOp::hanging(),
            Behavior::Fail => FakeOp::failing("manager unavailable"),
        };
        *self.last_request.lock().unwrap() = Some(op.clone());
        Ok(op)
    }

    fn now(&self) -> i64 {
        self.now
    }
}
