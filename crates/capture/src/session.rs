//! Capture session lifecycle

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    CaptureError, CaptureOptions, CaptureProvider, CaptureResult, FrameSource, RawFrame,
    VideoStream,
};

/// Unique capture session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stream handle shared between the session and its bound source.
///
/// `release` is the single teardown point: it flips the active flag and
/// drops the stream, so readers holding the `Arc` observe
/// `SourceUnavailable` on their very next access.
struct SharedStream {
    stream: Mutex<Option<Box<dyn VideoStream>>>,
    active: AtomicBool,
}

impl SharedStream {
    fn new(stream: Box<dyn VideoStream>) -> Self {
        Self {
            stream: Mutex::new(Some(stream)),
            active: AtomicBool::new(true),
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn release(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.stream.lock().take();
    }

    fn with_stream<T>(&self, f: impl FnOnce(&dyn VideoStream) -> T) -> CaptureResult<T> {
        if !self.is_active() {
            return Err(CaptureError::SourceUnavailable);
        }
        let guard = self.stream.lock();
        match guard.as_deref() {
            Some(stream) => Ok(f(stream)),
            None => Err(CaptureError::SourceUnavailable),
        }
    }
}

/// One active screen-share
pub struct CaptureSession {
    id: SessionId,
    shared: Arc<SharedStream>,
}

impl CaptureSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.shared.is_active()
    }
}

/// The frame-source slot a scan controller binds to.
///
/// The slot itself is long-lived; the session behind it comes and goes.
/// While no active session is bound, every access fails with
/// `SourceUnavailable` instead of reading stale state.
pub struct BoundSource {
    shared: RwLock<Option<Arc<SharedStream>>>,
}

impl BoundSource {
    fn new() -> Self {
        Self {
            shared: RwLock::new(None),
        }
    }

    fn bind(&self, shared: Arc<SharedStream>) {
        *self.shared.write() = Some(shared);
    }

    fn unbind(&self) {
        self.shared.write().take();
    }

    fn with_stream<T>(&self, f: impl FnOnce(&dyn VideoStream) -> T) -> CaptureResult<T> {
        let guard = self.shared.read();
        match guard.as_ref() {
            Some(shared) => shared.with_stream(f),
            None => Err(CaptureError::SourceUnavailable),
        }
    }
}

impl FrameSource for BoundSource {
    fn current_dimensions(&self) -> CaptureResult<(u32, u32)> {
        self.with_stream(|stream| stream.dimensions())
    }

    fn current_frame(&self) -> CaptureResult<RawFrame> {
        self.with_stream(|stream| stream.current_frame())?
    }
}

/// Owns the capture session lifecycle.
///
/// At most one session is active at a time; `stop` is idempotent and
/// guarantees the bound source reports `SourceUnavailable` from the
/// moment it returns.
pub struct SessionManager {
    provider: Arc<dyn CaptureProvider>,
    options: CaptureOptions,
    session: Mutex<Option<CaptureSession>>,
    source: Arc<BoundSource>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn CaptureProvider>) -> Self {
        Self::with_options(provider, CaptureOptions::default())
    }

    pub fn with_options(provider: Arc<dyn CaptureProvider>, options: CaptureOptions) -> Self {
        Self {
            provider,
            options,
            session: Mutex::new(None),
            source: Arc::new(BoundSource::new()),
        }
    }

    /// The frame-source slot; stable across session start/stop
    pub fn source(&self) -> Arc<BoundSource> {
        self.source.clone()
    }

    pub fn is_active(&self) -> bool {
        self.session
            .lock()
            .as_ref()
            .is_some_and(|session| session.is_active())
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.lock().as_ref().map(|session| session.id())
    }

    /// Acquire a stream from the provider and bind it as the active
    /// session. Fails with `AlreadyActive` if one is still running.
    pub fn start(&self) -> CaptureResult<SessionId> {
        let mut slot = self.session.lock();
        if slot.as_ref().is_some_and(|session| session.is_active()) {
            return Err(CaptureError::AlreadyActive);
        }

        let mut options = self.options.clone();
        options.audio = false;

        let stream = self.provider.request_capture(&options).inspect_err(|err| {
            warn!("Capture acquisition failed: {}", err);
        })?;

        let session = CaptureSession {
            id: SessionId::new(),
            shared: Arc::new(SharedStream::new(stream)),
        };
        let id = session.id();

        self.source.bind(session.shared.clone());
        *slot = Some(session);

        info!("Capture session {} started", id);
        Ok(id)
    }

    /// Release the active session and its stream. Calling `stop` with no
    /// active session is a no-op.
    pub fn stop(&self) {
        let mut slot = self.session.lock();
        match slot.take() {
            Some(session) => {
                session.shared.release();
                self.source.unbind();
                info!("Capture session {} stopped", session.id());
            }
            None => debug!("Stop requested with no active session"),
        }
    }
}
