/// Handle for one registered frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Single-slot registry for the next display frame
///
/// Mirrors a request/cancel animation-frame API on a single thread: at most
/// one callback is registered at a time, and cancelling removes it outright
/// so a cancelled frame can never be taken by the host loop.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: Option<FrameHandle>,
    fired: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the next frame, replacing any registration still pending
    pub fn request(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        if let Some(replaced) = self.pending.replace(handle) {
            log::trace!("Frame {} replaced by {}", replaced.id(), handle.id());
        }
        handle
    }

    /// Deschedule `handle`; returns false if it was not the pending frame
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Consume the pending registration so its callback can run
    pub fn take(&mut self) -> Option<FrameHandle> {
        let handle = self.pending.take()?;
        self.fired += 1;
        Some(handle)
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending == Some(handle)
    }

    pub fn pending_count(&self) -> usize {
        usize::from(self.pending.is_some())
    }

    /// Number of callbacks consumed so far
    pub fn fired(&self) -> u64 {
        self.fired
    }
}
