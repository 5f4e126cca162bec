//! Host animation scheduling.
//!
//! The engine does no timing of its own. After every tick it asks the host
//! for another frame through [`AnimationHost::request_frame`], and the host
//! calls [`Engine::tick`](crate::Engine::tick) when that frame comes around.
//! Teardown cancels the outstanding request.

/// Handle for one outstanding frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// The host's per-frame callback primitive.
pub trait AnimationHost {
    /// Ask for the engine to be ticked on the next frame.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraw a request made by [`AnimationHost::request_frame`].
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// A host driven by hand, for headless use and tests.
///
/// Requests are only recorded; the caller decides when to tick.
#[derive(Debug, Default)]
pub struct ManualHost {
    next_id: u64,
    pending: Option<FrameRequest>,
    requested: u64,
    cancelled: u64,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// The outstanding request, if any.
    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Total requests made.
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Total requests cancelled.
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }

    /// Mark the pending request as delivered. Returns `false` if none was pending.
    pub fn deliver(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

impl AnimationHost for ManualHost {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        self.requested += 1;
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}
