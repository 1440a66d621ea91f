//! Frame scheduling for animation loops.
//!
//! The terminal has no display-refresh callback, so the UI loop drives a
//! [`FrameLoop`] from a fixed-interval timer instead. Each running animation
//! holds a [`LoopToken`]; delivering a frame consumes the token's pending
//! request and the animation re-requests the next one after drawing.

use std::collections::HashSet;

use tracing::trace;

/// Opaque handle identifying one repeating redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopToken(u64);

impl LoopToken {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Queue of next-frame requests.
///
/// Cancelling a token stops future requests from being accepted but leaves a
/// request that is already queued in place, the same way a host may still
/// deliver a frame callback that was scheduled before cancellation. Consumers
/// must check [`FrameLoop::is_live`] before acting on a delivered token.
#[derive(Debug, Default)]
pub struct FrameLoop {
    next_token: u64,
    live: HashSet<LoopToken>,
    queued: Vec<LoopToken>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new loop and request its first frame.
    pub fn start(&mut self) -> LoopToken {
        self.next_token += 1;
        let token = LoopToken(self.next_token);
        self.live.insert(token);
        self.queued.push(token);
        token
    }

    /// Request one more frame for `token`.
    ///
    /// Returns `false` if the loop was cancelled.
    pub fn request(&mut self, token: LoopToken) -> bool {
        if !self.live.contains(&token) {
            trace!(token = token.0, "frame request for cancelled loop ignored");
            return false;
        }
        self.queued.push(token);
        true
    }

    /// Cancel a loop. Returns `false` if it was not running.
    pub fn cancel(&mut self, token: LoopToken) -> bool {
        self.live.remove(&token)
    }

    pub fn is_live(&self, token: LoopToken) -> bool {
        self.live.contains(&token)
    }

    /// Take every request queued for this frame.
    pub fn take_due(&mut self) -> Vec<LoopToken> {
        std::mem::take(&mut self.queued)
    }

    /// Number of loops that have not been cancelled.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of queued requests, including stale ones.
    pub fn pending(&self) -> usize {
        self.queued.len()
    }
}
