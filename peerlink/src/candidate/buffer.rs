use std::collections::VecDeque;

use super::IceCandidate;

/// Holds remote candidates that arrive ahead of the remote description.
///
/// A candidate cannot be applied before the remote description it belongs
/// to has been committed, yet with trickle delivery it routinely arrives
/// first. The buffer absorbs those early candidates in arrival order and
/// releases them exactly once, the instant the remote description lands.
/// From then on it is a pass-through: later candidates are handed straight
/// back to the caller for immediate application and are never re-buffered.
///
/// The flush is monotone. A second commit notification yields nothing, so
/// no candidate can be applied twice through this path.
#[derive(Default, Debug)]
pub struct IceCandidateBuffer {
    pending: VecDeque<IceCandidate>,
    flushed: bool,
    discarded: bool,
}

impl IceCandidateBuffer {
    pub fn new() -> Self {
        IceCandidateBuffer::default()
    }

    /// Accepts a remote candidate.
    ///
    /// Returns the candidate back once the buffer has flushed, meaning the
    /// caller applies it immediately. Returns `None` when the candidate was
    /// queued, or dropped because the buffer was discarded.
    pub fn enqueue(&mut self, candidate: IceCandidate) -> Option<IceCandidate> {
        if self.discarded {
            return None;
        }
        if self.flushed {
            return Some(candidate);
        }
        self.pending.push_back(candidate);
        None
    }

    /// Releases the queued candidates in arrival order.
    ///
    /// Called when a remote description has been committed. Only the first
    /// call yields candidates; every later call returns an empty queue.
    pub fn on_remote_description_committed(&mut self) -> VecDeque<IceCandidate> {
        if self.flushed || self.discarded {
            return VecDeque::new();
        }
        self.flushed = true;
        std::mem::take(&mut self.pending)
    }

    /// Drops every pending candidate and refuses all future ones.
    ///
    /// Called on session teardown. Returns how many candidates were
    /// discarded.
    pub fn discard(&mut self) -> usize {
        self.discarded = true;
        let discarded = self.pending.len();
        self.pending.clear();
        discarded
    }

    /// Number of candidates currently queued.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether the one-shot flush has already happened.
    pub fn is_flushed(&self) -> bool {
        self.flushed
    }
}
