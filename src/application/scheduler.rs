//! Coalescing of throttled redraws into one pending display frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::domain::logging::LogComponent;
use crate::log_trace;

/// Something that can run a callback on the next display frame.
///
/// Dropping the returned handle must cancel the callback if it has not run.
pub trait FrameHost {
    type Handle;

    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Holds at most one pending frame; a new request replaces the old one.
pub struct FrameScheduler<H: FrameHost> {
    host: H,
    pending: Option<H::Handle>,
    replaced: u64,
}

impl<H: FrameHost> FrameScheduler<H> {
    pub fn new(host: H) -> Self {
        Self { host, pending: None, replaced: 0 }
    }

    pub fn request(&mut self, callback: Box<dyn FnOnce()>) {
        if self.pending.take().is_some() {
            self.replaced += 1;
            log_trace!(LogComponent::Application("FrameScheduler"), "replaced pending frame");
        }
        self.pending = Some(self.host.request_frame(callback));
    }

    /// Drop the pending frame without running it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Called from the frame callback once it ran.
    pub fn frame_flushed(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of requests that superseded an unflushed frame.
    pub fn replaced_count(&self) -> u64 {
        self.replaced
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

struct ManualSlot {
    cancelled: Rc<Cell<bool>>,
    callback: Box<dyn FnOnce()>,
}

/// Frame host driven by hand, for native tests and headless use
#[derive(Clone, Default)]
pub struct ManualFrameHost {
    queue: Rc<RefCell<Vec<ManualSlot>>>,
}

/// Cancels its frame when dropped
pub struct ManualFrame {
    cancelled: Rc<Cell<bool>>,
}

impl Drop for ManualFrame {
    fn drop(&mut self) {
        self.cancelled.set(true);
    }
}

impl ManualFrameHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every frame callback that is still live; returns how many ran.
    pub fn flush(&self) -> usize {
        let slots: Vec<ManualSlot> = self.queue.borrow_mut().drain(..).collect();
        let mut ran = 0;
        for slot in slots {
            if !slot.cancelled.get() {
                (slot.callback)();
                ran += 1;
            }
        }
        ran
    }

    /// Frames queued and not yet cancelled.
    pub fn live_frames(&self) -> usize {
        self.queue.borrow().iter().filter(|slot| !slot.cancelled.get()).count()
    }
}

impl FrameHost for ManualFrameHost {
    type Handle = ManualFrame;

    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> ManualFrame {
        let cancelled = Rc::new(Cell::new(false));
        self.queue.borrow_mut().push(ManualSlot { cancelled: cancelled.clone(), callback });
        ManualFrame { cancelled }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_latest_request_runs() {
        let host = ManualFrameHost::new();
        let mut scheduler = FrameScheduler::new(host.clone());
        let hits = Rc::new(Cell::new(0u32));

        for value in [1, 2, 3] {
            let hits = hits.clone();
            scheduler.request(Box::new(move || hits.set(value)));
        }
        assert_eq!(host.live_frames(), 1);
        assert_eq!(scheduler.replaced_count(), 2);

        // The handle is still held, so the frame is live when flushed.
        assert_eq!(host.flush(), 1);
        assert_eq!(hits.get(), 3);
    }
}
