//! Frame loop driven by an external "next frame" primitive.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// The display's per-refresh scheduling primitive.
///
/// `request_frame` asks for one callback before the next repaint;
/// `cancel_frame` withdraws a request that has not fired yet.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Keeps exactly one frame request outstanding while running
#[derive(Debug)]
pub struct AnimationLoop {
    state: LoopState,
    pending: Option<FrameHandle>,
    frames: u64,
}

impl AnimationLoop {
    /// Enters `Running` and schedules the first frame
    pub fn start<S: FrameScheduler>(scheduler: &mut S) -> Self {
        AnimationLoop {
            state: LoopState::Running,
            pending: Some(scheduler.request_frame()),
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Marks the outstanding request as fired. Returns `false` once stopped.
    pub fn begin_frame(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.pending = None;
        self.frames += 1;
        true
    }

    /// Requests the next frame, unless one is already pending or the loop
    /// has stopped
    pub fn reschedule<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        if self.is_running() && self.pending.is_none() {
            self.pending = Some(scheduler.request_frame());
        }
    }

    /// Cancels any pending frame and stops. Returns `false` if the loop had
    /// already stopped, in which case nothing happens.
    pub fn stop<S: FrameScheduler>(&mut self, scheduler: &mut S) -> bool {
        if !self.is_running() {
            return false;
        }
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        self.state = LoopState::Stopped;
        true
    }
}

/// Fixed-rate frame clock for hosts without a vsync callback
#[derive(Debug, Clone)]
pub struct FrameClock {
    interval: Duration,
    next: Option<(FrameHandle, Instant)>,
    last_deadline: Option<Instant>,
    counter: u64,
}

impl FrameClock {
    pub fn new(interval: Duration) -> Self {
        FrameClock {
            interval,
            next: None,
            last_deadline: None,
            counter: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the pending frame is due, or `None` if nothing is scheduled
    pub fn deadline(&self) -> Option<Instant> {
        self.next.map(|(_, at)| at)
    }
}

impl FrameScheduler for FrameClock {
    fn request_frame(&mut self) -> FrameHandle {
        let now = Instant::now();
        let base = self.last_deadline.unwrap_or(now);
        let at = (base + self.interval).max(now);
        self.counter += 1;
        let handle = FrameHandle(self.counter);
        self.next = Some((handle, at));
        self.last_deadline = Some(at);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.next.map(|(h, _)| h) == Some(handle) {
            self.next = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        requested: Vec<FrameHandle>,
        cancelled: Vec<FrameHandle>,
    }

    impl FrameScheduler for Recorder {
        fn request_frame(&mut self) -> FrameHandle {
            let handle = FrameHandle(self.requested.len() as u64 + 1);
            self.requested.push(handle);
            handle
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.cancelled.push(handle);
        }
    }

    #[test]
    fn starts_running_with_one_request() {
        let mut scheduler = Recorder::default();
        let animation = AnimationLoop::start(&mut scheduler);
        assert_eq!(animation.state(), LoopState::Running);
        assert_eq!(scheduler.requested.len(), 1);
        assert_eq!(animation.pending(), Some(FrameHandle(1)));
    }

    #[test]
    fn every_frame_requests_the_next() {
        let mut scheduler = Recorder::default();
        let mut animation = AnimationLoop::start(&mut scheduler);
        for _ in 0..3 {
            assert!(animation.begin_frame());
            animation.reschedule(&mut scheduler);
            animation.reschedule(&mut scheduler);
        }
        assert_eq!(scheduler.requested.len(), 4);
        assert_eq!(animation.frames(), 3);
    }

    #[test]
    fn stop_cancels_and_is_idempotent() {
        let mut scheduler = Recorder::default();
        let mut animation = AnimationLoop::start(&mut scheduler);
        assert!(animation.stop(&mut scheduler));
        assert_eq!(scheduler.cancelled, vec![FrameHandle(1)]);

        assert!(!animation.stop(&mut scheduler));
        assert_eq!(scheduler.cancelled.len(), 1);

        assert!(!animation.begin_frame());
        animation.reschedule(&mut scheduler);
        assert_eq!(scheduler.requested.len(), 1);
        assert_eq!(animation.pending(), None);
    }

    #[test]
    fn clock_spaces_frames_by_the_interval() {
        let mut clock = FrameClock::new(Duration::from_millis(10));
        assert_eq!(clock.interval(), Duration::from_millis(10));
        let start = Instant::now();
        let first = clock.request_frame();
        let first_at = clock.deadline().unwrap();
        assert!(first_at >= start);

        clock.request_frame();
        let second_at = clock.deadline().unwrap();
        assert!(second_at >= first_at + Duration::from_millis(10));

        clock.cancel_frame(first);
        assert!(clock.deadline().is_some(), "stale handles are ignored");
        clock.cancel_frame(FrameHandle(2));
        assert!(clock.deadline().is_none());
    }
}
