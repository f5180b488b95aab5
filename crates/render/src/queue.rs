// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Ordered execution of draw operations, grouped into frames so that a
//! stalled task (one waiting on image decode or a stream blob) cannot let
//! later, independent work jump ahead of it within the same frame.

use std::collections::VecDeque;

/// One unit of deferred work: a closure that draws onto (or otherwise
/// mutates) the scene once its dependencies, if any, are satisfied.
pub type Task = Box<dyn FnOnce() + Send>;

struct PendingTask {
    task: Task,
    blocked: bool,
}

/// A contiguous run of tasks that must execute in order and are not
/// interleaved with tasks from a later frame.
struct Frame {
    tasks: VecDeque<PendingTask>,
}

impl Frame {
    const fn new() -> Self {
        Self { tasks: VecDeque::new() }
    }

    fn is_blocked(&self) -> bool {
        self.tasks.front().is_some_and(|t| t.blocked)
    }
}

/// Schedules and flushes draw tasks frame by frame.
///
/// Tasks within a frame execute strictly in submission order. A task
/// queued while blocked (for example, a `blob` opcode awaiting the image
/// bytes) halts the whole frame until it is unblocked; frames after it
/// never run early even though their own tasks are ready.
pub struct RenderQueue {
    frames: VecDeque<Frame>,
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderQueue {
    #[must_use]
    pub fn new() -> Self {
        let mut frames = VecDeque::new();
        frames.push_back(Frame::new());
        Self { frames }
    }

    /// Start a new frame boundary. Subsequent `schedule` calls append to
    /// the new frame; prior frames are unaffected and still drain first.
    pub fn begin_frame(&mut self) {
        self.frames.push_back(Frame::new());
    }

    /// Queue a task in the current (most recently begun) frame, ready to
    /// run immediately.
    pub fn schedule(&mut self, task: Task) {
        self.current_frame_mut().tasks.push_back(PendingTask { task, blocked: false });
    }

    /// Queue a task in the current frame that starts blocked; it must be
    /// unblocked with [`RenderQueue::unblock`] before it, or anything
    /// after it in the same frame, can run.
    ///
    /// Returns a handle identifying this task for a later `unblock` call.
    pub fn schedule_blocked(&mut self, task: Task) -> TaskHandle {
        let frame_index = self.frames.len() - 1;
        let frame = self.current_frame_mut();
        let task_index = frame.tasks.len();
        frame.tasks.push_back(PendingTask { task, blocked: true });
        TaskHandle { frame_index, task_index }
    }

    /// Clear the blocked flag on a previously scheduled task. Does
    /// nothing if the frame has already drained and been dropped.
    pub fn unblock(&mut self, handle: TaskHandle) {
        if let Some(frame) = self.frames.get_mut(handle.frame_index) {
            if let Some(task) = frame.tasks.get_mut(handle.task_index) {
                task.blocked = false;
            }
        }
    }

    fn current_frame_mut(&mut self) -> &mut Frame {
        self.frames.back_mut().expect("at least one frame always exists")
    }

    /// Run every ready task, stopping at the first still-blocked task or
    /// once the queue is empty.
    pub fn flush(&mut self) {
        while let Some(frame) = self.frames.front() {
            if frame.is_blocked() {
                return;
            }
            let frame = self.frames.front_mut().expect("checked above");
            while let Some(pending) = frame.tasks.pop_front() {
                if pending.blocked {
                    frame.tasks.push_front(pending);
                    return;
                }
                (pending.task)();
            }
            // Frame fully drained; drop it unless it's the last one, which
            // stays open to receive further scheduling.
            if self.frames.len() > 1 {
                self.frames.pop_front();
            } else {
                return;
            }
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.frames.len() == 1 && self.frames.front().is_some_and(|f| f.tasks.is_empty())
    }
}

/// Identifies a task previously queued with [`RenderQueue::schedule_blocked`].
#[derive(Debug, Clone, Copy)]
pub struct TaskHandle {
    frame_index: usize,
    task_index: usize,
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Task) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let make = {
            let log = log.clone();
            move |n: u32| -> Task {
                let log = log.clone();
                Box::new(move || log.lock().unwrap().push(n))
            }
        };
        (log, make)
    }

    #[test]
    fn tasks_in_a_frame_run_in_order() {
        let (log, make) = recorder();
        let mut queue = RenderQueue::new();
        queue.schedule(make(1));
        queue.schedule(make(2));
        queue.schedule(make(3));
        queue.flush();
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn blocked_task_halts_its_frame() {
        let (log, make) = recorder();
        let mut queue = RenderQueue::new();
        queue.schedule(make(1));
        let handle = queue.schedule_blocked(make(2));
        queue.schedule(make(3));
        queue.flush();
        assert_eq!(*log.lock().unwrap(), vec![1]);

        queue.unblock(handle);
        queue.flush();
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn later_frame_waits_for_blocked_earlier_frame() {
        let (log, make) = recorder();
        let mut queue = RenderQueue::new();
        let handle = queue.schedule_blocked(make(1));
        queue.begin_frame();
        queue.schedule(make(2));
        queue.flush();
        assert!(log.lock().unwrap().is_empty());

        queue.unblock(handle);
        queue.flush();
        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn idle_queue_reports_idle() {
        let mut queue = RenderQueue::new();
        assert!(queue.is_idle());
        let (_, make) = recorder();
        queue.schedule(make(1));
        assert!(!queue.is_idle());
        queue.flush();
        assert!(queue.is_idle());
    }
}
