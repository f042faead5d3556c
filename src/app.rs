//! The UI thread, modeled as an explicit single-consumer task queue.
//!
//! Engine callbacks never touch UI-owned state directly; they post work
//! through a [`MainLoopHandle`] and return immediately. The thread driving
//! [`MainLoop`] is the only one that runs the posted tasks, which is what
//! makes the render path single-threaded by construction.

use tokio::sync::mpsc;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Cloneable, fire-and-forget sender side of the UI task queue. Posting
/// never blocks and never waits for the task to run; posts to a gone main
/// loop are silently dropped.
#[derive(Clone)]
pub struct MainLoopHandle {
    tx: mpsc::UnboundedSender<Task>,
}

impl MainLoopHandle {
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let _ = self.tx.send(Box::new(task));
    }
}

impl std::fmt::Debug for MainLoopHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainLoopHandle").finish_non_exhaustive()
    }
}

/// Single-consumer receiver side. Owned by whichever thread plays the role
/// of the UI thread.
pub struct MainLoop {
    rx: mpsc::UnboundedReceiver<Task>,
}

impl MainLoop {
    pub fn new() -> (MainLoopHandle, MainLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        (MainLoopHandle { tx }, MainLoop { rx })
    }

    /// Wait for the next posted task. `None` once every handle is gone.
    pub async fn recv(&mut self) -> Option<Task> {
        self.rx.recv().await
    }

    /// Run every task queued so far and return how many ran. Used by the
    /// poll loop between ticks and by tests for deterministic stepping.
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }
}
