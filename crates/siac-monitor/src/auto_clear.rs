//! Auto-clear scheduler.
//!
//! Blanks the displayed verdicts a fixed time after the last readout. The
//! timer is a single-shot tokio task; arming while armed replaces the
//! pending task, so the clear is always timed from the latest readout.
//!
//! Expiry is delivered as a [`ClearDeadline`] on a channel created once in
//! [`AutoClearScheduler::new`]. Each deadline carries the generation of the
//! arm that produced it, and [`AutoClearScheduler::fire`] accepts only the
//! current generation. A deadline that was already in flight when the
//! scheduler was re-armed or disarmed is therefore ignored.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use siac_monitor::AutoClearScheduler;
//!
//! #[tokio::main(flavor = "current_thread", start_paused = true)]
//! async fn main() {
//!     let (mut scheduler, mut deadlines) = AutoClearScheduler::new(Duration::from_secs(5));
//!
//!     scheduler.arm();
//!     scheduler.arm();
//!
//!     let deadline = deadlines.recv().await.unwrap();
//!     assert!(scheduler.fire(deadline));
//!     assert!(!scheduler.is_armed());
//! }
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Capacity of the deadline channel.
const DEADLINE_CHANNEL_CAPACITY: usize = 8;

/// Token delivered when an armed timer expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClearDeadline {
    /// Generation of the arm that produced this deadline.
    pub generation: u64,
}

/// Restartable single-shot clear timer.
#[derive(Debug)]
pub struct AutoClearScheduler {
    delay: Duration,
    generation: u64,
    armed: bool,
    pending: Option<JoinHandle<()>>,
    deadline_tx: mpsc::Sender<ClearDeadline>,
}

impl AutoClearScheduler {
    /// Create a disarmed scheduler and the receiver its deadlines arrive on.
    pub fn new(delay: Duration) -> (Self, mpsc::Receiver<ClearDeadline>) {
        let (deadline_tx, deadline_rx) = mpsc::channel(DEADLINE_CHANNEL_CAPACITY);

        let scheduler = Self {
            delay,
            generation: 0,
            armed: false,
            pending: None,
            deadline_tx,
        };

        (scheduler, deadline_rx)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Generation of the most recent arm.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// (Re)start the timer with the configured delay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self) {
        self.arm_after(self.delay);
    }

    /// (Re)start the timer with an explicit delay.
    pub fn arm_after(&mut self, delay: Duration) {
        self.abort_pending();
        self.generation = self.generation.wrapping_add(1);
        self.armed = true;

        let deadline = ClearDeadline {
            generation: self.generation,
        };
        let deadline_tx = self.deadline_tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the monitor has stopped.
            let _ = deadline_tx.send(deadline).await;
        }));

        debug!(
            "Auto-clear armed (generation {}, {} ms)",
            self.generation,
            delay.as_millis()
        );
    }

    /// Stop the timer. Returns whether it was armed.
    pub fn disarm(&mut self) -> bool {
        let was_armed = self.armed;
        self.abort_pending();
        self.armed = false;
        was_armed
    }

    /// Accept a deadline from the channel.
    ///
    /// Returns `true` if the deadline belongs to the current arm, in which
    /// case the scheduler disarms and the caller should clear the display.
    pub fn fire(&mut self, deadline: ClearDeadline) -> bool {
        if !self.armed || deadline.generation != self.generation {
            return false;
        }
        self.armed = false;
        self.pending = None;
        true
    }

    fn abort_pending(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for AutoClearScheduler {
    fn drop(&mut self) {
        self.abort_pending();
    }
}
