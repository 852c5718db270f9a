//! Background update task with cooperative cancellation.
//!
//! ```text
//!  foreground                         background ("screen-update")
//!  ──────────                         ────────────────────────────
//!  spawn ───────────────────────────▶ while !cancelled {
//!                                         job.step()
//!                                         wait(update_interval)   ◀─ wakes on cancel
//!                                     }
//!  cancel ──▶ token                   drop(done) ──┐
//!  join ◀──── done channel disconnects ◀───────────┘
//! ```
//!
//! The thread owns the sending half of a channel and never sends on it;
//! the receiver sees `Disconnected` once the thread has exited (normally
//! or by panic), which lets the join wait with a timeout.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{error, info, warn};

use crate::config::JoinPolicy;
use crate::drivers::task_pin::{spawn_on_core, Core};
use crate::error::{IoError, Result};
use crate::screens::{ScreenId, Update};

/// FreeRTOS priority of the update task (below the foreground loop).
pub const TASK_PRIORITY: u8 = 4;
/// Probe I/O plus formatting; the default 4 KB is too tight.
pub const TASK_STACK_KB: usize = 8;

/// Shared cancellation flag with a cancellable sleep.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<(Mutex<bool>, Condvar)>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, cvar) = &*self.0;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (flag, _) = &*self.0;
        *flag.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `timeout` or until cancelled.  Returns `true` if
    /// cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, cvar) = &*self.0;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Result of waiting for a cancelled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The task exited.
    Stopped,
    /// The task was still running after the timeout and was detached.
    TimedOut,
}

pub struct BackgroundTask {
    screen: ScreenId,
    cancel: CancelToken,
    done: Receiver<()>,
    handle: JoinHandle<()>,
}

impl BackgroundTask {
    /// Start repeating `job` on the application core.
    pub fn spawn(screen: ScreenId, job: Box<dyn Update>, interval: Duration) -> Result<Self> {
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let (done_tx, done) = mpsc::channel::<()>();

        let handle = spawn_on_core(Core::App, TASK_PRIORITY, TASK_STACK_KB, "screen-update\0", move || {
            let _done = done_tx;
            run(job, &token, interval);
        })
        .map_err(|e| {
            error!("TASK | spawn for {screen} failed: {e}");
            IoError::Spawn
        })?;

        info!("TASK | {screen} update started");
        Ok(Self {
            screen,
            cancel,
            done,
            handle,
        })
    }

    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    /// Ask the task to stop after its current step.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the task to exit.
    ///
    /// - [`JoinPolicy::Hard`]: never gives up; warns every `timeout`.
    /// - [`JoinPolicy::BestEffort`]: gives up after `timeout` and detaches
    ///   the thread, which may still finish its current step.
    pub fn join(self, policy: JoinPolicy, timeout: Duration) -> JoinOutcome {
        let mut waited = Duration::ZERO;
        loop {
            match self.done.recv_timeout(timeout) {
                Err(RecvTimeoutError::Timeout) => {
                    waited += timeout;
                    match policy {
                        JoinPolicy::Hard => {
                            warn!("TASK | {} still running after {:?}", self.screen, waited);
                        }
                        JoinPolicy::BestEffort => {
                            warn!("TASK | {} did not stop within {:?}, detaching", self.screen, timeout);
                            return JoinOutcome::TimedOut;
                        }
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if self.handle.join().is_err() {
            error!("TASK | {} update panicked", self.screen);
        }
        JoinOutcome::Stopped
    }
}

fn run(mut job: Box<dyn Update>, cancel: &CancelToken, interval: Duration) {
    while !cancel.is_cancelled() {
        if let Err(e) = job.step() {
            error!("TASK | update failed, stopping: {e}");
            break;
        }
        if !interval.is_zero() && cancel.wait_timeout(interval) {
            break;
        }
    }
}
