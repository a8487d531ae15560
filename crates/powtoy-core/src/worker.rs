//! Mining on a background thread with cancellation and progress.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::miner::{
    mine_with, MineError, MinerConfig, MiningRequest, MiningResult, Progress, SystemClock,
};

/// Spawns mining runs onto dedicated threads.
pub struct MiningWorker;

impl MiningWorker {
    /// Start mining `request` on a new thread.
    pub fn spawn(request: MiningRequest, config: MinerConfig) -> MiningHandle {
        let cancel = Arc::new(AtomicBool::new(false));
        let (progress_tx, progress_rx) = mpsc::channel();

        let flag = Arc::clone(&cancel);
        let thread = thread::spawn(move || {
            let clock = SystemClock::new();
            mine_with(&request, &config, &clock, &flag, |progress| {
                // The receiver may already be gone; progress is best effort.
                let _ = progress_tx.send(progress);
            })
        });

        MiningHandle {
            cancel,
            progress: progress_rx,
            thread,
        }
    }
}

/// A running (or finished) mining thread.
pub struct MiningHandle {
    cancel: Arc<AtomicBool>,
    progress: Receiver<Progress>,
    thread: JoinHandle<Result<MiningResult, MineError>>,
}

impl MiningHandle {
    /// Ask the search to stop. It notices within one batch.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Latest progress report, draining any older ones.
    pub fn try_progress(&self) -> Option<Progress> {
        self.progress.try_iter().last()
    }

    /// Wait for the search to end.
    pub fn join(self) -> Result<MiningResult, MineError> {
        match self.thread.join() {
            Ok(result) => result,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }

    /// Wait at most `timeout`, cancelling the search if it has not finished.
    pub fn join_timeout(self, timeout: Duration) -> Result<MiningResult, MineError> {
        let deadline = Instant::now() + timeout;
        while !self.is_finished() {
            let now = Instant::now();
            if now >= deadline {
                tracing::debug!(?timeout, "mining timed out");
                self.cancel();
                break;
            }
            let wait = (deadline - now).min(Duration::from_millis(10));
            // Wake early on progress so we do not oversleep a finished search.
            let _ = self.progress.recv_timeout(wait);
        }
        self.join()
    }
}

/// Holds at most one mining run at a time.
///
/// Starting a new run cancels and waits for the previous one, so two runs
/// never write results concurrently.
#[derive(Default)]
pub struct MiningSession {
    current: Option<MiningHandle>,
    config: MinerConfig,
}

impl MiningSession {
    pub fn new(config: MinerConfig) -> Self {
        MiningSession {
            current: None,
            config,
        }
    }

    /// Cancel whatever is running and start mining `request`.
    ///
    /// Returns the outcome of the replaced run, if there was one.
    pub fn start(&mut self, request: MiningRequest) -> Option<Result<MiningResult, MineError>> {
        let previous = self.cancel();
        self.current = Some(MiningWorker::spawn(request, self.config));
        previous
    }

    /// Cancel the current run and wait for it to stop.
    pub fn cancel(&mut self) -> Option<Result<MiningResult, MineError>> {
        self.current.take().map(|handle| {
            handle.cancel();
            handle.join()
        })
    }

    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn try_progress(&self) -> Option<Progress> {
        self.current.as_ref().and_then(MiningHandle::try_progress)
    }

    /// Wait for the current run and return its result.
    pub fn wait(&mut self) -> Option<Result<MiningResult, MineError>> {
        self.current.take().map(MiningHandle::join)
    }
}

impl Drop for MiningSession {
    fn drop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.cancel();
        }
    }
}
