use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::{runtime::QuizEvent, session::Input};

struct RunningTimer {
    stop_tx: Sender<()>,
    worker: JoinHandle<()>,
}

/// The one timer a session owns.
///
/// Starting it again cancels the previous worker first. Every tick carries the epoch of the
/// worker that produced it, so a tick already queued by a cancelled worker can be told apart
/// from a live one with [`TimerSlot::accepts`].
pub struct TimerSlot {
    interval: Duration,
    epoch: u64,
    running: Option<RunningTimer>,
}

impl TimerSlot {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            epoch: 0,
            running: None,
        }
    }

    pub fn start(&mut self, events: Sender<QuizEvent>) {
        self.stop();
        self.epoch += 1;

        let epoch = self.epoch;
        let interval = self.interval;
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let worker = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if events.send(QuizEvent::Tick(epoch)).is_err() {
                        break;
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        log::debug!("timer armed, epoch {epoch}");
        self.running = Some(RunningTimer { stop_tx, worker });
    }

    /// Stops the worker and waits for it to exit.
    pub fn stop(&mut self) {
        if let Some(RunningTimer { stop_tx, worker }) = self.running.take() {
            drop(stop_tx);
            if worker.join().is_err() {
                log::error!("timer worker panicked");
            }
            log::debug!("timer stopped, epoch {}", self.epoch);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn accepts(&self, epoch: u64) -> bool {
        self.is_running() && epoch == self.epoch
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Post `input` back onto the event queue once `delay` has passed.
pub fn schedule_once(events: Sender<QuizEvent>, delay: Duration, input: Input) {
    thread::spawn(move || {
        thread::sleep(delay);
        // receiver gone means the app already quit
        let _ = events.send(QuizEvent::Deferred(input));
    });
}
