use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::domain::Visibility;

/// Called from the timer thread whenever the overlay needs repainting.
pub type RedrawHook = Arc<dyn Fn() + Send + Sync>;

/// Background thread that ticks a shared [`Visibility`] until stopped.
#[derive(Debug)]
pub struct IdleTimer {
    stop: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl IdleTimer {
    pub fn spawn(visibility: Arc<Visibility>, period: Duration, redraw: RedrawHook) -> Self {
        let (stop, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            log::debug!("idle timer started, period {period:?}");
            loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        if visibility.tick(Instant::now()) {
                            redraw();
                        }
                    }
                    // Explicit stop or the owner went away.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            log::debug!("idle timer stopped");
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stops the thread and waits for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("idle timer thread panicked");
            }
        }
    }
}

impl Drop for IdleTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
