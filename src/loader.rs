use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::error::{PainelError, Result};

/// Runs at most one fetch at a time on a worker thread. Every `start` or
/// `cancel` bumps the generation; a result tagged with an older generation is
/// dropped instead of being handed to the view.
pub struct Loader<T> {
    generation: Arc<AtomicU64>,
    rx: Option<Receiver<(u64, Result<T>)>>,
}

impl<T: Send + 'static> Default for Loader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Loader<T> {
    pub fn new() -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            rx: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start `job` in the background, superseding any fetch in flight.
    pub fn start<F>(&mut self, job: F)
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = mpsc::channel();
        self.rx = Some(rx);
        let current = Arc::clone(&self.generation);
        thread::spawn(move || {
            let result = job();
            if current.load(Ordering::SeqCst) == gen {
                let _ = tx.send((gen, result));
            } else {
                debug!(gen, "fetch finished after being superseded");
            }
        });
    }

    /// Forget the fetch in flight; its result will never be delivered.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.rx = None;
    }

    pub fn is_pending(&self) -> bool {
        self.rx.is_some()
    }

    /// Non-blocking check for a finished fetch of the current generation.
    pub fn poll(&mut self) -> Option<Result<T>> {
        let outcome = self.rx.as_ref()?.try_recv();
        match outcome {
            Ok(msg) => self.accept(msg),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => self.worker_gone(),
        }
    }

    /// Block until the current fetch finishes.
    pub fn wait(&mut self) -> Option<Result<T>> {
        let outcome = self.rx.as_ref()?.recv();
        match outcome {
            Ok(msg) => self.accept(msg),
            Err(_) => self.worker_gone(),
        }
    }

    fn accept(&mut self, (gen, result): (u64, Result<T>)) -> Option<Result<T>> {
        if gen != self.generation() {
            debug!(gen, current = self.generation(), "discarding stale fetch result");
            return None;
        }
        self.rx = None;
        Some(result)
    }

    fn worker_gone(&mut self) -> Option<Result<T>> {
        self.rx = None;
        Some(Err(PainelError::Other(
            "fetch was superseded or its worker stopped".to_string(),
        )))
    }
}

impl<T> Drop for Loader<T> {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use std::time::Duration;

    #[test]
    fn test_poll_delivers_result() {
        let mut loader = Loader::new();
        loader.start(|| Ok(42));
        assert!(loader.is_pending());
        assert_eq!(loader.wait().unwrap().unwrap(), 42);
        assert!(!loader.is_pending());
        assert!(loader.poll().is_none());
    }

    #[test]
    fn test_error_is_delivered() {
        let mut loader: Loader<u8> = Loader::new();
        loader.start(|| Err(PainelError::Api("fora do ar".into())));
        let err = loader.wait().unwrap().unwrap_err();
        assert_eq!(err.to_string(), "API error: fora do ar");
    }

    #[test]
    fn test_restart_supersedes_in_flight_fetch() {
        let (release_tx, release_rx) = channel::<()>();
        let mut loader = Loader::new();
        loader.start(move || {
            let _ = release_rx.recv_timeout(Duration::from_secs(5));
            Ok("stale")
        });
        let first_gen = loader.generation();
        loader.start(|| Ok("fresh"));
        assert!(loader.generation() > first_gen);
        let _ = release_tx.send(());
        assert_eq!(loader.wait().unwrap().unwrap(), "fresh");
    }

    #[test]
    fn test_cancel_drops_result() {
        let mut loader = Loader::new();
        loader.start(|| Ok(1));
        loader.cancel();
        assert!(!loader.is_pending());
        assert!(loader.poll().is_none());
        assert!(loader.wait().is_none());
    }
}
