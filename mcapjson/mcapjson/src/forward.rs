//! Record forwarding: the transport contract and a bounded queue worker.
//!
//! The pipeline hands records to a [`Transport`] through a bounded
//! channel. A slow consumer blocks the producer instead of growing
//! memory; a broken transport surfaces as [`TransportError`] on the next
//! send.

use std::thread::JoinHandle;

use mcapjson_json::OutputRecord;

/// Failure of the downstream transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The transport or its worker is no longer accepting records.
    #[error("transport closed")]
    Closed,
}

/// Destination for re-streamed records.
///
/// `send` may block and may fail; a failed transport stops the run.
pub trait Transport: Send {
    fn send(&mut self, record: &OutputRecord) -> Result<(), TransportError>;
}

/// Runs a [`Transport`] on its own thread behind a bounded queue.
pub struct Forwarder {
    tx: Option<flume::Sender<OutputRecord>>,
    worker: Option<JoinHandle<Result<(), TransportError>>>,
}

impl Forwarder {
    /// Spawn the worker with a queue of `capacity` records.
    pub fn spawn<T: Transport + 'static>(mut transport: T, capacity: usize) -> Self {
        let (tx, rx) = flume::bounded::<OutputRecord>(capacity);
        let worker = std::thread::spawn(move || {
            for record in rx.iter() {
                transport.send(&record)?;
            }
            Ok(())
        });
        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Queue one record, blocking while the queue is full.
    ///
    /// Fails with [`TransportError::Closed`] once the worker has stopped;
    /// the underlying cause is reported by [`finish`](Self::finish).
    pub fn send(&self, record: OutputRecord) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::Closed)?;
        tx.send(record).map_err(|_| TransportError::Closed)
    }

    /// Drain the queue, stop the worker, and report its final status.
    pub fn finish(mut self) -> Result<(), TransportError> {
        self.tx.take();
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| TransportError::Closed)?,
            None => Ok(()),
        }
    }
}

impl Drop for Forwarder {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
