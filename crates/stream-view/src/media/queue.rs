use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

/// Unit of work run on a [`SerialQueue`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A named worker thread that runs jobs one at a time, in dispatch order.
///
/// This is the producer's own execution context: frame production and
/// producer-bound state changes happen here, never on the display thread.
pub struct SerialQueue {
    label: String,
    sender: Option<Sender<Job>>,
    thread: Option<JoinHandle<()>>,
}

impl SerialQueue {
    pub fn new(label: &str) -> std::io::Result<Self> {
        let (tx, rx): (Sender<Job>, Receiver<Job>) = crossbeam_channel::unbounded();
        let thread_label = label.to_string();
        let handle = thread::Builder::new()
            .name(label.to_string())
            .spawn(move || run_jobs(&thread_label, rx))?;

        Ok(Self {
            label: label.to_string(),
            sender: Some(tx),
            thread: Some(handle),
        })
    }

    /// Queue a job. Never blocks.
    pub fn dispatch(&self, job: Job) {
        let Some(tx) = &self.sender else {
            return;
        };
        if tx.send(job).is_err() {
            log::warn!("{}: worker gone, dropping job", self.label);
        }
    }

    /// Block until every job dispatched before this call has run.
    pub fn barrier(&self) {
        if self.is_current() {
            return;
        }
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.dispatch(Box::new(move || {
            let _ = tx.send(());
        }));
        let _ = rx.recv();
    }

    /// Whether the calling thread is this queue's worker.
    pub fn is_current(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|h| h.thread().id() == thread::current().id())
    }
}

impl std::fmt::Debug for SerialQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialQueue")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.sender = None;
        if self.is_current() {
            return;
        }
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn run_jobs(label: &str, rx: Receiver<Job>) {
    for job in rx {
        if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)) {
            let msg = if let Some(s) = e.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = e.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".into()
            };
            log::error!("{label}: job panicked: {msg}");
        }
    }
    log::debug!("{label}: worker stopped");
}
