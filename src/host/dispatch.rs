//! Serialized commits on a dedicated writer thread.
//!
//! Hosts that own a single mutation thread (editors usually do) want every
//! write to happen there. [`SerialCommitter`] models that: commits are
//! queued over a channel to one worker thread, and the caller blocks until
//! its commit has finished so it sees a definite success or failure.
//! A commit issued from the worker thread itself runs inline.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use crate::file_edit::{Committer, FileHandle};

type Job = Box<dyn FnOnce() + Send>;

/// Runs every commit of an inner [`Committer`] on one worker thread.
pub struct SerialCommitter<C> {
    inner: Arc<C>,
    jobs: Option<mpsc::Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    worker_id: ThreadId,
}

impl<C> SerialCommitter<C>
where
    C: Committer + Send + Sync + 'static,
{
    /// Spawn the writer thread.
    pub fn spawn(inner: C) -> Result<Self> {
        let (jobs, queue) = mpsc::channel::<Job>();
        let worker = thread::Builder::new()
            .name("smart-edit-commit".to_owned())
            .spawn(move || {
                for job in queue {
                    job();
                }
                debug!("commit dispatcher stopped");
            })
            .context("failed to spawn commit thread")?;
        let worker_id = worker.thread().id();

        Ok(Self {
            inner: Arc::new(inner),
            jobs: Some(jobs),
            worker: Some(worker),
            worker_id,
        })
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C> Committer for SerialCommitter<C>
where
    C: Committer + Send + Sync + 'static,
{
    fn commit(&self, file: &FileHandle, new_text: &str) -> Result<()> {
        if thread::current().id() == self.worker_id {
            return self.inner.commit(file, new_text);
        }

        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| anyhow!("commit dispatcher is shut down"))?;
        let (reply, outcome) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let file = file.clone();
        let new_text = new_text.to_owned();

        jobs.send(Box::new(move || {
            // The caller may have gone away; nothing to report to then.
            let _ = reply.send(inner.commit(&file, &new_text));
        }))
        .map_err(|_| anyhow!("commit dispatcher is not running"))?;

        outcome
            .recv()
            .map_err(|_| anyhow!("commit dispatcher dropped the request"))?
    }
}

impl<C> Drop for SerialCommitter<C> {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl<C> std::fmt::Debug for SerialCommitter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialCommitter")
            .field("worker", &self.worker_id)
            .field("running", &self.jobs.is_some())
            .finish_non_exhaustive()
    }
}
