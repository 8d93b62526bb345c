//! Worker pool abstraction using rayon.
//!
//! Jobs are submitted as closures and resolve through a [`JobHandle`], a
//! one-shot crossbeam channel paired with a [`CancellationToken`]:
//! - [`RayonWorkerPool`]: dedicated, fixed-size rayon pool
//! - [`GlobalRayonPool`]: `rayon::spawn` on the global pool
//!
//! # Usage
//!
//! ```ignore
//! let pool = RayonWorkerPool::new(&WorkerPoolConfig::default())?;
//!
//! // Queue work (non-blocking)
//! let handle = pool.submit(CancellationToken::new(), move || expensive_computation());
//!
//! // Poll each frame, or block at the frame barrier
//! let result = handle.wait()?;
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, TryRecvError};
use thiserror::Error;

/// Unique identifier for a submitted job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JobId(u64);

impl JobId {
  fn next() -> Self {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    Self(COUNTER.fetch_add(1, Ordering::Relaxed))
  }
}

/// Why a job produced no value.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum JobError {
  /// The token was cancelled before the job started.
  #[error("job was cancelled before it started")]
  Cancelled,
  /// The worker dropped the job without a result (panic or pool shutdown).
  #[error("worker dropped the job without producing a result")]
  WorkerLost,
}

/// Error building a dedicated worker pool.
#[derive(Debug, Error)]
#[error("failed to build worker pool: {0}")]
pub struct PoolBuildError(#[from] rayon::ThreadPoolBuildError);

/// Shared cancellation flag for one or more jobs.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
  /// Create a token that is not cancelled.
  pub fn new() -> Self {
    Self::default()
  }

  /// Request cancellation. Jobs that already started still run to completion.
  pub fn cancel(&self) {
    self.0.store(true, Ordering::Release);
  }

  /// Check whether cancellation was requested.
  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::Acquire)
  }
}

/// Pending result of a submitted job.
#[derive(Debug)]
pub struct JobHandle<T> {
  id: JobId,
  receiver: Receiver<Option<T>>,
  token: CancellationToken,
}

impl<T> JobHandle<T> {
  /// Identifier assigned at submission.
  pub fn id(&self) -> JobId {
    self.id
  }

  /// Token observed by this job.
  pub fn token(&self) -> &CancellationToken {
    &self.token
  }

  /// Cancel the job if it has not started yet.
  pub fn cancel(&self) {
    self.token.cancel();
  }

  /// Block until the job resolves.
  pub fn wait(self) -> Result<T, JobError> {
    match self.receiver.recv() {
      Ok(Some(value)) => Ok(value),
      Ok(None) => Err(JobError::Cancelled),
      Err(_) => Err(JobError::WorkerLost),
    }
  }

  /// Poll for the job's result (non-blocking).
  ///
  /// Returns `None` while the job is still queued or running. The result can
  /// be taken once; later polls report [`JobError::WorkerLost`].
  pub fn try_poll(&self) -> Option<Result<T, JobError>> {
    match self.receiver.try_recv() {
      Ok(Some(value)) => Some(Ok(value)),
      Ok(None) => Some(Err(JobError::Cancelled)),
      Err(TryRecvError::Empty) => None,
      Err(TryRecvError::Disconnected) => Some(Err(JobError::WorkerLost)),
    }
  }
}

/// A pool that runs type-erased jobs. Must accept work from many threads.
pub trait WorkerPool: Send + Sync {
  /// Queue a job for execution.
  fn execute(&self, job: Box<dyn FnOnce() + Send + 'static>);

  /// Number of worker threads.
  fn worker_count(&self) -> usize;
}

/// Typed submission on top of [`WorkerPool::execute`].
pub trait SubmitExt {
  /// Queue `work` and return a handle to its result.
  ///
  /// The job checks `token` before running; a cancelled job resolves to
  /// [`JobError::Cancelled`] without calling `work`.
  fn submit<T, F>(&self, token: CancellationToken, work: F) -> JobHandle<T>
  where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static;
}

impl<P: WorkerPool + ?Sized> SubmitExt for P {
  fn submit<T, F>(&self, token: CancellationToken, work: F) -> JobHandle<T>
  where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
  {
    let (sender, receiver) = crossbeam_channel::bounded(1);
    let job_token = token.clone();

    self.execute(Box::new(move || {
      let outcome = if job_token.is_cancelled() {
        None
      } else {
        Some(work())
      };
      // Receiver gone means nobody waits for this result.
      let _ = sender.send(outcome);
    }));

    JobHandle {
      id: JobId::next(),
      receiver,
      token,
    }
  }
}

/// Settings for a dedicated pool.
#[derive(Clone, Debug)]
pub struct WorkerPoolConfig {
  /// Worker threads; 0 lets rayon pick (one per logical core).
  pub worker_threads: usize,
  /// Worker threads are named `{prefix}-{index}`.
  pub thread_name_prefix: String,
}

impl Default for WorkerPoolConfig {
  fn default() -> Self {
    Self {
      worker_threads: 0,
      thread_name_prefix: "terrain-worker".to_string(),
    }
  }
}

impl WorkerPoolConfig {
  /// Set the worker thread count.
  pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
    self.worker_threads = worker_threads;
    self
  }

  /// Set the thread name prefix.
  pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.thread_name_prefix = prefix.into();
    self
  }
}

/// Fixed-size pool built with `rayon::ThreadPoolBuilder`.
///
/// A panicking job is logged and resolves to [`JobError::WorkerLost`]; the
/// worker thread survives.
pub struct RayonWorkerPool {
  pool: rayon::ThreadPool,
}

impl RayonWorkerPool {
  /// Build a pool from `config`.
  pub fn new(config: &WorkerPoolConfig) -> Result<Self, PoolBuildError> {
    let prefix = config.thread_name_prefix.clone();
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(config.worker_threads)
      .thread_name(move |index| format!("{}-{}", prefix, index))
      .panic_handler(|_| tracing::error!("terrain worker job panicked"))
      .build()?;
    Ok(Self { pool })
  }

  /// Build a pool with `threads` workers.
  pub fn with_threads(threads: usize) -> Result<Self, PoolBuildError> {
    Self::new(&WorkerPoolConfig::default().with_worker_threads(threads))
  }
}

impl WorkerPool for RayonWorkerPool {
  fn execute(&self, job: Box<dyn FnOnce() + Send + 'static>) {
    self.pool.spawn(job);
  }

  fn worker_count(&self) -> usize {
    self.pool.current_num_threads()
  }
}

/// Runs jobs on rayon's global pool via `rayon::spawn`.
///
/// This works across all platforms where rayon is supported, but a panicking
/// job aborts the process.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalRayonPool;

impl WorkerPool for GlobalRayonPool {
  fn execute(&self, job: Box<dyn FnOnce() + Send + 'static>) {
    rayon::spawn(job);
  }

  fn worker_count(&self) -> usize {
    rayon::current_num_threads()
  }
}

#[cfg(test)]
#[path = "threading_test.rs"]
mod threading_test;
