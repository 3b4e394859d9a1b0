//! Tokio runtime construction for Mentor binaries.
//!
//! Everything in the app is reactive (UI events, timer ticks, streaming
//! reads), so the default build is a current-thread runtime; a
//! multi-thread build remains available for tooling that wants it. A
//! shared [`CancellationToken`] rides along for coordinated teardown.
use anyhow::Result;
use std::sync::Arc;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct MentorHandle {
    inner: Handle,
    cancel: Arc<CancellationToken>,
}

pub struct MentorRuntime {
    runtime: Runtime,
    cancel: Arc<CancellationToken>,
}

impl MentorRuntime {
    /// Build a single-threaded, cooperative runtime.
    ///
    /// ```
    /// use mentor_runtime::MentorRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = MentorRuntime::build_current_thread("doctest-runtime")
    ///     .expect("runtime builds");
    /// let value = runtime.block_on(async { 2 + 2 });
    /// assert_eq!(value, 4);
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn build_current_thread(thread_name: &str) -> Result<Self> {
        let mut builder = Builder::new_current_thread();
        builder.enable_all().thread_name(thread_name);
        Self::finish(builder)
    }

    /// Build a multi-thread runtime with an optional worker count.
    ///
    /// ```
    /// use mentor_runtime::MentorRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = MentorRuntime::build("pool-runtime", Some(2)).unwrap();
    /// assert_eq!(runtime.block_on(async { "done" }), "done");
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn build(thread_name: &str, worker_threads: Option<usize>) -> Result<Self> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all().thread_name(thread_name);
        if let Some(workers) = worker_threads {
            builder.worker_threads(workers.max(1));
        }
        Self::finish(builder)
    }

    fn finish(mut builder: Builder) -> Result<Self> {
        let runtime = builder.build()?;
        let cancel = Arc::new(CancellationToken::new());
        Ok(Self { runtime, cancel })
    }

    /// Obtain a cloned handle for spawning tasks and sharing cancellation.
    pub fn handle(&self) -> MentorHandle {
        MentorHandle {
            inner: self.runtime.handle().clone(),
            cancel: self.cancel.clone(),
        }
    }

    /// Run a future to completion on the runtime.
    pub fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    /// Cancel outstanding work and shut the runtime down gracefully.
    ///
    /// ```
    /// use mentor_runtime::MentorRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = MentorRuntime::build_current_thread("shutdown-example").unwrap();
    /// runtime.shutdown(Duration::from_millis(5));
    /// ```
    pub fn shutdown(self, graceful: std::time::Duration) {
        self.cancel.cancel();
        self.runtime.shutdown_timeout(graceful);
    }
}

impl MentorHandle {
    /// Spawn a future onto the shared runtime handle.
    ///
    /// ```
    /// use mentor_runtime::MentorRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = MentorRuntime::build("handle-doctest", Some(1)).unwrap();
    /// let handle = runtime.handle();
    /// let task = handle.spawn(async { 21 * 2 });
    /// let result = runtime.block_on(async move { task.await.unwrap() });
    /// assert_eq!(result, 42);
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn spawn<F, T>(&self, fut: F) -> JoinHandle<T>
    where
        F: std::future::Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.inner.spawn(fut)
    }

    /// Clone the shared cancellation token to coordinate shutdown.
    ///
    /// ```
    /// use mentor_runtime::MentorRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = MentorRuntime::build_current_thread("cancel-example").unwrap();
    /// let handle = runtime.handle();
    /// let cancel = handle.cancellation();
    /// cancel.cancel();
    /// assert!(cancel.is_cancelled());
    /// runtime.shutdown(Duration::from_millis(5));
    /// ```
    pub fn cancellation(&self) -> Arc<CancellationToken> {
        self.cancel.clone()
    }
}
