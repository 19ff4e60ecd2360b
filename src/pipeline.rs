use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};

use crate::buffer::Buffer;
use crate::error::LogError;

/// Asynchronous delivery pipeline.
///
/// Producers append formatted records into an inbound [`Buffer`] under a
/// single lock; a dedicated worker thread swaps the inbound buffer with an
/// empty outbound one in O(1) and hands the drained span to the delivery
/// callback outside the lock, so producers never block on sink I/O.
///
/// With `check_space` enabled, a producer blocks in [`submit`] until the
/// inbound buffer has room (backpressure); the wait is unbounded and a
/// record larger than the buffer capacity will block until shutdown.
/// With it disabled the inbound buffer grows without limit instead.
///
/// Shutdown is cooperative: [`stop`] flips the running flag, wakes the
/// worker and any blocked producers, and joins the worker, which drains
/// everything appended before the stop was requested. Submitting to a
/// stopped pipeline fails with [`LogError::PipelineStopped`] rather than
/// silently dropping the record.
///
/// [`submit`]: AsyncPipeline::submit
/// [`stop`]: AsyncPipeline::stop
pub struct AsyncPipeline {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    inbound: Mutex<Buffer>,
    running: AtomicBool,
    /// Producers wait here for writable space when backpressure is on.
    space_cond: Condvar,
    /// The worker waits here for data or shutdown.
    data_cond: Condvar,
    check_space: bool,
}

impl AsyncPipeline {
    /// Starts a pipeline with default-sized buffers.
    pub fn new<F>(check_space: bool, deliver: F) -> Self
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        Self::with_capacity(crate::buffer::BUFFER_DEFAULT_SIZE, check_space, deliver)
    }

    /// Starts a pipeline whose two buffers begin at `capacity` bytes.
    /// Small capacities make backpressure observable in tests.
    pub fn with_capacity<F>(capacity: usize, check_space: bool, deliver: F) -> Self
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        let shared = Arc::new(Shared {
            inbound: Mutex::new(Buffer::with_capacity(capacity)),
            running: AtomicBool::new(true),
            space_cond: Condvar::new(),
            data_cond: Condvar::new(),
            check_space,
        });
        let worker_shared = Arc::clone(&shared);
        let outbound = Buffer::with_capacity(capacity);
        let handle = thread::spawn(move || worker_loop(worker_shared, outbound, deliver));
        Self {
            shared,
            worker: Mutex::new(Some(handle)),
        }
    }

    /// Appends one record's bytes to the inbound buffer and wakes the
    /// worker.
    ///
    /// Blocks while backpressure is enabled and the buffer lacks space.
    /// Fails with [`LogError::PipelineStopped`] once shutdown has been
    /// requested, including for producers woken out of a backpressure
    /// wait by the shutdown itself.
    pub fn submit(&self, data: &[u8]) -> Result<(), LogError> {
        {
            let mut inbound = self.shared.inbound.lock();
            if !self.shared.running.load(Ordering::Acquire) {
                return Err(LogError::PipelineStopped);
            }
            while self.shared.check_space && inbound.writable_size() < data.len() {
                self.shared.space_cond.wait(&mut inbound);
                if !self.shared.running.load(Ordering::Acquire) {
                    return Err(LogError::PipelineStopped);
                }
            }
            inbound.push(data);
        }
        self.shared.data_cond.notify_one();
        Ok(())
    }

    /// True until [`stop`](AsyncPipeline::stop) is called.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Requests shutdown and joins the worker.
    ///
    /// Everything appended to the inbound buffer before this call is
    /// delivered before `stop` returns. Idempotent.
    pub fn stop(&self) {
        {
            // Flip the flag under the inbound lock so a producer either
            // completed its push before the flag fell, and will be
            // drained, or observes the stop and gets an error.
            let _inbound = self.shared.inbound.lock();
            self.shared.running.store(false, Ordering::Release);
        }
        self.shared.data_cond.notify_all();
        self.shared.space_cond.notify_all();
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

impl Drop for AsyncPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop<F>(shared: Arc<Shared>, mut outbound: Buffer, mut deliver: F)
where
    F: FnMut(&[u8]),
{
    loop {
        {
            let mut inbound = shared.inbound.lock();
            while inbound.is_empty() && shared.running.load(Ordering::Acquire) {
                shared.data_cond.wait(&mut inbound);
            }
            // outbound is always empty here, so stopping with a drained
            // inbound buffer means nothing is left to deliver.
            if inbound.is_empty() && !shared.running.load(Ordering::Acquire) {
                return;
            }
            inbound.swap(&mut outbound);
        }
        // Wake producers first: their space is free even while delivery
        // is still writing to the sinks.
        shared.space_cond.notify_all();
        if !outbound.is_empty() {
            deliver(outbound.peek());
        }
        outbound.reset();
    }
}
