//! Store Actor Module
//!
//! Serializes every store operation through one worker task. Callers hold a
//! [`StoreHandle`], send request envelopes over a channel and await the
//! envelope's private reply. Only the worker ever touches the [`KvStore`].
//!
//! # Lifecycle
//! The worker starts running and handles one request at a time, replying
//! before it dequeues the next. A `Shutdown` request stops it for good: the
//! request channel is dropped (so queued and later requests fail with
//! [`StoreError::StoreClosed`]), and after the grace period the registered
//! shutdown listener, if any, receives `true`.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::{Result, StoreError};
use crate::store::requests::{
    shutdown_channel, Reply, ShutdownListener, ShutdownNotifier, StoreRequest,
};
use crate::store::{Entry, KvStore};
use crate::tracer::SharedTracer;

/// Delay between leaving the request loop and signalling the listener.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Capacity of the request channel. With one slot a sender waits while the
/// worker is busy with the previous request.
const REQUEST_BUFFER: usize = 1;

// == Store Handle ==
/// Cloneable caller-side handle to a running store actor.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<StoreRequest>,
}

impl StoreHandle {
    // == Spawn ==
    /// Starts the worker on the current tokio runtime with the default grace
    /// period.
    pub fn spawn(store: KvStore, tracer: SharedTracer) -> (Self, JoinHandle<()>) {
        Self::spawn_with_grace(store, tracer, SHUTDOWN_GRACE)
    }

    /// Starts the worker with an explicit shutdown grace period.
    pub fn spawn_with_grace(
        store: KvStore,
        tracer: SharedTracer,
        grace: Duration,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(REQUEST_BUFFER);
        let worker = Worker {
            store,
            rx,
            tracer,
            grace,
            listener: None,
        };
        let handle = tokio::spawn(worker.run());
        (Self { tx }, handle)
    }

    // == Operations ==
    /// Creates `key` for `owner`, or updates it if permitted.
    pub async fn put(&self, key: &str, value: &str, owner: &str) -> Result<()> {
        let (request, rx) = StoreRequest::put(key, value, owner);
        self.call(request, rx).await?
    }

    /// Counted read of `key`.
    pub async fn get(&self, key: &str) -> Result<String> {
        let (request, rx) = StoreRequest::get(key);
        self.call(request, rx).await?
    }

    /// Uncounted inspection of `key`.
    pub async fn list(&self, key: &str) -> Result<Entry> {
        let (request, rx) = StoreRequest::list(key);
        self.call(request, rx).await?
    }

    /// Every entry, least recently touched first.
    pub async fn list_all(&self) -> Result<Vec<Entry>> {
        let (request, rx) = StoreRequest::list_all();
        self.call(request, rx).await
    }

    /// Removes `key` if `owner` may.
    pub async fn delete(&self, key: &str, owner: &str) -> Result<()> {
        let (request, rx) = StoreRequest::delete(key, owner);
        self.call(request, rx).await?
    }

    /// Asks the worker to stop. Does not wait for it to finish; an already
    /// stopped store ignores the request.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(StoreRequest::Shutdown).await;
    }

    /// Registers the single listener told when the worker has stopped.
    /// A later registration replaces an earlier one.
    pub async fn register_shutdown_listener(&self) -> Result<ShutdownListener> {
        let (notifier, listener) = shutdown_channel();
        self.tx
            .send(StoreRequest::RegisterListener { notifier })
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        Ok(listener)
    }

    /// True once the worker has stopped accepting requests.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn call<T>(&self, request: StoreRequest, rx: oneshot::Receiver<T>) -> Result<T> {
        self.tx
            .send(request)
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        rx.await.map_err(|_| StoreError::StoreClosed)
    }
}

// == Worker ==
struct Worker {
    store: KvStore,
    rx: mpsc::Receiver<StoreRequest>,
    tracer: SharedTracer,
    grace: Duration,
    listener: Option<ShutdownNotifier>,
}

impl Worker {
    async fn run(self) {
        let Worker {
            mut store,
            mut rx,
            tracer,
            grace,
            mut listener,
        } = self;

        let mut shutdown_requested = false;
        while let Some(request) = rx.recv().await {
            let kind = request.kind();
            match request {
                StoreRequest::Put {
                    key,
                    value,
                    owner,
                    reply,
                } => deliver(&tracer, kind, reply, store.put(&key, &value, &owner)),
                StoreRequest::Get { key, reply } => {
                    deliver(&tracer, kind, reply, store.get(&key))
                }
                StoreRequest::List { key, reply } => {
                    deliver(&tracer, kind, reply, store.list(&key))
                }
                StoreRequest::ListAll { reply } => {
                    deliver(&tracer, kind, reply, store.list_all())
                }
                StoreRequest::Delete { key, owner, reply } => {
                    deliver(&tracer, kind, reply, store.delete(&key, &owner))
                }
                StoreRequest::RegisterListener { notifier } => {
                    listener = Some(notifier);
                }
                StoreRequest::Shutdown => {
                    shutdown_requested = true;
                    break;
                }
            }
        }

        // Stopped: nothing is dequeued from here on.
        drop(rx);
        if !shutdown_requested {
            tracer.log_warning("Store handles dropped, worker exiting");
            tracer.close();
            return;
        }
        tracer.log_info(&format!("Store stopped with {} keys", store.len()));

        if let Some(notifier) = listener {
            tokio::time::sleep(grace).await;
            if !notifier.notify() {
                tracer.log_warning("Shutdown listener went away before notification");
            }
        }
        tracer.close();
    }
}

/// Sends `value` back to the caller of a `kind` request.
fn deliver<T>(tracer: &SharedTracer, kind: &str, reply: Reply<T>, value: T) {
    if reply.send(value).is_err() {
        tracer.log_warning(&format!("Caller of {} went away before the reply", kind));
    }
}
