//! Request Envelopes
//!
//! One message per store operation. Each envelope owns the sending half of
//! a one-shot reply channel; the caller keeps the receiving half and awaits
//! exactly one reply.

use tokio::sync::oneshot;

use crate::error::Result;
use crate::store::Entry;

/// Reply handle carried by an envelope.
pub type Reply<T> = oneshot::Sender<T>;

// == Store Request ==
#[derive(Debug)]
pub enum StoreRequest {
    Put {
        key: String,
        value: String,
        owner: String,
        reply: Reply<Result<()>>,
    },
    Get {
        key: String,
        reply: Reply<Result<String>>,
    },
    List {
        key: String,
        reply: Reply<Result<Entry>>,
    },
    ListAll {
        reply: Reply<Vec<Entry>>,
    },
    Delete {
        key: String,
        owner: String,
        reply: Reply<Result<()>>,
    },
    RegisterListener {
        notifier: ShutdownNotifier,
    },
    Shutdown,
}

impl StoreRequest {
    pub fn put(
        key: impl Into<String>,
        value: impl Into<String>,
        owner: impl Into<String>,
    ) -> (Self, oneshot::Receiver<Result<()>>) {
        let (reply, rx) = oneshot::channel();
        let request = StoreRequest::Put {
            key: key.into(),
            value: value.into(),
            owner: owner.into(),
            reply,
        };
        (request, rx)
    }

    pub fn get(key: impl Into<String>) -> (Self, oneshot::Receiver<Result<String>>) {
        let (reply, rx) = oneshot::channel();
        (StoreRequest::Get { key: key.into(), reply }, rx)
    }

    pub fn list(key: impl Into<String>) -> (Self, oneshot::Receiver<Result<Entry>>) {
        let (reply, rx) = oneshot::channel();
        (StoreRequest::List { key: key.into(), reply }, rx)
    }

    pub fn list_all() -> (Self, oneshot::Receiver<Vec<Entry>>) {
        let (reply, rx) = oneshot::channel();
        (StoreRequest::ListAll { reply }, rx)
    }

    pub fn delete(
        key: impl Into<String>,
        owner: impl Into<String>,
    ) -> (Self, oneshot::Receiver<Result<()>>) {
        let (reply, rx) = oneshot::channel();
        let request = StoreRequest::Delete {
            key: key.into(),
            owner: owner.into(),
            reply,
        };
        (request, rx)
    }

    /// Operation name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreRequest::Put { .. } => "put",
            StoreRequest::Get { .. } => "get",
            StoreRequest::List { .. } => "list",
            StoreRequest::ListAll { .. } => "list_all",
            StoreRequest::Delete { .. } => "delete",
            StoreRequest::RegisterListener { .. } => "register_listener",
            StoreRequest::Shutdown => "shutdown",
        }
    }
}

// == Shutdown Handshake ==
/// Creates the single-use channel between the store and whoever waits for
/// it to finish draining.
pub fn shutdown_channel() -> (ShutdownNotifier, ShutdownListener) {
    let (tx, rx) = oneshot::channel();
    (ShutdownNotifier { tx }, ShutdownListener { rx })
}

/// Store side of the handshake. Consumed by the one notification it sends.
#[derive(Debug)]
pub struct ShutdownNotifier {
    tx: oneshot::Sender<bool>,
}

impl ShutdownNotifier {
    /// Signals that the store has stopped. Returns false if nobody listens.
    pub fn notify(self) -> bool {
        self.tx.send(true).is_ok()
    }
}

/// Waiting side of the handshake, held by the HTTP server.
#[derive(Debug)]
pub struct ShutdownListener {
    rx: oneshot::Receiver<bool>,
}

impl ShutdownListener {
    /// Resolves once the store signals. Yields false if the store went away
    /// without signalling.
    pub async fn wait(self) -> bool {
        self.rx.await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_kinds() {
        assert_eq!(StoreRequest::put("k", "v", "o").0.kind(), "put");
        assert_eq!(StoreRequest::get("k").0.kind(), "get");
        assert_eq!(StoreRequest::list("k").0.kind(), "list");
        assert_eq!(StoreRequest::list_all().0.kind(), "list_all");
        assert_eq!(StoreRequest::delete("k", "o").0.kind(), "delete");
        assert_eq!(StoreRequest::Shutdown.kind(), "shutdown");
    }

    #[tokio::test]
    async fn test_reply_reaches_caller() {
        let (request, rx) = StoreRequest::get("k");
        match request {
            StoreRequest::Get { key, reply } => {
                assert_eq!(key, "k");
                reply.send(Ok("v".to_string())).unwrap();
            }
            other => panic!("unexpected request {:?}", other.kind()),
        }
        assert_eq!(rx.await.unwrap(), Ok("v".to_string()));
    }

    #[tokio::test]
    async fn test_shutdown_handshake() {
        let (notifier, listener) = shutdown_channel();
        assert!(notifier.notify());
        assert!(listener.wait().await);
    }

    #[tokio::test]
    async fn test_listener_sees_false_when_notifier_dropped() {
        let (notifier, listener) = shutdown_channel();
        drop(notifier);
        assert!(!listener.wait().await);
    }
}
