//! Transport handles used to push notifications
//!
//! Two connection kinds can carry a push: a message-queue connection,
//! identified by an opaque id and driven through the engine's
//! [`QueueSender`], and a QUIC connection, held as a shared
//! [`QuicConnection`] handle whose lifetime is that of its longest holder.
//! Delivery on both is fire-and-forget; outcome tracking, retries and
//! timeouts live entirely in the transport layer.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

/// Opaque identifier for a message-queue connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueConnectionId(u64);

impl QueueConnectionId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl From<u64> for QueueConnectionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for QueueConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Send primitive implemented by the message-queue engine
///
/// Delivery failures are not surfaced; the engine owns that policy.
pub trait QueueSender: Send + Sync {
    fn send(&self, conn: QueueConnectionId, method: &str, payload: &[u8]);
}

/// An outbound push queued on a QUIC connection
#[derive(Debug, Clone)]
pub struct OutboundPush {
    pub method: &'static str,
    pub payload: Bytes,
}

/// Shared handle to a QUIC connection
///
/// Identity is pointer identity: two handles refer to the same connection
/// exactly when they are clones of the same `Arc`. Pushes land on an
/// unbounded outbound queue the connection driver drains; once the driver
/// is gone, pushes are silently dropped.
#[derive(Debug)]
pub struct QuicConnection {
    id: u64,
    outbound: mpsc::UnboundedSender<OutboundPush>,
}

impl QuicConnection {
    /// Create a connection handle and the receiver its driver drains
    pub fn new(id: u64) -> (Arc<Self>, mpsc::UnboundedReceiver<OutboundPush>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { id, outbound: tx }), rx)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queue a push on the connection
    pub fn send(&self, method: &'static str, payload: &[u8]) {
        let _ = self.outbound.send(OutboundPush {
            method,
            payload: Bytes::copy_from_slice(payload),
        });
    }
}

/// The transport handle pair attached to a monitor entry
///
/// At least one handle is always set; the constructors make any other
/// state unrepresentable.
#[derive(Debug, Clone)]
pub struct TransportHandles {
    queue: Option<QueueConnectionId>,
    quic: Option<Arc<QuicConnection>>,
}

impl TransportHandles {
    pub fn queue(conn: QueueConnectionId) -> Self {
        Self {
            queue: Some(conn),
            quic: None,
        }
    }

    pub fn quic(conn: Arc<QuicConnection>) -> Self {
        Self {
            queue: None,
            quic: Some(conn),
        }
    }

    pub fn both(queue: QueueConnectionId, quic: Arc<QuicConnection>) -> Self {
        Self {
            queue: Some(queue),
            quic: Some(quic),
        }
    }

    pub fn queue_id(&self) -> Option<QueueConnectionId> {
        self.queue
    }

    pub fn quic_handle(&self) -> Option<&Arc<QuicConnection>> {
        self.quic.as_ref()
    }

    /// Whether `caller` carries a handle to one of the same connections
    pub(crate) fn shares_connection(&self, caller: &TransportHandles) -> bool {
        let queue_match = matches!((self.queue, caller.queue), (Some(a), Some(b)) if a == b);
        let quic_match = matches!(
            (&self.quic, &caller.quic),
            (Some(a), Some(b)) if Arc::ptr_eq(a, b)
        );
        queue_match || quic_match
    }

    /// Fill in any handle `caller` has that this pair lacks. Handles that
    /// are already set are never overwritten.
    pub(crate) fn backfill(&mut self, caller: &TransportHandles) {
        if self.queue.is_none() {
            self.queue = caller.queue;
        }
        if self.quic.is_none() {
            self.quic = caller.quic.clone();
        }
    }

    /// The target deliveries go to: the queue connection when set, the
    /// QUIC connection otherwise
    pub fn notify_target(&self) -> Option<NotifyTarget> {
        if let Some(conn) = self.queue {
            return Some(NotifyTarget::Queue(conn));
        }
        self.quic.clone().map(NotifyTarget::Quic)
    }
}

/// A resolved notification destination
#[derive(Debug, Clone)]
pub enum NotifyTarget {
    Queue(QueueConnectionId),
    Quic(Arc<QuicConnection>),
}

impl NotifyTarget {
    /// Dispatch `payload` to this destination, fire-and-forget
    pub fn send(&self, queue: &dyn QueueSender, method: &'static str, payload: &[u8]) {
        match self {
            NotifyTarget::Queue(conn) => queue.send(*conn, method, payload),
            NotifyTarget::Quic(conn) => conn.send(method, payload),
        }
    }
}
