//! Push-notification monitors for message storage servers
//!
//! Clients subscribe over a persistent connection (a "monitor") to hear
//! about new messages stored for an account in selected namespaces. This
//! crate provides the pieces a storage server wires together:
//!
//! - [`bencode`] — the strict tagged binary encoding used on the wire
//! - [`registry`] — the concurrent monitor registry: batch-atomic
//!   subscription updates, lock-light fanout lookups, lazy expiry
//! - [`protocol`] — the `monitor.messages` request codec and the
//!   `notify.message` fanout
//! - [`transport`] — handles for the two push transports (message-queue
//!   connections and QUIC connections)
//!
//! Account-key verification, message storage and the transports themselves
//! live outside this crate; it only decides who gets told about a message
//! and what bytes they are sent.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pushmon_rs::{handle_monitor_messages, MonitorRegistry, Notifier};
//! use pushmon_rs::{QueueConnectionId, TransportHandles};
//!
//! let registry = Arc::new(MonitorRegistry::new());
//!
//! // Subscription request arriving over a queue connection:
//! let caller = TransportHandles::queue(QueueConnectionId::new(conn_id));
//! let reply = handle_monitor_messages(&registry, request_body, &caller);
//!
//! // New message landing in storage:
//! let notifier = Notifier::new(registry.clone(), queue_engine);
//! notifier.notify_new_message(&message);
//! ```

pub mod bencode;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod transport;

pub use error::DecodeError;
pub use protocol::notify::{IncomingMessage, Notifier, METHOD_NOTIFY};
pub use protocol::request::{
    handle_monitor_messages, ErrorCode, SubscribeError, METHOD_MONITOR,
};
pub use registry::{
    merge_namespaces, AccountKey, MonitorConfig, MonitorRegistry, NamespaceId, NamespaceSet,
    SubscriptionRequest, ACCOUNT_KEY_LEN,
};
pub use transport::{
    NotifyTarget, OutboundPush, QueueConnectionId, QueueSender, QuicConnection, TransportHandles,
};
