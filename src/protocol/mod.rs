//! Wire protocol endpoints
//!
//! Two RPC surfaces make up the monitor protocol: the inbound
//! `monitor.messages` subscription request, handled by [`request`], and the
//! outbound `notify.message` push, built and dispatched by [`notify`].

pub mod notify;
pub mod request;

pub use notify::{IncomingMessage, Notifier, METHOD_NOTIFY};
pub use request::{
    handle_monitor_messages, parse_subscriptions, ErrorCode, ParsedSubscriptions, SubscribeError,
    METHOD_MONITOR,
};
