//! Monitor registry for push-notification subscriptions
//!
//! The registry tracks which connections want to hear about new messages
//! for which accounts and namespaces. Subscription batches apply atomically
//! under one write lock; fanout lookups share the read lock and collect
//! plain transport handles, so no network send ever happens while the lock
//! is held.
//!
//! # Architecture
//!
//! ```text
//!                       Arc<MonitorRegistry>
//!                ┌───────────────────────────────┐
//!                │ monitors: HashMap<AccountKey, │
//!                │   Vec<MonitorEntry {          │
//!                │     namespaces, want_data,    │
//!                │     transports, expires_at,   │
//!                │   }>                          │
//!                │ >                             │
//!                └───────────┬───────────────────┘
//!                            │
//!          ┌─────────────────┼─────────────────┐
//!          │                 │                 │
//!          ▼                 ▼                 ▼
//!    [subscriber]      [subscriber]      [new message]
//!    update(batch)     update(batch)     lookup_targets()
//!          │                 │                 │
//!          └── write lock ───┘                 └──► send notify.message
//! ```

pub mod config;
pub mod entry;
pub mod key;
pub mod namespace;
pub mod store;

pub use config::MonitorConfig;
pub use entry::{MonitorEntry, SubscriptionRequest};
pub use key::{AccountKey, ACCOUNT_KEY_LEN};
pub use namespace::{merge_namespaces, NamespaceId, NamespaceSet};
pub use store::MonitorRegistry;
