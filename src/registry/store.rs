//! Monitor registry implementation
//!
//! The central store of active monitors, keyed by account. One
//! reader-writer lock guards the whole map: renewal batches take the
//! exclusive mode, fanout lookups the shared mode, and lookups release the
//! lock before any transport send so a slow connection cannot stall
//! subscription processing or other fanouts.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;

use super::config::MonitorConfig;
use super::entry::{MonitorEntry, SubscriptionRequest};
use super::key::AccountKey;
use super::namespace::NamespaceId;
use crate::transport::{NotifyTarget, TransportHandles};

/// Central registry of active monitors
///
/// Thread-safe via `RwLock`. The fanout path is read-heavy and must never
/// wait on another reader; only `update` takes the write side.
pub struct MonitorRegistry {
    /// Account key to monitor entries, one per transport connection
    monitors: RwLock<HashMap<AccountKey, Vec<MonitorEntry>>>,

    /// Configuration
    config: MonitorConfig,
}

impl MonitorRegistry {
    /// Create a registry with default configuration
    pub fn new() -> Self {
        Self::with_config(MonitorConfig::default())
    }

    /// Create a registry with custom configuration
    pub fn with_config(config: MonitorConfig) -> Self {
        Self {
            monitors: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Apply a batch of subscriptions arriving over one caller connection.
    ///
    /// The whole batch runs under a single exclusive critical section, so
    /// concurrent lookups never observe a partially applied batch. A
    /// request matching an existing entry for the same connection renews
    /// it in place: namespace union, expiry reset, want_data OR, and
    /// backfill of any transport handle the entry lacks. Anything else
    /// inserts a fresh entry for the caller's connection.
    pub fn update(&self, subs: Vec<SubscriptionRequest>, caller: &TransportHandles) {
        let now = Instant::now();
        let mut monitors = self.monitors.write().expect("lock poisoned");
        for sub in subs {
            let entries = monitors.entry(sub.account).or_default();
            if let Some(entry) = entries
                .iter_mut()
                .find(|e| e.transports.shares_connection(caller))
            {
                let existing = std::mem::take(&mut entry.namespaces);
                entry.namespaces = existing.merge(sub.namespaces);
                tracing::debug!(
                    account = %sub.account_hex,
                    namespaces = %entry.namespaces,
                    "monitor subscription renewed"
                );
                entry.reset_expiry(now, self.config.ttl);
                entry.want_data |= sub.want_data;
                entry.transports.backfill(caller);
            } else {
                tracing::debug!(
                    account = %sub.account_hex,
                    namespaces = %sub.namespaces,
                    "new monitor subscription"
                );
                entries.push(MonitorEntry::new(
                    sub.namespaces,
                    sub.want_data,
                    caller.clone(),
                    now,
                    self.config.ttl,
                ));
            }
        }
    }

    /// Collect the live targets monitoring `namespace` for `account`.
    ///
    /// Returns metadata-only targets and with-data targets separately.
    /// Expired entries are skipped, not removed; eviction belongs to an
    /// external sweep. Runs entirely under the shared lock and performs no
    /// I/O, so concurrent lookups never block each other.
    pub fn lookup_targets(
        &self,
        account: &AccountKey,
        namespace: NamespaceId,
        now: Instant,
    ) -> (Vec<NotifyTarget>, Vec<NotifyTarget>) {
        let mut metadata_only = Vec::new();
        let mut with_data = Vec::new();

        let monitors = self.monitors.read().expect("lock poisoned");
        if let Some(entries) = monitors.get(account) {
            for entry in entries {
                if !entry.is_live(now) || !entry.namespaces.contains(namespace) {
                    continue;
                }
                // An entry always carries a transport; if one somehow does
                // not, it is skipped rather than dispatched.
                if let Some(target) = entry.transports.notify_target() {
                    if entry.want_data {
                        with_data.push(target);
                    } else {
                        metadata_only.push(target);
                    }
                }
            }
        }

        (metadata_only, with_data)
    }

    /// Number of accounts with at least one monitor entry
    pub fn account_count(&self) -> usize {
        self.monitors.read().expect("lock poisoned").len()
    }

    /// Total number of monitor entries, expired ones included
    pub fn entry_count(&self) -> usize {
        self.monitors
            .read()
            .expect("lock poisoned")
            .values()
            .map(Vec::len)
            .sum()
    }
}

impl Default for MonitorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
