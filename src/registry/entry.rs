//! Monitor entries and subscription requests

use std::time::{Duration, Instant};

use crate::registry::key::AccountKey;
use crate::registry::namespace::NamespaceSet;
use crate::transport::TransportHandles;

/// One parsed subscription, ready to apply to the registry
///
/// Produced by the request codec, consumed once by
/// [`MonitorRegistry::update`](crate::registry::MonitorRegistry::update).
#[derive(Debug, Clone)]
pub struct SubscriptionRequest {
    pub account: AccountKey,
    /// Hex form of the account key, precomputed so hot-path logging does
    /// not re-encode it
    pub account_hex: String,
    pub namespaces: NamespaceSet,
    pub want_data: bool,
}

impl SubscriptionRequest {
    pub fn new(account: AccountKey, namespaces: NamespaceSet, want_data: bool) -> Self {
        Self {
            account_hex: account.to_string(),
            account,
            namespaces,
            want_data,
        }
    }
}

/// Monitor state for one (account, transport connection) pair
///
/// Owned exclusively by the registry and only ever mutated in place: a
/// renewal widens the namespace set, refreshes the expiry, ORs the
/// want_data flag and backfills missing transport handles. Entries are
/// never removed here; expired ones are filtered out at lookup time.
#[derive(Debug)]
pub struct MonitorEntry {
    pub(super) namespaces: NamespaceSet,
    pub(super) want_data: bool,
    pub(super) transports: TransportHandles,
    pub(super) expires_at: Instant,
}

impl MonitorEntry {
    pub(super) fn new(
        namespaces: NamespaceSet,
        want_data: bool,
        transports: TransportHandles,
        now: Instant,
        ttl: Duration,
    ) -> Self {
        Self {
            namespaces,
            want_data,
            transports,
            expires_at: now + ttl,
        }
    }

    pub(super) fn reset_expiry(&mut self, now: Instant, ttl: Duration) {
        self.expires_at = now + ttl;
    }

    /// Whether the monitor is still live at `now`
    pub fn is_live(&self, now: Instant) -> bool {
        self.expires_at >= now
    }

    pub fn namespaces(&self) -> &NamespaceSet {
        &self.namespaces
    }

    pub fn want_data(&self) -> bool {
        self.want_data
    }

    pub fn transports(&self) -> &TransportHandles {
        &self.transports
    }
}
