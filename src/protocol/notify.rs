//! `notify.message` fanout
//!
//! Every newly stored message is offered to the registry; live monitors
//! matching its account and namespace receive a push. The notification is
//! encoded once into a buffer sized up front, and the lock is long gone by
//! the time any transport send happens.

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use crate::bencode::DictProducer;
use crate::registry::{AccountKey, MonitorRegistry, NamespaceId};
use crate::transport::QueueSender;

/// RPC method name for outbound notifications
pub const METHOD_NOTIFY: &str = "notify.message";

/// A newly stored message, as handed over by the ingestion pipeline
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub account: AccountKey,
    pub hash: String,
    pub namespace: NamespaceId,
    pub created_at: SystemTime,
    pub expires_at: SystemTime,
    pub data: Bytes,
}

/// Dispatches `notify.message` pushes for newly stored messages
pub struct Notifier {
    registry: Arc<MonitorRegistry>,
    queue: Arc<dyn QueueSender>,
}

impl Notifier {
    pub fn new(registry: Arc<MonitorRegistry>, queue: Arc<dyn QueueSender>) -> Self {
        Self { registry, queue }
    }

    /// Notify every live monitor matching `msg`'s account and namespace.
    ///
    /// Metadata-only targets get the encoded metadata dict; with-data
    /// targets get the same bytes with the raw payload appended. Sends are
    /// fire-and-forget; per-target failures are the transport's problem.
    pub fn notify_new_message(&self, msg: &IncomingMessage) {
        let (metadata_only, with_data) =
            self.registry
                .lookup_targets(&msg.account, msg.namespace, Instant::now());

        if metadata_only.is_empty() && with_data.is_empty() {
            return;
        }

        tracing::debug!(
            account = %msg.account,
            namespace = %msg.namespace,
            metadata_only = metadata_only.len(),
            with_data = with_data.len(),
            "relaying message notification"
        );

        // The notification is a dict with keys (in order):
        // - @ account key
        // - h message hash
        // - n message namespace
        // - t message creation time (epoch ms)
        // - z message expiry (epoch ms)
        // - ~ message payload (with-data targets only)
        const METADATA_CAPACITY: usize = 2       // d...e
                                       + 3 + 36  // 1:@ and 33:[33-byte account key]
                                       + 3 + 46  // 1:h and 43:[43-byte base64 unpadded hash]
                                       + 3 + 8   // 1:n and i-32768e
                                       + 3 + 16  // 1:t and i1658784776010e plus a byte to grow
                                       + 3 + 16  // 1:z and i1658784776010e plus a byte to grow
                                       + 10;     // safety margin

        let capacity = if with_data.is_empty() {
            METADATA_CAPACITY
        } else {
            METADATA_CAPACITY // all the metadata above
                + 3           // 1:~
                + 8           // 76800: plus a couple bytes to grow
                + msg.data.len()
        };

        let mut d = DictProducer::with_capacity(capacity);
        d.append_bytes("@", msg.account.as_bytes());
        d.append_bytes("h", msg.hash.as_bytes());
        d.append_int("n", i64::from(msg.namespace.as_i16()));
        d.append_int("t", epoch_ms(msg.created_at));
        d.append_int("z", epoch_ms(msg.expires_at));

        if !metadata_only.is_empty() {
            let payload = d.view();
            for target in &metadata_only {
                target.send(&*self.queue, METHOD_NOTIFY, payload);
            }
        }

        if !with_data.is_empty() {
            d.append_bytes("~", &msg.data);
            let payload = d.view();
            for target in &with_data {
                target.send(&*self.queue, METHOD_NOTIFY, payload);
            }
        }
    }
}

fn epoch_ms(t: SystemTime) -> i64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::bencode;
    use crate::registry::{NamespaceSet, SubscriptionRequest, ACCOUNT_KEY_LEN};
    use crate::transport::{QueueConnectionId, QuicConnection, TransportHandles};

    /// Queue engine stand-in that records every send
    #[derive(Default)]
    struct RecordingQueue {
        sent: Mutex<Vec<(QueueConnectionId, String, Vec<u8>)>>,
    }

    impl QueueSender for RecordingQueue {
        fn send(&self, conn: QueueConnectionId, method: &str, payload: &[u8]) {
            self.sent
                .lock()
                .unwrap()
                .push((conn, method.to_owned(), payload.to_vec()));
        }
    }

    fn key(tag: u8) -> AccountKey {
        AccountKey::from_bytes(&[tag; ACCOUNT_KEY_LEN]).unwrap()
    }

    fn msg(account: AccountKey, namespace: i16, data: &[u8]) -> IncomingMessage {
        IncomingMessage {
            account,
            hash: "aGFzaGhhc2hoYXNoaGFzaGhhc2hoYXNoaGFzaGhhc2g".into(),
            namespace: NamespaceId::new(namespace),
            created_at: UNIX_EPOCH + Duration::from_millis(1_658_784_776_010),
            expires_at: UNIX_EPOCH + Duration::from_millis(1_658_784_790_010),
            data: Bytes::copy_from_slice(data),
        }
    }

    fn subscribe(registry: &MonitorRegistry, account: AccountKey, ns: &[i16], want_data: bool) {
        let ids = ns.iter().map(|&n| NamespaceId::new(n)).collect();
        registry.update(
            vec![SubscriptionRequest::new(
                account,
                NamespaceSet::from_ids(ids),
                want_data,
            )],
            &TransportHandles::queue(QueueConnectionId::new(1)),
        );
    }

    #[test]
    fn test_no_monitors_no_sends() {
        let registry = Arc::new(MonitorRegistry::new());
        let queue = Arc::new(RecordingQueue::default());
        let notifier = Notifier::new(registry, queue.clone());

        notifier.notify_new_message(&msg(key(1), 7, b"payload"));
        assert!(queue.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_metadata_notification_fields() {
        let registry = Arc::new(MonitorRegistry::new());
        let queue = Arc::new(RecordingQueue::default());
        subscribe(&registry, key(1), &[7], false);
        let notifier = Notifier::new(registry, queue.clone());

        let message = msg(key(1), 7, b"payload");
        notifier.notify_new_message(&message);

        let sent = queue.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (conn, method, payload) = &sent[0];
        assert_eq!(*conn, QueueConnectionId::new(1));
        assert_eq!(method, METHOD_NOTIFY);

        let value = bencode::decode(payload).unwrap();
        let dict = value.as_dict().unwrap();
        assert_eq!(
            dict.get(b"@".as_slice()).unwrap().as_bytes().unwrap(),
            message.account.as_bytes()
        );
        assert_eq!(
            dict.get(b"h".as_slice()).unwrap().as_str(),
            Some(message.hash.as_str())
        );
        assert_eq!(dict.get(b"n".as_slice()).unwrap().as_int(), Some(7));
        assert_eq!(
            dict.get(b"t".as_slice()).unwrap().as_int(),
            Some(1_658_784_776_010)
        );
        assert_eq!(
            dict.get(b"z".as_slice()).unwrap().as_int(),
            Some(1_658_784_790_010)
        );
        // No payload field for metadata-only targets.
        assert!(dict.get(b"~".as_slice()).is_none());
    }

    #[test]
    fn test_with_data_appends_payload() {
        let registry = Arc::new(MonitorRegistry::new());
        let queue = Arc::new(RecordingQueue::default());
        subscribe(&registry, key(1), &[7], true);
        let notifier = Notifier::new(registry, queue.clone());

        notifier.notify_new_message(&msg(key(1), 7, b"payload"));

        let sent = queue.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let value = bencode::decode(&sent[0].2).unwrap();
        let dict = value.as_dict().unwrap();
        assert_eq!(
            dict.get(b"~".as_slice()).unwrap().as_bytes().unwrap().as_ref(),
            b"payload"
        );
    }

    #[test]
    fn test_mixed_targets_share_metadata_prefix() {
        let registry = Arc::new(MonitorRegistry::new());
        let queue = Arc::new(RecordingQueue::default());
        // Two monitors on different queue connections, one of each kind.
        let ids = vec![NamespaceId::new(7)];
        registry.update(
            vec![SubscriptionRequest::new(
                key(1),
                NamespaceSet::from_ids(ids.clone()),
                false,
            )],
            &TransportHandles::queue(QueueConnectionId::new(1)),
        );
        registry.update(
            vec![SubscriptionRequest::new(
                key(1),
                NamespaceSet::from_ids(ids),
                true,
            )],
            &TransportHandles::queue(QueueConnectionId::new(2)),
        );
        let notifier = Notifier::new(registry, queue.clone());

        notifier.notify_new_message(&msg(key(1), 7, b"payload"));

        let sent = queue.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        let meta = &sent[0].2;
        let full = &sent[1].2;
        assert!(full.len() > meta.len());
        // Everything up to the metadata terminator is byte-identical.
        assert_eq!(&meta[..meta.len() - 1], &full[..meta.len() - 1]);
    }

    #[test]
    fn test_quic_target_receives_push() {
        let registry = Arc::new(MonitorRegistry::new());
        let queue = Arc::new(RecordingQueue::default());
        let (quic, mut rx) = QuicConnection::new(9);
        registry.update(
            vec![SubscriptionRequest::new(
                key(1),
                NamespaceSet::All,
                false,
            )],
            &TransportHandles::quic(quic),
        );
        let notifier = Notifier::new(registry, queue.clone());

        notifier.notify_new_message(&msg(key(1), -4, b""));

        assert!(queue.sent.lock().unwrap().is_empty());
        let push = rx.try_recv().unwrap();
        assert_eq!(push.method, METHOD_NOTIFY);
        assert!(bencode::decode(&push.payload).is_ok());
    }

    #[test]
    fn test_namespace_mismatch_sends_nothing() {
        let registry = Arc::new(MonitorRegistry::new());
        let queue = Arc::new(RecordingQueue::default());
        subscribe(&registry, key(1), &[1, 3, 5], false);
        let notifier = Notifier::new(registry, queue.clone());

        notifier.notify_new_message(&msg(key(1), 2, b""));
        assert!(queue.sent.lock().unwrap().is_empty());
    }
}
