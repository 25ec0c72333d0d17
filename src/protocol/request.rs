//! `monitor.messages` request codec
//!
//! The request body is a single opaque byte string: either one bencoded
//! dict (one subscription item) or a bencoded list of such dicts (zero or
//! more). Item dicts carry, under sorted single-letter keys:
//!
//! ```text
//! a  account key bytes (tag byte + raw key)
//! d  optional int bool: deliver full message payloads (default: metadata only)
//! n  list of namespace ids to monitor            (exactly one of n / w)
//! w  nonzero int: monitor all namespaces         (exactly one of n / w)
//! ```
//!
//! Validation is all-or-nothing: any shape or parse violation anywhere in
//! the input — including inside one element of a list — rejects the whole
//! request with a single `BAD_ARGS` reply and leaves the registry
//! untouched. On success the reply mirrors the request shape, one
//! `{"success": 1}` dict per accepted item.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;

use crate::bencode::{self, Value, DICT, END, LIST};
use crate::registry::{
    AccountKey, MonitorRegistry, NamespaceId, NamespaceSet, SubscriptionRequest,
};
use crate::transport::TransportHandles;

/// RPC method name for subscription requests
pub const METHOD_MONITOR: &str = "monitor.messages";

const KEY_ACCOUNT: &[u8] = b"a";
const KEY_WANT_DATA: &[u8] = b"d";
const KEY_NAMESPACES: &[u8] = b"n";
const KEY_ALL_NAMESPACES: &[u8] = b"w";

/// Wire error codes carried in the `errcode` field of an error reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed or unparsable request
    BadArgs = 1,
}

/// A rejected `monitor.messages` request
#[derive(Debug, Clone)]
pub struct SubscribeError {
    pub code: ErrorCode,
    pub message: String,
}

impl SubscribeError {
    fn bad_args(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::BadArgs,
            message: message.into(),
        }
    }

    /// Encode the single error reply sent for a rejected request
    pub fn to_reply(&self) -> Bytes {
        let mut dict = BTreeMap::new();
        dict.insert(Bytes::from_static(b"errcode"), Value::Int(self.code as i64));
        dict.insert(Bytes::from_static(b"error"), Value::str(&self.message));
        bencode::encode(&Value::Dict(dict))
    }
}

impl fmt::Display for SubscribeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid arguments: {}", self.message)
    }
}

impl std::error::Error for SubscribeError {}

/// Successful parse: the mirrored acceptance reply plus the materialized
/// subscription batch
#[derive(Debug)]
pub struct ParsedSubscriptions {
    pub reply: Bytes,
    pub subs: Vec<SubscriptionRequest>,
}

/// Parse and validate one `monitor.messages` request body
pub fn parse_subscriptions(data: &[u8]) -> Result<ParsedSubscriptions, SubscribeError> {
    if data.len() < 2 || !(data[0] == DICT || data[0] == LIST) || data[data.len() - 1] != END {
        return Err(SubscribeError::bad_args(
            "monitor.messages takes a single bencoded dict or list parameter",
        ));
    }

    let value = bencode::decode(data)
        .map_err(|_| SubscribeError::bad_args("failed to parse monitor.messages request"))?;

    match value {
        Value::Dict(item) => {
            let sub = parse_item(&item)?;
            Ok(ParsedSubscriptions {
                reply: bencode::encode(&accepted()),
                subs: vec![sub],
            })
        }
        Value::List(items) => {
            let mut subs = Vec::with_capacity(items.len());
            let mut replies = Vec::with_capacity(items.len());
            for item in &items {
                let dict = item.as_dict().ok_or_else(|| {
                    SubscribeError::bad_args("subscription list items must be dicts")
                })?;
                subs.push(parse_item(dict)?);
                replies.push(accepted());
            }
            Ok(ParsedSubscriptions {
                reply: bencode::encode(&Value::List(replies)),
                subs,
            })
        }
        _ => Err(SubscribeError::bad_args(
            "monitor.messages takes a single bencoded dict or list parameter",
        )),
    }
}

/// Handle one `monitor.messages` request end to end: parse, apply, reply.
///
/// Returns the wire reply in both outcomes. The registry is only touched
/// when the entire request validated, and an empty list request skips the
/// update altogether.
pub fn handle_monitor_messages(
    registry: &MonitorRegistry,
    data: &[u8],
    caller: &TransportHandles,
) -> Bytes {
    match parse_subscriptions(data) {
        Ok(parsed) => {
            if !parsed.subs.is_empty() {
                registry.update(parsed.subs, caller);
            }
            parsed.reply
        }
        Err(err) => err.to_reply(),
    }
}

fn accepted() -> Value {
    let mut dict = BTreeMap::new();
    dict.insert(Bytes::from_static(b"success"), Value::Int(1));
    Value::Dict(dict)
}

fn parse_item(item: &BTreeMap<Bytes, Value>) -> Result<SubscriptionRequest, SubscribeError> {
    for key in item.keys() {
        if ![KEY_ACCOUNT, KEY_WANT_DATA, KEY_NAMESPACES, KEY_ALL_NAMESPACES]
            .contains(&key.as_ref())
        {
            return Err(SubscribeError::bad_args("unknown key in subscription item"));
        }
    }

    let account = item
        .get(KEY_ACCOUNT)
        .and_then(Value::as_bytes)
        .ok_or_else(|| SubscribeError::bad_args("missing account key"))?;
    let account = AccountKey::from_bytes(account)
        .ok_or_else(|| SubscribeError::bad_args("invalid account key"))?;

    let want_data = match item.get(KEY_WANT_DATA) {
        None => false,
        Some(v) => {
            v.as_int()
                .ok_or_else(|| SubscribeError::bad_args("data flag must be an integer"))?
                != 0
        }
    };

    let namespaces = match (item.get(KEY_NAMESPACES), item.get(KEY_ALL_NAMESPACES)) {
        (Some(_), Some(_)) => {
            return Err(SubscribeError::bad_args(
                "give either a namespace list or the wildcard, not both",
            ));
        }
        (None, None) => return Err(SubscribeError::bad_args("missing namespaces")),
        (Some(list), None) => {
            let list = list
                .as_list()
                .ok_or_else(|| SubscribeError::bad_args("namespaces must be a list of integers"))?;
            let mut ids = Vec::with_capacity(list.len());
            for v in list {
                let n = v
                    .as_int()
                    .ok_or_else(|| SubscribeError::bad_args("namespaces must be a list of integers"))?;
                let n = i16::try_from(n)
                    .map_err(|_| SubscribeError::bad_args("namespace out of range"))?;
                ids.push(NamespaceId::new(n));
            }
            NamespaceSet::from_ids(ids)
        }
        (None, Some(wildcard)) => {
            let flag = wildcard
                .as_int()
                .ok_or_else(|| SubscribeError::bad_args("invalid namespace wildcard"))?;
            if flag == 0 {
                return Err(SubscribeError::bad_args("invalid namespace wildcard"));
            }
            NamespaceSet::All
        }
    };

    Ok(SubscriptionRequest::new(account, namespaces, want_data))
}
