//! Account key type

use std::fmt;

/// Length of a serialized account key: one type-tag byte plus 32 raw key bytes
pub const ACCOUNT_KEY_LEN: usize = 33;

/// Identifier of an account's message space
///
/// Carried on the wire as raw bytes; displayed as lowercase hex in logs.
/// Cryptographic verification of the underlying key happens upstream —
/// here it is only an opaque map key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountKey([u8; ACCOUNT_KEY_LEN]);

impl AccountKey {
    /// Parse from raw bytes; must be exactly [`ACCOUNT_KEY_LEN`] long
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; ACCOUNT_KEY_LEN] = bytes.try_into().ok()?;
        Some(Self(raw))
    }

    /// The serialized form: tag byte followed by the raw key
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The leading type-tag byte
    pub fn tag(&self) -> u8 {
        self.0[0]
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountKey({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_length() {
        assert!(AccountKey::from_bytes(&[5u8; ACCOUNT_KEY_LEN]).is_some());
        assert!(AccountKey::from_bytes(&[5u8; 32]).is_none());
        assert!(AccountKey::from_bytes(&[]).is_none());
    }

    #[test]
    fn test_hex_display() {
        let mut raw = [0u8; ACCOUNT_KEY_LEN];
        raw[0] = 0x05;
        raw[32] = 0xff;
        let key = AccountKey::from_bytes(&raw).unwrap();
        let hex = key.to_string();
        assert_eq!(hex.len(), 66);
        assert!(hex.starts_with("05"));
        assert!(hex.ends_with("ff"));
        assert_eq!(key.tag(), 0x05);
    }
}
