//! Strict bencode decoder

use std::collections::BTreeMap;

use bytes::Bytes;

use super::value::Value;
use super::{DICT, END, INT, LIST};
use crate::error::DecodeError;

/// Maximum nesting depth for lists/dicts (prevent stack overflow)
const MAX_NESTING_DEPTH: usize = 32;

/// Decode a single bencode value, requiring the whole input to be consumed
pub fn decode(data: &[u8]) -> Result<Value, DecodeError> {
    let mut decoder = Decoder { data, pos: 0 };
    let value = decoder.value(0)?;
    if decoder.pos != data.len() {
        return Err(DecodeError::TrailingData);
    }
    Ok(value)
}

struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Decoder<'_> {
    fn peek(&self) -> Result<u8, DecodeError> {
        self.data.get(self.pos).copied().ok_or(DecodeError::UnexpectedEof)
    }

    fn value(&mut self, depth: usize) -> Result<Value, DecodeError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(DecodeError::NestingTooDeep);
        }
        match self.peek()? {
            INT => self.int(),
            b'0'..=b'9' => Ok(Value::Bytes(self.string()?)),
            LIST => self.list(depth),
            DICT => self.dict(depth),
            other => Err(DecodeError::UnexpectedMarker(other)),
        }
    }

    fn int(&mut self) -> Result<Value, DecodeError> {
        self.pos += 1; // 'i'
        let negative = self.peek()? == b'-';
        if negative {
            self.pos += 1;
        }
        let digits_start = self.pos;
        while self.peek()? != END {
            if !self.data[self.pos].is_ascii_digit() {
                return Err(DecodeError::InvalidInt);
            }
            self.pos += 1;
        }
        let digits = &self.data[digits_start..self.pos];
        self.pos += 1; // 'e'
        if digits.is_empty() {
            return Err(DecodeError::InvalidInt);
        }
        if digits[0] == b'0' && (digits.len() > 1 || negative) {
            return Err(DecodeError::InvalidInt);
        }
        // Accumulate negated so i64::MIN survives the fold.
        let mut n: i64 = 0;
        for &d in digits {
            n = n
                .checked_mul(10)
                .and_then(|n| n.checked_sub(i64::from(d - b'0')))
                .ok_or(DecodeError::InvalidInt)?;
        }
        if !negative {
            n = n.checked_neg().ok_or(DecodeError::InvalidInt)?;
        }
        Ok(Value::Int(n))
    }

    fn string(&mut self) -> Result<Bytes, DecodeError> {
        let len_start = self.pos;
        while self.peek()? != b':' {
            if !self.data[self.pos].is_ascii_digit() {
                return Err(DecodeError::InvalidLength);
            }
            self.pos += 1;
        }
        let digits = &self.data[len_start..self.pos];
        self.pos += 1; // ':'
        if digits.is_empty() || (digits.len() > 1 && digits[0] == b'0') {
            return Err(DecodeError::InvalidLength);
        }
        let mut len: usize = 0;
        for &d in digits {
            len = len
                .checked_mul(10)
                .and_then(|l| l.checked_add(usize::from(d - b'0')))
                .ok_or(DecodeError::InvalidLength)?;
        }
        if self.data.len() - self.pos < len {
            return Err(DecodeError::UnexpectedEof);
        }
        let bytes = Bytes::copy_from_slice(&self.data[self.pos..self.pos + len]);
        self.pos += len;
        Ok(bytes)
    }

    fn list(&mut self, depth: usize) -> Result<Value, DecodeError> {
        self.pos += 1; // 'l'
        let mut items = Vec::new();
        while self.peek()? != END {
            items.push(self.value(depth + 1)?);
        }
        self.pos += 1; // 'e'
        Ok(Value::List(items))
    }

    fn dict(&mut self, depth: usize) -> Result<Value, DecodeError> {
        self.pos += 1; // 'd'
        let mut entries = BTreeMap::new();
        let mut last_key: Option<Bytes> = None;
        while self.peek()? != END {
            if !self.peek()?.is_ascii_digit() {
                return Err(DecodeError::UnexpectedMarker(self.peek()?));
            }
            let key = self.string()?;
            if let Some(prev) = &last_key {
                if key <= *prev {
                    return Err(DecodeError::MisorderedKey);
                }
            }
            let value = self.value(depth + 1)?;
            last_key = Some(key.clone());
            entries.insert(key, value);
        }
        self.pos += 1; // 'e'
        Ok(Value::Dict(entries))
    }
}
