//! Compressed encoding of a property list.
//!
//! Layout before compression: for every property, the key followed by
//! [`KEY_TERMINATOR`], then the value followed by [`VALUE_TERMINATOR`]. Both
//! terminators are ASCII control characters that never occur in keys or
//! values; content containing them is rejected at encode time. The joined
//! UTF-8 text is DEFLATE-compressed.
//!
//! Decoding is pure and is repeated on every call; callers that want the
//! expanded list for long must keep it themselves.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use crate::{CodecError, Property};

/// Unit separator, ends a key.
pub const KEY_TERMINATOR: char = '\u{1f}';
/// Record separator, ends a value.
pub const VALUE_TERMINATOR: char = '\u{1e}';

fn is_reserved(c: char) -> bool {
    c == KEY_TERMINATOR || c == VALUE_TERMINATOR
}

/// Whether `text` holds a terminator and so cannot be encoded.
pub fn contains_separator(text: &str) -> bool {
    text.contains(is_reserved)
}

/// Encode and compress properties, preserving order.
pub fn compress(properties: &[Property]) -> Result<Vec<u8>, CodecError> {
    let capacity = properties
        .iter()
        .map(|p| p.key.len() + p.value.len() + 2)
        .sum();
    let mut joined = String::with_capacity(capacity);

    for p in properties {
        if contains_separator(&p.key) || contains_separator(&p.value) {
            return Err(CodecError::SeparatorInContent { key: p.key.clone() });
        }
        joined.push_str(&p.key);
        joined.push(KEY_TERMINATOR);
        joined.push_str(&p.value);
        joined.push(VALUE_TERMINATOR);
    }

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(joined.as_bytes())?;
    Ok(encoder.finish()?)
}

/// Decompress and decode a blob produced by [`compress`].
pub fn decompress(blob: &[u8]) -> Result<Vec<Property>, CodecError> {
    let mut bytes = Vec::new();
    DeflateDecoder::new(blob).read_to_end(&mut bytes)?;
    let text = String::from_utf8(bytes)?;

    let mut properties = Vec::new();
    let mut rest = text.as_str();
    while !rest.is_empty() {
        let (key, after_key) = rest
            .split_once(KEY_TERMINATOR)
            .ok_or(CodecError::Truncated)?;
        let (value, after_value) = after_key
            .split_once(VALUE_TERMINATOR)
            .ok_or(CodecError::Truncated)?;
        properties.push(Property::new(key, value));
        rest = after_value;
    }
    Ok(properties)
}
