//! BER encoder for ASN.1 structures
//!
//! # Usage Example
//!
//! ```rust
//! use ldap_asn1::ber::BerEncoder;
//!
//! let mut encoder = BerEncoder::new();
//! let sequence = encoder.begin_sequence(0x77);
//! encoder.add_octet_string(0x80, b"1.3.6.1.4.1.1466.20037");
//! encoder.end_sequence(sequence);
//! let bytes = encoder.into_bytes();
//! assert_eq!(bytes[0], 0x77);
//! ```

use crate::ber::element::BerElement;
use crate::ber::types::{
    BerLength, UNIVERSAL_BOOLEAN_TYPE, UNIVERSAL_ENUMERATED_TYPE, UNIVERSAL_INTEGER_TYPE,
    UNIVERSAL_NULL_TYPE, UNIVERSAL_OCTET_STRING_TYPE,
};

/// BER encoder for ASN.1 structures
///
/// The encoder accumulates TLV triplets in a single `Vec<u8>`. Constructed
/// values are written in place: [`begin_sequence`](Self::begin_sequence)
/// emits the type byte and remembers where the content starts, and
/// [`end_sequence`](Self::end_sequence) inserts the length once the content
/// size is known. Sequences must be ended innermost first.
///
/// Encoding cannot fail: every value that can be represented in memory has a
/// BER encoding.
#[derive(Debug, Default)]
pub struct BerEncoder {
    buffer: Vec<u8>,
}

/// An open constructed element inside a [`BerEncoder`]
#[derive(Debug)]
#[must_use = "a sequence must be closed with BerEncoder::end_sequence"]
pub struct BerSequence {
    content_start: usize,
}

impl BerEncoder {
    /// Create a new BER encoder
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a new BER encoder with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Encode a TLV (Tag-Length-Value) triplet
    ///
    /// All other `add_*` methods go through here.
    pub fn encode_tlv(&mut self, tag: u8, value: &[u8]) {
        self.buffer.push(tag);
        self.buffer.extend_from_slice(&BerLength::new(value.len()).encode());
        self.buffer.extend_from_slice(value);
    }

    /// Encode a NULL element with the given type
    pub fn add_null(&mut self, tag: u8) {
        self.encode_tlv(tag, &[]);
    }

    /// Encode a universal NULL element
    pub fn add_universal_null(&mut self) {
        self.add_null(UNIVERSAL_NULL_TYPE);
    }

    /// Encode a BOOLEAN (`0xFF` for true, `0x00` for false)
    pub fn add_boolean(&mut self, tag: u8, value: bool) {
        self.encode_tlv(tag, &[if value { 0xFF } else { 0x00 }]);
    }

    /// Encode a universal BOOLEAN element
    pub fn add_universal_boolean(&mut self, value: bool) {
        self.add_boolean(UNIVERSAL_BOOLEAN_TYPE, value);
    }

    /// Encode an INTEGER in minimal two's complement form
    pub fn add_integer(&mut self, tag: u8, value: i64) {
        self.encode_tlv(tag, &encode_integer_value(value));
    }

    /// Encode a universal INTEGER element
    pub fn add_universal_integer(&mut self, value: i64) {
        self.add_integer(UNIVERSAL_INTEGER_TYPE, value);
    }

    /// Encode an ENUMERATED value (same content encoding as INTEGER)
    pub fn add_enumerated(&mut self, tag: u8, value: i32) {
        self.add_integer(tag, value as i64);
    }

    /// Encode a universal ENUMERATED element
    pub fn add_universal_enumerated(&mut self, value: i32) {
        self.add_enumerated(UNIVERSAL_ENUMERATED_TYPE, value);
    }

    /// Encode an OCTET STRING with the given type
    pub fn add_octet_string(&mut self, tag: u8, value: &[u8]) {
        self.encode_tlv(tag, value);
    }

    /// Encode a universal OCTET STRING element
    pub fn add_universal_octet_string(&mut self, value: &[u8]) {
        self.add_octet_string(UNIVERSAL_OCTET_STRING_TYPE, value);
    }

    /// Append an already-built element
    pub fn add_element(&mut self, element: &BerElement) {
        self.encode_tlv(element.tag(), element.value());
    }

    /// Open a constructed element (SEQUENCE, SET, or an application/context
    /// specific constructed type)
    pub fn begin_sequence(&mut self, tag: u8) -> BerSequence {
        self.buffer.push(tag);
        BerSequence {
            content_start: self.buffer.len(),
        }
    }

    /// Close a constructed element, inserting its length before the content
    pub fn end_sequence(&mut self, sequence: BerSequence) {
        let start = sequence.content_start;
        let length = BerLength::new(self.buffer.len() - start).encode();
        self.buffer.splice(start..start, length);
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get a reference to the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Clear the encoder buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Minimal big-endian two's complement representation of `value`
///
/// BER requires the minimum number of bytes: 127 is `0x7F`, 128 is
/// `0x00 0x80`, -128 is `0x80` and -129 is `0xFF 0x7F`.
pub(crate) fn encode_integer_value(value: i64) -> Vec<u8> {
    if value == 0 {
        return vec![0];
    }

    let mut bytes = Vec::with_capacity(8);
    let mut temp = value;
    if value < 0 {
        while temp != -1 {
            bytes.push((temp & 0xFF) as u8);
            temp >>= 8;
        }
        // sign bit of the top byte must stay set
        if bytes.last().is_none_or(|b| b & 0x80 == 0) {
            bytes.push(0xFF);
        }
    } else {
        while temp > 0 {
            bytes.push((temp & 0xFF) as u8);
            temp >>= 8;
        }
        if bytes.last().is_some_and(|b| b & 0x80 != 0) {
            bytes.push(0x00);
        }
    }

    bytes.reverse();
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_integer_minimal() {
        assert_eq!(encode_integer_value(0), vec![0x00]);
        assert_eq!(encode_integer_value(127), vec![0x7F]);
        assert_eq!(encode_integer_value(128), vec![0x00, 0x80]);
        assert_eq!(encode_integer_value(256), vec![0x01, 0x00]);
        assert_eq!(encode_integer_value(-1), vec![0xFF]);
        assert_eq!(encode_integer_value(-128), vec![0x80]);
        assert_eq!(encode_integer_value(-129), vec![0xFF, 0x7F]);
        assert_eq!(encode_integer_value(-256), vec![0xFF, 0x00]);
        assert_eq!(encode_integer_value(i64::MIN).len(), 8);
    }

    #[test]
    fn test_encode_octet_string() {
        let mut encoder = BerEncoder::new();
        encoder.add_universal_octet_string(b"Hello");
        assert_eq!(encoder.as_bytes(), &[0x04, 0x05, b'H', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn test_encode_boolean_and_null() {
        let mut encoder = BerEncoder::new();
        encoder.add_universal_boolean(true);
        encoder.add_universal_boolean(false);
        encoder.add_null(0x42);
        assert_eq!(encoder.into_bytes(), vec![0x01, 0x01, 0xFF, 0x01, 0x01, 0x00, 0x42, 0x00]);
    }

    #[test]
    fn test_nested_sequences() {
        let mut encoder = BerEncoder::new();
        let outer = encoder.begin_sequence(0x30);
        encoder.add_universal_integer(5);
        let inner = encoder.begin_sequence(0x30);
        encoder.add_universal_integer(3);
        encoder.end_sequence(inner);
        encoder.end_sequence(outer);

        assert_eq!(
            encoder.into_bytes(),
            vec![0x30, 0x08, 0x02, 0x01, 0x05, 0x30, 0x03, 0x02, 0x01, 0x03]
        );
    }

    #[test]
    fn test_sequence_long_form_length() {
        let mut encoder = BerEncoder::new();
        let sequence = encoder.begin_sequence(0x30);
        encoder.add_universal_octet_string(&[0xAB; 200]);
        encoder.end_sequence(sequence);

        let bytes = encoder.into_bytes();
        // 0x04 0x81 0xC8 + 200 bytes of content = 203
        assert_eq!(&bytes[..4], &[0x30, 0x81, 0xCB, 0x04]);
        assert_eq!(bytes.len(), 3 + 203);
    }
}
