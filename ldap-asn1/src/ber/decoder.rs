//! BER stream decoder for ASN.1 structures
//!
//! # Usage Example
//!
//! ```rust
//! use ldap_asn1::ber::BerDecoder;
//!
//! let data = [0x30, 0x06, 0x02, 0x01, 0x05, 0x04, 0x01, 0x41];
//! let mut decoder = BerDecoder::new(&data);
//! let sequence = decoder.begin_sequence()?;
//! let id = decoder.read_integer()?;
//! let name = decoder.read_string()?;
//! assert!(!decoder.has_more_elements(&sequence));
//! decoder.end_sequence(sequence)?;
//! assert_eq!((id, name.as_str()), (5, "A"));
//! # Ok::<(), ldap_core::LdapError>(())
//! ```

use crate::ber::element::BerElement;
use crate::ber::types::{BerLength, BerTag};
use bytes::Bytes;
use ldap_core::{LdapError, LdapResult};

/// Limits applied by a [`BerDecoder`] to untrusted input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderSettings {
    /// Largest value length accepted for any single element
    pub max_element_size: usize,
    /// Deepest sequence nesting accepted
    pub max_depth: usize,
}

impl ReaderSettings {
    /// Default maximum element size (16 MiB)
    pub const DEFAULT_MAX_ELEMENT_SIZE: usize = 16 * 1024 * 1024;
    /// Default maximum nesting depth
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    /// Create settings with the default limits
    pub fn new() -> Self {
        Self {
            max_element_size: Self::DEFAULT_MAX_ELEMENT_SIZE,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum element size
    pub fn with_max_element_size(mut self, max_element_size: usize) -> Self {
        self.max_element_size = max_element_size;
        self
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// BER stream decoder
///
/// Reads TLV triplets from a byte buffer in strict order. The decoder keeps a
/// stack of open sequence boundaries: an element whose declared length would
/// run past the end of the innermost open sequence is rejected, so a nested
/// length can never "borrow" bytes belonging to a sibling or a parent.
///
/// The primitive `read_*` methods do not check the type byte (LDAP carries
/// strings and integers under context-specific types); use
/// [`peek_type`](Self::peek_type) to dispatch on it.
#[derive(Debug)]
pub struct BerDecoder<'a> {
    buffer: &'a [u8],
    position: usize,
    boundaries: Vec<usize>,
    settings: ReaderSettings,
}

/// An open sequence inside a [`BerDecoder`]
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a sequence must be closed with BerDecoder::end_sequence"]
pub struct BerDecoderSequence {
    tag: u8,
    end: usize,
}

impl BerDecoderSequence {
    /// Type byte of the sequence element
    pub fn tag(&self) -> u8 {
        self.tag
    }
}

impl<'a> BerDecoder<'a> {
    /// Create a new BER decoder with default limits
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_settings(buffer, ReaderSettings::default())
    }

    /// Create a new BER decoder with the given limits
    pub fn with_settings(buffer: &'a [u8], settings: ReaderSettings) -> Self {
        Self {
            buffer,
            position: 0,
            boundaries: Vec::new(),
            settings,
        }
    }

    /// Get current position in buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// End of the innermost open sequence, or of the buffer
    fn limit(&self) -> usize {
        self.boundaries.last().copied().unwrap_or(self.buffer.len())
    }

    /// Bytes left before the innermost boundary
    pub fn remaining(&self) -> usize {
        self.limit().saturating_sub(self.position)
    }

    /// Check if there is more data before the innermost boundary
    pub fn has_remaining(&self) -> bool {
        self.position < self.limit()
    }

    /// Type byte of the next element, without consuming it
    pub fn peek_type(&self) -> Option<u8> {
        if self.has_remaining() {
            Some(self.buffer[self.position])
        } else {
            None
        }
    }

    /// Read the header of the next element and check its length against the
    /// current boundary and the configured size limit
    fn read_tlv_header(&mut self) -> LdapResult<(u8, usize)> {
        let limit = self.limit();
        let (tag, header_len, value_len) =
            read_header(&self.buffer[self.position..limit], limit - self.position)?;
        if value_len > self.settings.max_element_size {
            log::trace!(
                "rejecting element 0x{:02x} at offset {}: {} value bytes exceed limit {}",
                tag,
                self.position,
                value_len,
                self.settings.max_element_size
            );
            return Err(LdapError::Asn1Decoding(format!(
                "Element size {} exceeds the maximum allowed size {}",
                value_len, self.settings.max_element_size
            )));
        }
        self.position += header_len;
        Ok((tag, value_len))
    }

    /// Decode a TLV (Tag-Length-Value) triplet
    ///
    /// # Returns
    /// Returns `(type, value_bytes)`, advancing past the element
    pub fn decode_tlv(&mut self) -> LdapResult<(u8, &'a [u8])> {
        let (tag, value_len) = self.read_tlv_header()?;
        let start = self.position;
        self.position += value_len;
        Ok((tag, &self.buffer[start..start + value_len]))
    }

    /// Read the next element in full
    pub fn read_element(&mut self) -> LdapResult<BerElement> {
        let (tag, value) = self.decode_tlv()?;
        Ok(BerElement::new(tag, Bytes::copy_from_slice(value)))
    }

    /// Read a 64-bit INTEGER
    pub fn read_long(&mut self) -> LdapResult<i64> {
        let (_, value) = self.decode_tlv()?;
        decode_integer_value(value)
    }

    /// Read a 32-bit INTEGER
    pub fn read_integer(&mut self) -> LdapResult<i32> {
        let value = self.read_long()?;
        i32::try_from(value).map_err(|_| {
            LdapError::Asn1Decoding(format!("INTEGER value {} does not fit in 32 bits", value))
        })
    }

    /// Read an OCTET STRING
    pub fn read_bytes(&mut self) -> LdapResult<Bytes> {
        let (_, value) = self.decode_tlv()?;
        Ok(Bytes::copy_from_slice(value))
    }

    /// Read an OCTET STRING holding UTF-8 text
    pub fn read_string(&mut self) -> LdapResult<String> {
        let (_, value) = self.decode_tlv()?;
        std::str::from_utf8(value).map(str::to_string).map_err(|e| {
            LdapError::Asn1Decoding(format!("OCTET STRING value is not valid UTF-8: {}", e))
        })
    }

    /// Open the next element as a sequence
    ///
    /// # Errors
    /// Returns error if the element is primitive, its length runs past the
    /// enclosing boundary, or the nesting depth limit is reached
    pub fn begin_sequence(&mut self) -> LdapResult<BerDecoderSequence> {
        if self.boundaries.len() >= self.settings.max_depth {
            log::trace!(
                "rejecting sequence at offset {}: nesting depth {} reached",
                self.position,
                self.settings.max_depth
            );
            return Err(LdapError::Asn1Decoding(format!(
                "Sequence nesting exceeds the maximum depth {}",
                self.settings.max_depth
            )));
        }

        let (tag, value_len) = self.read_tlv_header()?;
        if !BerTag::from_byte(tag)?.is_constructed() {
            return Err(LdapError::Asn1Decoding(format!(
                "BER type 0x{:02x} is not a constructed type",
                tag
            )));
        }

        let end = self.position + value_len;
        self.boundaries.push(end);
        Ok(BerDecoderSequence { tag, end })
    }

    /// Check whether the open sequence has more elements
    pub fn has_more_elements(&self, sequence: &BerDecoderSequence) -> bool {
        self.position < sequence.end
    }

    /// Close a sequence opened with [`begin_sequence`](Self::begin_sequence)
    ///
    /// # Errors
    /// Returns error if unread elements remain in the sequence or sequences
    /// are closed out of order
    pub fn end_sequence(&mut self, sequence: BerDecoderSequence) -> LdapResult<()> {
        if self.boundaries.last() != Some(&sequence.end) {
            return Err(LdapError::Asn1Decoding(
                "Sequences must be closed innermost first".to_string(),
            ));
        }
        if self.position != sequence.end {
            return Err(LdapError::Asn1Decoding(format!(
                "{} unread bytes at the end of sequence 0x{:02x}",
                sequence.end - self.position,
                sequence.tag
            )));
        }
        self.boundaries.pop();
        Ok(())
    }
}

/// Parse a type byte and length from the start of `data`
///
/// `limit` bounds the bytes the element may occupy (type, length and value).
///
/// # Returns
/// Returns `(type, header_len, value_len)`
pub(crate) fn read_header(data: &[u8], limit: usize) -> LdapResult<(u8, usize, usize)> {
    let data = &data[..limit.min(data.len())];
    let tag = *data
        .first()
        .ok_or_else(|| LdapError::Asn1Decoding("Buffer exhausted while reading type".to_string()))?;
    BerTag::from_byte(tag)?;

    let (length, length_bytes) = BerLength::decode(&data[1..])?;
    let header_len = 1 + length_bytes;
    let value_len = length.value();
    let available = data.len() - header_len;
    if value_len > available {
        return Err(LdapError::Asn1Decoding(format!(
            "Element of type 0x{:02x} declares {} value bytes but only {} remain",
            tag, value_len, available
        )));
    }
    Ok((tag, header_len, value_len))
}

/// Convert big-endian two's complement bytes to i64
pub(crate) fn decode_integer_value(bytes: &[u8]) -> LdapResult<i64> {
    if bytes.is_empty() {
        return Err(LdapError::Asn1Decoding("Empty INTEGER encoding".to_string()));
    }
    if bytes.len() > 8 {
        return Err(LdapError::Asn1Decoding(format!(
            "INTEGER too large: {} bytes (max 8)",
            bytes.len()
        )));
    }

    let mut value: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
    for &byte in bytes {
        value = (value << 8) | byte as i64;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::encoder::BerEncoder;

    #[test]
    fn test_decode_integer() {
        let mut encoder = BerEncoder::new();
        encoder.add_universal_integer(12345);
        encoder.add_universal_integer(-129);
        let encoded = encoder.into_bytes();

        let mut decoder = BerDecoder::new(&encoded);
        assert_eq!(decoder.read_integer().unwrap(), 12345);
        assert_eq!(decoder.read_integer().unwrap(), -129);
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn test_integer_value_sign_extension() {
        assert_eq!(decode_integer_value(&[0xFF]).unwrap(), -1);
        assert_eq!(decode_integer_value(&[0x80]).unwrap(), -128);
        assert_eq!(decode_integer_value(&[0x00, 0x80]).unwrap(), 128);
        assert_eq!(decode_integer_value(&[0x80, 0, 0, 0, 0, 0, 0, 0]).unwrap(), i64::MIN);
        assert!(decode_integer_value(&[]).is_err());
        assert!(decode_integer_value(&[0; 9]).is_err());
    }

    #[test]
    fn test_decode_octet_string() {
        let mut encoder = BerEncoder::new();
        encoder.add_universal_octet_string(b"Hello");
        let encoded = encoder.into_bytes();

        let mut decoder = BerDecoder::new(&encoded);
        assert_eq!(decoder.read_string().unwrap(), "Hello");
    }

    #[test]
    fn test_sequence_boundaries() {
        let data = [0x30, 0x06, 0x02, 0x01, 0x05, 0x04, 0x01, 0x41, 0x01, 0x01, 0xFF];
        let mut decoder = BerDecoder::new(&data);

        let sequence = decoder.begin_sequence().unwrap();
        assert_eq!(sequence.tag(), 0x30);
        assert_eq!(decoder.read_integer().unwrap(), 5);
        assert!(decoder.has_more_elements(&sequence));
        assert_eq!(decoder.read_string().unwrap(), "A");
        assert!(!decoder.has_more_elements(&sequence));
        // the boolean after the sequence is invisible until it is closed
        assert_eq!(decoder.peek_type(), None);
        decoder.end_sequence(sequence).unwrap();

        assert_eq!(decoder.peek_type(), Some(0x01));
        let boolean = decoder.read_element().unwrap();
        assert!(boolean.decode_as_boolean().unwrap());
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn test_child_cannot_run_past_sequence() {
        // sequence holds 3 bytes, child claims 4 (the extra byte belongs outside)
        let data = [0x30, 0x03, 0x04, 0x04, 0x41, 0x42, 0x43];
        let mut decoder = BerDecoder::new(&data);
        let _sequence = decoder.begin_sequence().unwrap();
        assert!(decoder.read_bytes().is_err());
    }

    #[test]
    fn test_end_sequence_with_unread_data() {
        let data = [0x30, 0x03, 0x02, 0x01, 0x05];
        let mut decoder = BerDecoder::new(&data);
        let sequence = decoder.begin_sequence().unwrap();
        assert!(decoder.end_sequence(sequence).is_err());
    }

    #[test]
    fn test_begin_sequence_rejects_primitive() {
        let data = [0x04, 0x00];
        let mut decoder = BerDecoder::new(&data);
        assert!(decoder.begin_sequence().is_err());
    }

    #[test]
    fn test_max_element_size() {
        let data = [0x04, 0x04, 0x41, 0x42, 0x43, 0x44];
        let settings = ReaderSettings::new().with_max_element_size(3);
        let mut decoder = BerDecoder::with_settings(&data, settings);
        assert!(decoder.read_bytes().is_err());
    }

    #[test]
    fn test_max_depth() {
        let data = [0x30, 0x04, 0x30, 0x02, 0x30, 0x00];
        let settings = ReaderSettings::new().with_max_depth(2);
        let mut decoder = BerDecoder::with_settings(&data, settings);
        let _outer = decoder.begin_sequence().unwrap();
        let _middle = decoder.begin_sequence().unwrap();
        assert!(decoder.begin_sequence().is_err());
    }

    #[test]
    fn test_truncated_input() {
        let mut decoder = BerDecoder::new(&[0x04]);
        assert!(decoder.read_bytes().is_err());

        let mut decoder = BerDecoder::new(&[]);
        assert!(decoder.read_element().is_err());
    }

    #[test]
    fn test_read_element_matches_element_decode() {
        let bytes = [0x77, 0x05, 0x80, 0x03, b'1', b'.', b'2'];
        let mut decoder = BerDecoder::new(&bytes);
        let streamed = decoder.read_element().unwrap();
        assert_eq!(streamed, BerElement::decode(&bytes).unwrap());
    }
}
