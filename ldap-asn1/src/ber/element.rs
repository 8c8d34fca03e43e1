//! Raw BER element and its typed views

use crate::ber::decoder::{decode_integer_value, read_header};
use crate::ber::encoder::{encode_integer_value, BerEncoder};
use crate::ber::types::{
    BerLength, UNIVERSAL_BOOLEAN_TYPE, UNIVERSAL_ENUMERATED_TYPE, UNIVERSAL_INTEGER_TYPE,
    UNIVERSAL_NULL_TYPE, UNIVERSAL_OCTET_STRING_TYPE, UNIVERSAL_SEQUENCE_TYPE, UNIVERSAL_SET_TYPE,
};
use bytes::Bytes;
use ldap_core::{LdapError, LdapResult};
use std::fmt;

/// A single BER element: one type byte and its value bytes
///
/// The value is held as [`Bytes`], so the children returned by
/// [`decode_as_sequence`](Self::decode_as_sequence) share the parent's
/// storage instead of copying it.
///
/// The `decode_as_*` methods interpret the value without looking at the type
/// byte, because LDAP routinely carries integers, strings and sequences under
/// context-specific types. Callers that need a particular type check
/// [`tag`](Self::tag) themselves.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BerElement {
    tag: u8,
    value: Bytes,
}

impl BerElement {
    /// Create an element from a type byte and raw value
    pub fn new(tag: u8, value: impl Into<Bytes>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }

    /// NULL element with the given type
    pub fn null(tag: u8) -> Self {
        Self::new(tag, Bytes::new())
    }

    /// Universal NULL element
    pub fn universal_null() -> Self {
        Self::null(UNIVERSAL_NULL_TYPE)
    }

    /// BOOLEAN element with the given type
    pub fn boolean(tag: u8, value: bool) -> Self {
        Self::new(tag, vec![if value { 0xFFu8 } else { 0x00u8 }])
    }

    /// Universal BOOLEAN element
    pub fn universal_boolean(value: bool) -> Self {
        Self::boolean(UNIVERSAL_BOOLEAN_TYPE, value)
    }

    /// INTEGER element with the given type
    pub fn integer(tag: u8, value: i64) -> Self {
        Self::new(tag, encode_integer_value(value))
    }

    /// Universal INTEGER element
    pub fn universal_integer(value: i64) -> Self {
        Self::integer(UNIVERSAL_INTEGER_TYPE, value)
    }

    /// Universal ENUMERATED element
    pub fn universal_enumerated(value: i32) -> Self {
        Self::integer(UNIVERSAL_ENUMERATED_TYPE, value as i64)
    }

    /// OCTET STRING element with the given type
    pub fn octet_string(tag: u8, value: impl Into<Bytes>) -> Self {
        Self::new(tag, value)
    }

    /// Universal OCTET STRING element
    pub fn universal_octet_string(value: impl Into<Bytes>) -> Self {
        Self::octet_string(UNIVERSAL_OCTET_STRING_TYPE, value)
    }

    /// Constructed element with the given type containing `elements` in order
    pub fn sequence(tag: u8, elements: &[BerElement]) -> Self {
        let mut encoder = BerEncoder::new();
        for element in elements {
            encoder.add_element(element);
        }
        Self::new(tag, encoder.into_bytes())
    }

    /// Universal SEQUENCE element
    pub fn universal_sequence(elements: &[BerElement]) -> Self {
        Self::sequence(UNIVERSAL_SEQUENCE_TYPE, elements)
    }

    /// Universal SET element
    pub fn universal_set(elements: &[BerElement]) -> Self {
        Self::sequence(UNIVERSAL_SET_TYPE, elements)
    }

    /// The type byte
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// The raw value bytes
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// Encoded size of this element (type + length + value)
    pub fn encoded_len(&self) -> usize {
        1 + BerLength::new(self.value.len()).encode().len() + self.value.len()
    }

    /// Encode this element into a new buffer
    pub fn encode(&self) -> Vec<u8> {
        let mut encoder = BerEncoder::with_capacity(self.encoded_len());
        encoder.add_element(self);
        encoder.into_bytes()
    }

    /// Decode exactly one element from `data`
    ///
    /// # Errors
    /// Returns error if the element is malformed, its length runs past the
    /// end of `data`, or bytes remain after it
    pub fn decode(data: &[u8]) -> LdapResult<Self> {
        let (tag, header_len, value_len) = read_header(data, data.len())?;
        let end = header_len + value_len;
        if end != data.len() {
            return Err(LdapError::Asn1Decoding(format!(
                "{} trailing bytes after BER element",
                data.len() - end
            )));
        }
        Ok(Self::new(tag, Bytes::copy_from_slice(&data[header_len..end])))
    }

    /// Decode the value as a sequence (or set) of elements
    ///
    /// # Errors
    /// Returns error if any child is malformed or extends past the end of
    /// this element's value
    pub fn decode_as_sequence(&self) -> LdapResult<Vec<BerElement>> {
        let mut elements = Vec::new();
        let mut position = 0;
        while position < self.value.len() {
            let remaining = &self.value[position..];
            let (tag, header_len, value_len) = read_header(remaining, remaining.len())?;
            let start = position + header_len;
            let end = start + value_len;
            elements.push(BerElement {
                tag,
                value: self.value.slice(start..end),
            });
            position = end;
        }
        Ok(elements)
    }

    /// Decode the value as a BOOLEAN (any non-zero byte is true)
    pub fn decode_as_boolean(&self) -> LdapResult<bool> {
        match self.value.as_ref() {
            [b] => Ok(*b != 0),
            other => Err(LdapError::Asn1Decoding(format!(
                "BOOLEAN value must be exactly one byte, got {}",
                other.len()
            ))),
        }
    }

    /// Decode the value as a NULL (empty value)
    pub fn decode_as_null(&self) -> LdapResult<()> {
        if self.value.is_empty() {
            Ok(())
        } else {
            Err(LdapError::Asn1Decoding(format!(
                "NULL value must be empty, got {} bytes",
                self.value.len()
            )))
        }
    }

    /// Decode the value as a 64-bit INTEGER
    pub fn decode_as_long(&self) -> LdapResult<i64> {
        decode_integer_value(&self.value)
    }

    /// Decode the value as a 32-bit INTEGER
    pub fn decode_as_integer(&self) -> LdapResult<i32> {
        let value = self.decode_as_long()?;
        i32::try_from(value).map_err(|_| {
            LdapError::Asn1Decoding(format!("INTEGER value {} does not fit in 32 bits", value))
        })
    }

    /// Decode the value as an ENUMERATED
    pub fn decode_as_enumerated(&self) -> LdapResult<i32> {
        self.decode_as_integer()
    }

    /// The value as an OCTET STRING (shares storage)
    pub fn decode_as_octet_string(&self) -> Bytes {
        self.value.clone()
    }

    /// Decode the value as a UTF-8 string
    pub fn decode_as_string(&self) -> LdapResult<String> {
        String::from_utf8(self.value.to_vec()).map_err(|e| {
            LdapError::Asn1Decoding(format!("OCTET STRING value is not valid UTF-8: {}", e))
        })
    }

    /// Verify that this element has the expected type
    pub fn expect_tag(&self, expected: u8) -> LdapResult<()> {
        if self.tag == expected {
            Ok(())
        } else {
            Err(LdapError::Asn1Decoding(format!(
                "Expected BER type 0x{:02x}, got 0x{:02x}",
                expected, self.tag
            )))
        }
    }
}

impl fmt::Debug for BerElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BerElement(type=0x{:02x}, value=", self.tag)?;
        for b in self.value.iter() {
            write!(f, "{:02x}", b)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_single_element() {
        let element = BerElement::decode(&[0x04, 0x03, b'a', b'b', b'c']).unwrap();
        assert_eq!(element.tag(), UNIVERSAL_OCTET_STRING_TYPE);
        assert_eq!(element.decode_as_string().unwrap(), "abc");
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        assert!(BerElement::decode(&[0x05, 0x00, 0x00]).is_err());
    }

    #[test]
    fn test_decode_rejects_truncated_value() {
        // claims 16 bytes of content, provides 2
        assert!(BerElement::decode(&[0x04, 0x10, 0x41, 0x42]).is_err());
    }

    #[test]
    fn test_sequence_round_trip() {
        let sequence = BerElement::universal_sequence(&[
            BerElement::universal_integer(5),
            BerElement::octet_string(0x80, "oid"),
            BerElement::universal_boolean(true),
        ]);
        let decoded = BerElement::decode(&sequence.encode()).unwrap();
        let children = decoded.decode_as_sequence().unwrap();

        assert_eq!(children.len(), 3);
        assert_eq!(children[0].decode_as_integer().unwrap(), 5);
        assert_eq!(children[1].tag(), 0x80);
        assert_eq!(children[1].decode_as_string().unwrap(), "oid");
        assert!(children[2].decode_as_boolean().unwrap());
    }

    #[test]
    fn test_sequence_child_overrun_is_rejected() {
        // child claims 5 bytes but the sequence value holds only 3
        let element = BerElement::new(UNIVERSAL_SEQUENCE_TYPE, vec![0x04u8, 0x05, 0x41]);
        assert!(element.decode_as_sequence().is_err());
    }

    #[test]
    fn test_empty_sequence() {
        let element = BerElement::universal_sequence(&[]);
        assert_eq!(element.encode(), vec![0x30, 0x00]);
        assert!(element.decode_as_sequence().unwrap().is_empty());
    }

    #[test]
    fn test_integer_range() {
        let element = BerElement::universal_integer(i64::from(i32::MAX) + 1);
        assert!(element.decode_as_integer().is_err());
        assert_eq!(element.decode_as_long().unwrap(), 2_147_483_648);
    }

    #[test]
    fn test_boolean_length_checked() {
        let empty = BerElement::new(UNIVERSAL_BOOLEAN_TYPE, Vec::<u8>::new());
        assert!(empty.decode_as_boolean().is_err());
        assert!(BerElement::new(UNIVERSAL_BOOLEAN_TYPE, vec![1u8, 1]).decode_as_boolean().is_err());
    }
}
