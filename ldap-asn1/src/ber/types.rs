//! BER encoding types (Tag, Length, universal type constants)

use ldap_core::{LdapError, LdapResult};

/// Universal BOOLEAN type
pub const UNIVERSAL_BOOLEAN_TYPE: u8 = 0x01;
/// Universal INTEGER type
pub const UNIVERSAL_INTEGER_TYPE: u8 = 0x02;
/// Universal OCTET STRING type
pub const UNIVERSAL_OCTET_STRING_TYPE: u8 = 0x04;
/// Universal NULL type
pub const UNIVERSAL_NULL_TYPE: u8 = 0x05;
/// Universal ENUMERATED type
pub const UNIVERSAL_ENUMERATED_TYPE: u8 = 0x0A;
/// Universal SEQUENCE type (constructed)
pub const UNIVERSAL_SEQUENCE_TYPE: u8 = 0x30;
/// Universal SET type (constructed)
pub const UNIVERSAL_SET_TYPE: u8 = 0x31;

/// BER Tag Class
///
/// ASN.1 defines four tag classes:
/// - **Universal**: Standard ASN.1 types (INTEGER, OCTET STRING, etc.)
/// - **Application**: Application-specific types (LDAP protocol operations)
/// - **Context-specific**: Context-dependent types (used in SEQUENCE/SET)
/// - **Private**: Private/implementation-specific types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerTagClass {
    /// Universal class (00)
    Universal = 0,
    /// Application class (01)
    Application = 1,
    /// Context-specific class (10)
    ContextSpecific = 2,
    /// Private class (11)
    Private = 3,
}

impl BerTagClass {
    /// Get tag class from bits (bits 8-7 of tag byte)
    pub fn from_bits(bits: u8) -> Self {
        match (bits >> 6) & 0x03 {
            0 => BerTagClass::Universal,
            1 => BerTagClass::Application,
            2 => BerTagClass::ContextSpecific,
            _ => BerTagClass::Private,
        }
    }
}

/// BER Tag
///
/// A BER tag identifies the type of an ASN.1 value. It consists of:
/// - **Class**: Universal, Application, Context-specific, or Private
/// - **Constructed/Primitive**: Whether the value contains other values
/// - **Tag Number**: 0-30
///
/// LDAP only ever uses the single-byte form, so every tag is parsed from the
/// one type byte that appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BerTag {
    class: BerTagClass,
    constructed: bool,
    number: u8,
}

impl BerTag {
    /// Get tag class
    pub fn class(&self) -> BerTagClass {
        self.class
    }

    /// Check if tag is constructed
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// Get tag number
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Decode tag from its wire byte
    ///
    /// # Errors
    /// Returns error if the byte announces the high-tag-number form
    pub fn from_byte(byte: u8) -> LdapResult<Self> {
        let number = byte & 0x1F;
        if number == 0x1F {
            return Err(LdapError::Asn1Decoding(format!(
                "Multi-byte BER type 0x{:02x} is not supported",
                byte
            )));
        }
        Ok(Self {
            class: BerTagClass::from_bits(byte),
            constructed: (byte & 0x20) != 0,
            number,
        })
    }
}

/// BER Length encoding
///
/// Short form:
/// ```text
/// Byte: 0 L L L L L L L
/// ```
///
/// Long form:
/// ```text
/// First byte:  1 N N N N N N N  (N = number of length bytes)
/// Following bytes: L L L L L L L L  (big-endian length value)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerLength {
    /// Short form: length 0-127
    Short(u8),
    /// Long form, encoded with length-of-length
    Long(usize),
}

impl BerLength {
    /// Longest length-of-length accepted when decoding (32-bit lengths)
    pub const MAX_LENGTH_BYTES: usize = 4;

    /// Create a new BER length
    ///
    /// Automatically chooses short or long form based on the length value.
    pub fn new(length: usize) -> Self {
        if length < 128 {
            BerLength::Short(length as u8)
        } else {
            BerLength::Long(length)
        }
    }

    /// Get the length value
    pub fn value(&self) -> usize {
        match self {
            BerLength::Short(l) => *l as usize,
            BerLength::Long(l) => *l,
        }
    }

    /// Encode length to bytes (minimal form)
    pub fn encode(&self) -> Vec<u8> {
        match self {
            BerLength::Short(length) => vec![*length],
            BerLength::Long(length) => {
                let mut num_bytes = 0;
                let mut temp = *length;
                while temp > 0 {
                    num_bytes += 1;
                    temp >>= 8;
                }
                if num_bytes == 0 {
                    num_bytes = 1;
                }

                let mut result = Vec::with_capacity(1 + num_bytes);
                result.push(0x80 | (num_bytes as u8));
                for i in (0..num_bytes).rev() {
                    result.push(((*length >> (i * 8)) & 0xFF) as u8);
                }
                result
            }
        }
    }

    /// Decode length from bytes
    ///
    /// # Returns
    /// Returns `Ok((BerLength, bytes_consumed))` if successful
    ///
    /// # Errors
    /// Returns error if:
    /// - Buffer is too short
    /// - The indefinite form is used
    /// - The length needs more than [`Self::MAX_LENGTH_BYTES`] bytes
    pub fn decode(data: &[u8]) -> LdapResult<(Self, usize)> {
        let first_byte = *data.first().ok_or_else(|| {
            LdapError::Asn1Decoding("Empty buffer for length decoding".to_string())
        })?;

        if (first_byte & 0x80) == 0 {
            return Ok((BerLength::Short(first_byte), 1));
        }

        let num_bytes = (first_byte & 0x7F) as usize;
        if num_bytes == 0 {
            return Err(LdapError::Asn1Decoding(
                "Indefinite length encoding is not allowed".to_string(),
            ));
        }
        if num_bytes > Self::MAX_LENGTH_BYTES {
            return Err(LdapError::Asn1Decoding(format!(
                "Length encoding too large: {} bytes (max {})",
                num_bytes,
                Self::MAX_LENGTH_BYTES
            )));
        }
        if data.len() < 1 + num_bytes {
            return Err(LdapError::Asn1Decoding(format!(
                "Buffer too short for long form length: need {} bytes, got {}",
                1 + num_bytes,
                data.len()
            )));
        }

        let length = data[1..=num_bytes]
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize);
        Ok((BerLength::Long(length), 1 + num_bytes))
    }
}
