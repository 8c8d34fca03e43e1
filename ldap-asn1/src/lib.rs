//! ASN.1 processing module for the LDAP wire protocol
//!
//! LDAP messages are encoded with the Basic Encoding Rules (ITU-T X.690)
//! restricted as described in RFC 4511 section 5.1: definite lengths only,
//! single-byte tags, and primitive encodings for string types. This crate
//! provides the tag/length primitives, a raw element type, an encoder that
//! builds nested sequences in one buffer and a stream decoder that tracks
//! sequence boundaries.

pub mod ber;

pub use ber::{
    BerDecoder, BerDecoderSequence, BerElement, BerEncoder, BerLength, BerSequence, BerTag,
    BerTagClass, ReaderSettings,
};
