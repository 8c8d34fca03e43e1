//! BER (Basic Encoding Rules) encoder and decoder for ASN.1
//!
//! Each ASN.1 value is encoded as a TLV (Tag-Length-Value) triplet:
//!
//! ```text
//! [Tag] [Length] [Value]
//! ```
//!
//! ## Tag Encoding
//!
//! ```text
//! Bits: 8 7 6 5 4 3 2 1
//!       C C P T T T T T
//! ```
//! Where:
//! - CC = Class (00=Universal, 01=Application, 10=Context, 11=Private)
//! - P = Primitive (0) or Constructed (1)
//! - TTTTT = Tag number (0-30)
//!
//! Every tag used by LDAP fits in this single byte, so the high-tag-number
//! form (TTTTT = 11111) is rejected rather than parsed.
//!
//! ## Length Encoding
//!
//! - **Short form** (1 byte): lengths 0-127
//! - **Long form**: first byte `0x80 | n`, followed by `n` big-endian length bytes
//!
//! The indefinite form (`0x80`) is not allowed in LDAP and is rejected.
//!
//! ## Element Forms
//!
//! Two decoding styles are offered and produce identical results:
//! - [`BerElement`]: an element that has already been read in full, decoded
//!   by inspecting its value (`decode_as_sequence`, `decode_as_integer`, ...)
//! - [`BerDecoder`]: a stream reader positioned at the start of an element
//!   that consumes primitives in order and tracks sequence boundaries

pub mod decoder;
pub mod element;
pub mod encoder;
pub mod types;

pub use decoder::{BerDecoder, BerDecoderSequence, ReaderSettings};
pub use element::BerElement;
pub use encoder::{BerEncoder, BerSequence};
pub use types::{BerLength, BerTag, BerTagClass};
