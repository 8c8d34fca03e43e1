//! LDAP protocol operations for the wire-protocol core
//!
//! This crate maps every LDAP operation (RFC 4511 section 4) to and from its
//! BER encoding.
//!
//! # Layout
//!
//! - [`op`]: the protocol operations, each with a fixed application type,
//!   and the [`ProtocolOp`] enum used for generic dispatch
//! - [`message`]: the `LDAPMessage` envelope (message ID, operation, controls)
//! - [`control`]: request/response controls and the control list codec
//! - [`filter`]: search filters
//! - [`extensions`]: extended request/result types and the values of
//!   specific extended operations (batched transactions)
//!
//! # Decoding
//!
//! Every operation can be decoded from an element that was already read
//! ([`ProtocolOpCodec::decode_protocol_op`]) or straight from a stream
//! ([`ProtocolOpCodec::read_from`]). Both paths produce the same value for the
//! same bytes. Failures are reported as [`LdapError::Decoding`] naming the
//! operation, with the BER-level failure as the source.
//!
//! [`LdapError::Decoding`]: ldap_core::LdapError::Decoding

pub mod attribute;
pub mod control;
pub mod extensions;
pub mod filter;
pub mod message;
pub mod op;
pub mod result;

pub use attribute::{Attribute, Modification, ModificationType};
pub use control::Control;
pub use filter::Filter;
pub use message::LdapMessage;
pub use op::{ProtocolOp, ProtocolOpCodec, ProtocolOpType};
pub use result::LdapResultComponents;
