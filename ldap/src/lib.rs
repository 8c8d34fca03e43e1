//! ldap - LDAP wire-protocol core in Rust
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `ldap-core`: error type, result codes and OIDs
//! - `ldap-asn1`: BER encoding/decoding
//! - `ldap-protocol`: protocol operations, messages, controls, filters and
//!   extended operation values
//! - `ldap-matching`: equality, ordering and substring matching rules
//! - `ldap-server`: operation interceptors
//!
//! # Usage
//!
//! ```
//! use ldap::extensions::EndBatchedTransactionExtendedResult;
//! use ldap::protocol::op::ExtendedRequestProtocolOp;
//! use ldap::protocol::{ProtocolOp, ProtocolOpCodec};
//!
//! let request = ExtendedRequestProtocolOp::with_oid("1.3.6.1.4.1.1466.20037", None).unwrap();
//! let bytes = request.encode_protocol_op().encode();
//! assert_eq!(ProtocolOp::from_bytes(&bytes).unwrap(), ProtocolOp::ExtendedRequest(request));
//!
//! let (failed_id, controls) = EndBatchedTransactionExtendedResult::decode_value(None).unwrap();
//! assert_eq!(failed_id, -1);
//! assert!(controls.is_empty());
//! ```

// Re-export core types
pub use ldap_core::{DecodeContext, LdapError, LdapResult, Oid, ResultCode};

pub use ldap_protocol::{LdapMessage, ProtocolOp, ProtocolOpType};

// Re-export the BER codec
pub mod asn1 {
    pub use ldap_asn1::*;
}

// Re-export the protocol layer
pub mod protocol {
    pub use ldap_protocol::*;
}

pub mod extensions {
    pub use ldap_protocol::extensions::*;
}

// Re-export matching rules
pub mod matching {
    pub use ldap_matching::*;
}

// Re-export server hooks
pub mod server {
    pub use ldap_server::*;
}
