//! Core types and utilities for the LDAP wire protocol
//!
//! This crate provides the error type, LDAP result codes and object
//! identifiers shared by every other crate in the workspace.

pub mod error;
pub mod oid;
pub mod result_code;

pub use error::{DecodeContext, LdapError, LdapResult};
pub use oid::Oid;
pub use result_code::ResultCode;
