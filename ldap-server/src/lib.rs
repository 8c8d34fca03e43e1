//! Server-side hooks for LDAP operations
//!
//! An [`OperationInterceptor`] sees each request before it is processed and
//! each result before it is returned, and may replace the operation or, for
//! requests, reject it. [`InterceptorChain`] runs a list of interceptors over
//! decoded [`LdapMessage`](ldap_protocol::LdapMessage)s.

pub mod chain;
pub mod interceptor;

pub use chain::InterceptorChain;
pub use interceptor::{InterceptedOperation, OperationInterceptor};
