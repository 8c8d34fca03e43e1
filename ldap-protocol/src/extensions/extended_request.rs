use crate::control::Control;
use crate::message::LdapMessage;
use crate::op::{ExtendedRequestProtocolOp, ProtocolOp};
use bytes::Bytes;
use ldap_core::{LdapError, LdapResult, Oid};
use std::fmt;

/// An extended request with its request controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedRequest {
    oid: Oid,
    value: Option<Bytes>,
    controls: Vec<Control>,
}

impl ExtendedRequest {
    pub fn new(oid: Oid, value: Option<Bytes>, controls: Vec<Control>) -> Self {
        Self {
            oid,
            value,
            controls,
        }
    }

    /// Create an extended request from an OID string
    ///
    /// # Errors
    /// Returns [`LdapError::InvalidData`] if the OID is empty
    pub fn with_oid(oid: &str, value: Option<Bytes>, controls: Vec<Control>) -> LdapResult<Self> {
        Ok(Self::new(Oid::new(oid)?, value, controls))
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn value(&self) -> Option<&Bytes> {
        self.value.as_ref()
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// The control with the given OID, if present
    pub fn control(&self, oid: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.oid().as_str() == oid)
    }

    pub fn to_protocol_op(&self) -> ExtendedRequestProtocolOp {
        ExtendedRequestProtocolOp::from_request(self)
    }

    /// Wrap the request in a message with the given ID
    pub fn to_message(&self, message_id: i32) -> LdapMessage {
        LdapMessage::new(message_id, self.to_protocol_op(), self.controls.clone())
    }

    /// Extract the extended request from a message
    ///
    /// # Errors
    /// Returns [`LdapError::Decoding`] if the message holds another operation
    pub fn from_message(message: &LdapMessage) -> LdapResult<Self> {
        match message.op() {
            ProtocolOp::ExtendedRequest(op) => {
                Ok(op.to_extended_request(message.controls().to_vec()))
            }
            other => Err(LdapError::decoding(format!(
                "message {} holds a {}, not an extended request",
                message.message_id(),
                other.op_type()
            ))),
        }
    }
}

impl ExtendedRequestProtocolOp {
    /// The protocol operation for an extended request
    pub fn from_request(request: &ExtendedRequest) -> Self {
        Self::new(request.oid.clone(), request.value.clone())
    }

    /// The extended request for this operation with the given controls
    pub fn to_extended_request(&self, controls: Vec<Control>) -> ExtendedRequest {
        ExtendedRequest::new(self.oid().clone(), self.value().cloned(), controls)
    }
}

impl fmt::Display for ExtendedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtendedRequest(oid='{}'", self.oid)?;
        if !self.controls.is_empty() {
            write!(f, ", controlCount={}", self.controls.len())?;
        }
        f.write_str(")")
    }
}
