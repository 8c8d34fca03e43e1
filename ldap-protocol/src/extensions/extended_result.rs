use crate::control::Control;
use crate::message::LdapMessage;
use crate::op::{ExtendedResponseProtocolOp, ProtocolOp};
use crate::result::LdapResultComponents;
use bytes::Bytes;
use ldap_core::{LdapError, LdapResult, ResultCode};
use std::fmt;

/// An extended response with its message ID and response controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedResult {
    message_id: i32,
    result: LdapResultComponents,
    oid: Option<String>,
    value: Option<Bytes>,
    controls: Vec<Control>,
}

impl ExtendedResult {
    pub fn new(
        message_id: i32,
        result: LdapResultComponents,
        oid: Option<String>,
        value: Option<Bytes>,
        controls: Vec<Control>,
    ) -> Self {
        Self {
            message_id,
            result,
            oid,
            value,
            controls,
        }
    }

    pub fn from_protocol_op(
        message_id: i32,
        op: &ExtendedResponseProtocolOp,
        controls: Vec<Control>,
    ) -> Self {
        Self::new(
            message_id,
            op.result().clone(),
            op.oid().map(str::to_string),
            op.value().cloned(),
            controls,
        )
    }

    /// Extract the extended result from a message
    ///
    /// # Errors
    /// Returns [`LdapError::Decoding`] if the message holds another operation
    pub fn from_message(message: &LdapMessage) -> LdapResult<Self> {
        match message.op() {
            ProtocolOp::ExtendedResponse(op) => Ok(Self::from_protocol_op(
                message.message_id(),
                op,
                message.controls().to_vec(),
            )),
            other => Err(LdapError::decoding(format!(
                "message {} holds a {}, not an extended response",
                message.message_id(),
                other.op_type()
            ))),
        }
    }

    pub fn message_id(&self) -> i32 {
        self.message_id
    }

    pub fn result(&self) -> &LdapResultComponents {
        &self.result
    }

    pub fn result_code(&self) -> ResultCode {
        self.result.result_code()
    }

    pub fn oid(&self) -> Option<&str> {
        self.oid.as_deref()
    }

    pub fn value(&self) -> Option<&Bytes> {
        self.value.as_ref()
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn to_protocol_op(&self) -> ExtendedResponseProtocolOp {
        ExtendedResponseProtocolOp::new(self.result.clone(), self.oid.clone(), self.value.clone())
    }

    pub fn to_message(&self) -> LdapMessage {
        LdapMessage::new(self.message_id, self.to_protocol_op(), self.controls.clone())
    }

    /// Write the fields shared by all extended results, after the result code
    pub(crate) fn write_common_fields(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = self.result.diagnostic_message() {
            write!(f, ", diagnosticMessage='{}'", message)?;
        }
        if let Some(dn) = self.result.matched_dn() {
            write!(f, ", matchedDN='{}'", dn)?;
        }
        if !self.result.referral_urls().is_empty() {
            write!(f, ", referralURLs={{'{}'}}", self.result.referral_urls().join("', '"))?;
        }
        if !self.controls.is_empty() {
            f.write_str(", responseControls={")?;
            for (i, control) in self.controls.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", control)?;
            }
            f.write_str("}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ExtendedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtendedResult(resultCode={}", self.result.result_code())?;
        if self.message_id >= 0 {
            write!(f, ", messageID={}", self.message_id)?;
        }
        if let Some(oid) = &self.oid {
            write!(f, ", oid={}", oid)?;
        }
        self.write_common_fields(f)?;
        f.write_str(")")
    }
}
