//! The interceptor capability trait

use ldap_core::LdapResult;
use ldap_protocol::op::{
    AddRequestProtocolOp, AddResponseProtocolOp, BindRequestProtocolOp, BindResponseProtocolOp,
    CompareRequestProtocolOp, CompareResponseProtocolOp, DeleteRequestProtocolOp,
    DeleteResponseProtocolOp, ExtendedRequestProtocolOp, ExtendedResponseProtocolOp,
    IntermediateResponseProtocolOp, ModifyDNRequestProtocolOp, ModifyDNResponseProtocolOp,
    ModifyRequestProtocolOp, ModifyResponseProtocolOp, SearchRequestProtocolOp,
    SearchResultDoneProtocolOp, SearchResultEntryProtocolOp, SearchResultReferenceProtocolOp,
};
use ldap_protocol::{Control, LdapMessage, ProtocolOp};

/// An operation passed to an interceptor, with its message ID and controls
///
/// The operation and the controls may be replaced; the message ID may not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedOperation<T> {
    message_id: i32,
    op: T,
    controls: Vec<Control>,
}

impl<T> InterceptedOperation<T> {
    pub fn new(message_id: i32, op: T, controls: Vec<Control>) -> Self {
        Self {
            message_id,
            op,
            controls,
        }
    }

    pub fn message_id(&self) -> i32 {
        self.message_id
    }

    pub fn op(&self) -> &T {
        &self.op
    }

    /// Replace the operation, returning the previous one
    pub fn set_op(&mut self, op: T) -> T {
        std::mem::replace(&mut self.op, op)
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut Vec<Control> {
        &mut self.controls
    }
}

impl<T: Into<ProtocolOp>> InterceptedOperation<T> {
    /// Rebuild the message with whatever the interceptors left in place
    pub fn into_message(self) -> LdapMessage {
        LdapMessage::new(self.message_id, self.op, self.controls)
    }
}

/// Hooks invoked for each intercepted request and result
///
/// Every handler defaults to passing the operation through unchanged, so an
/// implementation only overrides the operations it cares about. A request
/// handler that returns an error rejects the request; the error's
/// [`result_code`](ldap_core::LdapError::result_code) is what the client
/// should be sent.
///
/// Unbind and abandon requests are not intercepted.
#[cfg_attr(test, mockall::automock)]
pub trait OperationInterceptor: Send + Sync {
    fn process_add_request(
        &self,
        _request: &mut InterceptedOperation<AddRequestProtocolOp>,
    ) -> LdapResult<()> {
        Ok(())
    }

    fn process_add_result(&self, _result: &mut InterceptedOperation<AddResponseProtocolOp>) {}

    /// Called for binds carrying simple credentials
    fn process_simple_bind_request(
        &self,
        _request: &mut InterceptedOperation<BindRequestProtocolOp>,
    ) -> LdapResult<()> {
        Ok(())
    }

    /// Called for binds carrying SASL credentials
    fn process_sasl_bind_request(
        &self,
        _request: &mut InterceptedOperation<BindRequestProtocolOp>,
    ) -> LdapResult<()> {
        Ok(())
    }

    fn process_bind_result(&self, _result: &mut InterceptedOperation<BindResponseProtocolOp>) {}

    fn process_compare_request(
        &self,
        _request: &mut InterceptedOperation<CompareRequestProtocolOp>,
    ) -> LdapResult<()> {
        Ok(())
    }

    fn process_compare_result(
        &self,
        _result: &mut InterceptedOperation<CompareResponseProtocolOp>,
    ) {}

    fn process_delete_request(
        &self,
        _request: &mut InterceptedOperation<DeleteRequestProtocolOp>,
    ) -> LdapResult<()> {
        Ok(())
    }

    fn process_delete_result(&self, _result: &mut InterceptedOperation<DeleteResponseProtocolOp>) {}

    fn process_extended_request(
        &self,
        _request: &mut InterceptedOperation<ExtendedRequestProtocolOp>,
    ) -> LdapResult<()> {
        Ok(())
    }

    fn process_extended_result(
        &self,
        _result: &mut InterceptedOperation<ExtendedResponseProtocolOp>,
    ) {}

    fn process_modify_request(
        &self,
        _request: &mut InterceptedOperation<ModifyRequestProtocolOp>,
    ) -> LdapResult<()> {
        Ok(())
    }

    fn process_modify_result(&self, _result: &mut InterceptedOperation<ModifyResponseProtocolOp>) {}

    fn process_modify_dn_request(
        &self,
        _request: &mut InterceptedOperation<ModifyDNRequestProtocolOp>,
    ) -> LdapResult<()> {
        Ok(())
    }

    fn process_modify_dn_result(
        &self,
        _result: &mut InterceptedOperation<ModifyDNResponseProtocolOp>,
    ) {}

    fn process_search_request(
        &self,
        _request: &mut InterceptedOperation<SearchRequestProtocolOp>,
    ) -> LdapResult<()> {
        Ok(())
    }

    fn process_search_entry(
        &self,
        _entry: &mut InterceptedOperation<SearchResultEntryProtocolOp>,
    ) {}

    fn process_search_reference(
        &self,
        _reference: &mut InterceptedOperation<SearchResultReferenceProtocolOp>,
    ) {}

    fn process_search_result(
        &self,
        _result: &mut InterceptedOperation<SearchResultDoneProtocolOp>,
    ) {}

    fn process_intermediate_response(
        &self,
        _response: &mut InterceptedOperation<IntermediateResponseProtocolOp>,
    ) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PassThrough;

    impl OperationInterceptor for PassThrough {}

    #[test]
    fn test_default_handlers_pass_through() {
        let mut request =
            InterceptedOperation::new(4, DeleteRequestProtocolOp::new("cn=a"), Vec::new());
        PassThrough.process_delete_request(&mut request).unwrap();
        assert_eq!(request.op().dn(), "cn=a");
        assert_eq!(
            request.into_message(),
            LdapMessage::new(4, DeleteRequestProtocolOp::new("cn=a"), Vec::new())
        );
    }

    #[test]
    fn test_set_op_returns_previous() {
        let mut request =
            InterceptedOperation::new(1, DeleteRequestProtocolOp::new("cn=a"), Vec::new());
        let previous = request.set_op(DeleteRequestProtocolOp::new("cn=b"));
        assert_eq!(previous.dn(), "cn=a");
        assert_eq!(request.op().dn(), "cn=b");
        assert_eq!(request.message_id(), 1);
    }
}
