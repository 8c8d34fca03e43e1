//! Ordered dispatch of messages to interceptors

use crate::interceptor::{InterceptedOperation, OperationInterceptor};
use ldap_core::LdapResult;
use ldap_protocol::op::BindCredentials;
use ldap_protocol::{Control, LdapMessage, ProtocolOp};
use std::fmt;
use std::sync::Arc;

/// Interceptors applied in registration order
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn OperationInterceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interceptor to the end of the chain
    pub fn with_interceptor(mut self, interceptor: Arc<dyn OperationInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Run a request through every interceptor
    ///
    /// Returns the message as the last interceptor left it. The first
    /// interceptor to reject the request ends processing and its error is
    /// returned; later interceptors are not called. Operations that have no
    /// request handler pass through unchanged.
    pub fn process_request(&self, message: LdapMessage) -> LdapResult<LdapMessage> {
        let (message_id, op, controls) = message.into_parts();
        log::trace!("intercepting {} of message {}", op.op_type(), message_id);

        match op {
            ProtocolOp::AddRequest(op) => {
                self.intercept_request(message_id, op, controls, |i, r| i.process_add_request(r))
            }
            ProtocolOp::BindRequest(op) => {
                if matches!(op.credentials(), BindCredentials::Sasl { .. }) {
                    self.intercept_request(message_id, op, controls, |i, r| {
                        i.process_sasl_bind_request(r)
                    })
                } else {
                    self.intercept_request(message_id, op, controls, |i, r| {
                        i.process_simple_bind_request(r)
                    })
                }
            }
            ProtocolOp::CompareRequest(op) => {
                self.intercept_request(message_id, op, controls, |i, r| {
                    i.process_compare_request(r)
                })
            }
            ProtocolOp::DeleteRequest(op) => {
                self.intercept_request(message_id, op, controls, |i, r| i.process_delete_request(r))
            }
            ProtocolOp::ExtendedRequest(op) => {
                self.intercept_request(message_id, op, controls, |i, r| {
                    i.process_extended_request(r)
                })
            }
            ProtocolOp::ModifyRequest(op) => {
                self.intercept_request(message_id, op, controls, |i, r| i.process_modify_request(r))
            }
            ProtocolOp::ModifyDNRequest(op) => {
                self.intercept_request(message_id, op, controls, |i, r| {
                    i.process_modify_dn_request(r)
                })
            }
            ProtocolOp::SearchRequest(op) => {
                self.intercept_request(message_id, op, controls, |i, r| i.process_search_request(r))
            }
            op => {
                log::trace!("{} is not intercepted as a request", op.op_type());
                Ok(LdapMessage::new(message_id, op, controls))
            }
        }
    }

    /// Run a result (or search entry, reference or intermediate response)
    /// through every interceptor
    pub fn process_result(&self, message: LdapMessage) -> LdapMessage {
        let (message_id, op, controls) = message.into_parts();
        log::trace!("intercepting {} of message {}", op.op_type(), message_id);

        match op {
            ProtocolOp::AddResponse(op) => {
                self.intercept_result(message_id, op, controls, |i, r| i.process_add_result(r))
            }
            ProtocolOp::BindResponse(op) => {
                self.intercept_result(message_id, op, controls, |i, r| i.process_bind_result(r))
            }
            ProtocolOp::CompareResponse(op) => {
                self.intercept_result(message_id, op, controls, |i, r| i.process_compare_result(r))
            }
            ProtocolOp::DeleteResponse(op) => {
                self.intercept_result(message_id, op, controls, |i, r| i.process_delete_result(r))
            }
            ProtocolOp::ExtendedResponse(op) => {
                self.intercept_result(message_id, op, controls, |i, r| i.process_extended_result(r))
            }
            ProtocolOp::ModifyResponse(op) => {
                self.intercept_result(message_id, op, controls, |i, r| i.process_modify_result(r))
            }
            ProtocolOp::ModifyDNResponse(op) => {
                self.intercept_result(message_id, op, controls, |i, r| {
                    i.process_modify_dn_result(r)
                })
            }
            ProtocolOp::SearchResultEntry(op) => {
                self.intercept_result(message_id, op, controls, |i, r| i.process_search_entry(r))
            }
            ProtocolOp::SearchResultReference(op) => {
                self.intercept_result(message_id, op, controls, |i, r| {
                    i.process_search_reference(r)
                })
            }
            ProtocolOp::SearchResultDone(op) => {
                self.intercept_result(message_id, op, controls, |i, r| i.process_search_result(r))
            }
            ProtocolOp::IntermediateResponse(op) => {
                self.intercept_result(message_id, op, controls, |i, r| {
                    i.process_intermediate_response(r)
                })
            }
            op => {
                log::trace!("{} is not intercepted as a result", op.op_type());
                LdapMessage::new(message_id, op, controls)
            }
        }
    }

    fn intercept_request<T, F>(
        &self,
        message_id: i32,
        op: T,
        controls: Vec<Control>,
        handler: F,
    ) -> LdapResult<LdapMessage>
    where
        T: Into<ProtocolOp>,
        F: Fn(&dyn OperationInterceptor, &mut InterceptedOperation<T>) -> LdapResult<()>,
    {
        let mut operation = InterceptedOperation::new(message_id, op, controls);
        for (index, interceptor) in self.interceptors.iter().enumerate() {
            if let Err(e) = handler(interceptor.as_ref(), &mut operation) {
                log::warn!(
                    "interceptor {} rejected message {}: {} ({})",
                    index,
                    message_id,
                    e,
                    e.result_code()
                );
                return Err(e);
            }
        }
        Ok(operation.into_message())
    }

    fn intercept_result<T, F>(
        &self,
        message_id: i32,
        op: T,
        controls: Vec<Control>,
        handler: F,
    ) -> LdapMessage
    where
        T: Into<ProtocolOp>,
        F: Fn(&dyn OperationInterceptor, &mut InterceptedOperation<T>),
    {
        let mut operation = InterceptedOperation::new(message_id, op, controls);
        for interceptor in &self.interceptors {
            handler(interceptor.as_ref(), &mut operation);
        }
        operation.into_message()
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::MockOperationInterceptor;
    use bytes::Bytes;
    use ldap_core::{LdapError, ResultCode};
    use ldap_protocol::op::{
        AbandonRequestProtocolOp, BindRequestProtocolOp, DeleteRequestProtocolOp,
        SearchResultDoneProtocolOp, SearchResultEntryProtocolOp, UnbindRequestProtocolOp,
    };
    use ldap_protocol::{Attribute, LdapResultComponents};
    use mockall::Sequence;

    fn delete_message(dn: &str) -> LdapMessage {
        LdapMessage::new(2, DeleteRequestProtocolOp::new(dn), Vec::new())
    }

    #[test]
    fn test_empty_chain_passes_through() {
        let chain = InterceptorChain::new();
        assert!(chain.is_empty());
        let message = delete_message("cn=a");
        assert_eq!(chain.process_request(message.clone()).unwrap(), message);
    }

    #[test]
    fn test_interceptors_run_in_order() {
        let mut sequence = Sequence::new();
        let mut first = MockOperationInterceptor::new();
        first
            .expect_process_delete_request()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|request| {
                request.set_op(DeleteRequestProtocolOp::new("cn=b"));
                Ok(())
            });
        let mut second = MockOperationInterceptor::new();
        second
            .expect_process_delete_request()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|request| {
                assert_eq!(request.op().dn(), "cn=b");
                Ok(())
            });

        let chain = InterceptorChain::new()
            .with_interceptor(Arc::new(first))
            .with_interceptor(Arc::new(second));
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.process_request(delete_message("cn=a")).unwrap(), delete_message("cn=b"));
    }

    #[test]
    fn test_rejection_stops_the_chain() {
        let mut first = MockOperationInterceptor::new();
        first.expect_process_delete_request().times(1).returning(|_| {
            Err(LdapError::rejected(
                ResultCode::UNWILLING_TO_PERFORM,
                "deletes are disabled",
            ))
        });
        let mut second = MockOperationInterceptor::new();
        second.expect_process_delete_request().never();

        let chain = InterceptorChain::new()
            .with_interceptor(Arc::new(first))
            .with_interceptor(Arc::new(second));
        let error = chain.process_request(delete_message("cn=a")).unwrap_err();
        assert_eq!(error.result_code(), ResultCode::UNWILLING_TO_PERFORM);
    }

    #[test]
    fn test_bind_dispatch_by_credentials() {
        let mut interceptor = MockOperationInterceptor::new();
        interceptor.expect_process_simple_bind_request().times(1).returning(|_| Ok(()));
        interceptor.expect_process_sasl_bind_request().times(1).returning(|_| Ok(()));
        let chain = InterceptorChain::new().with_interceptor(Arc::new(interceptor));

        let simple = BindRequestProtocolOp::simple("cn=admin", Bytes::from_static(b"secret"));
        let sasl = BindRequestProtocolOp::sasl("", "EXTERNAL", None);
        chain.process_request(LdapMessage::new(1, simple, Vec::new())).unwrap();
        chain.process_request(LdapMessage::new(2, sasl, Vec::new())).unwrap();
    }

    #[test]
    fn test_unintercepted_requests_pass_through() {
        // No expectations: any handler call would fail the test.
        let chain =
            InterceptorChain::new().with_interceptor(Arc::new(MockOperationInterceptor::new()));
        let unbind = LdapMessage::new(3, UnbindRequestProtocolOp::new(), Vec::new());
        let abandon = LdapMessage::new(4, AbandonRequestProtocolOp::new(2), Vec::new());
        assert_eq!(chain.process_request(unbind.clone()).unwrap(), unbind);
        assert_eq!(chain.process_request(abandon.clone()).unwrap(), abandon);
    }

    #[test]
    fn test_results_are_intercepted() {
        let mut interceptor = MockOperationInterceptor::new();
        interceptor.expect_process_search_entry().times(1).returning(|entry| {
            entry.controls_mut().clear();
            entry.set_op(SearchResultEntryProtocolOp::new("cn=hidden", Vec::new()));
        });
        interceptor.expect_process_search_result().times(1).return_const(());
        let chain = InterceptorChain::new().with_interceptor(Arc::new(interceptor));

        let entry = LdapMessage::new(
            5,
            SearchResultEntryProtocolOp::new(
                "cn=visible",
                vec![Attribute::from_strings("cn", ["visible"])],
            ),
            Vec::new(),
        );
        let processed = chain.process_result(entry);
        match processed.op() {
            ProtocolOp::SearchResultEntry(entry) => assert_eq!(entry.dn(), "cn=hidden"),
            other => panic!("unexpected operation {}", other.op_type()),
        }

        let done = LdapMessage::new(
            5,
            SearchResultDoneProtocolOp::new(LdapResultComponents::from_result_code(
                ResultCode::SUCCESS,
            )),
            Vec::new(),
        );
        assert_eq!(chain.process_result(done.clone()), done);
    }
}
