//! Extended operations
//!
//! [`ExtendedRequest`] and [`ExtendedResult`] are the message-level forms of
//! the extended request and response operations, carrying the message ID and
//! controls alongside the OID and value. The specific extended operations in
//! this module build on them and encode their own structured values.

mod batched_transaction;
mod extended_request;
mod extended_result;

pub use batched_transaction::{
    EndBatchedTransactionExtendedRequest, EndBatchedTransactionExtendedResult,
    StartBatchedTransactionExtendedRequest, StartBatchedTransactionExtendedResult,
    END_BATCHED_TRANSACTION_REQUEST_OID, START_BATCHED_TRANSACTION_REQUEST_OID,
};
pub use extended_request::ExtendedRequest;
pub use extended_result::ExtendedResult;
