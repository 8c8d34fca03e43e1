//! Batched transactions
//!
//! A client starts a transaction, sends operations carrying the transaction
//! ID in a control, and ends it with a commit or abort. The end result
//! reports which operation failed, if any, and the response controls of the
//! operations that returned any.
//!
//! ```text
//! EndBatchedTransactionRequestValue ::= SEQUENCE {
//!      txnID        OCTET STRING,
//!      commit       BOOLEAN DEFAULT TRUE }
//!
//! EndBatchedTransactionResultValue ::= SEQUENCE {
//!      failedOpMessageID     INTEGER OPTIONAL,
//!      controls              SEQUENCE OF SEQUENCE {
//!           messageID     INTEGER,
//!           controls      SEQUENCE OF Control } OPTIONAL }
//! ```

use super::{ExtendedRequest, ExtendedResult};
use crate::control::{decode_controls, encode_controls, Control};
use crate::result::LdapResultComponents;
use bytes::Bytes;
use ldap_asn1::ber::types::{
    UNIVERSAL_BOOLEAN_TYPE, UNIVERSAL_INTEGER_TYPE, UNIVERSAL_SEQUENCE_TYPE,
};
use ldap_asn1::BerElement;
use ldap_core::{DecodeContext, LdapError, LdapResult, Oid};
use std::collections::BTreeMap;
use std::fmt;

pub const START_BATCHED_TRANSACTION_REQUEST_OID: &str = "1.3.6.1.4.1.30221.2.5.1";
pub const END_BATCHED_TRANSACTION_REQUEST_OID: &str = "1.3.6.1.4.1.30221.2.5.2";

/// Failed operation message ID reported when no operation failed
const NO_FAILED_OPERATION: i32 = -1;

fn check_request_oid(request: &ExtendedRequest, expected: &str) -> LdapResult<()> {
    if request.oid().as_str() == expected {
        Ok(())
    } else {
        Err(LdapError::decoding(format!(
            "extended request OID {} is not {}",
            request.oid(),
            expected
        )))
    }
}

/// Request to start a batched transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartBatchedTransactionExtendedRequest {
    controls: Vec<Control>,
}

impl StartBatchedTransactionExtendedRequest {
    pub fn new(controls: Vec<Control>) -> Self {
        Self { controls }
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Decode from a generic extended request
    ///
    /// # Errors
    /// Returns [`LdapError::Decoding`] if the OID does not match or a value is present
    pub fn from_extended_request(request: &ExtendedRequest) -> LdapResult<Self> {
        check_request_oid(request, START_BATCHED_TRANSACTION_REQUEST_OID)?;
        if request.value().is_some() {
            return Err(LdapError::decoding(
                "start batched transaction request must not have a value",
            ));
        }
        Ok(Self::new(request.controls().to_vec()))
    }

    pub fn to_extended_request(&self) -> ExtendedRequest {
        ExtendedRequest::new(
            Oid::from_static(START_BATCHED_TRANSACTION_REQUEST_OID),
            None,
            self.controls.clone(),
        )
    }
}

/// Result of a start batched transaction request; the value is the transaction ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartBatchedTransactionExtendedResult {
    result: ExtendedResult,
    transaction_id: Option<Bytes>,
}

impl StartBatchedTransactionExtendedResult {
    pub fn new(
        message_id: i32,
        components: LdapResultComponents,
        transaction_id: Option<Bytes>,
        controls: Vec<Control>,
    ) -> Self {
        let result = ExtendedResult::new(
            message_id,
            components,
            None,
            transaction_id.clone(),
            controls,
        );
        Self {
            result,
            transaction_id,
        }
    }

    pub fn from_extended_result(result: ExtendedResult) -> Self {
        let transaction_id = result.value().cloned();
        Self {
            result,
            transaction_id,
        }
    }

    pub fn transaction_id(&self) -> Option<&Bytes> {
        self.transaction_id.as_ref()
    }

    pub fn extended_result(&self) -> &ExtendedResult {
        &self.result
    }
}

impl fmt::Display for StartBatchedTransactionExtendedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StartBatchedTransactionExtendedResult(resultCode={}",
            self.result.result_code()
        )?;
        if self.result.message_id() >= 0 {
            write!(f, ", messageID={}", self.result.message_id())?;
        }
        if let Some(id) = &self.transaction_id {
            write!(f, ", transactionID='{}'", String::from_utf8_lossy(id))?;
        }
        self.result.write_common_fields(f)?;
        f.write_str(")")
    }
}

/// Request to commit or abort a batched transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndBatchedTransactionExtendedRequest {
    transaction_id: Bytes,
    commit: bool,
    controls: Vec<Control>,
}

impl EndBatchedTransactionExtendedRequest {
    pub fn new(transaction_id: Bytes, commit: bool, controls: Vec<Control>) -> Self {
        Self {
            transaction_id,
            commit,
            controls,
        }
    }

    pub fn transaction_id(&self) -> &Bytes {
        &self.transaction_id
    }

    /// `true` to commit, `false` to abort
    pub fn commit(&self) -> bool {
        self.commit
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Encode the request value; `commit` is only written when false
    pub fn encode_value(transaction_id: &Bytes, commit: bool) -> Bytes {
        let mut elements = vec![BerElement::universal_octet_string(transaction_id.clone())];
        if !commit {
            elements.push(BerElement::universal_boolean(false));
        }
        Bytes::from(BerElement::universal_sequence(&elements).encode())
    }

    /// Decode the request value into the transaction ID and commit flag
    pub fn decode_value(value: &[u8]) -> LdapResult<(Bytes, bool)> {
        let elements = BerElement::decode(value)
            .and_then(|e| e.decode_as_sequence())
            .decoding_context(|| "end batched transaction request value is not a sequence")?;

        match elements.as_slice() {
            [txn_id] => Ok((txn_id.decode_as_octet_string(), true)),
            [txn_id, commit] if commit.tag() == UNIVERSAL_BOOLEAN_TYPE => {
                let commit = commit
                    .decode_as_boolean()
                    .decoding_context(|| "cannot decode the commit flag")?;
                Ok((txn_id.decode_as_octet_string(), commit))
            }
            [_, other] => Err(LdapError::decoding(format!(
                "unexpected element type 0x{:02x} in end batched transaction request value",
                other.tag()
            ))),
            other => Err(LdapError::decoding(format!(
                "end batched transaction request value must have 1 or 2 elements, got {}",
                other.len()
            ))),
        }
    }

    /// Decode from a generic extended request
    pub fn from_extended_request(request: &ExtendedRequest) -> LdapResult<Self> {
        check_request_oid(request, END_BATCHED_TRANSACTION_REQUEST_OID)?;
        let value = request
            .value()
            .ok_or_else(|| LdapError::decoding("end batched transaction request has no value"))?;
        let (transaction_id, commit) = Self::decode_value(value)?;
        Ok(Self::new(transaction_id, commit, request.controls().to_vec()))
    }

    pub fn to_extended_request(&self) -> ExtendedRequest {
        ExtendedRequest::new(
            Oid::from_static(END_BATCHED_TRANSACTION_REQUEST_OID),
            Some(Self::encode_value(&self.transaction_id, self.commit)),
            self.controls.clone(),
        )
    }
}

/// Result of an end batched transaction request
///
/// The value reports the message ID of the operation that failed (`-1` if
/// none did) and the response controls returned by the operations in the
/// transaction, keyed by message ID. Message IDs whose operations returned no
/// controls never appear as keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndBatchedTransactionExtendedResult {
    result: ExtendedResult,
    failed_op_message_id: i32,
    op_response_controls: BTreeMap<i32, Vec<Control>>,
}

impl EndBatchedTransactionExtendedResult {
    /// Create a result from known fields
    ///
    /// A failed message ID that is absent or not positive is reported as
    /// `-1`. Empty control lists are left out of the map.
    pub fn new(
        message_id: i32,
        components: LdapResultComponents,
        failed_op_message_id: Option<i32>,
        op_response_controls: Option<BTreeMap<i32, Vec<Control>>>,
        controls: Vec<Control>,
    ) -> Self {
        let failed_op_message_id = failed_op_message_id.filter(|id| *id > 0);
        let op_response_controls = op_response_controls.map(|map| {
            map.into_iter()
                .filter(|(_, controls)| !controls.is_empty())
                .collect::<BTreeMap<_, _>>()
        });

        let value = Self::encode_value(failed_op_message_id, op_response_controls.as_ref());
        let result = ExtendedResult::new(message_id, components, None, value, controls);

        Self {
            result,
            failed_op_message_id: failed_op_message_id.unwrap_or(NO_FAILED_OPERATION),
            op_response_controls: op_response_controls.unwrap_or_default(),
        }
    }

    /// Decode the result value of a generic extended result
    ///
    /// # Errors
    /// Returns [`LdapError::Decoding`] if the value is malformed
    pub fn from_extended_result(result: ExtendedResult) -> LdapResult<Self> {
        let (failed_op_message_id, op_response_controls) = Self::decode_value(result.value())?;
        Ok(Self {
            result,
            failed_op_message_id,
            op_response_controls,
        })
    }

    /// Encode the result value
    ///
    /// # Returns
    /// `None` if both inputs are absent; otherwise the encoded sequence, which
    /// holds the failed message ID if given and the control map if it is given
    /// and not empty
    pub fn encode_value(
        failed_op_message_id: Option<i32>,
        op_response_controls: Option<&BTreeMap<i32, Vec<Control>>>,
    ) -> Option<Bytes> {
        if failed_op_message_id.is_none() && op_response_controls.is_none() {
            return None;
        }

        let mut elements = Vec::with_capacity(2);
        if let Some(id) = failed_op_message_id {
            elements.push(BerElement::universal_integer(i64::from(id)));
        }
        if let Some(map) = op_response_controls.filter(|m| !m.is_empty()) {
            let entries: Vec<BerElement> = map
                .iter()
                .map(|(id, controls)| {
                    BerElement::universal_sequence(&[
                        BerElement::universal_integer(i64::from(*id)),
                        encode_controls(controls),
                    ])
                })
                .collect();
            elements.push(BerElement::universal_sequence(&entries));
        }

        Some(Bytes::from(BerElement::universal_sequence(&elements).encode()))
    }

    /// Decode the result value
    ///
    /// An absent value or an empty sequence yields `(-1, {})`.
    pub fn decode_value(value: Option<&Bytes>) -> LdapResult<(i32, BTreeMap<i32, Vec<Control>>)> {
        let Some(value) = value else {
            return Ok((NO_FAILED_OPERATION, BTreeMap::new()));
        };

        let elements = BerElement::decode(value)
            .and_then(|e| e.decode_as_sequence())
            .decoding_context(|| "end batched transaction result value is not a sequence")?;
        if elements.len() > 2 {
            return Err(LdapError::decoding(format!(
                "end batched transaction result value has {} elements, at most 2 are allowed",
                elements.len()
            )));
        }

        let mut failed_op_message_id = NO_FAILED_OPERATION;
        let mut op_response_controls = BTreeMap::new();
        for element in &elements {
            match element.tag() {
                UNIVERSAL_INTEGER_TYPE => {
                    failed_op_message_id = element
                        .decode_as_integer()
                        .decoding_context(|| "cannot decode the failed operation message ID")?;
                }
                UNIVERSAL_SEQUENCE_TYPE => decode_op_controls(element, &mut op_response_controls)?,
                other => {
                    return Err(LdapError::decoding(format!(
                        "unexpected element type 0x{:02x} in end batched transaction result value",
                        other
                    )));
                }
            }
        }

        Ok((failed_op_message_id, op_response_controls))
    }

    /// Message ID of the operation that failed, or `-1`
    pub fn failed_op_message_id(&self) -> i32 {
        self.failed_op_message_id
    }

    /// Response controls of the operations in the transaction, by message ID
    pub fn operation_response_controls(&self) -> &BTreeMap<i32, Vec<Control>> {
        &self.op_response_controls
    }

    /// Response controls returned for one operation
    pub fn operation_response_controls_for(&self, message_id: i32) -> Option<&[Control]> {
        self.op_response_controls.get(&message_id).map(Vec::as_slice)
    }

    pub fn extended_result(&self) -> &ExtendedResult {
        &self.result
    }
}

fn decode_op_controls(
    element: &BerElement,
    map: &mut BTreeMap<i32, Vec<Control>>,
) -> LdapResult<()> {
    let entries = element
        .decode_as_sequence()
        .decoding_context(|| "operation response controls element is not a sequence")?;

    for entry in &entries {
        let parts = entry
            .decode_as_sequence()
            .decoding_context(|| "operation response controls entry is not a sequence")?;
        if parts.len() != 2 {
            return Err(LdapError::decoding(format!(
                "operation response controls entry must have 2 elements, got {}",
                parts.len()
            )));
        }

        let message_id = parts[0]
            .decode_as_integer()
            .decoding_context(|| "cannot decode the message ID of a response controls entry")?;
        let controls = decode_controls(&parts[1])
            .decoding_context(|| {
                format!("cannot decode the response controls for message {}", message_id)
            })?;
        if controls.is_empty() {
            continue;
        }
        map.insert(message_id, controls);
    }

    Ok(())
}

impl fmt::Display for EndBatchedTransactionExtendedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EndBatchedTransactionExtendedResult(resultCode={}",
            self.result.result_code()
        )?;
        if self.result.message_id() >= 0 {
            write!(f, ", messageID={}", self.result.message_id())?;
        }
        if self.failed_op_message_id > 0 {
            write!(f, ", failedOpMessageID={}", self.failed_op_message_id)?;
        }
        if !self.op_response_controls.is_empty() {
            f.write_str(", opResponseControls={")?;
            for (i, (id, controls)) in self.op_response_controls.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "opMsgID={}, opControls={{", id)?;
                for (j, control) in controls.iter().enumerate() {
                    if j > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", control)?;
                }
                f.write_str("}")?;
            }
            f.write_str("}")?;
        }
        self.result.write_common_fields(f)?;
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::LdapMessage;
    use ldap_core::ResultCode;

    fn control_a() -> Control {
        Control::new(Oid::new("1.2.3.4").unwrap(), false, Some(Bytes::from_static(b"a")))
    }

    fn success() -> LdapResultComponents {
        LdapResultComponents::from_result_code(ResultCode::SUCCESS)
    }

    #[test]
    fn test_empty_control_lists_are_dropped() {
        let mut map = BTreeMap::new();
        map.insert(3, vec![control_a()]);
        map.insert(7, Vec::new());

        let value = EndBatchedTransactionExtendedResult::encode_value(Some(5), Some(&map)).unwrap();
        let (failed, decoded) =
            EndBatchedTransactionExtendedResult::decode_value(Some(&value)).unwrap();
        assert_eq!(failed, 5);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get(&3), Some(&vec![control_a()]));
        assert!(!decoded.contains_key(&7));
    }

    #[test]
    fn test_absent_value_decodes_to_defaults() {
        let (failed, map) = EndBatchedTransactionExtendedResult::decode_value(None).unwrap();
        assert_eq!(failed, -1);
        assert!(map.is_empty());

        let result = ExtendedResult::new(1, success(), None, None, Vec::new());
        let end = EndBatchedTransactionExtendedResult::from_extended_result(result).unwrap();
        assert_eq!(end.failed_op_message_id(), -1);
        assert!(end.operation_response_controls().is_empty());
    }

    #[test]
    fn test_empty_sequence_decodes_to_defaults() {
        let value = Bytes::from_static(&[0x30, 0x00]);
        let (failed, map) =
            EndBatchedTransactionExtendedResult::decode_value(Some(&value)).unwrap();
        assert_eq!(failed, -1);
        assert!(map.is_empty());
    }

    #[test]
    fn test_encode_value_absent_when_nothing_given() {
        assert!(EndBatchedTransactionExtendedResult::encode_value(None, None).is_none());
        assert_eq!(
            EndBatchedTransactionExtendedResult::encode_value(Some(2), None).unwrap().as_ref(),
            &[0x30, 0x03, 0x02, 0x01, 0x02]
        );
        assert_eq!(
            EndBatchedTransactionExtendedResult::encode_value(None, Some(&BTreeMap::new()))
                .unwrap()
                .as_ref(),
            &[0x30, 0x00]
        );
    }

    #[test]
    fn test_too_many_elements_rejected() {
        let value = Bytes::from(
            BerElement::universal_sequence(&[
                BerElement::universal_integer(1),
                BerElement::universal_sequence(&[]),
                BerElement::universal_integer(2),
            ])
            .encode(),
        );
        let error = EndBatchedTransactionExtendedResult::decode_value(Some(&value)).unwrap_err();
        assert!(matches!(error, LdapError::Decoding { .. }));
    }

    #[test]
    fn test_unexpected_element_type_rejected() {
        let value = Bytes::from(
            BerElement::universal_sequence(&[BerElement::universal_octet_string("x")]).encode(),
        );
        assert!(EndBatchedTransactionExtendedResult::decode_value(Some(&value)).is_err());
    }

    #[test]
    fn test_value_not_a_sequence_rejected() {
        let value = Bytes::from_static(&[0x30, 0x05, 0x02]);
        let error = EndBatchedTransactionExtendedResult::decode_value(Some(&value)).unwrap_err();
        assert!(matches!(error.root_cause(), LdapError::Asn1Decoding(_)));
    }

    #[test]
    fn test_control_entry_with_wrong_element_count_rejected() {
        let value = Bytes::from(
            BerElement::universal_sequence(&[BerElement::universal_sequence(&[
                BerElement::universal_sequence(&[BerElement::universal_integer(3)]),
            ])])
            .encode(),
        );
        let error = EndBatchedTransactionExtendedResult::decode_value(Some(&value)).unwrap_err();
        assert!(matches!(error, LdapError::Decoding { .. }));
        assert!(error.to_string().contains("must have 2 elements, got 1"));
    }

    #[test]
    fn test_control_entry_with_bad_message_id_rejected() {
        let oversized_id = BerElement::new(UNIVERSAL_INTEGER_TYPE, vec![0x01u8; 9]);
        let value = Bytes::from(
            BerElement::universal_sequence(&[BerElement::universal_sequence(&[
                BerElement::universal_sequence(&[oversized_id, encode_controls(&[control_a()])]),
            ])])
            .encode(),
        );
        let error = EndBatchedTransactionExtendedResult::decode_value(Some(&value)).unwrap_err();
        assert!(matches!(error, LdapError::Decoding { .. }));
        assert!(error
            .to_string()
            .contains("cannot decode the message ID of a response controls entry"));
        assert!(matches!(error.root_cause(), LdapError::Asn1Decoding(_)));
    }

    #[test]
    fn test_control_entry_with_truncated_control_rejected() {
        // the control's OID claims 5 bytes but only 1 is present
        let truncated_controls =
            BerElement::new(UNIVERSAL_SEQUENCE_TYPE, vec![0x30u8, 0x03, 0x04, 0x05, b'1']);
        let value = Bytes::from(
            BerElement::universal_sequence(&[BerElement::universal_sequence(&[
                BerElement::universal_sequence(&[
                    BerElement::universal_integer(3),
                    truncated_controls,
                ]),
            ])])
            .encode(),
        );
        let error = EndBatchedTransactionExtendedResult::decode_value(Some(&value)).unwrap_err();
        assert!(matches!(error, LdapError::Decoding { .. }));
        assert!(error.to_string().contains("cannot decode the response controls for message 3"));
        assert!(matches!(error.root_cause(), LdapError::Asn1Decoding(_)));
    }

    #[test]
    fn test_direct_construction() {
        let mut map = BTreeMap::new();
        map.insert(9, vec![control_a()]);
        map.insert(4, Vec::new());

        let end =
            EndBatchedTransactionExtendedResult::new(12, success(), Some(0), Some(map), Vec::new());
        assert_eq!(end.failed_op_message_id(), -1);
        assert_eq!(end.operation_response_controls().len(), 1);
        assert_eq!(end.operation_response_controls_for(9), Some(&[control_a()][..]));
        assert_eq!(end.operation_response_controls_for(4), None);

        let decoded =
            EndBatchedTransactionExtendedResult::from_extended_result(end.extended_result().clone())
                .unwrap();
        assert_eq!(decoded, end);
    }

    #[test]
    fn test_message_round_trip() {
        let mut map = BTreeMap::new();
        map.insert(2, vec![control_a()]);
        let end = EndBatchedTransactionExtendedResult::new(
            6,
            LdapResultComponents::new(
                ResultCode::CONSTRAINT_VIOLATION,
                None,
                Some("op 3 failed".to_string()),
                Vec::new(),
            ),
            Some(3),
            Some(map),
            Vec::new(),
        );

        let message =
            LdapMessage::from_bytes(&end.extended_result().to_message().to_bytes()).unwrap();
        let result = ExtendedResult::from_message(&message).unwrap();
        let decoded = EndBatchedTransactionExtendedResult::from_extended_result(result).unwrap();
        assert_eq!(decoded.failed_op_message_id(), 3);
        assert_eq!(decoded.operation_response_controls(), end.operation_response_controls());
        assert_eq!(
            decoded.to_string(),
            "EndBatchedTransactionExtendedResult(resultCode=19 (constraint violation), \
             messageID=6, failedOpMessageID=3, opResponseControls={opMsgID=2, \
             opControls={Control(oid=1.2.3.4, isCritical=false, valueLength=1)}}, \
             diagnosticMessage='op 3 failed')"
        );
    }

    #[test]
    fn test_end_request_value() {
        let txn = Bytes::from_static(b"txn-1");
        let commit = EndBatchedTransactionExtendedRequest::encode_value(&txn, true);
        assert_eq!(commit.as_ref(), &[0x30, 0x07, 0x04, 0x05, b't', b'x', b'n', b'-', b'1']);
        assert_eq!(
            EndBatchedTransactionExtendedRequest::decode_value(&commit).unwrap(),
            (txn.clone(), true)
        );

        let abort = EndBatchedTransactionExtendedRequest::new(txn.clone(), false, Vec::new());
        let request = abort.to_extended_request();
        assert_eq!(
            EndBatchedTransactionExtendedRequest::from_extended_request(&request).unwrap(),
            abort
        );
    }

    #[test]
    fn test_start_request_and_result() {
        let request = StartBatchedTransactionExtendedRequest::default().to_extended_request();
        assert_eq!(request.oid().as_str(), START_BATCHED_TRANSACTION_REQUEST_OID);
        assert!(StartBatchedTransactionExtendedRequest::from_extended_request(&request).is_ok());
        assert!(EndBatchedTransactionExtendedRequest::from_extended_request(&request).is_err());

        let result = StartBatchedTransactionExtendedResult::new(
            1,
            success(),
            Some(Bytes::from_static(b"t1")),
            Vec::new(),
        );
        let decoded = StartBatchedTransactionExtendedResult::from_extended_result(
            result.extended_result().clone(),
        );
        assert_eq!(decoded.transaction_id().map(|b| b.as_ref()), Some(&b"t1"[..]));
    }
}
