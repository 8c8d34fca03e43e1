use crate::result_code::ResultCode;
use thiserror::Error;

/// Main error type for LDAP protocol operations
///
/// Decoding failures carry the lower-level failure that caused them as their
/// [`source`](std::error::Error::source), so a caller can walk the whole chain
/// from "cannot decode the extended request" down to the malformed length.
#[derive(Error, Debug, Clone)]
pub enum LdapError {
    /// A protocol element could not be decoded.
    #[error("Decoding error: {message}")]
    Decoding {
        message: String,
        #[source]
        source: Option<Box<LdapError>>,
    },

    /// Raised by the BER primitive layer (tags, lengths, raw values).
    #[error("ASN.1 decoding error: {0}")]
    Asn1Decoding(String),

    /// Construction-time validation failure.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A matching rule could not normalize the provided value.
    #[error("Invalid attribute syntax: {0}")]
    InvalidAttributeSyntax(String),

    /// An operation was rejected by a request interceptor.
    #[error("Operation rejected ({result_code}): {message}")]
    Rejected {
        result_code: ResultCode,
        message: String,
    },
}

impl LdapError {
    /// Create a decoding error without an underlying cause
    pub fn decoding(message: impl Into<String>) -> Self {
        LdapError::Decoding {
            message: message.into(),
            source: None,
        }
    }

    /// Create a decoding error wrapping the failure that caused it
    pub fn decoding_caused_by(message: impl Into<String>, cause: LdapError) -> Self {
        LdapError::Decoding {
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Create a rejection with the given result code
    pub fn rejected(result_code: ResultCode, message: impl Into<String>) -> Self {
        LdapError::Rejected {
            result_code,
            message: message.into(),
        }
    }

    /// The LDAP result code a server would report for this error
    pub fn result_code(&self) -> ResultCode {
        match self {
            LdapError::Decoding { .. } | LdapError::Asn1Decoding(_) => ResultCode::DECODING_ERROR,
            LdapError::InvalidData(_) => ResultCode::PARAM_ERROR,
            LdapError::InvalidAttributeSyntax(_) => ResultCode::INVALID_ATTRIBUTE_SYNTAX,
            LdapError::Rejected { result_code, .. } => *result_code,
        }
    }

    /// Check whether this error reports a decoding failure at any level
    pub fn is_decoding_error(&self) -> bool {
        matches!(self, LdapError::Decoding { .. } | LdapError::Asn1Decoding(_))
    }

    /// The innermost error of the cause chain
    pub fn root_cause(&self) -> &LdapError {
        let mut current = self;
        while let LdapError::Decoding {
            source: Some(cause), ..
        } = current
        {
            current = cause.as_ref();
        }
        current
    }
}

/// Result type alias for LDAP protocol operations
pub type LdapResult<T> = Result<T, LdapError>;

/// Re-wraps any failure into a [`LdapError::Decoding`] naming the piece of the
/// structure that could not be parsed.
pub trait DecodeContext<T> {
    fn decoding_context<F, S>(self, context: F) -> LdapResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> DecodeContext<T> for LdapResult<T> {
    fn decoding_context<F, S>(self, context: F) -> LdapResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|cause| {
            let message = context().into();
            log::debug!("{}: {}", message, cause);
            LdapError::decoding_caused_by(message, cause)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_decoding_context_keeps_cause() {
        let result: LdapResult<()> = Err(LdapError::Asn1Decoding("truncated length".to_string()));
        let err = result
            .decoding_context(|| "cannot decode the message ID")
            .unwrap_err();

        assert!(err.is_decoding_error());
        assert_eq!(err.to_string(), "Decoding error: cannot decode the message ID");
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "ASN.1 decoding error: truncated length");
    }

    #[test]
    fn test_root_cause() {
        let inner = LdapError::Asn1Decoding("bad tag".to_string());
        let middle = LdapError::decoding_caused_by("control", inner);
        let outer = LdapError::decoding_caused_by("controls", middle);
        assert!(matches!(outer.root_cause(), LdapError::Asn1Decoding(m) if m == "bad tag"));
    }

    #[test]
    fn test_result_codes() {
        assert_eq!(LdapError::decoding("x").result_code(), ResultCode::DECODING_ERROR);
        assert_eq!(
            LdapError::InvalidAttributeSyntax("x".to_string()).result_code(),
            ResultCode::INVALID_ATTRIBUTE_SYNTAX
        );
        assert_eq!(
            LdapError::rejected(ResultCode::UNWILLING_TO_PERFORM, "no").result_code(),
            ResultCode::UNWILLING_TO_PERFORM
        );
    }
}
