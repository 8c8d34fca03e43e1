use serde::{Deserialize, Serialize};
use std::fmt;

/// LDAP result code
///
/// Result codes are carried as ENUMERATED values in every LDAP response. The
/// set is open-ended (servers and extensions define their own), so any `i32`
/// is representable; the well-known values from RFC 4511 and the client-side
/// codes of the LDAP C API have named constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResultCode(i32);

macro_rules! result_codes {
    ($($name:ident = $value:literal, $text:literal;)*) => {
        impl ResultCode {
            $(
                pub const $name: ResultCode = ResultCode($value);
            )*

            /// Get the standard name of this result code, if it is a known one
            pub fn name(&self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some($text),)*
                    _ => None,
                }
            }
        }
    };
}

result_codes! {
    SUCCESS = 0, "success";
    OPERATIONS_ERROR = 1, "operations error";
    PROTOCOL_ERROR = 2, "protocol error";
    TIME_LIMIT_EXCEEDED = 3, "time limit exceeded";
    SIZE_LIMIT_EXCEEDED = 4, "size limit exceeded";
    COMPARE_FALSE = 5, "compare false";
    COMPARE_TRUE = 6, "compare true";
    AUTH_METHOD_NOT_SUPPORTED = 7, "auth method not supported";
    STRONGER_AUTH_REQUIRED = 8, "stronger auth required";
    REFERRAL = 10, "referral";
    ADMIN_LIMIT_EXCEEDED = 11, "admin limit exceeded";
    UNAVAILABLE_CRITICAL_EXTENSION = 12, "unavailable critical extension";
    CONFIDENTIALITY_REQUIRED = 13, "confidentiality required";
    SASL_BIND_IN_PROGRESS = 14, "SASL bind in progress";
    NO_SUCH_ATTRIBUTE = 16, "no such attribute";
    UNDEFINED_ATTRIBUTE_TYPE = 17, "undefined attribute type";
    INAPPROPRIATE_MATCHING = 18, "inappropriate matching";
    CONSTRAINT_VIOLATION = 19, "constraint violation";
    ATTRIBUTE_OR_VALUE_EXISTS = 20, "attribute or value exists";
    INVALID_ATTRIBUTE_SYNTAX = 21, "invalid attribute syntax";
    NO_SUCH_OBJECT = 32, "no such object";
    ALIAS_PROBLEM = 33, "alias problem";
    INVALID_DN_SYNTAX = 34, "invalid DN syntax";
    ALIAS_DEREFERENCING_PROBLEM = 36, "alias dereferencing problem";
    INAPPROPRIATE_AUTHENTICATION = 48, "inappropriate authentication";
    INVALID_CREDENTIALS = 49, "invalid credentials";
    INSUFFICIENT_ACCESS_RIGHTS = 50, "insufficient access rights";
    BUSY = 51, "busy";
    UNAVAILABLE = 52, "unavailable";
    UNWILLING_TO_PERFORM = 53, "unwilling to perform";
    LOOP_DETECT = 54, "loop detected";
    NAMING_VIOLATION = 64, "naming violation";
    OBJECT_CLASS_VIOLATION = 65, "object class violation";
    NOT_ALLOWED_ON_NONLEAF = 66, "not allowed on non-leaf";
    NOT_ALLOWED_ON_RDN = 67, "not allowed on RDN";
    ENTRY_ALREADY_EXISTS = 68, "entry already exists";
    OBJECT_CLASS_MODS_PROHIBITED = 69, "object class mods prohibited";
    AFFECTS_MULTIPLE_DSAS = 71, "affects multiple DSAs";
    OTHER = 80, "other";
    SERVER_DOWN = 81, "server down";
    LOCAL_ERROR = 82, "local error";
    ENCODING_ERROR = 83, "encoding error";
    DECODING_ERROR = 84, "decoding error";
    TIMEOUT = 85, "timeout";
    AUTH_UNKNOWN = 86, "auth unknown";
    FILTER_ERROR = 87, "filter error";
    USER_CANCELED = 88, "user canceled";
    PARAM_ERROR = 89, "parameter error";
    NO_MEMORY = 90, "no memory";
    CONNECT_ERROR = 91, "connect error";
    NOT_SUPPORTED = 92, "not supported";
}

impl ResultCode {
    /// Create a result code from its integer value
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Get the integer value of this result code
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl From<i32> for ResultCode {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", self.0, name),
            None => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_result_code() {
        assert_eq!(ResultCode::DECODING_ERROR.value(), 84);
        assert_eq!(ResultCode::new(84), ResultCode::DECODING_ERROR);
        assert_eq!(ResultCode::DECODING_ERROR.to_string(), "84 (decoding error)");
    }

    #[test]
    fn test_unknown_result_code() {
        let code = ResultCode::from(16654);
        assert_eq!(code.name(), None);
        assert_eq!(code.to_string(), "16654");
    }
}
