//! Concrete matching rules
//!
//! Each rule is a unit struct with a `'static` instance; only the two
//! normalization methods are rule-specific.

mod boolean;
mod case_exact;
mod case_ignore;
mod numeric_string;
mod octet_string;

pub use boolean::{BooleanMatchingRule, BOOLEAN_MATCHING_RULE};
pub use case_exact::{CaseExactStringMatchingRule, CASE_EXACT_STRING_MATCHING_RULE};
pub use case_ignore::{CaseIgnoreStringMatchingRule, CASE_IGNORE_STRING_MATCHING_RULE};
pub use numeric_string::{NumericStringMatchingRule, NUMERIC_STRING_MATCHING_RULE};
pub use octet_string::{OctetStringMatchingRule, OCTET_STRING_MATCHING_RULE};

use crate::matching_rule::SubstringPosition;

/// Trim and collapse spaces the way the string rules compare values
///
/// Runs of spaces become a single space. Leading and trailing spaces are
/// removed, except that a substring component keeps one space at an edge
/// that is not an edge of the whole value.
pub(crate) fn normalize_spaces(value: &str, position: Option<SubstringPosition>) -> String {
    let (keep_leading, keep_trailing) = match position {
        None => (false, false),
        Some(SubstringPosition::SubInitial) => (false, true),
        Some(SubstringPosition::SubAny) => (true, true),
        Some(SubstringPosition::SubFinal) => (true, false),
    };

    let mut normalized = String::with_capacity(value.len());
    let mut pending_space = false;
    for c in value.chars() {
        if c == ' ' {
            pending_space = true;
            continue;
        }
        if pending_space && (keep_leading || !normalized.is_empty()) {
            normalized.push(' ');
        }
        pending_space = false;
        normalized.push(c);
    }
    if pending_space && keep_trailing && (keep_leading || !normalized.is_empty()) {
        normalized.push(' ');
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_spaces() {
        assert_eq!(normalize_spaces("  a   b  ", None), "a b");
        assert_eq!(normalize_spaces("  a   b  ", Some(SubstringPosition::SubInitial)), "a b ");
        assert_eq!(normalize_spaces("  a   b  ", Some(SubstringPosition::SubAny)), " a b ");
        assert_eq!(normalize_spaces("  a   b  ", Some(SubstringPosition::SubFinal)), " a b");
        assert_eq!(normalize_spaces("   ", None), "");
        assert_eq!(normalize_spaces("", Some(SubstringPosition::SubAny)), "");
    }
}
