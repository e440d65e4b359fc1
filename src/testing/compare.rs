//! Output comparison against a recorded baseline

/// Result of comparing captured output with a baseline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    /// Both texts, already normalized, for display
    Mismatch { expected: String, actual: String },
}

impl Comparison {
    pub fn is_equal(&self) -> bool {
        matches!(self, Comparison::Equal)
    }
}

/// Strip leading and trailing newlines and tabs
///
/// Spaces and carriage returns are significant and left in place.
pub fn normalize(text: &str) -> &str {
    text.trim_matches(|c| c == '\n' || c == '\t')
}

/// Compare two outputs exactly after normalization
pub fn compare(expected: &str, actual: &str) -> Comparison {
    let expected = normalize(expected);
    let actual = normalize(actual);
    if expected == actual {
        Comparison::Equal
    } else {
        Comparison::Mismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_is_reflexive() {
        for text in ["", "42", "\n\t42\n", "line 1\nline 2\n", " padded "] {
            assert_eq!(compare(text, text), Comparison::Equal);
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for text in ["\n\t\nabc\t\n", "\t\t", "a\n\tb", "  x  "] {
            assert_eq!(normalize(normalize(text)), normalize(text));
        }
    }

    #[test]
    fn test_trailing_newline_is_ignored() {
        assert!(compare("42\n", "42").is_equal());
        assert!(compare("\t42", "42\n\n").is_equal());
    }

    #[test]
    fn test_inner_whitespace_and_spaces_matter() {
        assert!(!compare("a\nb", "a\n\nb").is_equal());
        assert!(!compare("42 ", "42").is_equal());
        assert!(!compare("42\r\n", "42").is_equal());
    }

    #[test]
    fn test_mismatch_carries_normalized_texts() {
        assert_eq!(
            compare("42\n", "41\n"),
            Comparison::Mismatch {
                expected: "42".to_string(),
                actual: "41".to_string(),
            }
        );
    }
}
