//! `@message` annotations in documentation comments
//!
//! ```text
//! // ErrCodeNotFound not found
//! // @message resource missing
//! ```
//!
//! The first line is the description, with the constant's own name removed
//! when it leads the line. The first later line starting with `@message`
//! carries the message; without one the description doubles as the message.

use serde::{Deserialize, Serialize};

const MESSAGE_TAG: &str = "@message";

/// Description and message parsed from a documentation comment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub description: String,
    pub message: String,
}

/// Parse the documentation `text` of the constant `name`
pub fn parse_comment(text: &str, name: &str) -> Annotation {
    let mut lines = text.split('\n');
    let first = lines.next().unwrap_or_default().trim();

    let tagged = lines
        .map(str::trim)
        .find_map(|line| line.strip_prefix(MESSAGE_TAG))
        .unwrap_or_default();

    let description = first.strip_prefix(name).unwrap_or(first);
    let message = if tagged.is_empty() {
        description.strip_prefix(MESSAGE_TAG).unwrap_or(description)
    } else {
        tagged
    };

    Annotation {
        description: description.trim().to_string(),
        message: message.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(text: &str, name: &str) -> (String, String) {
        let annotation = parse_comment(text, name);
        (annotation.description, annotation.message)
    }

    #[test]
    fn test_message_line() {
        assert_eq!(
            parse("ErrCodeNotFound not found\n@message resource missing", "ErrCodeNotFound"),
            ("not found".to_string(), "resource missing".to_string())
        );
    }

    #[test]
    fn test_description_doubles_as_message() {
        assert_eq!(
            parse("ErrCodeGone gone for good", "ErrCodeGone"),
            ("gone for good".to_string(), "gone for good".to_string())
        );
    }

    #[test]
    fn test_message_on_first_line() {
        assert_eq!(
            parse("@message bad input", "ErrCodeBadInput"),
            ("@message bad input".to_string(), "bad input".to_string())
        );
    }

    #[test]
    fn test_first_message_line_wins() {
        assert_eq!(
            parse("ErrCodeA a\nmore detail\n  @message first  \n@message second", "ErrCodeA"),
            ("a".to_string(), "first".to_string())
        );
    }

    #[test]
    fn test_empty_message_tag_falls_back() {
        assert_eq!(
            parse("ErrCodeA described\n@message", "ErrCodeA"),
            ("described".to_string(), "described".to_string())
        );
    }

    #[test]
    fn test_name_stripped_once() {
        assert_eq!(
            parse("ErrCodeAErrCodeA twice", "ErrCodeA"),
            ("ErrCodeA twice".to_string(), "ErrCodeA twice".to_string())
        );
    }

    #[test]
    fn test_name_elsewhere_kept() {
        assert_eq!(
            parse("see ErrCodeA", "ErrCodeA"),
            ("see ErrCodeA".to_string(), "see ErrCodeA".to_string())
        );
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(parse_comment("", "ErrCodeA"), Annotation::default());
    }

    proptest! {
        #[test]
        fn message_line_takes_precedence(
            description in "[a-z ]{0,20}",
            message in "[a-z][a-z ]{0,20}",
        ) {
            let text = format!("ErrCodeX {description}\n@message {message}");
            let annotation = parse_comment(&text, "ErrCodeX");
            prop_assert_eq!(annotation.description, description.trim());
            prop_assert_eq!(annotation.message, message.trim());
        }

        #[test]
        fn results_are_trimmed(text in "[ a-z@\n]{0,40}") {
            let annotation = parse_comment(&text, "x");
            prop_assert_eq!(annotation.description.trim(), annotation.description.as_str());
            prop_assert_eq!(annotation.message.trim(), annotation.message.as_str());
        }
    }
}
