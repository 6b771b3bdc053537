//! Action request parsing
//!
//! Turns `operation:arg1,arg2,...` into an [`ActionRequest`].
//!
//! Only the first `:` separates the operation from its arguments. Arguments
//! are comma separated with no escaping; instead, the last non-flag parameter
//! an operation declares is greedy and keeps any commas that remain, so file
//! content and replacement text are never cut short. An optional trailing flag
//! is split off the end only when the final segment reads as a boolean.

use crate::error::RequestError;
use crate::protocol::commands::{Operation, is_flag_literal};

/// A parsed action request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub operation: String,
    pub args: Vec<String>,
}

impl ActionRequest {
    pub fn new(operation: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            operation: operation.into(),
            args,
        }
    }
}

/// Parses a raw request string
pub fn parse_request(raw: &str) -> Result<ActionRequest, RequestError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RequestError::MalformedRequest("empty request".into()));
    }

    let (name, rest) = trimmed.split_once(':').ok_or_else(|| {
        RequestError::MalformedRequest(format!("expected 'operation:arguments', got '{}'", trimmed))
    })?;

    let operation = name.trim().to_ascii_lowercase();
    if operation.is_empty() {
        return Err(RequestError::MalformedRequest("missing operation name".into()));
    }
    if !operation
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(RequestError::MalformedRequest(format!(
            "invalid operation name '{}'",
            name.trim()
        )));
    }

    let args = if rest.trim().is_empty() {
        Vec::new()
    } else {
        match Operation::from_name(&operation) {
            Some(op) => split_arguments(rest, op),
            None => rest.split(',').map(|a| a.trim().to_string()).collect(),
        }
    };

    Ok(ActionRequest { operation, args })
}

/// Splits the argument text according to the operation's declared parameters.
fn split_arguments(rest: &str, op: Operation) -> Vec<String> {
    let mut body = rest;
    let mut flag = None;

    if op.has_trailing_flag() {
        // Enough separators must remain for the required positional params
        let needed_commas = op.min_args().saturating_sub(1);
        if let Some((head, tail)) = rest.rsplit_once(',') {
            if is_flag_literal(tail) && head.matches(',').count() >= needed_commas {
                body = head;
                flag = Some(tail);
            }
        }
    }

    let positional = if op.has_trailing_flag() {
        op.max_args() - 1
    } else {
        op.max_args()
    };

    let mut args: Vec<String> = body
        .splitn(positional.max(1), ',')
        .map(|a| a.trim().to_string())
        .collect();
    if let Some(flag) = flag {
        args.push(flag.trim().to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &str) -> Vec<String> {
        parse_request(raw).unwrap().args
    }

    #[test]
    fn test_parse_basic_requests() {
        let request = parse_request("read_file:notes.txt").unwrap();
        assert_eq!(request.operation, "read_file");
        assert_eq!(request.args, vec!["notes.txt"]);

        assert_eq!(
            args("copy_file:a.txt,backup/a.txt"),
            vec!["a.txt", "backup/a.txt"]
        );
    }

    #[test]
    fn test_parse_no_arguments() {
        assert!(args("list_files:").is_empty());
        assert!(args("list_files:   ").is_empty());
    }

    #[test]
    fn test_content_keeps_commas() {
        assert_eq!(
            args("write_file:notes.txt,Buy milk, eggs,true"),
            vec!["notes.txt", "Buy milk, eggs", "true"]
        );
        assert_eq!(
            args("write_file:notes.txt,Buy milk, eggs, bread"),
            vec!["notes.txt", "Buy milk, eggs, bread"]
        );
        assert_eq!(
            args("append_to_file:log.txt,a,b,c,FALSE"),
            vec!["log.txt", "a,b,c", "FALSE"]
        );
    }

    #[test]
    fn test_flag_like_content_is_not_peeled() {
        // "true" is the content here, the filename alone cannot satisfy two params
        assert_eq!(args("write_file:a.txt,true"), vec!["a.txt", "true"]);
    }

    #[test]
    fn test_replacement_text_is_greedy() {
        assert_eq!(
            args("edit_file:a.txt,foo,bar, baz: qux"),
            vec!["a.txt", "foo", "bar, baz: qux"]
        );
    }

    #[test]
    fn test_only_first_colon_splits() {
        let request = parse_request("write_file:time.txt,12:30").unwrap();
        assert_eq!(request.args, vec!["time.txt", "12:30"]);
    }

    #[test]
    fn test_arguments_are_trimmed() {
        assert_eq!(
            args("  move_file :  a.txt ,  b/a.txt  "),
            vec!["a.txt", "b/a.txt"]
        );
    }

    #[test]
    fn test_operation_is_normalized() {
        assert_eq!(parse_request("READ_FILE:a").unwrap().operation, "read_file");
    }

    #[test]
    fn test_unknown_operation_splits_every_comma() {
        let request = parse_request("launch:a,b,c").unwrap();
        assert_eq!(request.operation, "launch");
        assert_eq!(request.args, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_last_parameter_absorbs_extra_commas() {
        assert_eq!(args("read_file:a.txt,b.txt"), vec!["a.txt,b.txt"]);
        assert_eq!(args("copy_file:a,b,c"), vec!["a", "b,c"]);
    }

    #[test]
    fn test_malformed_requests() {
        for raw in ["", "   ", "read_file", ":a.txt", "read file:a.txt"] {
            assert!(
                matches!(parse_request(raw), Err(RequestError::MalformedRequest(_))),
                "{raw:?} should be malformed"
            );
        }
    }
}
