//! Input validation utilities
//!
//! Provides input validation and sanitization functions.

/// True if the text holds NUL or any other control character
pub fn contains_control_chars(input: &str) -> bool {
    input.chars().any(char::is_control)
}

/// Validate one inbound request line before it reaches the parser
pub fn is_valid_request_line(input: &str, max_length: usize) -> bool {
    !input.trim().is_empty() && input.len() <= max_length && !input.contains('\0')
}

/// Sanitize user input
pub fn sanitize_input(input: &str) -> String {
    input.trim_end_matches(['\r', '\n']).trim().to_string()
}
