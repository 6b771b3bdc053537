//! Operation results
//!
//! The uniform envelope handed back to the speech feedback layer, plus the
//! helpers that keep spoken messages short.

use std::fmt;

/// Payload attached to a successful result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultData {
    /// File content
    Text(String),
    /// Directory entries or search hits
    Entries(Vec<String>),
}

/// Outcome of one action request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
    pub data: Option<ResultData>,
}

impl OperationResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: ResultData) -> Self {
        self.data = Some(data);
        self
    }
}

/// Line-oriented rendering: a status line, then any data lines.
impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "+OK" } else { "-ERR" };
        write!(f, "{} {}", status, self.message)?;
        match &self.data {
            Some(ResultData::Entries(entries)) => {
                for entry in entries {
                    write!(f, "\n  {}", entry)?;
                }
            }
            Some(ResultData::Text(text)) => {
                for line in text.lines() {
                    write!(f, "\n| {}", line)?;
                }
            }
            None => {}
        }
        Ok(())
    }
}

/// First `max_chars` characters of `content`, with an ellipsis when cut.
pub fn preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Comma separated list of the first `limit` entries, noting how many were left out.
pub fn summarize_entries(entries: &[String], limit: usize) -> String {
    let shown = entries
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if entries.len() > limit {
        format!("{}, and {} more", shown, entries.len() - limit)
    } else {
        shown
    }
}

/// "1 file" / "3 files"
pub fn count_noun<N>(count: N, singular: &str, plural: &str) -> String
where
    N: fmt::Display + PartialEq + From<u8>,
{
    if count == N::from(1) {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 300), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("héllo", 2), "hé...");
    }

    #[test]
    fn test_summarize_entries() {
        let entries: Vec<String> = (1..=12).map(|i| format!("f{}.txt", i)).collect();
        assert_eq!(
            summarize_entries(&entries[..2], 10),
            "f1.txt, f2.txt"
        );
        assert_eq!(
            summarize_entries(&entries, 2),
            "f1.txt, f2.txt, and 10 more"
        );
    }

    #[test]
    fn test_count_noun() {
        assert_eq!(count_noun(1, "file", "files"), "1 file");
        assert_eq!(count_noun(0, "file", "files"), "0 files");
        assert_eq!(count_noun(2usize, "entry", "entries"), "2 entries");
        assert_eq!(count_noun(1u64, "byte", "bytes"), "1 byte");
        assert_eq!(
            count_noun(5_000_000_000u64, "byte", "bytes"),
            "5000000000 bytes"
        );
    }

    #[test]
    fn test_render() {
        let result = OperationResult::success("Found 2 entries")
            .with_data(ResultData::Entries(vec!["a.txt".into(), "docs/".into()]));
        assert_eq!(result.to_string(), "+OK Found 2 entries\n  a.txt\n  docs/");

        let result = OperationResult::failure("Not found: x.txt");
        assert_eq!(result.to_string(), "-ERR Not found: x.txt");

        let result = OperationResult::success("Content").with_data(ResultData::Text("a\nb".into()));
        assert_eq!(result.to_string(), "+OK Content\n| a\n| b");
    }
}
