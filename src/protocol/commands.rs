//! Operation registry
//!
//! The fixed set of supported operations and the positional parameters each
//! one declares. The parser and the dispatcher both read arity from here.

use std::fmt;

/// A supported file management operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ReadFile,
    WriteFile,
    ListFiles,
    DeleteFile,
    EditFile,
    AppendToFile,
    CreateDirectory,
    CopyFile,
    MoveFile,
    SearchFiles,
    FileInfo,
}

/// How a positional argument is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Path inside the storage root; must be non-empty when required
    Path,
    /// Free text that must be non-empty when required
    Text,
    /// Free text that may be empty (file content, replacement text)
    Content,
    /// Boolean flag with a default when omitted
    Flag { default: bool },
}

/// One declared positional parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

const fn required(name: &'static str, kind: ParamKind) -> Param {
    Param {
        name,
        kind,
        required: true,
    }
}

const fn optional(name: &'static str, kind: ParamKind) -> Param {
    Param {
        name,
        kind,
        required: false,
    }
}

const FILENAME: Param = required("filename", ParamKind::Path);

const SINGLE_FILE: &[Param] = &[FILENAME];
const WRITE_FILE: &[Param] = &[
    FILENAME,
    required("content", ParamKind::Content),
    optional("overwrite", ParamKind::Flag { default: true }),
];
const APPEND_TO_FILE: &[Param] = &[
    FILENAME,
    required("content", ParamKind::Content),
    optional("create_if_missing", ParamKind::Flag { default: true }),
];
const EDIT_FILE: &[Param] = &[
    FILENAME,
    required("find text", ParamKind::Text),
    required("replacement text", ParamKind::Content),
];
const LIST_FILES: &[Param] = &[optional("subdirectory", ParamKind::Path)];
const CREATE_DIRECTORY: &[Param] = &[required("directory name", ParamKind::Path)];
const TRANSFER: &[Param] = &[
    required("source", ParamKind::Path),
    required("destination", ParamKind::Path),
];
const SEARCH_FILES: &[Param] = &[
    required("search text", ParamKind::Text),
    optional("subdirectory", ParamKind::Path),
];

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::ReadFile,
        Operation::WriteFile,
        Operation::ListFiles,
        Operation::DeleteFile,
        Operation::EditFile,
        Operation::AppendToFile,
        Operation::CreateDirectory,
        Operation::CopyFile,
        Operation::MoveFile,
        Operation::SearchFiles,
        Operation::FileInfo,
    ];

    /// Wire name used in action requests
    pub fn name(self) -> &'static str {
        match self {
            Operation::ReadFile => "read_file",
            Operation::WriteFile => "write_file",
            Operation::ListFiles => "list_files",
            Operation::DeleteFile => "delete_file",
            Operation::EditFile => "edit_file",
            Operation::AppendToFile => "append_to_file",
            Operation::CreateDirectory => "create_directory",
            Operation::CopyFile => "copy_file",
            Operation::MoveFile => "move_file",
            Operation::SearchFiles => "search_files",
            Operation::FileInfo => "file_info",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Declared positional parameters, in order
    pub fn signature(self) -> &'static [Param] {
        match self {
            Operation::ReadFile | Operation::DeleteFile | Operation::FileInfo => SINGLE_FILE,
            Operation::WriteFile => WRITE_FILE,
            Operation::AppendToFile => APPEND_TO_FILE,
            Operation::EditFile => EDIT_FILE,
            Operation::ListFiles => LIST_FILES,
            Operation::CreateDirectory => CREATE_DIRECTORY,
            Operation::CopyFile | Operation::MoveFile => TRANSFER,
            Operation::SearchFiles => SEARCH_FILES,
        }
    }

    pub fn min_args(self) -> usize {
        self.signature().iter().filter(|p| p.required).count()
    }

    pub fn max_args(self) -> usize {
        self.signature().len()
    }

    /// Whether the signature ends in an optional flag
    pub fn has_trailing_flag(self) -> bool {
        matches!(
            self.signature().last(),
            Some(Param {
                kind: ParamKind::Flag { .. },
                required: false,
                ..
            })
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coerces flag text to a boolean.
///
/// `true` and `yes` (any case) are true; every other value is false rather
/// than an error, since requests come from loosely interpreted speech.
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "yes")
}

/// Whether the text reads as a boolean literal at all
pub fn is_flag_literal(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "false" | "yes" | "no"
    )
}
