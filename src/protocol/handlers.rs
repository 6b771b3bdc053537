//! Operation handlers
//!
//! The dispatcher looks an action request up in the operation registry,
//! checks its arguments, runs the matching storage operation and turns the
//! outcome into an [`OperationResult`]. Nothing past this boundary sees a
//! raw error.

use log::info;

use crate::error::handlers::handle_error;
use crate::error::{DispatchError, RequestError};
use crate::protocol::commands::{Operation, ParamKind, parse_flag};
use crate::protocol::parser::{ActionRequest, parse_request};
use crate::protocol::responses::{
    OperationResult, ResultData, count_noun, preview, summarize_entries,
};
use crate::storage::FileOperations;

/// How much of a result is spoken back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseLimits {
    pub read_preview_chars: usize,
    pub list_preview_entries: usize,
    pub search_preview_entries: usize,
}

impl Default for ResponseLimits {
    fn default() -> Self {
        Self {
            read_preview_chars: 300,
            list_preview_entries: 10,
            search_preview_entries: 5,
        }
    }
}

/// Routes action requests to the file operations engine
#[derive(Debug, Clone)]
pub struct Dispatcher {
    files: FileOperations,
    limits: ResponseLimits,
}

/// Arguments after arity checks, with defaults filled in for omitted flags
struct Args<'a> {
    values: Vec<&'a str>,
    flags: Vec<bool>,
}

impl<'a> Args<'a> {
    fn get(&self, index: usize) -> &'a str {
        self.values.get(index).copied().unwrap_or("")
    }

    fn flag(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }
}

impl Dispatcher {
    pub fn new(files: FileOperations, limits: ResponseLimits) -> Self {
        Self { files, limits }
    }

    pub fn files(&self) -> &FileOperations {
        &self.files
    }

    /// Parses and dispatches one raw request string
    pub fn handle_raw(&self, raw: &str) -> OperationResult {
        match parse_request(raw) {
            Ok(request) => self.dispatch(&request),
            Err(e) => fail(DispatchError::from(e)),
        }
    }

    /// Runs a parsed request. Failures come back as a negative result.
    pub fn dispatch(&self, request: &ActionRequest) -> OperationResult {
        match self.execute(request) {
            Ok(result) => {
                info!("{} succeeded: {}", request.operation, result.message);
                result
            }
            Err(e) => fail(e),
        }
    }

    fn execute(&self, request: &ActionRequest) -> Result<OperationResult, DispatchError> {
        let operation = Operation::from_name(&request.operation)
            .ok_or_else(|| RequestError::UnknownOperation(request.operation.clone()))?;
        let args = check_arguments(operation, &request.args)?;

        match operation {
            Operation::ReadFile => self.handle_read_file(args.get(0)),
            Operation::WriteFile => self.handle_write_file(args.get(0), args.get(1), args.flag(2)),
            Operation::AppendToFile => {
                self.handle_append_to_file(args.get(0), args.get(1), args.flag(2))
            }
            Operation::EditFile => self.handle_edit_file(args.get(0), args.get(1), args.get(2)),
            Operation::DeleteFile => self.handle_delete_file(args.get(0)),
            Operation::CopyFile => self.handle_copy_file(args.get(0), args.get(1)),
            Operation::MoveFile => self.handle_move_file(args.get(0), args.get(1)),
            Operation::ListFiles => self.handle_list_files(args.get(0)),
            Operation::SearchFiles => self.handle_search_files(args.get(0), args.get(1)),
            Operation::CreateDirectory => self.handle_create_directory(args.get(0)),
            Operation::FileInfo => self.handle_file_info(args.get(0)),
        }
    }

    fn handle_read_file(&self, filename: &str) -> Result<OperationResult, DispatchError> {
        let content = self.files.read(filename)?;
        let message = if content.is_empty() {
            format!("File {} is empty", filename)
        } else {
            format!(
                "Content of file {}: {}",
                filename,
                preview(&content, self.limits.read_preview_chars)
            )
        };
        Ok(OperationResult::success(message).with_data(ResultData::Text(content)))
    }

    fn handle_write_file(
        &self,
        filename: &str,
        content: &str,
        overwrite: bool,
    ) -> Result<OperationResult, DispatchError> {
        let result = self.files.write(filename, content, overwrite)?;
        let verb = if result.created { "Created" } else { "Overwrote" };
        Ok(OperationResult::success(format!(
            "{} file {} with {}",
            verb,
            result.path,
            count_noun(result.bytes_written, "byte", "bytes")
        )))
    }

    fn handle_append_to_file(
        &self,
        filename: &str,
        content: &str,
        create_if_missing: bool,
    ) -> Result<OperationResult, DispatchError> {
        let result = self.files.append(filename, content, create_if_missing)?;
        Ok(OperationResult::success(format!(
            "Appended {} to file {}",
            count_noun(result.bytes_written, "byte", "bytes"),
            result.path
        )))
    }

    fn handle_edit_file(
        &self,
        filename: &str,
        find_text: &str,
        replace_text: &str,
    ) -> Result<OperationResult, DispatchError> {
        let result = self.files.edit(filename, find_text, replace_text)?;
        let message = if result.replacements == 0 {
            format!("No changes made to file {}: '{}' not found", result.path, find_text)
        } else {
            format!(
                "Edited file {}: replaced {}",
                result.path,
                count_noun(result.replacements, "occurrence", "occurrences")
            )
        };
        Ok(OperationResult::success(message))
    }

    fn handle_delete_file(&self, filename: &str) -> Result<OperationResult, DispatchError> {
        self.files.delete(filename)?;
        Ok(OperationResult::success(format!("Deleted file {}", filename)))
    }

    fn handle_copy_file(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<OperationResult, DispatchError> {
        let result = self.files.copy(source, destination)?;
        Ok(OperationResult::success(format!(
            "Copied file from {} to {}",
            result.source, result.destination
        )))
    }

    fn handle_move_file(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<OperationResult, DispatchError> {
        let result = self.files.move_file(source, destination)?;
        Ok(OperationResult::success(format!(
            "Moved file from {} to {}",
            result.source, result.destination
        )))
    }

    fn handle_list_files(&self, subdirectory: &str) -> Result<OperationResult, DispatchError> {
        let entries = self.files.list(subdirectory)?;
        let location = if subdirectory.is_empty() {
            "the storage folder"
        } else {
            subdirectory
        };

        let message = if entries.is_empty() {
            format!("No files found in {}", location)
        } else {
            format!(
                "Found {} in {}: {}",
                count_noun(entries.len(), "entry", "entries"),
                location,
                summarize_entries(&entries, self.limits.list_preview_entries)
            )
        };
        Ok(OperationResult::success(message).with_data(ResultData::Entries(entries)))
    }

    fn handle_search_files(
        &self,
        search_text: &str,
        subdirectory: &str,
    ) -> Result<OperationResult, DispatchError> {
        let matches = self.files.search(search_text, subdirectory)?;

        let message = if matches.is_empty() {
            format!("No files containing '{}' found", search_text)
        } else {
            format!(
                "Found {} containing '{}': {}",
                count_noun(matches.len(), "file", "files"),
                search_text,
                summarize_entries(&matches, self.limits.search_preview_entries)
            )
        };
        Ok(OperationResult::success(message).with_data(ResultData::Entries(matches)))
    }

    fn handle_create_directory(&self, directory: &str) -> Result<OperationResult, DispatchError> {
        let result = self.files.create_directory(directory)?;
        let message = if result.created {
            format!("Created directory {}", result.path)
        } else {
            format!("Directory {} already exists", result.path)
        };
        Ok(OperationResult::success(message))
    }

    fn handle_file_info(&self, filename: &str) -> Result<OperationResult, DispatchError> {
        let info = self.files.file_info(filename)?;
        let message = if info.is_directory {
            format!("{} is a folder, last modified at {}", info.path, info.modified)
        } else {
            format!(
                "{} is {}, last modified at {}",
                info.path,
                count_noun(info.size, "byte", "bytes"),
                info.modified
            )
        };
        let details = vec![
            format!("name: {}", info.name),
            format!("path: {}", info.path),
            format!("size: {}", info.size),
            format!("modified: {}", info.modified),
            format!("is_directory: {}", info.is_directory),
        ];
        Ok(OperationResult::success(message).with_data(ResultData::Entries(details)))
    }
}

/// Checks arity and required values, and coerces flags.
fn check_arguments(operation: Operation, raw: &[String]) -> Result<Args<'_>, RequestError> {
    let (min, max) = (operation.min_args(), operation.max_args());
    if raw.len() < min || raw.len() > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{} to {}", min, max)
        };
        return Err(RequestError::Arity {
            operation: operation.name().to_string(),
            expected,
            got: raw.len(),
        });
    }

    let mut values = Vec::with_capacity(max);
    let mut flags = Vec::with_capacity(max);
    for (index, param) in operation.signature().iter().enumerate() {
        let value = raw.get(index).map(String::as_str);

        if param.required
            && matches!(param.kind, ParamKind::Path | ParamKind::Text)
            && value.is_none_or(|v| v.trim().is_empty())
        {
            return Err(RequestError::MissingArgument {
                operation: operation.name().to_string(),
                argument: param.name,
            });
        }

        let flag = match (param.kind, value) {
            (ParamKind::Flag { .. }, Some(text)) => parse_flag(text),
            (ParamKind::Flag { default }, None) => default,
            _ => false,
        };

        values.push(value.unwrap_or(""));
        flags.push(flag);
    }

    Ok(Args { values, flags })
}

fn fail(err: DispatchError) -> OperationResult {
    handle_error(&err);
    OperationResult::failure(err.to_string())
}
