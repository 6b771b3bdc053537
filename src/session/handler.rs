use log::{error, info};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::middleware::logging::{log_rejected, log_request, log_result};
use crate::protocol::{Dispatcher, OperationResult};
use crate::session::state::{SessionEnd, SessionState, is_quit_command};
use crate::utils::validation::{is_valid_request_line, sanitize_input};

/// Runs one request session until the input closes or the caller quits.
///
/// - Each non-blank line is one action request.
/// - Requests run on the blocking pool since every operation touches the disk.
/// - Every request gets exactly one rendered result, terminated by a newline.
pub async fn run_session<R, W>(
    mut reader: R,
    mut writer: W,
    dispatcher: Arc<Dispatcher>,
    max_request_length: usize,
    session_id: &str,
) -> io::Result<SessionEnd>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut state = SessionState::new(session_id);
    let mut buf = Vec::new();

    let end = loop {
        match read_bounded_line(&mut reader, &mut buf, max_request_length).await {
            Ok(LineRead::EndOfInput) => {
                info!("Input closed for session {}", state.id());
                break SessionEnd::EndOfInput;
            }
            Ok(LineRead::TooLong) => {
                let reason = format!("Request too long (max {} bytes)", max_request_length);
                reject(&mut writer, &mut state, reason).await?;
                continue;
            }
            Ok(LineRead::Line) => {}
            Err(e) => {
                error!("Failed to read request for session {}: {}", state.id(), e);
                return Err(e);
            }
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(_) => {
                reject(&mut writer, &mut state, "Request is not valid UTF-8 text".into()).await?;
                continue;
            }
        };

        let request = sanitize_input(line);
        if request.is_empty() {
            continue;
        }

        if is_quit_command(&request) {
            write_result(&mut writer, &OperationResult::success("Goodbye")).await?;
            info!("Session {} requested to quit", state.id());
            break SessionEnd::Quit;
        }

        if !is_valid_request_line(&request, max_request_length) {
            let reason = if request.len() > max_request_length {
                format!("Request too long (max {} bytes)", max_request_length)
            } else {
                "Request contains invalid characters".to_string()
            };
            reject(&mut writer, &mut state, reason).await?;
            continue;
        }

        log_request(state.id(), &request);
        let result = dispatch_blocking(Arc::clone(&dispatcher), request).await;
        log_result(state.id(), &result);
        state.record(result.success);
        write_result(&mut writer, &result).await?;
    };

    info!(
        "Session {} ended: {} requests handled, {} failed, {} rejected",
        state.id(),
        state.handled(),
        state.failed(),
        state.rejected()
    );
    Ok(end)
}

/// Outcome of reading one request line
enum LineRead {
    Line,
    TooLong,
    EndOfInput,
}

/// Reads one line into `buf`, never buffering more than the request limit.
///
/// An over-long line is drained up to its newline and reported as `TooLong`.
async fn read_bounded_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_request_length: usize,
) -> io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    // Room for the request plus a CRLF terminator
    let limit = max_request_length.saturating_add(2) as u64;
    let read = (&mut *reader).take(limit).read_until(b'\n', buf).await?;

    if read == 0 {
        return Ok(LineRead::EndOfInput);
    }
    if buf.ends_with(b"\n") || (read as u64) < limit {
        return Ok(LineRead::Line);
    }

    skip_rest_of_line(reader).await?;
    buf.clear();
    Ok(LineRead::TooLong)
}

async fn skip_rest_of_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(index) => {
                reader.consume(index + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

async fn reject<W>(writer: &mut W, state: &mut SessionState, reason: String) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    log_rejected(state.id(), &reason);
    state.record_rejected();
    write_result(writer, &OperationResult::failure(reason)).await
}

async fn dispatch_blocking(dispatcher: Arc<Dispatcher>, request: String) -> OperationResult {
    match tokio::task::spawn_blocking(move || dispatcher.handle_raw(&request)).await {
        Ok(result) => result,
        Err(e) => {
            error!("Request task failed: {}", e);
            OperationResult::failure("Internal error while handling the request")
        }
    }
}

async fn write_result<W>(writer: &mut W, result: &OperationResult) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(format!("{}\n", result).as_bytes()).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ResponseLimits;
    use crate::storage::{FileOperations, StorageRoot};
    use tempfile::TempDir;

    fn dispatcher() -> (TempDir, Arc<Dispatcher>) {
        let dir = TempDir::new().unwrap();
        let root = StorageRoot::open(dir.path().join("artifacts")).unwrap();
        let dispatcher = Dispatcher::new(FileOperations::new(root), ResponseLimits::default());
        (dir, Arc::new(dispatcher))
    }

    async fn run(input: &str, max_len: usize) -> (SessionEnd, String) {
        let (_dir, dispatcher) = dispatcher();
        let mut output = Vec::new();
        let end = run_session(input.as_bytes(), &mut output, dispatcher, max_len, "test")
            .await
            .unwrap();
        (end, String::from_utf8(output).unwrap())
    }

    #[tokio::test]
    async fn test_one_result_per_request() {
        let (end, output) = run(
            "write_file:a.txt,hello\r\n\nread_file:a.txt\nread_file:missing.txt\n",
            512,
        )
        .await;

        assert_eq!(end, SessionEnd::EndOfInput);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "+OK Created file a.txt with 5 bytes",
                "+OK Content of file a.txt: hello",
                "| hello",
                "-ERR Not found: missing.txt",
            ]
        );
    }

    #[tokio::test]
    async fn test_quit_stops_reading() {
        let (end, output) = run("quit\nwrite_file:a.txt,x\n", 512).await;
        assert_eq!(end, SessionEnd::Quit);
        assert_eq!(output, "+OK Goodbye\n");
    }

    #[tokio::test]
    async fn test_long_request_is_rejected() {
        let long = format!("write_file:a.txt,{}\nlist_files:\n", "x".repeat(100));
        let (_, output) = run(&long, 32).await;
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "-ERR Request too long (max 32 bytes)");
        assert_eq!(lines[1], "+OK No files found in the storage folder");
    }

    #[tokio::test]
    async fn test_huge_line_is_drained_without_buffering() {
        let input = format!("read_file:{}\nlist_files:\n", "x".repeat(1_000_000));
        let (_, output) = run(&input, 64).await;
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "-ERR Request too long (max 64 bytes)",
                "+OK No files found in the storage folder",
            ]
        );
    }

    #[tokio::test]
    async fn test_bounded_line_reader() {
        let mut reader: &[u8] = b"abcdef\nab\r\nlast";
        let mut buf = Vec::new();

        assert!(matches!(
            read_bounded_line(&mut reader, &mut buf, 3).await.unwrap(),
            LineRead::TooLong
        ));
        assert!(buf.is_empty());

        assert!(matches!(
            read_bounded_line(&mut reader, &mut buf, 3).await.unwrap(),
            LineRead::Line
        ));
        assert_eq!(buf, b"ab\r\n");

        assert!(matches!(
            read_bounded_line(&mut reader, &mut buf, 3).await.unwrap(),
            LineRead::Line
        ));
        assert_eq!(buf, b"last");

        assert!(matches!(
            read_bounded_line(&mut reader, &mut buf, 3).await.unwrap(),
            LineRead::EndOfInput
        ));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_rejected() {
        let (_dir, dispatcher) = dispatcher();
        let mut output = Vec::new();
        let input: &[u8] = b"read_file:\xff\xfe\nlist_files:\n";
        run_session(input, &mut output, dispatcher, 512, "test")
            .await
            .unwrap();

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "-ERR Request is not valid UTF-8 text");
        assert_eq!(lines[1], "+OK No files found in the storage folder");
    }

    #[tokio::test]
    async fn test_nul_byte_is_rejected() {
        let (_, output) = run("read_file:a\0.txt\n", 512).await;
        assert_eq!(output, "-ERR Request contains invalid characters\n");
    }
}
