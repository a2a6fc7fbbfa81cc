//! Streaming driver: feeds input lines to a [`Collector`] and writes its
//! output as soon as it is produced.

use crate::collector::Collector;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

/// Errors from reading the runner output or writing the summary.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("failed to open input {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read input")]
    Read(#[source] std::io::Error),

    #[error("failed to write output")]
    Write(#[source] std::io::Error),
}

/// Counters gathered while streaming, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub lines_read: usize,
    pub bytes_written: usize,
}

/// Open the input: a file path, or stdin for `None` and `-`.
pub async fn open_input(path: Option<&Path>) -> Result<Box<dyn AsyncBufRead + Unpin>, StreamError> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|source| StreamError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
            info!("Reading from {}", path.display());
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
    }
}

/// Run every line of `reader` through `collector`, writing to `writer`.
///
/// Output is flushed after each line that produced any, so the filter can
/// sit in a pipe without holding back pass-through lines.
pub async fn run<R, W>(
    collector: &mut Collector,
    mut reader: R,
    writer: &mut W,
) -> Result<StreamStats, StreamError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stats = StreamStats::default();
    let mut raw = Vec::new();
    let mut out = String::new();

    loop {
        raw.clear();
        let n = reader
            .read_until(b'\n', &mut raw)
            .await
            .map_err(StreamError::Read)?;
        if n == 0 {
            break;
        }
        stats.lines_read += 1;

        let line = String::from_utf8_lossy(trim_line_end(&raw));
        collector.process_line(&line, &mut out);
        stats.bytes_written += write_pending(writer, &mut out).await?;
    }

    collector.finish(&mut out);
    stats.bytes_written += write_pending(writer, &mut out).await?;

    debug!(
        lines = stats.lines_read,
        bytes = stats.bytes_written,
        "input exhausted"
    );
    Ok(stats)
}

async fn write_pending<W>(writer: &mut W, out: &mut String) -> Result<usize, StreamError>
where
    W: AsyncWrite + Unpin,
{
    if out.is_empty() {
        return Ok(0);
    }
    let len = out.len();
    writer
        .write_all(out.as_bytes())
        .await
        .map_err(StreamError::Write)?;
    writer.flush().await.map_err(StreamError::Write)?;
    out.clear();
    Ok(len)
}

/// Strip a trailing `\n` or `\r\n`.
fn trim_line_end(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}
