// External crates
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::instrument;

const READ_BUFFER_SIZE: usize = 16384;

/// A buffered line source the stream driver can read from.
pub type LineSource = Box<dyn AsyncBufRead + Unpin + Send>;

/// Opens the access log source: the file at `path` when given, standard
/// input otherwise.
#[instrument(
    name = "log_stats_tailer::open_source",
    target = "tailer::reader",
    level = "debug"
)]
pub async fn open_source(path: Option<&Path>) -> Result<LineSource> {
    match path {
        Some(p) => {
            let file = File::open(p)
                .await
                .with_context(|| format!("Failed to open input file {:?}", p))?;
            tracing::debug!(input = %p.display(), "Reading access log lines from file");
            Ok(Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)))
        }
        None => {
            tracing::debug!("Reading access log lines from standard input");
            Ok(Box::new(BufReader::with_capacity(
                READ_BUFFER_SIZE,
                tokio::io::stdin(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::io::AsyncBufReadExt;

    #[tokio::test]
    async fn test_open_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"first\nsecond\n").unwrap();

        let source = open_source(Some(file.path())).await.unwrap();
        let mut lines = source.lines();

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("first"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let result = open_source(Some(Path::new("/definitely/not/here.log"))).await;
        assert!(result.is_err());
    }
}
