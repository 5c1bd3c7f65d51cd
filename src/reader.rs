use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::lyric_parser::{LyricDocument, LyricParser, SourceFormat};
use crate::transcript::Transcript;

/// Configuration for input reading behavior
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Buffer size for async reading (default: 8KB)
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: 8192, // WHY: lyric and transcript files are small, one buffer usually holds them
        }
    }
}

/// Statistics for one file read
#[derive(Debug, Clone)]
pub struct ReadStats {
    pub file_path: String,
    pub lines_read: u64,
    pub bytes_read: u64,
    pub duration_ms: u64,
}

/// Async reader for lyric and transcript inputs
pub struct InputReader {
    config: ReaderConfig,
}

impl InputReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read a UTF-8 text file line by line, rejoining with `\n`
    /// WHY: normalizes CRLF input before it reaches the parser
    pub async fn read_text<P: AsRef<Path>>(&self, file_path: P) -> Result<(String, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();

        debug!("Starting async read of file: {}", path.display());

        let file = File::open(path)
            .await
            .with_context(|| format!("Failed to open file {}", path.display()))?;

        let reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut lines = reader.lines();
        let mut result_lines = Vec::new();
        let mut byte_count = 0u64;

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    byte_count += line.len() as u64 + 1; // +1 for newline
                    result_lines.push(line);
                }
                Ok(None) => break,
                Err(e) => {
                    // WHY: encoding detection is left to the caller; non-UTF-8 input is reported, not guessed
                    let error_msg = format!(
                        "UTF-8 decoding error in {} at line {}: {}",
                        path.display(),
                        result_lines.len() + 1,
                        e
                    );
                    warn!("{}", error_msg);
                    return Err(anyhow::anyhow!(error_msg));
                }
            }
        }

        let stats = ReadStats {
            file_path: path.display().to_string(),
            lines_read: result_lines.len() as u64,
            bytes_read: byte_count,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };
        info!(
            "Read {}: {} lines, {} bytes",
            stats.file_path, stats.lines_read, stats.bytes_read
        );

        Ok((result_lines.join("\n"), stats))
    }

    /// Read and parse a lyric file, deriving the format hint from its extension
    pub async fn read_document<P: AsRef<Path>>(&self, file_path: P, parser: &LyricParser) -> Result<LyricDocument> {
        let path = file_path.as_ref();
        let (raw, _stats) = self.read_text(path).await?;
        Ok(parser.parse(&raw, SourceFormat::from_path(path)))
    }

    /// Read recognizer JSON output
    pub async fn read_transcript<P: AsRef<Path>>(&self, file_path: P) -> Result<Transcript> {
        let path = file_path.as_ref();
        let (raw, _stats) = self.read_text(path).await?;
        let transcript = Transcript::from_json(&raw)
            .with_context(|| format!("Invalid transcript {}", path.display()))?;
        debug!(
            segments = transcript.segments.len(),
            words = transcript.word_count(),
            "Loaded transcript"
        );
        Ok(transcript)
    }
}

impl Default for InputReader {
    fn default() -> Self {
        Self::new(ReaderConfig::default())
    }
}
