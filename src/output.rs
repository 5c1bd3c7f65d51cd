// WHY: output helpers shared by the CLI and tests
// LRC files always end with a newline; run statistics are JSON for downstream tooling

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::pipeline::AlignmentSummary;

/// Ensure exactly the content plus a trailing newline
pub fn with_trailing_newline(content: &str) -> String {
    if content.ends_with('\n') {
        content.to_string()
    } else {
        format!("{content}\n")
    }
}

/// Write an LRC file, appending a trailing newline when missing
pub async fn write_lrc_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    writer.write_all(with_trailing_newline(content).as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Statistics for one CLI run
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunStats {
    /// Lyric file used as reference, if any
    pub lyrics_path: Option<String>,
    /// Transcript file aligned against
    pub transcript_path: String,
    /// Where the LRC went; `None` for stdout or when no output was produced
    pub output_path: Option<String>,
    /// Processing status (success, aborted, failed)
    pub status: String,
    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: u64,
    /// Alignment counters, absent unless the run completed
    pub summary: Option<AlignmentSummary>,
    /// Error message if processing failed
    pub error: Option<String>,
}

impl RunStats {
    pub async fn write_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
