// WHY: end-to-end parse -> align -> interpolate -> render, with cooperative cancellation
// Pure given (document, segments, config); the abort flag is the only shared input

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use crate::alignment::{AlignConfig, Aligner, AlignmentState};
use crate::lyric_parser::LyricDocument;
use crate::renderer::LrcRenderer;
use crate::transcript::{RecognizedSegment, WordPool};

/// Which rendering path produced the output
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlignMode {
    /// Reference lyrics aligned against word timings
    Reference,
    /// Recognizer segments passed through as lines
    Transcription,
}

/// Counters collected during one run
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AlignmentSummary {
    pub mode: AlignMode,
    pub lines_rendered: u64,
    pub tokens_total: u64,
    pub tokens_matched: u64,
    pub tokens_interpolated: u64,
    pub untimed_lines: u64,
    pub translations_attached: u64,
    pub pool_words: u64,
    pub pool_words_consumed: u64,
}

impl AlignmentSummary {
    fn new(mode: AlignMode, pool_words: usize) -> Self {
        Self {
            mode,
            lines_rendered: 0,
            tokens_total: 0,
            tokens_matched: 0,
            tokens_interpolated: 0,
            untimed_lines: 0,
            translations_attached: 0,
            pool_words: pool_words as u64,
            pool_words_consumed: 0,
        }
    }
}

/// Completed render: LRC text without trailing newline plus counters
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedLyrics {
    pub lrc: String,
    pub summary: AlignmentSummary,
}

/// Result of a run that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(AlignedLyrics),
    /// Abort flag observed; no partial document is produced
    Aborted,
}

impl Outcome {
    pub fn into_lrc(self) -> Option<String> {
        match self {
            Outcome::Completed(aligned) => Some(aligned.lrc),
            Outcome::Aborted => None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Outcome::Aborted)
    }
}

/// Runs the whole alignment for one document/transcript pair
#[derive(Debug, Clone)]
pub struct Pipeline {
    aligner: Aligner,
    renderer: LrcRenderer,
}

impl Pipeline {
    pub fn new(config: AlignConfig) -> Result<Self> {
        let aligner = Aligner::new(config)?;
        Ok(Self {
            renderer: LrcRenderer::new(config.offset_seconds),
            aligner,
        })
    }

    pub fn with_default_config() -> Result<Self> {
        Self::new(AlignConfig::default())
    }

    /// Align and render, polling `abort` before every line or segment
    pub fn run<S: RecognizedSegment>(
        &self,
        document: &LyricDocument,
        segments: &[S],
        abort: &AtomicBool,
    ) -> Outcome {
        let mut out = Vec::with_capacity(document.headers.len() + document.lines.len() * 2 + 1);
        self.renderer.push_headers(&mut out, &document.headers);

        let summary = if document.has_reference() {
            info!(lines = document.lines.len(), "Aligning reference lyrics against word timings");
            match self.render_reference(document, segments, abort, &mut out) {
                Some(summary) => summary,
                None => return Outcome::Aborted,
            }
        } else {
            info!(segments = segments.len(), "No reference lyrics, rendering transcription");
            match self.render_transcription(segments, abort, &mut out) {
                Some(summary) => summary,
                None => return Outcome::Aborted,
            }
        };

        info!(
            lines = summary.lines_rendered,
            matched = summary.tokens_matched,
            interpolated = summary.tokens_interpolated,
            "Alignment complete"
        );
        Outcome::Completed(AlignedLyrics {
            lrc: out.join("\n"),
            summary,
        })
    }

    fn render_transcription<S: RecognizedSegment>(
        &self,
        segments: &[S],
        abort: &AtomicBool,
        out: &mut Vec<String>,
    ) -> Option<AlignmentSummary> {
        let pool_words = segments.iter().map(|segment| segment.words().len()).sum();
        let mut summary = AlignmentSummary::new(AlignMode::Transcription, pool_words);
        for segment in segments {
            if abort.load(Ordering::Relaxed) {
                info!("Abort requested during transcription render");
                return None;
            }
            if let Some(line) = self.renderer.segment_line(segment) {
                out.push(line);
                summary.lines_rendered += 1;
            }
        }
        Some(summary)
    }

    fn render_reference<S: RecognizedSegment>(
        &self,
        document: &LyricDocument,
        segments: &[S],
        abort: &AtomicBool,
        out: &mut Vec<String>,
    ) -> Option<AlignmentSummary> {
        let pool = WordPool::from_segments(segments);
        let mut summary = AlignmentSummary::new(AlignMode::Reference, pool.len());
        let mut state = AlignmentState::default();

        for (index, source) in document.lines.iter().enumerate() {
            if abort.load(Ordering::Relaxed) {
                info!(line = index, "Abort requested during alignment");
                return None;
            }

            let resolved = self.aligner.align_line(&pool, &mut state, source);
            out.push(self.renderer.primary_line(&resolved, source));

            summary.lines_rendered += 1;
            summary.tokens_total += resolved.tokens.len() as u64;
            summary.tokens_matched += resolved.stats.matched as u64;
            summary.tokens_interpolated += resolved.stats.interpolated as u64;
            if resolved.is_untimed() {
                summary.untimed_lines += 1;
            }

            // WHY: untimed lines still carry their translations, stamped at the running time
            let start = resolved.effective_start_time.unwrap_or(state.last_valid_time);
            for translation in document.translations_for(index) {
                out.push(self.renderer.translation_line(start, translation));
                summary.translations_attached += 1;
            }
        }

        summary.pool_words_consumed = state.cursor as u64;
        Some(summary)
    }
}

/// Convenience wrapper: run with `config`, never aborting
pub fn align_lyrics<S: RecognizedSegment>(
    document: &LyricDocument,
    segments: &[S],
    config: AlignConfig,
) -> Result<AlignedLyrics> {
    let never = AtomicBool::new(false);
    match Pipeline::new(config)?.run(document, segments, &never) {
        Outcome::Completed(aligned) => Ok(aligned),
        Outcome::Aborted => anyhow::bail!("alignment aborted without an abort request"),
    }
}
