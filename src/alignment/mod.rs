// WHY: main alignment interface; owns the tunables and the explicit per-run state
// Matching and interpolation live in submodules so each rule can be tested on its own

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod interpolation;
pub mod matcher;

use crate::tokenizer::tokenize;
use crate::transcript::WordPool;

/// Minimum spacing between consecutive resolved token times, in seconds
pub const MIN_DURATION: f64 = 0.06;
/// Upper bound of an interpolated gap, also the step used after the last anchor
pub const MAX_GAP: f64 = 0.15;
/// Number of pool entries inspected from the cursor for each token
pub const SEARCH_WINDOW: usize = 8;

/// Tunables for one alignment run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignConfig {
    /// Forward window size over the word pool
    pub search_window: usize,
    /// Minimum spacing enforced by the global clamp
    pub min_duration: f64,
    /// Largest interpolated gap
    pub max_gap: f64,
    /// Added to every rendered time; results below zero floor at zero
    pub offset_seconds: f64,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            search_window: SEARCH_WINDOW,
            min_duration: MIN_DURATION,
            max_gap: MAX_GAP,
            offset_seconds: 0.0,
        }
    }
}

impl AlignConfig {
    pub fn with_offset_millis(mut self, offset_ms: i64) -> Self {
        self.offset_seconds = offset_ms as f64 / 1000.0;
        self
    }

    /// Reject configurations that would break the monotonic scan
    pub fn validate(&self) -> Result<()> {
        if self.search_window == 0 {
            bail!("search_window must be at least 1");
        }
        if !self.min_duration.is_finite() || self.min_duration <= 0.0 {
            bail!("min_duration must be a positive number of seconds, got {}", self.min_duration);
        }
        if !self.max_gap.is_finite() || self.max_gap < self.min_duration {
            bail!(
                "max_gap ({}) must be finite and not below min_duration ({})",
                self.max_gap,
                self.min_duration
            );
        }
        if !self.offset_seconds.is_finite() {
            bail!("offset must be finite");
        }
        Ok(())
    }
}

/// Cursor and running time carried from line to line within one run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AlignmentState {
    /// Next unread pool index; never decreases
    pub cursor: usize,
    /// Time of the last resolved token in the document so far
    pub last_valid_time: f64,
}

/// One alignable unit of a primary line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Literal text immediately preceding the token
    pub separator: String,
    /// Resolved time in seconds, `None` until matched or interpolated
    pub time: Option<f64>,
    /// Set only by manual override
    pub edited: bool,
}

impl Token {
    pub fn new(separator: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            separator: separator.into(),
            time: None,
            edited: false,
        }
    }
}

/// Where a resolved token's time came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineStats {
    pub matched: usize,
    pub interpolated: usize,
}

/// A primary line with every token timed
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLine {
    pub tokens: Vec<Token>,
    /// Text after the last token, rendered verbatim
    pub trailing: String,
    /// Clamped time of the first token, `None` when the line has no tokens
    pub effective_start_time: Option<f64>,
    pub stats: LineStats,
}

impl ResolvedLine {
    pub fn is_untimed(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Aligns primary lines against a word pool, one line at a time
#[derive(Debug, Clone)]
pub struct Aligner {
    config: AlignConfig,
}

impl Aligner {
    pub fn new(config: AlignConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_default_config() -> Result<Self> {
        Self::new(AlignConfig::default())
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Match, interpolate and clamp one line, advancing `state`
    ///
    /// Matching for the whole line is gated on the running time as it stood at
    /// the start of the line; the clamp pass then advances it token by token.
    pub fn align_line(&self, pool: &WordPool<'_>, state: &mut AlignmentState, line: &str) -> ResolvedLine {
        let tokenized = tokenize(line);
        let mut tokens: Vec<Token> = tokenized
            .tokens
            .iter()
            .map(|raw| Token::new(raw.separator, raw.text))
            .collect();

        let matched = matcher::match_tokens(pool, state, &mut tokens, self.config.search_window);
        let interpolated = interpolation::fill_gaps(&mut tokens, state.last_valid_time, &self.config);
        let effective_start_time = interpolation::clamp_monotonic(&mut tokens, state, self.config.min_duration);

        debug!(
            line,
            tokens = tokens.len(),
            matched,
            interpolated,
            cursor = state.cursor,
            last_valid_time = state.last_valid_time,
            "Aligned line"
        );

        ResolvedLine {
            tokens,
            trailing: tokenized.trailing.to_string(),
            effective_start_time,
            stats: LineStats { matched, interpolated },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{Segment, Word};

    fn segments(words: &[(&str, f64)]) -> Vec<Segment> {
        vec![Segment::new(
            0.0,
            "",
            words.iter().map(|&(w, t)| Word::new(w, t)).collect(),
        )]
    }

    fn times(line: &ResolvedLine) -> Vec<f64> {
        line.tokens.iter().map(|t| t.time.expect("resolved")).collect()
    }

    #[test]
    fn test_config_validation() {
        assert!(AlignConfig::default().validate().is_ok());
        let zero_window = AlignConfig { search_window: 0, ..AlignConfig::default() };
        assert!(Aligner::new(zero_window).is_err());
        let bad_gap = AlignConfig { max_gap: 0.01, ..AlignConfig::default() };
        assert!(bad_gap.validate().is_err());
        let nan_spacing = AlignConfig { min_duration: f64::NAN, ..AlignConfig::default() };
        assert!(nan_spacing.validate().is_err());
    }

    #[test]
    fn test_offset_from_millis() {
        let config = AlignConfig::default().with_offset_millis(-500);
        assert_eq!(config.offset_seconds, -0.5);
    }

    #[test]
    fn test_cjk_line_resolves_to_pool_times() {
        let segs = segments(&[("摇", 1.00), ("篮", 1.20)]);
        let pool = WordPool::from_segments(&segs);
        let aligner = Aligner::with_default_config().unwrap();
        let mut state = AlignmentState::default();

        let line = aligner.align_line(&pool, &mut state, "摇篮");
        assert_eq!(times(&line), vec![1.00, 1.20]);
        assert_eq!(line.effective_start_time, Some(1.00));
        assert_eq!(state.last_valid_time, 1.20);
        assert_eq!(state.cursor, 2);
        assert_eq!(line.stats, LineStats { matched: 2, interpolated: 0 });
    }

    #[test]
    fn test_lone_unmatched_token_after_previous_line() {
        let segs = segments(&[("a", 2.0)]);
        let pool = WordPool::from_segments(&segs);
        let aligner = Aligner::with_default_config().unwrap();
        let mut state = AlignmentState::default();

        aligner.align_line(&pool, &mut state, "a");
        let second = aligner.align_line(&pool, &mut state, "b");
        let t = times(&second)[0];
        assert!((t - 2.15).abs() < 1e-9, "expected 2.15, got {t}");
        assert_eq!(second.stats.interpolated, 1);
    }

    #[test]
    fn test_punctuation_line_keeps_state() {
        let segs = segments(&[("x", 1.0)]);
        let pool = WordPool::from_segments(&segs);
        let aligner = Aligner::with_default_config().unwrap();
        let mut state = AlignmentState { cursor: 0, last_valid_time: 0.5 };

        let line = aligner.align_line(&pool, &mut state, "...");
        assert!(line.is_untimed());
        assert_eq!(line.trailing, "...");
        assert_eq!(line.effective_start_time, None);
        assert_eq!(state, AlignmentState { cursor: 0, last_valid_time: 0.5 });
    }
}
