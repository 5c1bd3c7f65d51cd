// WHY: greedy windowed matcher; the cursor only moves forward so every pool entry is used at most once
// A containment hit that would move time backwards ends the scan for that token (anti-collision)

use tracing::trace;

use super::{AlignmentState, Token};
use crate::tokenizer::normalize_for_match;
use crate::transcript::WordPool;

/// Outcome of scanning the window for one token
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowMatch {
    /// Accepted entry at absolute pool index with its start time
    Accepted { index: usize, start: f64 },
    /// Containment hit whose start precedes the running time
    Rejected { index: usize, start: f64 },
    NotFound,
}

/// Fuzzy containment in either direction on normalized text; empty text never matches
pub fn is_fuzzy_match(token_clean: &str, pool_clean: &str) -> bool {
    !token_clean.is_empty()
        && !pool_clean.is_empty()
        && (pool_clean.contains(token_clean) || token_clean.contains(pool_clean))
}

/// Scan at most `window` entries from `cursor` for the first containment hit
///
/// The first hit decides the result: accepted if its start is not earlier than
/// `last_valid_time`, rejected otherwise. Later entries are never inspected
/// after a hit, even if one of them would pass the time gate.
pub fn scan_window(
    pool: &WordPool<'_>,
    cursor: usize,
    window: usize,
    last_valid_time: f64,
    token_text: &str,
) -> WindowMatch {
    let token_clean = normalize_for_match(token_text);
    for (offset, entry) in pool.window(cursor, window).iter().enumerate() {
        if !is_fuzzy_match(&token_clean, &normalize_for_match(entry.text)) {
            continue;
        }
        let index = cursor + offset;
        return if entry.start >= last_valid_time {
            WindowMatch::Accepted { index, start: entry.start }
        } else {
            WindowMatch::Rejected { index, start: entry.start }
        };
    }
    WindowMatch::NotFound
}

/// Match every token of one line in order, writing times and advancing the cursor
///
/// `state.last_valid_time` is read but not written here. Returns the number of
/// tokens matched.
pub fn match_tokens(pool: &WordPool<'_>, state: &mut AlignmentState, tokens: &mut [Token], window: usize) -> usize {
    let mut matched = 0;
    for token in tokens.iter_mut() {
        match scan_window(pool, state.cursor, window, state.last_valid_time, &token.text) {
            WindowMatch::Accepted { index, start } => {
                token.time = Some(start);
                state.cursor = index + 1;
                matched += 1;
            }
            WindowMatch::Rejected { index, start } => {
                trace!(token = %token.text, index, start, "Containment match earlier than running time");
            }
            WindowMatch::NotFound => {
                trace!(token = %token.text, cursor = state.cursor, "No match in window");
            }
        }
    }
    matched
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

    #[test]
    fn test_fuzzy_match_both_directions() {
        assert!(is_fuzzy_match("dont", "dont"));
        assert!(is_fuzzy_match("im", "imgonna"));
        assert!(is_fuzzy_match("running", "run"));
        assert!(!is_fuzzy_match("", "a"));
        assert!(!is_fuzzy_match("two", "three"));
    }

    #[test]
    fn test_recognizer_punctuation_and_case_ignored() {
        let segs = segments(&[(" Hello,", 0.4)]);
        let pool = WordPool::from_segments(&segs);
        assert_eq!(
            scan_window(&pool, 0, 8, 0.0, "hello"),
            WindowMatch::Accepted { index: 0, start: 0.4 }
        );
    }

    #[test]
    fn test_window_bound() {
        let mut words: Vec<(&str, f64)> = vec![("zz", 0.1); 8];
        words.push(("target", 1.0));
        let segs = segments(&words);
        let pool = WordPool::from_segments(&segs);
        // Entry 8 is outside a window of 8 starting at cursor 0
        assert_eq!(scan_window(&pool, 0, 8, 0.0, "target"), WindowMatch::NotFound);
        assert_eq!(
            scan_window(&pool, 1, 8, 0.0, "target"),
            WindowMatch::Accepted { index: 8, start: 1.0 }
        );
    }

    #[test]
    fn test_time_gate_stops_scan() {
        let segs = segments(&[("stop", 0.5), ("stop", 2.0)]);
        let pool = WordPool::from_segments(&segs);
        assert_eq!(
            scan_window(&pool, 0, 8, 1.0, "stop"),
            WindowMatch::Rejected { index: 0, start: 0.5 }
        );
    }

    #[test]
    fn test_rejected_match_leaves_cursor() {
        let segs = segments(&[("go", 3.0)]);
        let pool = WordPool::from_segments(&segs);
        let mut state = AlignmentState { cursor: 0, last_valid_time: 5.0 };
        let mut tokens = vec![Token::new("", "go")];
        let matched = match_tokens(&pool, &mut state, &mut tokens, 8);
        assert_eq!(matched, 0);
        assert_eq!(tokens[0].time, None);
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn test_cursor_skips_past_match_and_never_reuses_entry() {
        let segs = segments(&[("la", 1.0), ("noise", 1.1), ("la", 1.5)]);
        let pool = WordPool::from_segments(&segs);
        let mut state = AlignmentState::default();
        let mut tokens = vec![Token::new("", "la"), Token::new(" ", "la"), Token::new(" ", "la")];
        let matched = match_tokens(&pool, &mut state, &mut tokens, 8);
        assert_eq!(matched, 2);
        assert_eq!(tokens[0].time, Some(1.0));
        assert_eq!(tokens[1].time, Some(1.5));
        assert_eq!(tokens[2].time, None);
        assert_eq!(state.cursor, 3);
    }

    #[test]
    fn test_running_time_not_advanced_within_line() {
        // Both entries pass the gate because it uses the line-start running time
        let segs = segments(&[("b", 2.0), ("a", 1.0)]);
        let pool = WordPool::from_segments(&segs);
        let mut state = AlignmentState::default();
        let mut tokens = vec![Token::new("", "b"), Token::new(" ", "a")];
        match_tokens(&pool, &mut state, &mut tokens, 8);
        assert_eq!(tokens[0].time, Some(2.0));
        assert_eq!(tokens[1].time, Some(1.0));
        assert_eq!(state.last_valid_time, 0.0);
    }
}
