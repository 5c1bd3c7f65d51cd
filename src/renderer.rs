// WHY: rebuilds LRC text from headers, resolved lines and translations
// Output lines are `[mm:ss.mmm]text`; primary lines carry a tag before every token

use crate::alignment::ResolvedLine;
use crate::timestamp::format_seconds;
use crate::transcript::RecognizedSegment;

/// Formats resolved times with a fixed global offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LrcRenderer {
    offset_seconds: f64,
}

impl LrcRenderer {
    pub fn new(offset_seconds: f64) -> Self {
        Self { offset_seconds }
    }

    /// `[mm:ss.mmm]` for `seconds + offset`, floored at zero
    pub fn tag(&self, seconds: f64) -> String {
        format!("[{}]", format_seconds(seconds, self.offset_seconds))
    }

    /// Headers verbatim followed by one blank line when any exist
    pub fn push_headers(&self, out: &mut Vec<String>, headers: &[String]) {
        out.extend(headers.iter().cloned());
        if !headers.is_empty() {
            out.push(String::new());
        }
    }

    /// One recognizer segment in no-reference mode; `None` for blank segments
    pub fn segment_line<S: RecognizedSegment>(&self, segment: &S) -> Option<String> {
        let text = segment.text().trim();
        if text.is_empty() {
            return None;
        }
        Some(format!("{}{}", self.tag(segment.start()), text))
    }

    /// A primary line with word-level tags
    ///
    /// The first token's tag always opens the line; a non-blank separator before
    /// it follows the tag. A line without tokens is returned as the untouched
    /// `source` text.
    pub fn primary_line(&self, resolved: &ResolvedLine, source: &str) -> String {
        if resolved.is_untimed() {
            return source.to_string();
        }

        let mut line = String::with_capacity(source.len() + resolved.tokens.len() * 11);
        for (k, token) in resolved.tokens.iter().enumerate() {
            let tag = self.tag(token.time.unwrap_or_default());
            if k == 0 && !token.separator.trim().is_empty() {
                line.push_str(&tag);
                line.push_str(&token.separator);
            } else {
                line.push_str(&token.separator);
                line.push_str(&tag);
            }
            line.push_str(&token.text);
        }
        line.push_str(&resolved.trailing);
        line
    }

    /// A translation row stamped with its primary line's start time
    pub fn translation_line(&self, start_time: f64, text: &str) -> String {
        format!("{}{}", self.tag(start_time), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{LineStats, Token};
    use crate::transcript::Segment;

    fn resolved(parts: &[(&str, &str, f64)], trailing: &str) -> ResolvedLine {
        let tokens: Vec<Token> = parts
            .iter()
            .map(|&(sep, text, time)| Token {
                time: Some(time),
                ..Token::new(sep, text)
            })
            .collect();
        ResolvedLine {
            effective_start_time: tokens.first().and_then(|t| t.time),
            tokens,
            trailing: trailing.to_string(),
            stats: LineStats::default(),
        }
    }

    #[test]
    fn test_primary_line_word_tags() {
        let renderer = LrcRenderer::new(0.0);
        let line = resolved(&[("", "one", 1.0), (" ", "two", 1.15), (" ", "three", 2.0)], "!");
        assert_eq!(
            renderer.primary_line(&line, "one two three!"),
            "[00:01.000]one [00:01.150]two [00:02.000]three!"
        );
    }

    #[test]
    fn test_leading_separator_follows_first_tag() {
        let renderer = LrcRenderer::new(0.0);
        let line = resolved(&[("(", "Oh", 3.5)], ")");
        assert_eq!(renderer.primary_line(&line, "(Oh)"), "[00:03.500](Oh)");
    }

    #[test]
    fn test_untimed_line_passes_through() {
        let renderer = LrcRenderer::new(0.0);
        let line = resolved(&[], "...");
        assert_eq!(renderer.primary_line(&line, "..."), "...");
    }

    #[test]
    fn test_offset_applies_and_floors() {
        let renderer = LrcRenderer::new(-0.5);
        assert_eq!(renderer.tag(0.30), "[00:00.000]");
        assert_eq!(renderer.translation_line(2.0, "hi"), "[00:01.500]hi");
    }

    #[test]
    fn test_segment_lines_trim_and_skip_blank() {
        let renderer = LrcRenderer::new(0.25);
        assert_eq!(
            renderer.segment_line(&Segment::new(1.0, "  hello there ", vec![])),
            Some("[00:01.250]hello there".to_string())
        );
        assert_eq!(renderer.segment_line(&Segment::new(2.0, "   ", vec![])), None);
    }

    #[test]
    fn test_headers_followed_by_blank_line() {
        let renderer = LrcRenderer::new(0.0);
        let mut out = Vec::new();
        renderer.push_headers(&mut out, &["[ti:x]".to_string()]);
        assert_eq!(out, vec!["[ti:x]".to_string(), String::new()]);
        let mut empty = Vec::new();
        renderer.push_headers(&mut empty, &[]);
        assert!(empty.is_empty());
    }
}
