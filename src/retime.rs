// WHY: timestamp arithmetic behind manual correction of an already rendered LRC
// A sheet is the LRC split into (tag, content) rows; all math is in integer milliseconds

use anyhow::{bail, Result};
use regex_automata::meta::Regex;
use tracing::debug;

use crate::alignment::Token;
use crate::timestamp::{format_millis, format_tag_millis, parse_tag_millis};

/// A first embedded tag further than this after the primary tag is treated as a bad lead gap
pub const LEAD_GAP_THRESHOLD_MS: i64 = 1200;
/// Lead gap restored when the threshold is exceeded
pub const TARGET_LEAD_GAP_MS: i64 = 300;

const EMBEDDED_TAG: &str = r"\[\d{2}:\d{2}\.\d{2,3}\]";

/// Compiled patterns for tag lookup in row content
pub struct TagPatterns {
    embedded: Regex,
    leading: Regex,
}

impl TagPatterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            embedded: Regex::new(EMBEDDED_TAG)?,
            leading: Regex::new(&format!("^{EMBEDDED_TAG}"))?,
        })
    }

    /// First embedded tag of `content` in milliseconds
    pub fn first_embedded_millis(&self, content: &str) -> Option<i64> {
        self.embedded
            .find(content)
            .and_then(|found| parse_tag_millis(&content[found.range()]))
    }

    /// Replace every embedded tag with `max(0, tag + delta_ms)`; unparseable tags stay as they are
    pub fn shift_embedded(&self, content: &str, delta_ms: i64) -> String {
        let mut out = String::with_capacity(content.len());
        let mut last = 0;
        for found in self.embedded.find_iter(content) {
            out.push_str(&content[last..found.start()]);
            let original = &content[found.range()];
            match parse_tag_millis(original) {
                Some(ms) => out.push_str(&format_tag_millis((ms + delta_ms).max(0))),
                None => out.push_str(original),
            }
            last = found.end();
        }
        out.push_str(&content[last..]);
        out
    }
}

/// Total shift applied to embedded tags when a line moves from `old_start_ms` to `new_start_ms`
///
/// Without a valid old start the shift is zero. If the first embedded tag lies
/// more than [`LEAD_GAP_THRESHOLD_MS`] after the old start, the shift also
/// pulls it back to [`TARGET_LEAD_GAP_MS`] after the start.
pub fn retime_delta(old_start_ms: Option<i64>, new_start_ms: i64, first_embedded_ms: Option<i64>) -> i64 {
    let Some(old_start) = old_start_ms else {
        return 0;
    };
    let delta = new_start_ms - old_start;
    let extra_fix = match first_embedded_ms {
        Some(first) if first - old_start > LEAD_GAP_THRESHOLD_MS => -(first - old_start - TARGET_LEAD_GAP_MS),
        _ => 0,
    };
    delta + extra_fix
}

/// One LRC row: its primary tag (possibly empty) and the remaining content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LrcRow {
    pub tag: String,
    pub content: String,
}

impl LrcRow {
    pub fn start_millis(&self) -> Option<i64> {
        parse_tag_millis(&self.tag)
    }
}

/// An LRC document as editable rows
pub struct LrcSheet {
    rows: Vec<LrcRow>,
    patterns: TagPatterns,
}

impl LrcSheet {
    /// Split LRC text into rows; lines without a leading tag keep an empty tag
    ///
    /// A leading byte-order mark is dropped.
    pub fn parse(lrc: &str) -> Result<Self> {
        let patterns = TagPatterns::new()?;
        let rows = lrc
            .trim_start_matches('\u{FEFF}')
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match patterns.leading.find(line) {
                Some(tag) => LrcRow {
                    tag: line[..tag.end()].to_string(),
                    content: line[tag.end()..].to_string(),
                },
                None => LrcRow {
                    tag: String::new(),
                    content: line.to_string(),
                },
            })
            .collect();
        Ok(Self { rows, patterns })
    }

    pub fn rows(&self) -> &[LrcRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replace row `index`, e.g. with [`CharTimingSheet::to_row`] output
    pub fn set_row(&mut self, index: usize, row: LrcRow) -> Result<()> {
        let len = self.rows.len();
        let Some(slot) = self.rows.get_mut(index) else {
            bail!("row {index} out of range, sheet has {len} rows");
        };
        *slot = row;
        Ok(())
    }

    /// Rows joined back into LRC text
    pub fn render(&self) -> String {
        self.rows
            .iter()
            .map(|row| format!("{}{}", row.tag, row.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Re-anchor row `index` at `new_start_ms`
    ///
    /// Embedded tags in the row shift by [`retime_delta`]. Directly following
    /// rows carrying the exact old tag (translations) receive the new tag
    /// unshifted; for an untagged row that means the untagged rows below it.
    /// Returns the number of following rows updated.
    pub fn restamp(&mut self, index: usize, new_start_ms: i64) -> Result<usize> {
        let Some(row) = self.rows.get(index) else {
            bail!("row {index} out of range, sheet has {} rows", self.rows.len());
        };
        let old_tag = row.tag.clone();
        let old_start = row.start_millis();
        let first_embedded = self.patterns.first_embedded_millis(&row.content);
        let delta = retime_delta(old_start, new_start_ms, first_embedded);
        let new_tag = format_tag_millis(new_start_ms);

        let shifted = self.patterns.shift_embedded(&row.content, delta);
        self.rows[index] = LrcRow {
            tag: new_tag.clone(),
            content: shifted,
        };

        let mut propagated = 0;
        for follower in self.rows[index + 1..].iter_mut() {
            if follower.tag != old_tag {
                break;
            }
            follower.tag = new_tag.clone();
            propagated += 1;
        }

        debug!(
            row = index,
            old_tag = %old_tag,
            new_tag = %new_tag,
            delta_ms = delta,
            propagated,
            "Restamped row"
        );
        Ok(propagated)
    }

    /// Playback window of row `index`: its start and the next strictly later row start
    ///
    /// Falls back to `fallback_end_ms` when no later row exists; `None` when the
    /// row has no valid tag.
    pub fn line_window(&self, index: usize, fallback_end_ms: i64) -> Option<(i64, i64)> {
        let start = self.rows.get(index)?.start_millis()?;
        let end = self.rows[index + 1..]
            .iter()
            .filter_map(LrcRow::start_millis)
            .find(|&next| next > start)
            .unwrap_or(fallback_end_ms);
        Some((start, end))
    }
}

/// Per-character timing of one row, for stamping individual characters
#[derive(Debug, Clone, PartialEq)]
pub struct CharTimingSheet {
    tokens: Vec<Token>,
}

impl CharTimingSheet {
    /// Split tagged content into characters carrying the most recent embedded time
    ///
    /// Characters before the first embedded tag take `start_ms`. A leading tag
    /// on `content` itself is dropped.
    pub fn from_content(content: &str, start_ms: i64) -> Result<Self> {
        let patterns = TagPatterns::new()?;
        let body = match patterns.leading.find(content) {
            Some(tag) => &content[tag.end()..],
            None => content,
        };

        let mut tokens = Vec::new();
        let mut current_ms = start_ms;
        let mut last = 0;
        let push_chars = |text: &str, ms: i64, tokens: &mut Vec<Token>| {
            for ch in text.chars() {
                tokens.push(Token {
                    time: Some(ms as f64 / 1000.0),
                    ..Token::new("", ch.to_string())
                });
            }
        };
        for found in patterns.embedded.find_iter(body) {
            push_chars(&body[last..found.start()], current_ms, &mut tokens);
            if let Some(ms) = parse_tag_millis(&body[found.range()]) {
                current_ms = ms;
            }
            last = found.end();
        }
        push_chars(&body[last..], current_ms, &mut tokens);
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn millis(&self, index: usize) -> Option<i64> {
        self.tokens
            .get(index)
            .and_then(|t| t.time)
            .map(|secs| (secs * 1000.0).round() as i64)
    }

    /// Set the time of character `index` and mark it edited
    pub fn stamp(&mut self, index: usize, ms: i64) -> Result<()> {
        let len = self.tokens.len();
        let Some(token) = self.tokens.get_mut(index) else {
            bail!("character {index} out of range, line has {len} characters");
        };
        token.time = Some(ms.max(0) as f64 / 1000.0);
        token.edited = true;
        Ok(())
    }

    /// Index of the last character whose time is at or before `position_ms`
    pub fn active_index(&self, position_ms: i64) -> Option<usize> {
        (0..self.tokens.len())
            .take_while(|&i| self.millis(i).is_some_and(|ms| position_ms >= ms))
            .last()
    }

    /// Rebuild the row: the first character's time becomes the primary tag and
    /// every later character is prefixed by its own tag
    pub fn to_row(&self) -> Option<LrcRow> {
        let first = self.millis(0)?;
        let mut content = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                content.push('[');
                content.push_str(&format_millis(self.millis(i).unwrap_or(first)));
                content.push(']');
            }
            content.push_str(&token.text);
        }
        Some(LrcRow {
            tag: format_tag_millis(first),
            content,
        })
    }
}
