// WHY: line classifier turning raw lyric files into headers, primary lines and translations
// Three predicates drive it: header bracket, leading time tag, credit-line prefix

use anyhow::Result;
use regex_automata::{meta::Regex, Input};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Role prefixes of credit lines (lyricist, composer, arranger, mix, vocals, instruments...)
const CREDIT_PREFIXES: &[&str] = &[
    "作", "编", "词", "曲", "演", "唱", "混", "录", "母", "制", "监", "统", "出", "绘", "调", "和",
    "吉", "贝", "鼓", "弦", "管", "Lyr", "Com", "Arr", "Sin", "Voc", "Mix", "Mas", "Pro", "Art",
    "Cov", "Gui", "Bas", "Dru", "Str",
];

/// Hint derived from the source file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceFormat {
    #[default]
    Lrc,
    Txt,
    Srt,
}

impl SourceFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("srt") => Self::Srt,
            Some("txt") => Self::Txt,
            _ => Self::Lrc,
        }
    }
}

/// Parsed lyric document; immutable once built
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricDocument {
    /// Verbatim non-lyric lines (metadata tags, credits)
    pub headers: Vec<String>,
    /// Cleaned primary lyric lines in source order
    pub lines: Vec<String>,
    /// Secondary-language lines keyed by primary line index
    pub translations: BTreeMap<usize, Vec<String>>,
}

impl LyricDocument {
    /// Primary lines joined by newline, used as the pre-filled editable reference text
    pub fn seed_text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn has_reference(&self) -> bool {
        !self.lines.is_empty()
    }

    pub fn translations_for(&self, index: usize) -> &[String] {
        self.translations.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// How a single source line was classified
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineClass<'a> {
    Header,
    Discard,
    Lyric { time_tag: Option<&'a str>, text: String },
}

/// Lyric file parser holding the compiled classification patterns
pub struct LyricParser {
    time_tag_prefix: Regex,
    leading_tag: Regex,
    bracket_tag: Regex,
    markup_tag: Regex,
    credit_line: Regex,
    srt_timing: Regex,
}

impl LyricParser {
    pub fn new() -> Result<Self> {
        let credit_alternation = CREDIT_PREFIXES.join("|");
        Ok(Self {
            time_tag_prefix: Regex::new(r"^\[\d{2}:\d{2}")?,
            leading_tag: Regex::new(r"^\[\d{2}:\d{2}.*?\]")?,
            bracket_tag: Regex::new(r"\[.*?\]")?,
            markup_tag: Regex::new(r"<.*?>")?,
            credit_line: Regex::new(&format!(r"(?i)^(?:{credit_alternation}).{{0,40}}(?:[:：]|\s|-)"))?,
            srt_timing: Regex::new(r"^\d{1,2}:\d{2}:\d{2}[,.]\d{1,3}\s*-->")?,
        })
    }

    /// Parse raw lyric text into a document
    pub fn parse(&self, raw: &str, format: SourceFormat) -> LyricDocument {
        let content = raw.trim_start_matches('\u{FEFF}');
        let mut document = LyricDocument::default();
        let mut last_time_tag: Option<&str> = None;

        for line in content.split(is_line_boundary) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if format == SourceFormat::Srt && self.is_srt_scaffolding(line) {
                continue;
            }

            match self.classify(line) {
                LineClass::Header => document.headers.push(line.to_string()),
                LineClass::Discard => debug!(line, "Discarding line without lyric text"),
                LineClass::Lyric { time_tag, text } => {
                    let repeats_tag = time_tag.is_some() && time_tag == last_time_tag;
                    if repeats_tag && !document.lines.is_empty() {
                        let index = document.lines.len() - 1;
                        document.translations.entry(index).or_default().push(text);
                    } else {
                        document.lines.push(text);
                        last_time_tag = time_tag;
                    }
                }
            }
        }

        debug!(
            headers = document.headers.len(),
            lines = document.lines.len(),
            translated = document.translations.len(),
            ?format,
            "Parsed lyric document"
        );
        document
    }

    fn classify<'a>(&self, line: &'a str) -> LineClass<'a> {
        if line.starts_with('[') && !self.time_tag_prefix.is_match(line) {
            return LineClass::Header;
        }

        let (time_tag, text_only) = match self.leading_tag.find(line) {
            Some(tag) => {
                let rest = line[tag.end()..].trim();
                let without_tags = remove_matches(&self.bracket_tag, rest);
                let without_markup = remove_matches(&self.markup_tag, &without_tags);
                (Some(&line[tag.range()]), without_markup.trim().to_string())
            }
            None => (None, remove_matches(&self.bracket_tag, line).trim().to_string()),
        };

        if text_only.is_empty() {
            return LineClass::Discard;
        }
        if self.credit_line.is_match(Input::new(&text_only)) {
            return LineClass::Header;
        }
        LineClass::Lyric {
            time_tag,
            text: text_only,
        }
    }

    /// SRT cue counters and `00:00:01,000 --> ...` timing rows
    fn is_srt_scaffolding(&self, line: &str) -> bool {
        line.chars().all(|c| c.is_ascii_digit()) || self.srt_timing.is_match(line)
    }

    /// Whether the text would be treated as a credit line
    pub fn is_credit_line(&self, text: &str) -> bool {
        self.credit_line.is_match(text)
    }
}

/// Every character `str.splitlines` style line splitting breaks on
fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{1C}'..='\u{1E}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Remove every non-overlapping match of `pattern` from `text`
pub(crate) fn remove_matches(pattern: &Regex, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for found in pattern.find_iter(text) {
        out.push_str(&text[last..found.start()]);
        last = found.end();
    }
    out.push_str(&text[last..]);
    out
}
