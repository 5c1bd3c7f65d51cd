// WHY: the recognizer is an external collaborator; these traits are the only surface the core reads
// Engine-specific result shapes adapt to RecognizedSegment/RecognizedWord, the core never branches on engine

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One timed word as produced by a recognizer
pub trait RecognizedWord {
    fn text(&self) -> &str;
    /// Start time in seconds
    fn start(&self) -> f64;
}

/// One recognizer segment: a phrase with its own start time and word list
pub trait RecognizedSegment {
    type Word: RecognizedWord;

    fn start(&self) -> f64;
    fn text(&self) -> &str;
    fn words(&self) -> &[Self::Word];
}

/// Serialized word as found in recognizer JSON output
/// Extra fields such as `end` or `probability` are ignored
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Word {
    #[serde(rename = "word", alias = "text")]
    pub text: String,
    #[serde(default)]
    pub start: f64,
}

/// Serialized segment as found in recognizer JSON output
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Segment {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub words: Vec<Word>,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64) -> Self {
        Self { text: text.into(), start }
    }
}

impl Segment {
    pub fn new(start: f64, text: impl Into<String>, words: Vec<Word>) -> Self {
        Self {
            start,
            text: text.into(),
            words,
        }
    }
}

impl RecognizedWord for Word {
    fn text(&self) -> &str {
        &self.text
    }

    fn start(&self) -> f64 {
        self.start
    }
}

impl RecognizedSegment for Segment {
    type Word = Word;

    fn start(&self) -> f64 {
        self.start
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn words(&self) -> &[Word] {
        &self.words
    }
}

/// Accepted top-level transcript shapes: `{"segments": [...]}` or a bare segment array
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum TranscriptShape {
    Wrapped { segments: Vec<Segment> },
    Bare(Vec<Segment>),
}

/// Ordered recognizer output for one audio file
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub segments: Vec<Segment>,
}

impl Transcript {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Parse recognizer JSON in either accepted shape
    pub fn from_json(json: &str) -> Result<Self> {
        let shape: TranscriptShape =
            serde_json::from_str(json).context("Transcript JSON is neither {\"segments\": [...]} nor a segment array")?;
        let segments = match shape {
            TranscriptShape::Wrapped { segments } => segments,
            TranscriptShape::Bare(segments) => segments,
        };
        Ok(Self { segments })
    }

    pub fn word_count(&self) -> usize {
        self.segments.iter().map(|s| s.words.len()).sum()
    }
}

/// One entry of the flattened word pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolEntry<'a> {
    pub text: &'a str,
    pub start: f64,
}

/// Flat, order-preserving, read-only view over every segment's words
#[derive(Debug, Clone, Default)]
pub struct WordPool<'a> {
    entries: Vec<PoolEntry<'a>>,
}

impl<'a> WordPool<'a> {
    pub fn from_segments<S: RecognizedSegment>(segments: &'a [S]) -> Self {
        let entries = segments
            .iter()
            .flat_map(|segment| segment.words())
            .map(|word| PoolEntry {
                text: word.text(),
                start: word.start(),
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PoolEntry<'a>> {
        self.entries.get(index)
    }

    /// Entries from `cursor`, at most `len` of them
    pub fn window(&self, cursor: usize, len: usize) -> &[PoolEntry<'a>] {
        let start = cursor.min(self.entries.len());
        let end = cursor.saturating_add(len).min(self.entries.len());
        &self.entries[start..end]
    }
}
