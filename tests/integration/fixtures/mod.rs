// Test fixtures: lyric files, recognizer transcripts and their expected LRC renders
// WHY: Golden-file testing requires deterministic input/output pairs for validation

#![allow(dead_code)]

/// Tagged CJK line with a translation sharing its tag
pub const CRADLE_LRC: &str = "[ti:Cradle Song]
[ar:Nobody]
[00:01.00]摇篮
[00:01.00]Cradle
";

/// Wrapped transcript shape with one word per character
pub const CRADLE_TRANSCRIPT: &str = r#"{
  "segments": [
    {
      "start": 1.0,
      "end": 1.6,
      "text": "摇篮",
      "words": [
        {"word": "摇", "start": 1.0, "end": 1.2},
        {"word": "篮", "start": 1.2, "end": 1.6}
      ]
    }
  ]
}"#;

/// Headers, blank separator, word-tagged primary line, translation at the line start
pub const CRADLE_EXPECTED: &str = "[ti:Cradle Song]
[ar:Nobody]

[00:01.000]摇[00:01.200]篮
[00:01.000]Cradle";

/// Plain text lyrics; the recognizer misses "two"
pub const COUNTING_TXT: &str = "one two three\nfour five\n";

/// Bare segment array with extra recognizer fields and noisy word text
pub const COUNTING_TRANSCRIPT: &str = r#"[
  {"start": 1.0, "end": 2.3, "text": " One three", "words": [
    {"word": " One", "start": 1.0, "end": 1.3, "probability": 0.91},
    {"word": " three", "start": 2.0, "end": 2.3, "probability": 0.88}
  ]},
  {"start": 3.0, "end": 3.9, "text": " four five,", "words": [
    {"word": " four", "start": 3.0},
    {"word": " five,", "start": 3.5}
  ]}
]"#;

/// "two" lands one max-gap step after "one"
pub const COUNTING_EXPECTED: &str = "[00:01.000]one [00:01.150]two [00:02.000]three
[00:03.000]four [00:03.500]five";

/// Subtitle input: counters and cue timings are scaffolding, the credit is a header
pub const MOON_SRT: &str = "1
00:00:01,000 --> 00:00:02,000
作词：某人

2
00:00:02,000 --> 00:00:03,500
月亮
";

pub const MOON_TRANSCRIPT: &str = r#"{"segments": [{"start": 2.0, "text": "月亮", "words": [
  {"word": "月", "start": 2.0},
  {"word": "亮", "start": 2.4}
]}]}"#;

pub const MOON_EXPECTED: &str = "作词：某人

[00:02.000]月[00:02.400]亮";

/// Segments for no-reference mode, including a blank one
pub const DRAFT_TRANSCRIPT: &str = r#"{"segments": [
  {"start": 0.5, "text": " first phrase ", "words": []},
  {"start": 1.0, "text": "   ", "words": []},
  {"start": 2.25, "text": "second phrase", "words": []}
]}"#;

pub const DRAFT_EXPECTED: &str = "[00:00.500]first phrase
[00:02.250]second phrase";

/// An already rendered LRC, as edited by hand afterwards
pub const RENDERED_LRC: &str = "[ti:Cradle Song]

[00:10.000]摇[00:11.500]篮
[00:10.000]Cradle
[00:14.000]next line
";

/// Row 2 moved to 10.500; the 1.5 s lead gap is pulled back to 0.3 s
pub const RETIMED_EXPECTED: &str = "[ti:Cradle Song]
[00:10.500]摇[00:10.800]篮
[00:10.500]Cradle
[00:14.000]next line";
