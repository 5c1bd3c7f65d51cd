pub mod alignment;
pub mod lyric_parser;
pub mod output;
pub mod pipeline;
pub mod reader;
pub mod renderer;
pub mod retime;
pub mod timestamp;
pub mod tokenizer;
pub mod transcript;

// Re-export main types for convenient access
pub use alignment::{AlignConfig, Aligner, AlignmentState, ResolvedLine, Token};
pub use lyric_parser::{LyricDocument, LyricParser, SourceFormat};
pub use pipeline::{align_lyrics, AlignedLyrics, AlignmentSummary, Outcome, Pipeline};
pub use transcript::{RecognizedSegment, RecognizedWord, Segment, Transcript, Word, WordPool};

// Re-export manual retiming utilities
pub use retime::{retime_delta, CharTimingSheet, LrcRow, LrcSheet};
