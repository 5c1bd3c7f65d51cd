// WHY: splits one primary lyric line into the atomic units the aligner matches against
// Separators and the trailing remainder are kept verbatim so rendering loses no text

/// One atomic token and the literal text immediately preceding it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawToken<'a> {
    pub separator: &'a str,
    pub text: &'a str,
}

/// Tokenized view of a line, borrowed from the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedLine<'a> {
    pub tokens: Vec<RawToken<'a>>,
    /// Text after the last token, appended at render time regardless of timing
    pub trailing: &'a str,
}

impl<'a> TokenizedLine<'a> {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}

/// CJK unified ideographs (basic block), Hiragana and Katakana
pub fn is_cjk_or_kana(ch: char) -> bool {
    matches!(ch, '\u{4E00}'..='\u{9FA5}' | '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}')
}

/// Characters that extend a Latin word-run token
fn is_word_run_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '\''
}

/// Split a line into `(separator, token)` pairs plus trailing text
///
/// Tokens are maximal runs of ASCII letters, digits and apostrophes, or single
/// CJK/Kana characters. Everything else is separator text.
pub fn tokenize(line: &str) -> TokenizedLine<'_> {
    let mut tokens = Vec::new();
    let mut last_end = 0;
    let mut run_start: Option<usize> = None;

    for (idx, ch) in line.char_indices() {
        if is_word_run_char(ch) {
            if run_start.is_none() {
                run_start = Some(idx);
            }
            continue;
        }

        if let Some(start) = run_start.take() {
            tokens.push(RawToken {
                separator: &line[last_end..start],
                text: &line[start..idx],
            });
            last_end = idx;
        }

        if is_cjk_or_kana(ch) {
            let end = idx + ch.len_utf8();
            tokens.push(RawToken {
                separator: &line[last_end..idx],
                text: &line[idx..end],
            });
            last_end = end;
        }
    }

    if let Some(start) = run_start {
        tokens.push(RawToken {
            separator: &line[last_end..start],
            text: &line[start..],
        });
        last_end = line.len();
    }

    TokenizedLine {
        tokens,
        trailing: &line[last_end..],
    }
}

/// Normalize text for fuzzy comparison: keep word characters and CJK/Kana, lower-case
pub fn normalize_for_match(text: &str) -> String {
    text.chars()
        .filter(|&ch| ch.is_alphanumeric() || ch == '_' || is_cjk_or_kana(ch))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Surround every CJK/Kana character with spaces and collapse whitespace
/// WHY: forced aligners tokenize on whitespace, unspaced CJK would arrive as one huge word
pub fn space_cjk(text: &str) -> String {
    let mut spaced = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        if is_cjk_or_kana(ch) {
            spaced.push(' ');
            spaced.push(ch);
            spaced.push(' ');
        } else {
            spaced.push(ch);
        }
    }
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
