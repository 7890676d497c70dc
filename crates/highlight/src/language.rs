use std::ops::Range;

use ika_core::Language;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Words tagged as keywords in Python buffers.
pub const PYTHON_KEYWORDS: &[&str] = &[
    "def", "class", "for", "while", "if", "elif", "else", "try", "except", "return", "import",
    "from", "as", "with", "pass", "in", "not", "and", "or",
];

const PYTHON_STRING_PATTERN: &str = r#"(".*?"|'.*?')"#;
const HTML_TAG_PATTERN: &str = r"<[^>]+>";

static PYTHON_RULES: Lazy<Vec<HighlightRule>> = Lazy::new(|| {
    vec![
        HighlightRule::new(&keyword_pattern(PYTHON_KEYWORDS), HighlightKind::Keyword)
            .expect("python keyword pattern should compile"),
        HighlightRule::new(PYTHON_STRING_PATTERN, HighlightKind::String)
            .expect("python string pattern should compile"),
    ]
});

static HTML_RULES: Lazy<Vec<HighlightRule>> = Lazy::new(|| {
    vec![HighlightRule::new(HTML_TAG_PATTERN, HighlightKind::Tag)
        .expect("html tag pattern should compile")]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HighlightKind {
    Keyword,
    String,
    Tag,
}

impl HighlightKind {
    pub fn name(self) -> &'static str {
        match self {
            HighlightKind::Keyword => "keyword",
            HighlightKind::String => "string",
            HighlightKind::Tag => "tag",
        }
    }
}

/// A styled span; `range` holds byte offsets into the highlighted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightToken {
    pub range: Range<usize>,
    pub kind: HighlightKind,
}

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("regex compilation failed: {0}")]
    RegexCompilation(String),
}

/// One regex pass producing spans of a single kind.
#[derive(Debug, Clone)]
pub struct HighlightRule {
    regex: Regex,
    kind: HighlightKind,
}

impl HighlightRule {
    pub fn new(pattern: &str, kind: HighlightKind) -> Result<Self, HighlightError> {
        let regex = Regex::new(pattern)
            .map_err(|err| HighlightError::RegexCompilation(format!("{kind:?} rule: {err}")))?;
        Ok(Self { regex, kind })
    }

    pub fn kind(&self) -> HighlightKind {
        self.kind
    }

    fn apply(&self, input: &str, tokens: &mut Vec<HighlightToken>) {
        tokens.extend(self.regex.find_iter(input).map(|found| HighlightToken {
            range: found.start()..found.end(),
            kind: self.kind,
        }));
    }
}

/// Returns the rule table for `language`.
pub fn rules_for(language: Language) -> &'static [HighlightRule] {
    match language {
        Language::Python => &PYTHON_RULES,
        Language::Html => &HTML_RULES,
    }
}

/// Regex-tagging highlighter. Every call recomputes all spans over the whole
/// text; passes are independent, so a keyword inside a string literal gets
/// both a string span and a keyword span.
#[derive(Debug, Clone, Copy, Default)]
pub struct Highlighter;

impl Highlighter {
    pub fn new() -> Self {
        Self
    }

    pub fn highlight(&self, language: Language, input: &str) -> Vec<HighlightToken> {
        let mut tokens = Vec::new();
        if input.is_empty() {
            return tokens;
        }
        for rule in rules_for(language) {
            rule.apply(input, &mut tokens);
        }
        tokens.sort_by_key(|token| (token.range.start, token.kind));
        tokens
    }
}

fn keyword_pattern(keywords: &[&str]) -> String {
    let alternatives = keywords
        .iter()
        .map(|keyword| regex::escape(keyword))
        .collect::<Vec<_>>()
        .join("|");
    format!(r"\b({alternatives})\b")
}
