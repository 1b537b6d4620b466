//! Core data types shared by the parser, the assembler and the renderers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of rows on every generated page.
pub const PAGE_SIZE: usize = 50;

/// A term and its translation as read from one table row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordPair {
    pub term: String,
    pub translation: String,
}

impl WordPair {
    pub fn new(term: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            translation: translation.into(),
        }
    }
}

/// Word pairs grouped by 1-based lesson number, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonTable {
    lessons: BTreeMap<u32, Vec<WordPair>>,
}

impl LessonTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an empty lesson. An existing lesson keeps its pairs.
    pub fn open_lesson(&mut self, lesson: u32) {
        self.lessons.entry(lesson).or_default();
    }

    pub fn push(&mut self, lesson: u32, pair: WordPair) {
        self.lessons.entry(lesson).or_default().push(pair);
    }

    pub fn get(&self, lesson: u32) -> &[WordPair] {
        self.lessons.get(&lesson).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    pub fn pair_count(&self) -> usize {
        self.lessons.values().map(Vec::len).sum()
    }

    /// Highest lesson number present, 0 for an empty table.
    pub fn max_lesson(&self) -> u32 {
        self.lessons.keys().next_back().copied().unwrap_or(0)
    }

    /// True when there is nothing to build a test from.
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty() || self.pair_count() == 0
    }

    /// All pairs of lessons `1..lesson`, in lesson order.
    pub fn pairs_before(&self, lesson: u32) -> Vec<WordPair> {
        self.lessons
            .range(..lesson)
            .flat_map(|(_, pairs)| pairs.iter().cloned())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[WordPair])> {
        self.lessons.iter().map(|(n, pairs)| (*n, pairs.as_slice()))
    }
}

impl FromIterator<(u32, Vec<WordPair>)> for LessonTable {
    fn from_iter<I: IntoIterator<Item = (u32, Vec<WordPair>)>>(iter: I) -> Self {
        Self {
            lessons: iter.into_iter().collect(),
        }
    }
}

/// Whether a page is part of the quiz or of the answer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Quiz,
    Answer,
}

impl PageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Answer => "answer",
        }
    }
}

/// One rendered page: two fixed-length columns, one of which is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPage {
    pub lesson_number: u32,
    pub kind: PageKind,
    pub words: Vec<String>,
    pub translations: Vec<String>,
    pub show_words: bool,
    pub show_translations: bool,
}

impl LessonPage {
    /// Builds a page, right-padding both columns with blanks to [`PAGE_SIZE`].
    pub fn new(
        lesson_number: u32,
        kind: PageKind,
        words: Vec<String>,
        translations: Vec<String>,
        show_words: bool,
        show_translations: bool,
    ) -> Self {
        Self {
            lesson_number,
            kind,
            words: pad_column(words),
            translations: pad_column(translations),
            show_words,
            show_translations,
        }
    }
}

/// Everything the template renderer receives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderContext {
    pub lessons: Vec<LessonPage>,
}

pub fn blank_column() -> Vec<String> {
    vec![String::new(); PAGE_SIZE]
}

/// Right-pads with empty strings to [`PAGE_SIZE`]. Longer input is cut.
pub fn pad_column(mut column: Vec<String>) -> Vec<String> {
    column.resize(PAGE_SIZE, String::new());
    column
}
