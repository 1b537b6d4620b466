//! Word-list table parsing.
//!
//! Source documents are inconsistent: lessons are separated by repeated
//! `No | Words | ...` header rows, tables come with 3, 4 or 5 columns, and the
//! translation column is not always where the header says it is. The parser
//! tolerates all of this and resolves the translation column through an
//! ordered list of strategies (see [`ColumnStrategy`]).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, WordTestError};
use crate::model::{LessonTable, WordPair};
use crate::reader::{read_tables, Table};
use crate::script::{is_target_script, looks_numeric, normalize_token, script_ratio, TargetScript};

const NUMBER_HEADERS: &[&str] = &["no", "number", "num", "번호"];
const WORD_HEADERS: &[&str] = &["word", "words", "단어", "어휘"];
const TRANSLATION_HEADERS: &[&str] = &[
    "translation",
    "translations",
    "meaning",
    "meanings",
    "sense",
    "뜻",
    "의미",
    "해석",
    "번역",
];

/// Default column for the term when no header says otherwise.
const DEFAULT_WORD_COLUMN: usize = 1;

/// Tuning for translation-column detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParserOptions {
    pub target_script: TargetScript,
    /// Minimum share of target-script letters for a plausible translation.
    pub script_threshold: f64,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            target_script: TargetScript::Hangul,
            script_threshold: 0.3,
        }
    }
}

/// How a translation column was chosen, in the order strategies are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnStrategy {
    /// Column named by the lesson's header row.
    HeaderMatch,
    /// Position inferred from the number of cells in the row.
    CellCount,
    /// First later column whose text is in the target script.
    ScriptCorrection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnChoice {
    pub index: usize,
    pub strategy: ColumnStrategy,
}

/// Column positions learned from a header row. Reset for every table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnHints {
    pub word: Option<usize>,
    pub translation: Option<usize>,
}

/// Returns the column hints if `cells` is a lesson header row.
pub fn header_hints(cells: &[&str]) -> Option<ColumnHints> {
    if cells.len() < 2 {
        return None;
    }
    let first = normalize_token(cells[0]);
    let second = normalize_token(cells[1]);
    if !NUMBER_HEADERS.contains(&first.as_str()) || !WORD_HEADERS.contains(&second.as_str()) {
        return None;
    }
    let translation = cells
        .iter()
        .position(|c| TRANSLATION_HEADERS.contains(&normalize_token(c).as_str()));
    Some(ColumnHints {
        word: Some(DEFAULT_WORD_COLUMN),
        translation,
    })
}

pub struct TableParser {
    options: ParserOptions,
}

impl Default for TableParser {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

impl TableParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Group the data rows of `tables` into lessons.
    pub fn parse_tables(&self, tables: &[Table]) -> LessonTable {
        let mut lessons = LessonTable::new();
        let mut current: u32 = 0;

        for table in tables {
            let mut hints = ColumnHints::default();

            for row in table {
                let cells: Vec<&str> = row.iter().map(|c| c.trim()).collect();

                if let Some(found) = header_hints(&cells) {
                    current += 1;
                    lessons.open_lesson(current);
                    hints = found;
                    debug!(lesson = current, translation_column = ?hints.translation, "lesson header");
                    continue;
                }

                if cells.len() < 2 || !looks_numeric(cells[0]) {
                    continue;
                }

                if current == 0 {
                    current = 1;
                    lessons.open_lesson(current);
                    hints = ColumnHints {
                        word: Some(DEFAULT_WORD_COLUMN),
                        translation: None,
                    };
                    debug!("data row before any header, starting lesson 1");
                }

                if let Some(pair) = self.read_pair(&cells, hints) {
                    lessons.push(current, pair);
                }
            }
        }

        lessons
    }

    fn read_pair(&self, cells: &[&str], hints: ColumnHints) -> Option<WordPair> {
        let word_index = hints
            .word
            .filter(|&i| i < cells.len())
            .unwrap_or(DEFAULT_WORD_COLUMN);
        let term = cells[word_index];
        if term.is_empty() {
            return None;
        }
        let translation = self.resolve_translation(cells, hints);
        Some(WordPair::new(term, cells[translation.index]))
    }

    /// Pick the translation column for one data row.
    pub fn resolve_translation(&self, cells: &[&str], hints: ColumnHints) -> ColumnChoice {
        let nominal = header_match(cells, hints).unwrap_or_else(|| cell_count(cells));
        self.script_correction(cells, nominal).unwrap_or(nominal)
    }

    /// Replaces `nominal` when its text is not in the target script.
    fn script_correction(&self, cells: &[&str], nominal: ColumnChoice) -> Option<ColumnChoice> {
        if self.plausible(cells[nominal.index]) {
            return None;
        }
        let index = (2..cells.len()).find(|&i| self.in_target_script(cells[i]));
        match index {
            Some(index) => {
                debug!(from = nominal.index, to = index, "translation column corrected by script");
                Some(ColumnChoice {
                    index,
                    strategy: ColumnStrategy::ScriptCorrection,
                })
            }
            None => {
                warn!(
                    column = nominal.index,
                    text = cells[nominal.index],
                    "no column looks like a translation, keeping nominal column"
                );
                None
            }
        }
    }

    fn plausible(&self, text: &str) -> bool {
        is_target_script(text, self.options.target_script, self.options.script_threshold)
    }

    /// Stricter than [`Self::plausible`]: the text must contain letters.
    fn in_target_script(&self, text: &str) -> bool {
        script_ratio(text, self.options.target_script)
            .is_some_and(|ratio| ratio >= self.options.script_threshold)
    }
}

fn header_match(cells: &[&str], hints: ColumnHints) -> Option<ColumnChoice> {
    hints
        .translation
        .filter(|&i| i < cells.len())
        .map(|index| ColumnChoice {
            index,
            strategy: ColumnStrategy::HeaderMatch,
        })
}

fn cell_count(cells: &[&str]) -> ColumnChoice {
    let index = match cells.len() {
        n if n >= 5 => 4,
        4 => 3,
        3 => 2,
        n => n.saturating_sub(1),
    };
    ColumnChoice {
        index,
        strategy: ColumnStrategy::CellCount,
    }
}

/// Read a word-list document and group its pairs into lessons.
///
/// A document that yields no lessons, or lessons without a single pair, is
/// an error.
pub fn parse_document(path: &Path, options: ParserOptions) -> Result<LessonTable> {
    let tables = read_tables(path)?;
    let lessons = TableParser::new(options).parse_tables(&tables);

    if lessons.is_empty() {
        return Err(WordTestError::NoLessonsFound {
            lessons: lessons.lesson_count(),
            pairs: lessons.pair_count(),
        });
    }

    info!(
        path = %path.display(),
        lessons = lessons.lesson_count(),
        pairs = lessons.pair_count(),
        "parsed word list"
    );
    Ok(lessons)
}
