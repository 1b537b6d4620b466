//! wordtest core - cumulative lesson test generator
//!
//! Reads a word list (Word, Excel or CSV tables grouped into lessons), builds a
//! 50-row quiz plus answer key for every lesson and renders them into a Word
//! template.

mod assembler;
mod config;
mod error;
mod model;
mod parser;
mod pipeline;
mod reader;
mod render;
mod script;

#[cfg(feature = "python")]
mod python;

pub use assembler::{answer_terms, answer_translations, assemble, assemble_lesson, assemble_seeded, select_pairs};
pub use config::{load_config_from, parse_config_str, GeneratorConfig, SEED_ENV};
pub use error::{Result, WordTestError};
pub use model::{blank_column, pad_column, LessonPage, LessonTable, PageKind, RenderContext, WordPair, PAGE_SIZE};
pub use parser::{header_hints, parse_document, ColumnChoice, ColumnHints, ColumnStrategy, ParserOptions, TableParser};
pub use pipeline::{build_context, process, try_process, ProcessSummary};
pub use reader::{read_csv, read_docx, read_spreadsheet, read_tables, Row, Table};
pub use render::{DocxTemplateRenderer, JsonContextRenderer, TemplateRenderer};
pub use script::{is_target_script, looks_numeric, normalize_token, script_ratio, TargetScript};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// wordtest Python module
#[cfg(feature = "python")]
#[pymodule]
fn wordtest_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(python::py_process, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_generate_tests, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_parse_word_list, m)?)?;
    Ok(())
}
