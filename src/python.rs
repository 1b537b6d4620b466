//! Python bindings for the web front end

use std::collections::BTreeMap;
use std::path::Path;

use pyo3::prelude::*;

use crate::config::GeneratorConfig;
use crate::parser::parse_document;
use crate::pipeline::{process, try_process};

#[pyfunction]
#[pyo3(name = "process")]
pub fn py_process(input_path: &str, template_path: &str, output_path: &str) -> bool {
    process(Path::new(input_path), Path::new(template_path), Path::new(output_path))
}

/// Like `process` but raises with the reason and returns the page count.
#[pyfunction]
#[pyo3(name = "generate_tests", signature = (input_path, template_path, output_path, seed=None))]
pub fn py_generate_tests(
    input_path: &str,
    template_path: &str,
    output_path: &str,
    seed: Option<u64>,
) -> PyResult<usize> {
    let config = GeneratorConfig {
        seed,
        ..GeneratorConfig::default()
    };
    try_process(
        Path::new(input_path),
        Path::new(template_path),
        Path::new(output_path),
        &config,
    )
    .map(|summary| summary.pages)
    .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))
}

#[pyfunction]
#[pyo3(name = "parse_word_list")]
pub fn py_parse_word_list(file_path: &str) -> PyResult<BTreeMap<u32, Vec<(String, String)>>> {
    let lessons = parse_document(Path::new(file_path), GeneratorConfig::default().parser_options())
        .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))?;
    Ok(lessons
        .iter()
        .map(|(n, pairs)| {
            let pairs = pairs
                .iter()
                .map(|p| (p.term.clone(), p.translation.clone()))
                .collect();
            (n, pairs)
        })
        .collect())
}
