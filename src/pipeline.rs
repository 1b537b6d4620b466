//! Parse, assemble and render in one call.

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use crate::assembler::assemble;
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::model::RenderContext;
use crate::parser::parse_document;
use crate::render::{DocxTemplateRenderer, TemplateRenderer};

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSummary {
    pub lessons: usize,
    pub pairs: usize,
    pub pages: usize,
}

/// Parse `input` and build the render context without writing anything.
pub fn build_context(input: &Path, config: &GeneratorConfig) -> Result<(RenderContext, ProcessSummary)> {
    let lessons = parse_document(input, config.parser_options())?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let context = assemble(&lessons, &mut rng)?;
    let summary = ProcessSummary {
        lessons: lessons.lesson_count(),
        pairs: lessons.pair_count(),
        pages: context.lessons.len(),
    };
    Ok((context, summary))
}

/// Generate the test document for `input` into `output` using `template`.
///
/// The template is opened before the word list is parsed, so a missing
/// template is reported even for an unreadable input.
pub fn try_process(
    input: &Path,
    template: &Path,
    output: &Path,
    config: &GeneratorConfig,
) -> Result<ProcessSummary> {
    let renderer = DocxTemplateRenderer::open(template)?;
    let (context, summary) = build_context(input, config)?;
    renderer.render(&context, output)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        lessons = summary.lessons,
        pages = summary.pages,
        "generated test document"
    );
    Ok(summary)
}

/// Boolean form of [`try_process`] with default configuration.
///
/// Returns `true` when `output` holds a complete document. Failures are
/// logged, never raised.
pub fn process(input: &Path, template: &Path, output: &Path) -> bool {
    match try_process(input, template, output, &GeneratorConfig::default()) {
        Ok(_) => true,
        Err(e) => {
            error!(input = %input.display(), error = %e, "test generation failed");
            false
        }
    }
}
