//! Template rendering for generated tests.
//!
//! A `.docx` template holds the layout of one page. Its body is repeated for
//! every [`LessonPage`] in the context, with a page break in between, and
//! `{{ ... }}` placeholders are filled from the page:
//!
//! | placeholder            | value                                        |
//! |------------------------|----------------------------------------------|
//! | `{{ lesson_number }}`  | lesson number                                |
//! | `{{ kind }}`           | `quiz` or `answer`                           |
//! | `{{ words[N] }}`       | row N of the term column (blank when hidden) |
//! | `{{ translations[N] }}`| row N of the translation column              |
//! | `{{ number[N] }}`      | N + 1, blank when row N is empty             |
//!
//! Word often splits a placeholder over several runs; any markup between the
//! braces is dropped together with the placeholder.
//!
//! There are no loops, conditionals or dotted paths. `{% ... %}` control tags
//! are removed and reported, and any other expression renders empty with a
//! warning.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use quick_xml::escape::escape;
use regex::{Captures, Regex};
use tracing::{debug, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Result, WordTestError};
use crate::model::{LessonPage, RenderContext};

const DOCUMENT_XML: &str = "word/document.xml";
const PAGE_BREAK: &str = r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").unwrap());
static CONTROL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{%(.*?)%\}").unwrap());
static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_]\w*)\s*(?:\[\s*(\d+)\s*\])?\s*$").unwrap());

/// Turns a finished [`RenderContext`] into an output file.
pub trait TemplateRenderer {
    fn render(&self, context: &RenderContext, output: &Path) -> Result<()>;
}

/// Renders into a copy of a Word template.
#[derive(Debug)]
pub struct DocxTemplateRenderer {
    path: PathBuf,
    entries: Vec<(String, Vec<u8>)>,
    document: String,
}

impl DocxTemplateRenderer {
    /// Loads the whole template package into memory.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| WordTestError::template(path, e))?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| WordTestError::template(path, format!("not a zip container: {}", e)))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| WordTestError::template(path, e))?;
            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .map_err(|e| WordTestError::template(path, e))?;
            entries.push((entry.name().to_string(), data));
        }

        let document = entries
            .iter()
            .find(|(name, _)| name == DOCUMENT_XML)
            .map(|(_, data)| String::from_utf8_lossy(data).into_owned())
            .ok_or_else(|| WordTestError::template(path, format!("missing {}", DOCUMENT_XML)))?;

        if split_body(&document).is_none() {
            return Err(WordTestError::template(path, "document has no body"));
        }

        debug!(path = %path.display(), entries = entries.len(), "loaded template");
        Ok(Self {
            path: path.to_path_buf(),
            entries,
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Produce the `word/document.xml` for `context`.
    pub fn render_document(&self, context: &RenderContext) -> Result<String> {
        let layout = split_body(&self.document).ok_or_else(|| WordTestError::render("template body vanished"))?;
        let mut skipped = Skipped::default();

        let pages: Vec<String> = context
            .lessons
            .iter()
            .map(|page| fill_placeholders(layout.block, page, &mut skipped))
            .collect();

        for tag in &skipped.control {
            warn!(tag = %tag, "template control tag is not supported and was removed");
        }
        for name in &skipped.unknown {
            warn!(placeholder = %name, "unknown template placeholder rendered empty");
        }

        let mut out = String::with_capacity(self.document.len() * pages.len().max(1));
        out.push_str(layout.head);
        out.push_str(&pages.join(PAGE_BREAK));
        out.push_str(layout.section);
        out.push_str(layout.tail);
        Ok(out)
    }

    fn write_package<W: Write + Seek>(&self, document: &str, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, data) in &self.entries {
            if name.ends_with('/') {
                zip.add_directory(name.as_str(), options).map_err(WordTestError::render)?;
                continue;
            }
            zip.start_file(name.as_str(), options).map_err(WordTestError::render)?;
            let bytes = if name == DOCUMENT_XML {
                document.as_bytes()
            } else {
                data.as_slice()
            };
            zip.write_all(bytes).map_err(WordTestError::render)?;
        }

        zip.finish().map_err(WordTestError::render)?;
        Ok(())
    }
}

impl TemplateRenderer for DocxTemplateRenderer {
    fn render(&self, context: &RenderContext, output: &Path) -> Result<()> {
        let document = self.render_document(context)?;
        let file = File::create(output).map_err(WordTestError::render)?;
        let result = self.write_package(&document, file);
        if result.is_err() {
            let _ = fs::remove_file(output);
        }
        result
    }
}

/// Writes the context as pretty-printed JSON.
#[derive(Debug, Default)]
pub struct JsonContextRenderer;

impl TemplateRenderer for JsonContextRenderer {
    fn render(&self, context: &RenderContext, output: &Path) -> Result<()> {
        let file = File::create(output).map_err(WordTestError::render)?;
        serde_json::to_writer_pretty(file, context).map_err(WordTestError::render)
    }
}

/// A template body cut into the repeated page block and the fixed parts.
struct BodyLayout<'a> {
    head: &'a str,
    block: &'a str,
    section: &'a str,
    tail: &'a str,
}

fn split_body(document: &str) -> Option<BodyLayout<'_>> {
    let open = document.find("<w:body")?;
    let start = open + document[open..].find('>')? + 1;
    let end = document.rfind("</w:body>")?;
    if end < start {
        return None;
    }
    let inner = &document[start..end];

    // The body-level section properties close the body and are not repeated.
    let section_start = inner.rfind("<w:sectPr").filter(|&at| {
        inner[at..]
            .find("</w:sectPr>")
            .map(|close| inner[at + close + "</w:sectPr>".len()..].trim().is_empty())
            .unwrap_or_else(|| inner[at..].trim_end().ends_with("/>"))
    });
    let split = section_start.unwrap_or(inner.len());

    Some(BodyLayout {
        head: &document[..start],
        block: &inner[..split],
        section: &inner[split..],
        tail: &document[end..],
    })
}

/// Template text that could not be filled, kept for one warning per name.
#[derive(Debug, Default)]
struct Skipped {
    control: BTreeSet<String>,
    unknown: BTreeSet<String>,
}

fn fill_placeholders(block: &str, page: &LessonPage, skipped: &mut Skipped) -> String {
    let block = CONTROL.replace_all(block, |caps: &Captures| {
        let tag = MARKUP.replace_all(&caps[1], "");
        skipped.control.insert(tag.trim().to_string());
        ""
    });
    PLACEHOLDER
        .replace_all(&block, |caps: &Captures| {
            let expression = MARKUP.replace_all(&caps[1], "");
            match lookup(page, &expression) {
                Some(value) => escape(value.as_str()).into_owned(),
                None => {
                    skipped.unknown.insert(expression.trim().to_string());
                    String::new()
                }
            }
        })
        .into_owned()
}

fn lookup(page: &LessonPage, expression: &str) -> Option<String> {
    let caps = EXPRESSION.captures(expression)?;
    let name = caps.get(1)?.as_str();
    let index = caps.get(2).and_then(|m| m.as_str().parse::<usize>().ok());

    let cell = |column: &[String], shown: bool, i: usize| {
        if shown {
            column.get(i).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };

    match (name, index) {
        ("lesson_number", None) => Some(page.lesson_number.to_string()),
        ("kind", None) => Some(page.kind.as_str().to_string()),
        ("words", Some(i)) => Some(cell(&page.words, page.show_words, i)),
        ("translations", Some(i)) => Some(cell(&page.translations, page.show_translations, i)),
        ("number", Some(i)) => {
            let filled = |column: &[String]| column.get(i).is_some_and(|s| !s.is_empty());
            Some(if filled(&page.words) || filled(&page.translations) {
                (i + 1).to_string()
            } else {
                String::new()
            })
        }
        _ => None,
    }
}
