//! Document reading for word-list import (Word, Excel and CSV)
//!
//! Every supported format is flattened into the same shape: a list of tables,
//! each a list of rows of trimmed cell strings.

use std::fs::File;
use std::io::Read;
use std::mem;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader as XmlReader;
use tracing::debug;
use zip::ZipArchive;

use crate::error::{Result, WordTestError};

pub type Row = Vec<String>;
pub type Table = Vec<Row>;

/// Read every table of a document, choosing the format by file extension
pub fn read_tables(path: &Path) -> Result<Vec<Table>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let tables = match extension.as_str() {
        "docx" => read_docx(path)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_spreadsheet(path)?,
        "csv" => read_csv(path)?,
        _ => {
            return Err(WordTestError::unreadable(
                path,
                format!("unsupported file format: .{}", extension),
            ))
        }
    };

    debug!(
        path = %path.display(),
        tables = tables.len(),
        rows = tables.iter().map(Vec::len).sum::<usize>(),
        "read document tables"
    );
    Ok(tables)
}

/// Read the top-level tables of a .docx file
pub fn read_docx(path: &Path) -> Result<Vec<Table>> {
    let xml = read_zip_entry(path, "word/document.xml")?;
    docx_tables(&xml).map_err(|e| WordTestError::unreadable(path, format!("malformed document.xml: {}", e)))
}

fn read_zip_entry(path: &Path, name: &str) -> Result<String> {
    let file = File::open(path).map_err(|e| WordTestError::unreadable(path, e))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| WordTestError::unreadable(path, format!("not a zip container: {}", e)))?;
    let mut entry = archive
        .by_name(name)
        .map_err(|_| WordTestError::unreadable(path, format!("missing {}", name)))?;
    let mut buffer = Vec::new();
    entry
        .read_to_end(&mut buffer)
        .map_err(|e| WordTestError::unreadable(path, e))?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Extract tables from WordprocessingML.
///
/// Nested tables are skipped along with their text. A cell spanning `n` grid
/// columns is emitted `n` times, and a vertically merged continuation cell
/// repeats the text of the cell that started the merge.
pub(crate) fn docx_tables(xml: &str) -> std::result::Result<Vec<Table>, quick_xml::Error> {
    let mut reader = XmlReader::from_str(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();

    let mut tables = Vec::new();
    let mut depth = 0usize;
    let mut table: Table = Vec::new();
    let mut row: Row = Vec::new();
    // Last text seen in each grid column of the current table.
    let mut above: Row = Vec::new();
    let mut cell = CellState::default();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"tbl" => {
                    depth += 1;
                    if depth == 1 {
                        table.clear();
                        above.clear();
                    }
                }
                b"tr" if depth == 1 => row.clear(),
                b"tc" if depth == 1 => cell = CellState::default(),
                b"r" if depth == 1 => cell.in_run = true,
                b"t" => in_text = depth == 1,
                other => cell.inline_element(other, e, depth),
            },
            Event::Empty(ref e) => cell.inline_element(e.local_name().as_ref(), e, depth),
            Event::Text(e) => {
                if in_text {
                    cell.text.push_str(&e.unescape()?);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"tbl" => {
                    if depth == 1 {
                        tables.push(mem::take(&mut table));
                    }
                    depth = depth.saturating_sub(1);
                }
                b"tr" if depth == 1 => table.push(mem::take(&mut row)),
                b"tc" if depth == 1 => {
                    let column = row.len();
                    let text = if cell.continues_merge {
                        above.get(column).cloned().unwrap_or_default()
                    } else {
                        cell.text.trim().to_string()
                    };
                    if above.len() < column + cell.span {
                        above.resize(column + cell.span, String::new());
                    }
                    for slot in &mut above[column..column + cell.span] {
                        slot.clone_from(&text);
                        row.push(text.clone());
                    }
                }
                b"r" if depth == 1 => cell.in_run = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(tables)
}

/// Text and layout of the top-level cell being read.
struct CellState {
    text: String,
    span: usize,
    continues_merge: bool,
    in_run: bool,
}

impl Default for CellState {
    fn default() -> Self {
        Self {
            text: String::new(),
            span: 1,
            continues_merge: false,
            in_run: false,
        }
    }
}

impl CellState {
    fn inline_element(&mut self, name: &[u8], e: &BytesStart, depth: usize) {
        if depth != 1 {
            return;
        }
        match name {
            b"p" => {
                if !self.text.is_empty() {
                    self.text.push('\n');
                }
            }
            // Outside a run, `tab` is a tab-stop definition in paragraph properties.
            b"tab" if self.in_run => self.text.push('\t'),
            b"br" | b"cr" if self.in_run => self.text.push('\n'),
            b"gridSpan" => {
                self.span = attr_val(e)
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(1)
                    .max(1);
            }
            b"vMerge" => {
                self.continues_merge = attr_val(e).map_or(true, |v| v == "continue");
            }
            _ => {}
        }
    }
}

fn attr_val(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == b"val")
        .and_then(|a| {
            std::str::from_utf8(&a.value)
                .ok()
                .and_then(|s| quick_xml::escape::unescape(s).ok().map(|v| v.into_owned()))
        })
}

/// Read every worksheet of a spreadsheet, one table per sheet
pub fn read_spreadsheet(path: &Path) -> Result<Vec<Table>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| WordTestError::unreadable(path, format!("failed to open workbook: {}", e)))?;

    let mut tables = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| WordTestError::unreadable(path, format!("failed to read sheet {}: {}", sheet_name, e)))?;
        tables.push(range.rows().map(|r| r.iter().map(get_cell_string).collect()).collect());
    }
    Ok(tables)
}

/// Read a CSV file as a single table (no header row, ragged rows allowed)
pub fn read_csv(path: &Path) -> Result<Vec<Table>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| WordTestError::unreadable(path, format!("failed to open CSV file: {}", e)))?;

    let mut table = Vec::new();
    for result in reader.records() {
        let record =
            result.map_err(|e| WordTestError::unreadable(path, format!("failed to read CSV row: {}", e)))?;
        table.push(record.iter().map(|s| s.trim().to_string()).collect());
    }
    Ok(vec![table])
}

/// Helper to extract string from a spreadsheet cell
fn get_cell_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}
