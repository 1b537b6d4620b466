//! End-to-end tests: word list document -> parsed lessons -> rendered test.
//!
//! Fixtures are real .docx packages assembled in a temp dir.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use wordtest_core::{
    parse_document, process, try_process, GeneratorConfig, ParserOptions, WordTestError,
};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn write_docx(path: &Path, body: &str) {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}"><w:body>{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#,
        W_NS, body
    );
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = FileOptions::default();
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(document.as_bytes()).unwrap();
    zip.finish().unwrap();
}

fn read_document_xml(path: &Path) -> String {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name("word/document.xml").unwrap();
    let mut xml = String::new();
    entry.read_to_string(&mut xml).unwrap();
    xml
}

fn paragraph(text: &str) -> String {
    format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", text)
}

fn table(rows: &[&[&str]]) -> String {
    let mut xml = String::from("<w:tbl>");
    for row in rows {
        xml.push_str("<w:tr>");
        for cell in row.iter() {
            xml.push_str(&format!("<w:tc>{}</w:tc>", paragraph(cell)));
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

fn word_list(dir: &Path) -> PathBuf {
    let path = dir.join("words.docx");
    let body = format!(
        "{}{}{}{}",
        paragraph("Lesson 1"),
        table(&[
            &["No", "Words", "Part", "Translation"],
            &["1", "apple", "n.", "사과"],
            &["2", "book", "n.", "책"],
            &["3", "cat", "n.", "고양이"],
        ]),
        paragraph("Lesson 2"),
        table(&[
            &["No.", "WORDS", "Part", "Example", "Meaning"],
            &["1", "house", "n.", "a big house", "집"],
            &["2", "home", "n.", "go home", "집"],
        ]),
    );
    write_docx(&path, &body);
    path
}

fn template(dir: &Path) -> PathBuf {
    let path = dir.join("template.docx");
    let mut body = paragraph("Lesson {{ lesson_number }} {{ kind }}");
    for i in 0..6 {
        body.push_str(&paragraph(&format!(
            "{{{{ number[{i}] }}}}|{{{{ words[{i}] }}}}|{{{{ translations[{i}] }}}}"
        )));
    }
    write_docx(&path, &body);
    path
}

fn seeded(seed: u64) -> GeneratorConfig {
    GeneratorConfig {
        seed: Some(seed),
        ..GeneratorConfig::default()
    }
}

#[test]
fn parses_lessons_from_docx() {
    let dir = tempfile::tempdir().unwrap();
    let lessons = parse_document(&word_list(dir.path()), ParserOptions::default()).unwrap();
    assert_eq!(lessons.lesson_count(), 2);
    let terms: Vec<_> = lessons.get(1).iter().map(|p| (p.term.as_str(), p.translation.as_str())).collect();
    assert_eq!(terms, vec![("apple", "사과"), ("book", "책"), ("cat", "고양이")]);
    let terms: Vec<_> = lessons.get(2).iter().map(|p| (p.term.as_str(), p.translation.as_str())).collect();
    assert_eq!(terms, vec![("house", "집"), ("home", "집")]);
}

#[test]
fn generates_four_pages_per_lesson() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("words_Answer.docx");
    let summary = try_process(&word_list(dir.path()), &template(dir.path()), &output, &seeded(3)).unwrap();
    assert_eq!(summary.lessons, 2);
    assert_eq!(summary.pairs, 5);
    assert_eq!(summary.pages, 8);

    let xml = read_document_xml(&output);
    assert_eq!(xml.matches(r#"w:type="page""#).count(), 7);
    assert_eq!(xml.matches("Lesson 1 quiz").count(), 2);
    assert_eq!(xml.matches("Lesson 1 answer").count(), 2);
    assert_eq!(xml.matches("Lesson 2 answer").count(), 2);
    for line in ["apple 사과", "book 책", "cat 고양이", "사과 apple", "고양이 cat"] {
        assert!(xml.contains(line), "missing {line}");
    }
    // colliding translations go to distinct terms
    assert!(xml.contains("집 house"));
    assert!(xml.contains("집 home"));
    assert!(!xml.contains("{{"));
    // section properties stay once, at the end of the body
    assert_eq!(xml.matches("<w:sectPr>").count(), 1);

    let archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
    assert!(archive.file_names().any(|n| n == "[Content_Types].xml"));
}

#[test]
fn lesson_two_backfills_from_lesson_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.docx");
    try_process(&word_list(dir.path()), &template(dir.path()), &output, &seeded(11)).unwrap();
    let xml = read_document_xml(&output);

    // The lesson 2 quiz-terms page lists all five available words.
    let start = xml.find("Lesson 2 quiz").unwrap();
    let page = &xml[start..start + xml[start..].find(r#"w:type="page""#).unwrap()];
    for term in ["house", "home", "apple", "book", "cat"] {
        assert!(page.contains(&format!("|{}|", term)), "missing {term}");
    }
    assert!(page.contains("5|"));
    assert!(!page.contains("6|"));
}

#[test]
fn seeded_runs_are_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let input = word_list(dir.path());
    let template = template(dir.path());
    let first = dir.path().join("a.docx");
    let second = dir.path().join("b.docx");
    try_process(&input, &template, &first, &seeded(99)).unwrap();
    try_process(&input, &template, &second, &seeded(99)).unwrap();
    assert_eq!(read_document_xml(&first), read_document_xml(&second));
}

#[test]
fn script_correction_in_real_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swapped.docx");
    write_docx(
        &path,
        &table(&[
            &["No", "Words", "Example", "Translation", "Notes"],
            &["1", "river", "n.", "The river is wide.", "강"],
        ]),
    );
    let lessons = parse_document(&path, ParserOptions::default()).unwrap();
    assert_eq!(lessons.get(1)[0].translation, "강");
}

#[test]
fn missing_template_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.docx");
    let err = try_process(
        &word_list(dir.path()),
        &dir.path().join("nope.docx"),
        &output,
        &GeneratorConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, WordTestError::TemplateUnavailable { .. }));
    assert!(!process(&word_list(dir.path()), &dir.path().join("nope.docx"), &output));
    assert!(!output.exists());
}

#[test]
fn document_without_lessons_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.docx");
    write_docx(&input, &format!("{}{}", paragraph("Nothing here"), table(&[&["Name", "Date"]])));
    let output = dir.path().join("out.docx");
    let err = try_process(&input, &template(dir.path()), &output, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, WordTestError::NoLessonsFound { lessons: 0, pairs: 0 }));
    assert!(!output.exists());
}

#[test]
fn unreadable_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("words.docx");
    std::fs::write(&input, "plain text pretending to be docx").unwrap();
    let output = dir.path().join("out.docx");
    let err = try_process(&input, &template(dir.path()), &output, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, WordTestError::SourceUnreadable { .. }));
    assert!(err.is_input_error());
    assert!(!process(&input, &template(dir.path()), &output));
}

#[test]
fn process_reports_success() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("ok.docx");
    assert!(process(&word_list(dir.path()), &template(dir.path()), &output));
    assert!(output.exists());
}

#[test]
fn csv_word_list() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("words.csv");
    std::fs::write(&input, "No,Words,Meaning\n1,sun,해\n2,moon,달\nNo,Words,Meaning\n1,star,별\n").unwrap();
    let output = dir.path().join("out.docx");
    let summary = try_process(&input, &template(dir.path()), &output, &seeded(1)).unwrap();
    assert_eq!(summary.lessons, 2);
    assert_eq!(summary.pairs, 3);
    assert!(read_document_xml(&output).contains("별 star"));
}
