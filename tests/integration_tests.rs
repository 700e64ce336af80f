//! Integration tests for the pretty parser

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pretty_parser::{
    BatchRunner, PageExtractor, PdfPage, PrettyParserError, RunReport, SourceMode,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const FIXTURES: &str = "tests/fixtures/articles";

fn collected_text<'a>(report: &'a RunReport, suffix: &str) -> &'a str {
    report
        .collected()
        .unwrap()
        .iter()
        .find(|(id, _)| id.ends_with(suffix))
        .map(|(_, text)| text.as_str())
        .unwrap_or_else(|| panic!("no result for {}", suffix))
}

/// Write a PDF whose pages each show one line of Courier text.
fn write_pdf(path: &Path, lines: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for line in lines {
        let mut operations = Vec::new();
        if !line.is_empty() {
            operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ];
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// Returns a fixed text per page number; page 2 is empty.
struct NumberedPages;

impl PageExtractor for NumberedPages {
    fn extract_page(&self, page: &PdfPage<'_>) -> pretty_parser::Result<String> {
        Ok(match page.number() {
            2 => String::new(),
            n => format!("P{}", n),
        })
    }
}

struct PanickingPages;

impl PageExtractor for PanickingPages {
    fn extract_page(&self, _page: &PdfPage<'_>) -> pretty_parser::Result<String> {
        panic!("extractor exploded");
    }
}

#[test]
fn test_txt_directory_collect() {
    let report = BatchRunner::builder()
        .mode(SourceMode::Text)
        .directories([FIXTURES])
        .dehyphenate(true)
        .jobs(2)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(!report.has_failures());
    assert_eq!(report.stats.total, 2);
    assert_eq!(
        collected_text(&report, "wrapped.txt"),
        "The quick brown fox jumps over the lazy dog.\n\nA second paragraph follows."
    );
    assert_eq!(collected_text(&report, "heading.txt"), "PARIS, FRANCE");
}

#[test]
fn test_failing_item_does_not_abort_run() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "first\nline").unwrap();
    fs::write(dir.path().join("b.txt"), [0xff, 0xfe, 0xfd]).unwrap();
    fs::write(dir.path().join("c.txt"), "third").unwrap();

    let report = BatchRunner::builder()
        .mode(SourceMode::Text)
        .directories([dir.path()])
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.collected().unwrap().len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].id.ends_with("b.txt"));
    assert_eq!(report.stats.succeeded, 2);
    assert_eq!(collected_text(&report, "a.txt"), "first line");
}

#[test]
fn test_output_mirrors_directory_structure() {
    let out = TempDir::new().unwrap();

    let report = BatchRunner::builder()
        .mode(SourceMode::Text)
        .directories([FIXTURES])
        .output(out.path())
        .build()
        .unwrap()
        .run()
        .unwrap();

    let written = report.written().unwrap();
    assert_eq!(written.len(), 2);
    let heading = out.path().join("nested").join("heading.txt");
    assert!(written.contains(&heading));
    assert_eq!(fs::read_to_string(heading).unwrap(), "PARIS, FRANCE");
    assert!(out.path().join("wrapped.txt").exists());
    assert!(!out.path().join("ignored.txt").exists());
}

#[test]
fn test_existing_output_respects_overwrite() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let input = src.path().join("doc.txt");
    fs::write(&input, "fresh\ntext").unwrap();
    let target = out.path().join("doc.txt");
    fs::write(&target, "old").unwrap();

    let run = |overwrite: bool| {
        BatchRunner::builder()
            .mode(SourceMode::Text)
            .files([&input])
            .output(out.path())
            .overwrite(overwrite)
            .build()
            .unwrap()
            .run()
            .unwrap()
    };

    let report = run(false);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].message.contains("already exists"));
    assert_eq!(fs::read_to_string(&target).unwrap(), "old");

    let report = run(true);
    assert!(!report.has_failures());
    assert_eq!(fs::read_to_string(&target).unwrap(), "fresh text");
}

#[test]
fn test_missing_input_is_fatal() {
    let dir = TempDir::new().unwrap();
    let runner = BatchRunner::builder()
        .mode(SourceMode::Pdf)
        .files([dir.path().join("absent.pdf")])
        .build()
        .unwrap();

    let err = runner.run().unwrap_err();
    assert!(matches!(err, PrettyParserError::InvalidInput(_)));
}

#[test]
fn test_memory_mode_keys_by_index() {
    let report = BatchRunner::builder()
        .mode(SourceMode::Memory)
        .texts(["Hello,\nworld.", "  spaced   out  "])
        .build()
        .unwrap()
        .run()
        .unwrap();

    let texts = report.collected().unwrap();
    assert_eq!(texts["0"], "Hello, world.");
    assert_eq!(texts["1"], "spaced out");
}

#[test]
fn test_custom_page_extractor_skips_empty_pages() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("three.pdf");
    write_pdf(&pdf, &["", "", ""]);

    let report = BatchRunner::builder()
        .mode(SourceMode::Pdf)
        .files([&pdf])
        .page_extractor(Arc::new(NumberedPages))
        .page_separator("<S>")
        .apply_defaults(false)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(!report.has_failures());
    assert_eq!(collected_text(&report, "three.pdf"), "P1<S>P3");
}

#[test]
fn test_plain_strategy_reads_page_text() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("hello.pdf");
    write_pdf(&pdf, &["Hello", "World"]);

    let report = BatchRunner::builder()
        .mode(SourceMode::Pdf)
        .files([&pdf])
        .page_strategy("plain")
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(!report.has_failures());
    let text = collected_text(&report, "hello.pdf");
    assert!(text.contains("Hello"));
    assert!(text.contains("World"));
}

#[test]
fn test_panicking_extractor_is_isolated() {
    let dir = TempDir::new().unwrap();
    let pdfs: Vec<PathBuf> = ["one.pdf", "two.pdf"]
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            write_pdf(&path, &["x"]);
            path
        })
        .collect();

    let report = BatchRunner::builder()
        .mode(SourceMode::Pdf)
        .files(pdfs)
        .page_extractor(Arc::new(PanickingPages))
        .jobs(2)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.failures.len(), 2);
    assert!(report.failures[0].message.contains("extractor exploded"));
    assert!(report.collected().unwrap().is_empty());
}

#[test]
fn test_corrupt_pdf_fails_item() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.pdf");
    write_pdf(&good, &["x"]);
    fs::write(dir.path().join("bad.pdf"), b"not a pdf at all").unwrap();

    let report = BatchRunner::builder()
        .mode(SourceMode::Pdf)
        .directories([dir.path()])
        .page_extractor(Arc::new(NumberedPages))
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].id.ends_with("bad.pdf"));
    assert_eq!(collected_text(&report, "good.pdf"), "P1");
}
