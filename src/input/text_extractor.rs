//! Raw text extraction per document format

use crate::error::{Result, ScorerError};
use anyhow::Context;
use pulldown_cmark::{Event, Parser, Tag};
use quick_xml::events::Event as XmlEvent;
use quick_xml::reader::Reader;
use std::io::{Cursor, Read};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            ScorerError::PdfExtraction(format!(
                "Failed to extract text from PDF '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        docx_to_text(&bytes).map_err(|e| {
            ScorerError::DocxExtraction(format!(
                "Failed to extract text from DOCX '{}': {:#}",
                path.display(),
                e
            ))
        })
    }
}

/// Paragraph text of a WordprocessingML package, one paragraph per line
pub fn docx_to_text(bytes: &[u8]) -> anyhow::Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).context("Not a DOCX archive")?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("Missing word/document.xml")?
        .read_to_string(&mut xml)
        .context("Unreadable word/document.xml")?;

    document_xml_to_text(&xml)
}

fn document_xml_to_text(xml: &str) -> anyhow::Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event().context("Malformed document XML")? {
            XmlEvent::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            XmlEvent::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            XmlEvent::Empty(e) => match e.name().as_ref() {
                b"w:tab" | b"w:br" => text.push(' '),
                b"w:p" => text.push('\n'),
                _ => {}
            },
            XmlEvent::Text(t) if in_run_text => {
                text.push_str(&t.unescape().context("Invalid XML escape")?)
            }
            XmlEvent::Eof => break,
            _ => {}
        }
    }

    Ok(non_empty_lines(&text))
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path).await?)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown = fs::read_to_string(path).await?;
        Ok(markdown_to_text(&markdown))
    }
}

/// Visible text of a Markdown document, one block per line
pub fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(Tag::Paragraph | Tag::Heading(..) | Tag::Item | Tag::CodeBlock(_)) => {
                text.push('\n')
            }
            _ => {}
        }
    }

    non_empty_lines(&text)
}

fn non_empty_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
