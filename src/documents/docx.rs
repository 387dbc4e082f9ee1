//! DOCX loader backed by `docx-rs`

use std::path::Path;

use docx_rs::{
    DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild, Table,
    TableCellContent, TableChild, TableRowChild,
};

use super::{DocumentLoader, Segment};
use crate::{Error, Result};

/// Loads a Word document as a single segment, one line per paragraph
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxLoader;

impl DocumentLoader for DocxLoader {
    fn load(&self, path: &Path) -> Result<Vec<Segment>> {
        let bytes = std::fs::read(path)?;
        let text = docx_to_text(&bytes)?;
        Ok(vec![Segment::new(text, path.display().to_string())])
    }
}

/// Flatten the body of a DOCX archive to plain text
///
/// Body paragraphs and every paragraph inside a table cell each become one
/// line, in document order.
fn docx_to_text(bytes: &[u8]) -> Result<String> {
    let document = docx_rs::read_docx(bytes).map_err(|e| Error::Docx(e.to_string()))?;

    let mut lines = Vec::new();
    for child in &document.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => lines.push(paragraph_text(paragraph)),
            DocumentChild::Table(table) => table_lines(table, &mut lines),
            _ => {}
        }
    }

    Ok(lines.join("\n"))
}

fn table_lines(table: &Table, lines: &mut Vec<String>) {
    for TableChild::TableRow(row) in &table.rows {
        for TableRowChild::TableCell(cell) in &row.cells {
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(paragraph) => lines.push(paragraph_text(paragraph)),
                    TableCellContent::Table(nested) => table_lines(nested, lines),
                    _ => {}
                }
            }
        }
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut line = String::new();
    push_children(&paragraph.children, &mut line);
    line
}

fn push_children(children: &[ParagraphChild], line: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, line),
            ParagraphChild::Hyperlink(link) => push_children(&link.children, line),
            ParagraphChild::Insert(insert) => {
                for child in &insert.children {
                    if let InsertChild::Run(run) = child {
                        push_run(run, line);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run(run: &Run, line: &mut String) {
    for node in &run.children {
        match node {
            RunChild::Text(t) => line.push_str(&t.text),
            RunChild::Tab(_) => line.push('\t'),
            RunChild::Break(_) => line.push('\n'),
            _ => {}
        }
    }
}
