//! PDF rendering through `lopdf`.
//!
//! Emits A4 pages of text using the standard Helvetica fonts, which every
//! viewer provides, so nothing needs embedding. Tables are drawn as text
//! placed at fixed column offsets.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use super::{Cell, ReportDocument, ReportError};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 40;
const LINE_HEIGHT: i64 = 14;
const FONT_SIZE: i64 = 9;
/// Rough Helvetica advance used to clip cell text to its column
const AVG_CHAR_WIDTH: f64 = FONT_SIZE as f64 * 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

struct Run {
    x: i64,
    y: i64,
    size: i64,
    font: Font,
    text: String,
}

/// Lays text out top to bottom, starting a new page when one fills up.
struct Layout {
    pages: Vec<Vec<Run>>,
    y: i64,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ensure_room(&mut self, height: i64) {
        if self.y - height < MARGIN {
            self.pages.push(Vec::new());
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn line(&mut self, cells: Vec<(i64, String)>, font: Font, size: i64) {
        let height = size + (LINE_HEIGHT - FONT_SIZE);
        self.ensure_room(height);
        self.y -= height;
        let y = self.y;
        if let Some(page) = self.pages.last_mut() {
            page.extend(cells.into_iter().map(|(x, text)| Run { x, y, size, font, text }));
        }
    }

    fn gap(&mut self) {
        self.y -= LINE_HEIGHT / 2;
    }
}

pub fn render(doc: &ReportDocument) -> Result<Vec<u8>, ReportError> {
    let mut layout = Layout::new();
    layout.line(vec![(MARGIN, doc.title.clone())], Font::Bold, 14);
    layout.gap();

    if doc.tables.is_empty() {
        layout.line(vec![(MARGIN, "No data".to_string())], Font::Regular, FONT_SIZE);
    }

    for table in &doc.tables {
        layout.gap();
        layout.line(vec![(MARGIN, table.title.clone())], Font::Bold, 11);

        let columns = table.headers.len().max(1) as i64;
        let width = (PAGE_WIDTH - 2 * MARGIN) / columns;
        let max_chars = ((width as f64 / AVG_CHAR_WIDTH) as usize).saturating_sub(1).max(3);
        let place = |texts: Vec<String>| -> Vec<(i64, String)> {
            texts
                .into_iter()
                .enumerate()
                .map(|(i, t)| (MARGIN + i as i64 * width, clip(&t, max_chars)))
                .collect()
        };

        layout.line(place(table.headers.clone()), Font::Bold, FONT_SIZE);
        for row in &table.rows {
            layout.line(place(row.iter().map(Cell::display).collect()), Font::Regular, FONT_SIZE);
        }
    }

    assemble(&layout.pages)
}

fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max_chars.saturating_sub(2)).collect();
    clipped.push_str("..");
    clipped
}

/// Standard fonts only cover Latin text; anything outside printable ASCII
/// becomes '?'
fn printable(text: &str) -> String {
    text.chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { '?' })
        .collect()
}

fn page_content(runs: &[Run]) -> Content {
    let mut operations = Vec::with_capacity(runs.len() * 5);
    for run in runs {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![Object::Name(run.font.resource().into()), Object::Integer(run.size)],
        ));
        operations.push(Operation::new(
            "Td",
            vec![Object::Integer(run.x), Object::Integer(run.y)],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(printable(&run.text))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    Content { operations }
}

fn font(doc: &mut Document, base: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    })
}

fn assemble(pages: &[Vec<Run>]) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let regular = font(&mut doc, "Helvetica");
    let bold = font(&mut doc, "Helvetica-Bold");
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for runs in pages {
        let content = page_content(runs).encode()?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::Table;

    fn sample(rows: usize) -> ReportDocument {
        ReportDocument {
            title: "Subject Report (Data Structures)".to_string(),
            tables: vec![Table {
                title: "Marks".to_string(),
                headers: vec!["Student".to_string(), "Total".to_string()],
                rows: (0..rows)
                    .map(|i| vec![Cell::text(format!("Student {}", i)), Cell::Number(i as f64)])
                    .collect(),
            }],
        }
    }

    #[test]
    fn output_is_a_pdf_document() {
        let bytes = render(&sample(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));

        let parsed = Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 1);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("Subject Report"));
        assert!(text.contains("(Student 2) Tj"));
    }

    #[test]
    fn long_tables_span_pages() {
        let bytes = render(&sample(200)).unwrap();
        let parsed = Document::load_mem(&bytes).unwrap();
        assert!(parsed.get_pages().len() > 1);
        assert!(String::from_utf8_lossy(&bytes).contains("(Student 199) Tj"));
    }

    #[test]
    fn empty_document_still_has_a_page() {
        let doc = ReportDocument {
            title: "Students Report".to_string(),
            tables: vec![],
        };
        let bytes = render(&doc).unwrap();
        let parsed = Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 1);
        assert!(String::from_utf8_lossy(&bytes).contains("(No data) Tj"));
    }

    #[test]
    fn replaces_unprintable_and_clips() {
        assert_eq!(printable("Ren\u{e9}e (2)"), "Ren?e (2)");
        assert_eq!(clip("abcdefgh", 5), "abc..");
        assert_eq!(clip("abc", 5), "abc");
    }
}
