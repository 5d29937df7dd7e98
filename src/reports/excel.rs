use rust_xlsxwriter::{Format, Workbook, XlsxError};

use super::{Cell, ReportDocument};

const MAX_SHEET_NAME: usize = 31;

/// One worksheet per table; the document title goes in the first row.
pub fn render(doc: &ReportDocument) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    for table in &doc.tables {
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name(&table.title))?;
        sheet.write_string_with_format(0, 0, &doc.title, &bold)?;
        sheet.write_string(1, 0, &table.title)?;

        let header_row = 3;
        for (col, header) in table.headers.iter().enumerate() {
            let col = col as u16;
            sheet.write_string_with_format(header_row, col, header, &bold)?;
            sheet.set_column_width(col, column_width(header))?;
        }

        for (offset, row) in table.rows.iter().enumerate() {
            let row_index = header_row + 1 + offset as u32;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(text) => sheet.write_string(row_index, col as u16, text)?,
                    Cell::Number(value) => sheet.write_number(row_index, col as u16, *value)?,
                };
            }
        }
    }

    if doc.tables.is_empty() {
        let sheet = workbook.add_worksheet();
        sheet.write_string_with_format(0, 0, &doc.title, &bold)?;
        sheet.write_string(2, 0, "No data")?;
    }

    workbook.save_to_buffer()
}

/// Excel forbids some characters in sheet names and caps their length
fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '-',
            other => other,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}

fn column_width(header: &str) -> f64 {
    (header.chars().count() as f64 + 4.0).max(12.0)
}
