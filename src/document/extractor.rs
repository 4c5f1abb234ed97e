//! Plain-text extraction for the detection workflow

use super::archive::Package;
use super::{xml, DocumentFormat, DOCUMENT_PART};
use crate::domain::{DocmaskError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;

/// Extracts the text content of Word and Excel documents
pub struct DocumentTextExtractor;

impl DocumentTextExtractor {
    /// Extract text from `path`
    ///
    /// Word: paragraphs of the main document joined by newlines. Excel:
    /// every row of every sheet (workbook order) from A1 to the last used
    /// cell, cells joined by a space, each row ending with a newline.
    pub fn extract(path: &Path, format: DocumentFormat) -> Result<String> {
        match format {
            DocumentFormat::Word => Self::extract_word(path),
            DocumentFormat::Excel => Self::extract_excel(path),
        }
    }

    fn extract_word(path: &Path) -> Result<String> {
        let mut package = Package::open(path)?;
        let part = package
            .read_part(DOCUMENT_PART)?
            .ok_or_else(|| DocmaskError::MissingDocumentPart(DOCUMENT_PART.to_string()))?;
        Ok(xml::collect_text(&part.data, DOCUMENT_PART)?.joined())
    }

    fn extract_excel(path: &Path) -> Result<String> {
        let mut workbook = open_workbook_auto(path)?;
        let mut text = String::new();

        for sheet in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet)?;
            append_sheet(&mut text, &range);
        }

        Ok(text)
    }
}

/// Render a sheet anchored at A1
///
/// calamine trims the range to its used cells, so rows above and columns
/// left of the first used cell are restored as empty cells.
fn append_sheet(text: &mut String, range: &Range<Data>) {
    let Some((start_row, start_col)) = range.start() else {
        return;
    };
    let leading = vec![String::new(); start_col as usize];
    let width = start_col as usize + range.width();

    for _ in 0..start_row {
        text.push_str(&vec![""; width].join(" "));
        text.push('\n');
    }
    for row in range.rows() {
        let cells: Vec<String> = leading.iter().cloned().chain(row.iter().map(cell_text)).collect();
        text.push_str(&cells.join(" "));
        text.push('\n');
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("홍길동".to_string())), "홍길동");
        assert_eq!(cell_text(&Data::Float(42.0)), "42");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
    }

    #[test]
    fn test_append_sheet_offset_range() {
        let mut range = Range::new((1, 1), (2, 2));
        range.set_value((1, 1), Data::String("이름".to_string()));
        range.set_value((1, 2), Data::String("연락처".to_string()));
        range.set_value((2, 1), Data::String("홍길동".to_string()));
        range.set_value((2, 2), Data::String("010-1234-5678".to_string()));

        let mut text = String::new();
        append_sheet(&mut text, &range);
        assert_eq!(text, "  \n 이름 연락처\n 홍길동 010-1234-5678\n");
    }

    #[test]
    fn test_append_sheet_empty_range() {
        let mut text = String::new();
        append_sheet(&mut text, &Range::<Data>::empty());
        assert_eq!(text, "");
    }

    #[test]
    fn test_missing_file() {
        let result = DocumentTextExtractor::extract(Path::new("missing.docx"), DocumentFormat::Word);
        assert!(result.is_err());
    }
}
