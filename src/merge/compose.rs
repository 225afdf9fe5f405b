use super::banner::{BannerImage, BannerSet};
use super::dispatch::Template;
use super::docx::{LetterDocument, Paragraph};
use super::layout::{LayoutConfig, PageGeometry};
use super::placeholder;
use super::row::Row;
use super::MergeError;

/// Output of [`LetterComposer::compose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedLetter {
    pub document: Vec<u8>,
    /// Body text after placeholder substitution.
    pub body: String,
}

/// Assembles one letter: salutation, header fields, spacer, then the body.
pub struct LetterComposer;

impl LetterComposer {
    pub fn compose(
        row: &Row,
        layout: &LayoutConfig,
        template: &Template,
        banners: &BannerSet,
    ) -> Result<ComposedLetter, MergeError> {
        let geometry = PageGeometry::compute(
            layout,
            banners.top.as_ref().map(BannerImage::dimensions),
            banners.bottom.as_ref().map(BannerImage::dimensions),
        );

        let body = placeholder::resolve(&template.body, row);

        let mut paragraphs = Vec::with_capacity(layout.header_fields.len() + 8);
        paragraphs.push(Paragraph::bold(layout.salutation.as_str()));
        paragraphs.extend(
            layout
                .header_fields
                .iter()
                .map(|field| Paragraph::text(row.get_or_empty(field))),
        );
        paragraphs.push(Paragraph::Spacer);
        paragraphs.extend(split_lines(&body).into_iter().map(Paragraph::text));

        let document = LetterDocument {
            geometry,
            font_name: &layout.font_name,
            font_size: layout.font_size,
            direction: layout.direction,
            paragraphs,
            banners,
        }
        .to_bytes()?;

        Ok(ComposedLetter { document, body })
    }
}

/// Split on `\r\n`, `\n` or `\r`. A trailing break adds no empty line.
pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn document_xml(bytes: &[u8]) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\r\nb\rc\nd"), ["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\n\nb\n"), ["a", "", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_compose_order_and_body() {
        let row = Row::new()
            .with("FullName", "Jane Doe")
            .with("City", "NYC")
            .with("Group", "Blue");
        let layout = LayoutConfig::default().with_header_fields(["FullName", "Missing", "FullName"]);
        let template = Template::new("blue", "Blue", "Hi {{FullName}} from {{City}}");

        let letter = LetterComposer::compose(&row, &layout, &template, &BannerSet::empty()).unwrap();
        assert_eq!(letter.body, "Hi Jane Doe from NYC");

        let xml = document_xml(&letter.document);
        let salutation = xml.find(">To,<").unwrap();
        let first_name = xml.find(">Jane Doe<").unwrap();
        let spacer = xml.find("<w:p/>").unwrap();
        let body = xml.find(">Hi Jane Doe from NYC<").unwrap();
        assert!(salutation < first_name && first_name < spacer && spacer < body);
        assert_eq!(xml.matches(">Jane Doe<").count(), 2);
        assert!(xml.contains("<w:t xml:space=\"preserve\"></w:t>"));
    }
}
