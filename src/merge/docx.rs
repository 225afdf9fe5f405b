//! Minimal WordprocessingML package writer.
//!
//! Emits a single-section document with one header and one footer part.
//! Each of them optionally holds an inline banner picture.

use chrono::Utc;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io;

use super::archive::ZipBuilder;
use super::banner::{BannerEdge, BannerImage, BannerSet};
use super::layout::{BannerBox, PageGeometry, TextDirection};
use super::MergeError;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const NS_PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE_PROPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_EXTENDED_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_HEADER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
const REL_FOOTER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

const CT_MAIN: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const CT_HEADER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";
const CT_FOOTER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";
const CT_RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// A body paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paragraph {
    Text { text: String, bold: bool },
    /// Empty paragraph with no run.
    Spacer,
}

impl Paragraph {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            bold: true,
        }
    }
}

/// Everything needed to serialize one letter.
#[derive(Debug, Clone)]
pub struct LetterDocument<'a> {
    pub geometry: PageGeometry,
    pub font_name: &'a str,
    /// Points
    pub font_size: u32,
    pub direction: TextDirection,
    pub paragraphs: Vec<Paragraph>,
    pub banners: &'a BannerSet,
}

impl LetterDocument<'_> {
    /// Package the document as `.docx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MergeError> {
        let mut zip = ZipBuilder::new();

        zip.add("[Content_Types].xml", &content_types()?)?;
        zip.add("_rels/.rels", &package_rels()?)?;
        zip.add("docProps/core.xml", &core_properties()?)?;
        zip.add("docProps/app.xml", &app_properties()?)?;
        zip.add("word/document.xml", &self.document_part()?)?;
        zip.add("word/styles.xml", &self.styles_part()?)?;
        zip.add("word/_rels/document.xml.rels", &document_rels()?)?;

        for edge in [BannerEdge::Top, BannerEdge::Bottom] {
            let part = part_name(edge);
            let image = self.banners.get(edge);
            let placement = match edge {
                BannerEdge::Top => self.geometry.top_banner,
                BannerEdge::Bottom => self.geometry.bottom_banner,
            };
            let banner = image.zip(placement);

            zip.add(&format!("word/{part}.xml"), &header_footer_part(edge, banner)?)?;
            zip.add(&format!("word/_rels/{part}.xml.rels"), &image_rels(edge, image)?)?;
            if let Some(image) = image {
                zip.add(&format!("word/{}", media_target(edge, image)), &image.bytes)?;
            }
        }

        Ok(zip.finish()?)
    }

    fn document_part(&self) -> io::Result<Vec<u8>> {
        let mut xml = Xml::new()?;
        xml.open("w:document", &[("xmlns:w", NS_W), ("xmlns:r", NS_R)])?;
        xml.open("w:body", &[])?;

        for paragraph in &self.paragraphs {
            match paragraph {
                Paragraph::Spacer => xml.empty("w:p", &[])?,
                Paragraph::Text { text, bold } => self.write_paragraph(&mut xml, text, *bold)?,
            }
        }

        let g = &self.geometry;
        xml.open("w:sectPr", &[])?;
        xml.empty("w:headerReference", &[("w:type", "default"), ("r:id", "rId2")])?;
        xml.empty("w:footerReference", &[("w:type", "default"), ("r:id", "rId3")])?;
        xml.empty(
            "w:pgSz",
            &[
                ("w:w", g.page_width.twips().to_string().as_str()),
                ("w:h", g.page_height.twips().to_string().as_str()),
            ],
        )?;
        xml.empty(
            "w:pgMar",
            &[
                ("w:top", g.margin_top.twips().to_string().as_str()),
                ("w:right", g.margin_right.twips().to_string().as_str()),
                ("w:bottom", g.margin_bottom.twips().to_string().as_str()),
                ("w:left", g.margin_left.twips().to_string().as_str()),
                ("w:header", g.header_distance.twips().to_string().as_str()),
                ("w:footer", g.footer_distance.twips().to_string().as_str()),
                ("w:gutter", "0"),
            ],
        )?;
        xml.close("w:sectPr")?;

        xml.close("w:body")?;
        xml.close("w:document")?;
        Ok(xml.finish())
    }

    fn write_paragraph(&self, xml: &mut Xml, text: &str, bold: bool) -> io::Result<()> {
        let rtl = self.direction.is_rtl();
        xml.open("w:p", &[])?;

        // A bidi paragraph without jc starts at the right edge.
        xml.open("w:pPr", &[])?;
        if rtl {
            xml.empty("w:bidi", &[])?;
        } else {
            xml.empty("w:jc", &[("w:val", "left")])?;
        }
        xml.close("w:pPr")?;

        xml.open("w:r", &[])?;
        xml.open("w:rPr", &[])?;
        write_fonts(xml, self.font_name)?;
        if bold {
            xml.empty("w:b", &[])?;
            xml.empty("w:bCs", &[])?;
        }
        let half_points = self.font_size.saturating_mul(2).to_string();
        xml.empty("w:sz", &[("w:val", half_points.as_str())])?;
        xml.empty("w:szCs", &[("w:val", half_points.as_str())])?;
        if rtl {
            xml.empty("w:rtl", &[])?;
        }
        xml.close("w:rPr")?;
        write_run_text(xml, text)?;
        xml.close("w:r")?;

        xml.close("w:p")
    }

    fn styles_part(&self) -> io::Result<Vec<u8>> {
        let half_points = self.font_size.saturating_mul(2).to_string();
        let mut xml = Xml::new()?;
        xml.open("w:styles", &[("xmlns:w", NS_W)])?;
        xml.open("w:docDefaults", &[])?;
        xml.open("w:rPrDefault", &[])?;
        xml.open("w:rPr", &[])?;
        write_fonts(&mut xml, self.font_name)?;
        xml.empty("w:sz", &[("w:val", half_points.as_str())])?;
        xml.empty("w:szCs", &[("w:val", half_points.as_str())])?;
        xml.close("w:rPr")?;
        xml.close("w:rPrDefault")?;
        xml.close("w:docDefaults")?;

        xml.open(
            "w:style",
            &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")],
        )?;
        xml.empty("w:name", &[("w:val", "Normal")])?;
        xml.empty("w:qFormat", &[])?;
        xml.close("w:style")?;

        xml.close("w:styles")?;
        Ok(xml.finish())
    }
}

/// Writes run content. Tabs become `w:tab`, vertical tabs, form feeds and
/// newlines become `w:br`; other characters XML 1.0 forbids are dropped.
fn write_run_text(xml: &mut Xml, text: &str) -> io::Result<()> {
    if text.is_empty() {
        // Blank header values keep their line
        xml.open("w:t", &[("xml:space", "preserve")])?;
        return xml.close("w:t");
    }
    let mut pending = String::new();
    for c in text.chars() {
        let element = match c {
            '\t' => "w:tab",
            '\n' | '\u{0B}' | '\u{0C}' => "w:br",
            '\r' => continue,
            c if is_xml_char(c) => {
                pending.push(c);
                continue;
            }
            _ => continue,
        };
        flush_text(xml, &mut pending)?;
        xml.empty(element, &[])?;
    }
    flush_text(xml, &mut pending)
}

fn flush_text(xml: &mut Xml, pending: &mut String) -> io::Result<()> {
    if pending.is_empty() {
        return Ok(());
    }
    xml.open("w:t", &[("xml:space", "preserve")])?;
    xml.text(pending)?;
    pending.clear();
    xml.close("w:t")
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

fn write_fonts(xml: &mut Xml, font: &str) -> io::Result<()> {
    xml.empty(
        "w:rFonts",
        &[
            ("w:ascii", font),
            ("w:hAnsi", font),
            ("w:cs", font),
            ("w:eastAsia", font),
        ],
    )
}

fn part_name(edge: BannerEdge) -> &'static str {
    match edge {
        BannerEdge::Top => "header1",
        BannerEdge::Bottom => "footer1",
    }
}

fn media_target(edge: BannerEdge, image: &BannerImage) -> String {
    format!("media/banner_{}.{}", edge, image.kind.extension())
}

fn header_footer_part(edge: BannerEdge, banner: Option<(&BannerImage, BannerBox)>) -> io::Result<Vec<u8>> {
    let root = match edge {
        BannerEdge::Top => "w:hdr",
        BannerEdge::Bottom => "w:ftr",
    };

    let mut xml = Xml::new()?;
    xml.open(
        root,
        &[
            ("xmlns:w", NS_W),
            ("xmlns:r", NS_R),
            ("xmlns:wp", NS_WP),
            ("xmlns:a", NS_A),
            ("xmlns:pic", NS_PIC),
        ],
    )?;

    match banner {
        None => xml.empty("w:p", &[])?,
        Some((image, placement)) => write_banner_paragraph(&mut xml, edge, image, placement)?,
    }

    xml.close(root)?;
    Ok(xml.finish())
}

fn write_banner_paragraph(
    xml: &mut Xml,
    edge: BannerEdge,
    image: &BannerImage,
    placement: BannerBox,
) -> io::Result<()> {
    let cx = placement.width.emu().to_string();
    let cy = placement.height.emu().to_string();
    let (doc_pr_id, title) = match edge {
        BannerEdge::Top => ("1", "Top banner"),
        BannerEdge::Bottom => ("2", "Bottom banner"),
    };
    let file_name = format!("banner_{}.{}", edge, image.kind.extension());

    xml.open("w:p", &[])?;
    xml.open("w:pPr", &[])?;
    xml.empty(
        "w:spacing",
        &[("w:before", "0"), ("w:after", "0"), ("w:line", "240"), ("w:lineRule", "auto")],
    )?;
    if placement.outdent_left.emu() > 0 || placement.outdent_right.emu() > 0 {
        xml.empty(
            "w:ind",
            &[
                ("w:left", format!("-{}", placement.outdent_left.twips()).as_str()),
                ("w:right", format!("-{}", placement.outdent_right.twips()).as_str()),
            ],
        )?;
    }
    xml.empty("w:jc", &[("w:val", "left")])?;
    xml.close("w:pPr")?;

    xml.open("w:r", &[])?;
    xml.open("w:drawing", &[])?;
    xml.open(
        "wp:inline",
        &[("distT", "0"), ("distB", "0"), ("distL", "0"), ("distR", "0")],
    )?;
    xml.empty("wp:extent", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    xml.empty("wp:docPr", &[("id", doc_pr_id), ("name", title)])?;
    xml.open("wp:cNvGraphicFramePr", &[])?;
    xml.empty("a:graphicFrameLocks", &[("noChangeAspect", "1")])?;
    xml.close("wp:cNvGraphicFramePr")?;

    xml.open("a:graphic", &[])?;
    xml.open("a:graphicData", &[("uri", NS_PIC)])?;
    xml.open("pic:pic", &[])?;

    xml.open("pic:nvPicPr", &[])?;
    xml.empty("pic:cNvPr", &[("id", "0"), ("name", file_name.as_str())])?;
    xml.empty("pic:cNvPicPr", &[])?;
    xml.close("pic:nvPicPr")?;

    xml.open("pic:blipFill", &[])?;
    xml.empty("a:blip", &[("r:embed", "rId1")])?;
    xml.open("a:stretch", &[])?;
    xml.empty("a:fillRect", &[])?;
    xml.close("a:stretch")?;
    xml.close("pic:blipFill")?;

    xml.open("pic:spPr", &[])?;
    xml.open("a:xfrm", &[])?;
    xml.empty("a:off", &[("x", "0"), ("y", "0")])?;
    xml.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    xml.close("a:xfrm")?;
    xml.open("a:prstGeom", &[("prst", "rect")])?;
    xml.empty("a:avLst", &[])?;
    xml.close("a:prstGeom")?;
    xml.close("pic:spPr")?;

    xml.close("pic:pic")?;
    xml.close("a:graphicData")?;
    xml.close("a:graphic")?;
    xml.close("wp:inline")?;
    xml.close("w:drawing")?;
    xml.close("w:r")?;
    xml.close("w:p")
}

fn content_types() -> io::Result<Vec<u8>> {
    let mut xml = Xml::new()?;
    xml.open("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    xml.empty("Default", &[("Extension", "rels"), ("ContentType", CT_RELS)])?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    xml.empty("Default", &[("Extension", "png"), ("ContentType", "image/png")])?;
    xml.empty("Default", &[("Extension", "jpeg"), ("ContentType", "image/jpeg")])?;
    for (part, content_type) in [
        ("/word/document.xml", CT_MAIN),
        ("/word/styles.xml", CT_STYLES),
        ("/word/header1.xml", CT_HEADER),
        ("/word/footer1.xml", CT_FOOTER),
        ("/docProps/core.xml", CT_CORE),
        ("/docProps/app.xml", CT_APP),
    ] {
        xml.empty("Override", &[("PartName", part), ("ContentType", content_type)])?;
    }
    xml.close("Types")?;
    Ok(xml.finish())
}

fn relationships(rels: &[(&str, &str, &str)]) -> io::Result<Vec<u8>> {
    let mut xml = Xml::new()?;
    xml.open("Relationships", &[("xmlns", NS_PKG_RELS)])?;
    for &(id, kind, target) in rels {
        xml.empty("Relationship", &[("Id", id), ("Type", kind), ("Target", target)])?;
    }
    xml.close("Relationships")?;
    Ok(xml.finish())
}

fn package_rels() -> io::Result<Vec<u8>> {
    relationships(&[
        ("rId1", REL_OFFICE_DOCUMENT, "word/document.xml"),
        ("rId2", REL_CORE_PROPS, "docProps/core.xml"),
        ("rId3", REL_EXTENDED_PROPS, "docProps/app.xml"),
    ])
}

fn document_rels() -> io::Result<Vec<u8>> {
    relationships(&[
        ("rId1", REL_STYLES, "styles.xml"),
        ("rId2", REL_HEADER, "header1.xml"),
        ("rId3", REL_FOOTER, "footer1.xml"),
    ])
}

fn image_rels(edge: BannerEdge, image: Option<&BannerImage>) -> io::Result<Vec<u8>> {
    match image {
        Some(image) => relationships(&[("rId1", REL_IMAGE, media_target(edge, image).as_str())]),
        None => relationships(&[]),
    }
}

fn core_properties() -> io::Result<Vec<u8>> {
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let mut xml = Xml::new()?;
    xml.open(
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    xml.open("dc:creator", &[])?;
    xml.text(env!("CARGO_PKG_NAME"))?;
    xml.close("dc:creator")?;
    for tag in ["dcterms:created", "dcterms:modified"] {
        xml.open(tag, &[("xsi:type", "dcterms:W3CDTF")])?;
        xml.text(&now)?;
        xml.close(tag)?;
    }
    xml.close("cp:coreProperties")?;
    Ok(xml.finish())
}

fn app_properties() -> io::Result<Vec<u8>> {
    let mut xml = Xml::new()?;
    xml.open(
        "Properties",
        &[(
            "xmlns",
            "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
        )],
    )?;
    xml.open("Application", &[])?;
    xml.text(env!("CARGO_PKG_NAME"))?;
    xml.close("Application")?;
    xml.close("Properties")?;
    Ok(xml.finish())
}

/// Thin wrapper over `quick_xml::Writer` for element-at-a-time output.
struct Xml {
    writer: Writer<Vec<u8>>,
}

impl Xml {
    fn new() -> io::Result<Self> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(Self { writer })
    }

    fn start<'a>(name: &'a str, attrs: &[(&'a str, &'a str)]) -> BytesStart<'a> {
        let mut elem = BytesStart::new(name);
        for attr in attrs {
            elem.push_attribute(*attr);
        }
        elem
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
        self.writer.write_event(Event::Start(Self::start(name, attrs)))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
        self.writer.write_event(Event::Empty(Self::start(name, attrs)))
    }

    fn close(&mut self, name: &str) -> io::Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> io::Result<()> {
        if text.chars().all(is_xml_char) {
            return self.writer.write_event(Event::Text(BytesText::new(text)));
        }
        let cleaned: String = text.chars().filter(|&c| is_xml_char(c)).collect();
        self.writer.write_event(Event::Text(BytesText::new(&cleaned)))
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}
