//! Page geometry and its effect on generated documents.

mod common;

use mailmerge_server::merge::layout::{Length, EMU_PER_INCH};
use mailmerge_server::merge::{
    BannerAssets, BannerFallback, LayoutConfig, LetterComposer, Margins, PageGeometry, PageSize, Row,
    Template, TextDirection,
};

use common::{png, zip_part};

fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

#[test]
fn test_edge_to_edge_banner_spans_page() {
    let layout = LayoutConfig::default().with_margins(Margins {
        top: 1.0,
        bottom: 1.0,
        left: 1.25,
        right: 0.75,
    });
    let geometry = PageGeometry::compute(&layout, Some((1700, 200)), None);
    let banner = geometry.top_banner.unwrap();

    assert_eq!(banner.width, PageSize::Letter.width());
    assert_eq!(banner.outdent_left.emu(), inches(1.25));
    assert_eq!(banner.outdent_right.emu(), inches(0.75));
    assert_eq!(geometry.margin_left.emu(), inches(1.25));
    assert_eq!(geometry.margin_right.emu(), inches(0.75));
    assert_eq!(geometry.header_distance, Length::ZERO);
    // 8.5in wide at 200/1700 is 1in tall; 1in + 0.35in gap clears the 1in margin
    assert_eq!(banner.height.emu(), inches(1.0));
    assert_eq!(geometry.margin_top.emu(), inches(1.0) + inches(0.35));
    assert_eq!(geometry.margin_bottom.emu(), inches(1.0));
}

#[test]
fn test_inset_banner_uses_content_width() {
    let layout = LayoutConfig::default().with_edge_to_edge(false);
    let geometry = PageGeometry::compute(&layout, None, Some((650, 100)));
    let banner = geometry.bottom_banner.unwrap();

    assert_eq!(banner.width, geometry.content_width());
    assert_eq!(banner.width.emu(), inches(6.5));
    assert_eq!(banner.outdent_left, Length::ZERO);
    assert_eq!(geometry.footer_distance.emu(), inches(0.5));
    assert_eq!(geometry.margin_top.emu(), inches(1.0));
    assert_eq!(geometry.margin_bottom.emu(), inches(0.5) + inches(1.0) + inches(0.35));
}

#[test]
fn test_a4_page_size_in_section() {
    let mut layout = LayoutConfig::default();
    layout.page_size = PageSize::A4;
    let template = Template::new("t", "x", "Body");

    let letter = LetterComposer::compose(&Row::new(), &layout, &template, &Default::default()).unwrap();
    let xml = zip_part(&letter.document, "word/document.xml");
    assert!(xml.contains(&format!("w:w=\"{}\"", PageSize::A4.width().twips())));
    assert!(xml.contains(&format!("w:h=\"{}\"", PageSize::A4.height().twips())));
}

#[test]
fn test_rtl_letter_markup() {
    let layout = LayoutConfig::for_direction(TextDirection::Rtl).with_header_fields(["FullName"]);
    let row = Row::new().with("FullName", "דנה כהן");
    let template = Template::new("t", "x", "שלום {{FullName}}");

    let letter = LetterComposer::compose(&row, &layout, &template, &Default::default()).unwrap();
    let xml = zip_part(&letter.document, "word/document.xml");

    assert!(xml.contains(">לכבוד,<"));
    assert!(xml.contains(">שלום דנה כהן<"));
    assert!(xml.contains("<w:bidi/>"));
    assert!(xml.contains("<w:rtl/>"));
    assert!(!xml.contains("w:jc"));
    assert!(xml.contains("w:ascii=\"David\""));
}

#[test]
fn test_edge_to_edge_banner_markup() {
    let banners = BannerAssets::new(Some(png(1700, 200)), None).resolve(&BannerFallback::none());
    let layout = LayoutConfig::default();
    let letter =
        LetterComposer::compose(&Row::new(), &layout, &Template::new("t", "x", "Body"), &banners).unwrap();

    let header = zip_part(&letter.document, "word/header1.xml");
    assert!(header.contains("w:left=\"-1440\""));
    assert!(header.contains("w:right=\"-1440\""));
    assert!(header.contains(&format!("cx=\"{}\"", PageSize::Letter.width().emu())));

    let xml = zip_part(&letter.document, "word/document.xml");
    assert!(xml.contains("w:header=\"0\""));
    assert!(xml.contains("w:left=\"1440\""));
}
