//! Page geometry: margins, banner boxes and header/footer distances.
//!
//! All lengths are kept in EMU (English Metric Units, 914400 per inch), the
//! unit drawings use in WordprocessingML. Section properties want twips
//! (1/1440 inch), which is exactly 635 EMU.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};
use utoipa::ToSchema;

pub const EMU_PER_INCH: i64 = 914_400;
pub const EMU_PER_TWIP: i64 = 635;
pub const EMU_PER_POINT: i64 = 12_700;

/// Header/footer distance of a blank document.
pub const DEFAULT_HEADER_DISTANCE_IN: f64 = 0.5;

pub const DEFAULT_FONT: &str = "Arial";
pub const DEFAULT_RTL_FONT: &str = "David";
pub const DEFAULT_FONT_SIZE: u32 = 12;
pub const DEFAULT_SALUTATION: &str = "To,";
pub const DEFAULT_RTL_SALUTATION: &str = "לכבוד,";
pub const DEFAULT_MARGIN_IN: f64 = 1.0;
pub const DEFAULT_GAP_IN: f64 = 0.35;

/// A length in EMU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Length(i64);

impl Length {
    pub const ZERO: Length = Length(0);

    pub const fn from_emu(emu: i64) -> Self {
        Self(emu)
    }

    /// Non-finite and negative inputs become zero.
    pub fn from_inches(inches: f64) -> Self {
        if !inches.is_finite() || inches <= 0.0 {
            return Self::ZERO;
        }
        Self((inches * EMU_PER_INCH as f64).round() as i64)
    }

    pub const fn emu(self) -> i64 {
        self.0
    }

    pub fn twips(self) -> i64 {
        (self.0 as f64 / EMU_PER_TWIP as f64).round() as i64
    }

    pub fn inches(self) -> f64 {
        self.0 as f64 / EMU_PER_INCH as f64
    }

    /// `self * numerator / denominator`, rounded down. Zero when the
    /// denominator is zero.
    pub fn scale(self, numerator: u32, denominator: u32) -> Self {
        if denominator == 0 {
            return Self::ZERO;
        }
        let scaled = i128::from(self.0) * i128::from(numerator) / i128::from(denominator);
        Self(i64::try_from(scaled).unwrap_or(i64::MAX))
    }
}

impl Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        Length(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Length {
        Length(self.0.saturating_sub(rhs.0))
    }
}

/// Body margins in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Margins {
    #[schema(example = 1.0)]
    pub top: f64,
    #[schema(example = 1.0)]
    pub right: f64,
    #[schema(example = 1.0)]
    pub bottom: f64,
    #[schema(example = 1.0)]
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(DEFAULT_MARGIN_IN)
    }
}

impl Margins {
    pub fn uniform(inches: f64) -> Self {
        Self {
            top: inches,
            right: inches,
            bottom: inches,
            left: inches,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn is_rtl(self) -> bool {
        self == Self::Rtl
    }

    pub fn default_font(self) -> &'static str {
        match self {
            Self::Ltr => DEFAULT_FONT,
            Self::Rtl => DEFAULT_RTL_FONT,
        }
    }

    pub fn default_salutation(self) -> &'static str {
        match self {
            Self::Ltr => DEFAULT_SALUTATION,
            Self::Rtl => DEFAULT_RTL_SALUTATION,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// 8.5 x 11 in
    #[default]
    Letter,
    /// 210 x 297 mm
    A4,
}

impl PageSize {
    pub fn width(self) -> Length {
        match self {
            Self::Letter => Length::from_emu(7_772_400),
            Self::A4 => Length::from_emu(7_560_000),
        }
    }

    pub fn height(self) -> Length {
        match self {
            Self::Letter => Length::from_emu(10_058_400),
            Self::A4 => Length::from_emu(10_692_000),
        }
    }
}

/// Everything that shapes a letter except its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LayoutConfig {
    #[schema(example = "Arial")]
    pub font_name: String,
    /// Font size in points
    #[schema(example = 12)]
    pub font_size: u32,
    /// Bold first line of the letter
    #[schema(example = "To,")]
    pub salutation: String,
    /// Columns printed under the salutation, in this order
    pub header_fields: Vec<String>,
    pub margins: Margins,
    /// Stretch banners across the full page width
    pub edge_to_edge: bool,
    /// Space between a banner and the body text, in inches
    #[schema(example = 0.35)]
    pub gap: f64,
    pub direction: TextDirection,
    pub page_size: PageSize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::for_direction(TextDirection::Ltr)
    }
}

impl LayoutConfig {
    /// Defaults with the font and salutation of `direction`.
    pub fn for_direction(direction: TextDirection) -> Self {
        Self {
            font_name: direction.default_font().to_string(),
            font_size: DEFAULT_FONT_SIZE,
            salutation: direction.default_salutation().to_string(),
            header_fields: Vec::new(),
            margins: Margins::default(),
            edge_to_edge: true,
            gap: DEFAULT_GAP_IN,
            direction,
            page_size: PageSize::default(),
        }
    }

    pub fn with_header_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_edge_to_edge(mut self, edge_to_edge: bool) -> Self {
        self.edge_to_edge = edge_to_edge;
        self
    }
}

/// Placement of one banner image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerBox {
    pub width: Length,
    pub height: Length,
    /// Negative paragraph indents pulling the image past the margins.
    pub outdent_left: Length,
    pub outdent_right: Length,
}

/// Resolved section geometry for one letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    pub page_width: Length,
    pub page_height: Length,
    pub margin_top: Length,
    pub margin_right: Length,
    pub margin_bottom: Length,
    pub margin_left: Length,
    pub header_distance: Length,
    pub footer_distance: Length,
    pub top_banner: Option<BannerBox>,
    pub bottom_banner: Option<BannerBox>,
}

impl PageGeometry {
    /// Lay out the page for `layout` with banners of the given pixel sizes.
    ///
    /// Left and right body margins are always the configured ones. Top and
    /// bottom margins grow just enough to keep `gap` between a banner and
    /// the body text.
    pub fn compute(
        layout: &LayoutConfig,
        top_px: Option<(u32, u32)>,
        bottom_px: Option<(u32, u32)>,
    ) -> Self {
        let page_width = layout.page_size.width();
        let page_height = layout.page_size.height();
        let margin_left = Length::from_inches(layout.margins.left);
        let margin_right = Length::from_inches(layout.margins.right);
        let content_width = (page_width - margin_left - margin_right).max(Length::ZERO);
        let gap = Length::from_inches(layout.gap);

        let (banner_width, distance, outdent_left, outdent_right) = if layout.edge_to_edge {
            (page_width, Length::ZERO, margin_left, margin_right)
        } else {
            (
                content_width,
                Length::from_inches(DEFAULT_HEADER_DISTANCE_IN),
                Length::ZERO,
                Length::ZERO,
            )
        };

        let banner = |px: Option<(u32, u32)>| {
            px.filter(|(w, h)| *w > 0 && *h > 0).map(|(w, h)| BannerBox {
                width: banner_width,
                height: banner_width.scale(h, w),
                outdent_left,
                outdent_right,
            })
        };
        let top_banner = banner(top_px);
        let bottom_banner = banner(bottom_px);

        let clear = |margin: Length, banner: Option<BannerBox>| match banner {
            Some(b) => margin.max(distance + b.height + gap),
            None => margin,
        };

        Self {
            page_width,
            page_height,
            margin_top: clear(Length::from_inches(layout.margins.top), top_banner),
            margin_right,
            margin_bottom: clear(Length::from_inches(layout.margins.bottom), bottom_banner),
            margin_left,
            header_distance: distance,
            footer_distance: distance,
            top_banner,
            bottom_banner,
        }
    }

    pub fn content_width(&self) -> Length {
        (self.page_width - self.margin_left - self.margin_right).max(Length::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        let inch = Length::from_inches(1.0);
        assert_eq!(inch.emu(), 914_400);
        assert_eq!(inch.twips(), 1440);
        assert_eq!(Length::from_inches(-2.0), Length::ZERO);
        assert_eq!(Length::from_inches(f64::NAN), Length::ZERO);
        assert_eq!(Length::from_emu(1000).scale(1, 4).emu(), 250);
        assert_eq!(Length::from_emu(1000).scale(3, 0), Length::ZERO);
    }

    #[test]
    fn test_edge_to_edge_banner_spans_page() {
        let layout = LayoutConfig::default().with_margins(Margins {
            top: 1.0,
            right: 0.75,
            bottom: 1.0,
            left: 1.25,
        });
        let geometry = PageGeometry::compute(&layout, Some((2000, 200)), None);
        let banner = geometry.top_banner.unwrap();

        assert_eq!(banner.width, geometry.page_width);
        assert_eq!(geometry.margin_left, Length::from_inches(1.25));
        assert_eq!(geometry.margin_right, Length::from_inches(0.75));
        assert_eq!(banner.outdent_left, geometry.margin_left);
        assert_eq!(geometry.header_distance, Length::ZERO);
        assert_eq!(
            geometry.page_width,
            geometry.margin_left + geometry.content_width() + geometry.margin_right
        );
    }

    #[test]
    fn test_inset_banner_uses_content_width() {
        let layout = LayoutConfig::default().with_edge_to_edge(false);
        let geometry = PageGeometry::compute(&layout, Some((650, 100)), Some((650, 100)));
        let banner = geometry.bottom_banner.unwrap();

        assert_eq!(banner.width, Length::from_inches(6.5));
        assert_eq!(banner.height, Length::from_inches(1.0));
        assert_eq!(banner.outdent_left, Length::ZERO);
        assert_eq!(geometry.footer_distance, Length::from_inches(0.5));
    }

    #[test]
    fn test_top_margin_clears_banner_and_gap() {
        // 8.5in wide banner at 17:2 is 1in tall; 0 + 1 + 0.35 beats the 1in margin.
        let layout = LayoutConfig::default();
        let geometry = PageGeometry::compute(&layout, Some((1700, 200)), None);
        assert_eq!(geometry.margin_top, Length::from_inches(1.35));
        assert_eq!(geometry.margin_bottom, Length::from_inches(1.0));
    }

    #[test]
    fn test_large_margin_is_kept() {
        let mut layout = LayoutConfig::default();
        layout.margins.top = 3.0;
        let geometry = PageGeometry::compute(&layout, Some((1700, 200)), None);
        assert_eq!(geometry.margin_top, Length::from_inches(3.0));
    }

    #[test]
    fn test_without_banners_margins_are_configured_ones() {
        let layout = LayoutConfig::default();
        let geometry = PageGeometry::compute(&layout, None, None);
        assert!(geometry.top_banner.is_none());
        assert_eq!(geometry.margin_top, Length::from_inches(1.0));
        assert_eq!(geometry.margin_bottom, Length::from_inches(1.0));
    }

    #[test]
    fn test_rtl_preset() {
        let layout = LayoutConfig::for_direction(TextDirection::Rtl);
        assert_eq!(layout.font_name, "David");
        assert_eq!(layout.salutation, "לכבוד,");
        assert!(layout.direction.is_rtl());
    }

    #[test]
    fn test_layout_deserializes_with_defaults() {
        let layout: LayoutConfig =
            serde_json::from_str(r#"{"font_size": 14, "direction": "rtl", "page_size": "a4"}"#)
                .unwrap();
        assert_eq!(layout.font_size, 14);
        assert_eq!(layout.font_name, "Arial");
        assert_eq!(layout.page_size, PageSize::A4);
        assert_eq!(layout.margins, Margins::default());
        assert!(layout.edge_to_edge);
    }
}
