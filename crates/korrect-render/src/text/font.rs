//! Font description copied from the live surface into the mirror.

use std::fmt;

/// Font weight (100-900).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Light weight (300).
    pub const LIGHT: Self = Self(300);
    /// Normal/regular weight (400).
    pub const NORMAL: Self = Self(400);
    /// Medium weight (500).
    pub const MEDIUM: Self = Self(500);
    /// Bold weight (700).
    pub const BOLD: Self = Self(700);

    /// Create a font weight from a numeric value (clamped to 100-900).
    pub fn new(weight: u16) -> Self {
        Self(weight.clamp(100, 900))
    }

    /// Convert to cosmic-text Weight.
    pub fn to_cosmic(self) -> cosmic_text::Weight {
        cosmic_text::Weight(self.0)
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Font style (normal, italic, or oblique).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    /// Convert to cosmic-text Style.
    pub fn to_cosmic(self) -> cosmic_text::Style {
        match self {
            FontStyle::Normal => cosmic_text::Style::Normal,
            FontStyle::Italic => cosmic_text::Style::Italic,
            FontStyle::Oblique => cosmic_text::Style::Oblique,
        }
    }
}

/// Font family specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FontFamily {
    /// A specific font family by name.
    Name(String),
    Serif,
    #[default]
    SansSerif,
    Monospace,
}

impl FontFamily {
    /// Create a named font family.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Convert to cosmic-text Family.
    pub fn to_cosmic(&self) -> cosmic_text::Family<'_> {
        match self {
            FontFamily::Name(name) => cosmic_text::Family::Name(name.as_str()),
            FontFamily::Serif => cosmic_text::Family::Serif,
            FontFamily::SansSerif => cosmic_text::Family::SansSerif,
            FontFamily::Monospace => cosmic_text::Family::Monospace,
        }
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontFamily::Name(name) => write!(f, "{name}"),
            FontFamily::Serif => write!(f, "serif"),
            FontFamily::SansSerif => write!(f, "sans-serif"),
            FontFamily::Monospace => write!(f, "monospace"),
        }
    }
}

/// The font-affecting subset of a surface style.
///
/// # Example
///
/// ```
/// use korrect_render::text::{Font, FontFamily, FontWeight};
///
/// let font = Font::new(FontFamily::Monospace, 14.0).with_weight(FontWeight::BOLD);
/// assert_eq!(font.size(), 14.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    family: FontFamily,
    size: f32,
    weight: FontWeight,
    style: FontStyle,
}

impl Font {
    /// Create a font with the given family and pixel size.
    pub fn new(family: FontFamily, size: f32) -> Self {
        Self {
            family,
            size,
            weight: FontWeight::NORMAL,
            style: FontStyle::Normal,
        }
    }

    /// Set the weight.
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Set the style.
    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    /// The font family.
    pub fn family(&self) -> &FontFamily {
        &self.family
    }

    /// Font size in pixels.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// The font weight.
    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    /// The font style.
    pub fn style(&self) -> FontStyle {
        self.style
    }

    /// Convert to cosmic-text attributes for shaping.
    pub fn to_attrs(&self) -> cosmic_text::Attrs<'_> {
        cosmic_text::Attrs::new()
            .family(self.family.to_cosmic())
            .weight(self.weight.to_cosmic())
            .style(self.style.to_cosmic())
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new(FontFamily::SansSerif, 16.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_clamped() {
        assert_eq!(FontWeight::new(50), FontWeight(100));
        assert_eq!(FontWeight::new(1000), FontWeight(900));
    }

    #[test]
    fn test_family_display() {
        assert_eq!(FontFamily::name("Inter").to_string(), "Inter");
        assert_eq!(FontFamily::Monospace.to_string(), "monospace");
    }
}
