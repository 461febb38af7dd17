//! Mirror style snapshot.
//!
//! A [`MirrorStyle`] is the set of layout-affecting properties copied from the
//! live editable surface into the hidden measurement clone: box edges, font,
//! alignment, spacing, breaking and sizing. Two surfaces with equal styles lay
//! out the same text identically, which is what lets the clone stand in for
//! the live surface during measurement.

use crate::error::{MeasureError, MeasureResult};
use crate::text::Font;
use crate::types::{Point, Size};

/// Widths of the four sides of a box edge (border or padding).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    /// Create edges with explicit sides.
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same width on every side.
    pub const fn uniform(width: f32) -> Self {
        Self::new(width, width, width, width)
    }

    /// No edge.
    pub const ZERO: Self = Self::uniform(0.0);

    /// Combined left and right width.
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Combined top and bottom width.
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlign {
    /// Align to the start edge of the writing direction.
    #[default]
    Start,
    Left,
    Center,
    Right,
    /// Align to the end edge of the writing direction.
    End,
    Justify,
}

impl HorizontalAlign {
    /// Convert to cosmic-text alignment, resolving start/end by direction.
    pub fn to_cosmic(self, direction: TextDirection) -> cosmic_text::Align {
        match (self, direction) {
            (HorizontalAlign::Left, _)
            | (HorizontalAlign::Start, TextDirection::Ltr)
            | (HorizontalAlign::End, TextDirection::Rtl) => cosmic_text::Align::Left,
            (HorizontalAlign::Right, _)
            | (HorizontalAlign::Start, TextDirection::Rtl)
            | (HorizontalAlign::End, TextDirection::Ltr) => cosmic_text::Align::Right,
            (HorizontalAlign::Center, _) => cosmic_text::Align::Center,
            (HorizontalAlign::Justify, _) => cosmic_text::Align::Justified,
        }
    }
}

/// Base writing direction of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// White-space handling.
///
/// Every mode decides wrapping. [`GridLayoutHost`](crate::text::GridLayoutHost)
/// also collapses space runs and folds line feeds as the mode asks;
/// [`CosmicLayoutHost`](crate::text::CosmicLayoutHost) keeps every character,
/// as in a text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WhiteSpace {
    Normal,
    NoWrap,
    Pre,
    #[default]
    PreWrap,
    PreLine,
}

impl WhiteSpace {
    /// Whether a run of spaces and tabs takes the room of one space.
    pub fn collapses_spaces(self) -> bool {
        matches!(self, WhiteSpace::Normal | WhiteSpace::NoWrap | WhiteSpace::PreLine)
    }

    /// Whether a line feed forces a line break instead of acting as a space.
    pub fn preserves_newlines(self) -> bool {
        matches!(self, WhiteSpace::Pre | WhiteSpace::PreWrap | WhiteSpace::PreLine)
    }
}

/// Word-break rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WordBreak {
    #[default]
    Normal,
    /// Break between any two characters.
    BreakAll,
    /// Never break inside words, even when they overflow.
    KeepAll,
}

/// Overflow-wrap rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverflowWrap {
    #[default]
    Normal,
    /// Break an overflowing word when no other break point exists.
    BreakWord,
    Anywhere,
}

/// How `width`/`height` are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoxSizing {
    /// Dimensions describe the content box.
    ContentBox,
    /// Dimensions include padding and border.
    #[default]
    BorderBox,
}

/// Effective line wrapping derived from the breaking properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Lines only end at explicit newlines.
    None,
    /// Wrap at word boundaries.
    Word,
    /// Wrap at any character.
    Character,
    /// Wrap at word boundaries, falling back to characters for long words.
    WordOrCharacter,
}

impl WrapMode {
    /// Convert to cosmic-text wrap mode.
    pub fn to_cosmic(self) -> cosmic_text::Wrap {
        match self {
            WrapMode::None => cosmic_text::Wrap::None,
            WrapMode::Word => cosmic_text::Wrap::Word,
            WrapMode::Character => cosmic_text::Wrap::Glyph,
            WrapMode::WordOrCharacter => cosmic_text::Wrap::WordOrGlyph,
        }
    }
}

/// Layout-relevant style of the editable surface.
///
/// Margins are not part of the mirror: every rectangle is relative to the
/// surface's border box, which margins only move as a whole. The host reports
/// that position through the surface geometry instead.
///
/// # Example
///
/// ```
/// use korrect_render::{Edges, MirrorStyle, WrapMode};
/// use korrect_render::text::{Font, FontFamily};
///
/// let style = MirrorStyle::new(200.0, 80.0)
///     .with_font(Font::new(FontFamily::Monospace, 10.0))
///     .with_padding(Edges::uniform(4.0))
///     .with_border(Edges::uniform(1.0));
///
/// assert_eq!(style.content_width(), 190.0);
/// assert_eq!(style.wrap_mode(), WrapMode::Word);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorStyle {
    pub width: f32,
    pub height: f32,
    pub box_sizing: BoxSizing,
    pub border: Edges,
    pub padding: Edges,
    pub font: Font,
    /// Line height in pixels; `None` means 1.2 times the font size.
    pub line_height: Option<f32>,
    pub text_align: HorizontalAlign,
    pub direction: TextDirection,
    /// Indentation of the first line, in pixels.
    pub text_indent: f32,
    /// Extra advance after every character, in pixels.
    pub letter_spacing: f32,
    /// Extra advance after every space, in pixels.
    pub word_spacing: f32,
    pub white_space: WhiteSpace,
    pub word_break: WordBreak,
    pub overflow_wrap: OverflowWrap,
}

impl MirrorStyle {
    /// A border-box surface of the given size with default text properties.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            box_sizing: BoxSizing::default(),
            border: Edges::ZERO,
            padding: Edges::ZERO,
            font: Font::default(),
            line_height: None,
            text_align: HorizontalAlign::default(),
            direction: TextDirection::default(),
            text_indent: 0.0,
            letter_spacing: 0.0,
            word_spacing: 0.0,
            white_space: WhiteSpace::default(),
            word_break: WordBreak::default(),
            overflow_wrap: OverflowWrap::default(),
        }
    }

    pub fn with_font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = Some(line_height);
        self
    }

    pub fn with_border(mut self, border: Edges) -> Self {
        self.border = border;
        self
    }

    pub fn with_padding(mut self, padding: Edges) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_box_sizing(mut self, box_sizing: BoxSizing) -> Self {
        self.box_sizing = box_sizing;
        self
    }

    pub fn with_text_align(mut self, align: HorizontalAlign) -> Self {
        self.text_align = align;
        self
    }

    pub fn with_direction(mut self, direction: TextDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_text_indent(mut self, indent: f32) -> Self {
        self.text_indent = indent;
        self
    }

    pub fn with_letter_spacing(mut self, spacing: f32) -> Self {
        self.letter_spacing = spacing;
        self
    }

    pub fn with_word_spacing(mut self, spacing: f32) -> Self {
        self.word_spacing = spacing;
        self
    }

    pub fn with_white_space(mut self, white_space: WhiteSpace) -> Self {
        self.white_space = white_space;
        self
    }

    pub fn with_word_break(mut self, word_break: WordBreak) -> Self {
        self.word_break = word_break;
        self
    }

    pub fn with_overflow_wrap(mut self, overflow_wrap: OverflowWrap) -> Self {
        self.overflow_wrap = overflow_wrap;
        self
    }

    /// Resize the surface, keeping every other property.
    pub fn resized(mut self, size: Size) -> Self {
        self.width = size.width;
        self.height = size.height;
        self
    }

    /// Line height in pixels.
    pub fn line_height_px(&self) -> f32 {
        self.line_height.unwrap_or(self.font.size() * 1.2)
    }

    /// Top-left corner of the content box, relative to the border box.
    pub fn content_origin(&self) -> Point {
        Point::new(
            self.border.left + self.padding.left,
            self.border.top + self.padding.top,
        )
    }

    /// Width available to text.
    pub fn content_width(&self) -> f32 {
        match self.box_sizing {
            BoxSizing::ContentBox => self.width,
            BoxSizing::BorderBox => {
                self.width - self.border.horizontal() - self.padding.horizontal()
            }
        }
    }

    /// Outer size of the border box.
    pub fn border_box(&self) -> Size {
        match self.box_sizing {
            BoxSizing::BorderBox => Size::new(self.width, self.height),
            BoxSizing::ContentBox => Size::new(
                self.width + self.border.horizontal() + self.padding.horizontal(),
                self.height + self.border.vertical() + self.padding.vertical(),
            ),
        }
    }

    /// Effective wrapping for the breaking properties.
    pub fn wrap_mode(&self) -> WrapMode {
        match self.white_space {
            WhiteSpace::NoWrap | WhiteSpace::Pre => WrapMode::None,
            WhiteSpace::Normal | WhiteSpace::PreWrap | WhiteSpace::PreLine => {
                match (self.word_break, self.overflow_wrap) {
                    (WordBreak::BreakAll, _) => WrapMode::Character,
                    (WordBreak::KeepAll, _) => WrapMode::Word,
                    (WordBreak::Normal, OverflowWrap::Normal) => WrapMode::Word,
                    (WordBreak::Normal, _) => WrapMode::WordOrCharacter,
                }
            }
        }
    }

    /// Check that the style describes a box text can be laid out in.
    pub fn validate(&self) -> MeasureResult<()> {
        let content_width = self.content_width();
        let finite = self.width.is_finite() && self.height.is_finite();
        if !finite || content_width < 0.0 || self.font.size() <= 0.0 {
            return Err(MeasureError::InvalidGeometry {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl Default for MirrorStyle {
    fn default() -> Self {
        Self::new(300.0, 150.0)
    }
}
