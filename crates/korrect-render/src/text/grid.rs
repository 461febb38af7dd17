//! Fixed-advance layout host.

use unicode_segmentation::UnicodeSegmentation;

use super::{LayoutHost, validate_content};
use crate::error::MeasureResult;
use crate::style::{MirrorStyle, WrapMode};
use crate::types::Rect;

/// Tab stops every this many advances.
const TAB_SIZE: f32 = 8.0;

/// Tolerance for overflow comparisons.
const EPSILON: f32 = 1e-3;

/// Lays out text on a grid where every grapheme cluster takes one advance.
///
/// Whitespace hangs at the end of a line and never wraps on its own. Words
/// wrap as a whole when they would overflow a line that already holds
/// something. Space runs collapse and line feeds fold into spaces when the
/// style's white-space mode asks for it; collapsed characters measure zero
/// wide. Lines are start-aligned and left-to-right; `text_align` and
/// `direction` are not applied.
#[derive(Debug, Clone, Default)]
pub struct GridLayoutHost {
    fixed_advance: Option<f32>,
}

/// Position of one laid-out cluster.
#[derive(Debug, Clone, Copy)]
struct Cell {
    byte: usize,
    x: f32,
    line: usize,
    width: f32,
}

/// Where the next cluster would land.
#[derive(Debug, Clone, Copy)]
struct Pen {
    x: f32,
    line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TokenKind {
    Newline,
    Space,
    Word,
}

impl GridLayoutHost {
    /// Derive the advance from the font size (0.6 em).
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit advance for every cluster.
    pub fn with_advance(advance: f32) -> Self {
        Self {
            fixed_advance: Some(advance),
        }
    }

    fn advance(&self, style: &MirrorStyle) -> f32 {
        self.fixed_advance.unwrap_or(style.font.size() * 0.6)
    }

    fn layout(&self, style: &MirrorStyle, text: &str) -> (Vec<Cell>, Pen) {
        let advance = self.advance(style);
        let limit = style.content_width();
        let wrap = style.wrap_mode();
        let collapse = style.white_space.collapses_spaces();

        let mut cells = Vec::new();
        let mut pen = Pen {
            x: style.text_indent,
            line: 0,
        };
        let line_start = |line: usize| if line == 0 { style.text_indent } else { 0.0 };

        for (kind, clusters) in tokenize(text, style.white_space.preserves_newlines()) {
            match kind {
                TokenKind::Newline => {
                    let (byte, _) = clusters[0];
                    cells.push(Cell {
                        byte,
                        x: pen.x,
                        line: pen.line,
                        width: 0.0,
                    });
                    pen = Pen {
                        x: 0.0,
                        line: pen.line + 1,
                    };
                }
                TokenKind::Space => {
                    for (i, (byte, cluster)) in clusters.into_iter().enumerate() {
                        let width = if collapse && i > 0 {
                            0.0
                        } else if collapse {
                            advance + style.letter_spacing + style.word_spacing
                        } else if cluster == "\t" {
                            let stop = advance * TAB_SIZE;
                            (stop - (pen.x % stop)).max(advance)
                        } else {
                            advance + style.letter_spacing + style.word_spacing
                        };
                        cells.push(Cell {
                            byte,
                            x: pen.x,
                            line: pen.line,
                            width,
                        });
                        pen.x += width;
                    }
                }
                TokenKind::Word => {
                    let width = advance + style.letter_spacing;
                    let word_width = width * clusters.len() as f32;
                    let overflows = |pen: &Pen, extent: f32| {
                        pen.x > line_start(pen.line) + EPSILON && pen.x + extent > limit + EPSILON
                    };

                    if matches!(wrap, WrapMode::Word | WrapMode::WordOrCharacter)
                        && overflows(&pen, word_width)
                    {
                        pen = Pen {
                            x: 0.0,
                            line: pen.line + 1,
                        };
                    }

                    for (byte, _) in clusters {
                        let breaks_inside = matches!(
                            wrap,
                            WrapMode::Character | WrapMode::WordOrCharacter
                        );
                        if breaks_inside && overflows(&pen, width) {
                            pen = Pen {
                                x: 0.0,
                                line: pen.line + 1,
                            };
                        }
                        cells.push(Cell {
                            byte,
                            x: pen.x,
                            line: pen.line,
                            width,
                        });
                        pen.x += width;
                    }
                }
            }
        }

        (cells, pen)
    }
}

impl LayoutHost for GridLayoutHost {
    fn fragment_box(
        &mut self,
        style: &MirrorStyle,
        before: &str,
        fragment: &str,
    ) -> MeasureResult<Rect> {
        style.validate()?;
        let mut text = String::with_capacity(before.len() + fragment.len());
        text.push_str(before);
        text.push_str(fragment);
        validate_content(&text)?;

        let (cells, pen) = self.layout(style, &text);
        let origin = style.content_origin();
        let line_height = style.line_height_px();
        let cell_rect = |x: f32, line: usize, width: f32| {
            Rect::new(
                origin.x + x,
                origin.y + line as f32 * line_height,
                width,
                line_height,
            )
        };

        let rect = cells
            .iter()
            .filter(|cell| cell.byte >= before.len())
            .map(|cell| cell_rect(cell.x, cell.line, cell.width))
            .reduce(|acc, rect| acc.union(&rect))
            .unwrap_or_else(|| cell_rect(pen.x, pen.line, 0.0));
        Ok(rect)
    }
}

/// Split text into newline, whitespace-run and word tokens of grapheme
/// clusters, each cluster paired with its byte offset.
///
/// Line feeds join the surrounding whitespace run unless `keep_newlines`.
fn tokenize(text: &str, keep_newlines: bool) -> Vec<(TokenKind, Vec<(usize, &str)>)> {
    let mut tokens: Vec<(TokenKind, Vec<(usize, &str)>)> = Vec::new();
    for (byte, cluster) in text.grapheme_indices(true) {
        let kind = if keep_newlines && matches!(cluster, "\n" | "\r\n" | "\r") {
            TokenKind::Newline
        } else if cluster.chars().all(char::is_whitespace) {
            TokenKind::Space
        } else {
            TokenKind::Word
        };

        match tokens.last_mut() {
            Some((last, clusters)) if *last == kind && kind != TokenKind::Newline => {
                clusters.push((byte, cluster));
            }
            _ => tokens.push((kind, vec![(byte, cluster)])),
        }
    }
    tokens
}
