//! Layout host backed by cosmic-text shaping.

use cosmic_text::{Buffer, FontSystem, Metrics, Shaping};

use super::{LayoutHost, validate_content};
use crate::error::{MeasureError, MeasureResult};
use crate::style::MirrorStyle;
use crate::types::Rect;

/// Measures fragments with real font shaping and line breaking.
///
/// Owns its own `FontSystem`, so fonts loaded here are only visible to this
/// host. Letter and word spacing are not applied, and white space is kept
/// as typed whatever the white-space mode; only wrapping follows it.
pub struct CosmicLayoutHost {
    font_system: FontSystem,
}

impl CosmicLayoutHost {
    /// Create a host with all system fonts loaded.
    ///
    /// Scanning system fonts can take a noticeable amount of time.
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
        }
    }

    /// Create a host with an empty font database.
    ///
    /// Load fonts with [`load_font_data`](Self::load_font_data) before
    /// measuring.
    pub fn without_system_fonts(locale: impl Into<String>) -> Self {
        let db = fontdb::Database::new();
        Self {
            font_system: FontSystem::new_with_locale_and_db(locale.into(), db),
        }
    }

    /// Register font file contents with this host.
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.font_system.db_mut().load_font_data(data);
    }

    /// Number of font faces known to this host.
    pub fn face_count(&self) -> usize {
        self.font_system.db().len()
    }

    fn shape(&mut self, style: &MirrorStyle, text: &str) -> Buffer {
        let metrics = Metrics::new(style.font.size(), style.line_height_px());
        let mut buffer = Buffer::new(&mut self.font_system, metrics);

        buffer.set_wrap(&mut self.font_system, style.wrap_mode().to_cosmic());
        buffer.set_size(
            &mut self.font_system,
            Some(style.content_width().max(0.0)),
            None,
        );
        buffer.set_text(
            &mut self.font_system,
            text,
            style.font.to_attrs(),
            Shaping::Advanced,
        );

        let align = style.text_align.to_cosmic(style.direction);
        for line in buffer.lines.iter_mut() {
            line.set_align(Some(align));
        }
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }
}

impl Default for CosmicLayoutHost {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CosmicLayoutHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CosmicLayoutHost")
            .field("faces", &self.face_count())
            .finish()
    }
}

impl LayoutHost for CosmicLayoutHost {
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

        let buffer = self.shape(style, &text);
        let paragraph_starts = paragraph_starts(&buffer, &text);
        let origin = style.content_origin();
        let indent = style.text_indent;

        let mut bounds: Option<Rect> = None;
        // End of the last glyph of `before`, used for the caret of an empty fragment.
        let mut caret: Option<Rect> = None;

        for run in buffer.layout_runs() {
            let Some(&base) = paragraph_starts.get(run.line_i) else {
                return Err(MeasureError::Shaping(format!(
                    "layout run for unknown paragraph {}",
                    run.line_i
                )));
            };
            let shift = if run.line_i == 0 { indent } else { 0.0 };

            for glyph in run.glyphs.iter() {
                let rect = Rect::new(
                    origin.x + shift + glyph.x,
                    origin.y + run.line_top,
                    glyph.w,
                    run.line_height,
                );
                if base + glyph.start >= before.len() {
                    bounds = Some(match bounds {
                        Some(acc) => acc.union(&rect),
                        None => rect,
                    });
                } else {
                    caret = Some(Rect::new(rect.right(), rect.top(), 0.0, rect.height()));
                }
            }
        }

        if let Some(rect) = bounds {
            return Ok(rect);
        }

        let line_height = style.line_height_px();
        let caret = if before.ends_with('\n') || before.ends_with('\r') {
            let lines = paragraph_starts.len().saturating_sub(1) as f32;
            Rect::new(origin.x, origin.y + lines * line_height, 0.0, line_height)
        } else {
            caret.unwrap_or(Rect::new(origin.x + indent, origin.y, 0.0, line_height))
        };
        Ok(caret)
    }
}

/// Byte offset in `text` where each buffer paragraph starts.
///
/// Glyph offsets are relative to their paragraph; the paragraph texts plus
/// their line endings reconstruct `text`.
fn paragraph_starts(buffer: &Buffer, text: &str) -> Vec<usize> {
    let mut starts = Vec::with_capacity(buffer.lines.len());
    let mut position = 0;
    for line in buffer.lines.iter() {
        starts.push(position);
        position += line.text().len();
        let rest = text.get(position..).unwrap_or_default();
        position += if rest.starts_with("\r\n") {
            2
        } else if rest.starts_with('\n') || rest.starts_with('\r') {
            1
        } else {
            0
        };
    }
    starts
}
