//! Brand styling: palette, typography, and slide geometry.

use crate::shapes::{inches, Emu, Font, Rgb, Spacing};

/// Light slide background (Catskill White).
pub const BRAND_CATSKILL_WHITE: Rgb = Rgb(0xF8, 0xFA, 0xFC);
/// Primary dark text (Woodsmoke).
pub const BRAND_WOODSMOKE: Rgb = Rgb(0x11, 0x14, 0x17);
/// Secondary muted dark text (Shuttle Gray).
pub const BRAND_SHUTTLE_GRAY: Rgb = Rgb(0x5B, 0x64, 0x72);
/// Accent color.
pub const BRAND_RED: Rgb = Rgb(0xFF, 0x00, 0x00);
/// Hyperlink color.
pub const LINK_BLUE: Rgb = Rgb(0x05, 0x63, 0xC1);

pub const FONT_HEADER: &str = "Montserrat";
pub const FONT_BODY: &str = "Open Sans";

pub const FONT_SIZE_H1: f32 = 32.0;
pub const FONT_SIZE_H2: f32 = 24.0;
pub const FONT_SIZE_SUBTITLE: f32 = 20.0;
pub const FONT_SIZE_BODY: f32 = 11.0;

/// Bullet glyphs by nesting level; deeper levels reuse the last entry.
pub const BULLET_CHARS: [char; 4] = ['•', '–', '◦', '▪'];

/// Extra space after every content paragraph.
pub const PARAGRAPH_SPACING: Spacing = Spacing::Lines(0.5);

pub const SLIDE_WIDTH_IN: f64 = 13.333;
pub const SLIDE_HEIGHT_IN: f64 = 7.5;

/// Outer margin on the left and right of every text block.
pub const MARGIN_IN: f64 = 0.5;
/// Left margin added per list nesting level.
pub const INDENT_UNIT_IN: f64 = 0.5;
/// How far a list marker hangs left of its text.
pub const HANGING_INDENT_IN: f64 = 0.25;

pub const LOGO_WIDTH_IN: f64 = 1.5;
pub const LOGO_MARGIN_IN: f64 = 0.5;

/// Bullet glyph for a nesting level.
pub fn bullet_char(level: usize) -> char {
    BULLET_CHARS[level.min(BULLET_CHARS.len() - 1)]
}

/// Left margin of a list paragraph. Level 0 is already indented one unit so
/// the marker has room to hang.
pub fn list_margin_left(level: usize) -> Emu {
    inches(INDENT_UNIT_IN) * (level as Emu + 1)
}

/// First-line indent of a list paragraph.
pub fn list_first_line_indent() -> Emu {
    -inches(HANGING_INDENT_IN)
}

/// Text color for a list item at a nesting level.
pub fn list_text_color(level: usize) -> Rgb {
    if level == 0 {
        BRAND_WOODSMOKE
    } else {
        BRAND_SHUTTLE_GRAY
    }
}

/// Body font at the standard size.
pub fn body_font(color: Rgb) -> Font {
    Font {
        family: FONT_BODY.to_string(),
        size_pt: FONT_SIZE_BODY,
        bold: false,
        italic: false,
        underline: false,
        color,
    }
}

/// Bold heading font.
pub fn header_font(size_pt: f32) -> Font {
    Font {
        family: FONT_HEADER.to_string(),
        size_pt,
        bold: true,
        italic: false,
        underline: false,
        color: BRAND_WOODSMOKE,
    }
}
