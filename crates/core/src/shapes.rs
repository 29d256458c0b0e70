//! Format-neutral visual elements emitted by the renderer.
//!
//! Positions and sizes are in English Metric Units (EMU), the unit used by
//! DrawingML: 914 400 per inch.

use std::path::PathBuf;

/// English Metric Units.
pub type Emu = i64;

/// EMU per inch.
pub const EMU_PER_INCH: Emu = 914_400;

/// EMU per pixel at 96 DPI.
pub const EMU_PER_PIXEL: Emu = 9_525;

/// Convert inches to EMU.
pub fn inches(value: f64) -> Emu {
    (value * EMU_PER_INCH as f64).round() as Emu
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: Emu,
    pub y: Emu,
    pub width: Emu,
    pub height: Emu,
}

impl Rect {
    pub fn new(x: Emu, y: Emu, width: Emu, height: Emu) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bottom edge.
    pub fn bottom(&self) -> Emu {
        self.y + self.height
    }

    /// Right edge.
    pub fn right(&self) -> Emu {
        self.x + self.width
    }
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Uppercase hex without a leading `#`, e.g. `F8FAFC`.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// How a text block reacts when its text does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoFit {
    /// Text may overflow.
    #[default]
    None,
    /// Shrink the text to fit the block.
    ShrinkText,
    /// Resize the block to fit the text.
    ResizeShape,
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
}

/// Automatic numbering style for ordered lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingScheme {
    /// `1.` `2.` `3.`
    ArabicPeriod,
    /// `a.` `b.` `c.`
    AlphaLcPeriod,
}

/// The glyph hanging in front of a list paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Bullet(char),
    AutoNumber(NumberingScheme),
}

/// Vertical space around a paragraph, as a fraction of a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spacing {
    /// E.g. `0.5` for half a line.
    Lines(f32),
}

/// Character formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub size_pt: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Rgb,
}

/// A span of uniformly formatted text.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub font: Font,
    /// Clickable target URL.
    pub hyperlink: Option<String>,
}

/// A paragraph inside a text block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub align: Align,
    /// Outline level, used by consumers that key list styles off it.
    pub level: usize,
    pub marker: Option<Marker>,
    /// Left margin of the text body.
    pub margin_left: Option<Emu>,
    /// First-line indent relative to `margin_left`. Negative values hang
    /// the marker left of the text.
    pub indent: Option<Emu>,
    pub space_before: Option<Spacing>,
    pub space_after: Option<Spacing>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A positioned box of paragraphs.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub rect: Rect,
    pub word_wrap: bool,
    pub auto_fit: AutoFit,
    pub paragraphs: Vec<Paragraph>,
}

impl TextBlock {
    /// An empty, word-wrapped block.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            word_wrap: true,
            auto_fit: AutoFit::None,
            paragraphs: Vec::new(),
        }
    }

    pub fn with_auto_fit(mut self, auto_fit: AutoFit) -> Self {
        self.auto_fit = auto_fit;
        self
    }

    /// Paragraph texts joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A positioned picture read from an image file.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub path: PathBuf,
    pub rect: Rect,
    /// Alternative text.
    pub description: String,
}
