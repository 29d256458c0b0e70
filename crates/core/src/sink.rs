//! Seams between the renderer and a concrete document format.

use crate::error::Result;
use crate::shapes::{Emu, Picture, Rgb, TextBlock};
use std::path::Path;

/// A document that accepts slides and positioned shapes.
///
/// The renderer only ever appends; slides are addressed by the index
/// returned from [`DocumentSink::add_slide`].
pub trait DocumentSink {
    /// Slide width and height.
    fn slide_size(&self) -> (Emu, Emu);

    /// Append a slide with a solid background and return its index.
    fn add_slide(&mut self, background: Rgb) -> Result<usize>;

    /// Add a text block to a slide.
    fn add_text_block(&mut self, slide: usize, block: TextBlock) -> Result<()>;

    /// Add a picture to a slide.
    ///
    /// Fails when the image file cannot be read or is of an unsupported
    /// type; the renderer treats such failures as non-fatal.
    fn add_picture(&mut self, slide: usize, picture: Picture) -> Result<()>;
}

/// Reads pixel dimensions of image files.
pub trait ImageProbe {
    /// Width and height in pixels.
    fn dimensions(&self, path: &Path) -> Result<(u32, u32)>;
}
