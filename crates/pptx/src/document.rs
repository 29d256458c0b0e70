//! In-memory PPTX deck implementing [`DocumentSink`].

use crate::media::MediaPart;
use crate::package::Package;
use crate::slide::{Shape, SlidePart};
use slides_core::shapes::{inches, Emu, Picture, Rgb, TextBlock};
use slides_core::style::{SLIDE_HEIGHT_IN, SLIDE_WIDTH_IN};
use slides_core::{DocumentSink, Error, Result};
use std::collections::HashMap;
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};

/// A widescreen presentation being assembled in memory.
#[derive(Debug)]
pub struct PptxDocument {
    width: Emu,
    height: Emu,
    slides: Vec<SlidePart>,
    media: Vec<MediaPart>,
    /// Source path to media index, so a repeated image is stored once.
    media_index: HashMap<PathBuf, usize>,
}

impl PptxDocument {
    /// Create an empty 13.333 x 7.5 inch deck.
    pub fn new() -> Self {
        Self {
            width: inches(SLIDE_WIDTH_IN),
            height: inches(SLIDE_HEIGHT_IN),
            slides: Vec::new(),
            media: Vec::new(),
            media_index: HashMap::new(),
        }
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Number of distinct images embedded in the deck.
    pub fn media_count(&self) -> usize {
        self.media.len()
    }

    /// Serialize the package into any seekable writer.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        Package {
            slide_size: (self.width, self.height),
            slides: &self.slides,
            media: &self.media,
        }
        .write(writer)
    }

    /// Serialize the package into a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    /// Write the deck to `path`, creating parent directories.
    ///
    /// The package is written to a temporary file next to `path` and renamed
    /// into place, so a failed save never leaves a truncated deck behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        self.write_to(tmp.as_file_mut())?;
        tmp.as_file_mut().flush()?;
        tmp.persist(path).map_err(|e| Error::IoError(e.error))?;

        log::debug!(
            "Saved {} slides and {} images to {}",
            self.slides.len(),
            self.media.len(),
            path.display()
        );
        Ok(())
    }

    fn slide_mut(&mut self, slide: usize) -> Result<&mut SlidePart> {
        let count = self.slides.len();
        self.slides
            .get_mut(slide)
            .ok_or_else(|| Error::RenderError(format!("slide {} out of range ({})", slide, count)))
    }
}

impl Default for PptxDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSink for PptxDocument {
    fn slide_size(&self) -> (Emu, Emu) {
        (self.width, self.height)
    }

    fn add_slide(&mut self, background: Rgb) -> Result<usize> {
        self.slides.push(SlidePart {
            background,
            shapes: Vec::new(),
        });
        Ok(self.slides.len() - 1)
    }

    fn add_text_block(&mut self, slide: usize, block: TextBlock) -> Result<()> {
        self.slide_mut(slide)?.shapes.push(Shape::Text(block));
        Ok(())
    }

    fn add_picture(&mut self, slide: usize, picture: Picture) -> Result<()> {
        // Validate the target before touching the media table.
        self.slide_mut(slide)?;

        let media = match self.media_index.get(&picture.path) {
            Some(&idx) => idx,
            None => {
                let part = MediaPart::load(&picture.path)?;
                self.media.push(part);
                let idx = self.media.len() - 1;
                self.media_index.insert(picture.path.clone(), idx);
                idx
            }
        };

        self.slide_mut(slide)?
            .shapes
            .push(Shape::Picture { picture, media });
        Ok(())
    }
}
