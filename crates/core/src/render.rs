//! Slide model to visual document renderer.
//!
//! Every [`Slide`] becomes one visual slide in the sink: title slides get a
//! centered title and subtitle, content slides a pinned title over an
//! auto-shrinking content block, with a right-hand picture column when the
//! slide carries an image.

use crate::error::Result;
use crate::shapes::{
    inches, Align, AutoFit, Emu, Marker, NumberingScheme, Paragraph, Picture, Rect, Rgb, Run,
    TextBlock, EMU_PER_PIXEL,
};
use crate::sink::{DocumentSink, ImageProbe};
use crate::style::{
    self, BRAND_CATSKILL_WHITE, BRAND_RED, BRAND_SHUTTLE_GRAY, BRAND_WOODSMOKE, FONT_SIZE_H1,
    FONT_SIZE_H2, FONT_SIZE_SUBTITLE, LINK_BLUE, PARAGRAPH_SPACING,
};
use crate::types::{ContentItem, HeadingDepth, Image, ListItem, SectionHeading, Slide, TextRun};
use std::path::{Path, PathBuf};

const TITLE_TOP_IN: f64 = 2.5;
const TITLE_HEIGHT_IN: f64 = 1.5;
const SUBTITLE_TOP_IN: f64 = 4.2;
const SUBTITLE_HEIGHT_IN: f64 = 1.0;

const HEADER_TOP_IN: f64 = 0.4;
const HEADER_HEIGHT_IN: f64 = 0.8;
const CONTENT_TOP_IN: f64 = 1.4;
const CONTENT_HEIGHT_IN: f64 = 5.6;

/// Gap between the text column and the picture column.
const COLUMN_GAP_IN: f64 = 0.25;
const CAPTION_GAP_IN: f64 = 0.1;
const CAPTION_HEIGHT_IN: f64 = 0.4;

/// Renderer settings.
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Logo placed bottom-right on every slide.
    pub logo_path: Option<PathBuf>,

    /// Directory that relative image paths are resolved against.
    pub base_dir: Option<PathBuf>,
}

/// Renders parsed slides into a [`DocumentSink`].
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Create a renderer without logo and with image paths taken as-is.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer with the given settings.
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Set the logo image.
    pub fn with_logo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.logo_path = Some(path.into());
        self
    }

    /// Set the directory relative image paths resolve against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = Some(dir.into());
        self
    }

    /// Render all slides in order.
    pub fn render(
        &self,
        slides: &[Slide],
        sink: &mut dyn DocumentSink,
        probe: &dyn ImageProbe,
    ) -> Result<()> {
        let frame = Frame::new(sink.slide_size());

        for (idx, slide) in slides.iter().enumerate() {
            log::debug!(
                "Rendering slide {} ({}): {}",
                idx + 1,
                if slide.is_title_slide { "title" } else { "content" },
                slide.title
            );

            let slide_idx = sink.add_slide(BRAND_CATSKILL_WHITE)?;
            if slide.is_title_slide {
                self.render_title_slide(slide, slide_idx, &frame, sink)?;
            } else {
                self.render_content_slide(slide, slide_idx, &frame, sink, probe)?;
            }
            self.add_logo(slide_idx, &frame, sink, probe);
        }

        Ok(())
    }

    fn render_title_slide(
        &self,
        slide: &Slide,
        slide_idx: usize,
        frame: &Frame,
        sink: &mut dyn DocumentSink,
    ) -> Result<()> {
        let rect = Rect::new(
            frame.margin,
            inches(TITLE_TOP_IN),
            frame.full_width,
            inches(TITLE_HEIGHT_IN),
        );
        let mut title = TextBlock::new(rect).with_auto_fit(AutoFit::ResizeShape);
        title.paragraphs.push(Paragraph {
            align: Align::Center,
            runs: vec![Run {
                text: slide.title.clone(),
                font: style::header_font(FONT_SIZE_H1),
                hyperlink: None,
            }],
            ..Default::default()
        });
        sink.add_text_block(slide_idx, title)?;

        if let Some(subtitle) = &slide.subtitle {
            let rect = Rect::new(
                frame.margin,
                inches(SUBTITLE_TOP_IN),
                frame.full_width,
                inches(SUBTITLE_HEIGHT_IN),
            );
            let mut block = TextBlock::new(rect).with_auto_fit(AutoFit::ResizeShape);
            let mut font = style::body_font(BRAND_SHUTTLE_GRAY);
            font.size_pt = FONT_SIZE_SUBTITLE;
            block.paragraphs = subtitle
                .lines()
                .map(|line| Paragraph {
                    align: Align::Center,
                    runs: vec![Run {
                        text: line.to_string(),
                        font: font.clone(),
                        hyperlink: None,
                    }],
                    ..Default::default()
                })
                .collect();
            sink.add_text_block(slide_idx, block)?;
        }

        Ok(())
    }

    fn render_content_slide(
        &self,
        slide: &Slide,
        slide_idx: usize,
        frame: &Frame,
        sink: &mut dyn DocumentSink,
        probe: &dyn ImageProbe,
    ) -> Result<()> {
        let rect = Rect::new(
            frame.margin,
            inches(HEADER_TOP_IN),
            frame.full_width,
            inches(HEADER_HEIGHT_IN),
        );
        let mut header = TextBlock::new(rect);
        header.paragraphs.push(Paragraph {
            align: Align::Left,
            runs: vec![Run {
                text: slide.title.clone(),
                font: style::header_font(FONT_SIZE_H2),
                hyperlink: None,
            }],
            ..Default::default()
        });
        sink.add_text_block(slide_idx, header)?;

        let placement = slide
            .image
            .as_ref()
            .and_then(|image| self.place_image(image, frame, probe));

        let text_width = if placement.is_some() {
            frame.full_width / 2
        } else {
            frame.full_width
        };
        let rect = Rect::new(
            frame.margin,
            inches(CONTENT_TOP_IN),
            text_width,
            inches(CONTENT_HEIGHT_IN),
        );
        let mut body = TextBlock::new(rect).with_auto_fit(AutoFit::ShrinkText);
        body.paragraphs = slide.content.iter().map(content_paragraph).collect();
        sink.add_text_block(slide_idx, body)?;

        if let Some(placement) = placement {
            let caption_rect = Rect::new(
                placement.column_x,
                placement.picture.rect.bottom() + inches(CAPTION_GAP_IN),
                placement.column_width,
                inches(CAPTION_HEIGHT_IN),
            );
            let path = placement.picture.path.clone();
            match sink.add_picture(slide_idx, placement.picture) {
                Ok(()) => {
                    if let Some(caption) = placement.caption {
                        sink.add_text_block(slide_idx, caption_block(caption_rect, caption))?;
                    }
                }
                Err(e) => {
                    log::warn!("Skipping image {}: {}", path.display(), e);
                }
            }
        }

        Ok(())
    }

    /// Fit the image into the right-hand column.
    ///
    /// Returns `None` when the image cannot be probed, in which case the
    /// slide falls back to the full-width layout.
    fn place_image(
        &self,
        image: &Image,
        frame: &Frame,
        probe: &dyn ImageProbe,
    ) -> Option<ImagePlacement> {
        let path = self.resolve(&image.path);
        let (px_width, px_height) = match probe.dimensions(&path) {
            Ok(dims) => dims,
            Err(e) => {
                log::warn!("Skipping image {}: {}", path.display(), e);
                return None;
            }
        };
        if px_width == 0 || px_height == 0 {
            log::warn!("Skipping image {}: zero-sized", path.display());
            return None;
        }

        let text_width = frame.full_width / 2;
        let gap = inches(COLUMN_GAP_IN);
        let column_x = frame.margin + text_width + gap;
        let column_width = frame.full_width - text_width - gap;
        let caption_space = if image.caption.is_some() {
            inches(CAPTION_GAP_IN + CAPTION_HEIGHT_IN)
        } else {
            0
        };
        let max_height = inches(CONTENT_HEIGHT_IN) - caption_space;

        let (width, height) = fit_within(
            px_width as Emu * EMU_PER_PIXEL,
            px_height as Emu * EMU_PER_PIXEL,
            column_width,
            max_height,
        );

        Some(ImagePlacement {
            picture: Picture {
                path,
                rect: Rect::new(
                    column_x + (column_width - width) / 2,
                    inches(CONTENT_TOP_IN),
                    width,
                    height,
                ),
                description: image.caption.clone().unwrap_or_default(),
            },
            caption: image.caption.clone(),
            column_x,
            column_width,
        })
    }

    fn add_logo(
        &self,
        slide_idx: usize,
        frame: &Frame,
        sink: &mut dyn DocumentSink,
        probe: &dyn ImageProbe,
    ) {
        let Some(path) = &self.config.logo_path else {
            return;
        };

        let result = probe.dimensions(path).and_then(|(px_width, px_height)| {
            let width = inches(style::LOGO_WIDTH_IN);
            let height = if px_width == 0 {
                0
            } else {
                width * px_height as Emu / px_width as Emu
            };
            let margin = inches(style::LOGO_MARGIN_IN);
            let rect = Rect::new(
                frame.width - width - margin,
                frame.height - height - margin,
                width,
                height,
            );
            sink.add_picture(
                slide_idx,
                Picture {
                    path: path.clone(),
                    rect,
                    description: "Logo".to_string(),
                },
            )
        });

        if let Err(e) = result {
            log::warn!("Skipping logo {}: {}", path.display(), e);
        }
    }

    fn resolve(&self, image_path: &str) -> PathBuf {
        match &self.config.base_dir {
            Some(dir) => dir.join(image_path),
            None => Path::new(image_path).to_path_buf(),
        }
    }
}

/// Slide dimensions and the derived full-width text column.
struct Frame {
    width: Emu,
    height: Emu,
    margin: Emu,
    full_width: Emu,
}

impl Frame {
    fn new((width, height): (Emu, Emu)) -> Self {
        let margin = inches(style::MARGIN_IN);
        Self {
            width,
            height,
            margin,
            full_width: width - 2 * margin,
        }
    }
}

struct ImagePlacement {
    picture: Picture,
    caption: Option<String>,
    column_x: Emu,
    column_width: Emu,
}

/// Scale `(width, height)` down proportionally to fit within the bounds.
/// Never scales up.
fn fit_within(width: Emu, height: Emu, max_width: Emu, max_height: Emu) -> (Emu, Emu) {
    let scale = (max_width as f64 / width as f64)
        .min(max_height as f64 / height as f64)
        .min(1.0);
    (
        (width as f64 * scale).round() as Emu,
        (height as f64 * scale).round() as Emu,
    )
}

fn content_paragraph(item: &ContentItem) -> Paragraph {
    match item {
        ContentItem::List(list) => list_paragraph(list),
        ContentItem::Text(run) => Paragraph {
            space_after: Some(PARAGRAPH_SPACING),
            runs: vec![styled_run(run, BRAND_WOODSMOKE)],
            ..Default::default()
        },
        ContentItem::Heading(heading) => heading_paragraph(heading),
    }
}

fn list_paragraph(item: &ListItem) -> Paragraph {
    let marker = if item.ordered {
        let scheme = if item.level == 0 {
            NumberingScheme::ArabicPeriod
        } else {
            NumberingScheme::AlphaLcPeriod
        };
        Marker::AutoNumber(scheme)
    } else {
        Marker::Bullet(style::bullet_char(item.level))
    };
    let color = style::list_text_color(item.level);

    Paragraph {
        align: Align::Left,
        level: item.level,
        marker: Some(marker),
        margin_left: Some(style::list_margin_left(item.level)),
        indent: Some(style::list_first_line_indent()),
        space_before: None,
        space_after: Some(PARAGRAPH_SPACING),
        runs: item.content.iter().map(|r| styled_run(r, color)).collect(),
    }
}

fn heading_paragraph(heading: &SectionHeading) -> Paragraph {
    let color = match heading.depth {
        HeadingDepth::Three => BRAND_RED,
        HeadingDepth::Four => BRAND_WOODSMOKE,
    };
    let mut font = style::body_font(color);
    font.bold = true;

    Paragraph {
        space_before: Some(PARAGRAPH_SPACING),
        space_after: Some(PARAGRAPH_SPACING),
        runs: vec![Run {
            text: heading.text.clone(),
            font,
            hyperlink: None,
        }],
        ..Default::default()
    }
}

/// Body-font run; links are underlined and recolored whatever their
/// emphasis.
fn styled_run(run: &TextRun, color: Rgb) -> Run {
    let mut font = style::body_font(color);
    font.bold = run.bold;
    font.italic = run.italic;

    if run.is_link() {
        font.underline = true;
        font.color = LINK_BLUE;
    }

    Run {
        text: run.text.clone(),
        font,
        hyperlink: run.url.clone(),
    }
}

fn caption_block(rect: Rect, caption: String) -> TextBlock {
    let mut font = style::body_font(BRAND_SHUTTLE_GRAY);
    font.italic = true;

    let mut block = TextBlock::new(rect);
    block.paragraphs.push(Paragraph {
        align: Align::Center,
        runs: vec![Run {
            text: caption,
            font,
            hyperlink: None,
        }],
        ..Default::default()
    });
    block
}
