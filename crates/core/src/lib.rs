//! Core slide model, Markdown parser, and brand renderer for converting
//! Markdown into slide decks.

pub mod error;
pub mod parser;
pub mod render;
pub mod shapes;
pub mod sink;
pub mod style;
pub mod types;

pub use error::{Error, Result};
pub use parser::{parse, parse_inline_formatting, MarkdownParser};
pub use render::{RenderConfig, Renderer};
pub use sink::{DocumentSink, ImageProbe};
pub use types::{ContentItem, HeadingDepth, Image, ListItem, SectionHeading, Slide, TextRun};
