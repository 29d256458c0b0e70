//! PPTX (Office Open XML) backend: writes rendered decks as `.pptx`
//! packages and reads them back for inspection.
//!
//! A `.pptx` file is a ZIP archive of XML parts; slides are written with
//! DrawingML text boxes and pictures on a single blank layout.

pub mod convert;
pub mod document;
pub mod media;
mod package;
pub mod reader;
mod slide;
mod template;

pub use convert::{convert_file, find_logo, validate_output_path, Converter, ConverterConfig};
pub use document::PptxDocument;
pub use media::FsImageProbe;
pub use reader::{DeckSummary, PptxReader, SlideSummary};
