//! Reads a PPTX package back into a structural summary.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slides_core::{Error, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Slides of a package, in presentation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckSummary {
    pub slides: Vec<SlideSummary>,
}

impl DeckSummary {
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideSummary {
    /// 1-based position in the deck.
    pub number: usize,
    /// Background fill as uppercase hex, when the slide sets one.
    pub background: Option<String>,
    pub shapes: Vec<ShapeSummary>,
}

impl SlideSummary {
    /// Text of every non-empty text shape, in document order.
    pub fn texts(&self) -> Vec<String> {
        self.shapes
            .iter()
            .filter(|s| s.kind == ShapeKind::Text)
            .map(ShapeSummary::text)
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn picture_count(&self) -> usize {
        self.shapes
            .iter()
            .filter(|s| s.kind == ShapeKind::Picture)
            .count()
    }

    /// All runs of all text shapes.
    pub fn runs(&self) -> impl Iterator<Item = &RunSummary> {
        self.shapes
            .iter()
            .flat_map(|s| s.paragraphs.iter())
            .flat_map(|p| p.runs.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeKind {
    #[default]
    Text,
    Picture,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeSummary {
    pub kind: ShapeKind,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub paragraphs: Vec<ParagraphSummary>,
    /// Package path of the embedded image, for pictures.
    pub image_target: Option<String>,
}

impl ShapeSummary {
    /// Paragraph texts joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(ParagraphSummary::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// List marker as written in `a:pPr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerSummary {
    Bullet(String),
    AutoNumber(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphSummary {
    pub level: usize,
    pub marker: Option<MarkerSummary>,
    pub runs: Vec<RunSummary>,
}

impl ParagraphSummary {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub size_pt: Option<f32>,
    pub font: Option<String>,
    pub color: Option<String>,
    /// Resolved hyperlink target.
    pub hyperlink: Option<String>,
}

/// Reader for PPTX (Office Open XML) packages.
pub struct PptxReader;

impl PptxReader {
    pub fn new() -> Self {
        Self
    }

    /// Read a package from disk.
    pub fn read_path(&self, path: &Path) -> Result<DeckSummary> {
        let file = File::open(path)?;
        self.read(file)
    }

    /// Read a package from a seekable reader.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<DeckSummary> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_order = self.slide_order(&mut archive)?;
        let mut deck = DeckSummary::default();

        for (idx, slide_path) in slide_order.iter().enumerate() {
            let rels = self.slide_rels(&mut archive, slide_path)?;
            let content = read_file_from_archive(&mut archive, slide_path)?;
            let mut slide = parse_slide_xml(&content, &rels)?;
            slide.number = idx + 1;
            deck.slides.push(slide);
        }

        Ok(deck)
    }

    /// Ordered slide part paths from the presentation relationships.
    fn slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = read_file_from_archive(archive, "ppt/_rels/presentation.xml.rels")?;
        let mut slides: Vec<(String, Option<usize>)> = Vec::new();

        for rel in parse_relationships(&rels_content)? {
            if rel.rel_type.ends_with("/slide") {
                // Part names carry the deck position; rIds may be offset.
                let order = extract_slide_number(&rel.target)
                    .or_else(|| extract_slide_number(&rel.id));
                slides.push((resolve_target("ppt", &rel.target), order));
            }
        }

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Relationship id to target for one slide. Missing rels parts are empty.
    fn slide_rels<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
    ) -> Result<HashMap<String, String>> {
        let (dir, file) = slide_path.rsplit_once('/').unwrap_or(("", slide_path));
        let rels_path = format!("{}/_rels/{}.rels", dir, file);
        if archive.by_name(&rels_path).is_err() {
            return Ok(HashMap::new());
        }

        let content = read_file_from_archive(archive, &rels_path)?;
        Ok(parse_relationships(&content)?
            .into_iter()
            .map(|rel| {
                let target = if rel.external {
                    rel.target
                } else {
                    resolve_target(dir, &rel.target)
                };
                (rel.id, target)
            })
            .collect())
    }
}

impl Default for PptxReader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
    external: bool,
}

fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut rels = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut rel = Relationship {
                    id: String::new(),
                    rel_type: String::new(),
                    target: String::new(),
                    external: false,
                };
                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map(|v| v.into_owned())
                        .unwrap_or_default();
                    match attr.key.as_ref() {
                        b"Id" => rel.id = value,
                        b"Type" => rel.rel_type = value,
                        b"Target" => rel.target = value,
                        b"TargetMode" => rel.external = value == "External",
                        _ => {}
                    }
                }
                rels.push(rel);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(rels)
}

/// Resolve a relative relationship target against the source part's folder.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            ".." => {
                parts.pop();
            }
            "." | "" => {}
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Tracks where the cursor is inside a slide's XML.
#[derive(Default)]
struct SlideCursor {
    slide: SlideSummary,
    shape: Option<ShapeSummary>,
    paragraph: Option<ParagraphSummary>,
    run: Option<RunSummary>,
    in_background: bool,
    in_run_props: bool,
    in_text: bool,
    have_offset: bool,
}

impl SlideCursor {
    fn open(&mut self, e: &BytesStart, rels: &HashMap<String, String>) {
        match local_name(e.name().as_ref()) {
            b"bg" => self.in_background = true,
            b"sp" => self.start_shape(ShapeKind::Text),
            b"pic" => self.start_shape(ShapeKind::Picture),
            b"off" => {
                if self.have_offset {
                    return;
                }
                if let Some(shape) = self.shape.as_mut() {
                    shape.x = int_attr(e, b"x").unwrap_or_default();
                    shape.y = int_attr(e, b"y").unwrap_or_default();
                    self.have_offset = true;
                }
            }
            b"ext" => {
                if let Some(shape) = self.shape.as_mut() {
                    if shape.width == 0 && shape.height == 0 {
                        shape.width = int_attr(e, b"cx").unwrap_or_default();
                        shape.height = int_attr(e, b"cy").unwrap_or_default();
                    }
                }
            }
            b"p" if self.shape.is_some() => {
                self.paragraph = Some(ParagraphSummary {
                    level: int_attr(e, b"lvl").unwrap_or_default() as usize,
                    ..Default::default()
                });
            }
            b"pPr" => {
                if let (Some(p), Some(lvl)) = (self.paragraph.as_mut(), int_attr(e, b"lvl")) {
                    p.level = lvl as usize;
                }
            }
            b"buChar" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.marker = str_attr(e, b"char").map(MarkerSummary::Bullet);
                }
            }
            b"buAutoNum" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.marker = str_attr(e, b"type").map(MarkerSummary::AutoNumber);
                }
            }
            b"r" if self.paragraph.is_some() => self.run = Some(RunSummary::default()),
            b"rPr" => {
                if let Some(run) = self.run.as_mut() {
                    run.bold = bool_attr(e, b"b");
                    run.italic = bool_attr(e, b"i");
                    run.underline = str_attr(e, b"u").is_some_and(|u| u != "none");
                    run.size_pt = int_attr(e, b"sz").map(|sz| sz as f32 / 100.0);
                    self.in_run_props = true;
                }
            }
            b"latin" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.font = str_attr(e, b"typeface");
                }
            }
            b"srgbClr" => {
                if self.in_background && self.slide.background.is_none() {
                    self.slide.background = str_attr(e, b"val");
                } else if self.in_run_props {
                    if let Some(run) = self.run.as_mut() {
                        run.color = str_attr(e, b"val");
                    }
                }
            }
            b"hlinkClick" => {
                if let Some(run) = self.run.as_mut() {
                    run.hyperlink = str_attr(e, b"r:id").and_then(|id| rels.get(&id).cloned());
                }
            }
            b"blip" => {
                if let Some(shape) = self.shape.as_mut() {
                    shape.image_target =
                        str_attr(e, b"r:embed").and_then(|id| rels.get(&id).cloned());
                }
            }
            b"t" if self.run.is_some() => self.in_text = true,
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match local_name(name) {
            b"bg" => self.in_background = false,
            b"sp" | b"pic" => {
                if let Some(shape) = self.shape.take() {
                    self.slide.shapes.push(shape);
                }
                self.paragraph = None;
                self.run = None;
            }
            b"p" => {
                if let (Some(shape), Some(p)) = (self.shape.as_mut(), self.paragraph.take()) {
                    shape.paragraphs.push(p);
                }
            }
            b"r" => {
                if let (Some(p), Some(run)) = (self.paragraph.as_mut(), self.run.take()) {
                    p.runs.push(run);
                }
            }
            b"rPr" => self.in_run_props = false,
            b"t" => self.in_text = false,
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if !self.in_text {
            return;
        }
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }

    fn start_shape(&mut self, kind: ShapeKind) {
        self.shape = Some(ShapeSummary {
            kind,
            ..Default::default()
        });
        self.have_offset = false;
    }
}

fn parse_slide_xml(xml: &str, rels: &HashMap<String, String>) -> Result<SlideSummary> {
    let mut reader = Reader::from_str(xml);
    // Leading and trailing spaces in runs are significant.
    reader.trim_text(false);
    let mut cursor = SlideCursor::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => cursor.open(e, rels),
            Ok(Event::Empty(ref e)) => {
                cursor.open(e, rels);
                cursor.close(e.name().as_ref());
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::XmlError(format!("Bad text in slide: {}", e)))?;
                cursor.text(&text);
            }
            Ok(Event::End(ref e)) => cursor.close(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing slide at {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(cursor.slide)
}

fn str_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn int_attr(e: &BytesStart, key: &[u8]) -> Option<i64> {
    str_attr(e, key).and_then(|v| v.parse().ok())
}

fn bool_attr(e: &BytesStart, key: &[u8]) -> bool {
    matches!(str_attr(e, key).as_deref(), Some("1") | Some("true"))
}

/// Read a file from the ZIP archive.
fn read_file_from_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PptxDocument;
    use slides_core::shapes::{Font, Marker, Paragraph, Rect, Rgb, Run, TextBlock};
    use slides_core::DocumentSink;
    use std::io::Cursor;

    fn font(bold: bool, italic: bool) -> Font {
        Font {
            family: "Open Sans".to_string(),
            size_pt: 11.0,
            bold,
            italic,
            underline: false,
            color: Rgb(0x11, 0x14, 0x17),
        }
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slides/slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("ppt", "slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(
            resolve_target("ppt/slides", "../media/image1.png"),
            "ppt/media/image1.png"
        );
        assert_eq!(resolve_target("ppt", "/ppt/slides/slide2.xml"), "ppt/slides/slide2.xml");
    }

    #[test]
    fn test_round_trip_of_written_deck() {
        let mut doc = PptxDocument::new();
        for title in ["First", "Second", "Third"] {
            let slide = doc.add_slide(Rgb(0xF8, 0xFA, 0xFC)).unwrap();
            let mut block = TextBlock::new(Rect::new(100, 200, 300, 400));
            block.paragraphs.push(Paragraph {
                level: 1,
                marker: Some(Marker::Bullet('•')),
                runs: vec![
                    Run {
                        text: format!("{} ", title),
                        font: font(true, false),
                        hyperlink: None,
                    },
                    Run {
                        text: "link".to_string(),
                        font: font(false, true),
                        hyperlink: Some("https://example.com".to_string()),
                    },
                ],
                ..Default::default()
            });
            doc.add_text_block(slide, block).unwrap();
        }

        let bytes = doc.to_bytes().unwrap();
        let deck = PptxReader::new().read(Cursor::new(bytes)).unwrap();

        assert_eq!(deck.slide_count(), 3);
        let third = &deck.slides[2];
        assert_eq!(third.number, 3);
        assert_eq!(third.background.as_deref(), Some("F8FAFC"));
        assert_eq!(third.texts(), vec!["Third link".to_string()]);

        let shape = &third.shapes[0];
        assert_eq!((shape.x, shape.y, shape.width, shape.height), (100, 200, 300, 400));
        let paragraph = &shape.paragraphs[0];
        assert_eq!(paragraph.level, 1);
        assert_eq!(paragraph.marker, Some(MarkerSummary::Bullet("•".to_string())));

        let runs: Vec<&RunSummary> = third.runs().collect();
        assert!(runs[0].bold && !runs[0].italic);
        assert_eq!(runs[0].size_pt, Some(11.0));
        assert_eq!(runs[0].font.as_deref(), Some("Open Sans"));
        assert_eq!(runs[0].color.as_deref(), Some("111417"));
        assert!(runs[1].italic);
        assert_eq!(runs[1].hyperlink.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_rejects_non_zip() {
        let err = PptxReader::new()
            .read(Cursor::new(b"not a zip".to_vec()))
            .unwrap_err();
        assert!(matches!(err, Error::ZipError(_)));
    }
}
