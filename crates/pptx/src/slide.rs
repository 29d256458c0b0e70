//! PresentationML slide parts: shapes, DrawingML text, and relationships.

use crate::package::{ns, rel_types};
use quick_xml::escape::escape;
use slides_core::shapes::{
    Align, AutoFit, Marker, NumberingScheme, Paragraph, Picture, Rgb, Run, Spacing, TextBlock,
};
use slides_core::{Error, Result};
use std::borrow::Cow;
use std::fmt::Write as FmtWrite;

/// Deepest outline level DrawingML accepts.
const MAX_LEVEL: usize = 8;

/// Typeface used to draw bullet glyphs.
const BULLET_FONT: &str = "Arial";

/// One element on a slide.
#[derive(Debug, Clone)]
pub(crate) enum Shape {
    Text(TextBlock),
    Picture {
        picture: Picture,
        /// Index into the document's media parts.
        media: usize,
    },
}

/// A slide waiting to be written.
#[derive(Debug, Clone)]
pub(crate) struct SlidePart {
    pub background: Rgb,
    pub shapes: Vec<Shape>,
}

/// Relationships collected while writing one slide.
#[derive(Debug, Default)]
pub(crate) struct SlideRels {
    entries: Vec<Relationship>,
}

#[derive(Debug)]
struct Relationship {
    id: String,
    rel_type: &'static str,
    target: String,
    external: bool,
}

impl SlideRels {
    /// Relationships every slide starts with: `rId1` is the layout.
    fn new() -> Self {
        let mut rels = Self::default();
        rels.push(
            rel_types::SLIDE_LAYOUT,
            "../slideLayouts/slideLayout1.xml".to_string(),
            false,
        );
        rels
    }

    fn push(&mut self, rel_type: &'static str, target: String, external: bool) -> String {
        if let Some(existing) = self
            .entries
            .iter()
            .find(|r| r.rel_type == rel_type && r.target == target)
        {
            return existing.id.clone();
        }
        let id = format!("rId{}", self.entries.len() + 1);
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type,
            target,
            external,
        });
        id
    }

    fn image(&mut self, media_name: &str) -> String {
        self.push(rel_types::IMAGE, format!("../media/{}", media_name), false)
    }

    fn hyperlink(&mut self, url: &str) -> String {
        self.push(rel_types::HYPERLINK, url.to_string(), true)
    }

    /// Serialize as a `.rels` part.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(512);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(xml, r#"<Relationships xmlns="{}">"#, ns::RELATIONSHIPS).map_err(xml_err)?;
        for rel in &self.entries {
            write!(
                xml,
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                rel.id,
                rel.rel_type,
                xml_text(&rel.target)
            )
            .map_err(xml_err)?;
            if rel.external {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        Ok(xml)
    }
}

pub(crate) fn xml_err(e: std::fmt::Error) -> Error {
    Error::XmlError(e.to_string())
}

impl SlidePart {
    /// Generate the slide XML and its relationships.
    ///
    /// `media_name` maps a media index to its file name under `ppt/media/`.
    pub fn to_xml(&self, media_name: impl Fn(usize) -> String) -> Result<(String, SlideRels)> {
        let mut rels = SlideRels::new();
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(
            xml,
            r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            ns::DRAWINGML,
            ns::OFFICE_RELATIONSHIPS,
            ns::PRESENTATIONML
        )
        .map_err(xml_err)?;
        xml.push_str("<p:cSld>");

        // Background must precede the shape tree.
        xml.push_str("<p:bg><p:bgPr>");
        write_solid_fill(&mut xml, self.background)?;
        xml.push_str("<a:effectLst/></p:bgPr></p:bg>");

        xml.push_str("<p:spTree>");
        xml.push_str(concat!(
            r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/>"#,
            "<p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"
        ));
        xml.push_str(concat!(
            "<p:grpSpPr><a:xfrm>",
            r#"<a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
            r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/>"#,
            "</a:xfrm></p:grpSpPr>"
        ));

        for (idx, shape) in self.shapes.iter().enumerate() {
            // Id 1 belongs to the group shape.
            let shape_id = idx as u32 + 2;
            match shape {
                Shape::Text(block) => write_text_block(&mut xml, shape_id, block, &mut rels)?,
                Shape::Picture { picture, media } => {
                    let rel_id = rels.image(&media_name(*media));
                    write_picture(&mut xml, shape_id, picture, &rel_id)?;
                }
            }
        }

        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");

        Ok((xml, rels))
    }
}

fn write_xfrm(xml: &mut String, x: i64, y: i64, cx: i64, cy: i64) -> Result<()> {
    write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        x, y, cx, cy
    )
    .map_err(xml_err)
}

fn write_solid_fill(xml: &mut String, color: Rgb) -> Result<()> {
    write!(
        xml,
        r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
        color.hex()
    )
    .map_err(xml_err)
}

fn write_text_block(
    xml: &mut String,
    shape_id: u32,
    block: &TextBlock,
    rels: &mut SlideRels,
) -> Result<()> {
    xml.push_str("<p:sp><p:nvSpPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="TextBox {}"/>"#,
        shape_id,
        shape_id - 1
    )
    .map_err(xml_err)?;
    xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#);

    xml.push_str("<p:spPr>");
    let r = block.rect;
    write_xfrm(xml, r.x, r.y, r.width, r.height)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/>"#);
    xml.push_str("</p:spPr>");

    xml.push_str("<p:txBody>");
    write!(
        xml,
        r#"<a:bodyPr wrap="{}" rtlCol="0">"#,
        if block.word_wrap { "square" } else { "none" }
    )
    .map_err(xml_err)?;
    match block.auto_fit {
        AutoFit::None => xml.push_str("<a:noAutofit/>"),
        AutoFit::ShrinkText => xml.push_str("<a:normAutofit/>"),
        AutoFit::ResizeShape => xml.push_str("<a:spAutoFit/>"),
    }
    xml.push_str("</a:bodyPr><a:lstStyle/>");

    if block.paragraphs.is_empty() {
        xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
    }
    for paragraph in &block.paragraphs {
        write_paragraph(xml, paragraph, rels)?;
    }

    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph, rels: &mut SlideRels) -> Result<()> {
    xml.push_str("<a:p><a:pPr");
    if let Some(margin) = paragraph.margin_left {
        write!(xml, r#" marL="{}""#, margin).map_err(xml_err)?;
    }
    if paragraph.level > 0 {
        write!(xml, r#" lvl="{}""#, paragraph.level.min(MAX_LEVEL)).map_err(xml_err)?;
    }
    if let Some(indent) = paragraph.indent {
        write!(xml, r#" indent="{}""#, indent).map_err(xml_err)?;
    }
    let algn = match paragraph.align {
        Align::Left => "l",
        Align::Center => "ctr",
    };
    write!(xml, r#" algn="{}">"#, algn).map_err(xml_err)?;

    if let Some(spacing) = paragraph.space_before {
        write_spacing(xml, "a:spcBef", spacing)?;
    }
    if let Some(spacing) = paragraph.space_after {
        write_spacing(xml, "a:spcAft", spacing)?;
    }

    match paragraph.marker {
        Some(Marker::Bullet(glyph)) => {
            write!(xml, r#"<a:buFont typeface="{}"/>"#, BULLET_FONT).map_err(xml_err)?;
            let mut buf = [0u8; 4];
            write!(
                xml,
                r#"<a:buChar char="{}"/>"#,
                escape(&*glyph.encode_utf8(&mut buf))
            )
            .map_err(xml_err)?;
        }
        Some(Marker::AutoNumber(scheme)) => {
            write!(xml, r#"<a:buAutoNum type="{}"/>"#, numbering_type(scheme)).map_err(xml_err)?;
        }
        None => xml.push_str("<a:buNone/>"),
    }
    xml.push_str("</a:pPr>");

    for run in &paragraph.runs {
        write_run(xml, run, rels)?;
    }

    xml.push_str("</a:p>");
    Ok(())
}

/// DrawingML `ST_TextAutonumberScheme` value.
pub(crate) fn numbering_type(scheme: NumberingScheme) -> &'static str {
    match scheme {
        NumberingScheme::ArabicPeriod => "arabicPeriod",
        NumberingScheme::AlphaLcPeriod => "alphaLcPeriod",
    }
}

fn write_spacing(xml: &mut String, tag: &str, spacing: Spacing) -> Result<()> {
    let Spacing::Lines(lines) = spacing;
    // Thousandths of a percent of a line.
    write!(
        xml,
        r#"<{tag}><a:spcPct val="{}"/></{tag}>"#,
        (lines * 100_000.0).round() as i64
    )
    .map_err(xml_err)
}

fn write_run(xml: &mut String, run: &Run, rels: &mut SlideRels) -> Result<()> {
    let font = &run.font;
    xml.push_str("<a:r>");
    write!(
        xml,
        r#"<a:rPr lang="en-US" sz="{}" b="{}" i="{}""#,
        (font.size_pt * 100.0).round() as u32,
        u8::from(font.bold),
        u8::from(font.italic)
    )
    .map_err(xml_err)?;
    if font.underline {
        xml.push_str(r#" u="sng""#);
    }
    xml.push_str(r#" dirty="0">"#);

    // Child order is fixed by the schema: fill, latin, hlinkClick.
    write_solid_fill(xml, font.color)?;
    write!(
        xml,
        r#"<a:latin typeface="{}"/>"#,
        xml_text(&font.family)
    )
    .map_err(xml_err)?;
    if let Some(url) = &run.hyperlink {
        let rel_id = rels.hyperlink(url);
        write!(xml, r#"<a:hlinkClick r:id="{}"/>"#, rel_id).map_err(xml_err)?;
    }
    xml.push_str("</a:rPr>");

    write!(xml, "<a:t>{}</a:t>", xml_text(&run.text)).map_err(xml_err)?;
    xml.push_str("</a:r>");
    Ok(())
}

/// True for characters XML 1.0 allows in character data.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}')
        || c >= '\u{10000}'
}

/// Escape text for element content or attribute values.
///
/// Characters XML cannot carry are written as `_xHHHH_`, the OOXML escape
/// form, instead of corrupting the part.
fn xml_text(raw: &str) -> Cow<'_, str> {
    if raw.chars().all(is_xml_char) {
        return escape(raw);
    }
    let mut encoded = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        if is_xml_char(c) {
            encoded.push(c);
        } else {
            let _ = write!(encoded, "_x{:04X}_", c as u32);
        }
    }
    Cow::Owned(escape(&encoded).into_owned())
}

fn write_picture(xml: &mut String, shape_id: u32, picture: &Picture, rel_id: &str) -> Result<()> {
    xml.push_str("<p:pic><p:nvPicPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
        shape_id,
        shape_id - 1,
        xml_text(&picture.description)
    )
    .map_err(xml_err)?;
    xml.push_str(concat!(
        r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>"#,
        "<p:nvPr/></p:nvPicPr>"
    ));

    xml.push_str("<p:blipFill>");
    write!(xml, r#"<a:blip r:embed="{}"/>"#, rel_id).map_err(xml_err)?;
    xml.push_str("<a:stretch><a:fillRect/></a:stretch></p:blipFill>");

    xml.push_str("<p:spPr>");
    let r = picture.rect;
    write_xfrm(xml, r.x, r.y, r.width, r.height)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("</p:spPr></p:pic>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slides_core::shapes::{Font, Rect};
    use std::path::PathBuf;

    fn run(text: &str) -> Run {
        Run {
            text: text.to_string(),
            font: Font {
                family: "Open Sans".to_string(),
                size_pt: 11.0,
                bold: false,
                italic: false,
                underline: false,
                color: Rgb(0x11, 0x14, 0x17),
            },
            hyperlink: None,
        }
    }

    fn slide_with(paragraphs: Vec<Paragraph>) -> SlidePart {
        let mut block = TextBlock::new(Rect::new(457_200, 1_280_160, 5_000_000, 5_120_640))
            .with_auto_fit(AutoFit::ShrinkText);
        block.paragraphs = paragraphs;
        SlidePart {
            background: Rgb(0xF8, 0xFA, 0xFC),
            shapes: vec![Shape::Text(block)],
        }
    }

    /// Read the whole document, failing on mismatched or unclosed tags.
    fn assert_well_formed(xml: &str) {
        let mut reader = quick_xml::Reader::from_str(xml);
        let mut depth = 0usize;
        loop {
            match reader.read_event() {
                Ok(quick_xml::events::Event::Start(_)) => depth += 1,
                Ok(quick_xml::events::Event::End(_)) => depth -= 1,
                Ok(quick_xml::events::Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("malformed XML at {}: {}", reader.buffer_position(), e),
            }
        }
        assert_eq!(depth, 0, "unclosed elements");
        assert!(
            !xml.chars().any(|c| !is_xml_char(c)),
            "character not allowed in XML"
        );
    }

    fn render(slide: &SlidePart) -> (String, String) {
        let (xml, rels) = slide.to_xml(|i| format!("image{}.png", i + 1)).unwrap();
        (xml, rels.to_xml().unwrap())
    }

    #[test]
    fn test_background_and_autofit() {
        let (xml, rels) = render(&slide_with(vec![]));
        assert!(xml.contains(r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="F8FAFC"/>"#));
        assert!(xml.contains("<a:normAutofit/>"));
        assert!(xml.contains(r#"<a:off x="457200" y="1280160"/>"#));
        assert!(rels.contains("slideLayout1.xml"));
    }

    #[test]
    fn test_bullet_paragraph_hanging_indent() {
        let paragraph = Paragraph {
            level: 1,
            marker: Some(Marker::Bullet('–')),
            margin_left: Some(914_400),
            indent: Some(-228_600),
            space_after: Some(Spacing::Lines(0.5)),
            runs: vec![run("nested")],
            ..Default::default()
        };
        let (xml, _) = render(&slide_with(vec![paragraph]));
        assert!(xml.contains(r#"<a:pPr marL="914400" lvl="1" indent="-228600" algn="l">"#));
        assert!(xml.contains(r#"<a:spcAft><a:spcPct val="50000"/></a:spcAft>"#));
        assert!(xml.contains(r#"<a:buChar char="–"/>"#));
        assert!(xml.contains("<a:t>nested</a:t>"));
    }

    #[test]
    fn test_auto_number_paragraph() {
        let paragraph = Paragraph {
            marker: Some(Marker::AutoNumber(NumberingScheme::AlphaLcPeriod)),
            runs: vec![run("x")],
            ..Default::default()
        };
        let (xml, _) = render(&slide_with(vec![paragraph]));
        assert!(xml.contains(r#"<a:buAutoNum type="alphaLcPeriod"/>"#));
    }

    #[test]
    fn test_plain_paragraph_has_no_bullet() {
        let paragraph = Paragraph {
            runs: vec![run("plain")],
            ..Default::default()
        };
        let (xml, _) = render(&slide_with(vec![paragraph]));
        assert!(xml.contains("<a:buNone/>"));
    }

    #[test]
    fn test_hyperlinks_become_external_relationships() {
        let mut link = run("docs");
        link.font.underline = true;
        link.hyperlink = Some("https://example.com/?a=1&b=2".to_string());
        let mut again = link.clone();
        again.text = "again".to_string();

        let paragraph = Paragraph {
            runs: vec![link, again],
            ..Default::default()
        };
        let (xml, rels) = render(&slide_with(vec![paragraph]));
        assert!(xml.contains(r#"u="sng""#));
        assert_eq!(xml.matches(r#"<a:hlinkClick r:id="rId2"/>"#).count(), 2);
        assert!(rels.contains(
            r#"Target="https://example.com/?a=1&amp;b=2" TargetMode="External""#
        ));
    }

    #[test]
    fn test_text_is_escaped() {
        let paragraph = Paragraph {
            runs: vec![run("Q&A <today>")],
            ..Default::default()
        };
        let (xml, _) = render(&slide_with(vec![paragraph]));
        assert!(xml.contains("<a:t>Q&amp;A &lt;today&gt;</a:t>"));
    }

    #[test]
    fn test_picture_relationship() {
        let slide = SlidePart {
            background: Rgb(0xF8, 0xFA, 0xFC),
            shapes: vec![Shape::Picture {
                picture: Picture {
                    path: PathBuf::from("chart.png"),
                    rect: Rect::new(1, 2, 3, 4),
                    description: "Chart".to_string(),
                },
                media: 0,
            }],
        };
        let (xml, rels) = render(&slide);
        assert!(xml.contains(r#"<a:blip r:embed="rId2"/>"#));
        assert!(xml.contains(r#"descr="Chart""#));
        assert!(rels.contains(r#"Target="../media/image1.png""#));
    }

    #[test]
    fn test_empty_block_still_has_paragraph() {
        let (xml, _) = render(&slide_with(vec![]));
        assert!(xml.contains("<a:p><a:endParaRPr"));
    }

    #[test]
    fn test_slide_xml_is_well_formed() {
        let paragraphs = vec![
            Paragraph {
                marker: Some(Marker::Bullet('•')),
                runs: vec![run("first"), run(" second")],
                ..Default::default()
            },
            Paragraph {
                marker: Some(Marker::AutoNumber(NumberingScheme::ArabicPeriod)),
                space_before: Some(Spacing::Lines(0.5)),
                runs: vec![run("third")],
                ..Default::default()
            },
            Paragraph::default(),
        ];
        let mut slide = slide_with(paragraphs);
        slide.shapes.push(Shape::Picture {
            picture: Picture {
                path: PathBuf::from("chart.png"),
                rect: Rect::new(1, 2, 3, 4),
                description: "Chart".to_string(),
            },
            media: 0,
        });

        let (xml, rels) = render(&slide);
        assert!(xml.contains("<a:p><a:pPr"));
        assert_eq!(xml.matches("<a:p>").count(), xml.matches("</a:p>").count());
        assert_well_formed(&xml);
        assert_well_formed(&rels);
    }

    #[test]
    fn test_control_characters_are_encoded() {
        let paragraph = Paragraph {
            runs: vec![run("page\u{0C}break and bell\u{07} & tab\tkept")],
            ..Default::default()
        };
        let (xml, _) = render(&slide_with(vec![paragraph]));
        assert!(xml.contains("<a:t>page_x000C_break and bell_x0007_ &amp; tab\tkept</a:t>"));
        assert_well_formed(&xml);
    }

    #[test]
    fn test_xml_text_borrows_clean_input() {
        assert!(matches!(xml_text("plain"), Cow::Borrowed("plain")));
        assert_eq!(xml_text("a\u{0B}b"), "a_x000B_b");
        assert_eq!(xml_text("<\u{1F}>"), "&lt;_x001F_&gt;");
    }
}
