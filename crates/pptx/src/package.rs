//! OPC packaging: part names, content types, and the ZIP container.

use crate::media::{MediaFormat, MediaPart};
use crate::slide::{xml_err, SlidePart};
use crate::template;
use slides_core::shapes::Emu;
use slides_core::{Error, Result};
use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;
use std::io::{Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// XML namespaces.
pub(crate) mod ns {
    pub const DRAWINGML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    pub const PRESENTATIONML: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
    pub const OFFICE_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    pub const RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
    pub const CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
}

/// Relationship type URIs.
pub(crate) mod rel_types {
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
}

mod content_types {
    pub const PRESENTATION: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
    pub const SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const SLIDE_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
    pub const SLIDE_LAYOUT: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
    pub const THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
    pub const CORE_PROPS: &str = "application/vnd.openxmlformats-package.core-properties+xml";
    pub const APP_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";
    pub const RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";
}

/// Slide ids in `presentation.xml` start here.
const FIRST_SLIDE_ID: usize = 256;

/// Part name of an embedded image, e.g. `image1.png`.
pub(crate) fn media_file_name(index: usize, format: MediaFormat) -> String {
    format!("image{}.{}", index + 1, format.extension())
}

/// Everything needed to write one `.pptx` package.
pub(crate) struct Package<'a> {
    pub slide_size: (Emu, Emu),
    pub slides: &'a [SlidePart],
    pub media: &'a [MediaPart],
}

impl Package<'_> {
    /// Write the complete package into a ZIP stream.
    pub fn write<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut put = |name: &str, data: &[u8]| -> Result<()> {
            zip.start_file(name, options)
                .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", name, e)))?;
            zip.write_all(data)?;
            Ok(())
        };

        put("[Content_Types].xml", self.content_types_xml()?.as_bytes())?;
        put("_rels/.rels", template::ROOT_RELS_XML.as_bytes())?;
        put("docProps/core.xml", template::CORE_PROPS_XML.as_bytes())?;
        put("docProps/app.xml", template::APP_PROPS_XML.as_bytes())?;
        put("ppt/presentation.xml", self.presentation_xml()?.as_bytes())?;
        put(
            "ppt/_rels/presentation.xml.rels",
            self.presentation_rels_xml()?.as_bytes(),
        )?;
        put(
            "ppt/slideMasters/slideMaster1.xml",
            template::SLIDE_MASTER_XML.as_bytes(),
        )?;
        put(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            template::SLIDE_MASTER_RELS_XML.as_bytes(),
        )?;
        put(
            "ppt/slideLayouts/slideLayout1.xml",
            template::SLIDE_LAYOUT_XML.as_bytes(),
        )?;
        put(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            template::SLIDE_LAYOUT_RELS_XML.as_bytes(),
        )?;
        put("ppt/theme/theme1.xml", template::THEME_XML.as_bytes())?;

        for (idx, slide) in self.slides.iter().enumerate() {
            let (xml, rels) = slide.to_xml(|m| media_file_name(m, self.media[m].format))?;
            put(&format!("ppt/slides/slide{}.xml", idx + 1), xml.as_bytes())?;
            put(
                &format!("ppt/slides/_rels/slide{}.xml.rels", idx + 1),
                rels.to_xml()?.as_bytes(),
            )?;
        }

        for (idx, media) in self.media.iter().enumerate() {
            put(
                &format!("ppt/media/{}", media_file_name(idx, media.format)),
                &media.data,
            )?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
    }

    fn content_types_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(2048);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(xml, r#"<Types xmlns="{}">"#, ns::CONTENT_TYPES).map_err(xml_err)?;
        write!(
            xml,
            r#"<Default Extension="rels" ContentType="{}"/>"#,
            content_types::RELS
        )
        .map_err(xml_err)?;
        xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);

        let formats: BTreeSet<(&str, &str)> = self
            .media
            .iter()
            .map(|m| (m.format.extension(), m.format.content_type()))
            .collect();
        for (ext, content_type) in formats {
            write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                ext, content_type
            )
            .map_err(xml_err)?;
        }

        let mut overrides = vec![
            ("/ppt/presentation.xml".to_string(), content_types::PRESENTATION),
            (
                "/ppt/slideMasters/slideMaster1.xml".to_string(),
                content_types::SLIDE_MASTER,
            ),
            (
                "/ppt/slideLayouts/slideLayout1.xml".to_string(),
                content_types::SLIDE_LAYOUT,
            ),
            ("/ppt/theme/theme1.xml".to_string(), content_types::THEME),
            ("/docProps/core.xml".to_string(), content_types::CORE_PROPS),
            ("/docProps/app.xml".to_string(), content_types::APP_PROPS),
        ];
        for idx in 0..self.slides.len() {
            overrides.push((format!("/ppt/slides/slide{}.xml", idx + 1), content_types::SLIDE));
        }
        for (part, content_type) in overrides {
            write!(
                xml,
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                part, content_type
            )
            .map_err(xml_err)?;
        }

        xml.push_str("</Types>");
        Ok(xml)
    }

    fn presentation_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(
            xml,
            r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
            ns::DRAWINGML,
            ns::OFFICE_RELATIONSHIPS,
            ns::PRESENTATIONML
        )
        .map_err(xml_err)?;

        xml.push_str(concat!(
            "<p:sldMasterIdLst>",
            r#"<p:sldMasterId id="2147483648" r:id="rId1"/>"#,
            "</p:sldMasterIdLst>"
        ));
        if !self.slides.is_empty() {
            xml.push_str("<p:sldIdLst>");
            for idx in 0..self.slides.len() {
                write!(
                    xml,
                    r#"<p:sldId id="{}" r:id="{}"/>"#,
                    FIRST_SLIDE_ID + idx,
                    slide_rel_id(idx)
                )
                .map_err(xml_err)?;
            }
            xml.push_str("</p:sldIdLst>");
        }

        let (cx, cy) = self.slide_size;
        write!(xml, r#"<p:sldSz cx="{}" cy="{}"/>"#, cx, cy).map_err(xml_err)?;
        xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
        xml.push_str("</p:presentation>");
        Ok(xml)
    }

    fn presentation_rels_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(xml, r#"<Relationships xmlns="{}">"#, ns::RELATIONSHIPS).map_err(xml_err)?;
        write!(
            xml,
            r#"<Relationship Id="rId1" Type="{}" Target="slideMasters/slideMaster1.xml"/>"#,
            rel_types::SLIDE_MASTER
        )
        .map_err(xml_err)?;
        write!(
            xml,
            r#"<Relationship Id="rId2" Type="{}" Target="theme/theme1.xml"/>"#,
            rel_types::THEME
        )
        .map_err(xml_err)?;
        for idx in 0..self.slides.len() {
            write!(
                xml,
                r#"<Relationship Id="{}" Type="{}" Target="slides/slide{}.xml"/>"#,
                slide_rel_id(idx),
                rel_types::SLIDE,
                idx + 1
            )
            .map_err(xml_err)?;
        }
        xml.push_str("</Relationships>");
        Ok(xml)
    }
}

/// Relationship id of a slide inside `presentation.xml.rels`.
fn slide_rel_id(index: usize) -> String {
    // rId1 and rId2 are the master and theme.
    format!("rId{}", index + 3)
}
