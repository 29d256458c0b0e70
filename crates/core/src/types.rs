//! Slide model produced by the parser and consumed by the renderer.

use serde::{Deserialize, Serialize};

/// A run of text with uniform formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    /// The visible text.
    pub text: String,

    /// Bold weight.
    pub bold: bool,

    /// Italic style.
    pub italic: bool,

    /// Hyperlink target. A run with a URL always renders as a link.
    pub url: Option<String>,
}

impl TextRun {
    /// Create an unformatted run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            url: None,
        }
    }

    /// Create a bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    /// Create an italic run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            italic: true,
            ..Self::plain(text)
        }
    }

    /// Create a bold and italic run.
    pub fn bold_italic(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            italic: true,
            ..Self::plain(text)
        }
    }

    /// Create a hyperlink run.
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::plain(text)
        }
    }

    /// Whether this run is a hyperlink.
    pub fn is_link(&self) -> bool {
        self.url.is_some()
    }
}

/// One bullet or numbered list line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Formatted text of the item.
    pub content: Vec<TextRun>,

    /// Nesting depth: leading whitespace width divided by two.
    pub level: usize,

    /// Numbered rather than bulleted.
    pub ordered: bool,

    /// The literal number from the source. Informational only; rendering
    /// relies on automatic numbering.
    pub number: Option<u64>,
}

impl ListItem {
    /// Create a bullet item.
    pub fn bullet(content: Vec<TextRun>, level: usize) -> Self {
        Self {
            content,
            level,
            ordered: false,
            number: None,
        }
    }

    /// Create a numbered item.
    pub fn numbered(content: Vec<TextRun>, level: usize, number: u64) -> Self {
        Self {
            content,
            level,
            ordered: true,
            number: Some(number),
        }
    }

    /// Concatenated text of all runs.
    pub fn plain_text(&self) -> String {
        self.content.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Depth of a section heading inside a content slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadingDepth {
    /// `###`
    Three,
    /// `####`
    Four,
}

/// A `###` or `####` heading that separates sections within one slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionHeading {
    pub text: String,
    pub depth: HeadingDepth,
}

/// An image reference with an optional caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Path as written in the Markdown source.
    pub path: String,

    /// Caption text; `None` when the source caption was empty.
    pub caption: Option<String>,
}

/// One entry in a content slide's body, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentItem {
    /// A bullet or numbered list line.
    List(ListItem),
    /// A run from a plain paragraph line.
    Text(TextRun),
    /// A section heading.
    Heading(SectionHeading),
}

/// A single slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// Heading text.
    pub title: String,

    /// Introduced by `#` rather than `##`.
    pub is_title_slide: bool,

    /// Lines between the title heading and the first content slide.
    pub subtitle: Option<String>,

    /// Body content, in document order.
    pub content: Vec<ContentItem>,

    /// Trailing image; the last image line on the slide wins.
    pub image: Option<Image>,
}

impl Slide {
    /// Create a title slide.
    pub fn title_slide(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            is_title_slide: true,
            subtitle: None,
            content: Vec::new(),
            image: None,
        }
    }

    /// Create a content slide.
    pub fn content_slide(title: impl Into<String>) -> Self {
        Self {
            is_title_slide: false,
            ..Self::title_slide(title)
        }
    }

    /// Iterate over the list items of this slide.
    pub fn list_items(&self) -> impl Iterator<Item = &ListItem> {
        self.content.iter().filter_map(|item| match item {
            ContentItem::List(list) => Some(list),
            _ => None,
        })
    }

    /// Iterate over the flat paragraph runs of this slide.
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.content.iter().filter_map(|item| match item {
            ContentItem::Text(run) => Some(run),
            _ => None,
        })
    }
}
